use thiserror::Error;

use crate::engine::StoreError;

/// Every failure surfaced by the library.
/// The `Display` text is the message callers branch on.
#[derive(Error, Debug)]
pub enum MoneyError {
    #[error("{0}")]
    InvalidField(String),

    #[error("{0}")]
    Duplicate(&'static str),

    #[error("Error saving {record} to file: {message}")]
    Save {
        record: &'static str,
        message: String,
    },

    #[error("Invalid IBAN")]
    InvalidIban,

    #[error("Transactions file not found")]
    TransactionsNotFound,

    #[error("Error reading transactions file: {0}")]
    TransactionsUnreadable(String),

    #[error("Transactions file is not valid JSON")]
    TransactionsMalformed,

    #[error("IBAN not found in transactions")]
    IbanNotFound,

    #[error("Invalid amount format in transactions")]
    InvalidAmountFormat,

    #[error("Error writing balance file: {0}")]
    BalanceWrite(String),
}

impl MoneyError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        MoneyError::InvalidField(message.into())
    }

    /// Maps an append-store failure onto the record kind that was being saved.
    pub(crate) fn from_store(record: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(message) => MoneyError::Duplicate(message),
            other => MoneyError::Save {
                record,
                message: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, MoneyError>;
