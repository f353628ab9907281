use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::engine::{DepositRequest, StoredRecord, TransferDetails, TransferRequest};
use crate::error::Result;

/// One row of a CSV request batch. Columns a request kind does not use are
/// left empty.
#[derive(Deserialize, Debug, Clone)]
pub struct InputRecord {
    #[serde(rename = "type")]
    pub typ: RecordType,
    pub from_iban: Option<String>,
    pub to_iban: Option<String>,
    pub transfer_type: Option<String>,
    pub concept: Option<String>,
    pub date: Option<String>,
    pub amount: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Deposit,
    Transfer,
}

impl RecordType {
    /// Lowercase name, as written in the CSV `type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Deposit => DepositRequest::KIND,
            RecordType::Transfer => TransferRequest::KIND,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Deposit(DepositRequest),
    Transfer(TransferRequest),
}

impl InputRecord {
    pub fn to_request(&self) -> Result<Request> {
        match self.typ {
            RecordType::Deposit => Ok(Request::Deposit(DepositRequest::new(
                text(&self.to_iban),
                number(&self.amount),
            )?)),
            RecordType::Transfer => {
                let details = TransferDetails::new(
                    text(&self.transfer_type),
                    text(&self.concept),
                    text(&self.date),
                    number(&self.amount),
                );
                Ok(Request::Transfer(TransferRequest::new(
                    text(&self.from_iban),
                    text(&self.to_iban),
                    &details,
                )?))
            }
        }
    }
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Deposit(_) => DepositRequest::KIND,
            Request::Transfer(_) => TransferRequest::KIND,
        }
    }

    /// Deposit signature or transfer code.
    pub fn fingerprint(&self) -> String {
        match self {
            Request::Deposit(d) => d.deposit_signature(),
            Request::Transfer(t) => t.transfer_code(),
        }
    }

    /// Appends the request to the store configured for its kind.
    pub fn save(&self, config: &Config) -> Result<()> {
        match self {
            Request::Deposit(d) => d.save_to_file(&config.deposits_file),
            Request::Transfer(t) => t.save_to_file(&config.transfers_file),
        }
    }
}

fn text(field: &Option<String>) -> Value {
    match field {
        Some(s) => Value::String(s.clone()),
        None => Value::Null,
    }
}

// A cell is read as a JSON number when it is one ("100.00" is a float,
// "100" an integer); anything else stays text and fails the float check.
fn number(field: &Option<String>) -> Value {
    match field {
        Some(s) => match serde_json::from_str::<Value>(s) {
            Ok(v @ Value::Number(_)) => v,
            _ => Value::String(s.clone()),
        },
        None => Value::Null,
    }
}
