pub mod config;
pub mod engine;
pub mod error;

pub use config::Config;
pub use engine::{
    BalanceCalculator, BalanceRecord, DepositRequest, StoredRecord, TransferDetails,
    TransferRequest, TransferType, validate_iban,
};
pub use error::{MoneyError, Result};
