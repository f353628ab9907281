mod amount;
mod balance;
mod clock;
mod deposit;
mod iban;
mod record;
mod store;
mod transfer;

pub use amount::{AmountError, parse_log_amount, validate_amount};
pub use balance::{BalanceCalculator, BalanceRecord};
pub use clock::utc_timestamp;
pub use deposit::DepositRequest;
pub use iban::{require_iban, validate_iban};
pub use record::{InputRecord, RecordType, Request};
pub use store::{JsonStore, StoreError, StoredRecord};
pub use transfer::{TransferDetails, TransferRequest, TransferType};
