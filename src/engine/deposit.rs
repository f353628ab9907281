use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::engine::amount::validate_amount;
use crate::engine::clock::utc_timestamp;
use crate::engine::iban::require_iban;
use crate::engine::store::StoredRecord;
use crate::error::{MoneyError, Result};

pub const DEPOSIT_ALGORITHM: &str = "SHA-256";
pub const DEPOSIT_TYPE: &str = "DEPOSIT";

/// A validated request to deposit money into an account.
///
/// The record cannot be changed once built, so it never holds invalid
/// fields. The signature is derived from the other fields on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositRequest {
    to_iban: String,
    deposit_amount: f64,
    deposit_date: f64,
}

#[derive(Serialize)]
struct DepositJson<'a> {
    alg: &'static str,
    typ: &'static str,
    to_iban: &'a str,
    deposit_amount: f64,
    deposit_date: f64,
    deposit_signature: String,
}

impl DepositRequest {
    /// Validates the fields and stamps the request with the current UTC time.
    pub fn new(to_iban: impl Into<Value>, deposit_amount: impl Into<Value>) -> Result<Self> {
        Self::new_at(to_iban, deposit_amount, utc_timestamp())
    }

    /// Same as [`DepositRequest::new`] with an explicit creation timestamp.
    pub fn new_at(
        to_iban: impl Into<Value>,
        deposit_amount: impl Into<Value>,
        deposit_date: f64,
    ) -> Result<Self> {
        let to_iban = require_iban(&to_iban.into(), "to_iban")?;
        let deposit_amount = validate_amount(&deposit_amount.into(), "deposit_amount")?;
        if !deposit_date.is_finite() {
            return Err(MoneyError::invalid("deposit_date must be a finite number."));
        }

        Ok(DepositRequest {
            to_iban,
            deposit_amount,
            deposit_date,
        })
    }

    pub fn alg(&self) -> &'static str {
        DEPOSIT_ALGORITHM
    }

    pub fn typ(&self) -> &'static str {
        DEPOSIT_TYPE
    }

    pub fn to_iban(&self) -> &str {
        &self.to_iban
    }

    pub fn deposit_amount(&self) -> f64 {
        self.deposit_amount
    }

    /// UTC epoch seconds captured at construction
    pub fn deposit_date(&self) -> f64 {
        self.deposit_date
    }

    fn signature_string(&self) -> String {
        format!(
            "{{alg:{},typ:{},iban:{},amount:{:?},deposit_date:{:?}}}",
            self.alg(),
            self.typ(),
            self.to_iban,
            self.deposit_amount,
            self.deposit_date
        )
    }

    /// Lowercase hex SHA-256 of the canonical field string (64 characters).
    pub fn deposit_signature(&self) -> String {
        hex::encode(Sha256::digest(self.signature_string().as_bytes()))
    }
}

impl StoredRecord for DepositRequest {
    const KIND: &'static str = "deposit";
    const DUPLICATE_MESSAGE: &'static str = "Duplicate deposit entry detected.";

    fn to_json(&self) -> serde_json::Result<Value> {
        let view = DepositJson {
            alg: self.alg(),
            typ: self.typ(),
            to_iban: &self.to_iban,
            deposit_amount: self.deposit_amount,
            deposit_date: self.deposit_date,
            deposit_signature: self.deposit_signature(),
        };
        serde_json::to_value(view)
    }
}
