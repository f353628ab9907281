use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::engine::amount::parse_log_amount;
use crate::engine::clock::utc_timestamp;
use crate::engine::iban::validate_iban;
use crate::engine::store::write_pretty;
use crate::error::{MoneyError, Result};

/// Summed balance of one account at a point in time.
/// It is produced fresh on every aggregation and never updated in place.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BalanceRecord {
    #[serde(rename = "IBAN")]
    pub iban: String,
    pub timestamp: f64,
    pub balance: f64,
}

/// Sums the transaction log per account and writes `balance_<IBAN>.json`.
#[derive(Debug, Clone)]
pub struct BalanceCalculator {
    transactions_file: PathBuf,
    balance_dir: PathBuf,
}

impl BalanceCalculator {
    pub fn new(transactions_file: impl AsRef<Path>, balance_dir: impl AsRef<Path>) -> Self {
        BalanceCalculator {
            transactions_file: transactions_file.as_ref().to_path_buf(),
            balance_dir: balance_dir.as_ref().to_path_buf(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.transactions_file, &config.balance_dir)
    }

    /// Path of the balance file written for `iban`.
    pub fn balance_file(&self, iban: &str) -> PathBuf {
        self.balance_dir.join(format!("balance_{iban}.json"))
    }

    /// Computes the balance and overwrites the account's balance file.
    /// Every failure is returned as an error; `Ok` always carries `true`.
    pub fn calculate_balance(&self, iban: &str) -> Result<bool> {
        let record = self.compute(iban)?;
        self.write(&record)?;
        Ok(true)
    }

    /// Computes the balance without writing anything.
    pub fn compute(&self, iban: &str) -> Result<BalanceRecord> {
        self.compute_at(iban, utc_timestamp())
    }

    pub fn compute_at(&self, iban: &str, timestamp: f64) -> Result<BalanceRecord> {
        if !validate_iban(&Value::from(iban)) {
            Err(MoneyError::InvalidIban)?
        }

        let transactions = self.load_transactions()?;
        log::debug!(
            "Scanning {} transactions from {:?} for {iban}",
            transactions.len(),
            self.transactions_file
        );

        let mut found = false;
        let mut total = 0.0;
        for tx in &transactions {
            if tx.get("IBAN").and_then(Value::as_str) != Some(iban) {
                continue;
            }
            found = true;
            let amount = parse_log_amount(tx.get("amount")).map_err(|e| {
                log::warn!("Rejecting transaction for {iban}: {e}");
                MoneyError::InvalidAmountFormat
            })?;
            total += amount;
        }

        if !found {
            Err(MoneyError::IbanNotFound)?
        }

        Ok(BalanceRecord {
            iban: iban.to_owned(),
            timestamp,
            balance: total,
        })
    }

    /// Overwrites the balance file for the record's account.
    pub fn write(&self, record: &BalanceRecord) -> Result<PathBuf> {
        let path = self.balance_file(&record.iban);
        write_pretty(&path, record).map_err(|e| MoneyError::BalanceWrite(e.to_string()))?;
        log::debug!("Balance for {} written to {path:?}", record.iban);
        Ok(path)
    }

    // A log that is not an array, or entries that are not objects, simply
    // match nothing.
    fn load_transactions(&self) -> Result<Vec<Value>> {
        let text = match fs::read_to_string(&self.transactions_file) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => Err(MoneyError::TransactionsNotFound)?,
            Err(e) => Err(MoneyError::TransactionsUnreadable(e.to_string()))?,
        };
        let parsed: Value =
            serde_json::from_str(&text).map_err(|_| MoneyError::TransactionsMalformed)?;
        Ok(match parsed {
            Value::Array(entries) => entries,
            _ => Vec::new(),
        })
    }
}
