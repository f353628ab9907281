use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::ser::Formatter;
use std::fmt;
use std::io;
use std::str::FromStr;

use crate::engine::amount::validate_amount;
use crate::engine::clock::utc_timestamp;
use crate::engine::iban::require_iban;
use crate::engine::store::StoredRecord;
use crate::error::{MoneyError, Result};

pub const MIN_CONCEPT_LENGTH: usize = 10;
pub const MAX_CONCEPT_LENGTH: usize = 30;
pub const FIRST_TRANSFER_YEAR: i64 = 2025;
/// Exclusive upper bound
pub const LAST_TRANSFER_YEAR: i64 = 2051;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransferType {
    Ordinary,
    Urgent,
    Immediate,
}

impl TransferType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferType::Ordinary => "ORDINARY",
            TransferType::Urgent => "URGENT",
            TransferType::Immediate => "IMMEDIATE",
        }
    }
}

impl FromStr for TransferType {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ORDINARY" => Ok(TransferType::Ordinary),
            "URGENT" => Ok(TransferType::Urgent),
            "IMMEDIATE" => Ok(TransferType::Immediate),
            _ => Err(MoneyError::invalid(
                "transfer_type must be ORDINARY, URGENT, or IMMEDIATE",
            )),
        }
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw, unvalidated transfer fields. Missing keys deserialize as null.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct TransferDetails {
    pub transfer_type: Value,
    pub transfer_concept: Value,
    pub transfer_date: Value,
    pub transfer_amount: Value,
}

impl TransferDetails {
    pub fn new(
        transfer_type: impl Into<Value>,
        transfer_concept: impl Into<Value>,
        transfer_date: impl Into<Value>,
        transfer_amount: impl Into<Value>,
    ) -> Self {
        TransferDetails {
            transfer_type: transfer_type.into(),
            transfer_concept: transfer_concept.into(),
            transfer_date: transfer_date.into(),
            transfer_amount: transfer_amount.into(),
        }
    }
}

/// A validated transfer between two accounts.
///
/// Like deposits, transfers are immutable once built and derive their
/// transfer code on every access.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    from_iban: String,
    to_iban: String,
    transfer_type: TransferType,
    transfer_concept: String,
    transfer_date: String,
    transfer_amount: f64,
    time_stamp: f64,
}

// Field order and key names here are the canonical text hashed into the
// transfer code. Changing either changes every code.
#[derive(Serialize)]
struct CodeFields<'a> {
    #[serde(rename = "_TransferRequest__from_iban")]
    from_iban: &'a str,
    #[serde(rename = "_TransferRequest__to_iban")]
    to_iban: &'a str,
    #[serde(rename = "_TransferRequest__transfer_type")]
    transfer_type: TransferType,
    #[serde(rename = "_TransferRequest__transfer_concept")]
    transfer_concept: &'a str,
    #[serde(rename = "_TransferRequest__transfer_date")]
    transfer_date: &'a str,
    #[serde(rename = "_TransferRequest__transfer_amount")]
    transfer_amount: f64,
    #[serde(rename = "_TransferRequest__time_stamp")]
    time_stamp: f64,
}

/// Single-line JSON with `", "` and `": "` separators and every non-ASCII
/// character written as a `\uXXXX` escape (UTF-16 units).
struct CodeFormatter;

impl Formatter for CodeFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            return Ok(());
        }
        writer.write_all(b", ")
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            return Ok(());
        }
        writer.write_all(b", ")
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct TransferJson<'a> {
    from_iban: &'a str,
    to_iban: &'a str,
    transfer_type: TransferType,
    transfer_amount: f64,
    transfer_concept: &'a str,
    transfer_date: &'a str,
    time_stamp: f64,
    transfer_code: String,
}

impl TransferRequest {
    pub fn new(
        from_iban: impl Into<Value>,
        to_iban: impl Into<Value>,
        details: &TransferDetails,
    ) -> Result<Self> {
        Self::new_at(from_iban, to_iban, details, utc_timestamp())
    }

    /// Validates in order: source IBAN, destination IBAN, type, concept,
    /// date, amount. The first failure is returned.
    pub fn new_at(
        from_iban: impl Into<Value>,
        to_iban: impl Into<Value>,
        details: &TransferDetails,
        time_stamp: f64,
    ) -> Result<Self> {
        let from_iban = require_iban(&from_iban.into(), "from_iban")?;
        let to_iban = require_iban(&to_iban.into(), "to_iban")?;
        let transfer_type = validate_transfer_type(&details.transfer_type)?;
        let transfer_concept = validate_concept(&details.transfer_concept)?;
        let transfer_date = validate_transfer_date(&details.transfer_date)?;
        let transfer_amount = validate_amount(&details.transfer_amount, "transfer_amount")?;
        if !time_stamp.is_finite() {
            return Err(MoneyError::invalid("time_stamp must be a finite number."));
        }

        Ok(TransferRequest {
            from_iban,
            to_iban,
            transfer_type,
            transfer_concept,
            transfer_date,
            transfer_amount,
            time_stamp,
        })
    }

    pub fn from_iban(&self) -> &str {
        &self.from_iban
    }

    pub fn to_iban(&self) -> &str {
        &self.to_iban
    }

    pub fn transfer_type(&self) -> TransferType {
        self.transfer_type
    }

    /// The concept exactly as given, surrounding whitespace included.
    pub fn transfer_concept(&self) -> &str {
        &self.transfer_concept
    }

    pub fn transfer_date(&self) -> &str {
        &self.transfer_date
    }

    pub fn transfer_amount(&self) -> f64 {
        self.transfer_amount
    }

    pub fn time_stamp(&self) -> f64 {
        self.time_stamp
    }

    fn code_fields(&self) -> CodeFields<'_> {
        CodeFields {
            from_iban: &self.from_iban,
            to_iban: &self.to_iban,
            transfer_type: self.transfer_type,
            transfer_concept: &self.transfer_concept,
            transfer_date: &self.transfer_date,
            transfer_amount: self.transfer_amount,
            time_stamp: self.time_stamp,
        }
    }

    /// Lowercase hex MD5 of the `Transfer:` text (32 characters).
    pub fn transfer_code(&self) -> String {
        hex::encode(Md5::digest(self.to_string().as_bytes()))
    }
}

impl fmt::Display for TransferRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, CodeFormatter);
        self.code_fields().serialize(&mut ser).map_err(|_| fmt::Error)?;
        let fields = String::from_utf8(buf).map_err(|_| fmt::Error)?;
        write!(f, "Transfer:{fields}")
    }
}

impl StoredRecord for TransferRequest {
    const KIND: &'static str = "transfer";
    const DUPLICATE_MESSAGE: &'static str = "Duplicate transfer detected.";

    fn to_json(&self) -> serde_json::Result<Value> {
        let view = TransferJson {
            from_iban: &self.from_iban,
            to_iban: &self.to_iban,
            transfer_type: self.transfer_type,
            transfer_amount: self.transfer_amount,
            transfer_concept: &self.transfer_concept,
            transfer_date: &self.transfer_date,
            time_stamp: self.time_stamp,
            transfer_code: self.transfer_code(),
        };
        serde_json::to_value(view)
    }
}

fn validate_transfer_type(value: &Value) -> Result<TransferType> {
    let Some(text) = value.as_str() else {
        return Err(MoneyError::invalid("transfer_type must be a string."));
    };
    text.parse()
}

/// Two alphabetic words separated by a single space, 10 to 30 characters
/// once surrounding whitespace is trimmed.
fn validate_concept(value: &Value) -> Result<String> {
    let Some(text) = value.as_str() else {
        return Err(MoneyError::invalid("transfer_concept must be a string."));
    };
    let concept = text.trim();

    let words: Vec<&str> = concept.split(' ').collect();
    if words.len() != 2 {
        return Err(MoneyError::invalid(
            "transfer_concept must contain exactly two words.",
        ));
    }
    if !words
        .iter()
        .all(|w| !w.is_empty() && w.chars().all(char::is_alphabetic))
    {
        return Err(MoneyError::invalid(
            "transfer_concept must contain only letters.",
        ));
    }

    let length = concept.chars().count();
    if !(MIN_CONCEPT_LENGTH..=MAX_CONCEPT_LENGTH).contains(&length) {
        return Err(MoneyError::invalid(
            "transfer_concept must be 10 to 30 characters long.",
        ));
    }

    Ok(text.to_owned())
}

/// DD/MM/YYYY with each component range-checked on its own. Day and month
/// are not checked against each other, so 31/02/2025 is accepted.
fn validate_transfer_date(value: &Value) -> Result<String> {
    let Some(text) = value.as_str() else {
        return Err(MoneyError::invalid("transfer_date must be a string."));
    };

    let format_error = || MoneyError::invalid("transfer_date must be in DD/MM/YYYY format.");
    let parts = text
        .split('/')
        .map(|part| part.trim().parse::<i64>().map_err(|_| format_error()))
        .collect::<Result<Vec<i64>>>()?;
    let &[day, month, year] = parts.as_slice() else {
        return Err(format_error());
    };

    if !(1..=31).contains(&day) {
        return Err(MoneyError::invalid("Day must be between 1 and 31."));
    }
    if !(1..=12).contains(&month) {
        return Err(MoneyError::invalid("Month must be between 1 and 12."));
    }
    if !(FIRST_TRANSFER_YEAR..LAST_TRANSFER_YEAR).contains(&year) {
        return Err(MoneyError::invalid("Year must be between 2025 and 2050."));
    }

    Ok(text.to_owned())
}
