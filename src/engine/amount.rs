use serde_json::Value;
use thiserror::Error;

use crate::error::{MoneyError, Result};

pub const MIN_AMOUNT: f64 = 10.00;
pub const MAX_AMOUNT: f64 = 10_000.00;
pub const MAX_DECIMAL_PLACES: usize = 2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmountError {
    #[error("Amount parsing error: {0}")]
    Parse(String),

    #[error("Amount is missing or not text")]
    NotText,
}

/// Checks a monetary amount taken from a request.
///
/// Only JSON floats are accepted: integers and strings holding a number are
/// rejected even when numerically equal. The value must lie in
/// [10.00, 10000.00] and its shortest decimal form may carry at most two
/// digits after the point, so `100.1` passes and `100.123` does not.
pub fn validate_amount(value: &Value, field: &str) -> Result<f64> {
    let amount = match value {
        Value::Number(n) if n.is_f64() => n.as_f64(),
        _ => None,
    };
    let Some(amount) = amount else {
        return Err(MoneyError::invalid(format!("{field} must be a float.")));
    };

    if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&amount) {
        return Err(MoneyError::invalid(format!(
            "{field} must be between 10.00 and 10000.00."
        )));
    }

    if decimal_places(amount) > MAX_DECIMAL_PLACES {
        return Err(MoneyError::invalid(format!(
            "{field} must have at most {MAX_DECIMAL_PLACES} decimal places."
        )));
    }

    Ok(amount)
}

// `Display` for f64 is the shortest string that reads back to the same value
// and never uses exponent notation.
fn decimal_places(amount: f64) -> usize {
    let text = amount.to_string();
    match text.split_once('.') {
        Some((_, fraction)) => fraction.len(),
        None => 0,
    }
}

/// Parses an amount as written in the transaction log: spaces are dropped
/// and a comma is read as the decimal point ("1 200,50" -> 1200.5).
pub fn parse_log_amount(value: Option<&Value>) -> std::result::Result<f64, AmountError> {
    let text = match value {
        Some(Value::String(text)) => text,
        _ => Err(AmountError::NotText)?,
    };

    let cleaned: String = text
        .chars()
        .filter(|c| *c != ' ')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    cleaned
        .parse::<f64>()
        .map_err(|_| AmountError::Parse(text.clone()))
}
