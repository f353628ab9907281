use serde_json::Value;

use crate::error::{MoneyError, Result};

pub const IBAN_LENGTH: usize = 24;
pub const IBAN_PREFIX: &str = "ES";

/// Soft check: true iff `value` is a 24 character string starting with "ES".
/// No checksum is verified.
pub fn validate_iban(value: &Value) -> bool {
    match value.as_str() {
        Some(iban) => iban.starts_with(IBAN_PREFIX) && iban.chars().count() == IBAN_LENGTH,
        None => false,
    }
}

/// Hard check used while building a record. The first violated rule wins:
/// type, then length, then prefix.
pub fn require_iban(value: &Value, field: &str) -> Result<String> {
    let Some(iban) = value.as_str() else {
        return Err(MoneyError::invalid(format!("{field} must be a string.")));
    };
    if iban.chars().count() != IBAN_LENGTH {
        return Err(MoneyError::invalid(format!(
            "{field} must be exactly {IBAN_LENGTH} characters."
        )));
    }
    if !iban.starts_with(IBAN_PREFIX) {
        return Err(MoneyError::invalid(format!(
            "{field} must start with '{IBAN_PREFIX}'."
        )));
    }
    Ok(iban.to_owned())
}
