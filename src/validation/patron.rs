//! Patron identifier and contact field rules

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};

/// `1MS` + admission year + department code + roll number
static PATRON_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^1MS([0-9]{2})(EC|CS|ME|EE|CE|IM|CH|MD|IS|BT|IE|EI|ET|AI|AD|CY|CA)[0-9]{3}$")
        .expect("patron id pattern is valid")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern is valid"));

/// Validate a patron id against the given calendar year and return it trimmed.
///
/// The embedded two-digit admission year may not be later than the last two
/// digits of `current_year`.
pub fn validate_patron_id(raw: &str, current_year: i32) -> AppResult<String> {
    let value = raw.trim();
    let captures = PATRON_ID_RE
        .captures(value)
        .ok_or_else(|| AppError::Validation("Invalid patron_id format".to_string()))?;

    let admission_year: i32 = captures[1]
        .parse()
        .map_err(|_| AppError::Validation("Invalid patron_id format".to_string()))?;
    if admission_year > current_year % 100 {
        return Err(AppError::Validation("Invalid year of admission".to_string()));
    }

    Ok(value.to_string())
}

/// Validate a 10-digit phone number and return it trimmed.
pub fn validate_phone(raw: &str) -> AppResult<String> {
    let value = raw.trim();
    if !PHONE_RE.is_match(value) {
        return Err(AppError::Validation("Invalid patron_phone format".to_string()));
    }
    Ok(value.to_string())
}
