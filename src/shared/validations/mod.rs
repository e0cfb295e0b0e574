//! Parsing helpers for loosely-typed request parameters

use crate::shared::types::DomainError;

/// Trim a free-text parameter; blank strings count as absent.
pub fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

pub fn parse_bool_param(key: &str, value: &str) -> Result<Option<bool>, DomainError> {
    match value.trim().to_lowercase().as_str() {
        "" => Ok(None),
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        other => Err(DomainError::Validation(format!(
            "{}: expected a boolean, got '{}'",
            key, other
        ))),
    }
}

pub fn parse_u8_param(key: &str, value: &str) -> Result<Option<u8>, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value.parse::<u8>().map(Some).map_err(|_| {
        DomainError::Validation(format!("{}: expected an integer, got '{}'", key, value))
    })
}
