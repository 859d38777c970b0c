//! Field normalization shared by every entity.
//!
//! # Invariants
//! - Required text fields are trimmed with inner whitespace runs collapsed;
//!   a blank result is rejected.
//! - Optional text fields normalize blank input to `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Input validation failures detected before any storage access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is missing or blank after trim.
    BlankField(&'static str),
    /// Patch request carries no field to change.
    EmptyPatch(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::EmptyPatch(entity) => write!(f, "no inputs passed for {entity} update"),
        }
    }
}

impl Error for ValidationError {}

/// Normalizes one required single-line text field.
pub fn normalize_required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let collapsed = WHITESPACE_RE.replace_all(value.trim(), " ");
    if collapsed.is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(collapsed.into_owned())
}

/// Normalizes one optional text field; blank input means absent.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{normalize_optional, normalize_required, ValidationError};

    #[test]
    fn required_field_collapses_whitespace() {
        assert_eq!(
            normalize_required("name", "  Long \t\n Sword ").unwrap(),
            "Long Sword"
        );
    }

    #[test]
    fn required_field_rejects_blank() {
        assert_eq!(
            normalize_required("name", " \n ").unwrap_err(),
            ValidationError::BlankField("name")
        );
    }

    #[test]
    fn optional_field_drops_blank_values() {
        assert_eq!(normalize_optional(Some("   ".to_string())), None);
        assert_eq!(normalize_optional(None), None);
        assert_eq!(
            normalize_optional(Some(" https://wiki ".to_string())).as_deref(),
            Some("https://wiki")
        );
    }
}
