//! Validation error types

use std::fmt;

/// Validation error for request payloads.
///
/// Raised before any statement reaches the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is missing or empty
    Required { field: &'static str },

    /// Update payload carries no field besides the identifier
    NothingToUpdate,

    /// One half of a paired field was supplied without the other
    Unpaired {
        present: &'static str,
        missing: &'static str,
    },

    /// String doesn't match required format
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Value outside a fixed set of accepted variants
    InvalidVariant { field: &'static str, value: String },

    /// Attribute not present in the table's column list
    UnknownColumn { table: String, column: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required { field } => write!(f, "{} is required", field),
            Self::NothingToUpdate => {
                write!(f, "at least one field must be provided for an update")
            }
            Self::Unpaired { present, missing } => write!(
                f,
                "{} and {} must be updated together ({} supplied without {})",
                present, missing, present, missing
            ),
            Self::InvalidFormat { field, reason } => write!(f, "{}: {}", field, reason),
            Self::InvalidVariant { field, value } => {
                write!(f, "invalid {} value: '{}'", field, value)
            }
            Self::UnknownColumn { table, column } => {
                write!(f, "table {} has no column '{}'", table, column)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Normalize an optional text field: blank input counts as absent.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Require a text field, treating blank input as missing.
pub(crate) fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    present(value).ok_or(ValidationError::Required { field })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::Unpaired {
            present: "postalCode",
            missing: "country",
        };
        assert_eq!(
            err.to_string(),
            "postalCode and country must be updated together (postalCode supplied without country)"
        );
    }

    #[test]
    fn blank_counts_as_absent() {
        assert_eq!(present(Some("   ".into())), None);
        assert_eq!(present(Some(" CA".into())), Some(" CA".into()));
        assert_eq!(
            required(Some(String::new()), "name"),
            Err(ValidationError::Required { field: "name" })
        );
    }
}
