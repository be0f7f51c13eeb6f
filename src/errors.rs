//! Unified error type for the maintenance cost engine.
//!
//! Classification and aggregation never fail; errors come from the store,
//! from configuration, or from records rejected at the ingestion boundary.

use rust_decimal::Decimal;
use thiserror::Error;

/// All errors surfaced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or value could not be used
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The relational store failed; no partial data is returned
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A monetary invariant does not hold on an incoming record
    #[error("Validation error on {field}: expected {expected}, got {actual}")]
    Validation {
        /// Field that failed the check (e.g. `invoice.net_value`)
        field: String,
        /// Value recomputed from the record's inputs
        expected: Decimal,
        /// Value supplied by the caller
        actual: Decimal,
    },

    /// Input rejected before it reached the store
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the rejected input
        message: String,
    },

    /// A referenced row does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of row (e.g. "maintenance")
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// I/O failure (reading config)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing or malformed
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for an [`Error::InvalidInput`] with the given message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message_names_field() {
        let err = Error::Validation {
            field: "invoice.net_value".to_string(),
            expected: Decimal::new(9000, 2),
            actual: Decimal::new(9500, 2),
        };
        assert_eq!(
            err.to_string(),
            "Validation error on invoice.net_value: expected 90.00, got 95.00"
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = Error::NotFound {
            entity: "maintenance",
            id: "42".to_string(),
        };
        assert_eq!(err.to_string(), "maintenance not found: 42");
    }
}
