//! Structural input errors
//!
//! Everything else (I/O, CSV parsing, JSON syntax) surfaces as the underlying
//! library error wrapped in `anyhow` context.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("{context}: missing expected column '{column}'. Available columns: {available:?}")]
    MissingColumn {
        context: String,
        column: String,
        available: Vec<String>,
    },

    #[error("{context}: column '{column}' has values that are not {expected}")]
    WrongType {
        context: String,
        column: String,
        expected: &'static str,
    },

    #[error("{context}: geometry collection must be a JSON object")]
    NotAnObject { context: String },

    #[error("{context}: 'features' must be an array")]
    FeaturesNotArray { context: String },
}
