//! Error types for the product store.

use crate::types::{FieldValue, ProductId};
use thiserror::Error;

/// Main error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Product not found: {0}")]
    NotFound(ProductId),

    #[error("Product code already exists: {0}")]
    DuplicateCode(FieldValue),

    #[error("Invalid value for field `{field}`: expected {expected}")]
    Validation {
        field: String,
        expected: &'static str,
    },

    #[error("Field cannot be changed: {0}")]
    ImmutableField(String),

    #[error("No product ids left to assign")]
    IdsExhausted,

    #[error("Failed to persist products: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
