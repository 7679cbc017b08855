//! Error types for the Bastion system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BastionError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),
}

impl From<serde_json::Error> for BastionError {
    fn from(err: serde_json::Error) -> Self {
        BastionError::Serialization(err.to_string())
    }
}

pub type BastionResult<T> = Result<T, BastionError>;
