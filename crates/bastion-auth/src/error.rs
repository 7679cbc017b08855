//! Authentication error types.

use bastion_core::error::BastionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is locked")]
    AccountLocked,

    #[error("account is inactive")]
    AccountInactive,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for BastionError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::AccountLocked
            | AuthError::AccountInactive => BastionError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::PasswordTooShort { .. } => BastionError::Validation {
                message: err.to_string(),
            },
            AuthError::Crypto(msg) => BastionError::Crypto(msg),
        }
    }
}
