//! Authentication error types.

use specreg_core::error::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("password policy violation: {0}")]
    PasswordPolicy(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for RegistryError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => RegistryError::Unauthorized,
            AuthError::PasswordPolicy(message) => RegistryError::BadRequest { message },
            AuthError::Crypto(msg) => RegistryError::Database(msg),
        }
    }
}
