//! Error types for the specification registry.
//!
//! Service operations return a closed set of outcome codes consumed by
//! the presentation layer; each code is a variant here. Business-rule
//! violations are always converted into one of these variants at the
//! service boundary — only genuinely unexpected storage failures travel
//! as [`RegistryError::Database`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The primary target of the operation does not exist (or does not
    /// exist under the given parent).
    #[error("entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// The primary target exists but a referenced entity in another
    /// collection (shared model element, user group) does not.
    #[error("referenced entity not found: {entity} with id {id}")]
    RefNotFound { entity: String, id: String },

    /// A uniqueness or referential-integrity rule would be violated.
    #[error("conflict: {reason}")]
    Conflict { reason: String },

    /// Generic validation or persistence-save failure with no more
    /// specific code.
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// Caller identity/context is missing or unusable.
    #[error("missing or unusable caller context")]
    Unauthorized,

    /// Caller is identified but lacks permission for this resource.
    #[error("forbidden: {reason}")]
    Forbidden { reason: String },

    /// Delete-specific terminal code: persistence failed after all
    /// business checks passed.
    #[error("delete failed: {entity} with id {id}")]
    DeleteFailed { entity: String, id: String },

    #[error("database error: {0}")]
    Database(String),
}

impl RegistryError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn ref_not_found(entity: &str, id: impl ToString) -> Self {
        Self::RefNotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
