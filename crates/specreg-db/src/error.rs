//! Database-specific error types and conversions.

use specreg_core::error::RegistryError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Row decode failed: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Constraint violated: {0}")]
    Conflict(String),
}

impl DbError {
    /// Classify a SurrealDB error, surfacing uniqueness violations
    /// (duplicate record ID or unique index hit) as [`DbError::Conflict`].
    pub(crate) fn classify(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        if msg.contains("already exists") || msg.contains("already contains") {
            DbError::Conflict(msg)
        } else {
            DbError::Surreal(err)
        }
    }
}

impl From<DbError> for RegistryError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => RegistryError::NotFound { entity, id },
            DbError::Conflict(reason) => RegistryError::Conflict { reason },
            other => RegistryError::Database(other.to_string()),
        }
    }
}
