//! Core element domain model.
//!
//! A core element links a specification to an entry of the shared Core
//! Invoice Model reference table and records how the specification uses
//! that business term.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreElement {
    pub id: Uuid,
    pub specification_id: Uuid,
    /// References an existing Core Invoice Model entry.
    pub business_term_id: String,
    pub cardinality: String,
    pub usage_note: Option<String>,
    pub type_of_change: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCoreElement {
    pub specification_id: Uuid,
    pub business_term_id: String,
    pub cardinality: String,
    pub usage_note: Option<String>,
    pub type_of_change: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCoreElement {
    pub business_term_id: Option<String>,
    pub cardinality: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub usage_note: Option<Option<String>>,
    pub type_of_change: Option<String>,
}
