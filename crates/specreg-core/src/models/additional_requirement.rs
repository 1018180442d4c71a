//! Additional requirement domain model.
//!
//! Naturally keyed by `(specification_id, business_term_id)` — at most
//! one additional requirement per business term per specification.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdditionalRequirement {
    pub specification_id: Uuid,
    pub business_term_id: String,
    pub business_term_name: String,
    pub level: String,
    pub cardinality: String,
    /// Row position for ordered display.
    pub row_pos: i16,
    pub semantic_description: Option<String>,
    pub usage_note: Option<String>,
    pub data_type: Option<String>,
    pub business_rules: Option<String>,
    pub type_of_change: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAdditionalRequirement {
    pub specification_id: Uuid,
    pub business_term_id: String,
    pub business_term_name: String,
    pub level: String,
    pub cardinality: String,
    pub row_pos: i16,
    pub semantic_description: Option<String>,
    pub usage_note: Option<String>,
    pub data_type: Option<String>,
    pub business_rules: Option<String>,
    pub type_of_change: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAdditionalRequirement {
    pub business_term_name: Option<String>,
    pub level: Option<String>,
    pub cardinality: Option<String>,
    pub row_pos: Option<i16>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub semantic_description: Option<Option<String>>,
    pub usage_note: Option<Option<String>>,
    pub data_type: Option<Option<String>>,
    pub business_rules: Option<Option<String>>,
    pub type_of_change: Option<String>,
}
