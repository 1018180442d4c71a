//! Extension element domain model.
//!
//! An extension element links a specification to a composite-keyed entry
//! of the Extension Component Model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionElement {
    pub id: Uuid,
    pub specification_id: Uuid,
    /// Together with `business_term_id`, references an existing
    /// extension component model element.
    pub extension_component_id: String,
    pub business_term_id: String,
    pub cardinality: String,
    pub usage_note: Option<String>,
    pub justification: Option<String>,
    pub type_of_extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExtensionElement {
    pub specification_id: Uuid,
    pub extension_component_id: String,
    pub business_term_id: String,
    pub cardinality: String,
    pub usage_note: Option<String>,
    pub justification: Option<String>,
    pub type_of_extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateExtensionElement {
    pub extension_component_id: Option<String>,
    pub business_term_id: Option<String>,
    pub cardinality: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub usage_note: Option<Option<String>>,
    pub justification: Option<Option<String>>,
    pub type_of_extension: Option<String>,
}
