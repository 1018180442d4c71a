//! Extension Component Model reference data.
//!
//! Components group elements; an element is uniquely identified by the
//! composite `(extension_component_id, business_term_id)`, which is the
//! reference extension elements of a specification must match.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionComponent {
    /// Component ID, e.g. `"XG-1"` — the natural key.
    pub extension_component_id: String,
    pub extension_component_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionComponentElement {
    pub extension_component_id: String,
    pub business_term_id: String,
    pub business_term: String,
    pub level: Option<String>,
    pub cardinality: Option<String>,
    pub semantic_description: Option<String>,
    pub data_type: Option<String>,
    pub extension_type: Option<String>,
    pub parent_id: Option<String>,
}
