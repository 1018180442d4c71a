//! Core Invoice Model reference data.
//!
//! Read-only shared table; core elements of every specification point
//! into it by business-term ID. Restrict-on-delete while referenced.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreInvoiceModelEntry {
    /// Business-term ID, e.g. `"BT-1"` — the natural key.
    pub business_term_id: String,
    pub business_term: String,
    pub level: String,
    pub cardinality: String,
    /// Row position for ordered display.
    pub row_pos: i16,
    pub semantic_description: Option<String>,
    pub data_type: Option<String>,
    pub parent_id: Option<String>,
}
