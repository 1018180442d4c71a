//! SurrealDB implementation of the Extension Component Model repository.
//!
//! Reference data: component record IDs are the component IDs
//! themselves; elements carry the composite
//! `(extension_component_id, business_term_id)` guarded by a unique
//! index.

use specreg_core::error::RegistryResult;
use specreg_core::models::extension_model::{ExtensionComponent, ExtensionComponentElement};
use specreg_core::repository::ExtensionModelRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ExtensionComponentRow {
    record_id: String,
    extension_component_name: String,
    description: Option<String>,
}

#[derive(Debug, SurrealValue)]
struct ExtensionComponentElementRow {
    extension_component_id: String,
    business_term_id: String,
    business_term: String,
    level: Option<String>,
    cardinality: Option<String>,
    semantic_description: Option<String>,
    data_type: Option<String>,
    extension_type: Option<String>,
    parent_id: Option<String>,
}

impl From<ExtensionComponentRow> for ExtensionComponent {
    fn from(row: ExtensionComponentRow) -> Self {
        ExtensionComponent {
            extension_component_id: row.record_id,
            extension_component_name: row.extension_component_name,
            description: row.description,
        }
    }
}

impl From<ExtensionComponentElementRow> for ExtensionComponentElement {
    fn from(row: ExtensionComponentElementRow) -> Self {
        ExtensionComponentElement {
            extension_component_id: row.extension_component_id,
            business_term_id: row.business_term_id,
            business_term: row.business_term,
            level: row.level,
            cardinality: row.cardinality,
            semantic_description: row.semantic_description,
            data_type: row.data_type,
            extension_type: row.extension_type,
            parent_id: row.parent_id,
        }
    }
}

/// SurrealDB implementation of the Extension Component Model repository.
#[derive(Clone)]
pub struct SurrealExtensionModelRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealExtensionModelRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ExtensionModelRepository for SurrealExtensionModelRepository<C> {
    async fn list_components(&self) -> RegistryResult<Vec<ExtensionComponent>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM extension_component \
                 ORDER BY record_id ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ExtensionComponentRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(ExtensionComponent::from).collect())
    }

    async fn list_elements(
        &self,
        extension_component_id: &str,
    ) -> RegistryResult<Vec<ExtensionComponentElement>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM extension_component_element \
                 WHERE extension_component_id = $extension_component_id \
                 ORDER BY business_term_id ASC",
            )
            .bind(("extension_component_id", extension_component_id.to_owned()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ExtensionComponentElementRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(ExtensionComponentElement::from)
            .collect())
    }
}
