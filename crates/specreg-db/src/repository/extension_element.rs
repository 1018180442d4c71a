//! SurrealDB implementation of the extension element repository.

use specreg_core::error::RegistryResult;
use specreg_core::models::extension_element::{
    CreateExtensionElement, ExtensionElement, UpdateExtensionElement,
};
use specreg_core::repository::{ExtensionElementRepository, PageParams, PagedResult};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct ExtensionElementRow {
    specification_id: String,
    extension_component_id: String,
    business_term_id: String,
    cardinality: String,
    usage_note: Option<String>,
    justification: Option<String>,
    type_of_extension: String,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct ExtensionElementRowWithId {
    record_id: String,
    specification_id: String,
    extension_component_id: String,
    business_term_id: String,
    cardinality: String,
    usage_note: Option<String>,
    justification: Option<String>,
    type_of_extension: String,
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

impl ExtensionElementRow {
    fn into_extension_element(self, id: Uuid) -> Result<ExtensionElement, DbError> {
        Ok(ExtensionElement {
            id,
            specification_id: parse_uuid(&self.specification_id, "specification")?,
            extension_component_id: self.extension_component_id,
            business_term_id: self.business_term_id,
            cardinality: self.cardinality,
            usage_note: self.usage_note,
            justification: self.justification,
            type_of_extension: self.type_of_extension,
        })
    }
}

impl ExtensionElementRowWithId {
    fn try_into_extension_element(self) -> Result<ExtensionElement, DbError> {
        let id = parse_uuid(&self.record_id, "extension element")?;
        Ok(ExtensionElement {
            id,
            specification_id: parse_uuid(&self.specification_id, "specification")?,
            extension_component_id: self.extension_component_id,
            business_term_id: self.business_term_id,
            cardinality: self.cardinality,
            usage_note: self.usage_note,
            justification: self.justification,
            type_of_extension: self.type_of_extension,
        })
    }
}

/// SurrealDB implementation of the extension element repository.
#[derive(Clone)]
pub struct SurrealExtensionElementRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealExtensionElementRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ExtensionElementRepository for SurrealExtensionElementRepository<C> {
    async fn create(&self, input: CreateExtensionElement) -> RegistryResult<ExtensionElement> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('specification_extension_element', $id) SET \
                 specification_id = $specification_id, \
                 extension_component_id = $extension_component_id, \
                 business_term_id = $business_term_id, \
                 cardinality = $cardinality, \
                 usage_note = $usage_note, \
                 justification = $justification, \
                 type_of_extension = $type_of_extension",
            )
            .bind(("id", id_str.clone()))
            .bind(("specification_id", input.specification_id.to_string()))
            .bind(("extension_component_id", input.extension_component_id))
            .bind(("business_term_id", input.business_term_id))
            .bind(("cardinality", input.cardinality))
            .bind(("usage_note", input.usage_note))
            .bind(("justification", input.justification))
            .bind(("type_of_extension", input.type_of_extension))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::classify)?;
        let rows: Vec<ExtensionElementRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "extension element".into(),
            id: id_str,
        })?;

        Ok(row.into_extension_element(id)?)
    }

    async fn get_by_id_and_specification(
        &self,
        id: Uuid,
        specification_id: Uuid,
    ) -> RegistryResult<ExtensionElement> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('specification_extension_element', $id) \
                 WHERE specification_id = $specification_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("specification_id", specification_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ExtensionElementRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "extension element".into(),
            id: id_str,
        })?;

        Ok(row.try_into_extension_element()?)
    }

    async fn update(
        &self,
        id: Uuid,
        specification_id: Uuid,
        input: UpdateExtensionElement,
    ) -> RegistryResult<ExtensionElement> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.extension_component_id.is_some() {
            sets.push("extension_component_id = $extension_component_id");
        }
        if input.business_term_id.is_some() {
            sets.push("business_term_id = $business_term_id");
        }
        if input.cardinality.is_some() {
            sets.push("cardinality = $cardinality");
        }
        if input.usage_note.is_some() {
            sets.push("usage_note = $usage_note");
        }
        if input.justification.is_some() {
            sets.push("justification = $justification");
        }
        if input.type_of_extension.is_some() {
            sets.push("type_of_extension = $type_of_extension");
        }

        let query = format!(
            "UPDATE type::record('specification_extension_element', $id) SET {} \
             WHERE specification_id = $specification_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("specification_id", specification_id.to_string()));

        if let Some(value) = input.extension_component_id {
            builder = builder.bind(("extension_component_id", value));
        }
        if let Some(value) = input.business_term_id {
            builder = builder.bind(("business_term_id", value));
        }
        if let Some(value) = input.cardinality {
            builder = builder.bind(("cardinality", value));
        }
        if let Some(value) = input.usage_note {
            builder = builder.bind(("usage_note", value));
        }
        if let Some(value) = input.justification {
            builder = builder.bind(("justification", value));
        }
        if let Some(value) = input.type_of_extension {
            builder = builder.bind(("type_of_extension", value));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::classify)?;

        let rows: Vec<ExtensionElementRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "extension element".into(),
            id: id_str,
        })?;

        Ok(row.into_extension_element(id)?)
    }

    async fn delete(&self, id: Uuid, specification_id: Uuid) -> RegistryResult<()> {
        self.db
            .query(
                "DELETE type::record('specification_extension_element', $id) \
                 WHERE specification_id = $specification_id",
            )
            .bind(("id", id.to_string()))
            .bind(("specification_id", specification_id.to_string()))
            .await
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn list_by_specification(
        &self,
        specification_id: Uuid,
    ) -> RegistryResult<Vec<ExtensionElement>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM specification_extension_element \
                 WHERE specification_id = $specification_id \
                 ORDER BY extension_component_id ASC, business_term_id ASC",
            )
            .bind(("specification_id", specification_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ExtensionElementRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(ExtensionElementRowWithId::try_into_extension_element)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }

    async fn list_by_specification_paginated(
        &self,
        specification_id: Uuid,
        page: PageParams,
    ) -> RegistryResult<PagedResult<ExtensionElement>> {
        let spec_id = specification_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM specification_extension_element \
                 WHERE specification_id = $specification_id GROUP ALL",
            )
            .bind(("specification_id", spec_id.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM specification_extension_element \
                 WHERE specification_id = $specification_id \
                 ORDER BY extension_component_id ASC, business_term_id ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("specification_id", spec_id))
            .bind(("limit", u64::from(page.page_size())))
            .bind(("offset", page.offset()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ExtensionElementRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(ExtensionElementRowWithId::try_into_extension_element)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PagedResult::new(items, total, page))
    }

    async fn extension_element_exists(
        &self,
        extension_component_id: &str,
        business_term_id: &str,
    ) -> RegistryResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM extension_component_element \
                 WHERE extension_component_id = $extension_component_id \
                 AND business_term_id = $business_term_id GROUP ALL",
            )
            .bind(("extension_component_id", extension_component_id.to_owned()))
            .bind(("business_term_id", business_term_id.to_owned()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }
}
