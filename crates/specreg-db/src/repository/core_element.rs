//! SurrealDB implementation of the core element repository.
//!
//! Lists are ordered by the referenced Core Invoice Model entry's row
//! position (then element ID), resolved with a correlated subquery so
//! the ordering happens before pagination.

use specreg_core::error::RegistryResult;
use specreg_core::models::core_element::{CoreElement, CreateCoreElement, UpdateCoreElement};
use specreg_core::repository::{CoreElementRepository, PageParams, PagedResult};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct CoreElementRow {
    specification_id: String,
    business_term_id: String,
    cardinality: String,
    usage_note: Option<String>,
    type_of_change: String,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct CoreElementRowWithId {
    record_id: String,
    specification_id: String,
    business_term_id: String,
    cardinality: String,
    usage_note: Option<String>,
    type_of_change: String,
}

/// Row struct for list queries that carry the referenced model entry's
/// row position for ordering.
#[derive(Debug, SurrealValue)]
struct CoreElementListRow {
    record_id: String,
    specification_id: String,
    business_term_id: String,
    cardinality: String,
    usage_note: Option<String>,
    type_of_change: String,
    #[allow(dead_code)]
    model_row_pos: Option<i64>,
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

impl CoreElementRow {
    fn into_core_element(self, id: Uuid) -> Result<CoreElement, DbError> {
        Ok(CoreElement {
            id,
            specification_id: parse_uuid(&self.specification_id, "specification")?,
            business_term_id: self.business_term_id,
            cardinality: self.cardinality,
            usage_note: self.usage_note,
            type_of_change: self.type_of_change,
        })
    }
}

impl CoreElementRowWithId {
    fn try_into_core_element(self) -> Result<CoreElement, DbError> {
        let id = parse_uuid(&self.record_id, "core element")?;
        Ok(CoreElement {
            id,
            specification_id: parse_uuid(&self.specification_id, "specification")?,
            business_term_id: self.business_term_id,
            cardinality: self.cardinality,
            usage_note: self.usage_note,
            type_of_change: self.type_of_change,
        })
    }
}

impl CoreElementListRow {
    fn try_into_core_element(self) -> Result<CoreElement, DbError> {
        let id = parse_uuid(&self.record_id, "core element")?;
        Ok(CoreElement {
            id,
            specification_id: parse_uuid(&self.specification_id, "specification")?,
            business_term_id: self.business_term_id,
            cardinality: self.cardinality,
            usage_note: self.usage_note,
            type_of_change: self.type_of_change,
        })
    }
}

const LIST_PROJECTION: &str = "\
SELECT meta::id(id) AS record_id, *, \
(SELECT VALUE row_pos FROM core_invoice_model \
 WHERE meta::id(id) = $parent.business_term_id)[0] AS model_row_pos \
FROM specification_core_element \
WHERE specification_id = $specification_id \
ORDER BY model_row_pos ASC, record_id ASC";

/// SurrealDB implementation of the core element repository.
#[derive(Clone)]
pub struct SurrealCoreElementRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCoreElementRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CoreElementRepository for SurrealCoreElementRepository<C> {
    async fn create(&self, input: CreateCoreElement) -> RegistryResult<CoreElement> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('specification_core_element', $id) SET \
                 specification_id = $specification_id, \
                 business_term_id = $business_term_id, \
                 cardinality = $cardinality, \
                 usage_note = $usage_note, \
                 type_of_change = $type_of_change",
            )
            .bind(("id", id_str.clone()))
            .bind(("specification_id", input.specification_id.to_string()))
            .bind(("business_term_id", input.business_term_id))
            .bind(("cardinality", input.cardinality))
            .bind(("usage_note", input.usage_note))
            .bind(("type_of_change", input.type_of_change))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::classify)?;
        let rows: Vec<CoreElementRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "core element".into(),
            id: id_str,
        })?;

        Ok(row.into_core_element(id)?)
    }

    async fn get_by_id_and_specification(
        &self,
        id: Uuid,
        specification_id: Uuid,
    ) -> RegistryResult<CoreElement> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('specification_core_element', $id) \
                 WHERE specification_id = $specification_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("specification_id", specification_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CoreElementRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "core element".into(),
            id: id_str,
        })?;

        Ok(row.try_into_core_element()?)
    }

    async fn update(
        &self,
        id: Uuid,
        specification_id: Uuid,
        input: UpdateCoreElement,
    ) -> RegistryResult<CoreElement> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.business_term_id.is_some() {
            sets.push("business_term_id = $business_term_id");
        }
        if input.cardinality.is_some() {
            sets.push("cardinality = $cardinality");
        }
        if input.usage_note.is_some() {
            sets.push("usage_note = $usage_note");
        }
        if input.type_of_change.is_some() {
            sets.push("type_of_change = $type_of_change");
        }

        let query = format!(
            "UPDATE type::record('specification_core_element', $id) SET {} \
             WHERE specification_id = $specification_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("specification_id", specification_id.to_string()));

        if let Some(value) = input.business_term_id {
            builder = builder.bind(("business_term_id", value));
        }
        if let Some(value) = input.cardinality {
            builder = builder.bind(("cardinality", value));
        }
        if let Some(value) = input.usage_note {
            builder = builder.bind(("usage_note", value));
        }
        if let Some(value) = input.type_of_change {
            builder = builder.bind(("type_of_change", value));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::classify)?;

        let rows: Vec<CoreElementRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "core element".into(),
            id: id_str,
        })?;

        Ok(row.into_core_element(id)?)
    }

    async fn delete(&self, id: Uuid, specification_id: Uuid) -> RegistryResult<()> {
        self.db
            .query(
                "DELETE type::record('specification_core_element', $id) \
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
    ) -> RegistryResult<Vec<CoreElement>> {
        let mut result = self
            .db
            .query(LIST_PROJECTION)
            .bind(("specification_id", specification_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CoreElementListRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(CoreElementListRow::try_into_core_element)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }

    async fn list_by_specification_paginated(
        &self,
        specification_id: Uuid,
        page: PageParams,
    ) -> RegistryResult<PagedResult<CoreElement>> {
        let spec_id = specification_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM specification_core_element \
                 WHERE specification_id = $specification_id GROUP ALL",
            )
            .bind(("specification_id", spec_id.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let sql = format!("{LIST_PROJECTION} LIMIT $limit START $offset");
        let mut result = self
            .db
            .query(&sql)
            .bind(("specification_id", spec_id))
            .bind(("limit", u64::from(page.page_size())))
            .bind(("offset", page.offset()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CoreElementListRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(CoreElementListRow::try_into_core_element)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PagedResult::new(items, total, page))
    }

    async fn core_invoice_model_exists(&self, business_term_id: &str) -> RegistryResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM core_invoice_model \
                 WHERE meta::id(id) = $business_term_id GROUP ALL",
            )
            .bind(("business_term_id", business_term_id.to_owned()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }
}
