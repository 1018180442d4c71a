//! SurrealDB implementation of the additional requirement repository.
//!
//! Additional requirements have no surrogate ID: the record ID is the
//! composite `<specification_id>/<business_term_id>`, making the
//! storage layer the source of truth for at-most-one-per-term
//! uniqueness.

use specreg_core::error::RegistryResult;
use specreg_core::models::additional_requirement::{
    AdditionalRequirement, CreateAdditionalRequirement, UpdateAdditionalRequirement,
};
use specreg_core::repository::AdditionalRequirementRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

fn record_key(specification_id: Uuid, business_term_id: &str) -> String {
    format!("{specification_id}/{business_term_id}")
}

/// DB-side row struct; the composite key fields are stored as regular
/// columns as well so list queries can filter and return them directly.
#[derive(Debug, SurrealValue)]
struct AdditionalRequirementRow {
    specification_id: String,
    business_term_id: String,
    business_term_name: String,
    level: String,
    cardinality: String,
    row_pos: i64,
    semantic_description: Option<String>,
    usage_note: Option<String>,
    data_type: Option<String>,
    business_rules: Option<String>,
    type_of_change: String,
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

impl AdditionalRequirementRow {
    fn try_into_requirement(self) -> Result<AdditionalRequirement, DbError> {
        let specification_id = Uuid::parse_str(&self.specification_id)
            .map_err(|e| DbError::Decode(format!("invalid specification UUID: {e}")))?;
        let row_pos = i16::try_from(self.row_pos)
            .map_err(|e| DbError::Decode(format!("row_pos out of range: {e}")))?;
        Ok(AdditionalRequirement {
            specification_id,
            business_term_id: self.business_term_id,
            business_term_name: self.business_term_name,
            level: self.level,
            cardinality: self.cardinality,
            row_pos,
            semantic_description: self.semantic_description,
            usage_note: self.usage_note,
            data_type: self.data_type,
            business_rules: self.business_rules,
            type_of_change: self.type_of_change,
        })
    }
}

/// SurrealDB implementation of the additional requirement repository.
#[derive(Clone)]
pub struct SurrealAdditionalRequirementRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAdditionalRequirementRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AdditionalRequirementRepository
    for SurrealAdditionalRequirementRepository<C>
{
    async fn create(
        &self,
        input: CreateAdditionalRequirement,
    ) -> RegistryResult<AdditionalRequirement> {
        let key = record_key(input.specification_id, &input.business_term_id);

        let result = self
            .db
            .query(
                "CREATE type::record('additional_requirement', $key) SET \
                 specification_id = $specification_id, \
                 business_term_id = $business_term_id, \
                 business_term_name = $business_term_name, \
                 level = $level, \
                 cardinality = $cardinality, \
                 row_pos = $row_pos, \
                 semantic_description = $semantic_description, \
                 usage_note = $usage_note, \
                 data_type = $data_type, \
                 business_rules = $business_rules, \
                 type_of_change = $type_of_change",
            )
            .bind(("key", key.clone()))
            .bind(("specification_id", input.specification_id.to_string()))
            .bind(("business_term_id", input.business_term_id))
            .bind(("business_term_name", input.business_term_name))
            .bind(("level", input.level))
            .bind(("cardinality", input.cardinality))
            .bind(("row_pos", i64::from(input.row_pos)))
            .bind(("semantic_description", input.semantic_description))
            .bind(("usage_note", input.usage_note))
            .bind(("data_type", input.data_type))
            .bind(("business_rules", input.business_rules))
            .bind(("type_of_change", input.type_of_change))
            .await
            .map_err(DbError::from)?;

        // A duplicate natural key makes the CREATE fail; classify maps
        // it to a conflict.
        let mut result = result.check().map_err(DbError::classify)?;
        let rows: Vec<AdditionalRequirementRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "additional requirement".into(),
            id: key,
        })?;

        Ok(row.try_into_requirement()?)
    }

    async fn get(
        &self,
        specification_id: Uuid,
        business_term_id: &str,
    ) -> RegistryResult<AdditionalRequirement> {
        let key = record_key(specification_id, business_term_id);

        let mut result = self
            .db
            .query("SELECT * FROM type::record('additional_requirement', $key)")
            .bind(("key", key.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdditionalRequirementRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "additional requirement".into(),
            id: key,
        })?;

        Ok(row.try_into_requirement()?)
    }

    async fn exists(
        &self,
        specification_id: Uuid,
        business_term_id: &str,
    ) -> RegistryResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM additional_requirement \
                 WHERE meta::id(id) = $key GROUP ALL",
            )
            .bind(("key", record_key(specification_id, business_term_id)))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }

    async fn update(
        &self,
        specification_id: Uuid,
        business_term_id: &str,
        input: UpdateAdditionalRequirement,
    ) -> RegistryResult<AdditionalRequirement> {
        let key = record_key(specification_id, business_term_id);

        let mut sets = Vec::new();
        if input.business_term_name.is_some() {
            sets.push("business_term_name = $business_term_name");
        }
        if input.level.is_some() {
            sets.push("level = $level");
        }
        if input.cardinality.is_some() {
            sets.push("cardinality = $cardinality");
        }
        if input.row_pos.is_some() {
            sets.push("row_pos = $row_pos");
        }
        if input.semantic_description.is_some() {
            sets.push("semantic_description = $semantic_description");
        }
        if input.usage_note.is_some() {
            sets.push("usage_note = $usage_note");
        }
        if input.data_type.is_some() {
            sets.push("data_type = $data_type");
        }
        if input.business_rules.is_some() {
            sets.push("business_rules = $business_rules");
        }
        if input.type_of_change.is_some() {
            sets.push("type_of_change = $type_of_change");
        }

        if sets.is_empty() {
            return self.get(specification_id, business_term_id).await;
        }

        let query = format!(
            "UPDATE type::record('additional_requirement', $key) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("key", key.clone()));

        if let Some(value) = input.business_term_name {
            builder = builder.bind(("business_term_name", value));
        }
        if let Some(value) = input.level {
            builder = builder.bind(("level", value));
        }
        if let Some(value) = input.cardinality {
            builder = builder.bind(("cardinality", value));
        }
        if let Some(value) = input.row_pos {
            builder = builder.bind(("row_pos", i64::from(value)));
        }
        if let Some(value) = input.semantic_description {
            builder = builder.bind(("semantic_description", value));
        }
        if let Some(value) = input.usage_note {
            builder = builder.bind(("usage_note", value));
        }
        if let Some(value) = input.data_type {
            builder = builder.bind(("data_type", value));
        }
        if let Some(value) = input.business_rules {
            builder = builder.bind(("business_rules", value));
        }
        if let Some(value) = input.type_of_change {
            builder = builder.bind(("type_of_change", value));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::classify)?;

        let rows: Vec<AdditionalRequirementRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "additional requirement".into(),
            id: key,
        })?;

        Ok(row.try_into_requirement()?)
    }

    async fn delete(
        &self,
        specification_id: Uuid,
        business_term_id: &str,
    ) -> RegistryResult<()> {
        self.db
            .query("DELETE type::record('additional_requirement', $key)")
            .bind(("key", record_key(specification_id, business_term_id)))
            .await
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn list_by_specification(
        &self,
        specification_id: Uuid,
    ) -> RegistryResult<Vec<AdditionalRequirement>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM additional_requirement \
                 WHERE specification_id = $specification_id \
                 ORDER BY row_pos ASC",
            )
            .bind(("specification_id", specification_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdditionalRequirementRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(AdditionalRequirementRow::try_into_requirement)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }
}
