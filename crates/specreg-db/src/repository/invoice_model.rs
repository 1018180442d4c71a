//! SurrealDB implementation of the Core Invoice Model repository.
//!
//! Reference data: record IDs are the business-term IDs themselves.

use specreg_core::error::RegistryResult;
use specreg_core::models::invoice_model::CoreInvoiceModelEntry;
use specreg_core::repository::{CoreInvoiceModelRepository, PageParams, PagedResult};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CoreInvoiceModelRow {
    record_id: String,
    business_term: String,
    level: String,
    cardinality: String,
    row_pos: i64,
    semantic_description: Option<String>,
    data_type: Option<String>,
    parent_id: Option<String>,
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

impl CoreInvoiceModelRow {
    fn try_into_entry(self) -> Result<CoreInvoiceModelEntry, DbError> {
        let row_pos = i16::try_from(self.row_pos)
            .map_err(|e| DbError::Decode(format!("row_pos out of range: {e}")))?;
        Ok(CoreInvoiceModelEntry {
            business_term_id: self.record_id,
            business_term: self.business_term,
            level: self.level,
            cardinality: self.cardinality,
            row_pos,
            semantic_description: self.semantic_description,
            data_type: self.data_type,
            parent_id: self.parent_id,
        })
    }
}

/// SurrealDB implementation of the Core Invoice Model repository.
#[derive(Clone)]
pub struct SurrealCoreInvoiceModelRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCoreInvoiceModelRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CoreInvoiceModelRepository for SurrealCoreInvoiceModelRepository<C> {
    async fn get(&self, business_term_id: &str) -> RegistryResult<CoreInvoiceModelEntry> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('core_invoice_model', $id)",
            )
            .bind(("id", business_term_id.to_owned()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CoreInvoiceModelRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "core invoice model entry".into(),
            id: business_term_id.to_owned(),
        })?;

        Ok(row.try_into_entry()?)
    }

    async fn list_paginated(
        &self,
        page: PageParams,
    ) -> RegistryResult<PagedResult<CoreInvoiceModelEntry>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM core_invoice_model GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM core_invoice_model \
                 ORDER BY row_pos ASC, record_id ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", u64::from(page.page_size())))
            .bind(("offset", page.offset()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CoreInvoiceModelRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(CoreInvoiceModelRow::try_into_entry)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PagedResult::new(items, total, page))
    }
}
