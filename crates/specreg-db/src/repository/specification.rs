//! SurrealDB implementation of the specification repository.
//!
//! The listing queries are assembled dynamically from the filter
//! parameters: status exclusion first, then free-text search, then the
//! child-membership filters, then exact matches, then the sort switch.
//! Every read resolves the owning group's name in one batched query per
//! page, never per row.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use specreg_core::error::RegistryResult;
use specreg_core::models::specification::{
    CreateSpecification, RegistrationStatus, Specification, SpecificationWithGroup,
    UpdateSpecification,
};
use specreg_core::repository::{
    PageParams, PagedResult, SortField, SortOrder, SpecificationFilter, SpecificationRepository,
};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct SpecificationRow {
    specification_identifier: String,
    specification_name: String,
    sector: String,
    sub_sector: Option<String>,
    purpose: String,
    specification_version: Option<String>,
    contact_information: String,
    date_of_implementation: Option<DateTime<Utc>>,
    country: Option<String>,
    is_country_specification: bool,
    underlying_specification_identifier: Option<String>,
    specification_source_link: Option<String>,
    core_version: Option<String>,
    preferred_syntax: Option<String>,
    implementation_status: Option<String>,
    registration_status: Option<String>,
    specification_type: Option<String>,
    conformance_level: Option<String>,
    user_group_id: Option<String>,
    created_date: DateTime<Utc>,
    modified_date: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct SpecificationRowWithId {
    record_id: String,
    specification_identifier: String,
    specification_name: String,
    sector: String,
    sub_sector: Option<String>,
    purpose: String,
    specification_version: Option<String>,
    contact_information: String,
    date_of_implementation: Option<DateTime<Utc>>,
    country: Option<String>,
    is_country_specification: bool,
    underlying_specification_identifier: Option<String>,
    specification_source_link: Option<String>,
    core_version: Option<String>,
    preferred_syntax: Option<String>,
    implementation_status: Option<String>,
    registration_status: Option<String>,
    specification_type: Option<String>,
    conformance_level: Option<String>,
    user_group_id: Option<String>,
    created_date: DateTime<Utc>,
    modified_date: DateTime<Utc>,
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Row struct for the batched group-name lookup.
#[derive(Debug, SurrealValue)]
struct GroupNameRow {
    record_id: String,
    group_name: String,
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

fn parse_status(value: Option<String>) -> Result<Option<RegistrationStatus>, DbError> {
    value
        .map(|s| {
            s.parse::<RegistrationStatus>()
                .map_err(DbError::Decode)
        })
        .transpose()
}

impl SpecificationRow {
    fn into_specification(self, id: Uuid) -> Result<Specification, DbError> {
        let user_group_id = self
            .user_group_id
            .as_deref()
            .map(|s| parse_uuid(s, "user group"))
            .transpose()?;
        Ok(Specification {
            id,
            specification_identifier: self.specification_identifier,
            specification_name: self.specification_name,
            sector: self.sector,
            sub_sector: self.sub_sector,
            purpose: self.purpose,
            specification_version: self.specification_version,
            contact_information: self.contact_information,
            date_of_implementation: self.date_of_implementation,
            country: self.country,
            is_country_specification: self.is_country_specification,
            underlying_specification_identifier: self.underlying_specification_identifier,
            specification_source_link: self.specification_source_link,
            core_version: self.core_version,
            preferred_syntax: self.preferred_syntax,
            implementation_status: self.implementation_status,
            registration_status: parse_status(self.registration_status)?,
            specification_type: self.specification_type,
            conformance_level: self.conformance_level,
            user_group_id,
            created_date: self.created_date,
            modified_date: self.modified_date,
        })
    }
}

impl SpecificationRowWithId {
    fn try_into_specification(self) -> Result<Specification, DbError> {
        let id = parse_uuid(&self.record_id, "specification")?;
        let user_group_id = self
            .user_group_id
            .as_deref()
            .map(|s| parse_uuid(s, "user group"))
            .transpose()?;
        Ok(Specification {
            id,
            specification_identifier: self.specification_identifier,
            specification_name: self.specification_name,
            sector: self.sector,
            sub_sector: self.sub_sector,
            purpose: self.purpose,
            specification_version: self.specification_version,
            contact_information: self.contact_information,
            date_of_implementation: self.date_of_implementation,
            country: self.country,
            is_country_specification: self.is_country_specification,
            underlying_specification_identifier: self.underlying_specification_identifier,
            specification_source_link: self.specification_source_link,
            core_version: self.core_version,
            preferred_syntax: self.preferred_syntax,
            implementation_status: self.implementation_status,
            registration_status: parse_status(self.registration_status)?,
            specification_type: self.specification_type,
            conformance_level: self.conformance_level,
            user_group_id,
            created_date: self.created_date,
            modified_date: self.modified_date,
        })
    }
}

/// Assembled WHERE clause plus its parameter bindings.
struct FilterSql {
    where_clause: String,
    binds: Vec<(&'static str, String)>,
}

fn build_filter(filter: &SpecificationFilter, include_submitted_and_in_progress: bool) -> FilterSql {
    let mut conditions: Vec<&'static str> = Vec::new();
    let mut binds: Vec<(&'static str, String)> = Vec::new();

    if !include_submitted_and_in_progress {
        conditions.push(
            "(registration_status IS NONE OR \
             string::lowercase(registration_status) NOT IN \
             ['submitted', 'in progress'])",
        );
    }

    if let Some(term) = &filter.search_term {
        conditions.push(
            "(string::contains(string::lowercase(specification_name), $search) OR \
             string::contains(string::lowercase(purpose), $search) OR \
             string::contains(string::lowercase(sector), $search))",
        );
        binds.push(("search", term.to_lowercase()));
    }

    if let Some(term) = &filter.core_business_term_id {
        conditions.push(
            "meta::id(id) IN (SELECT VALUE specification_id \
             FROM specification_core_element \
             WHERE string::contains(string::lowercase(business_term_id), $core_term))",
        );
        binds.push(("core_term", term.to_lowercase()));
    }

    if let Some(term) = &filter.extension_business_term_id {
        conditions.push(
            "meta::id(id) IN (SELECT VALUE specification_id \
             FROM specification_extension_element \
             WHERE string::contains(string::lowercase(business_term_id), $ext_term))",
        );
        binds.push(("ext_term", term.to_lowercase()));
    }

    if let Some(term) = &filter.add_req_business_term_id {
        conditions.push(
            "meta::id(id) IN (SELECT VALUE specification_id \
             FROM additional_requirement \
             WHERE string::contains(string::lowercase(business_term_id), $add_req_term))",
        );
        binds.push(("add_req_term", term.to_lowercase()));
    }

    if let Some(value) = &filter.specification_type {
        conditions.push(
            "(specification_type IS NOT NONE AND \
             string::lowercase(specification_type) = $spec_type)",
        );
        binds.push(("spec_type", value.to_lowercase()));
    }

    if let Some(value) = &filter.sector {
        conditions.push("string::lowercase(sector) = $sector");
        binds.push(("sector", value.to_lowercase()));
    }

    if let Some(value) = &filter.country {
        conditions.push("(country IS NOT NONE AND string::lowercase(country) = $country)");
        binds.push(("country", value.to_lowercase()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    FilterSql {
        where_clause,
        binds,
    }
}

fn order_clause(filter: &SpecificationFilter) -> &'static str {
    // Absent (or unparsed) sort field falls back to newest-first.
    let Some(field) = filter.sort_by else {
        return "ORDER BY modified_date DESC";
    };
    match (field, filter.sort_order) {
        (SortField::Name, SortOrder::Asc) => "ORDER BY specification_name ASC",
        (SortField::Name, SortOrder::Desc) => "ORDER BY specification_name DESC",
        (SortField::Purpose, SortOrder::Asc) => "ORDER BY purpose ASC",
        (SortField::Purpose, SortOrder::Desc) => "ORDER BY purpose DESC",
        (SortField::Sector, SortOrder::Asc) => "ORDER BY sector ASC",
        (SortField::Sector, SortOrder::Desc) => "ORDER BY sector DESC",
        (SortField::Country, SortOrder::Asc) => "ORDER BY country ASC",
        (SortField::Country, SortOrder::Desc) => "ORDER BY country DESC",
        (SortField::SpecificationType, SortOrder::Asc) => "ORDER BY specification_type ASC",
        (SortField::SpecificationType, SortOrder::Desc) => "ORDER BY specification_type DESC",
        (SortField::ModifiedDate, SortOrder::Asc) => "ORDER BY modified_date ASC",
        (SortField::ModifiedDate, SortOrder::Desc) => "ORDER BY modified_date DESC",
        (SortField::CreatedDate, SortOrder::Asc) => "ORDER BY created_date ASC",
        (SortField::CreatedDate, SortOrder::Desc) => "ORDER BY created_date DESC",
        (SortField::Identifier, SortOrder::Asc) => "ORDER BY specification_identifier ASC",
        (SortField::Identifier, SortOrder::Desc) => "ORDER BY specification_identifier DESC",
    }
}

/// SurrealDB implementation of the specification repository.
#[derive(Clone)]
pub struct SurrealSpecificationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSpecificationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Resolve owning-group names for a batch of specifications with a
    /// single query.
    async fn with_group_names(
        &self,
        specs: Vec<Specification>,
    ) -> Result<Vec<SpecificationWithGroup>, DbError> {
        let ids: HashSet<String> = specs
            .iter()
            .filter_map(|s| s.user_group_id.map(|id| id.to_string()))
            .collect();

        let mut names: HashMap<String, String> = HashMap::new();
        if !ids.is_empty() {
            let ids: Vec<String> = ids.into_iter().collect();
            let mut result = self
                .db
                .query(
                    "SELECT meta::id(id) AS record_id, group_name FROM user_group \
                     WHERE meta::id(id) IN $ids",
                )
                .bind(("ids", ids))
                .await
                .map_err(DbError::from)?;
            let rows: Vec<GroupNameRow> = result.take(0).map_err(DbError::from)?;
            names = rows
                .into_iter()
                .map(|r| (r.record_id, r.group_name))
                .collect();
        }

        Ok(specs
            .into_iter()
            .map(|spec| {
                let group_name = spec
                    .user_group_id
                    .and_then(|id| names.get(&id.to_string()).cloned());
                SpecificationWithGroup {
                    specification: spec,
                    group_name,
                }
            })
            .collect())
    }

    async fn count_filtered(&self, filter_sql: &FilterSql) -> Result<u64, DbError> {
        let sql = format!(
            "SELECT count() AS total FROM specification{} GROUP ALL",
            filter_sql.where_clause
        );
        let mut query = self.db.query(&sql);
        for (name, value) in filter_sql.binds.clone() {
            query = query.bind((name, value));
        }
        let mut result = query.await.map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn fetch_rows(
        &self,
        sql: String,
        binds: Vec<(&'static str, String)>,
        page: Option<PageParams>,
    ) -> Result<Vec<Specification>, DbError> {
        let mut query = self.db.query(&sql);
        for (name, value) in binds {
            query = query.bind((name, value));
        }
        if let Some(page) = page {
            query = query
                .bind(("limit", u64::from(page.page_size())))
                .bind(("offset", page.offset()));
        }
        let mut result = query.await.map_err(DbError::from)?;
        let rows: Vec<SpecificationRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(SpecificationRowWithId::try_into_specification)
            .collect()
    }
}

impl<C: Connection> SpecificationRepository for SurrealSpecificationRepository<C> {
    async fn create(&self, input: CreateSpecification) -> RegistryResult<Specification> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        // created_date and modified_date are stamped in the same
        // statement so a freshly created row has identical timestamps.
        let result = self
            .db
            .query(
                "CREATE type::record('specification', $id) SET \
                 specification_identifier = $specification_identifier, \
                 specification_name = $specification_name, \
                 sector = $sector, \
                 sub_sector = $sub_sector, \
                 purpose = $purpose, \
                 specification_version = $specification_version, \
                 contact_information = $contact_information, \
                 date_of_implementation = $date_of_implementation, \
                 country = $country, \
                 is_country_specification = $is_country_specification, \
                 underlying_specification_identifier = $underlying_specification_identifier, \
                 specification_source_link = $specification_source_link, \
                 core_version = $core_version, \
                 preferred_syntax = $preferred_syntax, \
                 implementation_status = $implementation_status, \
                 registration_status = $registration_status, \
                 specification_type = $specification_type, \
                 conformance_level = $conformance_level, \
                 user_group_id = $user_group_id, \
                 created_date = time::now(), \
                 modified_date = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind((
                "specification_identifier",
                input.specification_identifier,
            ))
            .bind(("specification_name", input.specification_name))
            .bind(("sector", input.sector))
            .bind(("sub_sector", input.sub_sector))
            .bind(("purpose", input.purpose))
            .bind(("specification_version", input.specification_version))
            .bind(("contact_information", input.contact_information))
            .bind(("date_of_implementation", input.date_of_implementation))
            .bind(("country", input.country))
            .bind((
                "is_country_specification",
                input.is_country_specification,
            ))
            .bind((
                "underlying_specification_identifier",
                input.underlying_specification_identifier,
            ))
            .bind((
                "specification_source_link",
                input.specification_source_link,
            ))
            .bind(("core_version", input.core_version))
            .bind(("preferred_syntax", input.preferred_syntax))
            .bind(("implementation_status", input.implementation_status))
            .bind((
                "registration_status",
                input.registration_status.map(|s| s.as_str().to_owned()),
            ))
            .bind(("specification_type", input.specification_type))
            .bind(("conformance_level", input.conformance_level))
            .bind((
                "user_group_id",
                input.user_group_id.map(|g| g.to_string()),
            ))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::classify)?;
        let rows: Vec<SpecificationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "specification".into(),
            id: id_str,
        })?;

        Ok(row.into_specification(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> RegistryResult<SpecificationWithGroup> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('specification', $id)",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SpecificationRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "specification".into(),
            id: id_str,
        })?;

        let spec = row.try_into_specification()?;
        let mut with_group = self.with_group_names(vec![spec]).await?;
        Ok(with_group.remove(0))
    }

    async fn update(
        &self,
        id: Uuid,
        input: UpdateSpecification,
    ) -> RegistryResult<Specification> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.specification_identifier.is_some() {
            sets.push("specification_identifier = $specification_identifier");
        }
        if input.specification_name.is_some() {
            sets.push("specification_name = $specification_name");
        }
        if input.sector.is_some() {
            sets.push("sector = $sector");
        }
        if input.sub_sector.is_some() {
            sets.push("sub_sector = $sub_sector");
        }
        if input.purpose.is_some() {
            sets.push("purpose = $purpose");
        }
        if input.specification_version.is_some() {
            sets.push("specification_version = $specification_version");
        }
        if input.contact_information.is_some() {
            sets.push("contact_information = $contact_information");
        }
        if input.date_of_implementation.is_some() {
            sets.push("date_of_implementation = $date_of_implementation");
        }
        if input.country.is_some() {
            sets.push("country = $country");
        }
        if input.is_country_specification.is_some() {
            sets.push("is_country_specification = $is_country_specification");
        }
        if input.underlying_specification_identifier.is_some() {
            sets.push(
                "underlying_specification_identifier = $underlying_specification_identifier",
            );
        }
        if input.specification_source_link.is_some() {
            sets.push("specification_source_link = $specification_source_link");
        }
        if input.core_version.is_some() {
            sets.push("core_version = $core_version");
        }
        if input.preferred_syntax.is_some() {
            sets.push("preferred_syntax = $preferred_syntax");
        }
        if input.implementation_status.is_some() {
            sets.push("implementation_status = $implementation_status");
        }
        if input.registration_status.is_some() {
            sets.push("registration_status = $registration_status");
        }
        if input.specification_type.is_some() {
            sets.push("specification_type = $specification_type");
        }
        if input.conformance_level.is_some() {
            sets.push("conformance_level = $conformance_level");
        }
        if input.user_group_id.is_some() {
            sets.push("user_group_id = $user_group_id");
        }
        sets.push("modified_date = time::now()");

        let query = format!(
            "UPDATE type::record('specification', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(value) = input.specification_identifier {
            builder = builder.bind(("specification_identifier", value));
        }
        if let Some(value) = input.specification_name {
            builder = builder.bind(("specification_name", value));
        }
        if let Some(value) = input.sector {
            builder = builder.bind(("sector", value));
        }
        if let Some(value) = input.sub_sector {
            builder = builder.bind(("sub_sector", value));
        }
        if let Some(value) = input.purpose {
            builder = builder.bind(("purpose", value));
        }
        if let Some(value) = input.specification_version {
            builder = builder.bind(("specification_version", value));
        }
        if let Some(value) = input.contact_information {
            builder = builder.bind(("contact_information", value));
        }
        if let Some(value) = input.date_of_implementation {
            builder = builder.bind(("date_of_implementation", value));
        }
        if let Some(value) = input.country {
            builder = builder.bind(("country", value));
        }
        if let Some(value) = input.is_country_specification {
            builder = builder.bind(("is_country_specification", value));
        }
        if let Some(value) = input.underlying_specification_identifier {
            builder = builder.bind(("underlying_specification_identifier", value));
        }
        if let Some(value) = input.specification_source_link {
            builder = builder.bind(("specification_source_link", value));
        }
        if let Some(value) = input.core_version {
            builder = builder.bind(("core_version", value));
        }
        if let Some(value) = input.preferred_syntax {
            builder = builder.bind(("preferred_syntax", value));
        }
        if let Some(value) = input.implementation_status {
            builder = builder.bind(("implementation_status", value));
        }
        if let Some(value) = input.registration_status {
            builder = builder.bind((
                "registration_status",
                value.map(|s| s.as_str().to_owned()),
            ));
        }
        if let Some(value) = input.specification_type {
            builder = builder.bind(("specification_type", value));
        }
        if let Some(value) = input.conformance_level {
            builder = builder.bind(("conformance_level", value));
        }
        if let Some(value) = input.user_group_id {
            builder = builder.bind(("user_group_id", value.map(|g| g.to_string())));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::classify)?;

        let rows: Vec<SpecificationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "specification".into(),
            id: id_str,
        })?;

        Ok(row.into_specification(id)?)
    }

    async fn assign_group(&self, id: Uuid, user_group_id: Option<Uuid>) -> RegistryResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('specification', $id) SET \
                 user_group_id = $user_group_id, \
                 modified_date = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind((
                "user_group_id",
                user_group_id.map(|g| g.to_string()),
            ))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SpecificationRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "specification".into(),
                id: id_str,
            }
            .into());
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RegistryResult<()> {
        self.db
            .query("DELETE type::record('specification', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::classify)?;
        Ok(())
    }

    async fn list_paginated(
        &self,
        filter: &SpecificationFilter,
        page: PageParams,
        include_submitted_and_in_progress: bool,
    ) -> RegistryResult<PagedResult<SpecificationWithGroup>> {
        let filter_sql = build_filter(filter, include_submitted_and_in_progress);
        let total = self.count_filtered(&filter_sql).await?;

        let sql = format!(
            "SELECT meta::id(id) AS record_id, * FROM specification{} {} \
             LIMIT $limit START $offset",
            filter_sql.where_clause,
            order_clause(filter),
        );
        let specs = self
            .fetch_rows(sql, filter_sql.binds, Some(page))
            .await?;
        let items = self.with_group_names(specs).await?;

        Ok(PagedResult::new(items, total, page))
    }

    async fn list_all(
        &self,
        include_submitted_and_in_progress: bool,
    ) -> RegistryResult<Vec<SpecificationWithGroup>> {
        let filter_sql = build_filter(
            &SpecificationFilter::default(),
            include_submitted_and_in_progress,
        );
        let sql = format!(
            "SELECT meta::id(id) AS record_id, * FROM specification{} \
             ORDER BY modified_date DESC",
            filter_sql.where_clause,
        );
        let specs = self.fetch_rows(sql, filter_sql.binds, None).await?;
        Ok(self.with_group_names(specs).await?)
    }

    async fn list_by_group(
        &self,
        user_group_id: Uuid,
    ) -> RegistryResult<Vec<SpecificationWithGroup>> {
        let sql = "SELECT meta::id(id) AS record_id, * FROM specification \
                   WHERE user_group_id = $group_id \
                   ORDER BY specification_identifier ASC"
            .to_owned();
        let specs = self
            .fetch_rows(sql, vec![("group_id", user_group_id.to_string())], None)
            .await?;
        Ok(self.with_group_names(specs).await?)
    }

    async fn list_by_group_paginated(
        &self,
        user_group_id: Uuid,
        page: PageParams,
    ) -> RegistryResult<PagedResult<SpecificationWithGroup>> {
        let group_id = user_group_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM specification \
                 WHERE user_group_id = $group_id GROUP ALL",
            )
            .bind(("group_id", group_id.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let sql = "SELECT meta::id(id) AS record_id, * FROM specification \
                   WHERE user_group_id = $group_id \
                   ORDER BY specification_identifier ASC \
                   LIMIT $limit START $offset"
            .to_owned();
        let specs = self
            .fetch_rows(sql, vec![("group_id", group_id)], Some(page))
            .await?;
        let items = self.with_group_names(specs).await?;

        Ok(PagedResult::new(items, total, page))
    }

    async fn exists(&self, id: Uuid) -> RegistryResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM specification \
                 WHERE meta::id(id) = $id GROUP ALL",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }

    async fn has_core_elements(&self, id: Uuid) -> RegistryResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM specification_core_element \
                 WHERE specification_id = $id GROUP ALL",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }

    async fn has_extension_elements(&self, id: Uuid) -> RegistryResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM specification_extension_element \
                 WHERE specification_id = $id GROUP ALL",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }

    async fn touch_modified(&self, id: Uuid) -> RegistryResult<()> {
        // Best-effort: an UPDATE on a record that no longer exists is a
        // no-op rather than an error.
        self.db
            .query(
                "UPDATE type::record('specification', $id) SET \
                 modified_date = time::now()",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        Ok(())
    }
}
