//! SurrealDB implementation of the user group repository.
//!
//! Group deletion is restricted: the store has no foreign-key
//! enforcement, so the repository refuses to delete a group that users
//! or specifications still reference.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use specreg_core::error::RegistryResult;
use specreg_core::models::user_group::{
    CreateUserGroup, UpdateUserGroup, UserGroup, UserGroupSummary,
};
use specreg_core::repository::UserGroupRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserGroupRow {
    group_name: String,
    description: Option<String>,
    created_date: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserGroupRowWithId {
    record_id: String,
    group_name: String,
    description: Option<String>,
    created_date: DateTime<Utc>,
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Row struct for per-group member aggregates.
#[derive(Debug, SurrealValue)]
struct GroupCountRow {
    user_group_id: Option<String>,
    total: u64,
}

/// Row struct for per-group, per-status specification aggregates.
#[derive(Debug, SurrealValue)]
struct StatusCountRow {
    user_group_id: Option<String>,
    registration_status: Option<String>,
    total: u64,
}

impl UserGroupRowWithId {
    fn try_into_group(self) -> Result<UserGroup, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid group UUID: {e}")))?;
        Ok(UserGroup {
            id,
            group_name: self.group_name,
            description: self.description,
            created_date: self.created_date,
        })
    }
}

/// SurrealDB implementation of the user group repository.
#[derive(Clone)]
pub struct SurrealUserGroupRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserGroupRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserGroupRepository for SurrealUserGroupRepository<C> {
    async fn create(&self, input: CreateUserGroup) -> RegistryResult<UserGroup> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user_group', $id) SET \
                 group_name = $group_name, \
                 description = $description",
            )
            .bind(("id", id_str.clone()))
            .bind(("group_name", input.group_name))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        // The unique group-name index makes a duplicate CREATE fail;
        // classify maps it to a conflict.
        let mut result = result.check().map_err(DbError::classify)?;
        let rows: Vec<UserGroupRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user group".into(),
            id: id_str,
        })?;

        Ok(UserGroup {
            id,
            group_name: row.group_name,
            description: row.description,
            created_date: row.created_date,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> RegistryResult<UserGroup> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('user_group', $id)",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserGroupRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user group".into(),
            id: id_str,
        })?;

        Ok(row.try_into_group()?)
    }

    async fn get_by_name(&self, group_name: &str) -> RegistryResult<Option<UserGroup>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user_group \
                 WHERE group_name = $group_name",
            )
            .bind(("group_name", group_name.to_owned()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserGroupRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_group()?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: Uuid, input: UpdateUserGroup) -> RegistryResult<UserGroup> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.group_name.is_some() {
            sets.push("group_name = $group_name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE type::record('user_group', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(value) = input.group_name {
            builder = builder.bind(("group_name", value));
        }
        if let Some(value) = input.description {
            builder = builder.bind(("description", value));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::classify)?;

        let rows: Vec<UserGroupRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user group".into(),
            id: id_str,
        })?;

        Ok(UserGroup {
            id,
            group_name: row.group_name,
            description: row.description,
            created_date: row.created_date,
        })
    }

    async fn delete(&self, id: Uuid) -> RegistryResult<()> {
        let id_str = id.to_string();

        // Restrict: refuse while users or specifications reference the
        // group.
        let mut check = self
            .db
            .query(
                "SELECT count() AS total FROM user \
                 WHERE user_group_id = $id GROUP ALL; \
                 SELECT count() AS total FROM specification \
                 WHERE user_group_id = $id GROUP ALL;",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let user_count: Vec<CountRow> = check.take(0).map_err(DbError::from)?;
        if user_count.first().map(|r| r.total).unwrap_or(0) > 0 {
            return Err(DbError::Conflict(format!(
                "user group {id_str} still has member users"
            ))
            .into());
        }

        let spec_count: Vec<CountRow> = check.take(1).map_err(DbError::from)?;
        if spec_count.first().map(|r| r.total).unwrap_or(0) > 0 {
            return Err(DbError::Conflict(format!(
                "user group {id_str} still owns specifications"
            ))
            .into());
        }

        self.db
            .query("DELETE type::record('user_group', $id)")
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self) -> RegistryResult<Vec<UserGroup>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user_group \
                 ORDER BY group_name ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserGroupRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(UserGroupRowWithId::try_into_group)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }

    async fn list_with_counts(&self) -> RegistryResult<Vec<UserGroupSummary>> {
        let groups = self.list().await?;

        let mut result = self
            .db
            .query(
                "SELECT user_group_id, count() AS total FROM user \
                 WHERE user_group_id IS NOT NONE GROUP BY user_group_id; \
                 SELECT user_group_id, registration_status, count() AS total \
                 FROM specification \
                 WHERE user_group_id IS NOT NONE \
                 GROUP BY user_group_id, registration_status;",
            )
            .await
            .map_err(DbError::from)?;

        let user_rows: Vec<GroupCountRow> = result.take(0).map_err(DbError::from)?;
        let status_rows: Vec<StatusCountRow> = result.take(1).map_err(DbError::from)?;

        let user_counts: HashMap<String, u64> = user_rows
            .into_iter()
            .filter_map(|r| r.user_group_id.map(|id| (id, r.total)))
            .collect();

        let mut spec_counts: HashMap<String, u64> = HashMap::new();
        let mut status_counts: HashMap<(String, String), u64> = HashMap::new();
        for row in status_rows {
            let Some(group_id) = row.user_group_id else {
                continue;
            };
            *spec_counts.entry(group_id.clone()).or_default() += row.total;
            if let Some(status) = row.registration_status {
                *status_counts
                    .entry((group_id, status.to_lowercase()))
                    .or_default() += row.total;
            }
        }

        let status_count = |group_id: &str, status: &str| {
            status_counts
                .get(&(group_id.to_owned(), status.to_owned()))
                .copied()
                .unwrap_or(0)
        };

        Ok(groups
            .into_iter()
            .map(|group| {
                let key = group.id.to_string();
                UserGroupSummary {
                    user_count: user_counts.get(&key).copied().unwrap_or(0),
                    specification_count: spec_counts.get(&key).copied().unwrap_or(0),
                    in_progress_count: status_count(&key, "in progress"),
                    submitted_count: status_count(&key, "submitted"),
                    under_review_count: status_count(&key, "under review"),
                    verified_count: status_count(&key, "verified"),
                    group,
                }
            })
            .collect())
    }
}
