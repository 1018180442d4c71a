//! User group domain model.
//!
//! A group is the unit of write-ownership: it owns zero-or-more
//! specifications and contains zero-or-more users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserGroup {
    pub id: Uuid,
    /// Unique group name.
    pub group_name: String,
    pub description: Option<String>,
    pub created_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserGroup {
    pub group_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUserGroup {
    pub group_name: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub description: Option<Option<String>>,
}

/// A group with aggregate counts over its members and owned
/// specifications, for administrative overviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserGroupSummary {
    pub group: UserGroup,
    pub user_count: u64,
    pub specification_count: u64,
    pub in_progress_count: u64,
    pub submitted_count: u64,
    pub under_review_count: u64,
    pub verified_count: u64,
}
