//! Caller context.

use uuid::Uuid;

use crate::models::user::Role;

/// The identity of the caller of a service operation.
///
/// Built by the authentication layer from validated token claims and
/// passed explicitly into every service call — never read from ambient
/// state. Operations that accept `Option<&CurrentUser>` treat `None` as
/// "no usable caller context".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub role: Role,
    /// Group membership; `None` for users not assigned to any group.
    pub user_group_id: Option<Uuid>,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
