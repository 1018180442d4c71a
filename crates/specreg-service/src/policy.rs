//! Ownership policy — the single write-authorization predicate.

use specreg_core::context::CurrentUser;
use uuid::Uuid;

/// Whether a caller may mutate a specification owned by
/// `owning_group_id`.
///
/// - no caller context → no access
/// - admins may edit anything
/// - otherwise both group IDs must be present and equal
///
/// Reads are deliberately not gated by this predicate; public
/// visibility is controlled by the listing status filter alone.
pub fn can_edit(owning_group_id: Option<Uuid>, user: Option<&CurrentUser>) -> bool {
    let Some(user) = user else {
        return false;
    };
    if user.is_admin() {
        return true;
    }
    match (owning_group_id, user.user_group_id) {
        (Some(owner), Some(member)) => owner == member,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specreg_core::models::user::Role;

    fn user(role: Role, group: Option<Uuid>) -> CurrentUser {
        CurrentUser {
            user_id: Uuid::new_v4(),
            role,
            user_group_id: group,
        }
    }

    #[test]
    fn no_context_no_access() {
        assert!(!can_edit(Some(Uuid::new_v4()), None));
        assert!(!can_edit(None, None));
    }

    #[test]
    fn admin_edits_anything() {
        let admin = user(Role::Admin, None);
        assert!(can_edit(Some(Uuid::new_v4()), Some(&admin)));
        assert!(can_edit(None, Some(&admin)));
    }

    #[test]
    fn matching_groups_allow_edit() {
        let group = Uuid::new_v4();
        let member = user(Role::User, Some(group));
        assert!(can_edit(Some(group), Some(&member)));
    }

    #[test]
    fn mismatched_or_missing_groups_deny_edit() {
        let member = user(Role::User, Some(Uuid::new_v4()));
        assert!(!can_edit(Some(Uuid::new_v4()), Some(&member)));
        assert!(!can_edit(None, Some(&member)));

        let groupless = user(Role::User, None);
        assert!(!can_edit(Some(Uuid::new_v4()), Some(&groupless)));
        assert!(!can_edit(None, Some(&groupless)));
    }
}
