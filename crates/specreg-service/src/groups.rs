//! User group administration service.

use specreg_core::error::{RegistryError, RegistryResult};
use specreg_core::models::user_group::{
    CreateUserGroup, UpdateUserGroup, UserGroup, UserGroupSummary,
};
use specreg_core::repository::UserGroupRepository;
use tracing::warn;
use uuid::Uuid;

pub struct UserGroupService<G> {
    group_repo: G,
}

impl<G: UserGroupRepository> UserGroupService<G> {
    pub fn new(group_repo: G) -> Self {
        Self { group_repo }
    }

    pub async fn create(&self, input: CreateUserGroup) -> RegistryResult<UserGroup> {
        if self.group_repo.get_by_name(&input.group_name).await?.is_some() {
            return Err(RegistryError::conflict("group name already exists"));
        }
        self.group_repo.create(input).await
    }

    pub async fn update(&self, id: Uuid, input: UpdateUserGroup) -> RegistryResult<UserGroup> {
        let existing = self.group_repo.get_by_id(id).await?;

        if let Some(name) = &input.group_name {
            if *name != existing.group_name
                && self.group_repo.get_by_name(name).await?.is_some()
            {
                return Err(RegistryError::conflict("group name already exists"));
            }
        }

        self.group_repo.update(id, input).await
    }

    /// Deletion is refused while users or specifications still
    /// reference the group.
    pub async fn delete(&self, id: Uuid) -> RegistryResult<()> {
        self.group_repo.get_by_id(id).await?;
        self.group_repo.delete(id).await.map_err(|e| {
            if matches!(e, RegistryError::Conflict { .. }) {
                warn!(%id, "Group deletion blocked: still referenced");
            }
            e
        })
    }

    pub async fn get(&self, id: Uuid) -> RegistryResult<UserGroup> {
        self.group_repo.get_by_id(id).await
    }

    pub async fn list(&self) -> RegistryResult<Vec<UserGroup>> {
        self.group_repo.list().await
    }

    pub async fn list_with_counts(&self) -> RegistryResult<Vec<UserGroupSummary>> {
        self.group_repo.list_with_counts().await
    }
}
