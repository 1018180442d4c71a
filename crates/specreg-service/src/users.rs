//! User administration service.

use specreg_core::error::{RegistryError, RegistryResult};
use specreg_core::models::user::{CreateUser, Role, UpdateUser, User};
use specreg_core::repository::{UserGroupRepository, UserRepository};
use specreg_auth::config::AuthConfig;
use specreg_auth::password;
use tracing::error;
use uuid::Uuid;

/// Registration input; the raw password is hashed before it reaches
/// the repository.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Defaults to [`Role::User`] when not given.
    pub role: Option<Role>,
    pub user_group_id: Option<Uuid>,
}

pub struct UserService<U, G> {
    user_repo: U,
    group_repo: G,
    config: AuthConfig,
}

impl<U, G> UserService<U, G>
where
    U: UserRepository,
    G: UserGroupRepository,
{
    pub fn new(user_repo: U, group_repo: G, config: AuthConfig) -> Self {
        Self {
            user_repo,
            group_repo,
            config,
        }
    }

    pub async fn register(&self, input: RegisterUser) -> RegistryResult<User> {
        if self.user_repo.get_by_username(&input.username).await?.is_some() {
            return Err(RegistryError::conflict("username already exists"));
        }
        if self.user_repo.get_by_email(&input.email).await?.is_some() {
            return Err(RegistryError::conflict("email already exists"));
        }
        if let Some(group_id) = input.user_group_id {
            self.require_group(group_id).await?;
        }
        if input.password.len() < self.config.min_password_length {
            return Err(RegistryError::bad_request(format!(
                "password must be at least {} characters",
                self.config.min_password_length
            )));
        }

        let password_hash =
            password::hash_password(&input.password, self.config.pepper.as_deref())
                .map_err(RegistryError::from)?;

        self.user_repo
            .create(CreateUser {
                username: input.username.clone(),
                email: input.email,
                password_hash,
                first_name: input.first_name,
                last_name: input.last_name,
                role: input.role.unwrap_or(Role::User),
                user_group_id: input.user_group_id,
            })
            .await
            .map_err(|e| {
                error!(username = %input.username, "Failed to save new user: {e}");
                e
            })
    }

    pub async fn update(&self, id: Uuid, input: UpdateUser) -> RegistryResult<User> {
        let existing = self.user_repo.get_by_id(id).await?;

        if let Some(email) = &input.email {
            if *email != existing.email && self.user_repo.get_by_email(email).await?.is_some() {
                return Err(RegistryError::conflict("email already exists"));
            }
        }
        if let Some(Some(group_id)) = input.user_group_id {
            self.require_group(group_id).await?;
        }

        self.user_repo.update(id, input).await
    }

    pub async fn assign_to_group(
        &self,
        user_id: Uuid,
        user_group_id: Option<Uuid>,
    ) -> RegistryResult<User> {
        self.user_repo.get_by_id(user_id).await?;
        if let Some(group_id) = user_group_id {
            self.require_group(group_id).await?;
        }
        self.user_repo
            .update(
                user_id,
                UpdateUser {
                    user_group_id: Some(user_group_id),
                    ..Default::default()
                },
            )
            .await
    }

    pub async fn change_role(&self, user_id: Uuid, role: Role) -> RegistryResult<User> {
        self.user_repo.get_by_id(user_id).await?;
        self.user_repo
            .update(
                user_id,
                UpdateUser {
                    role: Some(role),
                    ..Default::default()
                },
            )
            .await
    }

    pub async fn delete(&self, user_id: Uuid) -> RegistryResult<()> {
        self.user_repo.get_by_id(user_id).await?;
        self.user_repo.delete(user_id).await
    }

    pub async fn get_by_id(&self, user_id: Uuid) -> RegistryResult<User> {
        self.user_repo.get_by_id(user_id).await
    }

    pub async fn get_by_username(&self, username: &str) -> RegistryResult<Option<User>> {
        self.user_repo.get_by_username(username).await
    }

    pub async fn list(&self) -> RegistryResult<Vec<User>> {
        self.user_repo.list().await
    }

    pub async fn list_by_group(&self, user_group_id: Uuid) -> RegistryResult<Vec<User>> {
        self.user_repo.list_by_group(user_group_id).await
    }

    async fn require_group(&self, group_id: Uuid) -> RegistryResult<()> {
        self.group_repo.get_by_id(group_id).await.map_err(|e| match e {
            RegistryError::NotFound { .. } => {
                RegistryError::ref_not_found("user group", group_id)
            }
            other => other,
        })?;
        Ok(())
    }
}
