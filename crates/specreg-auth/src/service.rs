//! Authentication service — login and refresh-token rotation.

use chrono::{Duration, Utc};
use specreg_core::error::{RegistryError, RegistryResult};
use specreg_core::models::user::{UpdateUser, User};
use specreg_core::repository::{UserGroupRepository, UserRepository};
use tracing::warn;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Successful login or refresh result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Raw opaque refresh token (returned to the client; only its hash
    /// is stored).
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
    pub user_group_id: Option<Uuid>,
    pub group_name: Option<String>,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer has
/// no dependency on the database crate.
pub struct AuthService<U: UserRepository, G: UserGroupRepository> {
    user_repo: U,
    group_repo: G,
    config: AuthConfig,
}

impl<U: UserRepository, G: UserGroupRepository> AuthService<U, G> {
    pub fn new(user_repo: U, group_repo: G, config: AuthConfig) -> Self {
        Self {
            user_repo,
            group_repo,
            config,
        }
    }

    /// Authenticate a user with username + password and issue a token
    /// pair.
    ///
    /// An unknown username, a wrong password and an inactive account
    /// are deliberately indistinguishable to the caller.
    pub async fn login(&self, username: &str, password_input: &str) -> RegistryResult<LoginOutput> {
        let user = self
            .user_repo
            .get_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            warn!(username, "Login attempt for inactive account");
            return Err(AuthError::InvalidCredentials.into());
        }

        let valid = password::verify_password(
            password_input,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )
        .map_err(RegistryError::from)?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        self.issue_tokens(user).await
    }

    /// Rotate a refresh token: the caller presents the expired access
    /// token plus the refresh token, and receives a new pair.
    ///
    /// Each refresh token is single-use — the stored hash is replaced
    /// by the rotated token's hash.
    pub async fn refresh(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> RegistryResult<LoginOutput> {
        let claims = token::decode_expired_access_token(access_token, &self.config)
            .map_err(RegistryError::from)?;

        let user = self
            .user_repo
            .get_by_username(&claims.username)
            .await?
            .ok_or_else(|| AuthError::TokenInvalid("unknown subject".into()))?;

        let presented_hash = token::hash_refresh_token(refresh_token);
        let stored_matches = user.refresh_token.as_deref() == Some(presented_hash.as_str());
        let unexpired = user
            .refresh_token_expiry
            .is_some_and(|expiry| expiry > Utc::now());
        if !stored_matches || !unexpired {
            warn!(username = %user.username, "Refresh token rejected");
            return Err(AuthError::TokenInvalid(
                "invalid refresh token or refresh token expired".into(),
            )
            .into());
        }

        self.issue_tokens(user).await
    }

    /// Stamp the login, store the rotated refresh-token hash and issue
    /// a fresh access token.
    async fn issue_tokens(&self, user: User) -> RegistryResult<LoginOutput> {
        let raw_refresh = token::generate_refresh_token();
        let refresh_hash = token::hash_refresh_token(&raw_refresh);
        let expiry =
            Utc::now() + Duration::seconds(self.config.refresh_token_lifetime_secs as i64);

        let user = self
            .user_repo
            .update(
                user.id,
                UpdateUser {
                    last_login_date: Some(Utc::now()),
                    refresh_token: Some(Some(refresh_hash)),
                    refresh_token_expiry: Some(Some(expiry)),
                    ..Default::default()
                },
            )
            .await?;

        let access_token =
            token::issue_access_token(&user, &self.config).map_err(RegistryError::from)?;

        let group_name = match user.user_group_id {
            Some(group_id) => Some(self.group_repo.get_by_id(group_id).await?.group_name),
            None => None,
        };

        Ok(LoginOutput {
            access_token,
            refresh_token: raw_refresh,
            expires_in: self.config.access_token_lifetime_secs,
            user_id: user.id,
            username: user.username,
            role: user.role.as_str().to_owned(),
            user_group_id: user.user_group_id,
            group_name,
        })
    }
}
