//! JWT access token issuance/verification and opaque refresh token
//! generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use specreg_core::context::CurrentUser;
use specreg_core::models::user::{Role, User};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject — user ID (UUID string).
    pub sub: String,
    pub username: String,
    /// Role string ("Admin" or "User").
    pub role: String,
    /// Group membership (UUID string), if any.
    pub user_group_id: Option<String>,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

impl AccessTokenClaims {
    /// Build the caller context the services consume from validated
    /// claims.
    pub fn to_current_user(&self) -> Result<CurrentUser, AuthError> {
        let user_id = Uuid::parse_str(&self.sub)
            .map_err(|e| AuthError::TokenInvalid(format!("bad subject: {e}")))?;
        let role = self
            .role
            .parse::<Role>()
            .map_err(AuthError::TokenInvalid)?;
        let user_group_id = self
            .user_group_id
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|e| AuthError::TokenInvalid(format!("bad group: {e}")))?;
        Ok(CurrentUser {
            user_id,
            role,
            user_group_id,
        })
    }
}

/// Issue a signed HS256 JWT access token for a user.
pub fn issue_access_token(user: &User, config: &AuthConfig) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = AccessTokenClaims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        role: user.role.as_str().to_owned(),
        user_group_id: user.user_group_id.map(|g| g.to_string()),
        iss: config.jwt_issuer.clone(),
        iat: now,
        exp: now + config.access_token_lifetime_secs as i64,
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    let header = Header::new(Algorithm::HS256);
    jsonwebtoken::encode(&header, &claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Decode and verify an HS256 JWT access token.
pub fn decode_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<AccessTokenClaims, AuthError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    jsonwebtoken::decode::<AccessTokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

/// Decode an access token while ignoring its expiry.
///
/// Used by the refresh flow: the caller presents the expired access
/// token together with the refresh token, and only the signature must
/// still hold.
pub fn decode_expired_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<AccessTokenClaims, AuthError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["sub", "iat", "iss"]);

    jsonwebtoken::decode::<AccessTokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::TokenInvalid(e.to_string()))
}

/// Generate a cryptographically random opaque refresh token
/// (32 bytes → base64url-encoded, no padding).
pub fn generate_refresh_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 hash of a raw refresh token, hex-encoded.
///
/// This is the value stored on the user row as `refresh_token`.
pub fn hash_refresh_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret-at-least-32-bytes-long!".into(),
            jwt_issuer: "specreg-test".into(),
            ..AuthConfig::default()
        }
    }

    fn test_user(role: Role, group: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "unused".into(),
            first_name: None,
            last_name: None,
            role,
            user_group_id: group,
            is_active: true,
            created_date: Utc::now(),
            last_login_date: None,
            refresh_token: None,
            refresh_token_expiry: None,
        }
    }

    #[test]
    fn jwt_roundtrip() {
        let config = test_config();
        let group = Uuid::new_v4();
        let user = test_user(Role::User, Some(group));

        let token = issue_access_token(&user, &config).unwrap();
        let claims = decode_access_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "User");
        assert_eq!(claims.user_group_id, Some(group.to_string()));
        assert_eq!(claims.iss, "specreg-test");
    }

    #[test]
    fn claims_convert_to_current_user() {
        let config = test_config();
        let group = Uuid::new_v4();
        let user = test_user(Role::Admin, Some(group));

        let token = issue_access_token(&user, &config).unwrap();
        let claims = decode_access_token(&token, &config).unwrap();
        let current = claims.to_current_user().unwrap();

        assert_eq!(current.user_id, user.id);
        assert_eq!(current.role, Role::Admin);
        assert_eq!(current.user_group_id, Some(group));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = test_config();
        let user = test_user(Role::User, None);
        let token = issue_access_token(&user, &config).unwrap();

        let other = AuthConfig {
            jwt_secret: "a-completely-different-signing-secret".into(),
            ..test_config()
        };
        assert!(decode_access_token(&token, &other).is_err());
        assert!(decode_expired_access_token(&token, &other).is_err());
    }

    #[test]
    fn jti_is_unique() {
        let config = test_config();
        let user = test_user(Role::User, None);

        let t1 = issue_access_token(&user, &config).unwrap();
        let t2 = issue_access_token(&user, &config).unwrap();

        let c1 = decode_access_token(&t1, &config).unwrap();
        let c2 = decode_access_token(&t2, &config).unwrap();
        assert_ne!(c1.jti, c2.jti);
    }

    #[test]
    fn refresh_token_is_url_safe() {
        let token = generate_refresh_token();
        // base64url characters only (A-Z a-z 0-9 - _), no padding.
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        // 32 bytes → 43 base64url chars.
        assert_eq!(token.len(), 43);
    }

    #[test]
    fn refresh_token_hash_is_deterministic() {
        let raw = "some-refresh-token";
        assert_eq!(hash_refresh_token(raw), hash_refresh_token(raw));
        assert_ne!(hash_refresh_token("token-a"), hash_refresh_token("token-b"));
    }
}
