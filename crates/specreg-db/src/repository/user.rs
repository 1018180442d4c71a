//! SurrealDB implementation of the user repository.

use chrono::{DateTime, Utc};
use specreg_core::error::RegistryResult;
use specreg_core::models::user::{CreateUser, Role, UpdateUser, User};
use specreg_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    username: String,
    email: String,
    password_hash: String,
    first_name: Option<String>,
    last_name: Option<String>,
    role: String,
    user_group_id: Option<String>,
    is_active: bool,
    created_date: DateTime<Utc>,
    last_login_date: Option<DateTime<Utc>>,
    refresh_token: Option<String>,
    refresh_token_expiry: Option<DateTime<Utc>>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    username: String,
    email: String,
    password_hash: String,
    first_name: Option<String>,
    last_name: Option<String>,
    role: String,
    user_group_id: Option<String>,
    is_active: bool,
    created_date: DateTime<Utc>,
    last_login_date: Option<DateTime<Utc>>,
    refresh_token: Option<String>,
    refresh_token_expiry: Option<DateTime<Utc>>,
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    s.parse::<Role>().map_err(DbError::Decode)
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        let user_group_id = self
            .user_group_id
            .as_deref()
            .map(|s| parse_uuid(s, "user group"))
            .transpose()?;
        Ok(User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            role: parse_role(&self.role)?,
            user_group_id,
            is_active: self.is_active,
            created_date: self.created_date,
            last_login_date: self.last_login_date,
            refresh_token: self.refresh_token,
            refresh_token_expiry: self.refresh_token_expiry,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = parse_uuid(&self.record_id, "user")?;
        let user_group_id = self
            .user_group_id
            .as_deref()
            .map(|s| parse_uuid(s, "user group"))
            .transpose()?;
        Ok(User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            role: parse_role(&self.role)?,
            user_group_id,
            is_active: self.is_active,
            created_date: self.created_date,
            last_login_date: self.last_login_date,
            refresh_token: self.refresh_token,
            refresh_token_expiry: self.refresh_token_expiry,
        })
    }
}

/// SurrealDB implementation of the user repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_one(&self, sql: &str, bind: (&'static str, String)) -> RegistryResult<Option<User>> {
        let mut result = self
            .db
            .query(sql)
            .bind(bind)
            .await
            .map_err(DbError::from)?;
        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_user()?)),
            None => Ok(None),
        }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> RegistryResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 username = $username, \
                 email = $email, \
                 password_hash = $password_hash, \
                 first_name = $first_name, \
                 last_name = $last_name, \
                 role = $role, \
                 user_group_id = $user_group_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("username", input.username))
            .bind(("email", input.email))
            .bind(("password_hash", input.password_hash))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("role", input.role.as_str()))
            .bind((
                "user_group_id",
                input.user_group_id.map(|g| g.to_string()),
            ))
            .await
            .map_err(DbError::from)?;

        // Unique username/email indexes make a duplicate CREATE fail;
        // classify maps it to a conflict.
        let mut result = result.check().map_err(DbError::classify)?;
        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> RegistryResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('user', $id)",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.try_into_user()?)
    }

    async fn get_by_username(&self, username: &str) -> RegistryResult<Option<User>> {
        self.find_one(
            "SELECT meta::id(id) AS record_id, * FROM user \
             WHERE username = $username",
            ("username", username.to_owned()),
        )
        .await
    }

    async fn get_by_email(&self, email: &str) -> RegistryResult<Option<User>> {
        self.find_one(
            "SELECT meta::id(id) AS record_id, * FROM user \
             WHERE email = $email",
            ("email", email.to_owned()),
        )
        .await
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> RegistryResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.first_name.is_some() {
            sets.push("first_name = $first_name");
        }
        if input.last_name.is_some() {
            sets.push("last_name = $last_name");
        }
        if input.role.is_some() {
            sets.push("role = $role");
        }
        if input.user_group_id.is_some() {
            sets.push("user_group_id = $user_group_id");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        if input.last_login_date.is_some() {
            sets.push("last_login_date = $last_login_date");
        }
        if input.refresh_token.is_some() {
            sets.push("refresh_token = $refresh_token");
        }
        if input.refresh_token_expiry.is_some() {
            sets.push("refresh_token_expiry = $refresh_token_expiry");
        }

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!("UPDATE type::record('user', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(value) = input.email {
            builder = builder.bind(("email", value));
        }
        if let Some(value) = input.first_name {
            builder = builder.bind(("first_name", value));
        }
        if let Some(value) = input.last_name {
            builder = builder.bind(("last_name", value));
        }
        if let Some(value) = input.role {
            builder = builder.bind(("role", value.as_str()));
        }
        if let Some(value) = input.user_group_id {
            builder = builder.bind(("user_group_id", value.map(|g| g.to_string())));
        }
        if let Some(value) = input.is_active {
            builder = builder.bind(("is_active", value));
        }
        if let Some(value) = input.last_login_date {
            builder = builder.bind(("last_login_date", value));
        }
        if let Some(value) = input.refresh_token {
            builder = builder.bind(("refresh_token", value));
        }
        if let Some(value) = input.refresh_token_expiry {
            builder = builder.bind(("refresh_token_expiry", value));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::classify)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn delete(&self, id: Uuid) -> RegistryResult<()> {
        self.db
            .query("DELETE type::record('user', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn list(&self) -> RegistryResult<Vec<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 ORDER BY username ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(UserRowWithId::try_into_user)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }

    async fn list_by_group(&self, user_group_id: Uuid) -> RegistryResult<Vec<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE user_group_id = $group_id \
                 ORDER BY username ASC",
            )
            .bind(("group_id", user_group_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(UserRowWithId::try_into_user)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }
}
