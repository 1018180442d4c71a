//! Integration tests for the user and user-group administration
//! services against in-memory SurrealDB.

use specreg_auth::AuthConfig;
use specreg_core::error::RegistryError;
use specreg_core::models::user::{Role, UpdateUser};
use specreg_core::models::user_group::{CreateUserGroup, UpdateUserGroup};
use specreg_db::repository::{SurrealUserGroupRepository, SurrealUserRepository};
use specreg_service::{RegisterUser, UserGroupService, UserService};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type LocalDb = surrealdb::engine::local::Db;
type Users = UserService<SurrealUserRepository<LocalDb>, SurrealUserGroupRepository<LocalDb>>;
type Groups = UserGroupService<SurrealUserGroupRepository<LocalDb>>;

async fn setup() -> (Users, Groups, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    specreg_db::run_migrations(&db).await.unwrap();

    let group_service = UserGroupService::new(SurrealUserGroupRepository::new(db.clone()));
    let group = group_service
        .create(CreateUserGroup {
            group_name: "Registry Team".into(),
            description: None,
        })
        .await
        .unwrap();

    let user_service = UserService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealUserGroupRepository::new(db),
        AuthConfig::default(),
    );

    (user_service, group_service, group.id)
}

fn register_input(username: &str, group_id: Option<Uuid>) -> RegisterUser {
    RegisterUser {
        username: username.into(),
        email: format!("{username}@example.com"),
        password: "correct horse battery".into(),
        first_name: None,
        last_name: None,
        role: None,
        user_group_id: group_id,
    }
}

#[tokio::test]
async fn registration_defaults_and_hashing() {
    let (users, _, group_id) = setup().await;

    let user = users
        .register(register_input("alice", Some(group_id)))
        .await
        .unwrap();
    assert_eq!(user.role, Role::User);
    assert!(user.is_active);
    assert_eq!(user.user_group_id, Some(group_id));
    // The repository never sees the raw password.
    assert_ne!(user.password_hash, "correct horse battery");
    assert!(user.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn registration_conflicts_and_reference_checks() {
    let (users, _, _) = setup().await;

    users.register(register_input("alice", None)).await.unwrap();

    let taken_username = users.register(register_input("alice", None)).await;
    assert!(matches!(taken_username, Err(RegistryError::Conflict { .. })));

    let mut taken_email = register_input("bob", None);
    taken_email.email = "alice@example.com".into();
    let result = users.register(taken_email).await;
    assert!(matches!(result, Err(RegistryError::Conflict { .. })));

    let bad_group = users
        .register(register_input("carol", Some(Uuid::new_v4())))
        .await;
    assert!(matches!(bad_group, Err(RegistryError::RefNotFound { .. })));

    let mut short_password = register_input("dave", None);
    short_password.password = "short".into();
    let result = users.register(short_password).await;
    assert!(matches!(result, Err(RegistryError::BadRequest { .. })));
}

#[tokio::test]
async fn update_guards_email_uniqueness_and_group_reference() {
    let (users, _, group_id) = setup().await;

    users.register(register_input("alice", None)).await.unwrap();
    let bob = users.register(register_input("bob", None)).await.unwrap();

    let stolen_email = users
        .update(
            bob.id,
            UpdateUser {
                email: Some("alice@example.com".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(stolen_email, Err(RegistryError::Conflict { .. })));

    let bad_group = users
        .update(
            bob.id,
            UpdateUser {
                user_group_id: Some(Some(Uuid::new_v4())),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(bad_group, Err(RegistryError::RefNotFound { .. })));

    let updated = users
        .update(
            bob.id,
            UpdateUser {
                user_group_id: Some(Some(group_id)),
                first_name: Some(Some("Bob".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.user_group_id, Some(group_id));
    assert_eq!(updated.first_name.as_deref(), Some("Bob"));
}

#[tokio::test]
async fn role_and_group_assignment() {
    let (users, _, group_id) = setup().await;

    let alice = users.register(register_input("alice", None)).await.unwrap();

    let promoted = users.change_role(alice.id, Role::Admin).await.unwrap();
    assert_eq!(promoted.role, Role::Admin);

    let assigned = users
        .assign_to_group(alice.id, Some(group_id))
        .await
        .unwrap();
    assert_eq!(assigned.user_group_id, Some(group_id));

    let unassigned = users.assign_to_group(alice.id, None).await.unwrap();
    assert_eq!(unassigned.user_group_id, None);

    let missing = users.change_role(Uuid::new_v4(), Role::User).await;
    assert!(matches!(missing, Err(RegistryError::NotFound { .. })));
}

#[tokio::test]
async fn group_rename_collision_is_a_conflict() {
    let (_, groups, group_id) = setup().await;

    groups
        .create(CreateUserGroup {
            group_name: "Second".into(),
            description: None,
        })
        .await
        .unwrap();

    let duplicate = groups
        .create(CreateUserGroup {
            group_name: "Registry Team".into(),
            description: None,
        })
        .await;
    assert!(matches!(duplicate, Err(RegistryError::Conflict { .. })));

    let collision = groups
        .update(
            group_id,
            UpdateUserGroup {
                group_name: Some("Second".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(collision, Err(RegistryError::Conflict { .. })));

    // Renaming to the current name is not a collision.
    let kept = groups
        .update(
            group_id,
            UpdateUserGroup {
                group_name: Some("Registry Team".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(kept.group_name, "Registry Team");
}

#[tokio::test]
async fn group_deletion_is_blocked_while_members_exist() {
    let (users, groups, group_id) = setup().await;

    let alice = users
        .register(register_input("alice", Some(group_id)))
        .await
        .unwrap();

    let blocked = groups.delete(group_id).await;
    assert!(matches!(blocked, Err(RegistryError::Conflict { .. })));

    users.delete(alice.id).await.unwrap();
    groups.delete(group_id).await.unwrap();

    let gone = groups.get(group_id).await;
    assert!(matches!(gone, Err(RegistryError::NotFound { .. })));
}

#[tokio::test]
async fn listings() {
    let (users, groups, group_id) = setup().await;

    users.register(register_input("alice", Some(group_id))).await.unwrap();
    users.register(register_input("bob", None)).await.unwrap();

    assert_eq!(users.list().await.unwrap().len(), 2);
    assert_eq!(users.list_by_group(group_id).await.unwrap().len(), 1);

    let summaries = groups.list_with_counts().await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].user_count, 1);
}
