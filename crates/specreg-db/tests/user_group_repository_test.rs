//! Integration tests for the user group repository using in-memory
//! SurrealDB.

use specreg_core::error::RegistryError;
use specreg_core::models::specification::{CreateSpecification, RegistrationStatus};
use specreg_core::models::user::{CreateUser, Role};
use specreg_core::models::user_group::{CreateUserGroup, UpdateUserGroup};
use specreg_core::repository::{
    SpecificationRepository, UserGroupRepository, UserRepository,
};
use specreg_db::repository::{
    SurrealSpecificationRepository, SurrealUserGroupRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Db = Surreal<surrealdb::engine::local::Db>;

async fn setup() -> Db {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    specreg_db::run_migrations(&db).await.unwrap();
    db
}

fn spec_input(name: &str, group_id: Option<Uuid>, status: Option<RegistrationStatus>) -> CreateSpecification {
    CreateSpecification {
        specification_identifier: format!("urn:spec:{name}"),
        specification_name: name.into(),
        sector: "Finance".into(),
        sub_sector: None,
        purpose: "Testing".into(),
        specification_version: None,
        contact_information: "contact@example.com".into(),
        date_of_implementation: None,
        country: None,
        is_country_specification: false,
        underlying_specification_identifier: None,
        specification_source_link: None,
        core_version: None,
        preferred_syntax: None,
        implementation_status: None,
        registration_status: status,
        specification_type: None,
        conformance_level: None,
        user_group_id: group_id,
    }
}

#[tokio::test]
async fn create_get_and_update_group() {
    let db = setup().await;
    let repo = SurrealUserGroupRepository::new(db);

    let group = repo
        .create(CreateUserGroup {
            group_name: "Original".into(),
            description: Some("Original desc".into()),
        })
        .await
        .unwrap();

    let fetched = repo.get_by_id(group.id).await.unwrap();
    assert_eq!(fetched.group_name, "Original");

    let by_name = repo.get_by_name("Original").await.unwrap();
    assert_eq!(by_name.unwrap().id, group.id);
    assert!(repo.get_by_name("Missing").await.unwrap().is_none());

    let updated = repo
        .update(
            group.id,
            UpdateUserGroup {
                group_name: Some("Renamed".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.group_name, "Renamed");
    assert_eq!(updated.description.as_deref(), Some("Original desc")); // unchanged
}

#[tokio::test]
async fn duplicate_group_name_is_a_conflict() {
    let db = setup().await;
    let repo = SurrealUserGroupRepository::new(db);

    repo.create(CreateUserGroup {
        group_name: "unique-group".into(),
        description: None,
    })
    .await
    .unwrap();

    let result = repo
        .create(CreateUserGroup {
            group_name: "unique-group".into(),
            description: None,
        })
        .await;
    assert!(matches!(result, Err(RegistryError::Conflict { .. })));
}

#[tokio::test]
async fn delete_is_restricted_while_users_reference_the_group() {
    let db = setup().await;
    let repo = SurrealUserGroupRepository::new(db.clone());
    let user_repo = SurrealUserRepository::new(db);

    let group = repo
        .create(CreateUserGroup {
            group_name: "Occupied".into(),
            description: None,
        })
        .await
        .unwrap();

    let user = user_repo
        .create(CreateUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$argon2id$fake-hash".into(),
            first_name: None,
            last_name: None,
            role: Role::User,
            user_group_id: Some(group.id),
        })
        .await
        .unwrap();

    let blocked = repo.delete(group.id).await;
    assert!(matches!(blocked, Err(RegistryError::Conflict { .. })));

    user_repo.delete(user.id).await.unwrap();
    repo.delete(group.id).await.unwrap();
    assert!(repo.get_by_id(group.id).await.is_err());
}

#[tokio::test]
async fn delete_is_restricted_while_specifications_reference_the_group() {
    let db = setup().await;
    let repo = SurrealUserGroupRepository::new(db.clone());
    let spec_repo = SurrealSpecificationRepository::new(db);

    let group = repo
        .create(CreateUserGroup {
            group_name: "Owner".into(),
            description: None,
        })
        .await
        .unwrap();

    spec_repo
        .create(spec_input("Owned", Some(group.id), None))
        .await
        .unwrap();

    let blocked = repo.delete(group.id).await;
    assert!(matches!(blocked, Err(RegistryError::Conflict { .. })));
}

#[tokio::test]
async fn list_with_counts_aggregates_members_and_statuses() {
    let db = setup().await;
    let repo = SurrealUserGroupRepository::new(db.clone());
    let user_repo = SurrealUserRepository::new(db.clone());
    let spec_repo = SurrealSpecificationRepository::new(db);

    let busy = repo
        .create(CreateUserGroup {
            group_name: "Busy".into(),
            description: None,
        })
        .await
        .unwrap();
    let idle = repo
        .create(CreateUserGroup {
            group_name: "Idle".into(),
            description: None,
        })
        .await
        .unwrap();

    for username in ["alice", "bob"] {
        user_repo
            .create(CreateUser {
                username: username.into(),
                email: format!("{username}@example.com"),
                password_hash: "$argon2id$fake-hash".into(),
                first_name: None,
                last_name: None,
                role: Role::User,
                user_group_id: Some(busy.id),
            })
            .await
            .unwrap();
    }

    spec_repo
        .create(spec_input("s1", Some(busy.id), Some(RegistrationStatus::Submitted)))
        .await
        .unwrap();
    spec_repo
        .create(spec_input("s2", Some(busy.id), Some(RegistrationStatus::Submitted)))
        .await
        .unwrap();
    spec_repo
        .create(spec_input("s3", Some(busy.id), Some(RegistrationStatus::Verified)))
        .await
        .unwrap();
    spec_repo
        .create(spec_input("s4", Some(busy.id), None))
        .await
        .unwrap();

    let summaries = repo.list_with_counts().await.unwrap();
    assert_eq!(summaries.len(), 2);

    let busy_summary = summaries
        .iter()
        .find(|s| s.group.id == busy.id)
        .unwrap();
    assert_eq!(busy_summary.user_count, 2);
    assert_eq!(busy_summary.specification_count, 4);
    assert_eq!(busy_summary.submitted_count, 2);
    assert_eq!(busy_summary.verified_count, 1);
    assert_eq!(busy_summary.in_progress_count, 0);
    assert_eq!(busy_summary.under_review_count, 0);

    let idle_summary = summaries
        .iter()
        .find(|s| s.group.id == idle.id)
        .unwrap();
    assert_eq!(idle_summary.user_count, 0);
    assert_eq!(idle_summary.specification_count, 0);
}
