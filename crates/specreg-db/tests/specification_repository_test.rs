//! Integration tests for the specification repository using in-memory
//! SurrealDB.

use specreg_core::models::specification::{
    CreateSpecification, RegistrationStatus, Specification, UpdateSpecification,
};
use specreg_core::models::user_group::CreateUserGroup;
use specreg_core::repository::{
    PageParams, SortField, SortOrder, SpecificationFilter, SpecificationRepository,
    UserGroupRepository,
};
use specreg_db::repository::{
    SurrealCoreElementRepository, SurrealSpecificationRepository, SurrealUserGroupRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Db = Surreal<surrealdb::engine::local::Db>;

async fn setup() -> (Db, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    specreg_db::run_migrations(&db).await.unwrap();

    let group_repo = SurrealUserGroupRepository::new(db.clone());
    let group = group_repo
        .create(CreateUserGroup {
            group_name: "Test Group".into(),
            description: None,
        })
        .await
        .unwrap();

    (db, group.id)
}

fn create_input(name: &str, group_id: Option<Uuid>) -> CreateSpecification {
    CreateSpecification {
        specification_identifier: format!("urn:spec:{name}"),
        specification_name: name.into(),
        sector: "Finance".into(),
        sub_sector: None,
        purpose: "Invoice exchange".into(),
        specification_version: Some("1.0".into()),
        contact_information: "contact@example.com".into(),
        date_of_implementation: None,
        country: None,
        is_country_specification: false,
        underlying_specification_identifier: None,
        specification_source_link: None,
        core_version: None,
        preferred_syntax: None,
        implementation_status: Some("Planned".into()),
        registration_status: Some(RegistrationStatus::Verified),
        specification_type: None,
        conformance_level: None,
        user_group_id: group_id,
    }
}

async fn create_spec(db: &Db, input: CreateSpecification) -> Specification {
    SurrealSpecificationRepository::new(db.clone())
        .create(input)
        .await
        .unwrap()
}

#[tokio::test]
async fn create_and_get_resolves_group_name() {
    let (db, group_id) = setup().await;
    let repo = SurrealSpecificationRepository::new(db.clone());

    let spec = create_spec(&db, create_input("Alpha", Some(group_id))).await;
    assert_eq!(spec.specification_name, "Alpha");
    assert_eq!(spec.user_group_id, Some(group_id));
    assert_eq!(spec.created_date, spec.modified_date);

    let fetched = repo.get_by_id(spec.id).await.unwrap();
    assert_eq!(fetched.specification.id, spec.id);
    assert_eq!(fetched.group_name.as_deref(), Some("Test Group"));
}

#[tokio::test]
async fn get_missing_returns_not_found() {
    let (db, _) = setup().await;
    let repo = SurrealSpecificationRepository::new(db);

    let result = repo.get_by_id(Uuid::new_v4()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn submitted_and_in_progress_are_hidden_from_public_listing() {
    let (db, group_id) = setup().await;
    let repo = SurrealSpecificationRepository::new(db.clone());

    let mut submitted = create_input("Submitted one", Some(group_id));
    submitted.registration_status = Some(RegistrationStatus::Submitted);
    create_spec(&db, submitted).await;

    let mut in_progress = create_input("In progress one", Some(group_id));
    in_progress.registration_status = Some(RegistrationStatus::InProgress);
    create_spec(&db, in_progress).await;

    let mut unreviewed = create_input("No status", Some(group_id));
    unreviewed.registration_status = None;
    create_spec(&db, unreviewed).await;

    create_spec(&db, create_input("Verified one", Some(group_id))).await;

    let public = repo
        .list_paginated(&SpecificationFilter::default(), PageParams::default(), false)
        .await
        .unwrap();
    let names: Vec<&str> = public
        .items
        .iter()
        .map(|s| s.specification.specification_name.as_str())
        .collect();
    assert_eq!(public.total_count, 2);
    assert!(names.contains(&"No status"));
    assert!(names.contains(&"Verified one"));

    let admin = repo
        .list_paginated(&SpecificationFilter::default(), PageParams::default(), true)
        .await
        .unwrap();
    assert_eq!(admin.total_count, 4);
}

#[tokio::test]
async fn search_term_matches_name_purpose_and_sector() {
    let (db, group_id) = setup().await;
    let repo = SurrealSpecificationRepository::new(db.clone());

    let mut a = create_input("Freight invoicing", Some(group_id));
    a.purpose = "Cross-border logistics".into();
    create_spec(&db, a).await;

    let mut b = create_input("Retail", Some(group_id));
    b.purpose = "FREIGHT settlement".into();
    create_spec(&db, b).await;

    let mut c = create_input("Unrelated", Some(group_id));
    c.sector = "Public freight".into();
    create_spec(&db, c).await;

    create_spec(&db, create_input("Health records", Some(group_id))).await;

    let filter = SpecificationFilter {
        search_term: Some("freight".into()),
        ..Default::default()
    };
    let result = repo
        .list_paginated(&filter, PageParams::default(), true)
        .await
        .unwrap();
    assert_eq!(result.total_count, 3);
}

#[tokio::test]
async fn exact_filters_are_case_insensitive() {
    let (db, group_id) = setup().await;
    let repo = SurrealSpecificationRepository::new(db.clone());

    let mut nl = create_input("Dutch CIUS", Some(group_id));
    nl.country = Some("Netherlands".into());
    nl.specification_type = Some("CIUS".into());
    create_spec(&db, nl).await;

    let mut de = create_input("German extension", Some(group_id));
    de.country = Some("Germany".into());
    de.specification_type = Some("Extension".into());
    create_spec(&db, de).await;

    let filter = SpecificationFilter {
        country: Some("NETHERLANDS".into()),
        ..Default::default()
    };
    let by_country = repo
        .list_paginated(&filter, PageParams::default(), true)
        .await
        .unwrap();
    assert_eq!(by_country.total_count, 1);
    assert_eq!(
        by_country.items[0].specification.specification_name,
        "Dutch CIUS"
    );

    let filter = SpecificationFilter {
        specification_type: Some("extension".into()),
        ..Default::default()
    };
    let by_type = repo
        .list_paginated(&filter, PageParams::default(), true)
        .await
        .unwrap();
    assert_eq!(by_type.total_count, 1);
    assert_eq!(
        by_type.items[0].specification.specification_name,
        "German extension"
    );
}

#[tokio::test]
async fn core_business_term_filter_selects_parents() {
    let (db, group_id) = setup().await;
    let repo = SurrealSpecificationRepository::new(db.clone());
    let core_repo = SurrealCoreElementRepository::new(db.clone());

    let with_term = create_spec(&db, create_input("Has BT-5", Some(group_id))).await;
    create_spec(&db, create_input("Without", Some(group_id))).await;

    core_repo
        .create(specreg_core::models::core_element::CreateCoreElement {
            specification_id: with_term.id,
            business_term_id: "BT-5".into(),
            cardinality: "1..1".into(),
            usage_note: None,
            type_of_change: "Restricted".into(),
        })
        .await
        .unwrap();

    let filter = SpecificationFilter {
        core_business_term_id: Some("bt-5".into()),
        ..Default::default()
    };
    let result = repo
        .list_paginated(&filter, PageParams::default(), true)
        .await
        .unwrap();
    assert_eq!(result.total_count, 1);
    assert_eq!(result.items[0].specification.id, with_term.id);
}

#[tokio::test]
async fn sort_by_country_descending() {
    let (db, group_id) = setup().await;
    let repo = SurrealSpecificationRepository::new(db.clone());

    for country in ["Austria", "Croatia", "Belgium"] {
        let mut input = create_input(country, Some(group_id));
        input.country = Some(country.into());
        create_spec(&db, input).await;
    }

    let filter = SpecificationFilter {
        sort_by: Some(SortField::Country),
        sort_order: SortOrder::Desc,
        ..Default::default()
    };
    let result = repo
        .list_paginated(&filter, PageParams::default(), true)
        .await
        .unwrap();
    let countries: Vec<&str> = result
        .items
        .iter()
        .map(|s| s.specification.country.as_deref().unwrap())
        .collect();
    assert_eq!(countries, vec!["Croatia", "Belgium", "Austria"]);
}

#[tokio::test]
async fn unrecognized_sort_falls_back_to_newest_modified() {
    let (db, group_id) = setup().await;
    let repo = SurrealSpecificationRepository::new(db.clone());

    let first = create_spec(&db, create_input("Older", Some(group_id))).await;
    let second = create_spec(&db, create_input("Newer", Some(group_id))).await;

    // Touch the first so it becomes the most recently modified.
    repo.update(first.id, UpdateSpecification::default())
        .await
        .unwrap();

    // An unrecognized sortBy fails to parse, leaving sort_by = None.
    assert!("zzz".parse::<SortField>().is_err());
    let filter = SpecificationFilter {
        sort_by: None,
        sort_order: SortOrder::Desc,
        ..Default::default()
    };
    let result = repo
        .list_paginated(&filter, PageParams::default(), true)
        .await
        .unwrap();
    let ids: Vec<Uuid> = result.items.iter().map(|s| s.specification.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[tokio::test]
async fn pagination_splits_pages_and_reports_totals() {
    let (db, group_id) = setup().await;
    let repo = SurrealSpecificationRepository::new(db.clone());

    for i in 0..5 {
        create_spec(&db, create_input(&format!("spec-{i}"), Some(group_id))).await;
    }

    let filter = SpecificationFilter {
        sort_by: Some(SortField::Name),
        ..Default::default()
    };

    let page1 = repo
        .list_paginated(&filter, PageParams::new(1, 2), true)
        .await
        .unwrap();
    assert_eq!(page1.items.len(), 2);
    assert_eq!(page1.total_count, 5);
    assert_eq!(page1.total_pages(), 3);
    assert!(page1.has_next());
    assert!(!page1.has_previous());

    let page3 = repo
        .list_paginated(&filter, PageParams::new(3, 2), true)
        .await
        .unwrap();
    assert_eq!(page3.items.len(), 1);
    assert!(!page3.has_next());
    assert!(page3.has_previous());
    assert_eq!(
        page3.items[0].specification.specification_name,
        "spec-4"
    );
}

#[tokio::test]
async fn list_all_applies_status_filter_and_newest_first_order() {
    let (db, group_id) = setup().await;
    let repo = SurrealSpecificationRepository::new(db.clone());

    let mut submitted = create_input("Hidden", Some(group_id));
    submitted.registration_status = Some(RegistrationStatus::Submitted);
    create_spec(&db, submitted).await;

    let older = create_spec(&db, create_input("Older", Some(group_id))).await;
    let newer = create_spec(&db, create_input("Newer", Some(group_id))).await;
    repo.update(older.id, UpdateSpecification::default())
        .await
        .unwrap();

    let public = repo.list_all(false).await.unwrap();
    let ids: Vec<Uuid> = public.iter().map(|s| s.specification.id).collect();
    assert_eq!(ids, vec![older.id, newer.id]);

    let everything = repo.list_all(true).await.unwrap();
    assert_eq!(everything.len(), 3);
}

#[tokio::test]
async fn list_by_group_orders_by_identifier() {
    let (db, group_id) = setup().await;
    let repo = SurrealSpecificationRepository::new(db.clone());

    let group_repo = SurrealUserGroupRepository::new(db.clone());
    let other = group_repo
        .create(CreateUserGroup {
            group_name: "Other Group".into(),
            description: None,
        })
        .await
        .unwrap();

    create_spec(&db, create_input("b-spec", Some(group_id))).await;
    create_spec(&db, create_input("a-spec", Some(group_id))).await;
    create_spec(&db, create_input("elsewhere", Some(other.id))).await;

    let owned = repo.list_by_group(group_id).await.unwrap();
    let identifiers: Vec<&str> = owned
        .iter()
        .map(|s| s.specification.specification_identifier.as_str())
        .collect();
    assert_eq!(identifiers, vec!["urn:spec:a-spec", "urn:spec:b-spec"]);

    let paged = repo
        .list_by_group_paginated(group_id, PageParams::new(1, 1))
        .await
        .unwrap();
    assert_eq!(paged.total_count, 2);
    assert_eq!(paged.items.len(), 1);
}

#[tokio::test]
async fn existence_checks() {
    let (db, group_id) = setup().await;
    let repo = SurrealSpecificationRepository::new(db.clone());
    let core_repo = SurrealCoreElementRepository::new(db.clone());

    let spec = create_spec(&db, create_input("Checked", Some(group_id))).await;

    assert!(repo.exists(spec.id).await.unwrap());
    assert!(!repo.exists(Uuid::new_v4()).await.unwrap());
    assert!(!repo.has_core_elements(spec.id).await.unwrap());
    assert!(!repo.has_extension_elements(spec.id).await.unwrap());

    core_repo
        .create(specreg_core::models::core_element::CreateCoreElement {
            specification_id: spec.id,
            business_term_id: "BT-1".into(),
            cardinality: "0..1".into(),
            usage_note: None,
            type_of_change: "Restricted".into(),
        })
        .await
        .unwrap();

    assert!(repo.has_core_elements(spec.id).await.unwrap());
}

#[tokio::test]
async fn assign_group_clears_owner_and_advances_modified() {
    let (db, group_id) = setup().await;
    let repo = SurrealSpecificationRepository::new(db.clone());

    let spec = create_spec(&db, create_input("Assignable", Some(group_id))).await;

    repo.assign_group(spec.id, None).await.unwrap();

    let fetched = repo.get_by_id(spec.id).await.unwrap();
    assert_eq!(fetched.specification.user_group_id, None);
    assert!(fetched.specification.modified_date >= spec.modified_date);

    let missing = repo.assign_group(Uuid::new_v4(), Some(group_id)).await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn touch_modified_is_noop_for_missing_row() {
    let (db, group_id) = setup().await;
    let repo = SurrealSpecificationRepository::new(db.clone());

    let spec = create_spec(&db, create_input("Touched", Some(group_id))).await;
    repo.touch_modified(spec.id).await.unwrap();
    let fetched = repo.get_by_id(spec.id).await.unwrap();
    assert!(fetched.specification.modified_date >= spec.modified_date);

    // Missing row: no error.
    repo.touch_modified(Uuid::new_v4()).await.unwrap();
}
