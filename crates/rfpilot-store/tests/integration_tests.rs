//! Integration tests for rfpilot-store
//!
//! These tests cover the RFP lifecycle, requirement rows, the company profile
//! and proposal drafts against a real SQLite database.

use rfpilot_domain::traits::{BlobStore, RfpStore};
use rfpilot_domain::{
    Capability, Category, CompanyProfile, NewRequirement, NewResponseDraft, PastProject,
    Priority, Rfp, RfpId, RfpStatus, RfpUpdate,
};
use rfpilot_store::{BlobError, FsBlobStore, SqliteStore, StoreError};
use tempfile::TempDir;

fn pending_rfp(title: &str) -> Rfp {
    Rfp::new(RfpId::new(), title, 1000)
}

fn sample_update() -> RfpUpdate {
    RfpUpdate {
        title: None,
        client_name: Some("City of Springfield".to_string()),
        deadline: Some("2025-11-15".to_string()),
        budget_min: Some(200_000.0),
        budget_max: Some(500_000.0),
        currency: "USD".to_string(),
        description: Some("Modernize the permit portal".to_string()),
        required_technologies: vec!["Rust".to_string(), "PostgreSQL".to_string()],
        extracted_data: r#"{"merged":{}}"#.to_string(),
        status: RfpStatus::Active,
    }
}

fn requirement(text: &str, category: Category, mandatory: bool) -> NewRequirement {
    NewRequirement {
        requirement_text: text.to_string(),
        category,
        priority: if mandatory { Priority::High } else { Priority::Medium },
        is_mandatory: mandatory,
    }
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_create_and_get_rfp() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let rfp = pending_rfp("Permit Portal");

    let id = store.create_rfp(rfp.clone()).unwrap();
    assert_eq!(id, rfp.id);

    let retrieved = store.get_rfp(id).unwrap().expect("RFP should exist");
    assert_eq!(retrieved, rfp);
    assert_eq!(retrieved.status, RfpStatus::Pending);
}

#[test]
fn test_get_missing_rfp() {
    let store = SqliteStore::new(":memory:").unwrap();
    assert!(store.get_rfp(RfpId::new()).unwrap().is_none());
}

#[test]
fn test_duplicate_rfp_rejected() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let rfp = pending_rfp("Permit Portal");

    assert!(store.create_rfp(rfp.clone()).is_ok());
    assert!(store.create_rfp(rfp).is_err());
}

#[test]
fn test_list_rfps_newest_first() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    assert!(store.list_rfps().unwrap().is_empty());

    let older = store.create_rfp(Rfp::new(RfpId::new(), "Older", 1000)).unwrap();
    let newer = store.create_rfp(Rfp::new(RfpId::new(), "Newer", 2000)).unwrap();
    let same_second = store.create_rfp(Rfp::new(RfpId::new(), "Same second", 2000)).unwrap();

    let ids: Vec<RfpId> = store.list_rfps().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![same_second, newer, older]);
}

#[test]
fn test_set_document() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let id = store.create_rfp(pending_rfp("Permit Portal")).unwrap();

    store.set_document(id, "rfps/permit.pdf").unwrap();

    let rfp = store.get_rfp(id).unwrap().unwrap();
    assert_eq!(rfp.document_url.as_deref(), Some("rfps/permit.pdf"));
}

#[test]
fn test_set_document_missing_rfp() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let result = store.set_document(RfpId::new(), "rfps/none.pdf");
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[test]
fn test_update_rfp_applies_fields() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let id = store.create_rfp(pending_rfp("Permit Portal")).unwrap();

    store.update_rfp(id, &sample_update()).unwrap();

    let rfp = store.get_rfp(id).unwrap().unwrap();
    assert_eq!(rfp.title, "Permit Portal", "title kept when update has none");
    assert_eq!(rfp.client_name.as_deref(), Some("City of Springfield"));
    assert_eq!(rfp.deadline.as_deref(), Some("2025-11-15"));
    assert_eq!(rfp.budget_min, Some(200_000.0));
    assert_eq!(rfp.budget_max, Some(500_000.0));
    assert_eq!(rfp.currency.as_deref(), Some("USD"));
    assert_eq!(rfp.required_technologies, vec!["Rust", "PostgreSQL"]);
    assert_eq!(rfp.extracted_data.as_deref(), Some(r#"{"merged":{}}"#));
    assert_eq!(rfp.status, RfpStatus::Active);
}

#[test]
fn test_update_rfp_overrides_title_when_present() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let id = store.create_rfp(pending_rfp("Untitled")).unwrap();

    let mut update = sample_update();
    update.title = Some("Permit Portal Modernization".to_string());
    store.update_rfp(id, &update).unwrap();

    let rfp = store.get_rfp(id).unwrap().unwrap();
    assert_eq!(rfp.title, "Permit Portal Modernization");
}

#[test]
fn test_update_rfp_is_idempotent() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let id = store.create_rfp(pending_rfp("Permit Portal")).unwrap();
    let update = sample_update();

    store.update_rfp(id, &update).unwrap();
    let first = store.get_rfp(id).unwrap().unwrap();
    store.update_rfp(id, &update).unwrap();
    let second = store.get_rfp(id).unwrap().unwrap();

    assert_eq!(first.deadline, second.deadline);
    assert_eq!(first.budget_min, second.budget_min);
    assert_eq!(first.budget_max, second.budget_max);
    assert_eq!(first.currency, second.currency);
    assert_eq!(first.status, second.status);
}

#[test]
fn test_update_missing_rfp_is_not_found() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let result = store.update_rfp(RfpId::new(), &sample_update());
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[test]
fn test_requirements_keep_insertion_order() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let id = store.create_rfp(pending_rfp("Permit Portal")).unwrap();

    let inserted = store
        .insert_requirements(
            id,
            &[
                requirement("ISO 27001 certification", Category::Compliance, true),
                requirement("24/7 support coverage", Category::Operational, false),
                requirement("Integrate with the GIS platform", Category::Technical, true),
            ],
        )
        .unwrap();
    assert_eq!(inserted, 3);

    let rows = store.list_requirements(id).unwrap();
    let texts: Vec<&str> = rows.iter().map(|r| r.requirement_text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "ISO 27001 certification",
            "24/7 support coverage",
            "Integrate with the GIS platform"
        ]
    );
    assert_eq!(rows[0].category, Category::Compliance);
    assert_eq!(rows[0].priority, Priority::High);
    assert!(rows[0].is_mandatory);
    assert_eq!(rows[1].priority, Priority::Medium);
    assert!(!rows[1].is_mandatory);
    assert!(rows.iter().all(|r| r.rfp_id == id));
}

#[test]
fn test_requirements_are_appended() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let id = store.create_rfp(pending_rfp("Permit Portal")).unwrap();
    let batch = [requirement("Provide weekly status reports", Category::Deliverable, false)];

    store.insert_requirements(id, &batch).unwrap();
    store.insert_requirements(id, &batch).unwrap();

    assert_eq!(store.list_requirements(id).unwrap().len(), 2);
}

#[test]
fn test_requirements_for_unknown_rfp_rejected() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let result = store.insert_requirements(
        RfpId::new(),
        &[requirement("Orphan", Category::Technical, false)],
    );
    assert!(result.is_err(), "Foreign key should reject orphan requirements");
}

#[test]
fn test_empty_requirement_batch() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let id = store.create_rfp(pending_rfp("Permit Portal")).unwrap();

    assert_eq!(store.insert_requirements(id, &[]).unwrap(), 0);
    assert!(store.list_requirements(id).unwrap().is_empty());
}

fn sample_company() -> CompanyProfile {
    let mut profile = CompanyProfile::new("Northwind Consulting");
    profile.industry = Some("Software".to_string());
    profile.employee_count = Some(45);
    profile.available_funds = Some(1_200_000.0);
    profile.technologies = vec!["Rust".to_string(), "Kubernetes".to_string()];
    profile.capabilities = vec![Capability {
        category: "Cloud".to_string(),
        capability: "Managed Kubernetes migrations".to_string(),
        proficiency_level: Some("expert".to_string()),
    }];
    profile.past_projects = vec![
        PastProject {
            project_name: "Transit Scheduling".to_string(),
            client_name: Some("Metro Transit".to_string()),
            budget: Some(350_000.0),
            technologies_used: vec!["Rust".to_string()],
            outcome: Some("Delivered on time".to_string()),
            completion_date: Some("2023-04-30".to_string()),
        },
        PastProject {
            project_name: "Records Archive".to_string(),
            client_name: None,
            budget: None,
            technologies_used: Vec::new(),
            outcome: None,
            completion_date: Some("2024-09-01".to_string()),
        },
    ];
    profile
}

#[test]
fn test_company_profile_absent_by_default() {
    let store = SqliteStore::new(":memory:").unwrap();
    assert!(store.get_company_profile().unwrap().is_none());
}

#[test]
fn test_company_profile_round_trip() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    let company_id = store.save_company_profile(&sample_company()).unwrap();
    let loaded = store.get_company_profile().unwrap().unwrap();

    assert_eq!(loaded.id, company_id);
    assert_eq!(loaded.name, "Northwind Consulting");
    assert_eq!(loaded.employee_count, Some(45));
    assert_eq!(loaded.technologies, vec!["Rust", "Kubernetes"]);
    assert_eq!(loaded.capabilities.len(), 1);
    assert_eq!(loaded.past_projects.len(), 2);
    assert_eq!(
        loaded.past_projects[0].project_name, "Records Archive",
        "most recent project first"
    );
}

#[test]
fn test_company_profile_resave_replaces_children() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    let company_id = store.save_company_profile(&sample_company()).unwrap();

    let mut profile = store.get_company_profile().unwrap().unwrap();
    profile.capabilities.clear();
    profile.past_projects.truncate(1);
    profile.employee_count = Some(50);

    assert_eq!(store.save_company_profile(&profile).unwrap(), company_id);

    let loaded = store.get_company_profile().unwrap().unwrap();
    assert_eq!(loaded.employee_count, Some(50));
    assert!(loaded.capabilities.is_empty());
    assert_eq!(loaded.past_projects.len(), 1);
}

#[test]
fn test_response_drafts() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let rfp_id = store.create_rfp(pending_rfp("Permit Portal")).unwrap();
    let company_id = store.save_company_profile(&sample_company()).unwrap();

    let draft_id = store
        .insert_response_draft(&NewResponseDraft {
            rfp_id,
            company_id,
            section_title: "Complete Proposal Draft".to_string(),
            draft_content: "## Executive Summary".to_string(),
        })
        .unwrap();

    let drafts = store.list_response_drafts(rfp_id).unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].id, draft_id);
    assert_eq!(drafts[0].company_id, company_id);
    assert_eq!(drafts[0].status, "draft");
    assert_eq!(drafts[0].draft_content, "## Executive Summary");
}

#[test]
fn test_persistence_across_connections() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("rfpilot.db");
    let rfp = pending_rfp("Permit Portal");

    {
        let mut store = SqliteStore::new(&db_path).unwrap();
        store.create_rfp(rfp.clone()).unwrap();
        store
            .insert_requirements(rfp.id, &[requirement("Host in the EU", Category::Compliance, true)])
            .unwrap();
    }

    let store = SqliteStore::new(&db_path).unwrap();
    assert_eq!(store.get_rfp(rfp.id).unwrap(), Some(rfp.clone()));
    assert_eq!(store.list_requirements(rfp.id).unwrap().len(), 1);
}

#[test]
fn test_blob_store_fetch() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("rfps")).unwrap();
    std::fs::write(dir.path().join("rfps/tender.txt"), b"Deadline: 15/11/2025").unwrap();

    let blobs = FsBlobStore::new(dir.path());

    assert_eq!(blobs.fetch("rfps/tender.txt").unwrap(), b"Deadline: 15/11/2025");
    assert!(matches!(blobs.fetch("rfps/missing.pdf"), Err(BlobError::NotFound(_))));
    assert!(matches!(
        blobs.fetch("../outside.txt"),
        Err(BlobError::InvalidReference(_))
    ));
}
