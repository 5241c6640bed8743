//! Integration tests for seeding a file-backed store
//!
//! Each test gets its own temporary directory and SQLite file.

use std::sync::Arc;
use std::thread;

use serde_json::Value;
use tempfile::TempDir;
use towerdashboard_seed::db::schema::TABLES;
use towerdashboard_seed::{
    CatalogValidationError, ReferenceCatalog, SeedingError, Store,
};

/// Helper to create a store in a temporary directory
fn create_store() -> (Store, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open(temp_dir.path().join("towerdashboard.sqlite")).unwrap();
    (store, temp_dir)
}

fn row_counts(store: &Store) -> Vec<(String, i64)> {
    let session = store.session().unwrap();
    TABLES
        .iter()
        .map(|table| (table.to_string(), session.row_count(table).unwrap()))
        .collect()
}

/// Seeding twice writes once
#[test]
fn test_seed_is_idempotent() {
    let (store, _temp) = create_store();
    let catalog = ReferenceCatalog::builtin();

    assert!(store.seed(&catalog).unwrap());
    let after_first = row_counts(&store);

    assert!(!store.seed(&catalog).unwrap());
    assert_eq!(row_counts(&store), after_first);

    let session = store.session().unwrap();
    assert!(session.is_seeded().unwrap());
    assert_eq!(session.row_count("sign_off_jobs").unwrap(), 248);
    assert_eq!(session.row_count("schema_version").unwrap(), 1);
}

/// A second handle on the same file sees the seed
#[test]
fn test_seed_refused_through_new_handle() {
    let (store, temp) = create_store();
    assert!(store.seed(&ReferenceCatalog::builtin()).unwrap());
    drop(store);

    let reopened = Store::open(temp.path().join("towerdashboard.sqlite")).unwrap();
    assert!(!reopened.seed(&ReferenceCatalog::builtin()).unwrap());
}

/// A store holding data without a seed marker is left alone
#[test]
fn test_populated_store_without_marker_is_untouched() {
    let (store, _temp) = create_store();
    store
        .with_session(|session| {
            session.conn().execute_batch(
                "CREATE TABLE ansible_versions (id INTEGER PRIMARY KEY, version TEXT UNIQUE);
                 INSERT INTO ansible_versions (version) VALUES ('2.9');",
            )?;
            Ok(())
        })
        .unwrap();
    let before = row_counts(&store);

    assert!(!store.seed(&ReferenceCatalog::builtin()).unwrap());

    assert_eq!(row_counts(&store), before);
    let session = store.session().unwrap();
    assert!(!session.is_seeded().unwrap());
    assert_eq!(session.row_count("ansible_versions").unwrap(), 1);
    assert_eq!(session.row_count("sign_off_jobs").unwrap(), 0);
}

/// An invalid catalog fails before anything is written
#[test]
fn test_invalid_catalog_writes_nothing() {
    let (store, _temp) = create_store();
    let mut catalog = ReferenceCatalog::builtin();
    catalog.products[0].general_availability = "29/01/2019".to_string();

    let err = store.seed(&catalog).unwrap_err();
    assert!(matches!(
        err,
        SeedingError::Catalog(CatalogValidationError::InvalidDate { .. })
    ));

    assert!(row_counts(&store).iter().all(|(_, count)| *count == 0));
    assert!(!store.session().unwrap().is_seeded().unwrap());

    // The store is still seedable afterwards
    assert!(store.seed(&ReferenceCatalog::builtin()).unwrap());
}

/// A failure halfway through the writes rolls everything back
#[test]
fn test_database_failure_rolls_back() {
    let (store, _temp) = create_store();

    // Shadow the last table written with one that rejects every insert
    store
        .with_session(|session| {
            session.conn().execute_batch(
                "CREATE TABLE tower_ansible (tower_id INTEGER, ansible_id INTEGER CHECK (0));",
            )?;
            Ok(())
        })
        .unwrap();

    let err = store.seed(&ReferenceCatalog::builtin()).unwrap_err();
    assert!(matches!(err, SeedingError::Database(_)));

    let session = store.session().unwrap();
    assert!(!session.is_seeded().unwrap());
    for table in [
        "ansible_versions",
        "os_versions",
        "tower_versions",
        "tower_os",
        "sign_off_jobs",
        "tower_ansible",
    ] {
        assert_eq!(session.row_count(table).unwrap(), 0, "{} should be empty", table);
    }
}

/// Persisted rows carry the documented shape
#[test]
fn test_persisted_job_row_shape() {
    let (store, _temp) = create_store();
    assert!(store.seed(&ReferenceCatalog::builtin()).unwrap());

    let session = store.session().unwrap();
    let rows = session
        .fetch_all(
            "SELECT j.*, t.version AS tower FROM sign_off_jobs j
             JOIN tower_versions t ON t.id = j.tower_id
             WHERE j.job = ?",
            ["component_external_database_platform_OpenShift_deploy_cluster_tls_yes_fips_no_bundle_no_ansible_2.9"],
        )
        .unwrap();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row["tower"], "Tower 3.7");
    assert_eq!(
        row["display_name"],
        "Openshift Cluster External Database (Tls Enabled) W/ Ansible 2.9"
    );
    assert_eq!(row["component"], "external_database");
    assert_eq!(row["platform"], "OpenShift");
    assert_eq!(row["deploy"], "cluster");
    assert_eq!(row["tls"], "yes");
    assert_eq!(row["fips"], "no");
    assert_eq!(row["bundle"], "no");
    assert_eq!(row["ansible"], "2.9");
    assert!(row["tower_id"].is_i64());

    // created_at is stored with milliseconds and read back at second precision
    let created_at = row["created_at"].as_str().unwrap();
    assert_eq!(created_at.len(), 19);
    assert!(!created_at.contains('.'));
}

/// Reference and link tables mirror the catalog
#[test]
fn test_reference_tables_match_catalog() {
    let (store, _temp) = create_store();
    let catalog = ReferenceCatalog::builtin();
    assert!(store.seed(&catalog).unwrap());

    let session = store.session().unwrap();

    let towers = session
        .fetch_all("SELECT * FROM tower_versions ORDER BY id", [])
        .unwrap();
    assert_eq!(towers.len(), catalog.products.len());
    for (row, product) in towers.iter().zip(&catalog.products) {
        assert_eq!(row["version"], product.name.as_str());
        assert_eq!(row["code"], product.code.as_str());
        assert_eq!(row["end_of_life"], product.end_of_life.as_str());
        assert_eq!(row["spreadsheet_url"], product.spreadsheet_url.as_str());
    }

    let links = session
        .fetch_all(
            "SELECT t.version AS tower, a.version AS ansible FROM tower_ansible ta
             JOIN tower_versions t ON t.id = ta.tower_id
             JOIN ansible_versions a ON a.id = ta.ansible_id
             ORDER BY t.id, a.id",
            [],
        )
        .unwrap();
    let links: Vec<(String, String)> = links
        .iter()
        .map(|r| {
            (
                r["tower"].as_str().unwrap().to_string(),
                r["ansible"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    let expected: Vec<(String, String)> = catalog
        .product_automation_pairs
        .iter()
        .map(|p| (p.product.clone(), p.automation.clone()))
        .collect();
    assert_eq!(links, expected);

    let openshift = session
        .fetch_all(
            "SELECT description, family FROM os_versions WHERE version = ?",
            ["OpenShift"],
        )
        .unwrap();
    assert_eq!(openshift[0]["family"], Value::from("openshift"));
}

/// Concurrent callers on one store seed exactly once
#[test]
fn test_concurrent_seeding_single_winner() {
    let (store, _temp) = create_store();
    let store = Arc::new(store);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.seed(&ReferenceCatalog::builtin()).unwrap())
        })
        .collect();

    let seeded: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(seeded.iter().filter(|s| **s).count(), 1);
    assert_eq!(store.session().unwrap().row_count("sign_off_jobs").unwrap(), 248);
}
