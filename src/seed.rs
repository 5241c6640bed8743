//! Store seeding
//!
//! Writes the reference catalog and its sign-off job matrix into an empty
//! store in a single transaction.
//!
//! ## Flow
//!
//! ```text
//! seed gate (in-process) → BEGIN IMMEDIATE (cross-process)
//!   ├── already seeded or holding data? → ROLLBACK, return false
//!   ├── validate catalog + generate matrix (nothing written yet)
//!   ├── create schema, insert reference rows, links, jobs
//!   └── schema_version row → COMMIT, return true
//! ```
//!
//! Any error drops the transaction before commit, so a partially written
//! matrix is never visible.

use std::collections::HashMap;

use rusqlite::{params, Connection, TransactionBehavior};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::ReferenceCatalog;
use crate::db::{schema, Store};
use crate::error::SeedingError;
use crate::matrix::SignOffJob;

/// Rows written per table by a successful seed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub ansible_versions: usize,
    pub os_versions: usize,
    pub tower_versions: usize,
    pub tower_os: usize,
    pub tower_ansible: usize,
    pub sign_off_jobs: usize,
}

/// Seeds one store
pub struct Seeder<'a> {
    store: &'a Store,
}

impl<'a> Seeder<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Seed unless already seeded; `true` if this call wrote the store
    pub fn run(&self, catalog: &ReferenceCatalog) -> Result<bool, SeedingError> {
        Ok(self.run_with_report(catalog)?.is_some())
    }

    /// Seed unless already seeded, reporting what was written.
    ///
    /// `None` means the store was already seeded and nothing changed.
    pub fn run_with_report(
        &self,
        catalog: &ReferenceCatalog,
    ) -> Result<Option<SeedReport>, SeedingError> {
        let _gate = self.store.seed_gate()?;

        self.store.with_session(|session| {
            let tx = session
                .conn_mut()
                .transaction_with_behavior(TransactionBehavior::Immediate)?;

            if schema::is_populated(&tx)? {
                warn!(
                    "Store {:?} is already populated, refusing to reseed",
                    self.store.path()
                );
                return Ok(None);
            }

            let jobs = catalog.sign_off_jobs()?;
            info!(
                "Seeding {:?}: {} tower versions, {} sign-off jobs",
                self.store.path(),
                catalog.products.len(),
                jobs.len()
            );

            schema::create_tables(&tx)?;
            let report = write_catalog(&tx, catalog, &jobs)?;
            schema::record_seed(&tx)?;
            tx.commit()?;

            info!(
                ansible_versions = report.ansible_versions,
                os_versions = report.os_versions,
                tower_versions = report.tower_versions,
                tower_os = report.tower_os,
                tower_ansible = report.tower_ansible,
                sign_off_jobs = report.sign_off_jobs,
                "Seed committed"
            );
            Ok(Some(report))
        })
    }
}

/// Insert every catalog row and job. Row ids are taken from the inserts,
/// so this must run against an empty schema.
fn write_catalog(
    conn: &Connection,
    catalog: &ReferenceCatalog,
    jobs: &[SignOffJob],
) -> Result<SeedReport, SeedingError> {
    let mut report = SeedReport::default();

    let mut ansible_ids: HashMap<&str, i64> = HashMap::new();
    {
        let mut stmt = conn.prepare("INSERT INTO ansible_versions (version) VALUES (?)")?;
        for version in &catalog.automation_versions {
            stmt.execute(params![version.name])?;
            ansible_ids.insert(&version.name, conn.last_insert_rowid());
        }
    }
    report.ansible_versions = ansible_ids.len();

    let mut os_ids: HashMap<&str, i64> = HashMap::new();
    {
        let mut stmt = conn
            .prepare("INSERT INTO os_versions (version, description, family) VALUES (?, ?, ?)")?;
        for os in &catalog.os_versions {
            stmt.execute(params![os.name, os.description, os.family])?;
            os_ids.insert(&os.name, conn.last_insert_rowid());
        }
    }
    report.os_versions = os_ids.len();

    let mut tower_ids: HashMap<&str, i64> = HashMap::new();
    {
        let mut stmt = conn.prepare(
            r#"
            INSERT INTO tower_versions (
                version, code, general_availability, end_of_full_support,
                end_of_maintenance_support, end_of_life, spreadsheet_url
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )?;
        for tower in &catalog.products {
            stmt.execute(params![
                tower.name,
                tower.code,
                tower.general_availability,
                tower.end_of_full_support,
                tower.end_of_maintenance_support,
                tower.end_of_life,
                tower.spreadsheet_url,
            ])?;
            tower_ids.insert(&tower.name, conn.last_insert_rowid());
        }
    }
    report.tower_versions = tower_ids.len();
    debug!(
        "Inserted reference rows: {} ansible, {} os, {} tower",
        report.ansible_versions, report.os_versions, report.tower_versions
    );

    {
        let mut stmt = conn.prepare("INSERT INTO tower_os (tower_id, os_id) VALUES (?, ?)")?;
        for pair in &catalog.product_os_pairs {
            stmt.execute(params![
                lookup(&tower_ids, &pair.product)?,
                lookup(&os_ids, &pair.os)?
            ])?;
            report.tower_os += 1;
        }
    }

    {
        let mut stmt = conn.prepare(
            r#"
            INSERT INTO sign_off_jobs (
                tower_id, job, display_name, component, platform,
                deploy, tls, fips, bundle, ansible
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )?;
        for job in jobs {
            stmt.execute(params![
                lookup(&tower_ids, &job.product)?,
                job.job,
                job.display_name,
                job.component,
                job.platform,
                job.deploy.as_str(),
                job.tls.as_str(),
                job.fips.as_str(),
                job.bundle.as_str(),
                job.ansible,
            ])?;
            report.sign_off_jobs += 1;
        }
    }

    {
        let mut stmt =
            conn.prepare("INSERT INTO tower_ansible (tower_id, ansible_id) VALUES (?, ?)")?;
        for pair in &catalog.product_automation_pairs {
            stmt.execute(params![
                lookup(&tower_ids, &pair.product)?,
                lookup(&ansible_ids, &pair.automation)?
            ])?;
            report.tower_ansible += 1;
        }
    }
    debug!(
        "Inserted {} tower/os links, {} tower/ansible links, {} jobs",
        report.tower_os, report.tower_ansible, report.sign_off_jobs
    );

    Ok(report)
}

fn lookup(ids: &HashMap<&str, i64>, name: &str) -> Result<i64, SeedingError> {
    ids.get(name)
        .copied()
        .ok_or_else(|| SeedingError::Internal(format!("No row id for {}", name)))
}
