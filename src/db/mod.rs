//! SQLite store for the support matrix
//!
//! ## Sessions
//!
//! A [`Store`] only knows where the database lives. Every unit of work opens
//! an explicit [`Session`] that owns one connection; the connection is closed
//! when the session is dropped, whichever way the caller leaves its scope.
//!
//! ## Tables
//!
//! - `ansible_versions`, `os_versions`, `tower_versions` - reference data
//! - `tower_os`, `tower_ansible` - supported pairings
//! - `sign_off_jobs` - the generated sign-off job matrix
//! - `schema_version` - written last; its row marks the store as seeded

pub mod rows;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection, Params};
use tracing::{debug, info};

use crate::catalog::ReferenceCatalog;
use crate::error::SeedingError;
use crate::seed::Seeder;

pub use rows::Record;

/// How long a session waits on another writer before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the support-matrix database file
pub struct Store {
    path: PathBuf,
    /// Serializes seeding attempts made through this handle
    seed_gate: Mutex<()>,
}

impl Store {
    /// Point at a database file, creating its parent directory if needed.
    ///
    /// The file itself is created by the first session.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, SeedingError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        info!("Using SQLite store at {:?}", path);

        Ok(Self {
            path,
            seed_gate: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a session with its own connection
    pub fn session(&self) -> Result<Session, SeedingError> {
        debug!("Opening store session for {:?}", self.path);

        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;

        Ok(Session {
            conn,
            path: self.path.clone(),
        })
    }

    /// Run `f` inside a fresh session; the session is released when `f`
    /// returns, including on error.
    pub fn with_session<F, T>(&self, f: F) -> Result<T, SeedingError>
    where
        F: FnOnce(&mut Session) -> Result<T, SeedingError>,
    {
        let mut session = self.session()?;
        f(&mut session)
    }

    /// Seed the store from `catalog` unless it is already seeded.
    ///
    /// Returns `true` if this call wrote the store, `false` if it was already
    /// populated and left untouched.
    pub fn seed(&self, catalog: &ReferenceCatalog) -> Result<bool, SeedingError> {
        Seeder::new(self).run(catalog)
    }

    pub(crate) fn seed_gate(&self) -> Result<MutexGuard<'_, ()>, SeedingError> {
        self.seed_gate
            .lock()
            .map_err(|e| SeedingError::LockPoisoned(e.to_string()))
    }
}

/// One open connection to the store, closed on drop
pub struct Session {
    conn: Connection,
    path: PathBuf,
}

impl Session {
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Mutable access, needed to start transactions
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Run a query and return its rows as plain records with timestamps
    /// normalized to second precision
    pub fn fetch_all<P: Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<Record>, SeedingError> {
        Ok(rows::fetch_all(&self.conn, sql, params)?)
    }

    /// Whether a completed seed has been committed to this store
    pub fn is_seeded(&self) -> Result<bool, SeedingError> {
        Ok(schema::is_seeded(&self.conn)?)
    }

    /// Row count for one of the store's tables
    pub fn row_count(&self, table: &str) -> Result<i64, SeedingError> {
        if !schema::TABLES.contains(&table) {
            return Err(SeedingError::Internal(format!("Unknown table: {}", table)));
        }
        if !schema::table_exists(&self.conn, table)? {
            return Ok(0);
        }

        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!("Releasing store session for {:?}", self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_parent_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.sqlite");

        let store = Store::open(&path).unwrap();
        assert!(path.parent().unwrap().is_dir());
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn test_fresh_store_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("store.sqlite")).unwrap();

        let session = store.session().unwrap();
        assert!(!session.is_seeded().unwrap());
        assert_eq!(session.row_count("sign_off_jobs").unwrap(), 0);
    }

    #[test]
    fn test_row_count_rejects_unknown_table() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("store.sqlite")).unwrap();

        let session = store.session().unwrap();
        assert!(matches!(
            session.row_count("sqlite_master; DROP TABLE x"),
            Err(SeedingError::Internal(_))
        ));
    }

    #[test]
    fn test_with_session_propagates_error() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("store.sqlite")).unwrap();

        let result: Result<(), SeedingError> = store.with_session(|session| {
            session.conn().execute_batch("BEGIN IMMEDIATE;")?;
            Err(SeedingError::Internal("bail".to_string()))
        });
        assert!(matches!(result, Err(SeedingError::Internal(_))));

        // The abandoned write lock went away with the session
        store
            .with_session(|session| {
                session.conn().execute_batch("BEGIN IMMEDIATE; COMMIT;")?;
                Ok(())
            })
            .unwrap();
    }
}
