//! Database schema definitions

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

/// Current schema version, recorded when a seed commits
pub const SCHEMA_VERSION: i32 = 1;

/// Every table the seeder writes, in creation order
pub const TABLES: &[&str] = &[
    "ansible_versions",
    "os_versions",
    "tower_versions",
    "tower_os",
    "tower_ansible",
    "sign_off_jobs",
    "schema_version",
];

/// Create all tables and indexes
pub fn create_tables(conn: &Connection) -> Result<(), rusqlite::Error> {
    info!("Creating database schema v{}", SCHEMA_VERSION);

    conn.execute_batch(REFERENCE_SCHEMA)?;
    conn.execute_batch(LINKS_SCHEMA)?;
    conn.execute_batch(SIGN_OFF_SCHEMA)?;
    conn.execute_batch(INDEXES_SCHEMA)?;

    Ok(())
}

pub fn table_exists(conn: &Connection, table: &str) -> Result<bool, rusqlite::Error> {
    conn.query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?",
        params![table],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
}

/// A store counts as seeded once a schema_version row has been committed
pub fn is_seeded(conn: &Connection) -> Result<bool, rusqlite::Error> {
    if !table_exists(conn, "schema_version")? {
        return Ok(false);
    }

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .optional()?;

    Ok(version.is_some())
}

/// Whether the store already holds data: a seed marker, or rows in any
/// seeder table. A populated store is never written to.
pub fn is_populated(conn: &Connection) -> Result<bool, rusqlite::Error> {
    if is_seeded(conn)? {
        return Ok(true);
    }

    for table in TABLES {
        if !table_exists(conn, table)? {
            continue;
        }
        let has_rows: bool = conn.query_row(
            &format!("SELECT EXISTS (SELECT 1 FROM {})", table),
            [],
            |row| row.get(0),
        )?;
        if has_rows {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Mark the store as seeded. Must be the last write of a seed.
pub fn record_seed(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?)",
        params![SCHEMA_VERSION],
    )?;
    Ok(())
}

/// Reference data tables
const REFERENCE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS ansible_versions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    version TEXT NOT NULL UNIQUE,
    created_at TIMESTAMP NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
);

CREATE TABLE IF NOT EXISTS os_versions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    version TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL,
    family TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
);

-- Lifecycle milestones are plain dates, not timestamps
CREATE TABLE IF NOT EXISTS tower_versions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    version TEXT NOT NULL UNIQUE,
    code TEXT NOT NULL,
    general_availability DATE NOT NULL,
    end_of_full_support DATE NOT NULL,
    end_of_maintenance_support DATE NOT NULL,
    end_of_life DATE NOT NULL,
    spreadsheet_url TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
);
"#;

/// Supported pairings
const LINKS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tower_os (
    tower_id INTEGER NOT NULL,
    os_id INTEGER NOT NULL,
    PRIMARY KEY (tower_id, os_id),
    FOREIGN KEY (tower_id) REFERENCES tower_versions(id),
    FOREIGN KEY (os_id) REFERENCES os_versions(id)
);

CREATE TABLE IF NOT EXISTS tower_ansible (
    tower_id INTEGER NOT NULL,
    ansible_id INTEGER NOT NULL,
    PRIMARY KEY (tower_id, ansible_id),
    FOREIGN KEY (tower_id) REFERENCES tower_versions(id),
    FOREIGN KEY (ansible_id) REFERENCES ansible_versions(id)
);
"#;

/// Sign-off job matrix and seed marker
const SIGN_OFF_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sign_off_jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tower_id INTEGER NOT NULL,
    job TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    component TEXT NOT NULL,
    platform TEXT NOT NULL,
    deploy TEXT NOT NULL CHECK (deploy IN ('standalone', 'cluster')),
    tls TEXT NOT NULL CHECK (tls IN ('yes', 'no')),
    fips TEXT NOT NULL CHECK (fips IN ('yes', 'no')),
    bundle TEXT NOT NULL CHECK (bundle IN ('yes', 'no')),
    ansible TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),

    FOREIGN KEY (tower_id) REFERENCES tower_versions(id)
);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    seeded_at TIMESTAMP NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
);
"#;

/// Index definitions
const INDEXES_SCHEMA: &str = r#"
CREATE INDEX IF NOT EXISTS idx_sign_off_jobs_tower_id ON sign_off_jobs(tower_id);
CREATE INDEX IF NOT EXISTS idx_sign_off_jobs_platform ON sign_off_jobs(platform);
CREATE INDEX IF NOT EXISTS idx_tower_os_os_id ON tower_os(os_id);
CREATE INDEX IF NOT EXISTS idx_tower_ansible_ansible_id ON tower_ansible(ansible_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_then_seed_marker() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!is_seeded(&conn).unwrap());

        create_tables(&conn).unwrap();
        for table in TABLES {
            assert!(table_exists(&conn, table).unwrap(), "missing table {}", table);
        }
        assert!(!is_seeded(&conn).unwrap());

        record_seed(&conn).unwrap();
        assert!(is_seeded(&conn).unwrap());
    }

    #[test]
    fn test_unmarked_data_counts_as_populated() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!is_populated(&conn).unwrap());

        create_tables(&conn).unwrap();
        assert!(!is_populated(&conn).unwrap());

        conn.execute("INSERT INTO ansible_versions (version) VALUES ('2.9')", [])
            .unwrap();
        assert!(!is_seeded(&conn).unwrap());
        assert!(is_populated(&conn).unwrap());
    }

    #[test]
    fn test_create_tables_is_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
    }

    #[test]
    fn test_flag_columns_are_checked() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO sign_off_jobs (tower_id, job, display_name, component, platform, deploy, tls, fips, bundle, ansible)
             VALUES (1, 'j', 'J', 'install', 'rhel8.1', 'cluster', 'maybe', 'no', 'no', '2.9')",
            [],
        );
        assert!(result.is_err());
    }
}
