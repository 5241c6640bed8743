//! Error types for towerdashboard-seed

use thiserror::Error;

/// Raised before any job descriptor is produced when the reference catalog
/// is malformed or internally inconsistent.
#[derive(Error, Debug)]
pub enum CatalogValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid identifier token for {field}: {value:?} (whitespace is not allowed)")]
    InvalidToken { field: String, value: String },

    #[error("Invalid date for {product} {field}: {value:?}")]
    InvalidDate {
        product: String,
        field: &'static str,
        value: String,
    },

    #[error("Invalid spreadsheet URL for {product}: {reason}")]
    InvalidUrl { product: String, reason: String },

    #[error("Duplicate {kind}: {value}")]
    Duplicate { kind: &'static str, value: String },

    #[error("Unknown {kind} referenced: {value}")]
    UnknownReference { kind: &'static str, value: String },

    #[error("Job identifier {job} generated for both {first} and {second}")]
    DuplicateJob {
        job: String,
        first: String,
        second: String,
    },

    #[error("Catalog IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Raised while writing the catalog and job matrix into the store. Any
/// occurrence means the seeding transaction was rolled back.
#[derive(Error, Debug)]
pub enum SeedingError {
    #[error("Catalog validation failed: {0}")]
    Catalog(#[from] CatalogValidationError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
