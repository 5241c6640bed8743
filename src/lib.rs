//! Tower support-matrix seeder
//!
//! Seeds a SQLite store with the Tower compatibility matrix: Tower releases,
//! OS platforms, Ansible versions, which of them are supported together, and
//! the sign-off test jobs each release must pass.
//!
//! ## Architecture
//!
//! ```text
//! ReferenceCatalog ──► matrix::generate ──► Vec<SignOffJob>
//!        │                                        │
//!        └──────────────► Seeder ◄────────────────┘
//!                            │  one IMMEDIATE transaction
//!                            ▼
//!                     Store / Session (SQLite)
//! ```
//!
//! - [`catalog`] - reference data, built in or loaded from TOML
//! - [`matrix`] - pure sign-off job generation with exclusion rules
//! - [`seed`] - all-or-nothing, at-most-once seeding
//! - [`db`] - scoped sessions, schema, row normalization

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod matrix;
pub mod seed;

// Re-exports
pub use catalog::{DeploymentVariant, Flag, ReferenceCatalog, Topology};
pub use config::Config;
pub use db::{Record, Session, Store};
pub use error::{CatalogValidationError, SeedingError};
pub use matrix::{generate, ExclusionRule, SignOffJob};
pub use seed::{SeedReport, Seeder};
