//! Reference catalog for the support matrix
//!
//! Static, versioned lists the seeder works from: Tower releases, OS
//! platforms, Ansible versions, the pairings between them, and the axes of
//! the sign-off job matrix.
//!
//! Every sequence in the catalog is an ordered list. Job identifiers and
//! display labels are derived while walking these lists in order, so a
//! catalog must be treated as ordered data, never as a set.
//!
//! ## TOML layout
//!
//! ```toml
//! sign_off_platforms = ["rhel8.1", "OpenShift"]
//! sign_off_components = ["install", "external_database"]
//!
//! [[tower_versions]]
//! name = "Tower 3.6"
//! code = "tower_3.6"
//! general_availability = "2019-11-13"
//! end_of_full_support = "2020-05-13"
//! end_of_maintenance_support = "2020-11-13"
//! end_of_life = "2020-11-13"
//! spreadsheet_url = "https://example.com/sheet"
//!
//! [[os_versions]]
//! name = "rhel8.1"
//! desc = "Red Hat Enterprise Linux 8.1"
//! family = "rhel"
//!
//! [[ansible_versions]]
//! name = "2.9"
//!
//! [[tower_os]]
//! tower = "Tower 3.6"
//! os = "rhel8.1"
//!
//! [[tower_ansible]]
//! tower = "Tower 3.6"
//! ansible = "2.9"
//!
//! [[sign_off_deployments]]
//! deploy = "cluster"
//! tls = "yes"
//! fips = "no"
//! bundle = "no"
//! ```

mod builtin;

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CatalogValidationError;
use crate::matrix::{self, SignOffJob};

// ============================================================================
// Catalog Records
// ============================================================================

/// A Tower release and its lifecycle milestones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVersion {
    pub name: String,
    pub code: String,
    pub general_availability: String,
    pub end_of_full_support: String,
    pub end_of_maintenance_support: String,
    pub end_of_life: String,
    pub spreadsheet_url: String,
}

/// An OS platform Tower can be installed on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsVersion {
    pub name: String,
    #[serde(rename = "desc", alias = "description")]
    pub description: String,
    pub family: String,
}

/// An Ansible release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationVersion {
    pub name: String,
}

/// A supported (Tower, OS) combination
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductOsPair {
    #[serde(rename = "tower")]
    pub product: String,
    pub os: String,
}

/// A supported (Tower, Ansible) combination
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductAutomationPair {
    #[serde(rename = "tower")]
    pub product: String,
    #[serde(rename = "ansible")]
    pub automation: String,
}

// ============================================================================
// Deployment Variant Axes
// ============================================================================

/// Deployment topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    Standalone,
    Cluster,
}

impl Topology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topology::Standalone => "standalone",
            Topology::Cluster => "cluster",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A yes/no feature flag, persisted as the literal strings "yes" and "no"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    Yes,
    No,
}

impl Flag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::Yes => "yes",
            Flag::No => "no",
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Flag::Yes)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One way a Tower release can be deployed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeploymentVariant {
    pub deploy: Topology,
    pub tls: Flag,
    pub fips: Flag,
    pub bundle: Flag,
}

impl DeploymentVariant {
    pub const fn new(deploy: Topology, tls: Flag, fips: Flag, bundle: Flag) -> Self {
        Self { deploy, tls, fips, bundle }
    }
}

impl fmt::Display for DeploymentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tls={} fips={} bundle={}",
            self.deploy, self.tls, self.fips, self.bundle
        )
    }
}

// ============================================================================
// Reference Catalog
// ============================================================================

/// The complete reference data a store is seeded from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCatalog {
    #[serde(rename = "tower_versions", default)]
    pub products: Vec<ProductVersion>,

    #[serde(default)]
    pub os_versions: Vec<OsVersion>,

    #[serde(rename = "ansible_versions", default)]
    pub automation_versions: Vec<AutomationVersion>,

    #[serde(rename = "tower_os", default)]
    pub product_os_pairs: Vec<ProductOsPair>,

    #[serde(rename = "tower_ansible", default)]
    pub product_automation_pairs: Vec<ProductAutomationPair>,

    /// OS names that get the full sign-off job matrix
    #[serde(default)]
    pub sign_off_platforms: Vec<String>,

    #[serde(rename = "sign_off_deployments", default)]
    pub sign_off_deployment_variants: Vec<DeploymentVariant>,

    #[serde(default)]
    pub sign_off_components: Vec<String>,
}

impl ReferenceCatalog {
    /// The catalog compiled into this crate
    pub fn builtin() -> Self {
        builtin::catalog()
    }

    /// Load a catalog from a TOML file.
    ///
    /// Only parses; call [`ReferenceCatalog::validate`] (or
    /// [`ReferenceCatalog::sign_off_jobs`]) before using the result.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogValidationError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Check the catalog for missing fields, malformed values, duplicates and
    /// dangling references.
    pub fn validate(&self) -> Result<(), CatalogValidationError> {
        for product in &self.products {
            validate_product(product)?;
        }
        for os in &self.os_versions {
            require("os_versions.name", &os.name)?;
            require("os_versions.family", &os.family)?;
        }
        for automation in &self.automation_versions {
            ensure_token("ansible_versions.name", &automation.name)?;
        }

        ensure_unique("tower version", self.products.iter().map(|p| p.name.as_str()))?;
        ensure_unique("OS version", self.os_versions.iter().map(|o| o.name.as_str()))?;
        ensure_unique(
            "ansible version",
            self.automation_versions.iter().map(|a| a.name.as_str()),
        )?;
        ensure_unique(
            "tower/os pair",
            self.product_os_pairs.iter().map(|p| PairDisplay(&p.product, &p.os)),
        )?;
        ensure_unique(
            "tower/ansible pair",
            self.product_automation_pairs
                .iter()
                .map(|p| PairDisplay(&p.product, &p.automation)),
        )?;

        let products: HashSet<&str> = self.products.iter().map(|p| p.name.as_str()).collect();
        let oses: HashSet<&str> = self.os_versions.iter().map(|o| o.name.as_str()).collect();
        let automations: HashSet<&str> = self
            .automation_versions
            .iter()
            .map(|a| a.name.as_str())
            .collect();

        for pair in &self.product_os_pairs {
            ensure_known("tower version", &pair.product, &products)?;
            ensure_known("OS version", &pair.os, &oses)?;
        }
        for pair in &self.product_automation_pairs {
            ensure_known("tower version", &pair.product, &products)?;
            ensure_known("ansible version", &pair.automation, &automations)?;
        }
        for platform in &self.sign_off_platforms {
            ensure_known("sign-off platform", platform, &oses)?;
        }

        Ok(())
    }

    /// Validate the catalog and generate its sign-off job matrix
    pub fn sign_off_jobs(&self) -> Result<Vec<SignOffJob>, CatalogValidationError> {
        self.validate()?;
        matrix::generate(
            &self.product_os_pairs,
            &self.sign_off_platforms,
            &self.sign_off_deployment_variants,
            &self.sign_off_components,
            &self.automation_versions,
        )
    }
}

fn validate_product(product: &ProductVersion) -> Result<(), CatalogValidationError> {
    require("tower_versions.name", &product.name)?;
    require("tower_versions.code", &product.code)?;

    let milestones = [
        ("general_availability", &product.general_availability),
        ("end_of_full_support", &product.end_of_full_support),
        ("end_of_maintenance_support", &product.end_of_maintenance_support),
        ("end_of_life", &product.end_of_life),
    ];
    for (field, value) in milestones {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
            CatalogValidationError::InvalidDate {
                product: product.name.clone(),
                field,
                value: value.clone(),
            }
        })?;
    }

    url::Url::parse(&product.spreadsheet_url).map_err(|e| CatalogValidationError::InvalidUrl {
        product: product.name.clone(),
        reason: e.to_string(),
    })?;

    Ok(())
}

// ============================================================================
// Validation Helpers
// ============================================================================

struct PairDisplay<'a>(&'a str, &'a str);

impl fmt::Display for PairDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

impl PartialEq for PairDisplay<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 == other.1
    }
}

impl Eq for PairDisplay<'_> {}

impl Hash for PairDisplay<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
        self.1.hash(state);
    }
}

/// Fail on an empty or blank value
pub(crate) fn require(field: &str, value: &str) -> Result<(), CatalogValidationError> {
    if value.trim().is_empty() {
        return Err(CatalogValidationError::MissingField(field.to_string()));
    }
    Ok(())
}

/// Fail on a value that cannot be used as an identifier token
pub(crate) fn ensure_token(field: &str, value: &str) -> Result<(), CatalogValidationError> {
    require(field, value)?;
    if value.chars().any(char::is_whitespace) {
        return Err(CatalogValidationError::InvalidToken {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Fail on the first repeated item
pub(crate) fn ensure_unique<T, I>(kind: &'static str, items: I) -> Result<(), CatalogValidationError>
where
    T: Eq + Hash + fmt::Display,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    for item in items {
        let rendered = item.to_string();
        if !seen.insert(item) {
            return Err(CatalogValidationError::Duplicate { kind, value: rendered });
        }
    }
    Ok(())
}

fn ensure_known(
    kind: &'static str,
    value: &str,
    known: &HashSet<&str>,
) -> Result<(), CatalogValidationError> {
    if !known.contains(value) {
        return Err(CatalogValidationError::UnknownReference {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}
