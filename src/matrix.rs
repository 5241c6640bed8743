//! Sign-off job matrix generation
//!
//! Walks the ordered catalog sequences and emits one [`SignOffJob`] for every
//! (tower, platform, deployment variant, ansible version, component)
//! combination that survives the [`ExclusionRule`]s.
//!
//! Generation is pure: the same inputs always produce the same jobs in the
//! same order, with byte-identical identifiers and labels.
//!
//! ## Identifier format
//!
//! ```text
//! component_{component}_platform_{os}_deploy_{deploy}_tls_{tls}_fips_{fips}_bundle_{bundle}_ansible_{ansible}
//! ```
//!
//! CI job names match on this string, so the segment names and their order
//! must not change.

use std::collections::HashMap;

use serde::Serialize;

use crate::catalog::{
    ensure_token, ensure_unique, require, AutomationVersion, DeploymentVariant, Flag,
    ProductOsPair, Topology,
};
use crate::error::CatalogValidationError;

/// The only platform validated through the OpenShift installer
pub const OPENSHIFT: &str = "OpenShift";

/// Component exercised only on the OpenShift path
pub const EXTERNAL_DATABASE: &str = "external_database";

/// One cell of the sign-off test matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignOffJob {
    /// Tower version name this job signs off
    pub product: String,
    pub job: String,
    pub display_name: String,
    pub component: String,
    pub platform: String,
    pub deploy: Topology,
    pub tls: Flag,
    pub fips: Flag,
    pub bundle: Flag,
    pub ansible: String,
}

// ============================================================================
// Exclusion Rules
// ============================================================================

/// Combinations that are never turned into jobs.
///
/// Each rule is an independent veto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionRule {
    /// OpenShift is only ever tested as a cluster
    OpenShiftStandalone,
    /// OpenShift deploys do not support FIPS
    OpenShiftFips,
    /// OpenShift deploys do not use the bundle installer
    OpenShiftBundle,
    /// A regular cluster already runs against an external database, so only
    /// OpenShift gets a dedicated job for it
    ExternalDatabaseOffOpenShift,
}

impl ExclusionRule {
    pub const ALL: [ExclusionRule; 4] = [
        ExclusionRule::OpenShiftStandalone,
        ExclusionRule::OpenShiftFips,
        ExclusionRule::OpenShiftBundle,
        ExclusionRule::ExternalDatabaseOffOpenShift,
    ];

    pub fn applies(&self, os: &str, variant: &DeploymentVariant, component: &str) -> bool {
        let openshift = os == OPENSHIFT;
        match self {
            ExclusionRule::OpenShiftStandalone => {
                openshift && variant.deploy == Topology::Standalone
            }
            ExclusionRule::OpenShiftFips => openshift && variant.fips.is_yes(),
            ExclusionRule::OpenShiftBundle => openshift && variant.bundle.is_yes(),
            ExclusionRule::ExternalDatabaseOffOpenShift => {
                component == EXTERNAL_DATABASE && !openshift
            }
        }
    }
}

/// First rule that vetoes the combination, if any
pub fn excluded_by(
    os: &str,
    variant: &DeploymentVariant,
    component: &str,
) -> Option<ExclusionRule> {
    ExclusionRule::ALL
        .into_iter()
        .find(|rule| rule.applies(os, variant, component))
}

pub fn is_excluded(os: &str, variant: &DeploymentVariant, component: &str) -> bool {
    excluded_by(os, variant, component).is_some()
}

// ============================================================================
// Identifier & Label Derivation
// ============================================================================

/// Machine identifier for a job
pub fn job_id(component: &str, os: &str, variant: &DeploymentVariant, ansible: &str) -> String {
    format!(
        "component_{}_platform_{}_deploy_{}_tls_{}_fips_{}_bundle_{}_ansible_{}",
        component,
        os,
        variant.deploy.as_str(),
        variant.tls.as_str(),
        variant.fips.as_str(),
        variant.bundle.as_str(),
        ansible,
    )
}

/// Human readable label for a job, e.g.
/// `Rhel Cluster External Database (Tls Enabled) W/ Ansible 2.9`
pub fn display_name(
    component: &str,
    os: &str,
    variant: &DeploymentVariant,
    ansible: &str,
) -> String {
    let component = component.replace('_', " ");
    let suffix = format!("w/ ansible {}", ansible);

    let mut parts: Vec<&str> = vec![os, variant.deploy.as_str(), component.as_str()];
    if variant.tls.is_yes() {
        parts.push("(TLS Enabled)");
    }
    if variant.fips.is_yes() {
        parts.push("(FIPS Enabled)");
    }
    if variant.bundle.is_yes() {
        parts.push("(Bundle Installer)");
    }
    parts.push(suffix.as_str());

    title_case(&parts.join(" "))
}

/// Title-case the whole string: a cased letter following anything else is
/// uppercased, every other cased letter is lowercased. Uncased characters
/// (digits, punctuation, CJK) end a word.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_letter = false;
    for c in input.chars() {
        if c.is_lowercase() || c.is_uppercase() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}

// ============================================================================
// Generation
// ============================================================================

/// Enumerate the sign-off job matrix.
///
/// Iteration order is pairs, then variants, then ansible versions, then
/// components, each in the order given. Inputs are fully validated before the
/// result is returned; on error no jobs are produced.
pub fn generate(
    product_os_pairs: &[ProductOsPair],
    sign_off_platforms: &[String],
    deployment_variants: &[DeploymentVariant],
    components: &[String],
    automation_versions: &[AutomationVersion],
) -> Result<Vec<SignOffJob>, CatalogValidationError> {
    validate_inputs(
        product_os_pairs,
        sign_off_platforms,
        deployment_variants,
        components,
        automation_versions,
    )?;

    let mut jobs = Vec::new();
    // job id -> product that produced it
    let mut owners: HashMap<String, &str> = HashMap::new();

    for pair in product_os_pairs {
        if !sign_off_platforms.iter().any(|p| p == &pair.os) {
            continue;
        }
        for variant in deployment_variants {
            for automation in automation_versions {
                let ansible = automation.name.as_str();
                for component in components {
                    if is_excluded(&pair.os, variant, component) {
                        continue;
                    }

                    let job = job_id(component, &pair.os, variant, ansible);
                    if let Some(first) = owners.insert(job.clone(), &pair.product) {
                        return Err(CatalogValidationError::DuplicateJob {
                            job,
                            first: first.to_string(),
                            second: pair.product.clone(),
                        });
                    }

                    jobs.push(SignOffJob {
                        product: pair.product.clone(),
                        display_name: display_name(component, &pair.os, variant, ansible),
                        job,
                        component: component.clone(),
                        platform: pair.os.clone(),
                        deploy: variant.deploy,
                        tls: variant.tls,
                        fips: variant.fips,
                        bundle: variant.bundle,
                        ansible: ansible.to_string(),
                    });
                }
            }
        }
    }

    Ok(jobs)
}

fn validate_inputs(
    product_os_pairs: &[ProductOsPair],
    sign_off_platforms: &[String],
    deployment_variants: &[DeploymentVariant],
    components: &[String],
    automation_versions: &[AutomationVersion],
) -> Result<(), CatalogValidationError> {
    for pair in product_os_pairs {
        require("tower_os.tower", &pair.product)?;
        require("tower_os.os", &pair.os)?;
    }
    for platform in sign_off_platforms {
        ensure_token("sign_off_platforms", platform)?;
    }
    for component in components {
        ensure_token("sign_off_components", component)?;
    }
    for automation in automation_versions {
        ensure_token("ansible_versions.name", &automation.name)?;
    }

    ensure_unique("sign-off platform", sign_off_platforms.iter().map(String::as_str))?;
    ensure_unique("sign-off component", components.iter().map(String::as_str))?;
    ensure_unique("deployment variant", deployment_variants.iter())?;
    ensure_unique(
        "ansible version",
        automation_versions.iter().map(|a| a.name.as_str()),
    )?;

    Ok(())
}
