//! Built-in reference catalog
//!
//! Sign-off platforms are only paired with the release currently under
//! sign-off; older releases list the platforms they shipped with.

use super::{
    AutomationVersion, DeploymentVariant, Flag, OsVersion, ProductAutomationPair, ProductOsPair,
    ProductVersion, ReferenceCatalog, Topology,
};

use Flag::{No, Yes};
use Topology::{Cluster, Standalone};

/// (name, code, GA, end of full support, end of maintenance support, EOL, spreadsheet)
const TOWER_VERSIONS: &[(&str, &str, &str, &str, &str, &str, &str)] = &[
    (
        "Tower 3.4",
        "tower_3.4",
        "2019-01-29",
        "2019-07-29",
        "2020-01-29",
        "2020-01-29",
        "https://docs.ansible.com/ansible-tower/3.4.0/html/installandreference/requirements_refguide.html",
    ),
    (
        "Tower 3.5",
        "tower_3.5",
        "2019-05-29",
        "2019-11-29",
        "2020-05-29",
        "2020-05-29",
        "https://docs.ansible.com/ansible-tower/3.5.0/html/installandreference/requirements_refguide.html",
    ),
    (
        "Tower 3.6",
        "tower_3.6",
        "2019-11-13",
        "2020-05-13",
        "2020-11-13",
        "2020-11-13",
        "https://docs.ansible.com/ansible-tower/3.6.0/html/installandreference/requirements_refguide.html",
    ),
    (
        "Tower 3.7",
        "tower_3.7",
        "2020-06-03",
        "2020-12-03",
        "2021-06-03",
        "2021-06-03",
        "https://docs.ansible.com/ansible-tower/3.7.0/html/installandreference/requirements_refguide.html",
    ),
];

/// (name, description, family)
const OS_VERSIONS: &[(&str, &str, &str)] = &[
    ("rhel7.6", "Red Hat Enterprise Linux 7.6", "rhel"),
    ("rhel7.7", "Red Hat Enterprise Linux 7.7", "rhel"),
    ("rhel7.8", "Red Hat Enterprise Linux 7.8", "rhel"),
    ("rhel8.0", "Red Hat Enterprise Linux 8.0", "rhel"),
    ("rhel8.1", "Red Hat Enterprise Linux 8.1", "rhel"),
    ("centos7.7", "CentOS 7.7", "rhel"),
    ("centos7.8", "CentOS 7.8", "rhel"),
    ("ubuntu16.04", "Ubuntu 16.04 LTS", "ubuntu"),
    ("ubuntu18.04", "Ubuntu 18.04 LTS", "ubuntu"),
    ("OpenShift", "Red Hat OpenShift Container Platform", "openshift"),
];

const ANSIBLE_VERSIONS: &[&str] = &["2.7", "2.8", "2.9", "devel"];

const TOWER_OS: &[(&str, &str)] = &[
    ("Tower 3.4", "rhel7.6"),
    ("Tower 3.4", "centos7.7"),
    ("Tower 3.4", "ubuntu16.04"),
    ("Tower 3.5", "rhel7.6"),
    ("Tower 3.5", "rhel7.7"),
    ("Tower 3.5", "rhel8.0"),
    ("Tower 3.5", "centos7.7"),
    ("Tower 3.5", "ubuntu16.04"),
    ("Tower 3.5", "ubuntu18.04"),
    ("Tower 3.6", "rhel7.7"),
    ("Tower 3.6", "rhel8.0"),
    ("Tower 3.6", "centos7.7"),
    ("Tower 3.6", "ubuntu16.04"),
    ("Tower 3.6", "ubuntu18.04"),
    ("Tower 3.7", "rhel7.8"),
    ("Tower 3.7", "rhel8.1"),
    ("Tower 3.7", "centos7.8"),
    ("Tower 3.7", "ubuntu18.04"),
    ("Tower 3.7", "OpenShift"),
];

const TOWER_ANSIBLE: &[(&str, &str)] = &[
    ("Tower 3.4", "2.7"),
    ("Tower 3.5", "2.7"),
    ("Tower 3.5", "2.8"),
    ("Tower 3.6", "2.8"),
    ("Tower 3.6", "2.9"),
    ("Tower 3.7", "2.9"),
    ("Tower 3.7", "devel"),
];

const SIGN_OFF_PLATFORMS: &[&str] = &["rhel7.8", "rhel8.1", "OpenShift"];

const SIGN_OFF_DEPLOYMENTS: &[DeploymentVariant] = &[
    DeploymentVariant::new(Standalone, No, No, No),
    DeploymentVariant::new(Standalone, Yes, No, No),
    DeploymentVariant::new(Standalone, No, Yes, No),
    DeploymentVariant::new(Standalone, No, No, Yes),
    DeploymentVariant::new(Cluster, No, No, No),
    DeploymentVariant::new(Cluster, Yes, No, No),
    DeploymentVariant::new(Cluster, No, Yes, No),
    DeploymentVariant::new(Cluster, No, No, Yes),
    DeploymentVariant::new(Cluster, Yes, Yes, No),
];

const SIGN_OFF_COMPONENTS: &[&str] = &[
    "install",
    "upgrade",
    "backup_and_restore",
    "external_database",
];

pub(super) fn catalog() -> ReferenceCatalog {
    ReferenceCatalog {
        products: TOWER_VERSIONS
            .iter()
            .map(|(name, code, ga, eofs, eoms, eol, url)| ProductVersion {
                name: name.to_string(),
                code: code.to_string(),
                general_availability: ga.to_string(),
                end_of_full_support: eofs.to_string(),
                end_of_maintenance_support: eoms.to_string(),
                end_of_life: eol.to_string(),
                spreadsheet_url: url.to_string(),
            })
            .collect(),
        os_versions: OS_VERSIONS
            .iter()
            .map(|(name, desc, family)| OsVersion {
                name: name.to_string(),
                description: desc.to_string(),
                family: family.to_string(),
            })
            .collect(),
        automation_versions: ANSIBLE_VERSIONS
            .iter()
            .map(|name| AutomationVersion { name: name.to_string() })
            .collect(),
        product_os_pairs: TOWER_OS
            .iter()
            .map(|(tower, os)| ProductOsPair {
                product: tower.to_string(),
                os: os.to_string(),
            })
            .collect(),
        product_automation_pairs: TOWER_ANSIBLE
            .iter()
            .map(|(tower, ansible)| ProductAutomationPair {
                product: tower.to_string(),
                automation: ansible.to_string(),
            })
            .collect(),
        sign_off_platforms: SIGN_OFF_PLATFORMS.iter().map(|s| s.to_string()).collect(),
        sign_off_deployment_variants: SIGN_OFF_DEPLOYMENTS.to_vec(),
        sign_off_components: SIGN_OFF_COMPONENTS.iter().map(|s| s.to_string()).collect(),
    }
}
