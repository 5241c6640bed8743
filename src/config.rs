//! Configuration for towerdashboard-seed

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::ReferenceCatalog;
use crate::error::CatalogValidationError;

/// Default SQLite store location
pub fn default_sqlite_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("towerdashboard")
        .join("towerdashboard.sqlite")
}

/// Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,

    /// TOML reference catalog; the built-in catalog is used when unset
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sqlite_path: default_sqlite_path(),
            catalog_path: None,
        }
    }
}

impl Config {
    /// Load config from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Save config to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), std::io::Error> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// The catalog this config points at
    pub fn catalog(&self) -> Result<ReferenceCatalog, CatalogValidationError> {
        match &self.catalog_path {
            Some(path) => ReferenceCatalog::load(path),
            None => Ok(ReferenceCatalog::builtin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.sqlite_path.ends_with("towerdashboard/towerdashboard.sqlite"));
        assert_eq!(config.catalog().unwrap(), ReferenceCatalog::builtin());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            sqlite_path: dir.path().join("store.sqlite"),
            catalog_path: Some(dir.path().join("catalog.toml")),
        };

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_catalog_file_is_an_error() {
        let config = Config {
            catalog_path: Some(PathBuf::from("/nonexistent/catalog.toml")),
            ..Default::default()
        };
        assert!(matches!(config.catalog(), Err(CatalogValidationError::Io(_))));
    }
}
