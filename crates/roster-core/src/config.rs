//! Application configuration
//!
//! Configuration is a small TOML file:
//!
//! ```toml
//! [store]
//! path = "students.json"
//! collection = "students"
//!
//! [locations]
//! file = "locations.toml"
//! ```
//!
//! Every key is optional. Without `store.path` the store lives in memory;
//! without `locations.file` the built-in location table is used. Relative
//! paths are resolved against the directory of the configuration file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use roster_model::LocationHierarchy;
use roster_sync::{DEFAULT_COLLECTION, LocalStore, RemoteSyncClient};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub locations: LocationsConfig,
}

/// Where student records are kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file backing the store; in-memory when unset
    pub path: Option<PathBuf>,
    /// Collection holding the student records
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

/// Location reference data source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationsConfig {
    /// TOML file with the country → state → city table; built-in when unset
    pub file: Option<PathBuf>,
}

impl AppConfig {
    /// Default configuration file location (`<config dir>/roster/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("roster").join("config.toml"))
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be read, or is
    /// not valid configuration.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: AppConfig =
            toml::from_str(&content).map_err(|e| Error::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load an explicitly named file, or the default file if it exists
    ///
    /// A missing default file is not an error and yields the defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |path: &mut Option<PathBuf>| {
            if let Some(p) = path.as_mut().filter(|p| p.is_relative()) {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.store.path);
        resolve(&mut self.locations.file);
    }

    /// Load the configured location table
    pub fn location_hierarchy(&self) -> Result<LocationHierarchy> {
        match &self.locations.file {
            Some(file) => Ok(LocationHierarchy::load(file)?),
            None => Ok(LocationHierarchy::builtin()),
        }
    }

    /// Open the configured store
    pub fn open_store(&self) -> Result<LocalStore> {
        match &self.store.path {
            Some(path) => Ok(LocalStore::open(path)?),
            None => Ok(LocalStore::in_memory()),
        }
    }

    /// Open the configured store and wrap it in a sync client
    pub fn sync_client(&self) -> Result<RemoteSyncClient> {
        let store = Arc::new(self.open_store()?);
        Ok(RemoteSyncClient::new(store, self.store.collection.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.store.collection, "students");
        assert!(config.store.path.is_none());
        assert!(config.locations.file.is_none());
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "").unwrap();

        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[store]
path = "data/students.json"
collection = "pupils"

[locations]
file = "/etc/roster/locations.toml"
"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();

        assert_eq!(
            config.store.path,
            Some(temp.path().join("data/students.json"))
        );
        assert_eq!(config.store.collection, "pupils");
        assert_eq!(
            config.locations.file,
            Some(PathBuf::from("/etc/roster/locations.toml"))
        );
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = AppConfig::load_or_default(Some(&temp.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[store]\ncollection = 5\n").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_location_file_is_loaded() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("locations.toml"),
            "[Kenya]\nNairobi = [\"Westlands\"]\n",
        )
        .unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[locations]\nfile = \"locations.toml\"\n").unwrap();

        let hierarchy = AppConfig::load(&path).unwrap().location_hierarchy().unwrap();

        assert_eq!(hierarchy.countries(), vec!["Kenya"]);
    }

    #[test]
    fn test_builtin_locations_without_file() {
        let hierarchy = AppConfig::default().location_hierarchy().unwrap();
        assert_eq!(hierarchy.countries(), vec!["India", "USA"]);
    }

    #[tokio::test]
    async fn test_sync_client_uses_configured_store() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig {
            store: StoreConfig {
                path: Some(temp.path().join("students.json")),
                collection: "pupils".to_string(),
            },
            ..Default::default()
        };

        let client = config.sync_client().unwrap();
        assert_eq!(client.collection(), "pupils");
        client
            .create(&roster_model::StudentRecord::default())
            .await
            .unwrap();

        let raw = fs::read_to_string(temp.path().join("students.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["pupils"].as_object().unwrap().len(), 1);
    }
}
