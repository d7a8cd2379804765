//! Shared state every command starts from

use std::path::{Path, PathBuf};
use std::sync::Arc;

use roster_core::{AppConfig, FormStateController};
use roster_model::LocationHierarchy;
use roster_sync::RemoteSyncClient;

use crate::error::Result;

/// Loaded configuration and location table
pub struct Context {
    pub config: AppConfig,
    pub locations: Arc<LocationHierarchy>,
}

impl Context {
    /// Load configuration, applying the `--store` override
    ///
    /// Without a configured store path the CLI keeps records in
    /// `<data dir>/roster/students.json`, since an in-memory store would
    /// forget everything between invocations.
    pub fn load(config: Option<&Path>, store: Option<&Path>) -> Result<Self> {
        let mut config = AppConfig::load_or_default(config)?;
        if let Some(store) = store {
            config.store.path = Some(store.to_path_buf());
        } else if config.store.path.is_none() {
            config.store.path = default_store_path();
        }
        tracing::debug!(store = ?config.store.path, "Using store");

        let locations = Arc::new(config.location_hierarchy()?);
        Ok(Self { config, locations })
    }

    /// Open the configured store
    pub fn client(&self) -> Result<RemoteSyncClient> {
        Ok(self.config.sync_client()?)
    }

    /// A fresh form writing through `client`
    pub fn form(&self, client: RemoteSyncClient) -> FormStateController {
        FormStateController::new(Arc::clone(&self.locations), client)
    }
}

fn default_store_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("roster").join("students.json"))
}

#[cfg(test)]
impl Context {
    /// Built-in locations and a store at `path`, ignoring any user config
    pub fn for_store(path: PathBuf) -> Self {
        let config = AppConfig {
            store: roster_core::StoreConfig {
                path: Some(path),
                ..Default::default()
            },
            ..Default::default()
        };
        Self {
            config,
            locations: Arc::new(LocationHierarchy::builtin()),
        }
    }
}
