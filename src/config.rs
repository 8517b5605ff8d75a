//! Store configuration - passed from higher layers

use crate::core::paths;
use std::path::PathBuf;

/// Where and under which key the durable queue lives. Higher layers construct this.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub app: String,
    pub data_dir: Option<PathBuf>,
    pub storage_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self { Self::new(paths::DEFAULT_APP) }
}

impl StoreConfig {
    pub fn new(app: impl Into<String>) -> Self {
        Self { app: app.into(), data_dir: None, storage_key: paths::queue::PENDING.to_string() }
    }
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self { self.data_dir = Some(path.into()); self }
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self { self.storage_key = key.into(); self }

    /// `data_dir` if set, else `<root>/<app>/data` with root from
    /// `BEESIGN_ROOT` or the platform local data dir.
    #[cfg(feature = "native")]
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        let root = std::env::var(paths::env::ROOT)
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")));
        root.join(&self.app).join(paths::DATA_DIR)
    }

    /// File-backed store for this configuration.
    #[cfg(feature = "native")]
    pub fn open_store(&self) -> crate::store::RequestStore {
        let storage = crate::store::FileStorage::new(self.resolve_data_dir());
        crate::store::RequestStore::new(std::sync::Arc::new(storage)).with_key(self.storage_key.clone())
    }
}
