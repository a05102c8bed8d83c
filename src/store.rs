use std::path::PathBuf;
use std::sync::Mutex;

use crate::config::{StateConfig, LAST_ITEM_ID_ENV};
use crate::error::{Error, Result};
use crate::item::ItemId;

/// Where the last notified item id lives between cycles.
#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self) -> Result<Option<ItemId>>;

    async fn save(&self, id: &ItemId) -> Result<()>;
}

/// Picks the store described by the config.
pub fn from_config(config: &StateConfig) -> Box<dyn StateStore> {
    match config {
        StateConfig::Env => Box::new(EnvStore::from_env()),
        StateConfig::File { path } => Box::new(FileStore::new(path.clone())),
    }
}

/// Keeps the id in a plain text file, nothing but the id itself.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn persistence_error(&self, source: std::io::Error) -> Error {
        Error::Persistence {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait::async_trait]
impl StateStore for FileStore {
    async fn load(&self) -> Result<Option<ItemId>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(ItemId::parse(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.persistence_error(e)),
        }
    }

    #[tracing::instrument(skip(self), fields(path = ?self.path))]
    async fn save(&self, id: &ItemId) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.persistence_error(e))?;
        }

        tokio::fs::write(&self.path, id.as_str())
            .await
            .map_err(|e| self.persistence_error(e))?;

        tracing::debug!("Stored last seen id {}", id);
        Ok(())
    }
}

/// Seeded from the environment. Writes are only logged and remembered for
/// the lifetime of the process, the real value has to be updated by whatever
/// provisions the environment.
pub struct EnvStore {
    current: Mutex<Option<ItemId>>,
}

impl EnvStore {
    pub fn new(seed: Option<ItemId>) -> Self {
        Self {
            current: Mutex::new(seed),
        }
    }

    pub fn from_env() -> Self {
        let seed = std::env::var(LAST_ITEM_ID_ENV)
            .ok()
            .and_then(|raw| ItemId::parse(&raw));
        Self::new(seed)
    }
}

#[async_trait::async_trait]
impl StateStore for EnvStore {
    async fn load(&self) -> Result<Option<ItemId>> {
        Ok(self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    async fn save(&self, id: &ItemId) -> Result<()> {
        tracing::info!("[simulated] {} = {}", LAST_ITEM_ID_ENV, id);

        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(id.clone());
        Ok(())
    }
}

/// In-process store, mostly useful for driving cycles in tests.
#[derive(Default)]
pub struct MemoryStore {
    current: Mutex<Option<ItemId>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new(initial: Option<ItemId>) -> Self {
        Self {
            current: Mutex::new(initial),
            saves: Mutex::new(0),
        }
    }

    pub fn current(&self) -> Option<ItemId> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of successful `save` calls so far.
    pub fn saves(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> Result<Option<ItemId>> {
        Ok(self.current())
    }

    async fn save(&self, id: &ItemId) -> Result<()> {
        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(id.clone());
        *self.saves.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) += 1;
        Ok(())
    }
}
