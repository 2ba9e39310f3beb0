use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::Path;
use crate::error::ErrorKind;

#[derive(Debug, Clone, thiserror::Error)]
pub enum NameError {
    #[error("name resolution is unavailable offline")]
    Offline,
    #[error("no record for name {0:?}")]
    NotFound(String),
}

impl NameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NameError::Offline => ErrorKind::Offline,
            NameError::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

/// Maps a mutable name to the path it currently points at
#[async_trait]
pub trait NameSystem: Send + Sync + std::fmt::Debug {
    async fn resolve(&self, name: &str) -> Result<Path, NameError>;
}

/// Used when no naming system is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineNameSystem;

#[async_trait]
impl NameSystem for OfflineNameSystem {
    async fn resolve(&self, _name: &str) -> Result<Path, NameError> {
        Err(NameError::Offline)
    }
}

/// In-memory name records
#[derive(Debug, Clone, Default)]
pub struct MemoryNameSystem {
    records: Arc<RwLock<HashMap<String, Path>>>,
}

impl MemoryNameSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `name` at `path`, returning the previous target
    pub fn insert(&self, name: impl Into<String>, path: Path) -> Option<Path> {
        self.records.write().insert(name.into(), path)
    }

    pub fn remove(&self, name: &str) -> Option<Path> {
        self.records.write().remove(name)
    }
}

#[async_trait]
impl NameSystem for MemoryNameSystem {
    async fn resolve(&self, name: &str) -> Result<Path, NameError> {
        self.records
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| NameError::NotFound(name.to_string()))
    }
}
