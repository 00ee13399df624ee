use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Persisted entity families. Each one maps to a single document that is
/// always read and written whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Rates,
    RateHistory,
    Users,
}

impl Entity {
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Rates => "rates.json",
            Self::RateHistory => "rate_history.json",
            Self::Users => "users.json",
        }
    }
}

/// Raw document storage. `load` distinguishes "absent" (`Ok(None)`, triggers
/// seeding upstream) from unreadable (`Err`).
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn load(&self, entity: Entity) -> Result<Option<Vec<u8>>>;
    async fn save(&self, entity: Entity, bytes: Vec<u8>) -> Result<()>;
}

/// Flat-file backend keeping one JSON document per entity under a data
/// directory. The directory is created lazily on first write.
pub struct FileBackend {
    data_dir: PathBuf,
}

impl FileBackend {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, entity: Entity) -> PathBuf {
        self.data_dir.join(entity.file_name())
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn load(&self, entity: Entity) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(entity);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => {
                Err(err).with_context(|| format!("failed to read {}", path.display()))
            }
        }
    }

    async fn save(&self, entity: Entity, bytes: Vec<u8>) -> Result<()> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .with_context(|| {
                format!("failed to create data directory {}", self.data_dir.display())
            })?;
        let path = self.path_for(entity);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))
    }
}

/// In-memory backend for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryBackend {
    documents: RwLock<HashMap<Entity, Vec<u8>>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn load(&self, entity: Entity) -> Result<Option<Vec<u8>>> {
        Ok(self.documents.read().await.get(&entity).cloned())
    }

    async fn save(&self, entity: Entity, bytes: Vec<u8>) -> Result<()> {
        self.documents.write().await.insert(entity, bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("polypack-backend-test-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn memory_backend_round_trips() {
        let backend = MemoryBackend::new();
        assert!(backend.load(Entity::Rates).await.unwrap().is_none());

        backend
            .save(Entity::Rates, b"[1,2,3]".to_vec())
            .await
            .unwrap();
        assert_eq!(
            backend.load(Entity::Rates).await.unwrap().unwrap(),
            b"[1,2,3]".to_vec()
        );

        // Other entities stay independent.
        assert!(backend.load(Entity::Users).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_backend_missing_file_is_none() {
        let backend = FileBackend::new(temp_dir());
        assert!(backend.load(Entity::Users).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_backend_creates_dir_and_round_trips() {
        let dir = temp_dir();
        let backend = FileBackend::new(&dir);

        backend
            .save(Entity::Users, b"[]".to_vec())
            .await
            .unwrap();
        assert!(dir.join("users.json").exists());
        assert_eq!(
            backend.load(Entity::Users).await.unwrap().unwrap(),
            b"[]".to_vec()
        );

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
