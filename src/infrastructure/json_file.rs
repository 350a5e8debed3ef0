use crate::domain::ports::StateBackend;
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

/// Persists the key/value entries as one JSON object in a file.
///
/// Every value must itself be JSON; it is embedded as-is so the file stays
/// readable. The whole file is replaced on each change.
#[derive(Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonFileBackend {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    async fn read_all(&self) -> Result<Map<String, Value>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Map::new()),
            Ok(bytes) => match serde_json::from_slice(&bytes)? {
                Value::Object(map) => Ok(map),
                _ => Err(MarketError::InternalError(Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("{} does not hold a JSON object", self.path.display()),
                )))),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes a sibling temp file and renames it over the state file, so a
    /// crash mid-write never leaves a truncated state behind.
    async fn write_all(&self, entries: &Map<String, Value>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&dir).await?;
        let bytes = serde_json::to_vec_pretty(entries)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| MarketError::IoError(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| MarketError::InternalError(Box::new(e)))?
    }
}

#[async_trait]
impl StateBackend for JsonFileBackend {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let _guard = self.lock.lock().await;
        let entries = self.read_all().await?;
        entries
            .get(key)
            .map(serde_json::to_vec)
            .transpose()
            .map_err(MarketError::from)
    }

    async fn save(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let _guard = self.lock.lock().await;
        let value: Value = serde_json::from_slice(&value)?;
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        if entries.remove(key).is_some() {
            self.write_all(&entries).await?;
        }
        Ok(())
    }
}
