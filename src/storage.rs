use crate::errors::StoreError;
use crate::models::{SCHEMA_VERSION, SettingRecord, StoreData, TaskCompletionRecord};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum ConnectionState {
    Uninitialized,
    Ready,
    Failed(StoreError),
}

/// Result of a write against the store. Writes on a store that is not ready are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Applied,
    Skipped,
}

/// File-backed store with a `progress` collection keyed by task id and a
/// `settings` collection keyed by setting name.
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    disabled: bool,
    state: ConnectionState,
    data: StoreData,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>, disabled: bool) -> Self {
        Self {
            path: path.into(),
            disabled,
            state: ConnectionState::Uninitialized,
            data: StoreData::default(),
        }
    }

    pub async fn open(path: impl Into<PathBuf>, disabled: bool) -> Self {
        let mut store = Self::new(path, disabled);
        store.initialize().await;
        store
    }

    /// Opens the backing file, creating it with empty collections when absent.
    /// Calling this on a ready store leaves it untouched.
    pub async fn initialize(&mut self) -> &ConnectionState {
        if self.is_ready() {
            return &self.state;
        }

        self.state = match self.load().await {
            Ok(data) => {
                info!(
                    path = %self.path.display(),
                    completions = data.progress.len(),
                    settings = data.settings.len(),
                    "opened local store"
                );
                self.data = data;
                ConnectionState::Ready
            }
            Err(err) => {
                warn!(path = %self.path.display(), "local store unavailable, progress will not be saved: {err}");
                self.data = StoreData::default();
                ConnectionState::Failed(err)
            }
        };
        &self.state
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ConnectionState::Ready)
    }

    pub async fn put_completion(
        &mut self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<StoreOutcome, StoreError> {
        if !self.is_ready() {
            return Ok(StoreOutcome::Skipped);
        }

        let record = TaskCompletionRecord {
            id: id.to_string(),
            completed: true,
            date: now,
        };
        let previous = self.data.progress.insert(id.to_string(), record);
        if let Err(err) = self.persist().await {
            match previous {
                Some(record) => self.data.progress.insert(id.to_string(), record),
                None => self.data.progress.remove(id),
            };
            return Err(err);
        }
        Ok(StoreOutcome::Applied)
    }

    pub async fn delete_completion(&mut self, id: &str) -> Result<StoreOutcome, StoreError> {
        if !self.is_ready() {
            return Ok(StoreOutcome::Skipped);
        }

        let Some(previous) = self.data.progress.remove(id) else {
            debug!(task_id = id, "no completion record to delete");
            return Ok(StoreOutcome::Applied);
        };
        if let Err(err) = self.persist().await {
            self.data.progress.insert(id.to_string(), previous);
            return Err(err);
        }
        Ok(StoreOutcome::Applied)
    }

    pub fn get_all_completions(&self) -> Vec<TaskCompletionRecord> {
        if !self.is_ready() {
            return Vec::new();
        }
        self.data.progress.values().cloned().collect()
    }

    pub fn get_setting(&self, key: &str) -> Option<SettingRecord> {
        if !self.is_ready() {
            return None;
        }
        self.data.settings.get(key).cloned()
    }

    pub async fn put_setting(
        &mut self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<StoreOutcome, StoreError> {
        if !self.is_ready() {
            return Ok(StoreOutcome::Skipped);
        }

        let record = SettingRecord {
            key: key.to_string(),
            value,
        };
        let previous = self.data.settings.insert(key.to_string(), record);
        if let Err(err) = self.persist().await {
            match previous {
                Some(record) => self.data.settings.insert(key.to_string(), record),
                None => self.data.settings.remove(key),
            };
            return Err(err);
        }
        Ok(StoreOutcome::Applied)
    }

    async fn load(&self) -> Result<StoreData, StoreError> {
        if self.disabled {
            return Err(StoreError::Disabled);
        }

        match fs::read(&self.path).await {
            Ok(bytes) => {
                let mut data: StoreData = serde_json::from_slice(&bytes)?;
                if data.version > SCHEMA_VERSION {
                    return Err(StoreError::UnsupportedVersion {
                        found: data.version,
                        supported: SCHEMA_VERSION,
                    });
                }
                if data.version < SCHEMA_VERSION {
                    data.version = SCHEMA_VERSION;
                    write_document(&self.path, &data).await?;
                }
                Ok(data)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = self.path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent).await?;
                    }
                }
                let data = StoreData::default();
                write_document(&self.path, &data).await?;
                info!(path = %self.path.display(), "created local store");
                Ok(data)
            }
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    async fn persist(&self) -> Result<(), StoreError> {
        write_document(&self.path, &self.data).await
    }
}

async fn write_document(path: &Path, data: &StoreData) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(data)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, payload).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
