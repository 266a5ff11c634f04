use crate::config::app_file;
use crate::error::AppError;
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "storage.json";
const STORE_ENV_VAR: &str = "TASKLIST_STORE_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntries {
    schema_version: u32,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

pub fn store_path() -> Result<PathBuf, AppError> {
    app_file(STORE_ENV_VAR, STORE_FILE_NAME)
}

/// Key/value store kept in a single JSON file. Every mutation rewrites the
/// whole file through a temp file and a rename.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store; so is a
    /// file that cannot be read as this schema, which is logged and left to
    /// be overwritten by the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let entries = load_entries(&path)?;
        Ok(Self { path, entries })
    }

    pub fn open_default() -> Result<Self, AppError> {
        Self::open(store_path()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), AppError> {
        save_entries(&self.path, entries)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.commit(&[(key, value.to_string())], &[])
    }

    fn remove(&mut self, key: &str) -> Result<(), AppError> {
        self.commit(&[], &[key])
    }

    fn commit(&mut self, writes: &[(&str, String)], removals: &[&str]) -> Result<(), AppError> {
        let mut next = self.entries.clone();
        for (key, value) in writes {
            next.insert((*key).to_string(), value.clone());
        }
        for key in removals {
            next.remove(*key);
        }

        self.persist(&next)?;
        self.entries = next;
        Ok(())
    }
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, String>, AppError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredEntries = match serde_json::from_str(&content) {
        Ok(stored) => stored,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "unreadable store file, starting empty"
            );
            return Ok(BTreeMap::new());
        }
    };

    if stored.schema_version != SCHEMA_VERSION {
        tracing::warn!(
            path = %path.display(),
            schema_version = stored.schema_version,
            "unsupported store schema, starting empty"
        );
        return Ok(BTreeMap::new());
    }

    Ok(stored.entries)
}

fn save_entries(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredEntries {
        schema_version: SCHEMA_VERSION,
        entries: entries.clone(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;

    let staging = staging_path(path);
    std::fs::write(&staging, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&staging, permissions)
            .map_err(|err| AppError::io(err.to_string()))?;
    }

    std::fs::rename(&staging, path).map_err(|err| AppError::io(err.to_string()))?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| STORE_FILE_NAME.into());
    name.push(".tmp");
    path.with_file_name(name)
}
