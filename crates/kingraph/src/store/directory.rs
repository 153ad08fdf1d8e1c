use super::{Layout, LayoutCache, RemoteLayoutStore, TreeLayoutRecord};
use crate::error::StoreError;
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Keys up to this length made of file-name-safe characters are stored under their own name.
const MAX_PLAIN_KEY_LEN: usize = 128;
/// Readable lead kept in front of the digest of a hashed key.
const HASHED_LEAD_LEN: usize = 32;

fn is_file_name_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ',' | '.')
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_PLAIN_KEY_LEN
        && !key.starts_with('.')
        && key.chars().all(is_file_name_safe)
}

/// File content for keys whose name is a digest; the full key is kept to rule out mix-ups.
#[derive(Debug, Serialize, Deserialize)]
struct HashedEntry {
    key: String,
    value: String,
}

fn io_error(key: &str, err: std::io::Error) -> StoreError {
    StoreError::Io {
        key: key.to_string(),
        message: err.to_string(),
    }
}

fn read_optional(path: &Path, key: &str) -> Result<Option<String>, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_error(key, err)),
    }
}

fn write_creating_dirs(path: &Path, key: &str, value: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| io_error(key, err))?;
    }
    std::fs::write(path, value).map_err(|err| io_error(key, err))
}

/// Cache backed by one `<key>.json` file per layout key.
///
/// Keys that are long (a fallback key lists every person id) or not file-name safe are stored
/// as `<lead>~<sha256>.json` holding `{"key", "value"}`.
#[derive(Debug, Clone)]
pub struct DirectoryCache {
    root: PathBuf,
}

impl DirectoryCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        if is_plain_key(key) {
            return self.root.join(format!("{key}.json"));
        }
        let lead: String = key
            .chars()
            .filter(|&c| is_file_name_safe(c) && c != '.')
            .take(HASHED_LEAD_LEN)
            .collect();
        let digest = hex::encode(Sha256::digest(key.as_bytes()));
        self.root.join(format!("{lead}~{digest}.json"))
    }
}

impl LayoutCache for DirectoryCache {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let Some(text) = read_optional(&self.path_for(key), key)? else {
            return Ok(None);
        };
        if is_plain_key(key) {
            return Ok(Some(text));
        }
        match serde_json::from_str::<HashedEntry>(&text) {
            Ok(entry) if entry.key == key => Ok(Some(entry.value)),
            Ok(_) => {
                tracing::debug!(layout_key = %key, "cache file belongs to another key");
                Ok(None)
            }
            Err(err) => {
                tracing::debug!(layout_key = %key, error = %err, "unreadable cache file");
                Ok(None)
            }
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if is_plain_key(key) {
            return write_creating_dirs(&self.path_for(key), key, value);
        }
        let entry = HashedEntry {
            key: key.to_string(),
            value: value.to_string(),
        };
        write_creating_dirs(&self.path_for(key), key, &serde_json::to_string(&entry)?)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(key, err)),
        }
    }
}

/// Stand-in for the remote API: one `family-<id>.json` record file per family.
#[derive(Debug, Clone)]
pub struct DirectoryRemote {
    root: PathBuf,
}

impl DirectoryRemote {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, family_id: i64) -> PathBuf {
        self.root.join(format!("family-{family_id}.json"))
    }

    fn fetch(&self, family_id: i64) -> Result<Option<TreeLayoutRecord>, StoreError> {
        let key = format!("family-{family_id}");
        let Some(text) = read_optional(&self.path_for(family_id), &key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&self, family_id: i64, layout: &Layout) -> Result<TreeLayoutRecord, StoreError> {
        let previous_id = self.fetch(family_id).ok().flatten().and_then(|r| r.id);
        let record = TreeLayoutRecord::new(previous_id.or(Some(family_id)), family_id, layout)?;
        let key = format!("family-{family_id}");
        write_creating_dirs(
            &self.path_for(family_id),
            &key,
            &serde_json::to_string_pretty(&record)?,
        )?;
        Ok(record)
    }
}

impl RemoteLayoutStore for DirectoryRemote {
    fn fetch_layout(
        &self,
        family_id: i64,
    ) -> LocalBoxFuture<'_, Result<Option<TreeLayoutRecord>, StoreError>> {
        Box::pin(futures::future::ready(self.fetch(family_id)))
    }

    fn save_layout(
        &self,
        family_id: i64,
        layout: Layout,
    ) -> LocalBoxFuture<'_, Result<TreeLayoutRecord, StoreError>> {
        Box::pin(futures::future::ready(self.save(family_id, &layout)))
    }
}
