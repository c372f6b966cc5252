//! Key/value storage in the shape of browser local storage
//!
//! Values are strings under string keys. [`FileStorage`] keeps every key in
//! one JSON object on disk and rewrites it atomically; [`MemoryStorage`] is
//! the in-process variant used by tests and embedders.

use crate::error::{Error, ErrorCode, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// String key/value storage.
pub trait KeyValueStorage {
    /// Returns the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

/// In-memory storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// Storage backed by a single JSON file.
///
/// The file holds a JSON object mapping keys to string values. Reads go to
/// the in-memory copy; every write rewrites the whole file through a
/// temporary file in the same directory followed by a rename.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open storage at `path`.
    ///
    /// A missing file yields empty storage. An unreadable or malformed file
    /// also yields empty storage; the file is only replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let items = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Storage file is not a JSON object, starting empty"
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(Error::from(e)
                    .with_context(format!("Reading storage file {}", path.display())));
            }
        };

        tracing::debug!(path = %path.display(), keys = items.len(), "Opened storage");
        Ok(Self { path, items })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| Error::storage_write(&self.path).with_source(e))?;

        let content = serde_json::to_string_pretty(&self.items)?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| Error::storage_write(&self.path).with_source(e))?;
        temp.write_all(content.as_bytes())
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| Error::storage_write(&self.path).with_source(e))?;
        temp.persist(&self.path)
            .map_err(|e| Error::storage_write(&self.path).with_source(e.error))?;

        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let previous = self.items.insert(key.to_string(), value.to_string());

        if let Err(e) = self.flush() {
            match previous {
                Some(old) => self.items.insert(key.to_string(), old),
                None => self.items.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        let Some(previous) = self.items.remove(key) else {
            return Ok(());
        };

        if let Err(e) = self.flush() {
            self.items.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }
}

/// Storage that refuses every write. Reads see nothing.
///
/// Stands in for a full or read-only backend in tests.
#[derive(Debug, Default)]
pub struct ReadOnlyStorage;

impl KeyValueStorage for ReadOnlyStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set_item(&mut self, key: &str, _value: &str) -> Result<()> {
        Err(Error::new(
            ErrorCode::StorageWriteFailed,
            format!("Storage is read-only, cannot write \"{}\"", key),
        ))
    }

    fn remove_item(&mut self, _key: &str) -> Result<()> {
        Ok(())
    }
}
