use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("`{0}` is not a valid save key")]
    InvalidKey(String),
    #[error("failed to read save entry `{key}`")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode save entry `{key}`")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write save entry `{key}`")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Durable key-value storage for textual save entries.
///
/// Writes replace the whole entry at once, a reader never sees half of an old and half of a new value.
pub trait SaveStore {
    /// Fetch the entry for `key`, `Ok(None)` if it was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Keeps every entry in memory, lost when dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SaveStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stores every entry as a file named after its key inside a single directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// The directory is created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        // Keys are cartridge file names plus an extension, they should never be able to leave the directory.
        let is_plain_name = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(|c: char| matches!(c, '/' | '\\' | '\0'));

        if is_plain_name {
            Ok(self.root.join(key))
        } else {
            Err(StorageError::InvalidKey(key.to_string()))
        }
    }
}

impl SaveStore for DirectoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.entry_path(key)?;

        match std::fs::read_to_string(path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;
        let temp_path = self.root.join(format!("{key}.tmp"));
        let write_err = |source| StorageError::Write {
            key: key.to_string(),
            source,
        };

        std::fs::create_dir_all(&self.root).map_err(write_err)?;

        let result = std::fs::write(&temp_path, value).and_then(|_| std::fs::rename(&temp_path, &path));

        if result.is_err() {
            // The old entry is still intact, only the partial temp file needs to go.
            let _ = std::fs::remove_file(&temp_path);
        }

        result.map_err(write_err)
    }
}
