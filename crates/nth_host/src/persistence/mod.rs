//! Battery RAM and RTC persistence, keyed by cartridge identity.
//!
//! Blobs are stored as JSON arrays of byte values under `<identity>.sav` and `<identity>.rtc`.
use crate::persistence::store::{SaveStore, StorageError};

pub mod store;

/// The two kinds of battery backed state a cartridge can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Ram,
    Rtc,
}

impl SaveKind {
    pub const fn extension(self) -> &'static str {
        match self {
            SaveKind::Ram => "sav",
            SaveKind::Rtc => "rtc",
        }
    }

    /// The storage key for this kind of state of the given cartridge.
    pub fn key(self, identity: &str) -> String {
        format!("{}.{}", identity, self.extension())
    }
}

/// Battery state of one cartridge. Either blob may be empty.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SaveBlobs {
    pub ram: Vec<u8>,
    pub rtc: Vec<u8>,
}

pub struct PersistenceManager<S> {
    store: S,
}

impl<S: SaveStore> PersistenceManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Fetch the saved state for `identity`.
    ///
    /// Missing, unreadable, or corrupt entries come back as empty blobs, so a damaged save behaves like a fresh
    /// cartridge instead of preventing the load.
    pub fn load(&self, identity: &str) -> SaveBlobs {
        SaveBlobs {
            ram: self.load_blob(identity, SaveKind::Ram),
            rtc: self.load_blob(identity, SaveKind::Rtc),
        }
    }

    /// Store the given state for `identity`.
    ///
    /// Empty blobs are skipped so a previously good save isn't replaced by nothing. Both blobs are always attempted,
    /// the first failure (if any) is returned after logging.
    pub fn save(&mut self, identity: &str, ram: &[u8], rtc: &[u8]) -> Result<(), StorageError> {
        let ram_result = self.save_blob(identity, SaveKind::Ram, ram);
        let rtc_result = self.save_blob(identity, SaveKind::Rtc, rtc);

        ram_result.and(rtc_result)
    }

    fn load_blob(&self, identity: &str, kind: SaveKind) -> Vec<u8> {
        let key = kind.key(identity);

        let encoded = match self.store.get(&key) {
            Ok(Some(encoded)) => encoded,
            Ok(None) => return Vec::new(),
            Err(e) => {
                match std::error::Error::source(&e) {
                    Some(source) => log::warn!("Could not read `{}`, starting without it: {}: {}", key, e, source),
                    None => log::warn!("Could not read `{}`, starting without it: {}", key, e),
                }
                return Vec::new();
            }
        };

        match decode_blob(&encoded) {
            Ok(blob) => {
                log::debug!("Loaded {} bytes from `{}`", blob.len(), key);
                blob
            }
            Err(e) => {
                log::warn!("Save entry `{}` is corrupt, starting without it: {}", key, e);
                Vec::new()
            }
        }
    }

    fn save_blob(&mut self, identity: &str, kind: SaveKind, blob: &[u8]) -> Result<(), StorageError> {
        if blob.is_empty() {
            return Ok(());
        }

        let key = kind.key(identity);

        let result = encode_blob(blob)
            .map_err(|source| StorageError::Encode {
                key: key.clone(),
                source,
            })
            .and_then(|encoded| self.store.set(&key, &encoded));

        if let Err(e) = result {
            match std::error::Error::source(&e) {
                Some(source) => log::warn!("Dropping save of `{}`: {}: {}", key, e, source),
                None => log::warn!("Dropping save of `{}`: {}", key, e),
            }
            return Err(e);
        }

        log::debug!("Saved {} bytes to `{}`", blob.len(), key);

        Ok(())
    }
}

/// Encode a blob as a JSON array of integers.
pub fn encode_blob(blob: &[u8]) -> Result<String, serde_json::Error> {
    serde_json::to_string(blob)
}

/// Decode a JSON array of integers in `0..=255`.
pub fn decode_blob(encoded: &str) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::from_str(encoded)
}
