//! Persistence of sign state.
//!
//! State is stored per sign address. The file store keeps one JSON file per
//! sign next to a configurable base path: `{base}-{address:02x}.conf`.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::types::SignState;

/// Default base path for state files.
pub const DEFAULT_STATE_BASE: &str = "/var/lib/ledsign/config";

/// Somewhere sign state can be saved and restored.
pub trait StateStore: Send + Sync {
    /// Loads the state saved for a sign, if any.
    fn load(&self, address: u8) -> Result<Option<SignState>>;

    /// Saves the state of a sign, replacing what was there.
    fn save(&self, address: u8, state: &SignState) -> Result<()>;
}

impl<S: StateStore + ?Sized> StateStore for Arc<S> {
    fn load(&self, address: u8) -> Result<Option<SignState>> {
        (**self).load(address)
    }

    fn save(&self, address: u8, state: &SignState) -> Result<()> {
        (**self).save(address, state)
    }
}

/// Stores state as JSON files.
#[derive(Debug, Clone)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    /// Creates a store writing next to `base`.
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Returns the file used for a sign.
    #[must_use]
    pub fn path_for(&self, address: u8) -> PathBuf {
        let mut name = self.base.as_os_str().to_owned();
        name.push(format!("-{address:02x}.conf"));
        PathBuf::from(name)
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_BASE)
    }
}

impl StateStore for FileStore {
    fn load(&self, address: u8) -> Result<Option<SignState>> {
        let path = self.path_for(address);
        tracing::info!("using state file {}", path.display());
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&data)?))
    }

    fn save(&self, address: u8, state: &SignState) -> Result<()> {
        let path = self.path_for(address);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_vec_pretty(state)?;
        write_replacing(&path, &data)?;
        tracing::debug!("saved state to {}", path.display());
        Ok(())
    }
}

/// Writes through a temporary file so a crash never leaves half a file.
fn write_replacing(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)
}

/// Keeps state in memory only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    states: Mutex<HashMap<u8, SignState>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load(&self, address: u8) -> Result<Option<SignState>> {
        let states = self
            .states
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(states.get(&address).cloned())
    }

    fn save(&self, address: u8, state: &SignState) -> Result<()> {
        let mut states = self
            .states
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        states.insert(address, state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LineId, PageId, PageParams, Variant};

    fn temp_base(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("ledsign-test-{}-{name}", std::process::id()))
            .join("config")
    }

    #[test]
    fn test_path_for_address() {
        let store = FileStore::new("/var/lib/ledsign/config");
        assert_eq!(
            store.path_for(0x1a),
            PathBuf::from("/var/lib/ledsign/config-1a.conf")
        );
    }

    #[test]
    fn test_missing_file_loads_none() {
        let store = FileStore::new(temp_base("missing"));
        assert!(store.load(0x01).unwrap().is_none());
    }

    #[test]
    fn test_file_round_trip() {
        let base = temp_base("round-trip");
        let store = FileStore::new(&base);

        let mut state = SignState::new();
        state.update_line(
            LineId::default(),
            PageId::default(),
            "HELLO ä",
            PageParams::default(),
            Variant::Extended,
        );
        store.save(0x01, &state).unwrap();

        assert_eq!(store.load(0x01).unwrap(), Some(state));
        assert!(store.load(0x02).unwrap().is_none());

        let _ = fs::remove_dir_all(base.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let base = temp_base("corrupt");
        let store = FileStore::new(&base);
        fs::create_dir_all(base.parent().unwrap()).unwrap();
        fs::write(store.path_for(0x01), b"not json").unwrap();

        assert!(store.load(0x01).is_err());

        let _ = fs::remove_dir_all(base.parent().unwrap());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.load(0x01).unwrap().is_none());
        store.save(0x01, &SignState::new()).unwrap();
        assert_eq!(store.load(0x01).unwrap(), Some(SignState::new()));
    }
}
