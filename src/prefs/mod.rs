//! Player preferences: the durable key to integer store.
//!
//! Every write is flushed before `set_int` returns.

use bevy::prelude::*;
use std::collections::BTreeMap;
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
const LOCAL_STORAGE_KEY: &str = "plotstead_prefs";

// ═══════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("could not create prefs directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("read failed for {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("write failed for {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("rename failed for {}: {source}", .path.display())]
    Rename {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("prefs file {} is corrupted: {source}", .path.display())]
    Corrupted {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("prefs serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("browser storage is unavailable")]
    StorageUnavailable,
}

// ═══════════════════════════════════════════════════════════════════════
// STORE
// ═══════════════════════════════════════════════════════════════════════

/// Where flushed values end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefsBackend {
    /// Nothing is written anywhere. Used by tests and as the fallback.
    Memory,
    /// A JSON object on disk, replaced atomically on every flush.
    File(PathBuf),
    /// The browser's `localStorage`, under a single key.
    #[cfg(target_arch = "wasm32")]
    LocalStorage,
}

#[derive(Resource, Debug, Clone)]
pub struct PlayerPrefs {
    values: BTreeMap<String, i64>,
    backend: PrefsBackend,
}

impl Default for PlayerPrefs {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl PlayerPrefs {
    pub fn in_memory() -> Self {
        Self {
            values: BTreeMap::new(),
            backend: PrefsBackend::Memory,
        }
    }

    /// Opens the store at `path`. A missing file is an empty store.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PrefsError> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                values: BTreeMap::new(),
                backend: PrefsBackend::File(path),
            });
        }
        let json = fs::read_to_string(&path).map_err(|source| PrefsError::Read {
            path: path.clone(),
            source,
        })?;
        let values = serde_json::from_str(&json).map_err(|source| PrefsError::Corrupted {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            values,
            backend: PrefsBackend::File(path),
        })
    }

    /// Like [`PlayerPrefs::open`], but a corrupted or unreadable file is
    /// reported and replaced by an empty store at the same location.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_or_reset(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(path.clone()) {
            Ok(prefs) => prefs,
            Err(e) => {
                error!("[Prefs] {}. Starting from empty preferences.", e);
                Self {
                    values: BTreeMap::new(),
                    backend: PrefsBackend::File(path),
                }
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn open_local_storage() -> Result<Self, PrefsError> {
        let storage = local_storage().ok_or(PrefsError::StorageUnavailable)?;
        let values = match storage.get_item(LOCAL_STORAGE_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json)?,
            _ => BTreeMap::new(),
        };
        Ok(Self {
            values,
            backend: PrefsBackend::LocalStorage,
        })
    }

    pub fn backend(&self) -> &PrefsBackend {
        &self.backend
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    /// Flags are stored as integers; only an exact `1` counts as set.
    pub fn get_flag(&self, key: &str) -> bool {
        self.get_int(key, 0) == 1
    }

    pub fn set_int(&mut self, key: impl Into<String>, value: i64) -> Result<(), PrefsError> {
        self.values.insert(key.into(), value);
        self.flush()
    }

    pub fn set_flag(&mut self, key: impl Into<String>, value: bool) -> Result<(), PrefsError> {
        self.set_int(key, if value { 1 } else { 0 })
    }

    /// Writes the value and logs a flush failure instead of returning it.
    /// The in-memory value is kept either way.
    pub fn set_int_logged(&mut self, key: impl Into<String>, value: i64) {
        let key = key.into();
        if let Err(e) = self.set_int(key.clone(), value) {
            warn!("[Prefs] Could not persist '{}' = {}: {}", key, value, e);
        }
    }

    pub fn set_flag_logged(&mut self, key: impl Into<String>, value: bool) {
        self.set_int_logged(key, if value { 1 } else { 0 });
    }

    pub fn delete_key(&mut self, key: &str) -> Result<(), PrefsError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    /// Writes the whole store through the backend.
    pub fn flush(&self) -> Result<(), PrefsError> {
        match &self.backend {
            PrefsBackend::Memory => Ok(()),
            #[cfg(not(target_arch = "wasm32"))]
            PrefsBackend::File(path) => write_atomically(path, &self.values),
            #[cfg(target_arch = "wasm32")]
            PrefsBackend::File(_) => Ok(()),
            #[cfg(target_arch = "wasm32")]
            PrefsBackend::LocalStorage => {
                let storage = local_storage().ok_or(PrefsError::StorageUnavailable)?;
                let json = serde_json::to_string(&self.values)?;
                storage
                    .set_item(LOCAL_STORAGE_KEY, &json)
                    .map_err(|_| PrefsError::StorageUnavailable)
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// BACKEND HELPERS
// ═══════════════════════════════════════════════════════════════════════

/// `saves/` next to the executable.
#[cfg(not(target_arch = "wasm32"))]
pub fn default_prefs_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("saves")
}

#[cfg(not(target_arch = "wasm32"))]
fn write_atomically(path: &Path, values: &BTreeMap<String, i64>) -> Result<(), PrefsError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir).map_err(|source| PrefsError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }
    }

    let json = serde_json::to_string_pretty(values)?;
    // Write to a temp file first, then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json).map_err(|source| PrefsError::Write {
        path: tmp_path.clone(),
        source,
    })?;
    fs::rename(&tmp_path, path).map_err(|source| PrefsError::Rename {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_fall_back_to_default() {
        let prefs = PlayerPrefs::in_memory();
        assert!(!prefs.has_key("PlayerMoney"));
        assert_eq!(prefs.get_int("PlayerMoney", 1000), 1000);
        assert!(!prefs.get_flag("Plot_1_Success"));
    }

    #[test]
    fn test_only_exact_one_is_a_set_flag() {
        let mut prefs = PlayerPrefs::in_memory();
        prefs.set_int("a", 2).unwrap();
        prefs.set_int("b", 1).unwrap();
        assert!(!prefs.get_flag("a"));
        assert!(prefs.get_flag("b"));
    }

    #[test]
    fn test_file_round_trip_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut prefs = PlayerPrefs::open(&path).unwrap();
        prefs.set_int("PlayerMoney", 1000).unwrap();
        prefs.set_int("PlayerMoney", 700).unwrap();
        prefs.set_flag("Plot_2_Success", true).unwrap();
        drop(prefs);

        let reopened = PlayerPrefs::open(&path).unwrap();
        assert_eq!(reopened.get_int("PlayerMoney", 0), 700);
        assert!(reopened.get_flag("Plot_2_Success"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_open_creates_missing_directories_on_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("saves").join("prefs.json");

        let mut prefs = PlayerPrefs::open(&path).unwrap();
        prefs.set_int("CurrentPlotIndex", 2).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_corrupted_file_is_reported_then_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            PlayerPrefs::open(&path),
            Err(PrefsError::Corrupted { .. })
        ));

        let prefs = PlayerPrefs::open_or_reset(&path);
        assert!(!prefs.has_key("PlayerMoney"));
        assert_eq!(prefs.backend(), &PrefsBackend::File(path));
    }

    #[test]
    fn test_delete_key() {
        let mut prefs = PlayerPrefs::in_memory();
        prefs.set_int("CurrentPlotIndex", 0).unwrap();
        prefs.delete_key("CurrentPlotIndex").unwrap();
        assert_eq!(prefs.get_int("CurrentPlotIndex", -1), -1);
    }
}
