//! Persisted session snapshots and the stores that hold them
//!
//! A snapshot is written after every mutating session operation and read once
//! when a session starts. It carries an absolute expiry; expired or
//! undecodable snapshots are discarded.

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    field::RawValue,
    session::Stage,
};

/// Default key snapshots are stored under
pub const DEFAULT_STORAGE_KEY: &str = "quiz_scoring_forms_form";

/// The persisted part of a form session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub expires_at: DateTime<Utc>,
    pub values: BTreeMap<String, RawValue>,
    pub current_section: Stage,
    pub current_question_index: usize,
    /// Signed so an out-of-range value still decodes and can be rejected
    pub global_question_index: i64,
}

impl Snapshot {
    /// # Errors
    ///
    /// Returns `Error::Parse` if `raw` is not a snapshot document.
    pub fn decode(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// # Errors
    ///
    /// Returns `Error::Parse` if serialization fails.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// The stored global index, if it addresses one of `total` questions
    pub fn global_index_within(&self, total: usize) -> Option<usize> {
        usize::try_from(self.global_question_index)
            .ok()
            .filter(|index| *index < total)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// STORES
// ═══════════════════════════════════════════════════════════════════════════

/// Durable slot for one serialized snapshot.
///
/// # Error Conditions
///
/// - `Storage`: the backing medium cannot be read or written
pub trait SnapshotStore: Send + Sync {
    /// Read the stored snapshot text, if any.
    ///
    /// # Errors
    ///
    /// Returns `Storage` when the slot cannot be read.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the stored snapshot text.
    ///
    /// # Errors
    ///
    /// Returns `Storage` when the slot cannot be written.
    fn persist(&self, data: &str) -> Result<()>;

    /// Remove the stored snapshot. Clearing an empty slot succeeds.
    ///
    /// # Errors
    ///
    /// Returns `Storage` when the slot cannot be removed.
    fn clear(&self) -> Result<()>;
}

/// In-process store, used by tests and embedders without durable storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(data: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(data.into())),
        }
    }

    /// Current contents, `None` when empty or the lock is poisoned
    pub fn contents(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn with_slot<T>(&self, f: impl FnOnce(&mut Option<String>) -> T) -> Result<T> {
        self.slot
            .lock()
            .map(|mut slot| f(&mut slot))
            .map_err(|e| Error::Storage(format!("Snapshot lock poisoned: {e}")))
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<String>> {
        self.with_slot(|slot| slot.clone())
    }

    fn persist(&self, data: &str) -> Result<()> {
        self.with_slot(|slot| *slot = Some(data.to_string()))
    }

    fn clear(&self) -> Result<()> {
        self.with_slot(|slot| *slot = None)
    }
}

/// One JSON file per storage key under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(&self, action: &str, err: &std::io::Error) -> Error {
        Error::Storage(format!(
            "Failed to {action} snapshot {}: {err}",
            self.path.display()
        ))
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.storage_error("read", &e)),
        }
    }

    fn persist(&self, data: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.storage_error("prepare", &e))?;
        }
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, data).map_err(|e| self.storage_error("write", &e))?;
        fs::rename(&staging, &self.path).map_err(|e| self.storage_error("replace", &e))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.storage_error("remove", &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn snapshot(global: i64) -> Snapshot {
        Snapshot {
            expires_at: Utc::now() + Duration::minutes(10),
            values: BTreeMap::from([("qsf_name".to_string(), RawValue::from("Ada"))]),
            current_section: Stage::Questions,
            current_question_index: 1,
            global_question_index: global,
        }
    }

    #[test]
    fn test_snapshot_json_shape() -> Result<()> {
        let encoded = snapshot(3).encode()?;
        assert!(encoded.contains("\"currentSection\":\"questions\""));
        assert!(encoded.contains("\"globalQuestionIndex\":3"));
        assert_eq!(Snapshot::decode(&encoded)?, snapshot(3));
        Ok(())
    }

    #[test]
    fn test_corrupt_snapshot_fails_to_decode() {
        assert!(matches!(Snapshot::decode("{\"values\": 7"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_expiry_is_inclusive() {
        let snap = snapshot(0);
        assert!(!snap.is_expired(snap.expires_at - Duration::seconds(1)));
        assert!(snap.is_expired(snap.expires_at));
    }

    #[test]
    fn test_global_index_range() {
        assert_eq!(snapshot(2).global_index_within(3), Some(2));
        assert_eq!(snapshot(3).global_index_within(3), None);
        assert_eq!(snapshot(-1).global_index_within(3), None);
    }

    #[test]
    fn test_memory_store_round_trip() -> Result<()> {
        let store = MemoryStore::new();
        assert_eq!(store.load()?, None);
        store.persist("{}")?;
        assert_eq!(store.contents().as_deref(), Some("{}"));
        store.clear()?;
        assert_eq!(store.load()?, None);
        Ok(())
    }

    #[test]
    fn test_file_store_persists_under_key() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FileStore::new(dir.path().join("nested"), DEFAULT_STORAGE_KEY);
        assert_eq!(store.load()?, None);
        store.persist("{\"a\":1}")?;
        assert!(store.path().ends_with("quiz_scoring_forms_form.json"));
        assert_eq!(store.load()?.as_deref(), Some("{\"a\":1}"));
        store.clear()?;
        store.clear()?;
        assert_eq!(store.load()?, None);
        Ok(())
    }
}
