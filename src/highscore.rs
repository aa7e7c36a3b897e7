//! The best score across runs and the storage behind it.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::atomic_rename;

pub const HIGH_SCORE_KEY: &str = "why_am_i_flying_highscore";

/// Key-value storage for the single persisted best score.
pub trait ScoreStore {
    /// `None` when nothing has been stored yet.
    fn load(&self) -> Option<u32>;
    fn store(&mut self, value: u32) -> Result<()>;
}

/// A JSON object on disk, `{ "<key>": <score> }`. Other keys are preserved.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Option<BTreeMap<String, serde_json::Value>> {
        let s = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&s).ok()
    }
}

impl ScoreStore for JsonFileStore {
    fn load(&self) -> Option<u32> {
        let map = self.read_map()?;
        let value = map.get(HIGH_SCORE_KEY)?.as_u64()?;
        u32::try_from(value).ok()
    }

    fn store(&mut self, value: u32) -> Result<()> {
        let mut map = self.read_map().unwrap_or_default();
        map.insert(HIGH_SCORE_KEY.to_string(), value.into());
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(&map)?;
        fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
        atomic_rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Volatile store that counts its writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Option<u32>,
    writes: u32,
}

impl MemoryStore {
    pub fn with_value(value: u32) -> Self {
        Self {
            value: Some(value),
            writes: 0,
        }
    }

    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> Option<u32> {
        self.value
    }

    fn store(&mut self, value: u32) -> Result<()> {
        self.value = Some(value);
        self.writes += 1;
        Ok(())
    }
}

/// The best score across runs, read once at startup.
#[derive(Debug)]
pub struct HighScore<S> {
    best: u32,
    store: S,
}

impl<S: ScoreStore> HighScore<S> {
    pub fn open(store: S) -> Self {
        let best = store.load().unwrap_or(0);
        tracing::info!(best, "loaded high score");
        Self { best, store }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records a finished run. Returns true when it set a new record; only
    /// then is the store written. A failed write keeps the in-memory record.
    pub fn submit(&mut self, score: u32) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        if let Err(err) = self.store.store(score) {
            tracing::warn!(score, "could not persist high score: {err:#}");
        } else {
            tracing::info!(score, "new high score");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FailingStore;

    impl ScoreStore for FailingStore {
        fn load(&self) -> Option<u32> {
            Some(4)
        }

        fn store(&mut self, _value: u32) -> Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[test]
    fn better_score_replaces_and_persists() {
        let mut hs = HighScore::open(MemoryStore::with_value(5));
        assert!(hs.submit(7));
        assert_eq!(hs.best(), 7);
        assert_eq!(hs.store().load(), Some(7));
        assert_eq!(hs.store().writes(), 1);
    }

    #[test]
    fn worse_score_changes_nothing() {
        let mut hs = HighScore::open(MemoryStore::with_value(5));
        assert!(!hs.submit(3));
        assert!(!hs.submit(5));
        assert_eq!(hs.best(), 5);
        assert_eq!(hs.store().writes(), 0);
    }

    #[test]
    fn empty_store_starts_at_zero() {
        let hs = HighScore::open(MemoryStore::default());
        assert_eq!(hs.best(), 0);
    }

    #[test]
    fn write_failure_keeps_in_memory_record() {
        let mut hs = HighScore::open(FailingStore);
        assert!(hs.submit(9));
        assert_eq!(hs.best(), 9);
    }

    #[test]
    fn file_store_round_trips_and_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("highscore.json");
        fs::write(&path, r#"{"volume": 3}"#).unwrap();

        let mut store = JsonFileStore::new(&path);
        assert_eq!(store.load(), None);
        store.store(12).unwrap();
        assert_eq!(JsonFileStore::new(&path).load(), Some(12));

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["volume"], 3);
        assert_eq!(raw[HIGH_SCORE_KEY], 12);
    }

    #[test]
    fn missing_or_garbled_file_reads_as_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("highscore.json");
        assert_eq!(JsonFileStore::new(&path).load(), None);
        fs::write(&path, "garbage").unwrap();
        assert_eq!(HighScore::open(JsonFileStore::new(&path)).best(), 0);
    }
}
