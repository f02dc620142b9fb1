//! Checkpoint and report storage.
//!
//! Party checkpoints are write-once: the presence of a key is what marks a
//! party as collected, so `put` refuses to replace an existing one. Reports
//! (artifacts) are plain whole-value overwrites.
//!
//! `FileStore` keeps everything as pretty-printed JSON under one directory:
//!
//! ```text
//! <data_dir>/checkpoints/<PARTY>.json
//! <data_dir>/<artifact>.json
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::models::PartyCheckpoint;

const CHECKPOINT_DIR: &str = "checkpoints";

pub trait CheckpointStore: Send + Sync {
    fn has(&self, key: &str) -> Result<bool>;
    fn get(&self, key: &str) -> Result<Option<PartyCheckpoint>>;
    /// Fails if `key` already holds a checkpoint.
    fn put(&self, key: &str, checkpoint: &PartyCheckpoint) -> Result<()>;
    /// Every stored key, ascending.
    fn keys(&self) -> Result<Vec<String>>;
}

pub trait ArtifactSink: Send + Sync {
    fn write_artifact(&self, name: &str, value: &Value) -> Result<()>;
}

// ===== Filesystem =====

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(root.join(CHECKPOINT_DIR))
            .with_context(|| format!("Failed to create data directory: {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn checkpoint_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            bail!("Invalid checkpoint key: {:?}", key);
        }
        Ok(self.root.join(CHECKPOINT_DIR).join(format!("{}.json", key)))
    }

    fn artifact_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", name))
    }

    /// Write to a sibling temp file, then rename into place.
    fn write_atomic(path: &Path, contents: &str) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to move {} into place", path.display()))?;
        Ok(())
    }
}

impl CheckpointStore for FileStore {
    fn has(&self, key: &str) -> Result<bool> {
        Ok(self.checkpoint_path(key)?.exists())
    }

    fn get(&self, key: &str) -> Result<Option<PartyCheckpoint>> {
        let path = self.checkpoint_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read checkpoint: {}", key))?;
        let checkpoint = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse checkpoint: {}", key))?;
        Ok(Some(checkpoint))
    }

    fn put(&self, key: &str, checkpoint: &PartyCheckpoint) -> Result<()> {
        let path = self.checkpoint_path(key)?;
        if path.exists() {
            bail!("Checkpoint {} already exists", key);
        }
        let contents = serde_json::to_string_pretty(checkpoint)?;
        Self::write_atomic(&path, &contents)?;
        debug!(key, path = %path.display(), "Checkpoint written");
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let dir = self.root.join(CHECKPOINT_DIR);
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("Failed to list {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

impl ArtifactSink for FileStore {
    fn write_artifact(&self, name: &str, value: &Value) -> Result<()> {
        let path = self.artifact_path(name);
        let contents = serde_json::to_string_pretty(value)?;
        Self::write_atomic(&path, &contents)?;
        debug!(name, path = %path.display(), "Artifact written");
        Ok(())
    }
}

// ===== In memory =====

/// Store held entirely in memory. Checkpoints are kept serialized so reads
/// see exactly what a file-backed store would return.
#[derive(Default)]
pub struct MemoryStore {
    checkpoints: Mutex<BTreeMap<String, String>>,
    artifacts: Mutex<BTreeMap<String, Value>>,
    puts: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys in the order `put` was called for them.
    pub fn put_log(&self) -> Vec<String> {
        self.lock(&self.puts).map(|p| p.clone()).unwrap_or_default()
    }

    /// Raw serialized checkpoint.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock(&self.checkpoints).ok()?.get(key).cloned()
    }

    pub fn artifact(&self, name: &str) -> Option<Value> {
        self.lock(&self.artifacts).ok()?.get(name).cloned()
    }

    fn lock<'a, T>(&self, m: &'a Mutex<T>) -> Result<std::sync::MutexGuard<'a, T>> {
        m.lock().map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

impl CheckpointStore for MemoryStore {
    fn has(&self, key: &str) -> Result<bool> {
        Ok(self.lock(&self.checkpoints)?.contains_key(key))
    }

    fn get(&self, key: &str) -> Result<Option<PartyCheckpoint>> {
        match self.lock(&self.checkpoints)?.get(key) {
            Some(raw) => Ok(Some(
                serde_json::from_str(raw)
                    .with_context(|| format!("Failed to parse checkpoint: {}", key))?,
            )),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, checkpoint: &PartyCheckpoint) -> Result<()> {
        let mut checkpoints = self.lock(&self.checkpoints)?;
        if checkpoints.contains_key(key) {
            bail!("Checkpoint {} already exists", key);
        }
        checkpoints.insert(key.to_string(), serde_json::to_string_pretty(checkpoint)?);
        self.lock(&self.puts)?.push(key.to_string());
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.lock(&self.checkpoints)?.keys().cloned().collect())
    }
}

impl ArtifactSink for MemoryStore {
    fn write_artifact(&self, name: &str, value: &Value) -> Result<()> {
        self.lock(&self.artifacts)?
            .insert(name.to_string(), value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LegislatorRecord;

    fn checkpoint(code: &str, members: usize) -> PartyCheckpoint {
        PartyCheckpoint {
            party_code: code.to_string(),
            legislators: vec![LegislatorRecord::default(); members],
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        assert!(!store.has("ABC").unwrap());
        assert!(store.get("ABC").unwrap().is_none());

        store.put("ABC", &checkpoint("ABC", 2)).unwrap();
        assert!(store.has("ABC").unwrap());
        assert_eq!(store.get("ABC").unwrap().unwrap(), checkpoint("ABC", 2));
        assert!(dir.path().join("checkpoints/ABC.json").exists());
    }

    #[test]
    fn test_file_store_is_write_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.put("ABC", &checkpoint("ABC", 1)).unwrap();
        assert!(store.put("ABC", &checkpoint("ABC", 5)).is_err());
        assert_eq!(store.get("ABC").unwrap().unwrap().legislators.len(), 1);
    }

    #[test]
    fn test_file_store_keys_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.put("PT", &checkpoint("PT", 0)).unwrap();
        store.put("MDB", &checkpoint("MDB", 0)).unwrap();
        std::fs::write(dir.path().join("checkpoints/notes.txt"), "x").unwrap();

        assert_eq!(store.keys().unwrap(), vec!["MDB", "PT"]);
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        assert!(store.put("../escape", &checkpoint("x", 0)).is_err());
        assert!(store.has("").is_err());
    }

    #[test]
    fn test_file_store_artifacts_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.write_artifact("totalizer", &serde_json::json!([1])).unwrap();
        store.write_artifact("totalizer", &serde_json::json!([2, 3])).unwrap();

        let contents = std::fs::read_to_string(dir.path().join("totalizer.json")).unwrap();
        let value: Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value, serde_json::json!([2, 3]));
    }

    #[test]
    fn test_memory_store_behaves_like_file_store() {
        let store = MemoryStore::new();
        store.put("B", &checkpoint("B", 1)).unwrap();
        store.put("A", &checkpoint("A", 0)).unwrap();
        assert!(store.put("A", &checkpoint("A", 3)).is_err());

        assert_eq!(store.keys().unwrap(), vec!["A", "B"]);
        assert_eq!(store.put_log(), vec!["B", "A"]);
        assert_eq!(store.get("B").unwrap().unwrap(), checkpoint("B", 1));
    }
}
