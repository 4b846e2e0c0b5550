//! Persistence for the single best-score scalar.
//!
//! The game reads the store once when it is built and writes it on a game
//! over that beats the old record.  Both directions are allowed to fail;
//! callers log and carry on.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("high-score file {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("high-score file {path} is not valid JSON: {source}")]
    Json {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Key-value storage for the high score. An absent record reads as 0.
pub trait ScoreStore: Send {
    fn load(&self) -> Result<u32, StoreError>;
    fn save(&mut self, score: u32) -> Result<(), StoreError>;
}

// ════════════════════════════════════════════════════════════════════════════
// JsonFileStore
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default, Serialize, Deserialize)]
struct HighScoreDoc {
    high_score: u32,
}

/// Stores `{"high_score": N}` at a fixed path.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path { &self.path }
}

impl ScoreStore for JsonFileStore {
    fn load(&self) -> Result<u32, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(source) => return Err(StoreError::Io { path: self.path.clone(), source }),
        };
        let doc: HighScoreDoc = serde_json::from_str(&text)
            .map_err(|source| StoreError::Json { path: self.path.clone(), source })?;
        Ok(doc.high_score)
    }

    fn save(&mut self, score: u32) -> Result<(), StoreError> {
        let io_err = |source: io::Error| StoreError::Io { path: self.path.clone(), source };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let text = serde_json::to_string(&HighScoreDoc { high_score: score })
            .map_err(|source| StoreError::Json { path: self.path.clone(), source })?;
        fs::write(&self.path, text).map_err(io_err)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MemoryStore
// ════════════════════════════════════════════════════════════════════════════

/// In-process store; nothing survives the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub value:  Option<u32>,
    /// Number of successful `save` calls.
    pub writes: usize,
}

impl MemoryStore {
    pub fn with_value(value: u32) -> Self {
        MemoryStore { value: Some(value), writes: 0 }
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> Result<u32, StoreError> {
        Ok(self.value.unwrap_or(0))
    }

    fn save(&mut self, score: u32) -> Result<(), StoreError> {
        self.value = Some(score);
        self.writes += 1;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("dino_game_store_{}_{}", std::process::id(), name))
            .join("score.json")
    }

    #[test]
    fn missing_file_reads_zero() {
        let store = JsonFileStore::new(temp_path("missing"));
        assert_eq!(store.load().unwrap(), 0);
    }

    #[test]
    fn save_then_load() {
        let path = temp_path("roundtrip");
        let mut store = JsonFileStore::new(&path);
        store.save(340).unwrap();
        assert_eq!(JsonFileStore::new(&path).load().unwrap(), 340);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn garbage_file_is_a_json_error() {
        let path = temp_path("garbage");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();
        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn memory_store_defaults_to_zero() {
        let mut m = MemoryStore::default();
        assert_eq!(m.load().unwrap(), 0);
        m.save(20).unwrap();
        assert_eq!(m.load().unwrap(), 20);
        assert_eq!(m.writes, 1);
    }
}
