//! Seed persistence.
//!
//! A world is fully reproducible from its seed, so the seed is the only thing
//! saved. It lives in a small JSON file (`world_data.json` by default):
//! `{"seed": 1234}`.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::seeds::WorldSeed;

pub const DEFAULT_WORLD_DATA_FILE: &str = "world_data.json";

/// Contents of the world data file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldData {
    pub seed: WorldSeed,
}

/// Reads and writes the world data file.
pub struct WorldDataStore {
    path: PathBuf,
}

impl WorldDataStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the stored seed. Returns None if no file has been written yet.
    pub fn load_seed(&self) -> Result<Option<WorldSeed>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let data: WorldData = serde_json::from_reader(reader)
            .map_err(|e| PersistenceError::Deserialization(e.to_string()))?;

        Ok(Some(data.seed))
    }

    /// Write the seed, creating parent directories as needed.
    pub fn save_seed(&self, seed: WorldSeed) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&self.path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, &WorldData { seed })
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;

        Ok(())
    }

    /// Delete the file (if it exists).
    pub fn clear(&self) -> std::io::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl Default for WorldDataStore {
    fn default() -> Self {
        Self::new(DEFAULT_WORLD_DATA_FILE)
    }
}

/// Errors that can occur while reading or writing world data.
#[derive(Debug)]
pub enum PersistenceError {
    /// IO error (permissions, missing directory, etc.)
    Io(std::io::Error),
    /// Serialization error
    Serialization(String),
    /// Deserialization error (corrupted file, wrong shape)
    Deserialization(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::Io(e) => write!(f, "IO error: {}", e),
            PersistenceError::Serialization(e) => write!(f, "Serialization error: {}", e),
            PersistenceError::Deserialization(e) => write!(f, "Deserialization error: {}", e),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<std::io::Error> for PersistenceError {
    fn from(e: std::io::Error) -> Self {
        PersistenceError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let store = WorldDataStore::new(dir.path().join("world_data.json"));
        assert!(!store.exists());
        assert_eq!(store.load_seed().unwrap(), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = WorldDataStore::new(dir.path().join("saves").join("world_data.json"));

        store.save_seed(987_654).unwrap();
        assert!(store.exists());
        assert_eq!(store.load_seed().unwrap(), Some(987_654));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, r#"{"seed":987654}"#);
    }

    #[test]
    fn test_zero_seed_survives() {
        let dir = tempdir().unwrap();
        let store = WorldDataStore::new(dir.path().join("world_data.json"));
        store.save_seed(0).unwrap();
        assert_eq!(store.load_seed().unwrap(), Some(0));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("world_data.json");
        fs::write(&path, "{\"seed\": \"abc\"}").unwrap();

        let store = WorldDataStore::new(&path);
        match store.load_seed() {
            Err(PersistenceError::Deserialization(_)) => {}
            other => panic!("expected deserialization error, got {:?}", other),
        }
    }

    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        let store = WorldDataStore::new(dir.path().join("world_data.json"));
        store.save_seed(5).unwrap();
        store.clear().unwrap();
        assert!(!store.exists());
        store.clear().unwrap();
    }
}
