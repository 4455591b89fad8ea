//! Advisory persistence: generation markers and the world seed.
//!
//! The marker store is purely observational. It remembers that a chunk has been
//! generated at least once, it is never authoritative for content and its failures
//! must never affect a load or unload.

use std::collections::HashMap;
use std::time::{UNIX_EPOCH, SystemTime};

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::rand::gen_world_seed;


/// Error returned by a failing marker store. The chunk manager swallows these.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("write rejected: {0}")]
    Rejected(String),
}


/// Small key/value port the chunk manager persists its markers through. Hosts back
/// this with whatever storage they have; tests use [`MemoryMarkerStore`].
pub trait MarkerStore {

    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

}


/// The record written once per generated chunk coordinate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub version: u32,
    pub generated: bool,
    /// Wall-clock milliseconds at first generation. Informational only, never fed
    /// back into generation.
    pub time: u64,
}

impl MarkerRecord {

    pub fn now() -> Self {
        let time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self { version: 1, generated: true, time }
    }

}


/// In-memory marker store.
#[derive(Debug, Default)]
pub struct MemoryMarkerStore {
    entries: HashMap<String, String>,
}

impl MemoryMarkerStore {

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

impl MarkerStore for MemoryMarkerStore {

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

}


/// Retrieve the world seed stored under `key`, or generate a fresh one and store it
/// best-effort. A store failure still returns a usable seed, generation is then
/// simply not stable across sessions.
pub fn get_or_init_world_seed(store: &mut dyn MarkerStore, key: &str) -> u32 {
    if let Some(raw) = store.get(key) {
        if let Ok(seed) = raw.trim().parse::<u32>() {
            return seed;
        }
    }
    let seed = gen_world_seed();
    let _ = store.set(key, &seed.to_string());
    seed
}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn world_seed_stable_across_sessions() {
        let mut store = MemoryMarkerStore::new();
        let first = get_or_init_world_seed(&mut store, "world.seed");
        let second = get_or_init_world_seed(&mut store, "world.seed");
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn corrupt_seed_is_replaced() {
        let mut store = MemoryMarkerStore::new();
        store.set("world.seed", "not a number").unwrap();
        let seed = get_or_init_world_seed(&mut store, "world.seed");
        assert_eq!(store.get("world.seed"), Some(seed.to_string()));
    }

    #[test]
    fn marker_record_roundtrip() {
        let record = MarkerRecord::now();
        let raw = serde_json::to_string(&record).unwrap();
        let parsed: MarkerRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.version, 1);
        assert!(parsed.generated);
    }

}
