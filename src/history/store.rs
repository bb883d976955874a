use crate::history::record::{CalculationRecord, OwnerId};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("calculation {0} already exists")]
    DuplicateId(Uuid),
    #[error("calculation {id} does not belong to {owner}")]
    NotOwner { id: Uuid, owner: OwnerId },
    #[error("history file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("history file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistence for saved calculations.
///
/// Records are only ever listed or deleted on behalf of their owner; any
/// richer sharing model lives outside this crate.
pub trait CalculationStore {
    fn save(&mut self, record: CalculationRecord) -> Result<Uuid, StoreError>;

    fn get(&self, id: Uuid) -> Option<&CalculationRecord>;

    /// The owner's records, newest first.
    fn list_for_owner(&self, owner: &OwnerId) -> Vec<&CalculationRecord>;

    /// Remove a record. `Ok(false)` when it does not exist.
    fn delete(&mut self, id: Uuid, owner: &OwnerId) -> Result<bool, StoreError>;
}

/// Volatile store keyed by record id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<Uuid, CalculationRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn all(&self) -> Vec<&CalculationRecord> {
        self.records.values().collect()
    }
}

fn newest_first(mut records: Vec<&CalculationRecord>) -> Vec<&CalculationRecord> {
    records.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| a.id().cmp(&b.id()))
    });
    records
}

impl CalculationStore for MemoryStore {
    fn save(&mut self, record: CalculationRecord) -> Result<Uuid, StoreError> {
        let id = record.id();
        if self.records.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        debug!("storing calculation {} for {}", id, record.owner());
        self.records.insert(id, record);
        Ok(id)
    }

    fn get(&self, id: Uuid) -> Option<&CalculationRecord> {
        self.records.get(&id)
    }

    fn list_for_owner(&self, owner: &OwnerId) -> Vec<&CalculationRecord> {
        newest_first(
            self.records
                .values()
                .filter(|record| record.owner() == owner)
                .collect(),
        )
    }

    fn delete(&mut self, id: Uuid, owner: &OwnerId) -> Result<bool, StoreError> {
        let Some(record) = self.records.get(&id) else {
            return Ok(false);
        };
        if record.owner() != owner {
            return Err(StoreError::NotOwner {
                id,
                owner: owner.clone(),
            });
        }
        self.records.remove(&id);
        Ok(true)
    }
}

#[derive(Serialize, Deserialize, Default)]
struct HistoryFile {
    records: Vec<CalculationRecord>,
}

/// Store backed by a single JSON document, rewritten on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut inner = MemoryStore::new();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let file: HistoryFile = serde_json::from_str(&content)?;
            for record in file.records {
                inner.save(record)?;
            }
            info!("loaded {} calculations from {}", inner.len(), path.display());
        }
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let mut records: Vec<CalculationRecord> =
            newest_first(self.inner.all()).into_iter().cloned().collect();
        records.reverse();
        let json = serde_json::to_string_pretty(&HistoryFile { records })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!("wrote {} calculations to {}", self.inner.len(), self.path.display());
        Ok(())
    }
}

impl CalculationStore for JsonFileStore {
    fn save(&mut self, record: CalculationRecord) -> Result<Uuid, StoreError> {
        let id = self.inner.save(record)?;
        self.flush()?;
        Ok(id)
    }

    fn get(&self, id: Uuid) -> Option<&CalculationRecord> {
        self.inner.get(id)
    }

    fn list_for_owner(&self, owner: &OwnerId) -> Vec<&CalculationRecord> {
        self.inner.list_for_owner(owner)
    }

    fn delete(&mut self, id: Uuid, owner: &OwnerId) -> Result<bool, StoreError> {
        let removed = self.inner.delete(id, owner)?;
        if removed {
            self.flush()?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::engine::CostEngine;
    use crate::core::incoterm::Incoterm;
    use crate::core::shipment::ShipmentInput;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn record(owner: &str, name: &str, minutes: i64) -> CalculationRecord {
        let input = ShipmentInput::new(Incoterm::Fob, dec!(1000), dec!(5)).with_freight(dec!(50));
        let result = CostEngine::calculate(&input).unwrap();
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        CalculationRecord::new(OwnerId::new(owner), name, input, result)
            .with_created_at(base + Duration::minutes(minutes))
    }

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("landed-cost-{}-{}.json", tag, Uuid::new_v4()))
    }

    #[test]
    fn test_memory_store_filters_by_owner() {
        let mut store = MemoryStore::new();
        store.save(record("alice", "first", 0)).unwrap();
        store.save(record("alice", "second", 10)).unwrap();
        store.save(record("bob", "other", 5)).unwrap();

        let alice = store.list_for_owner(&OwnerId::new("alice"));
        let names: Vec<_> = alice.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["second", "first"]);
        assert_eq!(store.list_for_owner(&OwnerId::new("carol")).len(), 0);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut store = MemoryStore::new();
        let rec = record("alice", "a", 0);
        store.save(rec.clone()).unwrap();
        assert!(matches!(store.save(rec), Err(StoreError::DuplicateId(_))));
    }

    #[test]
    fn test_delete_requires_owner() {
        let mut store = MemoryStore::new();
        let id = store.save(record("alice", "a", 0)).unwrap();

        assert!(matches!(
            store.delete(id, &OwnerId::new("bob")),
            Err(StoreError::NotOwner { .. })
        ));
        assert!(store.delete(id, &OwnerId::new("alice")).unwrap());
        assert!(!store.delete(id, &OwnerId::new("alice")).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_json_store_persists_across_opens() {
        let path = temp_path("persist");
        let id = {
            let mut store = JsonFileStore::open(&path).unwrap();
            store.save(record("alice", "kept", 0)).unwrap()
        };

        let reopened = JsonFileStore::open(&path).unwrap();
        let saved = reopened.get(id).unwrap();
        assert_eq!(saved.name(), "kept");
        assert_eq!(saved.result().cif_value(), dec!(5250));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_json_store_delete_rewrites_file() {
        let path = temp_path("delete");
        let mut store = JsonFileStore::open(&path).unwrap();
        let id = store.save(record("alice", "gone", 0)).unwrap();
        store.save(record("alice", "stays", 1)).unwrap();
        assert!(store.delete(id, &OwnerId::new("alice")).unwrap());

        let reopened = JsonFileStore::open(&path).unwrap();
        assert!(reopened.get(id).is_none());
        assert_eq!(reopened.list_for_owner(&OwnerId::new("alice")).len(), 1);
        fs::remove_file(&path).unwrap();
    }
}
