use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::info;
use serde::{Serialize, Deserialize};

use crate::error::{CnftError, Result};
use crate::record::Record;

/// A compressed NFT as the storage layer keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Ordering key inside the collection
    pub token_id: u64,
    pub owner: String,
    pub individual_content: String,
}

impl StoredRecord {
    pub fn to_record(&self) -> Record {
        Record::new(self.owner.clone(), self.individual_content.clone())
    }
}

/// Storage collaborator: supplies a collection's records and its contract
/// address.
pub trait RecordSource: Send + Sync {
    /// All records of the collection, ascending by `token_id`. Unknown
    /// collections yield an empty list.
    fn records(&self, collection_id: u64) -> Result<Vec<StoredRecord>>;

    /// Passthrough collection address, if one is recorded.
    fn collection_address(&self, collection_id: u64) -> Result<Option<String>>;
}

/// One collection inside a snapshot file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSnapshot {
    pub id: u64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub records: Vec<StoredRecord>,
}

/// Snapshot file layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub collections: Vec<CollectionSnapshot>,
}

/// In-memory record source, optionally loaded from a JSON snapshot.
#[derive(Debug, Default)]
pub struct MemoryRecordSource {
    collections: HashMap<u64, CollectionSnapshot>,
}

impl MemoryRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut source = Self::new();
        for collection in snapshot.collections {
            source.insert_collection(collection);
        }
        source
    }

    /// Load a JSON snapshot file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            CnftError::Source(format!("Failed to read snapshot {:?}: {}", path, e))
        })?;
        let snapshot: Snapshot = serde_json::from_str(&text)?;

        info!(
            "Loaded snapshot {:?} with {} collections",
            path,
            snapshot.collections.len()
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Add or replace a collection. Records are kept sorted by `token_id`.
    pub fn insert_collection(&mut self, mut collection: CollectionSnapshot) {
        collection.records.sort_by_key(|r| r.token_id);
        self.collections.insert(collection.id, collection);
    }

    /// Add a record, creating the collection when missing.
    pub fn insert_record(&mut self, collection_id: u64, record: StoredRecord) {
        let collection = self
            .collections
            .entry(collection_id)
            .or_insert_with(|| CollectionSnapshot {
                id: collection_id,
                address: None,
                records: Vec::new(),
            });
        let at = collection
            .records
            .partition_point(|r| r.token_id <= record.token_id);
        collection.records.insert(at, record);
    }

    pub fn set_address(&mut self, collection_id: u64, address: impl Into<String>) {
        let address = address.into();
        self.collections
            .entry(collection_id)
            .and_modify(|c| c.address = Some(address.clone()))
            .or_insert_with(|| CollectionSnapshot {
                id: collection_id,
                address: Some(address.clone()),
                records: Vec::new(),
            });
    }
}

impl RecordSource for MemoryRecordSource {
    fn records(&self, collection_id: u64) -> Result<Vec<StoredRecord>> {
        Ok(self
            .collections
            .get(&collection_id)
            .map(|c| c.records.clone())
            .unwrap_or_default())
    }

    fn collection_address(&self, collection_id: u64) -> Result<Option<String>> {
        Ok(self
            .collections
            .get(&collection_id)
            .and_then(|c| c.address.clone()))
    }
}
