//! Collection queries: items with proofs, item pages and collection state.

pub mod response;
pub mod service;
pub mod source;

// Re-export main components
pub use response::{CollectionState, Item, ItemMetadata, ItemResponse, ItemsPage};
pub use service::CollectionService;
pub use source::{CollectionSnapshot, MemoryRecordSource, RecordSource, Snapshot, StoredRecord};
