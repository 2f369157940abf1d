// cNFT - Merkle proofs for compressed NFT collections on TON

pub mod address;
pub mod cell;
pub mod collection;
pub mod config;
pub mod crypto;
pub mod error;
pub mod merkle;
pub mod record;

// Re-export main components
pub use address::Address;
pub use cell::{BocOptions, Builder, Cell};
pub use collection::{CollectionService, MemoryRecordSource, RecordSource};
pub use config::Config;
pub use crypto::Value;
pub use error::{CnftError, Result};
pub use merkle::{serialize_proof, MerkleTree, TreeUpdate};
pub use record::Record;

// Initialize logging
pub fn init_logger() {
    env_logger::init();
}

/// Initialize logging, falling back to `level` when RUST_LOG is unset.
pub fn init_logger_with_level(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
