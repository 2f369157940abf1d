//! Merkle accumulator over compressed NFT records.
//!
//! Leaves are record cell hashes, internal nodes are produced by a
//! [`Combiner`], and the tree is rebuilt from the full record set on every
//! query. Proofs can be packed into a proof cell for on-chain verification.

pub mod combine;
pub mod tree;
pub mod update;
pub mod proof;

// Re-export main components
pub use combine::{merkle_hash, CellCombiner, Combiner};
pub use tree::{MerkleTree, Proof, ProofEntry};
pub use update::{TreeUpdate, UpdateNode};
pub use proof::serialize_proof;
