// Hashing primitives shared by the cell encoder and the Merkle tree

pub mod hash;

pub use hash::{sha256, Value};
