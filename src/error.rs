use thiserror::Error;

/// Errors produced while encoding records, building trees and answering
/// collection queries.
#[derive(Debug, Error)]
pub enum CnftError {
    /// Leaf count is not a power of two
    #[error("Bad leaves array: {len} leaves is not a power of two")]
    BadLeafSet { len: usize },

    /// Update batch covers the whole leaf range
    #[error("Cannot fully update the tree: batch of {batch} leaves, capacity {capacity}")]
    CannotFullyUpdate { batch: usize, capacity: usize },

    /// Leaf position or node index outside the tree
    #[error("Index out of range: {index} (bound {bound})")]
    IndexOutOfRange { index: usize, bound: usize },

    /// Owner identity could not be parsed
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Text that does not denote a 256-bit value
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// No record at the requested position, or empty collection
    #[error("{0}")]
    NotFound(String),

    /// Builder ran out of payload bits or reference slots
    #[error("Cell overflow: {0}")]
    CellOverflow(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record source error
    #[error("Record source error: {0}")]
    Source(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CnftError {
    /// Whether the boundary should answer with "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, CnftError::NotFound(_))
    }

    /// Whether the boundary should reject the request as malformed.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            CnftError::BadLeafSet { .. }
                | CnftError::IndexOutOfRange { .. }
                | CnftError::InvalidAddress(_)
                | CnftError::InvalidValue(_)
        )
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, CnftError>;
