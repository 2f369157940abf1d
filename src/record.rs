//! Canonical encoding of compressed NFT records into cells.

use serde::{Serialize, Deserialize};

use crate::address::Address;
use crate::cell::{Builder, Cell};
use crate::crypto::Value;
use crate::error::Result;

/// One compressed NFT: owner address text and individual content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub owner: String,
    pub content: String,
}

impl Record {
    pub fn new(owner: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            content: content.into(),
        }
    }

    /// Encode into the record cell. Fails with `InvalidAddress` when the
    /// owner does not parse.
    pub fn encode(&self) -> Result<Cell> {
        let owner = Address::parse(&self.owner)?;
        encode_parts(&owner, &self.content)
    }

    /// Leaf value: the record cell's hash as a big-endian integer.
    pub fn leaf_value(&self) -> Result<Value> {
        Ok(Value::new(self.encode()?.hash()))
    }
}

/// Record cell: owner address inline, content as a string tail behind one
/// reference.
pub fn encode_parts(owner: &Address, content: &str) -> Result<Cell> {
    let mut builder = Builder::new();
    builder.store_address(owner)?.store_string_ref_tail(content)?;
    Ok(builder.end_cell())
}

/// The content alone, as a string tail cell (no wrapping reference).
pub fn content_cell(content: &str) -> Result<Cell> {
    let mut builder = Builder::new();
    builder.store_string_tail(content)?;
    Ok(builder.end_cell())
}
