use serde::{Serialize, Deserialize};

/// Owner and content as shown to wallets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub owner: String,
    /// Base64 BOC of the content string tail cell
    pub individual_content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub metadata: ItemMetadata,
    /// Base64 BOC of the record cell
    pub data_cell: String,
    /// Position of the item in the collection
    pub index: String,
}

/// A single item with everything needed to prove it on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResponse {
    pub item: Item,
    /// Tree root, lowercase hex without leading zeros
    pub root: String,
    /// Base64 BOC of the proof cell
    pub proof_cell: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsPage {
    pub items: Vec<Item>,
    pub last_index: String,
    pub root: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionState {
    pub depth: usize,
    pub capacity: String,
    pub last_index: String,
    pub root: String,
    pub address: Option<String>,
}
