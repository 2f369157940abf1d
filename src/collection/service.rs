use log::{debug, info};
use rayon::prelude::*;

use crate::cell::{BocOptions, Cell};
use crate::collection::response::{CollectionState, Item, ItemMetadata, ItemResponse, ItemsPage};
use crate::collection::source::{RecordSource, StoredRecord};
use crate::config::{Config, ServiceConfig};
use crate::crypto::Value;
use crate::error::{CnftError, Result};
use crate::merkle::{serialize_proof, MerkleTree, TreeUpdate};
use crate::record::{content_cell, Record};

/// Read-only query surface over a [`RecordSource`].
///
/// Every query loads the full record list and rebuilds the tree, so
/// responses always reflect the source at the time of the call.
pub struct CollectionService<S: RecordSource> {
    source: S,
    service: ServiceConfig,
    boc: BocOptions,
}

impl<S: RecordSource> CollectionService<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source,
            service: config.service.clone(),
            boc: config.boc,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Item at `index` with its inclusion proof.
    pub fn get_item(&self, collection_id: u64, index: usize) -> Result<ItemResponse> {
        let stored = self.source.records(collection_id)?;
        let entry = stored
            .get(index)
            .ok_or_else(|| CnftError::NotFound("Item not found".to_string()))?;

        let tree = build_tree(&stored)?;
        let (item, data_cell) = self.item(entry, index)?;

        let proof = tree.proof_values(tree.leaf_index_to_node_index(index)?)?;
        let proof_cell = serialize_proof(&proof, data_cell)?;

        debug!(
            "Served item {} of collection {} ({} proof steps)",
            index,
            collection_id,
            proof.len()
        );
        Ok(ItemResponse {
            item,
            root: tree.root().to_hex(),
            proof_cell: proof_cell.to_boc_base64(&self.boc),
        })
    }

    /// A page of items. `count` of `None` or zero means the configured
    /// maximum, larger values are clamped to it.
    pub fn get_items(
        &self,
        collection_id: u64,
        offset: Option<usize>,
        count: Option<usize>,
    ) -> Result<ItemsPage> {
        let stored = self.source.records(collection_id)?;
        if stored.is_empty() {
            return Err(CnftError::NotFound("Collection not found".to_string()));
        }

        let tree = build_tree(&stored)?;
        let offset = offset.unwrap_or(0);
        let count = self.page_size(count);

        let items = stored
            .iter()
            .enumerate()
            .skip(offset)
            .take(count)
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(position, entry)| self.item(entry, position).map(|(item, _)| item))
            .collect::<Result<Vec<Item>>>()?;

        debug!(
            "Served {} items of collection {} from offset {}",
            items.len(),
            collection_id,
            offset
        );
        Ok(ItemsPage {
            items,
            last_index: (stored.len() - 1).to_string(),
            root: tree.root().to_hex(),
        })
    }

    /// Tree shape, root and contract address of a collection.
    pub fn get_state(&self, collection_id: u64) -> Result<CollectionState> {
        let stored = self.source.records(collection_id)?;
        if stored.is_empty() {
            return Err(CnftError::NotFound("Collection not found".to_string()));
        }

        let tree = build_tree(&stored)?;
        let address = self.source.collection_address(collection_id)?;

        Ok(CollectionState {
            depth: tree.depth(),
            capacity: tree.capacity().to_string(),
            last_index: (stored.len() - 1).to_string(),
            root: tree.root().to_hex(),
            address,
        })
    }

    /// Update description for replacing the trailing leaf slots of a
    /// collection's tree with `new_leaves`.
    pub fn get_update(&self, collection_id: u64, new_leaves: &[Value]) -> Result<TreeUpdate> {
        let stored = self.source.records(collection_id)?;
        if stored.is_empty() {
            return Err(CnftError::NotFound("Collection not found".to_string()));
        }

        let tree = build_tree(&stored)?;
        tree.generate_update(new_leaves)
    }

    fn page_size(&self, count: Option<usize>) -> usize {
        match count {
            None | Some(0) => self.service.max_page_size,
            Some(n) => n.min(self.service.max_page_size),
        }
    }

    fn item(&self, entry: &StoredRecord, position: usize) -> Result<(Item, Cell)> {
        let data_cell = entry.to_record().encode()?;
        let content = content_cell(&entry.individual_content)?;

        let item = Item {
            metadata: ItemMetadata {
                owner: entry.owner.clone(),
                individual_content: content.to_boc_base64(&self.boc),
            },
            data_cell: data_cell.to_boc_base64(&self.boc),
            index: position.to_string(),
        };
        Ok((item, data_cell))
    }
}

fn build_tree(stored: &[StoredRecord]) -> Result<MerkleTree> {
    let records: Vec<Record> = stored.iter().map(StoredRecord::to_record).collect();
    let tree = MerkleTree::from_records(&records)?;
    info!(
        "Rebuilt tree over {} records: depth {}, root {}",
        records.len(),
        tree.depth(),
        tree.root()
    );
    Ok(tree)
}
