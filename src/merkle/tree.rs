use log::debug;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use crate::crypto::Value;
use crate::error::{CnftError, Result};
use crate::merkle::combine::{CellCombiner, Combiner};
use crate::record::Record;

/// One step of an inclusion proof: a sibling's node index and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofEntry {
    pub index: usize,
    pub value: Value,
}

/// Sibling path from a leaf up to the root's children, leaf sibling first.
pub type Proof = Vec<ProofEntry>;

/// A perfect binary Merkle tree in flat form.
///
/// Node indices are 1-based: the root is `1`, node `i` has children `2i`
/// and `2i + 1`, and leaf `p` lives at `2^depth + p`. Index `0` is unused.
#[derive(Debug, Clone)]
pub struct MerkleTree<C: Combiner = CellCombiner> {
    storage: Vec<Value>,
    depth: usize,
    combiner: C,
}

impl MerkleTree<CellCombiner> {
    /// Build from leaves with the verifier-compatible combiner.
    pub fn from_leaves(leaves: &[Value]) -> Result<Self> {
        Self::from_leaves_with(leaves, CellCombiner)
    }

    /// Build from records with the verifier-compatible combiner.
    pub fn from_records(records: &[Record]) -> Result<Self> {
        Self::from_records_with(records, CellCombiner)
    }
}

impl<C: Combiner> MerkleTree<C> {
    /// Build a tree over exactly `2^depth` leaves.
    pub fn from_leaves_with(leaves: &[Value], combiner: C) -> Result<Self> {
        if !leaves.len().is_power_of_two() {
            return Err(CnftError::BadLeafSet { len: leaves.len() });
        }

        let count = leaves.len();
        let depth = count.trailing_zeros() as usize;
        let mut storage = vec![Value::zero(); count * 2];
        storage[count..].copy_from_slice(leaves);

        for i in (1..count).rev() {
            storage[i] = combiner.combine(&storage[2 * i], &storage[2 * i + 1]);
        }

        debug!("Built Merkle tree: depth {}, {} leaves", depth, count);
        Ok(Self { storage, depth, combiner })
    }

    /// Hash every record into a leaf, pad with zero leaves up to the next
    /// power of two and build.
    pub fn from_records_with(records: &[Record], combiner: C) -> Result<Self> {
        if records.is_empty() {
            return Err(CnftError::BadLeafSet { len: 0 });
        }

        let mut leaves = records
            .par_iter()
            .map(Record::leaf_value)
            .collect::<Result<Vec<Value>>>()?;
        leaves.resize(records.len().next_power_of_two(), Value::zero());

        Self::from_leaves_with(&leaves, combiner)
    }

    pub fn root(&self) -> Value {
        self.storage[1]
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of leaf slots, `2^depth`
    pub fn capacity(&self) -> usize {
        1 << self.depth
    }

    pub fn combiner(&self) -> &C {
        &self.combiner
    }

    /// Flat node storage; index 0 is unused.
    pub fn nodes(&self) -> &[Value] {
        &self.storage
    }

    pub fn leaf(&self, position: usize) -> Result<Value> {
        let index = self.leaf_index_to_node_index(position)?;
        Ok(self.storage[index])
    }

    pub fn node(&self, index: usize) -> Result<Value> {
        if index == 0 || index >= self.storage.len() {
            return Err(CnftError::IndexOutOfRange { index, bound: self.storage.len() });
        }
        Ok(self.storage[index])
    }

    pub fn leaf_index_to_node_index(&self, position: usize) -> Result<usize> {
        if position >= self.capacity() {
            return Err(CnftError::IndexOutOfRange { index: position, bound: self.capacity() });
        }
        Ok(self.capacity() + position)
    }

    /// Sibling path for the leaf at `node_index`.
    pub fn proof_for_index(&self, node_index: usize) -> Result<Proof> {
        if node_index < self.capacity() || node_index >= self.storage.len() {
            return Err(CnftError::IndexOutOfRange {
                index: node_index,
                bound: self.storage.len(),
            });
        }

        let mut proof = Vec::with_capacity(self.depth);
        let mut index = node_index;
        for _ in 0..self.depth {
            let sibling = index ^ 1;
            proof.push(ProofEntry { index: sibling, value: self.storage[sibling] });
            index >>= 1;
        }
        Ok(proof)
    }

    /// Sibling values only, in proof order.
    pub fn proof_values(&self, node_index: usize) -> Result<Vec<Value>> {
        Ok(self
            .proof_for_index(node_index)?
            .into_iter()
            .map(|entry| entry.value)
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::merkle::combine::merkle_hash;

    pub(crate) fn leaves(n: u64) -> Vec<Value> {
        (1..=n).map(Value::from_u64).collect()
    }

    /// Recompute the root from a leaf and its proof.
    pub(crate) fn replay<C: Combiner>(
        combiner: &C,
        node_index: usize,
        leaf: Value,
        proof: &[ProofEntry],
    ) -> Value {
        let mut index = node_index;
        let mut current = leaf;
        for entry in proof {
            current = if index % 2 == 0 {
                combiner.combine(&current, &entry.value)
            } else {
                combiner.combine(&entry.value, &current)
            };
            index >>= 1;
        }
        current
    }

    #[test]
    fn test_four_leaf_layout() {
        let h = leaves(4);
        let tree = MerkleTree::from_leaves(&h).unwrap();

        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.nodes().len(), 8);
        assert_eq!(&tree.nodes()[4..], &h[..]);
        assert_eq!(tree.nodes()[2], merkle_hash(&h[0], &h[1]));
        assert_eq!(tree.nodes()[3], merkle_hash(&h[2], &h[3]));
        assert_eq!(tree.root(), merkle_hash(&tree.nodes()[2], &tree.nodes()[3]));
    }

    #[test]
    fn test_proof_for_first_leaf() {
        let h = leaves(4);
        let tree = MerkleTree::from_leaves(&h).unwrap();
        let proof = tree.proof_for_index(4).unwrap();

        assert_eq!(
            proof,
            vec![
                ProofEntry { index: 5, value: h[1] },
                ProofEntry { index: 3, value: merkle_hash(&h[2], &h[3]) },
            ]
        );
        let step = merkle_hash(&h[0], &h[1]);
        assert_eq!(merkle_hash(&step, &merkle_hash(&h[2], &h[3])), tree.root());
    }

    #[test]
    fn test_every_proof_replays_to_root() {
        let h = leaves(16);
        let tree = MerkleTree::from_leaves(&h).unwrap();
        for p in 0..16 {
            let index = tree.leaf_index_to_node_index(p).unwrap();
            let proof = tree.proof_for_index(index).unwrap();
            assert_eq!(proof.len(), 4);
            assert_eq!(replay(tree.combiner(), index, h[p], &proof), tree.root());
        }
    }

    #[test]
    fn test_bad_leaf_sets() {
        assert!(matches!(
            MerkleTree::from_leaves(&leaves(3)),
            Err(CnftError::BadLeafSet { len: 3 })
        ));
        assert!(matches!(
            MerkleTree::from_leaves(&[]),
            Err(CnftError::BadLeafSet { len: 0 })
        ));
    }

    #[test]
    fn test_single_leaf_tree() {
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let counting = |a: &Value, b: &Value| {
            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            merkle_hash(a, b)
        };
        let leaf = Value::from_u64(42);
        let tree = MerkleTree::from_leaves_with(&[leaf], counting).unwrap();

        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.root(), leaf);
        assert!(tree.proof_for_index(1).unwrap().is_empty());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_index_bounds() {
        let tree = MerkleTree::from_leaves(&leaves(8)).unwrap();
        for p in 0..8 {
            assert_eq!(tree.leaf_index_to_node_index(p).unwrap(), 8 + p);
            assert_eq!(tree.leaf(p).unwrap(), Value::from_u64(p as u64 + 1));
        }
        assert!(matches!(
            tree.leaf_index_to_node_index(8),
            Err(CnftError::IndexOutOfRange { index: 8, bound: 8 })
        ));
        assert!(tree.leaf(100).is_err());
        assert!(tree.node(0).is_err());
        assert!(tree.node(16).is_err());
        assert_eq!(tree.node(1).unwrap(), tree.root());

        // proofs start from leaf nodes only
        assert!(tree.proof_for_index(7).is_err());
        assert!(tree.proof_for_index(16).is_err());
    }

    #[test]
    fn test_proof_values_match_entries() {
        let tree = MerkleTree::from_leaves(&leaves(8)).unwrap();
        let entries = tree.proof_for_index(13).unwrap();
        let values = tree.proof_values(13).unwrap();
        assert_eq!(entries.iter().map(|e| e.index).collect::<Vec<_>>(), vec![12, 7, 2]);
        assert_eq!(values, entries.iter().map(|e| e.value).collect::<Vec<_>>());
    }

    #[test]
    fn test_records_are_padded_with_zero_leaves() {
        let records: Vec<Record> = (0..5)
            .map(|i| Record::new(format!("0:{}", "22".repeat(32)), i.to_string()))
            .collect();
        let tree = MerkleTree::from_records(&records).unwrap();

        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.capacity(), 8);
        for p in 0..5 {
            assert_eq!(tree.leaf(p).unwrap(), records[p].leaf_value().unwrap());
        }
        for p in 5..8 {
            assert!(tree.leaf(p).unwrap().is_zero());
        }
    }

    #[test]
    fn test_empty_record_set() {
        assert!(matches!(
            MerkleTree::from_records(&[]),
            Err(CnftError::BadLeafSet { len: 0 })
        ));
    }

    #[test]
    fn test_record_errors_propagate() {
        let records = vec![
            Record::new(format!("0:{}", "22".repeat(32)), "0"),
            Record::new("broken", "1"),
        ];
        assert!(matches!(
            MerkleTree::from_records(&records),
            Err(CnftError::InvalidAddress(_))
        ));
    }
}
