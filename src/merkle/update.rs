use log::debug;
use serde::{Serialize, Deserialize};

use crate::crypto::Value;
use crate::error::{CnftError, Result};
use crate::merkle::combine::Combiner;
use crate::merkle::tree::{MerkleTree, ProofEntry};

/// A node the verifier takes as authoritative after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNode {
    pub index: usize,
    pub value: Value,
    /// Level of the node, root = 0, leaves = tree depth
    pub depth: usize,
}

impl UpdateNode {
    /// Whether `index` is this node or lies in its subtree.
    fn covers(&self, index: usize) -> bool {
        let level = level_of(index);
        level >= self.depth && index >> (level - self.depth) == self.index
    }
}

/// Result of [`MerkleTree::generate_update`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeUpdate {
    pub nodes: Vec<UpdateNode>,
    pub proof: Vec<ProofEntry>,
}

fn level_of(index: usize) -> usize {
    (usize::BITS - 1 - index.leading_zeros()) as usize
}

impl<C: Combiner> MerkleTree<C> {
    /// Describe an update that replaces the trailing `new_leaves.len()`
    /// leaf slots.
    ///
    /// Adjacent sibling update nodes are merged into their parent, pass after
    /// pass, until no pair merges. The proof is the path of the first updated
    /// leaf minus every entry already implied by the merged nodes.
    pub fn generate_update(&self, new_leaves: &[Value]) -> Result<TreeUpdate> {
        let capacity = self.capacity();
        if new_leaves.len() >= capacity {
            return Err(CnftError::CannotFullyUpdate {
                batch: new_leaves.len(),
                capacity,
            });
        }
        if new_leaves.is_empty() {
            return Ok(TreeUpdate { nodes: Vec::new(), proof: Vec::new() });
        }

        let from = capacity - new_leaves.len();
        let mut nodes: Vec<UpdateNode> = new_leaves
            .iter()
            .enumerate()
            .map(|(i, value)| UpdateNode {
                index: capacity + from + i,
                value: *value,
                depth: self.depth(),
            })
            .collect();

        let mut passes = 0;
        loop {
            passes += 1;
            let mut merged = false;
            let mut i = 0;
            while i + 1 < nodes.len() {
                let (left, right) = (nodes[i], nodes[i + 1]);
                if left.depth == right.depth && left.index ^ right.index == 1 {
                    nodes[i] = UpdateNode {
                        index: left.index >> 1,
                        value: self.combiner().combine(&left.value, &right.value),
                        depth: left.depth - 1,
                    };
                    nodes.remove(i + 1);
                    merged = true;
                }
                i += 1;
            }
            if !merged {
                break;
            }
        }

        let proof = self
            .proof_for_index(capacity + from)?
            .into_iter()
            .filter(|entry| !nodes.iter().any(|node| node.covers(entry.index)))
            .collect();

        debug!(
            "Generated update for {} leaves: {} nodes after {} passes",
            new_leaves.len(),
            nodes.len(),
            passes
        );
        Ok(TreeUpdate { nodes, proof })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::combine::merkle_hash;
    use crate::merkle::tree::tests::leaves;

    fn node(index: usize, value: Value, depth: usize) -> UpdateNode {
        UpdateNode { index, value, depth }
    }

    #[test]
    fn test_full_batch_is_rejected() {
        let tree = MerkleTree::from_leaves(&leaves(4)).unwrap();
        assert!(matches!(
            tree.generate_update(&leaves(4)),
            Err(CnftError::CannotFullyUpdate { batch: 4, capacity: 4 })
        ));
        assert!(tree.generate_update(&leaves(5)).is_err());

        let single = MerkleTree::from_leaves(&leaves(1)).unwrap();
        assert!(single.generate_update(&leaves(1)).is_err());
    }

    #[test]
    fn test_empty_batch() {
        let tree = MerkleTree::from_leaves(&leaves(4)).unwrap();
        let update = tree.generate_update(&[]).unwrap();
        assert!(update.nodes.is_empty());
        assert!(update.proof.is_empty());
    }

    #[test]
    fn test_single_trailing_leaf() {
        let tree = MerkleTree::from_leaves(&leaves(8)).unwrap();
        let new = Value::from_u64(99);
        let update = tree.generate_update(&[new]).unwrap();

        assert_eq!(update.nodes, vec![node(15, new, 3)]);
        let indices: Vec<usize> = update.proof.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![14, 6, 2]);
        assert_eq!(update.proof[0].value, tree.leaf(6).unwrap());
    }

    #[test]
    fn test_pair_merges_into_parent() {
        let tree = MerkleTree::from_leaves(&leaves(8)).unwrap();
        let batch = [Value::from_u64(70), Value::from_u64(80), Value::from_u64(90)];
        let update = tree.generate_update(&batch).unwrap();

        // leaf 13 stays alone, 14 and 15 merge into 7
        assert_eq!(
            update.nodes,
            vec![
                node(13, batch[0], 3),
                node(7, merkle_hash(&batch[1], &batch[2]), 2),
            ]
        );
        let indices: Vec<usize> = update.proof.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![12, 2]);
    }

    #[test]
    fn test_merging_runs_to_fixed_point() {
        let tree = MerkleTree::from_leaves(&leaves(8)).unwrap();
        let batch = [
            Value::from_u64(10),
            Value::from_u64(20),
            Value::from_u64(30),
            Value::from_u64(40),
        ];
        let update = tree.generate_update(&batch).unwrap();

        let left = merkle_hash(&batch[0], &batch[1]);
        let right = merkle_hash(&batch[2], &batch[3]);
        assert_eq!(update.nodes, vec![node(3, merkle_hash(&left, &right), 1)]);

        // only the untouched half is still needed
        assert_eq!(update.proof, vec![ProofEntry { index: 2, value: tree.node(2).unwrap() }]);
    }

    #[test]
    fn test_update_reconstructs_new_root() {
        let tree = MerkleTree::from_leaves(&leaves(16)).unwrap();
        let batch: Vec<Value> = (100..105).map(Value::from_u64).collect();
        let update = tree.generate_update(&batch).unwrap();

        let mut expected = leaves(16);
        expected[11..].copy_from_slice(&batch);
        let rebuilt = MerkleTree::from_leaves(&expected).unwrap();

        // every update node matches the rebuilt tree
        for n in &update.nodes {
            assert_eq!(rebuilt.node(n.index).unwrap(), n.value);
        }
        // proof entries are untouched nodes, identical in both trees
        for entry in &update.proof {
            assert_eq!(rebuilt.node(entry.index).unwrap(), entry.value);
        }
        let indices: Vec<usize> = update.proof.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![26, 12, 2]);
    }

    #[test]
    fn test_covers() {
        let n = node(3, Value::zero(), 1);
        assert!(n.covers(3));
        assert!(n.covers(6));
        assert!(n.covers(15));
        assert!(!n.covers(2));
        assert!(!n.covers(1));
        assert!(!n.covers(9));
    }
}
