use rand::Rng;

use cnft::crypto::Value;
use cnft::merkle::{merkle_hash, serialize_proof, MerkleTree};
use cnft::record::Record;
use cnft::{BocOptions, CnftError};

fn owner(byte: u8) -> String {
    format!("0:{}", hex::encode([byte; 32]))
}

fn records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| Record::new(owner(i as u8 + 1), format!("{}.json", i)))
        .collect()
}

fn random_value<R: Rng>(rng: &mut R) -> Value {
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    Value::new(bytes)
}

#[test]
fn test_known_record_leaves_and_root() {
    let tree = MerkleTree::from_records(&records(3)).unwrap();

    assert_eq!(
        tree.leaf(0).unwrap().to_hex(),
        "bf640f003e9f0d3fee55c172e7b31c31c2f9004fedf15090776b9178506652ba"
    );
    assert_eq!(
        tree.leaf(1).unwrap().to_hex(),
        "e0fbb4e0bfbc25bd007a5d74e62e8ce6dd14eb377a214d77e395266dfc24a346"
    );
    assert_eq!(
        tree.leaf(2).unwrap().to_hex(),
        "754f12a7c96fadbb810b63f78cf48cb88ac3c7022a24ef6bb0986cdf24c67a61"
    );
    assert!(tree.leaf(3).unwrap().is_zero());
    assert_eq!(
        tree.root().to_hex(),
        "36386692bc31b3efdb559a5b63b84ad12ba16ac9ff296728adf92ac1d735bdb9"
    );
}

#[test]
fn test_combine_vectors() {
    assert_eq!(
        merkle_hash(&Value::from_u64(1), &Value::from_u64(2)).to_hex(),
        "150e49dccfe7bd7134492f57b6353a3500aa55681a562b3ae47e3cafb218673d"
    );
    assert_eq!(
        merkle_hash(&Value::from_u64(2), &Value::from_u64(1)).to_hex(),
        "685065a2d28700c020ad16425345b815729ff0edd6497134fe7fc84dcf662d47"
    );
}

#[test]
fn test_combine_is_not_commutative() {
    let mut rng = rand::thread_rng();
    for _ in 0..32 {
        let a = random_value(&mut rng);
        let b = random_value(&mut rng);
        if a == b {
            continue;
        }
        assert_ne!(merkle_hash(&a, &b), merkle_hash(&b, &a));
    }
}

#[test]
fn test_every_proof_replays_to_root() {
    let mut rng = rand::thread_rng();
    let leaves: Vec<Value> = (0..32).map(|_| random_value(&mut rng)).collect();
    let tree = MerkleTree::from_leaves(&leaves).unwrap();

    for (position, leaf) in leaves.iter().enumerate() {
        let mut index = tree.leaf_index_to_node_index(position).unwrap();
        let proof = tree.proof_for_index(index).unwrap();
        assert_eq!(proof.len(), tree.depth());

        let mut current = *leaf;
        for entry in &proof {
            assert_eq!(entry.index, index ^ 1);
            current = if index % 2 == 0 {
                merkle_hash(&current, &entry.value)
            } else {
                merkle_hash(&entry.value, &current)
            };
            index >>= 1;
        }
        assert_eq!(current, tree.root());
    }
}

#[test]
fn test_record_set_shape() {
    for (n, depth) in [(1usize, 0usize), (2, 1), (3, 2), (8, 3), (10, 4), (17, 5)] {
        let tree = MerkleTree::from_records(&records(n)).unwrap();
        assert_eq!(tree.depth(), depth, "{} records", n);
        assert_eq!(tree.capacity(), 1 << depth);
    }
}

#[test]
fn test_single_record_root_is_its_leaf() {
    let recs = records(1);
    let tree = MerkleTree::from_records(&recs).unwrap();
    assert_eq!(tree.root(), recs[0].leaf_value().unwrap());
}

#[test]
fn test_owner_forms_give_same_leaf() {
    let raw = Record::new(owner(1), "0.json");
    let friendly = Record::new("EQABAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAc3j", "0.json");
    let url_safe = Record::new("UQABAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAZAm", "0.json");

    let expected = raw.leaf_value().unwrap();
    assert_eq!(friendly.leaf_value().unwrap(), expected);
    assert_eq!(url_safe.leaf_value().unwrap(), expected);
}

#[test]
fn test_long_content_spills_into_continuation_cells() {
    let record = Record::new(owner(1), "x".repeat(300));
    assert_eq!(
        record.leaf_value().unwrap().to_hex(),
        "9cb81656e48dcf544b56fcb2cb608fcdfbe018943dd5afd4a150f9f80cc6b95c"
    );
}

#[test]
fn test_proof_cell_matches_reference_boc() {
    let recs = records(3);
    let tree = MerkleTree::from_records(&recs).unwrap();
    let proof = tree.proof_values(tree.leaf_index_to_node_index(1).unwrap()).unwrap();
    let cell = serialize_proof(&proof, recs[1].encode().unwrap()).unwrap();

    assert_eq!(
        cell.to_boc_base64(&BocOptions::default()),
        "te6cckEBBgEAeQACAAEDAUOAAEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBQAgAMMS5qc29uAUC/ZA8APp8NP+5VwXLnsxwxwvkAT+3xUJB3a5F4UGZSugQBQMfmG3GmqLT2nXlnrPoHPGEbkXFS1Xg2hN2NZcLnVqY6BQAA5kYqnQ=="
    );
}

#[test]
fn test_update_matches_rebuilt_tree() {
    let mut rng = rand::thread_rng();
    let leaves: Vec<Value> = (0..16).map(|_| random_value(&mut rng)).collect();
    let tree = MerkleTree::from_leaves(&leaves).unwrap();

    for batch_len in 1..16 {
        let batch: Vec<Value> = (0..batch_len).map(|_| random_value(&mut rng)).collect();
        let update = tree.generate_update(&batch).unwrap();

        let mut next = leaves.clone();
        next[16 - batch_len..].copy_from_slice(&batch);
        let rebuilt = MerkleTree::from_leaves(&next).unwrap();

        for node in &update.nodes {
            assert_eq!(rebuilt.node(node.index).unwrap(), node.value);
        }
        for entry in &update.proof {
            assert_eq!(rebuilt.node(entry.index).unwrap(), entry.value);
            assert_eq!(tree.node(entry.index).unwrap(), entry.value);
        }
    }
}

#[test]
fn test_full_update_is_rejected() {
    let tree = MerkleTree::from_records(&records(4)).unwrap();
    let batch = vec![Value::from_u64(1); 4];
    assert!(matches!(
        tree.generate_update(&batch),
        Err(CnftError::CannotFullyUpdate { batch: 4, capacity: 4 })
    ));
}
