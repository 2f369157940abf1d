use crate::cell::{BitString, Cell};
use crate::crypto::Value;

/// Merges two child values into their parent's value.
///
/// Order matters: `left` is the lower tree index.
pub trait Combiner: Sync {
    fn combine(&self, left: &Value, right: &Value) -> Value;
}

/// The verifier-compatible combiner: hash of a cell holding
/// `left (256 bits) || right (256 bits)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellCombiner;

impl Combiner for CellCombiner {
    fn combine(&self, left: &Value, right: &Value) -> Value {
        merkle_hash(left, right)
    }
}

impl<F> Combiner for F
where
    F: Fn(&Value, &Value) -> Value + Sync,
{
    fn combine(&self, left: &Value, right: &Value) -> Value {
        self(left, right)
    }
}

/// Parent value of `left` and `right`.
pub fn merkle_hash(left: &Value, right: &Value) -> Value {
    let mut bits = BitString::new();
    bits.push_bytes(left.as_bytes());
    bits.push_bytes(right.as_bytes());
    Value::new(Cell::from_parts(bits, Vec::new()).hash())
}
