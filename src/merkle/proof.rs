use crate::cell::{Builder, Cell};
use crate::crypto::Value;
use crate::error::Result;

/// Pack a proof and its payload into one cell.
///
/// The proof becomes a singly linked chain, one 256-bit value per cell with
/// the next link as its only reference, ending in an empty cell. The result
/// references the payload first and the chain head second.
pub fn serialize_proof(proof: &[Value], payload: Cell) -> Result<Cell> {
    let mut chain = Cell::empty();
    for value in proof.iter().rev() {
        let mut link = Builder::new();
        link.store_value(value)?.store_ref(chain)?;
        chain = link.end_cell();
    }

    let mut wrapper = Builder::new();
    wrapper.store_ref(payload)?.store_ref(chain)?;
    Ok(wrapper.end_cell())
}
