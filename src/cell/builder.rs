use crate::address::Address;
use crate::cell::{BitString, Cell, MAX_BITS, MAX_REFS};
use crate::crypto::Value;
use crate::error::{CnftError, Result};

/// Incremental cell writer. Every `store_*` call checks capacity and leaves
/// the builder untouched when it fails.
#[derive(Debug, Default)]
pub struct Builder {
    bits: BitString,
    refs: Vec<Cell>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload bits still free
    pub fn available_bits(&self) -> usize {
        MAX_BITS - self.bits.len()
    }

    /// Reference slots still free
    pub fn available_refs(&self) -> usize {
        MAX_REFS - self.refs.len()
    }

    fn reserve_bits(&self, bits: usize) -> Result<()> {
        if bits > self.available_bits() {
            return Err(CnftError::CellOverflow(format!(
                "need {} bits, {} available",
                bits,
                self.available_bits()
            )));
        }
        Ok(())
    }

    pub fn store_bit(&mut self, bit: bool) -> Result<&mut Self> {
        self.reserve_bits(1)?;
        self.bits.push_bit(bit);
        Ok(self)
    }

    /// Store an unsigned integer in `bits` bits (at most 64).
    pub fn store_uint(&mut self, value: u64, bits: usize) -> Result<&mut Self> {
        if bits > 64 || (bits < 64 && value >> bits != 0) {
            return Err(CnftError::InvalidValue(format!(
                "{} does not fit in {} bits",
                value, bits
            )));
        }
        self.reserve_bits(bits)?;
        self.bits.push_uint(value, bits);
        Ok(self)
    }

    /// Store a two's-complement signed integer in `bits` bits (1..=64).
    pub fn store_int(&mut self, value: i64, bits: usize) -> Result<&mut Self> {
        let fits = if bits == 0 {
            value == 0
        } else if bits >= 64 {
            bits == 64
        } else {
            let half = 1i64 << (bits - 1);
            (-half..half).contains(&value)
        };
        if !fits {
            return Err(CnftError::InvalidValue(format!(
                "{} does not fit in {} signed bits",
                value, bits
            )));
        }
        self.reserve_bits(bits)?;
        self.bits.push_uint(value as u64, bits);
        Ok(self)
    }

    /// Store a full 256-bit value.
    pub fn store_value(&mut self, value: &Value) -> Result<&mut Self> {
        self.store_bytes(value.as_bytes())
    }

    pub fn store_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.reserve_bits(bytes.len() * 8)?;
        self.bits.push_bytes(bytes);
        Ok(self)
    }

    pub fn store_ref(&mut self, cell: Cell) -> Result<&mut Self> {
        if self.available_refs() == 0 {
            return Err(CnftError::CellOverflow(format!(
                "cell already has {} references",
                MAX_REFS
            )));
        }
        self.refs.push(cell);
        Ok(self)
    }

    /// Store a standard internal address: tag `10`, no anycast, signed
    /// 8-bit workchain, 256-bit account hash (267 bits).
    pub fn store_address(&mut self, address: &Address) -> Result<&mut Self> {
        self.reserve_bits(267)?;
        self.store_uint(0b10, 2)?;
        self.store_bit(false)?;
        self.store_int(address.workchain() as i64, 8)?;
        self.store_bytes(address.hash())
    }

    /// Store string bytes as a tail: as many whole bytes as fit here, the
    /// rest in a chain of continuation cells hanging off the last ref.
    pub fn store_string_tail(&mut self, text: &str) -> Result<&mut Self> {
        self.store_bytes_tail(text.as_bytes())
    }

    /// Store a reference to a fresh cell holding `text` as a string tail.
    pub fn store_string_ref_tail(&mut self, text: &str) -> Result<&mut Self> {
        let mut inner = Builder::new();
        inner.store_string_tail(text)?;
        self.store_ref(inner.end_cell())
    }

    fn store_bytes_tail(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        let here = (self.available_bits() / 8).min(bytes.len());
        let (head, rest) = bytes.split_at(here);

        if !rest.is_empty() && self.available_refs() == 0 {
            return Err(CnftError::CellOverflow(
                "no reference slot left for string continuation".to_string(),
            ));
        }

        // Continuation cells are built from the far end inwards.
        let per_cell = MAX_BITS / 8;
        let mut tail: Option<Cell> = None;
        for chunk in rest.chunks(per_cell).rev() {
            let mut bits = BitString::new();
            bits.push_bytes(chunk);
            let children = tail.take().into_iter().collect();
            tail = Some(Cell::from_parts(bits, children));
        }

        self.bits.push_bytes(head);
        if let Some(cell) = tail {
            self.refs.push(cell);
        }
        Ok(self)
    }

    pub fn end_cell(self) -> Cell {
        Cell::from_parts(self.bits, self.refs)
    }
}
