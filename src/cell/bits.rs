use std::fmt;

/// An append-only string of bits, packed MSB-first into bytes.
///
/// Bits past `len` in the last byte are always zero.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct BitString {
    bytes: Vec<u8>,
    len: usize,
}

impl BitString {
    /// Create an empty bit string
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read the bit at `index`; `None` past the end.
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        Some(self.bytes[index / 8] & (0x80 >> (index % 8)) != 0)
    }

    pub(crate) fn push_bit(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            self.bytes[self.len / 8] |= 0x80 >> (self.len % 8);
        }
        self.len += 1;
    }

    /// Append the low `bits` bits of `value`, most significant first.
    pub(crate) fn push_uint(&mut self, value: u64, bits: usize) {
        for i in (0..bits).rev() {
            self.push_bit(i < 64 && (value >> i) & 1 == 1);
        }
    }

    pub(crate) fn push_bytes(&mut self, bytes: &[u8]) {
        if self.len % 8 == 0 {
            self.bytes.extend_from_slice(bytes);
            self.len += bytes.len() * 8;
        } else {
            for &byte in bytes {
                self.push_uint(byte as u64, 8);
            }
        }
    }

    /// Packed bytes with the completion tag: when the length is not a
    /// multiple of 8, a single `1` bit follows the data and the rest of the
    /// last byte is zero.
    pub fn padded_bytes(&self) -> Vec<u8> {
        let mut out = self.bytes.clone();
        if self.len % 8 != 0 {
            out[self.len / 8] |= 0x80 >> (self.len % 8);
        }
        out
    }

    /// Fift-style hex (`ABCD`, or `A_` when the length is not a multiple
    /// of four).
    pub fn to_fift_hex(&self) -> String {
        let hex = hex::encode_upper(self.padded_bytes());
        if self.len % 4 == 0 {
            hex[..self.len / 4].to_string()
        } else if self.len % 8 <= 4 {
            format!("{}_", &hex[..hex.len() - 1])
        } else {
            format!("{}_", hex)
        }
    }
}

impl fmt::Debug for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitString({} bits, x{{{}}})", self.len, self.to_fift_hex())
    }
}
