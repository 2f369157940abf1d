use sha2::{Sha256, Digest};
use serde::{Serialize, Serializer, Deserialize, Deserializer};
use serde::de::Error as DeError;
use num_bigint::BigUint;
use num_traits::Zero;
use std::fmt;
use std::str::FromStr;

use crate::error::CnftError;

/// Compute SHA-256 hash of data
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();

    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// A 256-bit unsigned integer stored as 32 big-endian bytes.
///
/// Used for leaves, internal tree nodes and proof entries. Ordering is
/// numeric because the byte order is big-endian.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Value([u8; 32]);

impl Value {
    /// Create a value from big-endian bytes
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The zero value, used for padding leaves
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Create a value from a small integer
    pub fn from_u64(v: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&v.to_be_bytes());
        Self(bytes)
    }

    /// Big-endian bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    /// Minimal lowercase hex, without leading zeros ("0" for zero).
    pub fn to_hex(&self) -> String {
        self.to_biguint().to_str_radix(16)
    }

    /// Parse hex text, with or without a `0x` prefix.
    pub fn from_hex(text: &str) -> Result<Self, CnftError> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        if digits.is_empty() {
            return Err(CnftError::InvalidValue("empty hex string".to_string()));
        }
        let n = BigUint::parse_bytes(digits.as_bytes(), 16)
            .ok_or_else(|| CnftError::InvalidValue(format!("not hex: {}", text)))?;
        Self::try_from(&n)
    }
}

impl TryFrom<&BigUint> for Value {
    type Error = CnftError;

    fn try_from(n: &BigUint) -> Result<Self, Self::Error> {
        if n.is_zero() {
            return Ok(Self::zero());
        }
        let bytes = n.to_bytes_be();
        if bytes.len() > 32 {
            return Err(CnftError::InvalidValue(format!("{} bits exceeds 256", n.bits())));
        }
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl From<[u8; 32]> for Value {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Value {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Value {
    type Err = CnftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", hex::encode(self.0))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Value::from_hex(&text).map_err(D::Error::custom)
    }
}
