//! Owner identities: TON standard addresses.
//!
//! Accepted text forms:
//! - raw: `<workchain>:<64 hex digits>`
//! - user-friendly: 48 base64 (or base64url) characters encoding
//!   `tag(1) || workchain(1) || hash(32) || crc16(2)`.

use std::fmt;
use std::str::FromStr;

use crate::error::CnftError;

const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TEST_ONLY: u8 = 0x80;

/// Flags carried by the user-friendly form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FriendlyFlags {
    pub bounceable: bool,
    pub test_only: bool,
}

/// A standard internal address
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    workchain: i8,
    hash: [u8; 32],
}

impl Address {
    pub fn new(workchain: i8, hash: [u8; 32]) -> Self {
        Self { workchain, hash }
    }

    pub fn workchain(&self) -> i8 {
        self.workchain
    }

    /// Account hash
    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Parse either text form.
    pub fn parse(text: &str) -> Result<Self, CnftError> {
        if Self::is_friendly(text) {
            Self::parse_friendly(text).map(|(address, _)| address)
        } else if Self::is_raw(text) {
            Self::parse_raw(text)
        } else {
            Err(CnftError::InvalidAddress(format!("unknown address type: {}", text)))
        }
    }

    pub fn is_friendly(text: &str) -> bool {
        text.len() == 48
            && text
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '_' | '-'))
    }

    pub fn is_raw(text: &str) -> bool {
        match text.split_once(':') {
            Some((wc, hash)) => {
                wc.parse::<i32>().is_ok()
                    && hash.len() == 64
                    && hash.chars().all(|c| c.is_ascii_hexdigit())
            }
            None => false,
        }
    }

    pub fn parse_raw(text: &str) -> Result<Self, CnftError> {
        let (wc, hash_hex) = text
            .split_once(':')
            .ok_or_else(|| CnftError::InvalidAddress(format!("missing ':' in {}", text)))?;
        let workchain = wc
            .parse::<i32>()
            .map_err(|e| CnftError::InvalidAddress(format!("bad workchain {}: {}", wc, e)))?;
        let workchain = i8::try_from(workchain)
            .map_err(|_| CnftError::InvalidAddress(format!("workchain {} out of range", workchain)))?;

        let bytes = hex::decode(hash_hex)
            .map_err(|e| CnftError::InvalidAddress(format!("bad hash {}: {}", hash_hex, e)))?;
        let hash: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CnftError::InvalidAddress(format!("hash must be 32 bytes: {}", text)))?;

        Ok(Self { workchain, hash })
    }

    pub fn parse_friendly(text: &str) -> Result<(Self, FriendlyFlags), CnftError> {
        let normalized: String = text
            .chars()
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                c => c,
            })
            .collect();
        let data = base64::decode_config(&normalized, base64::STANDARD)
            .map_err(|e| CnftError::InvalidAddress(format!("bad base64 in {}: {}", text, e)))?;
        if data.len() != 36 {
            return Err(CnftError::InvalidAddress(format!(
                "friendly address must be 36 bytes, got {}",
                data.len()
            )));
        }

        let (body, checksum) = data.split_at(34);
        if crc16(body).to_be_bytes() != checksum {
            return Err(CnftError::InvalidAddress(format!("invalid checksum: {}", text)));
        }

        let mut tag = body[0];
        let test_only = tag & TAG_TEST_ONLY != 0;
        if test_only {
            tag ^= TAG_TEST_ONLY;
        }
        let bounceable = match tag {
            TAG_BOUNCEABLE => true,
            TAG_NON_BOUNCEABLE => false,
            other => {
                return Err(CnftError::InvalidAddress(format!("unknown address tag: {:#04x}", other)))
            }
        };

        let workchain = match body[1] {
            0xff => -1,
            wc @ 0..=0x7f => wc as i8,
            wc => return Err(CnftError::InvalidAddress(format!("workchain {} out of range", wc))),
        };

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&body[2..34]);

        Ok((Self { workchain, hash }, FriendlyFlags { bounceable, test_only }))
    }

    /// `<workchain>:<hex hash>`
    pub fn to_raw_string(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }

    pub fn to_friendly(&self, flags: FriendlyFlags, url_safe: bool) -> String {
        let mut tag = if flags.bounceable { TAG_BOUNCEABLE } else { TAG_NON_BOUNCEABLE };
        if flags.test_only {
            tag |= TAG_TEST_ONLY;
        }

        let mut data = Vec::with_capacity(36);
        data.push(tag);
        data.push(self.workchain as u8);
        data.extend_from_slice(&self.hash);
        let checksum = crc16(&data);
        data.extend_from_slice(&checksum.to_be_bytes());

        let config = if url_safe { base64::URL_SAFE } else { base64::STANDARD };
        base64::encode_config(data, config)
    }
}

/// CRC-16/XMODEM
fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0u16;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ 0x1021 } else { crc << 1 };
        }
    }
    crc
}

impl FromStr for Address {
    type Err = CnftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_raw_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_raw_string())
    }
}
