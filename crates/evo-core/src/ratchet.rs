//! Secret-free hash ratchet used for address previews.
//!
//! `next = BLAKE3(current)`. Anyone holding an address can compute every
//! later one, so this is a display/preview scheme only. It is deliberately a
//! separate type from [`Socket`](crate::types::Socket): the two chains are
//! incompatible and must never be mixed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::HASH_LEN;
use crate::error::RatchetError;
use crate::field::hash256;

/// A 32-byte preview address rendered as `0x`-prefixed hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreviewAddress([u8; HASH_LEN]);

impl PreviewAddress {
    pub fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Next address in the ratchet.
    pub fn evolve(&self) -> Self {
        Self(hash256(&self.0))
    }
}

impl fmt::Display for PreviewAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for PreviewAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PreviewAddress({self})")
    }
}

impl FromStr for PreviewAddress {
    type Err = RatchetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s.trim().strip_prefix("0x").unwrap_or(s.trim());
        if hex_part.is_empty() {
            return Err(RatchetError::Empty);
        }
        let bytes = hex::decode(hex_part).map_err(|e| RatchetError::InvalidHex(e.to_string()))?;
        let arr: [u8; HASH_LEN] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| RatchetError::InvalidHex(format!("expected {HASH_LEN} bytes, got {}", v.len())))?;
        Ok(Self(arr))
    }
}

/// Evolve an arbitrary `0x`-hex address string one step.
///
/// Unlike [`PreviewAddress::from_str`], any non-empty byte length is
/// accepted, so a chain can be started from a short seed value.
///
/// # Examples
///
/// ```
/// use evo_core::ratchet::evolve_preview;
///
/// let next = evolve_preview("0x00").unwrap();
/// assert_eq!(next.to_string().len(), 66);
/// assert!(evolve_preview("").is_err());
/// ```
pub fn evolve_preview(current: &str) -> Result<PreviewAddress, RatchetError> {
    let trimmed = current.trim();
    let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if hex_part.is_empty() {
        return Err(RatchetError::Empty);
    }
    let bytes = hex::decode(hex_part).map_err(|e| RatchetError::InvalidHex(e.to_string()))?;
    Ok(PreviewAddress(hash256(&bytes)))
}
