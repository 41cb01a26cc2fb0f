//! The wallet master seed.
//!
//! A seed is 256 bits of OS randomness. It exists in cleartext only inside a
//! [`Seed`] value, which wipes its bytes on drop; at rest it lives inside a
//! [`SeedEnvelope`](crate::encryption::SeedEnvelope).

use num_bigint::BigUint;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use evo_core::constants::SEED_LEN;
use evo_core::field::seed_decimal;

use crate::error::WalletError;

/// A 32-byte master seed.
///
/// Secret material is zeroized on drop to prevent leaking key material
/// in freed memory.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed {
    bytes: [u8; SEED_LEN],
}

impl Seed {
    /// Generate a random seed from the OS cryptographic RNG.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; SEED_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Create a seed from raw bytes.
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self { bytes }
    }

    /// Create a seed from a slice that must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, WalletError> {
        if bytes.len() != SEED_LEN {
            return Err(WalletError::InvalidSeedLength(bytes.len()));
        }
        let mut arr = [0u8; SEED_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Create a seed from an unsigned integer below `2^256`, big-endian.
    pub fn from_integer(value: &BigUint) -> Result<Self, WalletError> {
        if value.bits() > (SEED_LEN as u64) * 8 {
            return Err(WalletError::SeedOutOfRange(format!(
                "{} bits exceeds {}",
                value.bits(),
                SEED_LEN * 8
            )));
        }
        let raw = value.to_bytes_be();
        let mut bytes = [0u8; SEED_LEN];
        bytes[SEED_LEN - raw.len()..].copy_from_slice(&raw);
        Ok(Self { bytes })
    }

    /// The seed as an unsigned big-endian integer.
    pub fn to_integer(&self) -> BigUint {
        BigUint::from_bytes_be(&self.bytes)
    }

    /// Decimal form of [`to_integer`](Self::to_integer), as keyed into the
    /// socket engine. Handle with care.
    pub fn to_decimal(&self) -> String {
        seed_decimal(&self.bytes)
    }

    /// Get the raw seed bytes. Handle with care.
    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.bytes
    }
}

impl Clone for Seed {
    fn clone(&self) -> Self {
        Self { bytes: self.bytes }
    }
}

impl PartialEq for Seed {
    fn eq(&self, other: &Self) -> bool {
        // Constant-time comparison via BLAKE3's Hash equality.
        blake3::Hash::from(self.bytes) == blake3::Hash::from(other.bytes)
    }
}

impl Eq for Seed {}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed").field("bytes", &"[REDACTED]").finish()
    }
}
