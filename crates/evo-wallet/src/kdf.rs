//! Argon2id password-based key derivation.
//!
//! Every derived key is 32 bytes and every salt 16 bytes. The default cost
//! matches libsodium's "interactive" profile.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CustodyError;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes.
pub const KEY_LEN: usize = 32;

/// Argon2id cost parameters.
///
/// | Field        | Default | Meaning              |
/// |--------------|---------|----------------------|
/// | `m_cost_kib` | 65 536  | memory in KiB (64 MiB) |
/// | `t_cost`     | 2       | passes               |
/// | `p_cost`     | 1       | lanes                |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub m_cost_kib: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl KdfParams {
    pub const fn new(m_cost_kib: u32, t_cost: u32, p_cost: u32) -> Self {
        Self {
            m_cost_kib,
            t_cost,
            p_cost,
        }
    }

    fn to_argon2(self) -> Result<argon2::Params, CustodyError> {
        argon2::Params::new(self.m_cost_kib, self.t_cost, self.p_cost, Some(KEY_LEN))
            .map_err(|e| CustodyError::InvalidParams(e.to_string()))
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::new(65_536, 2, 1)
    }
}

/// A 256-bit key derived from a password. Wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

/// Fresh random salt from the OS RNG.
pub fn generate_salt() -> [u8; SALT_LEN] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a key from `password`.
///
/// With `salt = None` a fresh salt is generated. A supplied salt must be
/// exactly [`SALT_LEN`] bytes. Returns the key and the salt actually used.
pub fn derive_key(
    password: &str,
    salt: Option<&[u8]>,
    params: &KdfParams,
) -> Result<(DerivedKey, Vec<u8>), CustodyError> {
    let salt = match salt {
        Some(s) if s.len() != SALT_LEN => {
            return Err(CustodyError::InvalidSalt {
                expected: SALT_LEN,
                got: s.len(),
            });
        }
        Some(s) => s.to_vec(),
        None => generate_salt().to_vec(),
    };

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params.to_argon2()?,
    );

    let mut key = DerivedKey([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password.as_bytes(), &salt, &mut key.0)
        .map_err(|e| CustodyError::Kdf(e.to_string()))?;

    tracing::debug!(m_cost_kib = params.m_cost_kib, t_cost = params.t_cost, "derived key");
    Ok((key, salt))
}
