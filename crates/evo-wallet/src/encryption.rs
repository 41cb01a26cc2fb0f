//! XChaCha20-Poly1305 seed envelope.
//!
//! The seed is sealed under an Argon2id key derived from the wallet
//! password. All three envelope fields are base64url without padding.
//!
//! # Stored shape
//! ```text
//! "salt"       -> <base64url salt>
//! "masterSeed" -> {"nonce": <base64url 24 bytes>, "ciphertext": <base64url ct || tag>}
//! ```

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::CustodyError;
use crate::kdf::{KdfParams, derive_key};

/// XChaCha20 nonce length in bytes.
pub const NONCE_LEN: usize = 24;

/// A sealed seed together with everything except the password needed to
/// open it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedEnvelope {
    pub salt: String,
    pub nonce: String,
    pub ciphertext: String,
}

/// The `"masterSeed"` record: the envelope minus its salt, which is stored
/// under its own key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCiphertext {
    pub nonce: String,
    pub ciphertext: String,
}

impl SeedEnvelope {
    /// Reassemble an envelope from the two stored records.
    pub fn from_parts(salt: impl Into<String>, stored: StoredCiphertext) -> Self {
        Self {
            salt: salt.into(),
            nonce: stored.nonce,
            ciphertext: stored.ciphertext,
        }
    }

    /// Split off the `"masterSeed"` record.
    pub fn stored(&self) -> StoredCiphertext {
        StoredCiphertext {
            nonce: self.nonce.clone(),
            ciphertext: self.ciphertext.clone(),
        }
    }

    /// Decode the salt bytes, e.g. to re-encrypt under the same salt.
    pub fn salt_bytes(&self) -> Result<Vec<u8>, CustodyError> {
        URL_SAFE_NO_PAD
            .decode(&self.salt)
            .map_err(|e| CustodyError::MalformedEnvelope(format!("salt: {e}")))
    }
}

impl StoredCiphertext {
    pub fn to_json(&self) -> Result<String, CustodyError> {
        serde_json::to_string(self).map_err(|e| CustodyError::MalformedEnvelope(e.to_string()))
    }

    pub fn from_json(raw: &str) -> Result<Self, CustodyError> {
        serde_json::from_str(raw).map_err(|e| CustodyError::MalformedEnvelope(e.to_string()))
    }
}

/// Seal `seed` under `password`.
///
/// Reuses `existing_salt` when given (it must be 16 bytes), otherwise draws
/// a fresh one. The nonce is always fresh.
pub fn encrypt_seed(
    seed: &[u8],
    password: &str,
    existing_salt: Option<&[u8]>,
    params: &KdfParams,
) -> Result<SeedEnvelope, CustodyError> {
    use rand::RngCore;

    let (key, salt) = derive_key(password, existing_salt, params)?;
    let mut nonce = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce);

    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), seed)
        .map_err(|e| CustodyError::Encryption(e.to_string()))?;

    Ok(SeedEnvelope {
        salt: URL_SAFE_NO_PAD.encode(salt),
        nonce: URL_SAFE_NO_PAD.encode(nonce),
        ciphertext: URL_SAFE_NO_PAD.encode(ciphertext),
    })
}

/// Open an envelope.
///
/// Any failure (bad encoding, wrong lengths, wrong password, tampering)
/// is reported as [`CustodyError::DecryptionFailed`].
pub fn decrypt_seed(
    envelope: &SeedEnvelope,
    password: &str,
    params: &KdfParams,
) -> Result<Zeroizing<Vec<u8>>, CustodyError> {
    open(envelope, password, params).ok_or(CustodyError::DecryptionFailed)
}

fn open(envelope: &SeedEnvelope, password: &str, params: &KdfParams) -> Option<Zeroizing<Vec<u8>>> {
    let salt = URL_SAFE_NO_PAD.decode(&envelope.salt).ok()?;
    let nonce = URL_SAFE_NO_PAD.decode(&envelope.nonce).ok()?;
    let ciphertext = URL_SAFE_NO_PAD.decode(&envelope.ciphertext).ok()?;
    if nonce.len() != NONCE_LEN {
        return None;
    }

    let (key, _) = derive_key(password, Some(&salt), params).ok()?;
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    cipher
        .decrypt(XNonce::from_slice(&nonce), ciphertext.as_slice())
        .ok()
        .map(Zeroizing::new)
}

/// [`encrypt_seed`] on the blocking thread pool.
///
/// Key derivation and sealing run as one unit, so the caller's task never
/// observes a half-finished envelope.
pub async fn encrypt_seed_blocking(
    seed: Zeroizing<Vec<u8>>,
    password: Zeroizing<String>,
    existing_salt: Option<Vec<u8>>,
    params: KdfParams,
) -> Result<SeedEnvelope, CustodyError> {
    tokio::task::spawn_blocking(move || {
        encrypt_seed(&seed, &password, existing_salt.as_deref(), &params)
    })
    .await
    .map_err(|e| CustodyError::Task(e.to_string()))?
}

/// [`decrypt_seed`] on the blocking thread pool.
pub async fn decrypt_seed_blocking(
    envelope: SeedEnvelope,
    password: Zeroizing<String>,
    params: KdfParams,
) -> Result<Zeroizing<Vec<u8>>, CustodyError> {
    tokio::task::spawn_blocking(move || decrypt_seed(&envelope, &password, &params))
        .await
        .map_err(|e| CustodyError::Task(e.to_string()))?
}
