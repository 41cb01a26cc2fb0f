//! Short-lived unlock sessions.
//!
//! Unlocking hands the caller a random 32-byte [`SessionToken`]. The store
//! only ever holds the password sealed under a key derived from that token,
//! with the session window bound in as associated data:
//!
//! ```text
//! "session" -> {"issued_at", "expires_at", "nonce", "ciphertext"}
//! key        = blake3::derive_key(SESSION_KEY_CONTEXT, token)
//! aad        = "{issued_at}:{expires_at}"
//! ```
//!
//! Without the token the record is useless, and editing the timestamps
//! breaks authentication.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::encryption::NONCE_LEN;
use crate::error::{SessionError, WalletError};
use crate::storage::{SESSION_KEY, SecureStore};

/// BLAKE3 context for token-derived keys.
const SESSION_KEY_CONTEXT: &str = "evo-wallet 2024 session password key v1";

/// Token length in bytes.
pub const TOKEN_LEN: usize = 32;

/// Default session lifetime in seconds.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 15 * 60;

/// Bearer token for an unlocked session. Wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SessionToken([u8; TOKEN_LEN]);

impl SessionToken {
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; TOKEN_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; TOKEN_LEN]) -> Self {
        Self(bytes)
    }

    /// Base64url text form, for handing to the caller.
    pub fn expose(&self) -> Zeroizing<String> {
        Zeroizing::new(URL_SAFE_NO_PAD.encode(self.0))
    }

    /// Parse the text form produced by [`expose`](Self::expose).
    pub fn parse(s: &str) -> Result<Self, SessionError> {
        let raw = Zeroizing::new(
            URL_SAFE_NO_PAD
                .decode(s.trim())
                .map_err(|e| SessionError::MalformedToken(e.to_string()))?,
        );
        if raw.len() != TOKEN_LEN {
            return Err(SessionError::MalformedToken(format!(
                "expected {TOKEN_LEN} bytes, got {}",
                raw.len()
            )));
        }
        let mut bytes = [0u8; TOKEN_LEN];
        bytes.copy_from_slice(&raw);
        Ok(Self(bytes))
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        let key = Zeroizing::new(blake3::derive_key(SESSION_KEY_CONTEXT, &self.0));
        XChaCha20Poly1305::new(Key::from_slice(&key[..]))
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// The persisted session record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unix seconds.
    pub issued_at: i64,
    /// Unix seconds; the session is dead at and after this instant.
    pub expires_at: i64,
    pub nonce: String,
    pub ciphertext: String,
}

impl SessionRecord {
    fn aad(&self) -> String {
        format!("{}:{}", self.issued_at, self.expires_at)
    }
}

/// Issues, resumes, and revokes sessions in a [`SecureStore`].
#[derive(Clone, Copy, Debug)]
pub struct SessionManager {
    ttl: Duration,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL_SECS)
    }
}

impl SessionManager {
    pub fn new(ttl_secs: u64) -> Self {
        let secs = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        Self {
            ttl: Duration::try_seconds(secs).unwrap_or(Duration::MAX),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for `password`, replacing any existing one.
    pub fn issue<S: SecureStore + ?Sized>(
        &self,
        store: &S,
        password: &str,
    ) -> Result<SessionToken, WalletError> {
        self.issue_at(store, password, Utc::now())
    }

    pub fn issue_at<S: SecureStore + ?Sized>(
        &self,
        store: &S,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionToken, WalletError> {
        use rand::RngCore;

        let token = SessionToken::generate();
        let issued_at = now.timestamp();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .map_or(i64::MAX, |t| t.timestamp());

        let mut nonce = [0u8; NONCE_LEN];
        rand::rngs::OsRng.fill_bytes(&mut nonce);

        let mut record = SessionRecord {
            issued_at,
            expires_at,
            nonce: URL_SAFE_NO_PAD.encode(nonce),
            ciphertext: String::new(),
        };
        let aad = record.aad();
        let sealed = token
            .cipher()
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: password.as_bytes(),
                    aad: aad.as_bytes(),
                },
            )
            .map_err(|e| SessionError::Corrupted(e.to_string()))?;
        record.ciphertext = URL_SAFE_NO_PAD.encode(sealed);

        let json =
            serde_json::to_string(&record).map_err(|e| SessionError::Corrupted(e.to_string()))?;
        store.set(SESSION_KEY, &json)?;
        tracing::info!(expires_at, "session issued");
        Ok(token)
    }

    /// Recover the password held by the session `token` opens.
    ///
    /// An expired record is removed before [`SessionError::Expired`] is
    /// returned.
    pub fn resume<S: SecureStore + ?Sized>(
        &self,
        store: &S,
        token: &SessionToken,
    ) -> Result<Zeroizing<String>, WalletError> {
        self.resume_at(store, token, Utc::now())
    }

    pub fn resume_at<S: SecureStore + ?Sized>(
        &self,
        store: &S,
        token: &SessionToken,
        now: DateTime<Utc>,
    ) -> Result<Zeroizing<String>, WalletError> {
        let record = load_record(store)?.ok_or(SessionError::NotFound)?;
        if now.timestamp() >= record.expires_at {
            store.remove(SESSION_KEY)?;
            tracing::info!("session expired");
            return Err(SessionError::Expired.into());
        }

        let nonce = URL_SAFE_NO_PAD
            .decode(&record.nonce)
            .map_err(|e| SessionError::Corrupted(e.to_string()))?;
        let ciphertext = URL_SAFE_NO_PAD
            .decode(&record.ciphertext)
            .map_err(|e| SessionError::Corrupted(e.to_string()))?;
        if nonce.len() != NONCE_LEN {
            return Err(SessionError::Corrupted("bad nonce length".into()).into());
        }

        let aad = record.aad();
        let plain = token
            .cipher()
            .decrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: &ciphertext,
                    aad: aad.as_bytes(),
                },
            )
            .map(Zeroizing::new)
            .map_err(|_| SessionError::InvalidToken)?;

        let password = std::str::from_utf8(&plain)
            .map_err(|e| SessionError::Corrupted(e.to_string()))?
            .to_string();
        Ok(Zeroizing::new(password))
    }

    /// End the session `token` belongs to.
    ///
    /// An already-gone or expired session counts as revoked. A token that
    /// does not open the current session is refused and leaves it intact.
    pub fn revoke<S: SecureStore + ?Sized>(
        &self,
        store: &S,
        token: &SessionToken,
    ) -> Result<(), WalletError> {
        match self.resume(store, token) {
            Ok(_) => {
                store.remove(SESSION_KEY)?;
                tracing::info!("session revoked");
                Ok(())
            }
            Err(WalletError::Session(SessionError::NotFound | SessionError::Expired)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Drop any session without checking a token.
    pub fn clear<S: SecureStore + ?Sized>(&self, store: &S) -> Result<(), WalletError> {
        store.remove(SESSION_KEY)?;
        Ok(())
    }
}

fn load_record<S: SecureStore + ?Sized>(store: &S) -> Result<Option<SessionRecord>, WalletError> {
    match store.get(SESSION_KEY)? {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| SessionError::Corrupted(e.to_string()).into()),
    }
}
