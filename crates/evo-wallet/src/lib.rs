//! # evo-wallet: seed custody for the Evo wallet.
//!
//! Generates and backs up the 256-bit master seed, seals it at rest under a
//! password, and hands out short-lived unlock sessions.
//!
//! # Modules
//!
//! - [`error`]: `WalletError` and the per-concern error enums
//! - [`keys`]: `Seed`, zeroized on drop
//! - [`mnemonic`]: 24-word phrases with a BLAKE3 checksum
//! - [`kdf`]: Argon2id password key derivation
//! - [`encryption`]: XChaCha20-Poly1305 seed envelope
//! - [`storage`]: `SecureStore` trait, in-memory and file stores
//! - [`session`]: token-sealed unlock sessions
//! - [`vault`]: create / restore / unlock / lock over a store
//! - [`config`]: `VaultConfig`

pub mod config;
pub mod encryption;
pub mod error;
pub mod kdf;
pub mod keys;
pub mod mnemonic;
pub mod session;
pub mod storage;
pub mod vault;

// Re-exports for convenient access
pub use config::VaultConfig;
pub use encryption::{SeedEnvelope, StoredCiphertext, decrypt_seed, encrypt_seed};
pub use error::{CustodyError, ErrorKind, MnemonicError, SessionError, StorageError, WalletError};
pub use kdf::{DerivedKey, KdfParams, derive_key};
pub use keys::Seed;
pub use mnemonic::{generate_mnemonic, mnemonic_to_seed, seed_to_mnemonic, validate_mnemonic};
pub use session::{SessionManager, SessionToken};
pub use storage::{FileStore, MemoryStore, SecureStore};
pub use vault::{CreatedWallet, UnlockedWallet, Vault};
