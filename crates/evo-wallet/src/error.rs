//! Wallet error types.

use evo_core::error::LweError;
use thiserror::Error;

/// Why a mnemonic phrase was rejected.
///
/// Kept precise so a caller can tell the user which part of the phrase is
/// wrong.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MnemonicError {
    /// Wrong number of words.
    #[error("invalid mnemonic length: expected {expected} words, got {got}")]
    InvalidLength {
        /// Required word count.
        expected: usize,
        /// Word count found in the phrase.
        got: usize,
    },

    /// A word that is not in the dictionary.
    #[error("invalid word in mnemonic: {0}")]
    InvalidWord(String),

    /// The checksum bits do not match the seed bits.
    #[error("invalid mnemonic checksum")]
    ChecksumMismatch,
}

/// Errors from password-based seed custody.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    /// Argon2 parameters were rejected.
    #[error("invalid KDF parameters: {0}")]
    InvalidParams(String),

    /// A supplied salt does not have the required length.
    #[error("invalid salt: expected {expected} bytes, got {got}")]
    InvalidSalt {
        /// Required salt length.
        expected: usize,
        /// Supplied salt length.
        got: usize,
    },

    /// Key derivation failed.
    #[error("key derivation failed: {0}")]
    Kdf(String),

    /// Sealing the seed failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Wrong password or corrupted envelope. Deliberately carries no detail.
    #[error("invalid password or corrupted data")]
    DecryptionFailed,

    /// Persisted envelope fields could not be parsed.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Blocking task was cancelled or panicked.
    #[error("background task failed: {0}")]
    Task(String),
}

/// Errors from the secure key-value store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Store file is corrupted or has an invalid format.
    #[error("corrupted store: {0}")]
    Corrupted(String),
}

/// Errors from session unlock tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No active session is recorded.
    #[error("no active session")]
    NotFound,

    /// The session lifetime has elapsed.
    #[error("session expired")]
    Expired,

    /// The presented token does not open the recorded session.
    #[error("invalid session token")]
    InvalidToken,

    /// Token string could not be decoded.
    #[error("malformed session token: {0}")]
    MalformedToken(String),

    /// Recorded session data is unreadable.
    #[error("corrupted session record: {0}")]
    Corrupted(String),
}

/// Coarse classification of a [`WalletError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed user input or persisted data.
    Validation,
    /// Authentication or key-derivation failure.
    Crypto,
    /// Secure store unavailable or corrupted.
    Storage,
    /// Session missing, expired, or not ours.
    Session,
}

/// Errors that can occur in wallet operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// A wallet is already present in the store.
    #[error("a wallet already exists")]
    AlreadyExists,

    /// No wallet is present in the store.
    #[error("no wallet found")]
    NotFound,

    /// Seed integer does not fit in 256 bits.
    #[error("seed out of range: {0}")]
    SeedOutOfRange(String),

    /// Decrypted seed has the wrong length.
    #[error("invalid seed length: {0}")]
    InvalidSeedLength(usize),

    /// Mnemonic rejected.
    #[error(transparent)]
    Mnemonic(#[from] MnemonicError),

    /// Custody failure.
    #[error(transparent)]
    Custody(#[from] CustodyError),

    /// Store failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Session failure.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Engine construction failure.
    #[error(transparent)]
    Engine(#[from] LweError),
}

impl WalletError {
    /// Map the error onto the validation / crypto / storage / session split.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::AlreadyExists
            | WalletError::NotFound
            | WalletError::SeedOutOfRange(_)
            | WalletError::Mnemonic(_)
            | WalletError::Engine(_) => ErrorKind::Validation,
            WalletError::Custody(CustodyError::MalformedEnvelope(_))
            | WalletError::Custody(CustodyError::InvalidSalt { .. })
            | WalletError::Custody(CustodyError::InvalidParams(_)) => ErrorKind::Validation,
            WalletError::InvalidSeedLength(_) | WalletError::Custody(_) => ErrorKind::Crypto,
            WalletError::Storage(_) => ErrorKind::Storage,
            WalletError::Session(_) => ErrorKind::Session,
        }
    }
}
