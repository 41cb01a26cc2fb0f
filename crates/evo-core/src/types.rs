//! Value types produced by the address engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use crate::constants::SOCKET_HEX_WIDTH;
use crate::error::SocketParseError;

/// A field element naming the current derived address/commitment.
///
/// Sockets are immutable values. Which socket is "current" is tracked by the
/// caller, not by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Socket(pub u64);

impl Socket {
    /// Raw field value.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// `0x`-prefixed hex, zero-padded to 16 digits.
    ///
    /// # Examples
    ///
    /// ```
    /// use evo_core::types::Socket;
    /// assert_eq!(Socket(255).to_hex(), "0x00000000000000ff");
    /// ```
    pub fn to_hex(&self) -> String {
        format!("0x{:0width$x}", self.0, width = SOCKET_HEX_WIDTH)
    }
}

impl fmt::Display for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Socket {
    type Err = SocketParseError;

    /// Accepts a decimal string or a `0x`-prefixed hex string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SocketParseError::Empty);
        }
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => s.parse::<u64>(),
        };
        parsed
            .map(Socket)
            .map_err(|_| SocketParseError::Invalid(s.to_string()))
    }
}

impl From<u64> for Socket {
    fn from(v: u64) -> Self {
        Socket(v)
    }
}

/// Root of a socket chain, derived once from `(master seed, password)`.
///
/// `matrix_seed` and `secret_seed` are the strings the chain was keyed with;
/// for genesis that is the master-seed decimal and the password itself, so
/// both are held in zeroizing buffers and redacted from `Debug`.
#[derive(Clone)]
pub struct GenesisState {
    pub socket: Socket,
    pub matrix_seed: Zeroizing<String>,
    pub secret_seed: Zeroizing<String>,
}

impl fmt::Debug for GenesisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenesisState")
            .field("socket", &self.socket)
            .field("matrix_seed", &"[REDACTED]")
            .field("secret_seed", &"[REDACTED]")
            .finish()
    }
}

/// Output of one evolution step.
///
/// When `is_valid` is false the step was rejected: `next_socket` equals the
/// socket that was passed in and both seeds are empty.
#[derive(Clone, PartialEq, Eq)]
pub struct TransactionResult {
    pub is_valid: bool,
    pub next_socket: Socket,
    pub matrix_seed: String,
    pub secret_seed: String,
}

impl TransactionResult {
    /// A rejected step that leaves the chain at `previous`.
    pub fn rejected(previous: Socket) -> Self {
        Self {
            is_valid: false,
            next_socket: previous,
            matrix_seed: String::new(),
            secret_seed: String::new(),
        }
    }
}

impl fmt::Debug for TransactionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionResult")
            .field("is_valid", &self.is_valid)
            .field("next_socket", &self.next_socket)
            .field("matrix_seed", &self.matrix_seed)
            .finish_non_exhaustive()
    }
}
