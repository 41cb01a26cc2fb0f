//! # evo-core: field hashing and socket evolution.
//!
//! Stateless primitives shared by the wallet:
//!
//! - [`field`]: BLAKE3 HashField reduction into `[0, prime)`
//! - [`lwe`]: LWE-style deterministic socket chain (`LweEngine`)
//! - [`sampler`]: error-term samplers (CSPRNG rejection sampling, fixed)
//! - [`ratchet`]: secret-free hash ratchet for address previews
//! - [`types`]: `Socket`, `GenesisState`, `TransactionResult`

pub mod constants;
pub mod error;
pub mod field;
pub mod lwe;
pub mod ratchet;
pub mod sampler;
pub mod types;

pub use error::{LweError, RatchetError, SocketParseError};
pub use lwe::{LweConfig, LweEngine};
pub use ratchet::{evolve_preview, PreviewAddress};
pub use sampler::{ErrorSampler, FixedErrorSampler, OsErrorSampler};
pub use types::{GenesisState, Socket, TransactionResult};
