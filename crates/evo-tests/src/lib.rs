//! Cross-crate test suite for the Evo wallet.
//!
//! Integration tests live under `tests/`:
//!
//! - `e2e.rs` walks a wallet through its whole lifecycle on a real file
//!   store and checks the pinned derivation vectors end to end.
//! - `adversarial.rs` feeds randomized and hostile input to the phrase
//!   codec, the seed envelope, and the socket engine.

pub mod helpers;
