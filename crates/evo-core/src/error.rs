//! Error types for the Evo core primitives.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LweError {
    #[error("invalid engine config: {0}")] InvalidConfig(String),
    #[error("error sampling failed: {0}")] Sampling(String),
    #[error("arithmetic overflow")] ArithmeticOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RatchetError {
    #[error("no address to evolve")] Empty,
    #[error("invalid hex address: {0}")] InvalidHex(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SocketParseError {
    #[error("empty socket string")] Empty,
    #[error("invalid socket value: {0}")] Invalid(String),
}
