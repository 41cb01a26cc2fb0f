//! LWE-style deterministic socket evolution.
//!
//! A socket is the HashField image of `A·s + e (mod p)` where
//!
//! - `A[i][j] = H("{matrix_seed}-{i}-{j}")`,
//! - `s[i]    = H("{secret_seed}-s-{i}")`,
//! - `e[i]`   is drawn uniformly from `[-error_bound, error_bound)`,
//!
//! and the socket is `H(r[0]-r[1]-...-r[n-1])` over the decimal components of
//! the result vector. Genesis keys the chain with the master seed (decimal)
//! and the password; each transaction re-keys it with
//! `H("{master}-{descriptor}")` and `H("{password}-{descriptor}")`.
//!
//! Rows of `A` are generated on the fly and folded straight into the dot
//! product, so memory stays `O(dimension)` even at the default 512.

use std::fmt;
use std::fmt::Write as _;

use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::constants::{
    DEFAULT_DIMENSION, DEFAULT_ERROR_BOUND, FIELD_SEPARATOR, MAX_ERROR_BOUND, PRIME,
    SECRET_VECTOR_TAG, SEED_LEN,
};
use crate::error::LweError;
use crate::field::{hash_parts, hash_to_field, seed_decimal};
use crate::sampler::{ErrorSampler, OsErrorSampler};
use crate::types::{GenesisState, Socket, TransactionResult};

/// Engine parameters. Immutable once an engine is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LweConfig {
    pub dimension: usize,
    pub error_bound: u32,
    pub prime: u64,
}

impl Default for LweConfig {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            error_bound: DEFAULT_ERROR_BOUND,
            prime: PRIME,
        }
    }
}

impl LweConfig {
    /// Check the parameters describe a usable field and error range.
    pub fn validate(&self) -> Result<(), LweError> {
        if self.dimension == 0 {
            return Err(LweError::InvalidConfig("dimension must be at least 1".into()));
        }
        if self.error_bound == 0 {
            return Err(LweError::InvalidConfig("error bound must be at least 1".into()));
        }
        if self.error_bound > MAX_ERROR_BOUND {
            return Err(LweError::InvalidConfig(format!(
                "error bound {} exceeds {MAX_ERROR_BOUND}",
                self.error_bound
            )));
        }
        if self.prime < 2 {
            return Err(LweError::InvalidConfig(format!("prime {} is too small", self.prime)));
        }
        if 2 * u64::from(self.error_bound) >= self.prime {
            return Err(LweError::InvalidConfig(format!(
                "error range 2*{} does not fit below prime {}",
                self.error_bound, self.prime
            )));
        }
        Ok(())
    }
}

/// Deterministic socket-chain engine bound to one `(master seed, password)`.
///
/// The seed (as its decimal string) and password are copied into zeroizing
/// buffers owned by the engine and wiped on drop.
pub struct LweEngine<S: ErrorSampler = OsErrorSampler> {
    master: Zeroizing<String>,
    password: Zeroizing<String>,
    config: LweConfig,
    sampler: S,
}

impl LweEngine<OsErrorSampler> {
    /// Build an engine that samples error terms from the OS CSPRNG.
    pub fn new(master_seed: &[u8; SEED_LEN], password: &str, config: LweConfig) -> Result<Self, LweError> {
        Self::with_sampler(master_seed, password, config, OsErrorSampler)
    }
}

impl<S: ErrorSampler> LweEngine<S> {
    /// Build an engine with an explicit error sampler.
    pub fn with_sampler(
        master_seed: &[u8; SEED_LEN],
        password: &str,
        config: LweConfig,
        sampler: S,
    ) -> Result<Self, LweError> {
        config.validate()?;
        Ok(Self {
            master: Zeroizing::new(seed_decimal(master_seed)),
            password: Zeroizing::new(password.to_owned()),
            config,
            sampler,
        })
    }

    /// The parameters this engine was built with.
    pub fn config(&self) -> LweConfig {
        self.config
    }

    /// Derive the root socket of the chain.
    pub fn create_genesis_state(&self) -> Result<GenesisState, LweError> {
        let socket = self.derive_socket(&self.master, &self.password)?;
        debug!(socket = %socket, dimension = self.config.dimension, "lwe: genesis derived");
        Ok(GenesisState {
            socket,
            matrix_seed: self.master.clone(),
            secret_seed: self.password.clone(),
        })
    }

    /// Evolve the chain by one transaction.
    ///
    /// Never fails: any internal error yields a rejected result that keeps
    /// `previous` as the current socket.
    pub fn process_transaction(&self, previous: Socket, descriptor: &str) -> TransactionResult {
        match self.evolve(descriptor) {
            Ok(result) => {
                debug!(from = %previous, to = %result.next_socket, "lwe: socket evolved");
                result
            }
            Err(e) => {
                warn!(socket = %previous, error = %e, "lwe: evolution rejected");
                TransactionResult::rejected(previous)
            }
        }
    }

    fn evolve(&self, descriptor: &str) -> Result<TransactionResult, LweError> {
        let p = self.config.prime;
        let matrix_seed = hash_parts(&[self.master.as_str(), descriptor], p).to_string();
        let secret_seed = hash_parts(&[self.password.as_str(), descriptor], p).to_string();
        let next_socket = self.derive_socket(&matrix_seed, &secret_seed)?;
        Ok(TransactionResult {
            is_valid: true,
            next_socket,
            matrix_seed,
            secret_seed,
        })
    }

    /// `H(join((A·s + e) mod p))` for the given seeds.
    fn derive_socket(&self, matrix_seed: &str, secret_seed: &str) -> Result<Socket, LweError> {
        let n = self.config.dimension;
        let s = self.secret_vector(secret_seed);
        let e = self.sampler.sample_vector(n, self.config.error_bound)?;
        let result = self.multiply_add(matrix_seed, &s, &e)?;

        let mut joined = String::with_capacity(n * 11);
        for (i, r) in result.iter().enumerate() {
            if i > 0 {
                joined.push(FIELD_SEPARATOR);
            }
            let _ = write!(joined, "{r}");
        }
        Ok(Socket(hash_to_field(&joined, self.config.prime)))
    }

    fn secret_vector(&self, seed: &str) -> Zeroizing<Vec<u64>> {
        let p = self.config.prime;
        let prefix = Zeroizing::new(format!("{seed}{FIELD_SEPARATOR}{SECRET_VECTOR_TAG}{FIELD_SEPARATOR}"));
        let mut buf = Zeroizing::new(String::with_capacity(prefix.len() + 4));
        let v = (0..self.config.dimension)
            .map(|i| {
                buf.clear();
                buf.push_str(&prefix);
                let _ = write!(buf, "{i}");
                hash_to_field(&buf, p)
            })
            .collect();
        Zeroizing::new(v)
    }

    /// Row-by-row `(A·s + e) mod p`, generating `A` from `matrix_seed`.
    fn multiply_add(&self, matrix_seed: &str, s: &[u64], e: &[i64]) -> Result<Vec<u64>, LweError> {
        let n = self.config.dimension;
        if s.len() != n || e.len() != n {
            return Err(LweError::InvalidConfig(format!(
                "vector length mismatch: s={}, e={}, n={n}",
                s.len(),
                e.len()
            )));
        }
        let p = self.config.prime as u128;
        let mut buf = Zeroizing::new(String::with_capacity(matrix_seed.len() + 12));
        let mut out = Vec::with_capacity(n);
        for (i, err) in e.iter().enumerate() {
            let mut acc: u128 = 0;
            for (j, sj) in s.iter().enumerate() {
                buf.clear();
                let _ = write!(buf, "{matrix_seed}{FIELD_SEPARATOR}{i}{FIELD_SEPARATOR}{j}");
                let a = hash_to_field(&buf, self.config.prime) as u128;
                acc = (acc + (a * (*sj as u128)) % p) % p;
            }
            let sum = (acc as i128)
                .checked_add(*err as i128)
                .ok_or(LweError::ArithmeticOverflow)?;
            out.push(sum.rem_euclid(p as i128) as u64);
        }
        Ok(out)
    }
}

impl<S: ErrorSampler> fmt::Debug for LweEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LweEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::FixedErrorSampler;

    /// Seed bytes 0x01..=0x20.
    fn counting_seed() -> [u8; 32] {
        let mut seed = [0u8; 32];
        for (i, b) in seed.iter_mut().enumerate() {
            *b = (i + 1) as u8;
        }
        seed
    }

    fn small(dimension: usize) -> LweConfig {
        LweConfig {
            dimension,
            ..LweConfig::default()
        }
    }

    fn fixed_engine(seed: &[u8; 32], pw: &str, dim: usize, err: i64) -> LweEngine<FixedErrorSampler> {
        LweEngine::with_sampler(seed, pw, small(dim), FixedErrorSampler(err)).unwrap()
    }

    struct FailingSampler;

    impl ErrorSampler for FailingSampler {
        fn sample(&self, _bound: u32) -> Result<i64, LweError> {
            Err(LweError::Sampling("entropy source unavailable".into()))
        }
    }

    #[test]
    fn default_config_values() {
        let cfg = LweConfig::default();
        assert_eq!(cfg.dimension, 512);
        assert_eq!(cfg.error_bound, 16);
        assert_eq!(cfg.prime, 4_294_967_291);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_rejects_degenerate_values() {
        assert!(LweConfig { dimension: 0, ..LweConfig::default() }.validate().is_err());
        assert!(LweConfig { error_bound: 0, ..LweConfig::default() }.validate().is_err());
        assert!(LweConfig { prime: 1, ..LweConfig::default() }.validate().is_err());
        assert!(LweConfig { prime: 32, error_bound: 16, dimension: 4 }.validate().is_err());
    }

    #[test]
    fn config_error_bound_capped_at_sampler_limit() {
        let at_limit = LweConfig { dimension: 2, error_bound: MAX_ERROR_BOUND, prime: PRIME };
        assert!(at_limit.validate().is_ok());
        let engine = LweEngine::new(&[1u8; 32], "pw", at_limit).unwrap();
        assert!(engine.create_genesis_state().is_ok());
        assert!(engine.process_transaction(Socket(5), "tx").is_valid);

        let over = LweConfig { error_bound: MAX_ERROR_BOUND + 1, ..at_limit };
        assert!(matches!(over.validate(), Err(LweError::InvalidConfig(_))));
        assert!(LweEngine::new(&[1u8; 32], "pw", over).is_err());
    }

    #[test]
    fn engine_exposes_config() {
        let engine = fixed_engine(&[0u8; 32], "pw", 3, 0);
        assert_eq!(engine.config(), small(3));
    }

    #[test]
    fn genesis_known_vector_zero_error() {
        let engine = fixed_engine(&counting_seed(), "correct horse battery staple", 4, 0);
        let g = engine.create_genesis_state().unwrap();
        assert_eq!(g.socket, Socket(2_497_458_723));
    }

    #[test]
    fn genesis_known_vector_negative_error() {
        let engine = fixed_engine(&counting_seed(), "correct horse battery staple", 4, -3);
        let g = engine.create_genesis_state().unwrap();
        assert_eq!(g.socket, Socket(4_011_585_093));
    }

    #[test]
    fn genesis_zero_seed_known_vector() {
        let engine = fixed_engine(&[0u8; 32], "pw", 2, 0);
        assert_eq!(engine.create_genesis_state().unwrap().socket, Socket(851_442_769));
    }

    #[test]
    fn genesis_returns_seeds() {
        let engine = fixed_engine(&[0u8; 32], "pw", 2, 0);
        let g = engine.create_genesis_state().unwrap();
        assert_eq!(g.matrix_seed.as_str(), "0");
        assert_eq!(g.secret_seed.as_str(), "pw");
    }

    #[test]
    fn genesis_deterministic_with_fixed_sampler() {
        let a = fixed_engine(&[7u8; 32], "pw", 8, 5).create_genesis_state().unwrap();
        let b = fixed_engine(&[7u8; 32], "pw", 8, 5).create_genesis_state().unwrap();
        assert_eq!(a.socket, b.socket);
    }

    #[test]
    fn genesis_depends_on_password_and_seed() {
        let base = fixed_engine(&[7u8; 32], "pw", 8, 0).create_genesis_state().unwrap();
        let other_pw = fixed_engine(&[7u8; 32], "pw2", 8, 0).create_genesis_state().unwrap();
        let other_seed = fixed_engine(&[8u8; 32], "pw", 8, 0).create_genesis_state().unwrap();
        assert_ne!(base.socket, other_pw.socket);
        assert_ne!(base.socket, other_seed.socket);
    }

    #[test]
    fn genesis_with_os_sampler_is_in_field() {
        let engine = LweEngine::new(&[3u8; 32], "pw", small(16)).unwrap();
        let g = engine.create_genesis_state().unwrap();
        assert!(g.socket.value() < PRIME);
    }

    #[test]
    fn genesis_default_dimension() {
        let engine = LweEngine::new(&counting_seed(), "pw", LweConfig::default()).unwrap();
        let g = engine.create_genesis_state().unwrap();
        assert!(g.socket.value() < PRIME);
    }

    #[test]
    fn process_transaction_known_vector() {
        let engine = fixed_engine(&counting_seed(), "correct horse battery staple", 4, 0);
        let r = engine.process_transaction(Socket(1), "tx-1");
        assert!(r.is_valid);
        assert_eq!(r.matrix_seed, "4219971062");
        assert_eq!(r.secret_seed, "3452448851");
        assert_eq!(r.next_socket, Socket(3_573_652_217));
    }

    #[test]
    fn process_transaction_deterministic_per_descriptor() {
        let engine = fixed_engine(&[9u8; 32], "pw", 6, 0);
        let a = engine.process_transaction(Socket(0), "pay alice 5");
        let b = engine.process_transaction(Socket(0), "pay alice 5");
        let c = engine.process_transaction(Socket(0), "pay bob 5");
        assert_eq!(a, b);
        assert_ne!(a.next_socket, c.next_socket);
    }

    #[test]
    fn process_transaction_handles_odd_descriptors() {
        let engine = fixed_engine(&[9u8; 32], "pw", 3, 0);
        for d in ["", "\0", "a\0b", "日本語", "-", "--0-0"] {
            let r = engine.process_transaction(Socket(5), d);
            assert!(r.is_valid, "descriptor {d:?} rejected");
            assert!(r.next_socket.value() < PRIME);
        }
    }

    #[test]
    fn process_transaction_failure_keeps_previous_socket() {
        let engine = LweEngine::with_sampler(&[1u8; 32], "pw", small(4), FailingSampler).unwrap();
        let r = engine.process_transaction(Socket(424_242), "tx");
        assert!(!r.is_valid);
        assert_eq!(r.next_socket, Socket(424_242));
        assert_eq!(r.matrix_seed, "");
        assert_eq!(r.secret_seed, "");
    }

    #[test]
    fn genesis_propagates_sampler_failure() {
        let engine = LweEngine::with_sampler(&[1u8; 32], "pw", small(4), FailingSampler).unwrap();
        assert!(matches!(engine.create_genesis_state(), Err(LweError::Sampling(_))));
    }

    #[test]
    fn with_sampler_rejects_invalid_config() {
        let err = LweEngine::with_sampler(
            &[1u8; 32],
            "pw",
            LweConfig { dimension: 0, ..LweConfig::default() },
            FixedErrorSampler(0),
        )
        .unwrap_err();
        assert!(matches!(err, LweError::InvalidConfig(_)));
    }

    #[test]
    fn negative_error_reduces_euclidean() {
        let engine = fixed_engine(&[0u8; 32], "pw", 3, 0);
        let out = engine.multiply_add("m", &[0, 0, 0], &[-1, -2, 0]).unwrap();
        assert_eq!(out, vec![PRIME - 1, PRIME - 2, 0]);
    }

    #[test]
    fn debug_hides_secrets() {
        let engine = fixed_engine(&[0u8; 32], "hunter2", 2, 0);
        let debug = format!("{engine:?}");
        assert!(debug.contains("LweEngine"));
        assert!(!debug.contains("hunter2"));
    }
}
