//! Error-term sampling for the LWE engine.
//!
//! Error terms are uniform over `[-bound, bound)`. Production sampling draws
//! 32-bit words from the OS CSPRNG and rejects the biased tail so every value
//! in the range is equally likely.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::constants::MAX_ERROR_BOUND;
use crate::error::LweError;

/// Source of LWE error terms.
pub trait ErrorSampler: Send + Sync {
    /// Draw one value uniformly from `[-bound, bound)`.
    fn sample(&self, bound: u32) -> Result<i64, LweError>;

    /// Draw `n` values.
    fn sample_vector(&self, n: usize, bound: u32) -> Result<Vec<i64>, LweError> {
        (0..n).map(|_| self.sample(bound)).collect()
    }
}

/// Rejection sampler over [`OsRng`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OsErrorSampler;

impl OsErrorSampler {
    pub fn new() -> Self {
        Self
    }
}

/// Map a raw 32-bit draw onto `[-bound, bound)`, or `None` if the draw
/// falls in the rejected tail.
fn accept(raw: u32, bound: u32) -> Option<i64> {
    let span = 2 * u64::from(bound);
    let zone = (1u64 << 32) - ((1u64 << 32) % span);
    let raw = u64::from(raw);
    if raw >= zone {
        return None;
    }
    Some((raw % span) as i64 - i64::from(bound))
}

impl ErrorSampler for OsErrorSampler {
    fn sample(&self, bound: u32) -> Result<i64, LweError> {
        if bound == 0 || bound > MAX_ERROR_BOUND {
            return Err(LweError::Sampling(format!("unsupported bound {bound}")));
        }
        let mut buf = [0u8; 4];
        loop {
            OsRng
                .try_fill_bytes(&mut buf)
                .map_err(|e| LweError::Sampling(e.to_string()))?;
            if let Some(v) = accept(u32::from_le_bytes(buf), bound) {
                return Ok(v);
            }
        }
    }
}

/// Returns the same value for every draw. Makes genesis reproducible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedErrorSampler(pub i64);

impl ErrorSampler for FixedErrorSampler {
    fn sample(&self, bound: u32) -> Result<i64, LweError> {
        let b = i64::from(bound);
        if self.0 < -b || self.0 >= b {
            return Err(LweError::Sampling(format!(
                "fixed error {} outside [-{bound}, {bound})",
                self.0
            )));
        }
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn os_sampler_stays_in_range() {
        let s = OsErrorSampler::new();
        for _ in 0..2_000 {
            let v = s.sample(16).unwrap();
            assert!((-16..16).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn os_sampler_covers_range() {
        let s = OsErrorSampler::new();
        let seen: HashSet<i64> = (0..5_000).map(|_| s.sample(4).unwrap()).collect();
        assert_eq!(seen.len(), 8, "expected all of -4..4, saw {seen:?}");
    }

    #[test]
    fn os_sampler_rejects_zero_bound() {
        assert!(OsErrorSampler.sample(0).is_err());
    }

    #[test]
    fn accept_maps_edges() {
        assert_eq!(accept(0, 16), Some(-16));
        assert_eq!(accept(31, 16), Some(15));
        assert_eq!(accept(32, 16), Some(-16));
    }

    #[test]
    fn accept_rejects_biased_tail() {
        // 2^32 % 6 == 4, so the last four draws are rejected for bound 3.
        assert_eq!(accept(u32::MAX, 3), None);
        assert_eq!(accept(u32::MAX - 3, 3), None);
        assert!(accept(u32::MAX - 4, 3).is_some());
    }

    #[test]
    fn accept_power_of_two_span_never_rejects() {
        assert!(accept(u32::MAX, 16).is_some());
    }

    #[test]
    fn sample_vector_length() {
        let v = OsErrorSampler.sample_vector(64, 16).unwrap();
        assert_eq!(v.len(), 64);
    }

    #[test]
    fn fixed_sampler_returns_constant() {
        let s = FixedErrorSampler(-3);
        assert_eq!(s.sample_vector(5, 16).unwrap(), vec![-3; 5]);
    }

    #[test]
    fn fixed_sampler_rejects_out_of_range() {
        assert!(FixedErrorSampler(16).sample(16).is_err());
        assert!(FixedErrorSampler(-17).sample(16).is_err());
        assert!(FixedErrorSampler(-16).sample(16).is_ok());
    }
}
