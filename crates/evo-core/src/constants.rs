//! Engine constants. Changing any of these breaks socket compatibility with
//! every other implementation of the chain.

/// Default field modulus, `2^32 - 5`.
///
/// # Examples
///
/// ```
/// use evo_core::constants::PRIME;
/// assert_eq!(PRIME, 4_294_967_291);
/// ```
pub const PRIME: u64 = (1 << 32) - 5;

/// Default LWE matrix dimension (the matrix is `DIMENSION x DIMENSION`).
pub const DEFAULT_DIMENSION: usize = 512;

/// Default error bound. Error terms are drawn from `[-bound, bound)`.
pub const DEFAULT_ERROR_BOUND: u32 = 16;

/// Largest error bound the CSPRNG sampler supports. `2 * bound` must fit the
/// 32-bit draw it rejects against.
pub const MAX_ERROR_BOUND: u32 = 1 << 30;

/// Separator placed between the parts of every HashField input string.
pub const FIELD_SEPARATOR: char = '-';

/// Tag inserted between the secret seed and the index of a secret-vector
/// component (`"{seed}-s-{i}"`).
pub const SECRET_VECTOR_TAG: &str = "s";

/// Byte length of a BLAKE3 digest.
pub const HASH_LEN: usize = 32;

/// Byte length of a master seed.
pub const SEED_LEN: usize = 32;

/// Number of hex digits a socket is padded to by [`Socket::to_hex`](crate::types::Socket::to_hex).
pub const SOCKET_HEX_WIDTH: usize = 16;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prime_is_two_pow_32_minus_five() {
        assert_eq!(PRIME, 2u64.pow(32) - 5);
    }

    #[test]
    fn defaults_match_reference_parameters() {
        assert_eq!(DEFAULT_DIMENSION, 512);
        assert_eq!(DEFAULT_ERROR_BOUND, 16);
    }

    #[test]
    fn error_range_fits_inside_field() {
        assert!(u64::from(DEFAULT_ERROR_BOUND) * 2 < PRIME);
        assert!(DEFAULT_ERROR_BOUND <= MAX_ERROR_BOUND);
    }
}
