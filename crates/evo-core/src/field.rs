//! HashField: the canonical reduction of byte strings to field elements.
//!
//! Every value the LWE engine derives (matrix entries, secret-vector
//! components, per-transaction seeds, the socket itself) goes through
//! [`hash_to_field`]. The digest is BLAKE3-256 read as a big-endian unsigned
//! integer and reduced modulo the engine prime, so two implementations agree
//! bit-for-bit as long as they agree on the input string.

use num_bigint::BigUint;

use crate::constants::{FIELD_SEPARATOR, HASH_LEN, SEED_LEN};

/// BLAKE3-256 digest of `bytes`.
pub fn hash256(bytes: &[u8]) -> [u8; HASH_LEN] {
    *blake3::hash(bytes).as_bytes()
}

/// Reduce a big-endian byte string modulo `prime`.
///
/// Horner's rule with `u128` intermediates; the accumulator never exceeds
/// `prime * 256 + 255`, which fits for any `u64` prime.
pub fn reduce_be(bytes: &[u8], prime: u64) -> u64 {
    debug_assert!(prime >= 2);
    let p = prime as u128;
    let mut acc: u128 = 0;
    for &b in bytes {
        acc = ((acc << 8) | b as u128) % p;
    }
    acc as u64
}

/// Hash the UTF-8 bytes of `input` and reduce the digest into `[0, prime)`.
///
/// # Examples
///
/// ```
/// use evo_core::constants::PRIME;
/// use evo_core::field::hash_to_field;
///
/// let x = hash_to_field("abc", PRIME);
/// assert!(x < PRIME);
/// assert_eq!(x, hash_to_field("abc", PRIME));
/// ```
pub fn hash_to_field(input: &str, prime: u64) -> u64 {
    reduce_be(&hash256(input.as_bytes()), prime)
}

/// Join the given parts with [`FIELD_SEPARATOR`] and hash the result.
pub fn hash_parts(parts: &[&str], prime: u64) -> u64 {
    let mut buf = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            buf.push(FIELD_SEPARATOR);
        }
        buf.push_str(part);
    }
    hash_to_field(&buf, prime)
}

/// Render a 32-byte seed as the decimal string of its big-endian integer
/// value, without leading zeros (`"0"` for the all-zero seed).
pub fn seed_decimal(seed: &[u8; SEED_LEN]) -> String {
    BigUint::from_bytes_be(seed).to_str_radix(10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PRIME;

    #[test]
    fn hash256_matches_blake3_empty_vector() {
        assert_eq!(
            hex::encode(hash256(b"")),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn hash_to_field_known_values() {
        assert_eq!(hash_to_field("", PRIME), 4_055_424_983);
        assert_eq!(hash_to_field("abc", PRIME), 1_764_968_061);
        assert_eq!(hash_to_field("0", PRIME), 379_516_400);
    }

    #[test]
    fn hash_to_field_is_below_prime() {
        for i in 0..200 {
            assert!(hash_to_field(&format!("input-{i}"), PRIME) < PRIME);
        }
    }

    #[test]
    fn hash_to_field_small_prime() {
        for i in 0..50 {
            assert!(hash_to_field(&i.to_string(), 7) < 7);
        }
    }

    #[test]
    fn reduce_be_matches_bigint() {
        let digest = hash256(b"reduce");
        let expected = BigUint::from_bytes_be(&digest) % BigUint::from(PRIME);
        assert_eq!(BigUint::from(reduce_be(&digest, PRIME)), expected);
    }

    #[test]
    fn reduce_be_empty_is_zero() {
        assert_eq!(reduce_be(&[], PRIME), 0);
    }

    #[test]
    fn reduce_be_large_prime() {
        let digest = [0xFF; 32];
        let prime = u64::MAX - 58; // largest 64-bit prime
        let expected = BigUint::from_bytes_be(&digest) % BigUint::from(prime);
        assert_eq!(BigUint::from(reduce_be(&digest, prime)), expected);
    }

    #[test]
    fn hash_parts_joins_with_separator() {
        assert_eq!(hash_parts(&["a", "b", "c"], PRIME), hash_to_field("a-b-c", PRIME));
        assert_eq!(hash_parts(&["solo"], PRIME), hash_to_field("solo", PRIME));
    }

    #[test]
    fn seed_decimal_zero() {
        assert_eq!(seed_decimal(&[0u8; 32]), "0");
    }

    #[test]
    fn seed_decimal_small_values() {
        let mut seed = [0u8; 32];
        seed[31] = 1;
        assert_eq!(seed_decimal(&seed), "1");
        seed[30] = 1;
        assert_eq!(seed_decimal(&seed), "257");
    }

    #[test]
    fn seed_decimal_counting_bytes() {
        let mut seed = [0u8; 32];
        for (i, b) in seed.iter_mut().enumerate() {
            *b = (i + 1) as u8;
        }
        assert_eq!(
            seed_decimal(&seed),
            "455867356320691211509944977504407603390036387149619137164185182714736811808"
        );
    }
}
