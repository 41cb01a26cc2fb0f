//! 24-word seed backup phrases.
//!
//! The word list is the 2048-word BIP-39 English dictionary, but the
//! checksum is this wallet's own: the first byte of BLAKE3 over the 32 seed
//! bytes. Phrases therefore do not interoperate with BIP-39 wallets.
//!
//! ```text
//! seed (256 bits) || blake3(seed)[0] (8 bits)  =  264 bits  =  24 x 11-bit word indices
//! ```

use bip39::Language;

use evo_core::constants::SEED_LEN;
use evo_core::field::hash256;

use crate::error::MnemonicError;
use crate::keys::Seed;

/// Number of words in a phrase.
pub const WORD_COUNT: usize = 24;

/// Bits encoded by one word (`2^11 = 2048`).
pub const BITS_PER_WORD: usize = 11;

/// Total payload bits (seed plus checksum).
const TOTAL_BITS: usize = WORD_COUNT * BITS_PER_WORD;

/// The ordered dictionary. Index order is part of the phrase format.
pub fn word_list() -> &'static [&'static str; 2048] {
    Language::English.word_list()
}

fn checksum(seed: &[u8; SEED_LEN]) -> u8 {
    hash256(seed)[0]
}

/// Read the `width`-bit big-endian field starting at bit `start`.
fn read_bits(bytes: &[u8], start: usize, width: usize) -> usize {
    (start..start + width).fold(0usize, |acc, bit| {
        let set = (bytes[bit / 8] >> (7 - bit % 8)) & 1;
        (acc << 1) | set as usize
    })
}

/// Write the low `width` bits of `value` big-endian starting at bit `start`.
fn write_bits(bytes: &mut [u8], start: usize, width: usize, value: usize) {
    for k in 0..width {
        let bit = start + k;
        if (value >> (width - 1 - k)) & 1 == 1 {
            bytes[bit / 8] |= 1 << (7 - bit % 8);
        }
    }
}

/// Convert a seed to its 24-word phrase.
pub fn seed_to_mnemonic(seed: &Seed) -> String {
    let words = word_list();
    let mut payload = zeroize::Zeroizing::new([0u8; SEED_LEN + 1]);
    payload[..SEED_LEN].copy_from_slice(seed.as_bytes());
    payload[SEED_LEN] = checksum(seed.as_bytes());

    (0..WORD_COUNT)
        .map(|i| words[read_bits(&payload[..], i * BITS_PER_WORD, BITS_PER_WORD)])
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a phrase back into its seed.
///
/// Case-insensitive; any run of whitespace separates words.
pub fn mnemonic_to_seed(phrase: &str) -> Result<Seed, MnemonicError> {
    let lowered = phrase.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    if words.len() != WORD_COUNT {
        return Err(MnemonicError::InvalidLength {
            expected: WORD_COUNT,
            got: words.len(),
        });
    }

    let mut payload = zeroize::Zeroizing::new([0u8; SEED_LEN + 1]);
    for (i, word) in words.iter().enumerate() {
        let index = Language::English
            .find_word(word)
            .ok_or_else(|| MnemonicError::InvalidWord((*word).to_string()))?;
        write_bits(&mut payload[..], i * BITS_PER_WORD, BITS_PER_WORD, index as usize);
    }
    debug_assert_eq!(TOTAL_BITS, (SEED_LEN + 1) * 8);

    let mut seed_bytes = [0u8; SEED_LEN];
    seed_bytes.copy_from_slice(&payload[..SEED_LEN]);
    let seed = Seed::from_bytes(seed_bytes);
    zeroize::Zeroize::zeroize(&mut seed_bytes);

    if checksum(seed.as_bytes()) != payload[SEED_LEN] {
        return Err(MnemonicError::ChecksumMismatch);
    }
    Ok(seed)
}

/// Generate a phrase for a fresh random seed.
pub fn generate_mnemonic() -> String {
    seed_to_mnemonic(&Seed::generate())
}

/// `true` if the phrase decodes to a seed; the failure reason is dropped.
pub fn validate_mnemonic(phrase: &str) -> bool {
    mnemonic_to_seed(phrase).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dictionary_is_pinned() {
        let words = word_list();
        assert_eq!(words.len(), 2048);
        assert_eq!(words[0], "abandon");
        assert_eq!(words[42], "aim");
        assert_eq!(words[2047], "zoo");
    }

    /// Zero seed: 23 x word 0, then the checksum chunk `000 || 0x2a` = 42.
    #[test]
    fn zero_seed_known_phrase() {
        let phrase = seed_to_mnemonic(&Seed::from_bytes([0u8; 32]));
        let expected = format!("{} aim", vec!["abandon"; 23].join(" "));
        assert_eq!(phrase, expected);
    }

    #[test]
    fn max_seed_known_phrase() {
        let phrase = seed_to_mnemonic(&Seed::from_bytes([0xFF; 32]));
        let expected = format!("{} vibrant", vec!["zoo"; 23].join(" "));
        assert_eq!(phrase, expected);
    }

    #[test]
    fn counting_seed_known_phrase() {
        let mut bytes = [0u8; 32];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = (i + 1) as u8;
        }
        assert_eq!(
            seed_to_mnemonic(&Seed::from_bytes(bytes)),
            "absurd avoid scissors anxiety gather lottery category door army half long cage \
             bachelor another expect people blade school educate curtain scrub monitor lady bulk"
        );
    }

    #[test]
    fn roundtrip_generate() {
        let seed = Seed::generate();
        let phrase = seed_to_mnemonic(&seed);
        let restored = mnemonic_to_seed(&phrase).expect("roundtrip should succeed");
        assert_eq!(seed.as_bytes(), restored.as_bytes());
    }

    #[test]
    fn mnemonic_is_24_words() {
        let phrase = seed_to_mnemonic(&Seed::from_bytes([0xAB; 32]));
        let word_count = phrase.split_whitespace().count();
        assert_eq!(word_count, 24, "expected 24 words, got {word_count}: {phrase}");
    }

    #[test]
    fn uppercase_and_messy_whitespace_accepted() {
        let seed = Seed::from_bytes([0x55; 32]);
        let clean = seed_to_mnemonic(&seed);
        let messy = format!(
            "  {}\t",
            clean.to_uppercase().split_whitespace().collect::<Vec<_>>().join(" \n  ")
        );
        let restored = mnemonic_to_seed(&messy).expect("normalized phrase should parse");
        assert_eq!(seed, restored);
    }

    #[test]
    fn wrong_word_count_rejected() {
        assert_eq!(
            mnemonic_to_seed("abandon abandon").unwrap_err(),
            MnemonicError::InvalidLength { expected: 24, got: 2 }
        );
        assert_eq!(
            mnemonic_to_seed("").unwrap_err(),
            MnemonicError::InvalidLength { expected: 24, got: 0 }
        );
    }

    #[test]
    fn invalid_word_rejected() {
        let mut words = vec!["abandon"; 24];
        words[5] = "notaword";
        assert_eq!(
            mnemonic_to_seed(&words.join(" ")).unwrap_err(),
            MnemonicError::InvalidWord("notaword".into())
        );
    }

    #[test]
    fn bad_checksum_rejected() {
        // The zero seed's checksum word is "aim"; "zoo" cannot match.
        let mut phrase = vec!["abandon"; 23].join(" ");
        phrase.push_str(" zoo");
        assert_eq!(mnemonic_to_seed(&phrase).unwrap_err(), MnemonicError::ChecksumMismatch);
    }

    #[test]
    fn bip39_phrase_is_not_accepted_as_is() {
        // Valid BIP-39 (SHA-256 checksum) phrase for 32 zero bytes.
        let bip39 = format!("{} art", vec!["abandon"; 23].join(" "));
        assert_eq!(mnemonic_to_seed(&bip39).unwrap_err(), MnemonicError::ChecksumMismatch);
    }

    #[test]
    fn validate_mnemonic_bool() {
        let phrase = generate_mnemonic();
        assert!(validate_mnemonic(&phrase));
        assert!(!validate_mnemonic("abandon"));
        assert!(!validate_mnemonic(&format!("{} zoo", vec!["abandon"; 23].join(" "))));
    }

    #[test]
    fn generated_phrases_differ() {
        assert_ne!(generate_mnemonic(), generate_mnemonic());
    }

    #[test]
    fn bit_helpers_roundtrip() {
        let mut buf = [0u8; 3];
        write_bits(&mut buf, 5, 11, 0b101_0101_0101);
        assert_eq!(read_bits(&buf, 5, 11), 0b101_0101_0101);
        assert_eq!(read_bits(&buf, 0, 5), 0);
    }
}
