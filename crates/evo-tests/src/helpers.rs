//! Shared test helpers for E2E and adversarial tests.

use std::path::Path;

use evo_core::{FixedErrorSampler, LweConfig, LweEngine};
use evo_wallet::{FileStore, KdfParams, MemoryStore, Vault, VaultConfig};

/// Argon2 cost low enough for tests to run in milliseconds.
pub const FAST_KDF: KdfParams = KdfParams::new(64, 1, 1);

/// Password used by the pinned vectors.
pub const VECTOR_PASSWORD: &str = "correct horse battery staple";

/// Phrase for the seed `01 02 .. 20`.
pub const COUNTING_PHRASE: &str = "absurd avoid scissors anxiety gather lottery category door \
    army half long cage bachelor another expect people blade school educate curtain scrub \
    monitor lady bulk";

/// Seed bytes `1..=32`.
pub fn counting_seed() -> [u8; 32] {
    std::array::from_fn(|i| (i + 1) as u8)
}

pub fn fast_config() -> VaultConfig {
    VaultConfig::default().with_kdf(FAST_KDF)
}

pub fn memory_vault() -> Vault<MemoryStore> {
    Vault::new(MemoryStore::new(), fast_config())
}

pub fn file_vault(path: &Path) -> Vault<FileStore> {
    Vault::new(FileStore::new(path), fast_config())
}

/// Small-dimension engine with a constant error term.
pub fn fixed_engine(
    seed: &[u8; 32],
    password: &str,
    dimension: usize,
    error: i64,
) -> LweEngine<FixedErrorSampler> {
    let config = LweConfig {
        dimension,
        ..LweConfig::default()
    };
    match LweEngine::with_sampler(seed, password, config, FixedErrorSampler(error)) {
        Ok(engine) => engine,
        Err(e) => panic!("test engine config rejected: {e}"),
    }
}
