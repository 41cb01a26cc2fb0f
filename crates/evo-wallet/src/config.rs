//! Vault configuration.

use serde::{Deserialize, Serialize};

use crate::kdf::KdfParams;
use crate::session::DEFAULT_SESSION_TTL_SECS;

/// Tunables for a [`Vault`](crate::vault::Vault).
///
/// `kdf` must stay the same for the life of a wallet: an envelope sealed
/// under one cost profile does not open under another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    pub kdf: KdfParams,
    pub session_ttl_secs: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

impl VaultConfig {
    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    pub fn with_session_ttl(mut self, secs: u64) -> Self {
        self.session_ttl_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = VaultConfig::default();
        assert_eq!(config.kdf, KdfParams::default());
        assert_eq!(config.session_ttl_secs, 900);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: VaultConfig = serde_json::from_str(r#"{"session_ttl_secs": 60}"#).unwrap();
        assert_eq!(config.session_ttl_secs, 60);
        assert_eq!(config.kdf, KdfParams::default());
    }

    #[test]
    fn builders() {
        let config = VaultConfig::default()
            .with_kdf(KdfParams::new(64, 1, 1))
            .with_session_ttl(5);
        assert_eq!(config.kdf.m_cost_kib, 64);
        assert_eq!(config.session_ttl_secs, 5);
    }
}
