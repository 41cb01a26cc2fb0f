//! CLI configuration resolved from flags, then environment variables, then
//! defaults under `~/.evo`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use evo_core::constants::DEFAULT_DIMENSION;

/// Store file name inside the data directory.
pub const STORE_FILE: &str = "vault.json";

/// Values supplied on the command line. `None` defers to the environment.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub log: Option<String>,
    pub dimension: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliConfig {
    /// Directory holding the store file.
    pub data_dir: PathBuf,
    /// `tracing` filter directive.
    pub log_filter: String,
    /// LWE dimension for socket commands.
    pub lwe_dimension: usize,
}

impl CliConfig {
    /// Resolve against the process environment and home directory.
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        Self::resolve_with(overrides, |key| std::env::var(key).ok(), dirs::home_dir())
    }

    /// Resolve with an explicit environment lookup and home directory.
    pub fn resolve_with(
        overrides: Overrides,
        env: impl Fn(&str) -> Option<String>,
        home: Option<PathBuf>,
    ) -> Result<Self> {
        let data_dir = match overrides.data_dir.or_else(|| env("EVO_DATA_DIR").map(PathBuf::from)) {
            Some(dir) => dir,
            None => home.context("Could not determine home directory")?.join(".evo"),
        };

        let log_filter = overrides
            .log
            .or_else(|| env("EVO_LOG"))
            .or_else(|| env("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());

        let lwe_dimension = match overrides.dimension {
            Some(d) => d,
            None => match env("EVO_LWE_DIMENSION") {
                Some(raw) => raw
                    .parse()
                    .context("EVO_LWE_DIMENSION must be a positive integer")?,
                None => DEFAULT_DIMENSION,
            },
        };
        anyhow::ensure!(lwe_dimension > 0, "LWE dimension must be positive");

        Ok(Self {
            data_dir,
            log_filter,
            lwe_dimension,
        })
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_under_home() {
        let config =
            CliConfig::resolve_with(Overrides::default(), env_from(&[]), Some("/home/u".into()))
                .unwrap();
        assert_eq!(config.store_path(), PathBuf::from("/home/u/.evo/vault.json"));
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.lwe_dimension, 512);
    }

    #[test]
    fn env_applies() {
        let env = env_from(&[
            ("EVO_DATA_DIR", "/data"),
            ("EVO_LOG", "debug"),
            ("EVO_LWE_DIMENSION", "64"),
        ]);
        let config = CliConfig::resolve_with(Overrides::default(), env, None).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/data"));
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.lwe_dimension, 64);
    }

    #[test]
    fn flags_beat_env() {
        let env = env_from(&[("EVO_DATA_DIR", "/data"), ("EVO_LWE_DIMENSION", "64")]);
        let overrides = Overrides {
            data_dir: Some("/flag".into()),
            log: Some("warn".into()),
            dimension: Some(8),
        };
        let config = CliConfig::resolve_with(overrides, env, None).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/flag"));
        assert_eq!(config.log_filter, "warn");
        assert_eq!(config.lwe_dimension, 8);
    }

    #[test]
    fn bad_dimension_rejected() {
        let env = env_from(&[("EVO_LWE_DIMENSION", "lots")]);
        assert!(CliConfig::resolve_with(Overrides::default(), env, Some("/h".into())).is_err());

        let zero = Overrides {
            dimension: Some(0),
            ..Overrides::default()
        };
        assert!(CliConfig::resolve_with(zero, env_from(&[]), Some("/h".into())).is_err());
    }

    #[test]
    fn no_home_no_data_dir_fails() {
        assert!(CliConfig::resolve_with(Overrides::default(), env_from(&[]), None).is_err());
    }
}
