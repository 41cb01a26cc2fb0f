//! Wallet lifecycle over a [`SecureStore`].
//!
//! The vault owns the only code paths that touch the seed envelope in the
//! store: create, restore, unlock, resume a session, lock, wipe.

use std::fmt;

use evo_core::lwe::{LweConfig, LweEngine};
use zeroize::Zeroizing;

use crate::config::VaultConfig;
use crate::encryption::{
    SeedEnvelope, StoredCiphertext, decrypt_seed, decrypt_seed_blocking, encrypt_seed,
    encrypt_seed_blocking,
};
use crate::error::{StorageError, WalletError};
use crate::keys::Seed;
use crate::mnemonic::{mnemonic_to_seed, seed_to_mnemonic};
use crate::session::{SessionManager, SessionToken};
use crate::storage::{MASTER_SEED_KEY, SALT_KEY, SESSION_KEY, SecureStore};

/// Result of [`Vault::create`]: the backup phrase to show once, and the
/// session the new wallet is unlocked under.
pub struct CreatedWallet {
    pub phrase: Zeroizing<String>,
    pub session: SessionToken,
}

impl fmt::Debug for CreatedWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatedWallet")
            .field("phrase", &"[REDACTED]")
            .field("session", &self.session)
            .finish()
    }
}

/// An opened wallet. Holds the seed and password in zeroizing memory.
pub struct UnlockedWallet {
    seed: Seed,
    password: Zeroizing<String>,
    session: SessionToken,
}

impl UnlockedWallet {
    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    pub fn session(&self) -> &SessionToken {
        &self.session
    }

    /// The 24-word backup phrase for this wallet's seed.
    pub fn backup_phrase(&self) -> Zeroizing<String> {
        Zeroizing::new(seed_to_mnemonic(&self.seed))
    }

    /// Socket engine keyed by this wallet's seed and password.
    pub fn engine(&self, config: LweConfig) -> Result<LweEngine, WalletError> {
        Ok(LweEngine::new(self.seed.as_bytes(), &self.password, config)?)
    }
}

impl fmt::Debug for UnlockedWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnlockedWallet")
            .field("seed", &self.seed)
            .field("password", &"[REDACTED]")
            .field("session", &self.session)
            .finish()
    }
}

/// Wallet custody over a key-value store.
pub struct Vault<S: SecureStore> {
    store: S,
    config: VaultConfig,
    sessions: SessionManager,
}

impl<S: SecureStore> Vault<S> {
    pub fn new(store: S, config: VaultConfig) -> Self {
        Self {
            store,
            sessions: SessionManager::new(config.session_ttl_secs),
            config,
        }
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// A wallet exists once its salt has been written.
    pub fn exists(&self) -> Result<bool, WalletError> {
        Ok(self.store.get(SALT_KEY)?.is_some())
    }

    /// Create a fresh wallet sealed under `password`.
    ///
    /// Refuses with [`WalletError::AlreadyExists`] if a wallet is present;
    /// the existing wallet is left untouched.
    pub fn create(&self, password: &str) -> Result<CreatedWallet, WalletError> {
        self.ensure_absent()?;
        let seed = Seed::generate();
        let envelope = encrypt_seed(seed.as_bytes(), password, None, &self.config.kdf)?;
        self.persist(&envelope)?;
        tracing::info!("wallet created");
        self.created(&seed, password)
    }

    /// [`create`](Self::create) with the KDF on the blocking pool.
    pub async fn create_async(&self, password: &str) -> Result<CreatedWallet, WalletError> {
        self.ensure_absent()?;
        let seed = Seed::generate();
        let envelope = encrypt_seed_blocking(
            Zeroizing::new(seed.as_bytes().to_vec()),
            Zeroizing::new(password.to_string()),
            None,
            self.config.kdf,
        )
        .await?;
        self.persist(&envelope)?;
        tracing::info!("wallet created");
        self.created(&seed, password)
    }

    /// Rebuild a wallet from its backup phrase, replacing whatever the
    /// store holds.
    ///
    /// If the store rejects a write the previous records are put back, so a
    /// failed restore leaves the existing wallet openable.
    pub fn restore(&self, phrase: &str, password: &str) -> Result<UnlockedWallet, WalletError> {
        let seed = mnemonic_to_seed(phrase)?;
        let envelope = encrypt_seed(seed.as_bytes(), password, None, &self.config.kdf)?;
        self.replace(&envelope)?;
        tracing::info!("wallet restored from phrase");
        self.opened(seed, password)
    }

    /// [`restore`](Self::restore) with the KDF on the blocking pool.
    pub async fn restore_async(
        &self,
        phrase: &str,
        password: &str,
    ) -> Result<UnlockedWallet, WalletError> {
        let seed = mnemonic_to_seed(phrase)?;
        let envelope = encrypt_seed_blocking(
            Zeroizing::new(seed.as_bytes().to_vec()),
            Zeroizing::new(password.to_string()),
            None,
            self.config.kdf,
        )
        .await?;
        self.replace(&envelope)?;
        tracing::info!("wallet restored from phrase");
        self.opened(seed, password)
    }

    /// Open the wallet with its password and start a session.
    pub fn unlock(&self, password: &str) -> Result<UnlockedWallet, WalletError> {
        let envelope = self.load_envelope()?;
        let plain = decrypt_seed(&envelope, password, &self.config.kdf)?;
        let seed = Seed::from_slice(&plain)?;
        tracing::info!("wallet unlocked");
        self.opened(seed, password)
    }

    /// [`unlock`](Self::unlock) with the KDF on the blocking pool.
    pub async fn unlock_async(&self, password: &str) -> Result<UnlockedWallet, WalletError> {
        let envelope = self.load_envelope()?;
        let plain = decrypt_seed_blocking(
            envelope,
            Zeroizing::new(password.to_string()),
            self.config.kdf,
        )
        .await?;
        let seed = Seed::from_slice(&plain)?;
        tracing::info!("wallet unlocked");
        self.opened(seed, password)
    }

    /// Reopen the wallet from a live session token.
    pub fn resume(&self, token: &SessionToken) -> Result<UnlockedWallet, WalletError> {
        let password = self.sessions.resume(&self.store, token)?;
        let envelope = self.load_envelope()?;
        let plain = decrypt_seed(&envelope, &password, &self.config.kdf)?;
        let seed = Seed::from_slice(&plain)?;
        Ok(UnlockedWallet {
            seed,
            password,
            session: token.clone(),
        })
    }

    /// [`resume`](Self::resume) with the KDF on the blocking pool.
    pub async fn resume_async(&self, token: &SessionToken) -> Result<UnlockedWallet, WalletError> {
        let password = self.sessions.resume(&self.store, token)?;
        let envelope = self.load_envelope()?;
        let plain = decrypt_seed_blocking(envelope, password.clone(), self.config.kdf).await?;
        let seed = Seed::from_slice(&plain)?;
        Ok(UnlockedWallet {
            seed,
            password,
            session: token.clone(),
        })
    }

    /// End the session `token` belongs to.
    pub fn lock(&self, token: &SessionToken) -> Result<(), WalletError> {
        self.sessions.revoke(&self.store, token)?;
        tracing::info!("wallet locked");
        Ok(())
    }

    /// Remove every wallet record from the store.
    pub fn wipe(&self) -> Result<(), WalletError> {
        for key in [SESSION_KEY, MASTER_SEED_KEY, SALT_KEY] {
            self.store.remove(key)?;
        }
        tracing::info!("wallet wiped");
        Ok(())
    }

    fn ensure_absent(&self) -> Result<(), WalletError> {
        if self.exists()? {
            return Err(WalletError::AlreadyExists);
        }
        Ok(())
    }

    /// Write the envelope over the current wallet and drop its session.
    fn replace(&self, envelope: &SeedEnvelope) -> Result<(), WalletError> {
        self.persist(envelope)?;
        self.store.remove(SESSION_KEY)?;
        Ok(())
    }

    /// Write both envelope records, or neither.
    fn persist(&self, envelope: &SeedEnvelope) -> Result<(), WalletError> {
        let sealed = envelope.stored().to_json()?;
        let prior_sealed = self.store.get(MASTER_SEED_KEY)?;
        let prior_salt = self.store.get(SALT_KEY)?;

        let written = self
            .store
            .set(MASTER_SEED_KEY, &sealed)
            .and_then(|()| self.store.set(SALT_KEY, &envelope.salt));
        if let Err(e) = written {
            tracing::warn!(error = %e, "wallet write failed, restoring previous records");
            self.roll_back(MASTER_SEED_KEY, prior_sealed.as_deref());
            self.roll_back(SALT_KEY, prior_salt.as_deref());
            return Err(e.into());
        }
        Ok(())
    }

    fn roll_back(&self, key: &str, prior: Option<&str>) {
        let undone = match prior {
            Some(value) => self.store.set(key, value),
            None => self.store.remove(key),
        };
        if let Err(e) = undone {
            tracing::error!(key, error = %e, "rollback failed");
        }
    }

    fn load_envelope(&self) -> Result<SeedEnvelope, WalletError> {
        let salt = self.store.get(SALT_KEY)?.ok_or(WalletError::NotFound)?;
        let raw = self.store.get(MASTER_SEED_KEY)?.ok_or_else(|| {
            StorageError::Corrupted("salt present but sealed seed missing".into())
        })?;
        Ok(SeedEnvelope::from_parts(salt, StoredCiphertext::from_json(&raw)?))
    }

    fn created(&self, seed: &Seed, password: &str) -> Result<CreatedWallet, WalletError> {
        let session = self.sessions.issue(&self.store, password)?;
        Ok(CreatedWallet {
            phrase: Zeroizing::new(seed_to_mnemonic(seed)),
            session,
        })
    }

    fn opened(&self, seed: Seed, password: &str) -> Result<UnlockedWallet, WalletError> {
        let session = self.sessions.issue(&self.store, password)?;
        Ok(UnlockedWallet {
            seed,
            password: Zeroizing::new(password.to_string()),
            session,
        })
    }
}
