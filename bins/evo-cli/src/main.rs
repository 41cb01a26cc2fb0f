//! evo-cli: command-line front end for the Evo wallet.
//!
//! Creates and restores password-sealed wallets, hands out unlock sessions,
//! and drives the socket chain from the command line.

mod config;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use zeroize::Zeroizing;

use evo_core::{LweConfig, Socket, evolve_preview};
use evo_wallet::{FileStore, SessionToken, UnlockedWallet, Vault, VaultConfig};

use crate::config::{CliConfig, Overrides};

/// Evo wallet command-line interface.
#[derive(Parser)]
#[command(name = "evo-cli")]
#[command(version, about = "Evolving-address wallet custody.")]
struct Cli {
    /// Data directory (default: ~/.evo, or EVO_DATA_DIR).
    #[arg(long, global = true)]
    data_dir: Option<std::path::PathBuf>,

    /// Log filter (default: info, or EVO_LOG).
    #[arg(long, global = true)]
    log: Option<String>,

    /// LWE dimension for socket commands (default: 512, or EVO_LWE_DIMENSION).
    #[arg(long, global = true)]
    dimension: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wallet management subcommands.
    Wallet {
        #[command(subcommand)]
        action: WalletAction,
    },
    /// Socket chain subcommands.
    Socket {
        #[command(subcommand)]
        action: SocketAction,
    },
    /// Step the public preview ratchet from an address.
    Preview(PreviewArgs),
}

#[derive(Subcommand)]
enum WalletAction {
    /// Create a new wallet and show its backup phrase once.
    Create,
    /// Restore a wallet from its 24-word phrase.
    Restore(RestoreArgs),
    /// Unlock the wallet and print a session token.
    Unlock,
    /// Show the backup phrase of an unlocked wallet.
    Phrase(SessionArgs),
    /// End a session.
    Lock(SessionArgs),
    /// Delete every wallet record.
    Wipe(WipeArgs),
}

#[derive(Subcommand)]
enum SocketAction {
    /// Derive the genesis socket.
    Genesis(SessionArgs),
    /// Evolve a socket by one transaction.
    Evolve(EvolveArgs),
}

#[derive(Args)]
struct SessionArgs {
    /// Session token (default: EVO_SESSION). Prompts if neither is set.
    #[arg(short, long)]
    session: Option<String>,
}

#[derive(Args)]
struct RestoreArgs {
    /// Replace an existing wallet.
    #[arg(long)]
    force: bool,
}

#[derive(Args)]
struct WipeArgs {
    /// Confirm deletion.
    #[arg(long)]
    yes: bool,
}

#[derive(Args)]
struct EvolveArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Previous socket, decimal or 0x-hex.
    #[arg(short, long)]
    previous: String,

    /// Transaction descriptor.
    #[arg(short, long)]
    tx: String,
}

#[derive(Args)]
struct PreviewArgs {
    /// Starting address, 0x-hex.
    address: String,

    /// Number of steps to take.
    #[arg(short = 'n', long, default_value = "1")]
    steps: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::resolve(Overrides {
        data_dir: cli.data_dir,
        log: cli.log,
        dimension: cli.dimension,
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    debug!(data_dir = %config.data_dir.display(), dimension = config.lwe_dimension, "evo-cli starting");

    match cli.command {
        Commands::Wallet { action } => match action {
            WalletAction::Create => wallet_create(&config).await,
            WalletAction::Restore(args) => wallet_restore(&config, args).await,
            WalletAction::Unlock => wallet_unlock(&config).await,
            WalletAction::Phrase(args) => wallet_phrase(&config, args).await,
            WalletAction::Lock(args) => wallet_lock(&config, args).await,
            WalletAction::Wipe(args) => wallet_wipe(&config, args).await,
        },
        Commands::Socket { action } => match action {
            SocketAction::Genesis(args) => socket_genesis(&config, args).await,
            SocketAction::Evolve(args) => socket_evolve(&config, args).await,
        },
        Commands::Preview(args) => preview(args),
    }
}

/// Create a new wallet.
async fn wallet_create(config: &CliConfig) -> Result<()> {
    let vault = open_vault(config);
    if vault.exists()? {
        bail!("A wallet already exists at {}", config.store_path().display());
    }

    let password = prompt_new_password()?;
    let created = vault
        .create_async(&password)
        .await
        .context("Failed to create wallet")?;

    println!("\n=== WALLET CREATED ===");
    println!("\nBACKUP PHRASE (24 WORDS):");
    println!("  {}", created.phrase.as_str());
    println!("\nWARNING: This phrase will NOT be shown again unless you unlock the wallet.");
    println!("Anyone with this phrase can rebuild your wallet.");
    println!("\nSession: {}", created.session.expose().as_str());
    println!("Wallet saved to: {}", config.store_path().display());
    Ok(())
}

/// Restore a wallet from its backup phrase.
async fn wallet_restore(config: &CliConfig, args: RestoreArgs) -> Result<()> {
    let vault = open_vault(config);
    if vault.exists()? && !args.force {
        bail!(
            "A wallet already exists at {} (use --force to replace it)",
            config.store_path().display()
        );
    }

    let phrase = Zeroizing::new(prompt_password("Enter 24-word backup phrase")?);
    evo_wallet::mnemonic_to_seed(&phrase).context("Invalid backup phrase")?;
    let password = prompt_new_password()?;
    let unlocked = vault
        .restore_async(&phrase, &password)
        .await
        .context("Failed to restore wallet")?;

    println!("\n=== WALLET RESTORED ===");
    println!("Session: {}", unlocked.session().expose().as_str());
    println!("Wallet saved to: {}", config.store_path().display());
    Ok(())
}

/// Unlock with the password and print a session token.
async fn wallet_unlock(config: &CliConfig) -> Result<()> {
    let vault = open_vault(config);
    let password = Zeroizing::new(prompt_password("Wallet password")?);
    let unlocked = vault
        .unlock_async(&password)
        .await
        .context("Failed to unlock wallet (check password)")?;

    println!("{}", unlocked.session().expose().as_str());
    Ok(())
}

/// Show the backup phrase.
async fn wallet_phrase(config: &CliConfig, args: SessionArgs) -> Result<()> {
    let unlocked = resume(config, &args).await?;
    println!("{}", unlocked.backup_phrase().as_str());
    Ok(())
}

/// End a session.
async fn wallet_lock(config: &CliConfig, args: SessionArgs) -> Result<()> {
    let token = session_token(&args)?;
    open_vault(config)
        .lock(&token)
        .context("Failed to lock wallet")?;
    println!("Locked.");
    Ok(())
}

/// Delete the wallet.
async fn wallet_wipe(config: &CliConfig, args: WipeArgs) -> Result<()> {
    if !args.yes {
        bail!("Refusing to wipe without --yes; make sure the backup phrase is written down");
    }
    open_vault(config).wipe().context("Failed to wipe wallet")?;
    println!("Wallet removed from {}", config.store_path().display());
    Ok(())
}

/// Print the genesis socket.
async fn socket_genesis(config: &CliConfig, args: SessionArgs) -> Result<()> {
    let unlocked = resume(config, &args).await?;
    let engine = unlocked.engine(lwe_config(config))?;
    let genesis = engine
        .create_genesis_state()
        .context("Failed to derive genesis socket")?;
    info!(dimension = config.lwe_dimension, "genesis socket derived");

    println!("{}", genesis.socket);
    println!("{}", genesis.socket.to_hex());
    Ok(())
}

/// Evolve a socket by one transaction.
async fn socket_evolve(config: &CliConfig, args: EvolveArgs) -> Result<()> {
    let previous: Socket = args
        .previous
        .parse()
        .with_context(|| format!("Invalid socket: {}", args.previous))?;
    let unlocked = resume(config, &args.session).await?;
    let engine = unlocked.engine(lwe_config(config))?;

    let result = engine.process_transaction(previous, &args.tx);
    if !result.is_valid {
        bail!("Socket evolution failed; previous socket {previous} retained");
    }
    info!(from = %previous, to = %result.next_socket, "socket evolved");
    println!("{}", result.next_socket);
    println!("{}", result.next_socket.to_hex());
    Ok(())
}

/// Step the preview ratchet.
fn preview(args: PreviewArgs) -> Result<()> {
    let mut current = evolve_preview(&args.address).context("Invalid preview address")?;
    println!("{current}");
    for _ in 1..args.steps {
        current = current.evolve();
        println!("{current}");
    }
    Ok(())
}

fn open_vault(config: &CliConfig) -> Vault<FileStore> {
    debug!(path = %config.store_path().display(), "opening vault");
    Vault::new(FileStore::new(config.store_path()), VaultConfig::default())
}

fn lwe_config(config: &CliConfig) -> LweConfig {
    LweConfig {
        dimension: config.lwe_dimension,
        ..LweConfig::default()
    }
}

async fn resume(config: &CliConfig, args: &SessionArgs) -> Result<UnlockedWallet> {
    let token = session_token(args)?;
    open_vault(config)
        .resume_async(&token)
        .await
        .context("Session is not valid (unlock again)")
}

/// Token from the flag, then `EVO_SESSION`, then a prompt.
fn session_token(args: &SessionArgs) -> Result<SessionToken> {
    let raw = match args.session.clone().or_else(|| std::env::var("EVO_SESSION").ok()) {
        Some(raw) => Zeroizing::new(raw),
        None => Zeroizing::new(prompt_password("Session token")?),
    };
    SessionToken::parse(&raw).context("Invalid session token")
}

fn prompt_new_password() -> Result<Zeroizing<String>> {
    let password = Zeroizing::new(prompt_password("Enter wallet password")?);
    let confirm = Zeroizing::new(prompt_password("Confirm password")?);
    if password != confirm {
        bail!("Passwords do not match");
    }
    if password.is_empty() {
        bail!("Password must not be empty");
    }
    Ok(password)
}

/// Prompt for a secret securely (no echo).
fn prompt_password(prompt: &str) -> Result<String> {
    rpassword::prompt_password(format!("{prompt}: ")).context("Failed to read password")
}
