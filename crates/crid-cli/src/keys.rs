//! # Keygen Subcommand and Key Loading

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use crid_crypto::Ed25519KeyPair;

use crate::config::PRIVATE_KEY_ENV;

/// Arguments for `crid keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Output directory for the key files.
    #[arg(long, short, default_value = ".")]
    pub output: PathBuf,
    /// Prefix for the key filenames.
    #[arg(long, default_value = "crid")]
    pub prefix: String,
}

/// Generate a key pair and write `<prefix>.key` / `<prefix>.pub`.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    std::fs::create_dir_all(&args.output).with_context(|| {
        format!("failed to create output directory: {}", args.output.display())
    })?;

    let kp = Ed25519KeyPair::generate();
    let sk_path = args.output.join(format!("{}.key", args.prefix));
    let pk_path = args.output.join(format!("{}.pub", args.prefix));

    if sk_path.exists() {
        bail!("refusing to overwrite existing key: {}", sk_path.display());
    }

    std::fs::write(&sk_path, kp.to_seed_hex())
        .with_context(|| format!("failed to write private key: {}", sk_path.display()))?;
    std::fs::write(&pk_path, kp.public_key().to_hex())
        .with_context(|| format!("failed to write public key: {}", pk_path.display()))?;

    tracing::info!(identity = %kp.identity(), "generated key pair");
    println!("OK: generated Ed25519 keypair");
    println!("  Private key: {}", sk_path.display());
    println!("  Public key:  {}", pk_path.display());
    println!("  Identity:    {}", kp.identity());
    Ok(0)
}

/// Load the acting participant's key from `--key` or `CRID_PRIVATE_KEY`.
pub fn load_key(path: Option<&Path>) -> Result<Ed25519KeyPair> {
    key_from_sources(path, std::env::var(PRIVATE_KEY_ENV).ok())
}

/// Resolve a key from an explicit file, falling back to an environment value.
pub fn key_from_sources(path: Option<&Path>, env_value: Option<String>) -> Result<Ed25519KeyPair> {
    if let Some(path) = path {
        let hex = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read private key: {}", path.display()))?;
        return Ed25519KeyPair::from_seed_hex(&hex)
            .with_context(|| format!("invalid private key in {}", path.display()));
    }
    match env_value {
        Some(hex) => Ed25519KeyPair::from_seed_hex(&hex)
            .with_context(|| format!("invalid private key in ${PRIVATE_KEY_ENV}")),
        None => bail!("no signing key: pass --key <file> or set ${PRIVATE_KEY_ENV}"),
    }
}
