//! Keypair loading for the `execute` command

use anyhow::{anyhow, Context, Result};
use solana_sdk::signer::keypair::{read_keypair_file, Keypair};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve the signing keypair.
///
/// Order: explicit path, then `SOLANA_PRIVATE_KEY` (a file path or a base58
/// secret key), then `~/.config/solana/id.json`.
pub fn load_keypair(path: Option<&Path>) -> Result<Keypair> {
    if let Some(path) = path {
        return read_keypair_from_file(path);
    }

    if let Ok(value) = env::var("SOLANA_PRIVATE_KEY") {
        let value = value.trim();
        if Path::new(value).exists() {
            return read_keypair_from_file(Path::new(value));
        }
        debug!("Using base58 secret key from SOLANA_PRIVATE_KEY");
        return read_keypair_from_base58(value);
    }

    read_keypair_from_file(&default_key_path()?)
}

fn default_key_path() -> Result<PathBuf> {
    let home = env::var("HOME").context("Could not find home directory")?;
    Ok(PathBuf::from(home).join(".config/solana/id.json"))
}

/// Standard Solana CLI key file (JSON byte array)
pub fn read_keypair_from_file(path: &Path) -> Result<Keypair> {
    debug!(path = %path.display(), "Reading keypair file");
    read_keypair_file(path).map_err(|e| anyhow!("Failed to read keypair {}: {e}", path.display()))
}

pub fn read_keypair_from_base58(secret: &str) -> Result<Keypair> {
    let bytes = bs58::decode(secret)
        .into_vec()
        .map_err(|e| anyhow!("Failed to decode base58 key: {e}"))?;
    Keypair::try_from(bytes.as_slice()).map_err(|e| anyhow!("Invalid secret key: {e}"))
}
