//! Decoding of transactions returned by action endpoints.

use crate::error::{BlinkError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use solana_sdk::transaction::VersionedTransaction;

/// Decode a base64, bincode serialized transaction.
pub fn decode_transaction(encoded: &str) -> Result<VersionedTransaction> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| BlinkError::InvalidTransaction {
            message: format!("base64: {e}"),
        })?;
    bincode::deserialize(&bytes).map_err(|e| BlinkError::InvalidTransaction {
        message: format!("bincode: {e}"),
    })
}

/// Encode a transaction the way action endpoints return it.
pub fn encode_transaction(transaction: &VersionedTransaction) -> Result<String> {
    let bytes = bincode::serialize(transaction).map_err(|e| BlinkError::InvalidTransaction {
        message: format!("bincode: {e}"),
    })?;
    Ok(STANDARD.encode(bytes))
}
