//! Wallet collaborator
//!
//! The engine never signs by itself: it hands the decoded transaction to a
//! [`WalletAdapter`]. Browser hosts bridge their wallet adapter here; the
//! command-line runner uses [`KeypairWallet`].

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::VersionedTransaction,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("No wallet connected")]
    NotConnected,

    #[error("User rejected the request: {0}")]
    Rejected(String),

    #[error("Wallet {pubkey} is not a required signer of the transaction")]
    NotASigner { pubkey: String },

    #[error("Failed to send transaction: {0}")]
    Send(String),
}

#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Public key of the connected wallet, `None` when disconnected
    fn public_key(&self) -> Option<Pubkey>;

    /// Sign and submit the transaction, returning its signature
    async fn send_transaction(
        &self,
        transaction: VersionedTransaction,
    ) -> Result<Signature, WalletError>;

    /// Ask the host to show its wallet connect prompt
    fn request_connect(&self);
}

/// A wallet that is never connected
#[derive(Debug, Clone, Copy, Default)]
pub struct DisconnectedWallet;

#[async_trait]
impl WalletAdapter for DisconnectedWallet {
    fn public_key(&self) -> Option<Pubkey> {
        None
    }

    async fn send_transaction(
        &self,
        _transaction: VersionedTransaction,
    ) -> Result<Signature, WalletError> {
        Err(WalletError::NotConnected)
    }

    fn request_connect(&self) {
        info!("Wallet connection requested; no wallet is configured");
    }
}

/// Local keypair that signs and submits through an RPC node
pub struct KeypairWallet {
    keypair: Keypair,
    rpc_client: Arc<RpcClient>,
}

impl KeypairWallet {
    pub fn new(keypair: Keypair, rpc_client: Arc<RpcClient>) -> Self {
        Self {
            keypair,
            rpc_client,
        }
    }

    /// Place this wallet's signature in the slot matching its account key.
    ///
    /// Signatures already present (e.g. from the action server) are kept.
    pub fn sign(&self, transaction: &mut VersionedTransaction) -> Result<Signature, WalletError> {
        let pubkey = self.keypair.pubkey();
        let required = transaction.message.header().num_required_signatures as usize;
        let index = transaction
            .message
            .static_account_keys()
            .iter()
            .take(required)
            .position(|key| key == &pubkey)
            .ok_or_else(|| WalletError::NotASigner {
                pubkey: pubkey.to_string(),
            })?;

        if transaction.signatures.len() < required {
            transaction
                .signatures
                .resize(required, Signature::default());
        }

        let signature = self
            .keypair
            .sign_message(&transaction.message.serialize());
        transaction.signatures[index] = signature;
        Ok(signature)
    }
}

#[async_trait]
impl WalletAdapter for KeypairWallet {
    fn public_key(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    async fn send_transaction(
        &self,
        mut transaction: VersionedTransaction,
    ) -> Result<Signature, WalletError> {
        let signature = self.sign(&mut transaction)?;
        info!(%signature, "Submitting signed transaction");

        self.rpc_client
            .send_transaction(&transaction)
            .await
            .map_err(|e| {
                warn!(%signature, error = %e, "Transaction submission rejected");
                WalletError::Send(e.to_string())
            })
    }

    fn request_connect(&self) {
        info!(pubkey = %self.keypair.pubkey(), "Keypair wallet is always connected");
    }
}
