//! Blink Core
//!
//! Client-side engine for Solana Actions: turns an action URL into an
//! executable descriptor, classifies it against the actions registry, drives
//! one execution at a time through a pure state machine and waits for the
//! resulting transaction to be confirmed.

pub mod action;
pub mod config;
pub mod confirm;
pub mod error;
pub mod events;
pub mod execution;
pub mod presentation;
pub mod registry;
pub mod transaction;
pub mod wallet;

// Re-export key types for convenience
pub use action::{ActionClient, ActionComponent, ActionDescriptor};
pub use config::{BlinkConfig, ClusterTarget};
pub use confirm::{confirm_transaction, ConfirmError, ConfirmOptions, SignatureStatusSource};
pub use error::{BlinkError, Result};
pub use events::{ChannelEventSink, EventSink, TracingEventSink};
pub use execution::{Blink, BlinkContext, Effect, ExecutionEvent, ExecutionState, Transition};
pub use presentation::{ActionView, ViewOptions};
pub use registry::{ActionsRegistry, HttpRegistrySource, RegistrySnapshot, RegistrySource};
pub use wallet::{DisconnectedWallet, KeypairWallet, WalletAdapter, WalletError};

pub use blink_types::{ExecutionStatus, HostEvent, TrustState};
