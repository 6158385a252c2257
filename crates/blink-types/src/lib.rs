//! Blink Types
//!
//! Shared data structures for the Solana Actions client: the JSON shapes
//! exchanged with action endpoints, trust and execution enums, and the
//! notification events handed to the embedding host.

pub mod events;
pub mod execution;
pub mod protocol;
pub mod trust;

pub use events::*;
pub use execution::*;
pub use protocol::*;
pub use trust::*;
