use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Lifecycle status of a blink session
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Display,
    EnumString,
    IntoStaticStr,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Action flagged as malicious; waits for a manual unblock
    Blocked,
    /// Ready for the user to invoke a component
    #[default]
    Idle,
    /// A component's transaction is being requested, sent or confirmed
    Executing,
    /// Transaction confirmed on chain
    Success,
    /// Execution failed
    Error,
}

/// Commitment level reported for a submitted signature
#[derive(
    Debug, Clone, Copy, Display, EnumString, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationLevel {
    Processed,
    Confirmed,
    Finalized,
}

impl ConfirmationLevel {
    /// Whether the level is final enough to report success
    pub fn is_confirmed(&self) -> bool {
        *self >= ConfirmationLevel::Confirmed
    }
}

/// Status of a signature as reported by the chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_status: Option<ConfirmationLevel>,
    /// On-chain execution error, rendered as text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<usize>,
}

impl SignatureStatus {
    pub fn with_level(level: ConfirmationLevel) -> Self {
        Self {
            confirmation_status: Some(level),
            ..Default::default()
        }
    }

    pub fn failed(err: impl Into<String>) -> Self {
        Self {
            err: Some(err.into()),
            ..Default::default()
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.err.is_none()
            && self
                .confirmation_status
                .map(|level| level.is_confirmed())
                .unwrap_or(false)
    }
}
