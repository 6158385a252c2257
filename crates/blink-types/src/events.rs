//! Notification events dispatched to the embedding host.
//!
//! Each event has a name and a JSON `detail`, mirroring DOM custom events so
//! host pages can react (e.g. refresh balances) without polling.

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "type", content = "detail", rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HostEvent {
    /// An action transaction was confirmed
    Bought(BoughtDetail),
    /// A wallet connected through the host's connect flow
    Connected(ConnectedDetail),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoughtDetail {
    pub signature: String,
}

/// Account summary published when a wallet connects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectedDetail {
    pub address: String,
    pub locked: u64,
    pub staked: u64,
    pub bonds: u64,
    pub forever: u64,
}

impl HostEvent {
    pub fn bought(signature: impl Into<String>) -> Self {
        HostEvent::Bought(BoughtDetail {
            signature: signature.into(),
        })
    }

    /// Event name as seen by host listeners
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Event payload without the name tag
    pub fn detail(&self) -> serde_json::Value {
        match self {
            HostEvent::Bought(detail) => serde_json::to_value(detail),
            HostEvent::Connected(detail) => serde_json::to_value(detail),
        }
        .unwrap_or(serde_json::Value::Null)
    }

    /// Signature carried by a `bought` event
    pub fn signature(&self) -> Option<&str> {
        match self {
            HostEvent::Bought(detail) => Some(&detail.signature),
            HostEvent::Connected(_) => None,
        }
    }
}
