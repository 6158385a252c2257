use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Classification of an action URL against the actions registry
#[derive(
    Debug,
    Clone,
    Copy,
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
pub enum TrustState {
    /// Registered and verified
    Trusted,
    /// Not present in the registry
    Unknown,
    /// Known to be harmful; execution is blocked
    Malicious,
}

impl TrustState {
    pub fn is_malicious(&self) -> bool {
        matches!(self, TrustState::Malicious)
    }
}

/// State recorded for a host in the registry feed.
///
/// The feed only carries positive decisions, `unknown` is implied by absence.
#[derive(Debug, Clone, Copy, Display, EnumString, PartialEq, Eq, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RegistryEntryState {
    Trusted,
    Malicious,
}

impl From<RegistryEntryState> for TrustState {
    fn from(state: RegistryEntryState) -> Self {
        match state {
            RegistryEntryState::Trusted => TrustState::Trusted,
            RegistryEntryState::Malicious => TrustState::Malicious,
        }
    }
}

/// One row of the registry feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Host name, or a full URL whose host is used
    pub host: String,
    pub state: RegistryEntryState,
}

/// Registry feed body, `GET <registry-url>`
///
/// Only `actions` governs action URLs; `websites` and `interstitials` rate
/// pages and interstitial hosts and are carried for hosts that display them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryFeed {
    #[serde(default)]
    pub actions: Vec<RegistryEntry>,
    #[serde(default)]
    pub websites: Vec<RegistryEntry>,
    #[serde(default)]
    pub interstitials: Vec<RegistryEntry>,
}
