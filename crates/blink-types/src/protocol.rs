//! Solana Actions wire format
//!
//! Request and response bodies of the Actions protocol, an extension of the
//! Solana Pay transaction request protocol. Linked actions follow the HAL
//! `links` convention.
//!
//! Required fields have no serde default so that a payload missing them is
//! rejected at deserialization time instead of producing a half-filled model.

use serde::{Deserialize, Serialize};

/// Body of a successful `GET` on an action URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionGetResponse {
    /// Image shown at the top of the widget
    #[serde(default)]
    pub icon: String,
    /// Button text used when the action has no linked actions
    pub label: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Models an unusable action, e.g. an NFT that sold out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<ActionLinks>,
    /// Non-fatal error the client should display next to the action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLinks {
    #[serde(default)]
    pub actions: Vec<LinkedAction>,
}

/// One sub-action offered by a descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedAction {
    /// Absolute URL or a path relative to the origin of the action URL
    pub href: String,
    pub label: String,
    /// Only the first entry is used by clients today
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ActionParameter>>,
}

/// User input substituted into a linked action's `href` as `{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParameter {
    pub name: String,
    /// Input placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Body of the `POST` that asks an action endpoint for a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPostRequest {
    /// Base58 public key of the paying account
    pub account: String,
}

/// Body of a successful `POST`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPostResponse {
    /// Base64 encoded serialized transaction
    pub transaction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error body shared by `GET` and `POST` responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionError {
    pub message: String,
}
