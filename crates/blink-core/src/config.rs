//! Environment variable configuration for blink hosts
//!
//! Values are read from the process environment; hosts are expected to call
//! `dotenvy::dotenv()` first so a local `.env` file is honoured. Every
//! variable has a default except where a malformed value is given, which is
//! reported instead of silently replaced.

use crate::confirm::ConfirmOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use strum::{Display, EnumString};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {message}")]
    InvalidVar { var: &'static str, message: String },
}

/// Solana cluster the host talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ClusterTarget {
    #[strum(to_string = "mainnet", serialize = "mainnet-beta")]
    Mainnet,
    #[default]
    Devnet,
}

impl ClusterTarget {
    /// Public RPC endpoint used when `SOLANA_RPC_URL` is unset
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            ClusterTarget::Mainnet => "https://api.mainnet-beta.solana.com",
            ClusterTarget::Devnet => "https://api.devnet.solana.com",
        }
    }
}

fn parse_var<T: FromStr>(var: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidVar {
                var,
                message: format!("{raw:?}: {e}"),
            }),
        Err(_) => Ok(None),
    }
}

/// Network configuration from environment variables
pub mod network {
    use super::*;

    /// Cluster from `SOLANA_NETWORK`, devnet when unset
    pub fn solana_network() -> Result<ClusterTarget, ConfigError> {
        Ok(parse_var::<ClusterTarget>("SOLANA_NETWORK")?.unwrap_or_default())
    }

    /// RPC endpoint from `SOLANA_RPC_URL`, falling back to the cluster default
    pub fn solana_rpc_url(cluster: ClusterTarget) -> String {
        env::var("SOLANA_RPC_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| cluster.default_rpc_url().to_string())
    }

    /// Registry feed from `ACTIONS_REGISTRY_URL`
    pub fn actions_registry_url() -> String {
        env::var("ACTIONS_REGISTRY_URL")
            .unwrap_or_else(|_| "https://actions-registry.dialectapi.to/all".to_string())
    }

    /// Origin used to resolve relative action URLs such as `/api/buy`
    pub fn host_origin() -> Option<String> {
        env::var("BLINK_HOST_ORIGIN")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
    }
}

/// Timeout configuration from environment variables
pub mod timeouts {
    use super::*;

    /// HTTP request timeout for action endpoints
    pub fn http_request() -> Result<Duration, ConfigError> {
        Ok(Duration::from_secs(
            parse_var::<u64>("HTTP_REQUEST_TIMEOUT_SECONDS")?.unwrap_or(30),
        ))
    }

    /// Confirmation polling limits, defaults from [`ConfirmOptions`]
    pub fn confirm_options() -> Result<ConfirmOptions, ConfigError> {
        let defaults = ConfirmOptions::default();
        Ok(ConfirmOptions {
            deadline: parse_var::<u64>("BLINK_CONFIRM_DEADLINE_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.deadline),
            attempt_timeout: parse_var::<u64>("BLINK_CONFIRM_ATTEMPT_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.attempt_timeout),
            retry_delay: parse_var::<u64>("BLINK_CONFIRM_RETRY_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
        })
    }

    /// Registry refresh period; `0` disables periodic refresh
    pub fn registry_refresh() -> Result<Option<Duration>, ConfigError> {
        let seconds = parse_var::<u64>("BLINK_REGISTRY_REFRESH_SECONDS")?.unwrap_or(600);
        Ok((seconds > 0).then(|| Duration::from_secs(seconds)))
    }
}

/// Logging configuration from environment variables
pub mod logging {
    use super::*;

    /// Filter directive for the tracing subscriber
    pub fn rust_log_filter() -> String {
        env::var("RUST_LOG").unwrap_or_else(|_| "info,blink_core=debug".to_string())
    }
}

/// Validated configuration for a blink host
#[derive(Debug, Clone, PartialEq)]
pub struct BlinkConfig {
    pub network: ClusterTarget,
    pub rpc_url: String,
    pub registry_url: String,
    pub host_origin: Option<String>,
    pub http_timeout: Duration,
    pub confirm: ConfirmOptions,
    pub registry_refresh: Option<Duration>,
}

impl BlinkConfig {
    /// Build the configuration from the current environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let cluster = network::solana_network()?;
        let confirm = timeouts::confirm_options()?;
        if confirm.attempt_timeout.is_zero() || confirm.deadline.is_zero() {
            return Err(ConfigError::InvalidVar {
                var: "BLINK_CONFIRM_DEADLINE_MS",
                message: "confirmation deadline and attempt timeout must be positive".to_string(),
            });
        }

        Ok(Self {
            network: cluster,
            rpc_url: network::solana_rpc_url(cluster),
            registry_url: network::actions_registry_url(),
            host_origin: network::host_origin(),
            http_timeout: timeouts::http_request()?,
            confirm,
            registry_refresh: timeouts::registry_refresh()?,
        })
    }
}
