//! HTTP interactions with action endpoints.

use super::{component::ActionComponent, descriptor::ActionDescriptor};
use crate::error::{BlinkError, Result};
use blink_types::{ActionError, ActionPostRequest, ActionPostResponse};
use reqwest::{header, Client, Url};
use solana_sdk::pubkey::Pubkey;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client for `GET` (descriptor) and `POST` (transaction) requests
#[derive(Debug, Clone)]
pub struct ActionClient {
    client: Client,
}

impl ActionClient {
    /// Create a client whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("blink-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(BlinkError::ClientSetup)?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Fetch and parse the descriptor behind `url`. Fails fast, no retry.
    pub async fn fetch(&self, url: &str) -> Result<ActionDescriptor> {
        debug!(url, "Fetching action descriptor");

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| BlinkError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Action descriptor fetch failed");
            return Err(BlinkError::FetchStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| BlinkError::Http {
            url: url.to_string(),
            source,
        })?;
        let payload: serde_json::Value =
            serde_json::from_slice(&body).map_err(|e| BlinkError::malformed(url, e))?;

        ActionDescriptor::parse(url, payload)
    }

    /// POST the account to the component's href and return the transaction.
    ///
    /// A non-2xx answer becomes [`BlinkError::Invocation`] carrying the
    /// server's `message` verbatim.
    pub async fn post(
        &self,
        component: &ActionComponent,
        account: &Pubkey,
    ) -> Result<ActionPostResponse> {
        let href = component.href();
        info!(href = %href, account = %account, "Requesting action transaction");

        let response = self
            .client
            .post(&href)
            .json(&ActionPostRequest {
                account: account.to_string(),
            })
            .send()
            .await
            .map_err(|source| BlinkError::Http {
                url: href.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ActionError>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| {
                    format!(
                        "HTTP {} - {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("Unknown")
                    )
                });
            warn!(href = %href, status = status.as_u16(), reason = %message, "Failed to execute action");
            return Err(BlinkError::Invocation {
                url: href,
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await.map_err(|source| BlinkError::Http {
            url: href.clone(),
            source,
        })?;
        serde_json::from_slice(&body).map_err(|e| BlinkError::malformed(href, e))
    }
}

/// Make a widget URL absolute.
///
/// Relative URLs such as `/api/buy` are resolved against `host_origin`,
/// the origin of the page embedding the blink.
pub fn resolve_action_url(url: &str, host_origin: Option<&str>) -> Result<String> {
    if Url::parse(url).is_ok() {
        return Ok(url.to_string());
    }
    match host_origin {
        Some(origin) => Ok(super::descriptor::resolve_href(origin, url)),
        None => Err(BlinkError::invalid_url(
            url,
            "relative action URL requires a host origin",
        )),
    }
}
