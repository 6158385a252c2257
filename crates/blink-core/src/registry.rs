//! Actions registry and trust classification
//!
//! The registry is a remotely sourced list of trusted and malicious hosts.
//! It is loaded once per process through [`ActionsRegistry::initialize`] and
//! shared by reference between blink sessions. A failed load leaves an empty
//! snapshot, so every URL classifies as `unknown` until a refresh succeeds.

use anyhow::Context;
use async_trait::async_trait;
use blink_types::{RegistryFeed, TrustState};
use reqwest::{header, Client, Url};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Where the registry feed comes from
#[async_trait]
pub trait RegistrySource: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<RegistryFeed>;
}

/// Registry feed served over HTTP
#[derive(Debug, Clone)]
pub struct HttpRegistrySource {
    client: Client,
    url: String,
}

impl HttpRegistrySource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl RegistrySource for HttpRegistrySource {
    async fn fetch(&self) -> anyhow::Result<RegistryFeed> {
        let feed = self
            .client
            .get(&self.url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to reach actions registry {}", self.url))?
            .error_for_status()
            .context("Actions registry returned an error status")?
            .json::<RegistryFeed>()
            .await
            .context("Failed to parse actions registry feed")?;
        Ok(feed)
    }
}

/// Action host classifications derived from one registry feed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    hosts: HashMap<String, TrustState>,
}

impl RegistrySnapshot {
    /// Build from the feed's `actions` list; a host listed twice is
    /// malicious if any of its entries is.
    pub fn from_feed(feed: &RegistryFeed) -> Self {
        let mut snapshot = Self::default();
        for entry in &feed.actions {
            let Some(host) = normalize_host(&entry.host) else {
                debug!(entry = %entry.host, "Skipping registry entry without host");
                continue;
            };
            let trust = TrustState::from(entry.state);
            let slot = snapshot.hosts.entry(host).or_insert(trust);
            if trust.is_malicious() {
                *slot = trust;
            }
        }
        snapshot
    }

    /// Classify a URL by host, port ignored.
    pub fn classify(&self, url: &str) -> TrustState {
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        else {
            return TrustState::Unknown;
        };

        self.hosts.get(&host).copied().unwrap_or(TrustState::Unknown)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lowercase host of a registry entry, port and path dropped.
///
/// Entries are bare hosts (`x.test`, `x.test:8080`) or full URLs.
fn normalize_host(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let url = if raw.contains("://") {
        Url::parse(raw)
    } else {
        Url::parse(&format!("https://{raw}"))
    };
    url.ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
        .filter(|host| !host.is_empty())
}

/// Process-wide trust classifier, shared via `Arc`
pub struct ActionsRegistry {
    source: Box<dyn RegistrySource>,
    snapshot: RwLock<Arc<RegistrySnapshot>>,
    initialized: OnceCell<()>,
}

impl ActionsRegistry {
    pub fn new(source: impl RegistrySource + 'static) -> Self {
        Self {
            source: Box::new(source),
            snapshot: RwLock::new(Arc::new(RegistrySnapshot::default())),
            initialized: OnceCell::new(),
        }
    }

    /// Registry backed by an HTTP feed
    pub fn from_url(client: Client, url: impl Into<String>) -> Self {
        Self::new(HttpRegistrySource::new(client, url))
    }

    /// Load the registry once.
    ///
    /// Concurrent callers wait on the same load; later calls return
    /// immediately. A failed load is logged and leaves the registry in
    /// unknown-only mode.
    pub async fn initialize(&self) {
        self.initialized
            .get_or_init(|| async {
                if let Err(e) = self.refresh().await {
                    warn!(error = %e, "Actions registry unavailable, classifying everything as unknown");
                }
            })
            .await;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.initialized()
    }

    /// Fetch the feed again and swap the snapshot.
    ///
    /// On failure the previous snapshot is kept. Returns the number of hosts
    /// in the new snapshot.
    pub async fn refresh(&self) -> anyhow::Result<usize> {
        let feed = self.source.fetch().await?;
        let snapshot = RegistrySnapshot::from_feed(&feed);
        let size = snapshot.len();
        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(snapshot);
        info!(hosts = size, "Actions registry loaded");
        Ok(size)
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Classify `url` against the current snapshot
    pub fn classify(&self, url: &str) -> TrustState {
        self.snapshot().classify(url)
    }

    /// Refresh the registry every `period` until the handle is aborted.
    pub fn spawn_refresh(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately; initialization already loaded the feed
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = registry.refresh().await {
                    warn!(error = %e, "Actions registry refresh failed, keeping previous snapshot");
                }
            }
        })
    }
}
