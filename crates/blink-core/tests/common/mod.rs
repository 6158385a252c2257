//! Shared helpers for blink-core integration tests
//!
//! Action endpoints and the registry feed are served by in-process axum
//! servers; the wallet and the chain are scripted in memory.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    routing::{get, post},
    Json, Router,
};
use blink_core::confirm::StatusError;
use blink_core::transaction::encode_transaction;
use blink_core::{
    ActionClient, ActionsRegistry, BlinkContext, ChannelEventSink, ConfirmOptions,
    RegistrySource, SignatureStatusSource, WalletAdapter, WalletError,
};
use blink_types::{
    ConfirmationLevel, HostEvent, RegistryEntry, RegistryEntryState, RegistryFeed,
    SignatureStatus,
};
use serde_json::{json, Value};
use solana_sdk::{
    message::Message,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{Transaction, VersionedTransaction},
};
use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

/// Route library logs to the test output; safe to call from every test
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info,blink_core=debug"))
        .with_test_writer()
        .try_init();
}

/// Serve `router` on an ephemeral local port and return its origin
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{addr}")
}

/// Unsigned transaction paid by `payer`, encoded like an action endpoint does
pub fn encoded_transaction(payer: &Pubkey) -> String {
    let tx = VersionedTransaction::from(Transaction::new_unsigned(Message::new(&[], Some(payer))));
    encode_transaction(&tx).expect("encode transaction")
}

/// Action endpoint serving `descriptor` at `GET /a` and transactions at
/// `POST /buy`. Returns the origin and the POST counter.
pub async fn spawn_action_server(descriptor: Value) -> (String, Arc<AtomicUsize>) {
    let posts = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&posts);

    let router = Router::new()
        .route(
            "/a",
            get(move || {
                let descriptor = descriptor.clone();
                async move { Json(descriptor) }
            }),
        )
        .route(
            "/buy",
            post(move |Json(body): Json<Value>| {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    let account = body["account"].as_str().unwrap_or_default();
                    let payer = Pubkey::from_str(account).unwrap_or_else(|_| Pubkey::new_unique());
                    Json(json!({
                        "transaction": encoded_transaction(&payer),
                        "message": "Thanks for buying"
                    }))
                }
            }),
        );

    (spawn_server(router).await, posts)
}

pub fn feed(entries: &[(&str, RegistryEntryState)]) -> RegistryFeed {
    RegistryFeed {
        actions: entries
            .iter()
            .map(|(host, state)| RegistryEntry {
                host: host.to_string(),
                state: *state,
            })
            .collect(),
        ..Default::default()
    }
}

/// Registry source whose feed can be swapped by the test; `None` fails
#[derive(Clone, Default)]
pub struct StaticRegistrySource {
    pub feed: Arc<Mutex<Option<RegistryFeed>>>,
    pub fetches: Arc<AtomicUsize>,
    pub delay: Duration,
}

impl StaticRegistrySource {
    pub fn new(feed: Option<RegistryFeed>) -> Self {
        Self {
            feed: Arc::new(Mutex::new(feed)),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set(&self, feed: Option<RegistryFeed>) {
        *self.feed.lock().unwrap() = feed;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistrySource for StaticRegistrySource {
    async fn fetch(&self) -> anyhow::Result<RegistryFeed> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.feed
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("registry offline"))
    }
}

/// Wallet that records calls and returns a fixed signature
pub struct MockWallet {
    pub pubkey: Option<Pubkey>,
    pub signature: Signature,
    pub failure: Option<WalletError>,
    pub sends: AtomicUsize,
    pub connect_requests: AtomicUsize,
}

impl MockWallet {
    pub fn connected() -> Self {
        Self {
            pubkey: Some(Pubkey::new_unique()),
            signature: Signature::from([7u8; 64]),
            failure: None,
            sends: AtomicUsize::new(0),
            connect_requests: AtomicUsize::new(0),
        }
    }

    pub fn disconnected() -> Self {
        Self {
            pubkey: None,
            ..Self::connected()
        }
    }

    pub fn rejecting() -> Self {
        Self {
            failure: Some(WalletError::Rejected("user closed the popup".to_string())),
            ..Self::connected()
        }
    }
}

#[async_trait]
impl WalletAdapter for MockWallet {
    fn public_key(&self) -> Option<Pubkey> {
        self.pubkey
    }

    async fn send_transaction(
        &self,
        _transaction: VersionedTransaction,
    ) -> Result<Signature, WalletError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(self.signature),
        }
    }

    fn request_connect(&self) {
        self.connect_requests.fetch_add(1, Ordering::SeqCst);
    }
}

/// One scripted answer of [`ScriptedChain`]
#[derive(Debug, Clone)]
pub enum Step {
    Reply(Result<Option<SignatureStatus>, StatusError>),
    /// Never answers within any reasonable attempt timeout
    Hang,
}

/// Status source replaying a script, then repeating `fallback`
pub struct ScriptedChain {
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    pub calls: AtomicUsize,
}

impl ScriptedChain {
    pub fn new(script: Vec<Step>, fallback: Step) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    /// Confirms on the first query
    pub fn confirming() -> Self {
        Self::new(Vec::new(), confirmed())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignatureStatusSource for ScriptedChain {
    async fn signature_status(
        &self,
        _signature: &Signature,
    ) -> Result<Option<SignatureStatus>, StatusError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match step {
            Step::Reply(reply) => reply,
            Step::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
        }
    }
}

pub fn confirmed() -> Step {
    Step::Reply(Ok(Some(SignatureStatus::with_level(
        ConfirmationLevel::Confirmed,
    ))))
}

pub fn pending() -> Step {
    Step::Reply(Ok(None))
}

/// Poller limits small enough for tests on a real clock
pub fn fast_confirm() -> ConfirmOptions {
    ConfirmOptions {
        deadline: Duration::from_secs(2),
        attempt_timeout: Duration::from_millis(200),
        retry_delay: Duration::from_millis(10),
    }
}

pub struct Harness {
    pub ctx: BlinkContext,
    pub registry: Arc<ActionsRegistry>,
    pub registry_source: StaticRegistrySource,
    pub wallet: Arc<MockWallet>,
    pub chain: Arc<ScriptedChain>,
    pub events: UnboundedReceiver<HostEvent>,
}

pub fn harness(feed: Option<RegistryFeed>, wallet: MockWallet, chain: ScriptedChain) -> Harness {
    let registry_source = StaticRegistrySource::new(feed);
    let registry = Arc::new(ActionsRegistry::new(registry_source.clone()));
    let wallet = Arc::new(wallet);
    let chain = Arc::new(chain);
    let (sink, events) = ChannelEventSink::channel();

    let client = ActionClient::new(Duration::from_secs(5)).expect("http client");
    let ctx = BlinkContext::new(
        client,
        Arc::clone(&registry),
        wallet.clone(),
        chain.clone(),
        Arc::new(sink),
    )
    .with_confirm_options(fast_confirm());

    Harness {
        ctx,
        registry,
        registry_source,
        wallet,
        chain,
        events,
    }
}
