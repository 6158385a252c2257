//! End-to-end blink sessions against local action endpoints

mod common;

use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use blink_core::confirm::StatusError;
use blink_core::{Blink, BlinkError, ExecutionStatus, HostEvent, TrustState, ViewOptions};
use blink_types::RegistryEntryState;
use common::{
    encoded_transaction, feed, harness, init_logging, spawn_action_server, spawn_server,
    MockWallet, ScriptedChain, Step,
};
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

fn buy_descriptor() -> serde_json::Value {
    json!({ "label": "Buy", "links": { "actions": [{ "href": "/buy", "label": "Buy 1" }] } })
}

#[tokio::test]
async fn test_buy_end_to_end_dispatches_bought() -> anyhow::Result<()> {
    init_logging();
    let (origin, posts) = spawn_action_server(buy_descriptor()).await;
    let mut h = harness(
        Some(feed(&[("127.0.0.1", RegistryEntryState::Trusted)])),
        MockWallet::connected(),
        ScriptedChain::confirming(),
    );

    let mut blink = Blink::load(h.ctx.clone(), &format!("{origin}/a")).await?;
    assert_eq!(blink.trust(), TrustState::Trusted);
    assert_eq!(blink.state().status, ExecutionStatus::Idle);
    assert_eq!(blink.descriptor().components()[0].href(), format!("{origin}/buy"));

    let state = blink.invoke(0, &HashMap::new()).await?;
    assert_eq!(state.status, ExecutionStatus::Success);
    assert_eq!(state.success_message.as_deref(), Some("Thanks for buying"));
    assert!(state.error_message.is_none());

    assert_eq!(posts.load(Ordering::SeqCst), 1);
    assert_eq!(h.wallet.sends.load(Ordering::SeqCst), 1);
    assert_eq!(h.chain.call_count(), 1);

    let event = h.events.try_recv()?;
    assert_eq!(event, HostEvent::bought(h.wallet.signature.to_string()));
    assert_eq!(event.detail(), json!({ "signature": h.wallet.signature.to_string() }));

    let view = blink.view(&ViewOptions::default());
    assert_eq!(view.buttons[0].text, "Completed");
    assert!(view.disclaimer.is_none());

    blink.reset();
    assert_eq!(blink.state().status, ExecutionStatus::Idle);
    assert!(blink.state().success_message.is_none());
    Ok(())
}

#[tokio::test]
async fn test_registry_flip_to_malicious_blocks_without_post() -> anyhow::Result<()> {
    init_logging();
    let (origin, posts) = spawn_action_server(buy_descriptor()).await;
    let mut h = harness(Some(feed(&[])), MockWallet::connected(), ScriptedChain::confirming());

    let mut blink = Blink::load(h.ctx.clone(), &format!("{origin}/a")).await?;
    assert_eq!(blink.trust(), TrustState::Unknown);

    h.registry_source
        .set(Some(feed(&[("127.0.0.1", RegistryEntryState::Malicious)])));
    h.registry.refresh().await?;

    let state = blink.invoke(0, &HashMap::new()).await?;
    assert_eq!(state.status, ExecutionStatus::Blocked);
    assert_eq!(blink.trust(), TrustState::Malicious);
    assert_eq!(posts.load(Ordering::SeqCst), 0);
    assert_eq!(h.wallet.sends.load(Ordering::SeqCst), 0);
    assert!(h.events.try_recv().is_err());

    // Nothing but an explicit unblock leaves `blocked`
    blink.reset();
    assert_eq!(blink.state().status, ExecutionStatus::Blocked);
    blink.unblock();
    assert_eq!(blink.state().status, ExecutionStatus::Idle);
    Ok(())
}

#[tokio::test]
async fn test_malicious_at_load_starts_blocked() -> anyhow::Result<()> {
    let (origin, _posts) = spawn_action_server(buy_descriptor()).await;
    let h = harness(
        Some(feed(&[("127.0.0.1", RegistryEntryState::Malicious)])),
        MockWallet::connected(),
        ScriptedChain::confirming(),
    );

    let blink = Blink::load(h.ctx.clone(), &format!("{origin}/a")).await?;
    assert_eq!(blink.state().status, ExecutionStatus::Blocked);
    assert_eq!(
        blink.view(&ViewOptions::default()).disclaimer,
        Some(blink_core::presentation::Disclaimer::Blocked)
    );
    Ok(())
}

#[tokio::test]
async fn test_unblocked_malicious_action_executes() -> anyhow::Result<()> {
    let (origin, posts) = spawn_action_server(buy_descriptor()).await;
    let mut h = harness(
        Some(feed(&[("127.0.0.1", RegistryEntryState::Malicious)])),
        MockWallet::connected(),
        ScriptedChain::confirming(),
    );

    let mut blink = Blink::load(h.ctx.clone(), &format!("{origin}/a")).await?;
    assert_eq!(blink.state().status, ExecutionStatus::Blocked);
    blink.unblock();

    // Still malicious, but acknowledged: a reload does not block again
    blink.reload().await?;
    assert_eq!(blink.state().status, ExecutionStatus::Idle);

    let state = blink.invoke(0, &HashMap::new()).await?;
    assert_eq!(state.status, ExecutionStatus::Success);
    assert_eq!(blink.trust(), TrustState::Malicious);
    assert_eq!(posts.load(Ordering::SeqCst), 1);
    assert_eq!(h.wallet.sends.load(Ordering::SeqCst), 1);
    assert_eq!(
        h.events.try_recv()?,
        HostEvent::bought(h.wallet.signature.to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_wallet_prompts_connect() -> anyhow::Result<()> {
    let (origin, posts) = spawn_action_server(buy_descriptor()).await;
    let h = harness(None, MockWallet::disconnected(), ScriptedChain::confirming());

    let mut blink = Blink::load(h.ctx.clone(), &format!("{origin}/a")).await?;
    let state = blink.invoke(0, &HashMap::new()).await?;

    assert_eq!(state.status, ExecutionStatus::Idle);
    assert!(state.error_message.is_none());
    assert_eq!(h.wallet.connect_requests.load(Ordering::SeqCst), 1);
    assert_eq!(posts.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn test_post_failure_message_is_surfaced() -> anyhow::Result<()> {
    let router = Router::new()
        .route("/a", get(|| async { Json(buy_descriptor()) }))
        .route(
            "/buy",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "message": "Insufficient balance" })),
                )
            }),
        );
    let origin = spawn_server(router).await;
    let h = harness(None, MockWallet::connected(), ScriptedChain::confirming());

    let mut blink = Blink::load(h.ctx.clone(), &format!("{origin}/a")).await?;
    let state = blink.invoke(0, &HashMap::new()).await?;

    assert_eq!(state.status, ExecutionStatus::Error);
    assert_eq!(state.error_message.as_deref(), Some("Insufficient balance"));
    assert!(state.success_message.is_none());
    assert_eq!(h.wallet.sends.load(Ordering::SeqCst), 0);

    let view = blink.view(&ViewOptions::default());
    assert_eq!(view.error.as_deref(), Some("Insufficient balance"));
    assert_eq!(view.buttons[0].text, "Failed");
    Ok(())
}

#[tokio::test]
async fn test_rejected_signature_returns_to_idle() -> anyhow::Result<()> {
    let (origin, posts) = spawn_action_server(buy_descriptor()).await;
    let mut h = harness(None, MockWallet::rejecting(), ScriptedChain::confirming());

    let mut blink = Blink::load(h.ctx.clone(), &format!("{origin}/a")).await?;
    let state = blink.invoke(0, &HashMap::new()).await?;

    assert_eq!(state.status, ExecutionStatus::Idle);
    assert!(state.error_message.is_none());
    assert_eq!(posts.load(Ordering::SeqCst), 1);
    assert_eq!(h.chain.call_count(), 0);
    assert!(h.events.try_recv().is_err());
    Ok(())
}

#[tokio::test]
async fn test_on_chain_failure_ends_in_error() -> anyhow::Result<()> {
    let (origin, _posts) = spawn_action_server(buy_descriptor()).await;
    let h = harness(
        None,
        MockWallet::connected(),
        ScriptedChain::new(
            vec![Step::Reply(Err(StatusError::Timeout))],
            Step::Reply(Ok(Some(blink_types::SignatureStatus::failed(
                "InsufficientFundsForFee",
            )))),
        ),
    );

    let mut blink = Blink::load(h.ctx.clone(), &format!("{origin}/a")).await?;
    let state = blink.invoke(0, &HashMap::new()).await?;

    assert_eq!(state.status, ExecutionStatus::Error);
    assert!(state
        .error_message
        .as_deref()
        .unwrap_or_default()
        .contains("InsufficientFundsForFee"));
    assert_eq!(h.chain.call_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_parameter_value_is_substituted_and_cleared() -> anyhow::Result<()> {
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    let recorder = Arc::clone(&seen);
    let router = Router::new()
        .route(
            "/a",
            get(|| async {
                Json(json!({
                    "label": "Donate",
                    "links": { "actions": [{
                        "href": "/donate/{amount}",
                        "label": "Donate",
                        "parameters": [{ "name": "amount", "label": "SOL amount" }]
                    }]}
                }))
            }),
        )
        .route(
            "/donate/{amount}",
            post(move |Path(amount): Path<String>| {
                let recorder = Arc::clone(&recorder);
                async move {
                    recorder.lock().unwrap().push(amount);
                    Json(json!({ "transaction": encoded_transaction(&Pubkey::new_unique()) }))
                }
            }),
        );
    let origin = spawn_server(router).await;
    let h = harness(None, MockWallet::connected(), ScriptedChain::confirming());

    let mut blink = Blink::load(h.ctx.clone(), &format!("{origin}/a")).await?;
    let params = HashMap::from([("amount".to_string(), " 0.5 ".to_string())]);
    let state = blink.invoke(0, &params).await?;

    assert_eq!(state.status, ExecutionStatus::Success);
    assert!(state.success_message.is_none());
    assert_eq!(seen.lock().unwrap().as_slice(), ["0.5".to_string()]);

    let view = blink.view(&ViewOptions::default());
    assert!(view.buttons.is_empty());
    assert_eq!(view.inputs[0].placeholder, "SOL amount");

    blink.reset();
    assert_eq!(blink.descriptor().components()[0].value(), "");
    Ok(())
}

#[tokio::test]
async fn test_invoke_outside_idle_and_unknown_component() -> anyhow::Result<()> {
    let (origin, posts) = spawn_action_server(buy_descriptor()).await;
    let h = harness(None, MockWallet::connected(), ScriptedChain::confirming());

    let mut blink = Blink::load(h.ctx.clone(), &format!("{origin}/a")).await?;
    let err = blink.invoke(3, &HashMap::new()).await.unwrap_err();
    assert!(matches!(err, BlinkError::UnknownComponent { index: 3, count: 1 }));

    blink.invoke(0, &HashMap::new()).await?;
    let state = blink.invoke(0, &HashMap::new()).await?;
    assert_eq!(state.status, ExecutionStatus::Success);
    assert_eq!(posts.load(Ordering::SeqCst), 1);

    blink.reload().await?;
    assert_eq!(blink.state().status, ExecutionStatus::Idle);
    Ok(())
}

#[tokio::test]
async fn test_relative_url_uses_host_origin() -> anyhow::Result<()> {
    let (origin, _posts) = spawn_action_server(buy_descriptor()).await;
    let h = harness(None, MockWallet::connected(), ScriptedChain::confirming());

    let blink = Blink::load(h.ctx.clone().with_host_origin(origin.clone()), "/a").await?;
    assert_eq!(blink.url(), format!("{origin}/a"));

    let err = match Blink::load(h.ctx.clone(), "/a").await {
        Ok(_) => anyhow::bail!("relative url without host origin must fail"),
        Err(e) => e,
    };
    assert!(matches!(err, BlinkError::InvalidUrl { .. }));
    Ok(())
}
