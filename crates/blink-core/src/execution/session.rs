//! Blink session: one descriptor, one execution state and the collaborators
//! needed to carry out the effects of the state machine.

use super::machine::{transition, Effect, ExecutionEvent, ExecutionState};
use crate::action::{resolve_action_url, ActionClient, ActionDescriptor};
use crate::confirm::{confirm_transaction, ConfirmOptions, SignatureStatusSource};
use crate::error::{BlinkError, Result};
use crate::events::EventSink;
use crate::presentation::{ActionView, ViewOptions};
use crate::registry::ActionsRegistry;
use crate::transaction::decode_transaction;
use crate::wallet::WalletAdapter;
use blink_types::{ExecutionStatus, TrustState};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Collaborators shared by blink sessions
#[derive(Clone)]
pub struct BlinkContext {
    pub client: ActionClient,
    pub registry: Arc<ActionsRegistry>,
    pub wallet: Arc<dyn WalletAdapter>,
    pub chain: Arc<dyn SignatureStatusSource>,
    pub events: Arc<dyn EventSink>,
    pub confirm: ConfirmOptions,
    /// Origin of the embedding page, for relative action URLs
    pub host_origin: Option<String>,
}

impl BlinkContext {
    pub fn new(
        client: ActionClient,
        registry: Arc<ActionsRegistry>,
        wallet: Arc<dyn WalletAdapter>,
        chain: Arc<dyn SignatureStatusSource>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            client,
            registry,
            wallet,
            chain,
            events,
            confirm: ConfirmOptions::default(),
            host_origin: None,
        }
    }

    pub fn with_confirm_options(mut self, confirm: ConfirmOptions) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn with_host_origin(mut self, origin: impl Into<String>) -> Self {
        self.host_origin = Some(origin.into());
        self
    }
}

/// How a component execution ended before it is fed back to the machine
#[derive(Debug)]
enum Outcome {
    Confirmed {
        signature: String,
        message: Option<String>,
    },
    /// Wallet declined or could not send; not an error
    Aborted(String),
    Failed(String),
}

/// One mounted blink
pub struct Blink {
    ctx: BlinkContext,
    url: String,
    descriptor: ActionDescriptor,
    trust: TrustState,
    state: ExecutionState,
}

impl Blink {
    /// Initialize the registry, fetch the descriptor and classify it.
    pub async fn load(ctx: BlinkContext, url: &str) -> Result<Self> {
        ctx.registry.initialize().await;

        let url = resolve_action_url(url, ctx.host_origin.as_deref())?;
        let descriptor = ctx.client.fetch(&url).await?;
        let trust = ctx.registry.classify(&url);
        let state = ExecutionState::initial(trust);

        info!(
            url = %url,
            trust = %trust,
            components = descriptor.components().len(),
            "Blink loaded"
        );
        if trust.is_malicious() {
            warn!(url = %url, "Action flagged as malicious, execution blocked");
        }

        Ok(Self {
            ctx,
            url,
            descriptor,
            trust,
            state,
        })
    }

    /// Fetch the descriptor again and replace it.
    ///
    /// Rejected while a component is executing, so a running execution always
    /// finishes against the descriptor it started with.
    pub async fn reload(&mut self) -> Result<()> {
        if self.state.is_executing() {
            return Err(BlinkError::Busy);
        }
        let descriptor = self.ctx.client.fetch(&self.url).await?;
        let trust = self.ctx.registry.classify(&self.url);

        let flipped = trust.is_malicious() && !self.trust.is_malicious();
        self.descriptor = descriptor;
        self.trust = trust;
        self.state = if flipped {
            ExecutionState::blocked()
        } else if self.state.status == ExecutionStatus::Blocked {
            // Manual unblock is the only way out of `blocked`
            self.state.clone()
        } else {
            ExecutionState::idle()
        };
        debug!(url = %self.url, trust = %trust, "Blink reloaded");
        Ok(())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    pub fn trust(&self) -> TrustState {
        self.trust
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    pub fn view(&self, options: &ViewOptions) -> ActionView {
        ActionView::build(&self.descriptor, &self.state, self.trust, options)
    }

    /// User acknowledged the malicious-action warning
    pub fn unblock(&mut self) {
        self.apply(ExecutionEvent::Unblock);
    }

    /// Return to `idle` after a terminal state, clearing inputs
    pub fn reset(&mut self) {
        self.apply(ExecutionEvent::Reset);
    }

    /// Invoke component `index`, with `params` supplying its input value.
    ///
    /// Every path ends in `success`, `error`, `idle` or `blocked`; failures
    /// are reported through the returned state, not as `Err`. Invocations
    /// outside `idle` are ignored.
    pub async fn invoke(
        &mut self,
        index: usize,
        params: &HashMap<String, String>,
    ) -> Result<&ExecutionState> {
        let count = self.descriptor.components().len();
        let component = self
            .descriptor
            .component_mut(index)
            .ok_or(BlinkError::UnknownComponent { index, count })?;

        if self.state.status != ExecutionStatus::Idle {
            debug!(
                component = index,
                status = %self.state.status,
                "Ignoring invoke outside idle state"
            );
            return Ok(&self.state);
        }

        let value = component
            .parameter()
            .and_then(|parameter| params.get(&parameter.name))
            .cloned();
        if let Some(value) = value {
            component.set_value(value);
        }

        // The registry may have changed since load
        let previous_trust = self.trust;
        let trust = self.ctx.registry.classify(&self.url);
        if trust != previous_trust {
            info!(url = %self.url, from = %previous_trust, to = %trust, "Action trust changed");
            self.trust = trust;
        }

        let account = self.ctx.wallet.public_key();
        let effects = self.apply(ExecutionEvent::Invoke {
            component: index,
            trust,
            previous_trust,
            wallet_connected: account.is_some(),
        });

        let should_post = effects
            .iter()
            .any(|effect| matches!(effect, Effect::PostAction { component } if *component == index));
        let Some(account) = account.filter(|_| should_post) else {
            return Ok(&self.state);
        };

        let event = match self.run_component(index, account).await {
            Outcome::Confirmed { signature, message } => {
                ExecutionEvent::Finish { signature, message }
            }
            Outcome::Aborted(reason) => {
                warn!(component = index, reason = %reason, "Execution aborted");
                ExecutionEvent::Reset
            }
            Outcome::Failed(message) => ExecutionEvent::Fail {
                message: Some(message),
            },
        };
        self.apply(event);

        Ok(&self.state)
    }

    /// POST, decode, send and confirm one component's transaction.
    async fn run_component(&self, index: usize, account: Pubkey) -> Outcome {
        let Some(component) = self.descriptor.component(index) else {
            return Outcome::Failed(format!("Unknown action component {index}"));
        };

        let response = match self.ctx.client.post(component, &account).await {
            Ok(response) => response,
            Err(e) => return Outcome::Failed(e.to_string()),
        };

        let transaction = match decode_transaction(&response.transaction) {
            Ok(transaction) => transaction,
            Err(e) => return Outcome::Failed(e.to_string()),
        };

        let signature = match self.ctx.wallet.send_transaction(transaction).await {
            Ok(signature) => signature,
            Err(e) => return Outcome::Aborted(e.to_string()),
        };

        match confirm_transaction(self.ctx.chain.as_ref(), &signature, &self.ctx.confirm).await {
            Ok(_) => Outcome::Confirmed {
                signature: signature.to_string(),
                message: response.message,
            },
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }

    /// Apply a transition and perform its synchronous effects. Returns the
    /// effects that need async work from the caller.
    fn apply(&mut self, event: ExecutionEvent) -> Vec<Effect> {
        let result = transition(&self.state, event);
        if result.state.status != self.state.status {
            debug!(from = %self.state.status, to = %result.state.status, "Execution state changed");
        }
        self.state = result.state;

        let mut pending = Vec::new();
        for effect in result.effects {
            match effect {
                Effect::ConnectWallet => self.ctx.wallet.request_connect(),
                Effect::DispatchEvent(event) => {
                    info!(event = event.name(), "Dispatching host event");
                    self.ctx.events.dispatch(event);
                }
                Effect::ClearInputs => self.descriptor.reset_components(),
                Effect::PostAction { .. } => pending.push(effect),
            }
        }
        pending
    }
}
