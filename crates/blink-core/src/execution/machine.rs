//! Execution state machine
//!
//! A pure, total transition function over a closed set of events. It never
//! performs I/O: side effects are returned as [`Effect`]s for the session to
//! carry out, which keeps the async edges out of the transition logic.

use blink_types::{ExecutionStatus, HostEvent, TrustState};

/// Message used when a failure carries none
pub const DEFAULT_ERROR_MESSAGE: &str = "Unknown error";

/// Execution state of one blink session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionState {
    pub status: ExecutionStatus,
    /// Index of the component in the descriptor's component list
    pub executing_component: Option<usize>,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
}

impl ExecutionState {
    /// `blocked` for malicious actions, `idle` otherwise
    pub fn initial(trust: TrustState) -> Self {
        if trust.is_malicious() {
            Self::blocked()
        } else {
            Self::idle()
        }
    }

    pub fn idle() -> Self {
        Self::default()
    }

    pub fn blocked() -> Self {
        Self {
            status: ExecutionStatus::Blocked,
            ..Self::default()
        }
    }

    pub fn is_executing(&self) -> bool {
        self.status == ExecutionStatus::Executing
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionEvent {
    /// User triggered a component
    Invoke {
        component: usize,
        /// Classification at invoke time
        trust: TrustState,
        /// Classification the session held before this invoke
        previous_trust: TrustState,
        wallet_connected: bool,
    },
    /// Transaction confirmed
    Finish {
        signature: String,
        message: Option<String>,
    },
    /// Request, decode or confirmation failed
    Fail { message: Option<String> },
    /// Execution aborted without failure, or the user starts over
    Reset,
    /// Action reclassified as malicious
    Block,
    /// User acknowledged the warning and proceeds
    Unblock,
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Show the wallet connect prompt
    ConnectWallet,
    /// POST to the component's href and carry the transaction through
    PostAction { component: usize },
    /// Notify the host page
    DispatchEvent(HostEvent),
    /// Clear component input values
    ClearInputs,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: ExecutionState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(state: ExecutionState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Whether the event was ignored
    pub fn is_noop(&self, previous: &ExecutionState) -> bool {
        self.effects.is_empty() && &self.state == previous
    }
}

/// Compute the next state for `event`. Events that make no sense in the
/// current state leave it unchanged and request no effects.
pub fn transition(state: &ExecutionState, event: ExecutionEvent) -> Transition {
    use ExecutionStatus::*;

    match (state.status, event) {
        (
            Idle,
            ExecutionEvent::Invoke {
                component,
                trust,
                previous_trust,
                wallet_connected,
            },
        ) => {
            // Only a flip blocks; an acknowledged malicious action proceeds
            if trust.is_malicious() && !previous_trust.is_malicious() {
                Transition::to(ExecutionState::blocked())
            } else if !wallet_connected {
                Transition::to(ExecutionState::idle()).with(Effect::ConnectWallet)
            } else {
                Transition::to(ExecutionState {
                    status: Executing,
                    executing_component: Some(component),
                    error_message: None,
                    success_message: None,
                })
                .with(Effect::PostAction { component })
            }
        }

        (Executing, ExecutionEvent::Finish { signature, message }) => Transition::to(ExecutionState {
            status: Success,
            executing_component: state.executing_component,
            error_message: None,
            success_message: message,
        })
        .with(Effect::DispatchEvent(HostEvent::bought(signature))),

        (Executing, ExecutionEvent::Fail { message }) => Transition::to(ExecutionState {
            status: Error,
            executing_component: state.executing_component,
            error_message: Some(message.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())),
            success_message: None,
        }),

        (Idle | Executing | Success | Error, ExecutionEvent::Reset) => {
            Transition::to(ExecutionState::idle()).with(Effect::ClearInputs)
        }

        (_, ExecutionEvent::Block) => Transition::to(ExecutionState::blocked()),

        (Blocked, ExecutionEvent::Unblock) => Transition::to(ExecutionState::idle()),

        _ => Transition::to(state.clone()),
    }
}
