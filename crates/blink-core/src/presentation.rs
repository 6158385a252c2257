//! Render-ready view of a blink
//!
//! [`ActionView`] flattens a descriptor, its execution state and its trust
//! classification into plain values a host can draw without knowing the
//! state machine.

use crate::action::{ActionComponent, ActionDescriptor};
use crate::execution::ExecutionState;
use blink_types::{ExecutionStatus, TrustState};
use reqwest::Url;
use serde::Serialize;
use strum::{Display, IntoStaticStr};

/// Buttons beyond this count are dropped
pub const SOFT_LIMIT_BUTTONS: usize = 10;
/// Inputs beyond this count are dropped
pub const SOFT_LIMIT_INPUTS: usize = 3;

/// Host-side display switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    pub show_image: bool,
    pub show_title: bool,
    pub show_description: bool,
    pub show_website: bool,
    /// Website advertised next to the action instead of the action host
    pub website_url: Option<String>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            show_image: true,
            show_title: true,
            show_description: true,
            show_website: true,
            website_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebsiteLink {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Disclaimer {
    /// Known malicious action, execution held until unblocked
    Blocked,
    /// Host not in the registry
    Unregistered,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    #[default]
    Default,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonView {
    /// Index of the component in the descriptor
    pub component: usize,
    pub text: String,
    pub loading: bool,
    pub disabled: bool,
    pub variant: ButtonVariant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputView {
    pub component: usize,
    pub name: String,
    pub placeholder: String,
    pub disabled: bool,
    pub button: ButtonView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<WebsiteLink>,
    pub status: ExecutionStatus,
    pub trust: TrustState,
    pub buttons: Vec<ButtonView>,
    pub inputs: Vec<InputView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<Disclaimer>,
}

impl ActionView {
    pub fn build(
        descriptor: &ActionDescriptor,
        state: &ExecutionState,
        trust: TrustState,
        options: &ViewOptions,
    ) -> Self {
        let status = state.status;
        let disabled = descriptor.disabled() || status != ExecutionStatus::Idle;

        // A recorded component hides all others until the state is reset
        let visible: Vec<(usize, &ActionComponent)> = descriptor
            .components()
            .iter()
            .enumerate()
            .filter(|(index, _)| {
                state
                    .executing_component
                    .map_or(true, |executing| executing == *index)
            })
            .collect();

        let button = |index: usize, component: &ActionComponent| ButtonView {
            component: index,
            text: button_text(status, component.label()),
            loading: status == ExecutionStatus::Executing
                && state.executing_component == Some(index),
            disabled,
            variant: match status {
                ExecutionStatus::Success => ButtonVariant::Success,
                ExecutionStatus::Error => ButtonVariant::Error,
                _ => ButtonVariant::Default,
            },
        };

        let buttons = visible
            .iter()
            .filter(|(_, component)| !component.has_parameter())
            .take(SOFT_LIMIT_BUTTONS)
            .map(|(index, component)| button(*index, *component))
            .collect();

        let inputs = visible
            .iter()
            .filter_map(|(index, component)| {
                component.parameter().map(|parameter| InputView {
                    component: *index,
                    name: parameter.name.clone(),
                    placeholder: parameter.label.clone().unwrap_or_default(),
                    disabled,
                    button: button(*index, *component),
                })
            })
            .take(SOFT_LIMIT_INPUTS)
            .collect();

        let error = if status == ExecutionStatus::Success {
            None
        } else {
            state
                .error_message
                .clone()
                .or_else(|| descriptor.error().map(str::to_string))
        };

        let disclaimer = match (trust, status) {
            (TrustState::Malicious, ExecutionStatus::Blocked) => Some(Disclaimer::Blocked),
            (TrustState::Unknown, _) => Some(Disclaimer::Unregistered),
            _ => None,
        };

        Self {
            image: options
                .show_image
                .then(|| descriptor.icon().to_string())
                .filter(|icon| !icon.is_empty()),
            title: options.show_title.then(|| descriptor.title().to_string()),
            description: options
                .show_description
                .then(|| descriptor.description().to_string()),
            website: options
                .show_website
                .then(|| website(descriptor.source_url(), options.website_url.as_deref()))
                .flatten(),
            status,
            trust,
            buttons,
            inputs,
            error,
            success: state.success_message.clone(),
            disclaimer,
        }
    }
}

fn button_text(status: ExecutionStatus, label: &str) -> String {
    match status {
        ExecutionStatus::Executing => "Executing".to_string(),
        ExecutionStatus::Success => "Completed".to_string(),
        ExecutionStatus::Error => "Failed".to_string(),
        ExecutionStatus::Idle | ExecutionStatus::Blocked => label.to_string(),
    }
}

/// Explicit website: hostname linking to it. Otherwise the action host, unlinked.
fn website(action_url: &str, website_url: Option<&str>) -> Option<WebsiteLink> {
    let hostname = |url: &str| {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    };
    match website_url {
        Some(url) => hostname(url).map(|text| WebsiteLink {
            text,
            url: Some(url.to_string()),
        }),
        None => hostname(action_url).map(|text| WebsiteLink { text, url: None }),
    }
}
