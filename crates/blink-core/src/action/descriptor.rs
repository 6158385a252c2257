//! Action descriptor parsing
//!
//! Converts the JSON returned by `GET <action-url>` into an executable model.
//! The payload is checked against [`ActionGetResponse`] first so missing
//! required fields fail here, at the boundary.

use super::component::ActionComponent;
use crate::error::{BlinkError, Result};
use blink_types::ActionGetResponse;
use reqwest::Url;
use tracing::{debug, warn};

/// Normalized, executable form of an action
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDescriptor {
    source_url: String,
    icon: String,
    title: String,
    label: String,
    description: String,
    disabled: bool,
    error: Option<String>,
    components: Vec<ActionComponent>,
}

impl ActionDescriptor {
    /// Parse a raw payload fetched from `source_url`.
    pub fn parse(source_url: &str, payload: serde_json::Value) -> Result<Self> {
        let response: ActionGetResponse = serde_json::from_value(payload)
            .map_err(|e| BlinkError::malformed(source_url, e))?;
        Self::from_response(source_url, response)
    }

    /// Build the descriptor from an already validated response.
    pub fn from_response(source_url: &str, response: ActionGetResponse) -> Result<Self> {
        let origin = url_origin(source_url)?;

        let linked = response
            .links
            .map(|links| links.actions)
            .filter(|actions| !actions.is_empty());

        let components = match linked {
            // Plain Solana Pay style action: one button posting to the action URL itself
            None => vec![ActionComponent::new(
                response.label.clone(),
                source_url,
                None,
            )],
            Some(actions) => actions
                .into_iter()
                .map(|action| {
                    let href = resolve_href(&origin, &action.href);
                    let component = ActionComponent::new(action.label, href, action.parameters);
                    if let Some(parameter) = component.parameter() {
                        let placeholder = format!("{{{}}}", parameter.name);
                        if !component.href_template().contains(&placeholder) {
                            warn!(
                                href = component.href_template(),
                                parameter = %parameter.name,
                                "Linked action href has no placeholder for its parameter"
                            );
                        }
                    }
                    component
                })
                .collect(),
        };

        debug!(
            url = source_url,
            components = components.len(),
            "Parsed action descriptor"
        );

        Ok(Self {
            source_url: source_url.to_string(),
            icon: response.icon,
            title: response.title,
            label: response.label,
            description: response.description,
            disabled: response.disabled.unwrap_or(false),
            error: response.error.map(|e| e.message),
            components,
        })
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn disabled(&self) -> bool {
        self.disabled
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn components(&self) -> &[ActionComponent] {
        &self.components
    }

    pub fn component(&self, index: usize) -> Option<&ActionComponent> {
        self.components.get(index)
    }

    pub fn component_mut(&mut self, index: usize) -> Option<&mut ActionComponent> {
        self.components.get_mut(index)
    }

    /// Clear every component's input value
    pub fn reset_components(&mut self) {
        self.components.iter_mut().for_each(ActionComponent::reset);
    }
}

/// ASCII origin (`scheme://host[:port]`) of an absolute http(s) URL
pub(crate) fn url_origin(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| BlinkError::invalid_url(url, e))?;
    let origin = parsed.origin();
    if !origin.is_tuple() {
        return Err(BlinkError::invalid_url(url, "URL has no origin"));
    }
    Ok(origin.ascii_serialization())
}

/// Resolve a linked action href against the origin of the action URL.
///
/// Hrefs carrying a scheme pass through untouched; anything else is treated
/// as a path. The result is built by concatenation so `{name}` placeholders
/// survive without percent-encoding.
pub fn resolve_href(origin: &str, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    let origin = origin.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{origin}{href}")
    } else {
        format!("{origin}/{href}")
    }
}
