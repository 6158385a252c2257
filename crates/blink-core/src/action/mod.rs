//! Action descriptors and the HTTP client that fetches and invokes them

pub mod client;
pub mod component;
pub mod descriptor;

pub use client::{resolve_action_url, ActionClient};
pub use component::ActionComponent;
pub use descriptor::{resolve_href, ActionDescriptor};
