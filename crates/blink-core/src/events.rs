//! Delivery of [`HostEvent`]s to the embedding host.

use blink_types::HostEvent;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub trait EventSink: Send + Sync {
    fn dispatch(&self, event: HostEvent);
}

/// Forwards events into a tokio channel
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<HostEvent>,
}

impl ChannelEventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<HostEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelEventSink {
    fn dispatch(&self, event: HostEvent) {
        let name = event.name();
        if self.tx.send(event).is_err() {
            warn!(event = name, "Host event dropped, receiver closed");
        }
    }
}

/// Logs events; used when the host has no listener
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn dispatch(&self, event: HostEvent) {
        info!(event = event.name(), detail = %event.detail(), "Host event");
    }
}
