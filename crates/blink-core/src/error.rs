//! Error types for action resolution and execution

use crate::confirm::ConfirmError;
use thiserror::Error;

/// Result type for blink operations
pub type Result<T> = std::result::Result<T, BlinkError>;

#[derive(Error, Debug)]
pub enum BlinkError {
    /// The action URL could not be used to fetch or resolve links
    #[error("Invalid action URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// Transport level failure talking to an action endpoint
    #[error("Request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Descriptor fetch returned a non-2xx status
    #[error("Failed to fetch action {url}: HTTP {status}")]
    FetchStatus { url: String, status: u16 },

    /// Response body is not valid JSON or misses required fields
    #[error("Malformed response from {url}: {message}")]
    MalformedResponse { url: String, message: String },

    /// Action endpoint rejected the POST; the message is shown verbatim
    #[error("{message}")]
    Invocation {
        url: String,
        status: u16,
        message: String,
    },

    /// Transaction returned by the endpoint could not be decoded
    #[error("Invalid transaction payload: {message}")]
    InvalidTransaction { message: String },

    #[error("Unknown action component {index}, descriptor has {count}")]
    UnknownComponent { index: usize, count: usize },

    /// Descriptor reload requested while a component is executing
    #[error("Action is executing, reload rejected")]
    Busy,

    #[error("HTTP client setup failed: {0}")]
    ClientSetup(#[source] reqwest::Error),

    #[error(transparent)]
    Confirmation(#[from] ConfirmError),
}

impl BlinkError {
    pub fn malformed(url: impl Into<String>, message: impl ToString) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn invalid_url(url: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.to_string(),
        }
    }
}
