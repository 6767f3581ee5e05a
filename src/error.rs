// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Gateway(String),

    #[error("Generation canceled")]
    Canceled,

    #[error("Settings bridge unavailable: {0}")]
    BridgeUnavailable(&'static str),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when this failure stands for a torn-down request rather than a
    /// real fault: the explicit `Canceled` variant, or a gateway message
    /// carrying a cancel/abort signature. These are swallowed, never surfaced.
    pub fn is_cancellation(&self) -> bool {
        match self {
            Error::Canceled => true,
            Error::Gateway(message) => is_cancellation_message(message),
            _ => false,
        }
    }
}

/// Case-insensitive check for the wording gateways use when a request was
/// aborted mid-flight.
pub(crate) fn is_cancellation_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("cancelled") || lower.contains("canceled") || lower.contains("abort")
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_signatures() {
        assert!(Error::Canceled.is_cancellation());
        assert!(Error::Gateway("Request CANCELLED by peer".to_string()).is_cancellation());
        assert!(Error::Gateway("AbortError: signal aborted".to_string()).is_cancellation());
        assert!(Error::Gateway("operation was canceled".to_string()).is_cancellation());
        assert!(!Error::Gateway("rate limit exceeded".to_string()).is_cancellation());
        assert!(!Error::InvalidUrl("nope".to_string()).is_cancellation());
    }
}
