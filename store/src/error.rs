//! Error types for the request-state store.

use formdeck_core::{DecodeError, Key, Problem};
use thiserror::Error;

/// Alert message when no response was received at all.
pub(crate) const NO_RESPONSE_MESSAGE: &str =
    "Something went wrong: there was no response to your request.";

/// Alert message when an error response does not carry a Problem.
pub(crate) const INVALID_ERROR_MESSAGE: &str =
    "Something went wrong: the server returned an invalid error.";

/// The outcome of a failed (or superseded) request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request was superseded or explicitly canceled while in
    /// flight. Its response was discarded without touching the store;
    /// no alert is shown for this case.
    #[error("the request for {key} was superseded or canceled")]
    Canceled {
        /// The key the request was for.
        key: Key,
    },

    /// No response was received.
    #[error("no response to the request for {key}: {message}")]
    Transport {
        /// The key the request was for.
        key: Key,
        /// Transport-level failure description.
        message: String,
    },

    /// The backend answered with a non-2xx status.
    #[error("the request for {key} failed with status {status}")]
    Status {
        /// The key the request was for.
        key: Key,
        /// HTTP status code.
        status: u16,
        /// The structured error body, if the response carried one.
        problem: Option<Problem>,
    },

    /// The response body could not be decoded into the key's domain
    /// value.
    #[error("could not decode the response for {key}")]
    Decode {
        /// The key the request was for.
        key: Key,
        /// The underlying decode failure.
        #[source]
        source: DecodeError,
    },
}

impl RequestError {
    /// Whether this error is a silent cancellation (stale response
    /// discarded, no user-visible effect).
    #[must_use]
    pub const fn is_canceled(&self) -> bool {
        matches!(self, RequestError::Canceled { .. })
    }
}
