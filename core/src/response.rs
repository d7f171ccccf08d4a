//! Transport-agnostic response carrier.

use serde_json::Value;

/// An HTTP response as seen by the store: status, request URL, and the
/// parsed JSON body.
///
/// Decoding sometimes needs request metadata in addition to the body
/// (for example, app users carry no project id in the body, so it is
/// parsed from the URL), which is why the URL travels with the
/// response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// The URL the request was sent to.
    pub url: String,
    /// Parsed JSON body. Bodies that are not JSON are represented as
    /// `Value::Null`.
    pub body: Value,
}

impl Response {
    /// Build a 200 response, mainly for tests and fixtures.
    #[must_use]
    pub fn ok(url: impl Into<String>, body: Value) -> Response {
        Response { status: 200, url: url.into(), body }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}
