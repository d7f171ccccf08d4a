//! The transport collaborator: a single abstracted HTTP GET.

use std::future::Future;

use formdeck_core::Response;
use thiserror::Error;

/// A transport-level failure, or a response outside the 2xx range.
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    /// No response was received (connection refused, timeout, etc.).
    #[error("no response to the request: {0}")]
    Transport(String),

    /// A response arrived with a non-2xx status. The body may be a
    /// structured Problem; the store decides.
    #[error("the request failed with status {}", .response.status)]
    Status {
        /// The error response.
        response: Response,
    },
}

/// Issues HTTP GET requests on behalf of the store.
///
/// The store never constructs sockets or manages connections itself;
/// it hands a URL and headers to this collaborator and interprets the
/// outcome. Implementations must resolve non-2xx responses as
/// [`HttpError::Status`] so the store can inspect the error body.
pub trait HttpClient: Send + Sync {
    /// Issue a GET request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Transport`] when no response arrives and
    /// [`HttpError::Status`] for non-2xx responses.
    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = Result<Response, HttpError>> + Send;
}

/// [`HttpClient`] backed by `reqwest`.
///
/// Relative request URLs are resolved against the configured base URL;
/// absolute URLs are used as-is. Response bodies that are not valid
/// JSON are carried as `null`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    base_url: String,
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a client that resolves relative URLs against `base_url`
    /// (no trailing slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> ReqwestClient {
        ReqwestClient {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}{url}", self.base_url)
        }
    }
}

impl HttpClient for ReqwestClient {
    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = Result<Response, HttpError>> + Send {
        let request_url = self.resolve(url);
        let client = self.client.clone();
        let headers = headers.to_vec();

        async move {
            let mut request = client.get(&request_url);
            for (name, value) in &headers {
                request = request.header(name, value);
            }
            let response = request
                .send()
                .await
                .map_err(|error| HttpError::Transport(error.to_string()))?;

            let status = response.status().as_u16();
            let body = response
                .json::<serde_json::Value>()
                .await
                .unwrap_or(serde_json::Value::Null);

            let response = Response { status, url: request_url, body };
            if response.is_success() {
                Ok(response)
            } else {
                Err(HttpError::Status { response })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_urls_resolve_against_the_base() {
        let client = ReqwestClient::new("https://central.example.com");
        assert_eq!(
            client.resolve("/v1/projects"),
            "https://central.example.com/v1/projects"
        );
    }

    #[test]
    fn absolute_urls_pass_through() {
        let client = ReqwestClient::new("https://central.example.com");
        assert_eq!(
            client.resolve("https://elsewhere.example.com/v1/users"),
            "https://elsewhere.example.com/v1/users"
        );
    }
}
