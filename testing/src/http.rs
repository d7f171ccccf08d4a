//! Mock HTTP client.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use formdeck_core::Response;
use formdeck_store::{HttpClient, HttpError};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::fixtures::problem_body;

/// A request issued through the mock, as the store sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Request URL.
    pub url: String,
    /// Request headers, in the order they were set.
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    /// The value of a header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

enum MockOutcome {
    Ready(Result<Response, HttpError>),
    Gated(oneshot::Receiver<Result<Response, HttpError>>),
}

impl std::fmt::Debug for MockOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MockOutcome::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            MockOutcome::Gated(_) => write!(f, "Gated(<pending>)"),
        }
    }
}

/// In-memory [`HttpClient`] with per-URL FIFO queues of canned
/// outcomes.
///
/// Every issued request is recorded, so tests can assert that a
/// short-circuited `get` issued no network call, or inspect the
/// headers the store attached. A URL with no queued outcome resolves
/// to a transport error naming the URL, which makes a missing fixture
/// easy to spot in a failing test.
///
/// Gated outcomes ([`enqueue_gated`](MockHttpClient::enqueue_gated))
/// stay pending until their [`GateHandle`] releases them; they are how
/// tests hold a request in flight to exercise supersession and
/// stale-response discard.
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    queues: Arc<Mutex<HashMap<String, VecDeque<MockOutcome>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a mock with no canned responses.
    #[must_use]
    pub fn new() -> MockHttpClient {
        MockHttpClient::default()
    }

    fn push(&self, url: &str, outcome: MockOutcome) {
        self.queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(url.to_string())
            .or_default()
            .push_back(outcome);
    }

    /// Queue an arbitrary outcome for `url`.
    pub fn enqueue(&self, url: &str, outcome: Result<Response, HttpError>) {
        self.push(url, MockOutcome::Ready(outcome));
    }

    /// Queue a 200 response with the given JSON body.
    pub fn enqueue_ok(&self, url: &str, body: Value) {
        self.enqueue(url, Ok(Response::ok(url, body)));
    }

    /// Queue an error response carrying a Problem body.
    pub fn enqueue_problem(&self, url: &str, status: u16, code: f64, message: &str) {
        self.enqueue(
            url,
            Err(HttpError::Status {
                response: Response {
                    status,
                    url: url.to_string(),
                    body: problem_body(code, message),
                },
            }),
        );
    }

    /// Queue an error response whose body is not a Problem.
    pub fn enqueue_invalid_error(&self, url: &str, status: u16) {
        self.enqueue(
            url,
            Err(HttpError::Status {
                response: Response {
                    status,
                    url: url.to_string(),
                    body: Value::String("<html>oops</html>".to_string()),
                },
            }),
        );
    }

    /// Queue a transport failure (no response at all).
    pub fn enqueue_transport_error(&self, url: &str) {
        self.enqueue(url, Err(HttpError::Transport("connection refused".to_string())));
    }

    /// Queue an outcome that stays pending until the returned handle
    /// releases it.
    #[must_use]
    pub fn enqueue_gated(&self, url: &str) -> GateHandle {
        let (sender, receiver) = oneshot::channel();
        self.push(url, MockOutcome::Gated(receiver));
        GateHandle { url: url.to_string(), sender }
    }

    /// Every request issued so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests issued so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl HttpClient for MockHttpClient {
    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = Result<Response, HttpError>> + Send {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest { url: url.to_string(), headers: headers.to_vec() });

        let outcome = self
            .queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(url)
            .and_then(VecDeque::pop_front);
        let url = url.to_string();

        async move {
            match outcome {
                Some(MockOutcome::Ready(result)) => result,
                Some(MockOutcome::Gated(receiver)) => receiver.await.unwrap_or_else(|_| {
                    Err(HttpError::Transport(format!("gate for {url} was dropped")))
                }),
                None => Err(HttpError::Transport(format!("no canned response for {url}"))),
            }
        }
    }
}

/// Releases a gated response queued with
/// [`MockHttpClient::enqueue_gated`].
pub struct GateHandle {
    url: String,
    sender: oneshot::Sender<Result<Response, HttpError>>,
}

impl std::fmt::Debug for GateHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateHandle").field("url", &self.url).finish()
    }
}

impl GateHandle {
    /// Release the pending request with an arbitrary outcome.
    pub fn release(self, outcome: Result<Response, HttpError>) {
        // The requester may be gone (test ended); that is fine.
        let _ = self.sender.send(outcome);
    }

    /// Release the pending request with a 200 response.
    pub fn release_ok(self, body: Value) {
        let url = self.url.clone();
        self.release(Ok(Response::ok(url, body)));
    }

    /// Release the pending request with a transport failure.
    pub fn release_transport_error(self) {
        self.release(Err(HttpError::Transport("connection reset".to_string())));
    }
}
