//! Request specifications accepted by [`RequestStore::get`].
//!
//! [`RequestStore::get`]: crate::RequestStore::get

use formdeck_core::{Key, Problem};

use crate::cache::DataCache;

/// Classifies an error Problem as acceptable (`true`) or not.
pub type ProblemPredicate = Box<dyn Fn(&Problem) -> bool + Send + Sync>;

/// Runs after a request's data has been stored, with the cache
/// snapshot.
pub type SuccessCallback = Box<dyn FnOnce(&DataCache) + Send>;

/// Maps a Problem to an alternative alert message. Returning `None`
/// falls back to the Problem's own message.
pub type AlertMapper = Box<dyn Fn(&Problem) -> Option<String> + Send + Sync>;

/// One GET request to issue through the store.
///
/// Built with [`RequestSpec::new`] plus the `with_*` methods; `resend`
/// and `clear` default to `true`.
///
/// # Example
///
/// ```ignore
/// let spec = RequestSpec::new(Key::FieldKeys, "/v1/projects/7/app-users")
///     .extended()
///     .resend(false);
/// store.get(vec![spec]).await?;
/// ```
pub struct RequestSpec {
    pub(crate) key: Key,
    pub(crate) url: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) extended: bool,
    pub(crate) fulfill_problem: Option<ProblemPredicate>,
    pub(crate) on_success: Option<SuccessCallback>,
    pub(crate) problem_to_alert: Option<AlertMapper>,
    pub(crate) resend: bool,
    pub(crate) clear: bool,
}

impl RequestSpec {
    /// Create a spec for `key` fetched from `url`.
    #[must_use]
    pub fn new(key: Key, url: impl Into<String>) -> RequestSpec {
        RequestSpec {
            key,
            url: url.into(),
            headers: Vec::new(),
            extended: false,
            fulfill_problem: None,
            on_success: None,
            problem_to_alert: None,
            resend: true,
            clear: true,
        }
    }

    /// The key this spec fetches.
    #[must_use]
    pub const fn key(&self) -> Key {
        self.key
    }

    /// Add a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> RequestSpec {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Request extended metadata (adds the `X-Extended-Metadata`
    /// header).
    #[must_use]
    pub const fn extended(mut self) -> RequestSpec {
        self.extended = true;
        self
    }

    /// Treat an error Problem accepted by `predicate` as a success.
    /// The raw response body is stored without decoding, no alert is
    /// shown, and the request fulfills.
    #[must_use]
    pub fn with_fulfill_problem(
        mut self,
        predicate: impl Fn(&Problem) -> bool + Send + Sync + 'static,
    ) -> RequestSpec {
        self.fulfill_problem = Some(Box::new(predicate));
        self
    }

    /// Run a callback as soon as this request's data has been stored,
    /// before the batch settles and before any other task can observe
    /// the new state.
    ///
    /// The callback runs while the store's lock is held: it must not
    /// call back into the store, and should finish quickly. Callers
    /// who only need post-settle guarantees should await the future
    /// returned by `get` instead.
    #[must_use]
    pub fn with_on_success(
        mut self,
        callback: impl FnOnce(&DataCache) + Send + 'static,
    ) -> RequestSpec {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Override the alert message for an error Problem. Returning
    /// `None` keeps the Problem's own message.
    #[must_use]
    pub fn with_problem_to_alert(
        mut self,
        mapper: impl Fn(&Problem) -> Option<String> + Send + Sync + 'static,
    ) -> RequestSpec {
        self.problem_to_alert = Some(Box::new(mapper));
        self
    }

    /// Whether to send at all when the key already has data or a
    /// request in flight. With `resend == false` the whole request is
    /// short-circuited in that case, including the `clear` step.
    #[must_use]
    pub const fn resend(mut self, resend: bool) -> RequestSpec {
        self.resend = resend;
        self
    }

    /// Whether existing data for the key is cleared before the
    /// request is sent. Pass `false` for a background refresh that
    /// keeps showing current data.
    #[must_use]
    pub const fn clear(mut self, clear: bool) -> RequestSpec {
        self.clear = clear;
        self
    }
}

impl std::fmt::Debug for RequestSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSpec")
            .field("key", &self.key)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("extended", &self.extended)
            .field("fulfill_problem", &self.fulfill_problem.is_some())
            .field("on_success", &self.on_success.is_some())
            .field("problem_to_alert", &self.problem_to_alert.is_some())
            .field("resend", &self.resend)
            .field("clear", &self.clear)
            .finish()
    }
}
