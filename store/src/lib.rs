//! # Formdeck Store
//!
//! The request-state store: the one place all outbound GET requests
//! go through. It composes three concerns:
//!
//! - **Request registry**: per-key record of the latest request's
//!   lifecycle state and a generation counter used for logical
//!   cancellation.
//! - **Data cache**: per-key slot holding the last successfully
//!   decoded response, or nothing.
//! - **Fetch orchestrator**: [`RequestStore::get`] issues a batch of
//!   GET requests concurrently, applies the resend/clear/supersede
//!   policy per key, decodes responses, and joins the batch into one
//!   outcome.
//!
//! Cancellation is logical, not transport-level: superseding a key's
//! in-flight request bumps its token, and a late-arriving response
//! whose captured token no longer matches is discarded on arrival.
//! This works with any HTTP client, including ones without native
//! abort support, and is cheap because the dominant cost is server
//! processing.
//!
//! All registry and cache mutation happens synchronously under one
//! lock, never across an await point, so the token check at each
//! response-handling site is the only thing needed to keep stale
//! continuations from corrupting state.
//!
//! ## Example
//!
//! ```ignore
//! use formdeck_core::Key;
//! use formdeck_store::{RequestSpec, RequestStore, ReqwestClient, TracingAlerter};
//!
//! let store = RequestStore::new(
//!     ReqwestClient::new("https://central.example.com"),
//!     TracingAlerter,
//! );
//! store.get(vec![
//!     RequestSpec::new(Key::Project, "/v1/projects/7").extended(),
//!     RequestSpec::new(Key::Forms, "/v1/projects/7/forms").resend(false),
//! ]).await?;
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use formdeck_core::{CachedValue, Key, Problem, Response};
use formdeck_core::types::{FieldKey, Role};
use futures::future;
use tokio::sync::watch;

pub mod alert;
pub mod cache;
pub mod error;
pub mod http;
pub mod registry;
pub mod request;

pub use alert::{AlertSeverity, Alerter, TracingAlerter};
pub use cache::DataCache;
pub use error::RequestError;
pub use http::{HttpClient, HttpError, ReqwestClient};
pub use registry::{RequestRecord, RequestRegistry, RequestState};
pub use request::RequestSpec;

use error::{INVALID_ERROR_MESSAGE, NO_RESPONSE_MESSAGE};

/// The manager and viewer roles, pulled out of the cached role list.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRoles {
    /// The role with system name `manager`, if present.
    pub manager: Option<Role>,
    /// The role with system name `viewer`, if present.
    pub viewer: Option<Role>,
}

#[derive(Debug)]
struct StoreState {
    registry: RequestRegistry,
    cache: DataCache,
    version: u64,
}

/// Centralized store for request lifecycle state and response data.
///
/// Generic over its two collaborators: the transport ([`HttpClient`])
/// and the alert sink ([`Alerter`]). Cloning is cheap and clones share
/// state.
///
/// Reads are always consistent snapshots; writes go through [`get`]
/// (network) or the explicit command surface ([`cancel`], [`clear`],
/// [`update`], [`reset`]). Every mutation bumps a version observable
/// through [`subscribe`], which is how reactive consumers learn that
/// cache or registry state changed.
///
/// [`get`]: RequestStore::get
/// [`cancel`]: RequestStore::cancel
/// [`clear`]: RequestStore::clear
/// [`update`]: RequestStore::update
/// [`reset`]: RequestStore::reset
/// [`subscribe`]: RequestStore::subscribe
#[derive(Debug, Clone)]
pub struct RequestStore<C, A> {
    client: C,
    alerter: A,
    state: Arc<Mutex<StoreState>>,
    changed: watch::Sender<u64>,
}

impl<C: HttpClient, A: Alerter> RequestStore<C, A> {
    /// Create a store with empty cache slots and fresh request
    /// records for every [`Key`].
    #[must_use]
    pub fn new(client: C, alerter: A) -> RequestStore<C, A> {
        let (changed, _) = watch::channel(0);
        RequestStore {
            client,
            alerter,
            state: Arc::new(Mutex::new(StoreState {
                registry: RequestRegistry::new(),
                cache: DataCache::new(),
                version: 0,
            })),
            changed,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, state: &mut StoreState) {
        state.version = state.version.wrapping_add(1);
        self.changed.send_replace(state.version);
    }

    // ------------------------------------------------------------------
    // Fetch orchestration

    /// Send one or more GET requests and store the decoded response
    /// data.
    ///
    /// All specs are launched concurrently; the returned future
    /// settles once every one of them has. For each spec, the store:
    ///
    /// 1. Short-circuits when `resend == false` and the key already
    ///    has data or a request in flight: no network call, no state
    ///    change.
    /// 2. Otherwise supersedes an in-flight request for the key
    ///    (bumping its cancellation token) and, when `clear` is set,
    ///    clears existing data.
    /// 3. Issues the GET with the spec's headers, the
    ///    extended-metadata header when requested, and the session's
    ///    bearer token (read at send time) when logged in.
    /// 4. On arrival, discards the response if the request was
    ///    superseded meanwhile; otherwise records success or failure
    ///    and, on success, decodes and caches the payload.
    ///
    /// At most one alert is shown per batch, for the first failure;
    /// later failures still mark their own key's registry entry, so
    /// per-key loading indicators stay accurate.
    ///
    /// # Errors
    ///
    /// Returns the first spec's error if any request fails, is
    /// superseded, or cannot be decoded. A superseded request's error
    /// is [`RequestError::Canceled`] and carries no user-visible
    /// alert: the request that superseded it owns the outcome.
    pub async fn get(&self, specs: Vec<RequestSpec>) -> Result<(), RequestError> {
        let first_error = AtomicBool::new(false);
        let results = future::join_all(
            specs
                .into_iter()
                .map(|spec| self.fetch(spec, &first_error)),
        )
        .await;
        results.into_iter().collect()
    }

    async fn fetch(
        &self,
        spec: RequestSpec,
        first_error: &AtomicBool,
    ) -> Result<(), RequestError> {
        let key = spec.key;

        // Decide and prepare under the lock, so the token captured
        // here is the one the request is accountable to.
        let prepared = {
            let mut state = self.lock();
            let loading = state.registry.is_loading(key);
            let has_data = state.cache.contains(key);

            if !spec.resend && (has_data || loading) {
                // Short-circuit: existing data is not cleared even if
                // `clear` is set.
                None
            } else {
                if loading {
                    state.registry.cancel(key);
                }
                if has_data && spec.clear {
                    state.cache.clear(key);
                }
                let token = state.registry.token(key);
                state.registry.begin(key);

                let mut headers = spec.headers.clone();
                if spec.extended {
                    headers.push(("X-Extended-Metadata".to_string(), "true".to_string()));
                }
                // The bearer credential is read from the session slot
                // at send time, not captured earlier: a mid-flight
                // login or logout affects only requests issued after
                // it.
                if let Some(session) =
                    state.cache.get(Key::Session).and_then(CachedValue::as_session)
                {
                    headers.push((
                        "Authorization".to_string(),
                        format!("Bearer {}", session.token),
                    ));
                }
                self.notify(&mut state);
                Some((token, headers))
            }
        };
        let Some((token, headers)) = prepared else {
            return Ok(());
        };

        tracing::debug!(%key, url = %spec.url, "sending request");
        let outcome = self.client.get(&spec.url, &headers).await;

        let mut state = self.lock();
        if state.registry.token(key) != token {
            // Superseded while in flight. The superseding request owns
            // the registry and cache from here on.
            tracing::debug!(%key, "discarding response to a superseded request");
            return Err(RequestError::Canceled { key });
        }

        match outcome {
            Ok(response) => self.settle_success(&mut state, spec, response),
            Err(HttpError::Status { response }) => {
                let problem = Problem::from_value(&response.body);
                if let (Some(problem), Some(predicate)) =
                    (problem.as_ref(), spec.fulfill_problem.as_ref())
                {
                    if predicate(problem) {
                        // An acceptable Problem is not an error for
                        // this store: the raw body is stored without
                        // decoding and no alert is shown.
                        state.registry.succeed(key);
                        state.cache.set(key, CachedValue::Raw(response.body));
                        if let Some(callback) = spec.on_success {
                            callback(&state.cache);
                        }
                        self.notify(&mut state);
                        return Ok(());
                    }
                }

                tracing::error!(%key, status = response.status, "request failed");
                if !first_error.swap(true, Ordering::SeqCst) {
                    let message = match problem.as_ref() {
                        Some(problem) => spec
                            .problem_to_alert
                            .as_ref()
                            .and_then(|mapper| mapper(problem))
                            .unwrap_or_else(|| problem.message.clone()),
                        None => INVALID_ERROR_MESSAGE.to_string(),
                    };
                    self.alerter.alert(AlertSeverity::Danger, &message);
                }
                state.registry.fail(key);
                self.notify(&mut state);
                Err(RequestError::Status { key, status: response.status, problem })
            },
            Err(HttpError::Transport(message)) => {
                tracing::error!(%key, %message, "no response to request");
                if !first_error.swap(true, Ordering::SeqCst) {
                    self.alerter.alert(AlertSeverity::Danger, NO_RESPONSE_MESSAGE);
                }
                state.registry.fail(key);
                self.notify(&mut state);
                Err(RequestError::Transport { key, message })
            },
        }
    }

    fn settle_success(
        &self,
        state: &mut StoreState,
        spec: RequestSpec,
        response: Response,
    ) -> Result<(), RequestError> {
        let key = spec.key;
        match CachedValue::decode(key, &response) {
            Ok(value) => {
                state.registry.succeed(key);
                state.cache.set(key, value);
                // Runs before any other task can observe the new
                // state; see RequestSpec::with_on_success.
                if let Some(callback) = spec.on_success {
                    callback(&state.cache);
                }
                self.notify(state);
                Ok(())
            },
            Err(source) => {
                tracing::error!(%key, error = %source, "could not decode response");
                state.registry.fail(key);
                self.notify(state);
                Err(RequestError::Decode { key, source })
            },
        }
    }

    // ------------------------------------------------------------------
    // Read accessors

    /// Whether a request for the key is in flight.
    #[must_use]
    pub fn is_loading(&self, key: Key) -> bool {
        self.lock().registry.is_loading(key)
    }

    /// The state of the latest request for the key.
    #[must_use]
    pub fn request_state(&self, key: Key) -> RequestState {
        self.lock().registry.state(key)
    }

    /// The full lifecycle record for the key.
    #[must_use]
    pub fn request_record(&self, key: Key) -> RequestRecord {
        self.lock().registry.record(key)
    }

    /// Whether every listed key has cached data.
    #[must_use]
    pub fn data_exists(&self, keys: &[Key]) -> bool {
        self.lock().cache.has(keys)
    }

    /// Whether the listed keys are in their first load: no listed
    /// key's last request errored, and at least one is in flight with
    /// no cached data yet. A background refresh of already-displayed
    /// data is not an initial load.
    #[must_use]
    pub fn initially_loading(&self, keys: &[Key]) -> bool {
        let state = self.lock();
        let mut any = false;
        for &key in keys {
            match state.registry.state(key) {
                RequestState::Error => return false,
                RequestState::Loading if !state.cache.contains(key) => any = true,
                _ => {},
            }
        }
        any
    }

    /// Read from the cache through a snapshot.
    ///
    /// The closure must not call back into the store.
    pub fn with_data<R>(&self, f: impl FnOnce(&DataCache) -> R) -> R {
        f(&self.lock().cache)
    }

    /// The current session's bearer token, if logged in.
    #[must_use]
    pub fn session_token(&self) -> Option<String> {
        self.lock()
            .cache
            .get(Key::Session)
            .and_then(CachedValue::as_session)
            .map(|session| session.token.clone())
    }

    /// Whether a session with a token is cached.
    #[must_use]
    pub fn logged_in(&self) -> bool {
        self.session_token().is_some()
    }

    /// The opposite of [`logged_in`](RequestStore::logged_in).
    #[must_use]
    pub fn logged_out(&self) -> bool {
        !self.logged_in()
    }

    /// The manager and viewer roles from the cached role list, or
    /// `None` if roles have not been fetched.
    #[must_use]
    pub fn project_roles(&self) -> Option<ProjectRoles> {
        let state = self.lock();
        let roles = state.cache.get(Key::Roles)?.as_roles()?;
        Some(ProjectRoles {
            manager: roles
                .iter()
                .find(|role| role.system.as_deref() == Some("manager"))
                .cloned(),
            viewer: roles
                .iter()
                .find(|role| role.system.as_deref() == Some("viewer"))
                .cloned(),
        })
    }

    /// The cached app users that still hold an access token, or
    /// `None` if app users have not been fetched.
    #[must_use]
    pub fn field_keys_with_token(&self) -> Option<Vec<FieldKey>> {
        let state = self.lock();
        let field_keys = state.cache.get(Key::FieldKeys)?.as_field_keys()?;
        Some(
            field_keys
                .iter()
                .filter(|field_key| field_key.token.is_some())
                .cloned()
                .collect(),
        )
    }

    /// Observe store changes: the receiver's value is a version
    /// counter bumped on every registry or cache mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed.subscribe()
    }

    // ------------------------------------------------------------------
    // Command surface

    /// Cancel the latest request for the key. A response that arrives
    /// for it afterwards is discarded.
    pub fn cancel(&self, key: Key) {
        let mut state = self.lock();
        state.registry.cancel(key);
        self.notify(&mut state);
    }

    /// Clear the cached data for a key. Request state is untouched.
    pub fn clear(&self, key: Key) {
        let mut state = self.lock();
        state.cache.clear(key);
        self.notify(&mut state);
    }

    /// Clear the cached data for every key.
    pub fn clear_all(&self) {
        let mut state = self.lock();
        state.cache.clear_all();
        self.notify(&mut state);
    }

    /// Edit the value cached for a key; see [`DataCache::update`].
    /// Returns `false` if the key has no data. Observers are notified
    /// of the edit as a slot-level change.
    pub fn update(&self, key: Key, f: impl FnOnce(&mut CachedValue)) -> bool {
        let mut state = self.lock();
        let updated = state.cache.update(key, f);
        if updated {
            self.notify(&mut state);
        }
        updated
    }

    /// Full reset for session teardown: every request record back to
    /// its initial state and every cache slot absent.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.registry.reset();
        state.cache.clear_all();
        self.notify(&mut state);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap

    use super::*;
    use serde_json::json;

    struct NullClient;

    impl HttpClient for NullClient {
        fn get(
            &self,
            _url: &str,
            _headers: &[(String, String)],
        ) -> impl std::future::Future<Output = Result<Response, HttpError>> + Send {
            async { Err(HttpError::Transport("null client".to_string())) }
        }
    }

    fn store() -> RequestStore<NullClient, TracingAlerter> {
        RequestStore::new(NullClient, TracingAlerter)
    }

    fn prime(store: &RequestStore<NullClient, TracingAlerter>, key: Key, value: CachedValue) {
        let mut state = store.lock();
        state.cache.set(key, value);
    }

    #[test]
    fn logged_in_follows_the_session_slot() {
        let store = store();
        assert!(store.logged_out());

        let session = CachedValue::decode(
            Key::Session,
            &Response::ok(
                "/v1/sessions",
                json!({ "token": "abc", "expiresAt": "2026-09-01T00:00:00.000Z" }),
            ),
        )
        .unwrap();
        prime(&store, Key::Session, session);

        assert!(store.logged_in());
        assert_eq!(store.session_token().as_deref(), Some("abc"));
    }

    #[test]
    fn initially_loading_is_false_without_requests() {
        let store = store();
        assert!(!store.initially_loading(&[Key::Projects, Key::Users]));
    }

    #[test]
    fn initially_loading_requires_a_loading_key_without_data() {
        let store = store();
        {
            let mut state = store.lock();
            state.registry.begin(Key::Projects);
        }
        assert!(store.initially_loading(&[Key::Projects]));

        // Data present: a refresh, not an initial load.
        prime(&store, Key::Projects, CachedValue::Raw(json!([])));
        assert!(!store.initially_loading(&[Key::Projects]));
    }

    #[test]
    fn initially_loading_is_false_when_any_key_errored() {
        let store = store();
        {
            let mut state = store.lock();
            state.registry.begin(Key::Projects);
            state.registry.begin(Key::Users);
            state.registry.fail(Key::Users);
        }
        assert!(!store.initially_loading(&[Key::Projects, Key::Users]));
    }

    #[test]
    fn project_roles_picks_manager_and_viewer() {
        let store = store();
        assert_eq!(store.project_roles(), None);

        let roles = CachedValue::decode(
            Key::Roles,
            &Response::ok(
                "/v1/roles",
                json!([
                    { "id": 1, "name": "Administrator", "system": "admin", "verbs": [] },
                    { "id": 2, "name": "Project Manager", "system": "manager", "verbs": [] },
                    { "id": 3, "name": "Project Viewer", "system": "viewer", "verbs": [] }
                ]),
            ),
        )
        .unwrap();
        prime(&store, Key::Roles, roles);

        let project_roles = store.project_roles().unwrap();
        assert_eq!(project_roles.manager.unwrap().id, 2);
        assert_eq!(project_roles.viewer.unwrap().id, 3);
    }

    #[test]
    fn field_keys_with_token_filters_revoked_keys() {
        let store = store();
        let field_keys = CachedValue::decode(
            Key::FieldKeys,
            &Response::ok(
                "/v1/projects/7/app-users",
                json!([
                    { "id": 1, "displayName": "Active", "token": "t" },
                    { "id": 2, "displayName": "Revoked", "token": null }
                ]),
            ),
        )
        .unwrap();
        prime(&store, Key::FieldKeys, field_keys);

        let with_token = store.field_keys_with_token().unwrap();
        assert_eq!(with_token.len(), 1);
        assert_eq!(with_token[0].id, 1);
    }

    #[test]
    fn mutations_bump_the_version() {
        let store = store();
        let receiver = store.subscribe();
        assert_eq!(*receiver.borrow(), 0);

        store.cancel(Key::Projects);
        assert_eq!(*receiver.borrow(), 1);

        store.clear_all();
        assert_eq!(*receiver.borrow(), 2);
    }

    #[test]
    fn update_of_an_absent_slot_does_not_notify() {
        let store = store();
        let receiver = store.subscribe();
        let updated = store.update(Key::Project, |_| {});
        assert!(!updated);
        assert_eq!(*receiver.borrow(), 0);
    }

    #[test]
    fn reset_restores_records_and_empties_slots() {
        let store = store();
        prime(&store, Key::Projects, CachedValue::Raw(json!([])));
        {
            let mut state = store.lock();
            state.registry.begin(Key::Projects);
            state.registry.cancel(Key::Projects);
        }
        store.reset();
        for key in Key::ALL {
            assert_eq!(store.request_record(key), RequestRecord::INITIAL);
        }
        assert!(!store.data_exists(&[Key::Projects]));
    }
}
