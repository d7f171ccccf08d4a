//! Per-key request lifecycle records.

use std::collections::HashMap;

use formdeck_core::Key;

/// The status of the most recent request for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// No request has been sent since initialization (or reset).
    NotStarted,
    /// A request is in flight.
    Loading,
    /// The last request succeeded.
    Success,
    /// The last request failed.
    Error,
    /// The last request was superseded or explicitly canceled.
    Canceled,
}

/// Lifecycle record for one key: the state of its latest request and
/// the generation counter used to invalidate superseded requests.
///
/// A request captures `cancel_token` when it is sent. A completing
/// request may only apply its outcome if the captured token still
/// equals the current counter; superseding or canceling strictly
/// increments the counter, so every earlier request is guaranteed
/// stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestRecord {
    /// State of the most recent request.
    pub last_state: RequestState,
    /// Generation counter for logical cancellation.
    pub cancel_token: u64,
}

impl RequestRecord {
    /// The state of a record before any request has been sent.
    pub const INITIAL: RequestRecord = RequestRecord {
        last_state: RequestState::NotStarted,
        cancel_token: 0,
    };
}

/// Registry of request records, one per [`Key`].
///
/// Purely in-memory state transitions; no I/O. Token validation is the
/// caller's responsibility: [`succeed`](RequestRegistry::succeed) and
/// [`fail`](RequestRegistry::fail) must only be called after checking
/// that the caller's captured token still matches
/// [`token`](RequestRegistry::token).
#[derive(Debug)]
pub struct RequestRegistry {
    records: HashMap<Key, RequestRecord>,
}

impl RequestRegistry {
    /// Create a registry with an initial record for every key.
    #[must_use]
    pub fn new() -> RequestRegistry {
        RequestRegistry {
            records: Key::ALL
                .into_iter()
                .map(|key| (key, RequestRecord::INITIAL))
                .collect(),
        }
    }

    fn record_mut(&mut self, key: Key) -> &mut RequestRecord {
        self.records.entry(key).or_insert(RequestRecord::INITIAL)
    }

    /// The current record for a key.
    #[must_use]
    pub fn record(&self, key: Key) -> RequestRecord {
        self.records.get(&key).copied().unwrap_or(RequestRecord::INITIAL)
    }

    /// The current state of the latest request for a key.
    #[must_use]
    pub fn state(&self, key: Key) -> RequestState {
        self.record(key).last_state
    }

    /// The current cancellation token for a key.
    #[must_use]
    pub fn token(&self, key: Key) -> u64 {
        self.record(key).cancel_token
    }

    /// Whether a request for the key is in flight.
    #[must_use]
    pub fn is_loading(&self, key: Key) -> bool {
        self.state(key) == RequestState::Loading
    }

    /// Mark a request as sent. Does not change the token.
    pub fn begin(&mut self, key: Key) {
        self.record_mut(key).last_state = RequestState::Loading;
    }

    /// Cancel the latest request for the key, invalidating it.
    pub fn cancel(&mut self, key: Key) {
        let record = self.record_mut(key);
        record.last_state = RequestState::Canceled;
        record.cancel_token += 1;
    }

    /// Mark the latest request as successful.
    pub fn succeed(&mut self, key: Key) {
        self.record_mut(key).last_state = RequestState::Success;
    }

    /// Mark the latest request as failed.
    pub fn fail(&mut self, key: Key) {
        self.record_mut(key).last_state = RequestState::Error;
    }

    /// Restore every record to its initial state.
    pub fn reset(&mut self) {
        for record in self.records.values_mut() {
            *record = RequestRecord::INITIAL;
        }
    }
}

impl Default for RequestRegistry {
    fn default() -> RequestRegistry {
        RequestRegistry::new()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap

    use super::*;

    #[test]
    fn begin_does_not_change_the_token() {
        let mut registry = RequestRegistry::new();
        registry.begin(Key::Projects);
        assert_eq!(registry.state(Key::Projects), RequestState::Loading);
        assert_eq!(registry.token(Key::Projects), 0);
    }

    #[test]
    fn cancel_increments_the_token() {
        let mut registry = RequestRegistry::new();
        registry.begin(Key::Projects);
        registry.cancel(Key::Projects);
        assert_eq!(registry.state(Key::Projects), RequestState::Canceled);
        assert_eq!(registry.token(Key::Projects), 1);

        registry.begin(Key::Projects);
        registry.cancel(Key::Projects);
        assert_eq!(registry.token(Key::Projects), 2);
    }

    #[test]
    fn keys_are_independent() {
        let mut registry = RequestRegistry::new();
        registry.begin(Key::Users);
        registry.cancel(Key::Users);
        assert_eq!(registry.record(Key::Projects), RequestRecord::INITIAL);
    }

    #[test]
    fn reset_restores_every_record() {
        let mut registry = RequestRegistry::new();
        registry.begin(Key::Users);
        registry.cancel(Key::Users);
        registry.begin(Key::Forms);
        registry.fail(Key::Forms);
        registry.reset();
        for key in Key::ALL {
            assert_eq!(registry.record(key), RequestRecord::INITIAL);
        }
    }

    #[test]
    fn is_loading_tracks_only_the_loading_state() {
        let mut registry = RequestRegistry::new();
        assert!(!registry.is_loading(Key::Audits));
        registry.begin(Key::Audits);
        assert!(registry.is_loading(Key::Audits));
        registry.succeed(Key::Audits);
        assert!(!registry.is_loading(Key::Audits));
    }

    proptest::proptest! {
        /// Over any sequence of transitions, only `cancel` moves the
        /// token, and it always moves it by exactly one. This is what
        /// guarantees a captured token can never be reused by a later
        /// request.
        #[test]
        fn only_cancel_moves_the_token(ops in proptest::collection::vec(0..4u8, 0..64)) {
            let mut registry = RequestRegistry::new();
            let key = Key::Projects;
            for op in ops {
                let before = registry.token(key);
                match op {
                    0 => registry.begin(key),
                    1 => registry.cancel(key),
                    2 => registry.succeed(key),
                    _ => registry.fail(key),
                }
                let expected = if op == 1 { before + 1 } else { before };
                proptest::prop_assert_eq!(registry.token(key), expected);
            }
        }
    }
}
