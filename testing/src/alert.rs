//! Capturing alerter.

use std::sync::{Arc, Mutex, PoisonError};

use formdeck_store::{AlertSeverity, Alerter};

/// [`Alerter`] that records every alert for later assertions.
#[derive(Debug, Clone, Default)]
pub struct CapturingAlerter {
    alerts: Arc<Mutex<Vec<(AlertSeverity, String)>>>,
}

impl CapturingAlerter {
    /// Create an alerter with no recorded alerts.
    #[must_use]
    pub fn new() -> CapturingAlerter {
        CapturingAlerter::default()
    }

    /// Every alert shown so far, in order.
    #[must_use]
    pub fn alerts(&self) -> Vec<(AlertSeverity, String)> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The messages of every alert shown so far, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.alerts()
            .into_iter()
            .map(|(_, message)| message)
            .collect()
    }

    /// Number of alerts shown so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Alerter for CapturingAlerter {
    fn alert(&self, severity: AlertSeverity, message: &str) {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((severity, message.to_string()));
    }
}
