//! The alerting collaborator.

/// Severity of a user-facing alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    /// Confirmation of a completed operation.
    Success,
    /// Neutral information.
    Info,
    /// Something the user should look at.
    Warning,
    /// A failure.
    Danger,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Success => write!(f, "success"),
            AlertSeverity::Info => write!(f, "info"),
            AlertSeverity::Warning => write!(f, "warning"),
            AlertSeverity::Danger => write!(f, "danger"),
        }
    }
}

/// Receives user-facing alert messages from the store.
///
/// Fire-and-forget: the store never consumes a return value, and an
/// implementation must not block.
pub trait Alerter: Send + Sync {
    /// Show an alert.
    fn alert(&self, severity: AlertSeverity, message: &str);
}

/// [`Alerter`] that logs through `tracing`. Useful as a default when
/// no UI is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAlerter;

impl Alerter for TracingAlerter {
    fn alert(&self, severity: AlertSeverity, message: &str) {
        match severity {
            AlertSeverity::Warning | AlertSeverity::Danger => {
                tracing::warn!(severity = %severity, message, "alert");
            },
            AlertSeverity::Success | AlertSeverity::Info => {
                tracing::info!(severity = %severity, message, "alert");
            },
        }
    }
}
