//! Fire-and-forget user notifications.
//!
//! Operation failures surface to the user through this sink (toast-style in
//! the consuming UI), not through returned errors. The store dispatches a
//! notice and moves on; delivery is never awaited or checked.

/// How a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational message.
    Info,
    /// Something the user asked for did not happen.
    Error,
}

/// One user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Presentation severity.
    pub severity: Severity,
    /// Message text, already user-facing.
    pub message: String,
}

impl Notice {
    /// Build an error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    /// Build an informational notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }
}

/// Sink for user-visible notices.
///
/// Implementations must not block: the store calls this inline on its
/// failure paths and does not react to delivery.
pub trait Notifier: Send + Sync {
    /// Dispatch one notice.
    fn notify(&self, notice: &Notice);
}

/// Notifier that emits notices as tracing events.
///
/// The default sink for embedders that have not wired a UI channel yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        match notice.severity {
            Severity::Error => tracing::warn!(message = %notice.message, "cart notice"),
            Severity::Info => tracing::info!(message = %notice.message, "cart notice"),
        }
    }
}
