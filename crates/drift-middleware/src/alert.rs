//! Non-fatal findings raised while reconciling
//!
//! Stages push alerts into a shared [`Alerter`]; the caller drains it once
//! the chain has run.

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

/// Severity of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Informational notice
    Info,
    /// Input was skipped or partially understood
    Warning,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// One finding about a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Severity
    pub level: AlertLevel,
    /// `type.id` of the resource concerned
    pub key: String,
    /// Human-readable description
    pub message: String,
}

/// Thread-safe alert sink shared by stages
#[derive(Debug, Default)]
pub struct Alerter {
    alerts: Mutex<Vec<Alert>>,
}

impl Alerter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning about `key`
    pub fn warn(&self, key: impl Into<String>, message: impl Into<String>) {
        self.push(Alert {
            level: AlertLevel::Warning,
            key: key.into(),
            message: message.into(),
        });
    }

    /// Record an alert
    pub fn push(&self, alert: Alert) {
        tracing::warn!(key = %alert.key, level = %alert.level, "{}", alert.message);
        self.lock().push(alert);
    }

    /// Snapshot of the alerts recorded so far
    pub fn alerts(&self) -> Vec<Alert> {
        self.lock().clone()
    }

    /// Take every recorded alert, leaving the sink empty
    pub fn drain(&self) -> Vec<Alert> {
        std::mem::take(&mut *self.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A poisoned lock still holds a consistent Vec.
    fn lock(&self) -> MutexGuard<'_, Vec<Alert>> {
        self.alerts.lock().unwrap_or_else(|e| e.into_inner())
    }
}
