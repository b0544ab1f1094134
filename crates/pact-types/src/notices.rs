use serde::{Deserialize, Serialize};

use crate::models::Pact;

/// How urgently a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A structured notice for the presentation layer.
///
/// The engine only produces these; rendering (toasts, system notifications)
/// is owned by the consumer on the other end of the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    /// Deadline is approaching and no log exists yet for today.
    pub fn reminder(pact: &Pact) -> Self {
        Self {
            title: format!("{} is due soon", pact.title),
            description: format!("Deadline is {} — don't break the streak.", pact.deadline),
            severity: Severity::Warning,
        }
    }

    /// Deadline passed with no log for today. Notification only; no log
    /// is written on the pact's behalf.
    pub fn missed(pact: &Pact) -> Self {
        Self {
            title: format!("{} was missed", pact.title),
            description: format!("The {} deadline passed without a check-in.", pact.deadline),
            severity: Severity::Error,
        }
    }

    /// A mutation landed locally but the remote write failed.
    pub fn sync_warning(what: &str) -> Self {
        Self {
            title: "Saved locally".into(),
            description: format!("{what} could not be synced yet; it will catch up on the next refresh."),
            severity: Severity::Warning,
        }
    }
}

/// Producers hold the sender half; the presentation layer drains the
/// receiver. Unbounded because every producer emits bounded work per tick.
pub type NoticeSender = tokio::sync::mpsc::UnboundedSender<Notice>;
