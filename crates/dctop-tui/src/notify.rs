//! Messages the window produces for its surrounding view layer.

use dctop_common::types::ContainerId;

/// Severity of a status-bar notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational.
    Info,
    /// Something worth a second look, e.g. an empty filtered view.
    Warning,
    /// A collaborator misbehaved.
    Error,
}

/// A status-bar notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// How loud to render it.
    pub severity: Severity,
    /// Message text.
    pub text: String,
}

impl Notification {
    /// An informational notification.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    /// A warning notification.
    #[must_use]
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            text: text.into(),
        }
    }

    /// An error notification.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }
}

/// Navigation requests handed to the surrounding view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMessage {
    /// Open the logs view for a container.
    ShowLogs(ContainerId),
    /// Open an interactive shell in a container.
    ShowShell(ContainerId),
    /// Return to the default view.
    SwitchToDefault,
}
