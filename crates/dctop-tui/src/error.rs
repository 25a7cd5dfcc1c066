//! Error types for the dashboard core.

use dctop_common::types::ContainerId;
use thiserror::Error;

/// Errors surfaced by the rendering pipeline and its tasks.
#[derive(Debug, Error)]
pub enum TuiError {
    /// Talking to the terminal failed.
    #[error("terminal error: {source}")]
    Terminal {
        /// Underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A row could not be rendered because its stats are unavailable
    /// this frame. Transient; the row is struck through instead.
    #[error("no stats available for container {id}")]
    MissingStats {
        /// Container whose stats are missing.
        id: ContainerId,
    },

    /// A task's channel peer went away.
    #[error("channel closed: {channel}")]
    ChannelClosed {
        /// Which channel closed.
        channel: &'static str,
    },
}

/// Convenience alias for the dashboard core.
pub type Result<T> = std::result::Result<T, TuiError>;
