//! Domain primitive types used across the dctop workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a container instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerId(String);

impl ContainerId {
    /// Creates a new container ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the shortened form used in table cells.
    #[must_use]
    pub fn short(&self) -> &str {
        let end = self
            .0
            .len()
            .min(crate::constants::SHORT_ID_LENGTH);
        &self.0[..end]
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Column a container table can be ordered by.
///
/// Sorting always uses a `{primary, secondary}` pair of these keys;
/// ties on the primary key fall through to the secondary key, and
/// remaining ties keep their original stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// No ordering contribution from this key.
    #[default]
    None,
    /// Container runtime state string.
    State,
    /// Container name.
    Name,
    /// Image reference.
    Image,
    /// Memory usage (largest first).
    Memory,
    /// CPU usage over the last sample interval (largest first).
    Cpu,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::State => write!(f, "state"),
            Self::Name => write!(f, "name"),
            Self::Image => write!(f, "image"),
            Self::Memory => write!(f, "memory"),
            Self::Cpu => write!(f, "cpu"),
        }
    }
}
