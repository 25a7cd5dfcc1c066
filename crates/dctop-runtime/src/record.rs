//! Per-container records: identity, cached resource counters, and
//! inspection metadata.
//!
//! Records are owned by a [`crate::collection::ContainerCollection`] and
//! replaced wholesale on every refresh cycle; nothing outside the
//! collection mutates individual fields.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use dctop_common::types::ContainerId;
use serde::{Deserialize, Serialize};

/// Cumulative CPU counters at one sample point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuCounters {
    /// Total CPU time consumed by the container, in nanoseconds.
    pub container_usage: i64,
    /// Total CPU time consumed by the host, in nanoseconds.
    pub system_usage: i64,
}

/// Memory counters at one sample point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryCounters {
    /// Bytes currently in use.
    pub usage: i64,
    /// Byte ceiling imposed on the container.
    pub limit: i64,
}

/// Cumulative counters for one network interface, with the time the
/// sample was taken so callers can derive rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkCounters {
    /// Bytes received.
    pub rx_bytes: i64,
    /// Packets received.
    pub rx_packets: i64,
    /// Receive errors.
    pub rx_errors: i64,
    /// Inbound packets dropped.
    pub rx_dropped: i64,
    /// Bytes transmitted.
    pub tx_bytes: i64,
    /// Packets transmitted.
    pub tx_packets: i64,
    /// Transmit errors.
    pub tx_errors: i64,
    /// Outbound packets dropped.
    pub tx_dropped: i64,
    /// When this sample was taken.
    pub sampled_at: DateTime<Utc>,
}

impl NetworkCounters {
    /// Returns the counters as `(metric name, value)` pairs in stable
    /// alphabetical order, the order the inspect screen lists them in.
    #[must_use]
    pub fn metrics(&self) -> [(&'static str, i64); 8] {
        [
            ("rx_bytes", self.rx_bytes),
            ("rx_dropped", self.rx_dropped),
            ("rx_errors", self.rx_errors),
            ("rx_packets", self.rx_packets),
            ("tx_bytes", self.tx_bytes),
            ("tx_dropped", self.tx_dropped),
            ("tx_errors", self.tx_errors),
            ("tx_packets", self.tx_packets),
        ]
    }
}

impl Default for NetworkCounters {
    fn default() -> Self {
        Self {
            rx_bytes: 0,
            rx_packets: 0,
            rx_errors: 0,
            rx_dropped: 0,
            tx_bytes: 0,
            tx_packets: 0,
            tx_errors: 0,
            tx_dropped: 0,
            sampled_at: Utc::now(),
        }
    }
}

/// One point-in-time reading of a container's resource counters, as
/// returned by the runtime collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSample {
    /// CPU counters.
    pub cpu: CpuCounters,
    /// Memory counters.
    pub memory: MemoryCounters,
    /// Counters keyed by interface name.
    pub network: BTreeMap<String, NetworkCounters>,
}

/// The most recent and previous resource counters for a container.
///
/// Percentages and rates are always derived from the `current`/`previous`
/// pair; a record that has only ever seen one sample holds identical
/// pairs, which the stats calculator treats as "undefined".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedStats {
    /// Latest CPU counters.
    pub cpu: CpuCounters,
    /// CPU counters from the previous cycle.
    pub precpu: CpuCounters,
    /// Latest memory counters.
    pub memory: MemoryCounters,
    /// Latest per-interface network counters.
    pub network: BTreeMap<String, NetworkCounters>,
    /// Per-interface network counters from the previous cycle.
    pub prenetwork: BTreeMap<String, NetworkCounters>,
}

impl CachedStats {
    /// Builds cached stats from a first sample; previous counters start
    /// equal to current, so derived rates stay undefined until the next
    /// cycle.
    #[must_use]
    pub fn from_first_sample(sample: StatsSample) -> Self {
        Self {
            cpu: sample.cpu,
            precpu: sample.cpu,
            memory: sample.memory,
            prenetwork: sample.network.clone(),
            network: sample.network,
        }
    }

    /// Advances to a new sample: current counters become previous, the
    /// sample becomes current.
    pub fn advance(&mut self, sample: StatsSample) {
        self.precpu = self.cpu;
        self.cpu = sample.cpu;
        self.memory = sample.memory;
        self.prenetwork = std::mem::replace(&mut self.network, sample.network);
    }
}

/// A published port binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    /// Port and protocol inside the container, e.g. `80/tcp`.
    pub container_port: String,
    /// Host port it is bound to.
    pub host_port: String,
}

/// A filesystem mount attached to a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountPoint {
    /// Mount type, e.g. `volume` or `bind`.
    pub kind: String,
    /// Volume name, empty for anonymous binds.
    pub name: String,
    /// Source path or volume source.
    pub source: String,
    /// Destination path inside the container.
    pub destination: String,
    /// Mount mode string.
    pub mode: String,
    /// Volume driver.
    pub driver: String,
    /// Whether the mount is writable.
    pub read_write: bool,
}

/// Detailed inspection metadata fetched once per listing cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectInfo {
    /// How many times the runtime restarted this container.
    pub restart_count: u32,
    /// CPU quota in nanoseconds per second, `0` when unset.
    pub cpu_quota_nanos: i64,
    /// Memory quota in bytes, `0` when unset.
    pub memory_quota_bytes: i64,
    /// Published port bindings.
    pub ports: Vec<PortBinding>,
    /// Attached mounts.
    pub mounts: Vec<MountPoint>,
}

/// One container's identity, cached stats, and inspect metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    id: ContainerId,
    name: String,
    image: String,
    state: String,
    stats: Option<CachedStats>,
    inspect: InspectInfo,
    deleted: bool,
}

impl ContainerRecord {
    /// Creates a record from a fresh listing.
    #[must_use]
    pub fn new(
        id: ContainerId,
        name: impl Into<String>,
        image: impl Into<String>,
        state: impl Into<String>,
        stats: Option<CachedStats>,
        inspect: InspectInfo,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            image: image.into(),
            state: state.into(),
            stats,
            inspect,
            deleted: false,
        }
    }

    /// Container identity; immutable for the record's lifetime.
    #[must_use]
    pub fn id(&self) -> &ContainerId {
        &self.id
    }

    /// Container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Image reference.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Free-form runtime state string.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Most recent and previous resource counters, if any sample has
    /// been obtained. `None` means the row cannot be rendered this frame.
    #[must_use]
    pub fn cached_stats(&self) -> Option<&CachedStats> {
        self.stats.as_ref()
    }

    /// Detailed inspection metadata.
    #[must_use]
    pub fn inspect_info(&self) -> &InspectInfo {
        &self.inspect
    }

    /// Whether this container has been observed as deleted. Sticky.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Marks the record deleted. The flag never clears.
    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    /// Applies a stats-only refresh outcome to this record.
    ///
    /// A missing sample means the runtime no longer reports the
    /// container; the record is marked deleted.
    pub fn apply_sample(&mut self, sample: Option<StatsSample>) {
        match sample {
            Some(sample) => match &mut self.stats {
                Some(stats) => stats.advance(sample),
                None => self.stats = Some(CachedStats::from_first_sample(sample)),
            },
            None => self.mark_deleted(),
        }
    }

    /// Carries the previous snapshot's counters into this record so the
    /// first frame after a full re-list still shows rates.
    pub fn inherit_previous(&mut self, old: &Self) {
        if old.deleted {
            self.deleted = true;
        }
        if let (Some(stats), Some(old_stats)) = (&mut self.stats, &old.stats) {
            stats.precpu = old_stats.cpu;
            stats.prenetwork = old_stats.network.clone();
        }
    }
}
