//! Ordered, sortable, filterable collections of container records.
//!
//! Collections are immutable value snapshots from the dashboard's point
//! of view: each refresh cycle produces a new one and the old one is
//! simply superseded, never mutated concurrently.

use std::collections::{BTreeSet, HashMap};

use dctop_common::types::{ContainerId, SortKey};
use serde::{Deserialize, Serialize};

use crate::record::{ContainerRecord, StatsSample};

/// An ordered sequence of [`ContainerRecord`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerCollection {
    records: Vec<ContainerRecord>,
}

impl ContainerCollection {
    /// Creates a collection from records in listing order.
    #[must_use]
    pub fn new(records: Vec<ContainerRecord>) -> Self {
        Self { records }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in current order.
    #[must_use]
    pub fn records(&self) -> &[ContainerRecord] {
        &self.records
    }

    /// Record at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ContainerRecord> {
        self.records.get(index)
    }

    /// Position of the record with the given id.
    #[must_use]
    pub fn index_of(&self, id: &ContainerId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    /// Whether a record with the given id is present.
    #[must_use]
    pub fn contains(&self, id: &ContainerId) -> bool {
        self.index_of(id).is_some()
    }

    /// Ids in current order.
    #[must_use]
    pub fn ids(&self) -> Vec<ContainerId> {
        self.records.iter().map(|r| r.id().clone()).collect()
    }

    /// Compares this collection's identity set against `ids`, ignoring
    /// order. Used by the refresh task to decide between a full re-list
    /// and a cheap stats-only cycle.
    #[must_use]
    pub fn same_ids(&self, ids: &[ContainerId]) -> bool {
        let ours: BTreeSet<&ContainerId> = self.records.iter().map(ContainerRecord::id).collect();
        let theirs: BTreeSet<&ContainerId> = ids.iter().collect();
        ours == theirs
    }

    /// Stable sort by a `{primary, secondary}` key pair.
    ///
    /// Ties on the primary key are broken by the secondary key; remaining
    /// ties keep their original order. String keys sort ascending,
    /// resource keys (memory, CPU) sort largest-first.
    pub fn sort(&mut self, primary: SortKey, secondary: SortKey) {
        self.records.sort_by(|a, b| {
            compare_by_key(a, b, primary).then_with(|| compare_by_key(a, b, secondary))
        });
    }

    /// Returns a copy narrowed to records whose name, image, or id
    /// contains `query` (case-insensitive). The receiver keeps its full
    /// record set; an empty query returns a full copy.
    #[must_use]
    pub fn filtered(&self, query: &str) -> Self {
        if query.is_empty() {
            return self.clone();
        }
        let needle = query.to_lowercase();
        let records = self
            .records
            .iter()
            .filter(|r| {
                r.name().to_lowercase().contains(&needle)
                    || r.image().to_lowercase().contains(&needle)
                    || r.id().as_str().to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        Self { records }
    }

    /// Stats-only refresh: rotates every record's counters forward using
    /// the fetched samples. A record without a sample is marked deleted.
    pub fn advance_stats(&mut self, mut samples: HashMap<ContainerId, StatsSample>) {
        for record in &mut self.records {
            let sample = samples.remove(record.id());
            record.apply_sample(sample);
        }
    }

    /// Full re-list merge: carries still-relevant cached counters and
    /// sticky deleted flags from `old` into this freshly listed snapshot.
    pub fn adopt_previous(&mut self, old: &Self) {
        for record in &mut self.records {
            if let Some(index) = old.index_of(record.id()) {
                record.inherit_previous(&old.records[index]);
            }
        }
    }
}

fn compare_by_key(a: &ContainerRecord, b: &ContainerRecord, key: SortKey) -> std::cmp::Ordering {
    match key {
        SortKey::None => std::cmp::Ordering::Equal,
        SortKey::State => a.state().cmp(b.state()),
        SortKey::Name => a.name().cmp(b.name()),
        SortKey::Image => a.image().cmp(b.image()),
        SortKey::Memory => memory_usage(b).cmp(&memory_usage(a)),
        SortKey::Cpu => cpu_delta(b).cmp(&cpu_delta(a)),
    }
}

fn memory_usage(record: &ContainerRecord) -> i64 {
    record.cached_stats().map_or(0, |s| s.memory.usage)
}

fn cpu_delta(record: &ContainerRecord) -> i64 {
    record
        .cached_stats()
        .map_or(0, |s| s.cpu.container_usage - s.precpu.container_usage)
}
