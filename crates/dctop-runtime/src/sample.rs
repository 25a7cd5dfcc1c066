//! Deterministic synthetic runtime for demo mode and tests.
//!
//! Seeds a fixed fleet of containers whose counters drift on every
//! sampling call, records delete requests, and honours them in later
//! listings — enough behavior to exercise every dashboard path without a
//! daemon.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use dctop_common::error::{DctopError, Result};
use dctop_common::types::ContainerId;

use crate::client::ContainerRuntime;
use crate::collection::ContainerCollection;
use crate::record::{
    CachedStats, ContainerRecord, CpuCounters, InspectInfo, MemoryCounters, MountPoint,
    NetworkCounters, PortBinding, StatsSample,
};

const NAMES: [&str; 8] = [
    "web", "db", "cache", "queue", "worker", "proxy", "auth", "metrics",
];
const IMAGES: [&str; 8] = [
    "nginx:1.27",
    "postgres:16",
    "redis:7",
    "rabbitmq:3.13",
    "busybox:1.36",
    "haproxy:2.9",
    "keycloak:24",
    "prom/prometheus:v2.53",
];

const MIB: i64 = 1 << 20;
const GIB: i64 = 1 << 30;

#[derive(Debug, Clone)]
struct SampleContainer {
    id: ContainerId,
    name: String,
    image: String,
    state: String,
    inspect: InspectInfo,
    gone: bool,
}

#[derive(Debug, Default)]
struct SampleState {
    tick: i64,
    containers: Vec<SampleContainer>,
    delete_calls: Vec<ContainerId>,
    failing_stats: BTreeSet<ContainerId>,
}

/// A self-contained [`ContainerRuntime`] with synthetic, drifting data.
#[derive(Debug)]
pub struct SampleRuntime {
    state: Mutex<SampleState>,
}

impl SampleRuntime {
    /// Seeds a runtime with `count` synthetic containers.
    #[must_use]
    pub fn new(count: usize) -> Self {
        let containers = (0..count)
            .map(|i| {
                let name = format!("{}-{}", NAMES[i % NAMES.len()], i / NAMES.len() + 1);
                SampleContainer {
                    id: ContainerId::new(uuid::Uuid::new_v4().simple().to_string()),
                    image: IMAGES[i % IMAGES.len()].to_owned(),
                    state: if i % 5 == 4 { "exited" } else { "running" }.to_owned(),
                    inspect: seed_inspect(i, &name),
                    name,
                    gone: false,
                }
            })
            .collect();
        Self {
            state: Mutex::new(SampleState {
                tick: 1,
                containers,
                delete_calls: Vec::new(),
                failing_stats: BTreeSet::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SampleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ids whose deletion has been requested, in call order.
    #[must_use]
    pub fn delete_calls(&self) -> Vec<ContainerId> {
        self.lock().delete_calls.clone()
    }

    /// Makes stats sampling omit the given container until cleared,
    /// simulating a transient per-row stat failure.
    pub fn fail_stats_for(&self, id: &ContainerId) {
        let _ = self.lock().failing_stats.insert(id.clone());
    }

    /// Clears a previous [`Self::fail_stats_for`].
    pub fn restore_stats_for(&self, id: &ContainerId) {
        let _ = self.lock().failing_stats.remove(id);
    }
}

fn seed_inspect(index: usize, name: &str) -> InspectInfo {
    let port = 8000 + u32::try_from(index).unwrap_or(0);
    InspectInfo {
        restart_count: u32::try_from(index % 3).unwrap_or(0),
        cpu_quota_nanos: if index % 2 == 0 { 2_000_000_000 } else { 0 },
        memory_quota_bytes: if index % 3 == 0 { 2 * GIB } else { 0 },
        ports: vec![PortBinding {
            container_port: "80/tcp".to_owned(),
            host_port: port.to_string(),
        }],
        mounts: vec![MountPoint {
            kind: "volume".to_owned(),
            name: format!("{name}-data"),
            source: format!("/var/lib/volumes/{name}-data"),
            destination: "/data".to_owned(),
            mode: "z".to_owned(),
            driver: "local".to_owned(),
            read_write: true,
        }],
    }
}

/// Deterministic counters for container `index` at a given tick.
fn sample_at(tick: i64, index: i64) -> StatsSample {
    let now = Utc::now();
    let weight = index + 2;
    let mut network = BTreeMap::new();
    let _ = network.insert(
        "eth0".to_owned(),
        NetworkCounters {
            rx_bytes: tick * weight * 4096,
            rx_packets: tick * weight * 3,
            rx_errors: 0,
            rx_dropped: tick % 2,
            tx_bytes: tick * weight * 1024,
            tx_packets: tick * weight,
            tx_errors: 0,
            tx_dropped: 0,
            sampled_at: now,
        },
    );
    StatsSample {
        cpu: CpuCounters {
            container_usage: tick * weight * 5_000_000,
            system_usage: tick * 640_000_000,
        },
        memory: MemoryCounters {
            usage: (64 + weight * 10 + (tick * weight) % 48) * MIB,
            limit: GIB,
        },
        network,
    }
}

#[async_trait]
impl ContainerRuntime for SampleRuntime {
    async fn list_containers(&self) -> Result<ContainerCollection> {
        let mut state = self.lock();
        state.tick += 1;
        let tick = state.tick;
        let records = state
            .containers
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.gone)
            .map(|(i, c)| {
                let stats = if state.failing_stats.contains(&c.id) {
                    None
                } else {
                    Some(CachedStats::from_first_sample(sample_at(
                        tick,
                        i64::try_from(i).unwrap_or(0),
                    )))
                };
                ContainerRecord::new(
                    c.id.clone(),
                    c.name.clone(),
                    c.image.clone(),
                    c.state.clone(),
                    stats,
                    c.inspect.clone(),
                )
            })
            .collect();
        Ok(ContainerCollection::new(records))
    }

    async fn list_ids(&self) -> Result<Vec<ContainerId>> {
        let state = self.lock();
        Ok(state
            .containers
            .iter()
            .filter(|c| !c.gone)
            .map(|c| c.id.clone())
            .collect())
    }

    async fn fetch_stats(
        &self,
        ids: &[ContainerId],
    ) -> Result<HashMap<ContainerId, StatsSample>> {
        let mut state = self.lock();
        state.tick += 1;
        let tick = state.tick;
        let mut samples = HashMap::new();
        for id in ids {
            let known = state
                .containers
                .iter()
                .position(|c| &c.id == id && !c.gone);
            if let Some(index) = known {
                if !state.failing_stats.contains(id) {
                    let _ = samples.insert(
                        id.clone(),
                        sample_at(tick, i64::try_from(index).unwrap_or(0)),
                    );
                }
            }
        }
        Ok(samples)
    }

    async fn inspect(&self, id: &ContainerId) -> Result<InspectInfo> {
        let state = self.lock();
        state
            .containers
            .iter()
            .find(|c| &c.id == id && !c.gone)
            .map(|c| c.inspect.clone())
            .ok_or_else(|| DctopError::NotFound {
                kind: "container",
                id: id.to_string(),
            })
    }

    async fn delete(&self, id: &ContainerId) -> Result<()> {
        let mut state = self.lock();
        state.delete_calls.push(id.clone());
        let known = state.containers.iter_mut().find(|c| &c.id == id);
        match known {
            Some(container) if !container.gone => {
                container.gone = true;
                Ok(())
            }
            _ => Err(DctopError::Runtime {
                message: format!("No such container: {id}"),
            }),
        }
    }

    async fn exists(&self, id: &ContainerId) -> Result<bool> {
        let state = self.lock();
        Ok(state.containers.iter().any(|c| &c.id == id && !c.gone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listing_excludes_deleted_containers() {
        let runtime = SampleRuntime::new(4);
        let ids = runtime.list_ids().await.expect("ids");
        assert_eq!(ids.len(), 4);

        runtime.delete(&ids[1]).await.expect("delete");
        let after = runtime.list_ids().await.expect("ids");
        assert_eq!(after.len(), 3);
        assert!(!after.contains(&ids[1]));
        assert_eq!(runtime.delete_calls(), vec![ids[1].clone()]);
    }

    #[tokio::test]
    async fn deleting_twice_reports_a_benign_failure() {
        let runtime = SampleRuntime::new(2);
        let ids = runtime.list_ids().await.expect("ids");
        runtime.delete(&ids[0]).await.expect("first delete");

        let err = runtime.delete(&ids[0]).await.expect_err("second delete");
        assert!(err.is_benign_delete_failure());
    }

    #[tokio::test]
    async fn stats_drift_between_samples() {
        let runtime = SampleRuntime::new(1);
        let ids = runtime.list_ids().await.expect("ids");
        let first = runtime.fetch_stats(&ids).await.expect("stats");
        let second = runtime.fetch_stats(&ids).await.expect("stats");
        let a = first.get(&ids[0]).expect("sample");
        let b = second.get(&ids[0]).expect("sample");
        assert!(b.cpu.container_usage > a.cpu.container_usage);
        assert!(b.cpu.system_usage > a.cpu.system_usage);
    }

    #[tokio::test]
    async fn failing_stats_omits_the_container() {
        let runtime = SampleRuntime::new(2);
        let ids = runtime.list_ids().await.expect("ids");
        runtime.fail_stats_for(&ids[0]);

        let samples = runtime.fetch_stats(&ids).await.expect("stats");
        assert!(!samples.contains_key(&ids[0]));
        assert!(samples.contains_key(&ids[1]));

        runtime.restore_stats_for(&ids[0]);
        let samples = runtime.fetch_stats(&ids).await.expect("stats");
        assert!(samples.contains_key(&ids[0]));
    }
}
