//! The container-runtime capability consumed by the dashboard.
//!
//! Transport, retries, and daemon protocol live behind this trait; the
//! core only sees collections, samples, and inspect metadata.

use std::collections::HashMap;

use async_trait::async_trait;
use dctop_common::error::Result;
use dctop_common::types::ContainerId;

use crate::collection::ContainerCollection;
use crate::record::{InspectInfo, StatsSample};

/// Operations the dashboard requires from a container runtime.
///
/// Implementations may block for the duration of a daemon round trip;
/// callers isolate that latency on the refresh path so the UI stays
/// responsive on cached data.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Lists all containers as full records with a first stats sample
    /// and inspect metadata attached.
    async fn list_containers(&self) -> Result<ContainerCollection>;

    /// Cheap identity-only listing used to detect membership changes
    /// without paying for a full re-list.
    async fn list_ids(&self) -> Result<Vec<ContainerId>>;

    /// Fetches fresh counters for the given ids. Ids the runtime no
    /// longer knows are simply absent from the result.
    async fn fetch_stats(
        &self,
        ids: &[ContainerId],
    ) -> Result<HashMap<ContainerId, StatsSample>>;

    /// Fetches detailed inspection metadata for one container.
    async fn inspect(&self, id: &ContainerId) -> Result<InspectInfo>;

    /// Requests removal of a container.
    async fn delete(&self, id: &ContainerId) -> Result<()>;

    /// Whether the runtime still knows the given id.
    async fn exists(&self, id: &ContainerId) -> Result<bool>;
}
