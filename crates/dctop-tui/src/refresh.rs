//! The background refresh task.
//!
//! The owner loop sends its current collection here as a request; the
//! task talks to the container runtime and answers with a refreshed
//! collection as a [`WindowEvent::NewData`]. The request channel is
//! bounded to one slot, so at most one refresh cycle is ever in flight
//! and a slow runtime can never queue up stale work.

use std::sync::Arc;
use std::time::Duration;

use dctop_common::error::Result;
use dctop_runtime::client::ContainerRuntime;
use dctop_runtime::collection::ContainerCollection;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::containers::WindowEvent;

/// Polls the runtime on request and reports refreshed collections back
/// to the owner loop.
pub struct RefreshTask {
    runtime: Arc<dyn ContainerRuntime>,
    requests: mpsc::Receiver<ContainerCollection>,
    events: mpsc::UnboundedSender<WindowEvent>,
    cancel: CancellationToken,
    interval: Duration,
    warmed_up: bool,
}

impl RefreshTask {
    /// Creates a refresh task.
    ///
    /// Polling is continuous: each cycle starts as soon as the owner
    /// loop requests it, so the only gate is the round trip of the
    /// previous cycle. A non-zero `interval` adds optional pacing to
    /// every cycle after the first.
    #[must_use]
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        requests: mpsc::Receiver<ContainerCollection>,
        events: mpsc::UnboundedSender<WindowEvent>,
        cancel: CancellationToken,
        interval: Duration,
    ) -> Self {
        Self {
            runtime,
            requests,
            events,
            cancel,
            interval,
            warmed_up: false,
        }
    }

    /// Runs until cancelled or until either channel closes.
    pub async fn run(mut self) {
        loop {
            let previous = tokio::select! {
                () = self.cancel.cancelled() => break,
                request = self.requests.recv() => match request {
                    Some(previous) => previous,
                    None => break,
                },
            };
            if self.warmed_up && !self.interval.is_zero() {
                tokio::select! {
                    () = self.cancel.cancelled() => break,
                    () = tokio::time::sleep(self.interval) => {}
                }
            }
            self.warmed_up = true;
            let refreshed = self.refresh(previous).await;
            if self.cancel.is_cancelled() {
                break;
            }
            if self.events.send(WindowEvent::NewData(refreshed)).is_err() {
                break;
            }
        }
        debug!("refresh task stopped");
    }

    /// One refresh cycle. A failure keeps the previous collection so
    /// polling continues on the next request.
    async fn refresh(&self, previous: ContainerCollection) -> ContainerCollection {
        match self.try_refresh(&previous).await {
            Ok(next) => next,
            Err(err) => {
                warn!(error = %err, "refresh cycle failed, keeping previous data");
                previous
            }
        }
    }

    /// Cheap stats-only refresh when membership is unchanged, full
    /// re-list otherwise.
    async fn try_refresh(&self, previous: &ContainerCollection) -> Result<ContainerCollection> {
        let ids = self.runtime.list_ids().await?;
        if previous.same_ids(&ids) {
            let samples = self.runtime.fetch_stats(&ids).await?;
            let mut next = previous.clone();
            next.advance_stats(samples);
            Ok(next)
        } else {
            debug!(
                previous = previous.len(),
                current = ids.len(),
                "membership changed, re-listing containers"
            );
            let mut next = self.runtime.list_containers().await?;
            next.adopt_previous(previous);
            Ok(next)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dctop_runtime::sample::SampleRuntime;

    fn harness(
        runtime: Arc<dyn ContainerRuntime>,
    ) -> (
        mpsc::Sender<ContainerCollection>,
        mpsc::UnboundedReceiver<WindowEvent>,
        CancellationToken,
    ) {
        let (request_tx, request_rx) = mpsc::channel(1);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = RefreshTask::new(
            runtime,
            request_rx,
            event_tx,
            cancel.clone(),
            Duration::ZERO,
        );
        tokio::spawn(task.run());
        (request_tx, event_rx, cancel)
    }

    #[tokio::test]
    async fn first_request_produces_a_full_listing() {
        let (requests, mut events, cancel) = harness(Arc::new(SampleRuntime::new(4)));
        requests
            .send(ContainerCollection::default())
            .await
            .expect("send");
        match events.recv().await.expect("event") {
            WindowEvent::NewData(collection) => assert_eq!(collection.len(), 4),
            other => panic!("unexpected event: {other:?}"),
        }
        cancel.cancel();
    }

    #[tokio::test]
    async fn unchanged_membership_advances_stats_in_place() {
        let runtime = Arc::new(SampleRuntime::new(3));
        let (requests, mut events, cancel) = harness(runtime);
        requests
            .send(ContainerCollection::default())
            .await
            .expect("send");
        let first = match events.recv().await.expect("event") {
            WindowEvent::NewData(collection) => collection,
            other => panic!("unexpected event: {other:?}"),
        };

        requests.send(first.clone()).await.expect("send");
        let second = match events.recv().await.expect("event") {
            WindowEvent::NewData(collection) => collection,
            other => panic!("unexpected event: {other:?}"),
        };
        assert!(second.same_ids(&first.ids()));
        // The second cycle advanced counters, so rates become defined.
        let stats = second.get(0).expect("record").cached_stats().expect("stats");
        assert_ne!(stats.cpu, stats.precpu);
        cancel.cancel();
    }

    #[tokio::test]
    async fn zero_interval_serves_cycles_back_to_back() {
        let (requests, mut events, cancel) = harness(Arc::new(SampleRuntime::new(2)));
        let mut previous = ContainerCollection::default();
        for _ in 0..3 {
            requests.send(previous).await.expect("send");
            let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
                .await
                .expect("unpaced cycle")
                .expect("event");
            previous = match event {
                WindowEvent::NewData(collection) => collection,
                other => panic!("unexpected event: {other:?}"),
            };
        }
        assert_eq!(previous.len(), 2);
        cancel.cancel();
    }

    #[tokio::test]
    async fn missing_sample_marks_the_record_deleted() {
        let runtime = Arc::new(SampleRuntime::new(2));
        let (requests, mut events, cancel) = harness(runtime.clone());
        requests
            .send(ContainerCollection::default())
            .await
            .expect("send");
        let first = match events.recv().await.expect("event") {
            WindowEvent::NewData(collection) => collection,
            other => panic!("unexpected event: {other:?}"),
        };

        let victim = first.get(0).expect("record").id().clone();
        runtime.fail_stats_for(&victim);
        requests.send(first.clone()).await.expect("send");
        match events.recv().await.expect("event") {
            WindowEvent::NewData(second) => {
                assert_eq!(second.ids(), first.ids());
                assert!(second.get(0).expect("record").is_deleted());
                assert!(!second.get(1).expect("record").is_deleted());
            }
            other => panic!("unexpected event: {other:?}"),
        }
        cancel.cancel();
    }
}
