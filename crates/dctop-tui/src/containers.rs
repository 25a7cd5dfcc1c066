//! The containers window: the owner loop that serializes every mutation
//! of the table state, and the handle the outside world drives it with.
//!
//! All input — keyboard, mouse, resizes, refreshed data, render-failure
//! reports, shutdown — arrives on one event queue. The loop applies each
//! event to the state, forwards side effects, and ships a fresh snapshot
//! to the draw task, so no other task ever holds a mutable reference to
//! the state.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyEvent, MouseEvent};
use dctop_common::types::{ContainerId, SortKey};
use dctop_runtime::client::ContainerRuntime;
use dctop_runtime::collection::ContainerCollection;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::draw::DrawTask;
use crate::notify::{Notification, ViewMessage};
use crate::refresh::RefreshTask;
use crate::screen::Screen;
use crate::state::{TableState, UiAction};
use crate::window::Bounds;

/// Everything that can happen to the window, serialized through one
/// queue.
#[derive(Debug, Clone)]
pub enum WindowEvent {
    /// The window geometry changed.
    Resize(Bounds),
    /// The refresh task produced a new collection.
    NewData(ContainerCollection),
    /// A mouse event from the terminal.
    Mouse(MouseEvent),
    /// A key press from the terminal.
    Key(KeyEvent),
    /// The draw task failed to render these rows.
    RenderFailed(Vec<ContainerId>),
    /// Shut the window down.
    Stop,
}

/// Sender half used by the terminal event pump and the view layer.
#[derive(Debug, Clone)]
pub struct WindowHandle {
    events: mpsc::UnboundedSender<WindowEvent>,
    cancel: CancellationToken,
}

impl WindowHandle {
    /// Reports a terminal resize.
    pub fn resize(&self, bounds: Bounds) {
        let _ = self.events.send(WindowEvent::Resize(bounds));
    }

    /// Forwards a key press.
    pub fn key(&self, event: KeyEvent) {
        let _ = self.events.send(WindowEvent::Key(event));
    }

    /// Forwards a mouse event.
    pub fn mouse(&self, event: MouseEvent) {
        let _ = self.events.send(WindowEvent::Mouse(event));
    }

    /// Injects a collection directly, bypassing the refresh task.
    pub fn new_data(&self, containers: ContainerCollection) {
        let _ = self.events.send(WindowEvent::NewData(containers));
    }

    /// Requests shutdown and wakes every task.
    pub fn stop(&self) {
        let _ = self.events.send(WindowEvent::Stop);
        self.cancel.cancel();
    }

    /// Completes when the window has begun shutting down.
    pub async fn stopped(&self) {
        self.cancel.cancelled().await;
    }
}

/// The owner task of one containers window.
pub struct ContainersWindow {
    runtime: Arc<dyn ContainerRuntime>,
    state: TableState,
    events: mpsc::UnboundedReceiver<WindowEvent>,
    refresh_requests: mpsc::Sender<ContainerCollection>,
    snapshots: mpsc::UnboundedSender<TableState>,
    notifications: mpsc::UnboundedSender<Notification>,
    view_messages: mpsc::UnboundedSender<ViewMessage>,
    cancel: CancellationToken,
    refresh: Option<RefreshTask>,
    draw: Option<DrawTask>,
}

impl ContainersWindow {
    /// Wires up the window, its refresh and draw tasks, and its handle.
    ///
    /// Nothing runs until [`Self::run`] is awaited; the returned
    /// receiver yields navigation requests for the surrounding view
    /// layer.
    #[must_use]
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        screen: Box<dyn Screen>,
        bounds: Bounds,
        sort: (SortKey, SortKey),
        refresh_interval: Duration,
    ) -> (Self, WindowHandle, mpsc::UnboundedReceiver<ViewMessage>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (request_tx, request_rx) = mpsc::channel(1);
        let (snapshot_tx, snapshot_rx) = mpsc::unbounded_channel();
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let refresh = RefreshTask::new(
            Arc::clone(&runtime),
            request_rx,
            event_tx.clone(),
            cancel.clone(),
            refresh_interval,
        );
        let draw = DrawTask::new(
            screen,
            snapshot_rx,
            event_tx.clone(),
            notify_rx,
            cancel.clone(),
        );

        let window = Self {
            runtime,
            state: TableState::new(bounds, sort.0, sort.1),
            events: event_rx,
            refresh_requests: request_tx,
            snapshots: snapshot_tx,
            notifications: notify_tx,
            view_messages: view_tx,
            cancel: cancel.clone(),
            refresh: Some(refresh),
            draw: Some(draw),
        };
        let handle = WindowHandle {
            events: event_tx,
            cancel,
        };
        (window, handle, view_rx)
    }

    /// Runs the owner loop until a [`WindowEvent::Stop`] arrives or the
    /// event queue closes.
    pub async fn run(mut self) {
        if let Some(refresh) = self.refresh.take() {
            let _ = tokio::spawn(refresh.run());
        }
        if let Some(draw) = self.draw.take() {
            let _ = tokio::spawn(draw.run());
        }

        // Seed the first refresh cycle and paint the empty frame.
        let _ = self.refresh_requests.try_send(ContainerCollection::default());
        let _ = self.snapshots.send(self.state.clone());

        while let Some(event) = self.events.recv().await {
            match event {
                WindowEvent::Resize(bounds) => self.state.handle_resize(bounds),
                WindowEvent::NewData(containers) => {
                    self.state.handle_new_data(containers);
                    // Hand the refreshed collection straight back as the
                    // baseline for the next cycle. A full slot means a
                    // request is already pending.
                    let _ = self
                        .refresh_requests
                        .try_send(self.state.containers().clone());
                }
                WindowEvent::Mouse(event) => self.state.handle_mouse(&event),
                WindowEvent::Key(event) => {
                    let actions = self.state.handle_key(&event);
                    for action in actions {
                        self.perform(action);
                    }
                }
                WindowEvent::RenderFailed(ids) => self.state.handle_render_failures(&ids),
                WindowEvent::Stop => break,
            }
            if self.snapshots.send(self.state.clone()).is_err() {
                break;
            }
        }
        self.cancel.cancel();
        info!("containers window stopped");
    }

    fn perform(&mut self, action: UiAction) {
        match action {
            UiAction::Delete(id) => {
                let runtime = Arc::clone(&self.runtime);
                let notifications = self.notifications.clone();
                let _ = tokio::spawn(delete_container(runtime, id, notifications));
            }
            UiAction::ShowLogs(id) => {
                let _ = self.view_messages.send(ViewMessage::ShowLogs(id));
            }
            UiAction::ShowShell(id) => {
                let _ = self.view_messages.send(ViewMessage::ShowShell(id));
            }
            UiAction::Notify(note) => {
                let _ = self.notifications.send(note);
            }
            UiAction::SwitchToDefault => {
                let _ = self.view_messages.send(ViewMessage::SwitchToDefault);
            }
        }
    }
}

/// Fire-and-forget container removal.
///
/// Races with the refresh cycle are expected: a removal that is already
/// in progress, or a container that vanished before the request landed,
/// is logged and swallowed rather than surfaced to the user.
pub async fn delete_container(
    runtime: Arc<dyn ContainerRuntime>,
    id: ContainerId,
    notifications: mpsc::UnboundedSender<Notification>,
) {
    match runtime.delete(&id).await {
        Ok(()) => {
            info!(id = %id, "container removal requested");
            let _ = notifications.send(Notification::info(format!("Removing {}", id.short())));
        }
        Err(err) if err.is_benign_delete_failure() => {
            debug!(id = %id, error = %err, "benign delete failure");
        }
        Err(err) => match runtime.exists(&id).await {
            Ok(false) => debug!(id = %id, "container already gone"),
            _ => {
                error!(id = %id, error = %err, "container removal failed");
                let _ = notifications.send(Notification::error(format!(
                    "Failed to remove {}: {err}",
                    id.short()
                )));
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dctop_runtime::sample::SampleRuntime;

    #[tokio::test]
    async fn delete_swallows_benign_races() {
        let runtime = Arc::new(SampleRuntime::new(2));
        let ids = runtime.list_ids().await.expect("ids");
        let (notify_tx, mut notify_rx) = mpsc::unbounded_channel();

        delete_container(runtime.clone(), ids[0].clone(), notify_tx.clone()).await;
        let note = notify_rx.recv().await.expect("notification");
        assert!(note.text.starts_with("Removing"));

        // The second attempt races with the first and stays quiet.
        delete_container(runtime.clone(), ids[0].clone(), notify_tx).await;
        assert!(notify_rx.try_recv().is_err());
        assert_eq!(runtime.delete_calls().len(), 2);
    }
}
