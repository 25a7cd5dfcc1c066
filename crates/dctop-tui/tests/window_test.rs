//! End-to-end tests for the containers window: a real owner loop with
//! its refresh and draw tasks, fed by the synthetic runtime and painting
//! into an in-memory screen.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dctop_common::types::{ContainerId, SortKey};
use dctop_runtime::client::ContainerRuntime;
use dctop_runtime::collection::ContainerCollection;
use dctop_runtime::record::{ContainerRecord, InspectInfo};
use dctop_runtime::sample::SampleRuntime;
use dctop_tui::containers::{ContainersWindow, WindowHandle};
use dctop_tui::screen::{Screen, TestScreen};
use dctop_tui::style::Color;
use dctop_tui::window::Bounds;

/// A refresh interval long enough that only the seeded first cycle ever
/// runs; tests inject further data themselves.
const NO_MORE_REFRESHES: Duration = Duration::from_secs(3600);

fn start(count: usize, screen: &TestScreen) -> (Arc<SampleRuntime>, WindowHandle) {
    let runtime = Arc::new(SampleRuntime::new(count));
    let (columns, rows) = screen.size();
    let (window, handle, _view_messages) = ContainersWindow::new(
        runtime.clone(),
        Box::new(screen.clone()),
        Bounds::from_screen(columns, rows),
        (SortKey::None, SortKey::None),
        NO_MORE_REFRESHES,
    );
    drop(tokio::spawn(window.run()));
    (runtime, handle)
}

async fn eventually(what: &str, check: impl Fn() -> bool) {
    for _ in 0..500 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn synthetic_collection(prefix: &str, count: usize) -> ContainerCollection {
    let records = (0..count)
        .map(|i| {
            ContainerRecord::new(
                ContainerId::new(format!("{prefix}{i:0>12}")),
                format!("{prefix}-{i}"),
                format!("{prefix}-image:{i}"),
                "running",
                None,
                InspectInfo::default(),
            )
        })
        .collect();
    ContainerCollection::new(records)
}

#[tokio::test]
async fn dashboard_lists_the_runtime_containers() {
    let screen = TestScreen::new(100, 30);
    let (_runtime, handle) = start(5, &screen);

    eventually("first frame with container rows", || {
        screen.contains_text("web-1") && screen.contains_text("nginx:1.27")
    })
    .await;
    // The header and its rule are above the rows.
    assert!(screen.row_text(1).contains("ID"));
    assert!(screen.row_text(1).contains("Memory"));

    handle.stop();
    handle.stopped().await;
}

#[tokio::test]
async fn vanished_focus_falls_back_to_the_table() {
    let screen = TestScreen::new(100, 30);
    let (_runtime, handle) = start(3, &screen);
    eventually("initial rows", || screen.contains_text("web-1")).await;

    handle.key(key(KeyCode::Down));
    handle.key(key(KeyCode::Char('i')));
    eventually("inspect screen", || screen.contains_text("Restarts:")).await;

    // A collection that no longer contains the focused container.
    handle.new_data(synthetic_collection("other", 3));
    eventually("table restored with new rows", || {
        screen.contains_text("other-0") && !screen.contains_text("Restarts:")
    })
    .await;

    handle.stop();
    handle.stopped().await;
}

#[tokio::test]
async fn deleting_the_last_row_refocuses_the_previous_one() {
    let screen = TestScreen::new(100, 30);
    let (runtime, handle) = start(5, &screen);
    eventually("initial rows", || screen.contains_text("worker-1")).await;

    handle.key(key(KeyCode::Char('G')));
    handle.key(key(KeyCode::Delete));

    let ids = runtime.list_ids().await.expect("ids");
    eventually("delete call for the last row", || {
        runtime.delete_calls().last() == ids.last()
    })
    .await;

    // Focus moved up to the fourth row (window-relative y = 3 + 3).
    eventually("focus highlight on the previous row", || {
        screen.cell_at(1, 6).1.bg == Some(Color::DarkBlue)
    })
    .await;

    handle.stop();
    handle.stopped().await;
}

#[tokio::test]
async fn stats_less_rows_are_struck_through_from_their_last_frame() {
    let screen = TestScreen::new(100, 30);
    let (runtime, handle) = start(3, &screen);
    eventually("initial rows", || screen.contains_text("web-1")).await;

    // Re-send the same fleet with the first row's stats missing; the
    // draw task falls back to the cached frame, struck through.
    let mut listed = runtime.list_containers().await.expect("listing");
    let first = listed.get(0).expect("record").clone();
    let stripped = ContainerRecord::new(
        first.id().clone(),
        first.name(),
        first.image(),
        first.state(),
        None,
        first.inspect_info().clone(),
    );
    let mut records: Vec<ContainerRecord> = listed.records().to_vec();
    records[0] = stripped;
    listed = ContainerCollection::new(records);
    handle.new_data(listed);

    eventually("strike-through on the first row", || {
        screen.cell_at(2, 3).0 == '-' && screen.cell_at(4, 3).0 == '-'
    })
    .await;
    // Other rows are untouched.
    assert!(screen.contains_text("db-1"));

    handle.stop();
    handle.stopped().await;
}

#[tokio::test]
async fn search_filter_keeps_cached_frames_for_hidden_rows() {
    let screen = TestScreen::new(100, 30);
    let (runtime, handle) = start(3, &screen);
    eventually("initial rows", || screen.contains_text("web-1")).await;

    // Hide web-1 behind a filter, then strip its stats while it is
    // off-screen.
    handle.key(key(KeyCode::Char('/')));
    for ch in "db".chars() {
        handle.key(key(KeyCode::Char(ch)));
    }
    eventually("filtered view", || !screen.contains_text("web-1")).await;

    let listed = runtime.list_containers().await.expect("listing");
    let first = listed.get(0).expect("record").clone();
    let stripped = ContainerRecord::new(
        first.id().clone(),
        first.name(),
        first.image(),
        first.state(),
        None,
        first.inspect_info().clone(),
    );
    let mut records: Vec<ContainerRecord> = listed.records().to_vec();
    records[0] = stripped;
    handle.new_data(ContainerCollection::new(records));

    // Clearing the filter brings the row back; it must strike through
    // its last full frame, stats columns included, rather than degrade
    // to a bare identity row.
    handle.key(key(KeyCode::Esc));
    eventually("struck-through stats cells on the first row", || {
        screen.cell_at(2, 3).0 == '-' && screen.cell_at(50, 3).0 == '-'
    })
    .await;

    handle.stop();
    handle.stopped().await;
}

#[tokio::test]
async fn searching_filters_the_table_live() {
    let screen = TestScreen::new(100, 30);
    let (_runtime, handle) = start(5, &screen);
    eventually("initial rows", || screen.contains_text("postgres:16")).await;

    handle.key(key(KeyCode::Char('/')));
    for ch in "web".chars() {
        handle.key(key(KeyCode::Char(ch)));
    }
    eventually("filtered view", || {
        screen.contains_text("/web") && !screen.contains_text("postgres:16")
    })
    .await;
    assert!(screen.contains_text("web-1"));

    handle.stop();
    handle.stopped().await;
}
