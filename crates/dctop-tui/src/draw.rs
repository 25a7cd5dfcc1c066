//! The draw task: turns state snapshots into frames.
//!
//! The task owns the screen outright. It consumes state snapshots in
//! FIFO order, repaints the whole window for each one, and keeps every
//! row's last good frame so a failing row can still be shown struck
//! through instead of vanishing.

use std::collections::HashMap;

use dctop_common::types::ContainerId;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::containers::WindowEvent;
use crate::inspect::build_inspect_lines;
use crate::notify::{Notification, Severity};
use crate::screen::Screen;
use crate::state::{DisplayMode, InputMode, TableState};
use crate::style::{Style, role};
use crate::styler::{
    BoxedStyler, CachedLine, Concat, HORIZONTAL_LINE, RuneRepeater, StrikeThrough, StyledCell,
    Text, TextBox, render_line,
};
use crate::table::{self, RowBuild};
use crate::viewport::scroll_offset;
use crate::window::{Bounds, draw_borders};

/// Renders state snapshots onto the screen until cancelled.
pub struct DrawTask {
    screen: Box<dyn Screen>,
    snapshots: mpsc::UnboundedReceiver<TableState>,
    events: mpsc::UnboundedSender<WindowEvent>,
    notifications: mpsc::UnboundedReceiver<Notification>,
    cancel: CancellationToken,
    row_cache: HashMap<ContainerId, Vec<StyledCell>>,
    status: Option<Notification>,
    last: Option<TableState>,
}

impl DrawTask {
    /// Creates a draw task that owns `screen`.
    #[must_use]
    pub fn new(
        screen: Box<dyn Screen>,
        snapshots: mpsc::UnboundedReceiver<TableState>,
        events: mpsc::UnboundedSender<WindowEvent>,
        notifications: mpsc::UnboundedReceiver<Notification>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            screen,
            snapshots,
            events,
            notifications,
            cancel,
            row_cache: HashMap::new(),
            status: None,
            last: None,
        }
    }

    /// Runs until cancelled or until the snapshot channel closes.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                snapshot = self.snapshots.recv() => match snapshot {
                    Some(snapshot) => {
                        self.last = Some(snapshot);
                        self.draw_current().await;
                    }
                    None => break,
                },
                note = self.notifications.recv() => match note {
                    Some(note) => {
                        self.status = Some(note);
                        self.draw_current().await;
                    }
                    None => break,
                },
            }
        }
        debug!("draw task stopped");
    }

    async fn draw_current(&mut self) {
        let Some(snapshot) = self.last.take() else {
            return;
        };
        let result = self.draw(&snapshot).await;
        self.last = Some(snapshot);
        if let Err(err) = result {
            error!(error = %err, "frame draw failed");
        }
    }

    async fn draw(&mut self, snapshot: &TableState) -> crate::error::Result<()> {
        let bounds = snapshot.bounds();
        draw_borders(self.screen.as_mut(), bounds);
        match snapshot.display_mode() {
            DisplayMode::Table => self.draw_table(snapshot).await,
            DisplayMode::Inspect => self.draw_inspect(snapshot),
        }
        self.draw_status(bounds);
        self.screen.flush()
    }

    async fn draw_table(&mut self, snapshot: &TableState) {
        let bounds = snapshot.bounds();
        let width = bounds.content_width();
        let visible = snapshot.visible();

        let mut build = table::build_table(width, &visible).await;
        self.paint_line(bounds, 1, render_line(build.header.as_mut(), width));
        let mut rule = RuneRepeater::new(HORIZONTAL_LINE, role::TABLE_RULE);
        self.paint_line(bounds, 2, render_line(&mut rule, width));

        let mut failed = Vec::new();
        let height = bounds.table_height();
        for slot in 0..height {
            let index = snapshot.top_row() + slot;
            let y = 3 + slot as u16;
            let cells = match build.rows.get_mut(index) {
                Some(RowBuild::Ready(row)) => {
                    let cells = render_line(row.as_mut(), width);
                    if let Some(record) = visible.get(index) {
                        let _ = self.row_cache.insert(record.id().clone(), cells.clone());
                    }
                    cells
                }
                Some(RowBuild::Failed(record)) => {
                    failed.push(record.id().clone());
                    let mut fallback: BoxedStyler = match self.row_cache.get(record.id()) {
                        Some(cached) => Box::new(StrikeThrough::new(Box::new(CachedLine::new(
                            cached.clone(),
                        )))),
                        None => table::build_identity_row(width, record),
                    };
                    render_line(fallback.as_mut(), width)
                }
                None => vec![StyledCell::EMPTY; width],
            };
            let focused = visible
                .get(index)
                .is_some_and(|record| Some(record.id()) == snapshot.focused_id());
            let cells = if focused {
                cells.into_iter().map(focus_cell).collect()
            } else {
                cells
            };
            self.paint_line(bounds, y, cells);
        }

        self.draw_search(snapshot);
        // Blank the spare line under the search row so inspect frames
        // never show through after a mode switch.
        self.paint_line(
            bounds,
            bounds.table_height() as u16 + 4,
            vec![StyledCell::EMPTY; width],
        );

        if !snapshot.search_buffer().is_empty() && visible.is_empty() {
            self.status = Some(Notification::warning(format!(
                "No containers match '{}'",
                snapshot.search_buffer()
            )));
        }

        // Rows stay cached only while their container is listed. The
        // full collection decides liveness, so a search filter does not
        // evict the cached frames of the rows it hides.
        let live = snapshot.containers().ids();
        self.row_cache.retain(|id, _| live.contains(id));

        if !failed.is_empty()
            && snapshot
                .focused_id()
                .is_some_and(|id| failed.contains(id))
            && self.events.send(WindowEvent::RenderFailed(failed)).is_err()
        {
            debug!("owner loop gone, dropping render failure report");
        }
    }

    fn draw_search(&mut self, snapshot: &TableState) {
        let bounds = snapshot.bounds();
        let y = bounds.table_height() as u16 + 3;
        let editor: BoxedStyler = match snapshot.input_mode() {
            InputMode::Search => Box::new(TextBox::new(
                snapshot.search_buffer(),
                snapshot.search_cursor(),
                Style::new(),
                role::CURSOR,
            )),
            InputMode::Regular => Box::new(Text::new(snapshot.search_buffer(), Style::new())),
        };
        let mut line = Concat::new(
            Box::new(Text::new(" /", role::SEARCH_ACCENT)),
            2,
            editor,
        );
        let cells = render_line(&mut line, bounds.content_width());
        self.paint_line(bounds, y, cells);
    }

    fn draw_inspect(&mut self, snapshot: &TableState) {
        let bounds = snapshot.bounds();
        let width = bounds.content_width();
        let Some(record) = snapshot
            .focused_id()
            .and_then(|id| snapshot.containers().index_of(id))
            .and_then(|index| snapshot.containers().get(index))
        else {
            // Focus is validated before the mode switches; an empty
            // inspect screen here just waits for the next snapshot.
            return;
        };
        let mut lines = build_inspect_lines(record, width);
        let height = bounds.inspect_height();
        let offset = scroll_offset(snapshot.top_inspect_line(), lines.len(), height);
        for slot in 0..height {
            let y = 1 + slot as u16;
            let cells = match lines.get_mut(offset + slot) {
                Some(line) => render_line(line.as_mut(), width),
                None => vec![StyledCell::EMPTY; width],
            };
            self.paint_line(bounds, y, cells);
        }
    }

    /// Overlays the latest notification on the bottom border.
    fn draw_status(&mut self, bounds: Bounds) {
        let Some(status) = &self.status else {
            return;
        };
        let style = match status.severity {
            Severity::Info => Style::new(),
            Severity::Warning => role::WARNING,
            Severity::Error => role::ERROR,
        };
        let text = format!(" {} ", status.text);
        let mut x = bounds.left + 2;
        for ch in text.chars() {
            if x >= bounds.right {
                break;
            }
            self.screen.set_cell(x, bounds.bottom, ch, style);
            x += 1;
        }
    }

    /// Paints one content line at window-relative row `y`, spaces for
    /// empty cells so stale frames never show through.
    fn paint_line(&mut self, bounds: Bounds, y: u16, cells: Vec<StyledCell>) {
        let row = bounds.top + y;
        if row >= bounds.bottom {
            return;
        }
        for (i, cell) in cells.into_iter().enumerate() {
            let x = bounds.left + 1 + i as u16;
            if x >= bounds.right {
                break;
            }
            let (ch, style) = if cell.is_empty() {
                (' ', Style::new())
            } else {
                (cell.ch, cell.style)
            };
            self.screen.set_cell(x, row, ch, style);
        }
    }
}

fn focus_cell(cell: StyledCell) -> StyledCell {
    let mut style = if cell.is_empty() { Style::new() } else { cell.style };
    style.bg = role::FOCUS.bg;
    let ch = if cell.is_empty() { ' ' } else { cell.ch };
    StyledCell::new(ch, style)
}
