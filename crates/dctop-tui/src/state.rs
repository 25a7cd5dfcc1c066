//! The table window's state machine.
//!
//! [`TableState`] holds everything the dashboard knows between events:
//! the current container collection, focus, scroll positions, sort keys,
//! and the search buffer. Exactly one task mutates it; the draw task
//! only ever sees cloned snapshots.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use dctop_common::types::{ContainerId, SortKey};
use dctop_runtime::collection::ContainerCollection;
use tracing::{debug, warn};

use crate::notify::Notification;
use crate::table;
use crate::viewport::{scroll_table, wrap_index};
use crate::window::Bounds;

/// Which screen the window is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// The container table.
    Table,
    /// The inspect screen for the focused container.
    Inspect,
}

/// How keystrokes are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Keys are navigation commands.
    Regular,
    /// Keys edit the search buffer.
    Search,
}

/// Side effects a key press asks the owner loop to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// Delete a container.
    Delete(ContainerId),
    /// Open the logs view for a container.
    ShowLogs(ContainerId),
    /// Open a shell in a container.
    ShowShell(ContainerId),
    /// Show a status-bar notification.
    Notify(Notification),
    /// Hand control back to the surrounding view layer.
    SwitchToDefault,
}

/// Complete state of the table window.
#[derive(Debug, Clone)]
pub struct TableState {
    bounds: Bounds,
    display_mode: DisplayMode,
    input_mode: InputMode,
    search_buffer: String,
    search_cursor: usize,
    focused_id: Option<ContainerId>,
    top_row: usize,
    top_inspect_line: i64,
    sort_primary: SortKey,
    sort_secondary: SortKey,
    containers: ContainerCollection,
}

impl TableState {
    /// Creates an empty state for the given window bounds.
    #[must_use]
    pub fn new(bounds: Bounds, sort_primary: SortKey, sort_secondary: SortKey) -> Self {
        Self {
            bounds,
            display_mode: DisplayMode::Table,
            input_mode: InputMode::Regular,
            search_buffer: String::new(),
            search_cursor: 0,
            focused_id: None,
            top_row: 0,
            top_inspect_line: 0,
            sort_primary,
            sort_secondary,
            containers: ContainerCollection::default(),
        }
    }

    /// Current window bounds.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Which screen is showing.
    #[must_use]
    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    /// How keys are interpreted.
    #[must_use]
    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// The search buffer contents.
    #[must_use]
    pub fn search_buffer(&self) -> &str {
        &self.search_buffer
    }

    /// Cursor position within the search buffer, in characters.
    #[must_use]
    pub fn search_cursor(&self) -> usize {
        self.search_cursor
    }

    /// Id of the focused container, if any.
    #[must_use]
    pub fn focused_id(&self) -> Option<&ContainerId> {
        self.focused_id.as_ref()
    }

    /// Index of the first visible table row.
    #[must_use]
    pub fn top_row(&self) -> usize {
        self.top_row
    }

    /// Scroll cursor of the inspect screen.
    #[must_use]
    pub fn top_inspect_line(&self) -> i64 {
        self.top_inspect_line
    }

    /// Current primary and secondary sort keys.
    #[must_use]
    pub fn sort_keys(&self) -> (SortKey, SortKey) {
        (self.sort_primary, self.sort_secondary)
    }

    /// The full, unfiltered collection.
    #[must_use]
    pub fn containers(&self) -> &ContainerCollection {
        &self.containers
    }

    /// The collection as filtered by the search buffer; this is what the
    /// table renders and what focus movement operates on.
    #[must_use]
    pub fn visible(&self) -> ContainerCollection {
        self.containers.filtered(&self.search_buffer)
    }

    /// The focused record, looked up in the visible view.
    fn focus_index(&self, visible: &ContainerCollection) -> Option<usize> {
        self.focused_id.as_ref().and_then(|id| visible.index_of(id))
    }

    /// Replaces the window geometry and re-clamps the viewport.
    pub fn handle_resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.reclamp();
    }

    /// Installs a freshly sorted collection.
    ///
    /// Focus on a container that vanished from the collection is
    /// dropped, and the window falls back to the table screen so the
    /// inspect view never shows stale data.
    pub fn handle_new_data(&mut self, mut containers: ContainerCollection) {
        containers.sort(self.sort_primary, self.sort_secondary);
        if let Some(id) = &self.focused_id {
            if !containers.contains(id) {
                debug!(id = %id, "focused container vanished, dropping focus");
                self.focused_id = None;
                self.display_mode = DisplayMode::Table;
            }
        }
        self.containers = containers;
        self.reclamp();
    }

    /// Drops focus if it is on one of the given containers and returns
    /// to the table screen. Called when the draw task failed to render
    /// the focused row.
    pub fn handle_render_failures(&mut self, failed: &[ContainerId]) {
        if let Some(id) = &self.focused_id {
            if failed.contains(id) {
                warn!(id = %id, "focused row failed to render, dropping focus");
                self.focused_id = None;
                self.display_mode = DisplayMode::Table;
            }
        }
    }

    /// Interprets a mouse event. Only left-button presses inside the
    /// window on the table screen do anything.
    pub fn handle_mouse(&mut self, event: &MouseEvent) {
        if event.kind != MouseEventKind::Down(MouseButton::Left)
            || self.display_mode != DisplayMode::Table
            || !self.bounds.contains(event.column, event.row)
        {
            return;
        }
        let (x, y) = self.bounds.relative(event.column, event.row);
        if y == 1 {
            // The table content starts one cell past the left border.
            let key = (x as usize)
                .checked_sub(1)
                .and_then(|column| table::sort_key_at(column, self.bounds.content_width()));
            if let Some(key) = key {
                self.rotate_sort(key);
            }
            return;
        }
        if y >= 3 {
            // Only the drawn rows are clickable; the search strip and
            // status line below them are not.
            let slot = y as usize - 3;
            if slot >= self.bounds.table_height() {
                return;
            }
            let row = self.top_row + slot;
            let visible = self.visible();
            if row < visible.len() {
                self.set_focus_to_index(row, &visible);
            }
        }
    }

    /// Interprets a key press, returning the side effects the owner
    /// loop should carry out.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Vec<UiAction> {
        match self.input_mode {
            InputMode::Regular => self.handle_regular_key(event),
            InputMode::Search => self.handle_search_key(event),
        }
    }

    fn handle_regular_key(&mut self, event: &KeyEvent) -> Vec<UiAction> {
        let mut actions = Vec::new();
        match event.code {
            KeyCode::Up => self.navigate(-1),
            KeyCode::Down => self.navigate(1),
            KeyCode::Delete => {
                self.display_mode = DisplayMode::Table;
                match self.delete_focused() {
                    Some(id) => actions.push(UiAction::Delete(id)),
                    None => actions.push(UiAction::Notify(Notification::warning(
                        "Nothing is focused",
                    ))),
                }
            }
            KeyCode::Char('l') => {
                if let Some(id) = self.focused_id.clone() {
                    actions.push(UiAction::ShowLogs(id));
                }
            }
            KeyCode::Char('e') => {
                if let Some(id) = self.focused_id.clone() {
                    actions.push(UiAction::ShowShell(id));
                }
            }
            KeyCode::Char('i') => match self.display_mode {
                DisplayMode::Table if self.focused_id.is_some() => {
                    self.top_inspect_line = 0;
                    self.display_mode = DisplayMode::Inspect;
                }
                DisplayMode::Inspect => self.display_mode = DisplayMode::Table,
                DisplayMode::Table => {}
            },
            KeyCode::Char('g') => match self.display_mode {
                DisplayMode::Table => self.jump_first(),
                DisplayMode::Inspect => self.top_inspect_line = 0,
            },
            KeyCode::Char('G') => {
                if self.display_mode == DisplayMode::Table {
                    self.jump_last();
                }
            }
            KeyCode::Char('c') => {
                if !self.search_buffer.is_empty() {
                    self.search_buffer.clear();
                    self.search_cursor = 0;
                    self.reclamp();
                    actions.push(UiAction::Notify(Notification::info("Search cleared")));
                }
            }
            KeyCode::Esc => {
                if self.display_mode == DisplayMode::Table {
                    actions.push(UiAction::SwitchToDefault);
                }
            }
            KeyCode::Char('/') => {
                self.search_buffer.clear();
                self.search_cursor = 0;
                self.input_mode = InputMode::Search;
                actions.push(UiAction::Notify(Notification::info(
                    "Type to filter, Esc to leave search",
                )));
            }
            _ => {}
        }
        actions
    }

    fn handle_search_key(&mut self, event: &KeyEvent) -> Vec<UiAction> {
        let mut actions = Vec::new();
        let ctrl_d = event.code == KeyCode::Char('d')
            && event.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl_d || event.code == KeyCode::Esc {
            self.search_buffer.clear();
            self.search_cursor = 0;
            self.input_mode = InputMode::Regular;
            self.reclamp();
            return actions;
        }
        match event.code {
            KeyCode::Enter => {
                actions.push(UiAction::Notify(Notification::info(format!(
                    "Searching for {}",
                    self.search_buffer
                ))));
            }
            KeyCode::Char(ch) if !event.modifiers.contains(KeyModifiers::CONTROL) => {
                let byte = self.cursor_byte_offset();
                self.search_buffer.insert(byte, ch);
                self.search_cursor += 1;
                self.reclamp();
            }
            KeyCode::Left => self.search_cursor = self.search_cursor.saturating_sub(1),
            KeyCode::Right => {
                let len = self.search_buffer.chars().count();
                self.search_cursor = (self.search_cursor + 1).min(len);
            }
            KeyCode::Backspace => {
                if self.search_cursor > 0 {
                    self.search_cursor -= 1;
                    let byte = self.cursor_byte_offset();
                    self.search_buffer.remove(byte);
                    self.reclamp();
                }
            }
            KeyCode::Delete => {
                let byte = self.cursor_byte_offset();
                if byte < self.search_buffer.len() {
                    self.search_buffer.remove(byte);
                    self.reclamp();
                }
            }
            _ => {}
        }
        actions
    }

    fn cursor_byte_offset(&self) -> usize {
        self.search_buffer
            .char_indices()
            .nth(self.search_cursor)
            .map_or(self.search_buffer.len(), |(byte, _)| byte)
    }

    /// Up/Down is focus movement on the table screen and scrolling on
    /// the inspect screen.
    fn navigate(&mut self, delta: i64) {
        match self.display_mode {
            DisplayMode::Table => self.move_focus(delta),
            DisplayMode::Inspect => self.top_inspect_line += delta,
        }
    }

    /// Moves focus by `delta` rows with cyclic wrap-around. When nothing
    /// is focused, moving down seeds focus on the first row and moving
    /// up on the last.
    pub fn move_focus(&mut self, delta: i64) {
        let visible = self.visible();
        if visible.is_empty() {
            self.focused_id = None;
            return;
        }
        let index = match self.focus_index(&visible) {
            Some(index) => wrap_index(index as i64 + delta, visible.len()),
            None if delta >= 0 => Some(0),
            None => Some(visible.len() - 1),
        };
        if let Some(index) = index {
            self.set_focus_to_index(index, &visible);
        }
    }

    /// Focuses the first visible row.
    pub fn jump_first(&mut self) {
        let visible = self.visible();
        if !visible.is_empty() {
            self.set_focus_to_index(0, &visible);
        }
    }

    /// Focuses the last visible row.
    pub fn jump_last(&mut self) {
        let visible = self.visible();
        if !visible.is_empty() {
            self.set_focus_to_index(visible.len() - 1, &visible);
        }
    }

    fn set_focus_to_index(&mut self, index: usize, visible: &ContainerCollection) {
        if let Some(record) = visible.get(index) {
            self.focused_id = Some(record.id().clone());
            self.top_row = scroll_table(
                self.top_row,
                self.bounds.table_height(),
                index,
                visible.len(),
            );
        }
    }

    /// Picks the container to delete and moves focus to a neighbor:
    /// the next row, or the previous one when deleting the last row.
    /// Returns `None` when nothing is focused.
    pub fn delete_focused(&mut self) -> Option<ContainerId> {
        let visible = self.visible();
        let index = self.focus_index(&visible)?;
        let victim = visible.get(index)?.id().clone();
        let neighbor = if index + 1 < visible.len() {
            Some(index + 1)
        } else {
            index.checked_sub(1)
        };
        match neighbor {
            Some(neighbor) => self.set_focus_to_index(neighbor, &visible),
            None => self.focused_id = None,
        }
        Some(victim)
    }

    /// Makes `key` the primary sort key; the old primary becomes
    /// secondary. Clicking the already-primary column is a no-op, and
    /// the id column never sorts.
    fn rotate_sort(&mut self, key: SortKey) {
        if key == SortKey::None || key == self.sort_primary {
            return;
        }
        self.sort_secondary = self.sort_primary;
        self.sort_primary = key;
        self.containers.sort(self.sort_primary, self.sort_secondary);
        self.reclamp();
    }

    /// Re-derives the viewport after anything that can move rows around:
    /// new data, a resize, a sort change, or a filter edit.
    fn reclamp(&mut self) {
        let visible = self.visible();
        let height = self.bounds.table_height();
        match self.focus_index(&visible) {
            Some(index) => self.top_row = scroll_table(self.top_row, height, index, visible.len()),
            None => {
                self.top_row = self
                    .top_row
                    .min(visible.len().saturating_sub(height.max(1)));
            }
        }
    }
}
