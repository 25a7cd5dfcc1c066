//! Window geometry and border drawing.

use crate::screen::Screen;
use crate::style::role;

/// Inclusive window bounds on the screen.
///
/// Invalid geometry (left ≥ right or top ≥ bottom) is a programming
/// error, not a runtime condition, and fails fast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Leftmost column.
    pub left: u16,
    /// Topmost row.
    pub top: u16,
    /// Rightmost column.
    pub right: u16,
    /// Bottommost row.
    pub bottom: u16,
}

impl Bounds {
    /// Creates bounds.
    ///
    /// # Panics
    ///
    /// Panics when `left >= right` or `top >= bottom`.
    #[must_use]
    pub fn new(left: u16, top: u16, right: u16, bottom: u16) -> Self {
        assert!(
            left < right && top < bottom,
            "bad window geometry: top left ({left},{top}), bottom right ({right},{bottom})"
        );
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Full-screen bounds for a terminal of the given size, with a
    /// minimum usable geometry.
    #[must_use]
    pub fn from_screen(columns: u16, rows: u16) -> Self {
        Self::new(0, 0, columns.max(2) - 1, rows.max(2) - 1)
    }

    /// Width in columns, borders included.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.right - self.left
    }

    /// Height in rows, borders included.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.bottom - self.top
    }

    /// Columns available inside the borders.
    #[must_use]
    pub const fn content_width(&self) -> usize {
        self.width().saturating_sub(1) as usize
    }

    /// Rows available inside the borders.
    #[must_use]
    pub const fn content_height(&self) -> usize {
        self.height().saturating_sub(1) as usize
    }

    /// Rows available for table data after the header, rule, and the
    /// search/status strip are accounted for.
    #[must_use]
    pub const fn table_height(&self) -> usize {
        (self.height() as usize).saturating_sub(5)
    }

    /// Lines visible on the inspect screen.
    #[must_use]
    pub const fn inspect_height(&self) -> usize {
        (self.height() as usize).saturating_sub(1)
    }

    /// Whether an absolute screen position falls inside the window.
    #[must_use]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// Converts an absolute position into window-relative coordinates.
    #[must_use]
    pub const fn relative(&self, x: u16, y: u16) -> (u16, u16) {
        (x - self.left, y - self.top)
    }
}

/// Paints the window frame.
pub fn draw_borders(screen: &mut dyn Screen, bounds: Bounds) {
    let style = role::BORDER;
    for col in bounds.left..=bounds.right {
        screen.set_cell(col, bounds.top, '\u{2500}', style);
        screen.set_cell(col, bounds.bottom, '\u{2500}', style);
    }
    for row in bounds.top + 1..bounds.bottom {
        screen.set_cell(bounds.left, row, '\u{2502}', style);
        screen.set_cell(bounds.right, row, '\u{2502}', style);
    }
    screen.set_cell(bounds.left, bounds.top, '\u{250c}', style);
    screen.set_cell(bounds.right, bounds.top, '\u{2510}', style);
    screen.set_cell(bounds.left, bounds.bottom, '\u{2514}', style);
    screen.set_cell(bounds.right, bounds.bottom, '\u{2518}', style);
}
