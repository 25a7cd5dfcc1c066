//! The screen capability the draw pipeline renders into.
//!
//! The real implementation drives a terminal through `crossterm`; the
//! in-memory [`TestScreen`] backs integration tests and headless runs.

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Attribute, Colors, Print, SetAttribute, SetColors};
use crossterm::terminal::{
    Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
};
use crossterm::{execute, queue};

use crate::error::Result;
use crate::style::{Color, Style};

/// Cell-addressed output device consumed by the draw task.
pub trait Screen: Send {
    /// Current screen dimensions as `(columns, rows)`.
    fn size(&self) -> (u16, u16);

    /// Writes one cell. A NUL character clears the cell.
    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style);

    /// Clears the whole screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the operation.
    fn clear(&mut self) -> Result<()>;

    /// Makes queued cell writes visible.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the operation.
    fn flush(&mut self) -> Result<()>;

    /// Hands the terminal back to the shell, e.g. for an interactive
    /// subprocess.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the operation.
    fn suspend(&mut self) -> Result<()>;

    /// Reclaims the terminal after [`Self::suspend`].
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the operation.
    fn resume(&mut self) -> Result<()>;
}

/// A real terminal, driven through crossterm in raw mode on the
/// alternate screen.
#[derive(Debug)]
pub struct TerminalScreen {
    out: std::io::Stdout,
    active: bool,
}

impl TerminalScreen {
    /// Takes over the terminal: raw mode, alternate screen, mouse
    /// capture, hidden cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be configured.
    pub fn new() -> Result<Self> {
        let mut out = std::io::stdout();
        enable_raw_mode()?;
        execute!(
            out,
            EnterAlternateScreen,
            crossterm::event::EnableMouseCapture,
            Hide
        )?;
        Ok(Self { out, active: true })
    }
}

impl Screen for TerminalScreen {
    fn size(&self) -> (u16, u16) {
        crossterm::terminal::size().unwrap_or((80, 24))
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style) {
        let shown = if ch == '\0' { ' ' } else { ch };
        let colors = Colors::new(
            style.fg.unwrap_or(Color::Reset),
            style.bg.unwrap_or(Color::Reset),
        );
        let attr = if style.bold {
            Attribute::Bold
        } else {
            Attribute::Reset
        };
        // Queued, not executed: cells accumulate until flush.
        let _ = queue!(
            self.out,
            MoveTo(x, y),
            SetAttribute(Attribute::Reset),
            SetColors(colors),
            SetAttribute(attr),
            Print(shown)
        );
    }

    fn clear(&mut self) -> Result<()> {
        queue!(self.out, Clear(ClearType::All))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    fn suspend(&mut self) -> Result<()> {
        if self.active {
            execute!(
                self.out,
                crossterm::event::DisableMouseCapture,
                LeaveAlternateScreen,
                Show
            )?;
            disable_raw_mode()?;
            self.active = false;
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        if !self.active {
            enable_raw_mode()?;
            execute!(
                self.out,
                EnterAlternateScreen,
                crossterm::event::EnableMouseCapture,
                Hide
            )?;
            self.active = true;
        }
        Ok(())
    }
}

impl Drop for TerminalScreen {
    fn drop(&mut self) {
        let _ = self.suspend();
    }
}

#[derive(Debug)]
struct TestScreenInner {
    width: u16,
    height: u16,
    cells: Vec<(char, Style)>,
    flushes: usize,
    suspended: bool,
}

/// An in-memory screen for tests and headless runs.
///
/// Clones share the same cell grid, so a test can keep a handle while
/// the draw task owns the screen.
#[derive(Debug, Clone)]
pub struct TestScreen {
    inner: Arc<Mutex<TestScreenInner>>,
}

impl TestScreen {
    /// Creates a screen of the given dimensions.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TestScreenInner {
                width,
                height,
                cells: vec![('\0', Style::new()); usize::from(width) * usize::from(height)],
                flushes: 0,
                suspended: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TestScreenInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Character and style at the given position.
    #[must_use]
    pub fn cell_at(&self, x: u16, y: u16) -> (char, Style) {
        let inner = self.lock();
        let index = usize::from(y) * usize::from(inner.width) + usize::from(x);
        inner.cells.get(index).copied().unwrap_or(('\0', Style::new()))
    }

    /// The visible text of one row, with empty cells as spaces.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        let inner = self.lock();
        (0..inner.width)
            .map(|x| {
                let index = usize::from(y) * usize::from(inner.width) + usize::from(x);
                match inner.cells.get(index) {
                    Some(&(ch, _)) if ch != '\0' => ch,
                    _ => ' ',
                }
            })
            .collect()
    }

    /// Whether any row currently shows the given text.
    #[must_use]
    pub fn contains_text(&self, needle: &str) -> bool {
        let height = self.lock().height;
        (0..height).any(|y| self.row_text(y).contains(needle))
    }

    /// Number of flushes observed, i.e. completed frames.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        self.lock().flushes
    }
}

impl Screen for TestScreen {
    fn size(&self) -> (u16, u16) {
        let inner = self.lock();
        (inner.width, inner.height)
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style) {
        let mut inner = self.lock();
        if x < inner.width && y < inner.height {
            let index = usize::from(y) * usize::from(inner.width) + usize::from(x);
            inner.cells[index] = (ch, style);
        }
    }

    fn clear(&mut self) -> Result<()> {
        let mut inner = self.lock();
        inner.cells.fill(('\0', Style::new()));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.lock().flushes += 1;
        Ok(())
    }

    fn suspend(&mut self) -> Result<()> {
        self.lock().suspended = true;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.lock().suspended = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_round_trips_cells() {
        let mut screen = TestScreen::new(10, 3);
        screen.set_cell(2, 1, 'x', Style::new().fg(Color::Red));
        assert_eq!(screen.cell_at(2, 1).0, 'x');
        assert_eq!(screen.row_text(1), "  x       ");
    }

    #[test]
    fn clones_share_the_grid() {
        let mut screen = TestScreen::new(4, 1);
        let probe = screen.clone();
        screen.set_cell(0, 0, 'a', Style::new());
        assert_eq!(probe.cell_at(0, 0).0, 'a');
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut screen = TestScreen::new(4, 2);
        screen.set_cell(9, 9, 'x', Style::new());
        assert!(!screen.contains_text("x"));
    }
}
