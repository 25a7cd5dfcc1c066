//! The positional text-and-style abstraction every visual unit is built
//! from.
//!
//! A [`Styler`] maps a zero-based column position to a character and a
//! style. Positions at or past a styler's width yield the
//! [`StyledCell::EMPTY`] sentinel, never an error. Stateful stylers keep
//! explicit cursor fields and reset them when rendered at position 0, so
//! a finished row can be restarted from column 0; positions must
//! otherwise be queried in ascending order within one row.

use crate::style::{Style, role};

/// Glyph drawn at interior column boundaries.
pub const VERTICAL_LINE: char = '\u{2502}';

/// Glyph used for horizontal rules.
pub const HORIZONTAL_LINE: char = '\u{2500}';

/// One rendered cell: a character plus its style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledCell {
    /// Character to draw. NUL marks an empty cell.
    pub ch: char,
    /// Style to draw it with.
    pub style: Style,
}

impl StyledCell {
    /// The out-of-range sentinel: painted as a cleared cell.
    pub const EMPTY: Self = Self {
        ch: '\0',
        style: Style::new(),
    };

    /// Creates a cell.
    #[must_use]
    pub const fn new(ch: char, style: Style) -> Self {
        Self { ch, style }
    }

    /// Whether this is the empty sentinel.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ch == '\0'
    }
}

/// A lazy producer of `(character, style)` pairs by column position.
pub trait Styler: Send {
    /// Renders the cell at `pos`.
    fn render(&mut self, pos: usize) -> StyledCell;
}

/// Owned, dynamically dispatched styler, the currency of the layout
/// engine.
pub type BoxedStyler = Box<dyn Styler>;

/// A run of text, optionally padded or truncated to a fixed width.
#[derive(Debug, Clone)]
pub struct Text {
    cells: Vec<char>,
    style: Style,
}

impl Text {
    /// Text rendered as-is, empty past its end.
    #[must_use]
    pub fn new(text: &str, style: Style) -> Self {
        Self {
            cells: text.chars().collect(),
            style,
        }
    }

    /// Text fitted to exactly `width` cells: shorter strings are padded
    /// with spaces, longer ones truncated with up to three trailing dots.
    #[must_use]
    pub fn fixed(text: &str, width: usize, style: Style) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let cells = if chars.len() <= width {
            let mut cells = chars;
            cells.resize(width, ' ');
            cells
        } else {
            let num_dots = ((width.saturating_sub(1)) / 3).min(3);
            let mut cells: Vec<char> = chars[..width - num_dots].to_vec();
            cells.extend(std::iter::repeat_n('.', num_dots));
            cells
        };
        Self { cells, style }
    }

    /// A blank line.
    #[must_use]
    pub fn blank() -> Self {
        Self::new("", Style::new())
    }
}

impl Styler for Text {
    fn render(&mut self, pos: usize) -> StyledCell {
        self.cells
            .get(pos)
            .map_or(StyledCell::EMPTY, |&ch| StyledCell::new(ch, self.style))
    }
}

/// The same glyph at every position; used for rules and separators.
#[derive(Debug, Clone, Copy)]
pub struct RuneRepeater {
    ch: char,
    style: Style,
}

impl RuneRepeater {
    /// Creates a repeater.
    #[must_use]
    pub const fn new(ch: char, style: Style) -> Self {
        Self { ch, style }
    }
}

impl Styler for RuneRepeater {
    fn render(&mut self, _pos: usize) -> StyledCell {
        StyledCell::new(self.ch, self.style)
    }
}

/// Overlays a strike glyph at alternating positions of an inner styler.
/// Empty cells stay empty so the decoration never widens its target.
pub struct StrikeThrough {
    inner: BoxedStyler,
}

impl StrikeThrough {
    /// Wraps a styler.
    #[must_use]
    pub fn new(inner: BoxedStyler) -> Self {
        Self { inner }
    }
}

impl Styler for StrikeThrough {
    fn render(&mut self, pos: usize) -> StyledCell {
        let cell = self.inner.render(pos);
        if cell.is_empty() || pos % 2 == 0 {
            cell
        } else {
            StyledCell::new('-', cell.style)
        }
    }
}

/// A proportion-filled bar with a leading label and overlay text drawn
/// on the bar's own background.
#[derive(Debug, Clone)]
pub struct ValuesBar {
    prefix: Vec<char>,
    overlay: Vec<char>,
    bar_len: usize,
    filled: usize,
    fill: Style,
    rest: Style,
}

impl ValuesBar {
    /// Creates a bar showing `value` within `[min, max]` over `bar_len`
    /// cells, preceded by `prefix` and carrying `overlay` text on the
    /// bar itself. A zero-width range renders an unfilled bar.
    #[must_use]
    pub fn new(prefix: &str, min: f64, max: f64, value: f64, bar_len: usize, overlay: &str) -> Self {
        let filled = if max > min {
            let fraction = ((value - min) / (max - min)).clamp(0.0, 1.0);
            (fraction * bar_len as f64).round() as usize
        } else {
            0
        };
        Self {
            prefix: prefix.chars().collect(),
            overlay: overlay.chars().collect(),
            bar_len,
            filled,
            fill: role::BAR_FILL,
            rest: Style::new(),
        }
    }

    /// A `[0, 100]` bar; an undefined percentage renders unfilled.
    #[must_use]
    pub fn percentage(label: &str, percent: Option<f64>, bar_len: usize) -> Self {
        Self::new(label, 0.0, 100.0, percent.unwrap_or(0.0), bar_len, "")
    }
}

impl Styler for ValuesBar {
    fn render(&mut self, pos: usize) -> StyledCell {
        if pos < self.prefix.len() {
            return StyledCell::new(self.prefix[pos], self.rest);
        }
        let bar_pos = pos - self.prefix.len();
        if bar_pos >= self.bar_len {
            return StyledCell::EMPTY;
        }
        let ch = self.overlay.get(bar_pos).copied().unwrap_or(' ');
        let style = if bar_pos < self.filled {
            self.fill
        } else {
            self.rest
        };
        StyledCell::new(ch, style)
    }
}

/// Editable text with a highlighted cursor cell; used for the search box.
#[derive(Debug, Clone)]
pub struct TextBox {
    cells: Vec<char>,
    cursor: usize,
    style: Style,
    cursor_style: Style,
}

impl TextBox {
    /// Creates a text box. The cursor is clamped to `[0, len]`; a cursor
    /// one past the end renders as a highlighted space.
    #[must_use]
    pub fn new(text: &str, cursor: usize, style: Style, cursor_style: Style) -> Self {
        let cells: Vec<char> = text.chars().collect();
        let cursor = cursor.min(cells.len());
        Self {
            cells,
            cursor,
            style,
            cursor_style,
        }
    }
}

impl Styler for TextBox {
    fn render(&mut self, pos: usize) -> StyledCell {
        if let Some(&ch) = self.cells.get(pos) {
            let style = if pos == self.cursor {
                self.cursor_style
            } else {
                self.style
            };
            return StyledCell::new(ch, style);
        }
        if pos == self.cursor {
            return StyledCell::new(' ', self.cursor_style);
        }
        StyledCell::EMPTY
    }
}

/// Chains two stylers: the first owns `width` cells, the second follows.
pub struct Concat {
    head: BoxedStyler,
    width: usize,
    tail: BoxedStyler,
}

impl Concat {
    /// Creates a chain.
    #[must_use]
    pub fn new(head: BoxedStyler, width: usize, tail: BoxedStyler) -> Self {
        Self { head, width, tail }
    }
}

impl Styler for Concat {
    fn render(&mut self, pos: usize) -> StyledCell {
        if pos < self.width {
            self.head.render(pos)
        } else {
            self.tail.render(pos - self.width)
        }
    }
}

/// Composes k cell stylers into one row, emitting a vertical separator
/// at each interior column boundary instead of delegating.
///
/// Positions must be queried in ascending order; rendering position 0
/// resets the internal column cursors so the row can be restarted.
pub struct RowLayout {
    cells: Vec<BoxedStyler>,
    widths: Vec<usize>,
    separator: Style,
    column: usize,
    inner: usize,
}

impl RowLayout {
    /// Creates a row from cell stylers and their absolute widths.
    /// Both slices must be the same length.
    #[must_use]
    pub fn new(cells: Vec<BoxedStyler>, widths: Vec<usize>) -> Self {
        debug_assert_eq!(cells.len(), widths.len());
        Self {
            cells,
            widths,
            separator: Style::new(),
            column: 0,
            inner: 0,
        }
    }
}

impl Styler for RowLayout {
    fn render(&mut self, pos: usize) -> StyledCell {
        if self.cells.is_empty() {
            return StyledCell::EMPTY;
        }
        if pos == 0 {
            self.column = 0;
            self.inner = 0;
        } else if self.column < self.cells.len() - 1 && self.inner == self.widths[self.column] {
            self.column += 1;
            self.inner = 0;
            return StyledCell::new(VERTICAL_LINE, self.separator);
        }
        let inner = self.inner;
        self.inner += 1;
        self.cells[self.column].render(inner)
    }
}

/// Replays a previously rendered line of cells; the draw task uses this
/// to strike through a row's last good frame when rendering fails.
#[derive(Debug, Clone)]
pub struct CachedLine {
    cells: Vec<StyledCell>,
}

impl CachedLine {
    /// Wraps rendered cells.
    #[must_use]
    pub fn new(cells: Vec<StyledCell>) -> Self {
        Self { cells }
    }
}

impl Styler for CachedLine {
    fn render(&mut self, pos: usize) -> StyledCell {
        self.cells.get(pos).copied().unwrap_or(StyledCell::EMPTY)
    }
}

/// Renders the first `width` cells of a styler into an owned line.
pub fn render_line(styler: &mut dyn Styler, width: usize) -> Vec<StyledCell> {
    (0..width).map(|pos| styler.render(pos)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    #[test]
    fn fixed_text_pads_short_strings() {
        let mut cell = Text::fixed("ab", 5, Style::new());
        let line: String = (0..5).map(|i| cell.render(i).ch).collect();
        assert_eq!(line, "ab   ");
        assert!(cell.render(5).is_empty());
    }

    #[test]
    fn fixed_text_truncates_with_dots() {
        let mut cell = Text::fixed("abcdefghij", 7, Style::new());
        let line: String = (0..7).map(|i| cell.render(i).ch).collect();
        assert_eq!(line, "abcde..");
    }

    #[test]
    fn row_layout_separates_columns() {
        let cells: Vec<BoxedStyler> = vec![
            Box::new(Text::fixed("aa", 2, Style::new())),
            Box::new(Text::fixed("bb", 2, Style::new())),
        ];
        let mut row = RowLayout::new(cells, vec![2, 2]);
        let line: String = (0..5).map(|i| row.render(i).ch).collect();
        assert_eq!(line, format!("aa{VERTICAL_LINE}bb"));
    }

    #[test]
    fn row_layout_restarts_at_position_zero() {
        let cells: Vec<BoxedStyler> = vec![
            Box::new(Text::fixed("ab", 2, Style::new())),
            Box::new(Text::fixed("cd", 2, Style::new())),
        ];
        let mut row = RowLayout::new(cells, vec![2, 2]);
        let first: String = (0..5).map(|i| row.render(i).ch).collect();
        let second: String = (0..5).map(|i| row.render(i).ch).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn strike_through_marks_alternating_positions() {
        let mut struck = StrikeThrough::new(Box::new(Text::fixed("abcd", 4, Style::new())));
        let line: String = (0..4).map(|i| struck.render(i).ch).collect();
        assert_eq!(line, "a-c-");
        assert!(struck.render(9).is_empty());
    }

    #[test]
    fn values_bar_fills_proportionally() {
        let mut bar = ValuesBar::new("x", 0.0, 10.0, 5.0, 8, "lbl");
        // Prefix cell.
        assert_eq!(bar.render(0).ch, 'x');
        // Overlay text sits on the filled region.
        assert_eq!(bar.render(1).ch, 'l');
        assert_eq!(bar.render(1).style, role::BAR_FILL);
        // Half of 8 cells filled.
        assert_eq!(bar.render(4).style, role::BAR_FILL);
        assert_eq!(bar.render(5).style, Style::new());
        assert!(bar.render(9).is_empty());
    }

    #[test]
    fn undefined_percentage_renders_unfilled() {
        let mut bar = ValuesBar::percentage("cpu", None, 4);
        for pos in 3..7 {
            assert_ne!(bar.render(pos).style, role::BAR_FILL);
        }
    }

    #[test]
    fn text_box_clamps_cursor_and_highlights_it() {
        let mut surplus = TextBox::new("ab", 9, Style::new(), role::CURSOR);
        assert_eq!(surplus.render(2), StyledCell::new(' ', role::CURSOR));

        let mut within = TextBox::new("ab", 1, Style::new(), role::CURSOR);
        assert_eq!(within.render(0).style, Style::new());
        assert_eq!(within.render(1).style, role::CURSOR);
    }

    #[test]
    fn concat_shifts_the_tail() {
        let mut chained = Concat::new(
            Box::new(Text::new(" /", Style::new().fg(Color::Yellow))),
            2,
            Box::new(Text::new("abc", Style::new())),
        );
        let line: String = (0..5).map(|i| chained.render(i).ch).collect();
        assert_eq!(line, " /abc");
    }

    #[test]
    fn cached_line_replays_cells() {
        let mut text = Text::fixed("xy", 2, Style::new());
        let cells = render_line(&mut text, 2);
        let mut cached = CachedLine::new(cells);
        assert_eq!(cached.render(0).ch, 'x');
        assert_eq!(cached.render(1).ch, 'y');
        assert!(cached.render(2).is_empty());
    }
}
