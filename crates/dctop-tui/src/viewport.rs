//! Scroll and focus arithmetic for the table and the inspect screen.
//!
//! Pure functions over indices; the state machine owns the fields they
//! feed.

/// Wraps a candidate focus index into `[0, len)`: below zero lands on
/// the last row, at or past the end lands on the first. `None` when the
/// collection is empty.
#[must_use]
pub fn wrap_index(index: i64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if index < 0 {
        Some(len - 1)
    } else if index as usize >= len {
        Some(0)
    } else {
        Some(index as usize)
    }
}

/// Returns the top visible row that keeps `focus` inside a viewport of
/// `height` rows over `len` rows total, starting from the current `top`.
///
/// The focus is pulled into `[top, top + height)`, then the viewport is
/// pulled back so the last page never shows trailing blank rows.
#[must_use]
pub fn scroll_table(top: usize, height: usize, focus: usize, len: usize) -> usize {
    if height == 0 || len == 0 {
        return 0;
    }
    let mut top = top;
    if focus < top {
        top = focus;
    } else if focus >= top + height {
        top = focus + 1 - height;
    }
    if len > height { top.min(len - height) } else { 0 }
}

/// Cyclic scroll offset for the inspect screen: the cursor wraps modulo
/// `1 + total − height`, so scrolling past either end comes out the
/// other side. Zero when everything fits.
#[must_use]
pub fn scroll_offset(cursor: i64, total: usize, height: usize) -> usize {
    if height == 0 || total <= height {
        return 0;
    }
    let span = 1 + (total - height) as i64;
    let offset = ((cursor % span) + span) % span;
    offset as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_below_zero_lands_on_last() {
        assert_eq!(wrap_index(-1, 5), Some(4));
    }

    #[test]
    fn wrapping_past_the_end_lands_on_first() {
        assert_eq!(wrap_index(5, 5), Some(0));
        assert_eq!(wrap_index(17, 5), Some(0));
    }

    #[test]
    fn in_range_indices_are_unchanged() {
        assert_eq!(wrap_index(3, 5), Some(3));
        assert_eq!(wrap_index(0, 5), Some(0));
    }

    #[test]
    fn empty_collections_have_no_focus() {
        assert_eq!(wrap_index(0, 0), None);
    }

    #[test]
    fn focus_above_viewport_pulls_top_up() {
        assert_eq!(scroll_table(5, 3, 2, 10), 2);
    }

    #[test]
    fn focus_below_viewport_pulls_top_down() {
        assert_eq!(scroll_table(0, 3, 6, 10), 4);
    }

    #[test]
    fn last_page_is_fully_used() {
        // Focus on the last row: top must leave a full final page.
        assert_eq!(scroll_table(0, 3, 9, 10), 7);
        // Shrinking data pulls an overshooting top back.
        assert_eq!(scroll_table(8, 3, 4, 5), 2);
    }

    #[test]
    fn short_collections_never_scroll() {
        assert_eq!(scroll_table(2, 10, 1, 3), 0);
    }

    #[test]
    fn focus_stays_inside_viewport_under_random_walk() {
        let mut top = 0;
        let (height, len) = (4, 23);
        let walk = [0_i64, 5, 22, 3, 21, 0, 11, 12, 13, 22, 1];
        for &step in &walk {
            let focus = wrap_index(step, len).expect("non-empty");
            top = scroll_table(top, height, focus, len);
            assert!(top <= focus && focus < top + height, "top={top} focus={focus}");
        }
    }

    #[test]
    fn inspect_scroll_is_cyclic() {
        // 12 lines in a 10-line window: span is 3, offsets cycle 0,1,2.
        assert_eq!(scroll_offset(0, 12, 10), 0);
        assert_eq!(scroll_offset(2, 12, 10), 2);
        assert_eq!(scroll_offset(3, 12, 10), 0);
        assert_eq!(scroll_offset(4, 12, 10), 1);
    }

    #[test]
    fn negative_inspect_scroll_wraps_backward() {
        assert_eq!(scroll_offset(-1, 12, 10), 2);
    }

    #[test]
    fn fitting_content_never_scrolls() {
        assert_eq!(scroll_offset(7, 8, 10), 0);
    }
}
