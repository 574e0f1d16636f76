//! Scroll policy for keeping the cursor entry in view

/// New top line that brings an entry into view with minimal movement.
///
/// `view_top..=view_bottom` is the visible line range (inclusive) and
/// `entry_top..entry_bottom` the lines the entry occupies (exclusive end).
///
/// - Entry starts in or below the view and ends inside it: `None`.
/// - Entry starts in or below the view but runs past the bottom: scroll
///   down by the overflow, `view_top + (entry_bottom - view_bottom)`.
/// - Entry starts above the view: scroll up to `entry_top`.
///
/// # Examples
///
/// ```
/// # use podtail::view_state::scroll::scroll_to_reveal;
/// assert_eq!(scroll_to_reveal(10, 16, 14, 18), Some(12));
/// assert_eq!(scroll_to_reveal(10, 16, 8, 12), Some(8));
/// assert_eq!(scroll_to_reveal(10, 16, 11, 13), None);
/// ```
pub fn scroll_to_reveal(
    view_top: usize,
    view_bottom: usize,
    entry_top: usize,
    entry_bottom: usize,
) -> Option<usize> {
    if view_top <= entry_top {
        if view_bottom < entry_bottom {
            Some(view_top + (entry_bottom - view_bottom))
        } else {
            None
        }
    } else {
        Some(entry_top)
    }
}
