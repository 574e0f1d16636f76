//! Per-line styling passes applied on top of an entry's plain layout.
//!
//! Each pass takes an owned [`Line`] and returns a new one, so they chain
//! in the order the renderer needs: search highlight, fit to width, then
//! selection background.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Styles the renderer layers over parsed display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStyles {
    /// Patched onto every span of a selected entry. Only the background
    /// should be set, so parsed colors stay readable.
    pub selected: Style,
    /// Patched onto search matches.
    pub search_match: Style,
}

impl Default for RenderStyles {
    fn default() -> Self {
        Self {
            selected: Style::new().bg(Color::DarkGray),
            search_match: Style::new()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        }
    }
}

/// Split spans at every occurrence of `needle` and patch `style` onto the
/// matching pieces.
///
/// Matches are found on the concatenated line text, so a match may cross
/// span boundaries. Occurrences do not overlap. An empty needle leaves the
/// line unchanged.
pub fn highlight_matches(mut line: Line<'static>, needle: &str, style: Style) -> Line<'static> {
    if needle.is_empty() {
        return line;
    }
    let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
    let matches: Vec<(usize, usize)> = text
        .match_indices(needle)
        .map(|(start, m)| (start, start + m.len()))
        .collect();
    if matches.is_empty() {
        return line;
    }

    let mut spans = Vec::with_capacity(line.spans.len() + matches.len() * 2);
    let mut next_match = 0;
    let mut span_start = 0;
    for span in std::mem::take(&mut line.spans) {
        let content = span.content.as_ref();
        let span_end = span_start + content.len();
        let mut pos = span_start;

        while pos < span_end {
            while next_match < matches.len() && matches[next_match].1 <= pos {
                next_match += 1;
            }
            let (until, hit) = match matches.get(next_match) {
                Some(&(start, end)) if start <= pos => (end.min(span_end), true),
                Some(&(start, _)) => (start.min(span_end), false),
                None => (span_end, false),
            };
            let piece = &content[pos - span_start..until - span_start];
            let piece_style = if hit { span.style.patch(style) } else { span.style };
            spans.push(Span::styled(piece.to_string(), piece_style));
            pos = until;
        }
        span_start = span_end;
    }

    line.spans = spans;
    line
}

/// Pad with spaces or truncate so the line is exactly `width` columns.
///
/// A wide character that would straddle the edge is dropped and the gap
/// padded.
pub fn fit_to_width(mut line: Line<'static>, width: usize) -> Line<'static> {
    let mut used = 0;
    let mut spans = Vec::with_capacity(line.spans.len() + 1);

    for span in std::mem::take(&mut line.spans) {
        if used >= width {
            break;
        }
        let span_width = span.content.as_ref().width();
        if used + span_width <= width {
            used += span_width;
            spans.push(span);
            continue;
        }

        let mut piece = String::new();
        for ch in span.content.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if used + ch_width > width {
                break;
            }
            used += ch_width;
            piece.push(ch);
        }
        if !piece.is_empty() {
            spans.push(Span::styled(piece, span.style));
        }
        break;
    }

    if used < width {
        spans.push(Span::raw(" ".repeat(width - used)));
    }
    line.spans = spans;
    line
}

/// Drop the first `columns` display columns, for horizontal scrolling.
///
/// A wide character cut in half is replaced by spaces for its remaining
/// columns.
pub fn skip_columns(mut line: Line<'static>, columns: usize) -> Line<'static> {
    if columns == 0 {
        return line;
    }
    let mut skipped = 0;
    let mut spans = Vec::with_capacity(line.spans.len());

    for span in std::mem::take(&mut line.spans) {
        if skipped >= columns {
            spans.push(span);
            continue;
        }
        let span_width = span.content.as_ref().width();
        if skipped + span_width <= columns {
            skipped += span_width;
            continue;
        }

        let mut piece = String::new();
        for ch in span.content.chars() {
            if skipped < columns {
                skipped += ch.width().unwrap_or(0);
                if skipped > columns {
                    piece.push_str(&" ".repeat(skipped - columns));
                }
                continue;
            }
            piece.push(ch);
        }
        spans.push(Span::styled(piece, span.style));
    }

    line.spans = spans;
    line
}

/// Patch the selection style onto the line and all of its spans.
pub fn apply_selection(mut line: Line<'static>, style: Style) -> Line<'static> {
    line.style = line.style.patch(style);
    for span in &mut line.spans {
        span.style = span.style.patch(style);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn red() -> Style {
        Style::new().fg(Color::Red)
    }

    fn mark() -> Style {
        Style::new().bg(Color::Yellow)
    }

    // ===== highlight_matches =====

    #[test]
    fn highlight_splits_span_around_match() {
        let line = Line::from("an error occurred");
        let line = highlight_matches(line, "error", mark());

        let pieces: Vec<(&str, bool)> = line
            .spans
            .iter()
            .map(|s| (s.content.as_ref(), s.style.bg == Some(Color::Yellow)))
            .collect();
        assert_eq!(
            pieces,
            vec![("an ", false), ("error", true), (" occurred", false)]
        );
    }

    #[test]
    fn highlight_crosses_span_boundaries_and_keeps_colors() {
        let line = Line::from(vec![Span::styled("ab", red()), Span::raw("cd")]);
        let line = highlight_matches(line, "bc", mark());

        assert_eq!(text_of(&line), "abcd");
        assert_eq!(line.spans.len(), 4);
        assert_eq!(line.spans[1].content, "b");
        assert_eq!(line.spans[1].style, red().patch(mark()));
        assert_eq!(line.spans[2].content, "c");
        assert_eq!(line.spans[2].style, mark());
    }

    #[test]
    fn highlight_marks_every_occurrence() {
        let line = highlight_matches(Line::from("aXaXa"), "a", mark());
        let marked = line
            .spans
            .iter()
            .filter(|s| s.style.bg == Some(Color::Yellow))
            .count();
        assert_eq!(marked, 3);
    }

    #[test]
    fn highlight_without_match_is_unchanged() {
        let line = Line::from(vec![Span::styled("abc", red())]);
        assert_eq!(highlight_matches(line.clone(), "zzz", mark()), line);
        assert_eq!(highlight_matches(line.clone(), "", mark()), line);
    }

    // ===== fit_to_width =====

    #[test]
    fn short_line_is_padded() {
        let line = fit_to_width(Line::from("abc"), 6);
        assert_eq!(text_of(&line), "abc   ");
        assert_eq!(line.width(), 6);
    }

    #[test]
    fn long_line_is_truncated_keeping_styles() {
        let line = Line::from(vec![Span::styled("abc", red()), Span::raw("defgh")]);
        let line = fit_to_width(line, 5);

        assert_eq!(text_of(&line), "abcde");
        assert_eq!(line.spans[0].style, red());
    }

    #[test]
    fn wide_char_at_edge_is_replaced_by_padding() {
        let line = fit_to_width(Line::from("a日本"), 4);
        assert_eq!(text_of(&line), "a日 ");
        assert_eq!(line.width(), 4);
    }

    #[test]
    fn empty_line_becomes_blank_row() {
        let line = fit_to_width(Line::default(), 3);
        assert_eq!(text_of(&line), "   ");
    }

    // ===== skip_columns =====

    #[test]
    fn skip_columns_drops_prefix_across_spans() {
        let line = Line::from(vec![Span::styled("abc", red()), Span::raw("def")]);
        let line = skip_columns(line, 4);
        assert_eq!(text_of(&line), "ef");
    }

    #[test]
    fn skip_columns_splits_wide_char() {
        let line = skip_columns(Line::from("日本"), 1);
        assert_eq!(text_of(&line), " 本");
    }

    // ===== apply_selection =====

    #[test]
    fn selection_sets_background_only() {
        let line = Line::from(vec![Span::styled("x", red())]);
        let line = apply_selection(line, Style::new().bg(Color::DarkGray));

        assert_eq!(line.spans[0].style.fg, Some(Color::Red));
        assert_eq!(line.spans[0].style.bg, Some(Color::DarkGray));
    }
}
