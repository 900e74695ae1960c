use std::borrow::Cow;

use const_format::concatcp;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols::line::{TOP_LEFT, TOP_RIGHT};
use ratatui::text::{Line, Span};
use unicode_segmentation::UnicodeSegmentation;

pub const TOP_TITLE_LEFT: &str = concatcp!(TOP_RIGHT, " ");
pub const TOP_TITLE_RIGHT: &str = concatcp!(" ", TOP_LEFT);

const ELLIPSIS: &str = "…";

pub fn top_title_line<S: Into<Style>>(title: &'_ str, title_style: S) -> Line<'_> {
    Line::from(vec![
        Span::raw(TOP_TITLE_LEFT),
        Span::styled(title, title_style),
        Span::raw(TOP_TITLE_RIGHT),
    ])
}

/// Centered rect taking the given percentages of `area`.
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

/// Display width of `text` in terminal cells.
pub fn text_width(text: &str) -> usize {
    Span::raw(text).width()
}

/// Cuts `text` to at most `width` cells on grapheme boundaries, marking the cut with `…`.
/// Only the first line is kept.
pub fn truncate(text: &str, width: usize) -> Cow<'_, str> {
    let (first_line, multiline) = match text.split_once('\n') {
        Some((first, _)) => (first.trim_end_matches('\r'), true),
        None => (text, false),
    };
    if !multiline && text_width(first_line) <= width {
        return Cow::Borrowed(text);
    }
    if width == 0 {
        return Cow::Borrowed("");
    }

    let budget = width - 1; // room for the ellipsis
    let mut used = 0;
    let mut out = String::with_capacity(first_line.len().min(width * 4));
    for g in first_line.graphemes(true) {
        let w = text_width(g);
        if used + w > budget {
            break;
        }
        used += w;
        out.push_str(g);
    }
    out.push_str(ELLIPSIS);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_fits() {
        assert!(matches!(truncate("abc", 3), Cow::Borrowed("abc")));
        assert_eq!(truncate("", 0), "");
    }

    #[test]
    fn test_truncate_cut() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abcdef", 1), "…");
        assert_eq!(truncate("abcdef", 0), "");
    }

    #[test]
    fn test_truncate_wide_and_combining() {
        // each CJK char takes two cells
        assert_eq!(truncate("数据库表", 5), "数据…");
        // `é` as `e` + combining accent stays one grapheme
        assert_eq!(truncate("e\u{301}e\u{301}e\u{301}", 2), "e\u{301}…");
    }

    #[test]
    fn test_truncate_multiline() {
        assert_eq!(truncate("line one\nline two", 20), "line one…");
    }

    #[test]
    fn test_popup_area() {
        let area = popup_area(Rect::new(0, 0, 100, 40), 80, 50);
        assert_eq!(area, Rect::new(10, 10, 80, 20));
    }
}
