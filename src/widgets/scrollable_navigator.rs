use std::ops::Range;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::widgets::scrollbar::Scroller;

/// A focused item over a scrolled list; focus always stays inside the viewport.
#[derive(Debug, Default)]
pub struct ScrollableNavigator {
    pub focused: Option<usize>,
    pub scroller: Scroller,
}

impl ScrollableNavigator {
    pub fn length(&mut self, content_length: usize, viewport_content_length: usize) -> &mut Self {
        self.scroller.length(content_length, viewport_content_length);
        if let Some(focused) = self.focused
            && focused >= content_length
        {
            self.focused = content_length.checked_sub(1);
        }
        self
    }

    /// Indices of the items in the viewport.
    pub fn visible(&self) -> Range<usize> {
        self.scroller.pos()..self.scroller.end_pos()
    }

    fn focus(&mut self, index: usize) {
        let Some(last) = self.scroller.content_length().checked_sub(1) else {
            self.focused = None;
            return;
        };
        let index = index.min(last);
        self.focused = Some(index);
        self.scroller.reveal(index);
    }

    /// Focuses the `offset`-th visible item, e.g. after a mouse click.
    pub fn focus_visible(&mut self, offset: usize) {
        let index = self.scroller.pos() + offset;
        if index < self.scroller.end_pos() {
            self.focus(index);
        }
    }

    pub fn reset(&mut self) {
        self.focused = None;
        self.scroller.first();
    }

    pub fn first(&mut self) {
        self.focus(0);
    }

    pub fn last(&mut self) {
        self.focus(usize::MAX);
    }

    pub fn next(&mut self, step: usize) {
        match self.focused {
            None => self.focus(self.scroller.pos()),
            Some(focused) => self.focus(focused.saturating_add(step)),
        }
    }

    pub fn prev(&mut self, step: usize) {
        match self.focused {
            None => self.focus(self.scroller.end_pos().saturating_sub(1)),
            Some(focused) => self.focus(focused.saturating_sub(step)),
        }
    }

    pub fn page_down(&mut self) {
        let page = self.scroller.viewport_content_length().max(1);
        match self.focused {
            None => self.focus(self.scroller.pos()),
            Some(focused) => {
                self.scroller.page_down();
                self.focus(focused.saturating_add(page));
            }
        }
    }

    pub fn page_up(&mut self) {
        let page = self.scroller.viewport_content_length().max(1);
        match self.focused {
            None => self.focus(self.scroller.end_pos().saturating_sub(1)),
            Some(focused) => {
                self.scroller.page_up();
                self.focus(focused.saturating_sub(page));
            }
        }
    }

    /// Vertical navigation keys, returns `true` if the key was handled.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('g') | KeyCode::Home => self.first(),
            KeyCode::Char('G') | KeyCode::End => self.last(),
            KeyCode::Char('j') | KeyCode::Down => self.next(1),
            KeyCode::Char('k') | KeyCode::Up => self.prev(1),
            KeyCode::PageDown | KeyCode::Char(' ') => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            _ => return false,
        }
        true
    }

    #[inline]
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.scroller.render(frame, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn navigator(len: usize, viewport: usize) -> ScrollableNavigator {
        let mut navigator = ScrollableNavigator::default();
        navigator.length(len, viewport);
        navigator
    }

    #[test]
    fn test_empty() {
        let mut navigator = navigator(0, 4);
        navigator.last();
        navigator.next(1);
        assert_eq!(navigator.focused, None);
        assert_eq!(navigator.visible(), 0..0);
    }

    #[test]
    fn test_next_scrolls() {
        let mut navigator = navigator(20, 4);
        navigator.next(1);
        assert_eq!(navigator.focused, Some(0));
        navigator.next(3);
        assert_eq!(navigator.focused, Some(3));
        assert_eq!(navigator.visible(), 0..4);
        navigator.next(1);
        assert_eq!(navigator.focused, Some(4));
        assert_eq!(navigator.visible(), 1..5);
    }

    #[test]
    fn test_prev_from_none_starts_at_bottom() {
        let mut navigator = navigator(20, 4);
        navigator.prev(1);
        assert_eq!(navigator.focused, Some(3));
        navigator.prev(5);
        assert_eq!(navigator.focused, Some(0));
    }

    #[test]
    fn test_goto() {
        let mut navigator = navigator(20, 4);
        navigator.last();
        assert_eq!(navigator.focused, Some(19));
        assert_eq!(navigator.visible(), 16..20);
        navigator.first();
        assert_eq!(navigator.focused, Some(0));
        assert_eq!(navigator.visible(), 0..4);
    }

    #[test]
    fn test_pages() {
        let mut navigator = navigator(20, 4);
        navigator.page_down();
        assert_eq!(navigator.focused, Some(0));
        navigator.page_down();
        assert_eq!(navigator.focused, Some(4));
        assert_eq!(navigator.visible(), 4..8);
        navigator.page_up();
        assert_eq!(navigator.focused, Some(0));
        assert_eq!(navigator.visible(), 0..4);
    }

    #[test]
    fn test_shrink_keeps_focus_in_range() {
        let mut navigator = navigator(20, 4);
        navigator.last();
        navigator.length(3, 4);
        assert_eq!(navigator.focused, Some(2));
        assert_eq!(navigator.visible(), 0..3);
        navigator.length(0, 4);
        assert_eq!(navigator.focused, None);
    }

    #[test]
    fn test_focus_visible() {
        let mut navigator = navigator(20, 4);
        navigator.last();
        navigator.focus_visible(1);
        assert_eq!(navigator.focused, Some(17));
        // outside the viewport is ignored
        navigator.focus_visible(9);
        assert_eq!(navigator.focused, Some(17));
    }
}
