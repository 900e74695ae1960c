use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Margin, Rect};
use ratatui::symbols::line;
use ratatui::widgets::{Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::utils::symbols::arrow;

/// Vertical scroll position over `content_length` lines, `viewport_content_length` visible.
#[derive(Debug)]
pub struct Scroller {
    step: usize,
    position: usize,
    content_length: usize,
    viewport_content_length: usize,

    state: ScrollbarState,
}

impl Default for Scroller {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Scroller {
    pub fn new(step: usize) -> Self {
        Self {
            step: step.max(1),
            position: 0,
            content_length: 0,
            viewport_content_length: 0,
            state: Default::default(),
        }
    }

    fn position(&mut self, position: usize) -> &mut Self {
        self.position = position;
        self.state = self.state.position(position);
        self
    }

    /// Updates the lengths, clamping the position when the content shrank.
    pub fn length(&mut self, content_length: usize, viewport_content_length: usize) -> &mut Self {
        self.content_length = content_length;
        self.viewport_content_length = viewport_content_length;
        self.state = self
            .state
            .content_length(self.max_pos())
            .viewport_content_length(viewport_content_length);
        if self.position > self.max_pos() {
            self.position(self.max_pos());
        }
        self
    }

    fn max_pos(&self) -> usize {
        let max = self.content_length.saturating_sub(self.viewport_content_length);
        max.div_ceil(self.step) * self.step
    }

    pub fn first(&mut self) {
        self.position(0);
    }

    pub fn last(&mut self) {
        self.position(self.max_pos());
    }

    pub fn next(&mut self) {
        let pos = self.position.saturating_add(self.step).min(self.max_pos());
        self.position(pos);
    }

    pub fn prev(&mut self) {
        self.position(self.position.saturating_sub(self.step));
    }

    pub fn page_down(&mut self) {
        let pos = self.position.saturating_add(self.viewport_content_length).min(self.max_pos());
        self.position(pos);
    }

    pub fn page_up(&mut self) {
        self.position(self.position.saturating_sub(self.viewport_content_length));
    }

    /// Scrolls so that line `index` is visible.
    pub fn reveal(&mut self, index: usize) {
        if index < self.position {
            self.position(index);
        } else if self.viewport_content_length > 0
            && index >= self.position + self.viewport_content_length
        {
            let pos = (index + 1).saturating_sub(self.viewport_content_length).min(self.max_pos());
            self.position(pos);
        }
    }

    pub fn pos(&self) -> usize {
        self.position
    }

    pub fn end_pos(&self) -> usize {
        self.position.saturating_add(self.viewport_content_length).min(self.content_length)
    }

    pub fn content_length(&self) -> usize {
        self.content_length
    }

    pub fn viewport_content_length(&self) -> usize {
        self.viewport_content_length
    }

    /// `j`/`k`/arrows, `g`/`G`, page keys. Returns whether the key was consumed.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('g') | KeyCode::Home => self.first(),
            KeyCode::Char('G') | KeyCode::End => self.last(),
            KeyCode::Char('j') | KeyCode::Down => self.next(),
            KeyCode::Char('k') | KeyCode::Up => self.prev(),
            KeyCode::PageDown | KeyCode::Char(' ') => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            _ => return false,
        }
        true
    }

    /// Draws the scrollbar on the right border of `area`, nothing if everything fits.
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.content_length <= self.viewport_content_length {
            return;
        }
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .track_symbol(Some(line::VERTICAL))
                .begin_symbol(Some(arrow::UP))
                .end_symbol(Some(arrow::DOWN)),
            area.inner(Margin::new(0, 1)),
            &mut self.state,
        );
    }
}
