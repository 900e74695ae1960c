use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::prelude::{Color, Line, Span, Style};
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph};

use crate::action::Action;
use crate::components::{Component, ComponentId};
use crate::utils::sql_highlight::highlight;
use crate::utils::text_ui::{TOP_TITLE_LEFT, TOP_TITLE_RIGHT, popup_area};
use crate::widgets::scrollbar::Scroller;
use crate::widgets::shortcut::Shortcut;

/// Modal showing the query text with syntax highlighting.
#[derive(Debug, Default)]
pub struct SqlViewerComponent {
    title: String,
    sql: String,
    scroller: Scroller,
}

impl SqlViewerComponent {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }
}

impl Component for SqlViewerComponent {
    fn id(&self) -> ComponentId {
        ComponentId::SqlViewer
    }

    fn shortcuts(&self) -> Vec<Shortcut> {
        vec![Shortcut::key("scroll", "j/k"), Shortcut::key("close", "Esc")]
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.scroller.handle_key_event(key) {
            return Ok(None);
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Ok(Some(Action::Unfocus)),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Loaded(result) => self.sql = result.sql.clone(),
            Action::ShowSql => return Ok(Some(Action::Focus(ComponentId::SqlViewer))),
            Action::Focus(ComponentId::SqlViewer) => self.scroller.first(),
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let area = popup_area(area, 80, 70);

        let title_line = Line::from(vec![
            Span::raw(TOP_TITLE_LEFT),
            Span::styled(self.title.as_str(), Color::LightCyan),
            Span::raw(TOP_TITLE_RIGHT),
        ]);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Color::LightBlue)
            .title(title_line)
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);

        let lines = if self.sql.trim().is_empty() {
            vec![Line::styled("(no SQL)", Style::default().fg(Color::DarkGray))]
        } else {
            highlight(&self.sql)
        };
        self.scroller.length(lines.len(), inner.height as usize);
        let paragraph =
            Paragraph::new(lines).scroll((self.scroller.pos() as u16, 0)).block(block);

        frame.render_widget(Clear, area);
        frame.render_widget(paragraph, area);
        self.scroller.render(frame, area);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::models::query_result::QueryResult;

    fn viewer(sql: &str) -> SqlViewerComponent {
        let mut viewer = SqlViewerComponent::new("Query");
        let result = QueryResult { sql: sql.into(), ..QueryResult::default() };
        viewer.update(Action::Loaded(Arc::new(result))).unwrap();
        viewer
    }

    fn draw(viewer: &mut SqlViewerComponent) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(50, 20)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                viewer.draw(frame, area).unwrap();
            })
            .unwrap();
        terminal
    }

    #[test]
    fn test_keyword_highlighted() {
        let mut viewer = viewer("SELECT a\nFROM t");
        let terminal = draw(&mut viewer);
        let buffer = terminal.backend().buffer();
        let (x, y) = (0..50u16)
            .flat_map(|x| (0..20u16).map(move |y| (x, y)))
            .find(|&(x, y)| buffer[(x, y)].symbol() == "S")
            .unwrap();
        assert_eq!(buffer[(x, y)].fg, Color::Rgb(0xd7, 0x3a, 0x49));
        assert_eq!(buffer[(x, y + 1)].symbol(), "F");
    }

    #[test]
    fn test_scroll_and_close() {
        let sql = (0..40).map(|i| format!("SELECT {i}")).collect::<Vec<_>>().join("\n");
        let mut viewer = viewer(&sql);
        draw(&mut viewer);
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert!(viewer.handle_key_event(key(KeyCode::Char('j'))).unwrap().is_none());
        assert_eq!(viewer.scroller.pos(), 1);
        viewer.handle_key_event(key(KeyCode::Char('G'))).unwrap();
        assert!(viewer.scroller.pos() > 1);

        let action = viewer.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert!(matches!(action, Some(Action::Unfocus)));
    }
}
