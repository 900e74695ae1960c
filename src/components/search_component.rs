use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::prelude::Line;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use tokio::sync::mpsc::UnboundedSender;
use tui_input::{Input, InputRequest};

use crate::action::Action;
use crate::components::{Component, ComponentId};
use crate::widgets::shortcut::{Fragment, Shortcut};

/// Filter text box above the grid. Edits are sent on the next tick, not per key.
#[derive(Debug, Clone, Default)]
pub struct SearchComponent {
    is_active: bool,
    should_send: bool,
    input: Input,
    action_tx: Option<UnboundedSender<Action>>,
}

/// Maps editing keys of a single line text box.
pub fn input_request(key: KeyEvent) -> Option<InputRequest> {
    use KeyCode::*;
    use tui_input::InputRequest::*;

    match (key.code, key.modifiers) {
        (Backspace, KeyModifiers::NONE) => Some(DeletePrevChar),
        (Delete, KeyModifiers::NONE) => Some(DeleteNextChar),
        (Left, KeyModifiers::NONE) => Some(GoToPrevChar),
        (Left, KeyModifiers::CONTROL) => Some(GoToPrevWord),
        (Right, KeyModifiers::NONE) => Some(GoToNextChar),
        (Right, KeyModifiers::CONTROL) => Some(GoToNextWord),
        (Char('w'), KeyModifiers::CONTROL)
        | (Backspace, KeyModifiers::META)
        | (Backspace, KeyModifiers::ALT) => Some(DeletePrevWord),
        (Delete, KeyModifiers::CONTROL) => Some(DeleteNextWord),
        (Char('u'), KeyModifiers::CONTROL) => Some(DeleteLine),
        (Home, KeyModifiers::NONE) => Some(GoToStart),
        (End, KeyModifiers::NONE) => Some(GoToEnd),
        (Char(c), KeyModifiers::NONE) => Some(InsertChar(c)),
        (Char(c), KeyModifiers::SHIFT) => Some(InsertChar(c)),
        (_, _) => None,
    }
}

impl SearchComponent {
    fn pattern(&self) -> Option<String> {
        Some(self.input.value()).map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned)
    }

    fn send(&mut self) -> Result<()> {
        if self.should_send
            && let Some(tx) = &self.action_tx
        {
            tx.send(Action::SearchInputChanged(self.pattern()))?;
            self.should_send = false;
        }
        Ok(())
    }
}

impl Component for SearchComponent {
    fn id(&self) -> ComponentId {
        ComponentId::Search
    }

    fn shortcuts(&self) -> Vec<Shortcut> {
        vec![
            Shortcut::new(vec![Fragment::raw("done "), Fragment::hl("↵")]),
            Shortcut::new(vec![Fragment::raw("clear "), Fragment::hl("^u")]),
        ]
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(Some(Action::Quit));
            }
            KeyCode::Enter | KeyCode::Esc => {
                self.is_active = false;
                self.send()?;
                return Ok(Some(Action::Unfocus));
            }
            _ => {
                if let Some(req) = input_request(key) {
                    self.should_send |= self.input.handle(req).is_some_and(|r| r.value);
                }
            }
        }
        Ok(None)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Focus(ComponentId::Search) => self.is_active = true,
            Action::Unfocus => self.is_active = false,
            Action::SearchInputSet(pattern) => {
                self.input = pattern.unwrap_or_default().into();
                self.should_send = true;
                self.send()?;
            }
            Action::Tick => self.send()?,
            _ => (),
        }

        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let style = if self.is_active {
            Style::default().fg(Color::LightBlue)
        } else {
            Style::default()
        };

        let width = area.width.max(3) - 3;
        let scroll = self.input.visual_scroll(width as usize);
        let title = Shortcut::from("filter", 0)?;
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(style)
            .title(Line::from(&title));
        let input = Paragraph::new(self.input.value())
            .scroll((0, scroll as u16))
            .style(style)
            .block(block);
        frame.render_widget(input, area);
        if self.is_active {
            let x = self.input.visual_cursor().max(scroll) - scroll + 1;
            frame.set_cursor_position((area.x + x as u16, area.y + 1));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_send_on_tick() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut search = SearchComponent::default();
        search.register_action_handler(tx).unwrap();
        search.update(Action::Focus(ComponentId::Search)).unwrap();

        for c in " b1 ".chars() {
            search.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
        assert!(rx.try_recv().is_err());

        search.update(Action::Tick).unwrap();
        match rx.try_recv() {
            Ok(Action::SearchInputChanged(p)) => assert_eq!(p.as_deref(), Some("b1")),
            other => panic!("unexpected {other:?}"),
        }
        // nothing new to send
        search.update(Action::Tick).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_enter_unfocuses() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut search = SearchComponent::default();
        search.register_action_handler(tx).unwrap();
        search.handle_key_event(key(KeyCode::Char('x'))).unwrap();
        let action = search.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(matches!(action, Some(Action::Unfocus)));
        assert!(matches!(rx.try_recv(), Ok(Action::SearchInputChanged(Some(p))) if p == "x"));
    }

    #[test]
    fn test_preset_pattern() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut search = SearchComponent::default();
        search.register_action_handler(tx).unwrap();
        search.update(Action::SearchInputSet(Some("100".into()))).unwrap();
        assert_eq!(search.input.value(), "100");
        assert!(matches!(rx.try_recv(), Ok(Action::SearchInputChanged(Some(p))) if p == "100"));
    }
}
