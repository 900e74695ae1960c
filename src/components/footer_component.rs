use anyhow::Result;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::action::Action;
use crate::components::{Component, ComponentId};
use crate::widgets::shortcut::{Fragment, Shortcut};

/// Key hints of the focused component, after the global ones.
pub struct FooterComponent {
    shortcuts: Vec<Shortcut>,
}

fn default_shortcuts() -> Vec<Shortcut> {
    vec![
        Shortcut::new(vec![Fragment::raw("help "), Fragment::hl("?")]),
        Shortcut::new(vec![Fragment::raw("quit "), Fragment::hl("q")]),
    ]
}

impl Default for FooterComponent {
    fn default() -> Self {
        Self { shortcuts: default_shortcuts() }
    }
}

impl FooterComponent {
    fn shortcuts_line(&self) -> Line<'_> {
        let sep = Style::default().fg(Color::DarkGray);
        let mut spans = Vec::with_capacity(self.shortcuts.len() * 4);
        for (i, shortcut) in self.shortcuts.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" | ", sep));
            }
            spans.extend(shortcut.spans(None));
        }
        Line::from(spans)
    }
}

impl Component for FooterComponent {
    fn id(&self) -> ComponentId {
        ComponentId::Footer
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        if let Action::Shortcuts(shortcuts) = action {
            let mut sc = default_shortcuts();
            sc.extend(shortcuts);
            self.shortcuts = sc;
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        frame.render_widget(self.shortcuts_line(), area);
        Ok(())
    }
}
