use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Paragraph};

use super::{Component, ComponentId};
use crate::action::Action;
use crate::config::get_config_path;
use crate::widgets::scrollbar::Scroller;

const VERSION: &str =
    concat!(env!("CARGO_PKG_VERSION"), " - ", env!("VERGEN_GIT_DESCRIBE"));

#[derive(Debug, Default)]
pub struct HelpComponent {
    scroller: Scroller,
}

enum HelpRow<'a> {
    Empty,
    Title(Line<'a>),
    Entry { left: Span<'a>, right: Span<'a> },
}

impl<'a> HelpRow<'a> {
    fn key_title(s: impl Into<Span<'a>>) -> Self {
        Self::Title(Line::from(vec!["--- ".into(), s.into().italic().bold(), " ---".into()]))
    }

    fn entry(left: impl Into<Span<'a>>, right: impl Into<Span<'a>>) -> Self {
        Self::Entry { left: left.into(), right: right.into() }
    }
}

impl HelpComponent {
    fn rows<'a>() -> Vec<HelpRow<'a>> {
        let config_path = get_config_path()
            .map(|p| format!("'{}'", p.display()))
            .unwrap_or_else(|_| "-".into());
        vec![
            HelpRow::Empty,
            HelpRow::Empty,
            HelpRow::entry(Span::raw("Default configuration").bold(), config_path),
            HelpRow::entry(Span::raw("Version").bold(), VERSION),
            // >>> key bindings
            HelpRow::Empty,
            HelpRow::entry(Span::raw("Key").bold(), Span::raw("Description").bold()),
            // common key bindings
            HelpRow::key_title("common"),
            HelpRow::entry("?", "Toggle help"),
            HelpRow::entry("q / Ctrl+c", "Quits program"),
            HelpRow::entry("k / Up, j / Down", "navigation"),
            HelpRow::entry("g, G", "go to first, last"),
            HelpRow::entry("PageUp, Space / PageDown", "page up, down"),
            HelpRow::entry("Esc", "cancel / close"),
            // search / form input keys
            HelpRow::Empty,
            HelpRow::key_title("input box"),
            HelpRow::entry("Left, Right, Ctrl+Left, Ctrl+Right", "move cursor"),
            HelpRow::entry("Back, Ctrl+Back, Del, Ctrl-Del", "delete"),
            HelpRow::entry("Ctrl+u", "clear line"),
            HelpRow::entry("Home, End", "jump to line start, end"),
            HelpRow::entry("Enter, Esc", "leave filter box"),
            // results grid
            HelpRow::Empty,
            HelpRow::key_title("# Results"),
            HelpRow::entry("h / Left, l / Right", "select column"),
            HelpRow::entry("s / Enter, click header", "sort: ascending, descending, unsorted"),
            HelpRow::entry("<, >", "scroll columns"),
            HelpRow::entry("f, /", "filter rows"),
            HelpRow::entry("r", "reload result file, resets sort"),
            HelpRow::entry("v", "view SQL"),
            HelpRow::entry("S", "schedule query"),
            // sql viewer
            HelpRow::Empty,
            HelpRow::key_title("# SQL"),
            HelpRow::entry("Esc, q", "close"),
            // schedule form
            HelpRow::Empty,
            HelpRow::key_title("# Schedule query"),
            HelpRow::entry("Shift+Tab / Up, Tab / Down", "navigate fields"),
            HelpRow::entry("Left, Right, Space", "change choice"),
            HelpRow::entry("Enter", "next field / submit on button"),
            HelpRow::entry("Ctrl+s", "submit"),
            HelpRow::entry("Esc", "cancel"),
            HelpRow::Empty,
            HelpRow::Empty,
        ]
    }

    fn lines<'a>(gap: u16, center: u16) -> Vec<Line<'a>> {
        Self::rows()
            .into_iter()
            .map(|row| match row {
                HelpRow::Empty => Line::raw(""),
                HelpRow::Title(title) => {
                    let title_len = title.width() as u16;
                    // Center title around our weighted axis (center)
                    let pad_left = center.saturating_sub(title_len / 2);
                    let mut spans = vec![" ".repeat(pad_left as usize).into()];
                    spans.extend(title.spans);
                    Line::from(spans)
                }
                HelpRow::Entry { left, right } => {
                    let left_len = left.width() as u16;

                    // Pad left to align right-edge to center
                    let pad_left = center.saturating_sub(left_len).saturating_sub(gap / 2);
                    let spans = vec![
                        " ".repeat(pad_left as usize).into(),
                        left,
                        " ".repeat(gap as usize).into(),
                        right,
                    ];
                    Line::from(spans)
                }
            })
            .collect()
    }
}

impl Component for HelpComponent {
    fn id(&self) -> ComponentId {
        ComponentId::Help
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.scroller.handle_key_event(key) {
            return Ok(None);
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(Some(Action::Quit));
            }
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Char('?') => {
                return Ok(Some(Action::Unfocus));
            }
            _ => (),
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        frame.render_widget(Clear, area);

        // border
        let border = Block::bordered().border_type(BorderType::Rounded);
        let inner = border.inner(area);
        frame.render_widget(border, area);

        // content
        let gap = 4; // gap between key and description
        let center_x = (inner.width as f32 * 0.35) as u16;
        let lines = Self::lines(gap, center_x);

        self.scroller.length(lines.len(), inner.height as usize);
        let offset = (self.scroller.pos() as u16, 0u16);
        frame.render_widget(Paragraph::new(lines).scroll(offset), inner);

        // scrollbar
        self.scroller.render(frame, area);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_align_on_center() {
        let lines = HelpComponent::lines(4, 20);
        let reload = lines
            .iter()
            .map(|l| l.to_string())
            .find(|l| l.contains("reload result file"))
            .unwrap();
        // key ends two cells before the center, description starts two after
        assert_eq!(reload.find("reload"), Some(22));
        assert!(lines.iter().any(|l| l.to_string().trim() == "--- # Results ---"));
    }

    #[test]
    fn test_close_keys() {
        let mut help = HelpComponent::default();
        let action = help.handle_key_event(KeyEvent::from(KeyCode::Char('?'))).unwrap();
        assert!(matches!(action, Some(Action::Unfocus)));
        let action = help.handle_key_event(KeyEvent::from(KeyCode::Char('j'))).unwrap();
        assert!(action.is_none());
    }
}
