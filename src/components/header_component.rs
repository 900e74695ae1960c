use anyhow::Result;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::{Frame, symbols};

use crate::action::Action;
use crate::components::{Component, ComponentId};

/// Title of the query on the left, database and app version on the right.
#[derive(Default)]
pub struct HeaderComponent {
    title: String,
    database_id: Option<i64>,
    schema: Option<String>,
    scheduled: usize,
}

impl HeaderComponent {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    fn title_widget(&self) -> Line<'_> {
        Line::from(vec![
            Span::styled(
                concat!(" ", env!("CARGO_PKG_NAME"), " "),
                Style::default().fg(Color::Black).bg(Color::Cyan),
            ),
            Span::raw(" "),
            Span::styled(self.title.as_str(), Style::default().add_modifier(Modifier::BOLD)),
        ])
    }

    fn info_widget(&self) -> Line<'_> {
        let db = self.database_id.map(|id| format!("db {id}")).unwrap_or("db -".into());
        let schema = self.schema.as_deref().unwrap_or("-");
        let mut spans = vec![Span::styled(
            format!("[ {db} {} {schema} ", symbols::DOT),
            Style::default().fg(Color::Blue),
        )];
        if self.scheduled > 0 {
            spans.push(Span::styled(
                format!("{} scheduled ", self.scheduled),
                Style::default().fg(Color::Green),
            ));
        }
        spans.push(Span::styled(
            format!("{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::LightCyan),
        ));
        spans.push(Span::styled("]", Style::default().fg(Color::Blue)));
        Line::from(spans).alignment(Alignment::Right)
    }
}

impl Component for HeaderComponent {
    fn id(&self) -> ComponentId {
        ComponentId::Header
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Loaded(result) => {
                self.database_id = result.database_id;
                self.schema = result.schema.clone();
            }
            Action::QueryScheduled(_) => self.scheduled += 1,
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                .areas(area);

        frame.render_widget(self.title_widget(), left);
        frame.render_widget(self.info_widget(), right);

        Ok(())
    }
}
