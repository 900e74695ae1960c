use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Margin, Rect};
use ratatui::prelude::{Color, Line, Modifier, Span, Style};
use ratatui::widgets::{Block, BorderType, Clear, Paragraph, Wrap};
use time::OffsetDateTime;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};
use tui_input::Input;

use crate::action::Action;
use crate::components::schedule_form::{FieldError, FormField, ScheduleForm};
use crate::components::search_component::input_request;
use crate::components::{Component, ComponentId};
use crate::models::query_result::QueryResult;
use crate::models::schedule::ScheduleConfig;
use crate::utils::symbols::triangle;
use crate::utils::text_ui::{popup_area, top_title_line};
use crate::widgets::button::Button;
use crate::widgets::shortcut::{Fragment, Shortcut};

const LINE_HEIGHT: u16 = 3;
const SUBMIT: &str = "Schedule";
const TITLE: &str = "schedule query";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    /// index into `ScheduleForm::fields`
    Field(usize),
    Submit,
}

/// One block of the form body, in render order.
enum Item<'a> {
    Text(Line<'a>),
    Field(usize),
    Submit,
}

/// Modal form that turns the loaded query into a scheduled query.
#[derive(Default)]
pub struct ScheduleQueryComponent {
    conf: ScheduleConfig,
    label: Option<String>,
    query: Option<Arc<QueryResult>>,

    form: Option<ScheduleForm>,
    focused: Option<Focus>,
    input: Input,
    errors: Vec<FieldError>,

    action_tx: Option<UnboundedSender<Action>>,
}

impl ScheduleQueryComponent {
    pub fn new(conf: ScheduleConfig, label: Option<String>) -> Self {
        Self { conf, label, ..Self::default() }
    }

    /// Reason scheduling is unavailable, if it is.
    fn disabled_reason(&self) -> Option<&'static str> {
        if !self.conf.is_enabled() {
            return Some(
                "Scheduling is not configured, set `scheduled-queries.json-schema` in the \
                 config file.",
            );
        }
        if self.query.as_ref().is_none_or(|q| q.sql.trim().is_empty()) {
            return Some("The query has no SQL text to schedule.");
        }
        None
    }

    fn show(&mut self, now: OffsetDateTime) {
        let Some(query) = &self.query else {
            return;
        };
        let form = ScheduleForm::new(&self.conf, query, self.label.as_deref(), now);
        self.focused = Self::focus_order(&form).first().copied();
        self.form = Some(form);
        self.errors.clear();
        self.load_input();
    }

    fn hide(&mut self) {
        self.form = None;
        self.focused = None;
        self.input.reset();
        self.errors.clear();
    }

    /// Editable fields, then the submit button.
    fn focus_order(form: &ScheduleForm) -> Vec<Focus> {
        form.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_editable())
            .map(|(i, _)| Focus::Field(i))
            .chain([Focus::Submit])
            .collect()
    }

    fn focused_field(&mut self) -> Option<&mut FormField> {
        match (self.focused, self.form.as_mut()) {
            (Some(Focus::Field(i)), Some(form)) => form.fields.get_mut(i),
            _ => None,
        }
    }

    /// Copies the text box back into the focused field.
    fn store_input(&mut self) {
        let value = self.input.value().to_owned();
        if let Some(field) = self.focused_field() {
            field.value = value;
        }
    }

    fn load_input(&mut self) {
        let value = self.focused_field().map(|f| f.value.clone()).unwrap_or_default();
        self.input = value.into();
    }

    fn move_focus(&mut self, forward: bool) {
        self.store_input();
        let Some(form) = &self.form else {
            return;
        };
        let order = Self::focus_order(form);
        let len = order.len();
        let current = self.focused.and_then(|f| order.iter().position(|o| *o == f));
        let next = match current {
            None => 0,
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
        };
        self.focused = order.get(next).copied();
        self.load_input();
    }

    fn cycle_choice(&mut self, forward: bool) -> bool {
        let Some(field) = self.focused_field().filter(|f| f.choices().is_some()) else {
            return false;
        };
        field.cycle(forward);
        self.load_input();
        true
    }

    fn submit(&mut self, now: OffsetDateTime) -> Result<Option<Action>> {
        self.store_input();
        let Some(form) = &self.form else {
            return Ok(None);
        };
        match form.submit(now) {
            Ok(query) => {
                info!(label = %query.label, "Query scheduled");
                if let Some(tx) = &self.action_tx {
                    tx.send(Action::QueryScheduled(Box::new(query)))?;
                }
                self.hide();
                Ok(Some(Action::Unfocus))
            }
            Err(errors) => {
                debug!("Schedule form rejected: {errors:?}");
                let order = Self::focus_order(form);
                let first_invalid = order.iter().copied().find(|f| match f {
                    Focus::Field(i) => errors.iter().any(|e| e.field == form.fields[*i].key),
                    Focus::Submit => false,
                });
                self.errors = errors;
                if let Some(focus) = first_invalid {
                    self.focused = Some(focus);
                    self.load_input();
                }
                Ok(None)
            }
        }
    }

    fn field_error(&self, key: &str) -> Option<&str> {
        self.errors.iter().find(|e| e.field == key).map(|e| e.message.as_str())
    }

    /// Errors not attached to any visible field.
    fn form_errors(&self) -> Vec<&FieldError> {
        let Some(form) = &self.form else {
            return vec![];
        };
        self.errors
            .iter()
            .filter(|e| !form.fields.iter().any(|f| !f.hidden && f.key == e.field))
            .collect()
    }

    fn items(&self) -> Vec<Item<'_>> {
        let Some(form) = &self.form else {
            return vec![];
        };
        let mut items = Vec::new();
        if let Some(title) = &form.title {
            let style = Style::default().fg(Color::LightCyan).add_modifier(Modifier::BOLD);
            items.push(Item::Text(Line::styled(title.as_str(), style)));
        }
        if let Some(description) = &form.description {
            items.push(Item::Text(Line::styled(description.as_str(), Color::Gray)));
        }
        for (i, field) in form.fields.iter().enumerate() {
            if !field.hidden {
                items.push(Item::Field(i));
            }
        }
        for error in self.form_errors() {
            let text = if error.field.is_empty() {
                error.message.clone()
            } else {
                format!("{}: {}", error.field, error.message)
            };
            items.push(Item::Text(Line::styled(text, Color::Red)));
        }
        items.push(Item::Submit);
        if let Some(warning) = &form.warning {
            items.push(Item::Text(Line::styled(warning.as_str(), Color::Yellow)));
        }
        items
    }

    /// Line under a field box: its error, else its help or description.
    fn field_note<'a>(&'a self, field: &'a FormField) -> Option<Line<'a>> {
        if let Some(error) = self.field_error(&field.key) {
            return Some(Line::styled(error, Color::Red));
        }
        field
            .help
            .as_deref()
            .or(field.description.as_deref())
            .map(|s| Line::styled(s, Color::DarkGray))
    }

    fn item_height(&self, item: &Item, width: u16) -> u16 {
        match item {
            Item::Text(line) => (line.width() as u16).div_ceil(width.max(1)).max(1),
            Item::Field(i) => match self.form.as_ref().map(|f| &f.fields[*i]) {
                Some(field) => LINE_HEIGHT + u16::from(self.field_note(field).is_some()),
                None => 0,
            },
            Item::Submit => LINE_HEIGHT,
        }
    }

    fn render_field(&self, frame: &mut Frame, area: Rect, index: usize) {
        let Some(field) = self.form.as_ref().map(|f| &f.fields[index]) else {
            return;
        };
        let focused = self.focused == Some(Focus::Field(index));
        let border_color = if self.field_error(&field.key).is_some() {
            Color::Red
        } else if focused {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let title = if field.required { format!("{} *", field.title) } else { field.title.clone() };
        let block = Block::bordered()
            .title(title)
            .border_type(BorderType::Rounded)
            .border_style(border_color);

        let value = if focused { self.input.value() } else { field.value.as_str() };
        let text_style = if field.disabled {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let line = match (&field.placeholder, value.is_empty()) {
            (Some(placeholder), true) => Line::styled(
                placeholder.as_str(),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
            _ if field.choices().is_some() => Line::from(vec![
                Span::styled(format!("{} ", triangle::LEFT), Color::DarkGray),
                Span::styled(value, text_style),
                Span::styled(format!(" {}", triangle::RIGHT), Color::DarkGray),
            ]),
            _ => Line::styled(value, text_style),
        };
        let box_area = Rect { height: LINE_HEIGHT.min(area.height), ..area };
        frame.render_widget(Paragraph::new(line).block(block), box_area);
        if focused && field.choices().is_none() {
            let x = (self.input.visual_cursor() as u16 + 1).min(area.width.saturating_sub(2));
            frame.set_cursor_position((area.x + x, area.y + 1));
        }

        if let Some(note) = self.field_note(field)
            && area.height > LINE_HEIGHT
        {
            let note_area = Rect { y: area.y + LINE_HEIGHT, height: 1, ..area };
            frame.render_widget(Paragraph::new(note), note_area.inner(Margin::new(1, 0)));
        }
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let items = self.items();
        let heights: Vec<u16> = items.iter().map(|i| self.item_height(i, area.width)).collect();

        // skip leading items until the focused one fits
        let focused_item = items.iter().position(|item| match (item, self.focused) {
            (Item::Field(i), Some(Focus::Field(f))) => *i == f,
            (Item::Submit, Some(Focus::Submit)) => true,
            _ => false,
        });
        let mut skip = 0;
        if let Some(end) = focused_item {
            while skip < end && heights[skip..=end].iter().sum::<u16>() > area.height {
                skip += 1;
            }
        }

        let mut y = area.y;
        for (item, height) in items.iter().zip(&heights).skip(skip) {
            if y >= area.bottom() {
                break;
            }
            let rect = Rect { y, height: (*height).min(area.bottom() - y), ..area };
            match item {
                Item::Text(line) => {
                    let paragraph = Paragraph::new(line.clone()).wrap(Wrap { trim: true });
                    frame.render_widget(paragraph, rect);
                }
                Item::Field(i) => self.render_field(frame, rect, *i),
                Item::Submit => {
                    let button = Button::new(SUBMIT).active(self.focused == Some(Focus::Submit));
                    let rect = Rect { width: button.width().min(rect.width), ..rect };
                    frame.render_widget(button, rect);
                }
            }
            y = y.saturating_add(*height);
        }
    }
}

impl Component for ScheduleQueryComponent {
    fn id(&self) -> ComponentId {
        ComponentId::ScheduleQuery
    }

    fn shortcuts(&self) -> Vec<Shortcut> {
        vec![
            Shortcut::new(vec![Fragment::hl("⇧⇤"), Fragment::raw(" nav "), Fragment::hl("⇥")]),
            Shortcut::new(vec![
                Fragment::hl(triangle::LEFT),
                Fragment::raw(" choose "),
                Fragment::hl(triangle::RIGHT),
            ]),
            Shortcut::new(vec![Fragment::raw("submit "), Fragment::hl("^s")]),
            Shortcut::new(vec![Fragment::raw("cancel "), Fragment::hl("Esc")]),
        ]
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return Ok(Some(Action::Quit)),
            KeyCode::Char('s') if ctrl => return self.submit(OffsetDateTime::now_utc()),
            KeyCode::Esc => {
                self.hide();
                return Ok(Some(Action::Unfocus));
            }
            KeyCode::Tab | KeyCode::Down => self.move_focus(true),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(false),
            KeyCode::Enter if self.focused == Some(Focus::Submit) => {
                return self.submit(OffsetDateTime::now_utc());
            }
            KeyCode::Enter => self.move_focus(true),
            KeyCode::Left if self.cycle_choice(false) => {}
            KeyCode::Right | KeyCode::Char(' ') if self.cycle_choice(true) => {}
            _ => {
                let is_choice = matches!(self.focused_field(), Some(f) if f.choices().is_some());
                if !is_choice && let Some(req) = input_request(key) {
                    let _ = self.input.handle(req);
                }
            }
        }

        Ok(None)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Loaded(result) => self.query = Some(result),
            Action::ScheduleQuery => {
                if let Some(reason) = self.disabled_reason() {
                    return Ok(Some(Action::Error(("Scheduling disabled", reason).into())));
                }
                self.show(OffsetDateTime::now_utc());
                return Ok(Some(Action::Focus(ComponentId::ScheduleQuery)));
            }
            _ => {}
        }

        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        if self.form.is_none() {
            return Ok(());
        }

        let area = popup_area(area, 80, 80);
        frame.render_widget(Clear, area); // clears out the background
        // outer margin
        let area = area.inner(Margin::new(2, 1));

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Color::LightBlue)
            .title(top_title_line(TITLE, Style::default()));
        let content_area = block.inner(area).inner(Margin::new(1, 0));
        frame.render_widget(block, area);
        self.render_form(frame, content_area);

        Ok(())
    }
}
