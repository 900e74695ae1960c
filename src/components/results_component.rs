use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Position, Rect};
use ratatui::prelude::{Color, Line, Modifier, Span, Style};
use ratatui::widgets::{Block, BorderType, Cell, Paragraph, Row, Table, TableState};
use tracing::debug;

use crate::action::Action;
use crate::components::results::Results;
use crate::components::{Component, ComponentId, HORIZ_STEP};
use crate::models::cell::render;
use crate::models::query_result::Row as Record;
use crate::models::sort::SortDir;
use crate::utils::row_filter::FilterMode;
use crate::utils::symbols::{NULL, arrow, triangle};
use crate::utils::text_ui::{TOP_TITLE_LEFT, TOP_TITLE_RIGHT, text_width, truncate};
use crate::widgets::scrollable_navigator::ScrollableNavigator;
use crate::widgets::shortcut::{Fragment, Shortcut};

const COL_SPACING: u16 = 2;
const MIN_COL_WIDTH: usize = 4;
const MAX_COL_WIDTH: usize = 40;

/// The results grid: filtered, sortable rows with a column cursor.
#[derive(Default)]
pub struct ResultsComponent {
    store: Results,
    show_sql_hint: String,

    navigator: ScrollableNavigator,
    table_state: TableState,
    /// column under the keyboard cursor, index into `store.cols()`
    col_cursor: usize,
    /// first rendered column
    col_offset: usize,

    /// header cells of the last frame, for mouse hit-testing
    header_cells: Vec<(usize, Rect)>,
    body: Rect,
}

impl ResultsComponent {
    pub fn new(filter_mode: FilterMode, show_sql_hint: Option<String>) -> Self {
        Self {
            store: Results::new(filter_mode),
            show_sql_hint: show_sql_hint.unwrap_or_else(|| "view SQL".into()),
            ..Self::default()
        }
    }

    fn move_cursor(&mut self, forward: bool) {
        let last = self.store.cols().len().saturating_sub(1);
        self.col_cursor = if forward {
            (self.col_cursor + 1).min(last)
        } else {
            self.col_cursor.saturating_sub(1)
        };
    }

    fn activate(&mut self, col: usize) {
        let sort = self.store.activate(col);
        debug!("Column {col} activated, sort={sort:?}");
        self.col_cursor = col;
    }

    /// Display width of every column, measured on the header and the visible rows.
    fn column_widths(&self, rows: &[Arc<Record>]) -> Vec<usize> {
        self.store
            .cols()
            .iter()
            .map(|col| {
                // room for the sort marker
                let header = text_width(&col.key) + 2;
                rows.iter()
                    .map(|row| render(col.cell(row)).map_or(NULL.len(), |s| text_width(&s)))
                    .fold(header, usize::max)
                    .clamp(MIN_COL_WIDTH, MAX_COL_WIDTH)
            })
            .collect()
    }

    /// Columns that fit in `area` starting at `offset`, with their header cell rects.
    fn fit_columns(widths: &[usize], offset: usize, area: Rect) -> Vec<(usize, Rect)> {
        let right = area.right();
        let mut x = area.x;
        let mut fitted = Vec::new();
        for (i, w) in widths.iter().enumerate().skip(offset) {
            if x >= right {
                break;
            }
            let w = *w as u16;
            if x + w > right && !fitted.is_empty() {
                break;
            }
            let w = w.min(right - x);
            fitted.push((i, Rect::new(x, area.y, w, 1)));
            x = x.saturating_add(w + COL_SPACING);
        }
        fitted
    }

    /// Picks the column offset so that the cursor column is rendered.
    fn layout_columns(&mut self, widths: &[usize], area: Rect) -> Vec<(usize, Rect)> {
        self.col_offset = self.col_offset.min(self.col_cursor);
        loop {
            let fitted = Self::fit_columns(widths, self.col_offset, area);
            let shown = fitted.iter().any(|(i, _)| *i == self.col_cursor);
            if shown || self.col_offset >= self.col_cursor {
                return fitted;
            }
            self.col_offset += 1;
        }
    }

    fn header_row(&self) -> Row<'static> {
        let sort = self.store.sort();
        let cells = self.header_cells.iter().map(|(i, rect)| {
            let key = &self.store.cols()[*i].key;
            let marker = match sort {
                Some(s) if s.col == *i && s.dir == SortDir::Asc => triangle::UP,
                Some(s) if s.col == *i => triangle::DOWN,
                _ => "",
            };
            let label = truncate(key, (rect.width as usize).saturating_sub(2));
            let mut style = Style::default().add_modifier(Modifier::BOLD);
            if *i == self.col_cursor {
                style = style.fg(Color::LightCyan).add_modifier(Modifier::UNDERLINED);
            }
            Cell::from(Line::from(vec![
                Span::styled(label.into_owned(), style),
                Span::styled(format!(" {marker}"), Color::Yellow),
            ]))
        });
        Row::new(cells).height(1).bottom_margin(1)
    }

    fn body_rows(&self, records: &[Arc<Record>]) -> Vec<Row<'static>> {
        let cols = self.store.cols();
        records
            .iter()
            .map(|record| {
                let cells = self.header_cells.iter().map(|(i, rect)| {
                    let width = rect.width as usize;
                    match render(cols[*i].cell(record)) {
                        Some(text) => Cell::from(truncate(&text, width).into_owned()),
                        None => Cell::from(Span::styled(NULL, Color::DarkGray)),
                    }
                });
                Row::new(cells).height(1)
            })
            .collect()
    }

    fn title_line(&self) -> Line<'static> {
        Line::from(vec![
            Span::raw(TOP_TITLE_LEFT),
            Span::raw("results ("),
            Span::styled(
                self.navigator.focused.map(|i| (i + 1).to_string()).unwrap_or("-".into()),
                Color::LightCyan,
            ),
            Span::raw("/"),
            Span::styled(self.store.view().len().to_string(), Color::Cyan),
            Span::raw(" of "),
            Span::styled(self.store.total().to_string(), Color::Cyan),
            Span::raw(")"),
            Span::raw(TOP_TITLE_RIGHT),
        ])
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered().border_type(BorderType::Rounded).title(self.title_line());
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if self.store.cols().is_empty() {
            self.header_cells.clear();
            let empty = Paragraph::new("no rows").style(Color::DarkGray).centered();
            frame.render_widget(empty, inner);
            return;
        }

        // header + its bottom margin
        self.body = Rect { y: inner.y + 2, height: inner.height.saturating_sub(2), ..inner };
        self.navigator.length(self.store.view().len(), self.body.height as usize);
        let records = self.store.view().get(self.navigator.visible()).unwrap_or(&[]).to_vec();

        let widths = self.column_widths(&records);
        self.header_cells = self.layout_columns(&widths, Rect { height: 1, ..inner });

        *self.table_state.selected_mut() =
            self.navigator.focused.map(|v| v.saturating_sub(self.navigator.scroller.pos()));

        let constraints: Vec<Constraint> =
            self.header_cells.iter().map(|(_, rect)| Constraint::Length(rect.width)).collect();
        let selected_row_style = Style::default().add_modifier(Modifier::REVERSED).fg(Color::Cyan);
        let table = Table::new(self.body_rows(&records), constraints)
            .header(self.header_row())
            .column_spacing(COL_SPACING)
            .flex(Flex::Start)
            .row_highlight_style(selected_row_style);

        frame.render_stateful_widget(table, inner, &mut self.table_state);
    }

    fn header_hit(&self, pos: Position) -> Option<usize> {
        self.header_cells.iter().find(|(_, rect)| rect.contains(pos)).map(|(i, _)| *i)
    }
}

impl Component for ResultsComponent {
    fn id(&self) -> ComponentId {
        ComponentId::Results
    }

    fn shortcuts(&self) -> Vec<Shortcut> {
        vec![
            Shortcut::new(vec![
                Fragment::hl(arrow::UP),
                Fragment::raw("/"),
                Fragment::hl(arrow::LEFT),
                Fragment::raw(" nav "),
                Fragment::hl(arrow::RIGHT),
                Fragment::raw("/"),
                Fragment::hl(arrow::DOWN),
            ]),
            Shortcut::new(vec![
                Fragment::hl("PgUp"),
                Fragment::raw(" page "),
                Fragment::hl("PgDn"),
            ]),
            Shortcut::key("sort", "s"),
            Shortcut::key("filter", "f"),
            Shortcut::key("reload", "r"),
            Shortcut::key(&self.show_sql_hint, "v"),
            Shortcut::key("schedule", "S"),
        ]
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.navigator.handle_key_event(key) {
            return Ok(None);
        }
        match key.code {
            KeyCode::Esc => self.navigator.focused = None,
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(false),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(true),
            KeyCode::Char('<') => self.col_offset = self.col_offset.saturating_sub(HORIZ_STEP),
            KeyCode::Char('>') => {
                let last = self.store.cols().len().saturating_sub(1);
                self.col_offset = (self.col_offset + HORIZ_STEP).min(last);
                // keep the cursor on screen
                self.col_cursor = self.col_cursor.max(self.col_offset);
            }
            KeyCode::Char('s') | KeyCode::Enter => self.activate(self.col_cursor),
            KeyCode::Char('f') | KeyCode::Char('/') => {
                return Ok(Some(Action::Focus(ComponentId::Search)));
            }
            KeyCode::Char('r') => return Ok(Some(Action::Reload)),
            KeyCode::Char('v') => return Ok(Some(Action::ShowSql)),
            KeyCode::Char('S') => return Ok(Some(Action::ScheduleQuery)),
            _ => (),
        };

        Ok(None)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        let pos = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(col) = self.header_hit(pos) {
                    self.activate(col);
                } else if self.body.contains(pos) {
                    self.navigator.focus_visible((pos.y - self.body.y) as usize);
                }
            }
            MouseEventKind::ScrollDown => self.navigator.next(1),
            MouseEventKind::ScrollUp => self.navigator.prev(1),
            _ => (),
        }
        Ok(None)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::SearchInputChanged(pattern) => {
                debug!("handle Action::SearchInputChanged, got pattern={pattern:?}");
                self.store.set_pattern(pattern);
            }
            Action::Loaded(result) => {
                self.store.push(&result.columns, result.rows.clone());
                self.navigator.reset();
                self.col_offset = 0;
                self.col_cursor = self.col_cursor.min(result.columns.len().saturating_sub(1));
            }
            _ => {}
        }

        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        self.render_table(frame, area);
        // scrollbar along the body, below the header
        let body = Rect { y: area.y + 2, height: area.height.saturating_sub(2), ..area };
        self.navigator.render(frame, body);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use serde_json::json;

    use super::*;
    use crate::models::query_result::QueryResult;

    fn loaded() -> ResultsComponent {
        let result = QueryResult::from_reader(
            json!({
                "sql": "SELECT a, b FROM t",
                "columns": ["a", "b"],
                "data": [
                    {"a": "a1", "b": "b1", "d": 10},
                    {"a": "a3", "b": "b3", "d": 100},
                    {"a": "a2", "b": null, "d": 1},
                ],
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap();
        let mut results = ResultsComponent::new(FilterMode::Substring, None);
        results.update(Action::Loaded(Arc::new(result))).unwrap();
        results
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn column(results: &ResultsComponent, key: &str) -> Vec<String> {
        results
            .store
            .view()
            .iter()
            .map(|row| render(&row[key]).map_or(NULL.into(), |s| s.into_owned()))
            .collect()
    }

    fn draw(results: &mut ResultsComponent) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                results.draw(frame, area).unwrap();
            })
            .unwrap();
        terminal
    }

    #[test]
    fn test_keyboard_sort() {
        let mut results = loaded();
        results.handle_key_event(key(KeyCode::Char('s'))).unwrap();
        assert_eq!(column(&results, "a"), ["a1", "a2", "a3"]);

        results.handle_key_event(key(KeyCode::Char('l'))).unwrap();
        results.handle_key_event(key(KeyCode::Enter)).unwrap();
        results.handle_key_event(key(KeyCode::Enter)).unwrap();
        // descending puts the null first
        assert_eq!(column(&results, "b"), ["NULL", "b3", "b1"]);

        results.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(column(&results, "b"), ["b1", "b3", "NULL"]);
    }

    #[test]
    fn test_header_click() {
        let mut results = loaded();
        draw(&mut results);
        let (col, rect) = results.header_cells[1];
        assert_eq!(col, 1);

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: rect.x,
            row: rect.y,
            modifiers: KeyModifiers::NONE,
        };
        results.handle_mouse_event(click).unwrap();
        assert_eq!(results.store.sort().map(|s| (s.col, s.dir)), Some((1, SortDir::Asc)));

        let terminal = draw(&mut results);
        let header: String = (0..40)
            .map(|x| terminal.backend().buffer()[(x, 1)].symbol().to_string())
            .collect();
        assert!(header.contains(&format!("b {}", triangle::UP)), "{header}");
    }

    #[test]
    fn test_body_click_focuses_row() {
        let mut results = loaded();
        draw(&mut results);
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: results.body.x,
            row: results.body.y + 2,
            modifiers: KeyModifiers::NONE,
        };
        results.handle_mouse_event(click).unwrap();
        assert_eq!(results.navigator.focused, Some(2));
    }

    #[test]
    fn test_filter_and_actions() {
        let mut results = loaded();
        results.update(Action::SearchInputChanged(Some("100".into()))).unwrap();
        assert_eq!(column(&results, "a"), ["a3"]);

        let action = results.handle_key_event(key(KeyCode::Char('/'))).unwrap();
        assert!(matches!(action, Some(Action::Focus(ComponentId::Search))));
        let action = results.handle_key_event(key(KeyCode::Char('S'))).unwrap();
        assert!(matches!(action, Some(Action::ScheduleQuery)));
    }

    #[test]
    fn test_cursor_scrolls_columns() {
        let widths = [20, 20, 20];
        let area = Rect::new(0, 0, 30, 1);
        let mut results = ResultsComponent { col_cursor: 2, ..ResultsComponent::default() };
        let fitted = results.layout_columns(&widths, area);
        assert_eq!(results.col_offset, 2);
        assert_eq!(fitted, vec![(2, Rect::new(0, 0, 20, 1))]);

        results.col_cursor = 0;
        let fitted = results.layout_columns(&widths, area);
        assert_eq!(results.col_offset, 0);
        assert_eq!(fitted.len(), 1);
    }
}
