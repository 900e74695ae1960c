use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Paragraph, Widget};

/// Bordered, centered label; highlighted while it has the focus.
#[derive(Debug, Clone)]
pub struct Button<'a> {
    label: &'a str,
    active: bool,
}

impl<'a> Button<'a> {
    pub fn new(label: &'a str) -> Self {
        Self { label, active: false }
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Width that fits the label plus borders and one cell of padding each side.
    pub fn width(&self) -> u16 {
        self.label.chars().count() as u16 + 4
    }
}

impl Widget for Button<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = if self.active {
            Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered().border_type(BorderType::Rounded).border_style(style);

        let inner = block.inner(area);
        block.render(area, buf);

        Paragraph::new(Line::from(self.label)).style(style).centered().render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_label() {
        let button = Button::new("Submit").active(true);
        let area = Rect::new(0, 0, button.width(), 3);
        let mut buf = Buffer::empty(area);
        button.render(area, &mut buf);

        let middle: String = (0..area.width).map(|x| buf[(x, 1)].symbol().to_owned()).collect();
        assert_eq!(middle, "│ Submit │");
        assert_eq!(buf[(2, 1)].fg, Color::LightBlue);
    }
}
