use anyhow::{Result, bail};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

const DEFAULT_HL_COLOR: Color = Color::Indexed(130);

#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Raw(Box<str>),
    Hl(Box<str>),
}

impl Fragment {
    #[inline]
    pub fn raw<S: Into<Box<str>>>(s: S) -> Self {
        Self::Raw(s.into())
    }

    #[inline]
    pub fn hl<S: Into<Box<str>>>(s: S) -> Self {
        Self::Hl(s.into())
    }
}

/// A key hint such as `filter f` made of plain and highlighted fragments.
#[derive(Debug, Clone, PartialEq)]
pub struct Shortcut {
    parts: Vec<Fragment>,
}

impl Shortcut {
    pub fn new(parts: Vec<Fragment>) -> Self {
        Self { parts }
    }

    /// `<description> <key>`, only the key highlighted.
    pub fn key(description: &str, key: &str) -> Self {
        Self::new(vec![Fragment::raw(format!("{description} ")), Fragment::hl(key)])
    }

    /// Creates a `Shortcut` from `s`, highlighting the character at `hl_idx`.
    ///
    /// ASCII only, `hl_idx` is both the byte and the char index.
    pub fn from<S: AsRef<str>>(s: S, hl_idx: usize) -> Result<Self> {
        let text = s.as_ref();
        if !text.is_ascii() {
            bail!("Shortcut::from expects ASCII text");
        }
        let len = text.len();
        if hl_idx >= len {
            bail!("hl_index {} is out of bounds for string of length {}", hl_idx, len);
        }

        let pivot = hl_idx + 1;
        let mut parts = Vec::with_capacity(3);
        if hl_idx > 0 {
            parts.push(Fragment::raw(&text[..hl_idx]));
        }
        parts.push(Fragment::hl(&text[hl_idx..pivot]));
        if pivot < len {
            parts.push(Fragment::raw(&text[pivot..]));
        }

        Ok(Self::new(parts))
    }

    pub fn spans(&'_ self, hl_style: Option<Style>) -> Vec<Span<'_>> {
        let hl_style = hl_style.unwrap_or(Style::default().fg(DEFAULT_HL_COLOR));
        self.parts
            .iter()
            .filter_map(|v| match v {
                Fragment::Raw(s) if !s.is_empty() => Some(Span::raw(s.as_ref())),
                Fragment::Hl(s) if !s.is_empty() => Some(Span::styled(s.as_ref(), hl_style)),
                _ => None,
            })
            .collect()
    }
}

impl<'a> From<&'a Shortcut> for Line<'a> {
    fn from(value: &'a Shortcut) -> Self {
        Line::from(value.spans(None))
    }
}
