use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Uppercase, sorted for binary search.
const KEYWORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CAST", "CREATE",
    "CROSS", "CURRENT_DATE", "CURRENT_TIMESTAMP", "DATABASE", "DEFAULT", "DELETE", "DESC",
    "DISTINCT", "DROP", "ELSE", "END", "EXCEPT", "EXISTS", "FALSE", "FETCH", "FILTER", "FIRST",
    "FOLLOWING", "FOR", "FROM", "FULL", "GROUP", "HAVING", "ILIKE", "IN", "INNER", "INSERT",
    "INTERSECT", "INTERVAL", "INTO", "IS", "JOIN", "LAST", "LATERAL", "LEFT", "LIKE", "LIMIT",
    "NATURAL", "NOT", "NULL", "NULLS", "OFFSET", "ON", "OR", "ORDER", "OUTER", "OVER",
    "PARTITION", "PRECEDING", "RANGE", "RECURSIVE", "RIGHT", "ROW", "ROWS", "SELECT", "SET",
    "TABLE", "THEN", "TRUE", "UNBOUNDED", "UNION", "UPDATE", "USING", "VALUES", "VIEW", "WHEN",
    "WHERE", "WINDOW", "WITH",
];

const OPERATORS: &[&str] = &["<=", ">=", "<>", "!=", "||", "::", "->>", "->"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Function,
    Identifier,
    /// `"quoted"`, `` `quoted` `` or `[quoted]` identifier
    QuotedIdentifier,
    String,
    Number,
    Comment,
    Operator,
    Punctuation,
    Whitespace,
}

impl TokenKind {
    pub fn style(self) -> Style {
        match self {
            TokenKind::Keyword => {
                Style::default().fg(Color::Rgb(0xd7, 0x3a, 0x49)).add_modifier(Modifier::BOLD)
            }
            TokenKind::Function => Style::default().fg(Color::Rgb(0x6f, 0x42, 0xc1)),
            TokenKind::String => Style::default().fg(Color::Rgb(0x03, 0x2f, 0x62)),
            TokenKind::QuotedIdentifier => Style::default().fg(Color::Rgb(0x00, 0x5c, 0xc5)),
            TokenKind::Number => Style::default().fg(Color::Rgb(0x00, 0x80, 0x80)),
            TokenKind::Comment => {
                Style::default().fg(Color::Rgb(0x6a, 0x73, 0x7d)).add_modifier(Modifier::ITALIC)
            }
            TokenKind::Operator => Style::default().fg(Color::Rgb(0xd7, 0x3a, 0x49)),
            TokenKind::Punctuation | TokenKind::Identifier | TokenKind::Whitespace => {
                Style::default()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Advance while `f` holds, returns the number of bytes consumed.
    fn eat_while(&mut self, f: impl Fn(char) -> bool) -> usize {
        let len: usize = self.rest().chars().take_while(|c| f(*c)).map(char::len_utf8).sum();
        self.pos += len;
        len
    }

    /// Advance past the first occurrence of `end`, or to the end of input.
    fn eat_until(&mut self, end: &str) {
        match self.rest().find(end) {
            Some(i) => self.pos += i + end.len(),
            None => self.pos = self.src.len(),
        }
    }

    /// Quoted run closed by `quote`, doubled quotes are escapes. Unterminated runs to end.
    fn eat_quoted(&mut self, quote: char) {
        self.pos += quote.len_utf8();
        loop {
            match self.rest().find(quote) {
                Some(i) => {
                    self.pos += i + quote.len_utf8();
                    if self.peek() == Some(quote) {
                        self.pos += quote.len_utf8();
                    } else {
                        return;
                    }
                }
                None => {
                    self.pos = self.src.len();
                    return;
                }
            }
        }
    }

    fn eat_number(&mut self) {
        self.eat_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            self.eat_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let (sign, digit) = (self.peek_nth(1), self.peek_nth(2));
            let exp_len = match (sign, digit) {
                (Some(c), _) if c.is_ascii_digit() => 1,
                (Some('+' | '-'), Some(c)) if c.is_ascii_digit() => 2,
                _ => 0,
            };
            if exp_len > 0 {
                self.pos += exp_len;
                self.eat_while(|c| c.is_ascii_digit());
            }
        }
    }

    fn next_kind(&mut self) -> Option<TokenKind> {
        let c = self.peek()?;
        let rest = self.rest();
        let kind = if c.is_whitespace() {
            self.eat_while(char::is_whitespace);
            TokenKind::Whitespace
        } else if rest.starts_with("--") {
            self.eat_while(|c| c != '\n');
            TokenKind::Comment
        } else if rest.starts_with("/*") {
            self.pos += 2;
            self.eat_until("*/");
            TokenKind::Comment
        } else if c == '\'' {
            self.eat_quoted('\'');
            TokenKind::String
        } else if c == '"' || c == '`' {
            self.eat_quoted(c);
            TokenKind::QuotedIdentifier
        } else if c == '[' && self.peek_nth(1).is_some_and(|c| c.is_alphabetic() || c == '_') {
            self.eat_until("]");
            TokenKind::QuotedIdentifier
        } else if c.is_ascii_digit()
            || (c == '.' && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()))
        {
            if c == '.' {
                self.pos += 1;
            }
            self.eat_number();
            TokenKind::Number
        } else if c.is_alphabetic() || c == '_' {
            let start = self.pos;
            self.eat_while(|c| c.is_alphanumeric() || c == '_' || c == '$');
            let word = &self.src[start..self.pos];
            if is_keyword(word) {
                TokenKind::Keyword
            } else if self.rest().trim_start().starts_with('(') {
                TokenKind::Function
            } else {
                TokenKind::Identifier
            }
        } else if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            self.pos += op.len();
            TokenKind::Operator
        } else if "=<>+-*/%!~^&|:".contains(c) {
            self.pos += c.len_utf8();
            TokenKind::Operator
        } else {
            self.pos += c.len_utf8();
            TokenKind::Punctuation
        };
        Some(kind)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        let kind = self.next_kind()?;
        Some(Token { kind, text: &self.src[start..self.pos] })
    }
}

fn is_keyword(word: &str) -> bool {
    let upper = word.to_ascii_uppercase();
    KEYWORDS.binary_search(&upper.as_str()).is_ok()
}

pub fn tokenize(sql: &str) -> Vec<Token<'_>> {
    Lexer { src: sql, pos: 0 }.collect()
}

/// Highlights `sql` into one [`Line`] per source line; tokens spanning lines are split.
pub fn highlight(sql: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut spans: Vec<Span> = Vec::new();
    for token in tokenize(sql) {
        let style = token.kind.style();
        let mut parts = token.text.split('\n').peekable();
        while let Some(part) = parts.next() {
            let part = part.strip_suffix('\r').unwrap_or(part);
            if !part.is_empty() {
                spans.push(Span::styled(part, style));
            }
            if parts.peek().is_some() {
                lines.push(Line::from(std::mem::take(&mut spans)));
            }
        }
    }
    lines.push(Line::from(spans));
    lines
}
