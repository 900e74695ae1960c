use std::sync::Arc;

use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::models::cell::render;
use crate::models::query_result::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FilterMode {
    /// case-insensitive containment
    #[default]
    Substring,
    /// nucleo fuzzy matching, smart case
    Fuzzy,
}

enum Needle {
    Any,
    Substring(String),
    Fuzzy { pattern: Pattern, matcher: Box<Matcher>, buf: Vec<char> },
}

/// Matches a row when any of its cells (shown or not) matches the pattern. Null cells never match.
pub struct RowMatcher {
    needle: Needle,
}

impl RowMatcher {
    pub fn new(mode: FilterMode, pattern: Option<&str>) -> Self {
        let pattern = pattern.map(str::trim).filter(|p| !p.is_empty());
        let needle = match (pattern, mode) {
            (None, _) => Needle::Any,
            (Some(p), FilterMode::Substring) => Needle::Substring(p.to_lowercase()),
            (Some(p), FilterMode::Fuzzy) => Needle::Fuzzy {
                pattern: Pattern::parse(p, CaseMatching::Smart, Normalization::Smart),
                matcher: Box::new(Matcher::new(Config::DEFAULT)),
                buf: Vec::new(),
            },
        };
        Self { needle }
    }

    pub fn is_match(&mut self, row: &Row) -> bool {
        let mut texts = row.values().filter_map(render);
        match &mut self.needle {
            Needle::Any => true,
            Needle::Substring(needle) => {
                texts.any(|text| text.to_lowercase().contains(needle.as_str()))
            }
            Needle::Fuzzy { pattern, matcher, buf } => texts.any(|text| {
                pattern.score(Utf32Str::new(&text, buf), matcher.as_mut()).is_some()
            }),
        }
    }
}

/// An iterator that keeps the rows accepted by a [`RowMatcher`]
pub struct RowFilter<'a, I>
where
    I: Iterator<Item = &'a Arc<Row>>,
{
    iter: I,
    matcher: &'a mut RowMatcher,
}

impl<'a, I> RowFilter<'a, I>
where
    I: Iterator<Item = &'a Arc<Row>>,
{
    pub fn new(iter: I, matcher: &'a mut RowMatcher) -> Self {
        Self { iter, matcher }
    }
}

impl<'a, I> Iterator for RowFilter<'a, I>
where
    I: Iterator<Item = &'a Arc<Row>>,
{
    type Item = Arc<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        for item in self.iter.by_ref() {
            if self.matcher.is_match(item) {
                return Some(Arc::clone(item));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rows() -> Vec<Arc<Row>> {
        let data = json!([
            { "a": "a1", "b": "b1", "c": "c1", "d": 0, "children": 0 },
            { "a": "a2", "b": "b2", "c": "c2", "d": 100, "children": 2 },
            { "a": null, "b": "b3", "c": "c3", "d": 50, "children": 1 },
        ]);
        serde_json::from_value::<Vec<Row>>(data).unwrap().into_iter().map(Arc::new).collect()
    }

    fn filter(mode: FilterMode, pattern: Option<&str>) -> Vec<String> {
        let rows = rows();
        let mut matcher = RowMatcher::new(mode, pattern);
        RowFilter::new(rows.iter(), &mut matcher)
            .map(|row| row["b"].as_str().unwrap().to_owned())
            .collect()
    }

    #[test]
    fn test_filter_string() {
        assert_eq!(filter(FilterMode::Substring, Some("b1")), vec!["b1"]);
        assert_eq!(filter(FilterMode::Substring, Some("B1")), vec!["b1"]);
    }

    #[test]
    fn test_filter_number_in_hidden_column() {
        // `d` is matched even though callers may not display it
        assert_eq!(filter(FilterMode::Substring, Some("100")), vec!["b2"]);
    }

    #[test]
    fn test_filter_empty_pattern() {
        assert_eq!(filter(FilterMode::Substring, None), vec!["b1", "b2", "b3"]);
        assert_eq!(filter(FilterMode::Substring, Some("  ")), vec!["b1", "b2", "b3"]);
    }

    #[test]
    fn test_filter_null_never_matches() {
        assert!(filter(FilterMode::Substring, Some("null")).is_empty());
    }

    #[test]
    fn test_filter_fuzzy() {
        // `c3` only as a subsequence across cells is not enough, it must hit one cell
        assert_eq!(filter(FilterMode::Fuzzy, Some("c3")), vec!["b3"]);
        assert_eq!(filter(FilterMode::Fuzzy, Some("zz")), Vec::<String>::new());
    }
}
