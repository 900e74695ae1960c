use std::sync::Arc;

use tracing::debug;

use crate::models::query_result::Row;
use crate::models::sort::SortSpec;
use crate::utils::columns::ColDef;
use crate::utils::row_filter::{FilterMode, RowFilter, RowMatcher};

/// Rows of the loaded result plus the filtered, sorted view that the grid renders.
#[derive(Debug, Default)]
pub struct Results {
    filter_mode: FilterMode,
    cols: Vec<ColDef>,
    buffer: Vec<Arc<Row>>,
    view: Vec<Arc<Row>>,

    sort: Option<SortSpec>,
    pattern: Option<String>,
}

impl Results {
    pub fn new(filter_mode: FilterMode) -> Self {
        Self { filter_mode, ..Self::default() }
    }

    /// Replaces the data. Column kinds are rescanned and the sort state is reset.
    pub fn push(&mut self, columns: &[String], records: Vec<Row>) {
        self.buffer = records.into_iter().map(Arc::new).collect();
        self.cols = ColDef::from_rows(columns, &self.buffer);
        self.sort = None;
        debug!(
            "Loaded {} rows, columns: {:?}",
            self.buffer.len(),
            self.cols.iter().map(|c| (c.key.as_str(), c.kind)).collect::<Vec<_>>()
        );
        self.compute_view();
    }

    /// Header activation of column `col`, cycles its sort state.
    pub fn activate(&mut self, col: usize) -> Option<SortSpec> {
        if col < self.cols.len() {
            self.sort = SortSpec::cycle(self.sort, col);
            debug!("Sort changed to {:?}", self.sort);
            self.compute_view();
        }
        self.sort
    }

    pub fn set_pattern(&mut self, pattern: Option<String>) {
        if self.pattern != pattern {
            self.pattern = pattern;
            self.compute_view();
        }
    }

    pub fn compute_view(&mut self) {
        let mut matcher = RowMatcher::new(self.filter_mode, self.pattern.as_deref());
        let mut view: Vec<Arc<Row>> = RowFilter::new(self.buffer.iter(), &mut matcher).collect();

        if let Some(sort) = self.sort
            && let Some(col_def) = self.cols.get(sort.col)
        {
            // stable, ties keep their filtered order
            view.sort_by(|a, b| col_def.ordering(a, b, sort.dir));
        }
        self.view = view;
    }

    pub fn view(&self) -> &[Arc<Row>] {
        &self.view
    }

    pub fn cols(&self) -> &[ColDef] {
        &self.cols
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn total(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::models::cell::render;
    use crate::models::sort::SortDir;

    fn results(columns: &[&str], data: Value) -> Results {
        let rows: Vec<Row> = serde_json::from_value(data).unwrap();
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let mut results = Results::new(FilterMode::Substring);
        results.push(&columns, rows);
        results
    }

    /// Rendered cells of `key`, top to bottom, the way the grid shows them.
    fn column(results: &Results, key: &str) -> Vec<String> {
        results
            .view()
            .iter()
            .map(|row| {
                row.get(key).and_then(render).map(|s| s.into_owned()).unwrap_or("NULL".into())
            })
            .collect()
    }

    /// Original, ascending, descending, original again.
    fn assert_cycle(mut results: Results, key: &str, original: &[&str], ascending: &[&str]) {
        let descending: Vec<&str> = ascending.iter().rev().copied().collect();
        assert_eq!(column(&results, key), original);

        assert_eq!(results.activate(0), Some(SortSpec::asc(0)));
        assert_eq!(column(&results, key), ascending);

        assert_eq!(results.activate(0), Some(SortSpec::desc(0)));
        assert_eq!(column(&results, key), descending);

        assert_eq!(results.activate(0), None);
        assert_eq!(column(&results, key), original);
    }

    #[test]
    fn test_sort_strings() {
        let results = results(
            &["columnA"],
            json!([{ "columnA": "Bravo" }, { "columnA": "Alpha" }, { "columnA": "Charlie" }]),
        );
        assert_cycle(
            results,
            "columnA",
            &["Bravo", "Alpha", "Charlie"],
            &["Alpha", "Bravo", "Charlie"],
        );
    }

    #[test]
    fn test_sort_integers() {
        let results = results(
            &["columnB"],
            json!([{ "columnB": 21 }, { "columnB": 0 }, { "columnB": 623 }]),
        );
        assert_cycle(results, "columnB", &["21", "0", "623"], &["0", "21", "623"]);
    }

    #[test]
    fn test_sort_floats() {
        let results = results(
            &["columnC"],
            json!([{ "columnC": 45.67 }, { "columnC": 1.23 }, { "columnC": 89.0000001 }]),
        );
        assert_cycle(
            results,
            "columnC",
            &["45.67", "1.23", "89.0000001"],
            &["1.23", "45.67", "89.0000001"],
        );
    }

    #[test]
    fn test_sort_mixed_numeric_strings() {
        let results = results(
            &["columnD"],
            json!([
                { "columnD": 48710.92 },
                { "columnD": 145776.56 },
                { "columnD": 72212.86 },
                { "columnD": "144729.96000000002" },
                { "columnD": "26260.210000000003" },
                { "columnD": "152718.97999999998" },
                { "columnD": 28550.59 },
                { "columnD": "24078.610000000004" },
                { "columnD": "98089.08000000002" },
                { "columnD": "3439718.0300000007" },
                { "columnD": "4528047.219999993" },
            ]),
        );
        assert_cycle(
            results,
            "columnD",
            &[
                "48710.92",
                "145776.56",
                "72212.86",
                "144729.96000000002",
                "26260.210000000003",
                "152718.97999999998",
                "28550.59",
                "24078.610000000004",
                "98089.08000000002",
                "3439718.0300000007",
                "4528047.219999993",
            ],
            &[
                "24078.610000000004",
                "26260.210000000003",
                "28550.59",
                "48710.92",
                "72212.86",
                "98089.08000000002",
                "144729.96000000002",
                "145776.56",
                "152718.97999999998",
                "3439718.0300000007",
                "4528047.219999993",
            ],
        );
    }

    #[test]
    fn test_sort_dates() {
        let results = results(
            &["columnDS"],
            json!([
                { "columnDS": "2021-01-01" },
                { "columnDS": "2022-01-01" },
                { "columnDS": "2021-01-02" },
                { "columnDS": "2021-01-03" },
                { "columnDS": "2021-12-01" },
                { "columnDS": "2021-10-01" },
                { "columnDS": "2022-01-02" },
            ]),
        );
        assert_cycle(
            results,
            "columnDS",
            &[
                "2021-01-01",
                "2022-01-01",
                "2021-01-02",
                "2021-01-03",
                "2021-12-01",
                "2021-10-01",
                "2022-01-02",
            ],
            &[
                "2021-01-01",
                "2021-01-02",
                "2021-01-03",
                "2021-10-01",
                "2021-12-01",
                "2022-01-01",
                "2022-01-02",
            ],
        );
    }

    #[test]
    fn test_nulls_last_ascending_first_descending() {
        let mut results = results(
            &["n"],
            json!([{ "n": 3 }, { "n": null }, { "n": 1 }, {}, { "n": 2 }]),
        );
        results.activate(0);
        assert_eq!(column(&results, "n"), vec!["1", "2", "3", "NULL", "NULL"]);
        results.activate(0);
        assert_eq!(column(&results, "n"), vec!["NULL", "NULL", "3", "2", "1"]);
    }

    #[test]
    fn test_switch_column_starts_ascending() {
        let mut results = results(
            &["a", "b"],
            json!([{ "a": 2, "b": "x" }, { "a": 1, "b": "z" }, { "a": 3, "b": "y" }]),
        );
        results.activate(0);
        results.activate(0);
        assert_eq!(results.sort(), Some(SortSpec { col: 0, dir: SortDir::Desc }));

        assert_eq!(results.activate(1), Some(SortSpec::asc(1)));
        assert_eq!(column(&results, "b"), vec!["x", "y", "z"]);

        // out of range is ignored
        assert_eq!(results.activate(7), Some(SortSpec::asc(1)));
    }

    fn mocked() -> Results {
        results(
            &["a", "b", "c", "children"],
            json!([
                { "a": "a1", "b": "b1", "c": "c1", "d": 0, "children": 0 },
                { "a": "a2", "b": "b2", "c": "c2", "d": 100, "children": 2 },
                { "a": null, "b": "b3", "c": "c3", "d": 50, "children": 1 },
            ]),
        )
    }

    #[test]
    fn test_renders_all_rows() {
        let results = mocked();
        assert_eq!(results.total(), 3);
        assert_eq!(column(&results, "b"), vec!["b1", "b2", "b3"]);
        assert_eq!(column(&results, "a"), vec!["a1", "a2", "NULL"]);
    }

    #[test]
    fn test_filter() {
        let mut results = mocked();
        results.set_pattern(Some("b1".into()));
        assert_eq!(column(&results, "b"), vec!["b1"]);

        // `d` is not a displayed column but still matched
        results.set_pattern(Some("100".into()));
        assert_eq!(column(&results, "b"), vec!["b2"]);

        results.set_pattern(None);
        assert_eq!(column(&results, "b"), vec!["b1", "b2", "b3"]);
    }

    #[test]
    fn test_filter_keeps_sort() {
        let mut results = mocked();
        results.activate(3); // children, ascending
        results.activate(3); // descending
        assert_eq!(column(&results, "b"), vec!["b2", "b3", "b1"]);

        results.set_pattern(Some("b".into()));
        assert_eq!(column(&results, "b"), vec!["b2", "b3", "b1"]);
        results.set_pattern(Some("3".into()));
        assert_eq!(column(&results, "b"), vec!["b3"]);
        assert_eq!(results.sort(), Some(SortSpec::desc(3)));
    }

    #[test]
    fn test_reload_resets_sort() {
        let mut results = mocked();
        results.activate(0);
        assert!(results.sort().is_some());

        results.push(&["x".to_string()], serde_json::from_value(json!([{ "x": 1 }])).unwrap());
        assert_eq!(results.sort(), None);
        assert_eq!(results.cols().len(), 1);
        assert_eq!(column(&results, "x"), vec!["1"]);
    }
}
