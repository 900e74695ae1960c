use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// One record of the result set, keyed by column key in document order.
pub type Row = IndexMap<String, Value>;

/// A saved SQL Lab query result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub sql: String,
    /// Column keys to display, in display order
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub database_id: Option<i64>,
    pub schema: Option<String>,
}

/// Columns are either plain keys or SQL Lab column descriptors.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ColumnEntry {
    Key(String),
    Described {
        #[serde(alias = "column_name")]
        name: String,
    },
}

impl From<ColumnEntry> for String {
    fn from(value: ColumnEntry) -> Self {
        match value {
            ColumnEntry::Key(key) => key,
            ColumnEntry::Described { name } => name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawQueryResult {
    #[serde(default)]
    sql: String,
    #[serde(default)]
    columns: Option<Vec<ColumnEntry>>,
    #[serde(default)]
    data: Vec<Row>,
    #[serde(default, alias = "dbId", alias = "db_id")]
    database_id: Option<i64>,
    #[serde(default)]
    schema: Option<String>,
}

impl QueryResult {
    /// Loads a result file, `-` reads from stdin.
    pub fn from_path(path: &Path) -> Result<Self> {
        if path.as_os_str() == "-" {
            return Self::from_reader(io::stdin().lock())
                .with_context(|| "Fail to deserialize query result from stdin");
        }
        let file = File::open(path)
            .with_context(|| format!("Fail to open file `{}`", path.display()))?;
        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("Fail to deserialize file `{}`", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: RawQueryResult = serde_json::from_reader(reader)?;
        Ok(raw.into())
    }
}

impl From<RawQueryResult> for QueryResult {
    fn from(raw: RawQueryResult) -> Self {
        let columns = match raw.columns {
            Some(cols) if !cols.is_empty() => cols.into_iter().map(String::from).collect(),
            // no column list, fall back to the keys of the first row
            _ => raw.data.first().map(|row| row.keys().cloned().collect()).unwrap_or_default(),
        };
        Self {
            sql: raw.sql,
            columns,
            rows: raw.data,
            database_id: raw.database_id,
            schema: raw.schema,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_reader_with_columns() {
        let text = r#"{
            "sql": "SELECT a, b FROM t",
            "columns": ["a", "b", "c", "children"],
            "data": [
                { "a": "a1", "b": "b1", "c": "c1", "d": 0, "children": 0 },
                { "a": null, "b": "b3", "c": "c3", "d": 50, "children": 1 }
            ],
            "database_id": 1,
            "schema": "main"
        }"#;
        let result = QueryResult::from_reader(text.as_bytes()).unwrap();
        assert_eq!(result.sql, "SELECT a, b FROM t");
        assert_eq!(result.columns, vec!["a", "b", "c", "children"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1]["a"], Value::Null);
        assert_eq!(result.rows[1]["d"], json!(50));
        assert_eq!(result.database_id, Some(1));
        assert_eq!(result.schema.as_deref(), Some("main"));
    }

    #[test]
    fn test_from_reader_column_descriptors() {
        let text = r#"{
            "columns": [
                { "name": "ds", "type": "DATE", "is_date": true },
                { "column_name": "num", "type": "BIGINT" }
            ],
            "data": [],
            "dbId": 3
        }"#;
        let result = QueryResult::from_reader(text.as_bytes()).unwrap();
        assert_eq!(result.columns, vec!["ds", "num"]);
        assert_eq!(result.database_id, Some(3));
        assert_eq!(result.sql, "");
    }

    #[test]
    fn test_from_reader_columns_from_first_row() {
        let text = r#"{ "data": [ { "z": 1, "a": 2, "m": 3 }, { "q": 4 } ] }"#;
        let result = QueryResult::from_reader(text.as_bytes()).unwrap();
        // document order, not alphabetical
        assert_eq!(result.columns, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "sql": "SELECT 1", "data": [ {{ "x": 1 }} ] }}"#).unwrap();
        let result = QueryResult::from_path(file.path()).unwrap();
        assert_eq!(result.columns, vec!["x"]);

        let err = QueryResult::from_path(Path::new("/nonexistent/result.json")).unwrap_err();
        assert!(err.to_string().contains("Fail to open file"), "got {err}");
    }
}
