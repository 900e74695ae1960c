use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Payload handed over when a query is scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledQuery {
    pub label: String,
    pub description: String,
    pub db_id: Option<i64>,
    pub schema: Option<String>,
    pub sql: String,
    /// `{"schedule_info": <form data>}`, serialized
    pub extra_json: String,
}

impl ScheduledQuery {
    pub fn new(
        label: String,
        description: String,
        db_id: Option<i64>,
        schema: Option<String>,
        sql: String,
        schedule_info: Map<String, Value>,
    ) -> Result<Self> {
        let extra_json = serde_json::to_string(&json!({ "schedule_info": schedule_info }))?;
        Ok(Self { label, description, db_id, schema, sql, extra_json })
    }

    pub fn schedule_info(&self) -> Option<Value> {
        serde_json::from_str::<Value>(&self.extra_json)
            .ok()
            .and_then(|mut v| v.get_mut("schedule_info").map(Value::take))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let mut info = Map::new();
        info.insert("output_table".into(), json!("daily_sales"));
        info.insert("start_date".into(), json!("2024-03-11T09:00:00Z"));
        let query = ScheduledQuery::new(
            "Daily sales".into(),
            "".into(),
            Some(1),
            Some("main".into()),
            "SELECT 1".into(),
            info,
        )
        .unwrap();

        assert_eq!(
            query.extra_json,
            r#"{"schedule_info":{"output_table":"daily_sales","start_date":"2024-03-11T09:00:00Z"}}"#
        );
        assert_eq!(query.schedule_info().unwrap()["output_table"], json!("daily_sales"));

        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["db_id"], json!(1));
        assert_eq!(value["schema"], json!("main"));
        assert_eq!(value["label"], json!("Daily sales"));
    }
}
