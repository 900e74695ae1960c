use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

/// Comparison applied by a [`ValidationRule`], `test(args[0], args[1])` must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RuleName {
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
}

impl RuleName {
    pub fn test(self, ord: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            RuleName::Greater => ord == Greater,
            RuleName::GreaterEqual => ord != Less,
            RuleName::Less => ord == Less,
            RuleName::LessEqual => ord != Greater,
        }
    }
}

/// Cross-field rule of the schedule form, e.g. `start_date <= end_date`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ValidationRule {
    pub name: RuleName,
    /// form field keys, the first two are compared
    pub arguments: Vec<String>,
    pub message: String,
    /// field the error is attached to, the last argument by default
    #[serde(default)]
    pub container: Option<String>,
}

impl ValidationRule {
    pub fn container(&self) -> Option<&str> {
        self.container.as_deref().or_else(|| self.arguments.last().map(String::as_str))
    }
}

/// `scheduled-queries` section of the configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScheduleConfig {
    /// JSON schema of the `schedule_info` object
    #[serde(default)]
    pub json_schema: Option<Value>,
    #[serde(default)]
    pub ui_schema: Option<Value>,
    #[serde(default)]
    pub validation: Vec<ValidationRule>,
    /// shown under the schedule form
    #[serde(default)]
    pub warning: Option<String>,
}

impl ScheduleConfig {
    pub fn is_enabled(&self) -> bool {
        self.json_schema.as_ref().is_some_and(Value::is_object)
    }
}
