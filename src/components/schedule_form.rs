use std::cmp::Ordering;

use serde_json::{Map, Number, Value};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};

use crate::models::cell::render;
use crate::models::query_result::QueryResult;
use crate::models::schedule::{ScheduleConfig, ValidationRule};
use crate::models::scheduled_query::ScheduledQuery;
use crate::utils::date_expr;

pub const DEFAULT_LABEL: &str = "Undefined";

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Text,
    DateTime,
    Integer,
    Number,
    Boolean,
    /// array of strings, entered comma separated
    List,
    Enum(Vec<Value>),
}

impl FieldType {
    fn of(prop: &Value) -> Option<Self> {
        if let Some(options) = prop.get("enum").and_then(Value::as_array) {
            return Some(FieldType::Enum(options.clone()));
        }
        let kind = match prop.get("type").and_then(Value::as_str) {
            Some("string") | None => match prop.get("format").and_then(Value::as_str) {
                Some("date-time") => FieldType::DateTime,
                _ => FieldType::Text,
            },
            Some("integer") => FieldType::Integer,
            Some("number") => FieldType::Number,
            Some("boolean") => FieldType::Boolean,
            Some("array") => {
                let item_type = prop.pointer("/items/type").and_then(Value::as_str);
                if !matches!(item_type, None | Some("string")) {
                    return None;
                }
                FieldType::List
            }
            Some(_) => return None,
        };
        Some(kind)
    }
}

/// Whether a field belongs to the query itself or to `schedule_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldScope {
    Query,
    Schedule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub key: String,
    pub title: String,
    pub kind: FieldType,
    pub scope: FieldScope,
    pub required: bool,
    pub description: Option<String>,
    pub placeholder: Option<String>,
    pub help: Option<String>,
    pub disabled: bool,
    pub hidden: bool,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    /// text as shown in the input box
    pub value: String,
}

impl FormField {
    fn query_text(key: &str, title: &str, value: String, placeholder: &str) -> Self {
        Self {
            key: key.to_owned(),
            title: title.to_owned(),
            kind: FieldType::Text,
            scope: FieldScope::Query,
            required: false,
            description: None,
            placeholder: Some(placeholder.to_owned()),
            help: None,
            disabled: false,
            hidden: false,
            minimum: None,
            maximum: None,
            value,
        }
    }

    fn from_property(
        key: &str,
        prop: &Value,
        required: bool,
        ui: Option<&Value>,
        now: OffsetDateTime,
    ) -> Option<Self> {
        let Some(kind) = FieldType::of(prop) else {
            warn!("Unsupported schema property `{key}`: {prop}");
            return None;
        };
        let ui_str = |name: &str| ui.and_then(|u| u.get(name)).and_then(Value::as_str);
        let text = |name: &str| prop.get(name).and_then(Value::as_str).map(str::to_owned);
        let value = initial_text(&kind, prop.get("default"), now);
        Some(Self {
            key: key.to_owned(),
            title: text("title").unwrap_or_else(|| key.to_owned()),
            scope: FieldScope::Schedule,
            required,
            description: text("description"),
            placeholder: ui_str("ui:placeholder").map(str::to_owned),
            help: ui_str("ui:help").map(str::to_owned),
            disabled: ui.and_then(|u| u.get("ui:disabled")).and_then(Value::as_bool) == Some(true),
            hidden: ui_str("ui:widget") == Some("hidden"),
            minimum: prop.get("minimum").and_then(Value::as_f64),
            maximum: prop.get("maximum").and_then(Value::as_f64),
            kind,
            value,
        })
    }

    pub fn is_editable(&self) -> bool {
        !self.disabled && !self.hidden
    }

    /// Options a field is cycled through instead of typed, if any.
    pub fn choices(&self) -> Option<Vec<String>> {
        match &self.kind {
            FieldType::Boolean => Some(vec!["true".into(), "false".into()]),
            FieldType::Enum(options) => Some(
                options.iter().map(|o| render(o).map(|s| s.into_owned()).unwrap_or_default()).collect(),
            ),
            _ => None,
        }
    }

    pub fn cycle(&mut self, forward: bool) {
        let Some(choices) = self.choices().filter(|c| !c.is_empty()) else {
            return;
        };
        let len = choices.len();
        let next = match choices.iter().position(|c| *c == self.value) {
            None => 0,
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
        };
        self.value = choices[next].clone();
    }

    /// Typed value of the field, `None` when left empty.
    pub fn parse(&self, now: OffsetDateTime) -> Result<Option<Value>, String> {
        let text = self.value.trim();
        if text.is_empty() {
            return if self.required { Err("is a required property".into()) } else { Ok(None) };
        }
        let value = match &self.kind {
            FieldType::Text => Value::String(self.value.clone()),
            FieldType::DateTime => date_expr::parse_rfc3339(text, now)
                .map(Value::String)
                .ok_or("must be a valid date-time")?,
            FieldType::Integer => {
                text.parse::<i64>().map(Value::from).map_err(|_| "must be integer")?
            }
            FieldType::Number => text
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or("must be number")?,
            FieldType::Boolean => match text {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err("must be boolean".into()),
            },
            FieldType::List => Value::Array(
                text.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| Value::String(s.to_owned()))
                    .collect(),
            ),
            FieldType::Enum(options) => options
                .iter()
                .find(|o| render(o).as_deref() == Some(text))
                .cloned()
                .ok_or("must be equal to one of the allowed values")?,
        };

        if let Some(n) = value.as_f64() {
            if let Some(min) = self.minimum
                && n < min
            {
                return Err(format!("must be >= {min}"));
            }
            if let Some(max) = self.maximum
                && n > max
            {
                return Err(format!("must be <= {max}"));
            }
        }
        Ok(Some(value))
    }
}

fn initial_text(kind: &FieldType, default: Option<&Value>, now: OffsetDateTime) -> String {
    let Some(default) = default.filter(|v| !v.is_null()) else {
        return String::new();
    };
    match (kind, default) {
        // relative expressions are resolved once, when the form is built
        (FieldType::DateTime, Value::String(expr)) => {
            date_expr::parse_rfc3339(expr, now).unwrap_or_default()
        }
        (FieldType::List, Value::Array(items)) => {
            items.iter().filter_map(render).collect::<Vec<_>>().join(", ")
        }
        (_, v) => render(v).map(|s| s.into_owned()).unwrap_or_default(),
    }
}

/// Property keys in display order: `ui:order` first, `*` standing for the rest.
fn ordered_keys(properties: &Map<String, Value>, ui_order: Option<&Vec<Value>>) -> Vec<String> {
    let Some(order) = ui_order else {
        return properties.keys().cloned().collect();
    };
    let listed: Vec<&str> = order.iter().filter_map(Value::as_str).collect();
    let rest: Vec<String> =
        properties.keys().filter(|k| !listed.contains(&k.as_str())).cloned().collect();

    let mut keys = Vec::with_capacity(properties.len());
    let mut rest_placed = false;
    for key in listed {
        if key == "*" {
            keys.extend(rest.iter().cloned());
            rest_placed = true;
        } else if properties.contains_key(key) {
            keys.push(key.to_owned());
        }
    }
    if !rest_placed {
        keys.extend(rest);
    }
    keys
}

/// Compares two form values the way validation rules see them.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => {
            match (OffsetDateTime::parse(a, &Rfc3339), OffsetDateTime::parse(b, &Rfc3339)) {
                (Ok(a), Ok(b)) => Some(a.cmp(&b)),
                _ => Some(a.cmp(b)),
            }
        }
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn rule_holds(rule: &ValidationRule, data: &Map<String, Value>) -> bool {
    let arg = |i: usize| rule.arguments.get(i).and_then(|k| data.get(k));
    let (Some(a), Some(b)) = (arg(0), arg(1)) else {
        return false;
    };
    compare_values(a, b).is_some_and(|ord| rule.name.test(ord))
}

/// The schedule query form: label, description and the fields generated from the
/// configured JSON schema.
#[derive(Debug, Clone)]
pub struct ScheduleForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub fields: Vec<FormField>,
    pub warning: Option<String>,
    rules: Vec<ValidationRule>,

    sql: String,
    db_id: Option<i64>,
    schema: Option<String>,
}

impl ScheduleForm {
    pub fn new(
        conf: &ScheduleConfig,
        query: &QueryResult,
        label: Option<&str>,
        now: OffsetDateTime,
    ) -> Self {
        let label = label.unwrap_or(DEFAULT_LABEL).to_owned();
        let mut fields = vec![
            FormField::query_text("label", "Label", label, "Label for your query"),
            FormField::query_text(
                "description",
                "Description",
                String::new(),
                "Write a description for your query",
            ),
        ];

        let schema = conf.json_schema.as_ref();
        let ui_schema = conf.ui_schema.as_ref();
        if let Some(properties) = schema.and_then(|s| s.get("properties")).and_then(Value::as_object)
        {
            let required: Vec<&str> = schema
                .and_then(|s| s.get("required"))
                .and_then(Value::as_array)
                .map(|r| r.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            let ui_order = ui_schema.and_then(|u| u.get("ui:order")).and_then(Value::as_array);
            for key in ordered_keys(properties, ui_order) {
                let ui = ui_schema.and_then(|u| u.get(&key));
                let field = FormField::from_property(
                    &key,
                    &properties[&key],
                    required.contains(&key.as_str()),
                    ui,
                    now,
                );
                fields.extend(field);
            }
        }
        debug!("Schedule form built with {} fields", fields.len());

        let text = |name: &str| {
            schema.and_then(|s| s.get(name)).and_then(Value::as_str).map(str::to_owned)
        };
        Self {
            title: text("title"),
            description: text("description"),
            fields,
            warning: conf.warning.clone(),
            rules: conf.validation.clone(),
            sql: query.sql.clone(),
            db_id: query.database_id,
            schema: query.schema.clone(),
        }
    }

    fn query_value(&self, key: &str) -> String {
        self.fields
            .iter()
            .find(|f| f.scope == FieldScope::Query && f.key == key)
            .map(|f| f.value.clone())
            .unwrap_or_default()
    }

    /// Validated `schedule_info` object.
    pub fn form_data(&self, now: OffsetDateTime) -> Result<Map<String, Value>, Vec<FieldError>> {
        let mut data = Map::new();
        let mut errors = Vec::new();
        for field in self.fields.iter().filter(|f| f.scope == FieldScope::Schedule) {
            match field.parse(now) {
                Ok(Some(value)) => {
                    data.insert(field.key.clone(), value);
                }
                Ok(None) => {}
                Err(message) => errors.push(FieldError::new(&field.key, message)),
            }
        }
        for rule in &self.rules {
            if !rule_holds(rule, &data) {
                let container = rule.container().unwrap_or_default();
                errors.push(FieldError::new(container, &rule.message));
            }
        }

        if errors.is_empty() { Ok(data) } else { Err(errors) }
    }

    pub fn submit(&self, now: OffsetDateTime) -> Result<ScheduledQuery, Vec<FieldError>> {
        let info = self.form_data(now)?;
        ScheduledQuery::new(
            self.query_value("label"),
            self.query_value("description"),
            self.db_id,
            self.schema.clone(),
            self.sql.clone(),
            info,
        )
        .map_err(|e| vec![FieldError::new("", e.to_string())])
    }
}
