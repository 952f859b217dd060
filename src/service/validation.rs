//! Request validation against field declarations: coerces raw JSON or form values
//! into typed bind values and collects per-field errors.

use crate::config::{FieldType, ResolvedEntity, ResolvedField, ResolvedRelation, ResolvedResource};
use crate::error::{AppError, FieldErrors};
use crate::sql::BindValue;
use serde_json::{Map, Value};

/// Which write the body is for. `Partial` is PATCH: only supplied fields are checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Replace,
    Partial,
}

/// Form bodies carry every value as a string and lists as repeated keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Form,
}

/// Validated write: scalar columns plus full replacement sets for relations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CleanedData {
    pub columns: Vec<(String, BindValue)>,
    pub relations: Vec<(String, Vec<i64>)>,
}

impl CleanedData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: &str, value: BindValue) -> Self {
        self.columns.push((name.to_string(), value));
        self
    }

    pub fn with_relation(mut self, name: &str, ids: Vec<i64>) -> Self {
        self.relations.push((name.to_string(), ids));
        self
    }
}

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a write body. Read-only (primary key) and undeclared keys are ignored.
    pub fn validate(
        entity: &ResolvedEntity,
        body: &Map<String, Value>,
        mode: WriteMode,
        format: BodyFormat,
    ) -> Result<CleanedData, AppError> {
        let mut errors = FieldErrors::new();
        let mut cleaned = CleanedData::new();

        for field in &entity.fields {
            match body.get(&field.name) {
                Some(v) => match clean_field(field, v, format) {
                    Ok(b) => cleaned.columns.push((field.name.clone(), b)),
                    Err(msg) => errors.add(&field.name, msg),
                },
                None => match mode {
                    WriteMode::Partial => {}
                    _ if !field.nullable => errors.add(&field.name, REQUIRED),
                    WriteMode::Create => cleaned
                        .columns
                        .push((field.name.clone(), BindValue::Null(field.field_type))),
                    WriteMode::Replace => {}
                },
            }
        }

        for rel in &entity.relations {
            if let Some(v) = body.get(&rel.name) {
                match clean_relation(rel, v, format) {
                    Ok(ids) => cleaned.relations.push((rel.name.clone(), ids)),
                    Err(msgs) => {
                        for m in msgs {
                            errors.add(&rel.name, m);
                        }
                    }
                }
            }
        }

        errors.into_result()?;
        Ok(cleaned)
    }

    /// Equality filters from the query string. Only declared filter fields count;
    /// empty values are ignored.
    pub fn parse_filters(
        resource: &ResolvedResource,
        params: &[(String, String)],
    ) -> Result<Vec<(String, BindValue)>, AppError> {
        let mut errors = FieldErrors::new();
        let mut filters = Vec::new();
        for (k, v) in params {
            let Some(filter) = resource.filter(k) else { continue };
            // Compared against stored values, which are trimmed on write.
            let v = v.trim();
            if v.is_empty() {
                continue;
            }
            match filter.field_type {
                FieldType::BigInt => match v.parse::<i64>() {
                    Ok(n) => filters.push((k.clone(), BindValue::BigInt(n))),
                    Err(_) => errors.add(k, "Enter a number."),
                },
                FieldType::Text | FieldType::Date => filters.push((k.clone(), BindValue::Text(v.to_string()))),
            }
        }
        errors.into_result()?;
        Ok(filters)
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn clean_field(field: &ResolvedField, v: &Value, format: BodyFormat) -> Result<BindValue, String> {
    // Repeated form keys for a scalar field: the last one wins.
    let v = match (format, v) {
        (BodyFormat::Form, Value::Array(items)) => items.last().unwrap_or(&Value::Null),
        _ => v,
    };
    if v.is_null() {
        return if field.nullable {
            Ok(BindValue::Null(field.field_type))
        } else {
            Err(NOT_NULL.into())
        };
    }
    if format == BodyFormat::Form && field.nullable && field.field_type != FieldType::Text && v.as_str() == Some("") {
        return Ok(BindValue::Null(field.field_type));
    }
    match field.field_type {
        FieldType::BigInt => clean_integer(v)
            .map(BindValue::BigInt)
            .ok_or_else(|| "A valid integer is required.".to_string()),
        FieldType::Text => {
            let s = match v {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => return Err("Not a valid string.".into()),
            };
            if s.is_empty() && !field.allow_blank {
                return Err("This field may not be blank.".into());
            }
            if let Some(max) = field.max_length {
                if s.chars().count() > max as usize {
                    return Err(format!("Ensure this field has no more than {} characters.", max));
                }
            }
            Ok(BindValue::Text(s))
        }
        FieldType::Date => v
            .as_str()
            .and_then(|s| chrono::NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
            .map(|d| BindValue::Text(d.format("%Y-%m-%d").to_string()))
            .ok_or_else(|| "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.".to_string()),
    }
}

fn clean_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn clean_relation(rel: &ResolvedRelation, v: &Value, format: BodyFormat) -> Result<Vec<i64>, Vec<String>> {
    let items: Vec<&Value> = match (format, v) {
        (_, Value::Null) => return Err(vec![NOT_NULL.into()]),
        (_, Value::Array(items)) => items.iter().collect(),
        (BodyFormat::Form, Value::String(_)) => vec![v],
        (BodyFormat::Json, other) => {
            return Err(vec![format!(
                "Expected a list of items but got type \"{}\".",
                type_name(other)
            )])
        }
        (BodyFormat::Form, other) => vec![other],
    };

    let mut ids = Vec::with_capacity(items.len());
    let mut errors = Vec::new();
    for item in items {
        if format == BodyFormat::Form && item.as_str() == Some("") {
            continue;
        }
        match item {
            Value::Bool(_) => errors.push("Incorrect type. Expected pk value, received bool.".to_string()),
            other => match clean_integer(other) {
                Some(id) if !ids.contains(&id) => ids.push(id),
                Some(_) => {}
                None => errors.push(format!(
                    "Incorrect type. Expected pk value, received {}.",
                    type_name(other)
                )),
            },
        }
    }
    if let Some(max) = rel.max_items {
        if ids.len() > max as usize {
            errors.push(format!("Ensure this field has no more than {} elements.", max));
        }
    }
    if errors.is_empty() {
        Ok(ids)
    } else {
        Err(errors)
    }
}
