//! Physical document formats.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use toml::{Table, Value};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FormatError {
    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("invalid TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document root must be a mapping, found {0}")]
    NotATable(&'static str),
}

/// Parses and serializes one kind of physical document.
pub trait DocumentFormat: Send + Sync + fmt::Debug {
    /// File extension without the dot, e.g. `"toml"`.
    fn suffix(&self) -> &'static str;

    fn parse(&self, bytes: &[u8]) -> Result<Table, FormatError>;

    fn serialize(&self, table: &Table) -> Result<Vec<u8>, FormatError>;
}

/// Picks a built-in format from the file extension.
pub fn for_path(path: &Path) -> Option<Arc<dyn DocumentFormat>> {
    let ext = path.extension()?.to_str()?;
    if ext.eq_ignore_ascii_case(TomlFormat.suffix()) {
        Some(Arc::new(TomlFormat))
    } else if ext.eq_ignore_ascii_case(JsonFormat.suffix()) {
        Some(Arc::new(JsonFormat))
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TomlFormat;

impl DocumentFormat for TomlFormat {
    fn suffix(&self) -> &'static str {
        "toml"
    }

    fn parse(&self, bytes: &[u8]) -> Result<Table, FormatError> {
        let contents = std::str::from_utf8(bytes)?;
        Ok(toml::from_str(contents)?)
    }

    fn serialize(&self, table: &Table) -> Result<Vec<u8>, FormatError> {
        Ok(toml::to_string(table)?.into_bytes())
    }
}

/// JSON documents. Objects map to tables; `null` members and elements are
/// dropped since the tree has no null.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl DocumentFormat for JsonFormat {
    fn suffix(&self) -> &'static str {
        "json"
    }

    fn parse(&self, bytes: &[u8]) -> Result<Table, FormatError> {
        match serde_json::from_slice::<serde_json::Value>(bytes)? {
            serde_json::Value::Object(map) => Ok(json_object_to_table(map)),
            other => Err(FormatError::NotATable(json_kind(&other))),
        }
    }

    fn serialize(&self, table: &Table) -> Result<Vec<u8>, FormatError> {
        let object = serde_json::Value::Object(table_to_json_object(table));
        let mut bytes = serde_json::to_vec_pretty(&object)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn json_object_to_table(map: serde_json::Map<String, serde_json::Value>) -> Table {
    let mut table = Table::new();
    for (key, value) in map {
        match json_to_value(value) {
            Some(value) => {
                table.insert(key, value);
            }
            None => tracing::warn!(%key, "dropping null JSON member"),
        }
    }
    table
}

fn json_to_value(value: serde_json::Value) -> Option<Value> {
    let value = match value {
        serde_json::Value::Null => return None,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if n.is_u64() {
                // Beyond i64; keep the digits instead of losing precision
                Value::String(n.to_string())
            } else {
                Value::Float(n.as_f64().unwrap_or_default())
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().filter_map(json_to_value).collect())
        }
        serde_json::Value::Object(map) => Value::Table(json_object_to_table(map)),
    };
    Some(value)
}

fn table_to_json_object(table: &Table) -> serde_json::Map<String, serde_json::Value> {
    table
        .iter()
        .map(|(key, value)| (key.clone(), value_to_json(value)))
        .collect()
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Table(table) => serde_json::Value::Object(table_to_json_object(table)),
    }
}
