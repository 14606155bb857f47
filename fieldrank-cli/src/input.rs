//! Loading exported table records and mapping them onto engine input.
//!
//! A record looks like `{"id": "rec1", "fields": {"Score": 12, "Region": "north"}}`.
use std::collections::HashMap;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use fieldrank_core::{normalize, InputRecord, RawValue};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{CliError, Result};

/// One record as exported from the table.
#[derive(Debug, Clone, Deserialize)]
pub struct TableRecord {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct RecordsEnvelope {
    records: Vec<TableRecord>,
}

/// Where records come from. Implementations return the entire record set at once.
pub trait RecordSource {
    fn fetch_all(&mut self) -> Result<Vec<TableRecord>>;
}

/// Reads records from a file, or from stdin when no path is given.
pub struct FileSource {
    pub path: Option<PathBuf>,
}

impl RecordSource for FileSource {
    fn fetch_all(&mut self) -> Result<Vec<TableRecord>> {
        let content = match &self.path {
            Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::Read {
                path: path.clone(),
                source,
            })?,
            None => {
                let mut stdin = io::stdin();
                if stdin.is_terminal() {
                    return Err(CliError::NoInput);
                }
                let mut content = String::new();
                stdin.read_to_string(&mut content)?;
                content
            }
        };
        let records = parse_records_from_str(&content)?;
        debug!(count = records.len(), "loaded records");
        Ok(records)
    }
}

/// Parse records from a JSON array, a `{"records": [...]}` object, or JSON Lines.
pub fn parse_records_from_str(content: &str) -> Result<Vec<TableRecord>> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(CliError::InputJson);
    }

    // A whole-document object with a `records` key is an envelope; its errors are its own.
    if trimmed.starts_with('{') {
        if let Ok(Value::Object(document)) = serde_json::from_str::<Value>(trimmed) {
            if document.contains_key("records") {
                let envelope: RecordsEnvelope =
                    serde_json::from_value(Value::Object(document)).map_err(CliError::InputJson)?;
                return Ok(envelope.records);
            }
        }
    }

    // JSON Lines, blank lines allowed
    trimmed
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|source| CliError::InputLine { line: i + 1, source })
        })
        .collect()
}

/// Convert a JSON cell into an engine value. Objects (links, attachments,
/// users) keep their JSON text: never numeric, but still comparable as group keys.
pub fn raw_value_from_json(value: &Value) -> RawValue {
    match value {
        Value::Null => RawValue::Null,
        Value::Bool(b) => RawValue::Bool(*b),
        Value::Number(n) => n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Null),
        Value::String(s) => RawValue::Text(s.clone()),
        Value::Array(values) => RawValue::List(values.iter().map(raw_value_from_json).collect()),
        Value::Object(_) => RawValue::Object(value.to_string()),
    }
}

/// Which record fields feed the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    pub source_field: String,
    pub group_field: Option<String>,
}

/// Build engine input. A missing source cell counts as null; a missing group
/// cell puts the record in the ungrouped bucket.
pub fn to_input_records(records: &[TableRecord], mapping: &FieldMapping) -> Vec<InputRecord> {
    records
        .iter()
        .map(|record| InputRecord {
            record_id: record.id.clone(),
            source_value: record
                .fields
                .get(&mapping.source_field)
                .map(raw_value_from_json)
                .unwrap_or(RawValue::Null),
            group_value: mapping
                .group_field
                .as_ref()
                .and_then(|name| record.fields.get(name))
                .map(raw_value_from_json),
        })
        .collect()
}

/// Per-field cell counts, for choosing a source field.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FieldSummary {
    pub name: String,
    /// Cells present and not null.
    pub filled: usize,
    /// Cells with a usable number (multi-value cells judged by their first value).
    pub numeric: usize,
}

impl FieldSummary {
    pub fn is_numeric(&self) -> bool {
        self.filled > 0 && self.numeric == self.filled
    }
}

/// Summarise every field seen, sorted by name.
pub fn summarize_fields(records: &[TableRecord]) -> Vec<FieldSummary> {
    let mut summaries: Vec<FieldSummary> = Vec::new();
    let mut name_to_idx: HashMap<&str, usize> = HashMap::new();

    for record in records {
        for (name, value) in &record.fields {
            let idx = *name_to_idx.entry(name.as_str()).or_insert_with(|| {
                summaries.push(FieldSummary {
                    name: name.clone(),
                    filled: 0,
                    numeric: 0,
                });
                summaries.len() - 1
            });
            if value.is_null() {
                continue;
            }
            let summary = &mut summaries[idx];
            summary.filled += 1;
            if normalize(&raw_value_from_json(value)).is_some() {
                summary.numeric += 1;
            }
        }
    }

    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    summaries
}
