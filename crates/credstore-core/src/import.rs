//! Import parsing for JSON and CSV credential files
//!
//! JSON is tried first. Text that is not JSON at all falls back to a plain
//! comma-separated format: one header row naming the fields, then one row per
//! credential. CSV quoting is not supported, so values must not contain commas
//! or line breaks.

use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::credential::{Credential, CredentialInput};
use crate::error::{Result, StoreError};

/// Field names recognised in imported records
pub const KNOWN_FIELDS: [&str; 4] = ["name", "description", "apiKey", "endpoint"];

/// Parse import file content into a fresh collection
///
/// Every imported record gets a new id; ids present in the input are ignored.
/// A leading byte-order mark is dropped before parsing.
pub fn parse_import(raw: &str) -> Result<Vec<Credential>> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                record_from_value(position, item).map(|(_, input)| Credential::new(input))
            })
            .collect(),
        Ok(other) => Err(StoreError::InvalidFormat(format!(
            "expected a JSON array, found {}",
            json_kind(&other)
        ))),
        Err(json_err) => {
            debug!("Import is not JSON ({}), trying CSV", json_err);
            parse_csv(raw)
        }
    }
}

/// Parse comma-separated credentials with a header row
pub fn parse_csv(raw: &str) -> Result<Vec<Credential>> {
    let mut lines = raw.trim().lines();

    let header_line = lines
        .next()
        .filter(|line| !line.trim().is_empty())
        .ok_or_else(|| StoreError::ImportParse("file is empty".to_string()))?;

    let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();

    if headers.iter().any(|h| h.is_empty()) {
        return Err(StoreError::ImportParse(
            "CSV header contains an empty column name".to_string(),
        ));
    }
    if !headers.iter().any(|h| KNOWN_FIELDS.contains(h)) {
        return Err(StoreError::ImportParse(format!(
            "CSV header must name at least one of: {}",
            KNOWN_FIELDS.join(", ")
        )));
    }

    let mut credentials = Vec::new();

    // Line numbers are 1-based and the header is line 1
    for (line_no, line) in lines.enumerate().map(|(i, l)| (i + 2, l)) {
        if line.trim().is_empty() {
            continue;
        }

        let values: Vec<&str> = line.split(',').map(str::trim).collect();
        if values.len() > headers.len() {
            return Err(StoreError::ImportParse(format!(
                "line {} has {} values but the header has {} columns",
                line_no,
                values.len(),
                headers.len()
            )));
        }

        let mut input = CredentialInput::default();
        for (header, value) in headers.iter().zip(values) {
            if let Some(slot) = field_mut(&mut input, header) {
                *slot = value.to_string();
            }
        }
        credentials.push(Credential::new(input));
    }

    debug!("Parsed {} credentials from CSV", credentials.len());
    Ok(credentials)
}

/// Read one record out of a JSON value
///
/// Missing and null fields become empty strings, numbers and booleans are
/// stringified, unknown keys are ignored. Returns the record's id when it
/// carries a valid one.
pub(crate) fn record_from_value(
    position: usize,
    value: &Value,
) -> Result<(Option<Uuid>, CredentialInput)> {
    let object = value.as_object().ok_or_else(|| {
        StoreError::InvalidFormat(format!(
            "element {} is {}, expected an object",
            position,
            json_kind(value)
        ))
    })?;

    let id = object
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok());

    let input = CredentialInput {
        name: text_field(object, "name"),
        description: text_field(object, "description"),
        api_key: text_field(object, "apiKey"),
        endpoint: text_field(object, "endpoint"),
    };

    Ok((id, input))
}

fn field_mut<'a>(input: &'a mut CredentialInput, header: &str) -> Option<&'a mut String> {
    match header {
        "name" => Some(&mut input.name),
        "description" => Some(&mut input.description),
        "apiKey" => Some(&mut input.api_key),
        "endpoint" => Some(&mut input.endpoint),
        _ => None,
    }
}

fn text_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
