use crate::domain::model::Record;
use crate::utils::error::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

/// Renders one resolved value into cell text. Receives the whole record as
/// well so a formatter can combine several fields. Custom formatters may
/// fail; the built-in ones below always produce a value.
pub type Formatter = fn(Option<&Value>, &Record) -> Result<String>;

#[derive(Debug, Clone)]
pub struct Column {
    pub path: String,
    pub label: String,
    pub formatter: Option<Formatter>,
}

impl Column {
    pub fn new(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            formatter: None,
        }
    }

    pub fn with_formatter(
        path: impl Into<String>,
        label: impl Into<String>,
        formatter: Formatter,
    ) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            formatter: Some(formatter),
        }
    }
}

pub fn format_cell(value: Option<&Value>, record: &Record, column: &Column) -> Result<String> {
    match column.formatter {
        Some(formatter) => formatter(value, record),
        None => Ok(default_cell_text(value)),
    }
}

/// Default stringification: absent and null become the empty string,
/// strings pass through without JSON quoting, everything else renders
/// compactly.
pub fn default_cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Quotes a field when it contains a comma, quote or line break, doubling
/// any inner quotes. Everything else passes through untouched.
pub fn escape_csv_field(field: &str) -> String {
    let needs_quoting = field.contains(',')
        || field.contains('"')
        || field.contains('\n')
        || field.contains('\r');

    if !needs_quoting {
        return field.to_string();
    }

    let mut escaped = String::with_capacity(field.len() + 2);
    escaped.push('"');
    for ch in field.chars() {
        if ch == '"' {
            escaped.push('"');
        }
        escaped.push(ch);
    }
    escaped.push('"');
    escaped
}

/// Truncates an ISO timestamp to its UTC calendar day. Accepts RFC 3339
/// with any offset, or a bare `YYYY-MM-DD` prefix.
pub fn day_bucket_utc(timestamp: &str) -> Option<String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(parsed.with_timezone(&Utc).format("%Y-%m-%d").to_string());
    }

    let prefix = timestamp.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
        .ok()
        .map(|date| date.format("%Y-%m-%d").to_string())
}

fn full_name_from(value: Option<&Value>) -> Option<String> {
    let value = value?;
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(_) => {
            let first = value.get("firstName").and_then(Value::as_str).unwrap_or("");
            let last = value.get("lastName").and_then(Value::as_str).unwrap_or("");
            let name = [first.trim(), last.trim()]
                .iter()
                .filter(|part| !part.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            if name.is_empty() {
                None
            } else {
                Some(name)
            }
        }
        _ => None,
    }
}

/// "firstName lastName" from an embedded person object; empty when absent.
pub fn person_name(value: Option<&Value>, _record: &Record) -> Result<String> {
    Ok(full_name_from(value).unwrap_or_default())
}

/// Rider column on orders: unassigned orders show a placeholder.
pub fn rider_name(value: Option<&Value>, _record: &Record) -> Result<String> {
    Ok(full_name_from(value).unwrap_or_else(|| "Not Assigned".to_string()))
}

/// Assignee column on support tickets.
pub fn assignee_name(value: Option<&Value>, _record: &Record) -> Result<String> {
    Ok(full_name_from(value).unwrap_or_else(|| "Unassigned".to_string()))
}

/// Two-decimal amount; anything non-numeric renders as "0.00".
pub fn money(value: Option<&Value>, _record: &Record) -> Result<String> {
    let amount = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(format!("{:.2}", amount.unwrap_or(0.0)))
}

/// Calendar day of a timestamp field; unparseable strings pass through.
pub fn date_only(value: Option<&Value>, _record: &Record) -> Result<String> {
    match value {
        Some(Value::String(s)) => Ok(day_bucket_utc(s).unwrap_or_else(|| s.clone())),
        other => Ok(default_cell_text(other)),
    }
}

/// Comma-joined list for array fields; "N/A" when there is nothing to show.
pub fn string_list(value: Option<&Value>, _record: &Record) -> Result<String> {
    match value {
        Some(Value::Array(items)) if !items.is_empty() => {
            let joined = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", ");
            Ok(joined)
        }
        _ => Ok("N/A".to_string()),
    }
}
