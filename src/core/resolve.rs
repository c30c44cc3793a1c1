use crate::domain::model::Record;
use serde_json::Value;

/// Walks a dotted path ("customer.firstName") through a record's JSON
/// fields. Returns `None` for anything that cannot be followed: a missing
/// key, a non-object in the middle of the path, or an empty record. Never
/// fails, never panics.
pub fn resolve<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = record.data.get(first)?;

    for segment in segments {
        match current {
            Value::Object(map) => current = map.get(segment)?,
            _ => return None,
        }
    }

    Some(current)
}

/// Same walk starting from an already-resolved JSON value.
pub fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        match current {
            Value::Object(map) => current = map.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

pub fn resolve_str<'a>(record: &'a Record, path: &str) -> Option<&'a str> {
    resolve(record, path).and_then(Value::as_str)
}

pub fn resolve_bool(record: &Record, path: &str) -> Option<bool> {
    resolve(record, path).and_then(Value::as_bool)
}

/// True when the field resolves to exactly the given string.
pub fn field_equals(record: &Record, path: &str, expected: &str) -> bool {
    resolve_str(record, path) == Some(expected)
}
