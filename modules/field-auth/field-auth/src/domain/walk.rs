//! Resolves a [`CompiledPath`] against a request context.

use std::borrow::Cow;

use field_auth_sdk::PathStep;
use serde_json::Value;

use super::path::CompiledPath;

/// Walk `context` along `path`.
///
/// Returns `None` ("undefined") as soon as a step has nothing to read:
/// a missing member, an out-of-range index, or a `null`/scalar
/// intermediate. Never fails.
///
/// Derived values come back owned: array and string `length`, and
/// single characters read out of a string by index.
#[must_use]
pub fn walk<'a>(context: &'a Value, path: &CompiledPath) -> Option<Cow<'a, Value>> {
    let mut current = Cow::Borrowed(context);
    for step in path.steps() {
        current = match current {
            Cow::Borrowed(value) => member(value, step)?,
            Cow::Owned(value) => Cow::Owned(member(&value, step)?.into_owned()),
        };
    }
    Some(current)
}

fn member<'a>(value: &'a Value, step: &PathStep) -> Option<Cow<'a, Value>> {
    match (value, step) {
        (Value::Object(map), PathStep::Key(key)) => map.get(key).map(Cow::Borrowed),
        (Value::Object(map), PathStep::Index(idx)) => {
            map.get(&idx.to_string()).map(Cow::Borrowed)
        }
        (Value::Array(items), PathStep::Index(idx)) => items.get(*idx).map(Cow::Borrowed),
        (Value::Array(items), PathStep::Key(key)) if key == "length" => {
            Some(Cow::Owned(Value::from(items.len())))
        }
        (Value::Array(items), PathStep::Key(key)) => canonical_index(key)
            .and_then(|idx| items.get(idx))
            .map(Cow::Borrowed),
        (Value::String(s), PathStep::Key(key)) if key == "length" => {
            Some(Cow::Owned(Value::from(s.encode_utf16().count())))
        }
        (Value::String(s), PathStep::Index(idx)) => code_unit_at(s, *idx),
        (Value::String(s), PathStep::Key(key)) => {
            canonical_index(key).and_then(|idx| code_unit_at(s, idx))
        }
        _ => None,
    }
}

/// Single UTF-16 code unit of `s`, as a one-unit string.
fn code_unit_at<'a>(s: &str, idx: usize) -> Option<Cow<'a, Value>> {
    let unit = s.encode_utf16().nth(idx)?;
    Some(Cow::Owned(Value::String(String::from_utf16_lossy(&[unit]))))
}

/// `"0"`, `"17"` → index; `"01"`, `"-1"`, `"1.0"` → not an index.
fn canonical_index(key: &str) -> Option<usize> {
    let canonical = key == "0"
        || (!key.starts_with('0') && !key.is_empty() && key.chars().all(|c| c.is_ascii_digit()));
    if canonical { key.parse().ok() } else { None }
}
