//! Comparison semantics between a resolved context value and a declared
//! string literal.
//!
//! Declared values are always strings, while context values keep their JSON
//! type. Comparisons follow the loose rules of the schema host's scripting
//! model: numeric contexts compare numerically, string contexts compare by
//! UTF-16 code units, and `undefined` (an absent path, `None` here) never
//! orders against anything.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::Value;

/// A context value reduced to a primitive.
#[derive(Debug, Clone, PartialEq)]
enum Primitive<'a> {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(Cow<'a, str>),
}

fn to_primitive(value: Option<&Value>) -> Primitive<'_> {
    match value {
        None => Primitive::Undefined,
        Some(Value::Null) => Primitive::Null,
        Some(Value::Bool(b)) => Primitive::Bool(*b),
        Some(Value::Number(n)) => Primitive::Number(n.as_f64().unwrap_or(f64::NAN)),
        Some(Value::String(s)) => Primitive::Str(Cow::Borrowed(s)),
        Some(other @ (Value::Array(_) | Value::Object(_))) => {
            Primitive::Str(Cow::Owned(to_display_string(other)))
        }
    }
}

/// String conversion of a JSON value (`[1,2]` → `"1,2"`).
fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), number_to_string),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_display_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_owned(),
    }
}

fn to_number(primitive: &Primitive<'_>) -> f64 {
    match primitive {
        Primitive::Undefined => f64::NAN,
        Primitive::Null => 0.0,
        Primitive::Bool(b) => f64::from(u8::from(*b)),
        Primitive::Number(n) => *n,
        Primitive::Str(s) => string_to_number(s),
    }
}

/// Render a number the way the host prints it (`5.0` → `"5"`).
#[must_use]
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_owned()
    } else if n == 0.0 {
        "0".to_owned()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Exponent form with an explicit sign: `1e+21`, `1.5e-7`.
        let text = format!("{n:e}");
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        }
    } else {
        format!("{n}")
    }
}

/// Parse a string as a number; malformed text yields NaN, blank text 0.
#[must_use]
pub fn string_to_number(s: &str) -> f64 {
    let s = s.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return radix_to_number(digits, radix);
        }
    }

    if is_decimal_literal(s) {
        s.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

fn radix_to_number(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix)
                .map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

/// `[+-]? (digits ('.' digits?)? | '.' digits) ([eE] [+-]? digits)?`
fn is_decimal_literal(s: &str) -> bool {
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return false;
    }
    if int_part.is_empty() && frac_part.is_empty() {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !digits.is_empty() && all_digits(digits)
        }
    }
}

/// Order `value` against `declared`.
///
/// Returns `None` when the operands are unordered (either side is NaN
/// after numeric conversion), in which case every ordering check fails.
#[must_use]
pub fn compare(value: Option<&Value>, declared: &str) -> Option<Ordering> {
    match to_primitive(value) {
        Primitive::Str(s) => Some(s.encode_utf16().cmp(declared.encode_utf16())),
        other => to_number(&other).partial_cmp(&string_to_number(declared)),
    }
}

/// Loose equality: numbers and booleans compare numerically against the
/// declared text, `null`/`undefined` never equal a string.
#[must_use]
pub fn loose_eq(value: Option<&Value>, declared: &str) -> bool {
    match to_primitive(value) {
        Primitive::Undefined | Primitive::Null => false,
        Primitive::Str(s) => s == declared,
        other => {
            to_number(&other).partial_cmp(&string_to_number(declared)) == Some(Ordering::Equal)
        }
    }
}

/// Strict equality: only a string with identical text.
#[must_use]
pub fn strict_eq(value: Option<&Value>, declared: &str) -> bool {
    matches!(value, Some(Value::String(s)) if s == declared)
}

/// Truthiness of a context value.
#[must_use]
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Render a resolved value for diagnostics (`undefined` when absent).
#[must_use]
pub fn render(value: Option<&Value>) -> String {
    value.map_or_else(|| "undefined".to_owned(), Value::to_string)
}
