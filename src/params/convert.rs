//! Typed conversion of raw parameter values.
//!
//! Text values go through a fast numeric parse first and fall back to a generic
//! conversion (the text read as a JSON scalar). Callers only ever see `None` on
//! failure; which path was tried is not observable.

use crate::spec::ParamType;
use serde_json::{Number, Value};

/// Convert text read from the URL, query string, a header or a cookie.
pub fn convert_text(text: &str, ty: &ParamType) -> Option<Value> {
    match ty {
        ParamType::String => Some(Value::String(text.to_string())),
        ParamType::Bool => parse_bool(text).map(Value::Bool),
        ParamType::Json => Some(
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())),
        ),
        ParamType::List(inner) => text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| convert_text(item, inner))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        numeric => fast_numeric(text, numeric).or_else(|| generic_numeric(text, numeric)),
    }
}

/// Convert a value taken from an already-deserialized request body.
pub fn convert_value(value: &Value, ty: &ParamType) -> Option<Value> {
    match (ty, value) {
        (ParamType::Json, v) => Some(v.clone()),
        (ParamType::List(inner), Value::Array(items)) => items
            .iter()
            .map(|item| convert_value(item, inner))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        (_, Value::String(s)) => convert_text(s, ty),
        (ParamType::List(inner), scalar) => {
            convert_value(scalar, inner).map(|v| Value::Array(vec![v]))
        }
        (ParamType::String, Value::Number(n)) => Some(Value::String(n.to_string())),
        (ParamType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
        (ParamType::Bool, Value::Bool(b)) => Some(Value::Bool(*b)),
        (numeric, Value::Number(n)) if numeric.is_numeric() => number_as(n, numeric),
        _ => None,
    }
}

/// Booleans accept exactly the literals `true` and `false`.
fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn finite(f: f64) -> Option<Value> {
    if f.is_finite() {
        Number::from_f64(f).map(Value::Number)
    } else {
        None
    }
}

fn fast_numeric(text: &str, ty: &ParamType) -> Option<Value> {
    match ty {
        ParamType::I32 => text.parse::<i32>().ok().map(Value::from),
        ParamType::I64 => text.parse::<i64>().ok().map(Value::from),
        ParamType::U32 => text.parse::<u32>().ok().map(Value::from),
        ParamType::U64 => text.parse::<u64>().ok().map(Value::from),
        ParamType::F32 => text
            .parse::<f32>()
            .ok()
            .and_then(|f| finite(f64::from(f))),
        ParamType::F64 => text.parse::<f64>().ok().and_then(finite),
        _ => None,
    }
}

fn generic_numeric(text: &str, ty: &ParamType) -> Option<Value> {
    match serde_json::from_str::<Value>(text.trim()).ok()? {
        Value::Number(n) => number_as(&n, ty),
        _ => None,
    }
}

fn integral(n: &Number) -> Option<f64> {
    n.as_f64().filter(|f| f.is_finite() && f.fract() == 0.0)
}

fn number_as(n: &Number, ty: &ParamType) -> Option<Value> {
    match ty {
        ParamType::I32 => n
            .as_i64()
            .or_else(|| {
                integral(n)
                    .filter(|f| *f >= f64::from(i32::MIN) && *f <= f64::from(i32::MAX))
                    .map(|f| f as i64)
            })
            .and_then(|i| i32::try_from(i).ok())
            .map(Value::from),
        ParamType::I64 => n
            .as_i64()
            .or_else(|| {
                integral(n)
                    .filter(|f| *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .map(Value::from),
        ParamType::U32 => n
            .as_u64()
            .or_else(|| {
                integral(n)
                    .filter(|f| *f >= 0.0 && *f <= f64::from(u32::MAX))
                    .map(|f| f as u64)
            })
            .and_then(|u| u32::try_from(u).ok())
            .map(Value::from),
        ParamType::U64 => n
            .as_u64()
            .or_else(|| {
                integral(n)
                    .filter(|f| *f >= 0.0 && *f < u64::MAX as f64)
                    .map(|f| f as u64)
            })
            .map(Value::from),
        ParamType::F32 => n.as_f64().map(|f| f as f32).and_then(|f| finite(f64::from(f))),
        ParamType::F64 => n.as_f64().and_then(finite),
        _ => None,
    }
}
