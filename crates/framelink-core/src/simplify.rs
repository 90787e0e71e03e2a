//! Scalar-only event serializer.
//!
//! Input events crossing the channel must be plain records: no callables, no
//! live handles, no nested structure the far side could mistake for one.
//! `simplify` keeps scalar-valued fields (numbers, strings, booleans) and
//! drops everything else. The single structured exception is a `touches`
//! field, which is reduced to per-touch page coordinates instead of being
//! dropped wholesale.
//!
//! Loss here is silent and deliberate; receivers must not depend on fields
//! the serializer cannot represent.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::{FramelinkError, Result};

/// Field name whose array-of-records value survives as page coordinates.
const TOUCHES_FIELD: &str = "touches";

fn is_scalar(v: &Value) -> bool {
    matches!(v, Value::Number(_) | Value::String(_) | Value::Bool(_))
}

/// Reduce a structured value to a flat record of its scalar fields.
///
/// Non-object input reduces to an empty record.
pub fn simplify(value: &Value) -> Value {
    let mut out = Map::new();
    if let Value::Object(fields) = value {
        for (name, v) in fields {
            if is_scalar(v) {
                out.insert(name.clone(), v.clone());
            }
        }
    }
    Value::Object(out)
}

/// `simplify`, plus the touch-list reduction.
///
/// A `touches` array keeps one `{pageX, pageY}` record per entry; every
/// other field follows the scalar-only rule.
pub fn simplify_payload(value: &Value) -> Value {
    let mut flat = simplify(value);
    if let Some(Value::Array(touches)) = value.get(TOUCHES_FIELD) {
        let reduced: Vec<Value> = touches
            .iter()
            .map(|t| {
                json!({
                    "pageX": t.get("pageX").cloned().unwrap_or(Value::Null),
                    "pageY": t.get("pageY").cloned().unwrap_or(Value::Null),
                })
            })
            .collect();
        if let Value::Object(fields) = &mut flat {
            fields.insert(TOUCHES_FIELD.to_string(), Value::Array(reduced));
        }
    }
    flat
}

/// Serialize an arbitrary event-like value, then flatten it for transport.
pub fn simplify_event<T: Serialize>(event: &T) -> Result<Value> {
    let raw = serde_json::to_value(event)
        .map_err(|e| FramelinkError::BadMessage(format!("event not serializable: {e}")))?;
    Ok(simplify_payload(&raw))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn keeps_scalars_drops_structure() {
        let ev = json!({
            "clientX": 120.5,
            "clientY": 44,
            "type": "pointermove",
            "ctrlKey": false,
            "target": { "tag": "canvas" },
            "path": [1, 2, 3],
            "view": null,
        });
        let flat = simplify(&ev);
        assert_eq!(flat["clientX"], json!(120.5));
        assert_eq!(flat["type"], json!("pointermove"));
        assert_eq!(flat["ctrlKey"], json!(false));
        assert!(flat.get("target").is_none());
        assert!(flat.get("path").is_none());
        assert!(flat.get("view").is_none());
    }

    #[test]
    fn touches_reduce_to_page_coordinates() {
        let ev = json!({
            "type": "touchmove",
            "touches": [
                { "pageX": 10, "pageY": 20, "radiusX": 4, "identifier": 0 },
                { "pageX": 30, "pageY": 40, "radiusX": 5, "identifier": 1 },
            ],
        });
        let flat = simplify_payload(&ev);
        assert_eq!(
            flat["touches"],
            json!([{ "pageX": 10, "pageY": 20 }, { "pageX": 30, "pageY": 40 }])
        );
    }

    #[test]
    fn non_object_reduces_to_empty_record() {
        assert_eq!(simplify(&json!([1, 2, 3])), json!({}));
        assert_eq!(simplify(&json!("click")), json!({}));
    }
}
