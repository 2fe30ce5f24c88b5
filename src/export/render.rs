//! Rendering of column values into CSV cells

use serde_json::Value;

/// Render a value as a CSV cell.
///
/// Null becomes an empty cell, integers are written in decimal, floats with
/// six decimals, and arrays/objects as compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                format!("{:.6}", n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
