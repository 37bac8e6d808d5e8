//! Query string encoding.

use serde_json::{Map, Number, Value};
use url::form_urlencoded::Serializer;

/// Encode query parameters as `application/x-www-form-urlencoded`.
///
/// Nested arrays and objects use bracket notation (`tags[0]=a`,
/// `filter[name]=b`). Booleans become `1`/`0`, whole floats drop their
/// fraction (`1.0` becomes `1`) and `null` entries are skipped.
pub fn encode_query(params: &Map<String, Value>) -> String {
    let mut serializer = Serializer::new(String::new());
    for (key, value) in params {
        append_value(&mut serializer, key, value);
    }
    serializer.finish()
}

fn append_value(serializer: &mut Serializer<'_, String>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => {
            serializer.append_pair(key, if *flag { "1" } else { "0" });
        }
        Value::Number(number) => {
            serializer.append_pair(key, &number_text(number));
        }
        Value::String(text) => {
            serializer.append_pair(key, text);
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                append_value(serializer, &format!("{key}[{index}]"), item);
            }
        }
        Value::Object(fields) => {
            for (field, item) in fields {
                append_value(serializer, &format!("{key}[{field}]"), item);
            }
        }
    }
}

fn number_text(number: &Number) -> String {
    match number.as_f64() {
        Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e15 => {
            (float as i64).to_string()
        }
        _ => number.to_string(),
    }
}
