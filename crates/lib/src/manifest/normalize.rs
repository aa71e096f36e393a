//! Normalization of env and args blocks before they reach a service.

use serde_json::Value;

use super::ValueMap;

/// Render a JSON value the way it appears on a command line: strings
/// verbatim, null as empty, everything else as JSON text.
pub fn value_to_string(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Null => String::new(),
    other => other.to_string(),
  }
}

/// Pair a flat `[key, value, key, value, ...]` list into an ordered map.
///
/// A trailing key without a value, or an explicit `null`, maps to `""`.
pub fn args_to_map(list: &[Value]) -> ValueMap {
  list
    .chunks(2)
    .map(|pair| {
      let key = value_to_string(&pair[0]);
      let value = match pair.get(1) {
        None | Some(Value::Null) => Value::String(String::new()),
        Some(v) => v.clone(),
      };
      (key, value)
    })
    .collect()
}

/// Interview questions are objects carrying a `default`; only that default
/// is kept. Objects without one collapse to `""`.
pub fn flatten_question(value: &Value) -> Value {
  match value {
    Value::Object(question) => question
      .get("default")
      .cloned()
      .unwrap_or_else(|| Value::String(String::new())),
    other => other.clone(),
  }
}

pub fn flatten_map(map: &ValueMap) -> ValueMap {
  map.iter().map(|(k, v)| (k.clone(), flatten_question(v))).collect()
}

/// Shallow merge of global defaults and per-service values, service wins.
/// Keys keep the position of their first appearance.
pub fn merge_layers(global: Option<&ValueMap>, local: Option<&ValueMap>) -> ValueMap {
  let mut merged = global.map(flatten_map).unwrap_or_default();
  if let Some(local) = local {
    for (key, value) in local {
      merged.insert(key.clone(), flatten_question(value));
    }
  }
  merged
}
