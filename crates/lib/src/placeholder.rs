//! Process-index placeholder substitution.
//!
//! A service that runs several processes usually needs each instance to
//! differ slightly, most often by port. Any string value in a service's env
//! or args may contain `%i`, which is replaced with the instance's
//! zero-based index once the service has been expanded.
//!
//! # Example
//!
//! ```
//! use ndm_lib::placeholder::substitute;
//!
//! assert_eq!(substitute("/var/run/web-%i.sock", 2), "/var/run/web-2.sock");
//! assert_eq!(substitute("80%i", 0), "800");
//! ```

use serde_json::Value;

use crate::consts::PROCESS_INDEX_TOKEN;
use crate::manifest::ValueMap;

/// Replace every `%i` in `input` with `index`.
pub fn substitute(input: &str, index: u32) -> String {
  if !input.contains(PROCESS_INDEX_TOKEN) {
    return input.to_string();
  }
  input.replace(PROCESS_INDEX_TOKEN, &index.to_string())
}

/// Substitute within a JSON value. Only strings are touched.
pub fn substitute_value(value: &Value, index: u32) -> Value {
  match value {
    Value::String(s) => Value::String(substitute(s, index)),
    other => other.clone(),
  }
}

/// Substitute within every value of a map. Keys are left alone.
pub fn substitute_map(map: &ValueMap, index: u32) -> ValueMap {
  map
    .iter()
    .map(|(k, v)| (k.clone(), substitute_value(v, index)))
    .collect()
}
