//! Daemon wrapper template rendering.
//!
//! Templates use minijinja syntax. The built-in templates live under
//! `templates/` and are compiled into the binary; a custom template can be
//! supplied through the `template` configuration key.

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;

/// Render `source` with `context`.
///
/// Output is not auto-escaped. Templates that emit XML escape values
/// themselves with the `xml` filter.
pub fn render<S: Serialize>(source: &str, context: S) -> Result<String, minijinja::Error> {
  let mut env = Environment::new();
  env.set_auto_escape_callback(|_| AutoEscape::None);
  env.set_undefined_behavior(UndefinedBehavior::Lenient);
  env.set_keep_trailing_newline(true);
  env.add_filter("xml", xml_escape);
  env.render_str(source, context)
}

fn xml_escape(value: String) -> String {
  let mut out = String::with_capacity(value.len());
  for c in value.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&apos;"),
      c => out.push(c),
    }
  }
  out
}
