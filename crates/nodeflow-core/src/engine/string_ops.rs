//! Text transforms backing the `string` node.

use regex::Regex;
use serde_json::{Map, Value};

use super::runner::NodeError;
use super::template;

/// Apply one named operation to `input_text`.
///
/// String-valued configuration fields are template-rendered against the
/// execution context before use. Character-indexed operations count Unicode
/// scalar values, not bytes.
pub fn apply(
    operation: &str,
    input_text: &str,
    config: &Map<String, Value>,
    context: &Value,
) -> Result<Value, NodeError> {
    match operation {
        "concat" => {
            let separator = rendered_str(config, "separator", context).unwrap_or_default();
            // Joins the substituted `texts` list only; `input_text` is not a
            // concat operand.
            let mut parts: Vec<String> = Vec::new();
            if let Some(Value::Array(texts)) = config.get("texts") {
                for text in texts {
                    match text {
                        Value::String(s) => parts.push(template::render(s, context)),
                        other => parts.push(template::value_to_string(other)),
                    }
                }
            }
            Ok(Value::String(parts.join(&separator)))
        }
        "replace" => {
            let search = rendered_str(config, "search", context).unwrap_or_default();
            let replacement = rendered_str(config, "replace_with", context).unwrap_or_default();
            // An empty search string matches between every character; treat
            // it as a no-op instead of interleaving the replacement.
            if search.is_empty() {
                return Ok(Value::String(input_text.to_string()));
            }
            Ok(Value::String(input_text.replace(&search, &replacement)))
        }
        "split" => {
            let delimiter =
                rendered_str(config, "delimiter", context).unwrap_or_else(|| ",".to_string());
            let parts: Vec<Value> = input_text
                .split(delimiter.as_str())
                .map(|p| Value::String(p.to_string()))
                .collect();
            Ok(Value::Array(parts))
        }
        "extract" => {
            let pattern = rendered_str(config, "pattern", context).unwrap_or_default();
            let regex = Regex::new(&pattern)
                .map_err(|e| NodeError::InvalidPattern(format!("{pattern}: {e}")))?;
            let matches: Vec<Value> = if regex.captures_len() > 1 {
                regex
                    .captures_iter(input_text)
                    .filter_map(|caps| caps.get(1))
                    .map(|m| Value::String(m.as_str().to_string()))
                    .collect()
            } else {
                regex
                    .find_iter(input_text)
                    .map(|m| Value::String(m.as_str().to_string()))
                    .collect()
            };
            Ok(Value::Array(matches))
        }
        "format" => {
            let rendered = rendered_str(config, "template", context).unwrap_or_default();
            Ok(Value::String(rendered))
        }
        "upper" => Ok(Value::String(input_text.to_uppercase())),
        "lower" => Ok(Value::String(input_text.to_lowercase())),
        "trim" => Ok(Value::String(input_text.trim().to_string())),
        "length" => Ok(Value::from(input_text.chars().count() as u64)),
        "substring" => {
            let start = config
                .get("start")
                .and_then(Value::as_u64)
                .unwrap_or(0) as usize;
            let end = config.get("end").and_then(Value::as_u64).map(|e| e as usize);
            let chars: Vec<char> = input_text.chars().collect();
            let start = start.min(chars.len());
            let end = end.unwrap_or(chars.len()).min(chars.len());
            if end <= start {
                return Ok(Value::String(String::new()));
            }
            Ok(Value::String(chars[start..end].iter().collect()))
        }
        "json_extract" => {
            let path = rendered_str(config, "json_path", context).unwrap_or_default();
            let Ok(parsed) = serde_json::from_str::<Value>(input_text) else {
                return Ok(Value::Null);
            };
            Ok(json_path(&parsed, &path).cloned().unwrap_or(Value::Null))
        }
        other => Err(NodeError::UnknownOperation(other.to_string())),
    }
}

/// Fetch a string config field, template-rendered. Absent or non-string
/// fields yield `None`.
fn rendered_str(config: &Map<String, Value>, key: &str, context: &Value) -> Option<String> {
    config
        .get(key)
        .and_then(Value::as_str)
        .map(|s| template::render(s, context))
}

/// Walk a dot-separated path into a JSON document. Purely numeric segments
/// index arrays; everything else keys objects. An empty path is a single
/// empty segment, so it misses.
fn json_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
