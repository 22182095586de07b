//! `{{path.to.value}}` placeholder substitution against a nested context.
//!
//! Strings are scanned left to right in a single pass; each placeholder's
//! dot-separated path is walked into the context mapping. A missing segment
//! (or a non-mapping value mid-walk) leaves the placeholder verbatim --
//! lookup failure is silent, since partially-bound templates are valid
//! intermediate states. There is no escaping and no nested-brace support.

use serde_json::Value;

/// Substitute placeholders in `value` against `context`, recursively.
///
/// Strings are rendered; objects and arrays recurse into every member;
/// all other scalars pass through unchanged.
pub fn substitute(value: &Value, context: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(render(s, context)),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute(v, context)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|v| substitute(v, context)).collect()),
        other => other.clone(),
    }
}

/// Render every `{{path}}` occurrence in a single string.
pub fn render(template: &str, context: &Value) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        let Some(close_rel) = rest[open + 2..].find("}}") else {
            break;
        };
        let close = open + 2 + close_rel;
        result.push_str(&rest[..open]);

        let raw = &rest[open + 2..close];
        let path = raw.trim();
        match lookup(path, context) {
            Some(found) => result.push_str(&value_to_string(found)),
            // Unresolvable: keep the placeholder verbatim.
            None => result.push_str(&rest[open..close + 2]),
        }
        rest = &rest[close + 2..];
    }

    result.push_str(rest);
    result
}

/// Walk a dot-separated path into the context. Every intermediate value must
/// be a mapping holding the next segment.
fn lookup<'a>(path: &str, context: &'a Value) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    let mut current = context;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Stringify a found value: strings bare, scalars via display, containers as
/// compact JSON.
pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> Value {
        json!({
            "input": {"name": "ada", "count": 3},
            "nodes": {
                "fetch": {"output": {"result": "ok"}, "flag": true}
            }
        })
    }

    // -----------------------------------------------------------------------
    // String rendering
    // -----------------------------------------------------------------------

    #[test]
    fn test_render_simple_path() {
        assert_eq!(render("hello {{input.name}}", &context()), "hello ada");
    }

    #[test]
    fn test_render_deep_path() {
        assert_eq!(
            render("status: {{nodes.fetch.output.result}}", &context()),
            "status: ok"
        );
    }

    #[test]
    fn test_render_multiple_placeholders_independently() {
        assert_eq!(
            render("{{input.name}} x{{input.count}}", &context()),
            "ada x3"
        );
    }

    #[test]
    fn test_missing_path_left_verbatim() {
        assert_eq!(
            render("value: {{input.missing}}", &context()),
            "value: {{input.missing}}"
        );
    }

    #[test]
    fn test_non_mapping_midway_left_verbatim() {
        // input.name is a string, so .deeper cannot be walked
        assert_eq!(
            render("{{input.name.deeper}}", &context()),
            "{{input.name.deeper}}"
        );
    }

    #[test]
    fn test_idempotent_on_empty_context() {
        let s = "no {{match.here}} and {{another.one}}";
        assert_eq!(render(s, &json!({})), s);
    }

    #[test]
    fn test_path_whitespace_trimmed() {
        assert_eq!(render("{{ input.name }}", &context()), "ada");
    }

    #[test]
    fn test_unterminated_placeholder_preserved() {
        assert_eq!(render("broken {{input.name", &context()), "broken {{input.name");
    }

    #[test]
    fn test_scalar_stringification() {
        assert_eq!(render("{{nodes.fetch.flag}}", &context()), "true");
        assert_eq!(render("{{input.count}}", &context()), "3");
        assert_eq!(
            render("{{nodes.fetch.output}}", &context()),
            r#"{"result":"ok"}"#
        );
    }

    // -----------------------------------------------------------------------
    // Recursive substitution
    // -----------------------------------------------------------------------

    #[test]
    fn test_substitute_recurses_into_objects_and_arrays() {
        let value = json!({
            "url": "https://api/{{input.name}}",
            "items": ["{{input.count}}", 7, {"inner": "{{input.name}}"}],
            "untouched": 42
        });
        let out = substitute(&value, &context());
        assert_eq!(out["url"], "https://api/ada");
        assert_eq!(out["items"][0], "3");
        assert_eq!(out["items"][1], 7);
        assert_eq!(out["items"][2]["inner"], "ada");
        assert_eq!(out["untouched"], 42);
    }

    #[test]
    fn test_substitute_passes_scalars_through() {
        assert_eq!(substitute(&json!(true), &context()), json!(true));
        assert_eq!(substitute(&json!(1.5), &context()), json!(1.5));
        assert_eq!(substitute(&Value::Null, &context()), Value::Null);
    }
}
