use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;

use crate::{FlowRunnerError, Result, workflow::node::NodeId};

/// Regex pattern for output template variables
/// Format: `{{#nodeId#}}`, `{{#nodeId.key#}}` or `{{#nodeId.key.0.subkey#}}`
const OUTPUT_TEMPLATE_PATTERN: &str = r"\{\{#([^.#]+)(?:\.([^#]+))?#\}\}";

fn output_regex() -> Result<Regex> {
    Regex::new(OUTPUT_TEMPLATE_PATTERN).map_err(|e| FlowRunnerError::Validation(e.to_string()))
}

/// Walks a dotted key path into an output value. Numeric segments index arrays.
fn lookup<'a>(
    value: &'a Value,
    key_path: Option<&str>,
) -> Option<&'a Value> {
    let Some(path) = key_path else {
        return Some(value);
    };

    path.split('.').try_fold(value, |current, key| match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        v => v.to_string(),
    }
}

/// Resolve template variables in the format `{{#nodeId.key#}}` against
/// outputs produced earlier in the run.
/// Returns error if any template variable cannot be resolved
pub fn resolve_template(
    outputs: &HashMap<NodeId, Value>,
    template: &str,
) -> Result<String> {
    let re = output_regex()?;
    let mut result = template.to_string();
    let mut errors: Vec<String> = Vec::new();

    for caps in re.captures_iter(template) {
        let full_match = &caps[0];
        let node_id = &caps[1];
        let key_path = caps.get(2).map(|m| m.as_str());

        match outputs.get(node_id).and_then(|output| lookup(output, key_path)) {
            Some(value) => {
                result = result.replace(full_match, &stringify(value));
            }
            None => {
                errors.push(format!("variable '{}' not found", full_match));
            }
        }
    }

    if !errors.is_empty() {
        return Err(FlowRunnerError::Validation(errors.join(", ")));
    }

    Ok(result)
}

/// Resolve template variables in a JSON Value recursively
pub fn resolve_json_value(
    outputs: &HashMap<NodeId, Value>,
    value: &Value,
) -> Result<Value> {
    match value {
        Value::String(s) => {
            let resolved = resolve_template(outputs, s)?;
            // Try to parse as JSON if the resolved string looks like JSON
            if resolved != *s && (resolved.starts_with('{') || resolved.starts_with('[')) {
                Ok(serde_json::from_str(&resolved).unwrap_or(Value::String(resolved)))
            } else {
                Ok(Value::String(resolved))
            }
        }
        Value::Array(arr) => {
            let resolved: Result<Vec<Value>> = arr.iter().map(|v| resolve_json_value(outputs, v)).collect();
            Ok(Value::Array(resolved?))
        }
        Value::Object(obj) => {
            let resolved: Result<serde_json::Map<String, Value>> = obj.iter().map(|(k, v)| resolve_json_value(outputs, v).map(|rv| (k.clone(), rv))).collect();
            Ok(Value::Object(resolved?))
        }
        _ => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn outputs() -> HashMap<NodeId, Value> {
        let mut outputs = HashMap::new();
        outputs.insert("node1".to_string(), json!({"message": "hello", "count": 42, "active": true, "data": {"user": {"name": "Alice"}}, "items": [{"id": 7}]}));
        outputs.insert("const".to_string(), json!("plain"));
        outputs
    }

    #[test]
    fn test_resolve_template_no_variables() {
        let result = resolve_template(&outputs(), "hello world").unwrap();
        assert_eq!(result, "hello world");
    }

    #[test]
    fn test_resolve_template_simple_output() {
        let result = resolve_template(&outputs(), "{{#node1.message#}}").unwrap();
        assert_eq!(result, "hello");
    }

    #[test]
    fn test_resolve_template_whole_output() {
        let result = resolve_template(&outputs(), "value={{#const#}}").unwrap();
        assert_eq!(result, "value=plain");
    }

    #[test]
    fn test_resolve_template_nested_output() {
        let result = resolve_template(&outputs(), "{{#node1.data.user.name#}}").unwrap();
        assert_eq!(result, "Alice");
    }

    #[test]
    fn test_resolve_template_array_index() {
        let result = resolve_template(&outputs(), "/items/{{#node1.items.0.id#}}").unwrap();
        assert_eq!(result, "/items/7");
    }

    #[test]
    fn test_resolve_template_scalars() {
        let result = resolve_template(&outputs(), "count: {{#node1.count#}}, active: {{#node1.active#}}").unwrap();
        assert_eq!(result, "count: 42, active: true");
    }

    #[test]
    fn test_resolve_template_missing_node() {
        let result = resolve_template(&outputs(), "{{#unknown.value#}}");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_resolve_template_missing_key() {
        let result = resolve_template(&outputs(), "{{#node1.unknown#}}");
        assert!(matches!(result, Err(FlowRunnerError::Validation(_))));
    }

    #[test]
    fn test_resolve_json_value_recursive() {
        let body = json!({"greeting": "{{#node1.message#}}", "user": "{{#node1.data.user#}}", "tags": ["{{#node1.count#}}", 1]});
        let resolved = resolve_json_value(&outputs(), &body).unwrap();
        assert_eq!(resolved, json!({"greeting": "hello", "user": {"name": "Alice"}, "tags": ["42", 1]}));
    }

    #[test]
    fn test_resolve_json_value_keeps_literal_json_strings() {
        let body = json!({"raw": "{\"a\": 1}"});
        let resolved = resolve_json_value(&outputs(), &body).unwrap();
        assert_eq!(resolved, body);
    }
}
