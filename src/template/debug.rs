//! Built-in debug partial
//!
//! Include it from any template with `{{> mustache-layouts/debug}}`. It dumps the
//! fields of a [`DebugContext`], so the context passed to the including template
//! should be built with one.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

/// Name the debug partial is registered under
pub const DEBUG_PARTIAL: &str = "mustache-layouts/debug";

/// Source of the debug partial
pub const DEBUG_TEMPLATE: &str = r#"
<div class="ml-debug">
    <h1>Render debugger</h1>
    <small>page generated at {{ Helper.Now }}</small>
    <h3>Response</h3>
    <div>{{ String }}</div>
    <h2>Request context params</h2>
    <ul>{{ #Context.params }}
        <li><pre>{{ . }}</pre></li>{{ /Context.params }}
    </ul>
    <h2>Request context keys</h2>
    <ul>{{ #Context.keys }}
        <li><pre>{{ . }}</pre></li>{{ /Context.keys }}
    </ul>
    <h2>Request params</h2>
    <ul>{{ #Params }}
        <li><pre>{{ . }}</pre></li>{{ /Params }}
    </ul>
    <h2>Extra data</h2>
    <ul>{{ #Extra }}
        <li><pre>{{ . }}</pre></li>{{ /Extra }}
    </ul>
    <h3>Full response (as object)</h3>
    <ul>{{ #Data }}
        <li><pre>{{ . }}</pre></li>{{ /Data }}
    </ul>
    <h3>Full response (as array)</h3>
    <ul>{{ #Array }}
        <li><pre>{{ . }}</pre></li>{{ /Array }}
    </ul>
</div>"#;

/// Context shape expected by the debug partial
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DebugContext {
    pub helper: DebugHelper,
    /// The response rendered as a single string
    pub string: String,
    pub context: RequestContext,
    pub params: Vec<Value>,
    pub extra: Vec<Value>,
    /// The response's entries when it is an object, as `{"key", "value"}` pairs
    pub data: Vec<Value>,
    /// The response's items when it is an array
    pub array: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DebugHelper {
    /// RFC 3339 timestamp of when the context was built
    pub now: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestContext {
    pub params: Vec<Value>,
    pub keys: Vec<Value>,
}

impl DebugContext {
    /// Create a context stamped with the current time
    pub fn new() -> Self {
        Self {
            helper: DebugHelper {
                now: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            },
            ..Self::default()
        }
    }

    /// Fill the response fields from a response value
    pub fn with_response(mut self, response: &Value) -> Self {
        self.string = response.to_string();
        self.data = match response {
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| serde_json::json!({ "key": key, "value": value }))
                .collect(),
            _ => vec![],
        };
        self.array = match response {
            Value::Array(items) => items.clone(),
            _ => vec![],
        };
        self
    }

    /// Append a request parameter
    pub fn with_param(mut self, param: impl Into<Value>) -> Self {
        self.params.push(param.into());
        self
    }

    /// Append an extra data entry
    pub fn with_extra(mut self, extra: impl Into<Value>) -> Self {
        self.extra.push(extra.into());
        self
    }

    /// Convert into the value templates are rendered against
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_names_match_partial() {
        let value = DebugContext::new().to_value().unwrap();
        for field in ["Helper", "String", "Context", "Params", "Extra", "Data", "Array"] {
            assert!(value.get(field).is_some(), "missing field {}", field);
        }
        assert!(value["Helper"]["Now"].as_str().is_some_and(|s| !s.is_empty()));
        assert!(value["Context"]["params"].is_array());
        assert!(value["Context"]["keys"].is_array());
    }

    #[test]
    fn test_with_object_response() {
        let ctx = DebugContext::new().with_response(&json!({"b": 2, "a": 1}));
        assert_eq!(ctx.string, r#"{"a":1,"b":2}"#);
        assert_eq!(
            ctx.data,
            vec![json!({"key": "a", "value": 1}), json!({"key": "b", "value": 2})]
        );
        assert!(ctx.array.is_empty());
    }

    #[test]
    fn test_with_array_response() {
        let ctx = DebugContext::new()
            .with_response(&json!([1, "two"]))
            .with_param("id=7")
            .with_extra(json!({"env": "test"}));
        assert_eq!(ctx.array, vec![json!(1), json!("two")]);
        assert!(ctx.data.is_empty());
        assert_eq!(ctx.params, vec![json!("id=7")]);
        assert_eq!(ctx.extra, vec![json!({"env": "test"})]);
    }
}
