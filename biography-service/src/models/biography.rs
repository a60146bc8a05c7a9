use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /generate-biography`.
///
/// `poetName` is kept as raw JSON so presence can be judged loosely: the
/// frontend has historically sent whatever the input box produced.
/// Built from an already parsed body with [`BiographyRequest::from_body`];
/// only a JSON object can carry the field.
#[derive(Debug, Clone, Default)]
pub struct BiographyRequest {
    pub poet_name: Option<Value>,
}

impl BiographyRequest {
    pub fn new(poet_name: impl Into<String>) -> Self {
        Self {
            poet_name: Some(Value::String(poet_name.into())),
        }
    }

    /// Read `poetName` out of a JSON body. Arrays, strings and other
    /// non-object bodies yield a request without a name. For repeated keys
    /// the parser has already kept the last value.
    pub fn from_body(body: Value) -> Self {
        match body {
            Value::Object(mut map) => Self {
                poet_name: map.remove("poetName"),
            },
            _ => Self::default(),
        }
    }

    /// The poet name as prompt text, or `None` when it counts as missing.
    ///
    /// Missing means absent, `null`, `false`, `0`, or `""`. Strings are
    /// returned verbatim. Other truthy values are rendered the way a
    /// JavaScript template literal would: `27`, `true`, arrays joined with
    /// commas, objects as `[object Object]`.
    pub fn poet_name(&self) -> Option<String> {
        match self.poet_name.as_ref()? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => Some(template_text(other)),
        }
    }
}

fn template_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => f.to_string(),
            _ => n.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                // Array.prototype.join renders null entries as empty strings.
                Value::Null => String::new(),
                other => template_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiographyResponse {
    pub biography: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value) -> BiographyRequest {
        BiographyRequest::from_body(body)
    }

    #[test]
    fn falsy_values_count_as_missing() {
        for body in [
            json!({}),
            json!({ "poetName": null }),
            json!({ "poetName": "" }),
            json!({ "poetName": false }),
            json!({ "poetName": 0 }),
            json!({ "poetName": 0.0 }),
        ] {
            assert_eq!(parse(body.clone()).poet_name(), None, "body: {}", body);
        }
    }

    #[test]
    fn strings_are_kept_verbatim() {
        let request = parse(json!({ "poetName": "  Gabriela Mistral " }));
        assert_eq!(request.poet_name().as_deref(), Some("  Gabriela Mistral "));
    }

    #[test]
    fn truthy_non_strings_are_rendered() {
        assert_eq!(parse(json!({ "poetName": 27 })).poet_name().as_deref(), Some("27"));
        assert_eq!(parse(json!({ "poetName": true })).poet_name().as_deref(), Some("true"));
        assert_eq!(parse(json!({ "poetName": 1.5 })).poet_name().as_deref(), Some("1.5"));
        assert_eq!(
            parse(json!({ "poetName": ["Lorca", null, 3] })).poet_name().as_deref(),
            Some("Lorca,,3")
        );
        assert_eq!(
            parse(json!({ "poetName": { "first": "Federico" } }))
                .poet_name()
                .as_deref(),
            Some("[object Object]")
        );
    }

    #[test]
    fn non_object_bodies_have_no_name() {
        for body in [
            json!(["Pablo Neruda"]),
            json!("Pablo Neruda"),
            json!(42),
            json!(true),
            json!(null),
        ] {
            assert_eq!(parse(body.clone()).poet_name(), None, "body: {}", body);
        }
    }

    #[test]
    fn repeated_key_keeps_last_value() {
        let body: Value = serde_json::from_str(r#"{"poetName":"","poetName":"Lorca"}"#).unwrap();
        assert_eq!(parse(body).poet_name().as_deref(), Some("Lorca"));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let request = parse(json!({ "poetName": "Rubén Darío", "lang": "es" }));
        assert_eq!(request.poet_name().as_deref(), Some("Rubén Darío"));
    }

    #[test]
    fn response_serializes_single_field() {
        let body = serde_json::to_value(BiographyResponse {
            biography: "texto".to_string(),
        })
        .unwrap();
        assert_eq!(body, json!({ "biography": "texto" }));
    }
}
