//! URL template resolution.
//!
//! A template such as `/api/users/:id` holds `:field` placeholders. Each one is
//! replaced by the matching field of a record payload (names compared
//! case-insensitively), or by the payload itself for `:id` when the payload is
//! a scalar. Unresolved placeholders stay verbatim.

use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").unwrap());

/// Substitutes every `:field` placeholder of `template` from `payload`.
pub fn resolve_url(template: &str, payload: &Value) -> String {
    if !template.contains(':') {
        return template.to_string();
    }

    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            lookup(payload, &caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn lookup(payload: &Value, name: &str) -> Option<String> {
    match payload {
        Value::Object(fields) => fields
            .get(name)
            .or_else(|| {
                fields
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .and_then(segment),
        Value::String(_) | Value::Number(_) | Value::Bool(_) if name.eq_ignore_ascii_case("id") => {
            segment(payload)
        }
        _ => None,
    }
}

/// Scalars only; nested values and null are not path segments.
fn segment(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_payload_fills_id() {
        assert_eq!(resolve_url("/api/docs/:id", &json!(7)), "/api/docs/7");
        assert_eq!(resolve_url("/api/docs/:id", &json!("abc")), "/api/docs/abc");
    }

    #[test]
    fn test_template_without_tokens_is_unchanged() {
        assert_eq!(resolve_url("/api/docs", &json!({ "id": 7 })), "/api/docs");
        assert_eq!(resolve_url("/api/docs", &json!(null)), "/api/docs");
    }

    #[test]
    fn test_record_fields_fill_every_token() {
        let payload = json!({ "OrgId": "acme", "id": 3 });
        assert_eq!(
            resolve_url("/orgs/:orgId/docs/:id/revisions/:ID", &payload),
            "/orgs/acme/docs/3/revisions/3"
        );
    }

    #[test]
    fn test_unresolved_tokens_are_left_verbatim() {
        assert_eq!(resolve_url("/api/docs/:id", &json!({ "name": "x" })), "/api/docs/:id");
        assert_eq!(resolve_url("/api/:kind/:id", &json!(5)), "/api/:kind/5");
        assert_eq!(resolve_url("/api/docs/:id", &json!(null)), "/api/docs/:id");
    }

    #[test]
    fn test_ports_and_schemes_are_not_tokens() {
        assert_eq!(
            resolve_url("http://localhost:8080/api/docs/:id", &json!(1)),
            "http://localhost:8080/api/docs/1"
        );
    }
}
