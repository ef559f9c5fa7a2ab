//! JSON body redaction.

use serde::Serialize;
use serde_json::{Map, Value};

/// Mask every configured field in a JSON text.
///
/// Text that is not a JSON object, or that fails to re-serialize, is returned
/// byte-for-byte unchanged.
pub fn redact_json<S: AsRef<str>>(text: &str, fields: &[S]) -> String {
    let mut document = match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => value,
        _ => return text.to_string(),
    };

    redact_value(&mut document, fields);
    serde_json::to_string(&document).unwrap_or_else(|_| text.to_string())
}

/// Serialize `value` and mask the configured fields.
///
/// Returns an empty string when `value` cannot be serialized.
pub fn redact_serialize<T, S>(value: &T, fields: &[S]) -> String
where
    T: Serialize + ?Sized,
    S: AsRef<str>,
{
    let mut document = match serde_json::to_value(value) {
        Ok(document) => document,
        Err(_) => return String::new(),
    };

    redact_value(&mut document, fields);
    serde_json::to_string(&document).unwrap_or_default()
}

/// Mask in place. Only objects are walked; any other value is left alone.
pub fn redact_value<S: AsRef<str>>(document: &mut Value, fields: &[S]) {
    if let Value::Object(map) = document {
        for field in fields {
            let field = field.as_ref();
            if field.is_empty() {
                continue;
            }
            walk_entries(map, &mut |key, value| {
                if key.contains(field) {
                    *value = Value::Null;
                }
            });
        }
    }
}

/// Depth-first walk over an object tree.
///
/// `visit` sees every scalar or array entry of every nested object together
/// with its key. Nested objects are descended into and never passed to
/// `visit`; arrays are visited as a whole and not descended into. `null`
/// entries are skipped.
pub fn walk_entries<F>(map: &mut Map<String, Value>, visit: &mut F)
where
    F: FnMut(&str, &mut Value),
{
    for (key, value) in map.iter_mut() {
        match value {
            Value::Object(nested) => walk_entries(nested, visit),
            Value::Null => {}
            Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
                visit(key, value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_masks_nested_and_top_level() {
        let input = r#"{"password":"secret","user":{"password":"x"}}"#;
        let output = redact_json(input, &["password"]);

        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!({"password": null, "user": {"password": null}}));
    }

    #[test]
    fn test_substring_match_over_masks() {
        let input = r#"{"password_hint":"pet","name":"bob"}"#;
        let parsed: Value = serde_json::from_str(&redact_json(input, &["password"])).unwrap();
        assert_eq!(parsed, json!({"password_hint": null, "name": "bob"}));
    }

    #[test]
    fn test_masks_all_value_kinds() {
        let input = r#"{"token":1,"token_ok":true,"tokens":[1,2],"token_s":"x","keep":{"a":1}}"#;
        let parsed: Value = serde_json::from_str(&redact_json(input, &["token"])).unwrap();
        assert_eq!(
            parsed,
            json!({"token": null, "token_ok": null, "tokens": null, "token_s": null, "keep": {"a": 1}})
        );
    }

    #[test]
    fn test_object_under_matching_key_is_recursed_not_nulled() {
        let input = r#"{"password":{"old":"a","password":"b"}}"#;
        let parsed: Value = serde_json::from_str(&redact_json(input, &["password"])).unwrap();
        assert_eq!(parsed, json!({"password": {"old": "a", "password": null}}));
    }

    #[test]
    fn test_arrays_are_not_descended() {
        let input = r#"{"users":[{"password":"a"}]}"#;
        let parsed: Value = serde_json::from_str(&redact_json(input, &["password"])).unwrap();
        assert_eq!(parsed, json!({"users": [{"password": "a"}]}));
    }

    #[test]
    fn test_idempotent() {
        let input = r#"{"password":"secret","a":{"b":{"secret_key":[1]}},"c":3}"#;
        let fields = ["password", "secret"];
        let once = redact_json(input, &fields);
        let twice = redact_json(&once, &fields);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_invalid_json_unchanged() {
        for input in ["", "not json", r#"{"password": "#, "[1,2", "{\"a\":1}}"] {
            assert_eq!(redact_json(input, &["password"]), input);
        }
    }

    #[test]
    fn test_non_object_documents_unchanged() {
        for input in ["[1,2]", "\"password\"", "42", "null", r#" [{"password":"x"}] "#] {
            assert_eq!(redact_json(input, &["password"]), input);
        }
    }

    #[test]
    fn test_empty_field_names_ignored() {
        let input = r#"{"a":1}"#;
        assert_eq!(redact_json(input, &[""]), input);
    }

    #[test]
    fn test_redact_serialize() {
        #[derive(Serialize)]
        struct Login<'a> {
            user: &'a str,
            password: &'a str,
        }

        let output = redact_serialize(&Login { user: "bob", password: "pw" }, &["password"]);
        assert_eq!(output, r#"{"password":null,"user":"bob"}"#);
    }
}
