//! Header redaction.

use std::collections::BTreeMap;

use axum::http::HeaderMap;

/// Replacement for the first value of a masked header.
pub const HEADER_MASK: &str = "***";

/// Loggable header map: canonical name to every value in arrival order.
pub type HeaderFields = BTreeMap<String, Vec<String>>;

/// Collect a request's headers under canonical `Title-Case` names.
///
/// Values that are not valid UTF-8 are decoded lossily.
pub fn header_fields(headers: &HeaderMap) -> HeaderFields {
    let mut fields = HeaderFields::new();
    for (name, value) in headers {
        fields
            .entry(canonical_name(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    fields
}

/// Mask the first value of every header whose name equals or contains one of
/// `fields`, ignoring ASCII case. Other values and headers are untouched.
pub fn redact_headers<S: AsRef<str>>(headers: &mut HeaderFields, fields: &[S]) {
    for field in fields {
        let field = field.as_ref().to_ascii_lowercase();
        if field.is_empty() {
            continue;
        }
        for (name, values) in headers.iter_mut() {
            if !name.to_ascii_lowercase().contains(&field) {
                continue;
            }
            if let Some(first) = values.first_mut() {
                *first = HEADER_MASK.to_string();
            }
        }
    }
}

fn canonical_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first
                    .to_ascii_uppercase()
                    .to_string()
                    + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_masks_first_value_only() {
        let mut headers = HeaderFields::new();
        headers.insert(
            "Authentication".into(),
            vec!["Bearer abc".into(), "Bearer def".into()],
        );
        headers.insert("Accept".into(), vec!["*/*".into()]);

        redact_headers(&mut headers, &["Authentication"]);

        assert_eq!(headers["Authentication"], vec!["***", "Bearer def"]);
        assert_eq!(headers["Accept"], vec!["*/*"]);
    }

    #[test]
    fn test_substring_and_case_insensitive_match() {
        let mut headers = HeaderFields::new();
        headers.insert("X-Authentication-Token".into(), vec!["t".into()]);
        headers.insert("Empty-Authentication".into(), vec![]);

        redact_headers(&mut headers, &["authentication"]);

        assert_eq!(headers["X-Authentication-Token"], vec!["***"]);
        assert!(headers["Empty-Authentication"].is_empty());
    }

    #[test]
    fn test_header_fields_canonicalizes() {
        let mut map = HeaderMap::new();
        map.insert("content-type", HeaderValue::from_static("application/json"));
        map.append("x-trace-id", HeaderValue::from_static("a"));
        map.append("x-trace-id", HeaderValue::from_static("b"));

        let fields = header_fields(&map);
        assert_eq!(fields["Content-Type"], vec!["application/json"]);
        assert_eq!(fields["X-Trace-Id"], vec!["a", "b"]);
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("authentication"), "Authentication");
        assert_eq!(canonical_name("user-agent"), "User-Agent");
        assert_eq!(canonical_name("x--y"), "X--Y");
    }
}
