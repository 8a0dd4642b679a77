use crate::parser::detect::{is_token_node, TYPE_MARKER, VALUE_MARKER};
use serde_json::{Map, Value as JsonValue};

/// `$type` values accepted by [`validate_token`]
pub const VALID_TYPES: [&str; 7] = [
    "color",
    "typography",
    "spacing",
    "size",
    "opacity",
    "borderRadius",
    "dimension",
];

/// Fields every typography `$value` must carry
pub const REQUIRED_TYPOGRAPHY_FIELDS: [&str; 3] = ["fontFamily", "fontSize", "fontWeight"];

/// Check a raw document for minimal structural correctness
///
/// Every token node found by recursing through objects (arrays are opaque)
/// must have a known `$type`, and typography tokens must carry
/// `fontFamily`, `fontSize` and `fontWeight`. The first problem found is
/// returned as a message naming the dot-joined path; `None` means valid.
///
/// # Examples
/// ```
/// use tokenshift::tokens::validate_token;
/// use serde_json::json;
///
/// let error = validate_token(&json!({"a": {"$type": "bogus", "$value": "x"}}));
/// assert_eq!(error.as_deref(), Some("Invalid token type: bogus at a"));
/// assert!(validate_token(&json!({"colors": []})).is_none());
/// ```
pub fn validate_token(doc: &JsonValue) -> Option<String> {
    match doc {
        JsonValue::Object(obj) if !obj.is_empty() => validate_node(obj, &mut Vec::new()),
        _ => Some("Token data is empty".to_string()),
    }
}

fn validate_node(obj: &Map<String, JsonValue>, path: &mut Vec<String>) -> Option<String> {
    if is_token_node(obj) {
        return check_token(obj, &path.join("."));
    }

    for (key, value) in obj {
        let JsonValue::Object(child) = value else {
            continue;
        };
        path.push(key.clone());
        let error = validate_node(child, path);
        path.pop();
        if error.is_some() {
            return error;
        }
    }

    None
}

fn check_token(token: &Map<String, JsonValue>, path: &str) -> Option<String> {
    let token_type = match token.get(TYPE_MARKER) {
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    if !VALID_TYPES.contains(&token_type.as_str()) {
        return Some(format!("Invalid token type: {} at {}", token_type, path));
    }

    if token_type == "typography" {
        let value = token.get(VALUE_MARKER).and_then(|v| v.as_object());
        for field in REQUIRED_TYPOGRAPHY_FIELDS {
            if !value.is_some_and(|v| v.contains_key(field)) {
                return Some(format!(
                    "Missing required field '{}' in typography token at {}",
                    field, path
                ));
            }
        }
    }

    None
}
