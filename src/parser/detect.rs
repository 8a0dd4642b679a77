use crate::types::ARRAY_KEYS;
use serde_json::{Map, Value as JsonValue};

/// Type marker of a W3C token node
pub const TYPE_MARKER: &str = "$type";

/// Value marker of a W3C token node
pub const VALUE_MARKER: &str = "$value";

/// ZIP magic signature (first two bytes)
const ZIP_MAGIC: &[u8; 2] = b"PK";

/// Check if an object is a token leaf (has both `$type` and `$value`)
///
/// Every tree walker (flattener, validator, DTM converter) decides leaf vs
/// group with this predicate. Anything else is a group.
pub fn is_token_node(obj: &Map<String, JsonValue>) -> bool {
    obj.contains_key(TYPE_MARKER) && obj.contains_key(VALUE_MARKER)
}

/// Check if an object carries either token marker
fn has_token_marker(obj: &Map<String, JsonValue>) -> bool {
    obj.contains_key(TYPE_MARKER) || obj.contains_key(VALUE_MARKER)
}

/// Classify a document as array format (`true`) or nested W3C tree (`false`)
///
/// Checks, in order:
/// 1. Any known plural key holding an array: array format.
/// 2. Any top-level value carrying `$type` or `$value`: W3C.
/// 3. Any object at any depth (arrays are not entered) carrying a marker: W3C.
/// 4. Otherwise array format. An empty or ambiguous document lands here.
///
/// A document mixing array keys with deeply nested W3C nodes elsewhere is
/// array format because step 1 runs first. Non-object input is never array
/// format. This function never fails.
///
/// # Examples
/// ```
/// use tokenshift::parser::is_array_format;
/// use serde_json::json;
///
/// assert!(is_array_format(&json!({"colors": [{"name": "a", "value": "#fff"}]})));
/// assert!(!is_array_format(&json!({"a": {"$type": "color", "$value": "#fff"}})));
/// assert!(is_array_format(&json!({})));
/// ```
pub fn is_array_format(doc: &JsonValue) -> bool {
    doc.as_object().is_some_and(is_array_document)
}

/// [`is_array_format`] for a document already known to be an object
pub fn is_array_document(obj: &Map<String, JsonValue>) -> bool {
    if ARRAY_KEYS
        .iter()
        .any(|key| matches!(obj.get(*key), Some(JsonValue::Array(_))))
    {
        return true;
    }

    let top_level_token = obj
        .values()
        .any(|value| value.as_object().is_some_and(has_token_marker));
    if top_level_token {
        return false;
    }

    !contains_token_marker(obj)
}

/// Recursively look for a token marker in any nested object
fn contains_token_marker(obj: &Map<String, JsonValue>) -> bool {
    if has_token_marker(obj) {
        return true;
    }
    obj.values().any(|value| match value {
        JsonValue::Object(child) => contains_token_marker(child),
        _ => false,
    })
}

/// Check if the bytes are a ZIP container
///
/// DTM bundles are often shipped as a ZIP of JSON files. This checks for the
/// ZIP magic signature "PK" (0x50 0x4B).
///
/// # Examples
/// ```
/// use tokenshift::parser::is_zip_container;
///
/// assert!(is_zip_container(b"PK\x03\x04..."));
/// assert!(!is_zip_container(b"{\"colors\": []}"));
/// ```
pub fn is_zip_container(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && &bytes[0..2] == ZIP_MAGIC
}
