use crate::convert::tree::PATH_SEPARATOR;
use crate::parser::detect::{TYPE_MARKER, VALUE_MARKER};
use crate::types::{ArrayToken, Scalar, TokenData, TokenType, VARIATIONS_KEY};
use serde_json::{Map, Value as JsonValue};

/// Core types whose `$value` is copied verbatim
const SCALAR_TYPES: [TokenType; 4] = [
    TokenType::Spacing,
    TokenType::Size,
    TokenType::Opacity,
    TokenType::BorderRadius,
];

/// Convert an array-format document to a W3C token tree
///
/// Each record becomes one token keyed by its `name` verbatim; slashes in the
/// name are not re-split, so the output is a single level deep. Output order
/// is colors, variations, typography, then spacing, size, opacity and
/// borderRadius, each in array order.
///
/// - color: `$value` is the record value
/// - typography: `$value` is the typography record; a bare numeric
///   `fontSize` gets a `px` suffix. A record without sub-fields keeps a
///   non-record `value` (e.g. `"16px Inter"`) verbatim
/// - spacing, size, opacity, borderRadius: `$value` verbatim
/// - `role` and `description` become `$role` and `$description`
///
/// Entries of the `variations` map become `family/shade` color tokens unless
/// a `colors` record already produced that key.
///
/// # Examples
/// ```
/// use tokenshift::convert::convert_to_standard_format;
/// use tokenshift::types::TokenData;
/// use serde_json::json;
///
/// let data = TokenData::from_value(json!({
///     "colors": [{"name": "primary", "value": "#2164D1", "role": "brand"}]
/// })).unwrap();
/// let tree = convert_to_standard_format(&data);
/// assert_eq!(tree["primary"]["$role"], json!("brand"));
/// ```
pub fn convert_to_standard_format(data: &TokenData) -> Map<String, JsonValue> {
    let mut standard = Map::new();

    for record in data.records(&TokenType::Color.array_key()) {
        let value = record.value.clone().unwrap_or(JsonValue::Null);
        standard.insert(record.name.clone(), design_token(&TokenType::Color, value, &record));
    }

    if let Some(JsonValue::Object(variations)) = data.get(VARIATIONS_KEY) {
        for (family, shades) in variations {
            let mut entries = Vec::new();
            collect_shades(shades, &mut Vec::new(), &mut entries);

            for (shade, value) in entries {
                let key = format!("{}{}{}", family, PATH_SEPARATOR, shade);
                if standard.contains_key(&key) {
                    continue;
                }
                let mut token = Map::new();
                token.insert(TYPE_MARKER.to_string(), JsonValue::String("color".to_string()));
                token.insert(VALUE_MARKER.to_string(), JsonValue::String(value));
                token.insert(
                    "$description".to_string(),
                    JsonValue::String(format!("{} {}", family, shade)),
                );
                standard.insert(key, JsonValue::Object(token));
            }
        }
    }

    for record in data.records(&TokenType::Typography.array_key()) {
        let value = match &record.value {
            Some(value) if record.typography.is_empty() && !value.is_object() => value.clone(),
            _ => {
                let mut typography = record.typography_value();
                if let Some(Scalar::Number(size)) = &typography.font_size {
                    typography.font_size = Some(Scalar::Text(format!("{}px", size)));
                }
                JsonValue::Object(typography.to_map())
            }
        };
        standard.insert(
            record.name.clone(),
            design_token(&TokenType::Typography, value, &record),
        );
    }

    for token_type in &SCALAR_TYPES {
        for record in data.records(&token_type.array_key()) {
            let value = record.value.clone().unwrap_or(JsonValue::Null);
            standard.insert(record.name.clone(), design_token(token_type, value, &record));
        }
    }

    standard
}

/// Build a W3C token node carrying the record's role and description
fn design_token(token_type: &TokenType, value: JsonValue, record: &ArrayToken) -> JsonValue {
    let mut token = Map::new();
    token.insert(
        TYPE_MARKER.to_string(),
        JsonValue::String(token_type.as_str().to_string()),
    );
    token.insert(VALUE_MARKER.to_string(), value);

    if let Some(role) = record.role.as_ref().filter(|r| !r.is_empty()) {
        token.insert("$role".to_string(), JsonValue::String(role.clone()));
    }
    if let Some(description) = record.description.as_ref().filter(|d| !d.is_empty()) {
        token.insert(
            "$description".to_string(),
            JsonValue::String(description.clone()),
        );
    }

    JsonValue::Object(token)
}

/// Collect string leaves of a (possibly nested) shade record
pub(crate) fn collect_shades(value: &JsonValue, path: &mut Vec<String>, out: &mut Vec<(String, String)>) {
    match value {
        JsonValue::String(hex) if !path.is_empty() && !hex.is_empty() => {
            out.push((path.join(PATH_SEPARATOR), hex.clone()));
        }
        JsonValue::Object(shades) => {
            for (shade, child) in shades {
                path.push(shade.clone());
                collect_shades(child, path, out);
                path.pop();
            }
        }
        _ => {}
    }
}
