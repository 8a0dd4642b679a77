use crate::config::ConvertOptions;
use crate::convert::tree::{flatten_token_set, PATH_SEPARATOR};
use crate::convert::units::{number, parse_px};
use crate::parser::detect::{TYPE_MARKER, VALUE_MARKER};
use crate::types::{ArrayToken, Scalar, TokenData, TokenType, Typography, VARIATIONS_KEY};
use log::{debug, warn};
use serde_json::{Map, Value as JsonValue};

/// Keys of the document produced by [`convert_to_array_format`], in order
const OUTPUT_KEYS: [&str; 7] = [
    "colors",
    VARIATIONS_KEY,
    "typography",
    "spacing",
    "size",
    "opacity",
    "borderRadius",
];

/// Convert a W3C token tree to an array-format document with default options
///
/// See [`convert_to_array_format_with`].
pub fn convert_to_array_format(tree: &Map<String, JsonValue>) -> TokenData {
    convert_to_array_format_with(tree, &ConvertOptions::default())
}

/// Convert a W3C token tree to an array-format document
///
/// The tree is flattened first (see [`flatten_token_set`]), then every token
/// is dispatched on its `$type`:
///
/// - color with a one-segment path: a `colors` record
/// - color with more segments: the first segment names a family in
///   `variations`, the remaining segments build nested shade records
/// - typography: the path is joined with
///   `options.typography_name_separator` (`-` by default, not `/`); the
///   `$value` fields are spread onto the record and a `fontSize` like
///   `"16px"` becomes the number 16; a non-record `$value` is kept as the
///   record's `value`
/// - spacing, size, opacity, borderRadius: `{name, value, role, description}`
///   with the slash-joined path as name
///
/// Other types have no slot in this document shape and are skipped.
///
/// The typography naming is not the inverse of
/// [`convert_to_standard_format`](crate::convert::convert_to_standard_format),
/// which keeps names verbatim, so multi-segment typography names do not
/// survive a round trip.
pub fn convert_to_array_format_with(
    tree: &Map<String, JsonValue>,
    options: &ConvertOptions,
) -> TokenData {
    let mut data = TokenData::with_arrays(&OUTPUT_KEYS);
    let mut variations = Map::new();

    for (path, node) in flatten_token_set(tree) {
        let token_type = TokenType::from_json(node.get(TYPE_MARKER));
        let value = node.get(VALUE_MARKER).cloned().unwrap_or(JsonValue::Null);
        let role = string_field(node, "$role");
        let description = string_field(node, "$description");
        let parts: Vec<&str> = path.split(PATH_SEPARATOR).collect();

        match token_type {
            TokenType::Color if parts.len() == 1 => {
                let record = ArrayToken {
                    name: path.clone(),
                    value: Some(value),
                    role,
                    description,
                    ..Default::default()
                };
                data.push_record(&TokenType::Color.array_key(), &record);
            }
            TokenType::Color => {
                if let JsonValue::String(hex) = value {
                    insert_variation(&mut variations, &parts, hex);
                } else {
                    debug!("Skipping non-string color variation: {}", path);
                }
            }
            TokenType::Typography => {
                let (mut typography, value) = match value {
                    JsonValue::Object(map) => (Typography::from_map(&map), None),
                    other => (Typography::default(), Some(other)),
                };
                if let Some(Scalar::Text(size)) = &typography.font_size {
                    if let Some(n) = parse_px(size).and_then(number) {
                        typography.font_size = Some(Scalar::Number(n));
                    }
                }
                let record = ArrayToken {
                    name: parts.join(options.typography_name_separator.as_str()),
                    value,
                    role,
                    description,
                    typography,
                };
                data.push_record(&TokenType::Typography.array_key(), &record);
            }
            TokenType::Spacing | TokenType::Size | TokenType::Opacity | TokenType::BorderRadius => {
                let record = ArrayToken {
                    name: path.clone(),
                    value: Some(value),
                    role,
                    description,
                    ..Default::default()
                };
                data.push_record(&token_type.array_key(), &record);
            }
            other => {
                debug!("No array-format slot for '{}' token: {}", other, path);
            }
        }
    }

    data.insert(VARIATIONS_KEY, JsonValue::Object(variations));
    data
}

fn string_field(node: &Map<String, JsonValue>, key: &str) -> Option<String> {
    node.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

/// Store `hex` under `variations[family][shade...]`, creating intermediate
/// records as needed
fn insert_variation(variations: &mut Map<String, JsonValue>, parts: &[&str], hex: String) {
    let (family, shades) = match parts.split_first() {
        Some((family, shades)) if !shades.is_empty() => (family, shades),
        _ => return,
    };
    let Some((leaf, intermediate)) = shades.split_last() else {
        return;
    };

    let mut level = variations
        .entry(family.to_string())
        .or_insert_with(|| JsonValue::Object(Map::new()));

    for part in intermediate {
        level = match level {
            JsonValue::Object(map) => map
                .entry(part.to_string())
                .or_insert_with(|| JsonValue::Object(Map::new())),
            _ => {
                warn!("Color variation path collides with a value: {}", parts.join(PATH_SEPARATOR));
                return;
            }
        };
    }

    match level {
        JsonValue::Object(map) => {
            map.insert(leaf.to_string(), JsonValue::String(hex));
        }
        _ => warn!("Color variation path collides with a value: {}", parts.join(PATH_SEPARATOR)),
    }
}
