use crate::convert::standard::collect_shades;
use crate::convert::tree::{flatten_token_set, PATH_SEPARATOR};
use crate::convert::units::{number, parse_px};
use crate::parser::detect::{is_array_document, TYPE_MARKER, VALUE_MARKER};
use crate::types::{ArrayToken, FlattenedToken, Scalar, TokenData, TokenType, TokenValue, Typography, VARIATIONS_KEY};
use log::warn;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;

/// Flatten any token document into the canonical token list
///
/// The document shape is detected first (see
/// [`is_array_format`](crate::parser::is_array_format)):
///
/// - Array format: every key holding an array yields one token per record,
///   with the `name` split on `/` as path and the type derived from the key.
///   Typography records keep all their sub-fields as data; a record with
///   no sub-fields and a non-record `value` keeps that value. Entries of the
///   `variations` map follow as color tokens unless their path was already
///   produced by the `colors` array.
/// - Nested W3C tree: the whole tree is walked directly, so tokens under any
///   root (`figma`, `palette`, ...) are found. Typography `fontSize` values
///   like `"16px"` and string `fontWeight` values become numbers when they
///   parse cleanly and are kept as-is otherwise.
///
/// Tokens are returned in document order.
///
/// # Examples
/// ```
/// use tokenshift::tokens::flatten_tokens;
/// use tokenshift::types::TokenData;
/// use serde_json::json;
///
/// let data = TokenData::from_value(json!({
///     "colors": [{"name": "primary/main", "value": "#2164D1"}]
/// })).unwrap();
/// let tokens = flatten_tokens(&data);
/// assert_eq!(tokens[0].path, vec!["primary", "main"]);
/// ```
pub fn flatten_tokens(data: &TokenData) -> Vec<FlattenedToken> {
    if is_array_document(data.as_map()) {
        flatten_array_format(data)
    } else {
        flatten_nested_format(data.as_map())
    }
}

fn flatten_array_format(data: &TokenData) -> Vec<FlattenedToken> {
    let mut tokens = Vec::new();

    for (key, value) in data.as_map() {
        if !value.is_array() {
            continue;
        }
        let token_type = TokenType::from_array_key(key);

        for record in data.records(key) {
            let value = match token_type {
                TokenType::Typography => typography_record_value(&record),
                _ => TokenValue::from_json(record.value.as_ref().unwrap_or(&JsonValue::Null)),
            };
            tokens.push(FlattenedToken {
                path: split_path(&record.name),
                token_type: token_type.clone(),
                value,
                description: record.description,
                role: record.role,
            });
        }
    }

    if let Some(JsonValue::Object(variations)) = data.get(VARIATIONS_KEY) {
        let mut seen: HashSet<String> = tokens
            .iter()
            .filter(|t| t.token_type == TokenType::Color)
            .map(FlattenedToken::key)
            .collect();

        for (family, shades) in variations {
            let mut entries = Vec::new();
            collect_shades(shades, &mut Vec::new(), &mut entries);

            for (shade, hex) in entries {
                let key = format!("{}{}{}", family, PATH_SEPARATOR, shade);
                if !seen.insert(key.clone()) {
                    continue;
                }
                tokens.push(FlattenedToken {
                    path: split_path(&key),
                    token_type: TokenType::Color,
                    value: TokenValue::Text(hex),
                    description: None,
                    role: None,
                });
            }
        }
    }

    tokens
}

/// Structured typography when the record has sub-fields or a record `value`;
/// any other `value` (e.g. `"16px Inter"`) is passed through unchanged
fn typography_record_value(record: &ArrayToken) -> TokenValue {
    match &record.value {
        Some(value) if record.typography.is_empty() && !value.is_object() => {
            TokenValue::from_json(value)
        }
        _ => TokenValue::Typography(record.typography_value()),
    }
}

fn flatten_nested_format(tree: &Map<String, JsonValue>) -> Vec<FlattenedToken> {
    flatten_token_set(tree)
        .into_iter()
        .map(|(key, node)| {
            let token_type = TokenType::from_json(node.get(TYPE_MARKER));
            let raw = node.get(VALUE_MARKER).unwrap_or(&JsonValue::Null);

            let value = match (&token_type, raw) {
                (TokenType::Typography, JsonValue::Object(fields)) => {
                    TokenValue::Typography(normalize_typography(Typography::from_map(fields), &key))
                }
                _ => TokenValue::from_json(raw),
            };

            FlattenedToken {
                path: split_path(&key),
                token_type,
                value,
                description: string_field(node, "$description"),
                role: string_field(node, "$role"),
            }
        })
        .collect()
}

/// Make `fontSize` and `fontWeight` numeric where they parse cleanly
fn normalize_typography(mut typography: Typography, key: &str) -> Typography {
    if let Some(Scalar::Text(size)) = &typography.font_size {
        match parse_px(size).and_then(number) {
            Some(n) => typography.font_size = Some(Scalar::Number(n)),
            None => warn!("Keeping non-numeric fontSize '{}' of {}", size, key),
        }
    }
    if let Some(Scalar::Text(weight)) = &typography.font_weight {
        match weight.trim().parse::<f64>().ok().and_then(number) {
            Some(n) => typography.font_weight = Some(Scalar::Number(n)),
            None => warn!("Keeping non-numeric fontWeight '{}' of {}", weight, key),
        }
    }
    typography
}

fn split_path(name: &str) -> Vec<String> {
    name.split(PATH_SEPARATOR).map(str::to_string).collect()
}

fn string_field(node: &Map<String, JsonValue>, key: &str) -> Option<String> {
    node.get(key).and_then(|v| v.as_str()).map(str::to_string)
}
