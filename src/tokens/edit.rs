//! Token edits on array-format documents
//!
//! Every edit takes the current document by reference and returns a new one;
//! the input is never modified. The owning array of a token is found from its
//! type through [`TokenType::array_key`].

use crate::error::{Result, TokenError};
use crate::types::{ArrayToken, TokenData, TokenType, Typography};
use serde_json::Value as JsonValue;

/// Fields of a token to create
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewToken {
    pub name: String,
    pub value: JsonValue,
    pub role: Option<String>,
    pub description: Option<String>,
}

/// Field updates for an existing token; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenUpdate {
    pub value: Option<JsonValue>,
    pub role: Option<String>,
    pub description: Option<String>,
}

/// Document key owning tokens of a type or of an array key
///
/// Accepts both forms: `color` and `colors` resolve to `colors`, `spacing`
/// stays `spacing`, an unknown `gradient` or `gradients` becomes `gradients`.
pub fn resolve_array_key(type_or_key: &str) -> String {
    TokenType::from_array_key(type_or_key).array_key()
}

/// Append a new token to the array owning `type_or_key`
///
/// The array is created when absent. Empty role and description are not
/// stored. A typography token given a record value stores its sub-fields on
/// the record itself.
///
/// # Errors
///
/// `DuplicateToken` if the array already holds a token with that name,
/// `NotAnArray` if the key holds something other than an array.
pub fn create_token(data: &TokenData, type_or_key: &str, token: NewToken) -> Result<TokenData> {
    let key = resolve_array_key(type_or_key);
    let token_type = TokenType::from_array_key(&key);

    match data.get(&key) {
        Some(JsonValue::Array(_)) | None => {}
        Some(_) => return Err(TokenError::NotAnArray(key)),
    }
    if data.records(&key).iter().any(|r| r.name == token.name) {
        return Err(TokenError::DuplicateToken {
            key,
            name: token.name,
        });
    }

    let mut record = ArrayToken {
        name: token.name,
        role: token.role.filter(|r| !r.is_empty()),
        description: token.description.filter(|d| !d.is_empty()),
        ..Default::default()
    };
    set_value(&mut record, &token_type, token.value);

    let mut updated = data.clone();
    updated.push_record(&key, &record);
    Ok(updated)
}

/// Apply field updates to the token named `name` (slash-joined path)
///
/// # Errors
///
/// `TokenNotFound` if no array record of that type has that name. Tokens
/// that only exist in a nested W3C document or in `variations` cannot be
/// updated this way.
pub fn update_token(
    data: &TokenData,
    token_type: &TokenType,
    name: &str,
    update: TokenUpdate,
) -> Result<TokenData> {
    let key = token_type.array_key();
    let (mut items, index) = find_record(data, token_type, &key, name)?;

    let Some(mut record) = ArrayToken::from_value(&items[index]) else {
        return Err(not_found(token_type, name));
    };
    if let Some(value) = update.value {
        set_value(&mut record, token_type, value);
    }
    if let Some(role) = update.role {
        record.role = Some(role);
    }
    if let Some(description) = update.description {
        record.description = Some(description);
    }
    items[index] = record.to_value();

    let mut updated = data.clone();
    updated.insert(key, JsonValue::Array(items));
    Ok(updated)
}

/// Remove the token named `name` (slash-joined path) from its array
///
/// # Errors
///
/// `TokenNotFound` if no array record of that type has that name.
pub fn delete_token(data: &TokenData, token_type: &TokenType, name: &str) -> Result<TokenData> {
    let key = token_type.array_key();
    let (mut items, index) = find_record(data, token_type, &key, name)?;
    items.remove(index);

    let mut updated = data.clone();
    updated.insert(key, JsonValue::Array(items));
    Ok(updated)
}

/// Copy of the owning array and the position of the named record
fn find_record(
    data: &TokenData,
    token_type: &TokenType,
    key: &str,
    name: &str,
) -> Result<(Vec<JsonValue>, usize)> {
    let Some(JsonValue::Array(items)) = data.get(key) else {
        return Err(not_found(token_type, name));
    };
    let index = items
        .iter()
        .position(|item| item.get("name").and_then(|n| n.as_str()) == Some(name))
        .ok_or_else(|| not_found(token_type, name))?;
    Ok((items.clone(), index))
}

/// Store a new value; for typography it replaces the sub-fields as a whole
fn set_value(record: &mut ArrayToken, token_type: &TokenType, value: JsonValue) {
    match (token_type, value) {
        (TokenType::Typography, JsonValue::Object(fields)) => {
            record.typography = Typography::from_map(&fields);
            record.value = None;
        }
        (TokenType::Typography, value) => {
            record.typography = Typography::default();
            record.value = Some(value);
        }
        (_, value) => record.value = Some(value),
    }
}

fn not_found(token_type: &TokenType, name: &str) -> TokenError {
    TokenError::TokenNotFound {
        token_type: token_type.to_string(),
        path: name.to_string(),
    }
}
