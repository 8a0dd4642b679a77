use crate::parser::detect::is_token_node;
use indexmap::IndexMap;
use log::warn;
use serde_json::{Map, Value as JsonValue};

/// Separator used to join path segments into a flat key
pub const PATH_SEPARATOR: &str = "/";

/// Flatten a nested token tree into a map from slash-joined path to token node
///
/// Walks the tree in key order. An object that is a token node (see
/// [`is_token_node`]) is recorded under its path; any other object is a group
/// and is recursed into. Arrays and primitives are neither tokens nor groups
/// and produce no entries. When two subtrees yield the same joined path the
/// later node wins but keeps the position of the first, and a warning is
/// logged. Use [`walk_token_nodes`] to see every node.
///
/// # Arguments
/// * `tree` - Root object of the token tree
///
/// # Returns
/// Ordered map of joined path to borrowed token node
///
/// # Examples
/// ```
/// use tokenshift::convert::flatten_token_set;
/// use serde_json::json;
///
/// let tree = json!({
///     "primary": {
///         "main": {"$type": "color", "$value": "#2164D1"}
///     }
/// });
/// let flat = flatten_token_set(tree.as_object().unwrap());
/// assert!(flat.contains_key("primary/main"));
/// ```
pub fn flatten_token_set(tree: &Map<String, JsonValue>) -> IndexMap<String, &Map<String, JsonValue>> {
    let mut result: IndexMap<String, &Map<String, JsonValue>> = IndexMap::new();
    for (key, node) in walk_token_nodes(tree) {
        if let Some(replaced) = result.insert(key.clone(), node) {
            warn!(
                "Token '{}' is defined twice; keeping the later node (dropped $type: {})",
                key,
                replaced.get("$type").unwrap_or(&JsonValue::Null)
            );
        }
    }
    result
}

/// Every token node of a tree with its slash-joined path, in document order
///
/// Unlike [`flatten_token_set`] nothing is merged: a leaf keyed `"a/b"` and a
/// nested `a.b` both appear, under the same path.
pub fn walk_token_nodes(tree: &Map<String, JsonValue>) -> Vec<(String, &Map<String, JsonValue>)> {
    let mut result = Vec::new();
    let mut path = Vec::new();
    walk_recursive(tree, &mut path, &mut result);
    result
}

fn walk_recursive<'a>(
    group: &'a Map<String, JsonValue>,
    path: &mut Vec<String>,
    result: &mut Vec<(String, &'a Map<String, JsonValue>)>,
) {
    for (key, value) in group {
        let JsonValue::Object(obj) = value else {
            continue;
        };

        path.push(key.clone());
        if is_token_node(obj) {
            result.push((path.join(PATH_SEPARATOR), obj));
        } else {
            walk_recursive(obj, path, result);
        }
        path.pop();
    }
}
