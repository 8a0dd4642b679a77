use crate::types::{FlattenedToken, TokenType};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Display order of token groups; unlisted types follow in first-seen order
pub const DISPLAY_ORDER: [TokenType; 10] = [
    TokenType::Color,
    TokenType::BorderColor,
    TokenType::Shadow,
    TokenType::Typography,
    TokenType::Spacing,
    TokenType::Size,
    TokenType::Opacity,
    TokenType::BorderRadius,
    TokenType::Breakpoint,
    TokenType::Icon,
];

/// Tokens grouped by type, in display order
pub type GroupedTokens = IndexMap<TokenType, Vec<FlattenedToken>>;

/// Group flattened tokens by type
///
/// Groups are ordered by [`DISPLAY_ORDER`]; any other type is appended in
/// the order it was first seen. Tokens keep their relative order inside each
/// group.
///
/// # Examples
/// ```
/// use tokenshift::tokens::{flatten_tokens, group_tokens_by_type};
/// use tokenshift::types::{TokenData, TokenType};
/// use serde_json::json;
///
/// let data = TokenData::from_value(json!({
///     "opacity": [{"name": "half", "value": 0.5}],
///     "colors": [{"name": "primary", "value": "#2164D1"}]
/// })).unwrap();
/// let groups = group_tokens_by_type(&flatten_tokens(&data));
/// let order: Vec<&TokenType> = groups.keys().collect();
/// assert_eq!(order, vec![&TokenType::Color, &TokenType::Opacity]);
/// ```
pub fn group_tokens_by_type(tokens: &[FlattenedToken]) -> GroupedTokens {
    let mut seen: GroupedTokens = IndexMap::new();
    for token in tokens {
        seen.entry(token.token_type.clone())
            .or_default()
            .push(token.clone());
    }

    let mut grouped = IndexMap::with_capacity(seen.len());
    for token_type in &DISPLAY_ORDER {
        if let Some(group) = seen.shift_remove(token_type) {
            grouped.insert(token_type.clone(), group);
        }
    }
    grouped.extend(seen);
    grouped
}

/// Search text and type selection applied to grouped tokens
#[derive(Debug, Clone, Default)]
pub struct TokenFilter {
    /// Case-insensitive substring matched against path and value
    pub query: String,
    /// Types to keep; empty keeps every type
    pub types: HashSet<TokenType>,
}

impl TokenFilter {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            types: HashSet::new(),
        }
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = TokenType>) -> Self {
        self.types.extend(types);
        self
    }

    /// Check a single token against the search query
    pub fn matches(&self, token: &FlattenedToken) -> bool {
        if self.query.is_empty() {
            return true;
        }
        let query = self.query.to_lowercase();
        token.key().to_lowercase().contains(&query)
            || token.value.display().to_lowercase().contains(&query)
    }

    /// Filter grouped tokens
    ///
    /// The query narrows tokens inside every group (a group may end up
    /// empty); the type selection then drops whole groups.
    pub fn apply(&self, grouped: &GroupedTokens) -> GroupedTokens {
        grouped
            .iter()
            .filter(|(token_type, _)| self.types.is_empty() || self.types.contains(*token_type))
            .map(|(token_type, tokens)| {
                let kept = tokens.iter().filter(|t| self.matches(t)).cloned().collect();
                (token_type.clone(), kept)
            })
            .collect()
    }
}
