pub mod edit;
pub mod flatten;
pub mod group;
pub mod validate;

// Re-export commonly used items
pub use edit::{create_token, delete_token, resolve_array_key, update_token, NewToken, TokenUpdate};
pub use flatten::flatten_tokens;
pub use group::{group_tokens_by_type, GroupedTokens, TokenFilter, DISPLAY_ORDER};
pub use validate::validate_token;
