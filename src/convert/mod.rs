pub mod array;
pub mod standard;
pub mod tree;
pub mod units;

// Re-export commonly used items
pub use array::{convert_to_array_format, convert_to_array_format_with};
pub use standard::convert_to_standard_format;
pub use tree::{flatten_token_set, walk_token_nodes, PATH_SEPARATOR};
