//! # tokenshift
//!
//! A library for importing, editing and converting design tokens between
//! nested W3C token trees, the flat array format and DTM export bundles.
//!
//! ## Example
//!
//! ```no_run
//! use tokenshift::tokens::{flatten_tokens, group_tokens_by_type};
//!
//! let text = std::fs::read_to_string("tokens.json").unwrap();
//!
//! // Parse and validate the document
//! let data = tokenshift::parse_document(&text).unwrap();
//!
//! // Flatten into canonical tokens, whatever the input shape
//! let tokens = flatten_tokens(&data);
//!
//! // Group for display
//! for (token_type, group) in group_tokens_by_type(&tokens) {
//!     println!("{}: {} tokens", token_type, group.len());
//! }
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod parser;
pub mod store;
pub mod tokens;
pub mod types;

// Re-export commonly used items
pub use error::{Result, TokenError};
pub use types::{FlattenedToken, TokenData, TokenType, TokenValue};

use serde_json::Value as JsonValue;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Parse JSON text into a validated token document
///
/// # Errors
///
/// `Parse` with the parser message when the text is not JSON, `Validation`
/// when [`validate_token`](tokens::validate_token) rejects the document.
///
/// # Examples
/// ```
/// let data = tokenshift::parse_document(r##"{"colors": [{"name": "a", "value": "#fff"}]}"##).unwrap();
/// assert_eq!(data.records("colors").len(), 1);
///
/// let error = tokenshift::parse_document("{}").unwrap_err();
/// assert_eq!(error.to_string(), "Token data is empty");
/// ```
pub fn parse_document(text: &str) -> Result<TokenData> {
    let value: JsonValue = serde_json::from_str(text)?;
    if let Some(message) = tokens::validate_token(&value) {
        return Err(TokenError::Validation(message));
    }
    TokenData::from_value(value).ok_or_else(|| TokenError::Validation("Token data is empty".to_string()))
}

/// Import token files from disk
///
/// A single JSON file is parsed and validated as one document. A ZIP
/// archive or several files are read as a DTM bundle, which must contain a
/// `manifest.json`, and converted to array format.
///
/// # Errors
///
/// `EmptyBundle` for no paths, I/O and ZIP errors, plus the errors of
/// [`parse_document`] and [`validate_dtm_files`](parser::validate_dtm_files).
pub fn import_paths(paths: &[PathBuf]) -> Result<TokenData> {
    let files = match paths {
        [] => return Err(TokenError::EmptyBundle),
        [path] => {
            let bytes = fs::read(path)?;
            if !parser::is_zip_container(&bytes) {
                let text = String::from_utf8(bytes)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                return parse_document(&text);
            }
            parser::read_zip_bundle(&bytes)?
        }
        _ => parser::read_bundle_files(paths)?,
    };

    parser::validate_dtm_files(&files)?;
    log::debug!("Converting DTM bundle of {} files", files.len());
    Ok(parser::convert_dtm_to_array_format(&files))
}
