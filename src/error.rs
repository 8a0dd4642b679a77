use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Error parsing JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("No files provided")]
    EmptyBundle,

    #[error("manifest.json not found. This does not appear to be a DTM format export.")]
    MissingManifest,

    #[error("Invalid manifest.json format")]
    InvalidManifest,

    #[error("Token '{path}' of type '{token_type}' not found")]
    TokenNotFound { token_type: String, path: String },

    #[error("Token '{name}' already exists in '{key}'")]
    DuplicateToken { key: String, name: String },

    #[error("Document key '{0}' does not hold an array of tokens")]
    NotAnArray(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("ZIP library error: {0}")]
    ZipLibraryError(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, TokenError>;
