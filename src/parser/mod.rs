pub mod bundle;
pub mod detect;

// Re-export commonly used items
pub use bundle::{
    convert_dtm_to_array_format, is_dtm_format, parse_manifest, read_bundle_files,
    read_zip_bundle, validate_dtm_files, DtmFiles, DtmManifest, MANIFEST_FILE,
};
pub use detect::{is_array_document, is_array_format, is_token_node, is_zip_container};
