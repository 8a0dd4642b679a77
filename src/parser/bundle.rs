use crate::convert::tree::walk_token_nodes;
use crate::error::{Result, TokenError};
use crate::parser::detect::{TYPE_MARKER, VALUE_MARKER};
use crate::types::{ArrayToken, TokenData, TokenType, Typography, ARRAY_KEYS};
use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// File name of the DTM bundle manifest
pub const MANIFEST_FILE: &str = "manifest.json";

/// Contents of a DTM bundle: file name to parsed JSON, in read order
pub type DtmFiles = Map<String, JsonValue>;

/// Metadata carried by `manifest.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DtmManifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Check if a bundle entry is the manifest (at any directory depth)
fn is_manifest(file_name: &str) -> bool {
    file_name.rsplit('/').next() == Some(MANIFEST_FILE)
}

fn find_manifest(files: &DtmFiles) -> Option<&JsonValue> {
    files
        .iter()
        .find(|(name, _)| is_manifest(name))
        .map(|(_, content)| content)
}

/// Check if the files form a DTM bundle (a `manifest.json` is present)
pub fn is_dtm_format(files: &DtmFiles) -> bool {
    find_manifest(files).is_some()
}

/// Read the manifest; `None` unless it is a JSON object
pub fn parse_manifest(manifest: &JsonValue) -> Option<DtmManifest> {
    let obj = manifest.as_object()?;
    let mut parsed = DtmManifest::default();

    for (key, value) in obj {
        match (key.as_str(), value) {
            ("version", JsonValue::String(s)) => parsed.version = Some(s.clone()),
            ("version", JsonValue::Number(n)) => parsed.version = Some(n.to_string()),
            ("name", JsonValue::String(s)) => parsed.name = Some(s.clone()),
            ("description", JsonValue::String(s)) => parsed.description = Some(s.clone()),
            ("files", JsonValue::Array(items)) => {
                parsed.files = Some(
                    items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect(),
                );
            }
            _ => {
                parsed.extra.insert(key.clone(), value.clone());
            }
        }
    }

    Some(parsed)
}

/// Validate the structure of a DTM bundle
///
/// A bundle must contain at least one file and a `manifest.json` object.
/// Input failing this check is not a DTM export; callers should fall back to
/// plain W3C/array detection instead.
pub fn validate_dtm_files(files: &DtmFiles) -> Result<()> {
    if files.is_empty() {
        return Err(TokenError::EmptyBundle);
    }

    let manifest = find_manifest(files).ok_or(TokenError::MissingManifest)?;
    if parse_manifest(manifest).is_none() {
        return Err(TokenError::InvalidManifest);
    }

    Ok(())
}

/// Convert the token files of a DTM bundle to an array-format document
///
/// `manifest.json` is skipped. Every other file is walked like a W3C tree
/// and each token is bucketed by `$type` into one of the ten array keys
/// (`dimension` goes to `size`, `borderColor` has its own bucket). Unknown
/// types are logged and skipped.
///
/// Every token node is visited, so a leaf keyed `"a/b"` and a nested `a.b`
/// both land in their own type's array. Names stay unique within each
/// array: a later token with an already used name is logged and skipped.
///
/// Typography keeps each sub-field of `$value` as given, without unit
/// coercion, so nothing is lost.
///
/// # Examples
/// ```
/// use tokenshift::parser::convert_dtm_to_array_format;
/// use serde_json::json;
///
/// let files = json!({
///     "manifest.json": {"name": "Tokens"},
///     "color.tokens.json": {"brand": {"$type": "color", "$value": "#2164D1"}}
/// });
/// let data = convert_dtm_to_array_format(files.as_object().unwrap());
/// assert_eq!(data.records("colors").len(), 1);
/// ```
pub fn convert_dtm_to_array_format(files: &DtmFiles) -> TokenData {
    let mut data = TokenData::with_arrays(&ARRAY_KEYS);
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for (file_name, content) in files {
        if is_manifest(file_name) {
            continue;
        }
        let JsonValue::Object(tree) = content else {
            debug!("Skipping non-object file in bundle: {}", file_name);
            continue;
        };

        for (name, node) in walk_token_nodes(tree) {
            let token_type = TokenType::from_json(node.get(TYPE_MARKER));
            let value = node.get(VALUE_MARKER).cloned().unwrap_or(JsonValue::Null);

            let mut record = ArrayToken {
                name: name.clone(),
                role: string_field(node, "$role"),
                description: string_field(node, "$description"),
                ..Default::default()
            };

            match &token_type {
                TokenType::Typography => match value {
                    JsonValue::Object(fields) => {
                        let (inner_value, rest): (Vec<_>, Vec<_>) =
                            fields.into_iter().partition(|(key, _)| key == "value");
                        record.value = inner_value.into_iter().next().map(|(_, v)| v);
                        let rest: Map<String, JsonValue> = rest.into_iter().collect();
                        record.typography = Typography::from_map(&rest);
                    }
                    other => record.value = Some(other),
                },
                TokenType::Other(unknown) => {
                    warn!("Unknown token type: {} for token: {} ({})", unknown, name, file_name);
                    continue;
                }
                _ => record.value = Some(value),
            }

            let key = token_type.array_key();
            if !seen.insert((key.clone(), name.clone())) {
                warn!("Duplicate {} token: {} ({}), keeping the first", token_type, name, file_name);
                continue;
            }
            data.push_record(&key, &record);
        }
    }

    data
}

fn string_field(node: &Map<String, JsonValue>, key: &str) -> Option<String> {
    node.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

/// Read every JSON file of a ZIP archive into a bundle
///
/// Directories and non-`.json` entries are ignored. Entries that fail to
/// parse are logged and skipped. Keys are the entry paths inside the archive.
///
/// # Examples
/// ```no_run
/// use tokenshift::parser::read_zip_bundle;
///
/// let bytes = std::fs::read("tokens.zip").unwrap();
/// let files = read_zip_bundle(&bytes).unwrap();
/// ```
pub fn read_zip_bundle(bytes: &[u8]) -> Result<DtmFiles> {
    let cursor = Cursor::new(bytes);
    let mut archive = ZipArchive::new(cursor)?;
    let mut files = DtmFiles::new();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let name = file.name().to_string();

        if file.is_dir() || !name.ends_with(".json") {
            continue;
        }

        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        match serde_json::from_str(&contents) {
            Ok(json) => {
                files.insert(name, json);
            }
            Err(e) => warn!("Error parsing {}: {}", name, e),
        }
    }

    Ok(files)
}

/// Read a set of uploaded files into a bundle
///
/// `.json` files are parsed (failures logged and skipped) and keyed by file
/// name; `.zip` files are expanded with [`read_zip_bundle`]; anything else is
/// ignored. All reads finish before the bundle is returned.
pub fn read_bundle_files(paths: &[PathBuf]) -> Result<DtmFiles> {
    let mut files = DtmFiles::new();

    for path in paths {
        match extension(path).as_deref() {
            Some("json") => {
                let contents = fs::read_to_string(path)?;
                match serde_json::from_str(&contents) {
                    Ok(json) => {
                        files.insert(file_name(path), json);
                    }
                    Err(e) => warn!("Error parsing {}: {}", path.display(), e),
                }
            }
            Some("zip") => {
                let bytes = fs::read(path)?;
                files.extend(read_zip_bundle(&bytes)?);
            }
            _ => debug!("Ignoring non-JSON file: {}", path.display()),
        }
    }

    Ok(files)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use zip::write::FileOptions;

    fn bundle(value: JsonValue) -> DtmFiles {
        value.as_object().unwrap().clone()
    }

    fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer.add_directory("tokens/", FileOptions::default()).unwrap();
        for (name, contents) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_manifest_is_excluded() {
        let files = bundle(json!({
            "manifest.json": {
                "name": "Export",
                "fake": {"$type": "color", "$value": "#000"}
            },
            "a.json": {"x": {"$type": "color", "$value": "#fff"}}
        }));

        let data = convert_dtm_to_array_format(&files);
        let colors = data.records("colors");

        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].name, "x");
        assert_eq!(colors[0].value, Some(json!("#fff")));
    }

    #[test]
    fn test_output_has_all_buckets() {
        let data = convert_dtm_to_array_format(&bundle(json!({"manifest.json": {}})));
        let keys: Vec<&String> = data.as_map().keys().collect();
        assert_eq!(keys, ARRAY_KEYS.to_vec());
    }

    #[test]
    fn test_extended_types_are_bucketed() {
        let files = bundle(json!({
            "manifest.json": {},
            "tokens.json": {
                "border": {"default": {"$type": "borderColor", "$value": "#cccccc"}},
                "elevation": {"card": {"$type": "shadow", "$value": "0 1px 2px rgba(0,0,0,0.2)"}},
                "screen": {"md": {"$type": "breakpoint", "$value": "768px"}},
                "icon": {"sm": {"$type": "icon", "$value": 16}},
                "width": {"$type": "dimension", "$value": "320px"}
            }
        }));

        let data = convert_dtm_to_array_format(&files);

        assert_eq!(data.records("borderColor")[0].name, "border/default");
        assert!(data.records("colors").is_empty());
        assert_eq!(data.records("shadow")[0].value, Some(json!("0 1px 2px rgba(0,0,0,0.2)")));
        assert_eq!(data.records("breakpoint")[0].value, Some(json!("768px")));
        assert_eq!(data.records("icon")[0].value, Some(json!(16)));
        assert_eq!(data.records("size")[0].name, "width");
    }

    #[test]
    fn test_unknown_type_is_skipped() {
        let files = bundle(json!({
            "manifest.json": {},
            "tokens.json": {
                "weird": {"$type": "gradient", "$value": "linear-gradient(red, blue)"},
                "gap": {"$type": "spacing", "$value": "8px"}
            }
        }));

        let data = convert_dtm_to_array_format(&files);

        assert_eq!(data.records("spacing").len(), 1);
        assert!(data.get("gradients").is_none());
    }

    #[test]
    fn test_typography_is_lossless() {
        let files = bundle(json!({
            "manifest.json": {},
            "text.styles.tokens.json": {
                "heading": {
                    "h1": {
                        "$type": "typography",
                        "$description": "Top heading",
                        "$value": {
                            "fontFamily": "Inter",
                            "fontSize": "48px",
                            "fontWeight": 700,
                            "lineHeight": "120%",
                            "letterSpacing": "-1%",
                            "textTransform": "none",
                            "textDecoration": "none"
                        }
                    }
                }
            }
        }));

        let data = convert_dtm_to_array_format(&files);
        let record = data.get("typography").unwrap()[0].clone();

        assert_eq!(record["name"], json!("heading/h1"));
        assert_eq!(record["fontSize"], json!("48px"));
        assert_eq!(record["fontWeight"], json!(700));
        assert_eq!(record["lineHeight"], json!("120%"));
        assert_eq!(record["letterSpacing"], json!("-1%"));
        assert_eq!(record["textTransform"], json!("none"));
        assert_eq!(record["textDecoration"], json!("none"));
        assert_eq!(record["description"], json!("Top heading"));
        assert!(record.get("value").is_none());
    }

    #[test]
    fn test_typography_string_value_kept_as_value() {
        let files = bundle(json!({
            "manifest.json": {},
            "t.json": {"body": {"$type": "typography", "$value": "16px Inter"}}
        }));

        let data = convert_dtm_to_array_format(&files);
        assert_eq!(data.records("typography")[0].value, Some(json!("16px Inter")));
    }

    #[test]
    fn test_colliding_paths_keep_both_types() {
        let files = bundle(json!({
            "manifest.json": {},
            "tokens.json": {
                "a/b": {"$type": "color", "$value": "#111111"},
                "a": {"b": {"$type": "spacing", "$value": "4px"}}
            }
        }));

        let data = convert_dtm_to_array_format(&files);

        assert_eq!(data.records("colors")[0].name, "a/b");
        assert_eq!(data.records("colors")[0].value, Some(json!("#111111")));
        assert_eq!(data.records("spacing")[0].name, "a/b");
        assert_eq!(data.records("spacing")[0].value, Some(json!("4px")));
    }

    #[test]
    fn test_duplicate_name_in_one_type_keeps_first() {
        let files = bundle(json!({
            "manifest.json": {},
            "a.json": {"brand": {"$type": "color", "$value": "#111111"}},
            "b.json": {"brand": {"$type": "color", "$value": "#222222"}}
        }));

        let data = convert_dtm_to_array_format(&files);
        let colors = data.records("colors");

        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].value, Some(json!("#111111")));
    }

    #[test]
    fn test_tokens_from_several_files() {
        let files = bundle(json!({
            "manifest.json": {},
            "color.tokens.json": {"brand": {"$type": "color", "$value": "#2164D1", "$role": "primary"}},
            "spacing.tokens.json": {"space": {"sm": {"$type": "spacing", "$value": "4px"}}}
        }));

        let data = convert_dtm_to_array_format(&files);

        assert_eq!(data.records("colors")[0].role.as_deref(), Some("primary"));
        assert_eq!(data.records("spacing")[0].name, "space/sm");
    }

    #[test]
    fn test_validate_empty_bundle() {
        let result = validate_dtm_files(&DtmFiles::new());
        assert!(matches!(result, Err(TokenError::EmptyBundle)));
    }

    #[test]
    fn test_validate_missing_manifest() {
        let files = bundle(json!({"a.json": {}}));
        assert!(!is_dtm_format(&files));
        assert!(matches!(validate_dtm_files(&files), Err(TokenError::MissingManifest)));
    }

    #[test]
    fn test_validate_invalid_manifest() {
        let files = bundle(json!({"manifest.json": "not an object"}));
        assert!(matches!(validate_dtm_files(&files), Err(TokenError::InvalidManifest)));
    }

    #[test]
    fn test_validate_nested_manifest() {
        let files = bundle(json!({"export/manifest.json": {"version": "1.0"}}));
        assert!(is_dtm_format(&files));
        assert!(validate_dtm_files(&files).is_ok());
    }

    #[test]
    fn test_parse_manifest() {
        let manifest = parse_manifest(&json!({
            "version": 2,
            "name": "Design System",
            "files": ["color.tokens.json", 3],
            "plugin": "dtm"
        }))
        .unwrap();

        assert_eq!(manifest.version.as_deref(), Some("2"));
        assert_eq!(manifest.name.as_deref(), Some("Design System"));
        assert_eq!(manifest.files, Some(vec!["color.tokens.json".to_string()]));
        assert_eq!(manifest.extra.get("plugin"), Some(&json!("dtm")));
        assert!(parse_manifest(&json!([1])).is_none());
    }

    #[test]
    fn test_read_zip_bundle() {
        let bytes = zip_bytes(&[
            ("tokens/manifest.json", r#"{"name": "Export"}"#),
            ("tokens/color.tokens.json", r##"{"brand": {"$type": "color", "$value": "#fff"}}"##),
            ("tokens/broken.json", "{not json"),
            ("tokens/readme.txt", "hello"),
        ]);

        let files = read_zip_bundle(&bytes).unwrap();
        let names: Vec<&String> = files.keys().collect();

        assert_eq!(names, vec!["tokens/manifest.json", "tokens/color.tokens.json"]);
        assert!(validate_dtm_files(&files).is_ok());
    }

    #[test]
    fn test_read_zip_bundle_rejects_garbage() {
        let result = read_zip_bundle(b"PK not really a zip");
        assert!(matches!(result, Err(TokenError::ZipLibraryError(_))));
    }

    #[test]
    fn test_read_bundle_files() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("manifest.json");
        let colors = dir.path().join("color.tokens.json");
        let notes = dir.path().join("notes.md");
        let archive = dir.path().join("more.zip");

        fs::write(&manifest, r#"{"name": "Export"}"#).unwrap();
        fs::write(&colors, r##"{"brand": {"$type": "color", "$value": "#fff"}}"##).unwrap();
        fs::write(&notes, "# notes").unwrap();
        fs::write(
            &archive,
            zip_bytes(&[("spacing.json", r#"{"sm": {"$type": "spacing", "$value": "4px"}}"#)]),
        )
        .unwrap();

        let files = read_bundle_files(&[manifest, colors, notes, archive]).unwrap();
        let names: Vec<&String> = files.keys().collect();
        assert_eq!(names, vec!["manifest.json", "color.tokens.json", "spacing.json"]);

        let data = convert_dtm_to_array_format(&files);
        assert_eq!(data.records("colors").len(), 1);
        assert_eq!(data.records("spacing").len(), 1);
    }
}
