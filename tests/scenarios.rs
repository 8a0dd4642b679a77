//! End-to-end scenarios through the public API

use serde_json::{json, Value as JsonValue};
use std::io::Write;
use tokenshift::config::ConvertOptions;
use tokenshift::convert::{convert_to_array_format, convert_to_standard_format};
use tokenshift::export::{generate_figma_json, FigmaExportFormat};
use tokenshift::parser::{convert_dtm_to_array_format, is_array_format, read_zip_bundle};
use tokenshift::store::{MemoryStorage, TokenStore};
use tokenshift::tokens::{
    create_token, delete_token, flatten_tokens, group_tokens_by_type, update_token,
    validate_token, NewToken, TokenUpdate,
};
use tokenshift::types::Scalar;
use tokenshift::{FlattenedToken, TokenData, TokenType, TokenValue};

fn data(value: JsonValue) -> TokenData {
    TokenData::from_value(value).unwrap()
}

fn path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_nested_document_flattens_to_canonical_tokens() {
    let tokens = flatten_tokens(&data(json!({
        "primary": {"main": {"$type": "color", "$value": "#2164D1", "$description": "brand"}}
    })));

    assert_eq!(
        tokens,
        vec![FlattenedToken {
            path: path(&["primary", "main"]),
            token_type: TokenType::Color,
            value: TokenValue::Text("#2164D1".to_string()),
            description: Some("brand".to_string()),
            role: None,
        }]
    );
}

#[test]
fn test_array_document_flattens_to_canonical_tokens() {
    let tokens = flatten_tokens(&data(json!({
        "colors": [{"name": "primary/main", "value": "#2164D1", "role": "brand"}]
    })));

    assert_eq!(
        tokens,
        vec![FlattenedToken {
            path: path(&["primary", "main"]),
            token_type: TokenType::Color,
            value: TokenValue::Text("#2164D1".to_string()),
            description: None,
            role: Some("brand".to_string()),
        }]
    );
}

#[test]
fn test_detector_fallback_on_empty_document() {
    assert!(is_array_format(&json!({})));
}

#[test]
fn test_validator_messages() {
    let unknown = validate_token(&json!({"a": {"$type": "bogus", "$value": "x"}})).unwrap();
    assert!(unknown.contains("bogus"));

    let typography = validate_token(&json!({
        "a": {"$type": "typography", "$value": {"fontFamily": "Inter"}}
    }))
    .unwrap();
    assert!(typography.contains("fontSize") || typography.contains("fontWeight"));
}

#[test]
fn test_grouping_order() {
    let tokens = flatten_tokens(&data(json!({
        "opacity": [{"name": "half", "value": 0.5}],
        "colors": [{"name": "primary", "value": "#2164D1"}],
        "typography": [{"name": "body", "fontFamily": "Inter", "fontSize": 16, "fontWeight": 400}]
    })));

    let grouped = group_tokens_by_type(&tokens);
    let order: Vec<&TokenType> = grouped.keys().collect();

    assert_eq!(
        order,
        vec![&TokenType::Color, &TokenType::Typography, &TokenType::Opacity]
    );
}

#[test]
fn test_dtm_manifest_exclusion() {
    let files = json!({
        "manifest.json": {"name": "Export", "x": {"$type": "color", "$value": "#000"}},
        "a.json": {"x": {"$type": "color", "$value": "#fff"}}
    });

    let converted = convert_dtm_to_array_format(files.as_object().unwrap());
    let tokens = flatten_tokens(&converted);

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].value, TokenValue::Text("#fff".to_string()));
}

#[test]
fn test_dtm_typography_text_value_survives_flattening() {
    let files = json!({
        "manifest.json": {"name": "Export"},
        "text.json": {"body": {"$type": "typography", "$value": "16px Inter"}}
    });

    let converted = convert_dtm_to_array_format(files.as_object().unwrap());
    let tokens = flatten_tokens(&converted);

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].token_type, TokenType::Typography);
    assert_eq!(tokens[0].value, TokenValue::Text("16px Inter".to_string()));

    let tree = convert_to_standard_format(&converted);
    assert_eq!(tree["body"]["$value"], json!("16px Inter"));
}

#[test]
fn test_dtm_same_path_in_two_types() {
    let files = json!({
        "manifest.json": {},
        "tokens.json": {
            "a/b": {"$type": "color", "$value": "#111111"},
            "a": {"b": {"$type": "spacing", "$value": "4px"}}
        }
    });

    let tokens = flatten_tokens(&convert_dtm_to_array_format(files.as_object().unwrap()));
    let types: Vec<(String, TokenType)> = tokens.iter().map(|t| (t.key(), t.token_type.clone())).collect();

    assert_eq!(
        types,
        vec![
            ("a/b".to_string(), TokenType::Color),
            ("a/b".to_string(), TokenType::Spacing)
        ]
    );
}

#[test]
fn test_opacity_projects_to_fraction() {
    let output = generate_figma_json(
        &data(json!({"opacity": [{"name": "half", "value": 50}]})),
        FigmaExportFormat::Variables,
        &ConvertOptions::default(),
    );

    assert_eq!(output["opacity"]["half"], json!(0.5));
}

#[test]
fn test_round_trip_single_segment_records() {
    let original = data(json!({
        "colors": [{"name": "primary", "value": "#2164D1", "role": "brand", "description": "Brand blue"}],
        "borderRadius": [{"name": "pill", "value": "9999px", "role": "button"}]
    }));

    let round_trip = convert_to_array_format(&convert_to_standard_format(&original));

    assert_eq!(round_trip.get("colors"), original.get("colors"));
    assert_eq!(round_trip.get("borderRadius"), original.get("borderRadius"));
}

#[test]
fn test_zip_bundle_to_figma_styles() {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::default();
    writer.start_file("export/manifest.json", options).unwrap();
    writer.write_all(br#"{"version": "1.0.0", "name": "Design System"}"#).unwrap();
    writer.start_file("export/text.styles.tokens.json", options).unwrap();
    writer
        .write_all(
            br#"{"heading": {"h1": {"$type": "typography", "$value": {
                "fontFamily": "Inter", "fontSize": "48px", "fontWeight": 700, "lineHeight": "120%"
            }}}}"#,
        )
        .unwrap();
    let bytes = writer.finish().unwrap().into_inner();

    let files = read_zip_bundle(&bytes).unwrap();
    let converted = convert_dtm_to_array_format(&files);

    let tokens = flatten_tokens(&converted);
    let TokenValue::Typography(typography) = &tokens[0].value else {
        panic!("expected a typography value");
    };
    assert_eq!(tokens[0].key(), "heading/h1");
    assert_eq!(typography.font_size, Some(Scalar::Text("48px".to_string())));
    assert_eq!(typography.line_height, Some(Scalar::Text("120%".to_string())));

    let styles = generate_figma_json(&converted, FigmaExportFormat::Styles, &ConvertOptions::default());
    assert_eq!(styles["typography"]["heading/h1"]["fontSize"], json!(48));
    assert_eq!(styles["typography"]["heading/h1"]["lineHeight"], json!("120%"));
}

#[test]
fn test_edit_then_persist() {
    let original = data(json!({"colors": [{"name": "primary", "value": "#000"}]}));

    let created = create_token(
        &original,
        "color",
        NewToken {
            name: "accent".to_string(),
            value: json!("#ff8800"),
            role: Some("highlight".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    let updated = update_token(
        &created,
        &TokenType::Color,
        "primary",
        TokenUpdate {
            value: Some(json!("#2164D1")),
            ..Default::default()
        },
    )
    .unwrap();
    let edited = delete_token(&updated, &TokenType::Color, "accent").unwrap();

    let mut store = TokenStore::new(MemoryStorage::new(), 1024);
    store.save(&edited).unwrap();
    let loaded = store.load().unwrap();

    let tokens = flatten_tokens(&loaded);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].value, TokenValue::Text("#2164D1".to_string()));
    assert_eq!(original.records("colors")[0].value, Some(json!("#000")));
}
