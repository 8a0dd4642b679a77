use crate::config::ConvertOptions;
use crate::convert::standard::collect_shades;
use crate::convert::tree::PATH_SEPARATOR;
use crate::convert::units::{loose_number, number, parse_leading_number, parse_px};
use crate::types::{ArrayToken, Scalar, TokenData, TokenType, VARIATIONS_KEY};
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use serde_json::{json, Number, Value as JsonValue};
use std::fmt;
use std::str::FromStr;

/// Color tokens, both as variables and as paint styles
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColorBuckets {
    pub variables: IndexMap<String, String>,
    pub styles: IndexMap<String, String>,
}

/// Text style as consumed by the Figma plugin
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyStyle {
    pub font_family: String,
    pub font_size: Number,
    pub font_weight: Number,
    pub line_height: Scalar,
    pub letter_spacing: Number,
    pub text_align: String,
    pub text_decoration: String,
    pub text_transform: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectKind {
    DropShadow,
    InnerShadow,
}

/// Shadow effect style parsed from a CSS `box-shadow` value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectStyle {
    #[serde(rename = "type")]
    pub kind: EffectKind,
    pub color: String,
    pub offset_x: Number,
    pub offset_y: Number,
    pub radius: Number,
    pub spread: Number,
    pub visible: bool,
}

/// Array-format tokens projected onto Figma variables and styles
///
/// Colors, spacing, size, opacity and border radius become variables;
/// colors, typography and shadows become styles. Layout grids have no token
/// source and are always empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FigmaTokenData {
    pub colors: ColorBuckets,
    pub typography: IndexMap<String, TypographyStyle>,
    pub spacing: IndexMap<String, Number>,
    pub size: IndexMap<String, Number>,
    pub opacity: IndexMap<String, Number>,
    pub border_radius: IndexMap<String, Number>,
    pub effects: IndexMap<String, EffectStyle>,
    pub grids: IndexMap<String, JsonValue>,
}

/// Shape of the JSON produced by [`generate_figma_json`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FigmaExportFormat {
    /// Variable collections only
    Variables,
    /// Styles only
    Styles,
    /// Variables and styles side by side
    #[default]
    Hybrid,
}

impl FromStr for FigmaExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "figma-variables" | "variables" => Ok(Self::Variables),
            "figma-styles" | "styles" => Ok(Self::Styles),
            "figma-hybrid" | "hybrid" => Ok(Self::Hybrid),
            other => Err(format!("Unknown Figma export format: {}", other)),
        }
    }
}

impl fmt::Display for FigmaExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Variables => "figma-variables",
            Self::Styles => "figma-styles",
            Self::Hybrid => "figma-hybrid",
        };
        f.write_str(name)
    }
}

/// Project an array-format document onto Figma variables and styles
///
/// - colors: the value of every `colors` record and every `variations` shade
///   (`family/shade`, skipped when a color record has that name)
/// - typography: one text style per record, missing or unparsable fields
///   replaced by defaults (Inter, 16, 400, line height 1.5, letter spacing
///   0, left aligned, no decoration, no transform)
/// - spacing, size, borderRadius: the leading number of the value
///   (`"16px"` -> 16); values without one are dropped
/// - opacity: normalized to [0, 1] according to `options.opacity_scale`
///   (percentages by default)
/// - shadow: drop or inner shadow effects; `none` and unparsable values are
///   dropped
pub fn convert_to_figma_format(data: &TokenData, options: &ConvertOptions) -> FigmaTokenData {
    let mut figma = FigmaTokenData::default();

    for record in data.records(&TokenType::Color.array_key()) {
        match &record.value {
            Some(JsonValue::String(hex)) => {
                figma.colors.variables.insert(record.name.clone(), hex.clone());
                figma.colors.styles.insert(record.name.clone(), hex.clone());
            }
            _ => debug!("Skipping non-string color: {}", record.name),
        }
    }

    if let Some(JsonValue::Object(variations)) = data.get(VARIATIONS_KEY) {
        for (family, shades) in variations {
            let mut entries = Vec::new();
            collect_shades(shades, &mut Vec::new(), &mut entries);
            for (shade, hex) in entries {
                let name = format!("{}{}{}", family, PATH_SEPARATOR, shade);
                if figma.colors.variables.contains_key(&name) {
                    continue;
                }
                figma.colors.variables.insert(name.clone(), hex.clone());
                figma.colors.styles.insert(name, hex);
            }
        }
    }

    for record in data.records(&TokenType::Typography.array_key()) {
        figma
            .typography
            .insert(record.name.clone(), typography_style(&record));
    }

    for (token_type, bucket) in [
        (TokenType::Spacing, &mut figma.spacing),
        (TokenType::Size, &mut figma.size),
        (TokenType::BorderRadius, &mut figma.border_radius),
    ] {
        for record in data.records(&token_type.array_key()) {
            match record.value.as_ref().and_then(loose_number).and_then(number) {
                Some(n) => {
                    bucket.insert(record.name, n);
                }
                None => debug!("Skipping non-numeric {} token: {}", token_type, record.name),
            }
        }
    }

    for record in data.records(&TokenType::Opacity.array_key()) {
        let normalized = record
            .value
            .as_ref()
            .and_then(loose_number)
            .map(|n| options.opacity_scale.normalize(n))
            .and_then(number);
        match normalized {
            Some(n) => {
                figma.opacity.insert(record.name, n);
            }
            None => debug!("Skipping non-numeric opacity token: {}", record.name),
        }
    }

    for record in data.records(&TokenType::Shadow.array_key()) {
        match record.value.as_ref().and_then(|v| v.as_str()).and_then(parse_box_shadow) {
            Some(effect) => {
                figma.effects.insert(record.name, effect);
            }
            None => debug!("Skipping shadow without a single parsable layer: {}", record.name),
        }
    }

    figma
}

fn typography_style(record: &ArrayToken) -> TypographyStyle {
    let typography = record.typography_value();
    let text_align = typography.extra.get("textAlign").and_then(|v| v.as_str());

    TypographyStyle {
        font_family: string_or(typography.font_family.as_deref(), "Inter"),
        font_size: scalar_number(typography.font_size.as_ref(), 16),
        font_weight: scalar_number(typography.font_weight.as_ref(), 400),
        line_height: typography
            .line_height
            .clone()
            .filter(|l| !matches!(l, Scalar::Text(s) if s.is_empty()))
            .unwrap_or_else(|| Scalar::Number(json_f64(1.5))),
        letter_spacing: scalar_number(typography.letter_spacing.as_ref(), 0),
        text_align: string_or(text_align, "left"),
        text_decoration: string_or(typography.text_decoration.as_deref(), "none"),
        text_transform: string_or(typography.text_transform.as_deref(), "none"),
    }
}

fn string_or(value: Option<&str>, default: &str) -> String {
    value.filter(|s| !s.is_empty()).unwrap_or(default).to_string()
}

/// Number of a typography field; `px` strings are accepted
fn scalar_number(value: Option<&Scalar>, default: i64) -> Number {
    let parsed = match value {
        Some(Scalar::Number(n)) => Some(n.clone()),
        Some(Scalar::Text(s)) => parse_px(s).and_then(number),
        None => None,
    };
    parsed.unwrap_or_else(|| Number::from(default))
}

fn json_f64(value: f64) -> Number {
    Number::from_f64(value).unwrap_or_else(|| Number::from(0))
}

/// Parse a single-layer CSS `box-shadow`
///
/// Accepts `[inset] <x> <y> [<blur> [<spread>]] <color>` with the color in
/// any position. Multiple layers (top-level commas) and `none` are rejected.
pub fn parse_box_shadow(value: &str) -> Option<EffectStyle> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return None;
    }

    let parts = split_outside_parens(value)?;
    let mut kind = EffectKind::DropShadow;
    let mut lengths = Vec::new();
    let mut color = None;

    for part in parts {
        if part.eq_ignore_ascii_case("inset") {
            kind = EffectKind::InnerShadow;
        } else if is_length(&part) {
            lengths.push(parse_leading_number(&part)?);
        } else if color.is_none() {
            color = Some(part);
        } else {
            return None;
        }
    }

    if !(2..=4).contains(&lengths.len()) {
        return None;
    }

    Some(EffectStyle {
        kind,
        color: color.unwrap_or_else(|| "#000000".to_string()),
        offset_x: number(lengths[0])?,
        offset_y: number(lengths[1])?,
        radius: number(lengths.get(2).copied().unwrap_or(0.0))?,
        spread: number(lengths.get(3).copied().unwrap_or(0.0))?,
        visible: true,
    })
}

fn is_length(part: &str) -> bool {
    part.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+' || c == '.')
}

/// Whitespace-separated parts, keeping `rgba(0, 0, 0, 0.2)` whole;
/// `None` on a top-level comma
fn split_outside_parens(value: &str) -> Option<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in value.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => return None,
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }

    Some(parts)
}

/// Build the Figma JSON export of a document
///
/// # Examples
/// ```
/// use tokenshift::config::ConvertOptions;
/// use tokenshift::export::{generate_figma_json, FigmaExportFormat};
/// use tokenshift::types::TokenData;
/// use serde_json::json;
///
/// let data = TokenData::from_value(json!({
///     "spacing": [{"name": "sm", "value": "4px"}]
/// })).unwrap();
/// let output = generate_figma_json(&data, FigmaExportFormat::Variables, &ConvertOptions::default());
/// assert_eq!(output["spacing"]["sm"], json!(4));
/// ```
pub fn generate_figma_json(
    data: &TokenData,
    format: FigmaExportFormat,
    options: &ConvertOptions,
) -> JsonValue {
    let figma = convert_to_figma_format(data, options);

    let variables = json!({
        "colors": figma.colors.variables,
        "spacing": figma.spacing,
        "size": figma.size,
        "opacity": figma.opacity,
        "borderRadius": figma.border_radius,
    });
    let styles = json!({
        "colors": figma.colors.styles,
        "typography": figma.typography,
        "effects": figma.effects,
        "grids": figma.grids,
    });

    match format {
        FigmaExportFormat::Variables => variables,
        FigmaExportFormat::Styles => styles,
        FigmaExportFormat::Hybrid => json!({
            "variables": variables,
            "styles": styles,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpacityScale;

    fn project(value: JsonValue) -> FigmaTokenData {
        let data = TokenData::from_value(value).unwrap();
        convert_to_figma_format(&data, &ConvertOptions::default())
    }

    #[test]
    fn test_opacity_percent_is_normalized() {
        let figma = project(json!({"opacity": [{"name": "half", "value": 50}]}));
        assert_eq!(figma.opacity["half"].as_f64(), Some(0.5));
    }

    #[test]
    fn test_opacity_default_reads_percent() {
        let figma = project(json!({
            "opacity": [
                {"name": "faint", "value": 1},
                {"name": "full", "value": "100%"},
                {"name": "over", "value": 250}
            ]
        }));

        assert_eq!(figma.opacity["faint"].as_f64(), Some(0.01));
        assert_eq!(figma.opacity["full"].as_f64(), Some(1.0));
        assert_eq!(figma.opacity["over"].as_f64(), Some(1.0));
    }

    #[test]
    fn test_opacity_fraction_is_kept() {
        let data = TokenData::from_value(json!({
            "opacity": [
                {"name": "subtle", "value": 0.4},
                {"name": "full", "value": "100%"},
                {"name": "broken", "value": "none"}
            ]
        }))
        .unwrap();
        let options = ConvertOptions {
            opacity_scale: OpacityScale::Fraction,
            ..Default::default()
        };
        let figma = convert_to_figma_format(&data, &options);

        assert_eq!(figma.opacity["subtle"].as_f64(), Some(0.4));
        assert_eq!(figma.opacity["full"].as_f64(), Some(1.0));
        assert!(!figma.opacity.contains_key("broken"));
    }

    #[test]
    fn test_opacity_auto_scale_option() {
        let data = TokenData::from_value(json!({
            "opacity": [{"name": "subtle", "value": 0.4}, {"name": "half", "value": 50}]
        }))
        .unwrap();
        let options = ConvertOptions {
            opacity_scale: OpacityScale::Auto,
            ..Default::default()
        };

        let figma = convert_to_figma_format(&data, &options);
        assert_eq!(figma.opacity["subtle"].as_f64(), Some(0.4));
        assert_eq!(figma.opacity["half"].as_f64(), Some(0.5));
    }

    #[test]
    fn test_colors_and_variations() {
        let figma = project(json!({
            "colors": [{"name": "blue/main", "value": "#0000ff"}],
            "variations": {"blue": {"main": "#111111", "light": "#8888ff"}}
        }));

        assert_eq!(figma.colors.variables["blue/main"], "#0000ff");
        assert_eq!(figma.colors.variables["blue/light"], "#8888ff");
        assert_eq!(figma.colors.styles, figma.colors.variables);
    }

    #[test]
    fn test_dimensions_parse_leading_number() {
        let figma = project(json!({
            "spacing": [{"name": "sm", "value": "4px"}, {"name": "auto", "value": "auto"}],
            "size": [{"name": "icon", "value": 24}],
            "borderRadius": [{"name": "md", "value": "0.5rem"}]
        }));

        assert_eq!(figma.spacing["sm"], Number::from(4));
        assert!(!figma.spacing.contains_key("auto"));
        assert_eq!(figma.size["icon"], Number::from(24));
        assert_eq!(figma.border_radius["md"].as_f64(), Some(0.5));
    }

    #[test]
    fn test_typography_defaults() {
        let figma = project(json!({
            "typography": [
                {"name": "body", "fontFamily": "Roboto", "fontSize": "14px", "fontWeight": 500, "textAlign": "center"},
                {"name": "bare"}
            ]
        }));

        let body = &figma.typography["body"];
        assert_eq!(body.font_family, "Roboto");
        assert_eq!(body.font_size, Number::from(14));
        assert_eq!(body.font_weight, Number::from(500));
        assert_eq!(body.text_align, "center");

        let bare = &figma.typography["bare"];
        assert_eq!(bare.font_family, "Inter");
        assert_eq!(bare.font_size, Number::from(16));
        assert_eq!(bare.font_weight, Number::from(400));
        assert_eq!(bare.line_height, Scalar::Number(Number::from_f64(1.5).unwrap()));
        assert_eq!(bare.letter_spacing, Number::from(0));
        assert_eq!(bare.text_decoration, "none");
        assert_eq!(bare.text_transform, "none");
    }

    #[test]
    fn test_typography_value_record() {
        let figma = project(json!({
            "typography": [{"name": "caption", "value": {"fontFamily": "Inter", "fontSize": 12}}]
        }));

        assert_eq!(figma.typography["caption"].font_size, Number::from(12));
    }

    #[test]
    fn test_parse_box_shadow() {
        let effect = parse_box_shadow("0 1px 2px rgba(0, 0, 0, 0.2)").unwrap();
        assert_eq!(effect.kind, EffectKind::DropShadow);
        assert_eq!(effect.color, "rgba(0, 0, 0, 0.2)");
        assert_eq!(effect.offset_y, Number::from(1));
        assert_eq!(effect.radius, Number::from(2));
        assert_eq!(effect.spread, Number::from(0));

        let inset = parse_box_shadow("inset 0 0 0 1px #cccccc").unwrap();
        assert_eq!(inset.kind, EffectKind::InnerShadow);
        assert_eq!(inset.spread, Number::from(1));

        assert!(parse_box_shadow("none").is_none());
        assert!(parse_box_shadow("0 1px #000, 0 2px #111").is_none());
        assert!(parse_box_shadow("#000").is_none());
    }

    #[test]
    fn test_shadow_tokens_become_effects() {
        let figma = project(json!({
            "shadow": [
                {"name": "card", "value": "0 4px 8px #00000033"},
                {"name": "flat", "value": "none"}
            ]
        }));

        assert_eq!(figma.effects.len(), 1);
        assert_eq!(figma.effects["card"].color, "#00000033");
    }

    #[test]
    fn test_generate_figma_json_formats() {
        let data = TokenData::from_value(json!({
            "colors": [{"name": "primary", "value": "#2164D1"}],
            "typography": [{"name": "body", "fontFamily": "Inter", "fontSize": 16, "fontWeight": 400}]
        }))
        .unwrap();
        let options = ConvertOptions::default();

        let variables = generate_figma_json(&data, FigmaExportFormat::Variables, &options);
        let keys: Vec<&String> = variables.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["colors", "spacing", "size", "opacity", "borderRadius"]);

        let styles = generate_figma_json(&data, FigmaExportFormat::Styles, &options);
        assert_eq!(styles["typography"]["body"]["fontFamily"], json!("Inter"));
        assert_eq!(styles["grids"], json!({}));

        let hybrid = generate_figma_json(&data, FigmaExportFormat::Hybrid, &options);
        assert_eq!(hybrid["variables"]["colors"]["primary"], json!("#2164D1"));
        assert_eq!(hybrid["styles"]["colors"]["primary"], json!("#2164D1"));
    }

    #[test]
    fn test_export_format_from_str() {
        assert_eq!(
            "figma-styles".parse::<FigmaExportFormat>(),
            Ok(FigmaExportFormat::Styles)
        );
        assert_eq!("hybrid".parse::<FigmaExportFormat>(), Ok(FigmaExportFormat::Hybrid));
        assert!("figma".parse::<FigmaExportFormat>().is_err());
        assert_eq!(FigmaExportFormat::Variables.to_string(), "figma-variables");
    }
}
