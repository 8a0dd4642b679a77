use crate::config::ConvertOptions;
use crate::export::figma::convert_to_figma_format;
use crate::types::TokenData;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Source of the generated plugin; `@NAME@` markers are replaced with JSON
const PLUGIN_TEMPLATE: &str = r#"// Figma Plugin Code - Auto-generated from Design Tokens

figma.showUI(__html__, { width: 800, height: 600, themeColors: true });

function createFloatCollection(title, values) {
  const collection = figma.variables.createVariableCollection(title);
  const modeId = collection.modes[0].modeId;

  Object.entries(values).forEach(([name, value]) => {
    const variable = figma.variables.createVariable(name, collection, 'FLOAT');
    variable.setValueForMode(modeId, value);
  });
}

async function createVariableCollections() {
  const colorCollection = figma.variables.createVariableCollection('Design Tokens - Colors');
  const colorMode = colorCollection.modes[0].modeId;

  Object.entries(@COLORS@).forEach(([name, value]) => {
    const rgb = hexToRgb(value);
    if (!rgb) return;
    const variable = figma.variables.createVariable(name, colorCollection, 'COLOR');
    variable.setValueForMode(colorMode, rgb);
  });

  createFloatCollection('Design Tokens - Spacing', @SPACING@);
  createFloatCollection('Design Tokens - Sizes', @SIZE@);
  createFloatCollection('Design Tokens - Opacity', @OPACITY@);
  createFloatCollection('Design Tokens - Border Radius', @BORDER_RADIUS@);
}

async function createTextStyles() {
  const styles = @TYPOGRAPHY@;

  for (const [name, style] of Object.entries(styles)) {
    const textStyle = figma.createTextStyle();
    textStyle.name = name;
    textStyle.fontSize = style.fontSize;
    textStyle.lineHeight = typeof style.lineHeight === 'number'
      ? { value: style.lineHeight * 100, unit: 'PERCENT' }
      : { unit: 'AUTO' };
    textStyle.letterSpacing = { value: style.letterSpacing, unit: 'PIXELS' };
  }
}

async function createEffectStyles() {
  const effects = @EFFECTS@;

  for (const [name, effect] of Object.entries(effects)) {
    const rgb = hexToRgb(effect.color);
    if (!rgb) continue;
    const effectStyle = figma.createEffectStyle();
    effectStyle.name = name;
    effectStyle.effects = [{
      type: effect.type === 'innerShadow' ? 'INNER_SHADOW' : 'DROP_SHADOW',
      color: { ...rgb, a: 1 },
      offset: { x: effect.offsetX, y: effect.offsetY },
      radius: effect.radius,
      spread: effect.spread,
      visible: effect.visible,
      blendMode: 'NORMAL',
    }];
  }
}

function hexToRgb(hex) {
  const result = /^#?([a-f\d]{2})([a-f\d]{2})([a-f\d]{2})$/i.exec(hex);
  return result
    ? {
        r: parseInt(result[1], 16) / 255,
        g: parseInt(result[2], 16) / 255,
        b: parseInt(result[3], 16) / 255,
      }
    : null;
}

async function createTokens() {
  await createVariableCollections();
  await createTextStyles();
  await createEffectStyles();
}

figma.ui.onmessage = async (msg) => {
  if (msg.type === 'create-tokens') {
    await createTokens();
    figma.notify('Design tokens created successfully!');
  }
};

createTokens();
"#;

/// Generate the source of a Figma plugin that creates the document's tokens
///
/// Colors, spacing, sizes, opacity and border radii become variable
/// collections; typography and shadows become text and effect styles. The
/// token data is embedded as pretty-printed JSON literals.
///
/// # Examples
/// ```
/// use tokenshift::config::ConvertOptions;
/// use tokenshift::export::generate_figma_plugin_code;
/// use tokenshift::types::TokenData;
/// use serde_json::json;
///
/// let data = TokenData::from_value(json!({
///     "colors": [{"name": "primary", "value": "#2164D1"}]
/// })).unwrap();
/// let code = generate_figma_plugin_code(&data, &ConvertOptions::default());
/// assert!(code.contains("\"primary\": \"#2164D1\""));
/// ```
pub fn generate_figma_plugin_code(data: &TokenData, options: &ConvertOptions) -> String {
    let figma = convert_to_figma_format(data, options);

    [
        ("@COLORS@", literal(&figma.colors.variables)),
        ("@SPACING@", literal(&figma.spacing)),
        ("@SIZE@", literal(&figma.size)),
        ("@OPACITY@", literal(&figma.opacity)),
        ("@BORDER_RADIUS@", literal(&figma.border_radius)),
        ("@TYPOGRAPHY@", literal(&figma.typography)),
        ("@EFFECTS@", literal(&figma.effects)),
    ]
    .into_iter()
    .fold(PLUGIN_TEMPLATE.to_string(), |code, (marker, json)| {
        code.replace(marker, &json)
    })
}

/// Pretty-printed JSON literal, indented to sit inside a function body
fn literal<T: Serialize>(value: &T) -> String {
    let json = serde_json::to_value(value).unwrap_or(JsonValue::Null);
    format!("{:#}", json).replace('\n', "\n  ")
}
