pub mod figma;
pub mod plugin;

// Re-export commonly used items
pub use figma::{
    convert_to_figma_format, generate_figma_json, parse_box_shadow, EffectStyle,
    FigmaExportFormat, FigmaTokenData, TypographyStyle,
};
pub use plugin::generate_figma_plugin_code;
