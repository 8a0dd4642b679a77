use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as JsonValue};
use std::fmt;

/// Keys of a `TokenData` document that hold arrays of array-format records
pub const ARRAY_KEYS: [&str; 10] = [
    "colors",
    "typography",
    "spacing",
    "size",
    "opacity",
    "borderRadius",
    "borderColor",
    "shadow",
    "breakpoint",
    "icon",
];

/// Key of the color variation map (`{family: {shade: hex}}`) in array format
pub const VARIATIONS_KEY: &str = "variations";

/// Type of a design token
///
/// The ten known types cover the W3C/array converters and the extended DTM
/// types. Anything else is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TokenType {
    Color,
    Typography,
    Spacing,
    Size,
    Opacity,
    BorderRadius,
    BorderColor,
    Shadow,
    Breakpoint,
    Icon,
    Other(String),
}

impl TokenType {
    /// Parse a `$type` string. `dimension` is an alias for `size` and an
    /// empty string becomes `other`.
    pub fn parse(name: &str) -> Self {
        match name {
            "color" => Self::Color,
            "typography" => Self::Typography,
            "spacing" => Self::Spacing,
            "size" | "dimension" => Self::Size,
            "opacity" => Self::Opacity,
            "borderRadius" => Self::BorderRadius,
            "borderColor" => Self::BorderColor,
            "shadow" => Self::Shadow,
            "breakpoint" => Self::Breakpoint,
            "icon" => Self::Icon,
            "" => Self::Other("other".to_string()),
            other => Self::Other(other.to_string()),
        }
    }

    /// Read a type marker from JSON; missing or non-string markers are `other`
    pub fn from_json(value: Option<&JsonValue>) -> Self {
        match value.and_then(|v| v.as_str()) {
            Some(name) => Self::parse(name),
            None => Self::Other("other".to_string()),
        }
    }

    /// Singular type for a document key (`colors` -> `color`)
    ///
    /// Known keys map through the table; unknown keys lose a trailing `s`.
    pub fn from_array_key(key: &str) -> Self {
        if key == "colors" {
            return Self::Color;
        }
        match Self::parse(key) {
            Self::Other(_) => Self::parse(key.strip_suffix('s').unwrap_or(key)),
            known => known,
        }
    }

    /// Document key of the array that owns tokens of this type
    pub fn array_key(&self) -> String {
        match self {
            Self::Color => "colors".to_string(),
            Self::Other(name) => format!("{}s", name),
            known => known.as_str().to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Color => "color",
            Self::Typography => "typography",
            Self::Spacing => "spacing",
            Self::Size => "size",
            Self::Opacity => "opacity",
            Self::BorderRadius => "borderRadius",
            Self::BorderColor => "borderColor",
            Self::Shadow => "shadow",
            Self::Breakpoint => "breakpoint",
            Self::Icon => "icon",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TokenType {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<&str> for TokenType {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl From<TokenType> for String {
    fn from(token_type: TokenType) -> Self {
        token_type.as_str().to_string()
    }
}

/// A typography sub-field that may be a bare number or a string with unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(Number),
    Text(String),
}

impl Scalar {
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Number(n) => Some(Self::Number(n.clone())),
            JsonValue::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Number(n) => JsonValue::Number(n.clone()),
            Self::Text(s) => JsonValue::String(s.clone()),
        }
    }
}

/// Structured typography value
///
/// Every sub-field is kept individually; unlisted sub-fields such as
/// `textAlign` land in `extra` so nothing is lost on the way through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_transform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Typography {
    /// Build from a JSON record without ever failing
    ///
    /// Fields whose JSON shape does not fit the typed slot are moved to
    /// `extra` untouched. `null` fields are dropped.
    pub fn from_map(map: &Map<String, JsonValue>) -> Self {
        let mut typography = Typography::default();

        for (key, value) in map {
            if value.is_null() {
                continue;
            }
            let placed = match key.as_str() {
                "fontFamily" => place_string(&mut typography.font_family, value),
                "fontSize" => place_scalar(&mut typography.font_size, value),
                "fontWeight" => place_scalar(&mut typography.font_weight, value),
                "lineHeight" => place_scalar(&mut typography.line_height, value),
                "letterSpacing" => place_scalar(&mut typography.letter_spacing, value),
                "textTransform" => place_string(&mut typography.text_transform, value),
                "textDecoration" => place_string(&mut typography.text_decoration, value),
                _ => false,
            };
            if !placed {
                typography.extra.insert(key.clone(), value.clone());
            }
        }

        typography
    }

    /// JSON record with the typed fields first, in their canonical order
    pub fn to_map(&self) -> Map<String, JsonValue> {
        let mut map = Map::new();

        if let Some(family) = &self.font_family {
            map.insert("fontFamily".to_string(), JsonValue::String(family.clone()));
        }
        for (key, value) in [
            ("fontSize", &self.font_size),
            ("fontWeight", &self.font_weight),
            ("lineHeight", &self.line_height),
            ("letterSpacing", &self.letter_spacing),
        ] {
            if let Some(value) = value {
                map.insert(key.to_string(), value.to_json());
            }
        }
        for (key, value) in [
            ("textTransform", &self.text_transform),
            ("textDecoration", &self.text_decoration),
        ] {
            if let Some(value) = value {
                map.insert(key.to_string(), JsonValue::String(value.clone()));
            }
        }
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }

        map
    }

    pub fn is_empty(&self) -> bool {
        self.font_family.is_none()
            && self.font_size.is_none()
            && self.font_weight.is_none()
            && self.line_height.is_none()
            && self.letter_spacing.is_none()
            && self.text_transform.is_none()
            && self.text_decoration.is_none()
            && self.extra.is_empty()
    }
}

fn place_string(slot: &mut Option<String>, value: &JsonValue) -> bool {
    match value.as_str() {
        Some(s) => {
            *slot = Some(s.to_string());
            true
        }
        None => false,
    }
}

fn place_scalar(slot: &mut Option<Scalar>, value: &JsonValue) -> bool {
    match Scalar::from_json(value) {
        Some(scalar) => {
            *slot = Some(scalar);
            true
        }
        None => false,
    }
}

/// Value payload of a flattened token
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TokenValue {
    Text(String),
    Number(Number),
    Typography(Typography),
    /// Any other JSON shape (records, arrays, booleans, null)
    Raw(JsonValue),
}

impl TokenValue {
    /// Untyped view of a raw JSON value; typography is built explicitly
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::String(s) => Self::Text(s.clone()),
            JsonValue::Number(n) => Self::Number(n.clone()),
            other => Self::Raw(other.clone()),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Text(s) => JsonValue::String(s.clone()),
            Self::Number(n) => JsonValue::Number(n.clone()),
            Self::Typography(t) => JsonValue::Object(t.to_map()),
            Self::Raw(v) => v.clone(),
        }
    }

    /// Text used when matching a search query against the value
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            other => other.to_json().to_string(),
        }
    }
}

/// Canonical flattened token used for editing, querying and rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlattenedToken {
    pub path: Vec<String>,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub value: TokenValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl FlattenedToken {
    /// Slash-joined path, the lookup key of the token
    pub fn key(&self) -> String {
        self.path.join("/")
    }
}

/// One record of an array-format document
///
/// Typography records carry their sub-fields at the top level next to
/// `name`; those are gathered into `typography`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayToken {
    pub name: String,
    pub value: Option<JsonValue>,
    pub role: Option<String>,
    pub description: Option<String>,
    pub typography: Typography,
}

impl ArrayToken {
    pub fn new(name: impl Into<String>, value: JsonValue) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            ..Default::default()
        }
    }

    /// Read a record; `None` when it is not an object with a string `name`
    pub fn from_value(value: &JsonValue) -> Option<Self> {
        let obj = value.as_object()?;
        let name = obj.get("name")?.as_str()?.to_string();

        let value = obj.get("value").cloned();
        let role = obj.get("role").and_then(|v| v.as_str()).map(str::to_string);
        let description = obj
            .get("description")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let rest: Map<String, JsonValue> = obj
            .iter()
            .filter(|(key, v)| match key.as_str() {
                "name" | "value" => false,
                "role" | "description" => !v.is_string(),
                _ => true,
            })
            .map(|(key, v)| (key.clone(), v.clone()))
            .collect();

        Some(Self {
            name,
            value,
            role,
            description,
            typography: Typography::from_map(&rest),
        })
    }

    pub fn to_value(&self) -> JsonValue {
        let mut map = Map::new();
        map.insert("name".to_string(), JsonValue::String(self.name.clone()));
        if let Some(value) = &self.value {
            map.insert("value".to_string(), value.clone());
        }
        if let Some(role) = &self.role {
            map.insert("role".to_string(), JsonValue::String(role.clone()));
        }
        if let Some(description) = &self.description {
            map.insert(
                "description".to_string(),
                JsonValue::String(description.clone()),
            );
        }
        for (key, value) in self.typography.to_map() {
            map.insert(key, value);
        }
        JsonValue::Object(map)
    }

    /// Typography carried by this record: its own sub-fields, or failing
    /// that a record stored under `value`
    pub fn typography_value(&self) -> Typography {
        if !self.typography.is_empty() {
            return self.typography.clone();
        }
        match &self.value {
            Some(JsonValue::Object(map)) => Typography::from_map(map),
            _ => Typography::default(),
        }
    }
}

/// Top-level token document
///
/// Either array format (plural type keys holding record arrays) or a nested
/// W3C tree under arbitrary keys. Key order is document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenData(Map<String, JsonValue>);

impl TokenData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty array-format document with the given keys present
    pub fn with_arrays(keys: &[&str]) -> Self {
        let mut data = Self::new();
        for key in keys {
            data.0.insert(key.to_string(), JsonValue::Array(Vec::new()));
        }
        data
    }

    pub fn from_map(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }

    /// `None` unless the value is a JSON object
    pub fn from_value(value: JsonValue) -> Option<Self> {
        match value {
            JsonValue::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.0
    }

    pub fn to_value(&self) -> JsonValue {
        JsonValue::Object(self.0.clone())
    }

    pub fn into_value(self) -> JsonValue {
        JsonValue::Object(self.0)
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: JsonValue) {
        self.0.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Parsed records of an array key; malformed entries are skipped
    pub fn records(&self, key: &str) -> Vec<ArrayToken> {
        match self.0.get(key) {
            Some(JsonValue::Array(items)) => items
                .iter()
                .filter_map(|item| {
                    let record = ArrayToken::from_value(item);
                    if record.is_none() {
                        log::warn!("Skipping malformed record in '{}': {}", key, item);
                    }
                    record
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Append a record, creating the array when the key is absent
    ///
    /// Does nothing if the key holds something other than an array.
    pub fn push_record(&mut self, key: &str, record: &ArrayToken) {
        let entry = self
            .0
            .entry(key.to_string())
            .or_insert_with(|| JsonValue::Array(Vec::new()));
        if let JsonValue::Array(items) = entry {
            items.push(record.to_value());
        }
    }
}
