use serde_json::{Number, Value as JsonValue};

/// Parse a pure number with an optional `px` suffix ("16px", "16", "1.5px")
///
/// Anything else ("1.5rem", "normal", "16 px") is `None`.
pub fn parse_px(text: &str) -> Option<f64> {
    let text = text.trim();
    let number = text.strip_suffix("px").unwrap_or(text);
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse the longest numeric prefix of a string, ignoring leading whitespace
///
/// "16px" -> 16, "1.5rem" -> 1.5, "-2" -> -2, "px" -> None.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > digits_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let fraction_start = end + 1;
        let mut fraction_end = fraction_start;
        while fraction_end < bytes.len() && bytes[fraction_end].is_ascii_digit() {
            fraction_end += 1;
        }
        if fraction_end > fraction_start || has_digits {
            has_digits = has_digits || fraction_end > fraction_start;
            end = fraction_end;
        }
    }
    if !has_digits {
        return None;
    }

    // Exponent only counts when followed by at least one digit
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    text[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Numeric view of a JSON value: numbers as-is, strings by leading number
pub fn loose_number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => parse_leading_number(s),
        _ => None,
    }
}

/// `Number` for an `f64`, integral values stored as integers
pub fn number(value: f64) -> Option<Number> {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}
