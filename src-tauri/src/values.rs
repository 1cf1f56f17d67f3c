use serde_json::Value;

/// Scalar JSON value rendered as text. Null, arrays and objects yield `None`.
pub fn nonempty_string(value: Option<&Value>) -> Option<String> {
    let Some(value) = value else {
        return None;
    };
    if value.is_null() {
        return None;
    }
    if let Some(text) = value.as_str() {
        return Some(text.to_string());
    }
    if let Some(number) = value.as_i64() {
        return Some(number.to_string());
    }
    if let Some(number) = value.as_u64() {
        return Some(number.to_string());
    }
    if let Some(number) = value.as_f64() {
        return Some(number.to_string());
    }
    if let Some(boolean) = value.as_bool() {
        return Some(boolean.to_string());
    }
    None
}

pub fn value_ref_string(value: Option<&Value>) -> String {
    nonempty_string(value).unwrap_or_default()
}

pub fn row_string(value: &Value, key: &str) -> String {
    value_ref_string(value.get(key))
}

/// Numeric reading of a value; strings are parsed, anything else counts as zero.
pub fn value_f64(value: Option<&Value>) -> f64 {
    match value {
        Some(v) => {
            if let Some(num) = v.as_f64() {
                num
            } else if let Some(text) = v.as_str() {
                text.trim().parse::<f64>().unwrap_or(0.0)
            } else {
                0.0
            }
        }
        None => 0.0,
    }
}

/// Renders a number the way a browser would print it: no trailing `.0`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

pub fn clamp_string(value: &str, max_len: usize, trim: bool) -> String {
    let mut out = if trim {
        value.trim().to_string()
    } else {
        value.to_string()
    };
    out = out
        .chars()
        .filter(|ch| {
            let code = *ch as u32;
            code >= 32 && code != 127
        })
        .collect();
    if out.chars().count() > max_len {
        out = out.chars().take(max_len).collect();
    }
    out
}

/// Display text for any JSON value: arrays join with `,`, objects collapse.
pub fn js_like_value_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::Null) | None => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(boolean)) => boolean.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|entry| js_like_value_string(Some(entry)))
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(_)) => "[object Object]".to_string(),
    }
}

/// `true` for null, empty strings, empty arrays and empty objects.
pub fn is_empty_collection(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

/// Select placeholder; a select holding it counts as unset.
pub const UNSET: &str = "NONE";

pub fn is_unset(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == UNSET
}
