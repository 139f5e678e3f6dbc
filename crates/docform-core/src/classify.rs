// Leaf/branch classification and raw-text coercion.
//
// Coercion never fails: input that does not fit the original type either
// keeps the original value (numbers) or falls to a fixed result (booleans).
use serde_json::{Number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Number,
    Toggle,
    /// `null`; rendered as an empty text input.
    Empty,
    Mapping,
    Sequence,
}

impl FieldKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => FieldKind::Empty,
            Value::Bool(_) => FieldKind::Toggle,
            Value::Number(_) => FieldKind::Number,
            Value::String(_) => FieldKind::Text,
            Value::Array(_) => FieldKind::Sequence,
            Value::Object(_) => FieldKind::Mapping,
        }
    }

    pub fn is_leaf(self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Number | FieldKind::Toggle)
    }

    pub fn is_branch(self) -> bool {
        matches!(self, FieldKind::Mapping | FieldKind::Sequence)
    }

    /// Whether a host should offer a text input for this kind.
    pub fn is_editable(self) -> bool {
        !self.is_branch()
    }
}

pub fn is_leaf(value: &Value) -> bool {
    FieldKind::of(value).is_leaf()
}

pub fn is_branch(value: &Value) -> bool {
    FieldKind::of(value).is_branch()
}

/// Turns raw input text into a value of the same type as `original`.
///
/// - number: `raw` (trimmed) as an integer or finite float, else `original`
/// - boolean: `raw == "true"`, case-sensitive; anything else is `false`
/// - null: `""` stays null, other text becomes a string
/// - string (and containers): `raw` verbatim
pub fn coerce(original: &Value, raw: &str) -> Value {
    match original {
        Value::Number(_) => match parse_number(raw) {
            Some(n) => Value::Number(n),
            None => {
                tracing::debug!(raw, "not a number, keeping original value");
                original.clone()
            }
        },
        Value::Bool(_) => Value::Bool(raw == "true"),
        Value::Null if raw.is_empty() => Value::Null,
        _ => Value::String(raw.to_string()),
    }
}

pub fn parse_number(raw: &str) -> Option<Number> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = trimmed.parse::<u64>() {
        return Some(Number::from(u));
    }
    // from_f64 rejects NaN and infinities, which `parse` would accept
    trimmed.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Text a host shows for a field: the editable text for leaves, `""` for
/// null, and a short summary for branches.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) if items.is_empty() => "[] 0 items".to_string(),
        Value::Array(items) => format!("[…] {} items", items.len()),
        Value::Object(map) if map.is_empty() => "{} 0 keys".to_string(),
        Value::Object(map) => format!("{{…}} {} keys", map.len()),
    }
}
