use std::borrow::Cow;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::workbook::CellValue;

/// The closed set of kinds a tagged field can be coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    Timestamp,
}

impl FieldKind {
    /// Parses the lowercase kind name used in shape documents.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "text" => Some(FieldKind::Text),
            "integer" => Some(FieldKind::Integer),
            "decimal" => Some(FieldKind::Decimal),
            "timestamp" => Some(FieldKind::Timestamp),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Decimal => "decimal",
            FieldKind::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value type a field of a record shape is declared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    /// One of the coercible kinds.
    Kind(FieldKind),
    /// Any other type, named for error reporting.
    Unsupported(Cow<'static, str>),
}

/// Result of coercing one cell into a field kind.
///
/// Numeric and timestamp variants always keep the precision text they were
/// parsed from and whether parsing succeeded; on failure the value is the
/// type's default.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypedFieldValue {
    Text {
        value: String,
    },
    Integer {
        value: i64,
        raw: String,
        success: bool,
    },
    Decimal {
        value: f64,
        raw: String,
        success: bool,
    },
    Timestamp {
        value: NaiveDateTime,
        raw: String,
        success: bool,
    },
}

impl TypedFieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            TypedFieldValue::Text { .. } => FieldKind::Text,
            TypedFieldValue::Integer { .. } => FieldKind::Integer,
            TypedFieldValue::Decimal { .. } => FieldKind::Decimal,
            TypedFieldValue::Timestamp { .. } => FieldKind::Timestamp,
        }
    }

    /// Whether coercion succeeded. Text always succeeds.
    pub fn is_success(&self) -> bool {
        match self {
            TypedFieldValue::Text { .. } => true,
            TypedFieldValue::Integer { success, .. }
            | TypedFieldValue::Decimal { success, .. }
            | TypedFieldValue::Timestamp { success, .. } => *success,
        }
    }

    /// The text the value was read from.
    pub fn raw_text(&self) -> &str {
        match self {
            TypedFieldValue::Text { value } => value,
            TypedFieldValue::Integer { raw, .. }
            | TypedFieldValue::Decimal { raw, .. }
            | TypedFieldValue::Timestamp { raw, .. } => raw,
        }
    }

    /// Converts the value for writing. Failed coercions are written as their
    /// raw text so nothing the sheet held is lost.
    pub fn to_cell_value(&self) -> CellValue {
        match self {
            TypedFieldValue::Text { value } => CellValue::Text(value.clone()),
            value if !value.is_success() => CellValue::Text(value.raw_text().to_string()),
            TypedFieldValue::Integer { value, .. } => CellValue::Integer(*value),
            TypedFieldValue::Decimal { value, .. } => CellValue::Decimal(*value),
            TypedFieldValue::Timestamp { value, .. } => CellValue::Timestamp(*value),
        }
    }
}

/// A field type that can appear in a record shape.
///
/// The four typed field wrappers declare a coercible kind. Plain Rust types
/// implement the trait as unsupported so tagging them is rejected when the
/// field registry is built, not when a sheet is read.
pub trait SchemaField {
    const DECLARED: DeclaredType;

    /// Stores a coerced value together with the header it was read from.
    fn accept(&mut self, value: TypedFieldValue, header: &str);
}

/// Text cell, read as originally displayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextField {
    pub value: String,
    pub header: String,
}

impl TextField {
    pub fn is_success(&self) -> bool {
        true
    }
}

/// Integer cell, truncated toward zero from its full precision number.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IntegerField {
    pub value: i64,
    pub raw: String,
    pub success: bool,
    pub header: String,
}

/// Decimal cell, read at full precision.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecimalField {
    pub value: f64,
    pub raw: String,
    pub success: bool,
    pub header: String,
}

/// Timestamp cell, read from its serial date number.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimestampField {
    pub value: NaiveDateTime,
    pub raw: String,
    pub success: bool,
    pub header: String,
}

impl SchemaField for TextField {
    const DECLARED: DeclaredType = DeclaredType::Kind(FieldKind::Text);

    fn accept(&mut self, value: TypedFieldValue, header: &str) {
        self.value = match value {
            TypedFieldValue::Text { value } => value,
            other => other.raw_text().to_string(),
        };
        self.header = header.to_string();
    }
}

impl SchemaField for IntegerField {
    const DECLARED: DeclaredType = DeclaredType::Kind(FieldKind::Integer);

    fn accept(&mut self, value: TypedFieldValue, header: &str) {
        match value {
            TypedFieldValue::Integer {
                value,
                raw,
                success,
            } => {
                self.value = value;
                self.raw = raw;
                self.success = success;
            }
            other => mismatched(&mut self.raw, &mut self.success, &other),
        }
        self.header = header.to_string();
    }
}

impl SchemaField for DecimalField {
    const DECLARED: DeclaredType = DeclaredType::Kind(FieldKind::Decimal);

    fn accept(&mut self, value: TypedFieldValue, header: &str) {
        match value {
            TypedFieldValue::Decimal {
                value,
                raw,
                success,
            } => {
                self.value = value;
                self.raw = raw;
                self.success = success;
            }
            other => mismatched(&mut self.raw, &mut self.success, &other),
        }
        self.header = header.to_string();
    }
}

impl SchemaField for TimestampField {
    const DECLARED: DeclaredType = DeclaredType::Kind(FieldKind::Timestamp);

    fn accept(&mut self, value: TypedFieldValue, header: &str) {
        match value {
            TypedFieldValue::Timestamp {
                value,
                raw,
                success,
            } => {
                self.value = value;
                self.raw = raw;
                self.success = success;
            }
            other => mismatched(&mut self.raw, &mut self.success, &other),
        }
        self.header = header.to_string();
    }
}

fn mismatched(raw: &mut String, success: &mut bool, value: &TypedFieldValue) {
    *raw = value.raw_text().to_string();
    *success = false;
}

macro_rules! unsupported_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SchemaField for $ty {
                const DECLARED: DeclaredType =
                    DeclaredType::Unsupported(Cow::Borrowed(stringify!($ty)));

                fn accept(&mut self, _value: TypedFieldValue, _header: &str) {}
            }
        )*
    };
}

unsupported_field!(String, bool, i32, i64, u32, u64, f32, f64, NaiveDateTime);
