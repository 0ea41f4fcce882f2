use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, SheetError};
use crate::schema::field::{DeclaredType, FieldKind};

/// One field of a record shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub tag: Option<String>,
    pub declared: DeclaredType,
}

/// Static description of a record: its fields in declaration order, some of
/// them tagged with the logical column they are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordShape {
    name: String,
    fields: Vec<FieldDecl>,
}

#[derive(Deserialize)]
struct ShapeDocument {
    #[serde(default)]
    name: Option<String>,
    fields: Vec<FieldDocument>,
}

#[derive(Deserialize)]
struct FieldDocument {
    name: String,
    #[serde(default)]
    tag: Option<String>,
    kind: String,
}

impl RecordShape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field; its position is the number of fields before it.
    pub fn with_field(mut self, name: &str, tag: Option<&str>, declared: DeclaredType) -> Self {
        self.fields.push(FieldDecl {
            name: name.to_string(),
            tag: tag.map(str::to_string),
            declared,
        });
        self
    }

    /// Appends a field tagged with a column name.
    pub fn tagged(self, name: &str, tag: &str, kind: FieldKind) -> Self {
        self.with_field(name, Some(tag), DeclaredType::Kind(kind))
    }

    /// Reads a shape from a JSON document of the form
    /// `{"name": "...", "fields": [{"name": "...", "tag": "...", "kind": "..."}]}`.
    ///
    /// Unknown kinds are kept as unsupported declarations and rejected when a
    /// tagged field carries one.
    pub fn from_json(document: &Value) -> Result<Self> {
        if !document.is_object() {
            return Err(SheetError::InvalidRecordShape(format!(
                "expected an object with a `fields` array, found {}",
                json_type_name(document)
            )));
        }
        let parsed: ShapeDocument = serde_json::from_value(document.clone())
            .map_err(|err| SheetError::InvalidRecordShape(err.to_string()))?;

        let mut shape = RecordShape::new(parsed.name.unwrap_or_else(|| "record".to_string()));
        for field in parsed.fields {
            let declared = match FieldKind::parse(&field.kind) {
                Some(kind) => DeclaredType::Kind(kind),
                None => DeclaredType::Unsupported(Cow::Owned(field.kind)),
            };
            shape = shape.with_field(&field.name, field.tag.as_deref(), declared);
        }
        Ok(shape)
    }

    /// Parses [`RecordShape::from_json`] input from text.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(source)?;
        Self::from_json(&document)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Lookup tables built once per record shape: tag to field position, field
/// position to tag, and field position to kind.
///
/// Untagged fields never appear in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRegistry {
    shape: String,
    order: Vec<usize>,
    positions: BTreeMap<String, usize>,
    tags: BTreeMap<usize, String>,
    kinds: BTreeMap<usize, FieldKind>,
}

impl FieldRegistry {
    /// Builds the registry, failing on a repeated tag or on a tagged field
    /// whose declared type is not one of the four kinds.
    pub fn build(shape: &RecordShape) -> Result<Self> {
        let mut order = Vec::new();
        let mut positions = BTreeMap::new();
        for (position, field) in shape.fields.iter().enumerate() {
            let Some(tag) = &field.tag else {
                continue;
            };
            if positions.insert(tag.clone(), position).is_some() {
                return Err(SheetError::DuplicateTagName { tag: tag.clone() });
            }
            order.push(position);
        }

        let tags: BTreeMap<usize, String> = positions
            .iter()
            .map(|(tag, position)| (*position, tag.clone()))
            .collect();

        let mut kinds = BTreeMap::new();
        for &position in &order {
            let field = &shape.fields[position];
            match &field.declared {
                DeclaredType::Kind(kind) => {
                    kinds.insert(position, *kind);
                }
                DeclaredType::Unsupported(declared) => {
                    return Err(SheetError::InvalidTaggedKind {
                        field: field.name.clone(),
                        declared: declared.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            shape: shape.name.clone(),
            order,
            positions,
            tags,
            kinds,
        })
    }

    pub fn shape_name(&self) -> &str {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn position(&self, tag: &str) -> Option<usize> {
        self.positions.get(tag).copied()
    }

    pub fn tag(&self, position: usize) -> Option<&str> {
        self.tags.get(&position).map(String::as_str)
    }

    pub fn kind(&self, position: usize) -> Option<FieldKind> {
        self.kinds.get(&position).copied()
    }

    /// Tagged fields as `(position, tag, kind)` in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (usize, &str, FieldKind)> + '_ {
        self.order.iter().filter_map(|&position| {
            Some((position, self.tag(position)?, self.kind(position)?))
        })
    }
}
