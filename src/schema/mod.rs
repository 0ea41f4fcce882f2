//! Typed records read from normalized sheets.
//!
//! A record shape names the fields of a record and tags some of them with the
//! header of the column they are read from. Shapes are either declared for a
//! Rust struct with [`record_shape!`](crate::record_shape) or loaded at run
//! time with [`RecordShape::from_json`].

pub mod coerce;
pub mod field;
pub mod registry;
pub mod resolve;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::sheet::NormalizedSheet;

pub use field::{
    DecimalField, DeclaredType, FieldKind, IntegerField, SchemaField, TextField, TimestampField,
    TypedFieldValue,
};
pub use registry::{FieldDecl, FieldRegistry, RecordShape};
pub use resolve::ColumnIndexMap;

/// A struct that can be populated from the rows of a sheet.
///
/// Usually implemented with [`record_shape!`](crate::record_shape).
pub trait Record: Default {
    /// The fields of the record in declaration order.
    fn shape() -> RecordShape;

    /// Stores a coerced value in the field at `position` of [`Record::shape`].
    fn assign(&mut self, position: usize, value: TypedFieldValue, header: &str);
}

/// Implements [`Record`] for a struct from a list of its fields.
///
/// Each field is listed with its type and, when it is read from a column, the
/// header tag after `=>`. Tagged fields must use one of the typed field
/// wrappers; tagging any other type is rejected when the registry is built.
///
/// ```
/// use sheetwise::record_shape;
/// use sheetwise::schema::{IntegerField, TextField};
///
/// #[derive(Debug, Default)]
/// struct Trade {
///     id: IntegerField,
///     desk: TextField,
///     note: String,
/// }
///
/// record_shape! {
///     Trade {
///         id: IntegerField => "ID",
///         desk: TextField => "DESK",
///         note: String,
///     }
/// }
/// ```
#[macro_export]
macro_rules! record_shape {
    (@tag $tag:literal) => {
        ::core::option::Option::Some($tag)
    };
    (@tag) => {
        ::core::option::Option::None
    };
    ($record:ident { $($field:ident : $ty:ty $(=> $tag:literal)?),* $(,)? }) => {
        impl $crate::schema::Record for $record {
            fn shape() -> $crate::schema::RecordShape {
                $crate::schema::RecordShape::new(stringify!($record))
                    $(.with_field(
                        stringify!($field),
                        $crate::record_shape!(@tag $($tag)?),
                        <$ty as $crate::schema::SchemaField>::DECLARED,
                    ))*
            }

            #[allow(unused_assignments, unused_variables, unused_mut)]
            fn assign(
                &mut self,
                position: usize,
                value: $crate::schema::TypedFieldValue,
                header: &str,
            ) {
                let mut index = 0usize;
                $(
                    if index == position {
                        <$ty as $crate::schema::SchemaField>::accept(&mut self.$field, value, header);
                        return;
                    }
                    index += 1;
                )*
            }
        }
    };
}

/// One populated field of a [`DynamicRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicField {
    pub tag: String,
    pub value: TypedFieldValue,
}

/// A record read with a run time [`RecordShape`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicRecord {
    /// 1-based position of the row in the data region.
    pub row: usize,
    pub fields: Vec<DynamicField>,
}

impl DynamicRecord {
    pub fn get(&self, tag: &str) -> Option<&TypedFieldValue> {
        self.fields
            .iter()
            .find(|field| field.tag == tag)
            .map(|field| &field.value)
    }
}

/// Coerced values per data row, as `(field position, value)` pairs.
type CoercedRow = Vec<(usize, TypedFieldValue)>;

fn coerce_rows(registry: &FieldRegistry, sheet: &NormalizedSheet) -> Result<Vec<CoercedRow>> {
    let columns = ColumnIndexMap::resolve(registry, sheet.header())?;
    let dimension = sheet.dimension()?;

    let mut rows = Vec::with_capacity(dimension.row_count);
    for row in 1..=dimension.row_count {
        let mut values = Vec::with_capacity(columns.len());
        for (position, column) in columns.iter() {
            let Some(kind) = registry.kind(position) else {
                continue;
            };
            values.push((position, coerce::coerce(sheet, row, column, kind)?));
        }
        rows.push(values);
    }
    Ok(rows)
}

/// Appends one record per data row of `sheet` to `records`, returning how
/// many were added.
///
/// Nothing is appended when the shape or the header is rejected. Cells that
/// fail to coerce only clear the success flag of their field.
#[instrument(level = "info", skip_all, fields(sheet = %sheet.name()))]
pub fn populate<T: Record>(sheet: &NormalizedSheet, records: &mut Vec<T>) -> Result<usize> {
    let registry = FieldRegistry::build(&T::shape())?;
    let rows = coerce_rows(&registry, sheet)?;
    let added = rows.len();

    records.reserve(added);
    for values in rows {
        let mut record = T::default();
        for (position, value) in values {
            let header = registry.tag(position).unwrap_or_default();
            record.assign(position, value, header);
        }
        records.push(record);
    }
    debug!(shape = registry.shape_name(), records = added, "records populated");
    Ok(added)
}

/// Reads every data row of `sheet` into a new vector of records.
pub fn apply<T: Record>(sheet: &NormalizedSheet) -> Result<Vec<T>> {
    let mut records = Vec::new();
    populate(sheet, &mut records)?;
    Ok(records)
}

/// Reads every data row of `sheet` with a run time shape.
#[instrument(level = "info", skip_all, fields(sheet = %sheet.name(), shape = shape.name()))]
pub fn apply_shape(shape: &RecordShape, sheet: &NormalizedSheet) -> Result<Vec<DynamicRecord>> {
    let registry = FieldRegistry::build(shape)?;
    let rows = coerce_rows(&registry, sheet)?;

    let records: Vec<DynamicRecord> = rows
        .into_iter()
        .enumerate()
        .map(|(index, values)| DynamicRecord {
            row: index + 1,
            fields: values
                .into_iter()
                .map(|(position, value)| DynamicField {
                    tag: registry.tag(position).unwrap_or_default().to_string(),
                    value,
                })
                .collect(),
        })
        .collect();
    debug!(records = records.len(), "records read");
    Ok(records)
}
