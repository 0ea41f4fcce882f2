//! Core library for the sheetwise command line application.
//!
//! Sheets are read through the [`workbook::Workbook`] boundary, shaped into
//! rectangles by [`grid`], and bounded by [`dimension`]. A
//! [`sheet::NormalizedSheet`] keeps both the displayed and the full precision
//! rendering of every cell, which [`schema`] coerces into typed records and
//! [`aggregate`] merges across sheets. The xlsx adapters live under [`io`] and
//! the file level orchestration used by the binary under [`pipeline`].

pub mod aggregate;
pub mod dimension;
pub mod error;
pub mod grid;
pub mod io;
pub mod pipeline;
pub mod precision;
pub mod schema;
pub mod serial;
pub mod sheet;
pub mod workbook;

pub use aggregate::{AggregateInput, AggregatedResult, AggregatedRow, aggregate};
pub use dimension::TableDimension;
pub use error::{Result, SheetError};
pub use schema::{Record, RecordShape};
pub use sheet::{NormalizedSheet, ParsedFile, SheetSelector};
pub use workbook::{CellValue, MemoryWorkbook, Workbook};
