//! Boundary to the spreadsheet file collaborator.
//!
//! The algorithmic core only ever talks to a [`Workbook`]: it lists sheets,
//! reads every row of a sheet as display text, and reads or restyles single
//! cells. [`MemoryWorkbook`] is the in-process implementation; the xlsx
//! adapters in [`crate::io`] load into and write out of it.

pub mod memory;
pub mod value;

pub use memory::{Cell, MemoryWorkbook};
pub use value::{CellValue, NumberFormat};

use crate::error::Result;

/// Identifier of a style registered with a workbook.
pub type StyleId = usize;

/// Rows of raw cell text as listed by a workbook; rows may be ragged.
pub type RawGrid = Vec<Vec<String>>;

/// Cell level access to a spreadsheet.
///
/// Coordinates are zero based. Reads of cells outside the populated area of an
/// existing sheet return empty text, mirroring spreadsheet semantics; unknown
/// sheets are an error.
pub trait Workbook {
    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// All rows of a sheet rendered as display text. Trailing empty cells of a
    /// row and trailing empty rows are omitted.
    fn read_rows(&self, sheet: &str) -> Result<RawGrid>;

    /// Display text of a single cell under its current style.
    fn read_cell(&self, sheet: &str, row: usize, col: usize) -> Result<String>;

    /// Replaces the value of a single cell, keeping its style.
    fn write_cell(&mut self, sheet: &str, row: usize, col: usize, value: CellValue) -> Result<()>;

    /// Style currently applied to a cell.
    fn cell_style(&self, sheet: &str, row: usize, col: usize) -> Result<StyleId>;

    /// Applies a registered style to a cell.
    fn set_cell_style(&mut self, sheet: &str, row: usize, col: usize, style: StyleId)
    -> Result<()>;

    /// Registers a style and returns its identifier. An already registered
    /// format keeps its identifier.
    fn add_style(&mut self, format: NumberFormat) -> StyleId;
}
