use std::path::PathBuf;

use thiserror::Error;

use crate::workbook::StyleId;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, SheetError>;

/// Error type covering the structural failures that can occur when a sheet is
/// dimensioned, mapped onto a record shape, aggregated, or written.
///
/// Per-cell coercion problems are not represented here: they are recorded on
/// the coerced value itself so a single bad cell never aborts a sheet.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the header row of a sheet is blank or absent.
    #[error("no header row on sheet")]
    NoHeaderRow,

    /// Raised when a record shape description is not a record.
    #[error("invalid record shape: {0}")]
    InvalidRecordShape(String),

    /// Raised when two fields of one record shape share a tag.
    #[error("record shape has multiple fields tagged '{tag}'")]
    DuplicateTagName { tag: String },

    /// Raised when a tagged field is declared with an unsupported type.
    #[error("field '{field}' is tagged but declared as unsupported type '{declared}'")]
    InvalidTaggedKind { field: String, declared: String },

    /// Raised when a tagged header does not appear in the sheet header.
    #[error("tagged header '{tag}' does not exist in sheet header")]
    TaggedHeaderMissing { tag: String },

    /// Raised when a tagged header appears more than once in the sheet header.
    #[error("tagged header '{tag}' appears {count} times in sheet header")]
    TaggedHeaderDuplicated { tag: String, count: usize },

    /// Raised when aggregation finds a repeated header inside a single sheet.
    #[error("duplicate column header '{value}' in sheet '{sheet}'")]
    DuplicateHeaderInSheet { sheet: String, value: String },

    /// Raised on direct cell access outside the bounds of a sheet.
    #[error("invalid cell indices (row {row}, column {column})")]
    InvalidCellIndices { row: usize, column: usize },

    /// Raised when a named sheet does not exist in a workbook.
    #[error("missing sheet '{sheet}'")]
    MissingSheet { sheet: String },

    /// Raised when a sheet is selected by an index the workbook does not have.
    #[error("sheet index {index} does not exist in file {file}")]
    SheetIndexOutOfRange { index: usize, file: String },

    /// Raised when a writer is asked to create a sheet that already exists.
    #[error("sheet '{0}' already exists")]
    SheetExists(String),

    /// Raised when saving onto an existing path with overwriting disabled.
    #[error("refusing to overwrite existing file {0}")]
    OverwriteRefused(PathBuf),

    /// Raised when a cell references a style the workbook never registered.
    #[error("unknown style id {0}")]
    UnknownStyle(StyleId),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
