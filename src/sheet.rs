use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::dimension::TableDimension;
use crate::error::{Result, SheetError};
use crate::grid;
use crate::io::excel_read;
use crate::precision::PrecisionReader;
use crate::schema::coerce;
use crate::schema::{FieldKind, TypedFieldValue};
use crate::workbook::Workbook;

/// Selects a sheet of a workbook by name or by zero based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    Name(String),
    Index(usize),
}

impl SheetSelector {
    /// Resolves the selector to a sheet name of the given workbook.
    pub fn resolve<W: Workbook + ?Sized>(&self, workbook: &W, file: &str) -> Result<String> {
        match self {
            SheetSelector::Name(name) => Ok(name.clone()),
            SheetSelector::Index(index) => workbook
                .sheet_names()
                .get(*index)
                .cloned()
                .ok_or_else(|| SheetError::SheetIndexOutOfRange {
                    index: *index,
                    file: file.to_string(),
                }),
        }
    }
}

/// A sheet shaped into a rectangle and read twice: once as displayed and once
/// at full numeric precision.
///
/// Both grids always have the same dimensions and keep the header as row 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSheet {
    name: String,
    file_name: Option<String>,
    path: Option<PathBuf>,
    original: Vec<Vec<String>>,
    precision: Vec<Vec<String>>,
}

impl NormalizedSheet {
    /// Builds a sheet from two renderings of the same raw rows. The precision
    /// grid is fitted to the bounds of the normalized original grid.
    pub fn from_grids(
        name: impl Into<String>,
        original: Vec<Vec<String>>,
        precision: Vec<Vec<String>>,
    ) -> Result<Self> {
        let original = grid::normalize(original);
        let width = grid::column_count(&original);
        if width == 0 {
            return Err(SheetError::NoHeaderRow);
        }
        let precision = grid::fit(precision, original.len(), width);
        Ok(Self {
            name: name.into(),
            file_name: None,
            path: None,
            original,
            precision,
        })
    }

    /// Reads and normalizes a sheet of an open workbook.
    ///
    /// Every cell of the normalized region is read a second time under the
    /// precision style; each cell's original style is restored afterwards.
    #[instrument(level = "debug", skip(workbook))]
    pub fn read<W: Workbook + ?Sized>(workbook: &mut W, sheet: &str) -> Result<Self> {
        let original = grid::normalize(workbook.read_rows(sheet)?);
        let width = grid::column_count(&original);
        if width == 0 {
            return Err(SheetError::NoHeaderRow);
        }

        let mut reader = PrecisionReader::new(workbook);
        let mut precision = Vec::with_capacity(original.len());
        for row in 0..original.len() {
            let mut cells = Vec::with_capacity(width);
            for col in 0..width {
                cells.push(reader.read(sheet, row, col)?);
            }
            precision.push(cells);
        }
        debug!(rows = original.len(), columns = width, "sheet normalized");

        Ok(Self {
            name: sheet.to_string(),
            file_name: None,
            path: None,
            original,
            precision,
        })
    }

    /// Opens an xlsx file and reads the named sheet.
    pub fn open(path: &Path, sheet: &str) -> Result<Self> {
        Self::open_selected(path, &SheetSelector::Name(sheet.to_string()))
    }

    /// Opens an xlsx file and reads the sheet at a zero based position.
    pub fn open_index(path: &Path, index: usize) -> Result<Self> {
        Self::open_selected(path, &SheetSelector::Index(index))
    }

    /// Opens an xlsx file and reads the selected sheet.
    pub fn open_selected(path: &Path, selector: &SheetSelector) -> Result<Self> {
        let mut workbook = excel_read::open_workbook(path)?;
        let name = selector.resolve(&workbook, &path.display().to_string())?;
        Ok(Self::read(&mut workbook, &name)?.with_source(path))
    }

    /// Records the file the sheet was read from.
    pub fn with_source(mut self, path: &Path) -> Self {
        self.file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        self.path = Some(path.to_path_buf());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Cells as originally displayed, header included.
    pub fn original(&self) -> &[Vec<String>] {
        &self.original
    }

    /// Cells rendered at full precision, header included.
    pub fn precision(&self) -> &[Vec<String>] {
        &self.precision
    }

    /// The header row, or an empty slice once every column has been removed.
    pub fn header(&self) -> &[String] {
        self.original.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Dimension of the contiguous data region below the header.
    pub fn dimension(&self) -> Result<TableDimension> {
        TableDimension::infer(&self.original)
    }

    /// Number of rows below the header, blank interior rows included.
    pub fn data_row_count(&self) -> usize {
        self.original.len().saturating_sub(1)
    }

    /// Displayed text of a cell. Row 0 is the header.
    pub fn text(&self, row: usize, col: usize) -> Result<&str> {
        cell_at(&self.original, row, col)
    }

    /// Full precision text of a cell. Row 0 is the header.
    pub fn precision_text(&self, row: usize, col: usize) -> Result<&str> {
        cell_at(&self.precision, row, col)
    }

    /// Cell coerced to a decimal at full precision.
    pub fn decimal(&self, row: usize, col: usize) -> Result<TypedFieldValue> {
        coerce::coerce(self, row, col, FieldKind::Decimal)
    }

    /// Cell coerced to an integer, truncated toward zero.
    pub fn integer(&self, row: usize, col: usize) -> Result<TypedFieldValue> {
        coerce::coerce(self, row, col, FieldKind::Integer)
    }

    /// Cell coerced to a timestamp from its serial date number.
    pub fn timestamp(&self, row: usize, col: usize) -> Result<TypedFieldValue> {
        coerce::coerce(self, row, col, FieldKind::Timestamp)
    }

    /// Removes every column whose position and cell in `row` satisfy
    /// `predicate`, from both grids. Returns the number of columns removed.
    pub fn remove_columns_where<F>(&mut self, row: usize, mut predicate: F) -> Result<usize>
    where
        F: FnMut(usize, &str) -> bool,
    {
        let cells = self
            .original
            .get(row)
            .ok_or(SheetError::InvalidCellIndices { row, column: 0 })?;
        let removed: HashSet<usize> = cells
            .iter()
            .enumerate()
            .filter(|(col, cell)| predicate(*col, cell))
            .map(|(col, _)| col)
            .collect();
        if removed.is_empty() {
            return Ok(0);
        }

        for rows in [&mut self.original, &mut self.precision] {
            for cells in rows.iter_mut() {
                let mut col = 0;
                cells.retain(|_| {
                    let keep = !removed.contains(&col);
                    col += 1;
                    keep
                });
            }
        }
        debug!(sheet = %self.name, removed = removed.len(), "columns removed");
        Ok(removed.len())
    }

    /// Removes every column whose value in `row` occurs more than once.
    pub fn remove_duplicate_columns(&mut self, row: usize) -> Result<usize> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for cell in self.original.get(row).into_iter().flatten() {
            *counts.entry(cell.clone()).or_default() += 1;
        }
        self.remove_columns_where(row, |_, cell| counts.get(cell).copied().unwrap_or(0) >= 2)
    }

    /// Keeps the left-most column for each value in `row` and removes the
    /// columns repeating it further right.
    pub fn remove_right_duplicate_columns(&mut self, row: usize) -> Result<usize> {
        self.remove_right_duplicate_columns_from(row, 0)
    }

    /// Like [`remove_right_duplicate_columns`](Self::remove_right_duplicate_columns),
    /// but only columns from `first_col` onward are compared or removed.
    pub fn remove_right_duplicate_columns_from(
        &mut self,
        row: usize,
        first_col: usize,
    ) -> Result<usize> {
        let mut seen: HashSet<String> = HashSet::new();
        self.remove_columns_where(row, |col, cell| {
            col >= first_col && !seen.insert(cell.to_string())
        })
    }
}

fn cell_at(grid: &[Vec<String>], row: usize, col: usize) -> Result<&str> {
    grid.get(row)
        .and_then(|cells| cells.get(col))
        .map(String::as_str)
        .ok_or(SheetError::InvalidCellIndices { row, column: col })
}

/// A sheet that could not be normalized, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedSheet {
    pub name: String,
    pub reason: String,
}

/// Every sheet of one file, split into the sheets that normalized and the
/// ones that failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedFile {
    name: String,
    path: PathBuf,
    sheets: Vec<NormalizedSheet>,
    failed: Vec<FailedSheet>,
}

impl ParsedFile {
    /// Opens an xlsx file and normalizes each of its sheets.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        let mut workbook = excel_read::open_workbook(path)?;
        Ok(Self::from_workbook(&mut workbook, path))
    }

    /// Normalizes each sheet of an open workbook, recording `path` as the
    /// source of every sheet. Sheets that fail are collected, not returned as
    /// errors.
    pub fn from_workbook<W: Workbook + ?Sized>(workbook: &mut W, path: &Path) -> Self {
        let mut sheets = Vec::new();
        let mut failed = Vec::new();
        for name in workbook.sheet_names() {
            match NormalizedSheet::read(workbook, &name) {
                Ok(sheet) => sheets.push(sheet.with_source(path)),
                Err(error) => {
                    warn!(sheet = %name, %error, "skipping sheet");
                    failed.push(FailedSheet {
                        name,
                        reason: error.to_string(),
                    });
                }
            }
        }
        Self {
            name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            sheets,
            failed,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Normalized sheets in workbook order.
    pub fn sheets(&self) -> &[NormalizedSheet] {
        &self.sheets
    }

    pub fn failed(&self) -> &[FailedSheet] {
        &self.failed
    }

    pub fn sheet(&self, name: &str) -> Option<&NormalizedSheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn into_sheets(self) -> Vec<NormalizedSheet> {
        self.sheets
    }
}
