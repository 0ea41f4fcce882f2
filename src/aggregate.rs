use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{Result, SheetError};
use crate::sheet::NormalizedSheet;
use crate::workbook::CellValue;

pub const SHEET_NAME_COLUMN: &str = "SHEET_NAME";
pub const FILE_NAME_COLUMN: &str = "FILE_NAME";
pub const FILE_PATH_COLUMN: &str = "FILE_PATH";
pub const ROW_INDEX_COLUMN: &str = "ROW_INDEX";

/// A sheet to aggregate, with the header row and first column of its table.
#[derive(Debug, Clone, Copy)]
pub struct AggregateInput<'a> {
    pub sheet: &'a NormalizedSheet,
    pub start_row: usize,
    pub start_col: usize,
}

impl<'a> AggregateInput<'a> {
    /// Input whose table starts at the top-left cell.
    pub fn new(sheet: &'a NormalizedSheet) -> Self {
        Self {
            sheet,
            start_row: 0,
            start_col: 0,
        }
    }

    pub fn starting_at(sheet: &'a NormalizedSheet, start_row: usize, start_col: usize) -> Self {
        Self {
            sheet,
            start_row,
            start_col,
        }
    }

    fn header(&self) -> &'a [String] {
        self.sheet
            .original()
            .get(self.start_row)
            .map(|row| tail(row, self.start_col))
            .unwrap_or(&[])
    }

    fn data_rows(&self) -> impl Iterator<Item = (&'a [String], &'a [String])> + '_ {
        let skip = self.start_row + 1;
        let start_col = self.start_col;
        self.sheet
            .original()
            .iter()
            .zip(self.sheet.precision())
            .skip(skip)
            .map(move |(original, precision)| (tail(original, start_col), tail(precision, start_col)))
    }
}

fn tail(row: &[String], start: usize) -> &[String] {
    row.get(start..).unwrap_or(&[])
}

/// One data row of an aggregated sheet, projected onto the unified header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedRow {
    pub sheet_name: String,
    pub file_name: Option<String>,
    pub file_path: Option<PathBuf>,
    /// 1-based index of the row below its sheet's header.
    pub row_index: usize,
    pub original: Vec<String>,
    pub precision: Vec<String>,
}

/// Which rendering of the cells to write out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueFormat {
    #[default]
    Original,
    Precision,
}

/// Rows of several sheets appended under one header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AggregatedResult {
    pub header: Vec<String>,
    pub rows: Vec<AggregatedRow>,
}

impl AggregatedResult {
    /// Header of [`AggregatedResult::to_table`]: the provenance columns
    /// followed by the unified header.
    pub fn table_header(&self) -> Vec<String> {
        [
            SHEET_NAME_COLUMN,
            FILE_NAME_COLUMN,
            FILE_PATH_COLUMN,
            ROW_INDEX_COLUMN,
        ]
        .iter()
        .map(|column| column.to_string())
        .chain(self.header.iter().cloned())
        .collect()
    }

    /// Rows ready for writing, each prefixed with its provenance.
    ///
    /// Precision values are typed with [`CellValue::infer`]; original values
    /// are kept as text.
    pub fn to_table(&self, format: ValueFormat) -> Vec<Vec<CellValue>> {
        self.rows
            .iter()
            .map(|row| {
                let mut cells = vec![
                    CellValue::Text(row.sheet_name.clone()),
                    CellValue::Text(row.file_name.clone().unwrap_or_default()),
                    CellValue::Text(
                        row.file_path
                            .as_ref()
                            .map(|path| path.display().to_string())
                            .unwrap_or_default(),
                    ),
                    CellValue::Integer(row.row_index as i64),
                ];
                match format {
                    ValueFormat::Original => {
                        cells.extend(row.original.iter().cloned().map(CellValue::Text))
                    }
                    ValueFormat::Precision => {
                        cells.extend(row.precision.iter().map(|text| CellValue::infer(text)))
                    }
                }
                cells
            })
            .collect()
    }
}

/// Appends the data rows of every input under a header made of the distinct
/// header values in order of first appearance.
///
/// Fails with [`SheetError::DuplicateHeaderInSheet`] before any row is
/// projected when one input repeats a header value.
#[instrument(level = "info", skip_all, fields(sheets = inputs.len()))]
pub fn aggregate(inputs: &[AggregateInput<'_>]) -> Result<AggregatedResult> {
    for input in inputs {
        check_duplicates(input)?;
    }

    let mut header: Vec<String> = Vec::new();
    let mut unified: HashMap<&str, usize> = HashMap::new();
    for input in inputs {
        for value in input.header() {
            if !unified.contains_key(value.as_str()) {
                unified.insert(value.as_str(), header.len());
                header.push(value.clone());
            }
        }
    }

    let mut rows = Vec::new();
    for input in inputs {
        let positions: Vec<usize> = input
            .header()
            .iter()
            .map(|value| unified[value.as_str()])
            .collect();

        for (index, (original, precision)) in input.data_rows().enumerate() {
            rows.push(AggregatedRow {
                sheet_name: input.sheet.name().to_string(),
                file_name: input.sheet.file_name().map(str::to_string),
                file_path: input.sheet.path().map(|path| path.to_path_buf()),
                row_index: index + 1,
                original: project(original, &positions, header.len()),
                precision: project(precision, &positions, header.len()),
            });
        }
    }

    debug!(columns = header.len(), rows = rows.len(), "sheets aggregated");
    Ok(AggregatedResult { header, rows })
}

fn check_duplicates(input: &AggregateInput<'_>) -> Result<()> {
    let mut seen = HashSet::new();
    for value in input.header() {
        if !seen.insert(value.as_str()) {
            return Err(SheetError::DuplicateHeaderInSheet {
                sheet: input.sheet.name().to_string(),
                value: value.clone(),
            });
        }
    }
    Ok(())
}

fn project(cells: &[String], positions: &[usize], width: usize) -> Vec<String> {
    let mut row = vec![String::new(); width];
    for (cell, &position) in cells.iter().zip(positions) {
        row[position] = cell.clone();
    }
    row
}
