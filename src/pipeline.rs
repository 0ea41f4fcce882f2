//! File level operations behind the command line interface.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::aggregate::{self, AggregateInput, AggregatedResult, ValueFormat};
use crate::dimension::TableDimension;
use crate::error::{Result, SheetError};
use crate::io::excel_read;
use crate::io::excel_write::{FileWriter, IndexedWriter, WriteOptions};
use crate::schema::{self, DynamicRecord, RecordShape};
use crate::sheet::{NormalizedSheet, ParsedFile, SheetSelector};
use crate::workbook::{CellValue, Workbook};

/// Name of the sheet an aggregation is written to.
pub const AGGREGATED_SHEET: &str = "AGGREGATED";

/// Status of one sheet of a workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    pub name: String,
    pub dimension: Option<TableDimension>,
    pub failure: Option<String>,
}

/// Lists every sheet of a workbook in order with its dimension, or the reason
/// it could not be read.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn sheet_summaries(path: &Path) -> Result<Vec<SheetSummary>> {
    let mut workbook = excel_read::open_workbook(path)?;
    let mut summaries = Vec::new();
    for name in workbook.sheet_names() {
        let summary = match NormalizedSheet::read(&mut workbook, &name)
            .and_then(|sheet| sheet.dimension())
        {
            Ok(dimension) => SheetSummary {
                name,
                dimension: Some(dimension),
                failure: None,
            },
            Err(error) => SheetSummary {
                name,
                dimension: None,
                failure: Some(error.to_string()),
            },
        };
        summaries.push(summary);
    }
    info!(sheets = summaries.len(), "workbook summarised");
    Ok(summaries)
}

/// Infers the dimension of a sheet from its raw rows.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn dimension(path: &Path, selector: &SheetSelector) -> Result<TableDimension> {
    let workbook = excel_read::open_workbook(path)?;
    let name = selector.resolve(&workbook, &path.display().to_string())?;
    let dimension = TableDimension::infer(&workbook.read_rows(&name)?)?;
    debug!(
        sheet = %name,
        rows = dimension.row_count,
        columns = dimension.column_count,
        "dimension inferred"
    );
    Ok(dimension)
}

/// Loads a record shape from a JSON document on disk.
pub fn load_shape(path: &Path) -> Result<RecordShape> {
    if !path.exists() {
        return Err(SheetError::MissingInput(path.to_path_buf()));
    }
    RecordShape::from_json_str(&fs::read_to_string(path)?)
}

/// Reads the records of a sheet with the given shape.
#[instrument(level = "info", skip_all, fields(path = %path.display(), shape = shape.name()))]
pub fn parse_records(
    path: &Path,
    selector: &SheetSelector,
    shape: &RecordShape,
) -> Result<Vec<DynamicRecord>> {
    let sheet = NormalizedSheet::open_selected(path, selector)?;
    let records = schema::apply_shape(shape, &sheet)?;
    info!(sheet = sheet.name(), records = records.len(), "records parsed");
    Ok(records)
}

/// Writes records as pretty JSON to `output`, or to stdout when absent.
pub fn write_records_json(records: &[DynamicRecord], output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    match output {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

/// Settings for [`aggregate_files`].
#[derive(Debug, Clone, Default)]
pub struct AggregateRequest {
    pub inputs: Vec<PathBuf>,
    /// Sheet read from every input; every sheet of every input when absent.
    pub sheet: Option<SheetSelector>,
    pub start_row: usize,
    pub start_col: usize,
    /// Keep only the left-most of repeated header columns.
    pub dedupe: bool,
    pub format: ValueFormat,
    pub output: PathBuf,
    pub options: WriteOptions,
}

/// Aggregates sheets across files and writes the result to one sheet.
#[instrument(level = "info", skip_all, fields(inputs = request.inputs.len(), output = %request.output.display()))]
pub fn aggregate_files(request: &AggregateRequest) -> Result<AggregatedResult> {
    let mut sheets = Vec::new();
    for path in &request.inputs {
        match &request.sheet {
            Some(selector) => sheets.push(NormalizedSheet::open_selected(path, selector)?),
            None => {
                let parsed = ParsedFile::open(path)?;
                for failed in parsed.failed() {
                    warn!(file = parsed.name(), sheet = %failed.name, reason = %failed.reason, "sheet not aggregated");
                }
                sheets.extend(parsed.into_sheets());
            }
        }
    }

    if request.dedupe {
        for sheet in &mut sheets {
            if request.start_row < sheet.original().len() {
                let removed = sheet
                    .remove_right_duplicate_columns_from(request.start_row, request.start_col)?;
                if removed > 0 {
                    warn!(sheet = sheet.name(), removed, "repeated header columns dropped");
                }
            }
        }
    }

    let inputs: Vec<AggregateInput<'_>> = sheets
        .iter()
        .map(|sheet| AggregateInput::starting_at(sheet, request.start_row, request.start_col))
        .collect();
    let result = aggregate::aggregate(&inputs)?;

    let mut writer = FileWriter::new();
    writer
        .write_filtered(
            AGGREGATED_SHEET,
            &result.table_header(),
            result.to_table(request.format),
        )?
        .freeze_header = true;
    writer.save(&request.output, request.options)?;

    info!(rows = result.rows.len(), columns = result.header.len(), "aggregation written");
    Ok(result)
}

/// Detail columns of the index sheet written by [`index_files`].
pub const INDEX_DETAIL_COLUMNS: [&str; 2] = ["FILE_NAME", "SHEET_NAME"];

/// Copies every readable sheet of the inputs into one workbook with a
/// hyperlinked index, returning the number of sheets written.
#[instrument(level = "info", skip_all, fields(inputs = inputs.len(), output = %output.display()))]
pub fn index_files(inputs: &[PathBuf], output: &Path, options: WriteOptions) -> Result<usize> {
    let mut writer = IndexedWriter::new(&INDEX_DETAIL_COLUMNS)?;
    for path in inputs {
        let parsed = ParsedFile::open(path)?;
        for failed in parsed.failed() {
            warn!(file = parsed.name(), sheet = %failed.name, reason = %failed.reason, "sheet not indexed");
        }
        for sheet in parsed.sheets() {
            let rows = sheet.original().get(1..).unwrap_or(&[]);
            let tab = writer.write_text_sheet(
                sheet.header(),
                rows,
                vec![
                    CellValue::from(parsed.name()),
                    CellValue::from(sheet.name()),
                ],
            )?;
            debug!(tab = %tab, sheet = sheet.name(), "sheet indexed");
        }
    }
    writer.save(output, options)?;
    info!(sheets = writer.sheet_count(), "index written");
    Ok(writer.sheet_count())
}
