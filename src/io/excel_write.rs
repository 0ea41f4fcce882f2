use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::debug;

use crate::error::{Result, SheetError};
use crate::serial;
use crate::workbook::CellValue;

/// Name of the sheet listing every tab written by an [`IndexedWriter`].
pub const INDEX_SHEET: &str = "INDEX";
/// First column of the index sheet.
pub const TAB_NAME_COLUMN: &str = "TAB_NAME";

const DATETIME_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Controls how [`FileWriter::save`] treats an existing destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub overwrite: bool,
}

/// Hyperlink written over a cell when the workbook is saved.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub row: u32,
    pub col: u16,
    pub target: String,
    pub text: String,
}

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub freeze_header: bool,
    pub autofilter: bool,
    pub links: Vec<Link>,
}

impl SheetTable {
    fn new(sheet_name: &str, columns: &[String], rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            columns: columns.to_vec(),
            rows,
            freeze_header: false,
            autofilter: false,
            links: Vec::new(),
        }
    }
}

/// Collects sheets in memory and writes them out as one xlsx file.
#[derive(Debug, Clone, Default)]
pub struct FileWriter {
    tables: Vec<SheetTable>,
}

impl FileWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sheet with a header row followed by typed rows.
    pub fn write_rows(
        &mut self,
        sheet: &str,
        header: &[String],
        rows: Vec<Vec<CellValue>>,
    ) -> Result<&mut SheetTable> {
        if self.table(sheet).is_some() {
            return Err(SheetError::SheetExists(sheet.to_string()));
        }
        self.tables.push(SheetTable::new(sheet, header, rows));
        let index = self.tables.len() - 1;
        Ok(&mut self.tables[index])
    }

    /// Adds a sheet from display text, inferring a cell type for every value.
    pub fn write_text_rows(
        &mut self,
        sheet: &str,
        header: &[String],
        rows: &[Vec<String>],
    ) -> Result<&mut SheetTable> {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|text| CellValue::infer(text)).collect())
            .collect();
        self.write_rows(sheet, header, rows)
    }

    /// Adds a sheet with an autofilter over its header and rows.
    ///
    /// No Excel table object is created, so header names may repeat or differ
    /// only by case.
    pub fn write_filtered(
        &mut self,
        sheet: &str,
        header: &[String],
        rows: Vec<Vec<CellValue>>,
    ) -> Result<&mut SheetTable> {
        let table = self.write_rows(sheet, header, rows)?;
        table.autofilter = true;
        Ok(table)
    }

    /// Freezes the header row of a sheet already added to the writer.
    pub fn freeze_top_row(&mut self, sheet: &str) -> Result<()> {
        self.table_mut(sheet)?.freeze_header = true;
        Ok(())
    }

    pub fn table(&self, sheet: &str) -> Option<&SheetTable> {
        self.tables.iter().find(|table| table.sheet_name == sheet)
    }

    pub fn tables(&self) -> &[SheetTable] {
        &self.tables
    }

    fn table_mut(&mut self, sheet: &str) -> Result<&mut SheetTable> {
        self.tables
            .iter_mut()
            .find(|table| table.sheet_name == sheet)
            .ok_or_else(|| SheetError::MissingSheet {
                sheet: sheet.to_string(),
            })
    }

    /// Writes every collected sheet to `path`.
    ///
    /// Fails with [`SheetError::OverwriteRefused`] when the path exists and
    /// overwriting is disabled.
    pub fn save(&self, path: &Path, options: WriteOptions) -> Result<()> {
        if path.exists() && !options.overwrite {
            return Err(SheetError::OverwriteRefused(path.to_path_buf()));
        }

        let mut workbook_writer = Workbook::new();
        let datetime_format = Format::new().set_num_format(DATETIME_NUM_FORMAT);

        for table in &self.tables {
            let worksheet = workbook_writer.add_worksheet();
            worksheet.set_name(&table.sheet_name)?;
            write_table(worksheet, table, &datetime_format)?;
        }

        workbook_writer.save(path)?;
        debug!(path = %path.display(), sheets = self.tables.len(), "workbook saved");
        Ok(())
    }
}

fn write_table(worksheet: &mut Worksheet, table: &SheetTable, datetime_format: &Format) -> Result<()> {
    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, header)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let (row_num, col_num) = ((row_idx + 1) as u32, col_idx as u16);
            match cell {
                CellValue::Text(text) if text.is_empty() => {}
                CellValue::Text(text) => {
                    worksheet.write_string(row_num, col_num, text)?;
                }
                CellValue::Integer(value) => {
                    worksheet.write_number(row_num, col_num, *value as f64)?;
                }
                CellValue::Decimal(value) => {
                    worksheet.write_number(row_num, col_num, *value)?;
                }
                CellValue::Timestamp(datetime) => {
                    worksheet.write_number_with_format(
                        row_num,
                        col_num,
                        serial::from_datetime(datetime),
                        datetime_format,
                    )?;
                }
            }
        }
    }

    for link in &table.links {
        worksheet.write_url_with_text(link.row, link.col, link.target.as_str(), link.text.as_str())?;
    }

    if table.freeze_header {
        worksheet.set_freeze_panes(1, 0)?;
    }

    if table.autofilter && !table.columns.is_empty() {
        let col_end = (table.columns.len() as u16).saturating_sub(1);
        worksheet.autofilter(0, 0, table.rows.len() as u32, col_end)?;
    }

    Ok(())
}

/// Writes tabs named by ordinal (`1`, `2`, ...) and keeps an index sheet that
/// links to each of them, with caller supplied detail columns.
#[derive(Debug, Clone)]
pub struct IndexedWriter {
    writer: FileWriter,
    detail_columns: usize,
    sheet_count: usize,
}

impl IndexedWriter {
    /// Creates the writer and its index sheet, whose header is
    /// [`TAB_NAME_COLUMN`] followed by `detail_columns`.
    pub fn new(detail_columns: &[&str]) -> Result<Self> {
        let mut header = vec![TAB_NAME_COLUMN.to_string()];
        header.extend(detail_columns.iter().map(|column| column.to_string()));

        let mut writer = FileWriter::new();
        writer.write_rows(INDEX_SHEET, &header, Vec::new())?;
        writer.freeze_top_row(INDEX_SHEET)?;
        Ok(Self {
            writer,
            detail_columns: detail_columns.len(),
            sheet_count: 0,
        })
    }

    /// Adds a data tab plus its index row and navigation links, returning the
    /// name given to the tab. Details beyond the declared detail columns are
    /// ignored.
    pub fn write_sheet(
        &mut self,
        header: &[String],
        rows: Vec<Vec<CellValue>>,
        details: Vec<CellValue>,
    ) -> Result<String> {
        let sheet_name = (self.sheet_count + 1).to_string();
        let index_row = (self.sheet_count + 1) as u32;

        let table = self.writer.write_rows(&sheet_name, header, rows)?;
        table.freeze_header = true;
        if let Some(first) = header.first() {
            table.links.push(Link {
                row: 0,
                col: 0,
                target: format!("internal:'{INDEX_SHEET}'!A{}", index_row + 1),
                text: first.clone(),
            });
        }

        let index = self.writer.table_mut(INDEX_SHEET)?;
        let mut entry = vec![CellValue::Text(sheet_name.clone())];
        entry.extend(details.into_iter().take(self.detail_columns));
        index.rows.push(entry);
        index.links.push(Link {
            row: index_row,
            col: 0,
            target: format!("internal:'{sheet_name}'!A1"),
            text: sheet_name.clone(),
        });

        self.sheet_count += 1;
        Ok(sheet_name)
    }

    /// Adds a data tab from display text, inferring a cell type per value.
    pub fn write_text_sheet(
        &mut self,
        header: &[String],
        rows: &[Vec<String>],
        details: Vec<CellValue>,
    ) -> Result<String> {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|text| CellValue::infer(text)).collect())
            .collect();
        self.write_sheet(header, rows, details)
    }

    pub fn sheet_count(&self) -> usize {
        self.sheet_count
    }

    pub fn writer(&self) -> &FileWriter {
        &self.writer
    }

    pub fn save(&self, path: &Path, options: WriteOptions) -> Result<()> {
        self.writer.save(path, options)
    }
}
