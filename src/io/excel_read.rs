use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook as open_xlsx};
use tracing::debug;

use crate::error::{Result, SheetError};
use crate::workbook::memory::GENERAL_STYLE;
use crate::workbook::value::{DATE_PATTERN, DATETIME_PATTERN};
use crate::workbook::{CellValue, MemoryWorkbook, NumberFormat, StyleId, Workbook};

struct DateStyles {
    date: StyleId,
    datetime: StyleId,
}

/// Loads every sheet of an xlsx file into memory.
///
/// Numbers keep the general style, date-formatted numbers keep their serial
/// value with a date style, and every other cell type is loaded as text.
pub fn open_workbook(path: &Path) -> Result<MemoryWorkbook> {
    if !path.exists() {
        return Err(SheetError::MissingInput(path.to_path_buf()));
    }
    let mut source: Xlsx<_> = open_xlsx(path)?;
    let mut workbook = MemoryWorkbook::new();
    let styles = DateStyles {
        date: workbook.add_style(NumberFormat::Date(DATE_PATTERN.to_string())),
        datetime: workbook.add_style(NumberFormat::Date(DATETIME_PATTERN.to_string())),
    };

    let names = source.sheet_names().to_vec();
    for name in names {
        let range = source
            .worksheet_range(&name)
            .ok_or_else(|| SheetError::MissingSheet {
                sheet: name.clone(),
            })??;
        workbook.add_sheet(name.as_str())?;
        load_range(&mut workbook, &name, &range, &styles)?;
        debug!(sheet = %name, size = ?range.get_size(), "sheet loaded");
    }

    Ok(workbook)
}

fn load_range(
    workbook: &mut MemoryWorkbook,
    sheet: &str,
    range: &Range<DataType>,
    styles: &DateStyles,
) -> Result<()> {
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    for (row_offset, row) in range.rows().enumerate() {
        for (col_offset, cell) in row.iter().enumerate() {
            let Some((value, style)) = cell_value(cell, styles) else {
                continue;
            };
            workbook.put_cell(
                sheet,
                start_row as usize + row_offset,
                start_col as usize + col_offset,
                value,
                style,
            )?;
        }
    }
    Ok(())
}

fn cell_value(cell: &DataType, styles: &DateStyles) -> Option<(CellValue, StyleId)> {
    match cell {
        DataType::Empty => None,
        DataType::String(value) if value.is_empty() => None,
        DataType::String(value) => Some((CellValue::Text(value.clone()), GENERAL_STYLE)),
        DataType::Int(value) => Some((CellValue::Integer(*value), GENERAL_STYLE)),
        DataType::Float(value) => Some((CellValue::Decimal(*value), GENERAL_STYLE)),
        DataType::DateTime(serial) => {
            let style = if serial.fract() == 0.0 {
                styles.date
            } else {
                styles.datetime
            };
            Some((CellValue::Decimal(*serial), style))
        }
        DataType::Bool(value) => {
            let text = if *value { "TRUE" } else { "FALSE" };
            Some((CellValue::Text(text.to_string()), GENERAL_STYLE))
        }
        other => Some((CellValue::Text(other.to_string()), GENERAL_STYLE)),
    }
}
