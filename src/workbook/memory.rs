use crate::error::{Result, SheetError};
use crate::workbook::{CellValue, NumberFormat, RawGrid, StyleId, Workbook};

/// Style every cell starts with.
pub const GENERAL_STYLE: StyleId = 0;

/// A single stored cell: an optional value plus the style it is shown with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub value: Option<CellValue>,
    pub style: StyleId,
}

#[derive(Debug, Clone, PartialEq)]
struct MemorySheet {
    name: String,
    rows: Vec<Vec<Cell>>,
}

/// Workbook held entirely in memory.
///
/// Sheets keep insertion order and rows are stored densely but may be ragged.
/// Style `0` is always [`NumberFormat::General`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryWorkbook {
    sheets: Vec<MemorySheet>,
    styles: Vec<NumberFormat>,
}

impl Default for MemoryWorkbook {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWorkbook {
    /// Creates an empty workbook with only the general style registered.
    pub fn new() -> Self {
        Self {
            sheets: Vec::new(),
            styles: vec![NumberFormat::General],
        }
    }

    /// Adds an empty sheet.
    pub fn add_sheet(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.sheet(&name).is_ok() {
            return Err(SheetError::SheetExists(name));
        }
        self.sheets.push(MemorySheet {
            name,
            rows: Vec::new(),
        });
        Ok(())
    }

    /// Adds a sheet populated with text cells. Empty strings leave the cell
    /// empty.
    pub fn add_text_sheet<S: AsRef<str>>(&mut self, name: &str, rows: &[Vec<S>]) -> Result<()> {
        self.add_sheet(name)?;
        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, text) in row.iter().enumerate() {
                let text = text.as_ref();
                if !text.is_empty() {
                    self.put_cell(name, row_idx, col_idx, CellValue::from(text), GENERAL_STYLE)?;
                }
            }
        }
        Ok(())
    }

    /// Stores a value with an explicit style.
    pub fn put_cell(
        &mut self,
        sheet: &str,
        row: usize,
        col: usize,
        value: CellValue,
        style: StyleId,
    ) -> Result<()> {
        self.ensure_style(style)?;
        let cell = self.cell_mut(sheet, row, col)?;
        cell.value = Some(value);
        cell.style = style;
        Ok(())
    }

    /// Format registered under a style identifier.
    pub fn style_format(&self, style: StyleId) -> Option<&NumberFormat> {
        self.styles.get(style)
    }

    /// Number of registered styles, the general style included.
    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// Number of rows stored for a sheet, including empty ones.
    pub fn stored_rows(&self, sheet: &str) -> Result<usize> {
        Ok(self.sheet(sheet)?.rows.len())
    }

    fn ensure_style(&self, style: StyleId) -> Result<()> {
        if style < self.styles.len() {
            Ok(())
        } else {
            Err(SheetError::UnknownStyle(style))
        }
    }

    fn sheet(&self, name: &str) -> Result<&MemorySheet> {
        self.sheets
            .iter()
            .find(|sheet| sheet.name == name)
            .ok_or_else(|| SheetError::MissingSheet {
                sheet: name.to_string(),
            })
    }

    fn cell(&self, sheet: &str, row: usize, col: usize) -> Result<Option<&Cell>> {
        Ok(self
            .sheet(sheet)?
            .rows
            .get(row)
            .and_then(|cells| cells.get(col)))
    }

    fn cell_mut(&mut self, sheet: &str, row: usize, col: usize) -> Result<&mut Cell> {
        let sheet = self
            .sheets
            .iter_mut()
            .find(|candidate| candidate.name == sheet)
            .ok_or_else(|| SheetError::MissingSheet {
                sheet: sheet.to_string(),
            })?;
        if sheet.rows.len() <= row {
            sheet.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut sheet.rows[row];
        if cells.len() <= col {
            cells.resize_with(col + 1, Cell::default);
        }
        Ok(&mut cells[col])
    }

    fn render(&self, cell: &Cell) -> String {
        match &cell.value {
            Some(value) => self
                .styles
                .get(cell.style)
                .unwrap_or(&NumberFormat::General)
                .render(value),
            None => String::new(),
        }
    }
}

impl Workbook for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|sheet| sheet.name.clone()).collect()
    }

    fn read_rows(&self, sheet: &str) -> Result<RawGrid> {
        let mut grid: RawGrid = self
            .sheet(sheet)?
            .rows
            .iter()
            .map(|cells| {
                let mut row: Vec<String> = cells.iter().map(|cell| self.render(cell)).collect();
                while row.last().is_some_and(String::is_empty) {
                    row.pop();
                }
                row
            })
            .collect();
        while grid.last().is_some_and(Vec::is_empty) {
            grid.pop();
        }
        Ok(grid)
    }

    fn read_cell(&self, sheet: &str, row: usize, col: usize) -> Result<String> {
        Ok(self
            .cell(sheet, row, col)?
            .map(|cell| self.render(cell))
            .unwrap_or_default())
    }

    fn write_cell(&mut self, sheet: &str, row: usize, col: usize, value: CellValue) -> Result<()> {
        self.cell_mut(sheet, row, col)?.value = Some(value);
        Ok(())
    }

    fn cell_style(&self, sheet: &str, row: usize, col: usize) -> Result<StyleId> {
        Ok(self
            .cell(sheet, row, col)?
            .map(|cell| cell.style)
            .unwrap_or(GENERAL_STYLE))
    }

    fn set_cell_style(
        &mut self,
        sheet: &str,
        row: usize,
        col: usize,
        style: StyleId,
    ) -> Result<()> {
        self.ensure_style(style)?;
        self.cell_mut(sheet, row, col)?.style = style;
        Ok(())
    }

    fn add_style(&mut self, format: NumberFormat) -> StyleId {
        if let Some(existing) = self.styles.iter().position(|style| *style == format) {
            return existing;
        }
        self.styles.push(format);
        self.styles.len() - 1
    }
}
