//! Reading cells at full numeric precision.
//!
//! A cell may display a rounded number or a formatted date. To read the value
//! as stored, the cell is briefly restyled with a fixed, high-precision number
//! format, read, and restored to its original style. Restoration happens in a
//! drop guard so it runs on every exit path.

use tracing::warn;

use crate::error::Result;
use crate::workbook::{NumberFormat, StyleId, Workbook};

/// Reads cells of one workbook under a maximum precision number style.
///
/// The reader holds the workbook mutably for its whole lifetime, so no other
/// pass can observe or race with the temporary styling.
pub struct PrecisionReader<'w, W: Workbook + ?Sized> {
    workbook: &'w mut W,
    style: StyleId,
}

impl<'w, W: Workbook + ?Sized> PrecisionReader<'w, W> {
    /// Registers the precision style with the workbook, or reuses it.
    pub fn new(workbook: &'w mut W) -> Self {
        let style = workbook.add_style(NumberFormat::precision());
        Self { workbook, style }
    }

    /// Text of a cell rendered under the precision style.
    pub fn read(&mut self, sheet: &str, row: usize, col: usize) -> Result<String> {
        let guard = StyleGuard::acquire(&mut *self.workbook, sheet, row, col)?;
        guard.workbook.set_cell_style(sheet, row, col, self.style)?;
        guard.workbook.read_cell(sheet, row, col)
    }

    /// Text of a cell under its own style.
    pub fn read_original(&self, sheet: &str, row: usize, col: usize) -> Result<String> {
        self.workbook.read_cell(sheet, row, col)
    }
}

struct StyleGuard<'a, W: Workbook + ?Sized> {
    workbook: &'a mut W,
    sheet: &'a str,
    row: usize,
    col: usize,
    original: StyleId,
}

impl<'a, W: Workbook + ?Sized> StyleGuard<'a, W> {
    fn acquire(workbook: &'a mut W, sheet: &'a str, row: usize, col: usize) -> Result<Self> {
        let original = workbook.cell_style(sheet, row, col)?;
        Ok(Self {
            workbook,
            sheet,
            row,
            col,
            original,
        })
    }
}

impl<W: Workbook + ?Sized> Drop for StyleGuard<'_, W> {
    fn drop(&mut self) {
        if let Err(error) =
            self.workbook
                .set_cell_style(self.sheet, self.row, self.col, self.original)
        {
            warn!(
                sheet = self.sheet,
                row = self.row,
                col = self.col,
                %error,
                "failed to restore cell style"
            );
        }
    }
}
