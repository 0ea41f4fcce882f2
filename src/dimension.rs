use serde::{Deserialize, Serialize};

use crate::error::{Result, SheetError};
use crate::grid;

/// Bounding box of the contiguous table at the top-left of a sheet.
///
/// `column_count` is the number of values in the header row. `row_count` is
/// the number of consecutive rows below the header that are not blank under
/// the `column_count` prefix; rows after the first blank row are never
/// counted, even when they hold data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableDimension {
    pub row_count: usize,
    pub column_count: usize,
}

impl TableDimension {
    /// Infers the dimension of a raw, possibly ragged grid.
    ///
    /// Fails with [`SheetError::NoHeaderRow`] when the header row is absent or
    /// starts with an empty cell.
    pub fn infer<S: AsRef<str>>(grid: &[Vec<S>]) -> Result<Self> {
        let column_count = grid::column_count(grid);
        if column_count == 0 {
            return Err(SheetError::NoHeaderRow);
        }
        let row_count = grid
            .iter()
            .skip(1)
            .take_while(|row| !grid::row_is_blank(row, column_count))
            .count();
        Ok(Self {
            row_count,
            column_count,
        })
    }
}
