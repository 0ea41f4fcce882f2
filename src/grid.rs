//! Shaping of ragged rows into a rectangular table region.

/// Number of leading non-empty cells of the header row (row 0).
///
/// Returns 0 when the grid has no rows or the header row starts with an empty
/// cell, which callers treat as "no header".
pub fn column_count<S: AsRef<str>>(grid: &[Vec<S>]) -> usize {
    grid.first()
        .map(|header| {
            header
                .iter()
                .take_while(|cell| !cell.as_ref().is_empty())
                .count()
        })
        .unwrap_or(0)
}

/// Whether a row holds no data within the first `width` cells.
///
/// A row with fewer than `width` cells is treated as blank.
pub fn row_is_blank<S: AsRef<str>>(row: &[S], width: usize) -> bool {
    if row.len() < width {
        return true;
    }
    row[..width].iter().all(|cell| cell.as_ref().is_empty())
}

/// Pads or truncates a row to exactly `width` cells.
pub fn shape_row(mut row: Vec<String>, width: usize) -> Vec<String> {
    row.resize(width, String::new());
    row
}

/// Shapes every row to the header's column count and drops the run of blank
/// rows at the end of the grid. The header row is kept as row 0.
pub fn normalize(grid: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let width = column_count(&grid);
    let mut rows: Vec<Vec<String>> = grid
        .into_iter()
        .map(|row| shape_row(row, width))
        .collect();
    trim_trailing_blank_rows(&mut rows, width);
    rows
}

/// Shapes `grid` into exactly `height` rows of `width` cells, padding missing
/// rows with empty text. Used to keep a second rendering of a sheet aligned
/// with an already normalized one.
pub fn fit(grid: Vec<Vec<String>>, height: usize, width: usize) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = grid
        .into_iter()
        .take(height)
        .map(|row| shape_row(row, width))
        .collect();
    rows.resize_with(height, || vec![String::new(); width]);
    rows
}

fn trim_trailing_blank_rows(rows: &mut Vec<Vec<String>>, width: usize) {
    while rows
        .last()
        .is_some_and(|row| row[..width].iter().all(String::is_empty))
    {
        rows.pop();
    }
}
