use std::path::Path;

use sheetwise::schema::TypedFieldValue;
use sheetwise::workbook::NumberFormat;
use sheetwise::{CellValue, MemoryWorkbook, NormalizedSheet, ParsedFile, SheetError, SheetSelector, Workbook};

fn grid(source: &[&[&str]]) -> Vec<Vec<String>> {
    source
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

fn labelled(source: &[&[&str]]) -> NormalizedSheet {
    let precision: Vec<Vec<String>> = grid(source)
        .into_iter()
        .map(|row| row.into_iter().map(|cell| format!("p:{cell}")).collect())
        .collect();
    NormalizedSheet::from_grids("Sheet1", grid(source), precision).expect("sheet built")
}

#[test]
fn ragged_rows_are_normalized_in_both_grids() {
    let sheet = NormalizedSheet::from_grids(
        "Sheet1",
        grid(&[&["A", "B"], &["1"], &["2", "3", "4"], &[]]),
        grid(&[&["A", "B"], &["1.0"]]),
    )
    .expect("sheet built");

    assert_eq!(sheet.original(), grid(&[&["A", "B"], &["1", ""], &["2", "3"]]));
    assert_eq!(sheet.precision(), grid(&[&["A", "B"], &["1.0", ""], &["", ""]]));
    assert_eq!(sheet.data_row_count(), 2);
}

#[test]
fn blank_header_is_rejected() {
    let error = NormalizedSheet::from_grids("Sheet1", grid(&[&["", "B"]]), Vec::new())
        .expect_err("no header");

    assert!(matches!(error, SheetError::NoHeaderRow));
}

#[test]
fn out_of_bounds_access_is_an_error() {
    let sheet = labelled(&[&["A", "B"], &["1", "2"]]);

    assert_eq!(sheet.text(1, 1).expect("in bounds"), "2");
    assert_eq!(sheet.precision_text(1, 0).expect("in bounds"), "p:1");
    assert!(matches!(
        sheet.text(2, 0),
        Err(SheetError::InvalidCellIndices { row: 2, column: 0 })
    ));
    assert!(matches!(
        sheet.decimal(0, 5),
        Err(SheetError::InvalidCellIndices { row: 0, column: 5 })
    ));
}

#[test]
fn typed_accessors_read_precision_text() {
    let sheet = NormalizedSheet::from_grids(
        "Sheet1",
        grid(&[&["N", "D"], &["1.50", "2020-11-08"]]),
        grid(&[&["N", "D"], &["1.499999999999999", "44143.000000000000000"]]),
    )
    .expect("sheet built");

    assert!(matches!(
        sheet.decimal(1, 0),
        Ok(TypedFieldValue::Decimal { value, success: true, .. }) if value == 1.499999999999999
    ));
    assert!(matches!(
        sheet.integer(1, 0),
        Ok(TypedFieldValue::Integer { value: 1, success: true, .. })
    ));
    assert!(matches!(
        sheet.timestamp(1, 1),
        Ok(TypedFieldValue::Timestamp { success: true, .. })
    ));
    assert!(matches!(
        sheet.timestamp(0, 1),
        Ok(TypedFieldValue::Timestamp { success: false, .. })
    ));
}

#[test]
fn duplicate_columns_are_removed_from_both_grids() {
    let mut sheet = labelled(&[&["A", "B", "A", "C", "B"], &["1", "2", "3", "4", "5"]]);

    let removed = sheet.remove_duplicate_columns(0).expect("columns removed");

    assert_eq!(removed, 4);
    assert_eq!(sheet.original(), grid(&[&["C"], &["4"]]));
    assert_eq!(sheet.precision(), grid(&[&["p:C"], &["p:4"]]));
}

#[test]
fn right_duplicates_keep_the_left_most_column() {
    let mut sheet = labelled(&[&["A", "B", "A", "C", "B"], &["1", "2", "3", "4", "5"]]);

    let removed = sheet.remove_right_duplicate_columns(0).expect("columns removed");

    assert_eq!(removed, 2);
    assert_eq!(sheet.header(), ["A", "B", "C"]);
    assert_eq!(sheet.original()[1], ["1", "2", "4"]);
    assert_eq!(sheet.precision()[1], ["p:1", "p:2", "p:4"]);
}

#[test]
fn right_duplicates_are_only_compared_from_the_first_column() {
    let mut sheet = labelled(&[&["A", "B", "A", "B"], &["1", "2", "3", "4"]]);

    let removed = sheet
        .remove_right_duplicate_columns_from(0, 1)
        .expect("columns removed");

    assert_eq!(removed, 1);
    assert_eq!(sheet.header(), ["A", "B", "A"]);
    assert_eq!(sheet.original()[1], ["1", "2", "3"]);
    assert_eq!(sheet.precision()[1], ["p:1", "p:2", "p:3"]);
}

#[test]
fn removal_row_must_exist() {
    let mut sheet = labelled(&[&["A"], &["1"]]);

    assert!(matches!(
        sheet.remove_duplicate_columns(5),
        Err(SheetError::InvalidCellIndices { row: 5, .. })
    ));
}

fn two_sheet_workbook() -> MemoryWorkbook {
    let mut workbook = MemoryWorkbook::new();
    workbook
        .add_text_sheet("Notes", &[vec!["", "loose"], vec!["text"]])
        .expect("notes added");
    workbook
        .add_text_sheet("Data", &[vec!["ID", "AMOUNT"], vec!["1", ""]])
        .expect("data added");
    let two_places = workbook.add_style(NumberFormat::Fixed(2));
    workbook
        .put_cell("Data", 1, 1, CellValue::Decimal(9.5), two_places)
        .expect("amount stored");
    workbook
}

#[test]
fn selectors_resolve_by_name_or_position() {
    let workbook = two_sheet_workbook();

    assert_eq!(
        SheetSelector::Index(1).resolve(&workbook, "book.xlsx").expect("resolved"),
        "Data"
    );
    assert_eq!(
        SheetSelector::Name("Notes".to_string())
            .resolve(&workbook, "book.xlsx")
            .expect("resolved"),
        "Notes"
    );
    assert!(matches!(
        SheetSelector::Index(2).resolve(&workbook, "book.xlsx"),
        Err(SheetError::SheetIndexOutOfRange { index: 2, .. })
    ));
}

#[test]
fn parsed_file_splits_readable_and_failed_sheets() {
    let mut workbook = two_sheet_workbook();

    let parsed = ParsedFile::from_workbook(&mut workbook, Path::new("/tmp/book.xlsx"));

    assert_eq!(parsed.name(), "book.xlsx");
    assert_eq!(parsed.failed().len(), 1);
    assert_eq!(parsed.failed()[0].name, "Notes");
    let data = parsed.sheet("Data").expect("data sheet parsed");
    assert_eq!(data.file_name(), Some("book.xlsx"));
    assert_eq!(data.text(1, 1).expect("amount"), "9.50");
    assert_eq!(data.precision_text(1, 1).expect("amount"), "9.500000000000000");
    assert_eq!(workbook.read_cell("Data", 1, 1).expect("restored"), "9.50");
}
