use chrono::{NaiveDate, NaiveDateTime};
use sheetwise::record_shape;
use sheetwise::schema::coerce::coerce_cell;
use sheetwise::schema::{
    self, ColumnIndexMap, DecimalField, FieldKind, FieldRegistry, IntegerField, Record,
    RecordShape, TextField, TimestampField, TypedFieldValue,
};
use sheetwise::workbook::NumberFormat;
use sheetwise::workbook::memory::GENERAL_STYLE;
use sheetwise::{CellValue, MemoryWorkbook, NormalizedSheet, SheetError, Workbook};

#[derive(Debug, Default)]
struct Trade {
    id: IntegerField,
    desk: TextField,
    price: DecimalField,
    traded: TimestampField,
    note: String,
}

record_shape! {
    Trade {
        id: IntegerField => "ID",
        desk: TextField => "DESK",
        price: DecimalField => "PRICE",
        traded: TimestampField => "TRADED",
        note: String,
    }
}

#[derive(Debug, Default)]
struct Mistyped {
    name: String,
}

record_shape! {
    Mistyped {
        name: String => "NAME",
    }
}

fn datetime(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .expect("valid date")
}

fn header(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Sheet whose PRICE column is displayed with two decimals and whose TRADED
/// column is displayed as a date.
fn trades_sheet() -> NormalizedSheet {
    let mut workbook = MemoryWorkbook::new();
    let two_places = workbook.add_style(NumberFormat::Fixed(2));
    let date = workbook.add_style(NumberFormat::Date("%Y-%m-%d".to_string()));
    workbook
        .add_text_sheet("Trades", &[vec!["ID", "DESK", "PRICE", "TRADED", "COMMENT"]])
        .expect("sheet added");

    let rows = [
        (CellValue::Integer(7), "rates", 12.3456789, 44143.5),
        (CellValue::from("n/a"), "fx", 0.5, 44144.0),
    ];
    for (offset, (id, desk, price, traded)) in rows.into_iter().enumerate() {
        let row = offset + 1;
        workbook
            .put_cell("Trades", row, 0, id, GENERAL_STYLE)
            .expect("id stored");
        workbook
            .put_cell("Trades", row, 1, CellValue::from(desk), GENERAL_STYLE)
            .expect("desk stored");
        workbook
            .put_cell("Trades", row, 2, CellValue::Decimal(price), two_places)
            .expect("price stored");
        workbook
            .put_cell("Trades", row, 3, CellValue::Decimal(traded), date)
            .expect("traded stored");
    }

    NormalizedSheet::read(&mut workbook, "Trades").expect("sheet normalized")
}

#[test]
fn macro_declares_fields_in_order() {
    let shape = Trade::shape();

    assert_eq!(shape.name(), "Trade");
    let names: Vec<&str> = shape.fields().iter().map(|field| field.name.as_str()).collect();
    assert_eq!(names, ["id", "desk", "price", "traded", "note"]);
    assert_eq!(shape.fields()[4].tag, None);
}

#[test]
fn registry_maps_tags_positions_and_kinds() {
    let registry = FieldRegistry::build(&Trade::shape()).expect("registry built");

    assert_eq!(registry.len(), 4);
    assert_eq!(registry.position("PRICE"), Some(2));
    assert_eq!(registry.tag(3), Some("TRADED"));
    assert_eq!(registry.kind(0), Some(FieldKind::Integer));
    assert_eq!(registry.position("note"), None);
    assert_eq!(registry.kind(4), None);
}

#[test]
fn registry_construction_is_idempotent() {
    let first = FieldRegistry::build(&Trade::shape()).expect("first build");
    let second = FieldRegistry::build(&Trade::shape()).expect("second build");

    assert_eq!(first, second);
}

#[test]
fn repeated_tag_is_rejected() {
    let shape = RecordShape::new("Pair")
        .tagged("left", "KEY", FieldKind::Text)
        .tagged("right", "KEY", FieldKind::Integer);

    let error = FieldRegistry::build(&shape).expect_err("duplicate tag");

    assert!(matches!(error, SheetError::DuplicateTagName { tag } if tag == "KEY"));
}

#[test]
fn tagged_field_with_plain_type_is_rejected() {
    let error = FieldRegistry::build(&Mistyped::shape()).expect_err("invalid kind");

    assert!(matches!(
        error,
        SheetError::InvalidTaggedKind { field, declared } if field == "name" && declared == "String"
    ));
}

#[test]
fn resolution_is_a_bijection_when_every_tag_occurs_once() {
    let registry = FieldRegistry::build(&Trade::shape()).expect("registry built");
    let sheet_header = header(&["X", "TRADED", "X", "ID", "PRICE", "DESK"]);

    let columns = ColumnIndexMap::resolve(&registry, &sheet_header).expect("resolved");

    assert_eq!(
        columns.iter().collect::<Vec<_>>(),
        vec![(0, 3), (1, 5), (2, 4), (3, 1)]
    );
}

#[test]
fn missing_tagged_header_fails_resolution() {
    let registry = FieldRegistry::build(&Trade::shape()).expect("registry built");
    let sheet_header = header(&["ID", "DESK", "TRADED"]);

    let error = ColumnIndexMap::resolve(&registry, &sheet_header).expect_err("missing header");

    assert!(matches!(error, SheetError::TaggedHeaderMissing { tag } if tag == "PRICE"));
}

#[test]
fn duplicated_tagged_header_fails_resolution() {
    let registry = FieldRegistry::build(&Trade::shape()).expect("registry built");
    let sheet_header = header(&["ID", "DESK", "PRICE", "TRADED", "DESK"]);

    let error = ColumnIndexMap::resolve(&registry, &sheet_header).expect_err("duplicate header");

    assert!(matches!(
        error,
        SheetError::TaggedHeaderDuplicated { tag, count } if tag == "DESK" && count == 2
    ));
}

#[test]
fn numeric_kinds_keep_raw_text_on_failure() {
    for kind in [FieldKind::Integer, FieldKind::Decimal, FieldKind::Timestamp] {
        let value = coerce_cell(kind, "pending", "pending");
        assert_eq!(value.kind(), kind);
        assert!(!value.is_success());
        assert_eq!(value.raw_text(), "pending");
    }

    assert_eq!(
        coerce_cell(FieldKind::Integer, "", ""),
        TypedFieldValue::Integer {
            value: 0,
            raw: String::new(),
            success: false
        }
    );
}

#[test]
fn text_never_fails_and_uses_displayed_text() {
    let value = coerce_cell(FieldKind::Text, "1.23", "1.234567000000000");

    assert!(value.is_success());
    assert_eq!(
        value,
        TypedFieldValue::Text {
            value: "1.23".to_string()
        }
    );
}

#[test]
fn integer_truncates_toward_zero() {
    let value = coerce_cell(FieldKind::Integer, "-4", "-3.900000000000000");

    assert_eq!(
        value,
        TypedFieldValue::Integer {
            value: -3,
            raw: "-3.900000000000000".to_string(),
            success: true
        }
    );
}

#[test]
fn timestamp_reads_serial_days() {
    let value = coerce_cell(FieldKind::Timestamp, "2020-11-08", "44143");

    assert_eq!(
        value,
        TypedFieldValue::Timestamp {
            value: datetime(2020, 11, 8, 0),
            raw: "44143".to_string(),
            success: true
        }
    );
}

#[test]
fn records_are_populated_from_precision_values() {
    let sheet = trades_sheet();

    let trades: Vec<Trade> = schema::apply(&sheet).expect("records read");

    assert_eq!(trades.len(), 2);
    let first = &trades[0];
    assert_eq!(first.id.value, 7);
    assert!(first.id.success);
    assert_eq!(first.id.header, "ID");
    assert_eq!(first.desk.value, "rates");
    assert!((first.price.value - 12.3456789).abs() < 1e-12);
    assert!(first.price.success);
    assert_eq!(first.traded.value, datetime(2020, 11, 8, 12));
    assert!(first.traded.success);
    assert!(first.note.is_empty());

    let second = &trades[1];
    assert!(!second.id.success);
    assert_eq!(second.id.raw, "n/a");
    assert_eq!(second.id.value, 0);
    assert!(second.price.success);
    assert_eq!(second.traded.value, datetime(2020, 11, 9, 0));
}

#[test]
fn populate_appends_and_leaves_records_untouched_on_failure() {
    let sheet = trades_sheet();
    let mut trades: Vec<Trade> = Vec::new();

    assert_eq!(schema::populate(&sheet, &mut trades).expect("first pass"), 2);
    assert_eq!(schema::populate(&sheet, &mut trades).expect("second pass"), 2);
    assert_eq!(trades.len(), 4);

    let missing = NormalizedSheet::from_grids(
        "Partial",
        vec![header(&["ID", "DESK"]), header(&["1", "a"])],
        vec![header(&["ID", "DESK"]), header(&["1", "a"])],
    )
    .expect("sheet built");
    let error = schema::populate(&missing, &mut trades).expect_err("missing headers");
    assert!(matches!(error, SheetError::TaggedHeaderMissing { .. }));
    assert_eq!(trades.len(), 4);
}

#[test]
fn records_stop_at_the_first_blank_row() {
    let rows = vec![header(&["ID"]), header(&["1"]), header(&[""]), header(&["2"])];
    let sheet = NormalizedSheet::from_grids("Gapped", rows.clone(), rows).expect("sheet built");
    let shape = RecordShape::new("Gapped").tagged("id", "ID", FieldKind::Integer);

    let records = schema::apply_shape(&shape, &sheet).expect("records read");

    assert_eq!(sheet.data_row_count(), 3);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].row, 1);
    assert!(matches!(
        records[0].get("ID"),
        Some(TypedFieldValue::Integer { value: 1, success: true, .. })
    ));
}

#[test]
fn json_shape_produces_dynamic_records() {
    let shape = RecordShape::from_json_str(
        r#"{
            "name": "trade",
            "fields": [
                {"name": "id", "tag": "ID", "kind": "integer"},
                {"name": "price", "tag": "PRICE", "kind": "decimal"},
                {"name": "memo", "kind": "whatever"}
            ]
        }"#,
    )
    .expect("shape parsed");
    let sheet = trades_sheet();

    let records = schema::apply_shape(&shape, &sheet).expect("records read");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].row, 1);
    assert_eq!(records[0].fields.len(), 2);
    assert!(matches!(
        records[0].get("ID"),
        Some(TypedFieldValue::Integer { value: 7, success: true, .. })
    ));
    assert!(matches!(
        records[1].get("ID"),
        Some(TypedFieldValue::Integer { success: false, .. })
    ));
    assert!(records[0].get("memo").is_none());
}

#[test]
fn json_shape_rejects_non_objects_and_unknown_tagged_kinds() {
    let error = RecordShape::from_json_str("[1, 2]").expect_err("not an object");
    assert!(matches!(error, SheetError::InvalidRecordShape(_)));

    let error = RecordShape::from_json_str(r#"{"name": "x"}"#).expect_err("no fields");
    assert!(matches!(error, SheetError::InvalidRecordShape(_)));

    let shape = RecordShape::from_json_str(
        r#"{"fields": [{"name": "flag", "tag": "FLAG", "kind": "boolean"}]}"#,
    )
    .expect("shape parsed");
    let error = FieldRegistry::build(&shape).expect_err("unsupported kind");
    assert!(matches!(
        error,
        SheetError::InvalidTaggedKind { declared, .. } if declared == "boolean"
    ));
}
