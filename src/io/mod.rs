//! xlsx adapters for the workbook boundary.

pub mod excel_read;
pub mod excel_write;
