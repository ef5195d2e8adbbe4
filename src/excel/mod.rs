//! Excel export module
//!
//! Writes named frames to an Excel (.xlsx) workbook, one worksheet per frame.

mod exporter;

pub use exporter::{dataframes_to_excel, ExcelExporter, IndexPolicy};
