//! Frame Export - named in-memory tables to Excel and SQLite
//!
//! This library writes a collection of named tables either to a multi-sheet
//! Excel workbook or to tables of a SQLite database file.
//!
//! # Features
//!
//! - One worksheet per table, index columns included or omitted by label type
//! - Multi-level row labels and column headers, never merged
//! - One SQLite table per frame with append or replace semantics
//! - Optional drop of every existing table before writing
//!
//! # Example
//!
//! ```no_run
//! use frame_export::{dataframes_to_db, dataframes_to_excel};
//! use frame_export::types::{Column, ColumnValue, DataFrame};
//!
//! let mut sales = DataFrame::new();
//! sales.add_column(Column::new(
//!     "revenue".to_string(),
//!     ColumnValue::Number(vec![100.0, 200.0]),
//! ));
//!
//! let frames = vec![("sales", sales)];
//! dataframes_to_excel(frames.iter().map(|(n, df)| (n, df)), "out/report.xlsx")?;
//! dataframes_to_db(frames, "out/report.db", false, false)?;
//! # Ok::<(), frame_export::error::ExportError>(())
//! ```

pub mod db;
pub mod error;
pub mod excel;
pub mod types;

mod paths;

// Re-export commonly used types
pub use db::{dataframes_to_db, dataframes_to_db_with, DbExportOptions, IfExists};
pub use error::{ExportError, ExportResult};
pub use excel::{dataframes_to_excel, IndexPolicy};
pub use types::{Column, ColumnValue, DataFrame, IndexLevel, RowIndex};
