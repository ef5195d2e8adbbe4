//! SQLite export module
//!
//! Writes named frames to tables of a file-backed SQLite database with
//! append or replace semantics.

mod exporter;

pub use exporter::{
    dataframes_to_db, dataframes_to_db_with, table_names, DbExportOptions, DbExporter, IfExists,
};
