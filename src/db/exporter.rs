//! SQLite exporter implementation

use crate::error::ExportResult;
use crate::paths::ensure_parent_dir;
use crate::types::{ColumnValue, DataFrame};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Text layout of timestamps stored in `TIMESTAMP` columns
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Export named frames to tables of a SQLite database file.
///
/// With `drop_all_tables`, every existing table is dropped first. With
/// `append_data`, rows are added to same-named tables; otherwise those
/// tables are replaced. Row labels are never written.
pub fn dataframes_to_db<I, K, V, P>(
    dataframes: I,
    db_path: P,
    drop_all_tables: bool,
    append_data: bool,
) -> ExportResult<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Borrow<DataFrame>,
    P: AsRef<Path>,
{
    let options = DbExportOptions {
        drop_all_tables,
        if_exists: IfExists::from_append(append_data),
    };
    dataframes_to_db_with(dataframes, db_path, &options)
}

/// Same as [`dataframes_to_db`], with the policy given as options
pub fn dataframes_to_db_with<I, K, V, P>(
    dataframes: I,
    db_path: P,
    options: &DbExportOptions,
) -> ExportResult<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Borrow<DataFrame>,
    P: AsRef<Path>,
{
    DbExporter::new(db_path, *options).export(dataframes)
}

/// List the user tables of a SQLite database, sorted by name
///
/// The database is opened read-only; a missing file is an error.
pub fn table_names<P: AsRef<Path>>(db_path: P) -> ExportResult<Vec<String>> {
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    list_tables(&conn)
}

/// What to do when a same-named table already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IfExists {
    /// Keep existing rows and insert after them
    Append,
    /// Drop the table and recreate it
    #[default]
    Replace,
}

impl IfExists {
    pub fn from_append(append_data: bool) -> Self {
        if append_data {
            IfExists::Append
        } else {
            IfExists::Replace
        }
    }
}

/// Policy knobs for a database export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DbExportOptions {
    pub drop_all_tables: bool,
    pub if_exists: IfExists,
}

/// SQLite exporter for named frames
pub struct DbExporter {
    path: PathBuf,
    options: DbExportOptions,
}

impl DbExporter {
    pub fn new<P: AsRef<Path>>(path: P, options: DbExportOptions) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options,
        }
    }

    pub fn options(&self) -> &DbExportOptions {
        &self.options
    }

    /// Export the frames, one table per frame
    pub fn export<I, K, V>(&self, dataframes: I) -> ExportResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Borrow<DataFrame>,
    {
        ensure_parent_dir(&self.path)?;

        let mut conn = Connection::open(&self.path)?;

        if self.options.drop_all_tables {
            drop_all_tables(&conn)?;
        }

        let mut tables = 0usize;
        for (table_name, df) in dataframes {
            self.export_frame(&mut conn, table_name.as_ref(), df.borrow())?;
            tables += 1;
        }

        info!(
            path = %self.path.display(),
            tables,
            if_exists = ?self.options.if_exists,
            "SQLite export complete"
        );
        Ok(())
    }

    /// Write one frame inside its own transaction
    fn export_frame(
        &self,
        conn: &mut Connection,
        table_name: &str,
        df: &DataFrame,
    ) -> ExportResult<()> {
        df.validate_shape()?;

        let row_count = df.row_count();
        debug!(
            table = table_name,
            rows = row_count,
            columns = df.columns().len(),
            "Writing table"
        );

        let tx = conn.transaction()?;

        if self.options.if_exists == IfExists::Replace {
            execute(
                &tx,
                &format!("DROP TABLE IF EXISTS {}", quote_identifier(table_name)),
            )?;
        }
        execute(&tx, &create_table_sql(table_name, df))?;

        if row_count > 0 {
            let sql = insert_sql(table_name, df);
            debug!(sql = %sql, rows = row_count, "Executing statement");

            let mut stmt = tx.prepare(&sql)?;
            for row in 0..row_count {
                stmt.execute(params_from_iter(
                    df.columns().iter().map(|col| sql_value(&col.values, row)),
                ))?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

fn execute(conn: &Connection, sql: &str) -> ExportResult<()> {
    debug!(sql = %sql, "Executing statement");
    conn.execute(sql, [])?;
    Ok(())
}

/// User tables only: SQLite reserves the exact, case-sensitive `sqlite_` prefix
fn list_tables(conn: &Connection) -> ExportResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND substr(name, 1, 7) <> 'sqlite_' \
         ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

fn drop_all_tables(conn: &Connection) -> ExportResult<()> {
    let names = list_tables(conn)?;
    debug!(count = names.len(), "Dropping all tables");

    for name in &names {
        execute(conn, &format!("DROP TABLE IF EXISTS {}", quote_identifier(name)))?;
    }
    Ok(())
}

/// Double-quote an identifier, doubling embedded quotes
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn sql_type(values: &ColumnValue) -> &'static str {
    match values {
        ColumnValue::Integer(_) => "INTEGER",
        ColumnValue::Number(_) => "REAL",
        ColumnValue::Text(_) => "TEXT",
        ColumnValue::Boolean(_) => "INTEGER",
        ColumnValue::DateTime(_) => "TIMESTAMP",
    }
}

fn create_table_sql(table_name: &str, df: &DataFrame) -> String {
    let columns: Vec<String> = df
        .columns()
        .iter()
        .map(|col| format!("{} {}", quote_identifier(&col.name()), sql_type(&col.values)))
        .collect();

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_identifier(table_name),
        columns.join(", ")
    )
}

fn insert_sql(table_name: &str, df: &DataFrame) -> String {
    let names: Vec<String> = df
        .columns()
        .iter()
        .map(|col| quote_identifier(&col.name()))
        .collect();
    let placeholders = vec!["?"; names.len()].join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table_name),
        names.join(", "),
        placeholders
    )
}

/// SQL value of the `row`-th entry; NaN becomes NULL
fn sql_value(values: &ColumnValue, row: usize) -> Value {
    match values {
        ColumnValue::Integer(v) => Value::Integer(v[row]),
        ColumnValue::Number(v) => {
            let x = v[row];
            if x.is_nan() {
                Value::Null
            } else {
                Value::Real(x)
            }
        }
        ColumnValue::Text(v) => Value::Text(v[row].clone()),
        ColumnValue::Boolean(v) => Value::Integer(i64::from(v[row])),
        ColumnValue::DateTime(v) => Value::Text(v[row].format(TIMESTAMP_FORMAT).to_string()),
    }
}
