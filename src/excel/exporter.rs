//! Excel exporter implementation

use crate::error::ExportResult;
use crate::paths::ensure_parent_dir;
use crate::types::{ColumnValue, DataFrame, IndexLevel};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::borrow::{Borrow, Cow};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DATETIME_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Export named frames to an Excel workbook, one worksheet per frame.
///
/// The parent directory of `excel_full_path` is created if missing. Row
/// labels are written or omitted per [`IndexPolicy::for_frame`]; cells are
/// never merged.
pub fn dataframes_to_excel<I, K, V, P>(dataframes: I, excel_full_path: P) -> ExportResult<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Borrow<DataFrame>,
    P: AsRef<Path>,
{
    ExcelExporter::new(excel_full_path).export(dataframes)
}

/// Whether a frame's row labels are written as leading columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexPolicy {
    Include,
    Omit,
}

impl IndexPolicy {
    /// Decide index inclusion for a frame
    ///
    /// - multi-level column header: include
    /// - single level of integer labels (sequential numbering included): omit
    /// - anything else: include
    pub fn for_frame(df: &DataFrame) -> Self {
        if df.has_multi_level_columns() {
            IndexPolicy::Include
        } else if df.index().is_integer() {
            IndexPolicy::Omit
        } else {
            IndexPolicy::Include
        }
    }
}

/// Excel exporter for named frames
pub struct ExcelExporter {
    path: PathBuf,
    header_format: Format,
    value_format: Format,
    datetime_format: Format,
    label_datetime_format: Format,
}

impl ExcelExporter {
    /// Create a new Excel exporter writing to `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let header_format = Format::new()
            .set_bold()
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::Center);

        Self {
            path: path.as_ref().to_path_buf(),
            label_datetime_format: header_format.clone().set_num_format(DATETIME_NUM_FORMAT),
            header_format,
            value_format: Format::new(),
            datetime_format: Format::new().set_num_format(DATETIME_NUM_FORMAT),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Export the frames to the .xlsx file
    pub fn export<I, K, V>(&self, dataframes: I) -> ExportResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Borrow<DataFrame>,
    {
        ensure_parent_dir(&self.path)?;

        let mut workbook = Workbook::new();
        let mut sheets = 0usize;

        for (sheet_name, df) in dataframes {
            self.export_frame(&mut workbook, sheet_name.as_ref(), df.borrow())?;
            sheets += 1;
        }

        workbook.save(&self.path)?;

        info!(path = %self.path.display(), sheets, "Excel export complete");
        Ok(())
    }

    /// Export a single frame to a worksheet
    fn export_frame(
        &self,
        workbook: &mut Workbook,
        sheet_name: &str,
        df: &DataFrame,
    ) -> ExportResult<()> {
        df.validate_shape()?;

        let policy = IndexPolicy::for_frame(df);
        let row_count = df.row_count();
        debug!(
            sheet = sheet_name,
            rows = row_count,
            columns = df.columns().len(),
            ?policy,
            "Writing worksheet"
        );

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name)?;

        let levels: Cow<'_, [IndexLevel]> = match policy {
            IndexPolicy::Include => df.index().levels(row_count),
            IndexPolicy::Omit => Cow::Owned(Vec::new()),
        };

        // Label levels become leading columns, repeated on every row
        for (col_idx, level) in levels.iter().enumerate() {
            let col = col_idx as u16;
            if let Some(name) = &level.name {
                worksheet.write_string_with_format(0, col, name, &self.header_format)?;
            }
            self.write_values(worksheet, col, &level.values, true)?;
        }

        let offset = levels.len() as u16;
        for (col_idx, column) in df.columns().iter().enumerate() {
            let col = offset + col_idx as u16;
            worksheet.write_string_with_format(0, col, column.name(), &self.header_format)?;
            self.write_values(worksheet, col, &column.values, false)?;
        }

        Ok(())
    }

    /// Write one column of values below the header row
    fn write_values(
        &self,
        worksheet: &mut Worksheet,
        col: u16,
        values: &ColumnValue,
        label: bool,
    ) -> ExportResult<()> {
        let format = if label {
            &self.header_format
        } else {
            &self.value_format
        };

        match values {
            ColumnValue::Integer(ints) => {
                for (idx, &value) in ints.iter().enumerate() {
                    worksheet.write_number_with_format(data_row(idx), col, value as f64, format)?;
                }
            }
            ColumnValue::Number(nums) => {
                for (idx, &value) in nums.iter().enumerate() {
                    if value.is_nan() {
                        // missing
                        continue;
                    }
                    if value.is_infinite() {
                        let text = if value > 0.0 { "inf" } else { "-inf" };
                        worksheet.write_string_with_format(data_row(idx), col, text, format)?;
                    } else {
                        worksheet.write_number_with_format(data_row(idx), col, value, format)?;
                    }
                }
            }
            ColumnValue::Text(texts) => {
                for (idx, value) in texts.iter().enumerate() {
                    worksheet.write_string_with_format(data_row(idx), col, value, format)?;
                }
            }
            ColumnValue::Boolean(bools) => {
                for (idx, &value) in bools.iter().enumerate() {
                    worksheet.write_boolean_with_format(data_row(idx), col, value, format)?;
                }
            }
            ColumnValue::DateTime(stamps) => {
                let format = if label {
                    &self.label_datetime_format
                } else {
                    &self.datetime_format
                };
                for (idx, value) in stamps.iter().enumerate() {
                    worksheet.write_datetime_with_format(data_row(idx), col, value, format)?;
                }
            }
        }

        Ok(())
    }
}

/// Worksheet row for the `idx`-th data row (row 0 is the header)
fn data_row(idx: usize) -> u32 {
    idx as u32 + 1
}
