use crate::error::{ExportError, ExportResult};
use chrono::NaiveDateTime;
use std::borrow::Cow;

//==============================================================================
// Column Values
//==============================================================================

/// Column value types (homogeneous arrays)
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// Array of 64-bit integers
    Integer(Vec<i64>),
    /// Array of numbers (f64); NaN marks a missing value
    Number(Vec<f64>),
    /// Array of text strings
    Text(Vec<String>),
    /// Array of booleans
    Boolean(Vec<bool>),
    /// Array of timestamps without timezone
    DateTime(Vec<NaiveDateTime>),
}

impl ColumnValue {
    /// Get the length of the array
    pub fn len(&self) -> usize {
        match self {
            ColumnValue::Integer(v) => v.len(),
            ColumnValue::Number(v) => v.len(),
            ColumnValue::Text(v) => v.len(),
            ColumnValue::Boolean(v) => v.len(),
            ColumnValue::DateTime(v) => v.len(),
        }
    }

    /// Check if array is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnValue::Integer(_) => "Integer",
            ColumnValue::Number(_) => "Number",
            ColumnValue::Text(_) => "Text",
            ColumnValue::Boolean(_) => "Boolean",
            ColumnValue::DateTime(_) => "DateTime",
        }
    }
}

//==============================================================================
// Columns
//==============================================================================

/// A column in a frame
///
/// The header has one level in the common case. Several levels form a
/// hierarchical header such as `("2024", "revenue")`.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    levels: Vec<String>,
    pub values: ColumnValue,
}

impl Column {
    pub fn new(name: String, values: ColumnValue) -> Self {
        Self {
            levels: vec![name],
            values,
        }
    }

    /// Create a column with a multi-level header (outermost level first)
    pub fn with_levels(levels: Vec<String>, values: ColumnValue) -> Self {
        Self { levels, values }
    }

    /// Flattened header: levels joined with `.`
    pub fn name(&self) -> String {
        self.levels.join(".")
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

//==============================================================================
// Row Labels
//==============================================================================

/// One level of row labels
#[derive(Debug, Clone, PartialEq)]
pub struct IndexLevel {
    pub name: Option<String>,
    pub values: ColumnValue,
}

impl IndexLevel {
    pub fn new(name: Option<String>, values: ColumnValue) -> Self {
        Self { name, values }
    }

    pub fn named(name: &str, values: ColumnValue) -> Self {
        Self::new(Some(name.to_string()), values)
    }
}

/// Row labels of a frame
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RowIndex {
    /// Sequential integer numbering `0..n`
    #[default]
    Range,
    /// A single level of labels
    Labels(IndexLevel),
    /// A hierarchy of label levels (outermost first)
    MultiLevel(Vec<IndexLevel>),
}

impl RowIndex {
    pub fn nlevels(&self) -> usize {
        match self {
            RowIndex::Range | RowIndex::Labels(_) => 1,
            RowIndex::MultiLevel(levels) => levels.len(),
        }
    }

    /// True for a single level of integer labels, `Range` included
    pub fn is_integer(&self) -> bool {
        match self {
            RowIndex::Range => true,
            RowIndex::Labels(level) => matches!(level.values, ColumnValue::Integer(_)),
            RowIndex::MultiLevel(_) => false,
        }
    }

    /// Label levels with their values, `Range` materialised as `0..row_count`
    pub fn levels(&self, row_count: usize) -> Cow<'_, [IndexLevel]> {
        match self {
            RowIndex::Range => Cow::Owned(vec![IndexLevel::new(
                None,
                ColumnValue::Integer((0..row_count as i64).collect()),
            )]),
            RowIndex::Labels(level) => Cow::Borrowed(std::slice::from_ref(level)),
            RowIndex::MultiLevel(levels) => Cow::Borrowed(levels),
        }
    }

    /// Length of the labels, `None` for `Range` which adapts to the data
    fn len(&self) -> Option<usize> {
        match self {
            RowIndex::Range => None,
            RowIndex::Labels(level) => Some(level.values.len()),
            RowIndex::MultiLevel(levels) => levels.first().map(|l| l.values.len()),
        }
    }
}

//==============================================================================
// Frames
//==============================================================================

/// An in-memory table: ordered columns plus row labels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFrame {
    columns: Vec<Column>,
    index: RowIndex,
}

impl DataFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(index: RowIndex) -> Self {
        Self {
            columns: Vec::new(),
            index,
        }
    }

    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    pub fn set_index(&mut self, index: RowIndex) {
        self.index = index;
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    /// Get the number of rows (first column, or the labels if there are none)
    pub fn row_count(&self) -> usize {
        self.columns
            .first()
            .map(|col| col.len())
            .or_else(|| self.index.len())
            .unwrap_or(0)
    }

    /// True when any column header has more than one level
    pub fn has_multi_level_columns(&self) -> bool {
        self.columns.iter().any(|col| col.levels.len() > 1)
    }

    /// Check that every column and every label level has `row_count` entries
    pub fn validate_shape(&self) -> ExportResult<()> {
        let row_count = self.row_count();

        for column in &self.columns {
            if column.len() != row_count {
                return Err(ExportError::Shape(format!(
                    "Column '{}' has {} rows, expected {} rows",
                    column.name(),
                    column.len(),
                    row_count
                )));
            }
        }

        if let RowIndex::MultiLevel(levels) = &self.index {
            if levels.is_empty() {
                return Err(ExportError::Shape(
                    "Multi-level index has no levels".to_string(),
                ));
            }
        }

        for (pos, level) in self.index.levels(row_count).iter().enumerate() {
            if level.values.len() != row_count {
                return Err(ExportError::Shape(format!(
                    "Index level {} has {} labels, expected {} rows",
                    level.name.as_deref().unwrap_or(&pos.to_string()),
                    level.values.len(),
                    row_count
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(values: &[f64]) -> ColumnValue {
        ColumnValue::Number(values.to_vec())
    }

    #[test]
    fn test_column_value_len_and_type() {
        let values = ColumnValue::Text(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(values.len(), 2);
        assert!(!values.is_empty());
        assert_eq!(values.type_name(), "Text");
        assert!(ColumnValue::Integer(vec![]).is_empty());
    }

    #[test]
    fn test_column_name_flattens_levels() {
        let col = Column::with_levels(
            vec!["2024".to_string(), "revenue".to_string()],
            numbers(&[1.0]),
        );
        assert_eq!(col.name(), "2024.revenue");
        assert_eq!(col.levels().len(), 2);

        let plain = Column::new("revenue".to_string(), numbers(&[1.0]));
        assert_eq!(plain.name(), "revenue");
    }

    #[test]
    fn test_default_index_is_integer_range() {
        let df = DataFrame::new();
        assert_eq!(df.index(), &RowIndex::Range);
        assert!(df.index().is_integer());
        assert_eq!(df.index().nlevels(), 1);
    }

    #[test]
    fn test_integer_labels_are_integer() {
        let index = RowIndex::Labels(IndexLevel::new(None, ColumnValue::Integer(vec![10, 20])));
        assert!(index.is_integer());
    }

    #[test]
    fn test_text_labels_are_not_integer() {
        let index = RowIndex::Labels(IndexLevel::named(
            "region",
            ColumnValue::Text(vec!["north".to_string()]),
        ));
        assert!(!index.is_integer());
    }

    #[test]
    fn test_multi_level_integer_labels_are_not_integer() {
        let index = RowIndex::MultiLevel(vec![
            IndexLevel::named("year", ColumnValue::Integer(vec![2024])),
            IndexLevel::named("month", ColumnValue::Integer(vec![1])),
        ]);
        assert!(!index.is_integer());
        assert_eq!(index.nlevels(), 2);
    }

    #[test]
    fn test_range_levels_materialise_row_numbers() {
        let levels = RowIndex::Range.levels(3);
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].name, None);
        assert_eq!(levels[0].values, ColumnValue::Integer(vec![0, 1, 2]));
    }

    #[test]
    fn test_row_count_from_columns() {
        let mut df = DataFrame::new();
        df.add_column(Column::new("a".to_string(), numbers(&[1.0, 2.0, 3.0])));
        assert_eq!(df.row_count(), 3);
    }

    #[test]
    fn test_row_count_from_labels_without_columns() {
        let df = DataFrame::with_index(RowIndex::Labels(IndexLevel::new(
            None,
            ColumnValue::Text(vec!["x".to_string(), "y".to_string()]),
        )));
        assert_eq!(df.row_count(), 2);
    }

    #[test]
    fn test_set_index_replaces_labels() {
        let mut df = DataFrame::new();
        df.add_column(Column::new("a".to_string(), numbers(&[1.0])));
        df.set_index(RowIndex::Labels(IndexLevel::named(
            "key",
            ColumnValue::Text(vec!["k".to_string()]),
        )));
        assert!(!df.index().is_integer());
        assert!(df.validate_shape().is_ok());
    }

    #[test]
    fn test_has_multi_level_columns() {
        let mut df = DataFrame::new();
        df.add_column(Column::new("a".to_string(), numbers(&[1.0])));
        assert!(!df.has_multi_level_columns());

        df.add_column(Column::with_levels(
            vec!["b".to_string(), "c".to_string()],
            numbers(&[2.0]),
        ));
        assert!(df.has_multi_level_columns());
    }

    #[test]
    fn test_validate_shape_ok() {
        let mut df = DataFrame::with_index(RowIndex::Labels(IndexLevel::named(
            "id",
            ColumnValue::Text(vec!["a".to_string(), "b".to_string()]),
        )));
        df.add_column(Column::new("x".to_string(), numbers(&[1.0, 2.0])));
        df.add_column(Column::new(
            "flag".to_string(),
            ColumnValue::Boolean(vec![true, false]),
        ));
        assert!(df.validate_shape().is_ok());
    }

    #[test]
    fn test_validate_shape_ragged_columns() {
        let mut df = DataFrame::new();
        df.add_column(Column::new("x".to_string(), numbers(&[1.0, 2.0])));
        df.add_column(Column::new("y".to_string(), numbers(&[1.0])));

        let err = df.validate_shape().unwrap_err();
        assert!(err.to_string().contains("Column 'y' has 1 rows, expected 2 rows"));
    }

    #[test]
    fn test_validate_shape_short_index() {
        let mut df = DataFrame::with_index(RowIndex::Labels(IndexLevel::named(
            "id",
            ColumnValue::Integer(vec![1]),
        )));
        df.add_column(Column::new("x".to_string(), numbers(&[1.0, 2.0])));

        let err = df.validate_shape().unwrap_err();
        assert!(matches!(err, ExportError::Shape(_)));
        assert!(err.to_string().contains("Index level id"));
    }

    #[test]
    fn test_validate_shape_empty_multi_level() {
        let df = DataFrame::with_index(RowIndex::MultiLevel(vec![]));
        assert!(matches!(df.validate_shape(), Err(ExportError::Shape(_))));
    }
}
