//! In-memory tabular dataset with typed columns.

use crate::error::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Tokens read as a missing cell when loading CSV data.
const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-nan", "null", "NULL", "None", "<NA>", "#N/A",
];

/// Inferred primitive kind of a column.
///
/// Serialized with the dtype names dataset profiles have always reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    #[serde(rename = "int64")]
    Integer,
    #[serde(rename = "float64")]
    Float,
    #[serde(rename = "object")]
    Text,
}

impl ColumnKind {
    /// Integer and float columns are numeric; text is categorical.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    /// Dtype-style name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnKind::Integer => "int64",
            ColumnKind::Float => "float64",
            ColumnKind::Text => "object",
        }
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A borrowed view of a single cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Integer(i64),
    Float(f64),
    Text(&'a str),
    Missing,
}

impl<'a> Cell<'a> {
    /// Check if this is a missing value.
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Numeric value of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Text value of the cell, if it has one.
    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the cell the way it would appear in a CSV file.
    pub fn render(&self) -> Option<String> {
        match self {
            Cell::Integer(v) => Some(v.to_string()),
            // -0.0 renders as "0"
            Cell::Float(v) => Some((v + 0.0).to_string()),
            Cell::Text(s) => Some(s.to_string()),
            Cell::Missing => None,
        }
    }
}

/// Column storage, one variant per kind. `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Integer(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Integer column.
    pub fn integer(name: &str, values: Vec<Option<i64>>) -> Self {
        Self {
            name: name.to_string(),
            data: ColumnData::Integer(values),
        }
    }

    /// Float column. NaN values are stored as missing.
    pub fn float(name: &str, values: Vec<Option<f64>>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        Self {
            name: name.to_string(),
            data: ColumnData::Float(values),
        }
    }

    /// Text column.
    pub fn text(name: &str, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.to_string(),
            data: ColumnData::Text(values),
        }
    }

    /// Text column from string slices, for fixtures and small literals.
    pub fn text_from<S: AsRef<str>>(name: &str, values: &[Option<S>]) -> Self {
        Self::text(
            name,
            values
                .iter()
                .map(|v| v.as_ref().map(|s| s.as_ref().to_string()))
                .collect(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn kind(&self) -> ColumnKind {
        match self.data {
            ColumnData::Integer(_) => ColumnKind::Integer,
            ColumnData::Float(_) => ColumnKind::Float,
            ColumnData::Text(_) => ColumnKind::Text,
        }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Integer(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell at `row`. Out-of-range rows read as missing.
    pub fn cell(&self, row: usize) -> Cell<'_> {
        match &self.data {
            ColumnData::Integer(v) => v.get(row).copied().flatten().map_or(Cell::Missing, Cell::Integer),
            ColumnData::Float(v) => v.get(row).copied().flatten().map_or(Cell::Missing, Cell::Float),
            ColumnData::Text(v) => v
                .get(row)
                .and_then(|s| s.as_deref())
                .map_or(Cell::Missing, Cell::Text),
        }
    }

    /// Iterate over all cells in row order.
    pub fn cells(&self) -> impl Iterator<Item = Cell<'_>> + '_ {
        (0..self.len()).map(move |row| self.cell(row))
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        match &self.data {
            ColumnData::Integer(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Float(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Text(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }

    /// New column holding the given rows, in the given order.
    pub fn take(&self, rows: &[usize]) -> Result<Self> {
        let n = self.len();
        if let Some(&bad) = rows.iter().find(|&&r| r >= n) {
            return Err(ForgeError::InvalidParameter(format!(
                "row index {} out of range for column '{}' with {} rows",
                bad, self.name, n
            )));
        }
        let data = match &self.data {
            ColumnData::Integer(v) => ColumnData::Integer(rows.iter().map(|&r| v[r]).collect()),
            ColumnData::Float(v) => ColumnData::Float(rows.iter().map(|&r| v[r]).collect()),
            ColumnData::Text(v) => ColumnData::Text(rows.iter().map(|&r| v[r].clone()).collect()),
        };
        Ok(Self {
            name: self.name.clone(),
            data,
        })
    }
}

/// A rectangular dataset: rows are records, columns are named and typed.
///
/// Tables are never modified in place. Operations that drop or reorder
/// columns or rows return a new table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table from columns, checking lengths and name uniqueness.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::new();
        for column in &columns {
            if column.len() != n_rows {
                return Err(ForgeError::DimensionMismatch {
                    expected: n_rows,
                    actual: column.len(),
                });
            }
            if !seen.insert(column.name()) {
                return Err(ForgeError::DuplicateColumn(column.name().to_string()));
            }
        }
        Ok(Self { columns, n_rows })
    }

    /// Load a table from a CSV file with a header row.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load a table from any CSV source with a header row.
    ///
    /// Column kinds are inferred from the non-missing cells:
    /// - all cells parse as integers and none is missing: `Integer`
    /// - all cells parse as numbers (integers with gaps included): `Float`
    /// - anything else: `Text`
    ///
    /// A column with no cells at all is `Text`; one with only missing cells is `Float`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let header: Vec<String> = csv_reader.headers()?.iter().map(String::from).collect();
        if header.is_empty() || (header.len() == 1 && header[0].is_empty()) {
            return Err(ForgeError::EmptyData("CSV has no header row".to_string()));
        }

        let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); header.len()];
        for record in csv_reader.records() {
            let record = record?;
            for (col_idx, values) in raw.iter_mut().enumerate() {
                let token = record.get(col_idx).unwrap_or("");
                if is_missing_token(token) {
                    values.push(None);
                } else {
                    values.push(Some(token.to_string()));
                }
            }
        }

        let columns = header
            .iter()
            .zip(raw)
            .map(|(name, values)| infer_column(name, values))
            .collect();
        let table = Self::new(columns)?;
        tracing::debug!(rows = table.n_rows(), cols = table.n_cols(), "Loaded CSV table");
        Ok(table)
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Check if a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name() == name)
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| ForgeError::MissingColumn(name.to_string()))
    }

    /// New table keeping only the named columns, in table order.
    /// Names that are not in the table are skipped.
    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> Self {
        let wanted: HashSet<&str> = names.iter().map(|s| s.as_ref()).collect();
        self.filter_columns(|c| wanted.contains(c.name()))
    }

    /// New table without the named columns. Names that are not in the
    /// table are skipped.
    pub fn drop_columns<S: AsRef<str>>(&self, names: &[S]) -> Self {
        let unwanted: HashSet<&str> = names.iter().map(|s| s.as_ref()).collect();
        self.filter_columns(|c| !unwanted.contains(c.name()))
    }

    /// New table holding the given rows, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> Result<Self> {
        let columns = self
            .columns
            .iter()
            .map(|c| c.take(rows))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            columns,
            n_rows: rows.len(),
        })
    }

    fn filter_columns<F: Fn(&Column) -> bool>(&self, keep: F) -> Self {
        Self {
            columns: self.columns.iter().filter(|c| keep(c)).cloned().collect(),
            n_rows: self.n_rows,
        }
    }
}

fn is_missing_token(token: &str) -> bool {
    MISSING_TOKENS.contains(&token.trim())
}

fn infer_column(name: &str, values: Vec<Option<String>>) -> Column {
    if values.is_empty() {
        return Column::text(name, values);
    }

    let present: Vec<&str> = values.iter().flatten().map(|s| s.trim()).collect();
    let has_missing = present.len() < values.len();

    let all_integer = present.iter().all(|s| s.parse::<i64>().is_ok());
    if all_integer && !has_missing {
        let ints = values
            .iter()
            .map(|v| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok()))
            .collect();
        return Column::integer(name, ints);
    }

    let all_float = present.iter().all(|s| s.parse::<f64>().is_ok());
    if all_float {
        let floats = values
            .iter()
            .map(|v| v.as_deref().and_then(|s| s.trim().parse::<f64>().ok()))
            .collect();
        return Column::float(name, floats);
    }

    Column::text(name, values)
}
