//! Already-parsed configuration tables and their source provenance.
//!
//! Configuration files are parsed outside this workspace. Processes receive
//! their tabular inputs (catches, methods, initial states) as [`Table`]s of
//! raw strings so that parse errors can still be reported against the
//! line they came from.

use std::fmt;

use crate::error::ConfigError;

/// Source location of a configuration value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Provenance {
    file: String,
    line: u32,
}

impl Provenance {
    /// Location at `line` of `file`.
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Location for values constructed in code rather than read from a file.
    pub fn inline() -> Self {
        Self::default()
    }

    /// Source file name, empty for inline values.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Line number within the source file.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The same file, `offset` lines further down.
    pub fn offset(&self, offset: usize) -> Self {
        let offset = u32::try_from(offset).unwrap_or(u32::MAX);
        Self {
            file: self.file.clone(),
            line: self.line.saturating_add(offset),
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            write!(f, "<inline>")
        } else {
            write!(f, "{}:{}", self.file, self.line)
        }
    }
}

/// A named table of string cells with a header row.
///
/// Column lookups are case-insensitive. Row provenance is derived from the
/// table's provenance, which points at the header line; row `i` is assumed
/// to sit `i + 1` lines below it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    provenance: Provenance,
}

impl Table {
    /// Create an empty table with the given header.
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            provenance: Provenance::inline(),
        }
    }

    /// Attach the source location of the header row.
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Append a row, builder style.
    pub fn with_row<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_row(values);
        self
    }

    /// Append a row.
    pub fn push_row<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(values.into_iter().map(Into::into).collect());
    }

    /// Table name, used in error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Header cells in declaration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows in declaration order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Location of the header row.
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Location of data row `row`.
    pub fn row_provenance(&self, row: usize) -> Provenance {
        self.provenance.offset(row + 1)
    }

    /// Index of `column`, compared case-insensitively.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
    }

    /// Index of a column that must be present.
    pub fn require_column(&self, column: &str) -> Result<usize, ConfigError> {
        self.column_index(column)
            .ok_or_else(|| ConfigError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
                at: self.provenance.clone(),
            })
    }

    /// Check that every row has one cell per column.
    pub fn validate_shape(&self) -> Result<(), ConfigError> {
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(ConfigError::LengthMismatch {
                    parameter: self.name.clone(),
                    expected: self.columns.len(),
                    actual: row.len(),
                    at: self.row_provenance(i),
                });
            }
        }
        Ok(())
    }
}

/// Parse one cell, mapping failures to [`ConfigError::InvalidValue`].
pub fn parse_cell<T: std::str::FromStr>(
    cell: &str,
    parameter: &str,
    at: &Provenance,
) -> Result<T, ConfigError> {
    cell.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue {
            parameter: parameter.to_string(),
            value: cell.to_string(),
            reason: format!("could not be read as {}", short_type_name::<T>()),
            at: at.clone(),
        })
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn methods() -> Table {
        Table::new("method", ["method", "Category", "u_max"])
            .with_provenance(Provenance::new("estimation.csl2", 10))
            .with_row(["FishingSummer", "stock", "0.7"])
            .with_row(["FishingWinter", "stock", "0.7"])
    }

    #[test]
    fn column_lookup_is_case_insensitive() {
        let t = methods();
        assert_eq!(t.column_index("category"), Some(1));
        assert_eq!(t.column_index("CATEGORY"), Some(1));
        assert_eq!(t.column_index("penalty"), None);
    }

    #[test]
    fn missing_column_reports_table_location() {
        let err = methods().require_column("penalty").unwrap_err();
        assert_eq!(
            err.to_string(),
            "table 'method' is missing required column 'penalty' (estimation.csl2:10)"
        );
    }

    #[test]
    fn row_provenance_counts_from_header() {
        assert_eq!(methods().row_provenance(1), Provenance::new("estimation.csl2", 12));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let t = methods().with_row(["FishingSpring", "stock"]);
        assert!(matches!(
            t.validate_shape(),
            Err(ConfigError::LengthMismatch {
                expected: 3,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn parse_cell_reports_parameter() {
        let at = Provenance::inline();
        assert_eq!(parse_cell::<f64>(" 0.7 ", "u_max", &at), Ok(0.7));
        let err = parse_cell::<f64>("seven", "u_max", &at).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value 'seven' for 'u_max': could not be read as f64 (<inline>)"
        );
    }
}
