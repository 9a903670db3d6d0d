//! Whitespace-delimited density-of-states tables written next to the log:
//! `energy total` for unpolarized runs, `energy up down total` for
//! spin-polarized ones.

use crate::text::parse_fortran_f64;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DosTableError {
    #[error("failed to read DOS table '{path}': {message}")]
    Read { path: String, message: String },
    #[error("line {line}: '{token}' is not a number")]
    InvalidNumber { line: usize, token: String },
    #[error("line {line}: expected {expected} columns, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("DOS table has no data rows")]
    Empty,
    #[error("DOS table needs at least {required} columns, found {found}")]
    TooFewColumns { required: usize, found: usize },
}

/// Column-major numeric table.
#[derive(Debug, Clone, PartialEq)]
pub struct DosTable {
    columns: Vec<Vec<f64>>,
}

impl DosTable {
    pub fn parse(source: &str) -> Result<Self, DosTableError> {
        let mut columns: Vec<Vec<f64>> = Vec::new();

        for (index, line) in source.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let row = trimmed
                .split_whitespace()
                .map(|token| {
                    parse_fortran_f64(token).ok_or_else(|| DosTableError::InvalidNumber {
                        line: index + 1,
                        token: token.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            if columns.is_empty() {
                columns = vec![Vec::new(); row.len()];
            } else if row.len() != columns.len() {
                return Err(DosTableError::RaggedRow {
                    line: index + 1,
                    expected: columns.len(),
                    found: row.len(),
                });
            }

            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }

        if columns.is_empty() {
            return Err(DosTableError::Empty);
        }
        Ok(Self { columns })
    }

    pub fn read(path: &Path) -> Result<Self, DosTableError> {
        let source = fs::read_to_string(path).map_err(|source| DosTableError::Read {
            path: path.display().to_string(),
            message: source.to_string(),
        })?;
        Self::parse(&source)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn column(&self, index: usize) -> Option<&[f64]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    pub fn require_columns(&self, required: usize) -> Result<(), DosTableError> {
        if self.column_count() < required {
            return Err(DosTableError::TooFewColumns {
                required,
                found: self.column_count(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DosTable, DosTableError};

    #[test]
    fn table_is_stored_column_major() {
        let table = DosTable::parse("# E  up  down  total\n-1.0 0.1 0.2 0.3\n 0.0 0.4 0.5 0.9\n")
            .expect("table should parse");
        assert_eq!(table.column_count(), 4);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column(0), Some(&[-1.0, 0.0][..]));
        assert_eq!(table.column(3), Some(&[0.3, 0.9][..]));
        assert!(table.column(4).is_none());
    }

    #[test]
    fn malformed_rows_are_reported_with_line_numbers() {
        assert_eq!(
            DosTable::parse("1.0 2.0\n3.0\n"),
            Err(DosTableError::RaggedRow {
                line: 2,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            DosTable::parse("1.0 abc\n"),
            Err(DosTableError::InvalidNumber {
                line: 1,
                token: "abc".to_string()
            })
        );
        assert_eq!(DosTable::parse("# only a header\n"), Err(DosTableError::Empty));
    }

    #[test]
    fn column_requirement_is_checked() {
        let table = DosTable::parse("0.0 1.0\n").expect("table should parse");
        assert!(table.require_columns(2).is_ok());
        assert_eq!(
            table.require_columns(4),
            Err(DosTableError::TooFewColumns {
                required: 4,
                found: 2
            })
        );
    }
}
