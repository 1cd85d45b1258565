//! In-memory data table.
//!
//! The analysis pipeline operates on a finite table of ordered rows over
//! named numeric columns. Acquisition, sampling, and column detection are
//! the caller's concern; this type only guarantees a rectangular `f64`
//! matrix with name-based column access.

use ndarray::{Array2, ArrayView1};
use std::collections::HashSet;

use crate::error::{Error, Result};

/// A rectangular table of named `f64` columns.
///
/// Row order is preserved exactly as supplied; replicate grouping and
/// residual vectors all index into this order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    names: Vec<String>,
    /// Row-major storage, `nrows x ncols`.
    data: Array2<f64>,
}

impl Table {
    /// Build a table from `(name, values)` column pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if no columns or no rows are supplied, or if the
    /// columns have differing lengths.
    pub fn from_columns(columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::EmptyTable);
        }
        let nrows = columns[0].1.len();
        if nrows == 0 {
            return Err(Error::EmptyTable);
        }
        for (name, values) in &columns {
            if values.len() != nrows {
                return Err(Error::ColumnLengthMismatch {
                    column: name.clone(),
                    expected: nrows,
                    actual: values.len(),
                });
            }
        }

        let ncols = columns.len();
        let names: Vec<String> = columns.iter().map(|(n, _)| n.clone()).collect();
        let data = Array2::from_shape_fn((nrows, ncols), |(i, j)| columns[j].1[i]);
        Ok(Self { names, data })
    }

    /// Number of rows.
    #[must_use]
    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns.
    #[must_use]
    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    /// Column names in table order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// True if the table has a column with the given name.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// View of a column by name, or `None` if absent.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        let idx = self.names.iter().position(|n| n == name)?;
        Some(self.data.column(idx))
    }

    /// Column by name as an owned `Vec`, or a `MissingColumn` error.
    pub fn column_vec(&self, name: &str) -> Result<Vec<f64>> {
        self.column(name)
            .map(|c| c.to_vec())
            .ok_or_else(|| Error::MissingColumn {
                name: name.to_string(),
            })
    }

    /// Number of bit-distinct values in a column, or `None` if absent.
    ///
    /// Distinctness is over the raw `f64` bit patterns, the same identity
    /// used for replicate grouping.
    #[must_use]
    pub fn distinct_count(&self, name: &str) -> Option<usize> {
        let col = self.column(name)?;
        let distinct: HashSet<u64> = col.iter().map(|v| v.to_bits()).collect();
        Some(distinct.len())
    }
}
