//! Predictor standardization.
//!
//! Rescales each predictor column to zero mean and unit population
//! standard deviation (divisor `n`, not `n - 1`), and records the
//! per-column mean and scale so that coded coefficients can later be
//! rescaled back to original measurement units.
//!
//! The statistics are computed once from the analysis table and reused
//! unchanged for the full model, the simplified model, and rescaling.

use ndarray::Array2;

use crate::error::{Error, Result};
use crate::table::Table;

/// Per-column standardization statistics for the retained predictors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Standardizer {
    columns: Vec<String>,
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl Standardizer {
    /// Compute mean and population standard deviation for each predictor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] if a predictor is absent, and
    /// [`Error::Standardization`] if a column contains non-finite values
    /// or has zero scale. Either aborts the whole analysis: no model is
    /// meaningful without a valid scale.
    pub fn fit(table: &Table, predictors: &[String]) -> Result<Self> {
        let n = table.nrows() as f64;
        let mut means = Vec::with_capacity(predictors.len());
        let mut scales = Vec::with_capacity(predictors.len());

        for name in predictors {
            let col = table.column(name).ok_or_else(|| Error::MissingColumn {
                name: name.clone(),
            })?;

            if col.iter().any(|v| !v.is_finite()) {
                return Err(Error::standardization(name, "non-finite values present"));
            }

            let mean = col.sum() / n;
            let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let scale = var.sqrt();

            if scale <= 0.0 || !scale.is_finite() {
                return Err(Error::standardization(name, "zero scale (constant column)"));
            }

            means.push(mean);
            scales.push(scale);
        }

        Ok(Self {
            columns: predictors.to_vec(),
            means,
            scales,
        })
    }

    /// Standardize the predictor columns of `table` into an `n x p` matrix.
    ///
    /// Column order matches the predictor order given to [`Standardizer::fit`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] if a fitted predictor is absent
    /// from `table`.
    pub fn transform(&self, table: &Table) -> Result<Array2<f64>> {
        let n = table.nrows();
        let p = self.columns.len();
        let mut out = Array2::zeros((n, p));

        for (j, name) in self.columns.iter().enumerate() {
            let col = table.column(name).ok_or_else(|| Error::MissingColumn {
                name: name.clone(),
            })?;
            for (i, v) in col.iter().enumerate() {
                out[[i, j]] = (v - self.means[j]) / self.scales[j];
            }
        }

        Ok(out)
    }

    /// Retained predictor names, in standardization order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Index of a predictor in standardization order.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Recorded column means.
    #[must_use]
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Recorded column scales (population standard deviations).
    #[must_use]
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }
}
