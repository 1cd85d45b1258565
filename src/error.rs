//! Error types for the rsmscreen library.
//!
//! This module provides comprehensive error handling using the `thiserror`
//! crate, with specific variants for table construction, standardization,
//! model fitting, and coefficient rescaling.
//!
//! Fatal errors (`InsufficientPredictors`, `Standardization`, table errors,
//! `NoUsableModels`) abort a whole analysis. Model-fit errors are recovered
//! at the per-response boundary, and `UnknownRescaleFactor` at the
//! per-coefficient-table boundary; sibling responses still report results.

use thiserror::Error;

/// The main error type for the rsmscreen library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ============ Table Errors ============
    /// The input table has no rows or no columns.
    #[error("table is empty")]
    EmptyTable,

    /// A column has a different length than the rest of the table.
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        /// Name of the offending column.
        column: String,
        /// Row count of the table.
        expected: usize,
        /// Row count of the column.
        actual: usize,
    },

    /// A named column is not present in the table.
    #[error("column '{name}' not found in table")]
    MissingColumn {
        /// The missing column name.
        name: String,
    },

    // ============ Screening Errors (fatal) ============
    /// Fewer than two predictors with variation are available.
    #[error("insufficient predictors with variation: found {found}, need at least 2")]
    InsufficientPredictors {
        /// Number of usable predictors found.
        found: usize,
    },

    /// Standardization of a predictor column failed.
    #[error("standardization of '{column}' failed: {reason}")]
    Standardization {
        /// The predictor column that could not be standardized.
        column: String,
        /// Why the transform could not be applied.
        reason: String,
    },

    /// No response produced a full model, so there is nothing to screen.
    #[error("unable to build a model for any response")]
    NoUsableModels,

    // ============ Model Fit Errors (per response) ============
    /// Too few observations relative to the number of model parameters.
    #[error("too few observations: {rows} rows for {params} parameters")]
    TooFewObservations {
        /// Number of observations.
        rows: usize,
        /// Number of model parameters including the intercept.
        params: usize,
    },

    /// The basis matrix is rank-deficient and the normal equations
    /// cannot be solved.
    #[error("design matrix is rank-deficient ({params} parameters)")]
    RankDeficient {
        /// Number of model parameters including the intercept.
        params: usize,
    },

    /// The response or basis matrix contains NaN or infinite values.
    #[error("non-finite values in model for response '{response}'")]
    NonFiniteDesign {
        /// The response being fit.
        response: String,
    },

    // ============ Rescale Errors (per coefficient table) ============
    /// A coefficient's term references a factor outside the retained
    /// predictor set, so it cannot be rescaled to original units.
    #[error("cannot rescale term '{term}': factor not among retained predictors")]
    UnknownRescaleFactor {
        /// Display name of the term.
        term: String,
    },
}

/// A specialized `Result` type for rsmscreen operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Create a new `Standardization` error.
    #[must_use]
    pub fn standardization(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Standardization {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// True if this error aborts a whole analysis rather than a single
    /// response's entry.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::TooFewObservations { .. }
                | Self::RankDeficient { .. }
                | Self::NonFiniteDesign { .. }
                | Self::UnknownRescaleFactor { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InsufficientPredictors { found: 1 };
        assert!(err.to_string().contains("1"));
        assert!(err.to_string().contains("at least 2"));

        let err = Error::standardization("Temp", "zero scale");
        assert!(err.to_string().contains("Temp"));
        assert!(err.to_string().contains("zero scale"));

        let err = Error::RankDeficient { params: 7 };
        assert!(err.to_string().contains("7"));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(Error::InsufficientPredictors { found: 0 }.is_fatal());
        assert!(Error::NoUsableModels.is_fatal());
        assert!(!Error::RankDeficient { params: 3 }.is_fatal());
        assert!(!Error::UnknownRescaleFactor {
            term: "X".to_string()
        }
        .is_fatal());
    }
}
