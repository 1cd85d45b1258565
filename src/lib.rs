//! # rsmscreen
//!
//! Response-surface screening for multi-response designed experiments.
//!
//! ## Overview
//!
//! Given a table of experimental runs with numeric predictor and response
//! columns, the pipeline:
//! - standardizes predictors to zero mean and unit variance
//! - fits a full response-surface model per response (linear plus pairwise
//!   interactions, with quadratics once the design has more than four
//!   predictors)
//! - scores every term by Type-III marginal sum of squares, expressed as
//!   LogWorth (`-log10(p)`) for cross-response comparison
//! - merges the per-response scores into one ranked effect matrix and
//!   selects a simplified, hierarchy-closed term set
//! - refits each response on the simplified terms, reporting ANOVA,
//!   lack-of-fit versus pure error, and coefficients rescaled to original
//!   measurement units
//!
//! Per-response failures (rank deficiency, non-finite values, too few
//! rows) become error markers in the result; sibling responses still
//! report in full.
//!
//! ## Quick Start
//!
//! ```rust
//! use rsmscreen::{analyze, AnalysisConfig, Table};
//!
//! // Replicated 2^2 factorial with a strong A effect.
//! let table = Table::from_columns(vec![
//!     ("A".to_string(), vec![-1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0]),
//!     ("B".to_string(), vec![-1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0]),
//!     ("y".to_string(), vec![4.9, 5.1, 15.0, 14.9, 5.0, 5.2, 15.1, 14.8]),
//! ])
//! .unwrap();
//!
//! let config = AnalysisConfig {
//!     threshold: 1.3,
//!     min_significant: 1,
//! };
//! let result = analyze(
//!     &table,
//!     &["y".to_string()],
//!     &["A".to_string(), "B".to_string()],
//!     &config,
//! )
//! .unwrap();
//!
//! // A dominates the screening table.
//! assert_eq!(result.effects.rows[0].term.label(), "A");
//! ```
//!
//! ## Features
//!
//! - `serde`: enable serialization of result types
//! - `parallel`: fit responses in parallel using rayon

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod analysis;
pub mod error;
pub mod standardize;
pub mod table;
pub mod term;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::analysis::{
        aggregate_effects, analyze, lack_of_fit, simplify_factors, type3_table, uncode_estimates,
        AnalysisConfig, AnalysisParameters, AnalysisResult, AnovaRow, CoefficientEstimate,
        EffectMatrix, EffectRow, FittedModel, LackOfFitResult, ResponseModel, ResponseOutcome,
        ResponseReport, UncodedEstimate, UncodedOutcome,
    };
    pub use crate::error::{Error, Result};
    pub use crate::standardize::Standardizer;
    pub use crate::table::Table;
    pub use crate::term::{response_surface_terms, Term};
}

// Re-export commonly used items at crate root
pub use analysis::{analyze, AnalysisConfig, AnalysisResult, ResponseOutcome};
pub use error::{Error, Result};
pub use standardize::Standardizer;
pub use table::Table;
pub use term::{response_surface_terms, Term};
