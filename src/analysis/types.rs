//! Analysis result types.
//!
//! Everything produced by one analysis invocation lives here: the fitted
//! model record, ANOVA rows, the ranked effect matrix, lack-of-fit
//! decomposition, uncoded estimates, and the assembled per-response and
//! top-level results. All types are transient values created per
//! invocation and never persisted.

use crate::term::Term;

/// Configuration for a screening analysis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisConfig {
    /// LogWorth significance threshold (default: 1.3, i.e. p ~ 0.05).
    pub threshold: f64,
    /// Minimum number of responses a term must be significant in to be
    /// retained regardless of its maximum LogWorth (default: 2, the
    /// legacy calling convention; the simplified convention passes 1).
    pub min_significant: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: 1.3,
            min_significant: 2,
        }
    }
}

/// One estimated coefficient in the coded (standardized) model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoefficientEstimate {
    /// The model term, or `None` for the intercept.
    pub term: Option<Term>,
    /// Display label ("Intercept" or the term label).
    pub label: String,
    /// Estimated coefficient on the standardized scale.
    pub value: f64,
    /// Standard error of the estimate.
    pub std_error: f64,
    /// t-statistic (`value / std_error`).
    pub t_statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// LogWorth of the p-value.
    pub log_worth: f64,
}

/// An ordinary-least-squares fit of one response on a term list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FittedModel {
    /// Response column name.
    pub response: String,
    /// Model terms in basis order (intercept excluded).
    pub terms: Vec<Term>,
    /// Coefficient estimates, intercept first, then `terms` order.
    pub coefficients: Vec<CoefficientEstimate>,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Adjusted coefficient of determination.
    pub adj_r_squared: f64,
    /// Residual root mean squared error, `sqrt(RSS / (n - p))`.
    pub rmse: f64,
    /// Mean of the observed response.
    pub mean_response: f64,
    /// Number of observations.
    pub observations: usize,
    /// Residual sum of squares.
    pub residual_ss: f64,
    /// Residual degrees of freedom (`n - p`).
    pub residual_df: usize,
    /// Raw residuals in row order.
    pub residuals: Vec<f64>,
    /// Fitted values in row order.
    pub fitted: Vec<f64>,
    /// Observed values in row order.
    pub actual: Vec<f64>,
}

/// One row of a Type-III ANOVA table.
///
/// The residual row is not part of the table; residual variation is
/// carried by [`FittedModel::residual_ss`] and [`FittedModel::residual_df`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnovaRow {
    /// The scored term.
    pub term: Term,
    /// Marginal (Type-III) sum of squares for the term.
    pub sum_of_squares: f64,
    /// Term degrees of freedom (one column per term).
    pub df: usize,
    /// F-statistic against the residual mean square.
    pub f_ratio: f64,
    /// Upper-tail p-value at `(df, residual df)`.
    pub p_value: f64,
    /// LogWorth of the p-value.
    pub log_worth: f64,
}

/// One term's row in the merged effect matrix.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectRow {
    /// The scored term.
    pub term: Term,
    /// LogWorth per response, parallel to [`EffectMatrix::responses`].
    /// Terms absent from a response's ANOVA table score 0 there.
    pub log_worths: Vec<f64>,
    /// Median LogWorth across responses.
    pub median: f64,
    /// Maximum LogWorth across responses.
    pub max: f64,
    /// Number of responses with LogWorth strictly above the threshold.
    pub significant: usize,
}

/// Ranked factor-significance matrix merged across responses.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectMatrix {
    /// Responses contributing columns, in analysis order.
    pub responses: Vec<String>,
    /// Rows sorted descending by maximum LogWorth (stable on ties).
    pub rows: Vec<EffectRow>,
}

/// One side of the residual-variation decomposition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorComponent {
    /// Degrees of freedom; `None` when non-positive (not testable).
    pub df: Option<usize>,
    /// Sum of squares (always reported).
    pub ss: f64,
    /// Mean square; `None` when degrees of freedom are non-positive.
    pub ms: Option<f64>,
}

/// Combined error term of the decomposition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TotalError {
    /// Combined degrees of freedom; `None` unless both sides are testable.
    pub df: Option<usize>,
    /// Combined sum of squares.
    pub ss: f64,
}

/// Lack-of-fit versus pure-error decomposition for one fitted model.
///
/// `None` fields signal "lack-of-fit not testable" (saturated design or
/// no replicated configurations), not an error.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LackOfFitResult {
    /// Systematic deviation of replicate-group means from the model.
    pub lack_of_fit: ErrorComponent,
    /// Within-replicate scatter.
    pub pure_error: ErrorComponent,
    /// Sum of both components.
    pub total_error: TotalError,
    /// `MS(lack-of-fit) / MS(pure-error)`; `None` when undefined.
    pub f_ratio: Option<f64>,
    /// Upper-tail p-value of the F-ratio; `None` when undefined.
    pub prob_f: Option<f64>,
}

/// One coefficient rescaled to original measurement units.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UncodedEstimate {
    /// Display label ("Intercept" or the term label).
    pub label: String,
    /// Coefficient in original units.
    pub estimate: f64,
}

/// The uncoded coefficient block for one response.
///
/// Rescaling failure is recovered at this boundary; the coded results
/// for the response remain intact.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UncodedOutcome {
    /// Rescaled estimates, intercept first.
    Estimates(Vec<UncodedEstimate>),
    /// Rescaling failed; the message describes why.
    Failed {
        /// Human-readable failure description.
        message: String,
    },
}

/// Everything reported for one response whose simplified model fit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResponseModel {
    /// The simplified-model fit, including coded coefficients, fit
    /// statistics, and residual/fitted/actual vectors.
    pub model: FittedModel,
    /// Type-III ANOVA table of the simplified model.
    pub anova: Vec<AnovaRow>,
    /// Coefficients rescaled to original units, or an error marker.
    pub uncoded: UncodedOutcome,
    /// Lack-of-fit decomposition over replicate configurations.
    pub lack_of_fit: LackOfFitResult,
}

/// Per-response result: a fitted record or a structured error marker.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResponseOutcome {
    /// The simplified model fit and all derived tables.
    Fitted(Box<ResponseModel>),
    /// The model could not be fit; sibling responses are unaffected.
    Failed {
        /// Human-readable failure description.
        message: String,
    },
}

/// A response name paired with its outcome, in input order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResponseReport {
    /// Response column name.
    pub response: String,
    /// Fitted record or error marker.
    pub outcome: ResponseOutcome,
}

/// Echo of the parameters that produced a result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisParameters {
    /// LogWorth threshold used for screening.
    pub threshold: f64,
    /// Minimum significant-response count used for screening.
    pub min_significant: usize,
    /// Response columns analyzed.
    pub responses: Vec<String>,
    /// Predictors retained after the defensive variation filter.
    pub predictors: Vec<String>,
}

/// Complete result of one screening analysis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisResult {
    /// Full-model effect screening table, reported verbatim.
    pub effects: EffectMatrix,
    /// Hierarchy-closed simplified term set (may be empty).
    pub simplified_terms: Vec<Term>,
    /// True when the simplified selection was empty and the per-response
    /// models fell back to the full linear term list.
    pub fallback_used: bool,
    /// Condition number of the simplified design basis XᵀX, or `None`
    /// when the selection is empty or the computation failed.
    pub condition_number: Option<f64>,
    /// Effect matrix recomputed from the simplified-model ANOVA tables,
    /// absent when no simplified model fit succeeded.
    pub simplified_effects: Option<EffectMatrix>,
    /// Per-response results in input order.
    pub responses: Vec<ResponseReport>,
    /// Parameters that produced this result.
    pub parameters: AnalysisParameters,
}

impl AnalysisResult {
    /// Look up one response's outcome by name.
    #[must_use]
    pub fn response(&self, name: &str) -> Option<&ResponseOutcome> {
        self.responses
            .iter()
            .find(|r| r.response == name)
            .map(|r| &r.outcome)
    }
}
