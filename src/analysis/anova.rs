//! Type-III analysis of variance.
//!
//! Scores each term of a fitted model by its marginal sum of squares: the
//! residual sum of squares of the model refit without that term, minus the
//! full model's residual sum of squares, holding all other terms fixed.
//! The residual row is not part of the table.

use ndarray::Array2;

use super::fit;
use super::stats::{f_tail_probability, log_worth};
use super::types::{AnovaRow, FittedModel};
use crate::error::Result;
use crate::term::Term;

/// Compute the Type-III ANOVA table for `model`.
///
/// `x_std` and `predictors` must be the standardized design the model was
/// fit on; each reduced model is solved over the same rows.
///
/// # Errors
///
/// Propagates a model-fit error if a reduced basis cannot be solved; the
/// caller treats this as that response's failure.
pub fn type3_table(
    x_std: &Array2<f64>,
    predictors: &[String],
    model: &FittedModel,
) -> Result<Vec<AnovaRow>> {
    let residual_df = model.residual_df;
    let residual_ms = model.residual_ss / residual_df as f64;

    let mut rows = Vec::with_capacity(model.terms.len());
    for (k, term) in model.terms.iter().enumerate() {
        let reduced: Vec<Term> = model
            .terms
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != k)
            .map(|(_, t)| t.clone())
            .collect();

        let reduced_basis = fit::build_basis(x_std, predictors, &reduced)?;
        let reduced_rss = fit::residual_ss(&reduced_basis, &model.actual)?;

        // Numerical noise can push the difference slightly negative.
        let ss = (reduced_rss - model.residual_ss).max(0.0);
        let df = 1;
        let f_ratio = if residual_ms > 0.0 {
            (ss / df as f64) / residual_ms
        } else if ss > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };
        let p_value = f_tail_probability(f_ratio, df, residual_df);

        rows.push(AnovaRow {
            term: term.clone(),
            sum_of_squares: ss,
            df,
            f_ratio,
            p_value,
            log_worth: log_worth(p_value),
        });
    }

    Ok(rows)
}
