//! The response-surface screening pipeline.
//!
//! This module wires the statistical components into the two-stage
//! analysis:
//!
//! 1. **Screening stage** — fit the full response-surface model once per
//!    response, score every term with a Type-III ANOVA, and merge the
//!    LogWorth tables into one ranked effect matrix.
//! 2. **Reporting stage** — simplify the term set (hierarchy-closed),
//!    refit each response on the simplified terms, and derive the ANOVA
//!    table, lack-of-fit decomposition, and uncoded coefficients.
//!
//! The full-model stage exists solely to rank factors; only the
//! simplified-model stage produces the reported fit.
//!
//! Per-response work in both stages is independent and reads only the
//! shared standardized design and term set; with the `parallel` feature
//! it runs on rayon. Everything is in-memory computation with no
//! external I/O, and a run is fully deterministic for identical inputs.

mod anova;
mod effects;
mod fit;
mod lack_of_fit;
mod rescale;
pub mod stats;
mod types;

pub use anova::type3_table;
pub use effects::{aggregate_effects, simplify_factors};
pub use fit::{build_basis, fit as fit_model};
pub use lack_of_fit::decompose as lack_of_fit;
pub use rescale::uncode_estimates;
pub use types::{
    AnalysisConfig, AnalysisParameters, AnalysisResult, AnovaRow, CoefficientEstimate,
    EffectMatrix, EffectRow, ErrorComponent, FittedModel, LackOfFitResult, ResponseModel,
    ResponseOutcome, ResponseReport, TotalError, UncodedEstimate, UncodedOutcome,
};

use log::{debug, warn};
use nalgebra::DMatrix;
use ndarray::Array2;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::standardize::Standardizer;
use crate::table::Table;
use crate::term::{response_surface_terms, Term};

/// Map a closure over the responses, in parallel when the `parallel`
/// feature is enabled.
fn map_responses<T, F>(responses: &[String], f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&String) -> T + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        responses.par_iter().map(f).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        responses.iter().map(f).collect()
    }
}

/// Defensively drop predictors that are absent or have no variation.
///
/// The input contract already promises variable predictors; this re-filter
/// only guards against caller slip-ups and logs what it drops.
fn filter_predictors(table: &Table, predictors: &[String]) -> Vec<String> {
    predictors
        .iter()
        .filter(|name| match table.distinct_count(name) {
            Some(count) if count > 1 => true,
            Some(_) => {
                warn!("skipping constant predictor '{name}'");
                false
            }
            None => {
                warn!("skipping missing predictor '{name}'");
                false
            }
        })
        .cloned()
        .collect()
}

/// Condition number of XᵀX for the given basis, or `None` on failure.
fn basis_condition_number(basis: &Array2<f64>) -> Option<f64> {
    let x = DMatrix::from_fn(basis.nrows(), basis.ncols(), |i, j| basis[[i, j]]);
    let xtx = x.transpose() * x;
    let svd = xtx.svd(false, false);

    let mut s_max = 0.0_f64;
    let mut s_min = f64::INFINITY;
    for s in svd.singular_values.iter() {
        s_max = s_max.max(*s);
        s_min = s_min.min(*s);
    }

    let cond = s_max / s_min;
    if cond.is_finite() {
        Some(cond)
    } else {
        warn!("collinearity check failed: singular simplified basis");
        None
    }
}

/// Screening-stage work for one response: full-model fit and ANOVA.
fn screen_response(
    full_basis: &Array2<f64>,
    x_std: &Array2<f64>,
    predictors: &[String],
    terms: &[Term],
    table: &Table,
    response: &str,
) -> Result<Vec<AnovaRow>> {
    let y = table.column_vec(response)?;
    let model = fit::fit(response, &y, full_basis, terms)?;
    anova::type3_table(x_std, predictors, &model)
}

/// Reporting-stage work for one response: simplified fit plus all derived
/// tables. Rescale failure is absorbed into the uncoded block.
fn model_response(
    basis: &Array2<f64>,
    x_std: &Array2<f64>,
    predictors: &[String],
    terms: &[Term],
    standardizer: &Standardizer,
    table: &Table,
    response: &str,
) -> Result<(ResponseModel, Vec<AnovaRow>)> {
    let y = table.column_vec(response)?;
    let model = fit::fit(response, &y, basis, terms)?;
    let anova_table = anova::type3_table(x_std, predictors, &model)?;
    let lof = lack_of_fit::decompose(table, predictors, &model);

    let uncoded = match rescale::uncode_estimates(&model, standardizer) {
        Ok(estimates) => UncodedOutcome::Estimates(estimates),
        Err(err) => {
            warn!("uncoded estimates for '{response}' failed: {err}");
            UncodedOutcome::Failed {
                message: err.to_string(),
            }
        }
    };

    let report = ResponseModel {
        model,
        anova: anova_table.clone(),
        uncoded,
        lack_of_fit: lof,
    };
    Ok((report, anova_table))
}

/// Run the complete screening analysis.
///
/// `responses` and `predictors` name columns of `table`; predictors are
/// defensively re-filtered for variation. Standardization statistics are
/// computed once and reused for both model stages and for rescaling.
///
/// Per-response model failures become error markers under that response's
/// entry; sibling responses still report full results.
///
/// # Errors
///
/// * [`Error::MissingColumn`] if a response column is absent.
/// * [`Error::InsufficientPredictors`] if fewer than two predictors with
///   variation remain.
/// * [`Error::Standardization`] if a predictor cannot be standardized.
/// * [`Error::NoUsableModels`] if no response produces a full model.
pub fn analyze(
    table: &Table,
    responses: &[String],
    predictors: &[String],
    config: &AnalysisConfig,
) -> Result<AnalysisResult> {
    for response in responses {
        if !table.has_column(response) {
            return Err(Error::MissingColumn {
                name: response.clone(),
            });
        }
    }
    if responses.is_empty() {
        return Err(Error::MissingColumn {
            name: "<response>".to_string(),
        });
    }

    let retained = filter_predictors(table, predictors);
    if retained.len() < 2 {
        return Err(Error::InsufficientPredictors {
            found: retained.len(),
        });
    }

    let standardizer = Standardizer::fit(table, &retained)?;
    let x_std = standardizer.transform(table)?;
    let full_terms = response_surface_terms(&retained);
    let full_basis = fit::build_basis(&x_std, &retained, &full_terms)?;
    debug!(
        "screening {} responses over {} terms from {} predictors",
        responses.len(),
        full_terms.len(),
        retained.len()
    );

    // Stage 1: full-model LogWorth scan across all responses.
    let screened: Vec<(String, Result<Vec<AnovaRow>>)> = map_responses(responses, |response| {
        let result = screen_response(
            &full_basis,
            &x_std,
            &retained,
            &full_terms,
            table,
            response,
        );
        (response.clone(), result)
    });

    let mut screen_tables: Vec<(String, Vec<AnovaRow>)> = Vec::new();
    for (response, result) in screened {
        match result {
            Ok(rows) => screen_tables.push((response, rows)),
            Err(err) => warn!("full model for '{response}' failed: {err}"),
        }
    }
    if screen_tables.is_empty() {
        return Err(Error::NoUsableModels);
    }

    let effects = effects::aggregate_effects(&screen_tables, config.threshold);
    let simplified_terms =
        effects::simplify_factors(&effects, config.threshold, config.min_significant);
    let fallback_used = simplified_terms.is_empty();

    // Designed fallback: an empty selection refits the full linear model.
    let model_terms: Vec<Term> = if fallback_used {
        retained.iter().map(Term::main).collect()
    } else {
        simplified_terms.clone()
    };
    let model_basis = fit::build_basis(&x_std, &retained, &model_terms)?;

    // Collinearity diagnostic over the simplified basis only; the empty
    // selection has no basis to check.
    let condition_number = if fallback_used {
        None
    } else {
        basis_condition_number(&model_basis)
    };

    // Stage 2: simplified models, one report per response.
    let modeled: Vec<(String, Result<(ResponseModel, Vec<AnovaRow>)>)> =
        map_responses(responses, |response| {
            let result = model_response(
                &model_basis,
                &x_std,
                &retained,
                &model_terms,
                &standardizer,
                table,
                response,
            );
            (response.clone(), result)
        });

    let mut reports = Vec::with_capacity(responses.len());
    let mut simplified_tables: Vec<(String, Vec<AnovaRow>)> = Vec::new();
    for (response, result) in modeled {
        match result {
            Ok((report, anova_rows)) => {
                simplified_tables.push((response.clone(), anova_rows));
                reports.push(ResponseReport {
                    response,
                    outcome: ResponseOutcome::Fitted(Box::new(report)),
                });
            }
            Err(err) => {
                warn!("simplified model for '{response}' failed: {err}");
                reports.push(ResponseReport {
                    response,
                    outcome: ResponseOutcome::Failed {
                        message: err.to_string(),
                    },
                });
            }
        }
    }

    let simplified_effects = if simplified_tables.is_empty() {
        None
    } else {
        Some(effects::aggregate_effects(
            &simplified_tables,
            config.threshold,
        ))
    };

    Ok(AnalysisResult {
        effects,
        simplified_terms,
        fallback_used,
        condition_number,
        simplified_effects,
        responses: reports,
        parameters: AnalysisParameters {
            threshold: config.threshold,
            min_significant: config.min_significant,
            responses: responses.to_vec(),
            predictors: retained,
        },
    })
}
