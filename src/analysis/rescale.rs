//! Coefficient rescaling to original measurement units.
//!
//! Converts coded (standardized-scale) coefficients to uncoded estimates:
//! a main effect divides by its factor's scale, a quadratic by the scale
//! squared, an interaction by the product of both scales. The intercept is
//! rebuilt from the mean observed response minus the main-effect
//! contributions at the predictor means.
//!
//! The intercept correction deliberately ignores quadratic and interaction
//! terms; exact uncoding of a full surface would need second moments of
//! the predictors. This approximate convention is preserved because
//! downstream consumers depend on its numbers.

use super::types::{FittedModel, UncodedEstimate};
use crate::error::{Error, Result};
use crate::standardize::Standardizer;
use crate::term::Term;

/// Rescale the coded coefficients of `model` to original units.
///
/// The intercept entry comes first, followed by all other terms in their
/// coded order.
///
/// # Errors
///
/// Returns [`Error::UnknownRescaleFactor`] if any term references a factor
/// outside the standardizer's predictor set. The caller replaces the
/// uncoded block with an error marker; coded results stay intact.
pub fn uncode_estimates(
    model: &FittedModel,
    standardizer: &Standardizer,
) -> Result<Vec<UncodedEstimate>> {
    let scales = standardizer.scales();
    let means = standardizer.means();

    let index_of = |factor: &str, term: &Term| -> Result<usize> {
        standardizer
            .index_of(factor)
            .ok_or_else(|| Error::UnknownRescaleFactor { term: term.label() })
    };

    let mut uncoded: Vec<(Option<usize>, UncodedEstimate)> = Vec::new();

    for coef in &model.coefficients {
        let Some(term) = &coef.term else {
            continue; // intercept handled below
        };

        let estimate = match term {
            Term::Main(a) => {
                let i = index_of(a, term)?;
                uncoded.push((
                    Some(i),
                    UncodedEstimate {
                        label: coef.label.clone(),
                        estimate: coef.value / scales[i],
                    },
                ));
                continue;
            }
            Term::Quadratic(a) => {
                let i = index_of(a, term)?;
                coef.value / (scales[i] * scales[i])
            }
            Term::Interaction(a, b) => {
                let i = index_of(a, term)?;
                let j = index_of(b, term)?;
                coef.value / (scales[i] * scales[j])
            }
        };

        uncoded.push((
            None,
            UncodedEstimate {
                label: coef.label.clone(),
                estimate,
            },
        ));
    }

    // Intercept: mean response minus main-effect contributions at the
    // predictor means. Quadratics and interactions contribute nothing
    // here (approximate uncoding).
    let mut intercept = model.mean_response;
    for (main_index, entry) in &uncoded {
        if let Some(i) = main_index {
            intercept -= entry.estimate * means[*i];
        }
    }

    let mut out = Vec::with_capacity(uncoded.len() + 1);
    out.push(UncodedEstimate {
        label: "Intercept".to_string(),
        estimate: intercept,
    });
    out.extend(uncoded.into_iter().map(|(_, e)| e));
    Ok(out)
}
