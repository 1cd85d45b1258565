//! Ordinary-least-squares model fitting.
//!
//! Builds the basis matrix for a term list over the standardized design
//! (main → column, quadratic → squared column, interaction → elementwise
//! product, plus an intercept column) and solves the normal equations via
//! Cholesky factorization. Fit failures are per-response: a rank-deficient
//! basis or non-finite values fail this response only.

use nalgebra::{Cholesky, DMatrix, DVector};
use ndarray::Array2;

use super::stats::{log_worth, t_two_sided_probability};
use super::types::{CoefficientEstimate, FittedModel};
use crate::error::{Error, Result};
use crate::term::Term;

/// Build the intercept-augmented basis matrix for `terms` over the
/// standardized predictor matrix.
///
/// Column 0 is the intercept; columns `1..=terms.len()` follow term order.
///
/// # Errors
///
/// Returns [`Error::MissingColumn`] if a term references a factor outside
/// `predictors`.
pub fn build_basis(
    x_std: &Array2<f64>,
    predictors: &[String],
    terms: &[Term],
) -> Result<Array2<f64>> {
    let index_of = |name: &str| -> Result<usize> {
        predictors
            .iter()
            .position(|p| p == name)
            .ok_or_else(|| Error::MissingColumn {
                name: name.to_string(),
            })
    };

    let n = x_std.nrows();
    let mut basis = Array2::zeros((n, terms.len() + 1));
    basis.column_mut(0).fill(1.0);

    for (k, term) in terms.iter().enumerate() {
        let j = k + 1;
        match term {
            Term::Main(a) => {
                let ia = index_of(a)?;
                for i in 0..n {
                    basis[[i, j]] = x_std[[i, ia]];
                }
            }
            Term::Quadratic(a) => {
                let ia = index_of(a)?;
                for i in 0..n {
                    basis[[i, j]] = x_std[[i, ia]] * x_std[[i, ia]];
                }
            }
            Term::Interaction(a, b) => {
                let ia = index_of(a)?;
                let ib = index_of(b)?;
                for i in 0..n {
                    basis[[i, j]] = x_std[[i, ia]] * x_std[[i, ib]];
                }
            }
        }
    }

    Ok(basis)
}

/// Solve the normal equations for `basis`, returning the Cholesky factor's
/// solution and unscaled covariance.
fn solve_normal_equations(
    basis: &Array2<f64>,
    y: &DVector<f64>,
) -> Result<(DVector<f64>, DMatrix<f64>, DMatrix<f64>)> {
    let n = basis.nrows();
    let p = basis.ncols();

    let x = DMatrix::from_fn(n, p, |i, j| basis[[i, j]]);
    let xtx = x.transpose() * &x;
    let xty = x.transpose() * y;

    let chol = Cholesky::new(xtx).ok_or(Error::RankDeficient { params: p })?;
    let beta = chol.solve(&xty);
    let cov_unscaled = chol.inverse();
    Ok((beta, cov_unscaled, x))
}

/// Residual sum of squares of an OLS fit of `y` on `basis`.
///
/// Used by the Type-III decomposition to score reduced models without
/// materializing full fit records.
pub(crate) fn residual_ss(basis: &Array2<f64>, y: &[f64]) -> Result<f64> {
    let yv = DVector::from_iterator(y.len(), y.iter().copied());
    let (beta, _, x) = solve_normal_equations(basis, &yv)?;
    let resid = &yv - x * beta;
    Ok(resid.iter().map(|r| r * r).sum())
}

/// Fit an ordinary-least-squares regression of `y` on the basis built for
/// `terms`, producing the full model record.
///
/// # Errors
///
/// * [`Error::NonFiniteDesign`] if `y` or the basis contains NaN/inf.
/// * [`Error::TooFewObservations`] if there is no residual degree of freedom.
/// * [`Error::RankDeficient`] if the normal equations cannot be solved.
pub fn fit(response: &str, y: &[f64], basis: &Array2<f64>, terms: &[Term]) -> Result<FittedModel> {
    let n = basis.nrows();
    let p = basis.ncols();
    debug_assert_eq!(p, terms.len() + 1);

    if y.len() != n {
        return Err(Error::ColumnLengthMismatch {
            column: response.to_string(),
            expected: n,
            actual: y.len(),
        });
    }
    if y.iter().any(|v| !v.is_finite()) || basis.iter().any(|v| !v.is_finite()) {
        return Err(Error::NonFiniteDesign {
            response: response.to_string(),
        });
    }
    if n <= p {
        return Err(Error::TooFewObservations { rows: n, params: p });
    }

    let yv = DVector::from_iterator(n, y.iter().copied());
    let (beta, cov_unscaled, x) = solve_normal_equations(basis, &yv)?;

    let fitted_v = &x * &beta;
    let resid_v = &yv - &fitted_v;
    let rss: f64 = resid_v.iter().map(|r| r * r).sum();

    let mean_y = y.iter().sum::<f64>() / n as f64;
    let tss: f64 = y.iter().map(|v| (v - mean_y).powi(2)).sum();

    let residual_df = n - p;
    let sigma2 = rss / residual_df as f64;
    let rmse = sigma2.sqrt();

    let r_squared = if tss > 0.0 { 1.0 - rss / tss } else { 0.0 };
    let adj_r_squared =
        1.0 - (1.0 - r_squared) * (n as f64 - 1.0) / (residual_df as f64);

    let mut coefficients = Vec::with_capacity(p);
    for j in 0..p {
        let value = beta[j];
        let var_j = (sigma2 * cov_unscaled[(j, j)]).max(0.0);
        let std_error = var_j.sqrt();
        let t_statistic = if std_error > 0.0 {
            value / std_error
        } else if value == 0.0 {
            0.0
        } else {
            f64::INFINITY * value.signum()
        };
        let p_value = t_two_sided_probability(t_statistic, residual_df);

        let (term, label) = if j == 0 {
            (None, "Intercept".to_string())
        } else {
            (Some(terms[j - 1].clone()), terms[j - 1].label())
        };

        coefficients.push(CoefficientEstimate {
            term,
            label,
            value,
            std_error,
            t_statistic,
            p_value,
            log_worth: log_worth(p_value),
        });
    }

    Ok(FittedModel {
        response: response.to_string(),
        terms: terms.to_vec(),
        coefficients,
        r_squared,
        adj_r_squared,
        rmse,
        mean_response: mean_y,
        observations: n,
        residual_ss: rss,
        residual_df,
        residuals: resid_v.iter().copied().collect(),
        fitted: fitted_v.iter().copied().collect(),
        actual: y.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_factor_design() -> (Array2<f64>, Vec<String>) {
        // Standardized +/-1 full factorial, duplicated
        let x = array![
            [-1.0, -1.0],
            [-1.0, 1.0],
            [1.0, -1.0],
            [1.0, 1.0],
            [-1.0, -1.0],
            [-1.0, 1.0],
            [1.0, -1.0],
            [1.0, 1.0],
        ];
        (x, vec!["A".to_string(), "B".to_string()])
    }

    #[test]
    fn test_basis_columns() {
        let (x, preds) = two_factor_design();
        let terms = vec![
            Term::main("A"),
            Term::quadratic("B"),
            Term::interaction("A", "B"),
        ];
        let basis = build_basis(&x, &preds, &terms).unwrap();

        assert_eq!(basis.ncols(), 4);
        for i in 0..x.nrows() {
            assert_eq!(basis[[i, 0]], 1.0);
            assert_eq!(basis[[i, 1]], x[[i, 0]]);
            assert_eq!(basis[[i, 2]], x[[i, 1]] * x[[i, 1]]);
            assert_eq!(basis[[i, 3]], x[[i, 0]] * x[[i, 1]]);
        }
    }

    #[test]
    fn test_basis_unknown_factor() {
        let (x, preds) = two_factor_design();
        let terms = vec![Term::main("C")];
        assert!(matches!(
            build_basis(&x, &preds, &terms),
            Err(Error::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_fit_recovers_known_coefficients() {
        let (x, preds) = two_factor_design();
        let terms = vec![Term::main("A"), Term::main("B")];
        let basis = build_basis(&x, &preds, &terms).unwrap();

        // y = 5 + 3*A - 2*B exactly
        let y: Vec<f64> = (0..8)
            .map(|i| 5.0 + 3.0 * x[[i, 0]] - 2.0 * x[[i, 1]])
            .collect();

        let model = fit("y", &y, &basis, &terms).unwrap();
        assert!((model.coefficients[0].value - 5.0).abs() < 1e-10);
        assert!((model.coefficients[1].value - 3.0).abs() < 1e-10);
        assert!((model.coefficients[2].value + 2.0).abs() < 1e-10);
        assert!(model.r_squared > 0.999_999);
        assert_eq!(model.observations, 8);
        assert_eq!(model.residual_df, 5);
    }

    #[test]
    fn test_fit_with_noise_has_sane_inference() {
        let (x, preds) = two_factor_design();
        let terms = vec![Term::main("A"), Term::main("B")];
        let basis = build_basis(&x, &preds, &terms).unwrap();

        // Strong A effect, pure-noise B effect
        let noise = [0.3, -0.2, 0.1, -0.4, 0.2, -0.1, 0.4, -0.3];
        let y: Vec<f64> = (0..8).map(|i| 10.0 + 6.0 * x[[i, 0]] + noise[i]).collect();

        let model = fit("y", &y, &basis, &terms).unwrap();
        let a = &model.coefficients[1];
        let b = &model.coefficients[2];
        assert!(a.p_value < 0.001, "A should be significant: p={}", a.p_value);
        assert!(b.p_value > 0.1, "B should not be significant: p={}", b.p_value);
        assert!(a.log_worth > b.log_worth);
        assert!(model.rmse > 0.0);

        // Residuals sum to ~0 with an intercept in the model
        let sum: f64 = model.residuals.iter().sum();
        assert!(sum.abs() < 1e-9);
    }

    #[test]
    fn test_fit_too_few_observations() {
        let x = array![[-1.0, -1.0], [1.0, 1.0], [0.0, 1.0]];
        let preds = vec!["A".to_string(), "B".to_string()];
        let terms = vec![Term::main("A"), Term::main("B")];
        let basis = build_basis(&x, &preds, &terms).unwrap();
        let y = vec![1.0, 2.0, 3.0];

        assert!(matches!(
            fit("y", &y, &basis, &terms),
            Err(Error::TooFewObservations { rows: 3, params: 3 })
        ));
    }

    #[test]
    fn test_fit_rank_deficient() {
        let (x, preds) = two_factor_design();
        // Quadratic of a +/-1 column is constant, collinear with intercept
        let terms = vec![Term::main("A"), Term::quadratic("A")];
        let basis = build_basis(&x, &preds, &terms).unwrap();
        let y = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];

        assert!(matches!(
            fit("y", &y, &basis, &terms),
            Err(Error::RankDeficient { .. })
        ));
    }

    #[test]
    fn test_fit_non_finite_rejected() {
        let (x, preds) = two_factor_design();
        let terms = vec![Term::main("A"), Term::main("B")];
        let basis = build_basis(&x, &preds, &terms).unwrap();
        let mut y = vec![1.0; 8];
        y[3] = f64::NAN;

        assert!(matches!(
            fit("y", &y, &basis, &terms),
            Err(Error::NonFiniteDesign { .. })
        ));
    }
}
