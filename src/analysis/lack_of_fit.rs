//! Lack-of-fit versus pure-error decomposition.
//!
//! Rows sharing the exact tuple of raw predictor values form a replicate
//! configuration. Within-configuration scatter is pure experimental noise;
//! deviation of configuration means from the model's predictions is
//! systematic lack of fit. An F-test of the two mean squares judges model
//! adequacy. With no replicates or a saturated model the respective side
//! is reported as `None` ("not testable"), never as an error.

use std::collections::HashMap;

use super::stats::f_tail_probability;
use super::types::{ErrorComponent, FittedModel, LackOfFitResult, TotalError};
use crate::table::Table;

/// Group rows by the bit-exact tuple of raw predictor values.
///
/// Grouping uses the original unstandardized columns: replicates are
/// defined by what was actually run, not by any derived value.
fn configuration_groups(table: &Table, predictors: &[String]) -> Vec<Vec<usize>> {
    let columns: Vec<_> = predictors
        .iter()
        .filter_map(|name| table.column(name))
        .collect();

    let mut order: Vec<Vec<usize>> = Vec::new();
    let mut index: HashMap<Vec<u64>, usize> = HashMap::new();

    for row in 0..table.nrows() {
        let key: Vec<u64> = columns.iter().map(|col| col[row].to_bits()).collect();
        match index.get(&key) {
            Some(&g) => order[g].push(row),
            None => {
                index.insert(key, order.len());
                order.push(vec![row]);
            }
        }
    }

    order
}

/// Decompose the residual variation of `model` into lack-of-fit and
/// pure-error components.
///
/// `table` must contain the rows the model was fit on, in the same order;
/// `predictors` are the retained predictor columns used for replicate
/// grouping.
#[must_use]
pub fn decompose(table: &Table, predictors: &[String], model: &FittedModel) -> LackOfFitResult {
    let groups = configuration_groups(table, predictors);
    let n_rows = table.nrows();
    let n_configs = groups.len();
    let n_params = model.coefficients.len();

    let mut ss_lack = 0.0;
    let mut ss_pure = 0.0;

    for rows in &groups {
        let count = rows.len() as f64;
        let y_mean = rows.iter().map(|&i| model.actual[i]).sum::<f64>() / count;
        let fit_mean = rows.iter().map(|&i| model.fitted[i]).sum::<f64>() / count;

        ss_lack += count * (y_mean - fit_mean).powi(2);
        ss_pure += rows
            .iter()
            .map(|&i| (model.actual[i] - y_mean).powi(2))
            .sum::<f64>();
    }

    let df_lack = n_configs as i64 - n_params as i64;
    let df_pure = n_rows as i64 - n_configs as i64;

    let (ms_lack, ms_pure, f_ratio, prob_f) = if df_lack > 0 && df_pure > 0 {
        let ms_lack = ss_lack / df_lack as f64;
        let ms_pure = ss_pure / df_pure as f64;
        let f_ratio = if ms_pure > 0.0 {
            Some(ms_lack / ms_pure)
        } else {
            None
        };
        let prob_f =
            f_ratio.map(|f| f_tail_probability(f, df_lack as usize, df_pure as usize));
        (Some(ms_lack), Some(ms_pure), f_ratio, prob_f)
    } else {
        (None, None, None, None)
    };

    let testable = df_lack > 0 && df_pure > 0;

    LackOfFitResult {
        lack_of_fit: ErrorComponent {
            df: (df_lack > 0).then_some(df_lack as usize),
            ss: ss_lack,
            ms: ms_lack,
        },
        pure_error: ErrorComponent {
            df: (df_pure > 0).then_some(df_pure as usize),
            ss: ss_pure,
            ms: ms_pure,
        },
        total_error: TotalError {
            df: testable.then_some((df_lack + df_pure) as usize),
            ss: ss_lack + ss_pure,
        },
        f_ratio,
        prob_f,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fit;
    use crate::standardize::Standardizer;
    use crate::term::Term;

    /// Balanced two-factor design with two replicates per configuration.
    fn replicated_table() -> Table {
        Table::from_columns(vec![
            (
                "A".to_string(),
                vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
            ),
            (
                "B".to_string(),
                vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0],
            ),
            (
                "y".to_string(),
                vec![10.0, 12.0, 14.0, 16.0, 18.0, 20.0, 22.0, 24.0],
            ),
        ])
        .unwrap()
    }

    fn fit_mains(table: &Table) -> FittedModel {
        let predictors = vec!["A".to_string(), "B".to_string()];
        let std = Standardizer::fit(table, &predictors).unwrap();
        let x = std.transform(table).unwrap();
        let terms = vec![Term::main("A"), Term::main("B")];
        let basis = fit::build_basis(&x, &predictors, &terms).unwrap();
        let y = table.column_vec("y").unwrap();
        fit::fit("y", &y, &basis, &terms).unwrap()
    }

    #[test]
    fn test_balanced_replicate_reference_values() {
        let table = replicated_table();
        let model = fit_mains(&table);
        let predictors = vec!["A".to_string(), "B".to_string()];
        let result = decompose(&table, &predictors, &model);

        // Four configurations of two rows each, deviating +/-1 from their
        // group means: pure error SS = 8 on 8 - 4 = 4 df.
        assert_eq!(result.pure_error.df, Some(4));
        assert!((result.pure_error.ss - 8.0).abs() < 1e-9);
        assert!((result.pure_error.ms.unwrap() - 2.0).abs() < 1e-9);

        // Group means (11, 15, 19, 23) are exactly additive, so the
        // two-main-effect fit reproduces them: no lack of fit on
        // 4 - 3 = 1 df.
        assert_eq!(result.lack_of_fit.df, Some(1));
        assert!(result.lack_of_fit.ss.abs() < 1e-18);
        assert!(result.f_ratio.unwrap().abs() < 1e-15);
        assert!((result.prob_f.unwrap() - 1.0).abs() < 1e-9);

        assert_eq!(result.total_error.df, Some(5));
        assert!((result.total_error.ss - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_replicates_is_not_testable() {
        let table = Table::from_columns(vec![
            ("A".to_string(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]),
            ("B".to_string(), vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0]),
            ("y".to_string(), vec![1.0, 3.0, 2.0, 5.0, 4.0, 6.0]),
        ])
        .unwrap();
        let model = fit_mains(&table);
        let predictors = vec!["A".to_string(), "B".to_string()];
        let result = decompose(&table, &predictors, &model);

        // Every row is its own configuration: pure error has 0 df.
        assert_eq!(result.pure_error.df, None);
        assert_eq!(result.pure_error.ms, None);
        assert_eq!(result.pure_error.ss, 0.0);
        assert_eq!(result.f_ratio, None);
        assert_eq!(result.prob_f, None);
        assert_eq!(result.total_error.df, None);
        // Lack-of-fit SS is still reported.
        assert_eq!(result.lack_of_fit.df, Some(3));
        assert!(result.lack_of_fit.ss > 0.0);
    }

    #[test]
    fn test_detects_genuine_lack_of_fit() {
        // Strong interaction, additive model: group means are not
        // reproduced and the F-ratio flags it.
        let table = Table::from_columns(vec![
            (
                "A".to_string(),
                vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
            ),
            (
                "B".to_string(),
                vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0],
            ),
            (
                "y".to_string(),
                vec![10.0, 10.2, 10.1, 9.9, 10.0, 10.1, 30.0, 30.2],
            ),
        ])
        .unwrap();
        let model = fit_mains(&table);
        let predictors = vec!["A".to_string(), "B".to_string()];
        let result = decompose(&table, &predictors, &model);

        let f = result.f_ratio.unwrap();
        assert!(f > 100.0, "interaction should dominate pure noise: F={f}");
        assert!(result.prob_f.unwrap() < 0.01);
    }

    #[test]
    fn test_grouping_uses_raw_values() {
        // Distinct raw values that standardize close together must stay
        // distinct configurations.
        let table = Table::from_columns(vec![
            ("A".to_string(), vec![1.0, 1.0 + 1e-12, 2.0, 2.0]),
            ("B".to_string(), vec![0.0, 0.0, 1.0, 1.0]),
            ("y".to_string(), vec![5.0, 6.0, 7.0, 8.0]),
        ])
        .unwrap();
        let groups = configuration_groups(
            &table,
            &["A".to_string(), "B".to_string()],
        );
        assert_eq!(groups.len(), 3);
    }
}
