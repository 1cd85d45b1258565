//! Effect aggregation and factor simplification.
//!
//! Merges per-response ANOVA LogWorth tables into one ranked matrix
//! (outer join on term identity; absent terms contribute zero evidence),
//! then selects the simplified term set and closes it under hierarchy:
//! every retained interaction or quadratic implies its parent main
//! effects.

use std::collections::{BTreeSet, HashMap};

use super::types::{AnovaRow, EffectMatrix, EffectRow};
use crate::term::Term;

/// Median of a non-empty slice (mean of the middle two for even length).
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Outer-join per-response ANOVA tables into a ranked effect matrix.
///
/// `tables` pairs each successfully modeled response with its ANOVA rows.
/// Terms missing from a response's table receive LogWorth 0 for that
/// response. Rows are sorted descending by maximum LogWorth; ties keep
/// join order (first table's order, then new terms in encounter order),
/// so repeated runs rank identically.
#[must_use]
pub fn aggregate_effects(tables: &[(String, Vec<AnovaRow>)], threshold: f64) -> EffectMatrix {
    let responses: Vec<String> = tables.iter().map(|(name, _)| name.clone()).collect();
    let n_resp = responses.len();

    let mut order: Vec<Term> = Vec::new();
    let mut index: HashMap<Term, usize> = HashMap::new();
    let mut scores: Vec<Vec<f64>> = Vec::new();

    for (col, (_, rows)) in tables.iter().enumerate() {
        for row in rows {
            let at = *index.entry(row.term.clone()).or_insert_with(|| {
                order.push(row.term.clone());
                scores.push(vec![0.0; n_resp]);
                order.len() - 1
            });
            scores[at][col] = row.log_worth;
        }
    }

    let mut rows: Vec<EffectRow> = order
        .into_iter()
        .zip(scores)
        .map(|(term, log_worths)| {
            let med = median(&log_worths);
            let max = log_worths.iter().copied().fold(0.0_f64, f64::max);
            let significant = log_worths.iter().filter(|&&lw| lw > threshold).count();
            EffectRow {
                term,
                log_worths,
                median: med,
                max,
                significant,
            }
        })
        .collect();

    // Stable sort keeps join order on equal maxima.
    rows.sort_by(|a, b| b.max.partial_cmp(&a.max).unwrap_or(std::cmp::Ordering::Equal));

    EffectMatrix { responses, rows }
}

/// Select significant terms and close the selection under hierarchy.
///
/// A term is selected when its maximum LogWorth reaches `threshold` or it
/// is significant in at least `min_significant` responses. Every selected
/// `Interaction(a, b)` pulls in `Main(a)` and `Main(b)`; every selected
/// `Quadratic(a)` pulls in `Main(a)`. The closed set is returned in the
/// stable `Term` sort order.
///
/// An empty result is the designed fallback signal, not an error: the
/// caller then fits the full linear term list instead.
#[must_use]
pub fn simplify_factors(
    matrix: &EffectMatrix,
    threshold: f64,
    min_significant: usize,
) -> Vec<Term> {
    let mut closed: BTreeSet<Term> = BTreeSet::new();

    for row in &matrix.rows {
        if row.max >= threshold || row.significant >= min_significant {
            for factor in row.term.parent_factors() {
                closed.insert(Term::main(factor));
            }
            closed.insert(row.term.clone());
        }
    }

    closed.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stats::log_worth;

    fn row(term: Term, p: f64) -> AnovaRow {
        AnovaRow {
            term,
            sum_of_squares: 1.0,
            df: 1,
            f_ratio: 1.0,
            p_value: p,
            log_worth: log_worth(p),
        }
    }

    #[test]
    fn test_outer_join_fills_zero() {
        let tables = vec![
            (
                "y1".to_string(),
                vec![row(Term::main("A"), 0.001), row(Term::main("B"), 0.5)],
            ),
            (
                "y2".to_string(),
                vec![
                    row(Term::main("B"), 0.01),
                    row(Term::interaction("A", "B"), 0.2),
                ],
            ),
        ];

        let matrix = aggregate_effects(&tables, 1.3);
        assert_eq!(matrix.responses, vec!["y1", "y2"]);
        assert_eq!(matrix.rows.len(), 3);

        let a = matrix
            .rows
            .iter()
            .find(|r| r.term == Term::main("A"))
            .unwrap();
        // A never appeared in y2's table: zero evidence, not missing.
        assert_eq!(a.log_worths[1], 0.0);
        assert!((a.max - 3.0).abs() < 1e-12);

        let ab = matrix
            .rows
            .iter()
            .find(|r| r.term == Term::interaction("A", "B"))
            .unwrap();
        assert_eq!(ab.log_worths[0], 0.0);
    }

    #[test]
    fn test_ranking_and_counts() {
        let tables = vec![
            (
                "y1".to_string(),
                vec![row(Term::main("A"), 0.001), row(Term::main("B"), 0.04)],
            ),
            (
                "y2".to_string(),
                vec![row(Term::main("A"), 0.02), row(Term::main("B"), 0.9)],
            ),
        ];

        let matrix = aggregate_effects(&tables, 1.3);
        // A (max=3) ranks above B (max=log_worth(0.04)~1.4)
        assert_eq!(matrix.rows[0].term, Term::main("A"));
        assert_eq!(matrix.rows[0].significant, 2);
        assert_eq!(matrix.rows[1].significant, 1);

        // Median of two values is their mean
        let expected = (log_worth(0.001) + log_worth(0.02)) / 2.0;
        assert!((matrix.rows[0].median - expected).abs() < 1e-12);
    }

    #[test]
    fn test_simplify_threshold_and_count_paths() {
        let tables = vec![
            (
                "y1".to_string(),
                vec![
                    row(Term::main("A"), 1e-6),
                    row(Term::main("B"), 0.03),
                    row(Term::main("C"), 0.9),
                ],
            ),
            (
                "y2".to_string(),
                vec![
                    row(Term::main("A"), 0.5),
                    row(Term::main("B"), 0.03),
                    row(Term::main("C"), 0.8),
                ],
            ),
        ];
        let matrix = aggregate_effects(&tables, 1.3);

        // A and B clear the max threshold; C clears neither gate
        let simplified = simplify_factors(&matrix, 1.3, 2);
        assert_eq!(simplified, vec![Term::main("A"), Term::main("B")]);

        // A zero count requirement admits every term through the count gate
        let simplified = simplify_factors(&matrix, 1.3, 0);
        assert_eq!(
            simplified,
            vec![Term::main("A"), Term::main("B"), Term::main("C")]
        );
    }

    #[test]
    fn test_hierarchy_closure() {
        let tables = vec![(
            "y1".to_string(),
            vec![
                row(Term::interaction("A", "B"), 1e-8),
                row(Term::quadratic("C"), 1e-5),
                row(Term::main("A"), 0.99),
                row(Term::main("B"), 0.99),
                row(Term::main("C"), 0.99),
            ],
        )];
        let matrix = aggregate_effects(&tables, 1.3);
        let simplified = simplify_factors(&matrix, 1.3, 1);

        // Parents are pulled in even though they scored nothing.
        assert!(simplified.contains(&Term::main("A")));
        assert!(simplified.contains(&Term::main("B")));
        assert!(simplified.contains(&Term::main("C")));
        assert!(simplified.contains(&Term::interaction("A", "B")));
        assert!(simplified.contains(&Term::quadratic("C")));
        assert_eq!(simplified.len(), 5);
    }

    #[test]
    fn test_closure_invariant_exhaustive() {
        // Every subset of a mixed term pool must produce a closed set.
        let pool = [
            Term::main("A"),
            Term::main("B"),
            Term::quadratic("A"),
            Term::interaction("A", "B"),
            Term::interaction("B", "C"),
            Term::quadratic("C"),
        ];

        for mask in 0u32..(1 << pool.len()) {
            let rows: Vec<AnovaRow> = pool
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    let p = if mask & (1 << i) != 0 { 1e-6 } else { 0.99 };
                    row(t.clone(), p)
                })
                .collect();
            let matrix = aggregate_effects(&[("y".to_string(), rows)], 1.3);
            let simplified = simplify_factors(&matrix, 1.3, 1);

            for term in &simplified {
                for factor in term.parent_factors() {
                    assert!(
                        simplified.contains(&Term::main(factor)),
                        "selection {mask:b}: {term} retained without Main({factor})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_empty_selection() {
        let tables = vec![(
            "y1".to_string(),
            vec![row(Term::main("A"), 0.9), row(Term::main("B"), 0.8)],
        )];
        let matrix = aggregate_effects(&tables, 1.3);
        let simplified = simplify_factors(&matrix, 1.3, 1);
        assert!(simplified.is_empty());
    }
}
