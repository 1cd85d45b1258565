//! Response-surface model terms.
//!
//! A [`Term`] is a typed variant over main effects, quadratic effects, and
//! pairwise interactions. Factor identifiers are opaque strings: they may
//! contain `*`, spaces, or parentheses without ever being re-parsed,
//! because the variant — not a rendered formula — is the term's identity.
//! [`Term::label`] exists for display only.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single model term over named factors.
///
/// The derived `Ord` sorts mains before quadratics before interactions,
/// lexicographically within each kind; this is the stable order used for
/// the simplified term set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Term {
    /// Linear main effect of one factor.
    Main(String),
    /// Squared effect of one factor.
    Quadratic(String),
    /// Pairwise interaction of two factors, kept in builder order.
    Interaction(String, String),
}

impl Term {
    /// Main-effect term for `factor`.
    #[must_use]
    pub fn main(factor: impl Into<String>) -> Self {
        Self::Main(factor.into())
    }

    /// Quadratic term for `factor`.
    #[must_use]
    pub fn quadratic(factor: impl Into<String>) -> Self {
        Self::Quadratic(factor.into())
    }

    /// Interaction term for the unordered pair `{a, b}`.
    ///
    /// The pair is stored in the order given; the builder always passes
    /// factors in input order, so equal pairs compare equal in practice.
    #[must_use]
    pub fn interaction(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::Interaction(a.into(), b.into())
    }

    /// Display label for diagnostics and reports.
    ///
    /// Generated from the variant; never parsed back.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Main(a) => a.clone(),
            Self::Quadratic(a) => format!("{a}^2"),
            Self::Interaction(a, b) => format!("{a}*{b}"),
        }
    }

    /// Main-effect factors implied by this term under hierarchy closure.
    #[must_use]
    pub fn parent_factors(&self) -> Vec<&str> {
        match self {
            Self::Main(a) | Self::Quadratic(a) => vec![a],
            Self::Interaction(a, b) => vec![a, b],
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Generate the candidate term list for a response-surface model.
///
/// With at most 4 predictors the model is linear plus pairwise
/// interactions; with more than 4 it is the full response surface with
/// quadratic terms. The threshold is a deliberate policy for small
/// designs, preserved exactly.
///
/// Order is deterministic: all mains in input order, then (if emitted)
/// all quadratics in input order, then pairwise interactions enumerated
/// as `(i, j)` with `i < j` over input positions.
#[must_use]
pub fn response_surface_terms(predictors: &[String]) -> Vec<Term> {
    let mut terms: Vec<Term> = predictors.iter().map(Term::main).collect();

    if predictors.len() > 4 {
        terms.extend(predictors.iter().map(Term::quadratic));
    }

    for i in 0..predictors.len() {
        for j in (i + 1)..predictors.len() {
            terms.push(Term::interaction(&predictors[i], &predictors[j]));
        }
    }

    terms
}
