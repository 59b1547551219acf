//! This module contains the variable-ordering heuristics which a search
//! driver consults at every node to decide which variable to branch on.
//!
//! Heuristics only read the CSP. They are deterministic: ties are broken in
//! favor of the variable that was created first.

use crate::csp::{Csp, VariableId};

use serde::{Deserialize, Serialize};

/// A trait for heuristics which select the next variable to branch on.
pub trait VariableOrdering {

    /// Selects an unassigned variable of `csp`, or returns `None` if every
    /// variable is assigned.
    fn select(&self, csp: &Csp) -> Option<VariableId>;
}

/// Returns the first unassigned variable, in creation order, that has the
/// strictly greatest key among all unassigned variables.
fn first_maximum<F>(csp: &Csp, mut key: F) -> Option<VariableId>
where
    F: FnMut(VariableId) -> usize
{
    let mut best: Option<(VariableId, usize)> = None;

    for variable in csp.unassigned_variables() {
        let score = key(variable);

        match best {
            Some((_, best_score)) if best_score >= score => {},
            _ => best = Some((variable, score))
        }
    }

    best.map(|(variable, _)| variable)
}

/// The degree heuristic: selects the variable which occurs in the most
/// constraints that still have at least two unassigned variables, that is,
/// the variable that constrains the most other unassigned variables.
#[derive(Clone, Copy, Debug, Default)]
pub struct DegreeOrdering;

impl DegreeOrdering {

    /// Counts the constraints on `variable` with at least two unassigned
    /// scope variables.
    pub fn degree(csp: &Csp, variable: VariableId) -> usize {
        csp.constraints_with(variable).iter()
            .filter(|&&constraint| csp.unassigned_count(constraint) >= 2)
            .count()
    }
}

impl VariableOrdering for DegreeOrdering {
    fn select(&self, csp: &Csp) -> Option<VariableId> {
        first_maximum(csp, |variable| DegreeOrdering::degree(csp, variable))
    }
}

/// The minimum-remaining-values heuristic: selects the variable with the
/// smallest current domain, which is the one most likely to fail early.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinimumRemainingValues;

impl VariableOrdering for MinimumRemainingValues {
    fn select(&self, csp: &Csp) -> Option<VariableId> {
        // Current domains never exceed the largest full domain, so the
        // inverted size is a valid key.
        let bound = csp.variables().iter()
            .map(|variable| variable.domain_size())
            .max()
            .unwrap_or(0);

        first_maximum(csp,
            |variable| bound - csp.variable(variable).current_domain_size())
    }
}

/// An enumeration of the heuristics in this module, which can be chosen by
/// configuration. It implements [VariableOrdering] by delegating to the
/// selected heuristic.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum OrderingKind {

    /// Delegates to [DegreeOrdering].
    Degree,

    /// Delegates to [MinimumRemainingValues].
    MinimumRemainingValues
}

impl Default for OrderingKind {
    fn default() -> OrderingKind {
        OrderingKind::MinimumRemainingValues
    }
}

impl VariableOrdering for OrderingKind {
    fn select(&self, csp: &Csp) -> Option<VariableId> {
        match self {
            OrderingKind::Degree => DegreeOrdering.select(csp),
            OrderingKind::MinimumRemainingValues =>
                MinimumRemainingValues.select(csp)
        }
    }
}
