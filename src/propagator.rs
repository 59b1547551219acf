//! This module contains the constraint propagators a backtracking search
//! calls at every node.
//!
//! Every propagator implements the [Propagator] trait. It is called once
//! before any assignment with `None` and afterwards with the variable that
//! was just assigned. It returns a [Propagation], which is either
//! inconsistent, in which case search has to backtrack, or consistent and
//! lists every value that was pruned from a current domain. The caller is
//! responsible for restoring these values, in reverse order, when it undoes
//! the assignment.
//!
//! The following contract holds for all propagators in this module:
//!
//! * A value is never pruned if it is not in the current domain, and never
//! pruned twice within one call.
//! * If the result is inconsistent, every pruning made during the call has
//! already been undone.

use crate::csp::{ConstraintId, Csp, Value, VariableId};

use log::trace;

use serde::{Deserialize, Serialize};

use std::collections::VecDeque;

/// A value that was removed from the current domain of a variable.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Pruning {

    /// The variable whose current domain was reduced.
    pub variable: VariableId,

    /// The value that was removed.
    pub value: Value
}

/// The result of a propagation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Propagation {

    /// Indicates that no inconsistency was detected. The wrapped prunings,
    /// in the order in which they were made, must be undone by the caller on
    /// backtrack.
    Consistent(Vec<Pruning>),

    /// Indicates that the current partial assignment cannot be extended to a
    /// solution. No prunings remain from the call.
    Inconsistent
}

impl Propagation {

    /// Indicates whether this is `Propagation::Consistent`.
    pub fn is_consistent(&self) -> bool {
        matches!(self, Propagation::Consistent(_))
    }

    /// Gets the prunings of a consistent propagation. For an inconsistent
    /// one, this is empty.
    pub fn prunings(&self) -> &[Pruning] {
        match self {
            Propagation::Consistent(prunings) => prunings,
            Propagation::Inconsistent => &[]
        }
    }
}

/// A trait for constraint propagators. See the [module-level
/// documentation](self) for the contract implementors must fulfill.
pub trait Propagator {

    /// Propagates the constraints of `csp`. `assigned` is the most recently
    /// assigned variable, or `None` if propagation happens before search.
    fn propagate(&self, csp: &mut Csp, assigned: Option<VariableId>)
        -> Propagation;
}

/// The prunings of a single propagator call, which can be rolled back as a
/// whole.
struct PruningLog {
    prunings: Vec<Pruning>
}

impl PruningLog {
    fn new() -> PruningLog {
        PruningLog {
            prunings: Vec::new()
        }
    }

    fn prune(&mut self, csp: &mut Csp, variable: VariableId, value: Value) {
        if csp.prune(variable, value) {
            trace!("pruned {} from {}", value, csp.variable(variable).name());
            self.prunings.push(Pruning {
                variable,
                value
            });
        }
    }

    fn fail(self, csp: &mut Csp) -> Propagation {
        for pruning in self.prunings.into_iter().rev() {
            csp.unprune(pruning.variable, pruning.value);
        }

        Propagation::Inconsistent
    }

    fn succeed(self) -> Propagation {
        Propagation::Consistent(self.prunings)
    }
}

/// Removes every value of `variable` without support in `constraint`.
/// Returns `true` if the current domain of `variable` is empty afterwards.
fn revise(csp: &mut Csp, log: &mut PruningLog, constraint: ConstraintId,
        variable: VariableId) -> bool {
    let unsupported: Vec<Value> = csp.current_domain(variable).into_iter()
        .filter(|&value| !csp.has_support(constraint, variable, value))
        .collect();

    for value in unsupported {
        log.prune(csp, variable, value);
    }

    csp.variable(variable).current_domain_size() == 0
}

/// Plain backtracking: no values are pruned. After an assignment, every
/// constraint on the assigned variable that is now fully assigned is checked.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainChecking;

impl Propagator for PlainChecking {
    fn propagate(&self, csp: &mut Csp, assigned: Option<VariableId>)
            -> Propagation {
        let variable = match assigned {
            Some(variable) => variable,
            None => return Propagation::Consistent(Vec::new())
        };

        for &id in csp.constraints_with(variable) {
            let constraint = csp.constraint(id);

            if let Some(tuple) = constraint.assigned_tuple(csp.variables()) {
                if !constraint.check_tuple(&tuple) {
                    trace!("{} violated", constraint.name());
                    return Propagation::Inconsistent;
                }
            }
        }

        Propagation::Consistent(Vec::new())
    }
}

/// Forward checking: every constraint with exactly one unassigned variable
/// left is used to remove the values of that variable which cannot complete
/// the assigned part of the scope.
///
/// Before search, the unary constraints of the CSP are applied to their
/// variables in the same way.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardChecking;

impl ForwardChecking {

    fn check_constraint(csp: &mut Csp, log: &mut PruningLog,
            constraint: ConstraintId) -> bool {
        let lone = csp.constraint(constraint).scope().iter()
            .cloned()
            .find(|&v| !csp.variable(v).is_assigned());

        match lone {
            Some(variable) => !revise(csp, log, constraint, variable),
            None => true
        }
    }
}

impl Propagator for ForwardChecking {
    fn propagate(&self, csp: &mut Csp, assigned: Option<VariableId>)
            -> Propagation {
        let mut log = PruningLog::new();
        let constraints: Vec<ConstraintId> = match assigned {
            Some(variable) => csp.constraints_with(variable).iter()
                .cloned()
                .filter(|&c| csp.unassigned_count(c) == 1)
                .collect(),
            None => csp.constraints_of_arity(1)
                .filter(|&c| csp.unassigned_count(c) == 1)
                .collect()
        };

        for constraint in constraints {
            if !ForwardChecking::check_constraint(csp, &mut log, constraint) {
                trace!("domain wipe-out in {}",
                    csp.constraint(constraint).name());
                return log.fail(csp);
            }
        }

        log.succeed()
    }
}

/// Generalized arc consistency: constraints are revised until every value
/// in every current domain has a supporting tuple in every constraint on its
/// variable.
///
/// Before search, all constraints are revised. After an assignment, the
/// constraints on the assigned variable are revised first. Whenever a
/// revision prunes values of a variable, the other constraints on that
/// variable are scheduled again, unless they are still waiting anyway.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeneralizedArcConsistency;

struct GacQueue {
    queue: VecDeque<ConstraintId>,
    queued: Vec<bool>
}

impl GacQueue {
    fn new(constraint_count: usize) -> GacQueue {
        GacQueue {
            queue: VecDeque::new(),
            queued: vec![false; constraint_count]
        }
    }

    fn push(&mut self, constraint: ConstraintId) {
        if !self.queued[constraint.index()] {
            self.queued[constraint.index()] = true;
            self.queue.push_back(constraint);
        }
    }

    fn pop(&mut self) -> Option<ConstraintId> {
        let constraint = self.queue.pop_front()?;
        self.queued[constraint.index()] = false;
        Some(constraint)
    }
}

impl GeneralizedArcConsistency {

    /// Revises the variables of `constraint` until none of them loses another
    /// value. Returns the variables whose domains changed, or `None` on a
    /// domain wipe-out.
    fn revise_constraint(csp: &mut Csp, log: &mut PruningLog,
            constraint: ConstraintId) -> Option<Vec<VariableId>> {
        let scope = csp.constraint(constraint).scope().to_vec();
        let mut changed = Vec::new();
        let mut stable = false;

        while !stable {
            stable = true;

            for &variable in &scope {
                if let Some(value) = csp.variable(variable).assigned_value() {
                    // An assigned variable cannot lose values, only conflict.
                    if !csp.has_support(constraint, variable, value) {
                        return None;
                    }

                    continue;
                }

                let before = csp.variable(variable).current_domain_size();

                if revise(csp, log, constraint, variable) {
                    return None;
                }

                if csp.variable(variable).current_domain_size() < before {
                    stable = false;

                    if !changed.contains(&variable) {
                        changed.push(variable);
                    }
                }
            }
        }

        Some(changed)
    }
}

impl Propagator for GeneralizedArcConsistency {
    fn propagate(&self, csp: &mut Csp, assigned: Option<VariableId>)
            -> Propagation {
        let mut log = PruningLog::new();
        let mut queue = GacQueue::new(csp.constraints().len());

        match assigned {
            Some(variable) => csp.constraints_with(variable).iter()
                .for_each(|&c| queue.push(c)),
            None => csp.constraint_ids().for_each(|c| queue.push(c))
        }

        while let Some(constraint) = queue.pop() {
            let changed = match GeneralizedArcConsistency::revise_constraint(
                    csp, &mut log, constraint) {
                Some(changed) => changed,
                None => {
                    trace!("domain wipe-out in {}",
                        csp.constraint(constraint).name());
                    return log.fail(csp);
                }
            };

            for variable in changed {
                for &other in csp.constraints_with(variable) {
                    if other != constraint {
                        queue.push(other);
                    }
                }
            }
        }

        log.succeed()
    }
}

/// An enumeration of the propagators in this module, which can be chosen by
/// configuration. It implements [Propagator] by delegating to the selected
/// propagator.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PropagatorKind {

    /// Delegates to [PlainChecking].
    PlainChecking,

    /// Delegates to [ForwardChecking].
    ForwardChecking,

    /// Delegates to [GeneralizedArcConsistency].
    GeneralizedArcConsistency
}

impl Default for PropagatorKind {
    fn default() -> PropagatorKind {
        PropagatorKind::GeneralizedArcConsistency
    }
}

impl Propagator for PropagatorKind {
    fn propagate(&self, csp: &mut Csp, assigned: Option<VariableId>)
            -> Propagation {
        match self {
            PropagatorKind::PlainChecking =>
                PlainChecking.propagate(csp, assigned),
            PropagatorKind::ForwardChecking =>
                ForwardChecking.propagate(csp, assigned),
            PropagatorKind::GeneralizedArcConsistency =>
                GeneralizedArcConsistency.propagate(csp, assigned)
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    use crate::{Cage, Operator, Puzzle};
    use crate::csp::Constraint;
    use crate::model;

    fn numbers(size: usize) -> Vec<Value> {
        (1..=size).map(Value::Number).collect()
    }

    fn n(number: usize) -> Value {
        Value::Number(number)
    }

    /// x < y < z over [1, 3], plus a unary constraint x != 2.
    fn ordered_triple() -> (Csp, Vec<VariableId>) {
        let mut csp = Csp::new("ordered");
        let ids: Vec<VariableId> = ["x", "y", "z"].iter()
            .map(|&name| csp.add_variable(name, numbers(3)).unwrap())
            .collect();

        for pair in ids.windows(2) {
            let mut less = Constraint::new("less", vec![pair[0], pair[1]]);
            less.add_satisfying_tuples(vec![
                vec![n(1), n(2)],
                vec![n(1), n(3)],
                vec![n(2), n(3)]
            ]).unwrap();
            csp.add_constraint(less).unwrap();
        }

        let mut unary = Constraint::new("x!=2", vec![ids[0]]);
        unary.add_satisfying_tuples(vec![vec![n(1)], vec![n(3)]]).unwrap();
        csp.add_constraint(unary).unwrap();
        (csp, ids)
    }

    fn assert_no_duplicate_prunings(propagation: &Propagation) {
        let prunings = propagation.prunings();
        assert!(!crate::util::contains_duplicate(prunings.iter()));
    }

    fn undo(csp: &mut Csp, propagation: &Propagation) {
        for pruning in propagation.prunings().iter().rev() {
            assert!(csp.unprune(pruning.variable, pruning.value));
        }
    }

    /// Checks that every remaining value of every unassigned variable has a
    /// support in every constraint on that variable.
    fn assert_arc_consistent(csp: &Csp) {
        for variable in csp.unassigned_variables() {
            for &constraint in csp.constraints_with(variable) {
                for value in csp.current_domain(variable) {
                    assert!(csp.has_support(constraint, variable, value),
                        "{} = {} unsupported in {}",
                        csp.variable(variable).name(), value,
                        csp.constraint(constraint).name());
                }
            }
        }
    }

    #[test]
    fn plain_checking_without_variable_does_nothing() {
        let (mut csp, _) = ordered_triple();
        let propagation = PlainChecking.propagate(&mut csp, None);
        assert_eq!(Propagation::Consistent(Vec::new()), propagation);
    }

    #[test]
    fn plain_checking_detects_violation() {
        let (mut csp, ids) = ordered_triple();
        csp.assign(ids[0], n(3)).unwrap();
        assert!(PlainChecking.propagate(&mut csp, Some(ids[0]))
            .is_consistent());

        csp.assign(ids[1], n(2)).unwrap();
        assert_eq!(Propagation::Inconsistent,
            PlainChecking.propagate(&mut csp, Some(ids[1])));
    }

    #[test]
    fn plain_checking_ignores_partially_assigned_constraints() {
        let (mut csp, ids) = ordered_triple();
        csp.assign(ids[1], n(1)).unwrap();

        // y = 1 admits no x, but x is not assigned yet.
        assert!(PlainChecking.propagate(&mut csp, Some(ids[1]))
            .is_consistent());
    }

    #[test]
    fn forward_checking_unary_constraints() {
        let (mut csp, ids) = ordered_triple();
        let propagation = ForwardChecking.propagate(&mut csp, None);
        assert_eq!(Propagation::Consistent(vec![Pruning {
            variable: ids[0],
            value: n(2)
        }]), propagation);
        assert_eq!(vec![n(1), n(3)], csp.current_domain(ids[0]));
    }

    #[test]
    fn forward_checking_prunes_lone_variable() {
        let (mut csp, ids) = ordered_triple();
        csp.assign(ids[1], n(2)).unwrap();
        let propagation = ForwardChecking.propagate(&mut csp, Some(ids[1]));

        assert!(propagation.is_consistent());
        assert_no_duplicate_prunings(&propagation);
        assert_eq!(vec![n(1)], csp.current_domain(ids[0]));
        assert_eq!(vec![n(3)], csp.current_domain(ids[2]));
        assert_eq!(4, propagation.prunings().len());

        csp.unassign(ids[1]).unwrap();
        undo(&mut csp, &propagation);
        assert_eq!(numbers(3), csp.current_domain(ids[0]));
        assert_eq!(numbers(3), csp.current_domain(ids[2]));
    }

    #[test]
    fn forward_checking_finds_lone_variable_anywhere_in_scope() {
        let (mut csp, ids) = ordered_triple();

        // The lone unassigned variable of y < z is the first in scope.
        csp.assign(ids[2], n(3)).unwrap();
        let propagation = ForwardChecking.propagate(&mut csp, Some(ids[2]));
        assert!(propagation.is_consistent());
        assert_eq!(vec![n(1), n(2)], csp.current_domain(ids[1]));
        assert_eq!(numbers(3), csp.current_domain(ids[0]));
    }

    #[test]
    fn forward_checking_wipe_out_restores_domains() {
        let (mut csp, ids) = ordered_triple();
        csp.assign(ids[1], n(1)).unwrap();
        let propagation = ForwardChecking.propagate(&mut csp, Some(ids[1]));

        assert_eq!(Propagation::Inconsistent, propagation);
        assert!(propagation.prunings().is_empty());
        assert_eq!(numbers(3), csp.current_domain(ids[0]));
        assert_eq!(numbers(3), csp.current_domain(ids[2]));
    }

    #[test]
    fn forward_checking_failure_undoes_earlier_constraints() {
        let (mut csp, ids) = ordered_triple();
        csp.assign(ids[1], n(3)).unwrap();

        // x < y prunes x = 3 first, then y < z leaves nothing for z.
        let propagation = ForwardChecking.propagate(&mut csp, Some(ids[1]));

        assert_eq!(Propagation::Inconsistent, propagation);
        assert_eq!(numbers(3), csp.current_domain(ids[0]));
        assert_eq!(numbers(3), csp.current_domain(ids[2]));
    }

    #[test]
    fn forward_checking_unary_failure_undoes_earlier_constraints() {
        let (mut csp, ids) = ordered_triple();
        let mut only_two = Constraint::new("x=2", vec![ids[0]]);
        only_two.add_satisfying_tuples(vec![vec![n(2)]]).unwrap();
        csp.add_constraint(only_two).unwrap();

        // x != 2 prunes 2, after which x = 2 has no supported value left.
        let propagation = ForwardChecking.propagate(&mut csp, None);

        assert_eq!(Propagation::Inconsistent, propagation);
        assert_eq!(numbers(3), csp.current_domain(ids[0]));
    }

    #[test]
    fn forward_checking_leaves_only_completable_values() {
        let puzzle = crate::tests::example_puzzle();
        let (mut csp, variables) = model::cagey_csp_model(&puzzle).unwrap();
        let cell = |row: usize, column: usize|
            variables[5 + crate::index(row, column, 3)];

        csp.assign(variables[0], Value::Operator(Operator::Add)).unwrap();
        assert!(ForwardChecking.propagate(&mut csp, Some(variables[0]))
            .is_consistent());
        csp.assign(cell(1, 1), n(1)).unwrap();
        let propagation =
            ForwardChecking.propagate(&mut csp, Some(cell(1, 1)));

        assert!(propagation.is_consistent());
        assert_eq!(vec![n(2)], csp.current_domain(cell(2, 1)));

        for &constraint in csp.constraints_with(cell(1, 1)) {
            if csp.unassigned_count(constraint) != 1 {
                continue;
            }

            let lone = csp.constraint(constraint).scope().iter()
                .cloned()
                .find(|&v| !csp.variable(v).is_assigned())
                .unwrap();

            for value in csp.current_domain(lone) {
                assert!(csp.has_support(constraint, lone, value));
            }
        }
    }

    #[test]
    fn gac_initial_propagation() {
        let (mut csp, ids) = ordered_triple();
        let propagation =
            GeneralizedArcConsistency.propagate(&mut csp, None);

        // x must be 1, hence y is 2 and z is 3.
        assert!(propagation.is_consistent());
        assert_no_duplicate_prunings(&propagation);
        assert_eq!(vec![n(1)], csp.current_domain(ids[0]));
        assert_eq!(vec![n(2)], csp.current_domain(ids[1]));
        assert_eq!(vec![n(3)], csp.current_domain(ids[2]));
        assert_eq!(6, propagation.prunings().len());
        assert_arc_consistent(&csp);

        undo(&mut csp, &propagation);
        assert!(csp.variable_ids()
            .all(|id| csp.current_domain(id) == numbers(3)));
    }

    #[test]
    fn gac_wipe_out_restores_domains() {
        let (mut csp, ids) = ordered_triple();
        csp.assign(ids[2], n(2)).unwrap();
        let propagation =
            GeneralizedArcConsistency.propagate(&mut csp, Some(ids[2]));

        // z = 2 forces y = 1, which leaves no value for x.
        assert_eq!(Propagation::Inconsistent, propagation);
        assert_eq!(numbers(3), csp.current_domain(ids[0]));
        assert_eq!(numbers(3), csp.current_domain(ids[1]));
    }

    #[test]
    fn gac_detects_unsupported_assignment() {
        let (mut csp, ids) = ordered_triple();
        csp.assign(ids[0], n(3)).unwrap();
        assert_eq!(Propagation::Inconsistent,
            GeneralizedArcConsistency.propagate(&mut csp, Some(ids[0])));
    }

    #[test]
    fn gac_reaches_fixed_point_on_cage_model() {
        let puzzle = crate::tests::example_puzzle();
        let (mut csp, variables) = model::cagey_csp_model(&puzzle).unwrap();
        let propagation =
            GeneralizedArcConsistency.propagate(&mut csp, None);

        assert!(propagation.is_consistent());
        assert_no_duplicate_prunings(&propagation);
        assert_arc_consistent(&csp);

        // The known + cage fixes its operator variable.
        assert_eq!(vec![Value::Operator(Operator::Add)],
            csp.current_domain(variables[0]));

        // The sentinel is never supported.
        assert!(variables[..5].iter()
            .all(|&v| !csp.current_domain(v).contains(&Value::NoOp)));
    }

    #[test]
    fn gac_after_assignment_is_arc_consistent() {
        let puzzle = Puzzle::new(4, vec![
            Cage::new(7, vec![(1, 1), (1, 2)], Some(Operator::Add)).unwrap(),
            Cage::new(2, vec![(2, 1), (3, 1)], None).unwrap(),
            Cage::new(12, vec![(4, 3), (4, 4)], Some(Operator::Multiply))
                .unwrap()
        ]).unwrap();
        let (mut csp, variables) = model::cagey_csp_model(&puzzle).unwrap();
        let cell = |row: usize, column: usize|
            variables[3 + crate::index(row, column, 4)];

        let initial = GeneralizedArcConsistency.propagate(&mut csp, None);
        assert!(initial.is_consistent());
        assert_eq!(vec![n(3), n(4)], csp.current_domain(cell(1, 1)));

        csp.assign(cell(1, 1), n(3)).unwrap();
        let propagation =
            GeneralizedArcConsistency.propagate(&mut csp, Some(cell(1, 1)));
        assert!(propagation.is_consistent());
        assert_no_duplicate_prunings(&propagation);
        assert_arc_consistent(&csp);
        assert_eq!(vec![n(4)], csp.current_domain(cell(1, 2)));
    }

    #[test]
    fn propagator_kind_delegates() {
        let (mut csp, ids) = ordered_triple();
        let propagation =
            PropagatorKind::ForwardChecking.propagate(&mut csp, None);
        assert_eq!(1, propagation.prunings().len());
        undo(&mut csp, &propagation);

        let propagation = PropagatorKind::default().propagate(&mut csp, None);
        assert_eq!(vec![n(1)], csp.current_domain(ids[0]));
        assert_eq!(6, propagation.prunings().len());
    }
}
