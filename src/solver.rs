//! This module contains the search driver which solves a [Csp] by
//! depth-first backtracking.
//!
//! Most importantly, this module contains the definition of the [Solver]
//! trait and the [BacktrackingSolver], which combines a
//! [Propagator](crate::propagator::Propagator) with a
//! [VariableOrdering](crate::heuristic::VariableOrdering). Solvers can be
//! configured statically by type or dynamically from a [SolverConfig].

mod trail;

use crate::csp::{Csp, Value, VariableId};
use crate::error::SearchResult;
use crate::heuristic::{OrderingKind, VariableOrdering};
use crate::propagator::{
    PlainChecking,
    Propagation,
    Propagator,
    PropagatorKind,
    Pruning
};

use log::{debug, trace, warn};

use serde::{Deserialize, Serialize};

use std::iter;

use trail::Trail;

/// A complete assignment of a [Csp], which holds one value per variable in
/// creation order.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Assignment {
    values: Vec<Value>
}

impl Assignment {

    /// Gets the values of all variables in creation order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Gets the value assigned to the given variable.
    ///
    /// # Panics
    ///
    /// If `variable` does not belong to the solved CSP.
    pub fn value(&self, variable: VariableId) -> Value {
        self.values[variable.index()]
    }

    /// Gets the values assigned to the given variables, in the given order.
    ///
    /// # Panics
    ///
    /// If some variable does not belong to the solved CSP.
    pub fn values_of(&self, variables: &[VariableId]) -> Vec<Value> {
        variables.iter().map(|&variable| self.value(variable)).collect()
    }

    /// Gets the numbers assigned to the given variables, in the given order,
    /// or `None` if one of them holds something other than a number.
    pub fn numbers_of(&self, variables: &[VariableId]) -> Option<Vec<usize>> {
        variables.iter().map(|&variable| self.value(variable).number())
            .collect()
    }

    /// Arranges the numbers of the given row-major cell variables into the
    /// rows of a grid with the given size. Returns `None` if `cells` does not
    /// contain exactly `size * size` variables or some of them hold anything
    /// but a number.
    pub fn grid(&self, cells: &[VariableId], size: usize)
            -> Option<Vec<Vec<usize>>> {
        if size == 0 || cells.len() != size * size {
            return None;
        }

        let numbers = self.numbers_of(cells)?;
        Some(numbers.chunks(size).map(<[usize]>::to_vec).collect())
    }
}

/// An enumeration of the different ways a CSP can be solveable. Note that
/// this may be relative to the solver, since a solver with a node limit may
/// have to give up, yielding `Solution::Ambiguous`, where the CSP is actually
/// uniquely solveable or impossible.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Solution {

    /// Indicates that the CSP is not solveable at all.
    Impossible,

    /// Indicates that the CSP has a unique solution, which is wrapped in
    /// this instance.
    Unique(Assignment),

    /// Indicates that the CSP has multiple solutions or, at least, that the
    /// solver was unable to find a unique one or prove it is impossible.
    Ambiguous
}

impl Solution {

    /// Computes the union of two solutions. This is defined as follows:
    ///
    /// * If one solution is `Solution::Impossible`, the other one is returned.
    /// * If one solution is `Solution::Ambiguous` then the result is also
    /// ambiguous
    /// * If both solutions are `Solution::Unique` with assignments `a1` and
    /// `a2`, then the result is `Solution::Unique(a1)` if `a1 == a2` and
    /// `Solution::Ambiguous` otherwise.
    pub fn union(self, other: Solution) -> Solution {
        match self {
            Solution::Impossible => other,
            Solution::Unique(a) =>
                match other {
                    Solution::Impossible => Solution::Unique(a),
                    Solution::Unique(other_a) =>
                        if a == other_a {
                            Solution::Unique(a)
                        }
                        else {
                            Solution::Ambiguous
                        }
                    Solution::Ambiguous => Solution::Ambiguous
                }
            Solution::Ambiguous => Solution::Ambiguous
        }
    }
}

/// Counters collected during one search.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SearchStats {

    /// The number of assignments tried.
    pub nodes: usize,

    /// The total number of values pruned by successful propagations.
    pub prunings: usize,

    /// Indicates whether search was stopped because the node limit was
    /// reached.
    pub limit_reached: bool
}

/// A trait for structs which have the ability to solve a [Csp].
pub trait Solver {

    /// Solves the provided CSP, starting from its current state. If the
    /// solver cannot prove that the CSP is impossible or uniquely solveable,
    /// it shall return `Solution::Ambiguous`. When this method returns, the
    /// CSP is in the same state as before.
    ///
    /// # Errors
    ///
    /// Any `SearchError` raised by an assignment, which indicates a variable
    /// that is not in a consistent state.
    fn solve(&self, csp: &mut Csp) -> SearchResult<Solution>;
}

/// The configuration of a [BacktrackingSolver] whose propagator and variable
/// ordering are chosen at runtime. It can be (de)serialized with serde.
///
/// ```
/// use cagey_csp::heuristic::OrderingKind;
/// use cagey_csp::propagator::PropagatorKind;
/// use cagey_csp::solver::SolverConfig;
///
/// let config = SolverConfig::default();
/// assert_eq!(PropagatorKind::GeneralizedArcConsistency, config.propagator);
/// assert_eq!(OrderingKind::MinimumRemainingValues, config.ordering);
/// assert_eq!(None, config.node_limit);
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SolverConfig {

    /// The propagator called at every search node.
    pub propagator: PropagatorKind,

    /// The heuristic that picks the variable to branch on.
    pub ordering: OrderingKind,

    /// The maximum number of assignments to try before giving up, if any.
    pub node_limit: Option<usize>
}

struct Search<'a> {
    trail: Trail<Pruning>,
    stats: SearchStats,

    // Invoked for every solution found. Returns whether to continue.
    visit: &'a mut dyn FnMut(Assignment) -> bool
}

/// A perfect [Solver] which solves a CSP by recursively trying every value
/// in the current domain of the variable chosen by the ordering `O`, calling
/// the propagator `P` after each assignment. This means two things:
///
/// * Its worst-case runtime is exponential, so it may be very slow for large
/// puzzles with weak propagation.
/// * Without a node limit, it provides the correct [Solution] for any CSP.
///
/// All prunings made during search are recorded on a trail and undone on
/// backtrack, so the CSP is restored once search returns.
#[derive(Clone, Debug)]
pub struct BacktrackingSolver<P, O> {
    propagator: P,
    ordering: O,
    node_limit: Option<usize>
}

impl BacktrackingSolver<PropagatorKind, OrderingKind> {

    /// Creates a new solver with the propagator, ordering and node limit
    /// given by `config`.
    pub fn from_config(config: &SolverConfig)
            -> BacktrackingSolver<PropagatorKind, OrderingKind> {
        BacktrackingSolver {
            propagator: config.propagator,
            ordering: config.ordering,
            node_limit: config.node_limit
        }
    }
}

impl<P: Propagator, O: VariableOrdering> BacktrackingSolver<P, O> {

    /// Creates a new solver without a node limit.
    ///
    /// # Arguments
    ///
    /// * `propagator`: The [Propagator] which is called before search, once
    /// more for every variable assigned at that point, and after every
    /// assignment.
    /// * `ordering`: The [VariableOrdering] which selects the variable to
    /// branch on at every node.
    pub fn new(propagator: P, ordering: O) -> BacktrackingSolver<P, O> {
        BacktrackingSolver {
            propagator,
            ordering,
            node_limit: None
        }
    }

    /// Limits the number of assignments this solver tries per search. Once
    /// the limit is reached, search stops and reports what it found so far.
    pub fn with_node_limit(mut self, node_limit: usize)
            -> BacktrackingSolver<P, O> {
        self.node_limit = Some(node_limit);
        self
    }

    /// Gets the propagator of this solver.
    pub fn propagator(&self) -> &P {
        &self.propagator
    }

    /// Gets the variable ordering of this solver.
    pub fn ordering(&self) -> &O {
        &self.ordering
    }

    fn undo_level(csp: &mut Csp, search: &mut Search<'_>) {
        let level = search.trail.level() - 1;

        for pruning in search.trail.backtrack(level) {
            csp.unprune(pruning.variable, pruning.value);
        }
    }

    /// Propagates the state of `csp` before search, first without a variable
    /// and then for every variable that is already assigned, in creation
    /// order. Constraints whose scope is fully assigned are checked
    /// directly. All prunings are pushed to the trail. Returns `false` if
    /// the state is inconsistent.
    fn propagate_root(&self, csp: &mut Csp, search: &mut Search<'_>) -> bool {
        let assigned: Vec<VariableId> = csp.variable_ids()
            .filter(|&variable| csp.variable(variable).is_assigned())
            .collect();
        let targets = iter::once(None).chain(assigned.into_iter().map(Some));

        for target in targets {
            if let Some(variable) = target {
                let checked = PlainChecking.propagate(csp, Some(variable));

                if !checked.is_consistent() {
                    return false;
                }
            }

            match self.propagator.propagate(csp, target) {
                Propagation::Consistent(prunings) => {
                    search.stats.prunings += prunings.len();
                    prunings.into_iter().for_each(|p| search.trail.push(p));
                },
                Propagation::Inconsistent => return false
            }
        }

        true
    }

    /// Returns `true` if search shall stop.
    fn search_rec(&self, csp: &mut Csp, search: &mut Search<'_>)
            -> SearchResult<bool> {
        let variable = match self.ordering.select(csp) {
            Some(variable) => variable,
            None => {
                return Ok(match csp.assignment() {
                    Some(values) => !(search.visit)(Assignment { values }),
                    None => false
                });
            }
        };

        for value in csp.current_domain(variable) {
            if let Some(limit) = self.node_limit {
                if search.stats.nodes >= limit {
                    search.stats.limit_reached = true;
                    return Ok(true);
                }
            }

            search.stats.nodes += 1;
            trace!("trying {} = {}", csp.variable(variable).name(), value);
            csp.assign(variable, value)?;
            search.trail.new_level();

            let stop = match self.propagator.propagate(csp, Some(variable)) {
                Propagation::Consistent(prunings) => {
                    search.stats.prunings += prunings.len();
                    prunings.into_iter().for_each(|p| search.trail.push(p));
                    self.search_rec(csp, search)
                },
                Propagation::Inconsistent => Ok(false)
            };

            BacktrackingSolver::<P, O>::undo_level(csp, search);
            csp.unassign(variable)?;

            if stop? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Runs a search which reports every solution to `visit` until it
    /// returns `false`.
    fn run<F>(&self, csp: &mut Csp, mut visit: F) -> SearchResult<SearchStats>
    where
        F: FnMut(Assignment) -> bool
    {
        let mut search = Search {
            trail: Trail::default(),
            stats: SearchStats::default(),
            visit: &mut visit
        };

        let result = if self.propagate_root(csp, &mut search) {
            self.search_rec(csp, &mut search).map(|_| ())
        }
        else {
            debug!("{} is inconsistent before search", csp.name());
            Ok(())
        };

        for pruning in search.trail.clear() {
            csp.unprune(pruning.variable, pruning.value);
        }

        result?;

        if search.stats.limit_reached {
            warn!("search on {} stopped after {} nodes", csp.name(),
                search.stats.nodes);
        }

        debug!("search on {} finished: {} nodes, {} prunings", csp.name(),
            search.stats.nodes, search.stats.prunings);
        Ok(search.stats)
    }

    /// Solves the given CSP like [Solver::solve], and additionally returns
    /// the statistics of the search. Search stops as soon as a second
    /// solution is found.
    ///
    /// # Errors
    ///
    /// Any `SearchError` raised by an assignment, which indicates a variable
    /// that is not in a consistent state.
    pub fn solve_with_stats(&self, csp: &mut Csp)
            -> SearchResult<(Solution, SearchStats)> {
        let mut solution = Solution::Impossible;
        let stats = self.run(csp, |assignment| {
            let current = std::mem::replace(&mut solution, Solution::Ambiguous);
            solution = current.union(Solution::Unique(assignment));
            solution != Solution::Ambiguous
        })?;

        if stats.limit_reached {
            return Ok((Solution::Ambiguous, stats));
        }

        Ok((solution, stats))
    }

    /// Finds any one solution of the given CSP, or `None` if there is none
    /// (or none was found within the node limit). The CSP is restored
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Any `SearchError` raised by an assignment.
    pub fn find_first(&self, csp: &mut Csp)
            -> SearchResult<Option<Assignment>> {
        let mut first = None;
        self.run(csp, |assignment| {
            first = Some(assignment);
            false
        })?;
        Ok(first)
    }

    /// Finds all solutions of the given CSP in search order (or all found
    /// within the node limit). The CSP is restored afterwards.
    ///
    /// # Errors
    ///
    /// Any `SearchError` raised by an assignment.
    pub fn all_solutions(&self, csp: &mut Csp)
            -> SearchResult<Vec<Assignment>> {
        let mut solutions = Vec::new();
        self.run(csp, |assignment| {
            solutions.push(assignment);
            true
        })?;
        Ok(solutions)
    }
}

impl<P: Propagator, O: VariableOrdering> Solver for BacktrackingSolver<P, O> {
    fn solve(&self, csp: &mut Csp) -> SearchResult<Solution> {
        Ok(self.solve_with_stats(csp)?.0)
    }
}
