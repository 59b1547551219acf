//! This module contains the generic CSP container that all puzzle models are
//! compiled into and that propagators, variable orderings and the search
//! driver operate on.
//!
//! A [Csp] owns all of its [Variable]s and [Constraint]s. Everything else
//! refers to them by [VariableId] and [ConstraintId], which are indices in
//! creation order. Creation order is also the order in which
//! [Csp::unassigned_variables] enumerates variables, which makes it the
//! deterministic tie-break order of the [heuristic](crate::heuristic)
//! module.
//!
//! ```
//! use cagey_csp::csp::{Constraint, Csp, Value};
//!
//! let mut csp = Csp::new("example");
//! let domain: Vec<Value> = (1..=2).map(Value::Number).collect();
//! let a = csp.add_variable("a", domain.clone()).unwrap();
//! let b = csp.add_variable("b", domain).unwrap();
//!
//! let mut not_equal = Constraint::new("a!=b", vec![a, b]);
//! not_equal.add_satisfying_tuples(vec![
//!     vec![Value::Number(1), Value::Number(2)],
//!     vec![Value::Number(2), Value::Number(1)]
//! ]).unwrap();
//! csp.add_constraint(not_equal).unwrap();
//!
//! assert_eq!(vec![a, b], csp.unassigned_variables().collect::<Vec<_>>());
//! assert_eq!(1, csp.constraints_with(a).len());
//! ```

pub mod constraint;
pub mod variable;

pub use constraint::Constraint;
pub use variable::{Value, Variable};

use crate::error::{ModelError, ModelResult, SearchError, SearchResult};

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

/// Identifies a [Variable] within its [Csp].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct VariableId(pub(crate) usize);

impl VariableId {

    /// Gets the creation index of the identified variable.
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for VariableId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Identifies a [Constraint] within its [Csp].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ConstraintId(pub(crate) usize);

impl ConstraintId {

    /// Gets the creation index of the identified constraint.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A constraint satisfaction problem: a list of variables, a list of
/// constraints over them, and an index from each variable to the constraints
/// that reference it.
#[derive(Clone, Debug)]
pub struct Csp {
    name: String,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    constraints_by_variable: Vec<Vec<ConstraintId>>,
    names: HashSet<String>
}

impl Csp {

    /// Creates a new CSP without variables or constraints.
    pub fn new(name: impl Into<String>) -> Csp {
        Csp {
            name: name.into(),
            variables: Vec::new(),
            constraints: Vec::new(),
            constraints_by_variable: Vec::new(),
            names: HashSet::new()
        }
    }

    /// Gets the name of this CSP.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a new variable with the given name and full domain and adds it
    /// to this CSP.
    ///
    /// # Errors
    ///
    /// * `ModelError::DuplicateVariable` if a variable of the same name
    /// already exists.
    /// * Any error of [Variable::new].
    pub fn add_variable(&mut self, name: impl Into<String>,
            domain: Vec<Value>) -> ModelResult<VariableId> {
        let name = name.into();

        if self.names.contains(&name) {
            return Err(ModelError::DuplicateVariable(name));
        }

        let variable = Variable::new(name.clone(), domain)?;
        let id = VariableId(self.variables.len());
        self.names.insert(name);
        self.variables.push(variable);
        self.constraints_by_variable.push(Vec::new());
        Ok(id)
    }

    /// Adds the given constraint to this CSP and indexes it for every
    /// variable in its scope.
    ///
    /// # Errors
    ///
    /// * `ModelError::UnknownVariable` if the scope refers to a variable that
    /// is not part of this CSP.
    /// * `ModelError::ValueOutsideDomain` if some satisfying tuple contains a
    /// value outside the full domain of the variable at the same position.
    pub fn add_constraint(&mut self, constraint: Constraint)
            -> ModelResult<ConstraintId> {
        if constraint.scope().iter().any(|id| id.0 >= self.variables.len()) {
            return Err(ModelError::UnknownVariable);
        }

        let in_domains = constraint.tuples().all(|tuple| {
            tuple.iter()
                .zip(constraint.scope().iter())
                .all(|(&value, id)| self.variables[id.0].in_domain(value))
        });

        if !in_domains {
            return Err(ModelError::ValueOutsideDomain);
        }

        let id = ConstraintId(self.constraints.len());
        let mut indexed = HashSet::new();

        for &variable in constraint.scope() {
            if indexed.insert(variable) {
                self.constraints_by_variable[variable.0].push(id);
            }
        }

        self.constraints.push(constraint);
        Ok(id)
    }

    /// Gets the variable with the given ID.
    ///
    /// # Panics
    ///
    /// If `id` does not belong to this CSP.
    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id.0]
    }

    /// Gets all variables in creation order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Returns an iterator over the IDs of all variables in creation order.
    pub fn variable_ids(&self) -> impl Iterator<Item = VariableId> {
        (0..self.variables.len()).map(VariableId)
    }

    /// Gets the constraint with the given ID.
    ///
    /// # Panics
    ///
    /// If `id` does not belong to this CSP.
    pub fn constraint(&self, id: ConstraintId) -> &Constraint {
        &self.constraints[id.0]
    }

    /// Gets all constraints in creation order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Returns an iterator over the IDs of all constraints in creation order.
    pub fn constraint_ids(&self) -> impl Iterator<Item = ConstraintId> {
        (0..self.constraints.len()).map(ConstraintId)
    }

    /// Gets the IDs of all constraints whose scope contains the given
    /// variable, in creation order.
    ///
    /// # Panics
    ///
    /// If `variable` does not belong to this CSP.
    pub fn constraints_with(&self, variable: VariableId) -> &[ConstraintId] {
        &self.constraints_by_variable[variable.0]
    }

    /// Returns an iterator over the IDs of all unassigned variables in
    /// creation order.
    pub fn unassigned_variables(&self)
            -> impl Iterator<Item = VariableId> + '_ {
        self.variables.iter()
            .enumerate()
            .filter(|(_, variable)| !variable.is_assigned())
            .map(|(index, _)| VariableId(index))
    }

    /// Returns an iterator over the IDs of all constraints with the given
    /// arity, in creation order.
    pub fn constraints_of_arity(&self, arity: usize)
            -> impl Iterator<Item = ConstraintId> + '_ {
        self.constraints.iter()
            .enumerate()
            .filter(move |(_, constraint)| constraint.arity() == arity)
            .map(|(index, _)| ConstraintId(index))
    }

    /// Returns a snapshot of the current domain of the given variable. See
    /// [Variable::current_domain].
    ///
    /// # Panics
    ///
    /// If `variable` does not belong to this CSP.
    pub fn current_domain(&self, variable: VariableId) -> Vec<Value> {
        self.variables[variable.0].current_domain()
    }

    /// Checks whether `value` of `variable` has a supporting tuple in the
    /// given constraint under the current domains. Returns `false` if the
    /// variable is not in the constraint's scope.
    pub fn has_support(&self, constraint: ConstraintId, variable: VariableId,
            value: Value) -> bool {
        let constraint = &self.constraints[constraint.0];

        match constraint.position_of(variable) {
            Some(position) =>
                constraint.has_support(&self.variables, position, value),
            None => false
        }
    }

    /// Counts the unassigned variables in the scope of the given constraint.
    pub fn unassigned_count(&self, constraint: ConstraintId) -> usize {
        self.constraints[constraint.0].unassigned_count(&self.variables)
    }

    fn variable_mut(&mut self, id: VariableId) -> SearchResult<&mut Variable> {
        self.variables.get_mut(id.0).ok_or(SearchError::UnknownVariable)
    }

    /// Assigns the given value to a variable.
    ///
    /// # Errors
    ///
    /// * `SearchError::UnknownVariable` if `variable` is not part of this CSP.
    /// * `SearchError::AlreadyAssigned` if the variable already has a value.
    /// * `SearchError::ValueNotInCurrentDomain` if `value` has been pruned or
    /// is not in the full domain.
    pub fn assign(&mut self, variable: VariableId, value: Value)
            -> SearchResult<()> {
        self.variable_mut(variable)?.assign(value)
    }

    /// Removes the assignment of the given variable, returning the value it
    /// was assigned to, if any.
    ///
    /// # Errors
    ///
    /// `SearchError::UnknownVariable` if `variable` is not part of this CSP.
    pub fn unassign(&mut self, variable: VariableId)
            -> SearchResult<Option<Value>> {
        Ok(self.variable_mut(variable)?.unassign())
    }

    /// Removes `value` from the current domain of `variable`. Returns `true`
    /// if the domain changed. Every successful prune must eventually be
    /// undone by [Csp::unprune], in reverse order, when search backtracks.
    ///
    /// # Panics
    ///
    /// If `variable` does not belong to this CSP.
    pub fn prune(&mut self, variable: VariableId, value: Value) -> bool {
        self.variables[variable.0].prune_value(value)
    }

    /// Restores `value` into the current domain of `variable`. Returns `true`
    /// if the domain changed.
    ///
    /// # Panics
    ///
    /// If `variable` does not belong to this CSP.
    pub fn unprune(&mut self, variable: VariableId, value: Value) -> bool {
        self.variables[variable.0].unprune_value(value)
    }

    /// Indicates whether every variable is assigned.
    pub fn is_fully_assigned(&self) -> bool {
        self.variables.iter().all(Variable::is_assigned)
    }

    /// Gets the assigned values of all variables in creation order, or `None`
    /// if some variable is unassigned.
    pub fn assignment(&self) -> Option<Vec<Value>> {
        self.variables.iter()
            .map(Variable::assigned_value)
            .collect()
    }
}
