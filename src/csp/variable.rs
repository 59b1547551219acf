//! This module contains the [Variable] of a CSP and the [Value]s it can take.

use crate::Operator;
use crate::error::{ModelError, ModelResult, SearchError, SearchResult};
use crate::util::{self, PositionSet};

use std::fmt::{self, Display, Formatter};

/// A value in the domain of a [Variable]. Grid cells range over numbers,
/// while the operator-choice variable of a cage ranges over operators and
/// the `NoOp` sentinel, so both kinds share this tagged union.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Value {

    /// A number filled into a grid cell.
    Number(usize),

    /// An arithmetic operator chosen for a cage.
    Operator(Operator),

    /// The operator sentinel that no cage tuple ever carries. It completes
    /// the domain of operator-choice variables.
    NoOp
}

impl Value {

    /// Gets the wrapped number, if this is a `Value::Number`.
    pub fn number(self) -> Option<usize> {
        match self {
            Value::Number(number) => Some(number),
            _ => None
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(number) => write!(f, "{}", number),
            Value::Operator(operator) => write!(f, "{}", operator),
            Value::NoOp => write!(f, "f")
        }
    }
}

/// A variable of a CSP. It has a fixed, ordered full domain and a current
/// domain, which is the subset of the full domain that has not been pruned.
/// Once assigned, the current domain is considered to be just the assigned
/// value, without forgetting which values were pruned.
///
/// Mutation happens exclusively through the owning
/// [Csp](crate::csp::Csp), since variables are referred to by
/// [VariableId](crate::csp::VariableId) everywhere else.
#[derive(Clone, Debug)]
pub struct Variable {
    name: String,
    domain: Vec<Value>,
    current: PositionSet,
    assigned: Option<usize>
}

impl Variable {

    /// Creates a new, unassigned variable whose current domain equals the
    /// full domain.
    ///
    /// # Errors
    ///
    /// * `ModelError::EmptyDomain` if `domain` is empty.
    /// * `ModelError::ValueOutsideDomain` if `domain` contains a value twice,
    /// since positions in the full domain would be ambiguous.
    pub fn new(name: impl Into<String>, domain: Vec<Value>)
            -> ModelResult<Variable> {
        if domain.is_empty() {
            return Err(ModelError::EmptyDomain);
        }

        if util::contains_duplicate(domain.iter()) {
            return Err(ModelError::ValueOutsideDomain);
        }

        let current = PositionSet::full(domain.len());

        Ok(Variable {
            name: name.into(),
            domain,
            current,
            assigned: None
        })
    }

    /// Gets the name of this variable.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the full domain of this variable in its fixed order.
    pub fn domain(&self) -> &[Value] {
        &self.domain
    }

    /// Gets the number of values in the full domain.
    pub fn domain_size(&self) -> usize {
        self.domain.len()
    }

    fn position(&self, value: Value) -> Option<usize> {
        self.domain.iter().position(|&v| v == value)
    }

    /// Indicates whether the given value is part of the full domain.
    pub fn in_domain(&self, value: Value) -> bool {
        self.position(value).is_some()
    }

    /// Indicates whether the given value is part of the current domain. For
    /// an assigned variable, this is only the case for the assigned value.
    pub fn in_current_domain(&self, value: Value) -> bool {
        match (self.assigned, self.position(value)) {
            (Some(assigned), Some(position)) => assigned == position,
            (None, Some(position)) => self.current.contains(position),
            (_, None) => false
        }
    }

    /// Returns a snapshot of the current domain in full-domain order. For an
    /// assigned variable, this contains only the assigned value.
    pub fn current_domain(&self) -> Vec<Value> {
        match self.assigned {
            Some(position) => vec![self.domain[position]],
            None => self.current.iter()
                .map(|position| self.domain[position])
                .collect()
        }
    }

    /// Gets the size of the current domain, which is 1 for an assigned
    /// variable.
    pub fn current_domain_size(&self) -> usize {
        if self.assigned.is_some() {
            1
        }
        else {
            self.current.len()
        }
    }

    /// Indicates whether this variable currently holds a value.
    pub fn is_assigned(&self) -> bool {
        self.assigned.is_some()
    }

    /// Gets the value this variable is assigned to, if any.
    pub fn assigned_value(&self) -> Option<Value> {
        self.assigned.map(|position| self.domain[position])
    }

    pub(crate) fn assign(&mut self, value: Value) -> SearchResult<()> {
        if self.assigned.is_some() {
            return Err(SearchError::AlreadyAssigned);
        }

        match self.position(value) {
            Some(position) if self.current.contains(position) => {
                self.assigned = Some(position);
                Ok(())
            },
            _ => Err(SearchError::ValueNotInCurrentDomain)
        }
    }

    pub(crate) fn unassign(&mut self) -> Option<Value> {
        let value = self.assigned_value();
        self.assigned = None;
        value
    }

    pub(crate) fn prune_value(&mut self, value: Value) -> bool {
        match self.position(value) {
            Some(position) => self.current.remove(position),
            None => false
        }
    }

    pub(crate) fn unprune_value(&mut self, value: Value) -> bool {
        match self.position(value) {
            Some(position) => self.current.insert(position),
            None => false
        }
    }
}
