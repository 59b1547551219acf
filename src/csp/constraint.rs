//! This module contains the table [Constraint] used by all models of this
//! crate. A constraint is defined extensionally by the set of tuples which
//! satisfy it.

use crate::csp::VariableId;
use crate::csp::variable::{Value, Variable};
use crate::error::{ModelError, ModelResult};

use std::collections::{HashMap, HashSet};

/// A constraint over an ordered scope of variables. It is satisfied by an
/// assignment of its scope if and only if the tuple of assigned values, in
/// scope order, is one of its satisfying tuples.
///
/// Besides the tuple set, the constraint keeps an index from every pair of
/// scope position and value to the tuples that contain that value at that
/// position. This makes support checks for a single variable-value pair
/// proportional to the number of tuples that could support it.
#[derive(Clone, Debug)]
pub struct Constraint {
    name: String,
    scope: Vec<VariableId>,
    tuples: HashSet<Vec<Value>>,
    supports: HashMap<(usize, Value), Vec<Vec<Value>>>
}

impl Constraint {

    /// Creates a new constraint with the given scope and no satisfying
    /// tuples yet. Until tuples are added, the constraint cannot be
    /// satisfied.
    pub fn new(name: impl Into<String>, scope: Vec<VariableId>)
            -> Constraint {
        Constraint {
            name: name.into(),
            scope,
            tuples: HashSet::new(),
            supports: HashMap::new()
        }
    }

    /// Adds satisfying tuples to this constraint. Tuples that are already
    /// present are ignored.
    ///
    /// # Errors
    ///
    /// `ModelError::WrongTupleArity` if some tuple does not have exactly one
    /// value per scope variable. Tuples preceding the faulty one remain added.
    pub fn add_satisfying_tuples<I>(&mut self, tuples: I) -> ModelResult<()>
    where
        I: IntoIterator<Item = Vec<Value>>
    {
        for tuple in tuples {
            if tuple.len() != self.scope.len() {
                return Err(ModelError::WrongTupleArity);
            }

            if self.tuples.contains(&tuple) {
                continue;
            }

            for (position, &value) in tuple.iter().enumerate() {
                self.supports.entry((position, value))
                    .or_insert_with(Vec::new)
                    .push(tuple.clone());
            }

            self.tuples.insert(tuple);
        }

        Ok(())
    }

    /// Gets the name of this constraint.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the ordered scope of this constraint.
    pub fn scope(&self) -> &[VariableId] {
        &self.scope
    }

    /// Gets the number of variables in the scope.
    pub fn arity(&self) -> usize {
        self.scope.len()
    }

    /// Gets the number of satisfying tuples.
    pub fn tuple_count(&self) -> usize {
        self.tuples.len()
    }

    /// Returns an iterator over all satisfying tuples in no particular order.
    pub fn tuples(&self) -> impl Iterator<Item = &Vec<Value>> + '_ {
        self.tuples.iter()
    }

    /// Gets the position of the given variable in the scope, if it is part of
    /// it.
    pub fn position_of(&self, variable: VariableId) -> Option<usize> {
        self.scope.iter().position(|&v| v == variable)
    }

    /// Indicates whether the given values, in scope order, form a satisfying
    /// tuple.
    pub fn check_tuple(&self, values: &[Value]) -> bool {
        self.tuples.contains(values)
    }

    /// Checks whether `value` at the given scope position has a supporting
    /// tuple, that is, a satisfying tuple which contains `value` at
    /// `position` and whose other entries are all within the current domains
    /// of the respective scope variables. Assigned variables only support
    /// their assigned value.
    ///
    /// `variables` must be the variable array of the CSP this constraint is
    /// part of.
    pub fn has_support(&self, variables: &[Variable], position: usize,
            value: Value) -> bool {
        let candidates = match self.supports.get(&(position, value)) {
            Some(candidates) => candidates,
            None => return false
        };

        candidates.iter().any(|tuple| {
            tuple.iter()
                .zip(self.scope.iter())
                .enumerate()
                .all(|(i, (&v, id))|
                    i == position || variables[id.index()].in_current_domain(v))
        })
    }

    /// Counts the scope variables which are not assigned.
    pub fn unassigned_count(&self, variables: &[Variable]) -> usize {
        self.scope.iter()
            .filter(|id| !variables[id.index()].is_assigned())
            .count()
    }

    /// Gets the assigned values of the scope in scope order, or `None` if
    /// some scope variable is unassigned.
    pub fn assigned_tuple(&self, variables: &[Variable])
            -> Option<Vec<Value>> {
        self.scope.iter()
            .map(|id| variables[id.index()].assigned_value())
            .collect()
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn numbers(size: usize) -> Vec<Value> {
        (1..=size).map(Value::Number).collect()
    }

    fn tuple(values: &[usize]) -> Vec<Value> {
        values.iter().cloned().map(Value::Number).collect()
    }

    fn less_than_setup() -> (Vec<Variable>, Constraint) {
        let variables = vec![
            Variable::new("a", numbers(3)).unwrap(),
            Variable::new("b", numbers(3)).unwrap()
        ];
        let mut constraint =
            Constraint::new("a<b", vec![VariableId(0), VariableId(1)]);
        constraint.add_satisfying_tuples(vec![
            tuple(&[1, 2]),
            tuple(&[1, 3]),
            tuple(&[2, 3])
        ]).unwrap();
        (variables, constraint)
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let (_, mut constraint) = less_than_setup();
        assert_eq!(Err(ModelError::WrongTupleArity),
            constraint.add_satisfying_tuples(vec![tuple(&[1])]));
    }

    #[test]
    fn duplicate_tuples_are_ignored() {
        let (_, mut constraint) = less_than_setup();
        constraint.add_satisfying_tuples(vec![tuple(&[1, 2])]).unwrap();
        assert_eq!(3, constraint.tuple_count());
    }

    #[test]
    fn check_tuple() {
        let (_, constraint) = less_than_setup();
        assert!(constraint.check_tuple(&tuple(&[1, 3])));
        assert!(!constraint.check_tuple(&tuple(&[3, 1])));
    }

    #[test]
    fn support_respects_current_domains() {
        let (mut variables, constraint) = less_than_setup();
        assert!(constraint.has_support(&variables, 0, Value::Number(2)));
        assert!(!constraint.has_support(&variables, 0, Value::Number(3)));

        variables[1].prune_value(Value::Number(3));
        assert!(!constraint.has_support(&variables, 0, Value::Number(2)));
        assert!(constraint.has_support(&variables, 0, Value::Number(1)));

        variables[1].assign(Value::Number(2)).unwrap();
        assert!(constraint.has_support(&variables, 0, Value::Number(1)));
        assert!(!constraint.has_support(&variables, 1, Value::Number(1)));
    }

    #[test]
    fn unassigned_count_and_assigned_tuple() {
        let (mut variables, constraint) = less_than_setup();
        assert_eq!(2, constraint.unassigned_count(&variables));
        assert_eq!(None, constraint.assigned_tuple(&variables));

        variables[0].assign(Value::Number(1)).unwrap();
        variables[1].assign(Value::Number(3)).unwrap();
        assert_eq!(0, constraint.unassigned_count(&variables));
        assert_eq!(Some(tuple(&[1, 3])), constraint.assigned_tuple(&variables));
        assert_eq!(Some(1), constraint.position_of(VariableId(1)));
    }
}
