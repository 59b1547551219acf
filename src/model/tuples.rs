//! This module enumerates the satisfying tuples of cage and all-different
//! constraints.
//!
//! Addition and multiplication are commutative, so their tuples are taken
//! from the full Cartesian product `[1, n]^m`, where numbers may repeat.
//! Subtraction and division instead enumerate permutations of `m` *distinct*
//! numbers, which are drawn from `[1, n - 1]`. The number `n` itself is never
//! a candidate for these two operators.
//!
//! The enumeration takes `O(n^m)` steps for addition and multiplication and
//! `O(n! / (n - m)!)` steps for subtraction and division, so it is up to the
//! caller to keep cages small.

use crate::Operator;
use crate::csp::Value;

use itertools::Itertools;

use std::iter;

fn with_operator(operator: Operator, numbers: &[usize]) -> Vec<Value> {
    iter::once(Value::Operator(operator))
        .chain(numbers.iter().cloned().map(Value::Number))
        .collect()
}

/// Enumerates all tuples of `arity` numbers which combine to `target` under
/// the given operator, each prefixed by `Value::Operator(operator)`. The
/// resulting tuples therefore have length `arity + 1`.
///
/// ```
/// use cagey_csp::Operator;
/// use cagey_csp::csp::Value;
/// use cagey_csp::model::tuples;
///
/// let tuples = tuples::cage_tuples(Operator::Divide, 2, 2, 4);
/// let expected: Vec<Vec<Value>> = vec![
///     vec![Value::Operator(Operator::Divide), Value::Number(2),
///         Value::Number(1)]
/// ];
///
/// // 4 / 2 is not found since 4 is not a candidate for division.
/// assert_eq!(expected, tuples);
/// ```
pub fn cage_tuples(operator: Operator, target: usize, arity: usize,
        size: usize) -> Vec<Vec<Value>> {
    let satisfies = |numbers: &Vec<usize>|
        operator.evaluates_to(numbers, target);

    match operator {
        Operator::Add | Operator::Multiply =>
            iter::repeat(1..=size)
                .take(arity)
                .multi_cartesian_product()
                .filter(satisfies)
                .map(|numbers| with_operator(operator, &numbers))
                .collect(),
        Operator::Subtract | Operator::Divide =>
            (1..size).permutations(arity)
                .filter(satisfies)
                .map(|numbers| with_operator(operator, &numbers))
                .collect()
    }
}

/// Enumerates the tuples of a cage whose operator is unknown: the union of
/// [cage_tuples] over all concrete operators. Each tuple keeps the operator
/// that produced it in its first position.
pub fn unknown_cage_tuples(target: usize, arity: usize, size: usize)
        -> Vec<Vec<Value>> {
    Operator::ALL.iter()
        .flat_map(|&operator| cage_tuples(operator, target, arity, size))
        .collect()
}

/// Enumerates all `size!` permutations of `[1, size]`, which are the
/// satisfying tuples of an all-different constraint over a full row or
/// column.
pub fn latin_tuples(size: usize) -> Vec<Vec<Value>> {
    (1..=size).permutations(size)
        .map(|numbers| numbers.into_iter().map(Value::Number).collect())
        .collect()
}

/// Enumerates the tuples of a binary not-equal constraint over `[1, size]`.
pub fn not_equal_tuples(size: usize) -> Vec<Vec<Value>> {
    (1..=size).cartesian_product(1..=size)
        .filter(|(a, b)| a != b)
        .map(|(a, b)| vec![Value::Number(a), Value::Number(b)])
        .collect()
}
