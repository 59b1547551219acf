//! This module compiles [Puzzle]s into [Csp]s.
//!
//! Three models are offered. [binary_ne_grid] and [nary_ad_grid] only
//! encode the Latin square rules of the grid and ignore cages. They differ in
//! how they do so: with one binary not-equal constraint for every pair of
//! cells sharing a row or column, or with one all-different constraint per
//! row and column. Both have the same solutions, but differ in how much
//! propagation can prune and how expensive it is.
//!
//! [cagey_csp_model] additionally encodes the cages. Every cage gets an
//! operator-choice variable whose domain is `+`, `-`, `*`, `/`, and a
//! `NoOp` sentinel, and one constraint over that variable followed by the
//! cage's cells. A known operator restricts the tuples of that constraint to
//! the operator, an unknown one allows all four, so the operator variable
//! ends up with the operator a solution actually uses.
//!
//! Every builder returns the CSP together with its variables in a fixed
//! order. For the grid-only models, these are the cells in row-major order,
//! i.e. the cell at row `r` and column `c` (1-indexed) is at index
//! `(r - 1) * n + (c - 1)`. The cage-aware model places the operator
//! variables of the cages first, in declaration order, followed by the cells
//! in row-major order.

pub mod tuples;

use crate::{Operator, Puzzle};
use crate::csp::{Constraint, Csp, Value, VariableId};
use crate::error::ModelResult;

use log::debug;

use std::collections::HashMap;

fn add_grid_variables(csp: &mut Csp, size: usize)
        -> ModelResult<Vec<VariableId>> {
    let domain: Vec<Value> = (1..=size).map(Value::Number).collect();
    let mut cells = Vec::with_capacity(size * size);

    for row in 1..=size {
        for column in 1..=size {
            let name = format!("Cell({},{})", row, column);
            cells.push(csp.add_variable(name, domain.clone())?);
        }
    }

    Ok(cells)
}

fn add_not_equal_constraints(csp: &mut Csp, cells: &[VariableId],
        size: usize) -> ModelResult<()> {
    let tuples = tuples::not_equal_tuples(size);
    let mut pairs = Vec::new();

    for i in 0..size {
        for j in 0..size {
            for k in (j + 1)..size {
                pairs.push((cells[i * size + j], cells[i * size + k]));
                pairs.push((cells[j * size + i], cells[k * size + i]));
            }
        }
    }

    for (a, b) in pairs {
        let name = format!("NE({},{})", csp.variable(a).name(),
            csp.variable(b).name());
        let mut constraint = Constraint::new(name, vec![a, b]);
        constraint.add_satisfying_tuples(tuples.iter().cloned())?;
        csp.add_constraint(constraint)?;
    }

    Ok(())
}

fn add_all_different_constraints(csp: &mut Csp, cells: &[VariableId],
        size: usize) -> ModelResult<()> {
    let tuples = tuples::latin_tuples(size);

    for i in 0..size {
        let row = (0..size).map(|j| cells[i * size + j]).collect();
        let mut constraint = Constraint::new(format!("Row({})", i + 1), row);
        constraint.add_satisfying_tuples(tuples.iter().cloned())?;
        csp.add_constraint(constraint)?;

        let column = (0..size).map(|j| cells[j * size + i]).collect();
        let mut constraint =
            Constraint::new(format!("Col({})", i + 1), column);
        constraint.add_satisfying_tuples(tuples.iter().cloned())?;
        csp.add_constraint(constraint)?;
    }

    Ok(())
}

/// Builds a CSP for the grid of the given puzzle which uses binary not-equal
/// constraints between every pair of cells in the same row or column. That
/// makes `2 · n · (n choose 2)` constraints. The cages of the puzzle are
/// ignored.
///
/// # Errors
///
/// Any [ModelError](crate::error::ModelError) raised while constructing
/// variables or constraints.
pub fn binary_ne_grid(puzzle: &Puzzle)
        -> ModelResult<(Csp, Vec<VariableId>)> {
    let size = puzzle.size();
    let mut csp = Csp::new("BinaryCSP");
    let cells = add_grid_variables(&mut csp, size)?;
    add_not_equal_constraints(&mut csp, &cells, size)?;
    debug!("built binary grid model of size {} with {} constraints", size,
        csp.constraints().len());
    Ok((csp, cells))
}

/// Builds a CSP for the grid of the given puzzle which uses one n-ary
/// all-different constraint per row and per column, each with all `n!`
/// permutations of `[1, n]` as satisfying tuples. The cages of the puzzle
/// are ignored.
///
/// # Errors
///
/// Any [ModelError](crate::error::ModelError) raised while constructing
/// variables or constraints.
pub fn nary_ad_grid(puzzle: &Puzzle)
        -> ModelResult<(Csp, Vec<VariableId>)> {
    let size = puzzle.size();
    let mut csp = Csp::new("NaryCSP");
    let cells = add_grid_variables(&mut csp, size)?;
    add_all_different_constraints(&mut csp, &cells, size)?;
    debug!("built n-ary grid model of size {} with {} constraints", size,
        csp.constraints().len());
    Ok((csp, cells))
}

/// The domain of every cage operator variable: the four operators followed
/// by the `NoOp` sentinel.
pub fn operator_domain() -> Vec<Value> {
    Operator::ALL.iter()
        .map(|&operator| Value::Operator(operator))
        .chain(std::iter::once(Value::NoOp))
        .collect()
}

/// Builds a CSP for the given puzzle which encodes the grid using binary
/// not-equal constraints and every cage using an operator variable and a
/// cage constraint. The returned variables start with one operator variable
/// per cage, followed by the grid cells in row-major order.
///
/// # Errors
///
/// Any [ModelError](crate::error::ModelError) raised while constructing
/// variables or constraints.
pub fn cagey_csp_model(puzzle: &Puzzle)
        -> ModelResult<(Csp, Vec<VariableId>)> {
    let size = puzzle.size();
    let mut csp = Csp::new("CageyCSP");
    let mut variables = Vec::new();

    for (k, cage) in puzzle.cages().iter().enumerate() {
        let name = format!("Cage#{}({}{})", k, cage.target(),
            cage.operator_symbol());
        variables.push(csp.add_variable(name, operator_domain())?);
    }

    let cells = add_grid_variables(&mut csp, size)?;
    add_not_equal_constraints(&mut csp, &cells, size)?;

    // The same cage shape recurs often, so tuples are shared per build.
    let mut cache: HashMap<(Option<Operator>, usize, usize), Vec<Vec<Value>>> =
        HashMap::new();

    for (k, cage) in puzzle.cages().iter().enumerate() {
        let arity = cage.cells().len();
        let key = (cage.operator(), cage.target(), arity);
        let tuples = cache.entry(key).or_insert_with(|| match key.0 {
            Some(operator) =>
                tuples::cage_tuples(operator, key.1, arity, size),
            None => tuples::unknown_cage_tuples(key.1, arity, size)
        });

        let mut scope = vec![variables[k]];
        scope.extend(cage.cells().iter()
            .map(|&(row, column)| cells[crate::index(row, column, size)]));

        let name = format!("Cage#{}({}{}:{:?})", k, cage.target(),
            cage.operator_symbol(), cage.cells());
        let mut constraint = Constraint::new(name, scope);
        constraint.add_satisfying_tuples(tuples.iter().cloned())?;
        csp.add_constraint(constraint)?;
    }

    debug!("built cage model of size {} with {} cages and {} constraints",
        size, puzzle.cages().len(), csp.constraints().len());
    variables.extend(cells);
    Ok((csp, variables))
}
