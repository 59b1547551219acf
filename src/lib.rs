// Code lints

#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_import_braces)]
#![warn(unused_lifetimes)]
#![warn(unused_qualifications)]

// Doc lints

#![warn(rustdoc::broken_intra_doc_links)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_codeblock_attributes)]

//! This crate compiles Cagey puzzles (also known as KenKen) into constraint
//! satisfaction problems and provides the propagators and variable orderings
//! a backtracking search needs to solve them. It supports the following key
//! features:
//!
//! * Three models of a puzzle: a plain grid with binary not-equal
//! constraints, a plain grid with n-ary all-different constraints, and a
//! cage-aware model whose cages may have unknown operators
//! * Plain checking, forward checking and generalized arc consistency
//! * Degree and minimum-remaining-values variable orderings
//! * A backtracking solver that ties these together
//! * Generating random puzzles together with their solution
//!
//! # Puzzles
//!
//! A Cagey puzzle is an n×n grid in which every row and every column must
//! contain each number from 1 to n exactly once. Additionally, cells are
//! grouped into cages, each annotated with a target and an operator. The
//! numbers in a cage must combine with the operator to the target. The
//! operator may also be unknown, in which case any of the four works.
//!
//! Cells are addressed by 1-indexed `(row, column)` pairs. An example of a
//! 3×3 puzzle with two cages of unknown operator is given below.
//!
//! ```
//! use cagey_csp::{Cage, Operator, Puzzle};
//!
//! let puzzle = Puzzle::new(3, vec![
//!     Cage::new(3, vec![(1, 1), (2, 1)], Some(Operator::Add)).unwrap(),
//!     Cage::new(1, vec![(1, 2)], None).unwrap(),
//!     Cage::new(8, vec![(1, 3), (2, 3), (2, 2)], Some(Operator::Add))
//!         .unwrap(),
//!     Cage::new(3, vec![(3, 1)], None).unwrap(),
//!     Cage::new(3, vec![(3, 2), (3, 3)], Some(Operator::Add)).unwrap()
//! ]).unwrap();
//!
//! // Solutions are given in row-major order.
//! assert!(puzzle.check_solution(&[2, 1, 3, 1, 3, 2, 3, 2, 1]));
//! assert!(!puzzle.check_solution(&[1, 2, 3, 2, 3, 1, 3, 1, 2]));
//! ```
//!
//! Puzzles can also be read with `serde` in the tuple format
//! `[size, [[target, [[row, column], ...], operator], ...]]`, where the
//! operator is one of `+`, `-`, `*`, `/`, or `?` for unknown.
//!
//! # Solving puzzles
//!
//! The [model] module turns a puzzle into a [Csp](csp::Csp) together with
//! the list of its variables. The [solver] module then searches it using one
//! of the [propagators](propagator) and [variable orderings](heuristic).
//!
//! ```
//! use cagey_csp::{Cage, Operator, Puzzle};
//! use cagey_csp::heuristic::MinimumRemainingValues;
//! use cagey_csp::model;
//! use cagey_csp::propagator::GeneralizedArcConsistency;
//! use cagey_csp::solver::BacktrackingSolver;
//!
//! let puzzle = Puzzle::new(3, vec![
//!     Cage::new(3, vec![(1, 1), (2, 1)], Some(Operator::Add)).unwrap(),
//!     Cage::new(1, vec![(1, 2)], None).unwrap(),
//!     Cage::new(8, vec![(1, 3), (2, 3), (2, 2)], Some(Operator::Add))
//!         .unwrap(),
//!     Cage::new(3, vec![(3, 1)], None).unwrap(),
//!     Cage::new(3, vec![(3, 2), (3, 3)], Some(Operator::Add)).unwrap()
//! ]).unwrap();
//!
//! let (mut csp, variables) = model::cagey_csp_model(&puzzle).unwrap();
//! let solver = BacktrackingSolver::new(GeneralizedArcConsistency,
//!     MinimumRemainingValues);
//! let assignment = solver.find_first(&mut csp).unwrap().unwrap();
//!
//! // The cage operator variables come first, followed by the grid cells.
//! let cells = &variables[puzzle.cages().len()..];
//! let grid = assignment.numbers_of(cells).unwrap();
//! assert_eq!(vec![2, 1, 3, 1, 3, 2, 3, 2, 1], grid);
//! ```
//!
//! # Note regarding performance
//!
//! Cage constraints are stored extensionally, so the number of satisfying
//! tuples grows combinatorially with the size of cages and grids. Callers
//! should keep cages small for large grids.

pub mod csp;
pub mod error;
pub mod generator;
pub mod heuristic;
pub mod model;
pub mod propagator;
pub mod solver;
pub mod util;

#[cfg(test)]
mod random_tests;

use error::{ModelError, ModelResult};

use serde::{Deserialize, Serialize};

use std::convert::TryFrom;
use std::fmt::{self, Display, Formatter};

/// An arithmetic operator that combines the numbers of a cage.
///
/// Subtraction and division are not commutative. They are defined on the
/// numbers of a cage in their declared order: subtraction takes the absolute
/// difference between the first number and the sum of the others, division
/// divides the first number by the product of the others.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Operator {

    /// `+`: The numbers sum to the target.
    Add,

    /// `-`: The first number minus the sum of the others is the target, up
    /// to sign.
    Subtract,

    /// `*`: The numbers multiply to the target.
    Multiply,

    /// `/`: The first number divided by the product of the others is exactly
    /// the target.
    Divide
}

/// The symbol used for a cage whose operator is unknown.
pub const UNKNOWN_SYMBOL: &str = "?";

impl Operator {

    /// All concrete operators in the order in which cages with an unknown
    /// operator enumerate them.
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide
    ];

    /// Gets the symbol of this operator, one of `+`, `-`, `*`, and `/`.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/"
        }
    }

    /// Parses an operator symbol. The symbol `?` denotes an unknown operator
    /// and is parsed to `None`.
    ///
    /// # Errors
    ///
    /// `ModelError::UnknownOperator` if `symbol` is not one of `+`, `-`, `*`,
    /// `/`, and `?`.
    pub fn parse(symbol: &str) -> ModelResult<Option<Operator>> {
        match symbol {
            "+" => Ok(Some(Operator::Add)),
            "-" => Ok(Some(Operator::Subtract)),
            "*" => Ok(Some(Operator::Multiply)),
            "/" => Ok(Some(Operator::Divide)),
            UNKNOWN_SYMBOL => Ok(None),
            _ => Err(ModelError::UnknownOperator(String::from(symbol)))
        }
    }

    /// Indicates whether the given numbers, in order, combine to `target`
    /// under this operator. Overflowing sums and products never match. An
    /// empty slice never matches for subtraction and division.
    pub fn evaluates_to(self, numbers: &[usize], target: usize) -> bool {
        match self {
            Operator::Add => checked_sum(numbers) == Some(target),
            Operator::Multiply => checked_product(numbers) == Some(target),
            Operator::Subtract => match numbers.split_first() {
                Some((&first, rest)) => match checked_sum(rest) {
                    Some(rest_sum) => {
                        let difference = if first >= rest_sum {
                            first - rest_sum
                        }
                        else {
                            rest_sum - first
                        };

                        difference == target
                    },
                    None => false
                },
                None => false
            },
            Operator::Divide => match numbers.split_first() {
                Some((&first, rest)) => checked_product(rest)
                    .and_then(|product| product.checked_mul(target))
                    .map(|dividend| dividend == first)
                    .unwrap_or(false),
                None => false
            }
        }
    }

    /// Indicates whether the given numbers, in order, may fill a cage with
    /// this operator and `target` in a grid of the given size. Beyond
    /// [Operator::evaluates_to], subtraction and division require distinct
    /// numbers that are all less than `size`.
    pub fn admits(self, numbers: &[usize], target: usize, size: usize)
            -> bool {
        match self {
            Operator::Add | Operator::Multiply =>
                self.evaluates_to(numbers, target),
            Operator::Subtract | Operator::Divide =>
                numbers.iter().all(|&n| n < size) &&
                    !util::contains_duplicate(numbers.iter()) &&
                    self.evaluates_to(numbers, target)
        }
    }
}

fn checked_sum(numbers: &[usize]) -> Option<usize> {
    numbers.iter().try_fold(0usize, |sum, &n| sum.checked_add(n))
}

fn checked_product(numbers: &[usize]) -> Option<usize> {
    numbers.iter().try_fold(1usize, |product, &n| product.checked_mul(n))
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

type RawCage = (usize, Vec<(usize, usize)>, String);

/// A cage of a Cagey puzzle: some cells annotated with a target and an
/// operator, which may be unknown.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(into = "RawCage")]
#[serde(try_from = "RawCage")]
pub struct Cage {
    target: usize,
    cells: Vec<(usize, usize)>,
    operator: Option<Operator>
}

impl Cage {

    /// Creates a new cage.
    ///
    /// # Arguments
    ///
    /// * `target`: The number the cells of this cage combine to.
    /// * `cells`: The 1-indexed `(row, column)` coordinates of the cells in
    /// this cage. The order matters for subtraction and division. Bounds are
    /// checked once the cage is part of a [Puzzle].
    /// * `operator`: The operator that combines the cells, or `None` if it is
    /// unknown.
    ///
    /// # Errors
    ///
    /// * `ModelError::EmptyCage` if `cells` is empty.
    /// * `ModelError::DuplicateCell` if `cells` contains a cell twice.
    pub fn new(target: usize, cells: Vec<(usize, usize)>,
            operator: Option<Operator>) -> ModelResult<Cage> {
        if cells.is_empty() {
            return Err(ModelError::EmptyCage);
        }

        if util::contains_duplicate(cells.iter()) {
            return Err(ModelError::DuplicateCell);
        }

        Ok(Cage {
            target,
            cells,
            operator
        })
    }

    /// Gets the target of this cage.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Gets the 1-indexed `(row, column)` coordinates of the cells in this
    /// cage in declared order.
    pub fn cells(&self) -> &[(usize, usize)] {
        &self.cells
    }

    /// Gets the operator of this cage, or `None` if it is unknown.
    pub fn operator(&self) -> Option<Operator> {
        self.operator
    }

    /// Gets the symbol of this cage's operator, which is `?` for an unknown
    /// operator.
    pub fn operator_symbol(&self) -> &'static str {
        self.operator.map(Operator::symbol).unwrap_or(UNKNOWN_SYMBOL)
    }

    /// Indicates whether the given numbers, in cell order, satisfy this cage
    /// in a grid of the given size, as defined by [Operator::admits]. For an
    /// unknown operator, any concrete operator may be used.
    pub fn is_satisfied_by(&self, numbers: &[usize], size: usize) -> bool {
        match self.operator {
            Some(operator) => operator.admits(numbers, self.target, size),
            None => Operator::ALL.iter()
                .any(|operator| operator.admits(numbers, self.target, size))
        }
    }
}

impl From<Cage> for RawCage {
    fn from(cage: Cage) -> RawCage {
        let symbol = String::from(cage.operator_symbol());
        (cage.target, cage.cells, symbol)
    }
}

impl TryFrom<RawCage> for Cage {
    type Error = ModelError;

    fn try_from((target, cells, symbol): RawCage) -> ModelResult<Cage> {
        Cage::new(target, cells, Operator::parse(&symbol)?)
    }
}

/// A Cagey puzzle, consisting of the grid size and an ordered list of cages.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(into = "(usize, Vec<Cage>)")]
#[serde(try_from = "(usize, Vec<Cage>)")]
pub struct Puzzle {
    size: usize,
    cages: Vec<Cage>
}

pub(crate) fn index(row: usize, column: usize, size: usize) -> usize {
    (row - 1) * size + (column - 1)
}

impl Puzzle {

    /// Creates a new puzzle.
    ///
    /// # Arguments
    ///
    /// * `size`: The width and height of the grid. Must be at least 1.
    /// * `cages`: The cages in declaration order. All cells must lie within
    /// the grid. Cells need not be covered by a cage.
    ///
    /// # Errors
    ///
    /// * `ModelError::InvalidSize` if `size` is zero.
    /// * `ModelError::OutOfBounds` if some cage contains a cell whose row or
    /// column is not in the range `[1, size]`.
    pub fn new(size: usize, cages: Vec<Cage>) -> ModelResult<Puzzle> {
        if size == 0 {
            return Err(ModelError::InvalidSize);
        }

        let in_bounds = |&(row, column): &(usize, usize)|
            row >= 1 && row <= size && column >= 1 && column <= size;

        if !cages.iter().all(|cage| cage.cells().iter().all(in_bounds)) {
            return Err(ModelError::OutOfBounds);
        }

        Ok(Puzzle {
            size,
            cages
        })
    }

    /// Gets the width and height of the grid.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Gets the cages in declaration order.
    pub fn cages(&self) -> &[Cage] {
        &self.cages
    }

    /// Checks whether the given row-major grid of numbers solves this puzzle,
    /// that is, it is a Latin square over `[1, size]` and every cage is
    /// satisfied.
    pub fn check_solution(&self, numbers: &[usize]) -> bool {
        let size = self.size;

        if numbers.len() != size * size ||
                numbers.iter().any(|&n| n == 0 || n > size) {
            return false;
        }

        for i in 1..=size {
            let row = (1..=size).map(|c| numbers[index(i, c, size)]);
            let column = (1..=size).map(|r| numbers[index(r, i, size)]);

            if util::contains_duplicate(row) ||
                    util::contains_duplicate(column) {
                return false;
            }
        }

        self.cages.iter().all(|cage| {
            let cage_numbers: Vec<usize> = cage.cells().iter()
                .map(|&(row, column)| numbers[index(row, column, size)])
                .collect();
            cage.is_satisfied_by(&cage_numbers, size)
        })
    }
}

impl From<Puzzle> for (usize, Vec<Cage>) {
    fn from(puzzle: Puzzle) -> (usize, Vec<Cage>) {
        (puzzle.size, puzzle.cages)
    }
}

impl TryFrom<(usize, Vec<Cage>)> for Puzzle {
    type Error = ModelError;

    fn try_from((size, cages): (usize, Vec<Cage>)) -> ModelResult<Puzzle> {
        Puzzle::new(size, cages)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    pub(crate) fn example_puzzle() -> Puzzle {
        Puzzle::new(3, vec![
            Cage::new(3, vec![(1, 1), (2, 1)], Some(Operator::Add)).unwrap(),
            Cage::new(1, vec![(1, 2)], None).unwrap(),
            Cage::new(8, vec![(1, 3), (2, 3), (2, 2)], Some(Operator::Add))
                .unwrap(),
            Cage::new(3, vec![(3, 1)], None).unwrap(),
            Cage::new(3, vec![(3, 2), (3, 3)], Some(Operator::Add)).unwrap()
        ]).unwrap()
    }

    #[test]
    fn operator_parsing() {
        assert_eq!(Ok(Some(Operator::Subtract)), Operator::parse("-"));
        assert_eq!(Ok(None), Operator::parse("?"));
        assert_eq!(Err(ModelError::UnknownOperator(String::from("%"))),
            Operator::parse("%"));

        for &operator in Operator::ALL.iter() {
            assert_eq!(Ok(Some(operator)), Operator::parse(operator.symbol()));
        }
    }

    #[test]
    fn operator_evaluation() {
        assert!(Operator::Add.evaluates_to(&[1, 2, 3], 6));
        assert!(Operator::Multiply.evaluates_to(&[2, 2, 3], 12));
        assert!(Operator::Subtract.evaluates_to(&[5, 1, 2], 2));
        assert!(Operator::Subtract.evaluates_to(&[1, 2, 3], 4));
        assert!(Operator::Divide.evaluates_to(&[6, 3], 2));
        assert!(!Operator::Divide.evaluates_to(&[3, 6], 2));
        assert!(!Operator::Divide.evaluates_to(&[5, 2], 2));
        assert!(!Operator::Multiply.evaluates_to(&[usize::MAX, 2], 0));
        assert!(!Operator::Subtract.evaluates_to(&[], 0));
    }

    #[test]
    fn overflowing_sums_never_match() {
        assert!(!Operator::Add.evaluates_to(&[usize::MAX, 1], 0));
        assert!(!Operator::Add.evaluates_to(&[usize::MAX, 2], 1));
        assert!(Operator::Add.evaluates_to(&[usize::MAX, 0], usize::MAX));
        assert!(!Operator::Subtract.evaluates_to(&[1, usize::MAX, 1], 1));
        assert!(!Operator::Subtract.admits(&[1, usize::MAX, 1], 1, 4));
    }

    #[test]
    fn operator_admission() {
        assert!(Operator::Add.admits(&[4, 4], 8, 4));
        assert!(Operator::Subtract.admits(&[3, 1], 2, 4));
        assert!(!Operator::Subtract.admits(&[4, 2], 2, 4));
        assert!(!Operator::Subtract.admits(&[2, 1, 1], 0, 4));
        assert!(Operator::Divide.admits(&[2, 1], 2, 3));
        assert!(!Operator::Divide.admits(&[3, 1], 3, 3));
    }

    #[test]
    fn cage_errors() {
        assert_eq!(Err(ModelError::EmptyCage),
            Cage::new(3, Vec::new(), Some(Operator::Add)));
        assert_eq!(Err(ModelError::DuplicateCell),
            Cage::new(3, vec![(1, 1), (1, 1)], Some(Operator::Add)));
    }

    #[test]
    fn puzzle_errors() {
        assert_eq!(Err(ModelError::InvalidSize), Puzzle::new(0, Vec::new()));

        let cage = Cage::new(3, vec![(1, 1), (3, 1)], None).unwrap();
        assert_eq!(Err(ModelError::OutOfBounds),
            Puzzle::new(2, vec![cage.clone()]));
        assert!(Puzzle::new(3, vec![cage]).is_ok());

        let cage = Cage::new(1, vec![(0, 1)], None).unwrap();
        assert_eq!(Err(ModelError::OutOfBounds), Puzzle::new(2, vec![cage]));
    }

    #[test]
    fn unknown_operator_cage() {
        let cage = Cage::new(2, vec![(1, 1), (1, 2)], None).unwrap();
        assert!(cage.is_satisfied_by(&[1, 2], 5));
        assert!(cage.is_satisfied_by(&[3, 1], 5));
        assert!(cage.is_satisfied_by(&[4, 2], 5));
        assert!(!cage.is_satisfied_by(&[4, 2], 4));
        assert!(!cage.is_satisfied_by(&[3, 4], 5));
        assert_eq!("?", cage.operator_symbol());
    }

    #[test]
    fn check_solution() {
        let puzzle = example_puzzle();
        assert!(puzzle.check_solution(&[2, 1, 3, 1, 3, 2, 3, 2, 1]));

        // Latin square, but the cages are violated.
        assert!(!puzzle.check_solution(&[1, 2, 3, 2, 3, 1, 3, 1, 2]));

        // Not a Latin square.
        assert!(!puzzle.check_solution(&[2, 1, 3, 1, 3, 2, 3, 2, 2]));

        // Wrong length and numbers.
        assert!(!puzzle.check_solution(&[2, 1, 3]));
        assert!(!puzzle.check_solution(&[2, 1, 3, 1, 3, 2, 3, 2, 0]));
    }

    #[test]
    fn deserialize_tuple_format() {
        let json = r#"[3, [
            [3, [[1, 1], [2, 1]], "+"],
            [1, [[1, 2]], "?"],
            [8, [[1, 3], [2, 3], [2, 2]], "+"],
            [3, [[3, 1]], "?"],
            [3, [[3, 2], [3, 3]], "+"]
        ]]"#;
        let puzzle: Puzzle = serde_json::from_str(json).unwrap();
        assert_eq!(example_puzzle(), puzzle);
    }

    #[test]
    fn serialization_keeps_symbols() {
        let cage = Cage::new(2, vec![(1, 1), (1, 2)], Some(Operator::Divide))
            .unwrap();
        let json = serde_json::to_string(&cage).unwrap();
        assert_eq!(r#"[2,[[1,1],[1,2]],"/"]"#, json);
    }

    #[test]
    fn deserialization_validates() {
        let unknown_operator = r#"[3, [[3, [[1, 1]], "%"]]]"#;
        assert!(serde_json::from_str::<Puzzle>(unknown_operator).is_err());

        let out_of_bounds = r#"[2, [[3, [[1, 3]], "+"]]]"#;
        assert!(serde_json::from_str::<Puzzle>(out_of_bounds).is_err());

        let empty = r#"[2, [[3, [], "+"]]]"#;
        assert!(serde_json::from_str::<Puzzle>(empty).is_err());
    }
}
