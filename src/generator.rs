//! This module contains logic for generating random Cagey puzzles.
//!
//! Generation first fills a random Latin square, then partitions the grid
//! into random connected cages and finally annotates every cage with an
//! operator its numbers satisfy and the resulting target. The filled square
//! is returned together with the puzzle, so it is a known solution.

use crate::{Cage, Operator, Puzzle};
use crate::error::{ModelError, ModelResult};

use log::debug;

use rand::Rng;
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;

/// The default maximum number of cells in a generated cage.
pub const DEFAULT_MAX_CAGE_SIZE: usize = 3;

/// A generator randomly generates a [Puzzle] along with one of its
/// solutions. It uses a random number generator to decide the grid, the
/// cage layout and the operators. For most cases, sensible defaults are
/// provided by [Generator::new_default].
pub struct Generator<R: Rng> {
    rng: R,
    max_cage_size: usize,
    hide_probability: f64
}

impl Generator<ThreadRng> {

    /// Creates a new generator that uses a [ThreadRng] to make random
    /// decisions.
    pub fn new_default() -> Generator<ThreadRng> {
        Generator::new(rand::thread_rng())
    }
}

fn neighbors(row: usize, column: usize, size: usize)
        -> impl Iterator<Item = (usize, usize)> {
    let candidates = [
        (row.wrapping_sub(1), column),
        (row + 1, column),
        (row, column.wrapping_sub(1)),
        (row, column + 1)
    ];

    candidates.to_vec().into_iter()
        .filter(move |&(r, c)| r >= 1 && r <= size && c >= 1 && c <= size)
}

impl<R: Rng> Generator<R> {

    /// Creates a new generator that uses the given random number generator.
    /// Cages have at most [DEFAULT_MAX_CAGE_SIZE] cells and all operators
    /// are shown.
    pub fn new(rng: R) -> Generator<R> {
        Generator {
            rng,
            max_cage_size: DEFAULT_MAX_CAGE_SIZE,
            hide_probability: 0.0
        }
    }

    /// Sets the maximum number of cells per cage. Values below 1 are treated
    /// as 1.
    pub fn with_max_cage_size(mut self, max_cage_size: usize) -> Generator<R> {
        self.max_cage_size = max_cage_size.max(1);
        self
    }

    /// Sets the probability with which the operator of each cage is hidden,
    /// i.e. replaced by `?`. The probability is clamped to `[0, 1]`.
    pub fn with_hidden_operators(mut self, probability: f64) -> Generator<R> {
        self.hide_probability = if probability.is_nan() {
            0.0
        }
        else {
            probability.max(0.0).min(1.0)
        };
        self
    }

    /// Generates a random Latin square of the given size in row-major order.
    /// The cyclic square is shuffled by rows, columns and symbols.
    ///
    /// # Errors
    ///
    /// `ModelError::InvalidSize` if `size` is zero.
    pub fn latin_square(&mut self, size: usize) -> ModelResult<Vec<usize>> {
        if size == 0 {
            return Err(ModelError::InvalidSize);
        }

        let mut rows: Vec<usize> = (0..size).collect();
        let mut columns: Vec<usize> = (0..size).collect();
        let mut symbols: Vec<usize> = (1..=size).collect();
        rows.shuffle(&mut self.rng);
        columns.shuffle(&mut self.rng);
        symbols.shuffle(&mut self.rng);

        Ok(rows.iter()
            .flat_map(|&r| columns.iter().map(move |&c| (r + c) % size))
            .map(|cyclic| symbols[cyclic])
            .collect())
    }

    /// Partitions the grid into orthogonally connected cages, each with at
    /// most `max_cage_size` cells. The first cell of each cage is its seed,
    /// further cells are in the order they were added.
    fn partition(&mut self, size: usize) -> Vec<Vec<(usize, usize)>> {
        let mut taken = vec![false; size * size];
        let mut seeds: Vec<(usize, usize)> = (1..=size)
            .flat_map(|row| (1..=size).map(move |column| (row, column)))
            .collect();
        seeds.shuffle(&mut self.rng);
        let mut cages = Vec::new();

        for seed in seeds {
            if taken[crate::index(seed.0, seed.1, size)] {
                continue;
            }

            let target_size = self.rng.gen_range(1..=self.max_cage_size);
            let mut cells = vec![seed];
            taken[crate::index(seed.0, seed.1, size)] = true;

            while cells.len() < target_size {
                let frontier: Vec<(usize, usize)> = cells.iter()
                    .flat_map(|&(row, column)| neighbors(row, column, size))
                    .filter(|&(row, column)|
                        !taken[crate::index(row, column, size)])
                    .collect();

                match frontier.choose(&mut self.rng) {
                    Some(&(row, column)) => {
                        taken[crate::index(row, column, size)] = true;
                        cells.push((row, column));
                    },
                    None => break
                }
            }

            cages.push(cells);
        }

        cages
    }

    /// Chooses a random operator among those the numbers can be combined
    /// with in a grid of the given size, and returns it with the target.
    fn choose_operator(&mut self, numbers: &[usize], size: usize)
            -> (Operator, usize) {
        let sum = numbers.iter().sum::<usize>();
        let mut candidates = vec![(Operator::Add, sum)];

        let product = numbers.iter()
            .try_fold(1usize, |product, &n| product.checked_mul(n));

        if let Some(product) = product {
            candidates.push((Operator::Multiply, product));
        }

        if let Some((&first, rest)) = numbers.split_first() {
            let rest_sum: usize = rest.iter().sum();
            let difference = if first >= rest_sum {
                first - rest_sum
            }
            else {
                rest_sum - first
            };

            if Operator::Subtract.admits(numbers, difference, size) {
                candidates.push((Operator::Subtract, difference));
            }

            let divisor = rest.iter()
                .try_fold(1usize, |product, &n| product.checked_mul(n));

            if let Some(divisor) = divisor {
                let quotient = first / divisor;

                if Operator::Divide.admits(numbers, quotient, size) {
                    candidates.push((Operator::Divide, quotient));
                }
            }
        }

        // Candidates always contain addition.
        candidates[self.rng.gen_range(0..candidates.len())]
    }

    /// Generates a new random puzzle of the given size and returns it
    /// together with a solution, as a row-major grid.
    ///
    /// It is guaranteed that [Puzzle::check_solution] on the result accepts
    /// the returned solution. The puzzle is not necessarily uniquely
    /// solveable.
    ///
    /// # Errors
    ///
    /// `ModelError::InvalidSize` if `size` is zero.
    pub fn generate(&mut self, size: usize)
            -> ModelResult<(Puzzle, Vec<usize>)> {
        let solution = self.latin_square(size)?;
        let mut cages = Vec::new();

        for cells in self.partition(size) {
            let numbers: Vec<usize> = cells.iter()
                .map(|&(row, column)| solution[crate::index(row, column, size)])
                .collect();
            let (operator, target) = self.choose_operator(&numbers, size);
            let operator = if self.rng.gen_bool(self.hide_probability) {
                None
            }
            else {
                Some(operator)
            };

            cages.push(Cage::new(target, cells, operator)?);
        }

        debug!("generated puzzle of size {} with {} cages", size, cages.len());
        Ok((Puzzle::new(size, cages)?, solution))
    }
}
