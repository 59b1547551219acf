use crate::Puzzle;
use crate::csp::{Csp, Value, VariableId};
use crate::generator::Generator;
use crate::heuristic::{OrderingKind, VariableOrdering};
use crate::model;
use crate::propagator::{Propagation, Propagator, PropagatorKind};
use crate::solver::{BacktrackingSolver, Solution, Solver, SolverConfig};

use rand::{Rng, SeedableRng};
use rand::seq::SliceRandom;

use rand_chacha::ChaCha8Rng;

const ITERATIONS_PER_RUN: usize = 20;
const MAX_SIZE: usize = 4;

const PROPAGATORS: [PropagatorKind; 3] = [
    PropagatorKind::PlainChecking,
    PropagatorKind::ForwardChecking,
    PropagatorKind::GeneralizedArcConsistency
];

fn generate(rng: &mut ChaCha8Rng, hide_probability: f64)
        -> (Puzzle, Vec<usize>) {
    let size = rng.gen_range(1..=MAX_SIZE);
    let seed = rng.gen();
    Generator::new(ChaCha8Rng::seed_from_u64(seed))
        .with_hidden_operators(hide_probability)
        .generate(size)
        .unwrap()
}

fn cells(variables: &[VariableId], size: usize) -> &[VariableId] {
    &variables[(variables.len() - size * size)..]
}

fn snapshot(csp: &Csp) -> Vec<(Option<Value>, Vec<Value>)> {
    csp.variables().iter()
        .map(|v| (v.assigned_value(), v.current_domain()))
        .collect()
}

fn run_consistency_test(propagator: PropagatorKind, ordering: OrderingKind,
        seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let solver = BacktrackingSolver::from_config(&SolverConfig {
        propagator,
        ordering,
        node_limit: None
    });

    for _ in 0..ITERATIONS_PER_RUN {
        let (puzzle, _) = generate(&mut rng, 0.3);
        let (mut csp, variables) = model::cagey_csp_model(&puzzle).unwrap();
        let before = snapshot(&csp);
        let assignment = solver.find_first(&mut csp).unwrap()
            .expect("generated puzzle has no solution");
        let grid = assignment.numbers_of(cells(&variables, puzzle.size()))
            .unwrap();

        assert!(puzzle.check_solution(&grid));
        assert_eq!(before, snapshot(&csp));
    }
}

#[test]
fn plain_checking_degree() {
    run_consistency_test(PropagatorKind::PlainChecking, OrderingKind::Degree,
        1);
}

#[test]
fn plain_checking_mrv() {
    run_consistency_test(PropagatorKind::PlainChecking,
        OrderingKind::MinimumRemainingValues, 2);
}

#[test]
fn forward_checking_degree() {
    run_consistency_test(PropagatorKind::ForwardChecking,
        OrderingKind::Degree, 3);
}

#[test]
fn forward_checking_mrv() {
    run_consistency_test(PropagatorKind::ForwardChecking,
        OrderingKind::MinimumRemainingValues, 4);
}

#[test]
fn gac_degree() {
    run_consistency_test(PropagatorKind::GeneralizedArcConsistency,
        OrderingKind::Degree, 5);
}

#[test]
fn gac_mrv() {
    run_consistency_test(PropagatorKind::GeneralizedArcConsistency,
        OrderingKind::MinimumRemainingValues, 6);
}

#[test]
fn propagators_agree_on_uniqueness() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    for _ in 0..ITERATIONS_PER_RUN {
        let (puzzle, _) = generate(&mut rng, 0.0);
        let (mut csp, _) = model::cagey_csp_model(&puzzle).unwrap();
        let solutions: Vec<Solution> = PROPAGATORS.iter()
            .map(|&propagator| BacktrackingSolver::new(propagator,
                OrderingKind::Degree).solve(&mut csp).unwrap())
            .collect();

        assert_ne!(Solution::Impossible, solutions[0]);
        assert!(solutions.iter().all(|s| s == &solutions[0]));
    }
}

#[test]
fn propagation_is_reversible() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);

    for _ in 0..ITERATIONS_PER_RUN {
        let (puzzle, _) = generate(&mut rng, 0.5);
        let (mut csp, _) = model::cagey_csp_model(&puzzle).unwrap();
        let propagator = *PROPAGATORS.choose(&mut rng).unwrap();
        let before = snapshot(&csp);
        let mut assigned = Vec::new();
        let mut prunings = Vec::new();

        // Walk down a random branch until a dead end or a full assignment.
        while let Some(variable) = OrderingKind::Degree.select(&csp) {
            let value = *csp.current_domain(variable).choose(&mut rng)
                .unwrap();
            csp.assign(variable, value).unwrap();
            assigned.push(variable);

            match propagator.propagate(&mut csp, Some(variable)) {
                Propagation::Consistent(new_prunings) => {
                    assert!(new_prunings.iter()
                        .all(|p| !csp.variable(p.variable)
                            .in_current_domain(p.value)));
                    prunings.extend(new_prunings);
                },
                Propagation::Inconsistent => break
            }
        }

        for pruning in prunings.into_iter().rev() {
            assert!(csp.unprune(pruning.variable, pruning.value));
        }

        for variable in assigned.into_iter().rev() {
            csp.unassign(variable).unwrap();
        }

        assert_eq!(before, snapshot(&csp));
    }
}

#[test]
fn json_round_trip_of_generated_puzzles() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    for _ in 0..ITERATIONS_PER_RUN {
        let (puzzle, solution) = generate(&mut rng, 0.5);
        let json = serde_json::to_string(&puzzle).unwrap();
        let parsed: Puzzle = serde_json::from_str(&json).unwrap();

        assert_eq!(puzzle, parsed);
        assert!(parsed.check_solution(&solution));
    }
}
