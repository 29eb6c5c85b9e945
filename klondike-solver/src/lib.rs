//! Solvability search for Klondike deals.
//!
//! A best-first search ordered by `moves taken + heuristic` over immutable
//! [`GameState`](klondike_common::GameState) values, pruned by a visited set
//! of canonical state keys and bounded by wall-clock, depth and expansion
//! budgets. [`spawn_solvability_check`] runs the same search on a background
//! thread behind a cancellable request/response handle.
mod heuristic;
mod key;
mod moves;
mod solver;
mod worker;

pub use crate::heuristic::{HeuristicWeights, heuristic};
pub use crate::key::{StateKey, state_key};
pub use crate::moves::{PossibleMoves, compute_possible_moves, possible_moves};
pub use crate::solver::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_EXPANSIONS, DEFAULT_TIME_LIMIT, Outcome, PROGRESS_INTERVAL,
    SolveMode, SolveResult, SolveStats, Solver, SolverConfig, find_solvable_deal, is_solvable,
    solve,
};
pub use crate::worker::{
    SolvabilityRequest, SolvabilityResponse, SolvabilityTask, spawn_solvability_check,
};
