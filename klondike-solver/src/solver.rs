use crate::heuristic::HeuristicWeights;
use crate::key::{StateKey, state_key};
use crate::moves::{PossibleMoves, compute_possible_moves};

use klondike_common::{Deal, GameState, Move, apply_move, generate_deal_with};

use ahash::AHashSet;
use anyhow::Result;
use rand::Rng;
use smallvec::SmallVec;
use std::{
    cmp::Ordering as CmpOrdering,
    collections::BinaryHeap,
    fmt,
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};

pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_DEPTH: u32 = 5000;
pub const DEFAULT_MAX_EXPANSIONS: usize = 100_000;
/// Longest gap between two progress reports while the best heuristic stalls.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

/// Whether a solvability query actually searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SolveMode {
    #[default]
    Verify,
    /// Answer "solvable" without searching.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    pub time_limit: Duration,
    /// States reached after this many moves are dropped instead of expanded.
    pub max_depth: u32,
    pub max_expansions: usize,
    pub weights: HeuristicWeights,
    /// Include stock and waste contents in the visited key, not just their sizes.
    pub exact_talon_key: bool,
    pub mode: SolveMode,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            max_depth: DEFAULT_MAX_DEPTH,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            weights: HeuristicWeights::default(),
            exact_talon_key: false,
            mode: SolveMode::Verify,
        }
    }
}

/// How a search ended. Only [`Outcome::Solved`] is a proof; every other
/// verification outcome means "no solution found", never "unsolvable".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Solved,
    /// The open set ran dry.
    Exhausted,
    TimeLimit,
    ExpansionLimit,
    Cancelled,
    Skipped,
}

impl Outcome {
    pub fn is_solved(self) -> bool {
        matches!(self, Outcome::Solved | Outcome::Skipped)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Outcome::Solved => "solved",
            Outcome::Exhausted => "search space exhausted",
            Outcome::TimeLimit => "time limit reached",
            Outcome::ExpansionLimit => "expansion limit reached",
            Outcome::Cancelled => "cancelled",
            Outcome::Skipped => "verification skipped",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// States whose successors were generated.
    pub expanded: usize,
    pub enqueued: usize,
    /// Distinct keys in the visited set.
    pub visited: usize,
    /// Largest size of the open set.
    pub max_open: usize,
    /// Lowest heuristic value seen.
    pub best_heuristic: i32,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct SolveResult {
    pub outcome: Outcome,
    /// Moves from the start state to the goal; empty unless solved.
    pub moves: Vec<Move>,
    pub stats: SolveStats,
}

impl SolveResult {
    pub fn is_solved(&self) -> bool {
        self.outcome.is_solved()
    }
}

#[derive(Debug, Clone, Copy)]
struct MoveNode {
    parent: u32,
    mov: Option<Move>,
}

impl MoveNode {
    const ROOT: MoveNode = MoveNode {
        parent: 0,
        mov: None,
    };
}

#[derive(Debug)]
struct OpenEntry {
    priority: i32,
    seq: u64,
    depth: u32,
    node: u32,
    key: StateKey,
    state: GameState,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for OpenEntry {}

// BinaryHeap is a max-heap: lowest priority first, then first enqueued.
impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

fn path_to(nodes: &[MoveNode], mut index: u32) -> Vec<Move> {
    let mut moves = Vec::new();
    while let Some(mov) = nodes[index as usize].mov {
        moves.push(mov);
        index = nodes[index as usize].parent;
    }
    moves.reverse();
    moves
}

pub fn solve(state: &GameState, config: &SolverConfig) -> Result<SolveResult> {
    Solver::new(*config).solve(state)
}

/// Searches the opening position of `deal`. Skip mode answers `true` without
/// looking at the deal.
pub fn is_solvable(deal: &Deal, config: &SolverConfig) -> Result<bool> {
    if config.mode == SolveMode::Skip {
        return Ok(true);
    }
    let state = GameState::deal(deal)?;
    Ok(solve(&state, config)?.is_solved())
}

/// Generates biased deals until one is proven solvable within `config`'s
/// budgets, or `max_attempts` deals have failed.
pub fn find_solvable_deal<R: Rng + ?Sized>(
    rng: &mut R,
    config: &SolverConfig,
    max_attempts: usize,
) -> Result<Option<(Deal, SolveResult)>> {
    let solver = Solver::new(*config);
    for _ in 0..max_attempts {
        let deal = generate_deal_with(rng)?;
        let result = solver.solve(&GameState::deal(&deal)?)?;
        if result.is_solved() {
            return Ok(Some((deal, result)));
        }
    }
    Ok(None)
}

/// Best-first search over game states, ordered by `moves taken + heuristic`.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn solve(&self, start: &GameState) -> Result<SolveResult> {
        self.solve_with_cancel(start, None)
    }

    /// Runs the search, polling `cancel` before each expansion.
    ///
    /// Budget exhaustion is reported through [`Outcome`]; an error means the
    /// start state is invalid or a generated move failed to apply.
    pub fn solve_with_cancel(
        &self,
        start: &GameState,
        cancel: Option<&AtomicBool>,
    ) -> Result<SolveResult> {
        self.solve_with_progress(start, cancel, |_| {})
    }

    /// Like [`Solver::solve_with_cancel`], calling `progress` with the running
    /// statistics after every expansion that lowers the best heuristic, and at
    /// least every [`PROGRESS_INTERVAL`] otherwise.
    pub fn solve_with_progress<F>(
        &self,
        start: &GameState,
        cancel: Option<&AtomicBool>,
        mut progress: F,
    ) -> Result<SolveResult>
    where
        F: FnMut(&SolveStats),
    {
        let timer = Instant::now();
        let mut last_report = timer;
        let config = &self.config;
        let mut stats = SolveStats::default();

        if config.mode == SolveMode::Skip {
            return Ok(SolveResult {
                outcome: Outcome::Skipped,
                moves: Vec::new(),
                stats,
            });
        }
        start.validate()?;

        let mut open = BinaryHeap::new();
        let mut visited: AHashSet<StateKey> = AHashSet::default();
        let mut nodes = vec![MoveNode::ROOT];
        let mut possible_moves = PossibleMoves::new();
        let mut seq: u64 = 0;

        let h = config.weights.evaluate(start);
        stats.best_heuristic = h;
        open.push(OpenEntry {
            priority: h,
            seq,
            depth: 0,
            node: 0,
            key: state_key(start, config.exact_talon_key),
            state: start.clone(),
        });
        stats.enqueued = 1;
        stats.max_open = 1;

        let outcome = loop {
            let Some(entry) = open.pop() else {
                break Outcome::Exhausted;
            };

            if entry.state.is_won() {
                stats.visited = visited.len();
                stats.elapsed = timer.elapsed();
                return Ok(SolveResult {
                    outcome: Outcome::Solved,
                    moves: path_to(&nodes, entry.node),
                    stats,
                });
            }

            if !visited.insert(entry.key) {
                continue;
            }
            if entry.depth >= config.max_depth {
                continue;
            }

            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                break Outcome::Cancelled;
            }
            if stats.expanded >= config.max_expansions {
                break Outcome::ExpansionLimit;
            }
            if timer.elapsed() >= config.time_limit {
                break Outcome::TimeLimit;
            }
            stats.expanded += 1;

            possible_moves.clear();
            compute_possible_moves(&entry.state, &mut possible_moves);

            let mut successors: SmallVec<[(i32, Move, GameState); 64]> = SmallVec::new();
            for &mov in &possible_moves {
                let next = apply_move(&entry.state, mov)?;
                successors.push((config.weights.evaluate(&next), mov, next));
            }
            // stable: ties keep generation order
            successors.sort_by_key(|(h, ..)| *h);

            let depth = entry.depth + 1;
            let best_before = stats.best_heuristic;
            for (h, mov, next) in successors {
                let key = state_key(&next, config.exact_talon_key);
                if visited.contains(&key) {
                    continue;
                }
                nodes.push(MoveNode {
                    parent: entry.node,
                    mov: Some(mov),
                });
                seq += 1;
                stats.best_heuristic = stats.best_heuristic.min(h);
                open.push(OpenEntry {
                    priority: depth as i32 + h,
                    seq,
                    depth,
                    node: (nodes.len() - 1) as u32,
                    key,
                    state: next,
                });
                stats.enqueued += 1;
            }
            stats.max_open = stats.max_open.max(open.len());

            if stats.best_heuristic < best_before || last_report.elapsed() >= PROGRESS_INTERVAL {
                stats.visited = visited.len();
                stats.elapsed = timer.elapsed();
                progress(&stats);
                last_report = Instant::now();
            }
        };

        stats.visited = visited.len();
        stats.elapsed = timer.elapsed();
        Ok(SolveResult {
            outcome,
            moves: Vec::new(),
            stats,
        })
    }
}
