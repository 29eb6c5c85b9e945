mod utils;

use crate::utils::*;

use anyhow::{Context, Result, bail};
use clap::Parser;
use klondike_common::{
    GameState, Move, apply_move, describe_move, format_moves, generate_deal_with,
};
use klondike_solver::{Outcome, SolveMode, SolveResult, SolveStats, Solver, SolverConfig};
use rand::SeedableRng;
use rand::rngs::StdRng;

use std::{
    io::{IsTerminal, Read, stdin},
    path::PathBuf,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Deal a biased random game from this seed
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
    #[command(flatten)]
    search: SearchArgs,
    /// Report solvable without searching
    #[arg(short, long)]
    skip: bool,
    /// Describe every move of the solution
    #[arg(short, long)]
    verbose: bool,
    /// Preview initial game state without solving
    #[arg(short, long)]
    preview: bool,
    /// Path to a game state file to solve
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let Cli {
        seed,
        search,
        skip,
        verbose,
        preview,
        file,
    } = Cli::parse();

    let state = if let Some(file) = file {
        let content = std::fs::read_to_string(file)?;
        GameState::parse(&content).context("Failed to parse board")?
    } else if let Some(seed) = seed {
        let deal = generate_deal_with(&mut StdRng::seed_from_u64(seed))?;
        GameState::deal(&deal)?
    } else if !stdin().is_terminal() {
        let mut content = String::new();
        stdin()
            .read_to_string(&mut content)
            .context("Failed to read from stdin")?;
        GameState::parse(&content).context("Failed to parse board")?
    } else {
        bail!("No game state `file` or `--seed` provided.");
    };
    if preview {
        println!("{}", state.to_pretty_string());
        return Ok(());
    }

    let mode = if skip {
        SolveMode::Skip
    } else {
        SolveMode::Verify
    };
    let result = do_solve(&state, search.config(mode))?;
    if result.moves.is_empty() {
        return Ok(());
    }
    if verbose {
        print_steps(&state, &result.moves)?;
    } else {
        println!("{}", format_moves(&result.moves));
    }

    Ok(())
}

fn do_solve(state: &GameState, config: SolverConfig) -> Result<SolveResult> {
    println!("{}\n", state.to_pretty_string());
    let solver = Solver::new(config);
    let result = with_spinner("Searching for a solution...", |message| {
        solver.solve_with_progress(state, None, |stats| message.set(progress_line(stats)))
    })?;
    println!("{}\n", summary_line(&result));
    Ok(result)
}

fn progress_line(stats: &SolveStats) -> String {
    format!(
        "Searching... Expanded: {}, Visited: {}, Best: {}, Time: {}",
        stats.expanded,
        stats.visited,
        stats.best_heuristic,
        format_elapsed(stats.elapsed)
    )
}

fn summary_line(result: &SolveResult) -> String {
    let SolveStats {
        expanded,
        visited,
        elapsed,
        ..
    } = &result.stats;
    let stats_str = format!(
        "Time: {}, Expanded: {expanded}, Visited: {visited}",
        format_elapsed(*elapsed)
    );
    match result.outcome {
        Outcome::Solved => {
            let draws = result.moves.iter().filter(|m| m.is_draw()).count();
            let mut steps_str = format!("{} Moves", result.moves.len() - draws);
            if draws > 0 {
                steps_str.push_str(&format!(", {draws} Draw"));
                if draws > 1 {
                    steps_str.push('s');
                }
            }
            format!("✓ Solvable in {steps_str}; {stats_str}")
        }
        Outcome::Skipped => "✓ Solvable (verification skipped)".to_string(),
        outcome => format!("✗ Not proven solvable ({outcome}); {stats_str}"),
    }
}

fn print_steps(start: &GameState, moves: &[Move]) -> Result<()> {
    let mut state = start.clone();
    for (i, &mov) in moves.iter().enumerate() {
        println!("{:>4}. {:<8} {}", i + 1, mov.notation(), describe_move(&state, &mov));
        state = apply_move(&state, mov)?;
    }
    Ok(())
}
