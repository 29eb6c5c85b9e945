mod utils;

use crate::utils::*;

use anyhow::{Result, bail};
use clap::Parser;
use klondike_common::{Deal, GameState, generate_deal_with};
use klondike_solver::{SolveMode, SolverConfig, find_solvable_deal};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Prints biased Klondike deals in the board format read by `klondike-solve`.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Number of deals to print
    #[arg(short = 'n', long, default_value_t = 1, value_name = "NUM")]
    count: usize,
    /// Seed for reproducible deals
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
    /// Keep only deals the solver proves solvable
    #[arg(long)]
    verify: bool,
    /// Deals tried for each verified deal before giving up
    #[arg(short = 'a', long, default_value_t = 20, value_name = "NUM")]
    max_attempts: usize,
    #[command(flatten)]
    search: SearchArgs,
}

fn main() -> Result<()> {
    let Cli {
        count,
        seed,
        verify,
        max_attempts,
        search,
    } = Cli::parse();

    if max_attempts == 0 {
        bail!("Max attempts must be at least 1.");
    }
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let config = search.config(SolveMode::Verify);

    for index in 0..count {
        let deal = if verify {
            verified_deal(&mut rng, config, max_attempts)?
        } else {
            generate_deal_with(&mut rng)?
        };
        if index > 0 {
            println!();
        }
        println!("{}", GameState::deal(&deal)?.to_pretty_string());
    }

    Ok(())
}

fn verified_deal<R: Rng + ?Sized>(
    rng: &mut R,
    config: SolverConfig,
    max_attempts: usize,
) -> Result<Deal> {
    let message = format!("Searching for a solvable deal (up to {max_attempts} attempts)...");
    let found = with_spinner(&message, |_| find_solvable_deal(rng, &config, max_attempts))?;
    let Some((deal, result)) = found else {
        bail!("No solvable deal found in {max_attempts} attempts.");
    };
    eprintln!(
        "✓ Solvable deal found, {} moves; Time: {}, Expanded: {}",
        result.moves.len(),
        format_elapsed(result.stats.elapsed),
        result.stats.expanded
    );
    Ok(deal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verified_deal_gives_up() {
        let config = SolverConfig {
            max_expansions: 1,
            ..Default::default()
        };
        let err = verified_deal(&mut StdRng::seed_from_u64(1), config, 2).unwrap_err();
        assert!(err.to_string().contains("2 attempts"));
    }
}
