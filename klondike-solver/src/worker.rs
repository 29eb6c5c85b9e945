use crate::solver::{SolveMode, Solver, SolverConfig};

use klondike_common::{Deal, GameState};

use anyhow::{Result, bail};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, TryRecvError};
use std::thread::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolvabilityRequest {
    pub deal: Deal,
    pub mode: SolveMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolvabilityResponse {
    pub solvable: bool,
}

/// Handle to a solvability search running on its own thread.
///
/// A cancelled task never answers. Dropping the handle cancels it.
#[derive(Debug)]
pub struct SolvabilityTask {
    cancel: Arc<AtomicBool>,
    rx: mpsc::Receiver<Result<SolvabilityResponse>>,
    join: Option<JoinHandle<()>>,
}

impl SolvabilityTask {
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Polls for the answer: `Ok(None)` while the search is still running.
    /// Errors once the task was cancelled or its thread stopped without
    /// answering.
    pub fn try_recv(&self) -> Result<Option<SolvabilityResponse>> {
        match self.rx.try_recv() {
            Ok(response) => response.map(Some),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(self.closed_error()),
        }
    }

    /// Blocks until the search finishes. Errors if it was cancelled or
    /// panicked.
    pub fn wait(mut self) -> Result<SolvabilityResponse> {
        let response = self.rx.recv();
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                bail!("Solvability search panicked");
            }
        }
        match response {
            Ok(response) => response,
            Err(_) => Err(self.closed_error()),
        }
    }

    fn closed_error(&self) -> anyhow::Error {
        if self.is_cancelled() {
            anyhow::anyhow!("Solvability check was cancelled")
        } else {
            anyhow::anyhow!("Solvability search stopped without answering")
        }
    }
}

impl Drop for SolvabilityTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Starts searching the opening position of `request.deal` in the
/// background. The request's mode overrides `config.mode`.
pub fn spawn_solvability_check(
    request: SolvabilityRequest,
    config: SolverConfig,
) -> SolvabilityTask {
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_for_thread = Arc::clone(&cancel);
    let (tx, rx) = mpsc::channel();
    let solver = Solver::new(SolverConfig {
        mode: request.mode,
        ..config
    });
    let join = std::thread::spawn(move || {
        let result = GameState::deal(&request.deal)
            .and_then(|state| solver.solve_with_cancel(&state, Some(cancel_for_thread.as_ref())));
        if cancel_for_thread.load(Ordering::Relaxed) {
            return;
        }
        let _ = tx.send(result.map(|result| SolvabilityResponse {
            solvable: result.is_solved(),
        }));
    });
    SolvabilityTask {
        cancel,
        rx,
        join: Some(join),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use klondike_common::{Card, generate_deal};
    use std::time::Duration;

    fn request(mode: SolveMode) -> SolvabilityRequest {
        SolvabilityRequest {
            deal: generate_deal().unwrap(),
            mode,
        }
    }

    #[test]
    fn test_skip_answers_true() {
        let config = SolverConfig {
            max_expansions: 0,
            ..Default::default()
        };
        let task = spawn_solvability_check(request(SolveMode::Skip), config);
        assert_eq!(task.wait().unwrap(), SolvabilityResponse { solvable: true });
    }

    #[test]
    fn test_exhausted_budget_answers_false() {
        let config = SolverConfig {
            max_expansions: 1,
            mode: SolveMode::Skip,
            ..Default::default()
        };
        let task = spawn_solvability_check(request(SolveMode::Verify), config);
        assert_eq!(task.wait().unwrap(), SolvabilityResponse { solvable: false });
    }

    #[test]
    fn test_invalid_deal_reports_error() {
        let mut deal = Card::full_deck();
        deal[1] = deal[0];
        let task = spawn_solvability_check(
            SolvabilityRequest {
                deal,
                mode: SolveMode::Verify,
            },
            SolverConfig::default(),
        );
        assert!(task.wait().is_err());
    }

    #[test]
    fn test_cancel_discards_the_answer() {
        let config = SolverConfig {
            time_limit: Duration::from_secs(60),
            max_expansions: usize::MAX,
            ..Default::default()
        };
        let task = spawn_solvability_check(request(SolveMode::Verify), config);
        task.cancel();
        match task.wait() {
            Err(err) => assert!(err.to_string().contains("cancelled")),
            // finished before the flag was seen
            Ok(_) => {}
        }
    }

    #[test]
    fn test_try_recv_polls() {
        let task = spawn_solvability_check(request(SolveMode::Skip), SolverConfig::default());
        let response = loop {
            if let Some(response) = task.try_recv().unwrap() {
                break response;
            }
            std::thread::sleep(Duration::from_millis(1));
        };
        assert!(response.solvable);
    }

    #[test]
    fn test_polling_after_cancel_stops_pending() {
        let config = SolverConfig {
            time_limit: Duration::from_secs(60),
            max_expansions: usize::MAX,
            ..Default::default()
        };
        let task = spawn_solvability_check(request(SolveMode::Verify), config);
        task.cancel();
        assert!(task.is_cancelled());

        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        let polled = loop {
            match task.try_recv() {
                Ok(None) if std::time::Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(1));
                }
                other => break other,
            }
        };
        match polled {
            Err(err) => assert!(err.to_string().contains("cancelled")),
            // answered before the flag was seen
            Ok(Some(_)) => {}
            Ok(None) => panic!("still pending long after cancel"),
        }
    }

    #[test]
    fn test_dead_thread_is_not_pending() {
        let (tx, rx) = mpsc::channel::<Result<SolvabilityResponse>>();
        let join: JoinHandle<()> = std::thread::spawn(move || {
            drop(tx);
            panic!("search blew up");
        });
        let task = SolvabilityTask {
            cancel: Arc::new(AtomicBool::new(false)),
            rx,
            join: Some(join),
        };
        let polled = loop {
            match task.try_recv() {
                Ok(None) => std::thread::sleep(Duration::from_millis(1)),
                other => break other,
            }
        };
        let err = polled.unwrap_err();
        assert!(err.to_string().contains("without answering"));

        let err = task.wait().unwrap_err();
        assert!(err.to_string().contains("panicked"));
    }
}
