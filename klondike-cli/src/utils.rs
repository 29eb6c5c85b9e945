use clap::Args;
use klondike_solver::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_EXPANSIONS, DEFAULT_TIME_LIMIT, SolveMode, SolverConfig,
};

use std::{
    io::{IsTerminal, Write, stderr},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

/// Search budgets shared by the binaries.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Wall-clock limit per search in seconds
    #[arg(short, long, default_value_t = DEFAULT_TIME_LIMIT.as_secs(), value_name = "SECS")]
    pub time_limit: u64,
    /// Drop states reached after this many moves
    #[arg(short = 'd', long, default_value_t = DEFAULT_MAX_DEPTH, value_name = "NUM")]
    pub max_depth: u32,
    /// Stop after expanding this many states
    #[arg(short = 'e', long, default_value_t = DEFAULT_MAX_EXPANSIONS, value_name = "NUM")]
    pub max_expansions: usize,
    /// Tell states apart by stock and waste contents, not only their sizes
    #[arg(long)]
    pub exact_talon_key: bool,
}

impl SearchArgs {
    pub fn config(&self, mode: SolveMode) -> SolverConfig {
        SolverConfig {
            time_limit: Duration::from_secs(self.time_limit),
            max_depth: self.max_depth,
            max_expansions: self.max_expansions,
            exact_talon_key: self.exact_talon_key,
            mode,
            ..Default::default()
        }
    }
}

/// Text shown next to the spinner; the running task may replace it.
#[derive(Debug, Clone)]
pub struct SpinnerMessage(Arc<Mutex<String>>);

impl SpinnerMessage {
    fn new(message: &str) -> Self {
        Self(Arc::new(Mutex::new(message.to_string())))
    }

    pub fn set(&self, message: impl Into<String>) {
        if let Ok(mut current) = self.0.lock() {
            *current = message.into();
        }
    }

    pub fn get(&self) -> String {
        self.0.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

pub fn with_spinner<T, F: FnOnce(&SpinnerMessage) -> T>(message: &str, f: F) -> T {
    let message = SpinnerMessage::new(message);
    if stderr().is_terminal() {
        let spinning = Arc::new(AtomicBool::new(true));
        let spinning_clone = Arc::clone(&spinning);
        let message_clone = message.clone();

        let handle = std::thread::spawn(move || {
            let spinner_chars = ['|', '/', '-', '\\'];
            let mut i = 0;
            let stderr = stderr();
            let mut handle = stderr.lock();

            let _ = write!(handle, "\x1b[?25l"); // hide cursor
            let _ = handle.flush();

            while spinning_clone.load(Ordering::Relaxed) {
                let spinner_char = spinner_chars[i % spinner_chars.len()];
                let message = message_clone.get();
                let _ = write!(handle, "\r\x1b[2K{spinner_char} {message}");
                let _ = handle.flush();
                std::thread::sleep(Duration::from_millis(100));
                i += 1;
            }

            let _ = write!(handle, "\r\x1b[2K\r\x1b[?25h"); // clear line and show cursor
            let _ = handle.flush();
        });

        let result = f(&message);
        spinning.store(false, Ordering::Relaxed);
        let _ = handle.join();
        result
    } else {
        f(&message)
    }
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 90 {
        let ms = elapsed.subsec_millis();
        format!("{secs}.{ms:03}s")
    } else {
        let minutes = secs / 60;
        let secs = secs % 60;
        format!("{minutes}m {secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(1234)), "1.234s");
        assert_eq!(format_elapsed(Duration::from_millis(89_999)), "89.999s");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn test_spinner_message_updates() {
        let shown = with_spinner("Starting...", |message| {
            assert_eq!(message.get(), "Starting...");
            message.set("Expanded 10");
            message.get()
        });
        assert_eq!(shown, "Expanded 10");
    }

    #[test]
    fn test_search_args_config() {
        let args = SearchArgs {
            time_limit: 5,
            max_depth: 100,
            max_expansions: 42,
            exact_talon_key: true,
        };
        let config = args.config(SolveMode::Skip);
        assert_eq!(config.time_limit, Duration::from_secs(5));
        assert_eq!(config.max_depth, 100);
        assert_eq!(config.max_expansions, 42);
        assert!(config.exact_talon_key);
        assert_eq!(config.mode, SolveMode::Skip);
        assert_eq!(config.weights, SolverConfig::default().weights);
    }
}
