//! # Search budget
//!
//! Iterative deepening can run for a very long time on large or unsolvable
//! puzzles. `SearchBudget` is consulted once per expanded node and tells the
//! solver whether to keep going. It combines three independent limits:
//!
//! - a node limit (`SearchLimits::max_nodes`),
//! - a wall-clock limit (`SearchLimits::time_limit`), read only when
//!   `(steps & clock_check_mask) == 0` so the clock is not queried per node,
//! - an external stop flag (`&AtomicBool`) for cooperative cancellation from
//!   another thread.
//!
//! ```rust
//! use water_sort_solver::monitor::{SearchBudget, SearchCommand, SearchLimits};
//!
//! let mut budget = SearchBudget::new(SearchLimits::default().with_max_nodes(2), None);
//! budget.on_step();
//! budget.on_step();
//! assert_eq!(budget.search_command(), SearchCommand::Continue);
//! budget.on_step();
//! assert!(matches!(budget.search_command(), SearchCommand::Terminate(_)));
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// What the solver should do after a step: expand the next node, or unwind
/// the whole search and report the given reason.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum SearchCommand {
    #[default]
    Continue,
    Terminate(String),
}

impl fmt::Display for SearchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchCommand::Continue => write!(f, "Continue"),
            SearchCommand::Terminate(reason) => write!(f, "Terminate: {}", reason),
        }
    }
}

/// Limits on the total work one `solve` call may do. The default is unlimited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_nodes: Option<u64>,
    pub time_limit: Option<Duration>,
    pub clock_check_mask: u64,
}

impl SearchLimits {
    /// Check the clock every 4,096 steps (2^12).
    pub const DEFAULT_CLOCK_CHECK_MASK: u64 = 0xFFF;

    pub fn with_max_nodes(mut self, max_nodes: u64) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    /// `mask` should be a power of two minus one; `0` checks on every step.
    pub fn with_clock_check_mask(mut self, mask: u64) -> Self {
        self.clock_check_mask = mask;
        self
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            max_nodes: None,
            time_limit: None,
            clock_check_mask: Self::DEFAULT_CLOCK_CHECK_MASK,
        }
    }
}

/// Running budget for one search. Created fresh per `solve` call.
#[derive(Debug, Clone)]
pub struct SearchBudget<'a> {
    limits: SearchLimits,
    stop_flag: Option<&'a AtomicBool>,
    steps: u64,
    start_time: Instant,
}

impl<'a> SearchBudget<'a> {
    pub fn new(limits: SearchLimits, stop_flag: Option<&'a AtomicBool>) -> Self {
        Self {
            limits,
            stop_flag,
            steps: 0,
            start_time: Instant::now(),
        }
    }

    #[inline(always)]
    pub fn on_step(&mut self) {
        self.steps = self.steps.wrapping_add(1);
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Wall-clock time since the budget was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn search_command(&self) -> SearchCommand {
        if let Some(flag) = self.stop_flag {
            if flag.load(Ordering::Relaxed) {
                return SearchCommand::Terminate("interrupt signal received".to_string());
            }
        }
        if let Some(max_nodes) = self.limits.max_nodes {
            if self.steps > max_nodes {
                return SearchCommand::Terminate("node limit reached".to_string());
            }
        }
        if let Some(time_limit) = self.limits.time_limit {
            if (self.steps & self.limits.clock_check_mask) == 0
                && self.start_time.elapsed() >= time_limit
            {
                return SearchCommand::Terminate("time limit reached".to_string());
            }
        }
        SearchCommand::Continue
    }
}
