//! # Water Sort Solver Library
//!
//! This library models the "sort coloured liquid into uniform tubes" puzzle
//! and provides an iterative-deepening solver that finds a sequence of pours
//! bringing every non-empty tube to a single colour filling it completely,
//! or reports that no such sequence exists.
//!
//! It is used by the `ida_solver` binary, which reads a puzzle file (or
//! falls back to a built-in sample), runs the solver and prints the moves.
//!
//! ## Modules
//! - `engine`: the puzzle model: `Color`, `Tube`, `Move` and `Configuration`,
//!   with pour legality, pour execution, goal test and successor generation.
//! - `heuristics`: cost estimators that drive the deepening bound.
//! - `solver`: `IdaStarSolver`, its outcomes and statistics, and move reconstruction.
//! - `monitor`: node, time and cancellation limits for a search.
//! - `utils`: building configurations from raw rows or text, and formatting solutions.
//! - `error`: the crate's error type.
//!
//! ## Example
//! ```
//! use water_sort_solver::{solve_ida, utils::parse_puzzle};
//!
//! let start = parse_puzzle("1 2\n2 .\n1 .", None).unwrap();
//! let moves = solve_ida(&start).expect("puzzle is solvable");
//! assert_eq!(moves.len(), 2);
//! assert!(start.replay(&moves).unwrap().is_goal());
//! ```

pub mod engine;
pub mod error;
pub mod heuristics;
pub mod monitor;
pub mod solver;
pub mod utils;

pub use error::{Result, SolverError};
pub use solver::{solve_ida, IdaStarSolver, SearchOutcome};
