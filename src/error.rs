//! Error types shared by the engine, the solver and the puzzle parser.
//!
//! Illegal pours are not errors: they are ordinary query results and report
//! `0` units moved. Likewise "no solution" is a `SearchOutcome`, not an error.
//! What ends up here is either a broken contract (a `Move` that does not
//! describe a real single pour) or input that cannot form a puzzle at all.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SolverError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// `apply_move` poured a different amount than the move records.
    #[error("invariant violated: move ({from} -> {to}) expected to pour {expected} unit(s), poured {actual}")]
    InvariantViolation {
        from: usize,
        to: usize,
        expected: usize,
        actual: usize,
    },

    /// The move addresses a slot that does not exist, or the same slot twice.
    #[error("invalid move ({from} -> {to}) for a configuration of {tube_count} tube(s)")]
    InvalidMove {
        from: usize,
        to: usize,
        tube_count: usize,
    },

    #[error("tube capacity must be at least 1")]
    ZeroCapacity,

    #[error("{len} unit(s) do not fit in a tube of capacity {capacity}")]
    Overfilled { len: usize, capacity: usize },

    #[error("puzzle contains no tubes")]
    EmptyPuzzle,

    #[error("rows have different widths ({first} vs {other} on line {line}); pass an explicit capacity")]
    RaggedRows {
        first: usize,
        other: usize,
        line: usize,
    },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}
