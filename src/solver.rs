use crate::engine::{Configuration, Move, Tube};
use crate::heuristics::{self, HeuristicFn};
use crate::monitor::{SearchBudget, SearchCommand, SearchLimits};
use log::{debug, info, trace, warn};
use rustc_hash::FxHashSet;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// Counters collected over one `solve` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Search nodes entered, across all deepening iterations.
    pub nodes_expanded: u64,
    /// Number of deepening iterations started.
    pub iterations: u32,
    /// Every cost bound used, in order. Strictly increasing.
    pub thresholds: Vec<u32>,
    pub elapsed: Duration,
}

/// A move sequence that turns the initial configuration into a goal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    pub moves: Vec<Move>,
    pub stats: SearchStats,
}

/// Result of a search.
///
/// `NoSolution` is an ordinary outcome: the reachable space was exhausted
/// without meeting a goal. `Aborted` means the search budget ran out or the
/// stop flag was raised before either answer was known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Solved(Solution),
    NoSolution(SearchStats),
    Aborted { reason: String, stats: SearchStats },
}

impl SearchOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, SearchOutcome::Solved(_))
    }

    pub fn moves(&self) -> Option<&[Move]> {
        match self {
            SearchOutcome::Solved(solution) => Some(&solution.moves),
            _ => None,
        }
    }

    pub fn stats(&self) -> &SearchStats {
        match self {
            SearchOutcome::Solved(solution) => &solution.stats,
            SearchOutcome::NoSolution(stats) => stats,
            SearchOutcome::Aborted { stats, .. } => stats,
        }
    }
}

/// Result of one bounded depth-first probe.
enum Probe {
    Found,
    /// Smallest `f` seen beyond the current threshold.
    Exceeded(u32),
    /// Nothing beyond the threshold and no goal: the subtree is exhausted.
    DeadEnd,
    Aborted(String),
}

/// Iterative-deepening solver bounded on `f = g + h`.
///
/// Each iteration runs a depth-first search from the initial configuration
/// and prunes any node whose `f` exceeds the current threshold. If no goal is
/// found, the threshold becomes the smallest pruned `f` and the search
/// restarts. Cycles are avoided only along the active path.
///
/// The default heuristic is `heuristics::estimate`, which is not admissible,
/// so returned solutions are valid but not necessarily the shortest. Use
/// `heuristics::zero_heuristic` for shortest solutions at a higher cost.
///
/// # Examples
/// ```
/// use water_sort_solver::solver::IdaStarSolver;
/// use water_sort_solver::utils::configuration_from_rows;
///
/// let start = configuration_from_rows(2, &[[1u16, 2], [2, 0], [1, 0]]).unwrap();
/// let outcome = IdaStarSolver::new().solve(&start);
/// let moves = outcome.moves().unwrap();
/// assert!(start.replay(moves).unwrap().is_goal());
/// ```
#[derive(Clone)]
pub struct IdaStarSolver<'a> {
    heuristic: HeuristicFn,
    limits: SearchLimits,
    stop_flag: Option<&'a AtomicBool>,
}

impl Default for IdaStarSolver<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IdaStarSolver<'a> {
    pub fn new() -> Self {
        IdaStarSolver {
            heuristic: heuristics::estimate,
            limits: SearchLimits::default(),
            stop_flag: None,
        }
    }

    pub fn with_heuristic(mut self, heuristic: HeuristicFn) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The search stops with `SearchOutcome::Aborted` once `flag` is set.
    pub fn with_stop_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.stop_flag = Some(flag);
        self
    }

    /// Searches for a move sequence from `initial` to a goal configuration.
    ///
    /// All search state lives in this call, so a solver can be reused and
    /// several solves never interfere.
    pub fn solve(&self, initial: &Configuration) -> SearchOutcome {
        let budget = SearchBudget::new(self.limits.clone(), self.stop_flag);
        let mut stats = SearchStats::default();

        if !initial.is_balanced() {
            info!("colour counts do not fill whole tubes; no goal is reachable");
            stats.elapsed = budget.elapsed();
            return SearchOutcome::NoSolution(stats);
        }

        let mut context = SearchContext {
            heuristic: self.heuristic,
            threshold: (self.heuristic)(initial),
            path: Vec::new(),
            visited: FxHashSet::default(),
            budget,
            nodes_expanded: 0,
        };

        loop {
            stats.iterations += 1;
            stats.thresholds.push(context.threshold);
            debug!(
                "iteration {}: threshold {} ({} nodes so far)",
                stats.iterations, context.threshold, context.nodes_expanded
            );

            context.visited.clear();
            context.path.clear();
            let probe = context.search(initial, 0);

            stats.nodes_expanded = context.nodes_expanded;
            stats.elapsed = context.budget.elapsed();

            match probe {
                Probe::Found => {
                    info!(
                        "solved in {} move(s) after {} node(s)",
                        context.path.len(),
                        stats.nodes_expanded
                    );
                    return SearchOutcome::Solved(Solution {
                        moves: std::mem::take(&mut context.path),
                        stats,
                    });
                }
                Probe::DeadEnd => {
                    info!(
                        "search space exhausted after {} node(s); no solution",
                        stats.nodes_expanded
                    );
                    return SearchOutcome::NoSolution(stats);
                }
                Probe::Aborted(reason) => {
                    info!("search aborted: {}", reason);
                    return SearchOutcome::Aborted { reason, stats };
                }
                Probe::Exceeded(next_threshold) => {
                    debug_assert!(next_threshold > context.threshold);
                    trace!(
                        "raising threshold {} -> {}",
                        context.threshold,
                        next_threshold
                    );
                    context.threshold = next_threshold;
                }
            }
        }
    }
}

/// Mutable state threaded through one deepening iteration.
struct SearchContext<'a> {
    heuristic: HeuristicFn,
    threshold: u32,
    /// Moves from the root to the node being expanded.
    path: Vec<Move>,
    /// Configurations on the active path.
    visited: FxHashSet<Configuration>,
    budget: SearchBudget<'a>,
    nodes_expanded: u64,
}

impl SearchContext<'_> {
    fn search(&mut self, configuration: &Configuration, g: u32) -> Probe {
        self.budget.on_step();
        if let SearchCommand::Terminate(reason) = self.budget.search_command() {
            return Probe::Aborted(reason);
        }
        self.nodes_expanded += 1;

        let f = g + (self.heuristic)(configuration);
        if f > self.threshold {
            return Probe::Exceeded(f);
        }
        if configuration.is_goal() {
            return Probe::Found;
        }

        self.visited.insert(configuration.clone());
        let mut min_exceeded: Option<u32> = None;

        for next in configuration.successors() {
            if self.visited.contains(&next) {
                continue;
            }
            let Some(mv) = reconstruct_move(configuration, &next) else {
                warn!("could not reconstruct the pour to a successor; skipping it");
                continue;
            };

            self.path.push(mv);
            match self.search(&next, g + 1) {
                // The path is the answer; leave it in place.
                Probe::Found => return Probe::Found,
                Probe::Aborted(reason) => return Probe::Aborted(reason),
                Probe::Exceeded(bound) => {
                    min_exceeded = Some(min_exceeded.map_or(bound, |m| m.min(bound)));
                }
                Probe::DeadEnd => {}
            }
            self.path.pop();
        }

        self.visited.remove(configuration);
        match min_exceeded {
            Some(bound) => Probe::Exceeded(bound),
            None => Probe::DeadEnd,
        }
    }
}

/// Recovers the single pour that turns `from` into `to`.
///
/// Exactly two slots must differ. A direction is accepted when its source
/// strictly shrank and its destination strictly grew by the same amount.
/// Returns `None` when the two configurations are not one pour apart.
pub fn reconstruct_move(from: &Configuration, to: &Configuration) -> Option<Move> {
    if from.len() != to.len() {
        return None;
    }
    let changed: Vec<usize> = (0..from.len())
        .filter(|&i| from.tubes()[i] != to.tubes()[i])
        .collect();
    let &[i, j] = changed.as_slice() else {
        return None;
    };

    let (before, after) = (from.tubes(), to.tubes());
    poured_amount(&before[i], &after[i], &before[j], &after[j])
        .map(|amount| Move::new(i, j, amount))
        .or_else(|| {
            poured_amount(&before[j], &after[j], &before[i], &after[i])
                .map(|amount| Move::new(j, i, amount))
        })
}

fn poured_amount(
    source_before: &Tube,
    source_after: &Tube,
    destination_before: &Tube,
    destination_after: &Tube,
) -> Option<usize> {
    if source_before.len() <= source_after.len()
        || destination_before.len() >= destination_after.len()
    {
        return None;
    }
    let left = source_before.len() - source_after.len();
    let arrived = destination_after.len() - destination_before.len();
    (left == arrived).then_some(left)
}

/// Solves with the default heuristic and no limits.
///
/// Returns `None` when no goal is reachable.
pub fn solve_ida(initial: &Configuration) -> Option<Vec<Move>> {
    match IdaStarSolver::new().solve(initial) {
        SearchOutcome::Solved(solution) => Some(solution.moves),
        _ => None,
    }
}
