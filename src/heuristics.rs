use crate::engine::{Configuration, Tube};

/// Signature of a cost estimator the solver can be driven by.
pub type HeuristicFn = fn(&Configuration) -> u32;

/// Cost contributed by a single tube.
///
/// An empty or uniform tube is already solved or trivially solvable and costs
/// nothing. Any other tube costs the sum of:
/// - its occupied slots,
/// - its colour segments (`color_transition_count + 1`),
/// - its free slots.
///
/// Occupied plus free is always the capacity, so a mixed tube costs
/// `capacity + transitions + 1`. The terms are kept separate on purpose: the
/// size of this value drives how fast the deepening bound grows.
///
/// # Examples
/// ```
/// use water_sort_solver::engine::Tube;
/// use water_sort_solver::heuristics::tube_cost;
///
/// assert_eq!(tube_cost(&Tube::from_raw(4, &[1, 1, 0, 0]).unwrap()), 0);
/// // 3 occupied + (1 transition + 1) + 1 free
/// assert_eq!(tube_cost(&Tube::from_raw(4, &[1, 2, 2, 0]).unwrap()), 6);
/// ```
pub fn tube_cost(tube: &Tube) -> u32 {
    if tube.is_empty() || tube.is_uniform() {
        return 0;
    }
    let occupied = tube.len() as u32;
    let segments = tube.color_transition_count() as u32 + 1;
    let free = tube.free_space() as u32;
    occupied + segments + free
}

/// Scores how far `configuration` is from the goal: the sum of `tube_cost`
/// over all tubes.
///
/// This value bounds the iterative-deepening search. It is NOT admissible: it
/// can exceed the true number of remaining pours (a single pour can fix a
/// tube that costs `capacity + 2`). Solutions found under it are complete but
/// not guaranteed to be move-count optimal.
pub fn estimate(configuration: &Configuration) -> u32 {
    configuration.tubes().iter().map(tube_cost).sum()
}

/// A heuristic that knows nothing. Driving the solver with it turns the
/// search into plain iterative deepening on move count, which does return
/// shortest solutions.
pub fn zero_heuristic(_configuration: &Configuration) -> u32 {
    0
}
