//! Core puzzle model for the water sort puzzle.
//!
//! This module defines the game's fundamental components:
//! - `Color`: identifies the colour of one unit of liquid.
//! - `Tube`: a fixed-capacity stack of units with pour-legality and pour-execution primitives.
//! - `Move`: an immutable `(source, destination, amount)` record of one pour.
//! - `Configuration`: a full snapshot of every tube, with goal test and successor generation.
use crate::error::{Result, SolverError};
use std::collections::BTreeMap;
use std::fmt;

/// Identifies the colour of a single unit of liquid.
///
/// Colours are plain numeric ids. In raw puzzle rows the id `0` is reserved as
/// the "no unit here" sentinel, see `Color::from_raw`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(u16);

impl Color {
    pub const fn new(id: u16) -> Self {
        Color(id)
    }

    /// Converts a raw slot value into a colour, treating `0` as an empty slot.
    ///
    /// # Examples
    ///
    /// ```
    /// use water_sort_solver::engine::Color;
    /// assert_eq!(Color::from_raw(0), None);
    /// assert_eq!(Color::from_raw(7), Some(Color::new(7)));
    /// ```
    pub fn from_raw(raw: u16) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(Color(raw))
        }
    }

    pub fn id(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fixed-capacity stack of coloured units.
///
/// The last element of `contents` is the top of the tube, the only end that
/// can be poured from or onto. `contents.len() <= capacity` holds at all times.
///
/// Equality and hashing are structural: two tubes are equal iff they have the
/// same capacity and the same content sequence, bottom to top.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tube {
    capacity: usize,
    contents: Vec<Color>,
}

impl Tube {
    /// Creates an empty tube.
    ///
    /// # Errors
    /// Returns `SolverError::ZeroCapacity` if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_contents(capacity, Vec::new())
    }

    /// Creates a tube holding `contents`, listed bottom to top.
    ///
    /// # Errors
    /// * `SolverError::ZeroCapacity` if `capacity` is 0.
    /// * `SolverError::Overfilled` if `contents` holds more than `capacity` units.
    pub fn with_contents(capacity: usize, contents: Vec<Color>) -> Result<Self> {
        if capacity == 0 {
            return Err(SolverError::ZeroCapacity);
        }
        if contents.len() > capacity {
            return Err(SolverError::Overfilled {
                len: contents.len(),
                capacity,
            });
        }
        Ok(Tube { capacity, contents })
    }

    /// Builds a tube from a raw slot array in which `0` marks "no unit".
    ///
    /// Sentinel entries are stripped and the remaining ids are pushed bottom to
    /// top in array order, so `[3, 0, 5]` becomes the two-unit tube `3, 5`.
    ///
    /// # Examples
    ///
    /// ```
    /// use water_sort_solver::engine::{Color, Tube};
    /// let tube = Tube::from_raw(4, &[2, 2, 9, 0]).unwrap();
    /// assert_eq!(tube.len(), 3);
    /// assert_eq!(tube.top_color(), Some(Color::new(9)));
    /// ```
    pub fn from_raw(capacity: usize, raw: &[u16]) -> Result<Self> {
        let contents = raw.iter().copied().filter_map(Color::from_raw).collect();
        Self::with_contents(capacity, contents)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Units currently held, bottom to top.
    pub fn contents(&self) -> &[Color] {
        &self.contents
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn free_space(&self) -> usize {
        self.capacity - self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.contents.len() == self.capacity
    }

    /// True if the tube is empty or every unit has the same colour as the bottom one.
    pub fn is_uniform(&self) -> bool {
        match self.contents.first() {
            None => true,
            Some(&bottom) => self.contents.iter().all(|&c| c == bottom),
        }
    }

    /// True if the tube is empty, or full and uniform: the per-tube goal condition.
    pub fn is_solved(&self) -> bool {
        self.is_empty() || (self.is_full() && self.is_uniform())
    }

    /// Colour of the top unit, or `None` for an empty tube.
    pub fn top_color(&self) -> Option<Color> {
        self.contents.last().copied()
    }

    /// Number of consecutive units from the top that share the top colour.
    pub fn top_run_len(&self) -> usize {
        match self.top_color() {
            None => 0,
            Some(top) => self.contents.iter().rev().take_while(|&&c| c == top).count(),
        }
    }

    /// Number of adjacent colour changes scanning bottom to top.
    ///
    /// Only the heuristic uses this; pour legality does not depend on it.
    pub fn color_transition_count(&self) -> usize {
        self.contents.windows(2).filter(|w| w[0] != w[1]).count()
    }

    /// Checks whether a pour from this tube into `other` would move anything.
    ///
    /// A pour is legal when this tube is non-empty, `other` has free space, and
    /// `other` is either empty or topped with the same colour.
    pub fn can_pour_into(&self, other: &Tube) -> bool {
        let Some(top) = self.top_color() else {
            return false;
        };
        if other.is_full() {
            return false;
        }
        match other.top_color() {
            None => true,
            Some(other_top) => other_top == top,
        }
    }

    /// Pours the top run of this tube into `other`, mutating both in place.
    ///
    /// Moves `min(top_run_len, other.free_space())` units. An illegal pour is
    /// not an error: nothing changes and `0` is returned.
    ///
    /// # Returns
    /// The number of units moved.
    ///
    /// # Examples
    ///
    /// ```
    /// use water_sort_solver::engine::Tube;
    /// let mut from = Tube::from_raw(4, &[1, 2, 2, 2]).unwrap();
    /// let mut to = Tube::from_raw(4, &[3, 2, 0, 0]).unwrap();
    /// assert_eq!(from.pour_into(&mut to), 2);
    /// assert_eq!(from.len(), 2);
    /// assert!(to.is_full());
    /// ```
    pub fn pour_into(&mut self, other: &mut Tube) -> usize {
        if !self.can_pour_into(other) {
            return 0;
        }
        let amount = self.top_run_len().min(other.free_space());
        let start = self.contents.len() - amount;
        other.contents.extend(self.contents.drain(start..));
        amount
    }
}

impl fmt::Display for Tube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for slot in 0..self.capacity {
            if slot > 0 {
                write!(f, " ")?;
            }
            match self.contents.get(slot) {
                Some(color) => write!(f, "{:>2}", color.id())?,
                None => write!(f, " .")?,
            }
        }
        write!(f, "]")
    }
}

/// One pour: `amount` units from tube `source` onto tube `destination`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    source: usize,
    destination: usize,
    amount: usize,
}

impl Move {
    pub fn new(source: usize, destination: usize, amount: usize) -> Self {
        Move {
            source,
            destination,
            amount,
        }
    }

    pub fn source(&self) -> usize {
        self.source
    }

    pub fn destination(&self) -> usize {
        self.destination
    }

    pub fn amount(&self) -> usize {
        self.amount
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} -> {})", self.source, self.destination)
    }
}

/// Pours between two slots of the same tube slice.
fn pour_between(tubes: &mut [Tube], source: usize, destination: usize) -> usize {
    debug_assert_ne!(source, destination);
    if source < destination {
        let (left, right) = tubes.split_at_mut(destination);
        left[source].pour_into(&mut right[0])
    } else {
        let (left, right) = tubes.split_at_mut(source);
        right[0].pour_into(&mut left[destination])
    }
}

/// One complete snapshot of every tube in the puzzle.
///
/// The slot index of a tube is its identity and is what a `Move` addresses.
/// Configurations are values: every operation that changes contents returns
/// a new configuration and leaves `self` untouched. Equality and hashing are
/// structural over the full content of every tube, so configurations can key
/// the visited set of a search directly.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Configuration {
    tubes: Vec<Tube>,
}

impl Configuration {
    pub fn new(tubes: Vec<Tube>) -> Self {
        Configuration { tubes }
    }

    pub fn tubes(&self) -> &[Tube] {
        &self.tubes
    }

    pub fn tube(&self, index: usize) -> Option<&Tube> {
        self.tubes.get(index)
    }

    /// Number of tube slots.
    pub fn len(&self) -> usize {
        self.tubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tubes.is_empty()
    }

    /// True iff every tube is empty, or full and of a single colour.
    ///
    /// # Examples
    ///
    /// ```
    /// use water_sort_solver::engine::{Configuration, Tube};
    /// let solved = Configuration::new(vec![
    ///     Tube::from_raw(2, &[1, 1]).unwrap(),
    ///     Tube::from_raw(2, &[0, 0]).unwrap(),
    /// ]);
    /// assert!(solved.is_goal());
    /// ```
    pub fn is_goal(&self) -> bool {
        self.tubes.iter().all(Tube::is_solved)
    }

    /// Generates every configuration reachable by exactly one legal pour.
    ///
    /// Candidates are produced in lexicographic `(source, destination)` order.
    /// Each pour happens on a private copy of the tubes; `self` is never altered.
    pub fn successors(&self) -> Vec<Configuration> {
        let mut next_configurations = Vec::new();
        for source in 0..self.tubes.len() {
            for destination in 0..self.tubes.len() {
                if source == destination
                    || !self.tubes[source].can_pour_into(&self.tubes[destination])
                {
                    continue;
                }
                let mut tubes = self.tubes.clone();
                if pour_between(&mut tubes, source, destination) > 0 {
                    next_configurations.push(Configuration { tubes });
                }
            }
        }
        next_configurations
    }

    /// Applies `mv` to a copy of this configuration.
    ///
    /// # Errors
    /// * `SolverError::InvalidMove` if either index is out of range or they are equal.
    /// * `SolverError::InvariantViolation` if the pour moves a different number of
    ///   units than `mv.amount()`, meaning `mv` does not describe a single pour
    ///   from this configuration.
    pub fn apply_move(&self, mv: &Move) -> Result<Configuration> {
        let (source, destination) = (mv.source(), mv.destination());
        if source >= self.tubes.len() || destination >= self.tubes.len() || source == destination
        {
            return Err(SolverError::InvalidMove {
                from: source,
                to: destination,
                tube_count: self.tubes.len(),
            });
        }

        let mut tubes = self.tubes.clone();
        let poured = pour_between(&mut tubes, source, destination);
        if poured != mv.amount() {
            return Err(SolverError::InvariantViolation {
                from: source,
                to: destination,
                expected: mv.amount(),
                actual: poured,
            });
        }
        Ok(Configuration { tubes })
    }

    /// Applies `moves` in order, failing on the first move that does not fit.
    pub fn replay(&self, moves: &[Move]) -> Result<Configuration> {
        moves
            .iter()
            .try_fold(self.clone(), |configuration, mv| configuration.apply_move(mv))
    }

    /// Counts the units of each colour across all tubes.
    pub fn color_counts(&self) -> BTreeMap<Color, usize> {
        let mut counts = BTreeMap::new();
        for color in self.tubes.iter().flat_map(|t| t.contents().iter()) {
            *counts.entry(*color).or_insert(0) += 1;
        }
        counts
    }

    /// Checks the necessary condition for the goal to be reachable at all.
    ///
    /// When every tube shares one capacity, each colour must fill a whole
    /// number of tubes. With mixed capacities this returns `true`: the check
    /// cannot rule anything out cheaply.
    pub fn is_balanced(&self) -> bool {
        let Some(first) = self.tubes.first() else {
            return true;
        };
        let capacity = first.capacity();
        if self.tubes.iter().any(|t| t.capacity() != capacity) {
            return true;
        }
        self.color_counts().values().all(|&count| count % capacity == 0)
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, tube) in self.tubes.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{:>2}: {}", index, tube)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    const A: u16 = 1;
    const B: u16 = 2;

    fn tube(capacity: usize, raw: &[u16]) -> Tube {
        Tube::from_raw(capacity, raw).unwrap()
    }

    fn config(capacity: usize, rows: &[&[u16]]) -> Configuration {
        Configuration::new(rows.iter().map(|r| tube(capacity, r)).collect())
    }

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_tube_construction_rejects_bad_input() {
        assert_eq!(Tube::new(0), Err(SolverError::ZeroCapacity));
        assert_eq!(
            Tube::from_raw(2, &[A, B, A]),
            Err(SolverError::Overfilled { len: 3, capacity: 2 })
        );
        // Sentinels do not count against capacity.
        assert_eq!(Tube::from_raw(2, &[A, 0, 0, B]).unwrap().len(), 2);
    }

    #[test]
    fn test_tube_predicates() {
        let empty = Tube::new(3).unwrap();
        assert!(empty.is_empty());
        assert!(!empty.is_full());
        assert!(empty.is_uniform());
        assert_eq!(empty.top_color(), None);
        assert_eq!(empty.top_run_len(), 0);
        assert_eq!(empty.free_space(), 3);

        let full_mixed = tube(3, &[A, B, B]);
        assert!(full_mixed.is_full());
        assert!(!full_mixed.is_uniform());
        assert!(!full_mixed.is_solved());
        assert_eq!(full_mixed.top_color(), Some(Color::new(B)));
        assert_eq!(full_mixed.top_run_len(), 2);

        let partial_uniform = tube(3, &[A, A]);
        assert!(partial_uniform.is_uniform());
        assert!(!partial_uniform.is_solved());
        assert!(tube(3, &[A, A, A]).is_solved());
    }

    #[test]
    fn test_color_transition_count() {
        assert_eq!(Tube::new(4).unwrap().color_transition_count(), 0);
        assert_eq!(tube(4, &[A]).color_transition_count(), 0);
        assert_eq!(tube(4, &[A, A, B, B]).color_transition_count(), 1);
        assert_eq!(tube(4, &[A, B, A, B]).color_transition_count(), 3);
    }

    #[test]
    fn test_can_pour_into_rules() {
        let empty = Tube::new(2).unwrap();
        let a = tube(2, &[A]);
        let b = tube(2, &[B]);
        let full = tube(2, &[A, A]);

        assert!(!empty.can_pour_into(&a), "empty source never pours");
        assert!(!a.can_pour_into(&full), "full destination never accepts");
        assert!(a.can_pour_into(&empty), "non-empty into empty is always legal");
        assert!(!a.can_pour_into(&b), "top colours must match");
        assert!(a.can_pour_into(&a.clone()));
    }

    #[test]
    fn test_pour_moves_top_run_bounded_by_free_space() {
        let mut from = tube(4, &[B, A, A, A]);
        let mut to = tube(4, &[B, B, A]);
        assert_eq!(from.pour_into(&mut to), 1);
        assert_eq!(from.contents(), &[Color::new(B), Color::new(A), Color::new(A)]);
        assert_eq!(to.contents().len(), 4);

        let mut from = tube(4, &[B, A, A, A]);
        let mut to = Tube::new(4).unwrap();
        assert_eq!(from.pour_into(&mut to), 3);
        assert_eq!(from.contents(), &[Color::new(B)]);
        assert!(to.is_uniform());
    }

    #[test]
    fn test_illegal_pour_is_noop() {
        let mut from = tube(2, &[A]);
        let mut to = tube(2, &[B]);
        assert_eq!(from.pour_into(&mut to), 0);
        assert_eq!(from, tube(2, &[A]));
        assert_eq!(to, tube(2, &[B]));
    }

    #[test]
    fn test_pour_conserves_units_and_capacity() {
        let samples: [(&[u16], &[u16]); 5] = [
            (&[A, B, B], &[B]),
            (&[A, A, A], &[]),
            (&[B, A], &[A, A]),
            (&[A], &[B, B, B]),
            (&[B, B, B], &[B, B]),
        ];
        for (src, dst) in samples {
            let mut from = tube(3, src);
            let mut to = tube(3, dst);
            let before = from.len() + to.len();
            from.pour_into(&mut to);
            assert_eq!(from.len() + to.len(), before);
            assert!(from.len() <= from.capacity());
            assert!(to.len() <= to.capacity());
        }
    }

    #[test]
    fn test_copy_is_independent_of_original() {
        let original = tube(3, &[A, B]);
        let mut copy = original.clone();
        let mut sink = Tube::new(3).unwrap();
        copy.pour_into(&mut sink);
        assert_eq!(original, tube(3, &[A, B]));

        let configuration = config(2, &[&[A, B], &[B], &[]]);
        let snapshot = configuration.clone();
        let _ = configuration.successors();
        let _ = configuration.apply_move(&Move::new(0, 1, 1)).unwrap();
        assert_eq!(configuration, snapshot);
    }

    #[test]
    fn test_is_goal() {
        assert!(config(2, &[&[], &[]]).is_goal());
        assert!(config(2, &[&[A, A], &[B, B], &[]]).is_goal());
        assert!(!config(2, &[&[A, B], &[B, A], &[]]).is_goal());
        assert!(!config(2, &[&[A], &[A], &[]]).is_goal(), "partially filled uniform tubes are not solved");
    }

    #[test]
    fn test_successors_enumerates_single_pours() {
        let configuration = config(2, &[&[A, B], &[B], &[]]);
        let successors = configuration.successors();
        // 0->1 (B onto B), 0->2, 1->0 is blocked (full), 1->2; 2 is empty.
        assert_eq!(
            successors,
            vec![
                config(2, &[&[A], &[B, B], &[]]),
                config(2, &[&[A], &[B], &[B]]),
                config(2, &[&[A, B], &[], &[B]]),
            ]
        );
        assert!(config(2, &[&[A, B], &[B, A]]).successors().is_empty());
    }

    #[test]
    fn test_structural_equality_and_hash() {
        let first = config(4, &[&[A, B, A], &[B], &[]]);
        let second = Configuration::new(vec![
            Tube::with_contents(4, vec![Color::new(A), Color::new(B), Color::new(A)]).unwrap(),
            Tube::with_contents(4, vec![Color::new(B)]).unwrap(),
            Tube::new(4).unwrap(),
        ]);
        assert_eq!(first, second);
        assert_eq!(hash_of(&first), hash_of(&second));

        let reordered = config(4, &[&[B], &[A, B, A], &[]]);
        assert_ne!(first, reordered, "slot order is significant");
    }

    #[test]
    fn test_apply_move_checks_amount() {
        let configuration = config(3, &[&[A, B, B], &[]]);
        let next = configuration.apply_move(&Move::new(0, 1, 2)).unwrap();
        assert_eq!(next, config(3, &[&[A], &[B, B]]));

        assert_eq!(
            configuration.apply_move(&Move::new(0, 1, 1)),
            Err(SolverError::InvariantViolation {
                from: 0,
                to: 1,
                expected: 1,
                actual: 2,
            })
        );
        assert_eq!(
            configuration.apply_move(&Move::new(1, 0, 1)),
            Err(SolverError::InvariantViolation {
                from: 1,
                to: 0,
                expected: 1,
                actual: 0,
            })
        );
    }

    #[test]
    fn test_apply_move_rejects_bad_indices() {
        let configuration = config(2, &[&[A], &[]]);
        assert!(matches!(
            configuration.apply_move(&Move::new(0, 5, 1)),
            Err(SolverError::InvalidMove { tube_count: 2, .. })
        ));
        assert!(matches!(
            configuration.apply_move(&Move::new(1, 1, 1)),
            Err(SolverError::InvalidMove { .. })
        ));
    }

    #[test]
    fn test_replay() {
        let start = config(2, &[&[A, B], &[B], &[A]]);
        let end = start
            .replay(&[Move::new(0, 1, 1), Move::new(0, 2, 1)])
            .unwrap();
        assert!(end.is_goal());
        assert!(start.replay(&[Move::new(2, 0, 1)]).is_err());
        assert_eq!(start.replay(&[]).unwrap(), start);
    }

    #[test]
    fn test_color_counts_and_balance() {
        let balanced = config(2, &[&[A, B], &[B, A], &[]]);
        let counts = balanced.color_counts();
        assert_eq!(counts.get(&Color::new(A)), Some(&2));
        assert_eq!(counts.get(&Color::new(B)), Some(&2));
        assert!(balanced.is_balanced());

        assert!(!config(2, &[&[A, B], &[B], &[]]).is_balanced());
        assert!(Configuration::new(Vec::new()).is_balanced());
    }

    #[test]
    fn test_display() {
        assert_eq!(tube(4, &[4, 10]).to_string(), "[ 4 10  .  .]");
        assert_eq!(Move::new(3, 12, 2).to_string(), "(3 -> 12)");
        let configuration = config(2, &[&[A], &[]]);
        assert_eq!(configuration.to_string(), " 0: [ 1  .]\n 1: [ .  .]");
    }
}
