//! # Vote Ledger
//!
//! Tri-state vote slot shared by posts and comments. A slot is either empty
//! or holds one direction; casting the held direction again retracts it,
//! casting the other direction flips it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// The direction of a single vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn opposite(self) -> Self {
        match self {
            VoteDirection::Up => VoteDirection::Down,
            VoteDirection::Down => VoteDirection::Up,
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteDirection::Up => f.write_str("up"),
            VoteDirection::Down => f.write_str("down"),
        }
    }
}

impl FromStr for VoteDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(VoteDirection::Up),
            "down" => Ok(VoteDirection::Down),
            other => Err(AppError::ValidationError(format!(
                "unknown vote direction '{other}'"
            ))),
        }
    }
}

/// Counters plus the acting voter's current choice for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteTally {
    pub upvotes: u32,
    pub downvotes: u32,
    pub choice: Option<VoteDirection>,
}

impl VoteTally {
    /// Builds a tally, rejecting a choice whose counter is zero.
    pub fn new(upvotes: u32, downvotes: u32, choice: Option<VoteDirection>) -> Result<Self> {
        let tally = Self {
            upvotes,
            downvotes,
            choice,
        };
        tally.check()?;
        Ok(tally)
    }

    /// Net score; may be negative.
    pub fn score(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }

    /// An active choice must be backed by at least one vote in its counter.
    pub fn check(&self) -> Result<()> {
        match self.choice {
            Some(dir) if self.count(dir) == 0 => Err(AppError::InvariantViolation(format!(
                "vote choice '{dir}' with an empty {dir} counter"
            ))),
            _ => Ok(()),
        }
    }

    pub fn count(&self, dir: VoteDirection) -> u32 {
        match dir {
            VoteDirection::Up => self.upvotes,
            VoteDirection::Down => self.downvotes,
        }
    }

    fn count_mut(&mut self, dir: VoteDirection) -> &mut u32 {
        match dir {
            VoteDirection::Up => &mut self.upvotes,
            VoteDirection::Down => &mut self.downvotes,
        }
    }

    /// Applies one vote request and returns the resulting tally.
    ///
    /// # Panics
    /// If a held choice is retracted from a zero counter, or a counter
    /// would pass `u32::MAX`. `VoteTally::new` and this method together
    /// never produce the first state.
    pub fn apply(mut self, requested: VoteDirection) -> Self {
        if self.choice == Some(requested) {
            self.decrement(requested);
            self.choice = None;
        } else {
            self.increment(requested);
            if self.choice == Some(requested.opposite()) {
                self.decrement(requested.opposite());
            }
            self.choice = Some(requested);
        }
        self
    }

    fn increment(&mut self, dir: VoteDirection) {
        let counter = self.count_mut(dir);
        match counter.checked_add(1) {
            Some(n) => *counter = n,
            None => panic!("invariant violation: {dir} counter overflow"),
        }
    }

    fn decrement(&mut self, dir: VoteDirection) {
        let counter = self.count_mut(dir);
        match counter.checked_sub(1) {
            Some(n) => *counter = n,
            None => panic!("invariant violation: retracting a {dir} vote from a zero counter"),
        }
    }
}

/// Free-function form of [`VoteTally::apply`].
pub fn apply_vote(tally: VoteTally, requested: VoteDirection) -> VoteTally {
    tally.apply(requested)
}

/// Anything carrying a vote slot. Posts and comments share one transition.
pub trait Votable {
    fn tally(&self) -> VoteTally;
    fn set_tally(&mut self, tally: VoteTally);

    fn score(&self) -> i64 {
        self.tally().score()
    }

    fn cast_vote(&mut self, requested: VoteDirection) -> VoteTally {
        let next = self.tally().apply(requested);
        self.set_tally(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use super::VoteDirection::{Down, Up};

    fn tally(up: u32, down: u32, choice: Option<VoteDirection>) -> VoteTally {
        VoteTally::new(up, down, choice).unwrap()
    }

    #[test]
    fn test_upvote_round_trip() {
        let start = tally(10, 2, None);
        let voted = start.apply(Up);
        assert_eq!(voted, tally(11, 2, Some(Up)));
        assert_eq!(voted.apply(Up), start);
    }

    #[test]
    fn test_flip_up_to_down() {
        let flipped = tally(11, 2, Some(Up)).apply(Down);
        assert_eq!(flipped, tally(10, 3, Some(Down)));
        assert_eq!(flipped.score(), 7);
    }

    #[test]
    fn test_all_down_transitions() {
        assert_eq!(tally(0, 0, None).apply(Down), tally(0, 1, Some(Down)));
        assert_eq!(tally(0, 1, Some(Down)).apply(Down), tally(0, 0, None));
        assert_eq!(tally(1, 0, Some(Up)).apply(Down), tally(0, 1, Some(Down)));
    }

    #[test]
    fn test_new_rejects_unbacked_choice() {
        let err = VoteTally::new(0, 4, Some(Up)).unwrap_err();
        assert!(matches!(err, AppError::InvariantViolation(_)));
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!(" UP ".parse::<VoteDirection>().unwrap(), Up);
        assert_eq!("down".parse::<VoteDirection>().unwrap(), Down);
        assert!("sideways".parse::<VoteDirection>().is_err());
    }

    #[test]
    #[should_panic(expected = "invariant violation")]
    fn test_retract_from_zero_counter_panics() {
        let broken = VoteTally {
            upvotes: 0,
            downvotes: 0,
            choice: Some(Up),
        };
        broken.apply(Up);
    }

    #[test]
    fn test_round_trip_just_below_max() {
        let start = tally(u32::MAX - 1, 0, None);
        assert_eq!(start.apply(Up), tally(u32::MAX, 0, Some(Up)));
        assert_eq!(start.apply(Up).apply(Up), start);
    }

    #[test]
    #[should_panic(expected = "counter overflow")]
    fn test_increment_past_max_panics() {
        tally(u32::MAX, 3, None).apply(Up);
    }

    fn direction() -> impl Strategy<Value = VoteDirection> {
        prop_oneof![Just(Up), Just(Down)]
    }

    fn valid_tally() -> impl Strategy<Value = VoteTally> {
        (1u32..10_000, 1u32..10_000, prop_oneof![Just(None), Just(Some(Up)), Just(Some(Down))])
            .prop_map(|(up, down, choice)| tally(up, down, choice))
    }

    proptest! {
        #[test]
        fn same_direction_twice_restores_counters(start in valid_tally(), dir in direction()) {
            let twice = start.apply(dir).apply(dir);
            prop_assert_eq!(twice.count(dir), start.count(dir));
            match start.choice {
                // flipping away from the opposite vote retracts it for good
                Some(held) if held == dir.opposite() => {
                    prop_assert_eq!(twice.count(held), start.count(held) - 1);
                    prop_assert_eq!(twice.choice, None);
                }
                Some(held) => {
                    prop_assert_eq!(twice.count(held), start.count(held));
                    prop_assert_eq!(twice.choice, Some(dir));
                }
                None => {
                    prop_assert_eq!(twice.count(dir.opposite()), start.count(dir.opposite()));
                    prop_assert_eq!(twice.choice, None);
                }
            }
        }

        #[test]
        fn sequences_keep_tally_consistent(
            start in valid_tally(),
            dirs in proptest::collection::vec(direction(), 0..64),
        ) {
            let mut current = start;
            for dir in dirs {
                current = current.apply(dir);
                prop_assert!(current.check().is_ok());
                prop_assert_eq!(
                    current.score(),
                    i64::from(current.upvotes) - i64::from(current.downvotes)
                );
            }
        }
    }
}
