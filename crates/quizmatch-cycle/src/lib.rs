//! Per-question event log and invariant engine for quizmatch.
//!
//! A match is a sequence of cycles, one per tossup/bonus pairing. Each
//! [`Cycle`] owns the events recorded for its pairing and is the only place
//! those events are mutated. Every mutation is a single atomic transition
//! that leaves the cycle satisfying its invariants:
//!
//! 1. At most one correct buzz.
//! 2. Wrong buzzes are kept in ascending word-position order.
//! 3. No wrong buzz lies after the correct buzz.
//! 4. One wrong buzz per team.
//! 5. A bonus answer exists only alongside a correct buzz.
//! 6. At most one wrong buzz is a neg, and it is the earliest one.
//! 7. Thrown-out questions are keyed by packet index and may repeat.
//!
//! # Architecture
//!
//! - [`cycle`] -- The [`Cycle`] aggregate: mutations and read views.
//! - [`buzzes`] -- Buzz ordering and the neg/no-penalty rule.
//! - [`invariants`] -- [`validate`](invariants::validate), which reports the
//!   first violated invariant on data that did not come through the
//!   mutation API (for example, freshly loaded documents).
//!
//! A cycle never looks at its siblings. Questions spanning cycles (which
//! tossup is read, who is on the floor, the running score) belong to the
//! aggregation layer in `quizmatch-game`.
//!
//! # Usage
//!
//! ```
//! use quizmatch_cycle::Cycle;
//! use quizmatch_types::{BuzzMarker, GameFormat, Player};
//!
//! let format = GameFormat::acf();
//! let alice = Player::new("Alice", "Alpha", true);
//! let bob = Player::new("Bob", "Beta", true);
//!
//! let mut cycle = Cycle::new();
//! cycle.add_wrong_buzz(BuzzMarker::new(bob, 3, 0), 0, &format);
//! cycle.add_correct_buzz(BuzzMarker::new(alice, 8, 10), 0, &format, Some(0), Some(3));
//!
//! assert_eq!(cycle.wrong_buzzes()[0].marker.points, -5);
//! assert!(cycle.bonus_answer().is_some());
//! ```

pub mod buzzes;
pub mod cycle;
pub mod invariants;

// Re-export primary types at crate root.
pub use cycle::{Cycle, CycleChange};
pub use invariants::validate;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// An invariant violation found in a cycle's stored events.
///
/// The mutation API cannot produce these. They signal that data was built
/// or edited outside of it, which is a logic bug in the caller rather than
/// something a moderator can fix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CycleError {
    /// Wrong buzzes are not sorted by word position.
    #[error("wrong buzz at index {index} (position {position}) precedes an earlier-positioned buzz")]
    WrongBuzzesOutOfOrder {
        /// Index of the first out-of-order buzz.
        index: usize,
        /// Its word position.
        position: usize,
    },

    /// A wrong buzz lies after the correct buzz.
    #[error("wrong buzz at position {wrong_position} lies after the correct buzz at {correct_position}")]
    WrongBuzzAfterCorrect {
        /// Position of the offending wrong buzz.
        wrong_position: usize,
        /// Position of the correct buzz.
        correct_position: usize,
    },

    /// A team owns more than one buzz in the cycle.
    #[error("team {team_name} has more than one buzz in the cycle")]
    DuplicateTeamBuzz {
        /// The team with duplicate buzzes.
        team_name: String,
    },

    /// A wrong buzz other than the earliest carries points.
    #[error("wrong buzz at position {position} carries {points} points but is not the neg buzz")]
    MisplacedNeg {
        /// Position of the offending buzz.
        position: usize,
        /// Its stored points.
        points: i32,
    },

    /// A bonus answer exists without a correct buzz.
    #[error("bonus answer for bonus {bonus_index} has no correct buzz")]
    OrphanBonusAnswer {
        /// The bonus being answered.
        bonus_index: usize,
    },

    /// The bonus answer goes to a team other than the one that buzzed in.
    #[error("bonus answer goes to {receiving_team_name} but the correct buzz was by {buzzing_team_name}")]
    BonusTeamMismatch {
        /// Team recorded on the bonus answer.
        receiving_team_name: String,
        /// Team that owns the correct buzz.
        buzzing_team_name: String,
    },

    /// A bonus protest exists without a correct buzz.
    #[error("bonus protest on part {part_index} has no correct buzz")]
    OrphanBonusProtest {
        /// The protested part.
        part_index: usize,
    },
}
