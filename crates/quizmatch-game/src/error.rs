//! Error types for the `quizmatch-game` crate.
//!
//! These cover programmer errors: addressing a cycle that does not exist,
//! committing a player record that was never started, or naming a player
//! who is not on the roster. Moderator mistakes never surface here; the
//! cycle API turns them into no-ops.

use quizmatch_cycle::CycleError;

/// Errors returned by [`GameState`](crate::GameState) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The cycle index is past the end of the match.
    #[error("cycle {index} is out of range (match has {len} cycles)")]
    CycleOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of cycles in the match.
        len: usize,
    },

    /// A pending new player was committed without being started.
    #[error("no pending new player to commit")]
    NoPendingPlayer,

    /// The player is not on the roster.
    #[error("player {name} ({team_name}) is not on the roster")]
    PlayerNotFound {
        /// Player name.
        name: String,
        /// Player team.
        team_name: String,
    },

    /// A teammate already uses the name.
    #[error("team {team_name} already has a player named {name}")]
    DuplicatePlayer {
        /// The clashing name.
        name: String,
        /// The team.
        team_name: String,
    },

    /// A cycle's stored events break an invariant.
    #[error("cycle {index} is inconsistent: {source}")]
    InvalidCycle {
        /// Index of the offending cycle.
        index: usize,
        /// The violated invariant.
        source: CycleError,
    },
}
