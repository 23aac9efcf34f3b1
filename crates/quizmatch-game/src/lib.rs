//! Match aggregation layer for quizmatch.
//!
//! A match is a [`GameState`]: the ordered cycles of
//! [`quizmatch_cycle::Cycle`] together with the packet, the roster, and the
//! game format. Everything that needs more than one cycle to answer lives
//! here and is derived by replaying the cycle list on demand.
//!
//! # Modules
//!
//! - [`state`] -- [`GameState`]: question indexing, roster replay, roster
//!   cascades, the pending-new-player record, and moderator actions.
//! - [`score`] -- Running score and the playable prefix of the match.
//! - [`protest`] -- Pricing unresolved protests and deciding whether they
//!   could change the outcome.
//! - [`tossup`] -- Buzzable word model and power/neg point schedule.
//! - [`config`] -- [`GameFormat`](quizmatch_types::GameFormat) loading from
//!   YAML.
//! - [`migrate`] -- Versioned upgrade of saved match documents.
//! - [`error`] -- [`GameError`].
//!
//! # Usage
//!
//! ```
//! use quizmatch_game::GameState;
//! use quizmatch_types::{GameFormat, Packet, Player, Tossup};
//!
//! let packet = Packet::new(
//!     vec![Tossup::new("first q", "first a"), Tossup::new("second q", "second a")],
//!     Vec::new(),
//! );
//! let alice = Player::new("Alice", "A", true);
//! let bob = Player::new("Bob", "B", true);
//! let mut game = GameState::new(packet, vec![alice.clone(), bob], GameFormat::acf());
//!
//! game.buzz_correct(0, alice, 1)?;
//! assert_eq!(game.final_score(), vec![10, 0]);
//! # Ok::<(), quizmatch_game::GameError>(())
//! ```

pub mod config;
pub mod error;
pub mod migrate;
pub mod protest;
pub mod score;
pub mod state;
pub mod tossup;

// Re-export primary types at crate root.
pub use config::{ConfigError, parse_game_format, validate_game_format};
pub use error::GameError;
pub use migrate::{CURRENT_VERSION, SavedGame, UpgradeError, load_game_json, upgrade_game_document};
pub use protest::{ProtestKind, ProtestSwing};
pub use state::GameState;
pub use tossup::{TossupWords, correct_buzz_points};
