//! Shared record types for the quizmatch scoring engine.
//!
//! This crate holds the plain data that flows between the cycle event log,
//! the game aggregation layer, the UI, and the persistence layer. Types are
//! serialized with camelCase field names (the persisted shape) and exported
//! to `TypeScript` via `ts-rs` for the moderator UI.
//!
//! # Modules
//!
//! - [`player`] -- Roster entries compared by `(name, team)`
//! - [`events`] -- Buzz, bonus, protest, roster, and throw-out records
//! - [`format`] -- [`GameFormat`] rules and presets
//! - [`packet`] -- Question content and raw-packet validation

pub mod events;
pub mod format;
pub mod packet;
pub mod player;

// Re-export all public types at crate root for convenience.
pub use events::{
    BonusAnswerEvent, BonusAnswerPart, BonusProtestEvent, BuzzMarker, CorrectBuzzEvent,
    DEFAULT_BONUS_PARTS_COUNT, PlayerJoinsEvent, PlayerLeavesEvent, SubstitutionEvent,
    ThrownOutQuestionEvent, TossupProtestEvent, WrongBuzzEvent,
};
pub use format::{
    BASE_TOSSUP_POINTS, DEFAULT_BONUS_PART_VALUE, DEFAULT_POWER_MARKER, GameFormat, PowerMarker,
};
pub use packet::{
    Bonus, BonusPart, Packet, PacketLoadResult, PacketLoadStatus, RawBonus, RawPacket, Tossup,
};
pub use player::Player;
