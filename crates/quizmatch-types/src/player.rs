//! Roster entries.
//!
//! A [`Player`] is identified by the pair `(name, team_name)`. Two values
//! with the same name and team are the same player even when their
//! `is_starter` flags differ, so equality, hashing, and ordering all ignore
//! the flag.

use core::cmp::Ordering;
use core::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A player on a team's roster.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Display name, unique within a team.
    pub name: String,
    /// Name of the team the player belongs to.
    pub team_name: String,
    /// Whether the player is on the floor when the match begins.
    #[serde(default)]
    pub is_starter: bool,
}

impl Player {
    /// Create a new player.
    pub fn new(name: impl Into<String>, team_name: impl Into<String>, is_starter: bool) -> Self {
        Self {
            name: name.into(),
            team_name: team_name.into(),
            is_starter,
        }
    }

    /// Return whether this player belongs to the named team.
    pub fn is_on_team(&self, team_name: &str) -> bool {
        self.team_name == team_name
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.team_name == other.team_name
    }
}

impl Eq for Player {}

impl Hash for Player {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.team_name.hash(state);
        self.name.hash(state);
    }
}

impl PartialOrd for Player {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Player {
    fn cmp(&self, other: &Self) -> Ordering {
        self.team_name
            .cmp(&other.team_name)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl core::fmt::Display for Player {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({})", self.name, self.team_name)
    }
}
