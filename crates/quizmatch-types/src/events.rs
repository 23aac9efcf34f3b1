//! Event records stored in a cycle's log.
//!
//! Each record describes one fact about a single question pairing: a buzz,
//! a bonus answer, a protest, a roster change, or a thrown-out question.
//! Records are plain values; the rules tying them together live in the
//! `quizmatch-cycle` crate.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::player::Player;

/// Number of bonus parts assumed when the packet does not say otherwise.
pub const DEFAULT_BONUS_PARTS_COUNT: usize = 3;

// ---------------------------------------------------------------------------
// Buzzes
// ---------------------------------------------------------------------------

/// Where and by whom a tossup was buzzed, and what the buzz was worth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct BuzzMarker {
    /// The buzzing player.
    pub player: Player,
    /// Zero-based index of the word the buzz landed on.
    pub position: usize,
    /// Points recorded for the buzz when it was made.
    ///
    /// For correct buzzes this value may be stale after a format change;
    /// scoring recomputes it from the format and position.
    pub points: i32,
    /// Whether the buzz landed on the final word of the question.
    #[serde(default)]
    pub is_last_word: bool,
}

impl BuzzMarker {
    /// Create a marker that is not on the last word.
    pub const fn new(player: Player, position: usize, points: i32) -> Self {
        Self {
            player,
            position,
            points,
            is_last_word: false,
        }
    }

    /// Mark the buzz as landing on the question's final word.
    #[must_use]
    pub const fn on_last_word(mut self) -> Self {
        self.is_last_word = true;
        self
    }

    /// Name of the buzzing player's team.
    pub fn team_name(&self) -> &str {
        &self.player.team_name
    }
}

/// The one correct buzz a cycle may hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CorrectBuzzEvent {
    /// Packet index of the tossup that was answered.
    pub tossup_index: usize,
    /// The buzz itself.
    pub marker: BuzzMarker,
}

/// An incorrect buzz. A cycle holds at most one per team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct WrongBuzzEvent {
    /// Packet index of the tossup that was missed.
    pub tossup_index: usize,
    /// The buzz itself. `points` is the neg value or 0.
    pub marker: BuzzMarker,
}

// ---------------------------------------------------------------------------
// Bonus answers
// ---------------------------------------------------------------------------

/// The result of one bonus part.
///
/// An empty `team_name` means nobody has been credited with the part yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct BonusAnswerPart {
    /// Team credited with the part, or empty.
    pub team_name: String,
    /// Points credited to that team.
    pub points: i32,
}

impl BonusAnswerPart {
    /// Return whether the part has been credited to some team.
    pub fn is_assigned(&self) -> bool {
        !self.team_name.is_empty()
    }
}

/// The answers given on the bonus earned by a correct buzz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct BonusAnswerEvent {
    /// Packet index of the bonus being played.
    pub bonus_index: usize,
    /// Team that earned the bonus with its correct buzz.
    pub receiving_team_name: String,
    /// One entry per bonus part.
    pub parts: Vec<BonusAnswerPart>,
}

impl BonusAnswerEvent {
    /// Create an unanswered bonus with `parts_count` blank parts.
    pub fn new(bonus_index: usize, receiving_team_name: String, parts_count: usize) -> Self {
        Self {
            bonus_index,
            receiving_team_name,
            parts: vec![BonusAnswerPart::default(); parts_count],
        }
    }

    /// Indexes of parts the receiving team answered for points.
    pub fn correct_parts(&self) -> Vec<usize> {
        self.parts
            .iter()
            .enumerate()
            .filter(|(_, part)| part.team_name == self.receiving_team_name && part.points > 0)
            .map(|(index, _)| index)
            .collect()
    }

    /// Total points this bonus credits to `team_name`.
    pub fn points_for_team(&self, team_name: &str) -> i32 {
        self.parts
            .iter()
            .filter(|part| part.team_name == team_name)
            .fold(0_i32, |total, part| total.saturating_add(part.points))
    }
}

// ---------------------------------------------------------------------------
// Protests
// ---------------------------------------------------------------------------

/// A team's challenge to a tossup ruling. Keyed by team within a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TossupProtestEvent {
    /// Packet index of the protested tossup.
    pub question_index: usize,
    /// Word position of the protested buzz.
    pub position: usize,
    /// The answer the team gave.
    pub given_answer: String,
    /// Why the team believes the ruling was wrong.
    pub reason: String,
    /// The protesting team.
    pub team_name: String,
}

/// A team's challenge to one bonus part ruling. Keyed by part within a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct BonusProtestEvent {
    /// Packet index of the protested bonus.
    pub question_index: usize,
    /// Zero-based index of the protested part.
    pub part_index: usize,
    /// The answer the team gave.
    pub given_answer: String,
    /// Why the team believes the ruling was wrong.
    pub reason: String,
    /// The protesting team.
    pub team_name: String,
}

// ---------------------------------------------------------------------------
// Roster changes
// ---------------------------------------------------------------------------

/// A player entering the game before this cycle's tossup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlayerJoinsEvent {
    /// The entering player.
    pub in_player: Player,
}

/// A player leaving the game before this cycle's tossup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlayerLeavesEvent {
    /// The departing player.
    pub out_player: Player,
}

/// One player replacing a teammate before this cycle's tossup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SubstitutionEvent {
    /// The entering player.
    pub in_player: Player,
    /// The departing player.
    pub out_player: Player,
}

// ---------------------------------------------------------------------------
// Thrown-out questions
// ---------------------------------------------------------------------------

/// A tossup or bonus excluded from play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ThrownOutQuestionEvent {
    /// Packet index of the voided question.
    pub question_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_bonus_answer_has_blank_parts() {
        let answer = BonusAnswerEvent::new(4, "Alpha".to_owned(), DEFAULT_BONUS_PARTS_COUNT);
        assert_eq!(answer.parts.len(), 3);
        assert!(answer.parts.iter().all(|part| !part.is_assigned() && part.points == 0));
    }

    #[test]
    fn correct_parts_only_counts_receiving_team() {
        let mut answer = BonusAnswerEvent::new(0, "Alpha".to_owned(), 3);
        answer.parts = vec![
            BonusAnswerPart { team_name: "Alpha".to_owned(), points: 10 },
            BonusAnswerPart { team_name: "Beta".to_owned(), points: 10 },
            BonusAnswerPart { team_name: "Alpha".to_owned(), points: 10 },
        ];
        assert_eq!(answer.correct_parts(), vec![0, 2]);
        assert_eq!(answer.points_for_team("Alpha"), 20);
        assert_eq!(answer.points_for_team("Beta"), 10);
    }

    #[test]
    fn marker_defaults_to_not_last_word() {
        let parsed: Result<BuzzMarker, _> = serde_json::from_str(
            r#"{"player":{"name":"A","teamName":"T","isStarter":true},"position":3,"points":-5}"#,
        );
        assert!(matches!(parsed, Ok(ref marker) if !marker.is_last_word && marker.points == -5));
    }
}
