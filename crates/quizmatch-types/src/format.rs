//! Match rules consumed by cycles and the aggregation layer.
//!
//! A [`GameFormat`] is plain configuration. Every field has a default so a
//! partial document (YAML or JSON) fills in from [`GameFormat::acf`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Points for a correct buzz that is not in power.
pub const BASE_TOSSUP_POINTS: i32 = 10;

/// Points per bonus part when the packet does not list values.
pub const DEFAULT_BONUS_PART_VALUE: i32 = 10;

/// Marker text conventionally used to end the power region of a tossup.
pub const DEFAULT_POWER_MARKER: &str = "(*)";

/// A power marker and the points for buzzing correctly before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PowerMarker {
    /// Marker text as it appears in the question.
    pub marker: String,
    /// Points for a correct buzz before the marker.
    pub points: i32,
}

/// Scoring and pacing rules for a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export, export_to = "bindings/")]
pub struct GameFormat {
    /// Human-readable format name.
    pub display_name: String,
    /// Whether the other team may answer bonus parts the receiving team
    /// missed.
    pub bonuses_bounce_back: bool,
    /// Number of tossups in overtime before the game can end again.
    pub minimum_overtime_question_count: usize,
    /// Penalty for an early wrong buzz. Zero or negative.
    pub neg_value: i32,
    /// Whether bonuses are played in overtime.
    pub overtime_includes_bonuses: bool,
    /// Whether bonus `i` always goes with tossup `i`.
    pub pair_tossups_bonuses: bool,
    /// Power markers, highest value first.
    pub powers: Vec<PowerMarker>,
    /// Opening and closing markers of pronunciation guides, whose words are
    /// not buzzable.
    pub pronunciation_guide_markers: Option<(String, String)>,
    /// Number of tossups in regulation.
    pub regulation_tossup_count: usize,
}

impl GameFormat {
    /// ACF rules: negs, no powers, unpaired bonuses, no bounce-backs.
    pub fn acf() -> Self {
        Self {
            display_name: "ACF".to_owned(),
            bonuses_bounce_back: false,
            minimum_overtime_question_count: 1,
            neg_value: -5,
            overtime_includes_bonuses: false,
            pair_tossups_bonuses: false,
            powers: Vec::new(),
            pronunciation_guide_markers: Some(("(\"".to_owned(), "\")".to_owned())),
            regulation_tossup_count: 20,
        }
    }

    /// PACE NSC rules: 20-point powers, no negs, paired bonuses.
    pub fn pace() -> Self {
        Self {
            display_name: "PACE NSC".to_owned(),
            neg_value: 0,
            pair_tossups_bonuses: true,
            powers: vec![PowerMarker {
                marker: DEFAULT_POWER_MARKER.to_owned(),
                points: 20,
            }],
            ..Self::acf()
        }
    }

    /// Common tournament rules: 15-point powers and negs.
    pub fn standard_powers() -> Self {
        Self {
            display_name: "Standard with powers".to_owned(),
            powers: vec![PowerMarker {
                marker: DEFAULT_POWER_MARKER.to_owned(),
                points: 15,
            }],
            ..Self::acf()
        }
    }

    /// Return whether the zero-based cycle index falls after regulation.
    pub const fn is_overtime(&self, cycle_index: usize) -> bool {
        cycle_index >= self.regulation_tossup_count
    }

    /// Return whether a bonus is played in the given cycle.
    pub const fn bonus_played_in(&self, cycle_index: usize) -> bool {
        self.overtime_includes_bonuses || !self.is_overtime(cycle_index)
    }
}

impl Default for GameFormat {
    fn default() -> Self {
        Self::acf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_acf() {
        let format = GameFormat::default();
        assert_eq!(format.neg_value, -5);
        assert!(format.powers.is_empty());
        assert_eq!(format.regulation_tossup_count, 20);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let parsed: Result<GameFormat, _> = serde_json::from_str(r#"{"negValue":0}"#);
        assert!(matches!(parsed, Ok(ref f) if f.neg_value == 0 && f.regulation_tossup_count == 20));
    }

    #[test]
    fn overtime_bonus_rules() {
        let format = GameFormat::acf();
        assert!(format.bonus_played_in(19));
        assert!(!format.bonus_played_in(20));

        let with_bonuses = GameFormat {
            overtime_includes_bonuses: true,
            ..GameFormat::acf()
        };
        assert!(with_bonuses.bonus_played_in(25));
    }

    #[test]
    fn pace_has_power_and_no_negs() {
        let format = GameFormat::pace();
        assert_eq!(format.neg_value, 0);
        assert_eq!(format.powers.first().map(|p| p.points), Some(20));
        assert!(format.pair_tossups_bonuses);
    }
}
