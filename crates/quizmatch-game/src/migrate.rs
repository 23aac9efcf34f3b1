//! Versioned upgrade of saved match documents.
//!
//! Saved matches are JSON documents carrying a `version` number. Documents
//! without one are version 1, written before buzz markers carried points
//! and before wrong buzzes shared a single list. [`upgrade_game_document`]
//! rewrites an older document into the current shape once, at load time,
//! before any cycle or game state method sees it.
//!
//! # Version 1 to 2
//!
//! - A marker's boolean `correct` becomes `points` (10 when correct, 0
//!   otherwise) if the marker has no points yet.
//! - `negBuzz` and `noPenaltyBuzzes` merge into `wrongBuzzes`, ordered by
//!   position. Buzzes tied on position keep their stored order.
//! - A bonus answer with only `correctParts` gets a `parts` list crediting
//!   the receiving team.
//!
//! Afterwards every cycle re-runs the neg rule under the saved format and
//! is checked against the cycle invariants.

use quizmatch_cycle::{Cycle, CycleError};
use quizmatch_types::{
    BASE_TOSSUP_POINTS, DEFAULT_BONUS_PART_VALUE, DEFAULT_BONUS_PARTS_COUNT, GameFormat, Packet,
    Player,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::state::GameState;

/// Version written by this crate.
pub const CURRENT_VERSION: u64 = 2;

/// A match in its persisted shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    /// Document version.
    pub version: u64,
    /// Cycles in reading order.
    #[serde(default)]
    pub cycles: Vec<Cycle>,
    /// The question packet.
    #[serde(default)]
    pub packet: Packet,
    /// The roster.
    #[serde(default)]
    pub players: Vec<Player>,
    /// The scoring rules. Older documents without one use ACF rules.
    #[serde(default)]
    pub game_format: GameFormat,
}

/// Errors that can occur while upgrading a saved match.
#[derive(Debug, thiserror::Error)]
pub enum UpgradeError {
    /// The document root is not a JSON object.
    #[error("saved game is not a JSON object")]
    NotAnObject,

    /// The `version` field is not a whole number.
    #[error("saved game version is not a whole number")]
    InvalidVersion,

    /// The document was written by a newer release.
    #[error("saved game version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the document.
        found: u64,
        /// Newest version this crate reads.
        supported: u64,
    },

    /// A document-level field has the wrong JSON type.
    #[error("field {field} has the wrong shape")]
    InvalidField {
        /// The offending field.
        field: &'static str,
    },

    /// A legacy field inside one cycle has the wrong JSON type.
    #[error("cycle {cycle_index}: field {field} has the wrong shape")]
    InvalidCycleField {
        /// The offending field.
        field: &'static str,
        /// Index of the cycle holding it.
        cycle_index: usize,
    },

    /// The upgraded document does not match the current shape.
    #[error("failed to decode saved game: {0}")]
    Json(#[from] serde_json::Error),

    /// An upgraded cycle breaks a cycle invariant.
    #[error("cycle {index} is inconsistent after upgrade: {source}")]
    InvalidCycle {
        /// Index of the offending cycle.
        index: usize,
        /// The violated invariant.
        source: CycleError,
    },
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Parse a saved match from JSON text and upgrade it.
pub fn load_game_json(text: &str) -> Result<SavedGame, UpgradeError> {
    let document: Value = serde_json::from_str(text)?;
    upgrade_game_document(document)
}

/// Upgrade a saved match document to [`CURRENT_VERSION`] and decode it.
///
/// # Errors
///
/// Returns an [`UpgradeError`] when the document is not an object, comes
/// from a newer release, has legacy fields of the wrong type, does not
/// decode, or yields a cycle that breaks an invariant.
pub fn upgrade_game_document(mut document: Value) -> Result<SavedGame, UpgradeError> {
    let root = document.as_object_mut().ok_or(UpgradeError::NotAnObject)?;

    let version = match root.get("version") {
        None | Some(Value::Null) => 1,
        Some(value) => value.as_u64().ok_or(UpgradeError::InvalidVersion)?,
    };
    if version > CURRENT_VERSION {
        return Err(UpgradeError::UnsupportedVersion {
            found: version,
            supported: CURRENT_VERSION,
        });
    }
    if version < 2 {
        upgrade_v1(root)?;
    }
    root.insert("version".to_owned(), json!(CURRENT_VERSION));

    let mut saved: SavedGame = serde_json::from_value(document)?;
    for (index, cycle) in saved.cycles.iter_mut().enumerate() {
        cycle.refresh_wrong_buzz_points(&saved.game_format);
        quizmatch_cycle::validate(cycle)
            .map_err(|source| UpgradeError::InvalidCycle { index, source })?;
    }

    debug!(from = version, cycles = saved.cycles.len(), "saved game loaded");
    Ok(saved)
}

impl SavedGame {
    /// Turn the saved match into a live one. Missing cycles are added so
    /// every packet tossup has one.
    pub fn into_game_state(self) -> GameState {
        let mut cycles = self.cycles;
        let wanted = self.packet.tossups.len();
        if cycles.len() < wanted {
            cycles.resize_with(wanted, Cycle::new);
        }
        GameState::from_parts(cycles, self.packet, self.players, self.game_format)
    }
}

impl GameState {
    /// Capture the match in its persisted shape.
    pub fn to_saved_game(&self) -> SavedGame {
        SavedGame {
            version: CURRENT_VERSION,
            cycles: self.cycles().to_vec(),
            packet: self.packet().clone(),
            players: self.players().to_vec(),
            game_format: self.game_format().clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Version 1
// ---------------------------------------------------------------------------

fn upgrade_v1(root: &mut Map<String, Value>) -> Result<(), UpgradeError> {
    let Some(cycles) = root.get_mut("cycles") else {
        return Ok(());
    };
    let cycles = cycles
        .as_array_mut()
        .ok_or(UpgradeError::InvalidField { field: "cycles" })?;

    for (cycle_index, cycle) in cycles.iter_mut().enumerate() {
        let cycle = cycle.as_object_mut().ok_or(UpgradeError::InvalidCycleField {
            field: "cycle",
            cycle_index,
        })?;
        upgrade_markers(cycle, cycle_index)?;
        merge_wrong_buzzes(cycle, cycle_index)?;
        upgrade_bonus_answer(cycle, cycle_index)?;
    }
    Ok(())
}

fn invalid(field: &'static str, cycle_index: usize) -> UpgradeError {
    UpgradeError::InvalidCycleField { field, cycle_index }
}

/// Rewrite `correct` flags into points on every buzz marker in the cycle.
fn upgrade_markers(cycle: &mut Map<String, Value>, cycle_index: usize) -> Result<(), UpgradeError> {
    let mut buzzes: Vec<&mut Value> = Vec::new();
    for (key, value) in cycle.iter_mut() {
        match (key.as_str(), value) {
            ("correctBuzz" | "negBuzz", Value::Null) => {}
            ("correctBuzz" | "negBuzz", buzz) => buzzes.push(buzz),
            ("wrongBuzzes" | "noPenaltyBuzzes", Value::Array(items)) => {
                buzzes.extend(items.iter_mut());
            }
            ("wrongBuzzes" | "noPenaltyBuzzes", Value::Null) => {}
            ("wrongBuzzes", _) => return Err(invalid("wrongBuzzes", cycle_index)),
            ("noPenaltyBuzzes", _) => return Err(invalid("noPenaltyBuzzes", cycle_index)),
            _ => {}
        }
    }

    for buzz in buzzes {
        let marker = buzz
            .get_mut("marker")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| invalid("marker", cycle_index))?;
        let Some(correct) = marker.remove("correct") else {
            continue;
        };
        let correct = correct
            .as_bool()
            .ok_or_else(|| invalid("correct", cycle_index))?;
        if !marker.contains_key("points") {
            let points = if correct { BASE_TOSSUP_POINTS } else { 0 };
            warn!(cycle_index, correct, points, "converted legacy buzz marker");
            marker.insert("points".to_owned(), json!(points));
        }
    }
    Ok(())
}

/// Fold `negBuzz` and `noPenaltyBuzzes` into `wrongBuzzes`.
fn merge_wrong_buzzes(
    cycle: &mut Map<String, Value>,
    cycle_index: usize,
) -> Result<(), UpgradeError> {
    let neg = cycle.remove("negBuzz").filter(|value| !value.is_null());
    let no_penalty = cycle
        .remove("noPenaltyBuzzes")
        .filter(|value| !value.is_null());
    if neg.is_none() && no_penalty.is_none() {
        return Ok(());
    }

    let mut merged: Vec<Value> = match cycle.remove("wrongBuzzes") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(invalid("wrongBuzzes", cycle_index)),
    };
    let had_neg = neg.is_some();
    merged.extend(neg);
    match no_penalty {
        None => {}
        Some(Value::Array(mut items)) => {
            if !had_neg {
                items.iter_mut().for_each(mark_last_word);
            }
            merged.extend(items);
        }
        Some(_) => return Err(invalid("noPenaltyBuzzes", cycle_index)),
    }

    let mut keyed = Vec::with_capacity(merged.len());
    for buzz in merged {
        let position = buzz
            .pointer("/marker/position")
            .and_then(Value::as_u64)
            .ok_or_else(|| invalid("position", cycle_index))?;
        keyed.push((position, buzz));
    }
    // Stable, so equal positions keep their recorded order.
    keyed.sort_by_key(|(position, _)| *position);

    warn!(cycle_index, count = keyed.len(), "merged legacy wrong buzz lists");
    let merged: Vec<Value> = keyed.into_iter().map(|(_, buzz)| buzz).collect();
    cycle.insert("wrongBuzzes".to_owned(), Value::Array(merged));
    Ok(())
}

/// A cycle that recorded wrong buzzes but no neg only ever kept buzzes on
/// the last word out of the penalty.
fn mark_last_word(buzz: &mut Value) {
    if let Some(marker) = buzz.get_mut("marker").and_then(Value::as_object_mut) {
        marker.entry("isLastWord").or_insert(json!(true));
    }
}

/// Build `parts` for bonus answers that only recorded `correctParts`.
fn upgrade_bonus_answer(
    cycle: &mut Map<String, Value>,
    cycle_index: usize,
) -> Result<(), UpgradeError> {
    let buzzing_team = cycle
        .get("correctBuzz")
        .and_then(|buzz| buzz.pointer("/marker/player/teamName"))
        .and_then(Value::as_str)
        .map(str::to_owned);

    let Some(answer) = cycle.get_mut("bonusAnswer").filter(|value| !value.is_null()) else {
        return Ok(());
    };
    let answer = answer
        .as_object_mut()
        .ok_or_else(|| invalid("bonusAnswer", cycle_index))?;

    let legacy_parts = answer.remove("correctParts");
    if answer.contains_key("parts") {
        return Ok(());
    }

    let receiving = answer
        .get("receivingTeamName")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .or(buzzing_team);
    let Some(receiving) = receiving else {
        warn!(cycle_index, "dropped legacy bonus answer without a correct buzz");
        cycle.remove("bonusAnswer");
        return Ok(());
    };

    let mut credited: Vec<(usize, i64)> = Vec::new();
    match legacy_parts {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for item in items {
                let part =
                    legacy_part(&item).ok_or_else(|| invalid("correctParts", cycle_index))?;
                credited.push(part);
            }
        }
        Some(_) => return Err(invalid("correctParts", cycle_index)),
    }

    let parts_count = credited
        .iter()
        .map(|(index, _)| index.saturating_add(1))
        .fold(DEFAULT_BONUS_PARTS_COUNT, usize::max);
    let mut parts = vec![json!({ "teamName": "", "points": 0 }); parts_count];
    for (index, points) in &credited {
        if let Some(part) = parts.get_mut(*index) {
            *part = json!({ "teamName": receiving, "points": points });
        }
    }

    warn!(cycle_index, credited = credited.len(), "converted legacy bonus answer");
    answer.insert("receivingTeamName".to_owned(), json!(receiving));
    answer.insert("parts".to_owned(), Value::Array(parts));
    Ok(())
}

/// A legacy correct part: either `{index, points}` or a bare index worth
/// the default part value.
fn legacy_part(item: &Value) -> Option<(usize, i64)> {
    match item {
        Value::Number(index) => {
            let index = usize::try_from(index.as_u64()?).ok()?;
            Some((index, i64::from(DEFAULT_BONUS_PART_VALUE)))
        }
        Value::Object(part) => {
            let index = usize::try_from(part.get("index")?.as_u64()?).ok()?;
            let points = part
                .get("points")
                .map_or(Some(i64::from(DEFAULT_BONUS_PART_VALUE)), Value::as_i64)?;
            Some((index, points))
        }
        _ => None,
    }
}
