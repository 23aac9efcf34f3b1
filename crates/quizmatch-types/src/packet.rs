//! Question content for a match.
//!
//! A [`Packet`] is the ordered list of tossups and bonuses read during a
//! match. It arrives from an external loader as a [`RawPacket`], whose
//! bonuses keep parts, answers, and values in parallel arrays. Converting a
//! raw packet checks that those arrays line up and reports problems as a
//! [`PacketLoadStatus`] instead of failing, since the content is untrusted.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::format::DEFAULT_BONUS_PART_VALUE;

/// A single-answer question that players buzz on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Tossup {
    /// Question text, including any power and pronunciation markers.
    pub question: String,
    /// Answer line.
    pub answer: String,
}

impl Tossup {
    /// Create a tossup.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// One part of a bonus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct BonusPart {
    /// Part text.
    pub question: String,
    /// Answer line.
    pub answer: String,
    /// Points for answering the part correctly.
    pub value: i32,
}

/// A multi-part question earned by answering a tossup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Bonus {
    /// Text read before the first part.
    pub leadin: String,
    /// The parts, in reading order.
    pub parts: Vec<BonusPart>,
}

impl Bonus {
    /// Number of parts.
    pub fn parts_count(&self) -> usize {
        self.parts.len()
    }

    /// Value of one part, if it exists.
    pub fn part_value(&self, part_index: usize) -> Option<i32> {
        self.parts.get(part_index).map(|part| part.value)
    }

    /// Sum of all part values.
    pub fn total_value(&self) -> i32 {
        self.parts
            .iter()
            .fold(0_i32, |total, part| total.saturating_add(part.value))
    }
}

/// The ordered question content of a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Packet {
    /// Tossups in reading order.
    pub tossups: Vec<Tossup>,
    /// Bonuses in reading order.
    #[serde(default)]
    pub bonuses: Vec<Bonus>,
}

impl Packet {
    /// Create a packet from already-validated content.
    pub const fn new(tossups: Vec<Tossup>, bonuses: Vec<Bonus>) -> Self {
        Self { tossups, bonuses }
    }

    /// The tossup at a packet index.
    pub fn tossup(&self, index: usize) -> Option<&Tossup> {
        self.tossups.get(index)
    }

    /// The bonus at a packet index.
    pub fn bonus(&self, index: usize) -> Option<&Bonus> {
        self.bonuses.get(index)
    }
}

// ---------------------------------------------------------------------------
// Raw loader shape
// ---------------------------------------------------------------------------

/// A bonus as produced by a packet parser, with parallel arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RawBonus {
    /// Text read before the first part.
    #[serde(default)]
    pub leadin: String,
    /// Part texts.
    pub parts: Vec<String>,
    /// Answer lines, one per part.
    pub answers: Vec<String>,
    /// Part values, one per part. Missing means every part is worth 10.
    #[serde(default)]
    pub values: Option<Vec<i32>>,
}

/// A packet as produced by a packet parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RawPacket {
    /// Tossups in reading order.
    pub tossups: Vec<Tossup>,
    /// Bonuses in reading order.
    #[serde(default)]
    pub bonuses: Vec<RawBonus>,
}

/// User-visible outcome of loading a packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PacketLoadStatus {
    /// Whether the packet was rejected.
    pub is_error: bool,
    /// Message describing the outcome.
    pub status: String,
}

impl PacketLoadStatus {
    fn error(status: String) -> Self {
        Self {
            is_error: true,
            status,
        }
    }
}

/// A load status and, when loading succeeded, the packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketLoadResult {
    /// What happened.
    pub status: PacketLoadStatus,
    /// The packet, present exactly when `status.is_error` is false.
    pub packet: Option<Packet>,
}

impl RawPacket {
    /// Check the parallel bonus arrays and convert into a [`Packet`].
    pub fn into_packet(self) -> PacketLoadResult {
        if self.tossups.is_empty() {
            return PacketLoadResult {
                status: PacketLoadStatus::error("Packet has no tossups".to_owned()),
                packet: None,
            };
        }

        let mut bonuses = Vec::with_capacity(self.bonuses.len());
        for (index, raw) in self.bonuses.into_iter().enumerate() {
            let number = index.saturating_add(1);
            match convert_bonus(raw) {
                Ok(bonus) => bonuses.push(bonus),
                Err(problem) => {
                    return PacketLoadResult {
                        status: PacketLoadStatus::error(format!("Bonus {number} {problem}")),
                        packet: None,
                    };
                }
            }
        }

        let status = PacketLoadStatus {
            is_error: false,
            status: format!(
                "Loaded {} tossups and {} bonuses",
                self.tossups.len(),
                bonuses.len()
            ),
        };

        PacketLoadResult {
            status,
            packet: Some(Packet::new(self.tossups, bonuses)),
        }
    }
}

fn convert_bonus(raw: RawBonus) -> Result<Bonus, String> {
    let parts_count = raw.parts.len();
    if parts_count == 0 {
        return Err("has no parts".to_owned());
    }
    if raw.answers.len() != parts_count {
        return Err(format!(
            "has {parts_count} parts but {} answers",
            raw.answers.len()
        ));
    }

    let values = match raw.values {
        Some(values) if values.len() != parts_count => {
            return Err(format!(
                "has {parts_count} parts but {} values",
                values.len()
            ));
        }
        Some(values) => values,
        None => vec![DEFAULT_BONUS_PART_VALUE; parts_count],
    };

    let parts = raw
        .parts
        .into_iter()
        .zip(raw.answers)
        .zip(values)
        .map(|((question, answer), value)| BonusPart {
            question,
            answer,
            value,
        })
        .collect();

    Ok(Bonus {
        leadin: raw.leadin,
        parts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_bonus(parts: usize, answers: usize, values: Option<usize>) -> RawBonus {
        RawBonus {
            leadin: "For 10 points each:".to_owned(),
            parts: (0..parts).map(|i| format!("part {i}")).collect(),
            answers: (0..answers).map(|i| format!("answer {i}")).collect(),
            values: values.map(|n| vec![10; n]),
        }
    }

    fn raw_packet(bonuses: Vec<RawBonus>) -> RawPacket {
        RawPacket {
            tossups: vec![Tossup::new("first q", "first a")],
            bonuses,
        }
    }

    #[test]
    fn well_formed_packet_loads() {
        let result = raw_packet(vec![raw_bonus(3, 3, Some(3)), raw_bonus(2, 2, None)]).into_packet();
        assert!(!result.status.is_error);
        assert!(result.packet.is_some());
        if let Some(packet) = result.packet {
            assert_eq!(packet.bonuses.len(), 2);
            assert_eq!(packet.bonus(1).map(Bonus::total_value), Some(20));
        }
    }

    #[test]
    fn mismatched_answers_reported_not_thrown() {
        let result = raw_packet(vec![raw_bonus(3, 3, None), raw_bonus(3, 2, None)]).into_packet();
        assert!(result.status.is_error);
        assert!(result.packet.is_none());
        assert!(result.status.status.starts_with("Bonus 2"));
    }

    #[test]
    fn mismatched_values_reported() {
        let result = raw_packet(vec![raw_bonus(3, 3, Some(2))]).into_packet();
        assert!(result.status.is_error);
        assert!(result.status.status.contains("2 values"));
    }

    #[test]
    fn empty_packet_rejected() {
        let result = RawPacket::default().into_packet();
        assert!(result.status.is_error);
    }
}
