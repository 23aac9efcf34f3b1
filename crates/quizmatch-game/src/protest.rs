//! Protest impact.
//!
//! Each unresolved protest is priced at the most it could move the score
//! toward the protesting team if granted. The estimate is an upper bound:
//! protests are treated as independent and their swings simply add up,
//! rather than enumerating every combination of rulings.
//!
//! # Pricing
//!
//! - Tossup protest over the team's own wrong buzz: the penalty is
//!   refunded, the buzz earns what a correct buzz at that position earns,
//!   the team gains the full bonus, and an opponent who answered correctly
//!   afterwards loses their tossup and bonus points.
//! - Tossup protest over an opponent's correct buzz: the opponent loses
//!   their tossup and bonus points, minus whatever the protesting team
//!   earned on bounce-backs from that bonus.
//! - Bonus part protest: the part's value, plus the part's points if they
//!   were credited to another team.

use quizmatch_cycle::Cycle;
use quizmatch_types::{
    BonusProtestEvent, DEFAULT_BONUS_PART_VALUE, DEFAULT_BONUS_PARTS_COUNT, TossupProtestEvent,
};
use serde::{Deserialize, Serialize};

use crate::state::GameState;
use crate::tossup::correct_buzz_points;

/// Which ruling a protest challenges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProtestKind {
    /// A tossup ruling.
    Tossup,
    /// One bonus part.
    #[serde(rename_all = "camelCase")]
    BonusPart {
        /// The protested part.
        part_index: usize,
    },
}

/// The most one protest could move the score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtestSwing {
    /// Cycle the protest was filed in.
    pub cycle_index: usize,
    /// The protesting team.
    pub team_name: String,
    /// What was protested.
    pub kind: ProtestKind,
    /// Points the protesting team would gain relative to its opponent.
    pub swing: i32,
}

impl GameState {
    /// Price every unresolved protest in the playable cycles.
    pub fn protest_swings(&self) -> Vec<ProtestSwing> {
        let mut swings = Vec::new();
        for (cycle_index, cycle) in self.playable_cycles().iter().enumerate() {
            for protest in cycle.tossup_protests() {
                swings.push(ProtestSwing {
                    cycle_index,
                    team_name: protest.team_name.clone(),
                    kind: ProtestKind::Tossup,
                    swing: self.tossup_protest_swing(cycle_index, cycle, protest),
                });
            }
            for protest in cycle.bonus_protests() {
                swings.push(ProtestSwing {
                    cycle_index,
                    team_name: protest.team_name.clone(),
                    kind: ProtestKind::BonusPart {
                        part_index: protest.part_index,
                    },
                    swing: self.bonus_protest_swing(cycle, protest),
                });
            }
        }
        swings
    }

    /// Return whether granting unresolved protests could change the
    /// outcome.
    ///
    /// Only the first two teams are compared. With the score tied, any
    /// protest worth points matters. Otherwise the trailing team's summed
    /// swings must reach the margin.
    pub fn protests_matter(&self) -> bool {
        let teams = self.team_names();
        let totals = self.final_score();
        let (Some(first), Some(second)) = (teams.first(), teams.get(1)) else {
            return false;
        };
        let (Some(first_total), Some(second_total)) = (totals.first(), totals.get(1)) else {
            return false;
        };

        let swings = self.protest_swings();
        let margin = first_total.abs_diff(*second_total);
        if margin == 0 {
            return swings.iter().any(|swing| swing.swing > 0);
        }

        let trailing = if first_total < second_total { first } else { second };
        let available: i64 = swings
            .iter()
            .filter(|swing| swing.team_name == *trailing)
            .map(|swing| i64::from(swing.swing.max(0)))
            .fold(0, i64::saturating_add);
        available >= i64::from(margin)
    }

    fn tossup_protest_swing(
        &self,
        cycle_index: usize,
        cycle: &Cycle,
        protest: &TossupProtestEvent,
    ) -> i32 {
        let team_name = protest.team_name.as_str();
        let opponent_correct = cycle
            .correct_buzz()
            .filter(|buzz| buzz.marker.team_name() != team_name);
        let opponent_loss = opponent_correct.map_or(0, |buzz| {
            let opponent = buzz.marker.team_name();
            let tossup_points = correct_buzz_points(
                self.packet().tossup(buzz.tossup_index),
                buzz.marker.position,
                self.game_format(),
            );
            let bonus_points = cycle
                .bonus_answer()
                .map_or(0, |answer| answer.points_for_team(opponent));
            tossup_points.saturating_add(bonus_points)
        });

        let own_wrong = cycle
            .wrong_buzzes()
            .iter()
            .find(|buzz| buzz.marker.team_name() == team_name);

        let swing = if let Some(wrong) = own_wrong {
            let refund = wrong.marker.points.saturating_neg();
            let earned = correct_buzz_points(
                self.packet().tossup(protest.question_index),
                wrong.marker.position,
                self.game_format(),
            );
            refund
                .saturating_add(earned)
                .saturating_add(self.bonus_potential(cycle_index, cycle))
                .saturating_add(opponent_loss)
        } else {
            let bounce_back = cycle
                .bonus_answer()
                .map_or(0, |answer| answer.points_for_team(team_name));
            opponent_loss.saturating_sub(bounce_back)
        };
        swing.max(0)
    }

    /// The full value of the bonus the protesting team would have heard.
    fn bonus_potential(&self, cycle_index: usize, cycle: &Cycle) -> i32 {
        let bonus_index = cycle
            .bonus_answer()
            .map(|answer| answer.bonus_index)
            .or_else(|| self.get_bonus_index(cycle_index));
        let Some(bonus_index) = bonus_index else {
            return 0;
        };
        self.packet()
            .bonus(bonus_index)
            .map_or_else(default_bonus_value, |bonus| bonus.total_value())
    }

    fn bonus_protest_swing(&self, cycle: &Cycle, protest: &BonusProtestEvent) -> i32 {
        let Some(answer) = cycle.bonus_answer() else {
            return 0;
        };
        let value = self
            .packet()
            .bonus(answer.bonus_index)
            .and_then(|bonus| bonus.part_value(protest.part_index))
            .unwrap_or(DEFAULT_BONUS_PART_VALUE);

        match answer.parts.get(protest.part_index) {
            Some(part) if part.team_name == protest.team_name => 0,
            Some(part) if part.is_assigned() => value.saturating_add(part.points),
            _ => value,
        }
    }
}

fn default_bonus_value() -> i32 {
    i32::try_from(DEFAULT_BONUS_PARTS_COUNT)
        .unwrap_or(i32::MAX)
        .saturating_mul(DEFAULT_BONUS_PART_VALUE)
}

#[cfg(test)]
mod tests {
    use quizmatch_types::{Bonus, BonusPart, GameFormat, Packet, Player, Tossup};

    use super::*;

    fn alice() -> Player {
        Player::new("Alice", "Alpha", true)
    }

    fn bob() -> Player {
        Player::new("Bob", "Beta", true)
    }

    fn game(tossups: usize) -> GameState {
        let bonus = Bonus {
            leadin: "For ten points each:".to_owned(),
            parts: vec![
                BonusPart {
                    question: "part".to_owned(),
                    answer: "answer".to_owned(),
                    value: 10,
                };
                3
            ],
        };
        let packet = Packet::new(
            (0..tossups)
                .map(|_| Tossup::new("one two three four five six", "answer"))
                .collect(),
            vec![bonus; tossups],
        );
        GameState::new(packet, vec![alice(), bob()], GameFormat::acf())
    }

    fn tossup_protest(team_name: &str, position: usize) -> TossupProtestEvent {
        TossupProtestEvent {
            question_index: 0,
            position,
            given_answer: "their answer".to_owned(),
            reason: "acceptable equivalent".to_owned(),
            team_name: team_name.to_owned(),
        }
    }

    fn bonus_protest(team_name: &str, part_index: usize) -> BonusProtestEvent {
        BonusProtestEvent {
            question_index: 0,
            part_index,
            given_answer: "their answer".to_owned(),
            reason: "acceptable equivalent".to_owned(),
            team_name: team_name.to_owned(),
        }
    }

    #[test]
    fn no_protests_never_matter() {
        let mut state = game(2);
        assert!(state.buzz_correct(0, alice(), 2).is_ok());
        assert!(state.protest_swings().is_empty());
        assert!(!state.protests_matter());
    }

    #[test]
    fn neg_protest_priced_with_bonus_and_opponent_loss() {
        let mut state = game(2);
        assert!(state.buzz_wrong(0, bob(), 1).is_ok());
        assert!(state.buzz_correct(0, alice(), 4).is_ok());
        assert!(state.set_bonus_part(0, 0, "Alpha", 10).is_ok());
        if let Ok(cycle) = state.cycle_mut(0) {
            cycle.add_tossup_protest(tossup_protest("Beta", 1));
        }

        let swings = state.protest_swings();
        // 5 refund + 10 tossup + 30 bonus + 20 lost by Alpha.
        assert_eq!(swings.first().map(|s| s.swing), Some(65));
        assert_eq!(swings.first().map(|s| s.kind), Some(ProtestKind::Tossup));
        // Beta trails 20 to -5.
        assert!(state.protests_matter());
    }

    #[test]
    fn small_bonus_protest_cannot_close_big_gap() {
        let mut state = game(3);
        assert!(state.buzz_correct(0, alice(), 2).is_ok());
        for part in 0..3 {
            assert!(state.set_bonus_part(0, part, "Alpha", 10).is_ok());
        }
        assert!(state.buzz_correct(1, bob(), 2).is_ok());
        if let Ok(cycle) = state.cycle_mut(1) {
            cycle.add_bonus_protest(bonus_protest("Beta", 0));
        }

        // Alpha leads 40 to 10; a single part is worth 10.
        let swings = state.protest_swings();
        assert_eq!(swings.first().map(|s| s.swing), Some(10));
        assert!(!state.protests_matter());
    }

    #[test]
    fn leading_team_protests_do_not_matter() {
        let mut state = game(2);
        assert!(state.buzz_correct(0, alice(), 2).is_ok());
        if let Ok(cycle) = state.cycle_mut(0) {
            cycle.add_bonus_protest(bonus_protest("Alpha", 1));
        }
        assert!(!state.protests_matter());
    }

    #[test]
    fn tie_makes_any_protest_matter() {
        let mut state = game(2);
        if let Ok(cycle) = state.cycle_mut(1) {
            cycle.add_tossup_protest(tossup_protest("Alpha", 3));
        }
        // No buzz to overturn: worth nothing, so it cannot break the tie.
        assert!(!state.protests_matter());

        assert!(state.buzz_correct(1, bob(), 5).is_ok());
        assert!(state.buzz_correct(0, alice(), 5).is_ok());
        if let Ok(cycle) = state.cycle_mut(0) {
            cycle.add_bonus_protest(bonus_protest("Beta", 2));
        }
        assert!(state.protests_matter());
    }

    #[test]
    fn single_team_match() {
        let mut state = game(2);
        state.set_players(vec![alice()]);
        if let Ok(cycle) = state.cycle_mut(0) {
            cycle.add_tossup_protest(tossup_protest("Alpha", 3));
        }
        assert!(!state.protests_matter());
    }
}
