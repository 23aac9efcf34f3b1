//! Running score.
//!
//! Scores are a pure fold over the cycles. A cycle counts only while the
//! match is still live: the packet must have a tossup for it, and the game
//! must not already be decided. Regulation ends after
//! `regulation_tossup_count` cycles unless the top score is shared;
//! overtime then runs in blocks of `minimum_overtime_question_count`
//! cycles until a block ends untied.
//!
//! Correct buzz points are recomputed from the tossup text and the current
//! format, since a stored value goes stale when either changes. Wrong buzz
//! points are taken as stored (the neg rule keeps them current).

use quizmatch_cycle::Cycle;

use crate::state::GameState;
use crate::tossup::correct_buzz_points;

impl GameState {
    /// Cumulative totals after each playable cycle.
    ///
    /// Entry `i` holds one total per team, in [`team_names`] order, after
    /// cycle `i` is applied. The list is as long as
    /// [`playable_cycles`](Self::playable_cycles).
    ///
    /// [`team_names`]: GameState::team_names
    pub fn scores(&self) -> Vec<Vec<i32>> {
        let teams = self.team_names();
        let mut totals = vec![0_i32; teams.len()];
        let mut scores: Vec<Vec<i32>> = Vec::new();

        for (cycle_index, cycle) in self.cycles().iter().enumerate() {
            if !self.is_playable(cycle_index, scores.last()) {
                break;
            }
            for (team_name, points) in self.cycle_deltas(cycle) {
                if let Some(slot) = teams
                    .iter()
                    .position(|team| *team == team_name)
                    .and_then(|index| totals.get_mut(index))
                {
                    *slot = slot.saturating_add(points);
                }
            }
            scores.push(totals.clone());
        }
        scores
    }

    /// Totals after the last playable cycle, or zeros before play starts.
    pub fn final_score(&self) -> Vec<i32> {
        self.scores()
            .pop()
            .unwrap_or_else(|| vec![0; self.team_names().len()])
    }

    /// The prefix of cycles that are actually played.
    pub fn playable_cycles(&self) -> &[Cycle] {
        let played = self.scores().len();
        self.cycles().get(..played).unwrap_or_default()
    }

    fn is_playable(&self, cycle_index: usize, previous: Option<&Vec<i32>>) -> bool {
        if self.get_tossup_index(cycle_index) >= self.packet().tossups.len() {
            return false;
        }

        let format = self.game_format();
        let Some(extra) = cycle_index.checked_sub(format.regulation_tossup_count) else {
            return true;
        };
        let block = format.minimum_overtime_question_count.max(1);
        let at_block_end = extra.checked_rem(block).is_some_and(|rem| rem == 0);
        !at_block_end || previous.is_some_and(|totals| is_tied(totals))
    }

    /// `(team, points)` pairs a single cycle contributes.
    fn cycle_deltas(&self, cycle: &Cycle) -> Vec<(String, i32)> {
        let mut deltas = Vec::new();

        if let Some(correct) = cycle.correct_buzz() {
            let tossup = self.packet().tossup(correct.tossup_index);
            let points = correct_buzz_points(tossup, correct.marker.position, self.game_format());
            deltas.push((correct.marker.team_name().to_owned(), points));
        }
        for wrong in cycle.wrong_buzzes() {
            deltas.push((wrong.marker.team_name().to_owned(), wrong.marker.points));
        }
        if let Some(answer) = cycle.bonus_answer() {
            for part in answer.parts.iter().filter(|part| part.is_assigned()) {
                deltas.push((part.team_name.clone(), part.points));
            }
        }
        deltas
    }
}

/// Whether the top score is shared. A lone team is never tied.
pub(crate) fn is_tied(totals: &[i32]) -> bool {
    let Some(top) = totals.iter().max() else {
        return false;
    };
    totals.iter().filter(|total| *total == top).count() > 1
}
