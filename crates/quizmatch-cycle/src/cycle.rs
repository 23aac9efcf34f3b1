//! The event log for one tossup/bonus pairing.
//!
//! [`Cycle`] holds every event recorded while a pairing is played and
//! exposes atomic add/remove operations that keep the crate-level
//! invariants. Operations a moderator can trigger at the wrong moment
//! (protesting a bonus nobody earned, removing an event that is not there)
//! are silent no-ops: they log at `debug` and leave the cycle untouched.
//!
//! # Update hook
//!
//! A single handler registered with [`Cycle::set_update_hook`] runs at the
//! end of every mutation that changed something, receiving a
//! [`CycleChange`] naming the operation. The handler gets no access to the
//! cycle, and the mutation holds `&mut self` while it runs, so a handler
//! cannot re-enter the cycle. Hooks are never serialized or cloned.

use serde::{Deserialize, Serialize};
use tracing::debug;

use quizmatch_types::{
    BonusAnswerEvent, BonusAnswerPart, BonusProtestEvent, BuzzMarker, CorrectBuzzEvent,
    DEFAULT_BONUS_PARTS_COUNT, GameFormat, Player, PlayerJoinsEvent, PlayerLeavesEvent,
    SubstitutionEvent, ThrownOutQuestionEvent, TossupProtestEvent, WrongBuzzEvent,
};

use crate::buzzes;

// ---------------------------------------------------------------------------
// Change notifications
// ---------------------------------------------------------------------------

/// The mutation that just completed on a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleChange {
    /// A correct buzz was recorded.
    CorrectBuzzAdded,
    /// The correct buzz and its bonus were cleared.
    CorrectBuzzRemoved,
    /// A wrong buzz was recorded.
    WrongBuzzAdded,
    /// A wrong buzz was withdrawn.
    WrongBuzzRemoved,
    /// Neg status was recomputed and at least one buzz changed.
    WrongBuzzPointsRefreshed,
    /// A bonus part result was written.
    BonusPartAnswered,
    /// A tossup protest was recorded.
    TossupProtestAdded,
    /// A tossup protest was withdrawn.
    TossupProtestRemoved,
    /// A bonus protest was recorded.
    BonusProtestAdded,
    /// A bonus protest was withdrawn.
    BonusProtestRemoved,
    /// A player joined.
    PlayerJoined,
    /// A player left.
    PlayerLeft,
    /// Two players were swapped.
    PlayersSwapped,
    /// A join was withdrawn.
    PlayerJoinRemoved,
    /// A leave was withdrawn.
    PlayerLeaveRemoved,
    /// A substitution was withdrawn.
    SubstitutionRemoved,
    /// A tossup was thrown out.
    TossupThrownOut,
    /// A tossup throw-out was withdrawn.
    TossupRestored,
    /// A bonus was thrown out.
    BonusThrownOut,
    /// A bonus throw-out was withdrawn.
    BonusRestored,
    /// A player's buzzes were purged.
    PlayerPurged,
    /// Every event referencing a player was removed.
    PlayerRemoved,
    /// A player was renamed in every event.
    PlayerRenamed,
}

type UpdateHook = Box<dyn FnMut(CycleChange)>;

/// Holder for the optional update hook.
///
/// Cloning yields an empty slot and every slot compares equal, so hooks
/// never affect a cycle's value semantics.
#[derive(Default)]
struct HookSlot(Option<UpdateHook>);

impl core::fmt::Debug for HookSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(if self.0.is_some() { "HookSlot(set)" } else { "HookSlot(empty)" })
    }
}

impl Clone for HookSlot {
    fn clone(&self) -> Self {
        Self(None)
    }
}

impl PartialEq for HookSlot {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for HookSlot {}

// ---------------------------------------------------------------------------
// Cycle
// ---------------------------------------------------------------------------

/// The event log for one tossup/bonus pairing.
///
/// Event lists that would otherwise be optional are stored as vectors; an
/// empty vector means "none recorded" and is omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cycle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correct_buzz: Option<CorrectBuzzEvent>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    wrong_buzzes: Vec<WrongBuzzEvent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    bonus_answer: Option<BonusAnswerEvent>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    player_joins: Vec<PlayerJoinsEvent>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    player_leaves: Vec<PlayerLeavesEvent>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    subs: Vec<SubstitutionEvent>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tossup_protests: Vec<TossupProtestEvent>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    bonus_protests: Vec<BonusProtestEvent>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    thrown_out_tossups: Vec<ThrownOutQuestionEvent>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    thrown_out_bonuses: Vec<ThrownOutQuestionEvent>,

    #[serde(skip)]
    hook: HookSlot,
}

impl Cycle {
    /// Create an empty cycle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler called after each effective mutation,
    /// replacing any previous one.
    pub fn set_update_hook(&mut self, hook: impl FnMut(CycleChange) + 'static) {
        self.hook = HookSlot(Some(Box::new(hook)));
    }

    /// Remove the update handler.
    pub fn clear_update_hook(&mut self) {
        self.hook = HookSlot(None);
    }

    fn notify(&mut self, change: CycleChange) {
        if let Some(hook) = self.hook.0.as_mut() {
            hook(change);
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The correct buzz, if any.
    pub const fn correct_buzz(&self) -> Option<&CorrectBuzzEvent> {
        self.correct_buzz.as_ref()
    }

    /// Wrong buzzes in ascending position order.
    pub fn wrong_buzzes(&self) -> &[WrongBuzzEvent] {
        &self.wrong_buzzes
    }

    /// The bonus answer, if any.
    pub const fn bonus_answer(&self) -> Option<&BonusAnswerEvent> {
        self.bonus_answer.as_ref()
    }

    /// Players who joined before this cycle's tossup.
    pub fn player_joins(&self) -> &[PlayerJoinsEvent] {
        &self.player_joins
    }

    /// Players who left before this cycle's tossup.
    pub fn player_leaves(&self) -> &[PlayerLeavesEvent] {
        &self.player_leaves
    }

    /// Substitutions made before this cycle's tossup.
    pub fn subs(&self) -> &[SubstitutionEvent] {
        &self.subs
    }

    /// Pending tossup protests, one per team.
    pub fn tossup_protests(&self) -> &[TossupProtestEvent] {
        &self.tossup_protests
    }

    /// Pending bonus protests, one per part.
    pub fn bonus_protests(&self) -> &[BonusProtestEvent] {
        &self.bonus_protests
    }

    /// Tossups thrown out during this cycle, in the order they were voided.
    pub fn thrown_out_tossups(&self) -> &[ThrownOutQuestionEvent] {
        &self.thrown_out_tossups
    }

    /// Bonuses thrown out during this cycle, in the order they were voided.
    pub fn thrown_out_bonuses(&self) -> &[ThrownOutQuestionEvent] {
        &self.thrown_out_bonuses
    }

    // -----------------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------------

    /// Every buzz in the order it happened: wrong buzzes by position, then
    /// the correct buzz.
    pub fn ordered_buzzes(&self) -> Vec<&BuzzMarker> {
        buzzes::ordered_markers(
            &self.wrong_buzzes,
            self.correct_buzz.as_ref().map(|buzz| &buzz.marker),
        )
    }

    /// The earliest wrong buzz, preferring the first recorded among ties.
    pub fn first_wrong_buzz(&self) -> Option<&WrongBuzzEvent> {
        buzzes::first_wrong_buzz(&self.wrong_buzzes)
    }

    /// The wrong buzz that was penalized, if any.
    pub fn neg_buzz(&self) -> Option<&WrongBuzzEvent> {
        self.wrong_buzzes.iter().find(|buzz| buzz.marker.points != 0)
    }

    /// Bonus parts that have not been protested yet.
    pub fn get_protestable_bonus_part_indexes(&self, bonus_parts_count: usize) -> Vec<usize> {
        (0..bonus_parts_count)
            .filter(|part| !self.bonus_protests.iter().any(|p| p.part_index == *part))
            .collect()
    }

    /// Return whether the player owns any buzz in this cycle.
    pub fn has_buzz_by(&self, player: &Player) -> bool {
        self.ordered_buzzes()
            .iter()
            .any(|marker| marker.player == *player)
    }

    /// Return whether the cycle has no events at all.
    pub fn is_empty(&self) -> bool {
        self.correct_buzz.is_none()
            && self.wrong_buzzes.is_empty()
            && self.bonus_answer.is_none()
            && self.player_joins.is_empty()
            && self.player_leaves.is_empty()
            && self.subs.is_empty()
            && self.tossup_protests.is_empty()
            && self.bonus_protests.is_empty()
            && self.thrown_out_tossups.is_empty()
            && self.thrown_out_bonuses.is_empty()
    }

    // -----------------------------------------------------------------------
    // Buzzes
    // -----------------------------------------------------------------------

    /// Record a correct buzz.
    ///
    /// The buzzing team's earlier buzzes on this tossup are replaced. If the
    /// same team already held the correct buzz, its bonus answer is kept so
    /// an overturned call does not lose bonus results; otherwise a fresh
    /// bonus answer is created for `bonus_index` with `bonus_parts_count`
    /// blank parts (3 when unknown). With no `bonus_index` there is no
    /// bonus left to play and none is created. Wrong buzzes after the new
    /// correct buzz are dropped, since it ends the question.
    pub fn add_correct_buzz(
        &mut self,
        marker: BuzzMarker,
        tossup_index: usize,
        game_format: &GameFormat,
        bonus_index: Option<usize>,
        bonus_parts_count: Option<usize>,
    ) {
        let team_name = marker.player.team_name.clone();
        let position = marker.position;

        let before = self.wrong_buzzes.len();
        self.wrong_buzzes.retain(|buzz| {
            !(buzz.tossup_index == tossup_index && buzz.marker.player.team_name == team_name)
        });
        if self.wrong_buzzes.len() != before {
            self.tossup_protests
                .retain(|protest| protest.team_name != team_name);
        }
        self.tossup_protests
            .retain(|protest| protest.team_name != team_name);

        let same_team = self
            .correct_buzz
            .as_ref()
            .is_some_and(|buzz| buzz.marker.player.team_name == team_name);
        if !(same_team && self.bonus_answer.is_some()) {
            self.bonus_protests.clear();
            self.bonus_answer = bonus_index.map(|index| {
                BonusAnswerEvent::new(
                    index,
                    team_name.clone(),
                    bonus_parts_count.unwrap_or(DEFAULT_BONUS_PARTS_COUNT),
                )
            });
        }

        self.correct_buzz = Some(CorrectBuzzEvent {
            tossup_index,
            marker,
        });
        self.wrong_buzzes
            .retain(|buzz| buzz.marker.position <= position);
        buzzes::assign_neg_points(&mut self.wrong_buzzes, game_format.neg_value);

        debug!(team = %team_name, position, tossup_index, "correct buzz recorded");
        self.notify(CycleChange::CorrectBuzzAdded);
    }

    /// Record a wrong buzz.
    ///
    /// The team's earlier buzz on this tossup is replaced, dropping any
    /// tossup protest the team filed against it (a correct buzz from the
    /// same team is withdrawn along with its bonus). A correct buzz
    /// positioned strictly before the new wrong buzz is withdrawn too, since
    /// the correct buzz must be the last thing that happened on the tossup.
    pub fn add_wrong_buzz(
        &mut self,
        marker: BuzzMarker,
        tossup_index: usize,
        game_format: &GameFormat,
    ) {
        let team_name = marker.player.team_name.clone();
        let position = marker.position;

        let before = self.wrong_buzzes.len();
        self.wrong_buzzes.retain(|buzz| {
            !(buzz.tossup_index == tossup_index && buzz.marker.player.team_name == team_name)
        });
        if self.wrong_buzzes.len() != before {
            self.tossup_protests
                .retain(|protest| protest.team_name != team_name);
        }

        let invalidates_correct = self.correct_buzz.as_ref().is_some_and(|buzz| {
            buzz.marker.player.team_name == team_name || buzz.marker.position < position
        });
        if invalidates_correct {
            self.clear_correct_buzz();
        }

        let index = buzzes::insertion_index(&self.wrong_buzzes, position);
        self.wrong_buzzes.insert(
            index,
            WrongBuzzEvent {
                tossup_index,
                marker,
            },
        );
        buzzes::assign_neg_points(&mut self.wrong_buzzes, game_format.neg_value);

        debug!(team = %team_name, position, tossup_index, invalidates_correct, "wrong buzz recorded");
        self.notify(CycleChange::WrongBuzzAdded);
    }

    /// Withdraw the correct buzz, its bonus answer, and every bonus protest.
    pub fn remove_correct_buzz(&mut self) {
        if self.correct_buzz.is_none() {
            debug!("no correct buzz to remove");
            return;
        }
        self.clear_correct_buzz();
        self.notify(CycleChange::CorrectBuzzRemoved);
    }

    fn clear_correct_buzz(&mut self) {
        self.correct_buzz = None;
        self.bonus_answer = None;
        self.bonus_protests.clear();
    }

    /// Withdraw the wrong buzz by the player's team, along with any tossup
    /// protest that team filed.
    pub fn remove_wrong_buzz(&mut self, player: &Player, game_format: &GameFormat) {
        if !self.remove_team_wrong_buzz(&player.team_name, game_format.neg_value) {
            debug!(team = %player.team_name, "no wrong buzz to remove");
            return;
        }
        self.notify(CycleChange::WrongBuzzRemoved);
    }

    fn remove_team_wrong_buzz(&mut self, team_name: &str, neg_value: i32) -> bool {
        let before = self.wrong_buzzes.len();
        self.wrong_buzzes
            .retain(|buzz| buzz.marker.player.team_name != team_name);
        if self.wrong_buzzes.len() == before {
            return false;
        }
        self.tossup_protests
            .retain(|protest| protest.team_name != team_name);
        buzzes::assign_neg_points(&mut self.wrong_buzzes, neg_value);
        true
    }

    /// Re-run the neg rule against `game_format`, for example after the
    /// format changed or a document was loaded.
    pub fn refresh_wrong_buzz_points(&mut self, game_format: &GameFormat) {
        if buzzes::assign_neg_points(&mut self.wrong_buzzes, game_format.neg_value) {
            self.notify(CycleChange::WrongBuzzPointsRefreshed);
        }
    }

    /// Re-derive each wrong buzz's last-word flag, then re-run the neg rule.
    ///
    /// `last_word` maps a buzz's `(tossup_index, position)` to its flag;
    /// `None` leaves that buzz's stored flag alone.
    pub fn refresh_last_word_flags(
        &mut self,
        mut last_word: impl FnMut(usize, usize) -> Option<bool>,
        game_format: &GameFormat,
    ) {
        let mut changed = false;
        for buzz in &mut self.wrong_buzzes {
            let Some(flag) = last_word(buzz.tossup_index, buzz.marker.position) else {
                continue;
            };
            if buzz.marker.is_last_word != flag {
                buzz.marker.is_last_word = flag;
                changed = true;
            }
        }
        changed |= buzzes::assign_neg_points(&mut self.wrong_buzzes, game_format.neg_value);
        if changed {
            self.notify(CycleChange::WrongBuzzPointsRefreshed);
        }
    }

    // -----------------------------------------------------------------------
    // Bonus answers
    // -----------------------------------------------------------------------

    /// Credit one bonus part to a team.
    ///
    /// Does nothing when no bonus is being played. Parts beyond the current
    /// list grow it to at least three parts (or `part_index + 1`).
    pub fn set_bonus_part_answer(&mut self, part_index: usize, team_name: &str, points: i32) {
        let Some(answer) = self.bonus_answer.as_mut() else {
            debug!(part_index, "no bonus answer to update");
            return;
        };

        if part_index >= answer.parts.len() {
            let grown = part_index
                .saturating_add(1)
                .max(DEFAULT_BONUS_PARTS_COUNT);
            answer.parts.resize(grown, BonusAnswerPart::default());
        }
        if let Some(part) = answer.parts.get_mut(part_index) {
            part.team_name = team_name.to_owned();
            part.points = points;
        }

        debug!(part_index, team = team_name, points, "bonus part answered");
        self.notify(CycleChange::BonusPartAnswered);
    }

    // -----------------------------------------------------------------------
    // Protests
    // -----------------------------------------------------------------------

    /// Record a tossup protest, replacing the team's earlier one.
    pub fn add_tossup_protest(&mut self, protest: TossupProtestEvent) {
        self.tossup_protests
            .retain(|existing| existing.team_name != protest.team_name);
        debug!(team = %protest.team_name, position = protest.position, "tossup protest recorded");
        self.tossup_protests.push(protest);
        self.notify(CycleChange::TossupProtestAdded);
    }

    /// Withdraw the team's tossup protest.
    pub fn remove_tossup_protest(&mut self, team_name: &str) {
        let before = self.tossup_protests.len();
        self.tossup_protests
            .retain(|protest| protest.team_name != team_name);
        if self.tossup_protests.len() != before {
            self.notify(CycleChange::TossupProtestRemoved);
        }
    }

    /// Record a bonus protest, replacing any earlier protest of that part.
    ///
    /// Does nothing without a correct buzz: there is no bonus to protest.
    pub fn add_bonus_protest(&mut self, protest: BonusProtestEvent) {
        if self.correct_buzz.is_none() {
            debug!(part_index = protest.part_index, "bonus protest ignored without a correct buzz");
            return;
        }
        self.bonus_protests
            .retain(|existing| existing.part_index != protest.part_index);
        debug!(team = %protest.team_name, part_index = protest.part_index, "bonus protest recorded");
        self.bonus_protests.push(protest);
        self.notify(CycleChange::BonusProtestAdded);
    }

    /// Withdraw the protest of one bonus part.
    pub fn remove_bonus_protest(&mut self, part_index: usize) {
        let before = self.bonus_protests.len();
        self.bonus_protests
            .retain(|protest| protest.part_index != part_index);
        if self.bonus_protests.len() != before {
            self.notify(CycleChange::BonusProtestRemoved);
        }
    }

    // -----------------------------------------------------------------------
    // Roster changes
    // -----------------------------------------------------------------------

    /// Record a player entering. Repeating an existing join does nothing.
    pub fn add_player_joins(&mut self, player: Player) {
        if self.player_joins.iter().any(|join| join.in_player == player) {
            debug!(player = %player, "player already joins in this cycle");
            return;
        }
        debug!(player = %player, "player joins");
        self.player_joins.push(PlayerJoinsEvent { in_player: player });
        self.notify(CycleChange::PlayerJoined);
    }

    /// Record a player leaving, dropping their buzzes in this cycle.
    pub fn add_player_leaves(&mut self, player: Player, game_format: &GameFormat) {
        self.purge_buzzes_by(&player, game_format.neg_value);
        debug!(player = %player, "player leaves");
        self.player_leaves.push(PlayerLeavesEvent { out_player: player });
        self.notify(CycleChange::PlayerLeft);
    }

    /// Record a substitution, dropping the departing player's buzzes in
    /// this cycle.
    pub fn add_swap_substitution(
        &mut self,
        in_player: Player,
        out_player: Player,
        game_format: &GameFormat,
    ) {
        self.purge_buzzes_by(&out_player, game_format.neg_value);
        debug!(in_player = %in_player, out_player = %out_player, "substitution");
        self.subs.push(SubstitutionEvent {
            in_player,
            out_player,
        });
        self.notify(CycleChange::PlayersSwapped);
    }

    /// Withdraw a player's join.
    pub fn remove_player_joins(&mut self, player: &Player) {
        let before = self.player_joins.len();
        self.player_joins.retain(|join| join.in_player != *player);
        if self.player_joins.len() != before {
            self.notify(CycleChange::PlayerJoinRemoved);
        }
    }

    /// Withdraw a player's leave.
    pub fn remove_player_leaves(&mut self, player: &Player) {
        let before = self.player_leaves.len();
        self.player_leaves.retain(|leave| leave.out_player != *player);
        if self.player_leaves.len() != before {
            self.notify(CycleChange::PlayerLeaveRemoved);
        }
    }

    /// Withdraw a substitution.
    pub fn remove_substitution(&mut self, in_player: &Player, out_player: &Player) {
        let before = self.subs.len();
        self.subs
            .retain(|sub| !(sub.in_player == *in_player && sub.out_player == *out_player));
        if self.subs.len() != before {
            self.notify(CycleChange::SubstitutionRemoved);
        }
    }

    /// Drop every buzz the player owns in this cycle.
    ///
    /// Used when a player is no longer on the floor for this cycle because
    /// of a roster change recorded in an earlier one.
    pub fn purge_player(&mut self, player: &Player, game_format: &GameFormat) {
        if self.purge_buzzes_by(player, game_format.neg_value) {
            self.notify(CycleChange::PlayerPurged);
        }
    }

    fn purge_buzzes_by(&mut self, player: &Player, neg_value: i32) -> bool {
        let owns_correct = self
            .correct_buzz
            .as_ref()
            .is_some_and(|buzz| buzz.marker.player == *player);
        if owns_correct {
            self.clear_correct_buzz();
        }

        let owns_wrong = self
            .wrong_buzzes
            .iter()
            .any(|buzz| buzz.marker.player == *player);
        if owns_wrong {
            self.remove_team_wrong_buzz(&player.team_name, neg_value);
        }

        owns_correct || owns_wrong
    }

    /// Remove every event that references the player.
    pub fn remove_player_events(&mut self, player: &Player, game_format: &GameFormat) {
        let purged = self.purge_buzzes_by(player, game_format.neg_value);
        let before = self
            .player_joins
            .len()
            .saturating_add(self.player_leaves.len())
            .saturating_add(self.subs.len());

        self.player_joins.retain(|join| join.in_player != *player);
        self.player_leaves.retain(|leave| leave.out_player != *player);
        self.subs
            .retain(|sub| sub.in_player != *player && sub.out_player != *player);

        let after = self
            .player_joins
            .len()
            .saturating_add(self.player_leaves.len())
            .saturating_add(self.subs.len());
        if purged || after != before {
            self.notify(CycleChange::PlayerRemoved);
        }
    }

    /// Rewrite every reference to `player` to use `new_name`.
    pub fn rename_player(&mut self, player: &Player, new_name: &str) {
        let mut renamed = false;
        let mut rename = |candidate: &mut Player| {
            if *candidate == *player {
                new_name.clone_into(&mut candidate.name);
                renamed = true;
            }
        };

        if let Some(buzz) = self.correct_buzz.as_mut() {
            rename(&mut buzz.marker.player);
        }
        for buzz in &mut self.wrong_buzzes {
            rename(&mut buzz.marker.player);
        }
        for join in &mut self.player_joins {
            rename(&mut join.in_player);
        }
        for leave in &mut self.player_leaves {
            rename(&mut leave.out_player);
        }
        for sub in &mut self.subs {
            rename(&mut sub.in_player);
            rename(&mut sub.out_player);
        }

        if renamed {
            self.notify(CycleChange::PlayerRenamed);
        }
    }

    // -----------------------------------------------------------------------
    // Thrown-out questions
    // -----------------------------------------------------------------------

    /// Throw out a tossup.
    ///
    /// A correct answer cannot stand on a voided question, so the correct
    /// buzz and its bonus are withdrawn. Wrong buzzes and tossup protests on
    /// the voided tossup go with it.
    pub fn add_thrown_out_tossup(&mut self, tossup_index: usize) {
        self.thrown_out_tossups.push(ThrownOutQuestionEvent {
            question_index: tossup_index,
        });
        self.clear_correct_buzz();
        self.wrong_buzzes
            .retain(|buzz| buzz.tossup_index != tossup_index);
        self.tossup_protests
            .retain(|protest| protest.question_index != tossup_index);

        debug!(tossup_index, "tossup thrown out");
        self.notify(CycleChange::TossupThrownOut);
    }

    /// Withdraw a tossup throw-out.
    ///
    /// Buzzes and protests recorded on replacement tossups (later packet
    /// indexes) are dropped, since the restored tossup is read again.
    pub fn remove_thrown_out_tossup(&mut self, tossup_index: usize) {
        let Some(slot) = self
            .thrown_out_tossups
            .iter()
            .position(|event| event.question_index == tossup_index)
        else {
            debug!(tossup_index, "tossup was not thrown out");
            return;
        };
        self.thrown_out_tossups.remove(slot);

        if self
            .correct_buzz
            .as_ref()
            .is_some_and(|buzz| buzz.tossup_index > tossup_index)
        {
            self.clear_correct_buzz();
        }
        self.wrong_buzzes
            .retain(|buzz| buzz.tossup_index <= tossup_index);
        self.tossup_protests
            .retain(|protest| protest.question_index <= tossup_index);

        debug!(tossup_index, "tossup restored");
        self.notify(CycleChange::TossupRestored);
    }

    /// Throw out a bonus.
    ///
    /// A bonus answer in progress moves to the next bonus with every part
    /// reset. `replacement_parts_count` is the part count of that next bonus,
    /// or `None` when the packet has no bonus left, in which case the bonus
    /// answer is dropped.
    pub fn add_thrown_out_bonus(
        &mut self,
        bonus_index: usize,
        replacement_parts_count: Option<usize>,
    ) {
        self.thrown_out_bonuses.push(ThrownOutQuestionEvent {
            question_index: bonus_index,
        });
        self.bonus_protests.clear();

        if let Some(answer) = self.bonus_answer.take() {
            self.bonus_answer = replacement_parts_count.map(|parts_count| {
                BonusAnswerEvent::new(
                    bonus_index.saturating_add(1),
                    answer.receiving_team_name,
                    parts_count,
                )
            });
        }

        debug!(bonus_index, "bonus thrown out");
        self.notify(CycleChange::BonusThrownOut);
    }

    /// Withdraw a bonus throw-out.
    ///
    /// If a correct buzz stands, its bonus answer points back at the
    /// restored bonus with `parts_count` blank parts.
    pub fn remove_thrown_out_bonus(&mut self, bonus_index: usize, parts_count: usize) {
        let Some(slot) = self
            .thrown_out_bonuses
            .iter()
            .position(|event| event.question_index == bonus_index)
        else {
            debug!(bonus_index, "bonus was not thrown out");
            return;
        };
        self.thrown_out_bonuses.remove(slot);
        self.bonus_protests.clear();

        self.bonus_answer = self.correct_buzz.as_ref().map(|buzz| {
            BonusAnswerEvent::new(bonus_index, buzz.marker.player.team_name.clone(), parts_count)
        });

        debug!(bonus_index, "bonus restored");
        self.notify(CycleChange::BonusRestored);
    }
}
