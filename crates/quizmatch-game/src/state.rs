//! The match aggregate.
//!
//! [`GameState`] owns the cycle list together with the packet, the roster,
//! and the game format. It is the only place that answers questions
//! spanning cycles: which packet question a cycle presents, who is on the
//! floor, and (in [`score`](crate::score) and [`protest`](crate::protest))
//! what the running score is. Every answer is recomputed from the cycles on
//! each call; callers that need caching memoize outside and invalidate on
//! any mutation.
//!
//! Cycle contents only change through [`Cycle`]'s own API. Cascades that
//! touch many cycles (roster departures, renames, removals) are batch
//! operations here that delegate to per-cycle primitives.

use std::collections::BTreeSet;

use quizmatch_cycle::Cycle;
use quizmatch_types::{
    BASE_TOSSUP_POINTS, Bonus, BuzzMarker, DEFAULT_BONUS_PARTS_COUNT, GameFormat, Packet, Player,
    Tossup,
};
use tracing::debug;

use crate::error::GameError;
use crate::tossup::TossupWords;

/// One match: cycles, packet, roster, and format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    cycles: Vec<Cycle>,
    packet: Packet,
    players: Vec<Player>,
    game_format: GameFormat,
    pending_new_player: Option<Player>,
}

impl GameState {
    /// Create a match with one empty cycle per packet tossup.
    pub fn new(packet: Packet, players: Vec<Player>, game_format: GameFormat) -> Self {
        let cycles = std::iter::repeat_with(Cycle::new)
            .take(packet.tossups.len())
            .collect();
        Self {
            cycles,
            packet,
            players,
            game_format,
            pending_new_player: None,
        }
    }

    /// Rebuild a match from stored parts. Cycles are taken as they are.
    pub(crate) const fn from_parts(
        cycles: Vec<Cycle>,
        packet: Packet,
        players: Vec<Player>,
        game_format: GameFormat,
    ) -> Self {
        Self {
            cycles,
            packet,
            players,
            game_format,
            pending_new_player: None,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Every cycle, in reading order.
    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    /// The cycle at `cycle_index`, if the match has one.
    pub fn cycle(&self, cycle_index: usize) -> Option<&Cycle> {
        self.cycles.get(cycle_index)
    }

    /// Mutable access to one cycle.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CycleOutOfRange`] past the end of the match.
    pub fn cycle_mut(&mut self, cycle_index: usize) -> Result<&mut Cycle, GameError> {
        let len = self.cycles.len();
        self.cycles
            .get_mut(cycle_index)
            .ok_or(GameError::CycleOutOfRange {
                index: cycle_index,
                len,
            })
    }

    /// The question packet.
    pub const fn packet(&self) -> &Packet {
        &self.packet
    }

    /// The full roster, starters flagged.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// The scoring rules.
    pub const fn game_format(&self) -> &GameFormat {
        &self.game_format
    }

    /// Replace the packet. The cycle list grows to cover every tossup but
    /// never shrinks, so recorded events are kept.
    pub fn set_packet(&mut self, packet: Packet) {
        let wanted = packet.tossups.len();
        if self.cycles.len() < wanted {
            self.cycles.resize_with(wanted, Cycle::new);
        }
        debug!(tossups = wanted, bonuses = packet.bonuses.len(), "packet replaced");
        self.packet = packet;
    }

    /// Replace the roster.
    pub fn set_players(&mut self, players: Vec<Player>) {
        self.players = players;
    }

    /// Replace the format, re-derive last-word flags from the packet text,
    /// and re-run the neg rule in every cycle.
    pub fn set_game_format(&mut self, game_format: GameFormat) {
        let packet = &self.packet;
        for cycle in &mut self.cycles {
            cycle.refresh_last_word_flags(
                |tossup_index, position| {
                    packet.tossup(tossup_index).map(|tossup| {
                        TossupWords::analyze(tossup, &game_format).is_last_word(position)
                    })
                },
                &game_format,
            );
        }
        debug!(format = %game_format.display_name, "game format replaced");
        self.game_format = game_format;
    }

    /// Team names in the order they first appear on the roster.
    pub fn team_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for player in &self.players {
            if !names.contains(&player.team_name) {
                names.push(player.team_name.clone());
            }
        }
        names
    }

    /// Every roster entry on the named team.
    pub fn players_on_team<'a>(&'a self, team_name: &'a str) -> impl Iterator<Item = &'a Player> {
        self.players
            .iter()
            .filter(move |player| player.is_on_team(team_name))
    }

    /// Return whether `cycle_index` falls after regulation.
    pub const fn is_overtime(&self, cycle_index: usize) -> bool {
        self.game_format.is_overtime(cycle_index)
    }

    /// Check every cycle against the cycle invariants.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidCycle`] for the first offending cycle.
    pub fn validate(&self) -> Result<(), GameError> {
        for (index, cycle) in self.cycles.iter().enumerate() {
            quizmatch_cycle::validate(cycle)
                .map_err(|source| GameError::InvalidCycle { index, source })?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Question indexing
    // -----------------------------------------------------------------------

    /// Packet index of the tossup read in `cycle_index`.
    ///
    /// Each tossup thrown out in this or an earlier cycle pushes the reading
    /// one tossup further into the packet. The result may be past the end
    /// of the packet once its tossups run out.
    pub fn get_tossup_index(&self, cycle_index: usize) -> usize {
        cycle_index.saturating_add(self.thrown_out_tossups_through(cycle_index))
    }

    fn thrown_out_tossups_through(&self, cycle_index: usize) -> usize {
        self.cycles
            .iter()
            .take(cycle_index.saturating_add(1))
            .map(|cycle| cycle.thrown_out_tossups().len())
            .fold(0, usize::saturating_add)
    }

    fn thrown_out_bonuses_through(&self, cycle_index: usize) -> usize {
        self.cycles
            .iter()
            .take(cycle_index.saturating_add(1))
            .map(|cycle| cycle.thrown_out_bonuses().len())
            .fold(0, usize::saturating_add)
    }

    /// Packet index of the bonus available in `cycle_index`.
    ///
    /// `None` when no bonus is played in this cycle (overtime without
    /// bonuses) or when the packet's bonuses are used up.
    ///
    /// Unpaired formats hand out bonuses in order: every earlier cycle that
    /// ended in a correct buzz with a bonus consumed one. Paired formats
    /// tie the bonus to the tossup being read. Either way each thrown-out
    /// bonus up to this cycle moves the cursor one further.
    pub fn get_bonus_index(&self, cycle_index: usize) -> Option<usize> {
        if !self.game_format.bonus_played_in(cycle_index) {
            return None;
        }

        let base = if self.game_format.pair_tossups_bonuses {
            self.get_tossup_index(cycle_index)
        } else {
            self.cycles
                .iter()
                .enumerate()
                .take(cycle_index)
                .filter(|(index, cycle)| {
                    cycle.correct_buzz().is_some() && self.game_format.bonus_played_in(*index)
                })
                .count()
        };

        let index = base.saturating_add(self.thrown_out_bonuses_through(cycle_index));
        (index < self.packet.bonuses.len()).then_some(index)
    }

    /// The tossup read in `cycle_index`, if the packet still has one.
    pub fn tossup_for_cycle(&self, cycle_index: usize) -> Option<&Tossup> {
        self.packet.tossup(self.get_tossup_index(cycle_index))
    }

    /// The bonus available in `cycle_index`, if any.
    pub fn bonus_for_cycle(&self, cycle_index: usize) -> Option<&Bonus> {
        self.get_bonus_index(cycle_index)
            .and_then(|index| self.packet.bonus(index))
    }

    /// Number of parts in a packet bonus, or 3 when the packet lacks it.
    pub fn bonus_parts_count(&self, bonus_index: usize) -> usize {
        self.packet
            .bonus(bonus_index)
            .map_or(DEFAULT_BONUS_PARTS_COUNT, Bonus::parts_count)
    }

    // -----------------------------------------------------------------------
    // Roster replay
    // -----------------------------------------------------------------------

    /// Players of `team_name` on the floor during `cycle_index`.
    ///
    /// Starts from the team's starters and replays the roster changes of
    /// cycles `0..=cycle_index`: joins add, substitutions swap, leaves
    /// remove.
    pub fn get_active_players(&self, team_name: &str, cycle_index: usize) -> BTreeSet<Player> {
        let mut active: BTreeSet<Player> = self
            .players_on_team(team_name)
            .filter(|player| player.is_starter)
            .cloned()
            .collect();

        for cycle in self.cycles.iter().take(cycle_index.saturating_add(1)) {
            for join in cycle.player_joins() {
                if join.in_player.is_on_team(team_name) {
                    active.insert(join.in_player.clone());
                }
            }
            for sub in cycle.subs() {
                if sub.out_player.is_on_team(team_name) {
                    active.remove(&sub.out_player);
                }
                if sub.in_player.is_on_team(team_name) {
                    active.insert(sub.in_player.clone());
                }
            }
            for leave in cycle.player_leaves() {
                if leave.out_player.is_on_team(team_name) {
                    active.remove(&leave.out_player);
                }
            }
        }
        active
    }

    fn is_active(&self, player: &Player, cycle_index: usize) -> bool {
        self.get_active_players(&player.team_name, cycle_index)
            .contains(player)
    }

    fn add_to_roster(&mut self, player: &Player) {
        if !self.players.contains(player) {
            debug!(player = %player, "added to roster");
            self.players.push(player.clone());
        }
    }

    /// Add a brand-new player to the roster and bring them in at
    /// `cycle_index`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CycleOutOfRange`] past the end of the match.
    pub fn add_new_player(&mut self, player: Player, cycle_index: usize) -> Result<(), GameError> {
        self.cycle_mut(cycle_index)?;
        let player = Player {
            is_starter: false,
            ..player
        };
        self.add_to_roster(&player);
        self.add_inactive_player(player, cycle_index)
    }

    /// Bring a rostered bench player in at `cycle_index`.
    ///
    /// Does nothing when the player is already on the floor, so repeating
    /// the call never records a second join.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CycleOutOfRange`] past the end of the match.
    pub fn add_inactive_player(&mut self, player: Player, cycle_index: usize) -> Result<(), GameError> {
        let already_active = self.is_active(&player, cycle_index);
        let cycle = self.cycle_mut(cycle_index)?;
        if already_active {
            debug!(player = %player, cycle_index, "player already active");
            return Ok(());
        }
        cycle.add_player_joins(player);
        Ok(())
    }

    /// Take a player off the floor from `cycle_index` on.
    ///
    /// The player's buzzes in that cycle and in every later cycle before
    /// they come back are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CycleOutOfRange`] past the end of the match.
    pub fn leave(&mut self, player: Player, cycle_index: usize) -> Result<(), GameError> {
        let format = self.game_format.clone();
        self.cycle_mut(cycle_index)?
            .add_player_leaves(player.clone(), &format);
        self.purge_until_return(&player, cycle_index);
        Ok(())
    }

    /// Swap `in_player` for `out_player` from `cycle_index` on.
    ///
    /// `in_player` joins the roster if needed. `out_player`'s buzzes are
    /// dropped the same way as for [`leave`](Self::leave).
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CycleOutOfRange`] past the end of the match.
    pub fn substitute(
        &mut self,
        in_player: Player,
        out_player: Player,
        cycle_index: usize,
    ) -> Result<(), GameError> {
        let format = self.game_format.clone();
        self.cycle_mut(cycle_index)?
            .add_swap_substitution(in_player.clone(), out_player.clone(), &format);
        self.add_to_roster(&in_player);
        self.purge_until_return(&out_player, cycle_index);
        Ok(())
    }

    fn purge_until_return(&mut self, player: &Player, cycle_index: usize) {
        let format = &self.game_format;
        for cycle in self.cycles.iter_mut().skip(cycle_index.saturating_add(1)) {
            let returns = cycle.player_joins().iter().any(|join| join.in_player == *player)
                || cycle.subs().iter().any(|sub| sub.in_player == *player);
            if returns {
                break;
            }
            cycle.purge_player(player, format);
        }
    }

    /// Rename a rostered player everywhere they appear.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::PlayerNotFound`] if the player is not on the
    /// roster, or [`GameError::DuplicatePlayer`] if a teammate already uses
    /// `new_name`.
    pub fn rename_player(&mut self, player: &Player, new_name: &str) -> Result<(), GameError> {
        let taken = self
            .players_on_team(&player.team_name)
            .any(|other| other != player && other.name == new_name);
        if taken {
            return Err(GameError::DuplicatePlayer {
                name: new_name.to_owned(),
                team_name: player.team_name.clone(),
            });
        }

        let entry = self
            .players
            .iter_mut()
            .find(|candidate| **candidate == *player)
            .ok_or_else(|| not_found(player))?;
        new_name.clone_into(&mut entry.name);

        for cycle in &mut self.cycles {
            cycle.rename_player(player, new_name);
        }
        debug!(player = %player, new_name, "player renamed");
        Ok(())
    }

    /// Remove a player from the roster along with every event naming them.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::PlayerNotFound`] if the player is not on the
    /// roster.
    pub fn remove_player(&mut self, player: &Player) -> Result<(), GameError> {
        let slot = self
            .players
            .iter()
            .position(|candidate| *candidate == *player)
            .ok_or_else(|| not_found(player))?;
        self.players.remove(slot);

        let format = &self.game_format;
        for cycle in &mut self.cycles {
            cycle.remove_player_events(player, format);
        }
        debug!(player = %player, "player removed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Pending new player
    // -----------------------------------------------------------------------

    /// Start a blank player record for `team_name`, replacing any record
    /// already in progress.
    pub fn begin_new_player(&mut self, team_name: &str) -> &mut Player {
        self.pending_new_player
            .insert(Player::new(String::new(), team_name, false))
    }

    /// The record in progress, if any.
    pub const fn pending_new_player(&self) -> Option<&Player> {
        self.pending_new_player.as_ref()
    }

    /// Edit the record in progress.
    pub const fn pending_new_player_mut(&mut self) -> Option<&mut Player> {
        self.pending_new_player.as_mut()
    }

    /// Discard the record in progress.
    pub fn cancel_new_player(&mut self) {
        self.pending_new_player = None;
    }

    /// Add the record in progress to the match at `cycle_index`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoPendingPlayer`] if no record was started, or
    /// [`GameError::CycleOutOfRange`] past the end of the match (the record
    /// is kept in that case).
    pub fn commit_new_player(&mut self, cycle_index: usize) -> Result<Player, GameError> {
        let player = self
            .pending_new_player
            .clone()
            .ok_or(GameError::NoPendingPlayer)?;
        self.add_new_player(player.clone(), cycle_index)?;
        self.pending_new_player = None;
        Ok(Player {
            is_starter: false,
            ..player
        })
    }

    // -----------------------------------------------------------------------
    // Moderator actions
    // -----------------------------------------------------------------------

    fn tossup_words(&self, cycle_index: usize) -> Option<TossupWords> {
        self.tossup_for_cycle(cycle_index)
            .map(|tossup| TossupWords::analyze(tossup, &self.game_format))
    }

    /// Record a correct buzz at `position` of the tossup read in
    /// `cycle_index`, opening the cycle's bonus when one is played.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CycleOutOfRange`] past the end of the match.
    pub fn buzz_correct(
        &mut self,
        cycle_index: usize,
        player: Player,
        position: usize,
    ) -> Result<(), GameError> {
        let tossup_index = self.get_tossup_index(cycle_index);
        let mut marker = BuzzMarker::new(player, position, BASE_TOSSUP_POINTS);
        if let Some(words) = self.tossup_words(cycle_index) {
            marker.points = words.correct_points(position);
            marker.is_last_word = words.is_last_word(position);
        }

        let bonus_index = self.get_bonus_index(cycle_index);
        let parts_count = bonus_index.map(|index| self.bonus_parts_count(index));
        let format = self.game_format.clone();
        self.cycle_mut(cycle_index)?
            .add_correct_buzz(marker, tossup_index, &format, bonus_index, parts_count);
        Ok(())
    }

    /// Record a wrong buzz at `position` of the tossup read in
    /// `cycle_index`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CycleOutOfRange`] past the end of the match.
    pub fn buzz_wrong(
        &mut self,
        cycle_index: usize,
        player: Player,
        position: usize,
    ) -> Result<(), GameError> {
        let tossup_index = self.get_tossup_index(cycle_index);
        let neg_value = self.game_format.neg_value;
        let mut marker = BuzzMarker::new(player, position, neg_value);
        if let Some(words) = self.tossup_words(cycle_index) {
            marker.points = words.wrong_points(position, neg_value);
            marker.is_last_word = words.is_last_word(position);
        }

        let format = self.game_format.clone();
        self.cycle_mut(cycle_index)?
            .add_wrong_buzz(marker, tossup_index, &format);
        Ok(())
    }

    /// Throw out the tossup currently read in `cycle_index`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CycleOutOfRange`] past the end of the match.
    pub fn throw_out_tossup(&mut self, cycle_index: usize) -> Result<(), GameError> {
        let tossup_index = self.get_tossup_index(cycle_index);
        self.cycle_mut(cycle_index)?
            .add_thrown_out_tossup(tossup_index);
        Ok(())
    }

    /// Throw out the bonus currently available in `cycle_index`.
    ///
    /// Does nothing when the cycle has no bonus.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CycleOutOfRange`] past the end of the match.
    pub fn throw_out_bonus(&mut self, cycle_index: usize) -> Result<(), GameError> {
        let Some(bonus_index) = self.get_bonus_index(cycle_index) else {
            self.cycle_mut(cycle_index)?;
            debug!(cycle_index, "no bonus to throw out");
            return Ok(());
        };
        let replacement = bonus_index.saturating_add(1);
        let replacement_parts_count = self
            .packet
            .bonus(replacement)
            .map(Bonus::parts_count);
        self.cycle_mut(cycle_index)?
            .add_thrown_out_bonus(bonus_index, replacement_parts_count);
        Ok(())
    }

    /// Credit a bonus part in `cycle_index` to `team_name`.
    ///
    /// Only the receiving team may score a part unless bonuses bounce back.
    /// An empty `team_name` clears the part.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CycleOutOfRange`] past the end of the match.
    pub fn set_bonus_part(
        &mut self,
        cycle_index: usize,
        part_index: usize,
        team_name: &str,
        points: i32,
    ) -> Result<(), GameError> {
        let bounce_back = self.game_format.bonuses_bounce_back;
        let cycle = self.cycle_mut(cycle_index)?;
        let receiving = cycle
            .bonus_answer()
            .map(|answer| answer.receiving_team_name.as_str());
        if !bounce_back && !team_name.is_empty() && receiving.is_some_and(|name| name != team_name) {
            debug!(cycle_index, part_index, team = team_name, "bounce-back not allowed");
            return Ok(());
        }
        cycle.set_bonus_part_answer(part_index, team_name, points);
        Ok(())
    }
}

fn not_found(player: &Player) -> GameError {
    GameError::PlayerNotFound {
        name: player.name.clone(),
        team_name: player.team_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use quizmatch_types::{BonusPart, PowerMarker};

    use super::*;

    fn alice() -> Player {
        Player::new("Alice", "Alpha", true)
    }

    fn bob() -> Player {
        Player::new("Bob", "Beta", true)
    }

    fn bench() -> Player {
        Player::new("Carol", "Alpha", false)
    }

    fn bonus(parts: usize) -> Bonus {
        Bonus {
            leadin: "For ten points each:".to_owned(),
            parts: (0..parts)
                .map(|_| BonusPart {
                    question: "part".to_owned(),
                    answer: "answer".to_owned(),
                    value: 10,
                })
                .collect(),
        }
    }

    fn packet(tossups: usize, bonuses: usize) -> Packet {
        Packet::new(
            (0..tossups)
                .map(|_| Tossup::new("one two three four five six", "answer"))
                .collect(),
            (0..bonuses).map(|_| bonus(3)).collect(),
        )
    }

    fn game(tossups: usize, bonuses: usize) -> GameState {
        GameState::new(
            packet(tossups, bonuses),
            vec![alice(), bench(), bob()],
            GameFormat::acf(),
        )
    }

    #[test]
    fn new_sizes_cycles_to_packet() {
        let state = game(4, 4);
        assert_eq!(state.cycles().len(), 4);
        assert_eq!(state.team_names(), vec!["Alpha".to_owned(), "Beta".to_owned()]);
    }

    #[test]
    fn set_packet_never_shrinks() {
        let mut state = game(4, 4);
        state.set_packet(packet(2, 2));
        assert_eq!(state.cycles().len(), 4);
        state.set_packet(packet(6, 6));
        assert_eq!(state.cycles().len(), 6);
    }

    #[test]
    fn moderator_actions_keep_cycles_valid() {
        let mut state = game(3, 3);
        assert!(state.buzz_wrong(0, bob(), 1).is_ok());
        assert!(state.buzz_correct(0, alice(), 4).is_ok());
        assert!(state.set_bonus_part(0, 1, "Alpha", 10).is_ok());
        assert!(state.throw_out_bonus(0).is_ok());
        assert!(state.substitute(bench(), alice(), 1).is_ok());
        assert_eq!(state.validate(), Ok(()));
    }

    #[test]
    fn cycle_mut_out_of_range() {
        let mut state = game(2, 2);
        assert!(matches!(
            state.cycle_mut(5),
            Err(GameError::CycleOutOfRange { index: 5, len: 2 })
        ));
    }

    #[test]
    fn tossup_index_skips_thrown_out() {
        let mut state = game(5, 5);
        assert!(state.throw_out_tossup(1).is_ok());
        assert_eq!(state.get_tossup_index(0), 0);
        assert_eq!(state.get_tossup_index(1), 2);
        assert_eq!(state.get_tossup_index(2), 3);

        // A second throw-out in the same cycle moves one further.
        assert!(state.throw_out_tossup(1).is_ok());
        assert_eq!(state.get_tossup_index(1), 3);
        assert_eq!(state.get_tossup_index(3), 5);
        assert!(state.tossup_for_cycle(3).is_none());
    }

    #[test]
    fn unpaired_bonus_index_follows_correct_buzzes() {
        let mut state = game(4, 2);
        assert_eq!(state.get_bonus_index(0), Some(0));
        assert!(state.buzz_correct(0, alice(), 2).is_ok());
        assert_eq!(state.get_bonus_index(0), Some(0));
        assert_eq!(state.get_bonus_index(1), Some(1));

        // Cycle 1 goes dead, so cycle 2 still offers bonus 1.
        assert_eq!(state.get_bonus_index(2), Some(1));
        assert!(state.buzz_correct(2, bob(), 2).is_ok());
        assert_eq!(state.get_bonus_index(3), None);
    }

    #[test]
    fn paired_bonus_index_follows_tossup() {
        let mut state = GameState::new(packet(4, 4), vec![alice(), bob()], GameFormat::pace());
        assert_eq!(state.get_bonus_index(2), Some(2));
        assert!(state.throw_out_tossup(1).is_ok());
        assert_eq!(state.get_bonus_index(1), Some(2));
    }

    #[test]
    fn thrown_out_bonus_moves_cursor() {
        let mut state = game(4, 4);
        assert!(state.buzz_correct(0, alice(), 2).is_ok());
        assert!(state.throw_out_bonus(0).is_ok());

        assert_eq!(state.get_bonus_index(0), Some(1));
        let answer = state.cycle(0).and_then(Cycle::bonus_answer);
        assert_eq!(answer.map(|a| a.bonus_index), Some(1));
        assert_eq!(state.get_bonus_index(1), Some(2));
    }

    #[test]
    fn no_bonus_in_overtime_by_default() {
        let format = GameFormat {
            regulation_tossup_count: 2,
            ..GameFormat::acf()
        };
        let state = GameState::new(packet(4, 4), vec![alice(), bob()], format);
        assert!(state.is_overtime(2));
        assert_eq!(state.get_bonus_index(2), None);
    }

    #[test]
    fn active_players_replay_roster_changes() {
        let mut state = game(4, 4);
        let starters = state.get_active_players("Alpha", 0);
        assert!(starters.contains(&alice()));
        assert!(!starters.contains(&bench()));

        assert!(state.substitute(bench(), alice(), 1).is_ok());
        let after_sub = state.get_active_players("Alpha", 1);
        assert!(after_sub.contains(&bench()));
        assert!(!after_sub.contains(&alice()));
        assert!(state.get_active_players("Alpha", 0).contains(&alice()));

        assert!(state.add_inactive_player(alice(), 3).is_ok());
        assert_eq!(state.get_active_players("Alpha", 3).len(), 2);
    }

    #[test]
    fn add_inactive_player_is_idempotent() {
        let mut state = game(3, 3);
        assert!(state.add_inactive_player(bench(), 1).is_ok());
        assert!(state.add_inactive_player(bench(), 1).is_ok());
        assert_eq!(state.cycle(1).map(|c| c.player_joins().len()), Some(1));
    }

    #[test]
    fn leave_purges_later_buzzes_until_return() {
        let mut state = game(5, 5);
        assert!(state.buzz_correct(1, alice(), 2).is_ok());
        assert!(state.buzz_wrong(2, alice(), 1).is_ok());
        if let Ok(cycle) = state.cycle_mut(3) {
            cycle.add_player_joins(alice());
        }
        assert!(state.buzz_correct(4, alice(), 3).is_ok());

        assert!(state.leave(alice(), 1).is_ok());

        assert!(state.cycle(1).is_some_and(|c| c.correct_buzz().is_none()));
        assert!(state.cycle(2).is_some_and(|c| c.wrong_buzzes().is_empty()));
        // Back on the floor from cycle 3, so cycle 4 is untouched.
        assert!(state.cycle(4).is_some_and(|c| c.correct_buzz().is_some()));
    }

    #[test]
    fn new_player_joins_roster_and_floor() {
        let mut state = game(3, 3);
        let dave = Player::new("Dave", "Beta", true);
        assert!(state.add_new_player(dave.clone(), 1).is_ok());

        let entry = state.players().iter().find(|p| **p == dave);
        assert_eq!(entry.map(|p| p.is_starter), Some(false));
        assert!(!state.get_active_players("Beta", 0).contains(&dave));
        assert!(state.get_active_players("Beta", 1).contains(&dave));
    }

    #[test]
    fn pending_player_flow() {
        let mut state = game(3, 3);
        assert!(matches!(
            state.commit_new_player(0),
            Err(GameError::NoPendingPlayer)
        ));

        state.begin_new_player("Beta").name = "Erin".to_owned();
        let committed = state.commit_new_player(2);
        assert_eq!(
            committed.ok().map(|p| p.name),
            Some("Erin".to_owned())
        );
        assert!(state.pending_new_player().is_none());
        assert_eq!(state.players_on_team("Beta").count(), 2);

        state.begin_new_player("Beta");
        state.cancel_new_player();
        assert!(state.pending_new_player().is_none());
    }

    #[test]
    fn rename_cascades_through_cycles() {
        let mut state = game(3, 3);
        assert!(state.buzz_correct(0, alice(), 2).is_ok());
        assert!(state.substitute(bench(), alice(), 1).is_ok());

        assert!(state.rename_player(&alice(), "Alicia").is_ok());
        let renamed = Player::new("Alicia", "Alpha", true);
        assert!(state.players().contains(&renamed));
        let buzzer = state
            .cycle(0)
            .and_then(Cycle::correct_buzz)
            .map(|buzz| buzz.marker.player.name.clone());
        assert_eq!(buzzer.as_deref(), Some("Alicia"));
        assert!(state.cycle(1).is_some_and(|c| c.subs().iter().any(|s| s.out_player == renamed)));
    }

    #[test]
    fn rename_rejects_clash_and_unknown() {
        let mut state = game(2, 2);
        assert!(matches!(
            state.rename_player(&alice(), "Carol"),
            Err(GameError::DuplicatePlayer { .. })
        ));
        assert!(matches!(
            state.rename_player(&Player::new("Zed", "Alpha", false), "Zack"),
            Err(GameError::PlayerNotFound { .. })
        ));
    }

    #[test]
    fn rename_to_own_name_is_accepted() {
        let mut state = game(2, 2);
        assert!(state.buzz_correct(0, alice(), 2).is_ok());
        assert!(state.rename_player(&alice(), "Alice").is_ok());
        assert!(state.players().contains(&alice()));
        assert!(state.cycle(0).is_some_and(|c| c.has_buzz_by(&alice())));
    }

    #[test]
    fn format_change_recomputes_last_word() {
        let tossup = Tossup::new("one two three four (\"fore\")", "answer");
        let mut state = GameState::new(
            Packet::new(vec![tossup], Vec::new()),
            vec![alice(), bob()],
            GameFormat::acf(),
        );
        assert!(state.buzz_wrong(0, bob(), 3).is_ok());
        let marker = |state: &GameState| {
            state
                .cycle(0)
                .and_then(|c| c.wrong_buzzes().first())
                .map(|buzz| (buzz.marker.is_last_word, buzz.marker.points))
        };
        assert_eq!(marker(&state), Some((true, 0)));

        state.set_game_format(GameFormat {
            pronunciation_guide_markers: None,
            ..GameFormat::acf()
        });
        assert_eq!(marker(&state), Some((false, -5)));
        assert_eq!(state.final_score(), vec![0, -5]);
    }

    #[test]
    fn remove_player_cascades() {
        let mut state = game(3, 3);
        assert!(state.buzz_wrong(0, alice(), 1).is_ok());
        assert!(state.add_inactive_player(bench(), 1).is_ok());
        assert!(state.remove_player(&bench()).is_ok());
        assert!(state.remove_player(&alice()).is_ok());

        assert!(state.cycle(0).is_some_and(|c| c.wrong_buzzes().is_empty()));
        assert!(state.cycle(1).is_some_and(|c| c.player_joins().is_empty()));
        assert_eq!(state.players().len(), 1);
    }

    #[test]
    fn buzz_points_come_from_tossup_text() {
        let format = GameFormat {
            powers: vec![PowerMarker {
                marker: "(*)".to_owned(),
                points: 15,
            }],
            ..GameFormat::acf()
        };
        let packet = Packet::new(
            vec![Tossup::new("one two (*) three four", "answer")],
            vec![bonus(3)],
        );
        let mut state = GameState::new(packet, vec![alice(), bob()], format);

        assert!(state.buzz_wrong(0, bob(), 3).is_ok());
        assert!(state.buzz_correct(0, alice(), 1).is_ok());

        let cycle = state.cycle(0);
        assert_eq!(cycle.and_then(Cycle::correct_buzz).map(|b| b.marker.points), Some(15));
        let wrong = cycle.and_then(|c| c.wrong_buzzes().first());
        // Bob's wrong buzz came later in the text than the correct buzz.
        assert!(wrong.is_none());
    }

    #[test]
    fn last_word_wrong_buzz_is_not_a_neg() {
        let mut state = game(2, 2);
        assert!(state.buzz_wrong(0, bob(), 5).is_ok());
        let wrong = state.cycle(0).and_then(|c| c.wrong_buzzes().first());
        assert_eq!(wrong.map(|b| b.marker.points), Some(0));
        assert_eq!(wrong.map(|b| b.marker.is_last_word), Some(true));
    }

    #[test]
    fn bounce_back_rules() {
        let mut state = game(2, 2);
        assert!(state.buzz_correct(0, alice(), 2).is_ok());
        assert!(state.set_bonus_part(0, 0, "Beta", 10).is_ok());
        let parts = |state: &GameState| {
            state
                .cycle(0)
                .and_then(Cycle::bonus_answer)
                .map(|a| a.points_for_team("Beta"))
        };
        assert_eq!(parts(&state), Some(0));

        let mut format = GameFormat::acf();
        format.bonuses_bounce_back = true;
        state.set_game_format(format);
        assert!(state.set_bonus_part(0, 0, "Beta", 10).is_ok());
        assert_eq!(parts(&state), Some(10));
    }
}
