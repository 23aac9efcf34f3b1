//! Invariant verification for cycles built outside the mutation API.
//!
//! Cycles mutated only through [`Cycle`]'s methods always pass. This check
//! exists for documents that were deserialized or upgraded from an older
//! persisted shape, where a violation means the upgrade or the caller has a
//! logic bug.

use std::collections::BTreeSet;

use crate::{Cycle, CycleError};

/// Return the first invariant the cycle violates, if any.
///
/// # Errors
///
/// Returns the [`CycleError`] describing the violation.
pub fn validate(cycle: &Cycle) -> Result<(), CycleError> {
    check_wrong_buzz_order(cycle)?;
    check_buzz_ownership(cycle)?;
    check_neg_placement(cycle)?;
    check_bonus(cycle)
}

fn check_wrong_buzz_order(cycle: &Cycle) -> Result<(), CycleError> {
    for (index, pair) in cycle.wrong_buzzes().windows(2).enumerate() {
        if let [earlier, later] = pair {
            if later.marker.position < earlier.marker.position {
                return Err(CycleError::WrongBuzzesOutOfOrder {
                    index: index.saturating_add(1),
                    position: later.marker.position,
                });
            }
        }
    }

    if let Some(correct) = cycle.correct_buzz() {
        let correct_position = correct.marker.position;
        if let Some(late) = cycle
            .wrong_buzzes()
            .iter()
            .find(|buzz| buzz.marker.position > correct_position)
        {
            return Err(CycleError::WrongBuzzAfterCorrect {
                wrong_position: late.marker.position,
                correct_position,
            });
        }
    }

    Ok(())
}

fn check_buzz_ownership(cycle: &Cycle) -> Result<(), CycleError> {
    let mut teams: BTreeSet<&str> = BTreeSet::new();
    let owners = cycle
        .wrong_buzzes()
        .iter()
        .map(|buzz| &buzz.marker)
        .chain(cycle.correct_buzz().map(|buzz| &buzz.marker));

    for marker in owners {
        if !teams.insert(marker.team_name()) {
            return Err(CycleError::DuplicateTeamBuzz {
                team_name: marker.team_name().to_owned(),
            });
        }
    }
    Ok(())
}

fn check_neg_placement(cycle: &Cycle) -> Result<(), CycleError> {
    let first_position = cycle
        .first_wrong_buzz()
        .filter(|buzz| !buzz.marker.is_last_word)
        .map(|buzz| buzz.marker.position);

    let mut neg_seen = false;
    for buzz in cycle.wrong_buzzes() {
        if buzz.marker.points == 0 {
            continue;
        }
        let allowed = !neg_seen && Some(buzz.marker.position) == first_position;
        if !allowed {
            return Err(CycleError::MisplacedNeg {
                position: buzz.marker.position,
                points: buzz.marker.points,
            });
        }
        neg_seen = true;
    }
    Ok(())
}

fn check_bonus(cycle: &Cycle) -> Result<(), CycleError> {
    match (cycle.correct_buzz(), cycle.bonus_answer()) {
        (None, Some(answer)) => {
            return Err(CycleError::OrphanBonusAnswer {
                bonus_index: answer.bonus_index,
            });
        }
        (Some(buzz), Some(answer)) if buzz.marker.team_name() != answer.receiving_team_name => {
            return Err(CycleError::BonusTeamMismatch {
                receiving_team_name: answer.receiving_team_name.clone(),
                buzzing_team_name: buzz.marker.team_name().to_owned(),
            });
        }
        _ => {}
    }

    match (cycle.correct_buzz(), cycle.bonus_protests().first()) {
        (None, Some(protest)) => Err(CycleError::OrphanBonusProtest {
            part_index: protest.part_index,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use quizmatch_types::{BuzzMarker, GameFormat, Player};

    use super::*;

    fn parse(json: &str) -> Option<Cycle> {
        serde_json::from_str(json).ok()
    }

    const ALPHA: &str = r#"{"name":"Alice","teamName":"Alpha","isStarter":true}"#;
    const BETA: &str = r#"{"name":"Bob","teamName":"Beta","isStarter":true}"#;

    #[test]
    fn api_built_cycle_is_valid() {
        let format = GameFormat::acf();
        let mut cycle = Cycle::new();
        cycle.add_wrong_buzz(BuzzMarker::new(Player::new("Bob", "Beta", true), 2, 0), 0, &format);
        cycle.add_correct_buzz(
            BuzzMarker::new(Player::new("Alice", "Alpha", true), 5, 10),
            0,
            &format,
            Some(0),
            None,
        );
        assert_eq!(validate(&cycle), Ok(()));
    }

    #[test]
    fn unsorted_wrong_buzzes_rejected() {
        let json = format!(
            r#"{{"wrongBuzzes":[
                {{"tossupIndex":0,"marker":{{"player":{ALPHA},"position":6,"points":0}}}},
                {{"tossupIndex":0,"marker":{{"player":{BETA},"position":2,"points":0}}}}
            ]}}"#
        );
        let cycle = parse(&json);
        assert!(cycle.is_some());
        if let Some(cycle) = cycle {
            assert!(matches!(
                validate(&cycle),
                Err(CycleError::WrongBuzzesOutOfOrder { index: 1, position: 2 })
            ));
        }
    }

    #[test]
    fn second_neg_rejected() {
        let json = format!(
            r#"{{"wrongBuzzes":[
                {{"tossupIndex":0,"marker":{{"player":{ALPHA},"position":2,"points":-5}}}},
                {{"tossupIndex":0,"marker":{{"player":{BETA},"position":6,"points":-5}}}}
            ]}}"#
        );
        let cycle = parse(&json);
        assert!(matches!(
            cycle.as_ref().map(validate),
            Some(Err(CycleError::MisplacedNeg { position: 6, .. }))
        ));
    }

    #[test]
    fn orphan_bonus_answer_rejected() {
        let json = r#"{"bonusAnswer":{"bonusIndex":0,"receivingTeamName":"Alpha","parts":[]}}"#;
        let cycle = parse(json);
        assert!(matches!(
            cycle.as_ref().map(validate),
            Some(Err(CycleError::OrphanBonusAnswer { bonus_index: 0 }))
        ));
    }

    #[test]
    fn duplicate_team_buzz_rejected() {
        let json = format!(
            r#"{{"correctBuzz":{{"tossupIndex":0,"marker":{{"player":{ALPHA},"position":6,"points":10}}}},
                "wrongBuzzes":[{{"tossupIndex":0,"marker":{{"player":{ALPHA},"position":2,"points":0}}}}]}}"#
        );
        let cycle = parse(&json);
        assert!(matches!(
            cycle.as_ref().map(validate),
            Some(Err(CycleError::DuplicateTeamBuzz { .. }))
        ));
    }
}
