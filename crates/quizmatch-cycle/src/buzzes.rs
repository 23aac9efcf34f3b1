//! Buzz ordering and neg assignment.
//!
//! Wrong buzzes are kept sorted by word position. Ties keep the order the
//! buzzes were recorded in, so inserting after every equal position is
//! enough to make the list's first element the earliest recorded of the
//! earliest buzzes. Stored point values are never used as a sort key since
//! they go stale when the format changes.
//!
//! # Neg rule
//!
//! Only the earliest wrong buzz can be a neg. It receives the format's neg
//! value unless it landed on the question's last word, in which case no
//! buzz in the cycle is penalized. Every other wrong buzz scores zero.

use quizmatch_types::{BuzzMarker, WrongBuzzEvent};

/// Index at which a wrong buzz at `position` is inserted to keep the list
/// sorted, after any buzzes already recorded at the same position.
pub fn insertion_index(wrong_buzzes: &[WrongBuzzEvent], position: usize) -> usize {
    wrong_buzzes.partition_point(|buzz| buzz.marker.position <= position)
}

/// The earliest wrong buzz, preferring the first recorded among ties.
pub fn first_wrong_buzz(wrong_buzzes: &[WrongBuzzEvent]) -> Option<&WrongBuzzEvent> {
    wrong_buzzes.iter().min_by_key(|buzz| buzz.marker.position)
}

/// Rewrite every wrong buzz's points according to the neg rule.
///
/// Returns `true` if any stored value changed.
pub fn assign_neg_points(wrong_buzzes: &mut [WrongBuzzEvent], neg_value: i32) -> bool {
    let neg_index = wrong_buzzes
        .iter()
        .enumerate()
        .min_by_key(|(_, buzz)| buzz.marker.position)
        .filter(|(_, buzz)| !buzz.marker.is_last_word)
        .map(|(index, _)| index);

    let mut changed = false;
    for (index, buzz) in wrong_buzzes.iter_mut().enumerate() {
        let points = if Some(index) == neg_index { neg_value } else { 0 };
        if buzz.marker.points != points {
            buzz.marker.points = points;
            changed = true;
        }
    }
    changed
}

/// All buzz markers in chronological order: wrong buzzes by position, then
/// the correct buzz, which always ends the question.
pub fn ordered_markers<'a>(
    wrong_buzzes: &'a [WrongBuzzEvent],
    correct: Option<&'a BuzzMarker>,
) -> Vec<&'a BuzzMarker> {
    let mut markers: Vec<&BuzzMarker> = wrong_buzzes.iter().map(|buzz| &buzz.marker).collect();
    // Stable sort: equal positions keep their recorded order.
    markers.sort_by_key(|marker| marker.position);
    markers.extend(correct);
    markers
}

#[cfg(test)]
mod tests {
    use quizmatch_types::Player;

    use super::*;

    fn wrong(name: &str, team: &str, position: usize) -> WrongBuzzEvent {
        WrongBuzzEvent {
            tossup_index: 0,
            marker: BuzzMarker::new(Player::new(name, team, true), position, 0),
        }
    }

    #[test]
    fn insertion_goes_after_equal_positions() {
        let buzzes = vec![wrong("a", "A", 2), wrong("b", "B", 5)];
        assert_eq!(insertion_index(&buzzes, 1), 0);
        assert_eq!(insertion_index(&buzzes, 2), 1);
        assert_eq!(insertion_index(&buzzes, 9), 2);
    }

    #[test]
    fn first_wrong_buzz_prefers_first_recorded_tie() {
        let buzzes = vec![wrong("b", "B", 4), wrong("a", "A", 4)];
        assert_eq!(
            first_wrong_buzz(&buzzes).map(|buzz| buzz.marker.player.name.as_str()),
            Some("b")
        );
    }

    #[test]
    fn only_earliest_buzz_is_a_neg() {
        let mut buzzes = vec![wrong("a", "A", 3), wrong("b", "B", 4)];
        assert!(assign_neg_points(&mut buzzes, -5));
        let points: Vec<i32> = buzzes.iter().map(|buzz| buzz.marker.points).collect();
        assert_eq!(points, vec![-5, 0]);

        // Running again changes nothing.
        assert!(!assign_neg_points(&mut buzzes, -5));
    }

    #[test]
    fn last_word_buzz_is_never_a_neg() {
        let mut first = wrong("a", "A", 7);
        first.marker.is_last_word = true;
        let mut second = wrong("b", "B", 7);
        second.marker.is_last_word = true;
        let mut buzzes = vec![first, second];

        assign_neg_points(&mut buzzes, -5);
        assert!(buzzes.iter().all(|buzz| buzz.marker.points == 0));
    }

    #[test]
    fn ordered_markers_ignores_stale_points() {
        let mut early = wrong("a", "A", 1);
        early.marker.points = 0;
        let mut late = wrong("b", "B", 6);
        late.marker.points = -5;
        // Deliberately unsorted input.
        let buzzes = vec![late, early];
        let correct = BuzzMarker::new(Player::new("c", "A", true), 9, 10);

        let positions: Vec<usize> = ordered_markers(&buzzes, Some(&correct))
            .iter()
            .map(|marker| marker.position)
            .collect();
        assert_eq!(positions, vec![1, 6, 9]);
    }
}
