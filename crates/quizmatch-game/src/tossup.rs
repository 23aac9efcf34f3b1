//! Word model and point schedule for tossups.
//!
//! Buzz positions are indexes into a tossup's buzzable words: its
//! whitespace-separated tokens, minus pronunciation guides and power marker
//! tokens. A power's boundary is the number of buzzable words before its
//! marker; a correct buzz strictly before the boundary earns the power.

use quizmatch_types::{BASE_TOSSUP_POINTS, GameFormat, Tossup};

/// The buzzable shape of one tossup under a format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TossupWords {
    word_count: usize,
    /// `(boundary, points)` per power found in the text, highest value first.
    power_boundaries: Vec<(usize, i32)>,
}

impl TossupWords {
    /// Split a tossup's text into buzzable words.
    pub fn analyze(tossup: &Tossup, game_format: &GameFormat) -> Self {
        let guide = game_format
            .pronunciation_guide_markers
            .as_ref()
            .filter(|(open, close)| !open.is_empty() && !close.is_empty());

        let mut boundaries: Vec<Option<usize>> = vec![None; game_format.powers.len()];
        let mut word_count: usize = 0;
        let mut in_guide = false;

        for token in tossup.question.split_whitespace() {
            if in_guide {
                if guide.is_some_and(|(_, close)| token.contains(close.as_str())) {
                    in_guide = false;
                }
                continue;
            }

            if let Some((open, close)) = guide {
                if let Some(rest) = token.strip_prefix(open.as_str()) {
                    in_guide = !rest.contains(close.as_str());
                    continue;
                }
            }

            let power = game_format
                .powers
                .iter()
                .position(|power| !power.marker.is_empty() && token.contains(power.marker.as_str()));
            let Some(power_index) = power else {
                word_count = word_count.saturating_add(1);
                continue;
            };

            let Some(marker) = game_format.powers.get(power_index).map(|p| p.marker.as_str()) else {
                continue;
            };
            let has_word = !token.replacen(marker, "", 1).trim().is_empty();
            let marker_first = token.starts_with(marker);

            if has_word && !marker_first {
                word_count = word_count.saturating_add(1);
            }
            if let Some(slot) = boundaries.get_mut(power_index) {
                slot.get_or_insert(word_count);
            }
            if has_word && marker_first {
                word_count = word_count.saturating_add(1);
            }
        }

        let power_boundaries = game_format
            .powers
            .iter()
            .zip(boundaries)
            .filter_map(|(power, boundary)| boundary.map(|b| (b, power.points)))
            .collect();

        Self {
            word_count,
            power_boundaries,
        }
    }

    /// Number of buzzable words.
    pub const fn word_count(&self) -> usize {
        self.word_count
    }

    /// Return whether `position` is the final buzzable word (or past it).
    pub const fn is_last_word(&self, position: usize) -> bool {
        self.word_count > 0 && position.saturating_add(1) >= self.word_count
    }

    /// Points for a correct buzz at `position`.
    pub fn correct_points(&self, position: usize) -> i32 {
        self.power_boundaries
            .iter()
            .find(|(boundary, _)| position < *boundary)
            .map_or(BASE_TOSSUP_POINTS, |(_, points)| *points)
    }

    /// Points for a wrong buzz at `position`, before the neg rule picks
    /// which wrong buzz in the cycle actually carries a penalty.
    pub const fn wrong_points(&self, position: usize, neg_value: i32) -> i32 {
        if self.is_last_word(position) { 0 } else { neg_value }
    }
}

/// Points for a correct buzz on `tossup` at `position`, or the base value
/// when the tossup is not in the packet.
pub fn correct_buzz_points(tossup: Option<&Tossup>, position: usize, game_format: &GameFormat) -> i32 {
    tossup.map_or(BASE_TOSSUP_POINTS, |tossup| {
        TossupWords::analyze(tossup, game_format).correct_points(position)
    })
}

#[cfg(test)]
mod tests {
    use quizmatch_types::PowerMarker;

    use super::*;

    fn words(question: &str, format: &GameFormat) -> TossupWords {
        TossupWords::analyze(&Tossup::new(question, "answer"), format)
    }

    #[test]
    fn plain_tossup_has_base_value() {
        let analysis = words("first q", &GameFormat::acf());
        assert_eq!(analysis.word_count(), 2);
        assert_eq!(analysis.correct_points(0), 10);
        assert!(analysis.is_last_word(1));
        assert!(!analysis.is_last_word(0));
    }

    #[test]
    fn standalone_power_marker_is_not_a_word() {
        let format = GameFormat::standard_powers();
        let analysis = words("one two (*) three four", &format);
        assert_eq!(analysis.word_count(), 4);
        assert_eq!(analysis.correct_points(1), 15);
        assert_eq!(analysis.correct_points(2), 10);
    }

    #[test]
    fn attached_power_marker_includes_its_word() {
        let format = GameFormat::standard_powers();
        let analysis = words("one two(*) three", &format);
        assert_eq!(analysis.word_count(), 3);
        assert_eq!(analysis.correct_points(1), 15);
        assert_eq!(analysis.correct_points(2), 10);
    }

    #[test]
    fn superpower_checked_before_power() {
        let format = GameFormat {
            powers: vec![
                PowerMarker { marker: "(+)".to_owned(), points: 20 },
                PowerMarker { marker: "(*)".to_owned(), points: 15 },
            ],
            ..GameFormat::acf()
        };
        let analysis = words("a (+) b (*) c", &format);
        assert_eq!(analysis.correct_points(0), 20);
        assert_eq!(analysis.correct_points(1), 15);
        assert_eq!(analysis.correct_points(2), 10);
    }

    #[test]
    fn pronunciation_guides_are_skipped() {
        let analysis = words(r#"This leader ("VER-sin-JET-uh-rix") fought Caesar"#, &GameFormat::acf());
        assert_eq!(analysis.word_count(), 4);

        let single = words(r#"Name ("NAYM") here"#, &GameFormat::acf());
        assert_eq!(single.word_count(), 2);
    }

    #[test]
    fn wrong_points_on_last_word_are_zero() {
        let analysis = words("a b c", &GameFormat::acf());
        assert_eq!(analysis.wrong_points(1, -5), -5);
        assert_eq!(analysis.wrong_points(2, -5), 0);
    }

    #[test]
    fn missing_tossup_uses_base_value() {
        assert_eq!(correct_buzz_points(None, 0, &GameFormat::pace()), 10);
    }
}
