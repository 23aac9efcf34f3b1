//! Game format configuration.
//!
//! Formats are usually picked from the presets on
//! [`GameFormat`], but tournaments with house rules supply their own as a
//! YAML document using the same camelCase keys as the persisted shape.
//! Missing keys fall back to [`GameFormat::acf`].

use quizmatch_types::GameFormat;

/// Errors that can occur when loading a game format.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to parse YAML content.
    #[error("failed to parse game format YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The format parsed but its values are unusable.
    #[error("invalid game format: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the format.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Parse and validate a game format from a YAML string.
///
/// # Errors
///
/// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
/// [`ConfigError::Invalid`] if [`validate_game_format`] rejects it.
pub fn parse_game_format(yaml: &str) -> Result<GameFormat, ConfigError> {
    let format: GameFormat = serde_yml::from_str(yaml)?;
    validate_game_format(&format)?;
    Ok(format)
}

/// Check that a format's values can drive a match.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when regulation or the overtime minimum
/// is zero, the neg value is positive, a power marker is blank, or powers
/// are not listed highest value first.
pub fn validate_game_format(format: &GameFormat) -> Result<(), ConfigError> {
    if format.regulation_tossup_count == 0 {
        return Err(invalid("regulationTossupCount must be at least 1"));
    }
    if format.minimum_overtime_question_count == 0 {
        return Err(invalid("minimumOvertimeQuestionCount must be at least 1"));
    }
    if format.neg_value > 0 {
        return Err(ConfigError::Invalid {
            reason: format!("negValue must not be positive, got {}", format.neg_value),
        });
    }
    if format.powers.iter().any(|power| power.marker.trim().is_empty()) {
        return Err(invalid("power markers must not be blank"));
    }
    if format
        .powers
        .windows(2)
        .any(|pair| matches!(pair, [higher, lower] if lower.points > higher.points))
    {
        return Err(invalid("powers must be listed highest value first"));
    }
    Ok(())
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_format() {
        let yaml = r#"
displayName: "House rules"
negValue: -5
powers:
  - marker: "(+)"
    points: 20
  - marker: "(*)"
    points: 15
bonusesBounceBack: true
regulationTossupCount: 24
pairTossupsBonuses: false
minimumOvertimeQuestionCount: 3
overtimeIncludesBonuses: true
pronunciationGuideMarkers: ["(\"", "\")"]
"#;
        let format = parse_game_format(yaml);
        assert!(format.is_ok(), "failed to parse: {format:?}");
        let format = format.ok().unwrap_or_default();

        assert_eq!(format.display_name, "House rules");
        assert_eq!(format.powers.len(), 2);
        assert!(format.bonuses_bounce_back);
        assert_eq!(format.regulation_tossup_count, 24);
        assert_eq!(format.minimum_overtime_question_count, 3);
    }

    #[test]
    fn parse_minimal_format() {
        let format = parse_game_format("negValue: 0\n");
        assert!(format.is_ok());
        let format = format.ok().unwrap_or_default();

        assert_eq!(format.neg_value, 0);
        // Everything else uses ACF defaults.
        assert_eq!(format.regulation_tossup_count, 20);
        assert!(format.powers.is_empty());
    }

    #[test]
    fn malformed_yaml_rejected() {
        let result = parse_game_format("negValue: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn positive_neg_rejected() {
        let result = parse_game_format("negValue: 5\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn unordered_powers_rejected() {
        let yaml = "powers:\n  - marker: \"(*)\"\n    points: 15\n  - marker: \"(+)\"\n    points: 20\n";
        assert!(matches!(parse_game_format(yaml), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn presets_are_valid() {
        for format in [GameFormat::acf(), GameFormat::pace(), GameFormat::standard_powers()] {
            assert!(validate_game_format(&format).is_ok(), "{}", format.display_name);
        }
    }
}
