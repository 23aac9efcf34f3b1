//! Box score reporter for saved quizmatch games.
//!
//! Reads a saved match document, upgrades it to the current shape, and
//! logs the match cycle by cycle along with the final score and whether
//! any unresolved protests could still change the result.
//!
//! ```text
//! quizmatch <saved-game.json> [game-format.yaml]
//! ```
//!
//! A format file, when given, replaces the format stored in the document.
//! Set `RUST_LOG=debug` to see every upgrade repair and scoring step.

mod error;

use std::path::{Path, PathBuf};

use clap::Parser;
use quizmatch_game::{GameState, load_game_json, parse_game_format};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "quizmatch", version, about = "Box score reporter for saved quizmatch games")]
struct Args {
    /// Saved match document (JSON, any supported version).
    saved_game: PathBuf,
    /// Game format (YAML) replacing the one stored in the document.
    game_format: Option<PathBuf>,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if an input file cannot be read, upgraded, or parsed.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let game = load_game(&args.saved_game, args.game_format.as_deref())?;
    report(&game);
    Ok(())
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_game(saved_path: &Path, format_path: Option<&Path>) -> Result<GameState, CliError> {
    let saved = load_game_json(&read(saved_path)?)?;
    info!(
        path = %saved_path.display(),
        version = saved.version,
        cycles = saved.cycles.len(),
        players = saved.players.len(),
        "Saved game loaded"
    );

    let mut game = saved.into_game_state();
    if let Some(format_path) = format_path {
        let format = parse_game_format(&read(format_path)?)?;
        info!(format = %format.display_name, "Game format overridden");
        game.set_game_format(format);
    }
    Ok(game)
}

fn report(game: &GameState) {
    let teams = game.team_names();
    let scores = game.scores();

    for (cycle_index, (cycle, totals)) in game.playable_cycles().iter().zip(&scores).enumerate() {
        let buzzer = cycle
            .correct_buzz()
            .map_or_else(|| "-".to_owned(), |buzz| buzz.marker.player.to_string());
        info!(
            cycle = cycle_index.saturating_add(1),
            tossup = game.get_tossup_index(cycle_index).saturating_add(1),
            overtime = game.is_overtime(cycle_index),
            correct = %buzzer,
            wrong = cycle.wrong_buzzes().len(),
            totals = ?totals,
            "Cycle"
        );
    }

    for (team, total) in teams.iter().zip(game.final_score()) {
        info!(team = %team, total, "Final score");
    }

    let swings = game.protest_swings();
    if game.protests_matter() {
        warn!(protests = swings.len(), "Unresolved protests could change the result");
    } else if !swings.is_empty() {
        info!(protests = swings.len(), "Unresolved protests cannot change the result");
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn arguments_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn format_path_is_optional() {
        let args = Args::try_parse_from(["quizmatch", "game.json"]);
        assert!(matches!(args, Ok(ref a) if a.game_format.is_none()));

        let args = Args::try_parse_from(["quizmatch", "game.json", "acf.yaml"]);
        assert!(matches!(
            args,
            Ok(ref a) if a.saved_game == Path::new("game.json")
                && a.game_format.as_deref() == Some(Path::new("acf.yaml"))
        ));
    }

    #[test]
    fn extra_arguments_are_rejected() {
        assert!(Args::try_parse_from(["quizmatch"]).is_err());
        assert!(Args::try_parse_from(["quizmatch", "a.json", "b.yaml", "c"]).is_err());
    }
}
