//! Error types for the `quizmatch` binary.

use std::path::PathBuf;

/// Top-level error for the `quizmatch` binary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// An input file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The saved game could not be upgraded.
    #[error("saved game error: {source}")]
    Upgrade {
        /// The underlying upgrade error.
        #[from]
        source: quizmatch_game::UpgradeError,
    },

    /// The game format file was rejected.
    #[error("game format error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: quizmatch_game::ConfigError,
    },
}
