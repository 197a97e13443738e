use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the simulation core, configuration and trajectory I/O.
///
/// Every failure aborts the operation that raised it; there is no partial
/// recovery inside a run.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter (bad particle count, bounds, quantum, mass...).
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Arithmetic failure while resolving a collision (zero mass sum, non-finite result).
    #[error("numerical error: {0}")]
    MathError(String),

    /// Wall identifier outside the four known walls (1..=4).
    #[error("invalid wall identifier {0}; expected 1 (top), 2 (right), 3 (bottom) or 4 (left)")]
    InvalidWall(u32),

    /// Configuration file that could not be parsed.
    #[error("failed to parse config file '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Trajectory encoding or decoding failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Propagated I/O errors (config and trajectory files).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_informative() {
        let e = Error::InvalidParam("quantum must be > 0".to_string());
        let msg = format!("{e}");
        assert!(msg.contains("invalid parameter"));
        assert!(msg.contains("quantum"));
    }

    #[test]
    fn invalid_wall_names_the_id() {
        let msg = Error::InvalidWall(7).to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains("top"));
    }

    #[test]
    fn config_error_mentions_path() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let e = Error::Config {
            path: PathBuf::from("/tmp/run.json"),
            source,
        };
        assert!(e.to_string().contains("/tmp/run.json"));
    }
}
