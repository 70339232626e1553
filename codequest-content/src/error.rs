//! Error types for content loading

use thiserror::Error;

/// Content loading error
#[derive(Debug, Error)]
pub enum ContentError {
    /// Reading a content file failed
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// YAML content could not be parsed
    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// JSON content could not be parsed
    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Two challenges share an id
    #[error("Duplicate challenge id: {0}")]
    DuplicateChallenge(String),

    /// A rule was declared without hints
    #[error("Challenge {challenge_id} step {step}: rule {rule} has no hints")]
    MissingHints {
        challenge_id: String,
        step: usize,
        rule: usize,
    },

    /// A prerequisite points at a challenge that does not exist
    #[error("Challenge {challenge_id} requires unknown challenge {prerequisite}")]
    UnknownPrerequisite {
        challenge_id: String,
        prerequisite: String,
    },
}

/// Result type for content operations
pub type Result<T> = std::result::Result<T, ContentError>;
