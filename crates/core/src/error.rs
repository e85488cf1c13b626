use thiserror::Error;

/// Errors raised while turning configuration text into maintenance definitions.
///
/// All of these are fatal: they surface before the orchestrator is built.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid matcher '{input}': {reason}")]
    Matcher { input: String, reason: String },

    #[error("invalid schedule '{expression}': {reason}")]
    Schedule { expression: String, reason: String },

    #[error("invalid duration '{input}': {reason}")]
    Duration { input: String, reason: String },

    #[error("duplicate maintenance {0}: identical matchers, schedule and duration")]
    Duplicate(String),
}
