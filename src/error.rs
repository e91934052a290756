use std::path::PathBuf;

use thiserror::Error;

/// Problems that stop the bot from ever running a round.
#[derive(Debug, Error)]
pub enum TriviaError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("question bank has no valid questions")]
    EmptyQuestionBank,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not set")]
    Missing { name: &'static str },

    #[error("{name} must be a positive number of seconds, got `{value}`")]
    InvalidRoundDuration { name: &'static str, value: String },
}

/// A chat platform request that did not go through.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Request(#[from] teloxide::RequestError),

    #[error("{0}")]
    Other(String),
}
