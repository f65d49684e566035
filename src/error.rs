//! Error types shared across the corpus, prompt, generation and session layers.

use std::fmt;

/// Failures from the search collaborator or the corpus cache in front of it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CorpusError {
    #[error("corpus unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("paper limit must be a positive integer, got {limit}")]
    InvalidLimit { limit: usize },
}

/// Template wiring errors. These indicate a programming mistake, not bad user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unknown template '{id}'")]
    UnknownTemplate { id: String },

    #[error("template '{template}' is missing a binding for '{name}'")]
    MissingPlaceholder { template: String, name: String },

    #[error("template '{template}' has no placeholder named '{name}'")]
    UnexpectedPlaceholder { template: String, name: String },
}

/// What went wrong when the generation collaborator could not answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Auth,
    RateLimited,
    Transport,
    Malformed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Auth => write!(f, "authentication failed"),
            FailureKind::RateLimited => write!(f, "rate limited"),
            FailureKind::Transport => write!(f, "transport error"),
            FailureKind::Malformed => write!(f, "malformed request"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("generation unavailable ({kind}): {message}")]
    Unavailable { kind: FailureKind, message: String },

    #[error("generation timed out after {secs}s")]
    Timeout { secs: u64 },
}

impl GenerationError {
    pub fn unavailable(kind: FailureKind, message: impl Into<String>) -> Self {
        GenerationError::Unavailable {
            kind,
            message: message.into(),
        }
    }

    /// Maps a non-success HTTP status from a provider onto a failure kind.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let kind = match status.as_u16() {
            401 | 403 => FailureKind::Auth,
            429 => FailureKind::RateLimited,
            400 | 422 => FailureKind::Malformed,
            _ => FailureKind::Transport,
        };
        Self::unavailable(kind, format!("API error ({}): {}", status, body))
    }
}

/// Errors that halt a whole user action.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("no research topic has been submitted yet")]
    NoTopic,

    #[error("failed to write run log: {0:#}")]
    RunLog(anyhow::Error),
}
