//! Error types for the comment thread.

use crate::comment::CommentId;

/// Failure reported by the external dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("could not decode reply: {0}")]
    Decode(String),

    #[error("no reply within {0} ms")]
    TimedOut(u32),
}

/// Local rejections. None of these reach the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThreadError {
    #[error("an emotion must be selected before submitting")]
    MissingEmotion,

    #[error("a comment is already being submitted")]
    SubmitInFlight,

    #[error("comment {0} is already being deleted")]
    DeleteInFlight(CommentId),

    #[error("no comment with id {0}")]
    UnknownComment(CommentId),

    #[error("unknown emotion: {0}")]
    UnknownEmotion(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid thread config: {0}")]
    Parse(#[from] serde_json::Error),
}
