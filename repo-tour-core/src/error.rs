//! Error taxonomy for the introspection pipeline.
//!
//! Every failure that reaches a caller is one of the [`TourError`] kinds, so the
//! CLI can map each kind to its own message. Collaborator errors are narrower:
//! [`ReadError`] for repository reads, a boxed error for text generation.

use std::time::Duration;

/// Failure reported by a [`crate::contract::RepositoryReader`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("request timed out after {0:?}")]
    TimedOut(Duration),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Both attempts of [`crate::extract::extract`] failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// Direct parse failed and the text has no `{` followed later by `}`.
    #[error("could not extract JSON from response: {direct}; no object delimiters found")]
    NoObjectDelimiters { direct: String },
    /// Direct parse failed and the brace-delimited slice did not parse either.
    #[error("could not extract JSON from response: {direct}; embedded object invalid: {slice}")]
    SliceInvalid { direct: String, slice: String },
}

#[derive(Debug, thiserror::Error)]
pub enum TourError {
    #[error("invalid repository identifier '{0}': expected the form 'owner/repo'")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Access(String),
    #[error(transparent)]
    Parse(#[from] ExtractError),
    #[error("generation failed: {0}")]
    Upstream(String),
}
