#![doc = "repo-tour-core: repository-introspection pipeline for repo-tour."]

//! This crate holds the transport-free core of repo-tour: bounded tree traversal,
//! file classification, statistics, prompt assembly, response extraction and report
//! formatting, plus the pipeline that strings them together.
//!
//! # Usage
//! Implement [`contract::RepositoryReader`] and [`contract::TextGenerator`] (or use the
//! exported mocks) and call [`tour::generate_summary`] or [`tour::generate_tour`].

pub mod classify;
pub mod config;
pub mod contract;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod prompt;
pub mod report;
pub mod stats;
pub mod tour;

pub use contract::{EntryKind, RemoteEntry, RepoId, RepositoryReader, TextGenerator, TreeEntry};
pub use error::{ExtractError, ReadError, TourError};
pub use prompt::RequestMode;
