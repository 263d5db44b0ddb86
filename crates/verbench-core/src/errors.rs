//! Error types for loading inputs and parsing judge output.
//!
//! Evaluation itself never fails; these only surface while reading tasks,
//! configuration and reference snapshots, or as data inside judge outcomes.

use std::path::PathBuf;

/// Task file errors.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Task file could not be read.
    #[error("failed to read task {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Task file is not a valid task document.
    #[error("failed to parse task {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Task parsed but violates a structural rule.
    #[error("invalid task {id}: {reason}")]
    Invalid { id: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Config declares a schema version this build does not understand.
    #[error("unsupported config version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Version-surface reference errors.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    /// A directory is configured for the library but holds no snapshot for the version.
    #[error("no reference for {library}@{version} at {path}")]
    NotFound {
        library: String,
        version: String,
        path: PathBuf,
    },

    #[error("failed to read reference {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse reference {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Why a judge response could not be turned into criterion verdicts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JudgeParseError {
    /// No JSON array or criterion object anywhere in the text.
    #[error("judge response contains no JSON")]
    NotJson,

    /// JSON was found but yielded no usable criterion entries.
    #[error("judge response contains no criteria")]
    NoCriteria,
}
