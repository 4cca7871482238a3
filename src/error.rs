// src/error.rs
//! Error taxonomy shared by the context store and the external collaborators.
//!
//! `is_storage` and `is_upstream` never hold for the same error.

use std::path::PathBuf;
use thiserror::Error;

pub type PitchResult<T> = std::result::Result<T, PitchError>;

#[derive(Debug, Error)]
pub enum PitchError {
    #[error("A company context named '{0}' already exists")]
    DuplicateName(String),

    #[error("No company context named '{0}'")]
    NotFound(String),

    #[error("Invalid company context: {0}")]
    Validation(String),

    #[error("Storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt context record {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("{service} request failed{}: {message}", status_suffix(.status))]
    Upstream {
        service: &'static str,
        status: Option<u16>,
        message: String,
    },

    #[error("Could not extract text from document: {0}")]
    Extraction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Daily usage limit reached ({0} requests). Try again tomorrow.")]
    UsageLimit(u32),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl PitchError {
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PitchError::Storage {
            path: path.into(),
            source,
        }
    }

    pub fn upstream(service: &'static str, status: Option<u16>, message: impl Into<String>) -> Self {
        PitchError::Upstream {
            service,
            status,
            message: message.into(),
        }
    }

    /// Stable machine-readable code used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            PitchError::DuplicateName(_) => "DUPLICATE_NAME",
            PitchError::NotFound(_) => "NOT_FOUND",
            PitchError::Validation(_) => "VALIDATION_ERROR",
            PitchError::Storage { .. } => "STORAGE_ERROR",
            PitchError::Corrupt { .. } => "CORRUPT_RECORD",
            PitchError::Upstream { .. } => "UPSTREAM_ERROR",
            PitchError::Extraction(_) => "EXTRACTION_ERROR",
            PitchError::Config(_) => "CONFIG_ERROR",
            PitchError::UsageLimit(_) => "USAGE_LIMIT",
        }
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, PitchError::Upstream { .. })
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, PitchError::Storage { .. } | PitchError::Corrupt { .. })
    }
}
