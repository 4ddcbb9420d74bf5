//! Error types for Pedigree Core

use crate::horse::HorseId;
use crate::owner::OwnerId;
use thiserror::Error;

/// Result type alias using Pedigree's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Pedigree error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Horse not found: {0}")]
    HorseNotFound(HorseId),

    #[error("Owner not found: {0}")]
    OwnerNotFound(OwnerId),

    /// Every rule violation found in a single pass, in evaluation order
    #[error("{message}: {}", violations.join("; "))]
    Validation {
        message: String,
        violations: Vec<String>,
    },

    #[error("Maximum generations must be between {min} and {max}, got {value}")]
    InvalidGenerations { value: u32, min: u32, max: u32 },

    #[error("Storage error: {0}")]
    Storage(String),

    /// Persisted data contradicts itself (e.g. an edge to a deleted horse)
    #[error("Inconsistent data: {0}")]
    Inconsistent(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(message: impl Into<String>, violations: Vec<String>) -> Self {
        Self::Validation {
            message: message.into(),
            violations,
        }
    }

    /// Violation messages, empty for any other kind of error
    pub fn violations(&self) -> &[String] {
        match self {
            Self::Validation { violations, .. } => violations,
            _ => &[],
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::HorseNotFound(_) | Self::OwnerNotFound(_))
    }
}
