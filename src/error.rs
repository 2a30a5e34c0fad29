use thiserror::Error;

use crate::domain::utils::id::ResourceUri;
use crate::domain::violations::Violations;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to build internal domain model: {0}")]
    ModelConstructionError(#[from] ConversionError),

    #[error(transparent)]
    AllocationError(#[from] AllocationError),
}

/// Failures while turning loaded DTOs into the domain model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Resource {0} is defined more than once")]
    DuplicateResource(String),

    #[error("Resource {owner} references unknown {kind} {uri}")]
    UnknownReference { owner: String, kind: &'static str, uri: String },

    #[error("Invalid UUID {0}")]
    InvalidUuid(String),
}

/// Why an allocation did not produce a composed node.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AllocationError {
    /// The request cannot be satisfied as stated; every reason is reported.
    #[error("Allocation of the requested node was rejected: {0}")]
    Rejected(Violations),

    /// The inventory contradicts a decision the matchers already made.
    #[error("Inconsistent allocation state: {0}")]
    Internal(String),

    /// A concurrent allocation committed a change to a resource this one touched.
    #[error("Resource {0} was modified by a concurrent allocation")]
    Conflict(ResourceUri),
}

impl AllocationError {
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            AllocationError::Rejected(violations) => Some(violations),
            _ => None,
        }
    }
}

impl From<Violations> for AllocationError {
    fn from(violations: Violations) -> Self {
        AllocationError::Rejected(violations)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
