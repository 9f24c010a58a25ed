use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage an error was raised in.
///
/// Every algorithmic failure names its stage so an operator can tell whether
/// steering broke while learning, composing or validating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Learn,
    Expand,
    Compose,
    Validate,
    Select,
    Compare,
    Dial,
    Store,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Learn => "learn",
            Stage::Expand => "expand",
            Stage::Compose => "compose",
            Stage::Validate => "validate",
            Stage::Select => "select",
            Stage::Compare => "compare",
            Stage::Dial => "dial",
            Stage::Store => "store",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("[{stage}] insufficient data for `{dimension}`: need at least {required} examples, got {actual}")]
    InsufficientData {
        stage: Stage,
        dimension: String,
        required: usize,
        actual: usize,
    },

    #[error("[{stage}] degenerate vector for `{dimension}`: magnitude {magnitude:e} is below epsilon {epsilon:e}")]
    DegenerateVector {
        stage: Stage,
        dimension: String,
        magnitude: f64,
        epsilon: f64,
    },

    #[error("[{stage}] dimension mismatch for `{dimension}`: expected length {expected}, got {actual}")]
    DimensionMismatch {
        stage: Stage,
        dimension: String,
        expected: usize,
        actual: usize,
    },

    #[error("[{stage}] unknown dimension `{dimension}`: no steering vector learned for it")]
    UnknownDimension { stage: Stage, dimension: String },

    #[error("[{stage}] dial `{dimension}` out of range: {value} is not within [0, 1]")]
    DialOutOfRange {
        stage: Stage,
        dimension: String,
        value: f32,
    },

    #[error("[{stage}] no descriptors registered for dimension `{dimension}`")]
    MissingDescriptor { stage: Stage, dimension: String },

    #[error("[{stage}] candidate set is empty")]
    EmptyCandidateSet { stage: Stage },

    #[error("[{stage}] embedding failed: {message}")]
    Embedding { stage: Stage, message: String },

    #[error("Steering vector not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Stage the error was raised in, if it is an algorithmic error.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::InsufficientData { stage, .. }
            | Error::DegenerateVector { stage, .. }
            | Error::DimensionMismatch { stage, .. }
            | Error::UnknownDimension { stage, .. }
            | Error::DialOutOfRange { stage, .. }
            | Error::MissingDescriptor { stage, .. }
            | Error::EmptyCandidateSet { stage }
            | Error::Embedding { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Dimension the error concerns, when there is one.
    pub fn dimension(&self) -> Option<&str> {
        match self {
            Error::InsufficientData { dimension, .. }
            | Error::DegenerateVector { dimension, .. }
            | Error::DimensionMismatch { dimension, .. }
            | Error::UnknownDimension { dimension, .. }
            | Error::DialOutOfRange { dimension, .. }
            | Error::MissingDescriptor { dimension, .. } => Some(dimension),
            Error::NotFound(dimension) => Some(dimension),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
