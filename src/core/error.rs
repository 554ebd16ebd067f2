//! Error types for the preparation pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TuneError {
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("No feature count header found before end of file")]
    MissingFeatureCount,

    #[error("Normalization statistics required in test-only mode")]
    MissingStats,

    #[error("Zero variance in feature {feature}: precision is undefined")]
    ZeroVariance { feature: usize },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Feature index {index} out of range for {num_feat} features")]
    FeatureIndexOutOfRange { index: usize, num_feat: usize },

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Trainer error: {0}")]
    TrainerError(String),
}

pub type Result<T> = std::result::Result<T, TuneError>;
