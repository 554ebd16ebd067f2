//! Data preparation and hyperparameter selection for binary linear classifiers
//!
//! Reads labeled feature files, builds class-balanced train/test splits,
//! standardizes features with training-set statistics, and selects the
//! regularization constant of an external linear classifier via
//! cross-validated grid search.

pub mod core;
pub mod data;
pub mod eval;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod search;

// Re-export main types for convenience
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{Result, TuneError};
pub use crate::data::{BalancedSplitter, FeatureFileReader, SplitSets, TrainTestRatio};
pub use crate::eval::{Evaluation, Evaluator, ScoredSample};
pub use crate::normalize::Standardizer;
pub use crate::pipeline::{FeatureSelection, Harness, PreparedData, RunOutcome};
pub use crate::report::PredictionLog;
pub use crate::search::{GridSearch, SearchOutcome, Trial};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
