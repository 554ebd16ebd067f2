//! Data loading, writing and partitioning
//!
//! This module covers the line-oriented feature file format, the
//! class-balanced train/test split and the conversion into the dense
//! matrices an external trainer consumes.

pub mod convert;
pub mod feature_file;
pub mod split;

pub use self::feature_file::{write_file, FeatureFileReader};
pub use self::split::{BalancedSplitter, SplitSets, TrainTestRatio, DEFAULT_SEED};
