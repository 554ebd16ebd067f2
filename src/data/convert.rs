//! Conversion of sample sets into the dense matrices and label vectors an
//! external trainer consumes, for the full feature set or any subset of
//! feature indices.

use crate::core::{Result, SampleSet, TuneError};

/// Extract a features-only matrix restricted to the given feature indices,
/// one row per sample in set order.
pub fn feature_matrix(set: &SampleSet, feature_set: &[usize]) -> Result<Vec<Vec<f64>>> {
    for &index in feature_set {
        if index >= set.num_feat() {
            return Err(TuneError::FeatureIndexOutOfRange {
                index,
                num_feat: set.num_feat(),
            });
        }
    }
    Ok(set
        .iter()
        .map(|sample| feature_set.iter().map(|&j| sample.features[j]).collect())
        .collect())
}

/// Extract the labels-only vector (+1 / -1 / 0), parallel to the rows of
/// [`feature_matrix`].
pub fn labels(set: &SampleSet) -> Vec<f64> {
    set.iter().map(|sample| sample.label.to_value()).collect()
}

/// All feature indices of a set with the given dimensionality
pub fn full_feature_set(num_feat: usize) -> Vec<usize> {
    (0..num_feat).collect()
}
