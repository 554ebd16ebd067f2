//! Core type definitions for labeled feature data

use crate::core::{Result, TuneError};
use serde::{Deserialize, Serialize};

/// Class label of a sample.
///
/// A raw label of exactly zero marks a sample without ground truth; such
/// samples are routed rather than scored during evaluation. For class
/// counting and split quotas they fall into the negative bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Positive,
    Negative,
    Unlabeled,
}

impl Label {
    /// Bucket a raw label value: `> 0` positive, `< 0` negative, `== 0` unlabeled.
    pub fn from_raw(value: f64) -> Self {
        if value > 0.0 {
            Label::Positive
        } else if value < 0.0 {
            Label::Negative
        } else {
            Label::Unlabeled
        }
    }

    /// Numeric form handed to the external trainer: +1, -1 or 0.
    pub fn to_value(self) -> f64 {
        match self {
            Label::Positive => 1.0,
            Label::Negative => -1.0,
            Label::Unlabeled => 0.0,
        }
    }

    pub fn is_positive(self) -> bool {
        self == Label::Positive
    }

    pub fn is_unlabeled(self) -> bool {
        self == Label::Unlabeled
    }
}

/// One feature vector with its label and an optional free-text annotation
/// carried through for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Dense feature values, positional
    pub features: Vec<f64>,
    /// Class label
    pub label: Label,
    /// Trailing comment from the input line, if any
    pub annotation: Option<String>,
}

impl Sample {
    /// Create a new sample without annotation
    pub fn new(features: Vec<f64>, label: Label) -> Self {
        Self {
            features,
            label,
            annotation: None,
        }
    }

    /// Create a new sample carrying an annotation
    pub fn with_annotation(features: Vec<f64>, label: Label, annotation: String) -> Self {
        Self {
            features,
            label,
            annotation: Some(annotation),
        }
    }

    /// Number of features in this sample
    pub fn num_features(&self) -> usize {
        self.features.len()
    }
}

/// Ordered collection of samples sharing one feature dimensionality,
/// with per-class counters maintained on insertion.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    samples: Vec<Sample>,
    num_feat: usize,
    num_pos: usize,
    num_neg: usize,
}

impl SampleSet {
    /// Create an empty set with a declared feature dimensionality
    pub fn new(num_feat: usize) -> Self {
        Self {
            samples: Vec::new(),
            num_feat,
            num_pos: 0,
            num_neg: 0,
        }
    }

    /// Append a sample, enforcing the set's dimensionality.
    ///
    /// Unlabeled samples count toward the negative bucket.
    pub fn push(&mut self, sample: Sample) -> Result<()> {
        if sample.num_features() != self.num_feat {
            return Err(TuneError::DimensionMismatch {
                expected: self.num_feat,
                actual: sample.num_features(),
            });
        }
        match sample.label {
            Label::Positive => self.num_pos += 1,
            Label::Negative | Label::Unlabeled => self.num_neg += 1,
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Number of samples in the set
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Declared feature dimensionality
    pub fn num_feat(&self) -> usize {
        self.num_feat
    }

    /// Count of positive-labeled samples
    pub fn num_pos(&self) -> usize {
        self.num_pos
    }

    /// Count of negative-labeled samples (includes unlabeled)
    pub fn num_neg(&self) -> usize {
        self.num_neg
    }

    /// Borrow the samples in order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Mutable access for in-place feature transforms
    pub(crate) fn samples_mut(&mut self) -> &mut [Sample] {
        &mut self.samples
    }

    /// Consume the set, yielding its samples in order
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }

    /// Iterate over the samples in order
    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }
}

/// Per-class accuracy vector returned by k-fold cross-validation:
/// fraction of correctly classified positive and negative samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassAccuracy {
    pub positive: f64,
    pub negative: f64,
}

impl ClassAccuracy {
    pub fn new(positive: f64, negative: f64) -> Self {
        Self { positive, negative }
    }
}

/// Per-feature standardization statistics computed from a training set:
/// `mean[i]` and `precision[i] = 1 / stddev[i]` (sample variance, n-1).
///
/// Computed once from the training partition and reused unmodified for
/// every later transform of train or test data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormStats {
    pub mean: Vec<f64>,
    pub precision: Vec<f64>,
}

impl NormStats {
    /// Create stats from parallel mean/precision vectors.
    ///
    /// # Panics
    /// Panics if the vectors differ in length.
    pub fn new(mean: Vec<f64>, precision: Vec<f64>) -> Self {
        assert_eq!(
            mean.len(),
            precision.len(),
            "Mean and precision must have same length"
        );
        Self { mean, precision }
    }

    /// Number of features covered by these statistics
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    /// Check if the statistics are empty
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}
