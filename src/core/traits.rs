//! Seams between the pipeline and its external collaborators

use crate::core::{ClassAccuracy, Result, Sample};

/// Trained decision function of the external classifier.
///
/// Maps a feature vector to a signed score; positive scores mean the
/// positive class. Inputs are expected to be standardized already.
pub trait DecisionFunction {
    fn decide(&self, features: &[f64]) -> f64;
}

/// External linear-classifier library.
///
/// Accepts dense feature rows with parallel numeric labels, holds a
/// per-class regularization constant, and exposes k-fold cross-validation
/// plus final training. The pipeline configures C and delegates everything
/// else.
pub trait LinearTrainer {
    type Model: DecisionFunction;

    /// Set the regularization constant for the positive class
    fn set_c_positive(&mut self, c: f64);

    /// Set the regularization constant for the negative class
    fn set_c_negative(&mut self, c: f64);

    /// Set the same regularization constant for both classes
    fn set_c(&mut self, c: f64) {
        self.set_c_positive(c);
        self.set_c_negative(c);
    }

    /// Run k-fold cross-validation with the currently configured constants,
    /// returning per-class accuracy
    fn cross_validate(
        &self,
        features: &[Vec<f64>],
        labels: &[f64],
        folds: usize,
    ) -> Result<ClassAccuracy>;

    /// Train a decision function on the full supplied data
    fn train(&self, features: &[Vec<f64>], labels: &[f64]) -> Result<Self::Model>;
}

/// Receiver for unlabeled samples together with the classifier's verdict.
///
/// Whatever happens to a routed sample (the driving use case moves media
/// files into per-verdict directories) lives behind this trait, outside
/// the evaluation core.
pub trait Router {
    fn route(&mut self, sample: &Sample, score: f64);
}
