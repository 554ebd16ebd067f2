//! Evaluation of a trained decision function on a labeled set
//!
//! Scoring and routing are two separate passes: [`Evaluator::evaluate`]
//! aggregates error counts over the labeled samples, while
//! [`Evaluator::route_unlabeled`] hands unlabeled samples and their
//! verdicts to a [`Router`]. Unlabeled samples never touch the error
//! counters.

use crate::core::{DecisionFunction, Label, Result, Router, SampleSet};
use crate::data::convert;
use log::info;
use serde::Serialize;

/// Score and verdict for one labeled sample, in set order
#[derive(Debug, Clone, Serialize)]
pub struct ScoredSample {
    /// Position in the evaluated set
    pub index: usize,
    /// Raw decision function value
    pub score: f64,
    pub label: Label,
    pub annotation: Option<String>,
}

impl ScoredSample {
    /// Positive verdict: score strictly greater than zero
    pub fn predicted_positive(&self) -> bool {
        self.score > 0.0
    }

    pub fn is_false_positive(&self) -> bool {
        self.label == Label::Negative && self.predicted_positive()
    }

    pub fn is_false_negative(&self) -> bool {
        self.label == Label::Positive && !self.predicted_positive()
    }
}

/// Aggregate error counts over the labeled part of a set
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// Labeled positive instances
    pub positives: usize,
    /// Labeled negative instances
    pub negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    /// Unlabeled samples encountered (not scored here)
    pub unlabeled: usize,
    /// Per-sample scores for the labeled samples
    pub records: Vec<ScoredSample>,
}

impl Evaluation {
    /// FP / negative instances; `None` when the set has no negatives
    pub fn false_positive_rate(&self) -> Option<f64> {
        (self.negatives > 0).then(|| self.false_positives as f64 / self.negatives as f64)
    }

    /// FN / positive instances; `None` when the set has no positives
    pub fn false_negative_rate(&self) -> Option<f64> {
        (self.positives > 0).then(|| self.false_negatives as f64 / self.positives as f64)
    }

    /// Fraction of correctly classified positive instances
    pub fn correct_positive_fraction(&self) -> Option<f64> {
        self.false_negative_rate().map(|r| 1.0 - r)
    }

    /// Fraction of correctly classified negative instances
    pub fn correct_negative_fraction(&self) -> Option<f64> {
        self.false_positive_rate().map(|r| 1.0 - r)
    }
}

/// Runs a trained decision function over labeled sets
pub struct Evaluator;

impl Evaluator {
    /// Score every labeled sample of the set on the given feature subset
    /// and count false positives and false negatives.
    ///
    /// A sample is classified positive when its score exceeds zero.
    /// Unlabeled samples are counted but neither scored nor recorded; see
    /// [`Evaluator::route_unlabeled`].
    pub fn evaluate<M: DecisionFunction>(
        model: &M,
        set: &SampleSet,
        feature_set: &[usize],
    ) -> Result<Evaluation> {
        let matrix = convert::feature_matrix(set, feature_set)?;

        let mut evaluation = Evaluation {
            positives: 0,
            negatives: 0,
            false_positives: 0,
            false_negatives: 0,
            unlabeled: 0,
            records: Vec::new(),
        };

        for (index, (sample, row)) in set.iter().zip(&matrix).enumerate() {
            if sample.label.is_unlabeled() {
                evaluation.unlabeled += 1;
                continue;
            }
            let record = ScoredSample {
                index,
                score: model.decide(row),
                label: sample.label,
                annotation: sample.annotation.clone(),
            };
            match sample.label {
                Label::Positive => {
                    evaluation.positives += 1;
                    if record.is_false_negative() {
                        evaluation.false_negatives += 1;
                    }
                }
                Label::Negative => {
                    evaluation.negatives += 1;
                    if record.is_false_positive() {
                        evaluation.false_positives += 1;
                    }
                }
                Label::Unlabeled => unreachable!(),
            }
            evaluation.records.push(record);
        }

        info!(
            "Evaluated {} labeled samples: {} FP / {} N, {} FN / {} P",
            evaluation.records.len(),
            evaluation.false_positives,
            evaluation.negatives,
            evaluation.false_negatives,
            evaluation.positives
        );
        Ok(evaluation)
    }

    /// Score every unlabeled sample and pass it with its verdict to the
    /// router. Returns the number of routed samples.
    pub fn route_unlabeled<M: DecisionFunction, R: Router>(
        model: &M,
        set: &SampleSet,
        feature_set: &[usize],
        router: &mut R,
    ) -> Result<usize> {
        let matrix = convert::feature_matrix(set, feature_set)?;

        let mut routed = 0;
        for (sample, row) in set.iter().zip(&matrix) {
            if !sample.label.is_unlabeled() {
                continue;
            }
            router.route(sample, model.decide(row));
            routed += 1;
        }

        if routed > 0 {
            info!("Routed {routed} unlabeled samples");
        }
        Ok(routed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Sample;
    use approx::assert_relative_eq;

    /// Decision function: sign of the first feature
    struct FirstFeatureModel;

    impl DecisionFunction for FirstFeatureModel {
        fn decide(&self, features: &[f64]) -> f64 {
            features[0]
        }
    }

    fn push(set: &mut SampleSet, value: f64, label: Label) {
        set.push(Sample::new(vec![value], label)).unwrap();
    }

    #[test]
    fn test_error_rates() {
        // 2 true negatives (one misclassified) and 3 true positives
        // (one misclassified)
        let mut set = SampleSet::new(1);
        push(&mut set, -1.0, Label::Negative);
        push(&mut set, 2.0, Label::Negative); // false positive
        push(&mut set, 1.0, Label::Positive);
        push(&mut set, -0.5, Label::Positive); // false negative
        push(&mut set, 3.0, Label::Positive);

        let evaluation = Evaluator::evaluate(&FirstFeatureModel, &set, &[0]).unwrap();

        assert_eq!(evaluation.negatives, 2);
        assert_eq!(evaluation.positives, 3);
        assert_eq!(evaluation.false_positives, 1);
        assert_eq!(evaluation.false_negatives, 1);
        assert_relative_eq!(evaluation.false_positive_rate().unwrap(), 0.5);
        assert_relative_eq!(
            evaluation.false_negative_rate().unwrap(),
            1.0 / 3.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            evaluation.correct_positive_fraction().unwrap(),
            2.0 / 3.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_zero_score_is_a_negative_verdict() {
        let mut set = SampleSet::new(1);
        push(&mut set, 0.0, Label::Positive);

        let evaluation = Evaluator::evaluate(&FirstFeatureModel, &set, &[0]).unwrap();
        assert_eq!(evaluation.false_negatives, 1);
    }

    #[test]
    fn test_rates_undefined_without_instances() {
        let mut set = SampleSet::new(1);
        push(&mut set, 1.0, Label::Positive);
        push(&mut set, -1.0, Label::Positive);

        let evaluation = Evaluator::evaluate(&FirstFeatureModel, &set, &[0]).unwrap();
        assert!(evaluation.false_positive_rate().is_none());
        assert_relative_eq!(evaluation.false_negative_rate().unwrap(), 0.5);
    }

    #[test]
    fn test_unlabeled_skipped_by_evaluate() {
        let mut set = SampleSet::new(1);
        push(&mut set, 5.0, Label::Unlabeled);
        push(&mut set, 1.0, Label::Positive);

        let evaluation = Evaluator::evaluate(&FirstFeatureModel, &set, &[0]).unwrap();
        assert_eq!(evaluation.unlabeled, 1);
        assert_eq!(evaluation.positives, 1);
        assert_eq!(evaluation.records.len(), 1);
        assert_eq!(evaluation.records[0].index, 1);
    }

    #[test]
    fn test_route_unlabeled() {
        struct Collecting {
            seen: Vec<(Option<String>, bool)>,
        }
        impl Router for Collecting {
            fn route(&mut self, sample: &Sample, score: f64) {
                self.seen
                    .push((sample.annotation.clone(), score > 0.0));
            }
        }

        let mut set = SampleSet::new(1);
        set.push(Sample::with_annotation(
            vec![2.0],
            Label::Unlabeled,
            "clip_01.mp4".to_string(),
        ))
        .unwrap();
        set.push(Sample::with_annotation(
            vec![-2.0],
            Label::Unlabeled,
            "clip_02.mp4".to_string(),
        ))
        .unwrap();
        push(&mut set, 1.0, Label::Positive);

        let mut router = Collecting { seen: Vec::new() };
        let routed =
            Evaluator::route_unlabeled(&FirstFeatureModel, &set, &[0], &mut router).unwrap();

        assert_eq!(routed, 2);
        assert_eq!(
            router.seen,
            vec![
                (Some("clip_01.mp4".to_string()), true),
                (Some("clip_02.mp4".to_string()), false)
            ]
        );
    }
}
