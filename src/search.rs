//! Two-phase grid search over the regularization constant
//!
//! A coarse geometric sweep locates the neighborhood of the best C, then a
//! fine linear sweep around the coarse winner refines it. Every candidate
//! is scored by k-fold cross-validation delegated to the external trainer,
//! which is left configured with the winning constant.

use crate::core::{ClassAccuracy, LinearTrainer, Result};
use log::info;
use serde::Serialize;

/// Default number of cross-validation folds
pub const DEFAULT_FOLDS: usize = 3;

/// One evaluated candidate
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Trial {
    pub c: f64,
    pub accuracy: ClassAccuracy,
}

/// Result of a completed search
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub best_c: f64,
    /// Retained score of the winner: `positive + 0.5 * negative`
    pub best_score: f64,
    /// Every candidate evaluated, coarse then fine, in order
    pub trials: Vec<Trial>,
}

/// Cross-validated grid search for the regularization constant C
#[derive(Debug, Clone, Copy)]
pub struct GridSearch {
    folds: usize,
}

impl Default for GridSearch {
    fn default() -> Self {
        Self {
            folds: DEFAULT_FOLDS,
        }
    }
}

impl GridSearch {
    /// Search with the given fold count
    pub fn new(folds: usize) -> Self {
        Self { folds }
    }

    /// Number of cross-validation folds per candidate
    pub fn folds(&self) -> usize {
        self.folds
    }

    /// Select C for the given training data and configure the trainer
    /// with it (same constant for both classes).
    ///
    /// Coarse phase: C = 1, 5, 25, ... while C < 10000. Fine phase: a
    /// linear scan of `[C0 - C0/2, C0 + C0/2)` in steps of `C0/5`, where
    /// C0 is the coarse winner.
    pub fn select_c<T: LinearTrainer>(
        &self,
        trainer: &mut T,
        features: &[Vec<f64>],
        labels: &[f64],
    ) -> Result<SearchOutcome> {
        let mut trials = Vec::new();
        // The first coarse candidate, so the outcome is defined even if no
        // candidate ever beats the running score
        let mut best_c = 1.0;
        let mut best_score = 0.0;

        info!("Coarse grid search over C");
        let mut c = 1.0;
        while c < 10_000.0 {
            let accuracy = self.try_candidate(trainer, features, labels, c)?;
            Self::update_best(c, accuracy, &mut best_c, &mut best_score);
            trials.push(Trial { c, accuracy });
            c *= 5.0;
        }

        let c0 = best_c;
        info!(
            "Fine grid search in [{}, {}], increment {}",
            c0 - c0 / 2.0,
            c0 + c0 / 2.0,
            c0 / 5.0
        );
        // Candidates c0 * (0.5 + k/5) for k = 0..5; indexing instead of a
        // running sum keeps the candidate count stable
        for k in 0..5 {
            let c = c0 * (0.5 + 0.2 * k as f64);
            let accuracy = self.try_candidate(trainer, features, labels, c)?;
            Self::update_best(c, accuracy, &mut best_c, &mut best_score);
            trials.push(Trial { c, accuracy });
        }

        trainer.set_c(best_c);
        info!("Best C: {best_c} (score {best_score:.4})");
        Ok(SearchOutcome {
            best_c,
            best_score,
            trials,
        })
    }

    /// Candidates are compared by the product of the per-class accuracies,
    /// while the retained best score is `positive + 0.5 * negative`. The
    /// two expressions deliberately differ.
    fn update_best(c: f64, accuracy: ClassAccuracy, best_c: &mut f64, best_score: &mut f64) {
        if accuracy.positive * accuracy.negative > *best_score {
            *best_score = accuracy.positive + 0.5 * accuracy.negative;
            *best_c = c;
        }
    }

    fn try_candidate<T: LinearTrainer>(
        &self,
        trainer: &mut T,
        features: &[Vec<f64>],
        labels: &[f64],
        c: f64,
    ) -> Result<ClassAccuracy> {
        trainer.set_c(c);
        let accuracy = trainer.cross_validate(features, labels, self.folds)?;
        info!(
            "C: {c:>8.2}  cross validation accuracy: {:.4} {:.4}",
            accuracy.positive, accuracy.negative
        );
        Ok(accuracy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DecisionFunction;
    use approx::assert_relative_eq;
    use std::cell::RefCell;

    struct ConstModel;

    impl DecisionFunction for ConstModel {
        fn decide(&self, _features: &[f64]) -> f64 {
            0.0
        }
    }

    /// Trainer double whose cross-validation outcome is a pure function of
    /// the currently configured C; records every candidate it sees.
    struct ScriptedTrainer<F: Fn(f64) -> ClassAccuracy> {
        outcome: F,
        c_positive: f64,
        c_negative: f64,
        seen: RefCell<Vec<f64>>,
    }

    impl<F: Fn(f64) -> ClassAccuracy> ScriptedTrainer<F> {
        fn new(outcome: F) -> Self {
            Self {
                outcome,
                c_positive: 0.0,
                c_negative: 0.0,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl<F: Fn(f64) -> ClassAccuracy> LinearTrainer for ScriptedTrainer<F> {
        type Model = ConstModel;

        fn set_c_positive(&mut self, c: f64) {
            self.c_positive = c;
        }

        fn set_c_negative(&mut self, c: f64) {
            self.c_negative = c;
        }

        fn cross_validate(
            &self,
            _features: &[Vec<f64>],
            _labels: &[f64],
            _folds: usize,
        ) -> Result<ClassAccuracy> {
            self.seen.borrow_mut().push(self.c_positive);
            Ok((self.outcome)(self.c_positive))
        }

        fn train(&self, _features: &[Vec<f64>], _labels: &[f64]) -> Result<Self::Model> {
            Ok(ConstModel)
        }
    }

    #[test]
    fn test_candidate_sequence() {
        let mut trainer = ScriptedTrainer::new(|_| ClassAccuracy::new(0.1, 0.1));
        let outcome = GridSearch::default()
            .select_c(&mut trainer, &[], &[])
            .unwrap();

        // Coarse sweep stops before 10000, fine sweep brackets the winner
        let seen = trainer.seen.borrow();
        assert_eq!(seen[..6], [1.0, 5.0, 25.0, 125.0, 625.0, 3125.0]);
        assert_eq!(outcome.trials.len(), seen.len());

        // (0.1, 0.1) keeps updating nothing after the first candidate
        assert_eq!(outcome.best_c, 1.0);
        let fine: Vec<f64> = seen[6..].to_vec();
        assert_eq!(fine.len(), 5);
        for (actual, expected) in fine.iter().zip([0.5, 0.7, 0.9, 1.1, 1.3]) {
            assert_relative_eq!(*actual, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_comparison_uses_product_but_retains_weighted_sum() {
        // C=1 scores low enough that C=5's product can pass it
        let mut trainer = ScriptedTrainer::new(|c| {
            if (c - 5.0).abs() < 1e-9 {
                ClassAccuracy::new(0.9, 0.9)
            } else if (c - 1.0).abs() < 1e-9 {
                ClassAccuracy::new(0.5, 0.4)
            } else {
                ClassAccuracy::new(0.1, 0.1)
            }
        });

        let outcome = GridSearch::default()
            .select_c(&mut trainer, &[], &[])
            .unwrap();

        // Product 0.81 beat the stored 0.7; the retained score is the
        // weighted sum of the winner, not the product
        assert_eq!(outcome.best_c, 5.0);
        assert_relative_eq!(outcome.best_score, 0.9 + 0.5 * 0.9);

        // Trainer left configured with the winner for both classes
        assert_eq!(trainer.c_positive, 5.0);
        assert_eq!(trainer.c_negative, 5.0);
    }

    #[test]
    fn test_weighted_sum_blocks_later_products() {
        // Once a candidate retains a score above 1.0, no later product of
        // accuracies (each at most 1.0) can displace it
        let mut trainer = ScriptedTrainer::new(|c| {
            if (c - 1.0).abs() < 1e-9 {
                ClassAccuracy::new(0.9, 0.9)
            } else {
                ClassAccuracy::new(1.0, 1.0)
            }
        });

        let outcome = GridSearch::default()
            .select_c(&mut trainer, &[], &[])
            .unwrap();

        assert_eq!(outcome.best_c, 1.0);
        assert_relative_eq!(outcome.best_score, 0.9 + 0.5 * 0.9);
    }

    #[test]
    fn test_fine_phase_brackets_coarse_winner() {
        let mut trainer = ScriptedTrainer::new(|c| {
            if (c - 25.0).abs() < 1e-9 {
                ClassAccuracy::new(0.6, 0.6)
            } else {
                ClassAccuracy::new(0.2, 0.2)
            }
        });

        let outcome = GridSearch::new(5)
            .select_c(&mut trainer, &[], &[])
            .unwrap();
        assert_eq!(outcome.best_c, 25.0);

        let seen = trainer.seen.borrow();
        let fine: Vec<f64> = seen[6..].to_vec();
        assert_eq!(fine.len(), 5);
        for (actual, expected) in fine.iter().zip([12.5, 17.5, 22.5, 27.5, 32.5]) {
            assert_relative_eq!(*actual, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_cross_validation_error_propagates() {
        struct FailingTrainer;
        impl LinearTrainer for FailingTrainer {
            type Model = ConstModel;
            fn set_c_positive(&mut self, _c: f64) {}
            fn set_c_negative(&mut self, _c: f64) {}
            fn cross_validate(
                &self,
                _features: &[Vec<f64>],
                _labels: &[f64],
                _folds: usize,
            ) -> Result<ClassAccuracy> {
                Err(crate::core::TuneError::TrainerError(
                    "solver diverged".to_string(),
                ))
            }
            fn train(&self, _features: &[Vec<f64>], _labels: &[f64]) -> Result<Self::Model> {
                Ok(ConstModel)
            }
        }

        let result = GridSearch::default().select_c(&mut FailingTrainer, &[], &[]);
        assert!(result.is_err());
    }
}
