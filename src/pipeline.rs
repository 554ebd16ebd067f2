//! High-level preparation and experiment harness
//!
//! Ties the pieces together the way a caller consumes them: read a feature
//! file, split it, standardize with training-set statistics, then search,
//! train and evaluate against an external trainer.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use svmtune::pipeline::{FeatureSelection, Harness, PreparedData};
//! use svmtune::data::TrainTestRatio;
//!
//! # fn run<T: svmtune::LinearTrainer>(trainer: T) -> svmtune::Result<()> {
//! let data = PreparedData::from_file("features.txt", TrainTestRatio::Count(400))?;
//! let mut harness = Harness::new(trainer, data);
//! let outcome = harness.run(&FeatureSelection::All)?;
//! println!("best C: {:?}", outcome.search.map(|s| s.best_c));
//! # Ok(())
//! # }
//! ```

use crate::core::{LinearTrainer, NormStats, Result, Router, SampleSet, TuneError};
use crate::data::{convert, BalancedSplitter, FeatureFileReader, TrainTestRatio, DEFAULT_SEED};
use crate::eval::{Evaluation, Evaluator};
use crate::normalize::Standardizer;
use crate::search::{GridSearch, SearchOutcome, DEFAULT_FOLDS};
use log::info;
use std::path::Path;

/// Which feature columns participate in an experiment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureSelection {
    /// Every feature of the dataset
    All,
    /// An explicit subset of feature indices
    Subset(Vec<usize>),
}

impl FeatureSelection {
    /// Resolve to concrete indices, validated against the dimensionality
    pub fn indices(&self, num_feat: usize) -> Result<Vec<usize>> {
        match self {
            FeatureSelection::All => Ok(convert::full_feature_set(num_feat)),
            FeatureSelection::Subset(indices) => {
                if indices.is_empty() {
                    return Err(TuneError::InvalidDataset(
                        "Empty feature selection".to_string(),
                    ));
                }
                for &index in indices {
                    if index >= num_feat {
                        return Err(TuneError::FeatureIndexOutOfRange { index, num_feat });
                    }
                }
                Ok(indices.clone())
            }
        }
    }
}

/// A dataset read, split and standardized, ready for the trainer.
///
/// Statistics are always fitted on the training partition (or supplied by
/// the caller in test-only mode), never on held-out data.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub train: SampleSet,
    pub test: SampleSet,
    pub stats: NormStats,
    /// Effective training fraction of the smaller class
    pub ratio: f64,
    pub num_feat: usize,
}

impl PreparedData {
    /// Read, split with the default seed, fit on train, apply to both
    pub fn from_file<P: AsRef<Path>>(path: P, ratio: TrainTestRatio) -> Result<Self> {
        Self::from_file_seeded(path, ratio, DEFAULT_SEED)
    }

    /// Same as [`PreparedData::from_file`] with an injected shuffle seed
    pub fn from_file_seeded<P: AsRef<Path>>(
        path: P,
        ratio: TrainTestRatio,
        seed: u64,
    ) -> Result<Self> {
        let set = FeatureFileReader::from_file(path)?;
        let num_feat = set.num_feat();
        let split = BalancedSplitter::with_seed(seed).split(set, ratio)?;
        if split.train.is_empty() {
            // A ratio of zero means test-only mode, which needs externally
            // supplied statistics
            return Err(TuneError::MissingStats);
        }

        let mut train = split.train;
        let mut test = split.test;
        let stats = Standardizer::fit(&train)?;
        Standardizer::apply(&mut train, &stats)?;
        Standardizer::apply(&mut test, &stats)?;
        info!(
            "Prepared {} training / {} test samples over {num_feat} features",
            train.len(),
            test.len()
        );
        Ok(Self {
            train,
            test,
            stats,
            ratio: split.ratio,
            num_feat,
        })
    }

    /// Test-only mode: no shuffle, every sample held out, caller-supplied
    /// statistics applied
    pub fn from_file_with_stats<P: AsRef<Path>>(path: P, stats: NormStats) -> Result<Self> {
        if stats.is_empty() {
            return Err(TuneError::MissingStats);
        }
        let set = FeatureFileReader::from_file(path)?;
        let num_feat = set.num_feat();
        if stats.len() != num_feat {
            return Err(TuneError::DimensionMismatch {
                expected: num_feat,
                actual: stats.len(),
            });
        }

        let split = BalancedSplitter::new().split(set, TrainTestRatio::test_only())?;
        let mut test = split.test;
        Standardizer::apply(&mut test, &stats)?;
        info!("Prepared {} test samples in test-only mode", test.len());
        Ok(Self {
            train: split.train,
            test,
            stats,
            ratio: 0.0,
            num_feat,
        })
    }

    /// Separate training and test files. Statistics are fitted on the
    /// balanced training subset of the first file and applied to both.
    /// Majority-class samples beyond the balanced quota do not train.
    pub fn from_split_files<P: AsRef<Path>, Q: AsRef<Path>>(
        train_path: P,
        test_path: Q,
    ) -> Result<Self> {
        let pooled = FeatureFileReader::from_file(train_path)?;
        let num_feat = pooled.num_feat();
        let split = BalancedSplitter::new().split(pooled, TrainTestRatio::train_only())?;

        let mut train = split.train;
        let stats = Standardizer::fit(&train)?;
        Standardizer::apply(&mut train, &stats)?;

        let test_set = FeatureFileReader::from_file(test_path)?;
        if test_set.num_feat() != num_feat {
            return Err(TuneError::DimensionMismatch {
                expected: num_feat,
                actual: test_set.num_feat(),
            });
        }
        let test_split = BalancedSplitter::new().split(test_set, TrainTestRatio::test_only())?;
        let mut test = test_split.test;
        Standardizer::apply(&mut test, &stats)?;

        info!(
            "Prepared {} training samples and {} test samples from separate files",
            train.len(),
            test.len()
        );
        Ok(Self {
            train,
            test,
            stats,
            ratio: split.ratio,
            num_feat,
        })
    }
}

/// Everything produced by one harness run
pub struct RunOutcome<M> {
    pub model: M,
    /// Present when the C search ran (no user-supplied constants)
    pub search: Option<SearchOutcome>,
    pub evaluation: Evaluation,
    /// Concrete feature indices the run used
    pub feature_set: Vec<usize>,
}

/// Drives one experiment: optional C search, final training, evaluation
pub struct Harness<T: LinearTrainer> {
    trainer: T,
    data: PreparedData,
    folds: usize,
    c_positive: Option<f64>,
    c_negative: Option<f64>,
}

impl<T: LinearTrainer> Harness<T> {
    pub fn new(trainer: T, data: PreparedData) -> Self {
        Self {
            trainer,
            data,
            folds: DEFAULT_FOLDS,
            c_positive: None,
            c_negative: None,
        }
    }

    /// Set the cross-validation fold count for the search
    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    /// Fix the regularization constant for both classes, skipping the search
    pub fn with_c(mut self, c: f64) -> Self {
        self.c_positive = Some(c);
        self.c_negative = Some(c);
        self
    }

    /// Fix the positive-class constant. The search still runs unless the
    /// negative-class constant is fixed too.
    pub fn with_c_positive(mut self, c: f64) -> Self {
        self.c_positive = Some(c);
        self
    }

    /// Fix the negative-class constant. The search still runs unless the
    /// positive-class constant is fixed too.
    pub fn with_c_negative(mut self, c: f64) -> Self {
        self.c_negative = Some(c);
        self
    }

    pub fn data(&self) -> &PreparedData {
        &self.data
    }

    pub fn trainer(&self) -> &T {
        &self.trainer
    }

    /// Run one experiment over the selected features: configure C (via the
    /// grid search unless both constants are user-supplied), train the
    /// final model, evaluate it on the test partition.
    pub fn run(&mut self, selection: &FeatureSelection) -> Result<RunOutcome<T::Model>> {
        if self.data.train.is_empty() {
            return Err(TuneError::InvalidDataset(
                "No training partition to run on".to_string(),
            ));
        }
        let feature_set = selection.indices(self.data.num_feat)?;
        let features = convert::feature_matrix(&self.data.train, &feature_set)?;
        let labels = convert::labels(&self.data.train);

        let search = match (self.c_positive, self.c_negative) {
            (Some(c_pos), Some(c_neg)) => {
                info!("Using user-supplied constants C+ = {c_pos}, C- = {c_neg}");
                self.trainer.set_c_positive(c_pos);
                self.trainer.set_c_negative(c_neg);
                None
            }
            _ => Some(GridSearch::new(self.folds).select_c(
                &mut self.trainer,
                &features,
                &labels,
            )?),
        };

        let model = self.trainer.train(&features, &labels)?;
        let evaluation = Evaluator::evaluate(&model, &self.data.test, &feature_set)?;
        Ok(RunOutcome {
            model,
            search,
            evaluation,
            feature_set,
        })
    }

    /// Score the test partition's unlabeled samples with a trained model
    /// and hand them to the router
    pub fn route_unlabeled<R: Router>(
        &self,
        model: &T::Model,
        selection: &FeatureSelection,
        router: &mut R,
    ) -> Result<usize> {
        let feature_set = selection.indices(self.data.num_feat)?;
        Evaluator::route_unlabeled(model, &self.data.test, &feature_set, router)
    }
}
