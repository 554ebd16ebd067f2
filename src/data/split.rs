//! Class-balanced train/test splitting
//!
//! Consumes a pooled sample set and partitions it so that the training set
//! holds the same number of samples per class, with everything left over
//! going to the test set in traversal order. The shuffle preceding the
//! partition is deterministic: repeated runs on the same input produce the
//! same split.

use crate::core::{Label, Result, Sample, SampleSet, TuneError};
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Default shuffle seed. Splits are reproducible across runs unless the
/// caller injects a different seed.
pub const DEFAULT_SEED: u64 = 12345;

/// How much of the pooled data goes into training, expressed either as a
/// fixed per-class sample count or as a fraction of the smaller class.
///
/// `Fraction(1.0)` selects train-only mode, `Fraction(0.0)` test-only mode;
/// both skip shuffling and preserve file order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrainTestRatio {
    /// Fixed number of training samples per class
    Count(usize),
    /// Fraction of the smaller class size, in `[0, 1]`
    Fraction(f64),
}

impl TrainTestRatio {
    /// Train-only mode: every sample that fits the per-class quota trains
    pub fn train_only() -> Self {
        TrainTestRatio::Fraction(1.0)
    }

    /// Test-only mode: every sample is held out
    pub fn test_only() -> Self {
        TrainTestRatio::Fraction(0.0)
    }

    /// Per-class training sample count implied by this ratio.
    ///
    /// A count must not exceed the smaller class; a fraction rounds half up
    /// on the smaller class size.
    pub fn resolve(&self, num_pos: usize, num_neg: usize) -> Result<usize> {
        let min_class = num_pos.min(num_neg);
        match *self {
            TrainTestRatio::Count(n) => {
                if n > min_class {
                    return Err(TuneError::InvalidSplit(format!(
                        "Requested {n} training samples per class, but the smaller class has only {min_class}"
                    )));
                }
                Ok(n)
            }
            TrainTestRatio::Fraction(r) => {
                if !(0.0..=1.0).contains(&r) {
                    return Err(TuneError::InvalidSplit(format!(
                        "Training fraction must lie in [0, 1], got {r}"
                    )));
                }
                Ok((min_class as f64 * r + 0.5) as usize)
            }
        }
    }
}

/// Disjoint partition of one pooled set
#[derive(Debug, Clone)]
pub struct SplitSets {
    pub train: SampleSet,
    pub test: SampleSet,
    /// Effective training fraction of the smaller class
    pub ratio: f64,
}

/// Deterministic, quota-based splitter
#[derive(Debug, Clone)]
pub struct BalancedSplitter {
    seed: u64,
}

impl Default for BalancedSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl BalancedSplitter {
    /// Splitter with the default fixed seed
    pub fn new() -> Self {
        Self { seed: DEFAULT_SEED }
    }

    /// Splitter with an injected seed (deterministic per seed)
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// Partition a pooled set into train and test.
    ///
    /// The pooled set is consumed, so a dataset can only be split once.
    /// Samples are shuffled first unless the effective ratio is exactly 0
    /// or 1, then assigned in a single pass: a sample trains while its
    /// class quota is open and tests otherwise. The test set inherits
    /// whatever class balance the traversal leaves behind.
    pub fn split(&self, set: SampleSet, ratio: TrainTestRatio) -> Result<SplitSets> {
        if set.is_empty() {
            return Err(TuneError::EmptyDataset);
        }

        let num_feat = set.num_feat();
        let min_class = set.num_pos().min(set.num_neg());
        let num_train = ratio.resolve(set.num_pos(), set.num_neg())?;
        let effective = match ratio {
            TrainTestRatio::Fraction(r) => r,
            TrainTestRatio::Count(n) => {
                if min_class == 0 {
                    0.0
                } else {
                    n as f64 / min_class as f64
                }
            }
        };

        let mut samples = set.into_samples();
        if effective > 0.0 && effective < 1.0 {
            self.shuffle(&mut samples);
            debug!("Shuffled {} samples with seed {}", samples.len(), self.seed);
        }

        let mut train = SampleSet::new(num_feat);
        let mut test = SampleSet::new(num_feat);
        let mut train_pos = 0usize;
        let mut train_neg = 0usize;
        for sample in samples {
            match sample.label {
                Label::Positive if train_pos < num_train => {
                    train_pos += 1;
                    train.push(sample)?;
                }
                Label::Negative | Label::Unlabeled if train_neg < num_train => {
                    train_neg += 1;
                    train.push(sample)?;
                }
                _ => test.push(sample)?,
            }
        }

        info!(
            "Split into {} training and {} test samples (quota {num_train} per class)",
            train.len(),
            test.len()
        );
        Ok(SplitSets {
            train,
            test,
            ratio: effective,
        })
    }

    /// Fisher-Yates pass over the pooled samples, seeded ChaCha stream
    fn shuffle(&self, samples: &mut [Sample]) {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        for i in (1..samples.len()).rev() {
            let j = rng.gen_range(0..=i);
            samples.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pooled set with `pos` positive and `neg` negative samples, each
    /// sample carrying a unique feature value for identity tracking
    fn make_pool(pos: usize, neg: usize) -> SampleSet {
        let mut set = SampleSet::new(1);
        for i in 0..pos {
            set.push(Sample::new(vec![i as f64], Label::Positive))
                .unwrap();
        }
        for i in 0..neg {
            set.push(Sample::new(vec![1000.0 + i as f64], Label::Negative))
                .unwrap();
        }
        set
    }

    fn values(set: &SampleSet) -> Vec<f64> {
        set.iter().map(|s| s.features[0]).collect()
    }

    #[test]
    fn test_resolve_count() {
        assert_eq!(TrainTestRatio::Count(5).resolve(10, 8).unwrap(), 5);
        assert_eq!(TrainTestRatio::Count(0).resolve(10, 8).unwrap(), 0);
        assert!(TrainTestRatio::Count(9).resolve(10, 8).is_err());
    }

    #[test]
    fn test_resolve_fraction_rounds_half_up() {
        // 5 * 0.5 = 2.5 rounds up to 3
        assert_eq!(TrainTestRatio::Fraction(0.5).resolve(9, 5).unwrap(), 3);
        assert_eq!(TrainTestRatio::Fraction(1.0).resolve(9, 5).unwrap(), 5);
        assert_eq!(TrainTestRatio::Fraction(0.0).resolve(9, 5).unwrap(), 0);
        assert!(TrainTestRatio::Fraction(1.5).resolve(9, 5).is_err());
        assert!(TrainTestRatio::Fraction(-0.1).resolve(9, 5).is_err());
    }

    #[test]
    fn test_split_sizes_and_quotas() {
        let pool = make_pool(20, 12);
        let split = BalancedSplitter::new()
            .split(pool, TrainTestRatio::Count(10))
            .unwrap();

        assert_eq!(split.train.len() + split.test.len(), 32);
        assert_eq!(split.train.num_pos(), 10);
        assert_eq!(split.train.num_neg(), 10);
        // Everything else lands in test, however imbalanced
        assert_eq!(split.test.num_pos(), 10);
        assert_eq!(split.test.num_neg(), 2);
    }

    #[test]
    fn test_split_is_disjoint() {
        let pool = make_pool(15, 15);
        let split = BalancedSplitter::new()
            .split(pool, TrainTestRatio::Fraction(0.6))
            .unwrap();

        let train: std::collections::HashSet<u64> =
            values(&split.train).iter().map(|v| v.to_bits()).collect();
        for v in values(&split.test) {
            assert!(!train.contains(&v.to_bits()), "sample {v} in both partitions");
        }
    }

    #[test]
    fn test_split_is_deterministic() {
        let a = BalancedSplitter::new()
            .split(make_pool(30, 25), TrainTestRatio::Fraction(0.5))
            .unwrap();
        let b = BalancedSplitter::new()
            .split(make_pool(30, 25), TrainTestRatio::Fraction(0.5))
            .unwrap();

        assert_eq!(values(&a.train), values(&b.train));
        assert_eq!(values(&a.test), values(&b.test));
    }

    #[test]
    fn test_seed_changes_the_shuffle() {
        let a = BalancedSplitter::new()
            .split(make_pool(30, 25), TrainTestRatio::Fraction(0.5))
            .unwrap();
        let b = BalancedSplitter::with_seed(99)
            .split(make_pool(30, 25), TrainTestRatio::Fraction(0.5))
            .unwrap();

        assert_ne!(values(&a.train), values(&b.train));
    }

    #[test]
    fn test_train_only_preserves_file_order() {
        let pool = make_pool(4, 4);
        let split = BalancedSplitter::new()
            .split(pool, TrainTestRatio::train_only())
            .unwrap();

        assert_eq!(split.train.len(), 8);
        assert!(split.test.is_empty());
        assert_eq!(
            values(&split.train),
            vec![0.0, 1.0, 2.0, 3.0, 1000.0, 1001.0, 1002.0, 1003.0]
        );
    }

    #[test]
    fn test_test_only_preserves_file_order() {
        let pool = make_pool(3, 2);
        let split = BalancedSplitter::new()
            .split(pool, TrainTestRatio::test_only())
            .unwrap();

        assert!(split.train.is_empty());
        assert_eq!(values(&split.test), vec![0.0, 1.0, 2.0, 1000.0, 1001.0]);
        assert_eq!(split.ratio, 0.0);
    }

    #[test]
    fn test_unlabeled_fills_negative_quota() {
        let mut pool = SampleSet::new(1);
        pool.push(Sample::new(vec![1.0], Label::Positive)).unwrap();
        pool.push(Sample::new(vec![2.0], Label::Unlabeled)).unwrap();
        pool.push(Sample::new(vec![3.0], Label::Negative)).unwrap();

        let split = BalancedSplitter::new()
            .split(pool, TrainTestRatio::Count(1))
            .unwrap();

        // The unlabeled sample came first and took the negative slot
        assert_eq!(values(&split.train), vec![1.0, 2.0]);
        assert_eq!(values(&split.test), vec![3.0]);
    }

    #[test]
    fn test_empty_pool_rejected() {
        let pool = SampleSet::new(1);
        let result = BalancedSplitter::new().split(pool, TrainTestRatio::Fraction(0.5));
        assert!(matches!(result, Err(TuneError::EmptyDataset)));
    }
}
