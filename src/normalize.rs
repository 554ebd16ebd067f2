//! Training-set standardization
//!
//! Fits per-feature mean and precision (inverse standard deviation) on the
//! training partition and applies the same transform, in place, to train
//! and test data alike. Fitting on anything but the training partition
//! would leak test data into the model; the pipeline never does.

use crate::core::{NormStats, Result, SampleSet, TuneError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Z-score standardization with training-set statistics
pub struct Standardizer;

impl Standardizer {
    /// Compute per-feature statistics from a training set.
    ///
    /// Mean is the arithmetic mean; variance uses the n-1 denominator and
    /// precision is `1 / sqrt(variance)`. Needs at least two samples.
    /// A constant feature has no finite precision and is rejected rather
    /// than yielding an infinite factor.
    pub fn fit(train: &SampleSet) -> Result<NormStats> {
        let n = train.len();
        if n < 2 {
            return Err(TuneError::InvalidDataset(format!(
                "Standardization needs at least 2 samples, got {n}"
            )));
        }

        let num_feat = train.num_feat();
        let mut mean = vec![0.0; num_feat];
        for sample in train.iter() {
            for (m, v) in mean.iter_mut().zip(&sample.features) {
                *m += v;
            }
        }
        for m in mean.iter_mut() {
            *m /= n as f64;
        }

        let mut precision = vec![0.0; num_feat];
        for sample in train.iter() {
            for (p, (v, m)) in precision
                .iter_mut()
                .zip(sample.features.iter().zip(&mean))
            {
                *p += (v - m) * (v - m);
            }
        }
        for (feature, p) in precision.iter_mut().enumerate() {
            let variance = *p / (n as f64 - 1.0);
            if variance == 0.0 {
                return Err(TuneError::ZeroVariance { feature });
            }
            *p = 1.0 / variance.sqrt();
        }

        debug!("Computed training statistics over {n} samples");
        Ok(NormStats::new(mean, precision))
    }

    /// Standardize every feature of every sample in place:
    /// `value = (value - mean) * precision`.
    ///
    /// No-op on an empty set. Re-applying transforms the values again;
    /// this is not idempotent.
    pub fn apply(set: &mut SampleSet, stats: &NormStats) -> Result<()> {
        if set.is_empty() {
            return Ok(());
        }
        if stats.len() != set.num_feat() {
            return Err(TuneError::DimensionMismatch {
                expected: set.num_feat(),
                actual: stats.len(),
            });
        }
        for sample in set.samples_mut() {
            for (v, (m, p)) in sample
                .features
                .iter_mut()
                .zip(stats.mean.iter().zip(&stats.precision))
            {
                *v = (*v - m) * p;
            }
        }
        Ok(())
    }
}

/// On-disk form of [`NormStats`] with provenance metadata
#[derive(Serialize, Deserialize)]
struct SavedStats {
    mean: Vec<f64>,
    precision: Vec<f64>,
    library_version: String,
    created_at: String,
}

impl NormStats {
    /// Save statistics as JSON so a later test-only run can reuse them
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(TuneError::IoError)?;
        let writer = BufWriter::new(file);
        let saved = SavedStats {
            mean: self.mean.clone(),
            precision: self.precision.clone(),
            library_version: crate::VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        serde_json::to_writer_pretty(writer, &saved)
            .map_err(|e| TuneError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load statistics written by [`NormStats::save_to_file`]
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(TuneError::IoError)?;
        let reader = BufReader::new(file);
        let saved: SavedStats = serde_json::from_reader(reader)
            .map_err(|e| TuneError::SerializationError(format!("Invalid statistics file: {e}")))?;
        if saved.mean.len() != saved.precision.len() {
            return Err(TuneError::SerializationError(
                "Statistics file has mismatched mean/precision lengths".to_string(),
            ));
        }
        info!(
            "Loaded statistics for {} features (written by version {})",
            saved.mean.len(),
            saved.library_version
        );
        Ok(NormStats {
            mean: saved.mean,
            precision: saved.precision,
        })
    }
}
