//! Feature file format
//!
//! One dataset per file, line oriented:
//! - lines beginning with `#` are comments
//! - one comment line must declare the feature count as `...: <count>`
//!   before the end of the file, e.g. `# number of features: 30`
//! - data lines: `<label> <idx>:<value> <idx>:<value> ... [# annotation]`
//!
//! The label is a real number: positive values mark the positive class,
//! negative values the negative class, and exactly zero marks a sample to
//! be routed at prediction time. Feature indices are not honored as sparse
//! addresses; values append in token order.

use crate::core::{Label, Result, Sample, SampleSet, TuneError};
use log::{debug, info};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Reader for the feature file format
pub struct FeatureFileReader;

impl FeatureFileReader {
    /// Load a sample set from a feature file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SampleSet> {
        let file = File::open(&path).map_err(TuneError::IoError)?;
        let set = Self::from_reader(BufReader::new(file))?;
        info!(
            "Finished reading {}: {} samples ({} positive, {} negative)",
            path.as_ref().display(),
            set.len(),
            set.num_pos(),
            set.num_neg()
        );
        Ok(set)
    }

    /// Load a sample set from any buffered reader (for testing and flexibility)
    pub fn from_reader<R: BufRead>(reader: R) -> Result<SampleSet> {
        let lines: Vec<String> = reader
            .lines()
            .collect::<std::io::Result<_>>()
            .map_err(TuneError::IoError)?;

        let num_feat = Self::find_feature_count(&lines)?;
        debug!("Declared feature count: {num_feat}");

        let mut set = SampleSet::new(num_feat);
        for (line_num, line) in lines.iter().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let sample = Self::parse_line(line).map_err(|e| {
                TuneError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
            })?;
            if sample.num_features() != num_feat {
                return Err(TuneError::DimensionMismatch {
                    expected: num_feat,
                    actual: sample.num_features(),
                });
            }
            set.push(sample)?;
        }

        if set.is_empty() {
            return Err(TuneError::EmptyDataset);
        }
        Ok(set)
    }

    /// Scan for the feature count header: the first comment line containing
    /// `...: <integer>` (before any further `#` on that line) declares the
    /// feature count. A count of zero never matches.
    fn find_feature_count(lines: &[String]) -> Result<usize> {
        let header = Regex::new(r"^#[^#]*:\s*(?P<count>\d+)").expect("valid header pattern");
        for line in lines {
            let trimmed = line.trim_start();
            if !trimmed.starts_with('#') {
                continue;
            }
            if let Some(caps) = header.captures(trimmed) {
                if let Ok(count) = caps["count"].parse::<usize>() {
                    if count > 0 {
                        return Ok(count);
                    }
                }
            }
        }
        Err(TuneError::MissingFeatureCount)
    }

    /// Parse a single data line
    fn parse_line(line: &str) -> Result<Sample> {
        // Everything after the first '#' is the annotation
        let (data_part, annotation) = match line.find('#') {
            Some(pos) => {
                let comment = line[pos + 1..].trim();
                (
                    &line[..pos],
                    (!comment.is_empty()).then(|| comment.to_string()),
                )
            }
            None => (line, None),
        };

        let mut tokens = data_part.split_whitespace();
        let label_token = tokens
            .next()
            .ok_or_else(|| TuneError::ParseError("Empty data line".to_string()))?;
        let raw_label = label_token
            .parse::<f64>()
            .map_err(|_| TuneError::ParseError(format!("Invalid label: {label_token}")))?;

        let mut values = Vec::new();
        for token in tokens {
            let (index_str, value_str) = token.split_once(':').ok_or_else(|| {
                TuneError::ParseError(format!("Invalid feature format: {token}"))
            })?;
            // The index is validated but not used as an address
            index_str.parse::<usize>().map_err(|_| {
                TuneError::ParseError(format!("Invalid feature index: {index_str}"))
            })?;
            let value = value_str.parse::<f64>().map_err(|_| {
                TuneError::ParseError(format!("Invalid feature value: {value_str}"))
            })?;
            values.push(value);
        }

        Ok(Sample {
            features: values,
            label: Label::from_raw(raw_label),
            annotation,
        })
    }
}

/// Write a sample set in the feature file format, with a feature count
/// header line the reader accepts.
pub fn write_file<P: AsRef<Path>>(set: &SampleSet, path: P) -> Result<()> {
    let file = File::create(&path).map_err(TuneError::IoError)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# features: {}", set.num_feat())?;
    for sample in set.iter() {
        let label = match sample.label {
            Label::Positive => "+1",
            Label::Negative => "-1",
            Label::Unlabeled => "0",
        };
        write!(writer, "{label}")?;
        for (i, value) in sample.features.iter().enumerate() {
            write!(writer, " {}:{}", i + 1, value)?;
        }
        if let Some(annotation) = &sample.annotation {
            write!(writer, " # {annotation}")?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    debug!("Wrote {} samples to {}", set.len(), path.as_ref().display());
    Ok(())
}
