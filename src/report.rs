//! Human-readable reporting over structured results
//!
//! Evaluations and search outcomes are plain data; this module is the
//! presentation layer that renders them into a prediction log file or a
//! console summary block.

use crate::core::{Label, Result, TuneError};
use crate::eval::Evaluation;
use crate::search::SearchOutcome;
use chrono::Utc;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Append-style writer for per-run prediction logs
pub struct PredictionLog {
    writer: BufWriter<File>,
}

impl PredictionLog {
    /// Create the log file and write its header
    pub fn create<P: AsRef<Path>>(path: P, source: &str) -> Result<Self> {
        let file = File::create(&path).map_err(TuneError::IoError)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "**************")?;
        writeln!(
            writer,
            "# svmtune {} - {}",
            crate::VERSION,
            Utc::now().to_rfc3339()
        )?;
        writeln!(writer, "# source: {source}")?;
        Ok(Self { writer })
    }

    /// Append the search trace of one run
    pub fn write_search(&mut self, search: &SearchOutcome) -> Result<()> {
        writeln!(
            self.writer,
            "- Best C: {} (score {:.4})",
            search.best_c, search.best_score
        )?;
        for trial in &search.trials {
            writeln!(
                self.writer,
                "    C {:>10.2}  accuracy {:.4} {:.4}",
                trial.c, trial.accuracy.positive, trial.accuracy.negative
            )?;
        }
        Ok(())
    }

    /// Append the per-sample table and summary block of one evaluation
    pub fn write_evaluation(
        &mut self,
        evaluation: &Evaluation,
        feature_set: &[usize],
    ) -> Result<()> {
        writeln!(self.writer, "- Features: {feature_set:?}")?;
        writeln!(self.writer, "{:-<72}", "")?;
        writeln!(
            self.writer,
            "{:>6} | {:>12} | {:>5} | comment",
            "#", "score", "label"
        )?;
        writeln!(self.writer, "{:-<72}", "")?;
        for record in &evaluation.records {
            let marker = if record.is_false_positive() {
                "  FP"
            } else if record.is_false_negative() {
                "  FN"
            } else {
                ""
            };
            writeln!(
                self.writer,
                "{:>6} | {:>12.5} | {:>5} | {}{}",
                record.index + 1,
                record.score,
                label_text(record.label),
                record.annotation.as_deref().unwrap_or(""),
                marker
            )?;
        }
        writeln!(self.writer, "{}", format_summary(evaluation))?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Render the summary block of an evaluation
pub fn format_summary(evaluation: &Evaluation) -> String {
    format!(
        "Incorrect +1 classified: {} / {}\n\
         Incorrect -1 classified: {} / {}\n\
         FN/P : {}\n\
         FP/N : {}",
        evaluation.false_negatives,
        evaluation.positives,
        evaluation.false_positives,
        evaluation.negatives,
        rate_text(evaluation.false_negative_rate()),
        rate_text(evaluation.false_positive_rate())
    )
}

fn rate_text(rate: Option<f64>) -> String {
    match rate {
        Some(r) => format!("{r:.3}"),
        None => "undefined (no instances)".to_string(),
    }
}

fn label_text(label: Label) -> &'static str {
    match label {
        Label::Positive => "+1",
        Label::Negative => "-1",
        Label::Unlabeled => "0",
    }
}
