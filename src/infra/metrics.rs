// ============================================================
// Layer 6 — Metrics
// ============================================================
// Two kinds of numbers come out of a training run:
//
//   ClassificationMetrics — accuracy / precision / recall / F1
//                           on the validation partition, logged
//                           to the run and used by the registrar
//                           to pick the best run
//   EpochMetrics          — one row per pass over the training
//                           set, appended to a CSV file that is
//                           attached to the run as an artifact
//
// Positive class is label 1. A ratio with a zero denominator
// is reported as 0.0.
//
// Example training_log.csv:
//   epoch,train_loss,val_loss,val_accuracy
//   1,0.612345,0.598812,0.781000
//   2,0.488104,0.493327,0.842000

use std::{
    collections::BTreeMap,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Metric key the registrar ranks runs by
pub const F1_SCORE_KEY: &str = "f1_score";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy:  f64,
    pub precision: f64,
    pub recall:    f64,
    pub f1_score:  f64,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl ClassificationMetrics {
    /// Compare predictions against ground truth, element by element.
    /// Extra elements in the longer slice are ignored.
    pub fn compute(y_true: &[u8], y_pred: &[u8]) -> Self {
        let (mut tp, mut fp, mut fn_, mut correct) = (0usize, 0usize, 0usize, 0usize);
        let total = y_true.len().min(y_pred.len());

        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t == 1, p == 1) {
                (true, true)   => tp += 1,
                (false, true)  => fp += 1,
                (true, false)  => fn_ += 1,
                (false, false) => {}
            }
            if t == p {
                correct += 1;
            }
        }

        let precision = ratio(tp, tp + fp);
        let recall    = ratio(tp, tp + fn_);
        let f1_score  = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        Self {
            accuracy: ratio(correct, total),
            precision,
            recall,
            f1_score,
        }
    }

    /// Keyed the way they are written to a run
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("accuracy".to_string(),     self.accuracy),
            ("precision".to_string(),    self.precision),
            ("recall".to_string(),       self.recall),
            (F1_SCORE_KEY.to_string(),   self.f1_score),
        ])
    }
}

/// One row of the training log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Starts at 1
    pub epoch: usize,

    /// Mean cross-entropy over the training batches of this epoch
    pub train_loss: f64,

    /// Mean cross-entropy on the validation partition after the epoch
    pub val_loss: f64,

    pub val_accuracy: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, val_accuracy: f64) -> Self {
        Self { epoch, train_loss, val_loss, val_accuracy }
    }

    /// Returns true if this epoch improved over the previous best val_loss
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

/// Appends epoch metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create `dir` if needed and start a fresh `training_log.csv` in it.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("training_log.csv");
        let mut f    = fs::File::create(&csv_path)?;
        writeln!(f, "epoch,train_loss,val_loss,val_accuracy")?;
        tracing::debug!("Created training log: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch, m.train_loss, m.val_loss, m.val_accuracy,
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_definitions() {
        // tp=2, fp=1, fn=1, tn=1
        let y_true = [1, 1, 1, 0, 0];
        let y_pred = [1, 1, 0, 1, 0];
        let m = ClassificationMetrics::compute(&y_true, &y_pred);
        assert!((m.accuracy - 0.6).abs() < 1e-12);
        assert!((m.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.f1_score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_positive_predictions_gives_zero_not_nan() {
        let m = ClassificationMetrics::compute(&[1, 0, 1], &[0, 0, 0]);
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1_score, 0.0);
        assert!((m.accuracy - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input() {
        let m = ClassificationMetrics::compute(&[], &[]);
        assert_eq!(m.accuracy, 0.0);
        assert_eq!(m.f1_score, 0.0);
    }

    #[test]
    fn test_map_uses_run_metric_keys() {
        let m = ClassificationMetrics::compute(&[1, 0], &[1, 0]);
        let map = m.to_map();
        assert_eq!(map.keys().collect::<Vec<_>>(), ["accuracy", "f1_score", "precision", "recall"]);
        assert_eq!(map[F1_SCORE_KEY], 1.0);
    }

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics::new(2, 0.5, 0.3, 0.9);
        assert!(m.is_improvement(0.4));
        assert!(!m.is_improvement(0.2));
    }

    #[test]
    fn test_logger_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EpochMetrics::new(1, 0.69, 0.68, 0.55)).unwrap();
        logger.log(&EpochMetrics::new(2, 0.51, 0.52, 0.81)).unwrap();

        let contents = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "epoch,train_loss,val_loss,val_accuracy");
        assert_eq!(lines[1], "1,0.690000,0.680000,0.550000");
        assert_eq!(lines.len(), 3);
    }
}
