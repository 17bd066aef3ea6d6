// ============================================================
// Layer 4 — Dataset Split
// ============================================================
// Loads every review, normalises its text, maps its label to
// 1 (positive) / 0 (negative) and splits the result into three
// disjoint partitions:
//
//   all reviews ──shuffle(seed)──► train 80% │ held-out 20%
//   held-out    ──shuffle(seed)──► val   50% │ test     50%
//
// Both stages use the same seed, so a fixed file and seed always
// reproduce the same train/val/test partitions.

use serde::{Deserialize, Serialize};

use crate::data::preprocessor::normalize;
use crate::data::splitter::shuffle_split;
use crate::domain::traits::ReviewSource;
use crate::error::{Result, SentimentError};

/// Fraction of all reviews held out from training
pub const HELD_OUT_FRACTION: f64 = 0.2;

/// Fraction of the held-out reviews that becomes the test set
pub const TEST_FRACTION_OF_HELD_OUT: f64 = 0.5;

/// Cleaned texts with their aligned 0/1 labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub texts:  Vec<String>,
    pub labels: Vec<u8>,
}

impl Partition {
    fn from_pairs(pairs: Vec<(String, u8)>) -> Self {
        let (texts, labels) = pairs.into_iter().unzip();
        Self { texts, labels }
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSplit {
    pub train: Partition,
    pub val:   Partition,
    pub test:  Partition,
}

impl DatasetSplit {
    /// `(train_x, val_x, test_x, train_y, val_y, test_y)`
    #[allow(clippy::type_complexity)]
    pub fn into_parts(
        self,
    ) -> (Vec<String>, Vec<String>, Vec<String>, Vec<u8>, Vec<u8>, Vec<u8>) {
        (
            self.train.texts,
            self.val.texts,
            self.test.texts,
            self.train.labels,
            self.val.labels,
            self.test.labels,
        )
    }
}

/// Load, normalise and split every review from `source`.
pub fn load_dataset(source: &dyn ReviewSource, seed: u64) -> Result<DatasetSplit> {
    let reviews = source.load_all()?;

    let pairs: Vec<(String, u8)> = reviews
        .iter()
        .map(|r| (normalize(&r.text), r.sentiment.label()))
        .collect();
    let total = pairs.len();

    let (train, held_out) = shuffle_split(pairs, HELD_OUT_FRACTION, seed);
    let (val, test)       = shuffle_split(held_out, TEST_FRACTION_OF_HELD_OUT, seed);

    if train.is_empty() || val.is_empty() || test.is_empty() {
        return Err(SentimentError::Data(format!(
            "dataset too small to split: {total} reviews gave {} train / {} val / {} test",
            train.len(),
            val.len(),
            test.len(),
        )));
    }

    let split = DatasetSplit {
        train: Partition::from_pairs(train),
        val:   Partition::from_pairs(val),
        test:  Partition::from_pairs(test),
    };
    tracing::info!(
        "Split {} reviews: {} train, {} validation, {} test",
        total,
        split.train.len(),
        split.val.len(),
        split.test.len(),
    );
    Ok(split)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::review::{ReviewRecord, Sentiment};

    struct InMemorySource(Vec<ReviewRecord>);

    impl ReviewSource for InMemorySource {
        fn load_all(&self) -> Result<Vec<ReviewRecord>> {
            Ok(self.0.clone())
        }
    }

    fn numbered_reviews(n: usize) -> InMemorySource {
        // Words are unique per review so partitions can be compared by text
        let words = ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel"];
        InMemorySource(
            (0..n)
                .map(|i| {
                    let text = format!("review {} {}", words[i % 8], words[(i / 8) % 8]);
                    let s = if i % 2 == 0 { Sentiment::Positive } else { Sentiment::Negative };
                    ReviewRecord::new(format!("{text} {}", "x".repeat(i + 1)), s)
                })
                .collect(),
        )
    }

    #[test]
    fn test_partition_sizes_follow_80_10_10() {
        let split = load_dataset(&numbered_reviews(100), 42).unwrap();
        assert_eq!(split.train.len(), 80);
        assert_eq!(split.val.len(), 10);
        assert_eq!(split.test.len(), 10);
    }

    #[test]
    fn test_rounding_on_uneven_sizes() {
        // held-out = ceil(0.2 * 53) = 11, test = ceil(11 / 2) = 6
        let split = load_dataset(&numbered_reviews(53), 42).unwrap();
        assert_eq!(split.train.len(), 42);
        assert_eq!(split.val.len(), 5);
        assert_eq!(split.test.len(), 6);
    }

    #[test]
    fn test_reproducible_for_same_seed() {
        let a = load_dataset(&numbered_reviews(60), 42).unwrap();
        let b = load_dataset(&numbered_reviews(60), 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_partitions_are_disjoint() {
        let split = load_dataset(&numbered_reviews(60), 42).unwrap();
        let mut all: Vec<&String> = split
            .train
            .texts
            .iter()
            .chain(&split.val.texts)
            .chain(&split.test.texts)
            .collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);
        assert_eq!(total, 60);
    }

    #[test]
    fn test_texts_are_normalised_and_labels_mapped() {
        let source = InMemorySource(
            (0..10)
                .map(|i| ReviewRecord::new(format!("The <b>BEST</b> film #{i}"), Sentiment::Positive))
                .collect(),
        );
        let split = load_dataset(&source, 42).unwrap();
        assert!(split.train.texts.iter().all(|t| t == "best film"));
        assert!(split.train.labels.iter().all(|&l| l == 1));
    }

    #[test]
    fn test_into_parts_keeps_alignment() {
        let split = load_dataset(&numbered_reviews(20), 42).unwrap();
        let expected_val = split.val.clone();
        let (_, val_x, _, _, val_y, _) = split.into_parts();
        assert_eq!(val_x, expected_val.texts);
        assert_eq!(val_y, expected_val.labels);
    }

    #[test]
    fn test_too_small_dataset_is_data_error() {
        let err = load_dataset(&numbered_reviews(2), 42).unwrap_err();
        assert!(matches!(err, SentimentError::Data(_)));
    }
}
