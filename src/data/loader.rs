// ============================================================
// Layer 4 — Review Loader
// ============================================================
// Reads labelled reviews from a CSV file with the csv crate.
//
// Expected layout (extra columns are ignored):
//
//   review,sentiment
//   "One of the other reviewers has mentioned...",positive
//   "Basically there's a family where a little boy...",negative
//
// Unlike a best-effort document crawl, a training dataset has
// to be complete: a missing file, a missing column or a row
// with an unknown label fails the whole load.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use csv::ReaderBuilder;

use crate::domain::review::{ReviewRecord, Sentiment};
use crate::domain::traits::ReviewSource;
use crate::error::{Result, SentimentError};

const REVIEW_COLUMN:    &str = "review";
const SENTIMENT_COLUMN: &str = "sentiment";

/// Loads reviews from one CSV file.
/// Implements the ReviewSource trait from Layer 3.
pub struct CsvReviewLoader {
    path: PathBuf,
}

impl CsvReviewLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReviewSource for CsvReviewLoader {
    fn load_all(&self) -> Result<Vec<ReviewRecord>> {
        let file = File::open(&self.path).map_err(|e| {
            SentimentError::Data(format!("cannot open dataset '{}': {e}", self.path.display()))
        })?;
        let mut rdr = ReaderBuilder::new().from_reader(BufReader::new(file));

        // Resolve column positions once from the header row
        let headers = rdr
            .headers()
            .map_err(|e| SentimentError::Data(format!("cannot read CSV header: {e}")))?
            .clone();
        let column = |name: &str| {
            headers.iter().position(|h| h.trim() == name).ok_or_else(|| {
                SentimentError::Data(format!(
                    "dataset '{}' is missing required column '{name}'",
                    self.path.display()
                ))
            })
        };
        let review_idx    = column(REVIEW_COLUMN)?;
        let sentiment_idx = column(SENTIMENT_COLUMN)?;

        let mut reviews = Vec::new();
        for (i, row) in rdr.records().enumerate() {
            // Header is line 1, so data row i sits on line i + 2
            let line = i + 2;
            let row  = row.map_err(|e| SentimentError::Data(format!("line {line}: {e}")))?;

            let text = row.get(review_idx).ok_or_else(|| {
                SentimentError::Data(format!("line {line}: missing '{REVIEW_COLUMN}' value"))
            })?;
            let sentiment: Sentiment = row
                .get(sentiment_idx)
                .ok_or_else(|| {
                    SentimentError::Data(format!("line {line}: missing '{SENTIMENT_COLUMN}' value"))
                })?
                .parse()
                .map_err(|e| SentimentError::Data(format!("line {line}: {e}")))?;

            reviews.push(ReviewRecord::new(text, sentiment));
        }

        tracing::info!(
            "Loaded {} reviews from '{}'",
            reviews.len(),
            self.path.display()
        );
        Ok(reviews)
    }
}
