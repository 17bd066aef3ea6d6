// Shared fixtures for unit tests: a tiny labelled corpus and a
// classifier fitted on it.

use std::path::{Path, PathBuf};

use crate::data::preprocessor::normalize;
use crate::infra::metrics::MetricsLogger;
use crate::ml::inferencer::SentimentPredictor;
use crate::ml::model::SentimentClassifier;
use crate::ml::trainer::{run_training, FitConfig, InnerBackend, LabelledRows};
use crate::ml::vectorizer::{TfidfVectorizer, VectorizerConfig};

const POSITIVE: [&str; 6] = [
    "A wonderful film with brilliant acting",
    "Loved it, brilliant and wonderful story",
    "Great cast, <br/>wonderful direction",
    "Brilliant script and great pacing",
    "An absolute delight, loved every scene",
    "Great fun, wonderful soundtrack",
];

const NEGATIVE: [&str; 6] = [
    "A terrible film with awful acting",
    "Hated it, boring and awful story",
    "Dreadful cast, <br/>terrible direction",
    "Awful script and boring pacing",
    "An absolute mess, hated every scene",
    "Boring, terrible soundtrack",
];

pub struct FittedModel {
    pub vectorizer: TfidfVectorizer,
    pub model:      SentimentClassifier<InnerBackend>,
}

impl FittedModel {
    pub fn predictor(&self) -> SentimentPredictor {
        SentimentPredictor::new(self.vectorizer.clone(), self.model.clone()).unwrap()
    }
}

/// Raw reviews and labels, interleaved positive/negative.
pub fn labelled_reviews() -> (Vec<String>, Vec<u8>) {
    let mut texts  = Vec::new();
    let mut labels = Vec::new();
    for (p, n) in POSITIVE.iter().zip(NEGATIVE.iter()) {
        texts.push(p.to_string());
        labels.push(1);
        texts.push(n.to_string());
        labels.push(0);
    }
    (texts, labels)
}

pub fn held_out_texts() -> Vec<String> {
    vec![
        "wonderful brilliant film".into(),
        "awful boring mess".into(),
        "the story".into(),
        "".into(),
    ]
}

pub fn fit_small_model() -> FittedModel {
    let (texts, labels) = labelled_reviews();
    let cleaned: Vec<String> = texts.iter().map(|t| normalize(t)).collect();
    let vectorizer = TfidfVectorizer::fit(&cleaned, VectorizerConfig::default()).unwrap();
    let rows = vectorizer.transform_all(&cleaned);

    let dir = tempfile::tempdir().unwrap();
    let log = MetricsLogger::new(dir.path()).unwrap();
    let cfg = FitConfig { max_iter: 80, batch_size: 4, learning_rate: 0.1, ..FitConfig::default() };
    let outcome = run_training(
        &cfg,
        vectorizer.n_features(),
        LabelledRows::new(&rows, &labels),
        LabelledRows::new(&rows, &labels),
        &log,
    )
    .unwrap();

    FittedModel { vectorizer, model: outcome.model }
}

/// Write a review CSV with a header row and return its path.
pub fn write_review_csv(dir: &Path, copies: usize) -> PathBuf {
    let (texts, labels) = labelled_reviews();
    let path = dir.join("reviews.csv");
    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer.write_record(["review", "sentiment"]).unwrap();
    for _ in 0..copies {
        for (t, &y) in texts.iter().zip(&labels) {
            let label = if y == 1 { "positive" } else { "negative" };
            writer.write_record([t.as_str(), label]).unwrap();
        }
    }
    writer.flush().unwrap();
    path
}
