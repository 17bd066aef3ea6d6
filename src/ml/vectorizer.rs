// ============================================================
// Layer 5 — TF-IDF Vectorizer
// ============================================================
// Maps cleaned text onto a fixed-length sparse feature vector.
//
// Fitting (training partition only):
//   1. Lowercase and tokenise with \b\w\w+\b (2+ word chars)
//   2. Expand tokens into n-grams (default 1..=2), space-joined
//   3. Keep the `max_features` n-grams with the highest count
//      across the corpus (ties: alphabetical)
//   4. Assign feature indices in alphabetical term order
//   5. Smooth IDF:  idf(t) = ln((1 + n_docs) / (1 + df(t))) + 1
//
// Transform:
//   value(t) = count(t in doc) * idf(t), then L2-normalised.
//   N-grams outside the fitted vocabulary are dropped, so text
//   seen only at transform time can never add a feature.
//
// Persisted as JSON: config + terms in index order + idf. The
// term → index lookup is rebuilt on deserialisation.

use std::collections::{BTreeMap, HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SentimentError};

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("hardcoded regex is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Vocabulary cap
    pub max_features: usize,
    pub ngram_min:    usize,
    pub ngram_max:    usize,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 5000,
            ngram_min:    1,
            ngram_max:    2,
        }
    }
}

impl VectorizerConfig {
    /// "(1, 2)" style label used when logging run parameters
    pub fn ngram_range_label(&self) -> String {
        format!("({}, {})", self.ngram_min, self.ngram_max)
    }
}

/// Sparse row of a fixed `dim`. Indices are strictly ascending.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SparseVector {
    pub dim:     usize,
    pub indices: Vec<u32>,
    pub values:  Vec<f32>,
}

impl SparseVector {
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Scatter into a zeroed dense row of length `dim`.
    pub fn write_dense(&self, row: &mut [f32]) {
        for (&i, &v) in self.indices.iter().zip(&self.values) {
            row[i as usize] = v;
        }
    }

    pub fn to_dense(&self) -> Vec<f32> {
        let mut row = vec![0.0; self.dim];
        self.write_dense(&mut row);
        row
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "VectorizerState", into = "VectorizerState")]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    terms:  Vec<String>,
    idf:    Vec<f64>,
    index:  HashMap<String, u32>,
}

/// On-disk shape of a fitted vectorizer.
#[derive(Serialize, Deserialize)]
struct VectorizerState {
    config: VectorizerConfig,
    terms:  Vec<String>,
    idf:    Vec<f64>,
}

impl From<TfidfVectorizer> for VectorizerState {
    fn from(v: TfidfVectorizer) -> Self {
        Self {
            config: v.config,
            terms:  v.terms,
            idf:    v.idf,
        }
    }
}

impl TryFrom<VectorizerState> for TfidfVectorizer {
    type Error = String;

    fn try_from(state: VectorizerState) -> std::result::Result<Self, Self::Error> {
        if state.terms.len() != state.idf.len() {
            return Err(format!(
                "vectorizer has {} terms but {} idf weights",
                state.terms.len(),
                state.idf.len()
            ));
        }
        let index = build_index(&state.terms);
        if index.len() != state.terms.len() {
            return Err("vectorizer vocabulary contains duplicate terms".to_string());
        }
        Ok(Self {
            config: state.config,
            terms:  state.terms,
            idf:    state.idf,
            index,
        })
    }
}

fn build_index(terms: &[String]) -> HashMap<String, u32> {
    terms
        .iter()
        .enumerate()
        .map(|(i, t)| (t.clone(), i as u32))
        .collect()
}

/// Lowercase, tokenise and expand into n-grams.
fn analyze(config: &VectorizerConfig, doc: &str) -> Vec<String> {
    let lowered = doc.to_lowercase();
    let tokens: Vec<&str> = TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .collect();

    let mut grams = Vec::new();
    for n in config.ngram_min.max(1)..=config.ngram_max {
        if tokens.len() < n {
            break;
        }
        grams.extend(tokens.windows(n).map(|w| w.join(" ")));
    }
    grams
}

impl TfidfVectorizer {
    /// Learn the vocabulary and IDF weights from `documents`.
    pub fn fit(documents: &[String], config: VectorizerConfig) -> Result<Self> {
        if documents.is_empty() {
            return Err(SentimentError::Training(
                "cannot fit vectorizer on an empty corpus".into(),
            ));
        }

        let mut corpus_count: HashMap<String, u64> = HashMap::new();
        let mut doc_freq:     HashMap<String, u64> = HashMap::new();

        for doc in documents {
            let grams = analyze(&config, doc);
            let mut seen: HashSet<&str> = HashSet::with_capacity(grams.len());
            for gram in &grams {
                *corpus_count.entry(gram.clone()).or_insert(0) += 1;
                if seen.insert(gram.as_str()) {
                    *doc_freq.entry(gram.clone()).or_insert(0) += 1;
                }
            }
        }

        if corpus_count.is_empty() {
            return Err(SentimentError::Training(
                "vectorizer found no tokens in the training corpus".into(),
            ));
        }

        // Top-k by corpus count, ties broken alphabetically
        let mut ranked: Vec<(String, u64)> = corpus_count.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(config.max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t).collect();
        terms.sort();

        let n_docs = documents.len() as f64;
        let idf: Vec<f64> = terms
            .iter()
            .map(|t| {
                let df = doc_freq.get(t).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        tracing::info!(
            "Fitted TF-IDF vocabulary: {} features (cap {}, ngram range {}) from {} documents",
            terms.len(),
            config.max_features,
            config.ngram_range_label(),
            documents.len(),
        );

        let index = build_index(&terms);
        Ok(Self { config, terms, idf, index })
    }

    /// Vectorise one document against the fitted vocabulary.
    pub fn transform(&self, doc: &str) -> SparseVector {
        let mut counts: BTreeMap<u32, f64> = BTreeMap::new();
        for gram in analyze(&self.config, doc) {
            if let Some(&i) = self.index.get(&gram) {
                *counts.entry(i).or_insert(0.0) += 1.0;
            }
        }

        let weighted: Vec<(u32, f64)> = counts
            .into_iter()
            .map(|(i, tf)| (i, tf * self.idf[i as usize]))
            .collect();
        let norm = weighted.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();

        let (indices, values) = weighted
            .into_iter()
            .map(|(i, v)| {
                let v = if norm > 0.0 { v / norm } else { v };
                (i, v as f32)
            })
            .unzip();

        SparseVector {
            dim: self.n_features(),
            indices,
            values,
        }
    }

    pub fn transform_all(&self, docs: &[String]) -> Vec<SparseVector> {
        docs.iter().map(|d| self.transform(d)).collect()
    }

    pub fn n_features(&self) -> usize {
        self.terms.len()
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Terms in feature-index order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn feature_index(&self, term: &str) -> Option<u32> {
        self.index.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.feature_index(term).map(|i| self.idf[i as usize])
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_vocabulary_includes_bigrams_in_alphabetical_order() {
        let v = TfidfVectorizer::fit(&docs(&["good movie", "bad movie"]), VectorizerConfig::default())
            .unwrap();
        assert_eq!(
            v.terms(),
            &["bad", "bad movie", "good", "good movie", "movie"]
        );
    }

    #[test]
    fn test_single_character_tokens_are_ignored() {
        let v = TfidfVectorizer::fit(&docs(&["a great b film"]), VectorizerConfig::default()).unwrap();
        assert!(v.feature_index("a").is_none());
        assert!(v.feature_index("great film").is_some());
    }

    #[test]
    fn test_smooth_idf() {
        let v = TfidfVectorizer::fit(&docs(&["good movie", "bad movie"]), VectorizerConfig::default())
            .unwrap();
        assert!((v.idf("movie").unwrap() - 1.0).abs() < 1e-12);
        let expected = (3.0f64 / 2.0).ln() + 1.0;
        assert!((v.idf("good").unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_max_features_keeps_most_frequent_with_alphabetical_ties() {
        let config = VectorizerConfig {
            max_features: 2,
            ngram_min:    1,
            ngram_max:    1,
        };
        let v = TfidfVectorizer::fit(
            &docs(&["zebra zebra zebra", "apple mango", "mango kiwi"]),
            config,
        )
        .unwrap();
        // zebra: 3, mango: 2, apple/kiwi: 1
        assert_eq!(v.terms(), &["mango", "zebra"]);

        let tie = TfidfVectorizer::fit(
            &docs(&["pear plum fig"]),
            VectorizerConfig { max_features: 2, ngram_min: 1, ngram_max: 1 },
        )
        .unwrap();
        assert_eq!(tie.terms(), &["fig", "pear"]);
    }

    #[test]
    fn test_transform_is_l2_normalised_and_sorted() {
        let v = TfidfVectorizer::fit(
            &docs(&["great acting great plot", "weak plot"]),
            VectorizerConfig::default(),
        )
        .unwrap();
        let x = v.transform("great plot great");
        let norm: f32 = x.values.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert!(x.indices.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(x.dim, v.n_features());
    }

    #[test]
    fn test_repeated_terms_weigh_more() {
        let v = TfidfVectorizer::fit(&docs(&["fun film", "dull film"]), VectorizerConfig::default())
            .unwrap();
        let x = v.transform("fun fun dull").to_dense();
        let fun  = x[v.feature_index("fun").unwrap() as usize];
        let dull = x[v.feature_index("dull").unwrap() as usize];
        assert!(fun > dull);
    }

    #[test]
    fn test_unknown_and_empty_text_give_empty_vector() {
        let v = TfidfVectorizer::fit(&docs(&["good movie"]), VectorizerConfig::default()).unwrap();
        assert_eq!(v.transform("completely unseen words").nnz(), 0);
        assert_eq!(v.transform("").nnz(), 0);
    }

    #[test]
    fn test_vocabulary_comes_only_from_fit_corpus() {
        let train = docs(&["brilliant cast", "terrible script", "brilliant script"]);
        let val   = docs(&["xylophone brilliant", "xylophone"]);
        let v = TfidfVectorizer::fit(&train, VectorizerConfig::default()).unwrap();

        assert!(v.feature_index("xylophone").is_none());
        for row in v.transform_all(&val) {
            assert!(row.indices.iter().all(|&i| (i as usize) < v.n_features()));
            for &i in &row.indices {
                assert!(!v.terms()[i as usize].contains("xylophone"));
            }
        }
        // The known token in the first val doc still maps
        assert_eq!(v.transform(&val[0]).nnz(), 1);
    }

    #[test]
    fn test_json_round_trip_rebuilds_lookup() {
        let v = TfidfVectorizer::fit(&docs(&["good movie", "bad movie"]), VectorizerConfig::default())
            .unwrap();
        let json = serde_json::to_string(&v).unwrap();
        let back: TfidfVectorizer = serde_json::from_str(&json).unwrap();
        assert_eq!(back.terms(), v.terms());
        assert_eq!(back.transform("good movie"), v.transform("good movie"));
    }

    #[test]
    fn test_rejects_inconsistent_state() {
        let json = r#"{"config":{"max_features":5,"ngram_min":1,"ngram_max":1},"terms":["a","b"],"idf":[1.0]}"#;
        assert!(serde_json::from_str::<TfidfVectorizer>(json).is_err());
    }

    #[test]
    fn test_empty_corpus_is_error() {
        assert!(TfidfVectorizer::fit(&[], VectorizerConfig::default()).is_err());
        assert!(TfidfVectorizer::fit(&docs(&["", "x"]), VectorizerConfig::default()).is_err());
    }
}
