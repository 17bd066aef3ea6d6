// ============================================================
// Layer 3 — Review Domain Types
// ============================================================
// A labelled movie review as it comes out of the dataset,
// and the prediction the service hands back for free text.
//
// Labels are binary: positive maps to 1, negative to 0.
// Every numeric label in the pipeline uses this mapping.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Binary sentiment class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Positive,
}

impl Sentiment {
    /// Numeric class index used by the vectorized dataset and the classifier
    pub fn label(self) -> u8 {
        match self {
            Sentiment::Negative => 0,
            Sentiment::Positive => 1,
        }
    }

    /// Anything other than 1 is the negative class
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Sentiment::Positive
        } else {
            Sentiment::Negative
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Negative => "negative",
            Sentiment::Positive => "positive",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the dataset's sentiment column, trimmed and case-insensitive.
impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            other => Err(format!("unknown sentiment '{other}'")),
        }
    }
}

/// One labelled review. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// The raw review text, before normalisation
    pub text: String,

    pub sentiment: Sentiment,
}

impl ReviewRecord {
    pub fn new(text: impl Into<String>, sentiment: Sentiment) -> Self {
        Self {
            text: text.into(),
            sentiment,
        }
    }
}

/// The scored outcome for one input text.
///
/// `confidence` is the larger of the two class probabilities,
/// so it always lies in [0.5, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub sentiment:  Sentiment,
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_mapping() {
        assert_eq!(Sentiment::Positive.label(), 1);
        assert_eq!(Sentiment::Negative.label(), 0);
        assert_eq!(Sentiment::from_label(1), Sentiment::Positive);
        assert_eq!(Sentiment::from_label(0), Sentiment::Negative);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(" Positive ".parse::<Sentiment>(), Ok(Sentiment::Positive));
        assert_eq!("NEGATIVE".parse::<Sentiment>(), Ok(Sentiment::Negative));
        assert!("neutral".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_serialises_lowercase() {
        let json = serde_json::to_string(&Sentiment::Positive).unwrap();
        assert_eq!(json, "\"positive\"");
    }
}
