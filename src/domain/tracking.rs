// ============================================================
// Layer 3 — Tracking Domain Types
// ============================================================
// Records kept by the tracking store and the model registry:
//
//   Experiment    — a named group of runs
//   RunRecord     — one training execution: params, metrics,
//                   artifacts, lifecycle status
//   ModelVersion  — a run's model artifact registered under a
//                   model name, carrying a mutable stage label
//
// A RunRecord is written by exactly one training invocation and
// treated as read-only once its status leaves RUNNING.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub experiment_id: String,
    pub name:          String,
    pub created_at:    DateTime<Utc>,
}

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Running,
    Finished,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id:        String,
    pub run_name:      String,
    pub experiment_id: String,
    pub status:        RunStatus,
    pub start_time:    DateTime<Utc>,
    pub end_time:      Option<DateTime<Utc>>,

    /// Write-once key/value hyperparameters
    #[serde(default)]
    pub params: BTreeMap<String, String>,

    /// Latest value per metric key
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,

    /// Artifact paths logged under this run, relative to its artifact root
    #[serde(default)]
    pub artifacts: Vec<String>,
}

impl RunRecord {
    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn has_artifact(&self, artifact_path: &str) -> bool {
        self.artifacts.iter().any(|a| a == artifact_path)
    }
}

/// Stage label on a registered model version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    None,
    Staging,
    Production,
    Archived,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::None       => "None",
            Stage::Staging    => "Staging",
            Stage::Production => "Production",
            Stage::Archived   => "Archived",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none"       => Ok(Stage::None),
            "staging"    => Ok(Stage::Staging),
            "production" => Ok(Stage::Production),
            "archived"   => Ok(Stage::Archived),
            other => Err(format!(
                "unknown stage '{other}' (expected None, Staging, Production or Archived)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVersion {
    pub name:          String,
    pub version:       u32,
    pub source_run_id: String,

    /// Artifact path inside the source run that this version points at
    pub artifact_path: String,

    pub stage:      Stage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_parse_accepts_any_case() {
        assert_eq!("production".parse::<Stage>(), Ok(Stage::Production));
        assert_eq!("Production".parse::<Stage>(), Ok(Stage::Production));
        assert_eq!(" STAGING".parse::<Stage>(), Ok(Stage::Staging));
        assert!("live".parse::<Stage>().is_err());
    }

    #[test]
    fn test_run_status_serialises_upper_case() {
        let json = serde_json::to_string(&RunStatus::Finished).unwrap();
        assert_eq!(json, "\"FINISHED\"");
    }
}
