// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Four subcommands: `train`, `register`, `serve`, `predict`.
//
// Settings that deployments supply through the environment
// (tracking location, model name, stage, bind address, dataset
// path) are read from SENTIMENT_* variables when the flag is
// not given.

use std::{net::SocketAddr, path::PathBuf};

use clap::{Args, Subcommand};

use crate::application::{register_use_case::RegisterConfig, train_use_case::TrainConfig};
use crate::config::{
    DEFAULT_BIND_ADDR, DEFAULT_DATA_PATH, DEFAULT_MODEL_NAME, DEFAULT_MODEL_STAGE,
    DEFAULT_SEED, DEFAULT_TRACKING_DIR,
};
use crate::domain::tracking::Stage;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit the TF-IDF + logistic regression model and record a tracking run
    Train(TrainArgs),

    /// Register the run with the best f1_score and promote it to Production
    Register(RegisterArgs),

    /// Serve the promoted model over HTTP
    Serve(ServeArgs),

    /// Score one text with the promoted model and print the JSON result
    Predict(PredictArgs),
}

/// Where runs and registered models are stored
#[derive(Args, Debug, Clone)]
pub struct TrackingArgs {
    #[arg(long, env = "SENTIMENT_TRACKING_DIR", default_value = DEFAULT_TRACKING_DIR)]
    pub tracking_dir: PathBuf,
}

/// Which registered model version to load
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    #[arg(long, env = "SENTIMENT_MODEL_NAME", default_value = DEFAULT_MODEL_NAME)]
    pub model_name: String,

    /// Stage label to resolve (None, Staging, Production, Archived)
    #[arg(long, env = "SENTIMENT_MODEL_STAGE", default_value = DEFAULT_MODEL_STAGE)]
    pub model_stage: Stage,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV with `review` and `sentiment` columns
    #[arg(long, env = "SENTIMENT_DATA_PATH", default_value = DEFAULT_DATA_PATH)]
    pub data_path: PathBuf,

    #[command(flatten)]
    pub tracking: TrackingArgs,

    /// Vocabulary cap of the TF-IDF vectorizer
    #[arg(long, default_value_t = 5000)]
    pub max_features: usize,

    /// Maximum passes over the training set
    #[arg(long, default_value_t = 200)]
    pub max_iter: usize,

    #[arg(long, default_value_t = 0.05)]
    pub lr: f64,

    #[arg(long, default_value_t = 256)]
    pub batch_size: usize,

    /// L2 penalty applied as Adam weight decay
    #[arg(long, default_value_t = 1e-4)]
    pub l2: f64,

    /// Early-stop threshold on the change in epoch loss
    #[arg(long, default_value_t = 1e-4)]
    pub tol: f64,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:    a.data_path,
            tracking_dir: a.tracking.tracking_dir,
            max_features: a.max_features,
            max_iter:     a.max_iter,
            lr:           a.lr,
            batch_size:   a.batch_size,
            l2:           a.l2,
            tol:          a.tol,
            seed:         a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[command(flatten)]
    pub tracking: TrackingArgs,

    #[arg(long, env = "SENTIMENT_MODEL_NAME", default_value = DEFAULT_MODEL_NAME)]
    pub model_name: String,

    /// Move other Production versions to Archived
    #[arg(long)]
    pub archive_existing: bool,
}

impl From<RegisterArgs> for RegisterConfig {
    fn from(a: RegisterArgs) -> Self {
        RegisterConfig {
            tracking_dir:     a.tracking.tracking_dir,
            model_name:       a.model_name,
            archive_existing: a.archive_existing,
        }
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub tracking: TrackingArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    #[arg(long, env = "SENTIMENT_BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    pub bind: SocketAddr,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Text to classify
    #[arg(long)]
    pub text: String,

    #[command(flatten)]
    pub tracking: TrackingArgs,

    #[command(flatten)]
    pub model: ModelArgs,
}
