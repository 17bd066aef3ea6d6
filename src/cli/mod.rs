// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes each subcommand to its
// use case. No business logic lives here.
//
//   train    — one tracked training run
//   register — promote the best run to Production
//   serve    — HTTP endpoint on a tokio runtime
//   predict  — offline scoring of a single text

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, PredictArgs, RegisterArgs, ServeArgs, TrainArgs};

use crate::application::{
    predict_use_case::load_production_predictor,
    register_use_case::RegisterUseCase,
    train_use_case::TrainUseCase,
};
use crate::infra::tracking_store::FileTrackingStore;

#[derive(Parser, Debug)]
#[command(
    name = "sentiment-service",
    version,
    about = "Train a TF-IDF sentiment classifier, promote the best run, and serve it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Register(args) => run_register(args),
            Commands::Serve(args)    => run_serve(args),
            Commands::Predict(args)  => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    tracing::info!("Starting training on '{}'", args.data_path.display());
    let run = TrainUseCase::new(args.into()).execute()?;
    println!("Run ID: {}", run.run_id);
    Ok(())
}

fn run_register(args: RegisterArgs) -> Result<()> {
    let version = RegisterUseCase::new(args.into()).execute()?;
    println!("Registered version: {}", version.version);
    Ok(())
}

fn run_serve(args: ServeArgs) -> Result<()> {
    let ServeArgs { tracking, model, bind } = args;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the tokio runtime")?;

    runtime.block_on(crate::api::serve(bind, move || {
        let store = FileTrackingStore::open(&tracking.tracking_dir)?;
        load_production_predictor(&store, &model.model_name, model.model_stage)
    }))?;
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let store = FileTrackingStore::open(&args.tracking.tracking_dir)?;
    let predictor = load_production_predictor(&store, &args.model.model_name, args.model.model_stage)?;
    let prediction = predictor.predict(&args.text)?;
    println!("{}", serde_json::to_string(&prediction)?);
    Ok(())
}
