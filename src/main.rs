#![allow(dead_code)]
#![recursion_limit = "256"]

mod api;
mod application;
mod cli;
mod config;
mod data;
mod domain;
mod error;
mod infra;
mod ml;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sentiment_service=info".parse()?))
        .init();

    Cli::parse().run()
}
