//! `fraudml`: train the fraud classifier or serve predictions over HTTP.

mod config;
mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fraudml::pipeline::run_training;
use fraudml::server::{self, AppState};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "fraudml")]
#[command(about = "Credit-card fraud model training and prediction service")]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the training pipeline and write model, scaler and reports
    Train(TrainArgs),
    /// Serve POST /predict/ from previously trained artifacts
    Serve(ServeArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Labeled transaction CSV
    #[arg(long)]
    data: Option<PathBuf>,

    /// Output path of the model artifact
    #[arg(long)]
    model: Option<PathBuf>,

    /// Output path of the scaler artifact
    #[arg(long)]
    scaler: Option<PathBuf>,

    /// Directory for the prediction and feature-importance reports
    #[arg(long)]
    reports: Option<PathBuf>,
}

#[derive(Args)]
struct ServeArgs {
    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    host: Option<String>,

    /// Bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Model artifact to load
    #[arg(long)]
    model: Option<PathBuf>,

    /// Scaler artifact to load
    #[arg(long)]
    scaler: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Train(args) => train(args, cli.verbose),
        Command::Serve(args) => serve(args, cli.verbose),
    }
}

fn train(args: TrainArgs, verbose: bool) -> Result<()> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(data) = args.data {
        config.paths.data = data;
    }
    if let Some(model) = args.model {
        config.paths.model = model;
    }
    if let Some(scaler) = args.scaler {
        config.paths.scaler = scaler;
    }
    if let Some(reports) = args.reports {
        config.paths.reports_dir = reports;
    }
    logging::init(&config.logging, verbose)?;

    info!(data = %config.paths.data.display(), "starting training run");
    let summary = run_training(&config.training_config()).context("Training failed")?;

    println!("{}", summary.report);
    println!("Best CV AUC: {:.4}", summary.best_cv_auc);
    if let Some(auc) = summary.test_auc {
        println!("Test AUC:    {auc:.4}");
    }
    println!("Model saved to {}", summary.model_path.display());
    println!("Scaler saved to {}", summary.scaler_path.display());
    println!("Predictions written to {}", summary.predictions_path.display());
    println!("Top features written to {}", summary.top_features_path.display());
    Ok(())
}

fn serve(args: ServeArgs, verbose: bool) -> Result<()> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(model) = args.model {
        config.paths.model = model;
    }
    if let Some(scaler) = args.scaler {
        config.paths.scaler = scaler;
    }
    logging::init(&config.logging, verbose)?;

    let state = AppState::load(&config.paths.scaler, &config.paths.model).with_context(|| {
        format!(
            "Failed to load artifacts (scaler {}, model {})",
            config.paths.scaler.display(),
            config.paths.model.display()
        )
    })?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(async {
        let addr = config.server.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind listener on {addr}"))?;
        server::serve(listener, state).await.context("Prediction service terminated unexpectedly")
    })
}
