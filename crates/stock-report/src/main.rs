mod cli;
mod config;
mod input;

use std::process::ExitCode;

use analysis_core::AnalysisError;
use analysis_orchestrator::AnalysisOrchestrator;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{AnalyzeArgs, Cli, Command};
use crate::config::Settings;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    match run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {:#}", error);
            exit_code_for(&error)
        }
    }
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stock_report=info,analysis_orchestrator=info".into());

    // stdout carries the report
    if json_logging {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let settings = Settings::from_env(cli.config.as_deref())?;

    let output = match &cli.command {
        Command::Analyze(args) => analyze(args, settings, cli.pretty)?,
        Command::Config => {
            if let Some(path) = &settings.source {
                tracing::info!("Effective configuration based on {}", path.display());
            }
            render(&settings.engine, cli.pretty)?
        }
    };

    println!("{}", output);
    Ok(ExitCode::SUCCESS)
}

fn analyze(args: &AnalyzeArgs, settings: Settings, pretty: bool) -> anyhow::Result<String> {
    let bars = input::load_prices(&args.prices)?;
    let fundamentals = input::load_fundamentals(args.fundamentals.as_deref())?;
    let symbol = input::resolve_symbol(args.symbol.as_deref(), &fundamentals, &args.prices);

    let orchestrator = AnalysisOrchestrator::try_new(settings.engine)?;
    let report = orchestrator.analyze(&symbol, bars, fundamentals)?;

    for name in report.unavailable_indicators() {
        tracing::warn!("{}: {} unavailable for this history", symbol, name);
    }

    Ok(render(&report, pretty)?)
}

fn render<T: serde::Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// 2 for input the engine rejected, 1 for everything else.
fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    match error.downcast_ref::<AnalysisError>() {
        Some(AnalysisError::InvalidInput(_)) | Some(AnalysisError::InsufficientData(_)) => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}
