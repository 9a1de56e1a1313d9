use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Equity analysis report from local price and fundamentals files
#[derive(Debug, Parser)]
#[command(name = "stock-report", version, about = "Equity analysis report from local price and fundamentals files")]
pub struct Cli {
    /// Engine configuration JSON. Overrides STOCK_REPORT_CONFIG.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze one security and print the report
    Analyze(AnalyzeArgs),
    /// Print the effective engine configuration
    Config,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// JSON array of {date, open, high, low, close, volume}
    #[arg(long)]
    pub prices: PathBuf,

    /// Flat JSON object of fundamental fields
    #[arg(long)]
    pub fundamentals: Option<PathBuf>,

    /// Ticker to report under. Defaults to the fundamentals symbol, then the
    /// prices file name.
    #[arg(long)]
    pub symbol: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "stock-report",
            "analyze",
            "--prices",
            "aapl.json",
            "--symbol",
            "AAPL",
            "--pretty",
        ])
        .unwrap();

        assert!(cli.pretty);
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.prices, PathBuf::from("aapl.json"));
                assert_eq!(args.symbol.as_deref(), Some("AAPL"));
                assert!(args.fundamentals.is_none());
            }
            Command::Config => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_prices_required() {
        assert!(Cli::try_parse_from(["stock-report", "analyze"]).is_err());
    }

    #[test]
    fn test_config_command_with_global_flag() {
        let cli = Cli::try_parse_from(["stock-report", "--config", "engine.json", "config"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("engine.json")));
        assert!(matches!(cli.command, Command::Config));
    }
}
