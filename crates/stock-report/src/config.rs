use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use analysis_core::EngineConfig;
use anyhow::{Context, Result};

/// Engine configuration resolved from a config file and environment overrides.
#[derive(Debug, Clone)]
pub struct Settings {
    pub engine: EngineConfig,
    /// File the base configuration came from, if any
    pub source: Option<PathBuf>,
}

impl Settings {
    /// `--config` wins over `STOCK_REPORT_CONFIG`; numeric `DCF_*` variables are
    /// applied on top of either.
    pub fn from_env(config_flag: Option<&Path>) -> Result<Self> {
        let source = config_flag
            .map(Path::to_path_buf)
            .or_else(|| env::var("STOCK_REPORT_CONFIG").ok().map(PathBuf::from));

        let mut engine = match &source {
            Some(path) => load_engine_config(path)?,
            None => EngineConfig::default(),
        };
        apply_overrides(&mut engine, |key| env::var(key).ok())?;
        engine.validate().context("Invalid engine configuration")?;

        Ok(Self { engine, source })
    }
}

fn load_engine_config(path: &Path) -> Result<EngineConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = EngineConfig::from_json(&raw)
        .with_context(|| format!("Failed to load config file {}", path.display()))?;
    tracing::info!("Loaded engine configuration from {}", path.display());
    Ok(config)
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => {
            let value = raw
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number, got {:?}", key, raw))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Apply DCF overrides from a key lookup (the process environment in production).
pub fn apply_overrides(engine: &mut EngineConfig, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(v) = parse_var(&lookup, "DCF_RISK_FREE_RATE")? {
        engine.dcf.risk_free_rate = v;
    }
    if let Some(v) = parse_var(&lookup, "DCF_EQUITY_RISK_PREMIUM")? {
        engine.dcf.equity_risk_premium = v;
    }
    if let Some(v) = parse_var(&lookup, "DCF_TERMINAL_GROWTH")? {
        engine.dcf.terminal_growth_rate = v;
    }
    if let Some(v) = parse_var(&lookup, "DCF_PROJECTION_YEARS")? {
        engine.dcf.projection_years = v;
    }
    Ok(())
}
