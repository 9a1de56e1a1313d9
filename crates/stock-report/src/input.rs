use std::fs;
use std::path::Path;

use analysis_core::{AnalysisError, FundamentalsSnapshot, RawBar};
use anyhow::{Context, Result};

pub fn load_prices(path: &Path) -> Result<Vec<RawBar>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read price file {}", path.display()))?;
    parse_prices(&raw).with_context(|| format!("Failed to parse price file {}", path.display()))
}

fn parse_prices(raw: &str) -> Result<Vec<RawBar>> {
    let bars: Vec<RawBar> = serde_json::from_str(raw)
        .map_err(|e| AnalysisError::InvalidInput(format!("Price bars are not valid: {}", e)))?;
    tracing::debug!("Parsed {} price bars", bars.len());
    Ok(bars)
}

/// A missing path yields an empty snapshot; every fundamentals field is optional.
pub fn load_fundamentals(path: Option<&Path>) -> Result<FundamentalsSnapshot> {
    let Some(path) = path else {
        return Ok(FundamentalsSnapshot::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read fundamentals file {}", path.display()))?;
    FundamentalsSnapshot::from_json(&raw)
        .with_context(|| format!("Failed to parse fundamentals file {}", path.display()))
}

/// `--symbol`, else the snapshot's own symbol, else the prices file stem upper-cased.
pub fn resolve_symbol(flag: Option<&str>, fundamentals: &FundamentalsSnapshot, prices: &Path) -> String {
    flag.map(str::to_string)
        .or_else(|| fundamentals.symbol.clone())
        .or_else(|| {
            prices
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_uppercase())
        })
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prices() {
        let bars = parse_prices(
            r#"[
                {"date": "2024-01-02", "open": 10.0, "high": 11.0, "low": 9.5, "close": 10.5, "volume": 1000},
                {"date": "2024-01-03", "open": 10.5, "high": 10.8, "low": 10.1, "close": 10.2, "volume": 800}
            ]"#,
        )
        .unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 10.2);
        assert_eq!(bars[0].date.to_string(), "2024-01-02");
    }

    #[test]
    fn test_parse_prices_rejects_object() {
        assert!(parse_prices(r#"{"date": "2024-01-02"}"#).is_err());
    }

    #[test]
    fn test_negative_volume_is_invalid_input() {
        let error = parse_prices(
            r#"[{"date": "2024-01-02", "open": 10.0, "high": 11.0, "low": 9.5, "close": 10.5, "volume": -5}]"#,
        )
        .unwrap_err();

        assert!(matches!(
            error.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_load_prices_keeps_error_kind_under_context() {
        let path = std::env::temp_dir().join(format!("stock-report-bad-volume-{}.json", std::process::id()));
        fs::write(
            &path,
            r#"[{"date": "2024-01-02", "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0, "volume": -5}]"#,
        )
        .unwrap();
        let error = load_prices(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert!(format!("{:#}", error).contains("Failed to parse price file"));
        assert!(matches!(
            error.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_symbol_resolution_order() {
        let prices = Path::new("data/msft.json");
        let mut fundamentals = FundamentalsSnapshot::default();

        assert_eq!(resolve_symbol(None, &fundamentals, prices), "MSFT");

        fundamentals.symbol = Some("MSFT.O".to_string());
        assert_eq!(resolve_symbol(None, &fundamentals, prices), "MSFT.O");
        assert_eq!(resolve_symbol(Some("XYZ"), &fundamentals, prices), "XYZ");
    }

    #[test]
    fn test_missing_fundamentals_path_is_empty_snapshot() {
        let snapshot = load_fundamentals(None).unwrap();
        assert_eq!(snapshot, FundamentalsSnapshot::default());
    }
}
