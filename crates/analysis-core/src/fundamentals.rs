use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{AnalysisError, Metric};

/// Point-in-time fundamental and valuation fields for one security.
///
/// Ratios, margins and growth rates are fractions (0.15 = 15%). `debt_to_equity` is a
/// plain ratio (1.5 = 150%). Anything the data source did not supply is `Unavailable`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundamentalsSnapshot {
    pub symbol: Option<String>,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,

    pub current_price: Metric<f64>,
    pub market_cap: Metric<f64>,
    pub enterprise_value: Metric<f64>,

    pub trailing_pe: Metric<f64>,
    pub forward_pe: Metric<f64>,
    pub peg_ratio: Metric<f64>,
    pub price_to_book: Metric<f64>,
    pub price_to_sales: Metric<f64>,

    pub trailing_eps: Metric<f64>,
    pub total_revenue: Metric<f64>,
    pub revenue_growth: Metric<f64>,
    pub earnings_growth: Metric<f64>,
    pub growth_rate_estimate: Metric<f64>,

    pub gross_margin: Metric<f64>,
    pub operating_margin: Metric<f64>,
    pub profit_margin: Metric<f64>,
    pub return_on_equity: Metric<f64>,
    pub return_on_assets: Metric<f64>,

    pub total_debt: Metric<f64>,
    pub total_cash: Metric<f64>,
    pub debt_to_equity: Metric<f64>,
    pub current_ratio: Metric<f64>,

    pub shares_outstanding: Metric<f64>,
    pub free_cash_flow: Metric<f64>,
    pub operating_cash_flow: Metric<f64>,

    pub dividend_rate: Metric<f64>,
    pub dividend_yield: Metric<f64>,
    pub payout_ratio: Metric<f64>,

    pub target_mean_price: Metric<f64>,
    pub target_high_price: Metric<f64>,
    pub target_low_price: Metric<f64>,
    pub analyst_count: Metric<f64>,

    pub beta: Metric<f64>,
}

/// Read the first present key as a number. Numeric strings are parsed; anything
/// else ("N/A", null, objects, non-finite values) is unavailable.
fn number(map: &Map<String, Value>, keys: &[&str]) -> Metric<f64> {
    for key in keys {
        match map.get(*key) {
            Some(Value::Number(n)) => {
                return n.as_f64().map(Metric::finite).unwrap_or_default();
            }
            Some(Value::String(s)) => {
                return s.trim().parse::<f64>().map(Metric::finite).unwrap_or_default();
            }
            Some(Value::Null) | None => continue,
            Some(_) => return Metric::Unavailable,
        }
    }
    Metric::Unavailable
}

fn text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty() && !s.eq_ignore_ascii_case("n/a"))
        .map(str::to_string)
}

impl FundamentalsSnapshot {
    /// Build a snapshot from a flat key/value mapping.
    ///
    /// Each field accepts its snake_case name and the camelCase key common data
    /// providers use. Unknown keys are ignored.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            symbol: text(map, &["symbol"]),
            company_name: text(map, &["company_name", "longName", "shortName"]),
            sector: text(map, &["sector"]),
            industry: text(map, &["industry"]),

            current_price: number(map, &["current_price", "currentPrice", "regularMarketPrice"]),
            market_cap: number(map, &["market_cap", "marketCap"]),
            enterprise_value: number(map, &["enterprise_value", "enterpriseValue"]),

            trailing_pe: number(map, &["trailing_pe", "trailingPE"]),
            forward_pe: number(map, &["forward_pe", "forwardPE"]),
            peg_ratio: number(map, &["peg_ratio", "pegRatio"]),
            price_to_book: number(map, &["price_to_book", "priceToBook"]),
            price_to_sales: number(map, &["price_to_sales", "priceToSalesTrailing12Months"]),

            trailing_eps: number(map, &["trailing_eps", "eps", "trailingEps"]),
            total_revenue: number(map, &["total_revenue", "revenue", "totalRevenue"]),
            revenue_growth: number(map, &["revenue_growth", "revenueGrowth"]),
            earnings_growth: number(map, &["earnings_growth", "earningsQuarterlyGrowth", "earningsGrowth"]),
            growth_rate_estimate: number(map, &["growth_rate_estimate", "growthRateEstimate"]),

            gross_margin: number(map, &["gross_margin", "grossMargins"]),
            operating_margin: number(map, &["operating_margin", "operatingMargins"]),
            profit_margin: number(map, &["profit_margin", "profitMargins"]),
            return_on_equity: number(map, &["return_on_equity", "returnOnEquity"]),
            return_on_assets: number(map, &["return_on_assets", "returnOnAssets"]),

            total_debt: number(map, &["total_debt", "totalDebt"]),
            total_cash: number(map, &["total_cash", "totalCash"]),
            debt_to_equity: number(map, &["debt_to_equity", "debtToEquity"]),
            current_ratio: number(map, &["current_ratio", "currentRatio"]),

            shares_outstanding: number(map, &["shares_outstanding", "sharesOutstanding"]),
            free_cash_flow: number(map, &["free_cash_flow", "freeCashflow"]),
            operating_cash_flow: number(map, &["operating_cash_flow", "operatingCashflow"]),

            dividend_rate: number(map, &["dividend_rate", "dividendRate"]),
            dividend_yield: number(map, &["dividend_yield", "dividendYield"]),
            payout_ratio: number(map, &["payout_ratio", "payoutRatio"]),

            target_mean_price: number(map, &["target_mean_price", "targetMeanPrice"]),
            target_high_price: number(map, &["target_high_price", "targetHighPrice"]),
            target_low_price: number(map, &["target_low_price", "targetLowPrice"]),
            analyst_count: number(map, &["analyst_count", "numberOfAnalystOpinions"]),

            beta: number(map, &["beta"]),
        }
    }

    /// Parse a flat JSON object.
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| AnalysisError::InvalidInput(format!("Fundamentals are not valid JSON: {}", e)))?;
        match value {
            Value::Object(map) => Ok(Self::from_map(&map)),
            other => Err(AnalysisError::InvalidInput(format!(
                "Fundamentals must be a JSON object, got {}",
                match other {
                    Value::Array(_) => "an array",
                    Value::String(_) => "a string",
                    Value::Number(_) => "a number",
                    Value::Bool(_) => "a boolean",
                    _ => "null",
                }
            ))),
        }
    }

    /// Number of numeric fields carrying a value.
    pub fn available_field_count(&self) -> usize {
        [
            &self.current_price, &self.market_cap, &self.enterprise_value,
            &self.trailing_pe, &self.forward_pe, &self.peg_ratio, &self.price_to_book,
            &self.price_to_sales, &self.trailing_eps, &self.total_revenue,
            &self.revenue_growth, &self.earnings_growth, &self.growth_rate_estimate,
            &self.gross_margin, &self.operating_margin, &self.profit_margin,
            &self.return_on_equity, &self.return_on_assets, &self.total_debt,
            &self.total_cash, &self.debt_to_equity, &self.current_ratio,
            &self.shares_outstanding, &self.free_cash_flow, &self.operating_cash_flow,
            &self.dividend_rate, &self.dividend_yield, &self.payout_ratio,
            &self.target_mean_price, &self.target_high_price, &self.target_low_price,
            &self.analyst_count, &self.beta,
        ]
        .iter()
        .filter(|m| m.is_available())
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: Value) -> FundamentalsSnapshot {
        FundamentalsSnapshot::from_map(value.as_object().unwrap())
    }

    #[test]
    fn test_absent_and_placeholder_values_are_unavailable() {
        let s = snapshot(json!({
            "trailing_pe": "N/A",
            "beta": null,
            "price_to_book": 0.0,
        }));
        assert!(s.trailing_pe.is_unavailable());
        assert!(s.beta.is_unavailable());
        assert!(s.free_cash_flow.is_unavailable());
        // Zero is a value, not a missing marker
        assert_eq!(s.price_to_book, Metric::Available(0.0));
    }

    #[test]
    fn test_provider_aliases() {
        let s = snapshot(json!({
            "trailingPE": 18.2,
            "priceToSalesTrailing12Months": 3.1,
            "freeCashflow": 1.0e9,
            "longName": "Example Corp",
            "earningsQuarterlyGrowth": "0.12",
        }));
        assert_eq!(s.trailing_pe, Metric::Available(18.2));
        assert_eq!(s.price_to_sales, Metric::Available(3.1));
        assert_eq!(s.free_cash_flow, Metric::Available(1.0e9));
        assert_eq!(s.earnings_growth, Metric::Available(0.12));
        assert_eq!(s.company_name.as_deref(), Some("Example Corp"));
    }

    #[test]
    fn test_snake_case_key_wins_over_alias() {
        let s = snapshot(json!({"beta": 1.2, "trailing_pe": 10.0, "trailingPE": 99.0}));
        assert_eq!(s.trailing_pe, Metric::Available(10.0));
        assert_eq!(s.available_field_count(), 2);
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(matches!(
            FundamentalsSnapshot::from_json("[1, 2]"),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert!(FundamentalsSnapshot::from_json("{}").is_ok());
    }
}
