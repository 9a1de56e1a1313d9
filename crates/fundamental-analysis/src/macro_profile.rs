use analysis_core::Metric;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectorOutlook {
    Positive,
    Stable,
    Neutral,
    Cautious,
    Volatile,
}

impl SectorOutlook {
    pub fn to_label(&self) -> &'static str {
        match self {
            SectorOutlook::Positive => "positive",
            SectorOutlook::Stable => "stable",
            SectorOutlook::Neutral => "neutral",
            SectorOutlook::Cautious => "cautious",
            SectorOutlook::Volatile => "volatile",
        }
    }
}

/// Graded exposure used for rate sensitivity, inflation impact and recession resilience
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Exposure {
    Low,
    LowMedium,
    Medium,
    High,
    VeryHigh,
}

impl Exposure {
    pub fn to_label(&self) -> &'static str {
        match self {
            Exposure::Low => "low",
            Exposure::LowMedium => "low-medium",
            Exposure::Medium => "medium",
            Exposure::High => "high",
            Exposure::VeryHigh => "very high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketConditions {
    HighVolatility,
    Neutral,
    LowVolatility,
}

/// Sector-level macroeconomic context. Informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroProfile {
    /// Name of the sector rule that matched, if any
    pub matched_sector: Option<String>,
    pub sector_outlook: SectorOutlook,
    pub interest_rate_sensitivity: Exposure,
    pub inflation_impact: Exposure,
    pub recession_resilience: Exposure,
    pub market_conditions: MarketConditions,
    pub economic_pressures: Vec<String>,
}

impl Default for MacroProfile {
    fn default() -> Self {
        Self {
            matched_sector: None,
            sector_outlook: SectorOutlook::Neutral,
            interest_rate_sensitivity: Exposure::Medium,
            inflation_impact: Exposure::Medium,
            recession_resilience: Exposure::Medium,
            market_conditions: MarketConditions::Neutral,
            economic_pressures: Vec::new(),
        }
    }
}

struct SectorRule {
    name: &'static str,
    /// Keyword groups; the rule matches if every keyword of any group appears in the
    /// sector (or, for `industry_keywords`, the industry)
    sector_keywords: &'static [&'static [&'static str]],
    industry_keywords: &'static [&'static str],
    outlook: SectorOutlook,
    rate_sensitivity: Exposure,
    inflation_impact: Exposure,
    recession_resilience: Exposure,
    pressure: &'static str,
}

impl SectorRule {
    fn matches(&self, sector: &str, industry: &str) -> bool {
        let sector_hit = self
            .sector_keywords
            .iter()
            .any(|group| group.iter().all(|kw| sector.contains(kw)));
        let industry_hit = self.industry_keywords.iter().any(|kw| industry.contains(kw));
        sector_hit || industry_hit
    }
}

// First match wins
const SECTOR_RULES: &[SectorRule] = &[
    SectorRule {
        name: "Technology",
        sector_keywords: &[&["technology"]],
        industry_keywords: &["software", "semiconductor"],
        outlook: SectorOutlook::Positive,
        rate_sensitivity: Exposure::High,
        inflation_impact: Exposure::Medium,
        recession_resilience: Exposure::LowMedium,
        pressure: "Technology sector benefits from digital transformation trends",
    },
    SectorRule {
        name: "Financials",
        sector_keywords: &[&["financial"]],
        industry_keywords: &["bank"],
        outlook: SectorOutlook::Neutral,
        rate_sensitivity: Exposure::VeryHigh,
        inflation_impact: Exposure::Medium,
        recession_resilience: Exposure::Low,
        pressure: "Financial sector highly sensitive to interest rate changes",
    },
    SectorRule {
        name: "Consumer Discretionary",
        sector_keywords: &[&["consumer", "discretionary"], &["consumer", "cyclical"]],
        industry_keywords: &[],
        outlook: SectorOutlook::Cautious,
        rate_sensitivity: Exposure::Medium,
        inflation_impact: Exposure::High,
        recession_resilience: Exposure::Low,
        pressure: "Consumer discretionary sensitive to economic cycles",
    },
    SectorRule {
        name: "Consumer Staples",
        sector_keywords: &[&["consumer", "staples"], &["consumer", "defensive"]],
        industry_keywords: &[],
        outlook: SectorOutlook::Stable,
        rate_sensitivity: Exposure::Medium,
        inflation_impact: Exposure::Medium,
        recession_resilience: Exposure::High,
        pressure: "Consumer staples provide defensive characteristics",
    },
    SectorRule {
        name: "Healthcare",
        sector_keywords: &[&["health"]],
        industry_keywords: &[],
        outlook: SectorOutlook::Positive,
        rate_sensitivity: Exposure::Medium,
        inflation_impact: Exposure::LowMedium,
        recession_resilience: Exposure::High,
        pressure: "Healthcare sector shows defensive characteristics",
    },
    SectorRule {
        name: "Energy",
        sector_keywords: &[&["energy"]],
        industry_keywords: &["oil"],
        outlook: SectorOutlook::Volatile,
        rate_sensitivity: Exposure::Medium,
        inflation_impact: Exposure::High,
        recession_resilience: Exposure::Medium,
        pressure: "Energy sector subject to commodity price volatility",
    },
    SectorRule {
        name: "Utilities",
        sector_keywords: &[&["utilities"]],
        industry_keywords: &[],
        outlook: SectorOutlook::Stable,
        rate_sensitivity: Exposure::High,
        inflation_impact: Exposure::Medium,
        recession_resilience: Exposure::High,
        pressure: "Utilities provide stable dividends but sensitive to rates",
    },
    SectorRule {
        name: "Real Estate",
        sector_keywords: &[&["real estate"]],
        industry_keywords: &["reit"],
        outlook: SectorOutlook::Cautious,
        rate_sensitivity: Exposure::VeryHigh,
        inflation_impact: Exposure::Medium,
        recession_resilience: Exposure::LowMedium,
        pressure: "Real estate highly sensitive to interest rates and economic cycles",
    },
];

const HIGH_BETA: f64 = 1.3;
const LOW_BETA: f64 = 0.7;

/// Sector rule lookup plus a beta-based read on market conditions.
pub fn macro_profile(sector: Option<&str>, industry: Option<&str>, beta: Metric<f64>) -> MacroProfile {
    let sector = sector.unwrap_or_default().to_lowercase();
    let industry = industry.unwrap_or_default().to_lowercase();

    let mut profile = MacroProfile::default();

    if let Some(rule) = SECTOR_RULES.iter().find(|r| r.matches(&sector, &industry)) {
        profile.matched_sector = Some(rule.name.to_string());
        profile.sector_outlook = rule.outlook;
        profile.interest_rate_sensitivity = rule.rate_sensitivity;
        profile.inflation_impact = rule.inflation_impact;
        profile.recession_resilience = rule.recession_resilience;
        profile.economic_pressures.push(rule.pressure.to_string());
    }

    if let Metric::Available(b) = beta {
        if b > HIGH_BETA {
            profile.market_conditions = MarketConditions::HighVolatility;
            profile
                .economic_pressures
                .push("High beta indicates high market sensitivity".to_string());
        } else if b < LOW_BETA {
            profile.market_conditions = MarketConditions::LowVolatility;
            profile
                .economic_pressures
                .push("Low beta indicates defensive characteristics".to_string());
        }
    }

    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_technology_by_industry() {
        let p = macro_profile(Some("Information"), Some("Semiconductors"), Metric::Unavailable);
        assert_eq!(p.matched_sector.as_deref(), Some("Technology"));
        assert_eq!(p.sector_outlook, SectorOutlook::Positive);
        assert_eq!(p.interest_rate_sensitivity, Exposure::High);
        assert_eq!(p.market_conditions, MarketConditions::Neutral);
    }

    #[test]
    fn test_provider_sector_names() {
        let p = macro_profile(Some("Consumer Defensive"), None, Metric::Unavailable);
        assert_eq!(p.matched_sector.as_deref(), Some("Consumer Staples"));
        assert_eq!(p.recession_resilience, Exposure::High);

        let p = macro_profile(Some("Consumer Cyclical"), None, Metric::Unavailable);
        assert_eq!(p.sector_outlook, SectorOutlook::Cautious);
    }

    #[test]
    fn test_unknown_sector_is_neutral() {
        let p = macro_profile(None, None, Metric::Available(1.0));
        assert_eq!(p, MacroProfile::default());
    }

    #[test]
    fn test_beta_conditions() {
        let high = macro_profile(Some("Utilities"), None, Metric::Available(1.8));
        assert_eq!(high.market_conditions, MarketConditions::HighVolatility);
        assert_eq!(high.economic_pressures.len(), 2);

        let low = macro_profile(None, None, Metric::Available(0.4));
        assert_eq!(low.market_conditions, MarketConditions::LowVolatility);
    }
}
