use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ReportError;

/// Scalar field from the upstream snapshot feed.
///
/// The feed is LLM-assembled JSON, so a "numeric" field may arrive as a
/// number, a decorated string ("45%", "$1.2B", "2.5x"), null, or not at all.
/// Anything else (arrays, objects) is tolerated and treated as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNum {
    Number(f64),
    Text(String),
    Other(Value),
}

impl LooseNum {
    /// Numeric view of the value. Strings are stripped of everything outside
    /// `[0-9.-]` and parsed as the longest valid prefix, so "$1.2B" reads as
    /// 1.2 and "1,234" as 1234. Unparseable values read as `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LooseNum::Number(n) => Some(*n),
            LooseNum::Text(s) => {
                let cleaned: String = s
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                    .collect();
                parse_prefix(&cleaned)
            }
            LooseNum::Other(_) => None,
        }
    }

    /// True only for text values carrying a literal percent sign.
    /// Drives the fraction-vs-percent decision when formatting.
    pub fn has_percent_sign(&self) -> bool {
        matches!(self, LooseNum::Text(s) if s.contains('%'))
    }

    /// Original textual form, when there was one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            LooseNum::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for LooseNum {
    fn from(n: f64) -> Self {
        LooseNum::Number(n)
    }
}

impl From<&str> for LooseNum {
    fn from(s: &str) -> Self {
        LooseNum::Text(s.to_string())
    }
}

/// Longest parseable numeric prefix, mirroring lenient float parsing
/// ("1.2.3" reads as 1.2, "" as nothing).
fn parse_prefix(s: &str) -> Option<f64> {
    if let Ok(n) = s.parse::<f64>() {
        return Some(n);
    }
    let mut best = None;
    for end in (1..=s.len()).rev() {
        if !s.is_char_boundary(end) {
            continue;
        }
        if let Ok(n) = s[..end].parse::<f64>() {
            best = Some(n);
            break;
        }
    }
    best
}

/// One news article attached to the sentiment block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
}

/// Aggregate sentiment block from the snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sentiment {
    #[serde(default, alias = "sentiment_score")]
    pub score: Option<LooseNum>,
    #[serde(default, alias = "sentiment_label")]
    pub label: Option<String>,
    #[serde(default)]
    pub news: Vec<NewsItem>,
}

/// Narrative detail for one risk category (liquidity, market, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskDetail {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub factors: Vec<String>,
    #[serde(default)]
    pub industry_avg: Option<LooseNum>,
    #[serde(default)]
    pub trend: Option<String>,
    #[serde(default)]
    pub impact: Option<LooseNum>,
    #[serde(default)]
    pub ratio: Option<LooseNum>,
    #[serde(default)]
    pub ownership: Option<LooseNum>,
}

/// Raw metrics snapshot for one analysis request.
///
/// Every field is optional: absence is a valid, permanent state, and each
/// consumer falls back through the default table in `metrics-engine`.
/// Replaced wholesale on each new request, never patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMetrics {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub name: Option<String>,

    // Fundamentals
    #[serde(default)]
    pub current_ratio: Option<LooseNum>,
    #[serde(default)]
    pub beta: Option<LooseNum>,
    #[serde(default)]
    pub debt_equity: Option<LooseNum>,
    #[serde(default)]
    pub ownership: Option<LooseNum>,
    #[serde(default)]
    pub pe_ratio: Option<LooseNum>,
    #[serde(default)]
    pub eps: Option<LooseNum>,
    #[serde(default)]
    pub roe: Option<LooseNum>,
    #[serde(default)]
    pub revenue_growth: Option<LooseNum>,
    #[serde(default)]
    pub profit_margin: Option<LooseNum>,
    #[serde(default)]
    pub market_cap: Option<LooseNum>,
    #[serde(default)]
    pub revenue_cagr: Option<LooseNum>,
    #[serde(default)]
    pub dividend_yield: Option<LooseNum>,
    #[serde(default)]
    pub volatility: Option<LooseNum>,
    /// Upstream composite risk score, 0-10.
    #[serde(default)]
    pub risk_score: Option<LooseNum>,

    // Qualitative
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub company_description: Option<String>,
    #[serde(default)]
    pub profit_trend: Option<String>,

    // Nested
    /// Series name -> ordered values (revenue, net_income, eps, ...).
    #[serde(default)]
    pub history: HashMap<String, Vec<f64>>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub sentiment_trend: Vec<f64>,
    /// Risk category -> narrative detail.
    #[serde(default)]
    pub risk_details: HashMap<String, RiskDetail>,
}

impl RawMetrics {
    /// Decode a snapshot from loose upstream JSON.
    pub fn from_value(value: Value) -> Result<Self, ReportError> {
        serde_json::from_value(value).map_err(|e| ReportError::MalformedSnapshot(e.to_string()))
    }
}

/// Typed view over an embedded structured payload's `chart_data` member.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub prices: Vec<f64>,
    #[serde(default)]
    pub metrics: Option<ChartMetrics>,
}

/// Headline metrics attached to an inline chart payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartMetrics {
    #[serde(default)]
    pub pe_ratio: Option<LooseNum>,
    #[serde(default)]
    pub market_cap: Option<LooseNum>,
    #[serde(default)]
    pub dividend_yield: Option<LooseNum>,
}

impl ChartData {
    /// Extract chart data from a structured payload, if any.
    ///
    /// A payload without a well-formed `chart_data` member simply has no
    /// chart; that is not an error.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let chart = payload.get("chart_data")?;
        serde_json::from_value(chart.clone()).ok()
    }
}
