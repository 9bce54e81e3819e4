//! The derived-metrics record and the pure derivation over a raw snapshot.

use report_core::{LooseNum, RawMetrics};
use serde::{Deserialize, Serialize};

use crate::{
    format_large_number, format_percent, format_plain_number, RiskBand, RiskScores,
    SentimentTone, StabilityBand, StabilityScores,
};

/// Color token per risk sub-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskBands {
    pub liquidity: RiskBand,
    pub market: RiskBand,
    pub credit: RiskBand,
    pub governance: RiskBand,
}

/// Color token per stability factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StabilityBands {
    pub liquidity: StabilityBand,
    pub solvency: StabilityBand,
    pub beta: StabilityBand,
    pub ownership: StabilityBand,
}

/// Display-ready strings, already defaulted. Consumers render these verbatim
/// and must not distinguish a measured value from a defaulted one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedFields {
    pub revenue_growth: String,
    pub profit_margin: String,
    pub dividend_yield: String,
    pub roe: String,
    pub revenue_cagr: String,
    pub market_cap: String,
    pub pe_ratio: String,
    pub eps: String,
}

/// KPI sparkline series pulled from the snapshot history. An absent series
/// is an empty vec; the consumer hides that sparkline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Sparklines {
    pub revenue: Vec<f64>,
    pub net_income: Vec<f64>,
    pub eps: Vec<f64>,
    pub debt_equity: Vec<f64>,
}

/// One news item with its classified tone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TonedNews {
    pub title: String,
    pub url: String,
    pub source: String,
    pub published_at: String,
    pub tone: SentimentTone,
}

/// Sentiment view for the gauge and headline list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentView {
    pub score: Option<f64>,
    pub label: String,
    pub trend: Vec<f64>,
    pub news: Vec<TonedNews>,
}

/// Normalized, display-ready view over one `RawMetrics` snapshot.
///
/// Derivation is pure and total: identical input yields identical output,
/// every missing field lands on its documented default, and nothing here
/// ever fails. Recomputed wholesale whenever the snapshot is replaced,
/// immutable otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub ticker: String,
    pub name: String,

    pub risk: RiskScores,
    pub risk_bands: RiskBands,
    /// Mean of the four sub-scores, 0-100.
    pub overall_risk: f64,
    pub overall_band: RiskBand,
    /// Upstream composite 0-10 score, defaulted to 0; banded on a x10 scale.
    pub headline_risk: f64,
    pub headline_band: RiskBand,

    pub stability: StabilityScores,
    pub stability_bands: StabilityBands,

    pub formatted: FormattedFields,
    pub sparklines: Sparklines,
    pub sentiment: SentimentView,

    pub red_flags: Vec<String>,
    /// First red flag, or the all-clear line.
    pub live_flag: String,
    pub company_description: String,
}

/// Pure mapping from a raw snapshot to its display-ready view.
pub fn derive(metrics: &RawMetrics) -> DerivedMetrics {
    let risk = RiskScores::from_raw(metrics);
    let risk_bands = RiskBands {
        liquidity: RiskBand::from_score(f64::from(risk.liquidity)),
        market: RiskBand::from_score(f64::from(risk.market)),
        credit: RiskBand::from_score(f64::from(risk.credit)),
        governance: RiskBand::from_score(f64::from(risk.governance)),
    };
    let overall_risk = risk.overall();

    let stability = StabilityScores::from_raw(metrics);
    let stability_bands = StabilityBands {
        liquidity: StabilityBand::from_score(stability.liquidity),
        solvency: StabilityBand::from_score(stability.solvency),
        beta: StabilityBand::from_score(stability.beta),
        ownership: StabilityBand::from_score(stability.ownership),
    };

    let headline_risk = metrics
        .risk_score
        .as_ref()
        .and_then(LooseNum::as_f64)
        .unwrap_or(0.0);

    let formatted = FormattedFields {
        revenue_growth: format_percent(metrics.revenue_growth.as_ref(), true),
        profit_margin: format_percent(metrics.profit_margin.as_ref(), false),
        dividend_yield: format_percent(metrics.dividend_yield.as_ref(), false),
        roe: format_percent(metrics.roe.as_ref(), false),
        revenue_cagr: format_percent(metrics.revenue_cagr.as_ref(), true),
        market_cap: format_large_number(metrics.market_cap.as_ref()),
        pe_ratio: format_plain_number(metrics.pe_ratio.as_ref()),
        eps: format_plain_number(metrics.eps.as_ref()),
    };

    let series = |name: &str| metrics.history.get(name).cloned().unwrap_or_default();
    let sparklines = Sparklines {
        revenue: series("revenue"),
        net_income: series("net_income"),
        eps: series("eps"),
        debt_equity: series("debt_equity"),
    };

    let sentiment = sentiment_view(metrics);

    let ticker = metrics
        .ticker
        .clone()
        .unwrap_or_else(|| "Company".to_string());
    let name = metrics.name.clone().unwrap_or_else(|| ticker.clone());

    let live_flag = metrics
        .red_flags
        .first()
        .cloned()
        .unwrap_or_else(|| "No issues detected".to_string());

    tracing::debug!(%ticker, overall_risk, "derived metrics computed");

    DerivedMetrics {
        ticker,
        name,
        risk,
        risk_bands,
        overall_risk,
        overall_band: RiskBand::from_score(overall_risk),
        headline_risk,
        headline_band: RiskBand::from_score(headline_risk * 10.0),
        stability,
        stability_bands,
        formatted,
        sparklines,
        sentiment,
        red_flags: metrics.red_flags.clone(),
        live_flag,
        company_description: metrics.company_description.clone().unwrap_or_default(),
    }
}

fn sentiment_view(metrics: &RawMetrics) -> SentimentView {
    let block = metrics.sentiment.as_ref();
    let score = block
        .and_then(|s| s.score.as_ref())
        .and_then(LooseNum::as_f64);
    let label = block
        .and_then(|s| s.label.clone())
        .unwrap_or_else(|| "Neutral".to_string());
    let news = block
        .map(|s| {
            s.news
                .iter()
                .map(|n| TonedNews {
                    title: n.title.clone().unwrap_or_default(),
                    url: n.url.clone().unwrap_or_default(),
                    source: n.source.clone().unwrap_or_default(),
                    published_at: n.published_at.clone().unwrap_or_default(),
                    tone: SentimentTone::from_score(n.sentiment_score.unwrap_or(0.0)),
                })
                .collect()
        })
        .unwrap_or_default();

    SentimentView {
        score,
        label,
        trend: metrics.sentiment_trend.clone(),
        news,
    }
}
