use serde::{Deserialize, Serialize};

/// Color band for a risk-direction score (higher = worse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Medium,
    High,
    Neutral,
}

impl RiskBand {
    /// Three-bucket rule: <=40 low, <=70 medium, else high.
    /// A score that isn't a number at all is neutral.
    pub fn from_score(score: f64) -> Self {
        if score.is_nan() {
            RiskBand::Neutral
        } else if score <= 40.0 {
            RiskBand::Low
        } else if score <= 70.0 {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskBand::Low => "#10b981",
            RiskBand::Medium => "#f59e0b",
            RiskBand::High => "#ef4444",
            RiskBand::Neutral => "#94a3b8",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            RiskBand::Low => "low",
            RiskBand::Medium => "medium",
            RiskBand::High => "high",
            RiskBand::Neutral => "neutral",
        }
    }
}

/// Color band for a stability-direction score (higher = better).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityBand {
    Healthy,
    Warning,
    Risk,
}

impl StabilityBand {
    /// Inverted sense of the risk rule: >=60 healthy, >=40 warning, else risk.
    pub fn from_score(score: f64) -> Self {
        if score >= 60.0 {
            StabilityBand::Healthy
        } else if score >= 40.0 {
            StabilityBand::Warning
        } else {
            StabilityBand::Risk
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            StabilityBand::Healthy => "#10b981",
            StabilityBand::Warning => "#f59e0b",
            StabilityBand::Risk => "#ef4444",
        }
    }
}

/// Tone classification for one news item's sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentTone {
    Positive,
    Negative,
    Neutral,
}

impl SentimentTone {
    pub fn from_score(score: f64) -> Self {
        if score > 0.05 {
            SentimentTone::Positive
        } else if score < -0.05 {
            SentimentTone::Negative
        } else {
            SentimentTone::Neutral
        }
    }
}
