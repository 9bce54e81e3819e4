//! Per-turn render model: the versioned aggregate a presentation layer
//! draws from.
//!
//! One model exists per chat turn. Decoder events and derived-metrics
//! updates fold into it through append-style operations; nothing is edited
//! in place except the "latest" slots. Re-rendering is a pure function of
//! the model's current state, so drawing the same accumulated text twice
//! yields the same output by construction.

use chrono::{DateTime, Utc};
use metrics_engine::DerivedMetrics;
use report_core::{ChartData, StreamEvent};
use serde::Serialize;
use serde_json::Value;

/// Versioned view state for one chat turn.
///
/// Created empty when a turn starts and discarded when the next turn
/// begins. A failed turn is discarded wholesale, never patched.
#[derive(Debug, Clone, Serialize)]
pub struct RenderModel {
    /// Bumped on every mutation; lets a renderer skip redundant redraws.
    version: u64,
    /// Accumulated narrative text, in arrival order.
    text: String,
    /// Latest structured payload; last write wins, no merging.
    payload: Option<Value>,
    /// Latest derived metrics; replaced wholesale.
    metrics: Option<DerivedMetrics>,
    started_at: DateTime<Utc>,
}

impl RenderModel {
    pub fn new() -> Self {
        Self {
            version: 0,
            text: String::new(),
            payload: None,
            metrics: None,
            started_at: Utc::now(),
        }
    }

    /// Fold one decoder event into the model.
    pub fn apply(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::TextDelta { text } => {
                self.text.push_str(&text);
            }
            StreamEvent::StructuredPayload { payload } => {
                if self.payload.is_some() {
                    tracing::debug!("replacing earlier payload; last write wins");
                }
                self.payload = Some(payload);
            }
        }
        self.version += 1;
    }

    /// Replace the latest derived metrics wholesale. Partial merges are not
    /// supported; a metrics record always comes from a full snapshot
    /// derivation.
    pub fn set_metrics(&mut self, metrics: DerivedMetrics) {
        self.metrics = Some(metrics);
        self.version += 1;
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// The accumulated narrative so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn metrics(&self) -> Option<&DerivedMetrics> {
        self.metrics.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Typed chart view over the latest payload, if it carries one.
    pub fn chart_data(&self) -> Option<ChartData> {
        self.payload.as_ref().and_then(ChartData::from_payload)
    }
}

impl Default for RenderModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_deltas_accumulate_in_order() {
        let mut model = RenderModel::new();
        model.apply(StreamEvent::text("Revenue grew "));
        model.apply(StreamEvent::text("18% "));
        model.apply(StreamEvent::text("this year."));
        assert_eq!(model.text(), "Revenue grew 18% this year.");
    }

    #[test]
    fn version_strictly_increases_across_mutations() {
        let mut model = RenderModel::new();
        assert_eq!(model.version(), 0);
        model.apply(StreamEvent::text("a"));
        assert_eq!(model.version(), 1);
        model.apply(StreamEvent::payload(json!({"v": 1})));
        assert_eq!(model.version(), 2);
        model.set_metrics(metrics_engine::derive(&Default::default()));
        assert_eq!(model.version(), 3);
    }

    #[test]
    fn last_payload_wins() {
        let mut model = RenderModel::new();
        model.apply(StreamEvent::payload(json!({"chart_data": {"ticker": "OLD"}})));
        model.apply(StreamEvent::payload(json!({"chart_data": {"ticker": "NEW"}})));
        assert_eq!(
            model.chart_data().unwrap().ticker.as_deref(),
            Some("NEW")
        );
    }

    #[test]
    fn metrics_are_replaced_wholesale() {
        let mut model = RenderModel::new();

        let first = metrics_engine::derive(
            &report_core::RawMetrics::from_value(json!({"ticker": "A", "beta": 2})).unwrap(),
        );
        let second = metrics_engine::derive(
            &report_core::RawMetrics::from_value(json!({"ticker": "B"})).unwrap(),
        );

        model.set_metrics(first);
        model.set_metrics(second.clone());
        assert_eq!(model.metrics(), Some(&second));
        // Nothing of the first snapshot survives
        assert_eq!(model.metrics().unwrap().risk.market, 50);
    }

    #[test]
    fn fresh_model_per_turn_is_empty() {
        let model = RenderModel::new();
        assert_eq!(model.text(), "");
        assert!(model.payload().is_none());
        assert!(model.metrics().is_none());
        assert!(model.chart_data().is_none());
    }

    #[test]
    fn rendering_is_idempotent_over_accumulated_state() {
        let mut model = RenderModel::new();
        model.apply(StreamEvent::text("stable text"));
        let first = model.text().to_string();
        let second = model.text().to_string();
        assert_eq!(first, second);
        assert_eq!(model.version(), 1);
    }

    /// End-to-end turn: decoder events folded into the model.
    #[tokio::test]
    async fn full_turn_through_decoder_and_model() {
        let chunks = vec![
            Ok("Looking at ACME: ".to_string()),
            Ok("__JSON_START__{\"chart_data\":{\"ticker\":\"ACME\",\"prices\":[10.0,11.5]}}".to_string()),
            Ok("__JSON_END__ prices trended up.".to_string()),
        ];
        let stream = tokio_stream::iter(chunks);

        let mut model = RenderModel::new();
        stream_decoder::decode_stream(stream, |event| model.apply(event))
            .await
            .unwrap();

        assert_eq!(model.text(), "Looking at ACME:  prices trended up.");
        let chart = model.chart_data().unwrap();
        assert_eq!(chart.ticker.as_deref(), Some("ACME"));
        assert_eq!(chart.prices, vec![10.0, 11.5]);
        assert!(model.version() >= 3);
    }
}
