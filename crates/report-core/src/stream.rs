use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One decoded event from a streamed chat response.
///
/// Ordering is significant: events are emitted in the order their source
/// bytes were fully received, and a structured payload is never split or
/// reordered relative to the text around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A span of free-form narrative text, ready to render immediately.
    TextDelta { text: String },
    /// An embedded structured payload (chart/metric data).
    StructuredPayload { payload: Value },
}

impl StreamEvent {
    pub fn text(text: impl Into<String>) -> Self {
        StreamEvent::TextDelta { text: text.into() }
    }

    pub fn payload(payload: Value) -> Self {
        StreamEvent::StructuredPayload { payload }
    }
}
