//! Sentinel-marker stream decoder.
//!
//! Turns an arbitrarily chunked chat response into ordered `StreamEvent`s.
//! A structured payload is delimited inline by `__JSON_START__` /
//! `__JSON_END__`; everything else is narrative text and is flushed as soon
//! as it provably cannot be part of a marker.

use report_core::StreamEvent;
use serde_json::Value;

/// Opens an embedded structured payload.
pub const JSON_START: &str = "__JSON_START__";
/// Closes an embedded structured payload.
pub const JSON_END: &str = "__JSON_END__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No marker pending; buffered text is flushed eagerly.
    Scanning,
    /// START seen; buffering the payload span until END arrives.
    PayloadPending,
}

/// Two-state decoder, driven synchronously one chunk at a time.
///
/// Allocate one per chat turn. Chunk split points are arbitrary: a marker
/// split across chunks is still recognized, because while scanning the
/// decoder retains only a trailing suffix that is a prefix of the START
/// marker (bounded by marker length - 1) and flushes everything before it.
#[derive(Debug)]
pub struct StreamDecoder {
    state: State,
    buffer: String,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self {
            state: State::Scanning,
            buffer: String::new(),
        }
    }

    /// Consume one chunk, returning every event it completes, in order.
    pub fn push(&mut self, chunk: &str) -> Vec<StreamEvent> {
        self.buffer.push_str(chunk);
        let mut events = Vec::new();

        loop {
            match self.state {
                State::Scanning => {
                    if let Some(idx) = self.buffer.find(JSON_START) {
                        // Text before the marker renders immediately.
                        if idx > 0 {
                            events.push(StreamEvent::text(&self.buffer[..idx]));
                        }
                        self.buffer.drain(..idx + JSON_START.len());
                        self.state = State::PayloadPending;
                        tracing::debug!("payload opened");
                    } else {
                        // Hold back only what might still become a marker.
                        let keep = marker_prefix_overlap(&self.buffer, JSON_START);
                        let flush_to = self.buffer.len() - keep;
                        if flush_to > 0 {
                            events.push(StreamEvent::text(&self.buffer[..flush_to]));
                            self.buffer.drain(..flush_to);
                        }
                        break;
                    }
                }
                State::PayloadPending => {
                    if let Some(idx) = self.buffer.find(JSON_END) {
                        match serde_json::from_str::<Value>(&self.buffer[..idx]) {
                            Ok(payload) => events.push(StreamEvent::payload(payload)),
                            Err(e) => {
                                // Discard the span only; the narrative around
                                // it must survive a corrupt payload.
                                tracing::warn!(error = %e, "discarding malformed payload span");
                            }
                        }
                        self.buffer.drain(..idx + JSON_END.len());
                        self.state = State::Scanning;
                        tracing::debug!("payload closed");
                    } else {
                        break;
                    }
                }
            }
        }

        events
    }

    /// End of stream. While scanning, the retained suffix flushes as text.
    /// An unterminated payload also degrades to visible text (marker
    /// excluded) rather than being silently dropped.
    pub fn finish(self) -> Vec<StreamEvent> {
        if self.state == State::PayloadPending {
            tracing::debug!("stream ended with payload pending; degrading span to text");
        }
        if self.buffer.is_empty() {
            Vec::new()
        } else {
            vec![StreamEvent::TextDelta { text: self.buffer }]
        }
    }
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Length of the longest suffix of `buffer` that is a proper prefix of
/// `marker`. The marker is ASCII, so the returned length always falls on a
/// char boundary of `buffer`.
fn marker_prefix_overlap(buffer: &str, marker: &str) -> usize {
    let max = marker.len().saturating_sub(1).min(buffer.len());
    for k in (1..=max).rev() {
        if !buffer.is_char_boundary(buffer.len() - k) {
            continue;
        }
        if buffer.ends_with(&marker[..k]) {
            return k;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Run a full turn: push every chunk, then finish.
    fn decode_all(chunks: &[&str]) -> Vec<StreamEvent> {
        let mut decoder = StreamDecoder::new();
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(decoder.push(chunk));
        }
        events.extend(decoder.finish());
        events
    }

    /// Collapse an event sequence into (concatenated text, payloads in order).
    fn normalize(events: &[StreamEvent]) -> (String, Vec<Value>) {
        let mut text = String::new();
        let mut payloads = Vec::new();
        for ev in events {
            match ev {
                StreamEvent::TextDelta { text: t } => text.push_str(t),
                StreamEvent::StructuredPayload { payload } => payloads.push(payload.clone()),
            }
        }
        (text, payloads)
    }

    #[test]
    fn plain_text_passes_through() {
        let events = decode_all(&["Revenue grew ", "18% year over year."]);
        let (text, payloads) = normalize(&events);
        assert_eq!(text, "Revenue grew 18% year over year.");
        assert!(payloads.is_empty());
    }

    #[test]
    fn payload_between_text_spans() {
        let events = decode_all(&[
            "Here is the chart: __JSON_START__{\"chart_data\":{\"ticker\":\"ACME\"}}__JSON_END__ done.",
        ]);
        let (text, payloads) = normalize(&events);
        assert_eq!(text, "Here is the chart:  done.");
        assert_eq!(payloads, vec![json!({"chart_data": {"ticker": "ACME"}})]);
        // Text before the marker flushed before the payload event
        assert!(matches!(&events[0], StreamEvent::TextDelta { .. }));
        assert!(matches!(&events[1], StreamEvent::StructuredPayload { .. }));
    }

    #[test]
    fn chunk_boundary_independence() {
        let full = "Intro text __JSON_START__{\"v\": 1}__JSON_END__ middle \
                    __JSON_START__{\"v\": 2}__JSON_END__ outro";

        let whole = normalize(&decode_all(&[full]));

        // Byte-by-byte
        let mut decoder = StreamDecoder::new();
        let mut events = Vec::new();
        let mut buf = [0u8; 4];
        for c in full.chars() {
            events.extend(decoder.push(c.encode_utf8(&mut buf)));
        }
        events.extend(decoder.finish());
        assert_eq!(normalize(&events), whole);

        // A few awkward split widths
        for width in [2, 3, 5, 7, 13] {
            let chunks: Vec<String> = full
                .as_bytes()
                .chunks(width)
                .map(|c| String::from_utf8(c.to_vec()).unwrap())
                .collect();
            let refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
            assert_eq!(normalize(&decode_all(&refs)), whole, "width {width}");
        }
    }

    #[test]
    fn start_marker_split_across_chunks() {
        let events = decode_all(&["before __JSON_ST", "ART__{\"x\":1}__JSON_END__ after"]);
        let (text, payloads) = normalize(&events);
        // No partial marker text leaks into a delta
        assert_eq!(text, "before  after");
        assert_eq!(payloads, vec![json!({"x": 1})]);
    }

    #[test]
    fn end_marker_split_across_chunks() {
        let events = decode_all(&["__JSON_START__{\"x\":1}__JSON_E", "ND__ tail"]);
        let (text, payloads) = normalize(&events);
        assert_eq!(text, " tail");
        assert_eq!(payloads, vec![json!({"x": 1})]);
    }

    #[test]
    fn partial_marker_is_held_back_not_flushed() {
        let mut decoder = StreamDecoder::new();
        let events = decoder.push("hello __JSON_");
        // "hello " may flush, the possible marker prefix may not
        let (text, _) = normalize(&events);
        assert_eq!(text, "hello ");
    }

    #[test]
    fn false_marker_prefix_eventually_flushes() {
        let events = decode_all(&["value is __JSON_", "like, not a marker"]);
        let (text, payloads) = normalize(&events);
        assert_eq!(text, "value is __JSON_like, not a marker");
        assert!(payloads.is_empty());
    }

    #[test]
    fn malformed_payload_is_discarded_silently() {
        let events = decode_all(&[
            "before __JSON_START__{not valid json}__JSON_END__ after",
        ]);
        let (text, payloads) = normalize(&events);
        // Span is dropped; surrounding narrative survives; no error
        assert_eq!(text, "before  after");
        assert!(payloads.is_empty());

        // Decoder keeps working after a bad span
        let events = decode_all(&[
            "__JSON_START__oops__JSON_END____JSON_START__{\"ok\":true}__JSON_END__",
        ]);
        let (_, payloads) = normalize(&events);
        assert_eq!(payloads, vec![json!({"ok": true})]);
    }

    #[test]
    fn decoder_flushes_unterminated_payload_as_text() {
        // Policy: END never arrives -> the span degrades to visible text at
        // stream end (the consumed START marker is not replayed).
        let events = decode_all(&["narrative __JSON_START__{\"half\": tru"]);
        let (text, payloads) = normalize(&events);
        assert_eq!(text, "narrative {\"half\": tru");
        assert!(payloads.is_empty());
    }

    #[test]
    fn trailing_marker_prefix_flushes_at_finish() {
        let events = decode_all(&["ends with __JSON"]);
        let (text, _) = normalize(&events);
        assert_eq!(text, "ends with __JSON");
    }

    #[test]
    fn back_to_back_payloads_keep_order() {
        let events = decode_all(&[
            "__JSON_START__{\"n\":1}__JSON_END____JSON_START__{\"n\":2}__JSON_END__",
        ]);
        let (text, payloads) = normalize(&events);
        assert_eq!(text, "");
        assert_eq!(payloads, vec![json!({"n": 1}), json!({"n": 2})]);
    }

    #[test]
    fn multibyte_text_is_never_split_mid_char() {
        let full = "ökonomisch — 株価 __JSON_START__{\"v\":3}__JSON_END__ ✓";
        let whole = normalize(&decode_all(&[full]));

        let mut decoder = StreamDecoder::new();
        let mut events = Vec::new();
        let mut buf = [0u8; 4];
        for c in full.chars() {
            events.extend(decoder.push(c.encode_utf8(&mut buf)));
        }
        events.extend(decoder.finish());
        assert_eq!(normalize(&events), whole);
    }
}
