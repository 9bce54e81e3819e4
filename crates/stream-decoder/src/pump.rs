//! Sequential pull-loop driving a `StreamDecoder` from a chunked transport.

use futures_util::{pin_mut, Stream, StreamExt};
use report_core::{ReportError, StreamEvent};

use crate::StreamDecoder;

/// Drive one chat turn: pull chunks in arrival order, hand every decoded
/// event to `on_event`, and finish the decoder when the stream ends.
///
/// On a transport error the buffered text is still flushed before the error
/// is returned; partially accumulated narrative is never silently dropped,
/// and no truncated payload is ever parsed as valid. The caller treats the
/// error as terminal for the turn (the turn's render model gets discarded,
/// not patched).
pub async fn decode_stream<S, F>(stream: S, mut on_event: F) -> Result<(), ReportError>
where
    S: Stream<Item = Result<String, ReportError>>,
    F: FnMut(StreamEvent),
{
    pin_mut!(stream);
    let mut decoder = StreamDecoder::new();

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => {
                for event in decoder.push(&chunk) {
                    on_event(event);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "transport failed mid-stream");
                for event in decoder.finish() {
                    on_event(event);
                }
                return Err(e);
            }
        }
    }

    for event in decoder.finish() {
        on_event(event);
    }
    Ok(())
}
