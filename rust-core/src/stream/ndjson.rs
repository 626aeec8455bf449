//! Newline-delimited JSON framing for generation streams.

use super::StreamEvent;
use crate::error::{Result, ToolError};
use futures::future;
use futures::stream::{BoxStream, Stream, StreamExt};
use std::io::{self, Cursor};
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tokio_util::io::StreamReader;

pub type EventStream = BoxStream<'static, Result<StreamEvent>>;

/// Longest line accepted from a stream source.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Turn a chunked NDJSON byte stream into decoded events.
///
/// Chunk boundaries may fall anywhere, including inside a multi-byte
/// character. Blank lines are skipped. The first failure ends the stream:
/// a transport error keeps its own kind, while an undecodable or oversized
/// line becomes [`ToolError::Stream`].
pub fn decode_ndjson<S, B, E>(bytes: S) -> EventStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<ToolError> + Send + 'static,
{
    let reader = StreamReader::new(bytes.map(|chunk| match chunk {
        Ok(chunk) => Ok(Cursor::new(chunk)),
        Err(err) => {
            let err: ToolError = err.into();
            Err(io::Error::other(err))
        }
    }));

    FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_BYTES))
        .filter_map(|line| {
            future::ready(match line {
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => Some(decode_event(&line)),
                Err(err) => Some(Err(framing_error(err))),
            })
        })
        .scan(false, |failed, item| {
            if *failed {
                return future::ready(None);
            }
            *failed = item.is_err();
            future::ready(Some(item))
        })
        .boxed()
}

fn decode_event(line: &str) -> Result<StreamEvent> {
    serde_json::from_str(line)
        .map_err(|e| ToolError::Stream(format!("undecodable event: {}", e)))
}

fn framing_error(err: LinesCodecError) -> ToolError {
    match err {
        LinesCodecError::MaxLineLengthExceeded => {
            ToolError::Stream(format!("event line exceeds {} bytes", MAX_LINE_BYTES))
        }
        LinesCodecError::Io(err) => {
            let message = err.to_string();
            match err.into_inner().map(|inner| inner.downcast::<ToolError>()) {
                Some(Ok(source)) => *source,
                _ => ToolError::Stream(message),
            }
        }
    }
}
