use std::collections::VecDeque;
use std::pin::Pin;

use futures::StreamExt as _;
use futures::stream;

use crate::errors::ClientError;

/// One server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

/// Byte stream of an HTTP response body.
pub type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, ClientError>> + Send + 'static>>;

/// Decoded SSE frames of one push connection.
pub type FrameStream =
    Pin<Box<dyn futures::Stream<Item = Result<SseFrame, ClientError>> + Send + 'static>>;

/// Incremental decoder; frames may span any number of chunks.
#[derive(Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    /// Length of `buf` already searched without finding a delimiter.
    scanned: usize,
}

impl SseDecoder {
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        let mut start = 0;
        // A delimiter may straddle the previous chunk boundary.
        let mut from = self.scanned.saturating_sub(3);
        while let Some((idx, delim_len)) = find_frame_delimiter(&self.buf, from) {
            if let Some(frame) = parse_sse_frame(&self.buf[start..idx]) {
                frames.push(frame);
            }
            start = idx + delim_len;
            from = start;
        }
        self.buf.drain(..start);
        self.scanned = self.buf.len();
        frames
    }
}

/// First `\n\n` or `\r\n\r\n` at or after `from`, with its length.
fn find_frame_delimiter(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut i = from;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some((i, 2));
        }
        if buf[i..].starts_with(b"\r\n\r\n") {
            return Some((i, 4));
        }
        i += 1;
    }
    None
}

fn parse_sse_frame(bytes: &[u8]) -> Option<SseFrame> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    let mut event: Option<String> = None;
    let mut data_lines: Vec<&str> = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("event:") {
            event = Some(rest.trim_start().to_string());
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    if data_lines.is_empty() {
        return None;
    }
    Some(SseFrame {
        event,
        data: data_lines.join("\n"),
    })
}

/// Turns a response byte stream into a stream of SSE frames. Ends when the
/// body ends; yields one error and stops when a read fails.
pub fn frame_stream(bytes_stream: ByteStream) -> FrameStream {
    struct State {
        bytes_stream: ByteStream,
        decoder: SseDecoder,
        pending: VecDeque<SseFrame>,
        done: bool,
    }

    Box::pin(stream::try_unfold(
        State {
            bytes_stream,
            decoder: SseDecoder::default(),
            pending: VecDeque::new(),
            done: false,
        },
        |mut state| async move {
            loop {
                if let Some(frame) = state.pending.pop_front() {
                    return Ok(Some((frame, state)));
                }
                if state.done {
                    return Ok(None);
                }
                match state.bytes_stream.next().await {
                    Some(Ok(chunk)) => {
                        state.pending.extend(state.decoder.push_chunk(&chunk));
                    }
                    Some(Err(err)) => return Err(err),
                    None => state.done = true,
                }
            }
        },
    ))
}
