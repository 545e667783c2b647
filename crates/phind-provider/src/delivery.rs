// SPDX-FileCopyrightText: 2026 Phind Adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery modes over one decode pass.
//!
//! - [`read_buffered`]: the whole body, decoded once, as a `String`.
//! - [`DecodedBytes`]: the decoded text as a byte stream, one item per
//!   network chunk that completed at least one line.
//! - [`TextChunks`]: the decoded text as a lazy, single-pass sequence of lines.
//!
//! The streaming modes own the response body. Dropping them at any point
//! releases the connection.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use futures::stream::{FusedStream, Stream, StreamExt};
use phind_core::PhindError;
use pin_project_lite::pin_project;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::decode::{self, IncrementalDecoder};

/// Raw response body chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, PhindError>> + Send>>;

/// Reads the full body and decodes it in one pass.
pub async fn read_buffered(response: reqwest::Response) -> Result<String, PhindError> {
    let body = response.text().await.map_err(|e| PhindError::Provider {
        message: format!("failed to read response body: {e}"),
        source: Some(Box::new(e)),
    })?;
    let (text, stats) = decode::decode_body(&body);
    debug!(
        lines = stats.lines(),
        deltas = stats.deltas,
        malformed = stats.malformed,
        "buffered response decoded"
    );
    Ok(text)
}

/// Turns a response into its body chunk stream.
pub fn body_stream(response: reqwest::Response) -> ByteStream {
    Box::pin(response.bytes_stream().map(|chunk| {
        chunk.map_err(|e| PhindError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })
    }))
}

pin_project! {
    /// Decoded text of a response body, as bytes.
    ///
    /// Each upstream chunk is fed to an [`IncrementalDecoder`]; chunks that
    /// complete no line produce no item. The stream ends after the first
    /// upstream error.
    pub struct DecodedBytes<S> {
        #[pin]
        inner: S,
        decoder: IncrementalDecoder,
        finished: bool,
    }
}

impl<S> DecodedBytes<S>
where
    S: Stream<Item = Result<Bytes, PhindError>>,
{
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            decoder: IncrementalDecoder::new(),
            finished: false,
        }
    }

    /// Exposes the decoded bytes as a [`tokio::io::AsyncRead`].
    pub fn into_async_read(self) -> impl AsyncRead + Send + Unpin
    where
        S: Send + Unpin,
    {
        StreamReader::new(self.map(|chunk| chunk.map_err(std::io::Error::other)))
    }
}

impl DecodedBytes<ByteStream> {
    pub fn from_response(response: reqwest::Response) -> Self {
        Self::new(body_stream(response))
    }
}

impl<S> Stream for DecodedBytes<S>
where
    S: Stream<Item = Result<Bytes, PhindError>>,
{
    type Item = Result<Bytes, PhindError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        if *this.finished {
            return Poll::Ready(None);
        }

        loop {
            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => {
                    let text = this.decoder.feed(&chunk);
                    if !text.is_empty() {
                        return Poll::Ready(Some(Ok(Bytes::from(text))));
                    }
                }
                Some(Err(e)) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    *this.finished = true;
                    let text = this.decoder.finish();
                    let stats = this.decoder.stats();
                    debug!(
                        lines = stats.lines(),
                        deltas = stats.deltas,
                        malformed = stats.malformed,
                        "response stream ended"
                    );
                    return Poll::Ready((!text.is_empty()).then(|| Ok(Bytes::from(text))));
                }
            }
        }
    }
}

impl<S> FusedStream for DecodedBytes<S>
where
    S: Stream<Item = Result<Bytes, PhindError>>,
{
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

pin_project! {
    /// Lazy sequence of decoded text, one item per non-empty line.
    ///
    /// Items keep their trailing `\n`, so concatenating them reproduces the
    /// buffered text exactly. Single pass: once exhausted, every further
    /// poll returns `None`.
    pub struct TextChunks<S> {
        #[pin]
        inner: DecodedBytes<S>,
        pending: VecDeque<String>,
        done: bool,
    }
}

impl<S> TextChunks<S>
where
    S: Stream<Item = Result<Bytes, PhindError>>,
{
    pub fn new(inner: DecodedBytes<S>) -> Self {
        Self {
            inner,
            pending: VecDeque::new(),
            done: false,
        }
    }
}

impl TextChunks<ByteStream> {
    pub fn from_response(response: reqwest::Response) -> Self {
        Self::new(DecodedBytes::from_response(response))
    }
}

impl<S> Stream for TextChunks<S>
where
    S: Stream<Item = Result<Bytes, PhindError>>,
{
    type Item = Result<String, PhindError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(line) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(line)));
            }
            if *this.done {
                return Poll::Ready(None);
            }

            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(bytes)) => {
                    let text = String::from_utf8_lossy(&bytes);
                    this.pending
                        .extend(text.split_inclusive('\n').map(str::to_string));
                }
                Some(Err(e)) => {
                    *this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                None => *this.done = true,
            }
        }
    }
}

impl<S> FusedStream for TextChunks<S>
where
    S: Stream<Item = Result<Bytes, PhindError>>,
{
    fn is_terminated(&self) -> bool {
        self.done && self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use tokio::io::AsyncReadExt;

    fn event(content: &str) -> String {
        format!(
            "data: {}\n",
            serde_json::json!({"choices": [{"delta": {"content": content}}]})
        )
    }

    fn chunks(parts: Vec<Vec<u8>>) -> ByteStream {
        Box::pin(stream::iter(
            parts.into_iter().map(|p| Ok(Bytes::from(p))).collect::<Vec<_>>(),
        ))
    }

    fn split_at_every(body: &str, size: usize) -> Vec<Vec<u8>> {
        body.as_bytes().chunks(size).map(<[u8]>::to_vec).collect()
    }

    fn sample_body() -> String {
        let mut body = String::new();
        for piece in ["Para", "graph one.\\n", "Para", "graph two.", "\\nEnd"] {
            body.push_str(&event(piece));
        }
        body.push_str("data: [DONE]\n");
        body
    }

    #[tokio::test]
    async fn decoded_bytes_match_buffered_text() {
        let body = sample_body();
        for size in [1, 3, 7, 64, body.len()] {
            let decoded = DecodedBytes::new(chunks(split_at_every(&body, size)));
            let collected: Vec<Bytes> = decoded
                .map(|item| item.expect("no errors"))
                .collect()
                .await;
            let text: String = collected
                .iter()
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .collect();
            assert_eq!(text, decode::decode_body(&body).0, "chunk size {size}");
        }
    }

    #[tokio::test]
    async fn chunks_without_complete_lines_produce_nothing() {
        let body = event("only");
        let (head, tail) = body.split_at(10);
        let mut decoded = DecodedBytes::new(chunks(vec![
            head.as_bytes().to_vec(),
            tail.as_bytes().to_vec(),
        ]));
        let first = decoded.next().await.unwrap().unwrap();
        assert_eq!(first, Bytes::from("only"));
        assert!(decoded.next().await.is_none());
        assert!(decoded.is_terminated());
    }

    #[tokio::test]
    async fn text_chunks_concatenate_to_buffered_text() {
        let body = sample_body();
        let text_chunks = TextChunks::new(DecodedBytes::new(chunks(split_at_every(&body, 5))));
        let items: Vec<String> = text_chunks.map(|item| item.unwrap()).collect().await;

        assert!(items.iter().all(|item| !item.is_empty()));
        assert_eq!(items.concat(), "Paragraph one.\nParagraph two.\nEnd");
    }

    #[tokio::test]
    async fn text_chunks_split_on_newlines() {
        let body = event("a\\nb\\nc");
        let items: Vec<String> = TextChunks::new(DecodedBytes::new(chunks(vec![body.into_bytes()])))
            .map(|item| item.unwrap())
            .collect()
            .await;
        assert_eq!(items, vec!["a\n", "b\n", "c"]);
    }

    #[tokio::test]
    async fn text_chunks_are_single_pass() {
        let mut text_chunks =
            TextChunks::new(DecodedBytes::new(chunks(vec![event("once").into_bytes()])));

        let mut count = 0;
        while let Some(item) = text_chunks.next().await {
            item.unwrap();
            count += 1;
        }
        assert_eq!(count, 1);
        assert!(text_chunks.is_terminated());
        assert!(text_chunks.next().await.is_none());
        assert!(text_chunks.next().await.is_none());
    }

    #[tokio::test]
    async fn upstream_error_ends_stream() {
        let upstream: ByteStream = Box::pin(stream::iter(vec![
            Ok(Bytes::from(event("before"))),
            Err(PhindError::Provider {
                message: "connection reset".into(),
                source: None,
            }),
            Ok(Bytes::from(event("after"))),
        ]));
        let mut text_chunks = TextChunks::new(DecodedBytes::new(upstream));

        assert_eq!(text_chunks.next().await.unwrap().unwrap(), "before");
        let err = text_chunks.next().await.unwrap().unwrap_err();
        assert!(err.to_string().contains("connection reset"));
        assert!(text_chunks.next().await.is_none());
    }

    #[tokio::test]
    async fn empty_body_yields_nothing() {
        let mut text_chunks = TextChunks::new(DecodedBytes::new(chunks(vec![])));
        assert!(text_chunks.next().await.is_none());
    }

    #[tokio::test]
    async fn dropping_mid_stream_is_clean() {
        let body = sample_body();
        let mut text_chunks = TextChunks::new(DecodedBytes::new(chunks(split_at_every(&body, 4))));
        let first = text_chunks.next().await.unwrap().unwrap();
        assert!(!first.is_empty());
        drop(text_chunks);
    }

    #[tokio::test]
    async fn async_read_yields_decoded_text() {
        let body = sample_body();
        let mut reader = DecodedBytes::new(chunks(split_at_every(&body, 9))).into_async_read();
        let mut text = String::new();
        reader.read_to_string(&mut text).await.unwrap();
        assert_eq!(text, "Paragraph one.\nParagraph two.\nEnd");
    }
}
