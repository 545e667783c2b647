// SPDX-FileCopyrightText: 2026 Phind Adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event-line decoder for Phind agent responses.
//!
//! The response body is newline-delimited text. Lines of the form
//! `data: {json}` carry an OpenAI-style envelope whose
//! `choices[0].delta.content` is the next piece of text. Every delivery mode
//! funnels lines through [`classify_line`] and the final text through
//! [`unescape_newlines`], so decoding behaves identically everywhere.

use serde_json::Value;

/// Prefix of lines that carry an event payload.
pub const DATA_PREFIX: &str = "data: ";

/// Lines containing this marker end the logical stream and are skipped.
pub const DONE_SENTINEL: &str = "[DONE]";

/// JSON pointer to the text delta inside an event envelope.
const DELTA_POINTER: &str = "/choices/0/delta/content";

/// What one response line contributes to the output.
#[derive(Debug)]
pub enum LineOutcome {
    /// A text delta.
    Delta(String),
    /// A parsed event without text at the delta path.
    Empty,
    /// Not a data line, or the done sentinel.
    Skipped,
    /// A data line whose payload is not JSON. Contributes nothing.
    Malformed(serde_json::Error),
}

/// Classifies one response line.
pub fn classify_line(line: &str) -> LineOutcome {
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return LineOutcome::Skipped;
    };
    if line.contains(DONE_SENTINEL) {
        return LineOutcome::Skipped;
    }

    match serde_json::from_str::<Value>(payload) {
        Ok(event) => match event.pointer(DELTA_POINTER) {
            Some(Value::String(text)) if !text.is_empty() => LineOutcome::Delta(text.clone()),
            _ => LineOutcome::Empty,
        },
        Err(e) => LineOutcome::Malformed(e),
    }
}

/// Per-class line counts, for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub deltas: usize,
    pub empty: usize,
    pub skipped: usize,
    pub malformed: usize,
}

impl DecodeStats {
    fn record(&mut self, outcome: &LineOutcome) {
        match outcome {
            LineOutcome::Delta(_) => self.deltas += 1,
            LineOutcome::Empty => self.empty += 1,
            LineOutcome::Skipped => self.skipped += 1,
            LineOutcome::Malformed(_) => self.malformed += 1,
        }
    }

    /// Total lines seen.
    pub fn lines(&self) -> usize {
        self.deltas + self.empty + self.skipped + self.malformed
    }
}

/// Concatenates the raw deltas of `lines`, without unescaping.
pub fn collect_deltas<'a, I>(lines: I, stats: &mut DecodeStats) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut text = String::new();
    for line in lines {
        let outcome = classify_line(line);
        stats.record(&outcome);
        if let LineOutcome::Delta(delta) = outcome {
            text.push_str(&delta);
        }
    }
    text
}

/// Replaces each literal backslash-n pair with a newline.
///
/// Real newlines already present are left as they are.
pub fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Decodes a batch of lines into text.
pub fn decode_lines<'a, I>(lines: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut stats = DecodeStats::default();
    unescape_newlines(&collect_deltas(lines, &mut stats))
}

/// Decodes a complete response body, returning the text and line counts.
pub fn decode_body(body: &str) -> (String, DecodeStats) {
    let mut stats = DecodeStats::default();
    let text = unescape_newlines(&collect_deltas(body.split('\n'), &mut stats));
    (text, stats)
}

/// Decoder for a body that arrives in arbitrary chunks.
///
/// Bytes after the last newline of a chunk are kept and prepended to the
/// next chunk, so an event split across network reads is decoded once,
/// whole. A trailing backslash is held back in case the next delta starts
/// with `n`. Feeding any chunking of a body and then calling
/// [`finish`](Self::finish) yields the same text as [`decode_body`].
#[derive(Debug, Default)]
pub struct IncrementalDecoder {
    partial: Vec<u8>,
    held_backslash: bool,
    stats: DecodeStats,
}

impl IncrementalDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns the text decoded from its complete lines.
    pub fn feed(&mut self, chunk: &[u8]) -> String {
        let start = self.partial.len();
        self.partial.extend_from_slice(chunk);
        // Earlier bytes in `partial` hold no newline.
        let Some(offset) = chunk.iter().rposition(|&b| b == b'\n') else {
            return String::new();
        };
        let last_newline = start + offset;

        let complete: Vec<u8> = self.partial.drain(..=last_newline).collect();
        let text = String::from_utf8_lossy(&complete[..last_newline]);
        let raw = collect_deltas(text.split('\n'), &mut self.stats);
        self.emit(raw)
    }

    /// Decodes whatever is left once the body has ended.
    pub fn finish(&mut self) -> String {
        let raw = if self.partial.is_empty() {
            String::new()
        } else {
            let rest = std::mem::take(&mut self.partial);
            let text = String::from_utf8_lossy(&rest);
            collect_deltas(text.split('\n'), &mut self.stats)
        };

        let mut text = self.emit(raw);
        if std::mem::take(&mut self.held_backslash) {
            text.push('\\');
        }
        text
    }

    /// Line counts so far.
    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    fn emit(&mut self, raw: String) -> String {
        let mut text = String::with_capacity(raw.len() + 1);
        if std::mem::take(&mut self.held_backslash) {
            text.push('\\');
        }
        text.push_str(&raw);
        if text.ends_with('\\') {
            text.pop();
            self.held_backslash = true;
        }
        unescape_newlines(&text)
    }
}
