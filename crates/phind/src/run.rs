// SPDX-FileCopyrightText: 2026 Phind Adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs one prompt through the provider and writes the text to an output.

use std::path::PathBuf;

use futures::StreamExt;
use phind_core::{CallWarning, GenerateRequest, PhindError, Prompt, ProviderAdapter};
use phind_provider::{normalize, PhindProvider};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Delivery mode selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DeliveryMode {
    /// Wait for the whole response, then print it.
    Buffered,
    /// Print text parts as they arrive.
    Stream,
    /// Copy the decoded byte stream to the output.
    Reader,
}

/// Where the prompt comes from.
#[derive(Debug, Clone)]
pub enum PromptSource {
    Text(String),
    /// JSON file holding a conversation.
    File(PathBuf),
}

impl PromptSource {
    pub async fn load(self) -> Result<Prompt, PhindError> {
        match self {
            Self::Text(text) => Ok(Prompt::Text(text)),
            Self::File(path) => {
                let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
                    PhindError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                serde_json::from_str(&raw).map_err(|e| {
                    PhindError::Config(format!("invalid conversation in {}: {e}", path.display()))
                })
            }
        }
    }
}

/// Sends `prompt` and writes the resulting text to `out`, newline-terminated.
pub async fn run<W>(
    provider: &PhindProvider,
    prompt: Prompt,
    mode: DeliveryMode,
    out: &mut W,
) -> Result<(), PhindError>
where
    W: AsyncWrite + Unpin,
{
    debug!(?mode, model = provider.model_id(), "running prompt");

    match mode {
        DeliveryMode::Buffered => {
            let response = provider.generate(GenerateRequest::new(prompt)).await?;
            log_warnings(&response.warnings);
            write(out, response.text.as_bytes()).await?;
        }
        DeliveryMode::Stream => {
            let response = provider.stream(GenerateRequest::new(prompt)).await?;
            log_warnings(&response.warnings);
            let mut parts = response.stream;
            while let Some(part) = parts.next().await {
                if let Some(text) = part?.as_text_delta() {
                    write(out, text.as_bytes()).await?;
                    flush(out).await?;
                }
            }
        }
        DeliveryMode::Reader => {
            let messages = normalize(&prompt);
            let mut reader = provider.client().chat_reader(&messages).await?.into_async_read();
            tokio::io::copy(&mut reader, out).await.map_err(|e| PhindError::Provider {
                message: format!("failed to copy response: {e}"),
                source: Some(Box::new(e)),
            })?;
        }
    }

    write(out, b"\n").await?;
    flush(out).await
}

fn log_warnings(warnings: &[CallWarning]) {
    for warning in warnings {
        warn!(?warning, "call warning");
    }
}

async fn write<W: AsyncWrite + Unpin>(out: &mut W, bytes: &[u8]) -> Result<(), PhindError> {
    out.write_all(bytes).await.map_err(output_error)
}

async fn flush<W: AsyncWrite + Unpin>(out: &mut W) -> Result<(), PhindError> {
    out.flush().await.map_err(output_error)
}

fn output_error(e: std::io::Error) -> PhindError {
    PhindError::Provider {
        message: format!("failed to write output: {e}"),
        source: Some(Box::new(e)),
    }
}
