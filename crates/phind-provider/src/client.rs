// SPDX-FileCopyrightText: 2026 Phind Adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Phind agent endpoint.
//!
//! Provides [`PhindClient`], which posts one conversation per call and hands
//! the response body to a delivery mode from [`crate::delivery`].

use std::collections::BTreeMap;

use phind_core::{PhindError, RawResponse};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONTENT_TYPE, USER_AGENT};
use tracing::{debug, error};

use crate::delivery::{self, ByteStream, DecodedBytes, TextChunks};
use crate::types::{NormalizedMessage, RequestPayload};

/// HTTP client for Phind agent communication.
///
/// One POST per call. No retries and no client-side timeout.
#[derive(Debug, Clone)]
pub struct PhindClient {
    client: reqwest::Client,
    api_url: reqwest::Url,
    model: String,
}

impl PhindClient {
    /// Creates a client posting to `api_url` with `model` as the default model.
    pub fn new(api_url: &str, model: impl Into<String>) -> Result<Self, PhindError> {
        let api_url = reqwest::Url::parse(api_url)
            .map_err(|e| PhindError::Config(format!("invalid api_url {api_url:?}: {e}")))?;

        let client = reqwest::Client::builder()
            .default_headers(default_headers())
            .build()
            .map_err(|e| PhindError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            api_url,
            model: model.into(),
        })
    }

    /// Returns the default model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the endpoint URL.
    pub fn api_url(&self) -> &str {
        self.api_url.as_str()
    }

    /// Posts the conversation and returns the successful response unread.
    ///
    /// A non-success status is fatal: the body is logged and a
    /// [`PhindError::Transport`] is returned.
    pub async fn send(
        &self,
        messages: &[NormalizedMessage],
        model: &str,
    ) -> Result<reqwest::Response, PhindError> {
        let payload = RequestPayload::new(messages, model);

        let response = self
            .client
            .post(self.api_url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| PhindError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model, messages = messages.len(), "response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = describe_body(response.text().await);
        error!(status = %status, body = %body, "phind request failed");
        Err(PhindError::Transport {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        })
    }

    /// Buffered mode: the whole decoded text.
    pub async fn chat(&self, messages: &[NormalizedMessage]) -> Result<String, PhindError> {
        let response = self.send(messages, &self.model).await?;
        delivery::read_buffered(response).await
    }

    /// Reader mode: decoded text as bytes, chunk by chunk.
    pub async fn chat_reader(
        &self,
        messages: &[NormalizedMessage],
    ) -> Result<DecodedBytes<ByteStream>, PhindError> {
        let response = self.send(messages, &self.model).await?;
        Ok(DecodedBytes::from_response(response))
    }

    /// Lazy sequence mode: decoded text, line by line.
    pub async fn chat_stream(
        &self,
        messages: &[NormalizedMessage],
    ) -> Result<TextChunks<ByteStream>, PhindError> {
        let response = self.send(messages, &self.model).await?;
        Ok(TextChunks::from_response(response))
    }
}

/// Headers sent with every request.
fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("Identity"));
    headers.insert(USER_AGENT, HeaderValue::from_static(""));
    headers
}

/// Text of an error response body for logging, or why it could not be read.
fn describe_body<E: std::fmt::Display>(read: Result<String, E>) -> String {
    read.unwrap_or_else(|e| format!("<unreadable body: {e}>"))
}

/// Captures response headers. Repeated headers are joined with `", "`.
pub fn raw_response(response: &reqwest::Response) -> RawResponse {
    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in response.headers() {
        let value = String::from_utf8_lossy(value.as_bytes());
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    RawResponse { headers }
}
