// SPDX-FileCopyrightText: 2026 Phind Adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for text-generation endpoints.

use async_trait::async_trait;

use crate::error::PhindError;
use crate::types::{GenerateRequest, GenerateResponse, ModelCapabilities, StreamResponse};

/// Adapter for a text-generation provider.
///
/// Implementations translate a [`GenerateRequest`] into calls against one
/// remote endpoint and map the answer back into provider-agnostic shapes,
/// either all at once or as a stream of parts.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + 'static {
    /// Returns the provider name (e.g. `"phind"`).
    fn provider(&self) -> &str;

    /// Returns the model identifier requests are sent with.
    fn model_id(&self) -> &str;

    /// Returns the static capability descriptor of this provider.
    fn capabilities(&self) -> ModelCapabilities;

    /// Generates the full text for a request.
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, PhindError>;

    /// Generates text as a stream of deltas terminated by a finish part.
    ///
    /// Transport failures are reported here, before the stream is returned.
    async fn stream(&self, request: GenerateRequest) -> Result<StreamResponse, PhindError>;
}
