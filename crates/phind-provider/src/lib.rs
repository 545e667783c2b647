// SPDX-FileCopyrightText: 2026 Phind Adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phind agent provider adapter.
//!
//! This crate implements [`ProviderAdapter`] for the Phind agent endpoint,
//! providing both single-shot generation and streaming text deltas. Prompts
//! are flattened by [`normalize`], posted by [`PhindClient`], and decoded by
//! the event-line decoder in [`decode`].

pub mod client;
pub mod decode;
pub mod delivery;
pub mod normalize;
pub mod types;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use phind_config::PhindConfig;
use phind_core::{
    CallSettings, CallWarning, FinishReason, GenerateRequest, GenerateResponse,
    ModelCapabilities, ObjectGenerationMode, PhindError, ProviderAdapter, RawCall, StreamPart,
    StreamResponse, TokenUsage,
};
use tracing::{debug, info};

pub use crate::client::PhindClient;
pub use crate::delivery::{DecodedBytes, TextChunks};
pub use crate::normalize::normalize;
pub use crate::types::{NormalizedMessage, RequestPayload};

/// Provider name reported by [`PhindProvider`].
pub const PROVIDER_NAME: &str = "phind";

/// Phind provider implementing [`ProviderAdapter`].
///
/// Holds no per-request state; one instance may serve concurrent calls.
#[derive(Debug, Clone)]
pub struct PhindProvider {
    client: PhindClient,
}

impl PhindProvider {
    /// Creates a provider for `model` against the default endpoint.
    pub fn new(model: impl Into<String>) -> Result<Self, PhindError> {
        Self::with_api_url(phind_config::DEFAULT_API_URL, model)
    }

    /// Creates a provider for `model` against `api_url`.
    pub fn with_api_url(api_url: &str, model: impl Into<String>) -> Result<Self, PhindError> {
        let client = PhindClient::new(api_url, model)?;
        info!(
            model = client.model(),
            api_url = client.api_url(),
            "Phind provider initialized"
        );
        Ok(Self { client })
    }

    /// Creates a provider from the `[provider]` configuration section.
    pub fn from_config(config: &PhindConfig) -> Result<Self, PhindError> {
        Self::with_api_url(&config.provider.api_url, config.provider.default_model.clone())
    }

    /// Returns the underlying HTTP client.
    pub fn client(&self) -> &PhindClient {
        &self.client
    }

    async fn send(&self, request: &GenerateRequest) -> Result<reqwest::Response, PhindError> {
        let messages = normalize(&request.prompt);
        debug!(messages = messages.len(), "prompt normalized");
        self.client.send(&messages, self.client.model()).await
    }
}

/// One warning per setting the caller configured. The endpoint accepts none.
fn unsupported_settings(settings: &CallSettings) -> Vec<CallWarning> {
    settings
        .configured()
        .into_iter()
        .map(|setting| CallWarning::UnsupportedSetting {
            setting: setting.to_string(),
            details: Some("the Phind agent endpoint ignores sampling settings".into()),
        })
        .collect()
}

fn raw_call(request: &GenerateRequest) -> RawCall {
    RawCall {
        raw_prompt: request.prompt.clone(),
        raw_settings: serde_json::Map::new(),
    }
}

#[async_trait]
impl ProviderAdapter for PhindProvider {
    fn provider(&self) -> &str {
        PROVIDER_NAME
    }

    fn model_id(&self) -> &str {
        self.client.model()
    }

    fn capabilities(&self) -> ModelCapabilities {
        ModelCapabilities {
            specification_version: "v1",
            default_object_generation_mode: ObjectGenerationMode::Json,
            supports_image_urls: false,
            supports_structured_outputs: false,
        }
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, PhindError> {
        let warnings = unsupported_settings(&request.settings);
        let response = self.send(&request).await?;
        let raw_response = client::raw_response(&response);
        let text = delivery::read_buffered(response).await?;

        Ok(GenerateResponse {
            text,
            finish_reason: FinishReason::Stop,
            usage: TokenUsage::unknown(),
            warnings,
            raw_call: raw_call(&request),
            raw_response,
        })
    }

    async fn stream(&self, request: GenerateRequest) -> Result<StreamResponse, PhindError> {
        let warnings = unsupported_settings(&request.settings);
        let response = self.send(&request).await?;
        let raw_response = client::raw_response(&response);

        let deltas = TextChunks::from_response(response)
            .map(|chunk| chunk.map(StreamPart::TextDelta));
        let finish = stream::once(async {
            Ok(StreamPart::Finish {
                finish_reason: FinishReason::Stop,
                usage: TokenUsage::unknown(),
            })
        });

        // An error ends the stream; no finish part follows it.
        let parts = deltas.chain(finish).scan(false, |failed, part| {
            if *failed {
                return futures::future::ready(None);
            }
            *failed = part.is_err();
            futures::future::ready(Some(part))
        });

        Ok(StreamResponse {
            stream: Box::pin(parts),
            warnings,
            raw_call: raw_call(&request),
            raw_response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phind_core::{ConversationTurn, Prompt};
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BODY: &str = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Paris\"}}]}\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\" is the capital.\\\\nDone\"}}]}\n",
        "data: [DONE]\n",
    );

    async fn provider_for(server: &MockServer) -> PhindProvider {
        PhindProvider::with_api_url(&format!("{}/agent/", server.uri()), "Phind-70B").unwrap()
    }

    async fn mount_ok(server: &MockServer) {
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-request-id", "req-1")
                    .set_body_string(BODY),
            )
            .mount(server)
            .await;
    }

    #[test]
    fn metadata_is_static() {
        let provider = PhindProvider::new("Phind-70B").unwrap();
        assert_eq!(provider.provider(), "phind");
        assert_eq!(provider.model_id(), "Phind-70B");
        assert_eq!(provider.client().api_url(), phind_config::DEFAULT_API_URL);

        let caps = provider.capabilities();
        assert_eq!(caps.specification_version, "v1");
        assert_eq!(caps.default_object_generation_mode, ObjectGenerationMode::Json);
        assert!(!caps.supports_image_urls);
        assert!(!caps.supports_structured_outputs);
    }

    #[test]
    fn from_config_uses_provider_section() {
        let mut config = PhindConfig::default();
        config.provider.api_url = "http://localhost:9999/agent/".into();
        config.provider.default_model = "Phind-405B".into();

        let provider = PhindProvider::from_config(&config).unwrap();
        assert_eq!(provider.model_id(), "Phind-405B");
        assert_eq!(provider.client().api_url(), "http://localhost:9999/agent/");
    }

    #[test]
    fn each_configured_setting_warns() {
        let settings = CallSettings {
            temperature: Some(0.2),
            stop_sequences: Some(vec!["END".into()]),
            ..Default::default()
        };
        let warnings = unsupported_settings(&settings);
        let names: Vec<&str> = warnings
            .iter()
            .map(|w| match w {
                CallWarning::UnsupportedSetting { setting, .. } => setting.as_str(),
                CallWarning::Other { message } => message.as_str(),
            })
            .collect();
        assert_eq!(names, vec!["temperature", "stop_sequences"]);
        assert!(unsupported_settings(&CallSettings::default()).is_empty());
    }

    #[tokio::test]
    async fn generate_returns_text_and_metadata() {
        let server = MockServer::start().await;
        mount_ok(&server).await;
        let provider = provider_for(&server).await;

        let request = GenerateRequest::new("What is the capital of France?");
        let response = provider.generate(request).await.unwrap();

        assert_eq!(response.text, "Paris is the capital.\nDone");
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.usage, TokenUsage::unknown());
        assert!(response.warnings.is_empty());
        assert_eq!(
            response.raw_call.raw_prompt,
            Prompt::from("What is the capital of France?")
        );
        assert!(response.raw_call.raw_settings.is_empty());
        assert_eq!(
            response.raw_response.headers.get("x-request-id").map(String::as_str),
            Some("req-1")
        );
    }

    #[tokio::test]
    async fn generate_sends_last_user_message_as_input() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "user_input": "And Italy?",
                "requested_model": "Phind-70B"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
            .expect(1)
            .mount(&server)
            .await;
        let provider = provider_for(&server).await;

        let prompt = Prompt::Messages(vec![
            ConversationTurn::text("user", "Capital of France?"),
            ConversationTurn::text("assistant", "Paris"),
            ConversationTurn::text("user", "And Italy?"),
        ]);
        provider.generate(GenerateRequest::new(prompt)).await.unwrap();
    }

    #[tokio::test]
    async fn generate_reports_unsupported_settings() {
        let server = MockServer::start().await;
        mount_ok(&server).await;
        let provider = provider_for(&server).await;

        let request = GenerateRequest::new("hi").with_settings(CallSettings {
            max_tokens: Some(64),
            ..Default::default()
        });
        let response = provider.generate(request).await.unwrap();
        assert_eq!(response.warnings.len(), 1);
        assert!(matches!(
            &response.warnings[0],
            CallWarning::UnsupportedSetting { setting, .. } if setting == "max_tokens"
        ));
    }

    #[tokio::test]
    async fn generate_surfaces_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let provider = provider_for(&server).await;

        let err = provider.generate(GenerateRequest::new("hi")).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn stream_yields_deltas_then_one_finish() {
        let server = MockServer::start().await;
        mount_ok(&server).await;
        let provider = provider_for(&server).await;

        let response = provider.stream(GenerateRequest::new("hi")).await.unwrap();
        assert_eq!(
            response.raw_response.headers.get("x-request-id").map(String::as_str),
            Some("req-1")
        );
        let parts: Vec<StreamPart> = response.stream.map(|p| p.unwrap()).collect().await;

        let (last, deltas) = parts.split_last().unwrap();
        assert_eq!(
            *last,
            StreamPart::Finish {
                finish_reason: FinishReason::Stop,
                usage: TokenUsage::unknown(),
            }
        );
        assert!(deltas.iter().all(|p| p.as_text_delta().is_some()));
        let text: String = deltas.iter().filter_map(StreamPart::as_text_delta).collect();
        assert_eq!(text, "Paris is the capital.\nDone");
    }

    #[tokio::test]
    async fn stream_of_empty_body_is_just_finish() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("data: [DONE]\n"))
            .mount(&server)
            .await;
        let provider = provider_for(&server).await;

        let response = provider.stream(GenerateRequest::new("hi")).await.unwrap();
        let parts: Vec<StreamPart> = response.stream.map(|p| p.unwrap()).collect().await;
        assert_eq!(parts.len(), 1);
        assert!(matches!(parts[0], StreamPart::Finish { .. }));
    }

    #[tokio::test]
    async fn stream_fails_before_returning_on_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let provider = provider_for(&server).await;

        let err = provider.stream(GenerateRequest::new("hi")).await.unwrap_err();
        assert!(matches!(err, PhindError::Transport { status: 404, .. }));
    }
}
