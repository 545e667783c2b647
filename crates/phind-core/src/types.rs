// SPDX-FileCopyrightText: 2026 Phind Adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider-agnostic request, response, and stream types.

use std::collections::BTreeMap;
use std::pin::Pin;

use futures_core::Stream;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::PhindError;

// --- Prompt types ---

/// A caller-supplied prompt: either free text or a role-tagged conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prompt {
    /// A single free-text prompt, sent as one `user` turn.
    Text(String),
    /// An ordered conversation. Order determines the most recent user turn.
    Messages(Vec<ConversationTurn>),
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<ConversationTurn>> for Prompt {
    fn from(turns: Vec<ConversationTurn>) -> Self {
        Self::Messages(turns)
    }
}

/// One turn of a conversation. `role` is never validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: String,
    pub content: TurnContent,
}

impl ConversationTurn {
    /// Creates a turn with plain text content.
    pub fn text(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: TurnContent::Text(content.into()),
        }
    }

    /// Creates a turn whose content is a list of fragments.
    pub fn fragments(role: impl Into<String>, fragments: Vec<Fragment>) -> Self {
        Self {
            role: role.into(),
            content: TurnContent::Fragments(fragments),
        }
    }
}

/// Content of a conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Fragments(Vec<Fragment>),
    /// Any other JSON value; coerced to its string form on normalization.
    Value(serde_json::Value),
}

/// One fragment of a multi-part turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fragment {
    /// A bare string fragment.
    Text(String),
    /// An object exposing a `text` field (e.g. `{"type": "text", "text": "..."}`).
    NamedText {
        #[serde(default)]
        text: String,
    },
    /// Any other shape. Contributes no text.
    Other(serde_json::Value),
}

impl Fragment {
    /// Returns the text this fragment contributes to a normalized turn.
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) | Self::NamedText { text } => text,
            Self::Other(_) => "",
        }
    }
}

// --- Request types ---

/// Optional sampling settings a caller may pass with a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

impl CallSettings {
    /// Names of the settings that carry a value, in declaration order.
    pub fn configured(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.max_tokens.is_some() {
            names.push("max_tokens");
        }
        if self.temperature.is_some() {
            names.push("temperature");
        }
        if self.top_p.is_some() {
            names.push("top_p");
        }
        if self.stop_sequences.is_some() {
            names.push("stop_sequences");
        }
        names
    }
}

/// A request to generate text from a prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub prompt: Prompt,
    pub settings: CallSettings,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<Prompt>) -> Self {
        Self {
            prompt: prompt.into(),
            settings: CallSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: CallSettings) -> Self {
        self.settings = settings;
        self
    }
}

// --- Response types ---

/// Why generation finished.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
    Error,
    Other,
    Unknown,
}

/// Token usage. `None` means the count was not measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
}

impl TokenUsage {
    /// Usage for providers that do not report token counts.
    pub const fn unknown() -> Self {
        Self {
            prompt_tokens: None,
            completion_tokens: None,
        }
    }
}

/// A non-fatal note about how a request was handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CallWarning {
    /// The caller set a setting this provider ignores.
    UnsupportedSetting {
        setting: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
    Other { message: String },
}

/// What was sent to the provider, echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawCall {
    pub raw_prompt: Prompt,
    pub raw_settings: serde_json::Map<String, serde_json::Value>,
}

/// Transport metadata of the successful response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawResponse {
    pub headers: BTreeMap<String, String>,
}

/// Result of a single-shot generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateResponse {
    pub text: String,
    pub finish_reason: FinishReason,
    pub usage: TokenUsage,
    pub warnings: Vec<CallWarning>,
    pub raw_call: RawCall,
    pub raw_response: RawResponse,
}

/// One part of a streaming generation.
///
/// A well-formed stream yields zero or more `TextDelta` parts followed by
/// exactly one `Finish`.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamPart {
    TextDelta(String),
    Finish {
        finish_reason: FinishReason,
        usage: TokenUsage,
    },
}

impl StreamPart {
    /// Returns the text of a `TextDelta` part.
    pub fn as_text_delta(&self) -> Option<&str> {
        match self {
            Self::TextDelta(text) => Some(text),
            Self::Finish { .. } => None,
        }
    }
}

/// Boxed stream of [`StreamPart`]s.
pub type PartStream = Pin<Box<dyn Stream<Item = Result<StreamPart, PhindError>> + Send>>;

/// Result of a streaming generation.
pub struct StreamResponse {
    pub stream: PartStream,
    pub warnings: Vec<CallWarning>,
    pub raw_call: RawCall,
    pub raw_response: RawResponse,
}

impl std::fmt::Debug for StreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamResponse")
            .field("warnings", &self.warnings)
            .field("raw_call", &self.raw_call)
            .field("raw_response", &self.raw_response)
            .finish_non_exhaustive()
    }
}

// --- Capability descriptor ---

/// How structured output is produced when a caller asks for it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ObjectGenerationMode {
    Json,
    Tool,
}

/// Static capabilities advertised by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelCapabilities {
    pub specification_version: &'static str,
    pub default_object_generation_mode: ObjectGenerationMode,
    pub supports_image_urls: bool,
    pub supports_structured_outputs: bool,
}
