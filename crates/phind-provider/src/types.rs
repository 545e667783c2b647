// SPDX-FileCopyrightText: 2026 Phind Adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phind agent API request types.

use serde::{Deserialize, Serialize};

/// Role whose most recent message becomes `user_input`.
pub const USER_ROLE: &str = "user";

/// A conversation turn flattened to plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMessage {
    pub role: String,
    pub content: String,
}

impl NormalizedMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Body of a POST to the agent endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestPayload {
    /// Always empty; the adapter sends no editor context.
    pub additional_extension_context: String,
    pub allow_magic_buttons: bool,
    pub is_vscode_extension: bool,
    pub message_history: Vec<NormalizedMessage>,
    pub requested_model: String,
    /// Content of the last `user` message, or empty if there is none.
    pub user_input: String,
}

impl RequestPayload {
    /// Builds the payload for a conversation, deriving `user_input`.
    pub fn new(messages: &[NormalizedMessage], model: &str) -> Self {
        let user_input = messages
            .iter()
            .rev()
            .find(|m| m.role == USER_ROLE)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        Self {
            additional_extension_context: String::new(),
            allow_magic_buttons: true,
            is_vscode_extension: true,
            message_history: messages.to_vec(),
            requested_model: model.to_string(),
            user_input,
        }
    }
}
