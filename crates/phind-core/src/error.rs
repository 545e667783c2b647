// SPDX-FileCopyrightText: 2026 Phind Adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error type shared by the provider contract and its implementations.

use thiserror::Error;

/// The error type returned by every [`ProviderAdapter`](crate::ProviderAdapter) operation.
///
/// Malformed event lines in a response stream are not errors and never reach
/// this type; they are skipped by the decoder.
#[derive(Debug, Error)]
pub enum PhindError {
    /// Invalid configuration reaching the adapter (bad URL, bad header value).
    #[error("configuration error: {0}")]
    Config(String),

    /// The remote endpoint answered with a non-success status.
    ///
    /// Fatal for the whole request: no partial text is returned.
    #[error("failed to generate text (phind): {status} {status_text}")]
    Transport { status: u16, status_text: String },

    /// Network or body-read failure, or HTTP client construction failure.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PhindError {
    /// Returns the HTTP status for [`PhindError::Transport`] errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}
