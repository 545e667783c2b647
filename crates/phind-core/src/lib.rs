// SPDX-FileCopyrightText: 2026 Phind Adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Phind adapter.
//!
//! This crate provides the provider-agnostic contract: the [`ProviderAdapter`]
//! trait, the prompt and response types it speaks, and the shared
//! [`PhindError`] type. Provider implementations depend on this crate only.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PhindError;
pub use traits::ProviderAdapter;
pub use types::{
    CallSettings, CallWarning, ConversationTurn, FinishReason, Fragment, GenerateRequest,
    GenerateResponse, ModelCapabilities, ObjectGenerationMode, PartStream, Prompt, RawCall,
    RawResponse, StreamPart, StreamResponse, TokenUsage, TurnContent,
};
