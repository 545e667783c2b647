// SPDX-FileCopyrightText: 2026 Phind Adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::PhindConfig;

/// Log levels accepted by `logging.level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PhindConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let api_url = config.provider.api_url.trim();
    if api_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "provider.api_url must not be empty".to_string(),
        });
    } else if !(api_url.starts_with("https://") || api_url.starts_with("http://")) {
        errors.push(ConfigError::Validation {
            message: format!("provider.api_url `{api_url}` must start with http:// or https://"),
        });
    }

    if config.provider.default_model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "provider.default_model must not be empty".to_string(),
        });
    }

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
