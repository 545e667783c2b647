// SPDX-FileCopyrightText: 2026 Phind Adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Phind adapter.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use phind_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Model: {}", config.provider.default_model);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{PhindConfig, DEFAULT_API_URL, DEFAULT_MODEL};

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<PhindConfig, Vec<ConfigError>> {
    validated(loader::load_config())
}

/// Load configuration from one file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<PhindConfig, Vec<ConfigError>> {
    validated(loader::load_config_from_path(path))
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<PhindConfig, Vec<ConfigError>> {
    validated(loader::load_config_from_str(toml_content))
}

fn validated(
    loaded: Result<PhindConfig, figment::Error>,
) -> Result<PhindConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}
