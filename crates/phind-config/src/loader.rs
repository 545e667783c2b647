// SPDX-FileCopyrightText: 2026 Phind Adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./phind.toml` > `~/.config/phind/phind.toml` > `/etc/phind/phind.toml`
//! with environment variable overrides via `PHIND_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PhindConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/phind/phind.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "phind.toml";

/// Path of the per-user config file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("phind").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/phind/phind.toml` (system-wide)
/// 3. `~/.config/phind/phind.toml` (user XDG config)
/// 4. `./phind.toml` (local directory)
/// 5. `PHIND_*` environment variables
pub fn load_config() -> Result<PhindConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<PhindConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PhindConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PhindConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PhindConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for hierarchy loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PhindConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `PHIND_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that
/// `PHIND_PROVIDER_DEFAULT_MODEL` maps to `provider.default_model`.
fn env_provider() -> Env {
    Env::prefixed("PHIND_").map(|key| {
        key.as_str()
            .replacen("provider_", "provider.", 1)
            .replacen("logging_", "logging.", 1)
            .into()
    })
}
