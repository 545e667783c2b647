// SPDX-FileCopyrightText: 2026 Phind Adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phind - send a prompt to the Phind agent endpoint from the command line.
//!
//! This is the binary entry point.

mod run;

use std::path::PathBuf;

use clap::Parser;
use phind_config::PhindConfig;
use phind_provider::PhindProvider;

use crate::run::{DeliveryMode, PromptSource};

/// Phind - send a prompt to the Phind agent endpoint.
#[derive(Parser, Debug)]
#[command(name = "phind", version, about, long_about = None)]
struct Cli {
    /// Prompt text. Words are joined with spaces.
    #[arg(required_unless_present = "messages")]
    prompt: Vec<String>,

    /// Read a JSON conversation (`[{"role": ..., "content": ...}]`) instead of a prompt.
    #[arg(long, value_name = "FILE", conflicts_with = "prompt")]
    messages: Option<PathBuf>,

    /// Model to request. Overrides `provider.default_model`.
    #[arg(long, short)]
    model: Option<String>,

    /// How the response is delivered.
    #[arg(long, value_enum, default_value_t = DeliveryMode::Buffered)]
    mode: DeliveryMode,

    /// Load configuration from this file instead of the standard locations.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    fn prompt_source(&self) -> PromptSource {
        match &self.messages {
            Some(path) => PromptSource::File(path.clone()),
            None => PromptSource::Text(self.prompt.join(" ")),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => phind_config::load_and_validate_path(path),
        None => phind_config::load_and_validate(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            phind_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);
    apply_overrides(&mut config, &cli);

    if let Err(e) = execute(&config, &cli).await {
        eprintln!("phind: {e}");
        std::process::exit(1);
    }
}

async fn execute(config: &PhindConfig, cli: &Cli) -> Result<(), phind_core::PhindError> {
    let provider = PhindProvider::from_config(config)?;
    let prompt = cli.prompt_source().load().await?;
    let mut stdout = tokio::io::stdout();
    run::run(&provider, prompt, cli.mode, &mut stdout).await
}

fn apply_overrides(config: &mut PhindConfig, cli: &Cli) {
    if let Some(model) = &cli.model {
        config.provider.default_model = model.clone();
    }
}

/// Installs the global tracing subscriber. Logs go to stderr.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("phind={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
