use anyhow::{Context, Result};
use std::sync::Arc;

use crate::chat::{ChatSession, SessionConfig};
use crate::cli::Args;
use crate::config::{ConfigManager, ResolveOptions, ResolvedConfig, resolve_config};
use crate::paths;
use crate::platform::{HttpPlatform, HttpPlatformConfig};
use crate::ui::Spinner;

pub struct ChatOptions {
    pub token: Option<String>,
    pub api_base: Option<String>,
    pub history_limit: Option<u16>,
    pub poll_interval: Option<u64>,
}

impl From<Args> for ChatOptions {
    fn from(args: Args) -> Self {
        Self {
            token: args.token,
            api_base: args.api_base,
            history_limit: args.history_limit,
            poll_interval: args.poll_interval,
        }
    }
}

pub async fn run_chat(options: ChatOptions) -> Result<()> {
    let config = load_config(options)?;
    tracing::debug!(
        api_base = %config.api_base,
        history_limit = config.history_limit,
        "configuration resolved"
    );

    let history_path = paths::history_path()
        .inspect_err(|e| tracing::debug!(error = %e, "input history disabled"))
        .ok();

    let platform = {
        let spinner = Spinner::new("Connecting...");
        let platform = HttpPlatform::connect(HttpPlatformConfig {
            api_base: config.api_base,
            token: config.token,
            poll_interval: config.poll_interval,
        })
        .await
        .context("failed to connect")?;
        spinner.stop();
        platform
    };

    let session = ChatSession::new(
        SessionConfig {
            history_limit: config.history_limit,
            history_path,
        },
        Arc::new(platform),
    );
    session.run().await
}

fn load_config(options: ChatOptions) -> Result<ResolvedConfig> {
    let manager = ConfigManager::new()?;
    let file_config = manager.load()?;

    let options = ResolveOptions {
        token: options.token,
        api_base: options.api_base,
        history_limit: options.history_limit,
        poll_interval_secs: options.poll_interval,
    };
    resolve_config(&options, &file_config)
}
