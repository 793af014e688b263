use clap::Parser;
use tracing_subscriber::EnvFilter;

use cordline::cli::Args;
use cordline::cli::commands::chat::{self, ChatOptions};
use cordline::config::MissingToken;
use cordline::ui::Style;

const LOG_ENV: &str = "CORDLINE_LOG";

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = chat::run_chat(ChatOptions::from(args)).await {
        eprintln!("{} {err:#}", Style::error("Error:"));
        std::process::exit(exit_code(&err));
    }
}

fn exit_code(err: &anyhow::Error) -> exitcode::ExitCode {
    if err.is::<MissingToken>() {
        exitcode::USAGE
    } else if err.downcast_ref::<toml::de::Error>().is_some() {
        exitcode::CONFIG
    } else {
        exitcode::UNAVAILABLE
    }
}
