use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "cordline")]
#[command(about = "Terminal chat client for Discord-style guilds and channels")]
#[command(version)]
pub struct Args {
    /// Authentication token
    #[arg(short = 't', long, env = "CORDLINE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// REST API base URL
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// Messages shown when joining a channel (1-100)
    #[arg(long, value_name = "N")]
    pub history_limit: Option<u16>,

    /// Seconds between checks for new messages
    #[arg(long, value_name = "SECS")]
    pub poll_interval: Option<u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_all_options() {
        let args = Args::try_parse_from([
            "cordline",
            "-t",
            "secret",
            "--api-base",
            "http://localhost:1",
            "--history-limit",
            "10",
            "--poll-interval",
            "5",
        ])
        .unwrap();

        assert_eq!(args.token.as_deref(), Some("secret"));
        assert_eq!(args.api_base.as_deref(), Some("http://localhost:1"));
        assert_eq!(args.history_limit, Some(10));
        assert_eq!(args.poll_interval, Some(5));
    }

    #[test]
    fn test_args_reject_negative_history_limit() {
        assert!(Args::try_parse_from(["cordline", "--history-limit", "-1"]).is_err());
    }
}
