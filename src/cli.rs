use std::path::PathBuf;

use clap::Parser;

use crate::config::{MessageKind, ParseMode};

/// Redirects stdin to a Telegram channel or chat.
#[derive(Parser, Debug, Clone)]
#[command(name = "botcat", version)]
#[command(about = "Redirects stdin to a Telegram channel or chat.")]
pub struct Args {
    /// API token of the Telegram bot.
    pub token: String,

    /// Chat ID or channel for broadcasts.
    #[arg(allow_negative_numbers = true)]
    pub channel: String,

    /// Type of message to send. (Defaults to text.)
    #[arg(long = "type", value_enum)]
    pub message_type: Option<MessageKind>,

    /// How the input should be parsed.
    #[arg(short = 'm', long, value_enum)]
    pub parse_mode: Option<ParseMode>,

    /// If specified, each input line will be sent as an individual message.
    #[arg(short, long)]
    pub split_newlines: bool,

    /// How many times a failed send should be retried. Specify 0 to retry
    /// indefinitely. (Defaults to 1.)
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Milliseconds to wait between two attempts of the same message.
    #[arg(long, value_name = "MS")]
    pub retry_delay: Option<u64>,

    /// Skip empty and whitespace-only text messages instead of sending them.
    #[arg(long)]
    pub skip_blank: bool,

    /// Alternative Bot API server, e.g. a self-hosted telegram-bot-api.
    #[arg(long, env = "BOTCAT_API_URL")]
    pub api_url: Option<String>,

    /// TOML file with defaults for the options above.
    #[arg(short, long, env = "BOTCAT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("botcat").chain(args.iter().copied()))
    }

    #[test]
    fn test_positionals_only() {
        let args = parse(&["123:abc", "@news"]).unwrap();
        assert_eq!(args.token, "123:abc");
        assert_eq!(args.channel, "@news");
        assert_eq!(args.message_type, None);
        assert_eq!(args.parse_mode, None);
        assert!(!args.split_newlines);
        assert_eq!(args.retries, None);
    }

    #[test]
    fn test_all_flags() {
        let args = parse(&[
            "tok", "-100123", "--type", "photo", "-m", "HTML", "-s", "-r", "0",
        ])
        .unwrap();
        assert_eq!(args.channel, "-100123");
        assert_eq!(args.message_type, Some(MessageKind::Photo));
        assert_eq!(args.parse_mode, Some(ParseMode::Html));
        assert!(args.split_newlines);
        assert_eq!(args.retries, Some(0));
    }

    #[test]
    fn test_markdown_value_name() {
        let args = parse(&["tok", "chan", "--parse-mode", "Markdown"]).unwrap();
        assert_eq!(args.parse_mode, Some(ParseMode::Markdown));
    }

    #[test]
    fn test_negative_retries_rejected() {
        let err = parse(&["tok", "chan", "--retries=-1"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(parse(&["tok", "chan", "--type", "sticker"]).is_err());
    }

    #[test]
    fn test_missing_channel_rejected() {
        let err = parse(&["tok"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
