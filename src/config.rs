use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::num::NonZeroU32;
use std::path::Path;
use std::time::Duration;

use crate::cli::Args;

/// Kind of message every payload is sent as.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Photo,
    Audio,
    Document,
    Video,
    Voice,
}

impl MessageKind {
    /// `None` for text, which is read and sent as UTF-8 instead of raw bytes.
    pub fn media(self) -> Option<MediaKind> {
        match self {
            MessageKind::Text => None,
            MessageKind::Photo => Some(MediaKind::Photo),
            MessageKind::Audio => Some(MediaKind::Audio),
            MessageKind::Document => Some(MediaKind::Document),
            MessageKind::Video => Some(MediaKind::Video),
            MessageKind::Voice => Some(MediaKind::Voice),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Text => write!(f, "text"),
            MessageKind::Photo => write!(f, "photo"),
            MessageKind::Audio => write!(f, "audio"),
            MessageKind::Document => write!(f, "document"),
            MessageKind::Video => write!(f, "video"),
            MessageKind::Voice => write!(f, "voice"),
        }
    }
}

/// Message kinds that carry a binary payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Audio,
    Document,
    Video,
    Voice,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Photo => write!(f, "photo"),
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Document => write!(f, "document"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Voice => write!(f, "voice"),
        }
    }
}

/// Markup dialect Telegram uses to render a text message.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    #[value(name = "HTML")]
    Html,
    #[serde(rename = "Markdown")]
    #[value(name = "Markdown")]
    Markdown,
}

/// How often a failed message is attempted.
///
/// A retry count of 0 on the command line means "never give up", so it maps
/// to `Unlimited` rather than to a budget of zero attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    Unlimited,
    Bounded(NonZeroU32),
}

impl RetryPolicy {
    pub fn from_retries(retries: u32) -> Self {
        NonZeroU32::new(retries).map_or(RetryPolicy::Unlimited, RetryPolicy::Bounded)
    }

    /// The count as it was configured (0 for unlimited).
    pub fn retries(&self) -> u32 {
        match self {
            RetryPolicy::Unlimited => 0,
            RetryPolicy::Bounded(n) => n.get(),
        }
    }
}

/// Chat a message is delivered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Numeric chat id; channels and supergroups are negative.
    Id(i64),
    /// Public `@username` of a channel.
    Username(String),
}

impl Destination {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            bail!("Chat ID or channel must not be empty");
        }
        if let Ok(id) = raw.parse::<i64>() {
            return Ok(Destination::Id(id));
        }
        if raw.starts_with('@') {
            Ok(Destination::Username(raw.to_string()))
        } else {
            Ok(Destination::Username(format!("@{}", raw)))
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Id(id) => write!(f, "{}", id),
            Destination::Username(name) => write!(f, "{}", name),
        }
    }
}

/// Optional TOML file holding defaults for the command line options.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub send: SendConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    #[serde(default)]
    pub api_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SendConfig {
    #[serde(default, rename = "type")]
    pub message_type: Option<MessageKind>,
    #[serde(default)]
    pub parse_mode: Option<ParseMode>,
    #[serde(default)]
    pub split_newlines: Option<bool>,
    #[serde(default)]
    pub retries: Option<u32>,
    #[serde(default)]
    pub retry_delay_ms: Option<u64>,
    #[serde(default)]
    pub skip_blank: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

fn default_retries() -> u32 {
    1
}

/// Immutable run configuration: command line merged over the config file.
#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub destination: Destination,
    pub message_kind: MessageKind,
    pub parse_mode: Option<ParseMode>,
    pub split_newlines: bool,
    pub retry: RetryPolicy,
    pub retry_delay: Duration,
    pub api_url: Option<reqwest::Url>,
    pub skip_blank: bool,
}

impl Config {
    /// Build the configuration from parsed arguments, reading `--config` if given.
    pub fn load(args: Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    pub fn merge(args: Args, file: FileConfig) -> Result<Self> {
        let send = file.send;

        let destination = Destination::parse(&args.channel)?;
        let retries = args
            .retries
            .or(send.retries)
            .unwrap_or_else(default_retries);
        let retry_delay = args.retry_delay.or(send.retry_delay_ms).unwrap_or(0);

        let api_url = match args.api_url.or(file.telegram.api_url) {
            Some(raw) => Some(
                reqwest::Url::parse(&raw)
                    .with_context(|| format!("Invalid Bot API URL: {}", raw))?,
            ),
            None => None,
        };

        Ok(Config {
            token: args.token,
            destination,
            message_kind: args.message_type.or(send.message_type).unwrap_or_default(),
            parse_mode: args.parse_mode.or(send.parse_mode),
            split_newlines: args.split_newlines || send.split_newlines.unwrap_or(false),
            retry: RetryPolicy::from_retries(retries),
            retry_delay: Duration::from_millis(retry_delay),
            api_url,
            skip_blank: args.skip_blank || send.skip_blank.unwrap_or(false),
        })
    }
}

// The token is a credential; keep it out of debug output.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("destination", &self.destination)
            .field("message_kind", &self.message_kind)
            .field("parse_mode", &self.parse_mode)
            .field("split_newlines", &self.split_newlines)
            .field("retry", &self.retry)
            .field("retry_delay", &self.retry_delay)
            .field("api_url", &self.api_url)
            .field("skip_blank", &self.skip_blank)
            .finish()
    }
}
