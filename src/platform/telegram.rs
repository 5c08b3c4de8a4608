use anyhow::Result;
use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode as TelegramParseMode, Recipient};
use tracing::{debug, info};

use super::BotClient;
use crate::config::{Config, Destination, MediaKind, ParseMode};

/// Telegram Bot API client backed by teloxide.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(config: &Config) -> Self {
        let mut bot = Bot::new(&config.token);
        if let Some(url) = &config.api_url {
            info!("Using Bot API server at {}", url);
            bot = bot.set_api_url(url.clone());
        }
        Self { bot }
    }
}

fn recipient(to: &Destination) -> Recipient {
    match to {
        Destination::Id(id) => Recipient::Id(ChatId(*id)),
        Destination::Username(name) => Recipient::ChannelUsername(name.clone()),
    }
}

#[allow(deprecated)]
fn telegram_parse_mode(mode: ParseMode) -> TelegramParseMode {
    match mode {
        ParseMode::Html => TelegramParseMode::Html,
        ParseMode::Markdown => TelegramParseMode::Markdown,
    }
}

/// Wrap raw input as an upload. Telegram wants a file name on multipart
/// parts, so use the kind's name.
fn upload(kind: MediaKind, data: Vec<u8>) -> InputFile {
    debug!("Uploading {} bytes as {}", data.len(), kind);
    InputFile::memory(data).file_name(kind.to_string())
}

#[async_trait]
impl BotClient for TelegramClient {
    async fn send_text(
        &self,
        to: &Destination,
        text: String,
        parse_mode: Option<ParseMode>,
    ) -> Result<()> {
        let mut request = self.bot.send_message(recipient(to), text);
        if let Some(mode) = parse_mode {
            request = request.parse_mode(telegram_parse_mode(mode));
        }
        request.await?;
        Ok(())
    }

    async fn send_photo(&self, to: &Destination, data: Vec<u8>) -> Result<()> {
        self.bot
            .send_photo(recipient(to), upload(MediaKind::Photo, data))
            .await?;
        Ok(())
    }

    async fn send_audio(&self, to: &Destination, data: Vec<u8>) -> Result<()> {
        self.bot
            .send_audio(recipient(to), upload(MediaKind::Audio, data))
            .await?;
        Ok(())
    }

    async fn send_document(&self, to: &Destination, data: Vec<u8>) -> Result<()> {
        self.bot
            .send_document(recipient(to), upload(MediaKind::Document, data))
            .await?;
        Ok(())
    }

    async fn send_video(&self, to: &Destination, data: Vec<u8>) -> Result<()> {
        self.bot
            .send_video(recipient(to), upload(MediaKind::Video, data))
            .await?;
        Ok(())
    }

    async fn send_voice(&self, to: &Destination, data: Vec<u8>) -> Result<()> {
        self.bot
            .send_voice(recipient(to), upload(MediaKind::Voice, data))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_destination_maps_to_chat_id() {
        assert_eq!(
            recipient(&Destination::Id(-1001234)),
            Recipient::Id(ChatId(-1001234))
        );
    }

    #[test]
    fn test_username_destination_maps_to_channel() {
        assert_eq!(
            recipient(&Destination::Username("@news".into())),
            Recipient::ChannelUsername("@news".into())
        );
    }

    #[test]
    fn test_html_parse_mode() {
        assert_eq!(telegram_parse_mode(ParseMode::Html), TelegramParseMode::Html);
    }
}
