use std::io::BufRead;

use anyhow::{Context, Result};
use futures::StreamExt;
use tracing::debug;

use crate::config::Config;
use crate::platform::BotClient;
use crate::reader::InputReader;
use crate::sender::{Payload, Sender};

/// Telegram's limit for a single text message. Measured in bytes here, which
/// is never less than the UTF-16 length Telegram counts.
pub const MAX_MESSAGE_LEN: usize = 4096;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelaySummary {
    pub sent: usize,
    pub skipped: usize,
}

/// Forward the whole input to the configured destination.
///
/// Media kinds send everything as one upload. Text is sent as a single
/// message, or one message per line with `split_newlines`. The first message
/// that cannot be delivered ends the run.
pub async fn relay<R, C>(
    reader: InputReader<R>,
    sender: &Sender<C>,
    config: &Config,
) -> Result<RelaySummary>
where
    R: BufRead + Send + 'static,
    C: BotClient,
{
    let mut summary = RelaySummary::default();

    if let Some(kind) = config.message_kind.media() {
        let data = reader
            .read_all()
            .await
            .context("Failed to read binary input")?;
        debug!("Read {} bytes of {} from input", data.len(), kind);
        sender.send(&Payload::Media { kind, data }).await?;
        summary.sent += 1;
        return Ok(summary);
    }

    if !config.split_newlines {
        let data = reader.read_all().await.context("Failed to read input")?;
        let text = String::from_utf8(data).context("Input is not valid UTF-8")?;
        for chunk in chunks(text, config) {
            deliver(sender, chunk, config.skip_blank, &mut summary).await?;
        }
        return Ok(summary);
    }

    let lines = reader.lines();
    futures::pin_mut!(lines);
    while let Some(line) = lines.next().await {
        let line = line.context("Failed to read input line")?;
        for chunk in chunks(line, config) {
            deliver(sender, chunk, config.skip_blank, &mut summary).await?;
        }
    }

    Ok(summary)
}

async fn deliver<C: BotClient>(
    sender: &Sender<C>,
    text: String,
    skip_blank: bool,
    summary: &mut RelaySummary,
) -> Result<()> {
    if skip_blank && text.trim().is_empty() {
        debug!("Skipping blank message");
        summary.skipped += 1;
        return Ok(());
    }
    sender.send(&Payload::Text(text)).await?;
    summary.sent += 1;
    Ok(())
}

/// Plain text over the length limit goes out in several messages. Text with a
/// parse mode is never cut, since a cut can land inside markup and make
/// Telegram reject every later part.
fn chunks(text: String, config: &Config) -> Vec<String> {
    if config.parse_mode.is_some() || text.len() <= MAX_MESSAGE_LEN {
        return vec![text];
    }
    split_message(&text, MAX_MESSAGE_LEN)
}

/// Split text that is too long for one message, preferring line then word
/// boundaries. Only used for plain text, see `chunks`.
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max_len).min(text.len());
        // Walk back to a valid UTF-8 char boundary so slicing doesn't panic
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }
        let actual_end = if end < text.len() {
            text[start..end]
                .rfind('\n')
                .or_else(|| text[start..end].rfind(' '))
                .map(|pos| start + pos + 1)
                .unwrap_or(end)
        } else {
            end
        };

        chunks.push(text[start..actual_end].to_string());
        start = actual_end;
    }

    chunks
}
