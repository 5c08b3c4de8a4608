use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Config, Destination, MediaKind, ParseMode, RetryPolicy};
use crate::platform::BotClient;

/// Longest text rendered verbatim in logs and errors.
const SUMMARY_LEN: usize = 120;

/// One message worth of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Media { kind: MediaKind, data: Vec<u8> },
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Text(text) if text.chars().count() <= SUMMARY_LEN => write!(f, "{:?}", text),
            Payload::Text(text) => {
                let head: String = text.chars().take(SUMMARY_LEN).collect();
                write!(f, "{:?}... ({} chars)", head, text.chars().count())
            }
            Payload::Media { kind, data } => write!(f, "<{} bytes of {}>", data.len(), kind),
        }
    }
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("Message {payload} was not sent after {retries} retries")]
    RetriesExhausted { payload: String, retries: u32 },
}

/// Delivers payloads to a single destination, retrying failed attempts.
pub struct Sender<C> {
    client: C,
    destination: Destination,
    parse_mode: Option<ParseMode>,
    retry: RetryPolicy,
    retry_delay: Duration,
}

impl<C: BotClient> Sender<C> {
    pub fn new(client: C, config: &Config) -> Self {
        Self {
            client,
            destination: config.destination.clone(),
            parse_mode: config.parse_mode,
            retry: config.retry,
            retry_delay: config.retry_delay,
        }
    }

    /// Send one payload.
    ///
    /// Every failed attempt is logged. With `RetryPolicy::Unlimited` the
    /// payload is attempted until it goes through; with `Bounded(n)` at most
    /// `n` attempts are made before `RetriesExhausted` is returned.
    pub async fn send(&self, payload: &Payload) -> Result<(), SendError> {
        let mut budget = self.retry;
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            let err = match self.attempt(payload).await {
                Ok(()) => {
                    debug!(
                        "Sent {} to {} (attempt {})",
                        payload, self.destination, attempt
                    );
                    return Ok(());
                }
                Err(e) => e,
            };

            warn!(
                "Attempt {} to send {} to {} failed: {:#}",
                attempt, payload, self.destination, err
            );

            match &mut budget {
                RetryPolicy::Unlimited => {}
                RetryPolicy::Bounded(left) => match NonZeroU32::new(left.get() - 1) {
                    Some(remaining) => *left = remaining,
                    None => {
                        return Err(SendError::RetriesExhausted {
                            payload: payload.to_string(),
                            retries: self.retry.retries(),
                        })
                    }
                },
            }

            if !self.retry_delay.is_zero() {
                tokio::time::sleep(self.retry_delay).await;
            }
        }
    }

    async fn attempt(&self, payload: &Payload) -> anyhow::Result<()> {
        let to = &self.destination;
        match payload {
            Payload::Text(text) => {
                self.client
                    .send_text(to, text.clone(), self.parse_mode)
                    .await
            }
            Payload::Media { kind, data } => {
                let data = data.clone();
                match kind {
                    MediaKind::Photo => self.client.send_photo(to, data).await,
                    MediaKind::Audio => self.client.send_audio(to, data).await,
                    MediaKind::Document => self.client.send_document(to, data).await,
                    MediaKind::Video => self.client.send_video(to, data).await,
                    MediaKind::Voice => self.client.send_voice(to, data).await,
                }
            }
        }
    }
}
