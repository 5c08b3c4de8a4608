pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::{Destination, ParseMode};

/// Outbound side of a bot platform: one operation per message kind.
///
/// Implementations own authentication and transport; callers only see
/// success or an error for a single attempt.
#[async_trait]
pub trait BotClient: Send + Sync {
    async fn send_text(
        &self,
        to: &Destination,
        text: String,
        parse_mode: Option<ParseMode>,
    ) -> Result<()>;

    async fn send_photo(&self, to: &Destination, data: Vec<u8>) -> Result<()>;

    async fn send_audio(&self, to: &Destination, data: Vec<u8>) -> Result<()>;

    async fn send_document(&self, to: &Destination, data: Vec<u8>) -> Result<()>;

    async fn send_video(&self, to: &Destination, data: Vec<u8>) -> Result<()>;

    async fn send_voice(&self, to: &Destination, data: Vec<u8>) -> Result<()>;
}

/// In-memory client that records every call and fails on request.
#[cfg(test)]
pub mod fake {
    use std::sync::{Arc, Mutex};

    use anyhow::{bail, Result};
    use async_trait::async_trait;

    use super::BotClient;
    use crate::config::{Destination, MediaKind, ParseMode};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Text {
            to: Destination,
            text: String,
            parse_mode: Option<ParseMode>,
        },
        Media {
            kind: MediaKind,
            to: Destination,
            data: Vec<u8>,
        },
    }

    #[derive(Default)]
    struct State {
        calls: Vec<Call>,
        failures_left: usize,
        always_fail: bool,
    }

    /// Clones share state, so a test can keep one handle and give another away.
    #[derive(Clone, Default)]
    pub struct FakeClient {
        state: Arc<Mutex<State>>,
    }

    impl FakeClient {
        /// Fails the first `n` calls, then succeeds.
        pub fn failing(n: usize) -> Self {
            let client = Self::default();
            client.fail_next(n);
            client
        }

        pub fn always_failing() -> Self {
            let client = Self::default();
            client.state.lock().unwrap().always_fail = true;
            client
        }

        /// Fail the next `n` calls from now on.
        pub fn fail_next(&self, n: usize) {
            self.state.lock().unwrap().failures_left = n;
        }

        pub fn calls(&self) -> Vec<Call> {
            self.state.lock().unwrap().calls.clone()
        }

        fn record(&self, call: Call) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(call);
            if state.always_fail {
                bail!("simulated outage");
            }
            if state.failures_left > 0 {
                state.failures_left -= 1;
                bail!("simulated failure");
            }
            Ok(())
        }

        fn media(&self, kind: MediaKind, to: &Destination, data: Vec<u8>) -> Result<()> {
            self.record(Call::Media {
                kind,
                to: to.clone(),
                data,
            })
        }
    }

    #[async_trait]
    impl BotClient for FakeClient {
        async fn send_text(
            &self,
            to: &Destination,
            text: String,
            parse_mode: Option<ParseMode>,
        ) -> Result<()> {
            self.record(Call::Text {
                to: to.clone(),
                text,
                parse_mode,
            })
        }

        async fn send_photo(&self, to: &Destination, data: Vec<u8>) -> Result<()> {
            self.media(MediaKind::Photo, to, data)
        }

        async fn send_audio(&self, to: &Destination, data: Vec<u8>) -> Result<()> {
            self.media(MediaKind::Audio, to, data)
        }

        async fn send_document(&self, to: &Destination, data: Vec<u8>) -> Result<()> {
            self.media(MediaKind::Document, to, data)
        }

        async fn send_video(&self, to: &Destination, data: Vec<u8>) -> Result<()> {
            self.media(MediaKind::Video, to, data)
        }

        async fn send_voice(&self, to: &Destination, data: Vec<u8>) -> Result<()> {
            self.media(MediaKind::Voice, to, data)
        }
    }
}
