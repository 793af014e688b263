//! "User is typing" signalling.
//!
//! A leading-edge limiter: the first keystroke fires, then nothing fires
//! until the cool-down since the last fire has elapsed. Only the single
//! last-fired instant is remembered.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;

use crate::platform::Platform;
use crate::state::SessionState;

/// How long one typing signal lasts on the platform side.
pub const TYPING_COOLDOWN: Duration = Duration::from_secs(8);

#[derive(Debug, Clone)]
pub struct TypingThrottle {
    cooldown: Duration,
    last_sent: Option<Instant>,
}

impl TypingThrottle {
    pub const fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_sent: None,
        }
    }

    /// Returns `true` and records `now` if a signal should go out.
    pub fn try_fire(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_sent
            && now.saturating_duration_since(last) < self.cooldown
        {
            return false;
        }
        self.last_sent = Some(now);
        true
    }
}

impl Default for TypingThrottle {
    fn default() -> Self {
        Self::new(TYPING_COOLDOWN)
    }
}

/// Fires throttled typing signals for the current channel.
///
/// Called from the line editor thread on every keystroke, so sending is
/// handed off to the runtime and never waited on.
pub struct TypingNotifier {
    throttle: Mutex<TypingThrottle>,
    client: Arc<dyn Platform>,
    state: Arc<SessionState>,
    runtime: Handle,
}

impl TypingNotifier {
    pub fn new(client: Arc<dyn Platform>, state: Arc<SessionState>, runtime: Handle) -> Self {
        Self {
            throttle: Mutex::new(TypingThrottle::default()),
            client,
            state,
            runtime,
        }
    }

    /// Returns whether a signal was dispatched.
    pub fn keystroke(&self, now: Instant) -> bool {
        let Some(channel) = self.state.channel_id() else {
            return false;
        };

        let fire = self
            .throttle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_fire(now);
        if !fire {
            return false;
        }

        let client = Arc::clone(&self.client);
        self.runtime.spawn(async move {
            if let Err(e) = client.typing(channel).await {
                tracing::debug!(error = %e, %channel, "typing signal failed");
            }
        });
        true
    }
}
