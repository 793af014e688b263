//! Renders inbound platform events for the channel being viewed.

use futures_util::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::ui;
use crate::output::Output;
use crate::platform::{Event, EventStream};
use crate::state::SessionState;

/// Writes the line for `event`, or nothing if it belongs to another channel
/// or has nothing to show.
pub async fn render_event(event: &Event, state: &SessionState, output: &Output) {
    if state.channel_id() != Some(event.channel_id()) {
        return;
    }

    let line = match event {
        Event::MessageCreate(message) => ui::message_line(message),
        Event::MessageUpdate(message) => ui::edited_line(message),
        Event::TypingStart(typing) => {
            let Some(member) = &typing.member else {
                return;
            };
            ui::typing_line(member.nick().unwrap_or(&member.user.username))
        }
    };
    output.line(line).await;
}

/// Drains `events`, handling each on its own task.
pub fn spawn_event_loop(
    mut events: EventStream,
    state: Arc<SessionState>,
    output: Arc<Output>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let state = Arc::clone(&state);
            let output = Arc::clone(&output);
            tokio::spawn(async move {
                render_event(&event, &state, &output).await;
            });
        }
        tracing::debug!("event stream ended");
    })
}
