use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::Handle;

use super::command::is_exit;
use super::dispatch::Dispatcher;
use super::editor::{ChatHelper, LineReader};
use super::render::spawn_event_loop;
use super::typing::TypingNotifier;
use super::ui;
use crate::output::{Output, TerminalSink};
use crate::platform::Platform;
use crate::state::SessionState;

/// Configuration for a chat session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How many messages `/join` shows.
    pub history_limit: u8,
    /// Where input history is kept between runs.
    pub history_path: Option<PathBuf>,
}

/// An interactive chat session.
///
/// Reads lines in the foreground and dispatches them one at a time, while
/// inbound events render in the background.
pub struct ChatSession {
    config: SessionConfig,
    client: Arc<dyn Platform>,
    state: Arc<SessionState>,
}

impl ChatSession {
    pub fn new(config: SessionConfig, client: Arc<dyn Platform>) -> Self {
        Self {
            config,
            client,
            state: Arc::new(SessionState::new()),
        }
    }

    pub async fn run(self) -> Result<()> {
        let typing = TypingNotifier::new(
            Arc::clone(&self.client),
            Arc::clone(&self.state),
            Handle::current(),
        );
        let helper = ChatHelper::new(Arc::clone(&self.client), Arc::clone(&self.state), typing);
        let (mut reader, printer) = LineReader::spawn(helper, self.config.history_path).await?;

        let prompting = Arc::new(AtomicBool::new(false));
        let output = Arc::new(Output::new(TerminalSink::new(
            printer,
            Arc::clone(&prompting),
        )));

        let events = spawn_event_loop(
            self.client.events(Arc::clone(&self.state)),
            Arc::clone(&self.state),
            Arc::clone(&output),
        );
        let dispatcher = Dispatcher::new(
            Arc::clone(&self.client),
            Arc::clone(&self.state),
            Arc::clone(&output),
            self.config.history_limit,
        );

        output.lines([ui::header(), String::new()]).await;
        output.line(ui::welcome()).await;

        let result = loop {
            let prompt = ui::prompt(&self.state.read());

            prompting.store(true, Ordering::Release);
            let line = reader.read_line(prompt).await;
            prompting.store(false, Ordering::Release);

            match line {
                Ok(Some(line)) if is_exit(&line) => break Ok(()),
                Ok(Some(line)) => dispatcher.dispatch(&line).await,
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        events.abort();
        reader.close().await;
        output.line(ui::goodbye()).await;
        result
    }
}
