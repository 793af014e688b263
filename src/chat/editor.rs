//! rustyline integration.
//!
//! The editor lives on its own thread because `readline` blocks. The
//! session sends it a prompt and awaits the completed line, so no new line
//! is read while a command is running.

use anyhow::{Context as _, Result, anyhow};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, EditMode, Editor, ExternalPrinter, Helper};
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, mpsc as std_mpsc};
use std::thread;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};

use super::command::{COMMAND_MARKER, COMMANDS};
use super::complete::{Suggestion, is_join_command, suggest, word_before_cursor};
use super::typing::TypingNotifier;
use crate::platform::Platform;
use crate::state::SessionState;
use crate::ui::Style;

const MAX_HISTORY_ENTRIES: usize = 1000;

/// Completion, hints and keystroke hooks for the chat prompt.
pub struct ChatHelper {
    client: Arc<dyn Platform>,
    state: Arc<SessionState>,
    typing: TypingNotifier,
    /// Line content at the previous hint call; redraws repeat it unchanged.
    last_line: Mutex<String>,
}

impl ChatHelper {
    pub fn new(
        client: Arc<dyn Platform>,
        state: Arc<SessionState>,
        typing: TypingNotifier,
    ) -> Self {
        Self {
            client,
            state,
            typing,
            last_line: Mutex::new(String::new()),
        }
    }

    /// Feeds the typing throttle when the line content changed. Returns
    /// whether a typing signal went out.
    fn on_edit(&self, line: &str, now: Instant) -> bool {
        {
            let mut last = self.last_line.lock().unwrap_or_else(PoisonError::into_inner);
            if *last == line {
                return false;
            }
            *last = line.to_string();
        }
        !line.is_empty() && self.typing.keystroke(now)
    }
}

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before = &line[..pos];
        let suggestions = suggest(before, self.client.cache(), self.state.guild_id());
        let (start, candidates) = completion_pairs(before, suggestions);
        Ok((start, candidates))
    }
}

/// Maps suggestions onto rustyline candidates and the byte offset they
/// replace from.
fn completion_pairs(before: &str, suggestions: Vec<Suggestion>) -> (usize, Vec<Pair>) {
    let word = word_before_cursor(before);
    let mut start = before.len() - word.len();

    // Still on `/join` itself: channel IDs go after it, not over it.
    let after_command = word == before.trim_start() && is_join_command(word);
    if after_command {
        start = before.len();
    }

    let candidates = suggestions
        .into_iter()
        .map(|s| Pair {
            display: format!("{}  {}", s.text, Style::secondary(&s.description)),
            replacement: if after_command {
                format!(" {}", s.text)
            } else {
                s.text
            },
        })
        .collect();
    (start, candidates)
}

impl Hinter for ChatHelper {
    type Hint = String;

    // Called on every redraw, including cursor moves and external prints;
    // only content changes count as keystrokes.
    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        self.on_edit(line, Instant::now());

        let line = &line[..pos];
        if !line.starts_with(COMMAND_MARKER) || line.contains(char::is_whitespace) {
            return None;
        }
        COMMANDS
            .iter()
            .find(|info| info.name.starts_with(line) && info.name.len() > line.len())
            .map(|info| info.name[line.len()..].to_string())
    }
}

impl Highlighter for ChatHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(Style::secondary(hint))
    }
}

impl Validator for ChatHelper {}

type ReadResult = Result<String, ReadlineError>;

/// Handle to the editor thread.
pub struct LineReader {
    prompts: std_mpsc::Sender<String>,
    lines: mpsc::Receiver<ReadResult>,
    thread: thread::JoinHandle<()>,
}

impl LineReader {
    /// Starts the editor thread and returns its printer for concurrent
    /// output.
    pub async fn spawn(
        helper: ChatHelper,
        history_path: Option<PathBuf>,
    ) -> Result<(Self, Box<dyn ExternalPrinter + Send>)> {
        let (prompt_tx, prompt_rx) = std_mpsc::channel::<String>();
        let (line_tx, line_rx) = mpsc::channel::<ReadResult>(1);
        let (ready_tx, ready_rx) = oneshot::channel();

        let thread = thread::Builder::new()
            .name("line-editor".to_string())
            .spawn(move || {
                let mut editor = match build_editor(helper, history_path.as_ref()) {
                    Ok(editor) => editor,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let printer = match editor.create_external_printer() {
                    Ok(printer) => printer,
                    Err(e) => {
                        let _ = ready_tx.send(Err(anyhow!(e).context("failed to attach printer")));
                        return;
                    }
                };
                let printer: Box<dyn ExternalPrinter + Send> = Box::new(printer);
                if ready_tx.send(Ok(printer)).is_err() {
                    return;
                }

                while let Ok(prompt) = prompt_rx.recv() {
                    let result = editor.readline(&prompt);
                    if line_tx.blocking_send(result).is_err() {
                        break;
                    }
                }

                if let Some(path) = &history_path
                    && let Err(e) = save_history(&mut editor, path)
                {
                    tracing::debug!(error = %e, "failed to save input history");
                }
            })
            .context("failed to start line editor thread")?;

        let printer = ready_rx
            .await
            .context("line editor thread exited during setup")??;

        Ok((
            Self {
                prompts: prompt_tx,
                lines: line_rx,
                thread,
            },
            printer,
        ))
    }

    /// Reads one line. `Ok(None)` means end of input.
    pub async fn read_line(&mut self, prompt: String) -> Result<Option<String>> {
        loop {
            self.prompts
                .send(prompt.clone())
                .map_err(|_| anyhow!("line editor thread stopped"))?;

            let result = self
                .lines
                .recv()
                .await
                .ok_or_else(|| anyhow!("line editor thread stopped"))?;

            match result {
                Ok(line) => return Ok(Some(line)),
                // Ctrl+C drops the current line
                Err(ReadlineError::Interrupted) => {}
                Err(ReadlineError::Eof) => return Ok(None),
                Err(e) => return Err(anyhow!(e).context("failed to read line")),
            }
        }
    }

    /// Stops the editor thread, which saves input history on the way out.
    pub async fn close(self) {
        let Self { prompts, thread, .. } = self;
        drop(prompts);
        let joined = tokio::task::spawn_blocking(move || thread.join()).await;
        if !matches!(joined, Ok(Ok(()))) {
            tracing::debug!("line editor thread did not shut down cleanly");
        }
    }
}

fn build_editor(
    helper: ChatHelper,
    history_path: Option<&PathBuf>,
) -> Result<Editor<ChatHelper, DefaultHistory>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .history_ignore_dups(true)?
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .auto_add_history(true)
        .max_history_size(MAX_HISTORY_ENTRIES)?
        .build();

    let mut editor = Editor::with_config(config).context("failed to create line editor")?;
    editor.set_helper(Some(helper));

    if let Some(path) = history_path
        && path.exists()
    {
        let _ = editor.load_history(path);
    }
    Ok(editor)
}

fn save_history(editor: &mut Editor<ChatHelper, DefaultHistory>, path: &PathBuf) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    editor.save_history(path)?;
    Ok(())
}
