//! Terminal output gate.
//!
//! Command output and background event rendering share one terminal. Every
//! write goes through [`Output`], which holds a single FIFO-fair async mutex
//! around the active [`LineSink`] so lines never interleave mid-write.
//!
//! ## Routing
//!
//! - While the line editor is waiting for input, lines go through its
//!   external printer so the prompt and partial input are redrawn below.
//! - Otherwise (a command is running) lines go straight to stdout.

use rustyline::ExternalPrinter;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::ui::Style;

/// Destination for complete lines of output (without trailing newline).
pub trait LineSink: Send {
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// Writes lines to stdout.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl LineSink for StdoutSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{line}")?;
        stdout.flush()
    }
}

/// Routes lines around an active line editor prompt.
pub struct TerminalSink {
    printer: Box<dyn ExternalPrinter + Send>,
    prompting: Arc<AtomicBool>,
    direct: StdoutSink,
}

impl TerminalSink {
    /// `prompting` must be `true` exactly while the editor reads a line.
    pub fn new(printer: Box<dyn ExternalPrinter + Send>, prompting: Arc<AtomicBool>) -> Self {
        Self {
            printer,
            prompting,
            direct: StdoutSink,
        }
    }
}

impl LineSink for TerminalSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        if self.prompting.load(Ordering::Acquire) {
            self.printer
                .print(format!("{line}\n"))
                .map_err(io::Error::other)
        } else {
            self.direct.write_line(line)
        }
    }
}

/// The shared, mutually exclusive output gate.
pub struct Output {
    sink: Mutex<Box<dyn LineSink>>,
}

impl Output {
    pub fn new(sink: impl LineSink + 'static) -> Self {
        Self {
            sink: Mutex::new(Box::new(sink)),
        }
    }

    /// Writes one line.
    pub async fn line(&self, line: impl AsRef<str>) {
        let mut sink = self.sink.lock().await;
        write_or_log(sink.as_mut(), line.as_ref());
    }

    /// Writes several lines without letting other writers in between.
    pub async fn lines<I>(&self, lines: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut sink = self.sink.lock().await;
        for line in lines {
            write_or_log(sink.as_mut(), line.as_ref());
        }
    }

    /// Writes `Error: <context>: <cause>` for a failed action.
    pub async fn error(&self, err: &anyhow::Error) {
        self.line(format!("{} {err:#}", Style::error("Error:"))).await;
    }
}

fn write_or_log(sink: &mut dyn LineSink, line: &str) {
    if let Err(e) = sink.write_line(line) {
        tracing::debug!(error = %e, "failed to write terminal output");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemorySink;

    #[tokio::test]
    async fn test_lines_are_written_in_order() {
        let sink = MemorySink::default();
        let output = Output::new(sink.clone());

        output.line("one").await;
        output.lines(["two", "three"]).await;

        assert_eq!(sink.lines(), ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_error_uses_context_chain() {
        let sink = MemorySink::default();
        let output = Output::new(sink.clone());

        let err = anyhow::anyhow!("connection reset").context("failed to send message");
        output.error(&err).await;

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Error:"));
        assert!(lines[0].ends_with("failed to send message: connection reset"));
    }

    #[tokio::test]
    async fn test_concurrent_block_writes_do_not_interleave() {
        let sink = MemorySink::default();
        let output = Arc::new(Output::new(sink.clone()));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let output = Arc::clone(&output);
                tokio::spawn(async move {
                    output
                        .lines((0..5).map(|j| format!("{i}:{j}")))
                        .await;
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap_or_else(|e| std::panic::resume_unwind(e.into_panic()));
        }

        let lines = sink.lines();
        assert_eq!(lines.len(), 40);
        for block in lines.chunks(5) {
            let writer = block[0].split(':').next().unwrap_or_default();
            assert!(block.iter().all(|l| l.starts_with(&format!("{writer}:"))));
        }
    }
}
