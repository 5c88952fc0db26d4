//! Single-writer output sink shared by all workers
//!
//! Workers hold cheap [`Logger`] clones that send complete lines over a
//! channel; one writer task owns the output and writes each line whole, so
//! lines from different workers never interleave.

use std::fmt::Display;
use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Logger {
    sender: mpsc::UnboundedSender<String>,
    verbose: bool,
}

/// Owns the writer task; see [`LoggerHandle::finish`]
pub struct LoggerHandle<W> {
    handle: JoinHandle<io::Result<W>>,
}

impl Logger {
    /// Start the writer task for `writer`.
    ///
    /// Diagnostic lines are only written when `verbose` is set.
    pub fn spawn<W>(writer: W, verbose: bool) -> (Logger, LoggerHandle<W>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(drain(writer, receiver));

        (Logger { sender, verbose }, LoggerHandle { handle })
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Write a line that is always shown, e.g. `foo: new version found - 1.0 => 1.1`
    pub fn result(&self, package: &str, message: impl Display) {
        self.send(format!("{}: {}\n", package, message));
    }

    /// Write a line that is only shown in verbose mode
    pub fn diagnostic(&self, package: &str, message: impl Display) {
        if self.verbose {
            self.send(format!("{}: {}\n", package, message));
        }
    }

    fn send(&self, line: String) {
        if self.sender.send(line).is_err() {
            warn!("Output writer has stopped; dropping line");
        }
    }
}

impl<W> LoggerHandle<W> {
    /// Wait until every [`Logger`] clone has been dropped and all queued
    /// lines are written, then hand the writer back
    pub async fn finish(self) -> io::Result<W> {
        self.handle.await.map_err(io::Error::other)?
    }
}

async fn drain<W>(mut writer: W, mut receiver: mpsc::UnboundedReceiver<String>) -> io::Result<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = receiver.recv().await {
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    writer.flush().await?;
    Ok(writer)
}
