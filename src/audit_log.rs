//! Append-only audit log served on `/logger`.
//!
//! Lines are handed to a background writer over a bounded channel, so callers
//! never wait on disk I/O and never see a write failure.

use chrono::{DateTime, SecondsFormat, Utc};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};

const QUEUE_SIZE: usize = 1024;

enum AuditCommand {
    Line(String),
    Flush(oneshot::Sender<()>),
}

#[derive(Clone)]
pub struct AuditLog {
    path: PathBuf,
    tx: mpsc::Sender<AuditCommand>,
}

impl AuditLog {
    /// Spawns the writer task; must be called inside a tokio runtime.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (tx, rx) = mpsc::channel(QUEUE_SIZE);

        tokio::spawn(audit_writer(rx, path.clone()));

        Self { path, tx }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queue a timestamped line. Dropped (with a warning) if the queue is full.
    pub fn record(&self, message: impl AsRef<str>) {
        let line = format_line(Utc::now(), message.as_ref());
        if let Err(e) = self.tx.try_send(AuditCommand::Line(line)) {
            tracing::warn!(error = %e, "audit log line dropped");
        }
    }

    /// Wait until every line queued before this call has been written.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(AuditCommand::Flush(done_tx)).await.is_ok() {
            let _ = done_rx.await;
        }
    }

    pub async fn read_all(&self) -> io::Result<String> {
        tokio::fs::read_to_string(&self.path).await
    }
}

// Control characters are escaped so one record is always exactly one line
pub fn format_line(at: DateTime<Utc>, message: &str) -> String {
    let mut line = format!("[{}] ", at.to_rfc3339_opts(SecondsFormat::Millis, true));
    for c in message.chars() {
        if c.is_control() {
            line.extend(c.escape_default());
        } else {
            line.push(c);
        }
    }
    line.push('\n');
    line
}

async fn audit_writer(mut rx: mpsc::Receiver<AuditCommand>, path: PathBuf) {
    tracing::debug!(path = %path.display(), "audit log writer started");

    while let Some(command) = rx.recv().await {
        match command {
            AuditCommand::Line(line) => {
                if let Err(e) = append(&path, &line).await {
                    tracing::error!(error = %e, path = %path.display(), "failed to write audit log");
                }
            }
            AuditCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

async fn append(path: &Path, line: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path).await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await
}
