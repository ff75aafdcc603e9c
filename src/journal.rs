//! Run telemetry that must never abort a run: the event log and debug captures.
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Swallow a failed side effect after logging it.
pub trait BestEffort {
    fn best_effort(self, what: &str);
}

impl BestEffort for io::Result<()> {
    fn best_effort(self, what: &str) {
        if let Err(err) = self {
            warn!(?err, "{} failed; continuing", what);
        }
    }
}

/// Append-only, human-readable history of runs.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn record(&self, message: &str) -> io::Result<()> {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("[{}] {}\n", timestamp, message).as_bytes())
            .await?;
        file.flush().await
    }
}

/// Raw backend text kept for responses that failed to parse.
#[derive(Debug, Clone)]
pub struct DebugArtifacts {
    dir: PathBuf,
}

impl DebugArtifacts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, id: u64, attempt: u32) -> PathBuf {
        self.dir.join(format!("fail_{:04}_att{}.txt", id, attempt))
    }

    pub async fn write(&self, id: u64, attempt: u32, raw: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        fs::write(self.path_for(id, attempt), raw).await
    }

    /// Remove the captures of attempts `1..=attempts` for `id`. Missing files are fine.
    pub async fn clear(&self, id: u64, attempts: u32) -> io::Result<()> {
        for attempt in 1..=attempts {
            match fs::remove_file(self.path_for(id, attempt)).await {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

/// Both sinks a run writes to.
#[derive(Debug, Clone)]
pub struct Journal {
    pub events: EventLog,
    pub debug: DebugArtifacts,
}

impl Journal {
    pub fn new(log_path: impl Into<PathBuf>, debug_dir: impl Into<PathBuf>) -> Self {
        Self {
            events: EventLog::new(log_path),
            debug: DebugArtifacts::new(debug_dir),
        }
    }

    pub async fn event(&self, message: &str) {
        self.events.record(message).await.best_effort("event log write");
    }
}
