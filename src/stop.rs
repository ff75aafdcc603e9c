use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop request: a sentinel file on disk, or an in-process flag
/// raised by the ctrl-c handler. Polled once per item.
#[derive(Debug, Clone)]
pub struct StopSignal {
    sentinel: PathBuf,
    interrupted: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new(sentinel: impl Into<PathBuf>) -> Self {
        Self {
            sentinel: sentinel.into(),
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn sentinel(&self) -> &Path {
        &self.sentinel
    }

    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    pub fn requested(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst) || self.sentinel.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sentinel_file_requests_stop() {
        let td = tempdir().unwrap();
        let stop = StopSignal::new(td.path().join("stop.txt"));
        assert!(!stop.requested());
        std::fs::write(stop.sentinel(), "").unwrap();
        assert!(stop.requested());
    }

    #[test]
    fn interrupt_is_shared_between_clones() {
        let td = tempdir().unwrap();
        let stop = StopSignal::new(td.path().join("stop.txt"));
        let from_handler = stop.clone();
        assert!(!stop.requested());
        from_handler.interrupt();
        assert!(stop.requested());
    }
}
