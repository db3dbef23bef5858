//! Coarse progress reporting for long-running scans.

/// Observes scan phase boundaries. Purely informational; implementations
/// must not block the scan.
pub trait ProgressListener {
    fn init(&mut self, total_steps: usize, message: &str);
    fn step(&mut self, current: usize, message: &str);
}

/// Listener that ignores all progress.
pub struct NoProgress;

impl ProgressListener for NoProgress {
    fn init(&mut self, _total_steps: usize, _message: &str) {}

    fn step(&mut self, _current: usize, _message: &str) {}
}
