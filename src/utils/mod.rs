use std::time::{Duration, Instant};
use tracing::info;

/// Logs how long a labelled stretch of work took once it goes out of scope.
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    pub fn start(label: &'static str) -> Self {
        info!("⏱  {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!("⏱  {} finished in {:.2?}", self.label, self.elapsed());
    }
}
