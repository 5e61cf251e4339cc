//! Trailing-edge debouncing on an externally supplied clock.

/// Collapses bursts of triggers into a single trailing execution.
///
/// Each [`trigger`](Self::trigger) pushes the deadline to `now + wait`;
/// [`poll`](Self::poll) reports `true` exactly once after the deadline has
/// passed. The last trigger wins and nothing is queued.
#[derive(Debug, Clone)]
pub struct Debouncer {
    wait_ms: f64,
    deadline: Option<f64>,
}

impl Debouncer {
    pub fn new(wait_ms: f64) -> Self {
        Self {
            wait_ms,
            deadline: None,
        }
    }

    /// Arms (or re-arms) the trailing deadline.
    pub fn trigger(&mut self, now_ms: f64) {
        self.deadline = Some(now_ms + self.wait_ms);
    }

    /// Returns `true` once when the armed deadline has been reached.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
