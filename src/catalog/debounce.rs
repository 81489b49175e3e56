use std::time::Duration;
use tokio::time::Instant;

/// A text input whose settled value lags the raw value by a quiet period.
///
/// Every [`input`](Self::input) restarts the quiet period. The settled value
/// only moves when [`settle`](Self::settle) is called at or after the
/// deadline. The owner drives the clock; nothing here spawns or sleeps.
#[derive(Debug, Clone)]
pub struct DebouncedInput {
    raw: String,
    settled: String,
    deadline: Option<Instant>,
    quiet: Duration,
}

impl DebouncedInput {
    pub fn new(quiet: Duration) -> Self {
        Self {
            raw: String::new(),
            settled: String::new(),
            deadline: None,
            quiet,
        }
    }

    /// Record a new raw value, cancelling any pending deadline.
    pub fn input(&mut self, value: impl Into<String>, now: Instant) {
        self.raw = value.into();
        self.deadline = Some(now + self.quiet);
    }

    /// Copy raw into settled if the deadline has passed.
    ///
    /// Returns true only when the settled value actually changed.
    pub fn settle(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                if self.settled == self.raw {
                    return false;
                }
                self.settled = self.raw.clone();
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn settled(&self) -> &str {
        &self.settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(500);

    #[test]
    fn test_settles_after_quiet_period() {
        let start = Instant::now();
        let mut input = DebouncedInput::new(QUIET);
        input.input("rust", start);

        assert!(!input.settle(start + Duration::from_millis(499)));
        assert_eq!(input.settled(), "");
        assert!(input.settle(start + QUIET));
        assert_eq!(input.settled(), "rust");
        assert_eq!(input.deadline(), None);
    }

    #[test]
    fn test_each_input_restarts_the_deadline() {
        let start = Instant::now();
        let mut input = DebouncedInput::new(QUIET);
        input.input("t", start);
        input.input("te", start + Duration::from_millis(400));

        assert!(!input.settle(start + Duration::from_millis(600)));
        assert_eq!(input.deadline(), Some(start + Duration::from_millis(900)));
        assert!(input.settle(start + Duration::from_millis(900)));
        assert_eq!(input.settled(), "te");
    }

    #[test]
    fn test_settling_to_same_value_reports_no_change() {
        let start = Instant::now();
        let mut input = DebouncedInput::new(QUIET);
        input.input("a", start);
        input.input("", start + Duration::from_millis(10));

        assert!(!input.settle(start + Duration::from_secs(1)));
        assert_eq!(input.raw(), "");
        assert_eq!(input.deadline(), None);
    }

    #[test]
    fn test_cancel_drops_pending_value() {
        let start = Instant::now();
        let mut input = DebouncedInput::new(QUIET);
        input.input("x", start);
        input.cancel();
        assert!(!input.settle(start + Duration::from_secs(5)));
        assert_eq!(input.settled(), "");
    }
}
