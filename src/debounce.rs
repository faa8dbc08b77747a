//! Debounced propagation of the search input
//!
//! Time is passed in explicitly so the UI loop drives it from its tick and
//! tests can step it deterministically.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
    settled: String,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            settled: String::new(),
        }
    }

    /// Record a new raw value. Any earlier pending value is dropped and the
    /// timer restarts from `now`.
    pub fn push(&mut self, value: impl Into<String>, now: Instant) {
        self.pending = Some((value.into(), now));
    }

    /// Returns the pending value once it has been stable for the full delay.
    ///
    /// A value equal to the current settled one is absorbed without being
    /// reported again.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let ready = match &self.pending {
            Some((_, since)) => now.saturating_duration_since(*since) >= self.delay,
            None => false,
        };
        if !ready {
            return None;
        }

        let (value, _) = self.pending.take()?;
        if value == self.settled {
            return None;
        }
        self.settled = value.clone();
        Some(value)
    }

    /// Settle on `value` right away, cancelling anything pending.
    pub fn flush(&mut self, value: impl Into<String>) {
        self.pending = None;
        self.settled = value.into();
    }

    pub fn settled(&self) -> &str {
        &self.settled
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn value_settles_after_delay() {
        let start = Instant::now();
        let mut d = Debouncer::new(DELAY);
        d.push("lap", start);

        assert_eq!(d.poll(start + Duration::from_millis(299)), None);
        assert_eq!(d.settled(), "");
        assert_eq!(d.poll(start + DELAY), Some("lap".to_string()));
        assert_eq!(d.settled(), "lap");
        assert!(!d.is_pending());
    }

    #[test]
    fn typing_restarts_the_timer() {
        let start = Instant::now();
        let mut d = Debouncer::new(DELAY);
        d.push("l", start);
        d.push("la", start + Duration::from_millis(200));
        d.push("lap", start + Duration::from_millis(400));

        // 300ms after the first keystroke, but the last one was just now
        assert_eq!(d.poll(start + Duration::from_millis(500)), None);
        assert_eq!(
            d.poll(start + Duration::from_millis(700)),
            Some("lap".to_string())
        );
    }

    #[test]
    fn unchanged_value_is_not_reported_twice() {
        let start = Instant::now();
        let mut d = Debouncer::new(DELAY);
        d.push("ring", start);
        assert!(d.poll(start + DELAY).is_some());

        d.push("ring", start + DELAY);
        assert_eq!(d.poll(start + DELAY * 3), None);
        assert!(!d.is_pending());
    }

    #[test]
    fn flush_cancels_pending_value() {
        let start = Instant::now();
        let mut d = Debouncer::new(DELAY);
        d.push("jacket", start);
        d.flush("");

        assert_eq!(d.poll(start + DELAY * 2), None);
        assert_eq!(d.settled(), "");
    }
}
