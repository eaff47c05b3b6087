use std::time::{Duration, Instant};

/// Fixed-cadence timer that asks the sequence to advance.
///
/// Time is always passed in explicitly; the scheduler never reads a clock. A
/// tick that lands while a transition is running is consumed without
/// advancing, and a stalled host never receives a burst of missed ticks.
#[derive(Debug, Clone)]
pub struct AutoplayScheduler {
    interval: Duration,
    enabled: bool,
    visible: bool,
    next_tick: Option<Instant>,
}

impl AutoplayScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            enabled: false,
            visible: true,
            next_tick: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_scheduled(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Arms the timer. The first tick fires one interval after `delay` has elapsed.
    pub fn start(&mut self, now: Instant, delay: Duration) {
        self.enabled = true;
        self.next_tick = if self.visible {
            Some(now + delay + self.interval)
        } else {
            None
        };
    }

    pub fn stop(&mut self) {
        self.enabled = false;
        self.next_tick = None;
    }

    /// Pauses while hidden. Becoming visible re-arms at most one pending tick.
    pub fn set_visible(&mut self, visible: bool, now: Instant) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        if !visible {
            self.next_tick = None;
        } else if self.enabled && self.next_tick.is_none() {
            self.next_tick = Some(now + self.interval);
        }
    }

    /// Returns true when a tick is due and should advance the sequence.
    pub fn poll(&mut self, now: Instant, in_flight: bool) -> bool {
        let Some(deadline) = self.next_tick else {
            return false;
        };
        if now < deadline {
            return false;
        }

        let mut next = deadline + self.interval;
        if next <= now {
            next = now + self.interval;
        }
        self.next_tick = Some(next);

        if in_flight {
            tracing::trace!("autoplay tick skipped while transition in flight");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(4);

    #[test]
    fn ticks_on_fixed_cadence() {
        let start = Instant::now();
        let mut autoplay = AutoplayScheduler::new(INTERVAL);
        autoplay.start(start, Duration::ZERO);

        assert!(!autoplay.poll(start + Duration::from_secs(3), false));
        assert!(autoplay.poll(start + Duration::from_millis(4010), false));
        assert_eq!(
            autoplay.next_deadline(),
            Some(start + Duration::from_secs(8))
        );
        assert!(!autoplay.poll(start + Duration::from_secs(6), false));
        assert!(autoplay.poll(start + Duration::from_secs(8), false));
    }

    #[test]
    fn tick_during_transition_is_skipped() {
        let start = Instant::now();
        let mut autoplay = AutoplayScheduler::new(INTERVAL);
        autoplay.start(start, Duration::ZERO);

        assert!(!autoplay.poll(start + INTERVAL, true));
        assert_eq!(
            autoplay.next_deadline(),
            Some(start + INTERVAL * 2),
            "skipped tick keeps the cadence"
        );
    }

    #[test]
    fn stalled_host_gets_a_single_tick() {
        let start = Instant::now();
        let mut autoplay = AutoplayScheduler::new(INTERVAL);
        autoplay.start(start, Duration::ZERO);

        let late = start + Duration::from_secs(30);
        assert!(autoplay.poll(late, false));
        assert!(!autoplay.poll(late, false));
        assert_eq!(autoplay.next_deadline(), Some(late + INTERVAL));
    }

    #[test]
    fn delay_postpones_first_tick() {
        let start = Instant::now();
        let mut autoplay = AutoplayScheduler::new(INTERVAL);
        autoplay.start(start, Duration::from_secs(2));
        assert!(!autoplay.poll(start + INTERVAL, false));
        assert!(autoplay.poll(start + Duration::from_secs(6), false));
    }

    #[test]
    fn stop_is_idempotent() {
        let start = Instant::now();
        let mut autoplay = AutoplayScheduler::new(INTERVAL);
        autoplay.start(start, Duration::ZERO);
        autoplay.stop();
        autoplay.stop();
        assert!(!autoplay.is_enabled());
        assert!(!autoplay.is_scheduled());
        assert!(!autoplay.poll(start + INTERVAL * 3, false));
    }

    #[test]
    fn hidden_pauses_and_visible_resumes_once() {
        let start = Instant::now();
        let mut autoplay = AutoplayScheduler::new(INTERVAL);
        autoplay.start(start, Duration::ZERO);

        autoplay.set_visible(false, start + Duration::from_secs(1));
        assert!(!autoplay.is_scheduled());
        assert!(autoplay.is_enabled());
        assert!(!autoplay.poll(start + Duration::from_secs(20), false));

        let shown = start + Duration::from_secs(21);
        autoplay.set_visible(true, shown);
        autoplay.set_visible(true, shown + Duration::from_secs(1));
        assert_eq!(autoplay.next_deadline(), Some(shown + INTERVAL));
    }

    #[test]
    fn start_while_hidden_waits_for_visibility() {
        let start = Instant::now();
        let mut autoplay = AutoplayScheduler::new(INTERVAL);
        autoplay.set_visible(false, start);
        autoplay.start(start, Duration::ZERO);
        assert!(!autoplay.is_scheduled());
        autoplay.set_visible(true, start + Duration::from_secs(1));
        assert!(autoplay.is_scheduled());
    }

    #[test]
    fn visibility_does_not_arm_stopped_timer() {
        let start = Instant::now();
        let mut autoplay = AutoplayScheduler::new(INTERVAL);
        autoplay.set_visible(false, start);
        autoplay.set_visible(true, start);
        assert!(!autoplay.is_scheduled());
    }
}
