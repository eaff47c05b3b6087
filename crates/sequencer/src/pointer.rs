/// Snapshot of the pointer consumed by the frame loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    /// Normalised position; `(0, 0)` is the bottom-left corner.
    pub position: [f32; 2],
    pub hovering: bool,
    pub smoothed_activity: f32,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            position: [0.5, 0.5],
            hovering: false,
            smoothed_activity: 0.0,
        }
    }
}

/// Last-known pointer sample, fed by window events.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    position: [f32; 2],
    hovering: bool,
    attached: bool,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerTracker {
    pub fn new() -> Self {
        Self {
            position: [0.5, 0.5],
            hovering: false,
            attached: true,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Records a move in window pixels (origin top-left).
    pub fn handle_move(&mut self, x: f64, y: f64, width: u32, height: u32) {
        if !self.attached {
            return;
        }
        let w = f64::from(width.max(1));
        let h = f64::from(height.max(1));
        self.position = [
            (x / w).clamp(0.0, 1.0) as f32,
            (1.0 - y / h).clamp(0.0, 1.0) as f32,
        ];
        self.hovering = true;
    }

    pub fn handle_enter(&mut self) {
        if self.attached {
            self.hovering = true;
        }
    }

    pub fn handle_leave(&mut self) {
        if self.attached {
            self.hovering = false;
        }
    }

    /// Stops observing events. The last sample stays readable but goes idle.
    pub fn detach(&mut self) {
        self.attached = false;
        self.hovering = false;
    }

    pub fn position(&self) -> [f32; 2] {
        self.position
    }

    pub fn hovering(&self) -> bool {
        self.hovering
    }
}

/// Exponential approach of the ripple activity toward the hover state.
#[derive(Debug, Clone, Copy)]
pub struct ActivitySmoother {
    value: f32,
    factor: f32,
}

impl ActivitySmoother {
    pub fn new(factor: f32) -> Self {
        Self {
            value: 0.0,
            factor: factor.clamp(f32::EPSILON, 1.0),
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Advances one frame and returns the new activity.
    pub fn step(&mut self, hovering: bool) -> f32 {
        let goal = if hovering { 1.0 } else { 0.0 };
        self.value += (goal - self.value) * self.factor;
        if (goal - self.value).abs() < 1e-3 {
            self.value = goal;
        }
        self.value = self.value.clamp(0.0, 1.0);
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_normalises_and_flips_y() {
        let mut tracker = PointerTracker::new();
        tracker.handle_move(200.0, 150.0, 800, 600);
        let [x, y] = tracker.position();
        assert!((x - 0.25).abs() < 1e-6);
        assert!((y - 0.75).abs() < 1e-6);
        assert!(tracker.hovering());
    }

    #[test]
    fn move_outside_window_is_clamped() {
        let mut tracker = PointerTracker::new();
        tracker.handle_move(-40.0, 900.0, 800, 600);
        assert_eq!(tracker.position(), [0.0, 0.0]);
    }

    #[test]
    fn leave_clears_hover_but_keeps_position() {
        let mut tracker = PointerTracker::new();
        tracker.handle_move(400.0, 300.0, 800, 600);
        tracker.handle_leave();
        assert!(!tracker.hovering());
        assert_eq!(tracker.position(), [0.5, 0.5]);
    }

    #[test]
    fn detached_tracker_ignores_events() {
        let mut tracker = PointerTracker::new();
        tracker.detach();
        tracker.handle_enter();
        tracker.handle_move(10.0, 10.0, 100, 100);
        assert!(!tracker.hovering());
        assert!(!tracker.is_attached());
        assert_eq!(tracker.position(), [0.5, 0.5]);
    }

    #[test]
    fn activity_decays_below_threshold_within_sixty_frames() {
        let mut smoother = ActivitySmoother::new(0.08);
        for _ in 0..120 {
            smoother.step(true);
        }
        assert_eq!(smoother.value(), 1.0);

        for _ in 0..60 {
            smoother.step(false);
        }
        assert!(smoother.value() < 0.01);
    }

    #[test]
    fn activity_stays_in_unit_range() {
        let mut smoother = ActivitySmoother::new(1.0);
        for frame in 0..50 {
            let value = smoother.step(frame % 3 != 0);
            assert!((0.0..=1.0).contains(&value));
        }
    }
}
