use std::time::{Duration, Instant};

/// Frame rate applied on software rasterizers when the user did not pick one.
pub const SOFTWARE_FPS_CAP: f32 = 30.0;

/// Lowest frame rate honoured as a cap; slower requests are raised to it.
const MIN_FPS_CAP: f32 = 0.01;

/// Decides when the event loop should issue the next redraw.
///
/// Without a cap every `ready` call returns true and the loop relies on vsync.
/// With a cap, frames are spaced at least `1 / fps` apart.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Option<Duration>,
    last_frame: Option<Instant>,
}

impl FramePacer {
    pub fn new(target_fps: Option<f32>) -> Self {
        let interval = target_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .and_then(|fps| Duration::try_from_secs_f32(1.0 / fps.max(MIN_FPS_CAP)).ok());
        Self {
            interval,
            last_frame: None,
        }
    }

    pub fn is_capped(&self) -> bool {
        self.interval.is_some()
    }

    pub fn ready(&self, now: Instant) -> bool {
        match (self.interval, self.last_frame) {
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
            _ => true,
        }
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        Some(self.last_frame? + self.interval?)
    }

    /// Forgets the last frame so the next `ready` call succeeds immediately.
    pub fn reset(&mut self) {
        self.last_frame = None;
    }
}
