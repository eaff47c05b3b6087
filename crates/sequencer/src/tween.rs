use std::time::{Duration, Instant};

use deckconfig::EasingSetting;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    Smoothstep,
    #[default]
    EaseInOut,
    EaseOut,
}

impl Easing {
    pub fn sample(self, t: f32) -> f32 {
        let clamped = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => clamped,
            Easing::Smoothstep => clamped * clamped * (3.0 - 2.0 * clamped),
            Easing::EaseInOut => {
                if clamped < 0.5 {
                    2.0 * clamped * clamped
                } else {
                    -1.0 + (4.0 - 2.0 * clamped) * clamped
                }
            }
            Easing::EaseOut => {
                let inv = 1.0 - clamped;
                1.0 - inv * inv * inv
            }
        }
    }
}

impl From<EasingSetting> for Easing {
    fn from(setting: EasingSetting) -> Self {
        match setting {
            EasingSetting::Linear => Easing::Linear,
            EasingSetting::Smoothstep => Easing::Smoothstep,
            EasingSetting::EaseInOut => Easing::EaseInOut,
            EasingSetting::EaseOut => Easing::EaseOut,
        }
    }
}

/// Interpolates a scalar between two values over a fixed span of time.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    from: f32,
    to: f32,
    start: Instant,
    duration: Duration,
    easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: Duration, easing: Easing, now: Instant) -> Self {
        Self {
            from,
            to,
            start: now,
            duration,
            easing,
        }
    }

    /// Linear fraction of elapsed time, clamped to `[0, 1]`.
    pub fn fraction(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Returns the eased value and whether the tween has reached its end.
    pub fn sample(&self, now: Instant) -> (f32, bool) {
        let t = self.fraction(now);
        let mix = self.easing.sample(t);
        (self.from + (self.to - self.from) * mix, t >= 1.0)
    }
}
