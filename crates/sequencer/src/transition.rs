use std::time::{Duration, Instant};

use crate::slide::Slide;
use crate::tween::{Easing, Tween};

/// Position of the sequence. `target_index` is set for exactly the span
/// between an accepted request and its completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionState {
    pub current_index: usize,
    pub target_index: Option<usize>,
    pub progress: f32,
}

impl TransitionState {
    pub fn in_flight(&self) -> bool {
        self.target_index.is_some()
    }
}

/// Which slide is bound to each of the two shader texture slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSlots {
    pub texture1: usize,
    pub texture2: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionUniforms {
    pub progress: f32,
    pub zoom1: f32,
    pub zoom2: f32,
    pub grain: f32,
    pub brightness: f32,
    pub slots: TextureSlots,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    /// The point inside a transition at which the text content swaps.
    SyncPoint { target: usize },
    Completed { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    InFlight,
    AlreadyCurrent,
    Unavailable,
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Started { from: usize, to: usize },
    Ignored(IgnoreReason),
}

impl RequestOutcome {
    pub fn started(self) -> bool {
        matches!(self, RequestOutcome::Started { .. })
    }
}

#[derive(Debug)]
struct ActiveTransition {
    target: usize,
    progress: Tween,
    grain: Tween,
    brightness: Tween,
    sync_fired: bool,
}

#[derive(Debug)]
pub struct TransitionController {
    slides: Vec<Slide>,
    available: Vec<bool>,
    state: TransitionState,
    slots: TextureSlots,
    zoom: [f32; 2],
    grain: f32,
    brightness: f32,
    duration: Duration,
    sync_point: f32,
    easing: Easing,
    active: Option<ActiveTransition>,
}

impl TransitionController {
    pub fn new(slides: Vec<Slide>, duration: Duration, sync_point: f32, easing: Easing) -> Self {
        let available = vec![false; slides.len()];
        let look = slides.first().map(|slide| slide.look).unwrap_or_default();
        Self {
            slides,
            available,
            state: TransitionState {
                current_index: 0,
                target_index: None,
                progress: 0.0,
            },
            slots: TextureSlots {
                texture1: 0,
                texture2: 0,
            },
            zoom: [look.zoom, look.zoom],
            grain: look.grain,
            brightness: look.brightness,
            duration,
            sync_point: sync_point.clamp(0.0, 1.0),
            easing,
            active: None,
        }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn in_flight(&self) -> bool {
        self.state.in_flight()
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    /// Flags a slide as having a GPU texture. Returns false for unknown indices.
    pub fn mark_available(&mut self, index: usize) -> bool {
        match self.available.get_mut(index) {
            Some(flag) => {
                *flag = true;
                true
            }
            None => false,
        }
    }

    pub fn is_available(&self, index: usize) -> bool {
        self.available.get(index).copied().unwrap_or(false)
    }

    pub fn available_count(&self) -> usize {
        self.available.iter().filter(|flag| **flag).count()
    }

    pub fn available_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.available
            .iter()
            .enumerate()
            .filter_map(|(index, flag)| flag.then_some(index))
    }

    /// Makes `index` the resting slide without animating. Only honoured while
    /// idle and only for slides with a texture.
    pub fn settle_on(&mut self, index: usize) -> bool {
        if self.in_flight() || !self.is_available(index) {
            return false;
        }
        let look = self.slides[index].look;
        self.state.current_index = index;
        self.state.progress = 0.0;
        self.slots = TextureSlots {
            texture1: index,
            texture2: index,
        };
        self.zoom = [look.zoom, look.zoom];
        self.grain = look.grain;
        self.brightness = look.brightness;
        true
    }

    /// Next slide after `from` that has a texture, wrapping modulo the sequence length.
    pub fn next_available(&self, from: usize) -> Option<usize> {
        let len = self.slides.len();
        (1..len)
            .map(|step| (from + step) % len)
            .find(|index| self.is_available(*index))
    }

    pub fn previous_available(&self, from: usize) -> Option<usize> {
        let len = self.slides.len();
        (1..len)
            .map(|step| (from + len - step) % len)
            .find(|index| self.is_available(*index))
    }

    pub fn request_transition(&mut self, target: usize, now: Instant) -> RequestOutcome {
        if target >= self.slides.len() {
            return RequestOutcome::Ignored(IgnoreReason::OutOfRange);
        }
        if self.in_flight() {
            return RequestOutcome::Ignored(IgnoreReason::InFlight);
        }
        if target == self.state.current_index {
            return RequestOutcome::Ignored(IgnoreReason::AlreadyCurrent);
        }
        if !self.is_available(target) {
            return RequestOutcome::Ignored(IgnoreReason::Unavailable);
        }

        let from = self.state.current_index;
        let look = self.slides[target].look;
        self.slots = TextureSlots {
            texture1: from,
            texture2: target,
        };
        self.zoom[1] = look.zoom;
        self.state.target_index = Some(target);
        self.state.progress = 0.0;
        self.active = Some(ActiveTransition {
            target,
            progress: Tween::new(0.0, 1.0, self.duration, self.easing, now),
            grain: Tween::new(self.grain, look.grain, self.duration, self.easing, now),
            brightness: Tween::new(
                self.brightness,
                look.brightness,
                self.duration,
                self.easing,
                now,
            ),
            sync_fired: false,
        });
        tracing::debug!(from, to = target, "transition started");
        RequestOutcome::Started { from, to: target }
    }

    /// Advances the running tweens. The sync point is always reported before
    /// completion, even when a single update jumps past both.
    pub fn update(&mut self, now: Instant) -> Vec<TransitionEvent> {
        let mut events = Vec::new();
        let Some(active) = self.active.as_mut() else {
            return events;
        };

        let fraction = active.progress.fraction(now);
        let (progress, finished) = active.progress.sample(now);
        self.grain = active.grain.sample(now).0;
        self.brightness = active.brightness.sample(now).0;
        self.state.progress = progress.max(self.state.progress);

        if !active.sync_fired && (fraction >= self.sync_point || finished) {
            active.sync_fired = true;
            events.push(TransitionEvent::SyncPoint {
                target: active.target,
            });
        }

        if finished {
            let target = active.target;
            let look = self.slides[target].look;
            self.active = None;
            self.state = TransitionState {
                current_index: target,
                target_index: None,
                progress: 0.0,
            };
            self.slots = TextureSlots {
                texture1: target,
                texture2: target,
            };
            self.zoom = [look.zoom, look.zoom];
            self.grain = look.grain;
            self.brightness = look.brightness;
            tracing::debug!(index = target, "transition completed");
            events.push(TransitionEvent::Completed { index: target });
        }

        events
    }

    /// Drops a running transition without completing it.
    pub fn cancel(&mut self) {
        if self.active.take().is_some() {
            tracing::debug!(current = self.state.current_index, "transition cancelled");
        }
        self.state.target_index = None;
        self.state.progress = 0.0;
        let current = self.state.current_index;
        self.slots = TextureSlots {
            texture1: current,
            texture2: current,
        };
    }

    pub fn uniforms(&self) -> TransitionUniforms {
        TransitionUniforms {
            progress: self.state.progress,
            zoom1: self.zoom[0],
            zoom2: self.zoom[1],
            grain: self.grain,
            brightness: self.brightness,
            slots: self.slots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slide::SlideLook;

    fn controller(len: usize) -> TransitionController {
        let slides = (0..len)
            .map(|i| {
                Slide::new(format!("slide {i}"), format!("{i}.png")).with_look(SlideLook {
                    zoom: 1.0 + i as f32 * 0.1,
                    grain: i as f32 * 0.02,
                    brightness: 1.0 - i as f32 * 0.1,
                })
            })
            .collect();
        let mut controller =
            TransitionController::new(slides, Duration::from_millis(1500), 0.33, Easing::Linear);
        for index in 0..len {
            controller.mark_available(index);
        }
        controller
    }

    #[test]
    fn in_flight_spans_request_to_completion() {
        let mut ctl = controller(3);
        let start = Instant::now();
        assert!(!ctl.in_flight());

        assert!(ctl.request_transition(1, start).started());
        assert!(ctl.in_flight());

        ctl.update(start + Duration::from_millis(700));
        assert!(ctl.in_flight());
        assert_eq!(ctl.current_index(), 0);

        let events = ctl.update(start + Duration::from_millis(1500));
        assert!(events.contains(&TransitionEvent::Completed { index: 1 }));
        assert!(!ctl.in_flight());
        assert_eq!(ctl.current_index(), 1);
    }

    #[test]
    fn requests_are_ignored_while_in_flight() {
        let mut ctl = controller(3);
        let start = Instant::now();
        ctl.request_transition(1, start);
        assert_eq!(
            ctl.request_transition(2, start + Duration::from_millis(10)),
            RequestOutcome::Ignored(IgnoreReason::InFlight)
        );
        assert_eq!(ctl.state().target_index, Some(1));
    }

    #[test]
    fn rejects_current_missing_and_out_of_range_targets() {
        let slides = vec![Slide::new("a", "a.png"), Slide::new("b", "b.png")];
        let mut ctl = TransitionController::new(slides, Duration::from_secs(1), 0.33, Easing::Linear);
        ctl.mark_available(0);
        let now = Instant::now();
        assert_eq!(
            ctl.request_transition(0, now),
            RequestOutcome::Ignored(IgnoreReason::AlreadyCurrent)
        );
        assert_eq!(
            ctl.request_transition(1, now),
            RequestOutcome::Ignored(IgnoreReason::Unavailable)
        );
        assert_eq!(
            ctl.request_transition(5, now),
            RequestOutcome::Ignored(IgnoreReason::OutOfRange)
        );
        assert!(!ctl.in_flight());
    }

    #[test]
    fn progress_is_monotonic_and_resets_to_zero() {
        let mut ctl = controller(2);
        let start = Instant::now();
        ctl.request_transition(1, start);

        let mut last = 0.0;
        for step in 1..15 {
            ctl.update(start + Duration::from_millis(step * 100));
            let progress = ctl.state().progress;
            assert!(progress >= last);
            assert!((0.0..=1.0).contains(&progress));
            last = progress;
        }

        ctl.update(start + Duration::from_millis(1600));
        assert_eq!(ctl.state().progress, 0.0);
    }

    #[test]
    fn sync_point_fires_once_before_completion() {
        let mut ctl = controller(2);
        let start = Instant::now();
        ctl.request_transition(1, start);

        assert!(ctl.update(start + Duration::from_millis(200)).is_empty());
        assert_eq!(
            ctl.update(start + Duration::from_millis(500)),
            vec![TransitionEvent::SyncPoint { target: 1 }]
        );
        assert!(ctl.update(start + Duration::from_millis(900)).is_empty());
        assert_eq!(
            ctl.update(start + Duration::from_millis(1500)),
            vec![TransitionEvent::Completed { index: 1 }]
        );
    }

    #[test]
    fn late_update_reports_sync_then_completion() {
        let mut ctl = controller(2);
        let start = Instant::now();
        ctl.request_transition(1, start);
        assert_eq!(
            ctl.update(start + Duration::from_secs(5)),
            vec![
                TransitionEvent::SyncPoint { target: 1 },
                TransitionEvent::Completed { index: 1 }
            ]
        );
    }

    #[test]
    fn slots_rebind_on_completion() {
        let mut ctl = controller(3);
        let start = Instant::now();
        ctl.request_transition(2, start);
        let uniforms = ctl.uniforms();
        assert_eq!(uniforms.slots, TextureSlots { texture1: 0, texture2: 2 });
        assert!((uniforms.zoom1 - 1.0).abs() < 1e-6);
        assert!((uniforms.zoom2 - 1.2).abs() < 1e-6);

        ctl.update(start + Duration::from_millis(1500));
        let uniforms = ctl.uniforms();
        assert_eq!(uniforms.slots.texture1, 2);
        assert_eq!(uniforms.progress, 0.0);
        assert!((uniforms.zoom1 - 1.2).abs() < 1e-6);
        assert!((uniforms.grain - 0.04).abs() < 1e-6);
        assert!((uniforms.brightness - 0.8).abs() < 1e-6);
    }

    #[test]
    fn grain_and_brightness_tween_with_progress() {
        let mut ctl = controller(2);
        let start = Instant::now();
        ctl.request_transition(1, start);
        ctl.update(start + Duration::from_millis(750));
        let uniforms = ctl.uniforms();
        assert!((uniforms.grain - 0.01).abs() < 1e-3);
        assert!((uniforms.brightness - 0.95).abs() < 1e-3);
    }

    #[test]
    fn next_available_skips_missing_slides() {
        let slides = (0..4).map(|i| Slide::new(format!("{i}"), "x.png")).collect();
        let mut ctl = TransitionController::new(slides, Duration::from_secs(1), 0.33, Easing::Linear);
        ctl.mark_available(0);
        ctl.mark_available(2);
        assert_eq!(ctl.next_available(0), Some(2));
        assert_eq!(ctl.next_available(2), Some(0));
        assert_eq!(ctl.previous_available(0), Some(2));
        assert_eq!(ctl.available_count(), 2);
    }

    #[test]
    fn next_available_is_none_for_single_slide() {
        let mut ctl = controller(1);
        ctl.mark_available(0);
        assert_eq!(ctl.next_available(0), None);
    }

    #[test]
    fn cancel_leaves_current_slide_untouched() {
        let mut ctl = controller(2);
        let start = Instant::now();
        ctl.request_transition(1, start);
        ctl.update(start + Duration::from_millis(600));
        ctl.cancel();
        assert!(!ctl.in_flight());
        assert_eq!(ctl.current_index(), 0);
        assert_eq!(ctl.uniforms().progress, 0.0);
        assert!(ctl.update(start + Duration::from_secs(3)).is_empty());
    }

    #[test]
    fn settle_on_requires_available_idle_slide() {
        let slides = vec![Slide::new("a", "a.png"), Slide::new("b", "b.png")];
        let mut ctl = TransitionController::new(slides, Duration::from_secs(1), 0.33, Easing::Linear);
        assert!(!ctl.settle_on(1));
        ctl.mark_available(1);
        assert!(ctl.settle_on(1));
        assert_eq!(ctl.current_index(), 1);
        assert_eq!(ctl.uniforms().slots, TextureSlots { texture1: 1, texture2: 1 });
    }
}
