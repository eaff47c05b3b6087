use std::time::Instant;

use deckconfig::EffectSettings;

use crate::autoplay::AutoplayScheduler;
use crate::content::{ContentSync, TextSurface, TextTimings};
use crate::navigation::{Marker, NavigationIndicator, NavigationOutcome};
use crate::pointer::{ActivitySmoother, PointerState, PointerTracker};
use crate::slide::{Slide, Timings};
use crate::transition::{
    IgnoreReason, RequestOutcome, TransitionController, TransitionEvent, TransitionState,
    TransitionUniforms,
};

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    #[error("slide engine has not been mounted")]
    NotMounted,
    #[error("slide engine has been unmounted")]
    Unmounted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Mounted,
    Unmounted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    Started { from: usize, to: usize },
    SyncPoint { target: usize },
    Completed { index: usize },
}

/// Everything the renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameParams {
    pub resolution: [f32; 2],
    pub time: f32,
    pub pointer: PointerState,
    pub transition: TransitionUniforms,
    pub markers: Vec<Marker>,
    pub effects: EffectSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub params: FrameParams,
    pub events: Vec<EngineEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeardownReport {
    pub displayed_index: usize,
    pub interrupted_transition: bool,
}

/// Owns the GPU-free half of the hero sequence: transitions, autoplay, text
/// sync, pointer state and navigation.
#[derive(Debug)]
pub struct SlideEngine<S> {
    controller: TransitionController,
    autoplay: AutoplayScheduler,
    content: ContentSync<S>,
    pointer: PointerTracker,
    smoother: ActivitySmoother,
    navigation: NavigationIndicator,
    timings: Timings,
    effects: EffectSettings,
    displayed: usize,
    resolution: [u32; 2],
    origin: Option<Instant>,
    lifecycle: Lifecycle,
    autoplay_armed: bool,
    content_shown: bool,
}

impl<S: TextSurface> SlideEngine<S> {
    pub fn new(slides: Vec<Slide>, timings: Timings, effects: EffectSettings, surface: S) -> Self {
        let controller = TransitionController::new(
            slides,
            timings.transition,
            timings.sync_point,
            timings.easing,
        );
        let content = ContentSync::new(
            surface,
            TextTimings {
                exit: timings.text_exit,
                enter: timings.text_enter,
                stagger: timings.text_stagger,
            },
        );
        Self {
            controller,
            autoplay: AutoplayScheduler::new(timings.autoplay_interval),
            content,
            pointer: PointerTracker::new(),
            smoother: ActivitySmoother::new(effects.activity_smoothing),
            navigation: NavigationIndicator::new(),
            timings,
            effects,
            displayed: 0,
            resolution: [1, 1],
            origin: None,
            lifecycle: Lifecycle::Created,
            autoplay_armed: false,
            content_shown: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Mounted
    }

    pub fn state(&self) -> TransitionState {
        self.controller.state()
    }

    pub fn slides(&self) -> &[Slide] {
        self.controller.slides()
    }

    /// Slide whose text is on screen. Switches at the sync point, ahead of
    /// the transition completing.
    pub fn displayed_index(&self) -> usize {
        self.displayed
    }

    pub fn autoplay(&self) -> &AutoplayScheduler {
        &self.autoplay
    }

    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    pub fn navigation(&self) -> &NavigationIndicator {
        &self.navigation
    }

    pub fn surface(&self) -> &S {
        self.content.surface()
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.content.surface_mut()
    }

    pub fn resolution(&self) -> [u32; 2] {
        self.resolution
    }

    pub fn available_count(&self) -> usize {
        self.controller.available_count()
    }

    pub fn mount(&mut self, now: Instant) -> Result<(), EngineError> {
        match self.lifecycle {
            Lifecycle::Unmounted => return Err(EngineError::Unmounted),
            Lifecycle::Mounted => return Ok(()),
            Lifecycle::Created => {}
        }
        self.lifecycle = Lifecycle::Mounted;
        self.origin = Some(now);
        self.settle_if_needed();
        self.navigation.rebuild(self.controller.available_indices());
        self.arm_autoplay(now);
        tracing::info!(
            slides = self.controller.len(),
            available = self.controller.available_count(),
            current = self.controller.current_index(),
            "slide engine mounted"
        );
        Ok(())
    }

    /// Records that the texture for `index` is resident on the GPU.
    pub fn mark_available(&mut self, index: usize, now: Instant) -> Result<bool, EngineError> {
        if self.lifecycle == Lifecycle::Unmounted {
            return Err(EngineError::Unmounted);
        }
        if !self.controller.mark_available(index) {
            return Ok(false);
        }
        self.navigation.rebuild(self.controller.available_indices());
        if self.lifecycle == Lifecycle::Mounted {
            self.settle_if_needed();
            self.arm_autoplay(now);
        }
        Ok(true)
    }

    pub fn frame(&mut self, now: Instant) -> Result<FrameOutput, EngineError> {
        self.ensure_mounted()?;
        let mut events = Vec::new();

        for event in self.controller.update(now) {
            match event {
                TransitionEvent::SyncPoint { target } => {
                    self.displayed = target;
                    if let Some(slide) = self.controller.slide(target) {
                        self.content
                            .swap_text(&slide.title, &slide.description, now);
                    }
                    events.push(EngineEvent::SyncPoint { target });
                }
                TransitionEvent::Completed { index } => {
                    self.displayed = index;
                    events.push(EngineEvent::Completed { index });
                }
            }
        }

        if self.autoplay.poll(now, self.controller.in_flight()) {
            let current = self.controller.current_index();
            if let Some(next) = self.controller.next_available(current) {
                if let RequestOutcome::Started { from, to } =
                    self.controller.request_transition(next, now)
                {
                    tracing::debug!(from, to, "autoplay advance");
                    events.push(EngineEvent::Started { from, to });
                }
            }
        }

        self.content.update(now);
        let activity = self.smoother.step(self.pointer.hovering());

        let time = self
            .origin
            .map(|origin| now.saturating_duration_since(origin).as_secs_f32())
            .unwrap_or(0.0);

        Ok(FrameOutput {
            params: FrameParams {
                resolution: [self.resolution[0] as f32, self.resolution[1] as f32],
                time,
                pointer: PointerState {
                    position: self.pointer.position(),
                    hovering: self.pointer.hovering(),
                    smoothed_activity: activity,
                },
                transition: self.controller.uniforms(),
                markers: self.navigation.markers(self.displayed),
                effects: self.effects,
            },
            events,
        })
    }

    pub fn request_transition(
        &mut self,
        target: usize,
        now: Instant,
    ) -> Result<RequestOutcome, EngineError> {
        self.ensure_mounted()?;
        Ok(self.controller.request_transition(target, now))
    }

    /// Marker click: ignored for the current slide or while a transition runs,
    /// otherwise autoplay stops and the transition starts.
    pub fn click_marker(
        &mut self,
        marker: usize,
        now: Instant,
    ) -> Result<NavigationOutcome, EngineError> {
        self.ensure_mounted()?;
        let Some(slide) = self.navigation.slide_for(marker) else {
            return Ok(NavigationOutcome::UnknownMarker);
        };
        Ok(self.navigate_to(slide, now))
    }

    pub fn step(
        &mut self,
        direction: Direction,
        now: Instant,
    ) -> Result<NavigationOutcome, EngineError> {
        self.ensure_mounted()?;
        let current = self.controller.current_index();
        let target = match direction {
            Direction::Next => self.controller.next_available(current),
            Direction::Previous => self.controller.previous_available(current),
        };
        Ok(match target {
            Some(slide) => self.navigate_to(slide, now),
            None => NavigationOutcome::Ignored(IgnoreReason::Unavailable),
        })
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) -> Result<(), EngineError> {
        self.ensure_live()?;
        let [width, height] = self.resolution;
        self.pointer.handle_move(x, y, width, height);
        Ok(())
    }

    pub fn pointer_entered(&mut self) -> Result<(), EngineError> {
        self.ensure_live()?;
        self.pointer.handle_enter();
        Ok(())
    }

    pub fn pointer_left(&mut self) -> Result<(), EngineError> {
        self.ensure_live()?;
        self.pointer.handle_leave();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), EngineError> {
        self.ensure_live()?;
        self.resolution = [width.max(1), height.max(1)];
        Ok(())
    }

    pub fn set_visible(&mut self, visible: bool, now: Instant) -> Result<(), EngineError> {
        self.ensure_live()?;
        self.autoplay.set_visible(visible, now);
        tracing::debug!(visible, "visibility changed");
        Ok(())
    }

    /// Stops autoplay, abandons running tweens and detaches the pointer. The
    /// engine is inert afterwards; a second call reports `Unmounted`.
    pub fn unmount(&mut self) -> Result<TeardownReport, EngineError> {
        if self.lifecycle == Lifecycle::Unmounted {
            return Err(EngineError::Unmounted);
        }
        let interrupted_transition = self.controller.in_flight();
        self.autoplay.stop();
        self.controller.cancel();
        self.content.cancel();
        self.pointer.detach();
        self.smoother.reset();
        self.lifecycle = Lifecycle::Unmounted;
        tracing::info!(
            displayed = self.displayed,
            interrupted_transition,
            "slide engine unmounted"
        );
        Ok(TeardownReport {
            displayed_index: self.displayed,
            interrupted_transition,
        })
    }

    fn navigate_to(&mut self, slide: usize, now: Instant) -> NavigationOutcome {
        if slide == self.controller.current_index() {
            return NavigationOutcome::Ignored(IgnoreReason::AlreadyCurrent);
        }
        if self.controller.in_flight() {
            return NavigationOutcome::Ignored(IgnoreReason::InFlight);
        }

        self.autoplay.stop();
        match self.controller.request_transition(slide, now) {
            RequestOutcome::Started { from, to } => {
                tracing::debug!(from, to, "manual navigation");
                if let (true, Some(delay)) =
                    (self.timings.autoplay, self.timings.resume_after_navigation)
                {
                    self.autoplay.start(now, delay);
                }
                NavigationOutcome::Started { target: to }
            }
            RequestOutcome::Ignored(reason) => NavigationOutcome::Ignored(reason),
        }
    }

    fn settle_if_needed(&mut self) {
        let current = self.controller.current_index();
        if self.controller.is_available(current) {
            if !self.content_shown {
                self.show_current();
            }
            return;
        }
        let first = self.controller.available_indices().next();
        if let Some(first) = first {
            if self.controller.settle_on(first) {
                self.show_current();
            }
        }
    }

    fn show_current(&mut self) {
        let current = self.controller.current_index();
        self.displayed = current;
        self.content_shown = true;
        if let Some(slide) = self.controller.slide(current) {
            self.content.set_immediate(&slide.title, &slide.description);
        }
    }

    fn arm_autoplay(&mut self, now: Instant) {
        if self.autoplay_armed || !self.timings.autoplay {
            return;
        }
        if self.controller.available_count() < 2 {
            return;
        }
        self.autoplay_armed = true;
        self.autoplay.start(now, self.timings.autoplay_delay);
        tracing::debug!(interval = ?self.timings.autoplay_interval, "autoplay armed");
    }

    fn ensure_mounted(&self) -> Result<(), EngineError> {
        match self.lifecycle {
            Lifecycle::Mounted => Ok(()),
            Lifecycle::Created => Err(EngineError::NotMounted),
            Lifecycle::Unmounted => Err(EngineError::Unmounted),
        }
    }

    fn ensure_live(&self) -> Result<(), EngineError> {
        if self.lifecycle == Lifecycle::Unmounted {
            Err(EngineError::Unmounted)
        } else {
            Ok(())
        }
    }
}
