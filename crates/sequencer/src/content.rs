use std::time::{Duration, Instant};

use crate::tween::Easing;

/// Vertical travel of the text block during exit, in logical pixels.
const EXIT_OFFSET: f32 = -24.0;
/// Starting offset of the text block during enter, in logical pixels.
const ENTER_OFFSET: f32 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPhase {
    Exit,
    Enter,
    Settled,
}

/// One presentation step of the text block.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFrame {
    pub phase: TextPhase,
    pub opacity: f32,
    pub offset: f32,
    /// Reveal amount for each character of the title, staggered left to right.
    pub glyph_opacity: Vec<f32>,
}

impl TextFrame {
    pub fn settled(title: &str) -> Self {
        Self {
            phase: TextPhase::Settled,
            opacity: 1.0,
            offset: 0.0,
            glyph_opacity: vec![1.0; title.chars().count()],
        }
    }
}

/// Host-provided sink for the title and description of the displayed slide.
pub trait TextSurface {
    fn set_content(&mut self, title: &str, description: &str);
    fn present(&mut self, frame: &TextFrame);
}

#[derive(Debug, Clone, Copy)]
pub struct TextTimings {
    pub exit: Duration,
    pub enter: Duration,
    pub stagger: Duration,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Exit {
        start: Instant,
        title: String,
        description: String,
    },
    Enter {
        start: Instant,
        glyphs: usize,
    },
}

/// Sequences the exit, content replacement and enter animation of the text block.
#[derive(Debug)]
pub struct ContentSync<S> {
    surface: S,
    timings: TextTimings,
    phase: Phase,
}

impl<S: TextSurface> ContentSync<S> {
    pub fn new(surface: S, timings: TextTimings) -> Self {
        Self {
            surface,
            timings,
            phase: Phase::Idle,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn is_animating(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Shows content without animating, used for the first slide.
    pub fn set_immediate(&mut self, title: &str, description: &str) {
        self.phase = Phase::Idle;
        self.surface.set_content(title, description);
        self.surface.present(&TextFrame::settled(title));
    }

    /// Starts the exit phase. The new content is applied once the exit has
    /// finished, followed by the enter phase. A swap issued mid-animation
    /// restarts from the exit phase with the newest content.
    pub fn swap_text(&mut self, title: &str, description: &str, now: Instant) {
        self.phase = Phase::Exit {
            start: now,
            title: title.to_owned(),
            description: description.to_owned(),
        };
        self.update(now);
    }

    /// Drives the running animation. Returns true while animating.
    pub fn update(&mut self, now: Instant) -> bool {
        if let Phase::Exit { start, .. } = &self.phase {
            let start = *start;
            let t = fraction(now, start, self.timings.exit);
            if t < 1.0 {
                let eased = Easing::EaseInOut.sample(t);
                self.surface.present(&TextFrame {
                    phase: TextPhase::Exit,
                    opacity: 1.0 - eased,
                    offset: EXIT_OFFSET * eased,
                    glyph_opacity: Vec::new(),
                });
                return true;
            }

            let Phase::Exit {
                title, description, ..
            } = std::mem::replace(&mut self.phase, Phase::Idle)
            else {
                return false;
            };
            self.surface.set_content(&title, &description);
            self.phase = Phase::Enter {
                start: start + self.timings.exit,
                glyphs: title.chars().count(),
            };
        }

        if let Phase::Enter { start, glyphs } = self.phase {
            let frame = self.enter_frame(now, start, glyphs);
            let done = frame.phase == TextPhase::Settled;
            self.surface.present(&frame);
            if done {
                self.phase = Phase::Idle;
            }
            return !done;
        }

        false
    }

    /// Abandons any running animation.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }

    fn enter_frame(&self, now: Instant, start: Instant, glyphs: usize) -> TextFrame {
        let t = fraction(now, start, self.timings.enter);
        let eased = Easing::EaseOut.sample(t);
        let elapsed = now.saturating_duration_since(start);
        let glyph_opacity: Vec<f32> = (0..glyphs)
            .map(|i| {
                let delay = self.timings.stagger * i as u32;
                let local = elapsed.saturating_sub(delay);
                Easing::EaseOut.sample(ratio(local, self.timings.enter))
            })
            .collect();
        let settled = t >= 1.0 && glyph_opacity.iter().all(|value| *value >= 1.0);
        TextFrame {
            phase: if settled {
                TextPhase::Settled
            } else {
                TextPhase::Enter
            },
            opacity: eased,
            offset: ENTER_OFFSET * (1.0 - eased),
            glyph_opacity,
        }
    }
}

fn fraction(now: Instant, start: Instant, span: Duration) -> f32 {
    ratio(now.saturating_duration_since(start), span)
}

fn ratio(elapsed: Duration, span: Duration) -> f32 {
    if span.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / span.as_secs_f32()).clamp(0.0, 1.0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Debug, Default)]
    pub(crate) struct RecordingSurface {
        pub contents: Vec<(String, String)>,
        pub frames: Vec<TextFrame>,
    }

    impl TextSurface for RecordingSurface {
        fn set_content(&mut self, title: &str, description: &str) {
            self.contents.push((title.to_owned(), description.to_owned()));
        }

        fn present(&mut self, frame: &TextFrame) {
            self.frames.push(frame.clone());
        }
    }

    fn timings() -> TextTimings {
        TextTimings {
            exit: Duration::from_millis(300),
            enter: Duration::from_millis(600),
            stagger: Duration::from_millis(20),
        }
    }

    #[test]
    fn content_changes_only_after_exit() {
        let start = Instant::now();
        let mut sync = ContentSync::new(RecordingSurface::default(), timings());
        sync.swap_text("Harbour", "Late sets", start);
        assert!(sync.surface().contents.is_empty());

        sync.update(start + Duration::from_millis(150));
        assert!(sync.surface().contents.is_empty());
        let frame = sync.surface().frames.last().unwrap();
        assert_eq!(frame.phase, TextPhase::Exit);
        assert!(frame.opacity < 1.0 && frame.opacity > 0.0);

        sync.update(start + Duration::from_millis(310));
        assert_eq!(
            sync.surface().contents,
            vec![("Harbour".to_owned(), "Late sets".to_owned())]
        );
        assert_eq!(sync.surface().frames.last().unwrap().phase, TextPhase::Enter);
    }

    #[test]
    fn enter_staggers_glyphs_and_settles() {
        let start = Instant::now();
        let mut sync = ContentSync::new(RecordingSurface::default(), timings());
        sync.swap_text("abc", "", start);

        sync.update(start + Duration::from_millis(400));
        let frame = sync.surface().frames.last().unwrap().clone();
        assert_eq!(frame.glyph_opacity.len(), 3);
        assert!(frame.glyph_opacity[0] > frame.glyph_opacity[1]);
        assert!(frame.glyph_opacity[1] > frame.glyph_opacity[2]);

        // exit + enter + two stagger steps
        assert!(!sync.update(start + Duration::from_millis(940)));
        assert!(!sync.is_animating());
        let last = sync.surface().frames.last().unwrap();
        assert_eq!(last.phase, TextPhase::Settled);
        assert_eq!(last.opacity, 1.0);
    }

    #[test]
    fn late_update_jumps_straight_to_settled() {
        let start = Instant::now();
        let mut sync = ContentSync::new(RecordingSurface::default(), timings());
        sync.swap_text("Rooftop", "", start);
        sync.update(start + Duration::from_secs(10));
        assert_eq!(sync.surface().contents.len(), 1);
        assert_eq!(
            sync.surface().frames.last().unwrap().phase,
            TextPhase::Settled
        );
    }

    #[test]
    fn cancel_stops_without_applying_content() {
        let start = Instant::now();
        let mut sync = ContentSync::new(RecordingSurface::default(), timings());
        sync.swap_text("Rooftop", "", start);
        sync.cancel();
        assert!(!sync.update(start + Duration::from_secs(1)));
        assert!(sync.surface().contents.is_empty());
    }

    #[test]
    fn set_immediate_presents_settled_frame() {
        let mut sync = ContentSync::new(RecordingSurface::default(), timings());
        sync.set_immediate("Opening", "Doors at nine");
        assert_eq!(sync.surface().contents.len(), 1);
        assert_eq!(sync.surface().frames[0], TextFrame::settled("Opening"));
    }
}
