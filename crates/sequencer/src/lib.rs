//! GPU-free sequencing for the hero slide engine.
//!
//! Everything here takes time as an explicit `Instant`, so hosts drive it from
//! their frame loop and tests drive it with synthetic clocks.

pub mod autoplay;
pub mod content;
pub mod engine;
pub mod navigation;
pub mod pointer;
pub mod slide;
pub mod transition;
pub mod tween;

pub use autoplay::AutoplayScheduler;
pub use content::{ContentSync, TextFrame, TextPhase, TextSurface, TextTimings};
pub use engine::{
    Direction, EngineError, EngineEvent, FrameOutput, FrameParams, SlideEngine,
    TeardownReport,
};
pub use navigation::{Marker, NavigationIndicator, NavigationOutcome};
pub use pointer::{ActivitySmoother, PointerState, PointerTracker};
pub use slide::{slides_from_deck, Slide, SlideLook, Timings};
pub use transition::{
    IgnoreReason, RequestOutcome, TextureSlots, TransitionController, TransitionEvent,
    TransitionState, TransitionUniforms,
};
pub use tween::{Easing, Tween};
