use std::time::Duration;

use deckconfig::{DeckConfig, EngineSettings, SlideConfig, TextSettings};

use crate::tween::Easing;

/// Per-slide shader parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideLook {
    pub zoom: f32,
    pub grain: f32,
    pub brightness: f32,
}

impl Default for SlideLook {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            grain: 0.0,
            brightness: 1.0,
        }
    }
}

/// One entry of the hero sequence. The position in the sequence is its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub title: String,
    pub description: String,
    pub media_ref: String,
    pub look: SlideLook,
}

impl Slide {
    pub fn new(title: impl Into<String>, media_ref: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            media_ref: media_ref.into(),
            look: SlideLook::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_look(mut self, look: SlideLook) -> Self {
        self.look = look;
        self
    }
}

impl From<&SlideConfig> for Slide {
    fn from(config: &SlideConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            media_ref: config.media.clone(),
            look: SlideLook {
                zoom: config.zoom,
                grain: config.grain,
                brightness: config.brightness,
            },
        }
    }
}

pub fn slides_from_deck(deck: &DeckConfig) -> Vec<Slide> {
    deck.slides.iter().map(Slide::from).collect()
}

/// Timing knobs shared by the transition controller, autoplay and text sync.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timings {
    pub transition: Duration,
    pub sync_point: f32,
    pub easing: Easing,
    pub autoplay: bool,
    pub autoplay_interval: Duration,
    pub autoplay_delay: Duration,
    pub resume_after_navigation: Option<Duration>,
    pub text_exit: Duration,
    pub text_enter: Duration,
    pub text_stagger: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self::from_settings(&EngineSettings::default(), &TextSettings::default())
    }
}

impl Timings {
    pub fn from_settings(engine: &EngineSettings, text: &TextSettings) -> Self {
        Self {
            transition: engine.transition,
            sync_point: engine.sync_point.clamp(0.0, 1.0),
            easing: engine.easing.into(),
            autoplay: engine.autoplay,
            autoplay_interval: engine.autoplay_interval,
            autoplay_delay: engine.autoplay_delay.unwrap_or(Duration::ZERO),
            resume_after_navigation: engine.resume_after_navigation,
            text_exit: text.exit,
            text_enter: text.enter,
            text_stagger: text.stagger,
        }
    }

    pub fn from_deck(deck: &DeckConfig) -> Self {
        Self::from_settings(&deck.engine, &deck.text)
    }

    /// Offset from the start of a transition at which text content swaps.
    pub fn sync_offset(&self) -> Duration {
        self.transition.mul_f32(self.sync_point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timings_follow_engine_defaults() {
        let timings = Timings::default();
        assert_eq!(timings.transition, Duration::from_millis(1500));
        assert_eq!(timings.autoplay_interval, Duration::from_secs(4));
        assert_eq!(timings.easing, Easing::EaseInOut);
        let offset = timings.sync_offset();
        assert!(offset > Duration::from_millis(490) && offset < Duration::from_millis(500));
    }

    #[test]
    fn slides_carry_look_from_deck() {
        let deck = DeckConfig::from_toml_str(
            r#"
version = 1

[[slides]]
title = "Harbour"
description = "Late sets by the water"
media = "harbour.jpg"
zoom = 1.2
grain = 0.05
"#,
        )
        .unwrap();
        let slides = slides_from_deck(&deck);
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].media_ref, "harbour.jpg");
        assert_eq!(
            slides[0].look,
            SlideLook {
                zoom: 1.2,
                grain: 0.05,
                brightness: 1.0
            }
        );
    }
}
