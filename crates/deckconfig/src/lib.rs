//! Slide deck configuration.
//!
//! A deck is a TOML document listing the slides of the hero sequence plus the
//! timing and effect settings used by the engine. Durations accept either a
//! number of seconds or a human readable string such as `"1.5s"` or `"300ms"`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Upper bound on the number of slides in one deck. The shader draws one
/// navigation marker per slide and loops over a fixed-size range.
pub const MAX_SLIDES: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read deck {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse deck: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid deck: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeckConfig {
    pub version: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub text: TextSettings,
    #[serde(default)]
    pub effects: EffectSettings,
    #[serde(default)]
    pub slides: Vec<SlideConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DisplaySettings {
    pub fps: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_antialias_opt")]
    pub antialias: Option<AntialiasSetting>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }
}

/// Easing curve applied to transition tweens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EasingSetting {
    Linear,
    Smoothstep,
    #[default]
    EaseInOut,
    EaseOut,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineSettings {
    #[serde(
        default = "default_transition",
        deserialize_with = "deserialize_duration"
    )]
    pub transition: Duration,
    /// Fraction of the transition at which the text swap starts.
    #[serde(default = "default_sync_point")]
    pub sync_point: f32,
    #[serde(default = "default_true")]
    pub autoplay: bool,
    #[serde(
        default = "default_autoplay_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub autoplay_interval: Duration,
    #[serde(default, deserialize_with = "deserialize_duration_opt")]
    pub autoplay_delay: Option<Duration>,
    #[serde(default, deserialize_with = "deserialize_duration_opt")]
    pub resume_after_navigation: Option<Duration>,
    #[serde(default)]
    pub easing: EasingSetting,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            transition: default_transition(),
            sync_point: default_sync_point(),
            autoplay: true,
            autoplay_interval: default_autoplay_interval(),
            autoplay_delay: None,
            resume_after_navigation: None,
            easing: EasingSetting::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextSettings {
    #[serde(default = "default_text_exit", deserialize_with = "deserialize_duration")]
    pub exit: Duration,
    #[serde(
        default = "default_text_enter",
        deserialize_with = "deserialize_duration"
    )]
    pub enter: Duration,
    #[serde(
        default = "default_text_stagger",
        deserialize_with = "deserialize_duration"
    )]
    pub stagger: Duration,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            exit: default_text_exit(),
            enter: default_text_enter(),
            stagger: default_text_stagger(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EffectSettings {
    pub wave_amplitude: f32,
    pub wave_frequency: f32,
    pub wave_speed: f32,
    pub ripple_radius: f32,
    pub ripple_frequency: f32,
    pub ripple_speed: f32,
    pub ripple_strength: f32,
    /// Per-frame approach factor for the pointer activity value.
    pub activity_smoothing: f32,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            wave_amplitude: 0.0025,
            wave_frequency: 8.0,
            wave_speed: 0.6,
            ripple_radius: 0.25,
            ripple_frequency: 40.0,
            ripple_speed: 6.0,
            ripple_strength: 0.012,
            activity_smoothing: 0.08,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlideConfig {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub media: String,
    #[serde(default = "default_zoom")]
    pub zoom: f32,
    #[serde(default)]
    pub grain: f32,
    #[serde(default = "default_brightness")]
    pub brightness: f32,
}

impl SlideConfig {
    /// Resolves `media` against `base`. Absolute paths are returned unchanged.
    pub fn media_path(&self, base: &Path) -> PathBuf {
        let media = Path::new(&self.media);
        if media.is_absolute() {
            media.to_path_buf()
        } else {
            base.join(media)
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_transition() -> Duration {
    Duration::from_millis(1500)
}

fn default_sync_point() -> f32 {
    0.33
}

fn default_autoplay_interval() -> Duration {
    Duration::from_secs(4)
}

fn default_text_exit() -> Duration {
    Duration::from_millis(300)
}

fn default_text_enter() -> Duration {
    Duration::from_millis(700)
}

fn default_text_stagger() -> Duration {
    Duration::from_millis(25)
}

fn default_zoom() -> f32 {
    1.0
}

fn default_brightness() -> f32 {
    1.0
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_duration_opt(deserializer)?
        .ok_or_else(|| de::Error::custom("duration may not be empty"))
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v.trim())
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            Some(parse_antialias(&value.to_string()).map_err(de::Error::custom)?)
        }
    };
    Ok(result)
}

pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" => Ok(AntialiasSetting::Samples2),
        "4" => Ok(AntialiasSetting::Samples4),
        "8" => Ok(AntialiasSetting::Samples8),
        "16" => Ok(AntialiasSetting::Samples16),
        other => Err(format!("invalid antialias setting '{other}'")),
    }
}

impl DeckConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: DeckConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads and validates a deck file. Relative media paths are rewritten
    /// against the directory containing the deck.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut deck = Self::from_toml_str(&contents)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for slide in &mut deck.slides {
            slide.media = slide.media_path(base).to_string_lossy().into_owned();
        }
        Ok(deck)
    }

    pub fn slide(&self, index: usize) -> Option<&SlideConfig> {
        self.slides.get(index)
    }

    pub fn autoplay_delay(&self) -> Duration {
        self.engine.autoplay_delay.unwrap_or(Duration::ZERO)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported deck version {}; expected 1",
                self.version
            )));
        }

        if self.slides.is_empty() {
            return Err(ConfigError::Invalid(
                "deck must define at least one slide".into(),
            ));
        }

        if self.slides.len() > MAX_SLIDES {
            return Err(ConfigError::Invalid(format!(
                "deck defines {} slides; at most {MAX_SLIDES} are supported",
                self.slides.len()
            )));
        }

        let engine = &self.engine;
        if engine.transition.is_zero() {
            return Err(ConfigError::Invalid(
                "engine.transition must be greater than zero".into(),
            ));
        }

        if !(engine.sync_point > 0.0 && engine.sync_point < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "engine.sync_point must lie strictly between 0 and 1 (got {})",
                engine.sync_point
            )));
        }

        if engine.autoplay_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "engine.autoplay_interval must be greater than zero".into(),
            ));
        }

        let smoothing = self.effects.activity_smoothing;
        if !(smoothing > 0.0 && smoothing <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "effects.activity_smoothing must be in (0, 1] (got {smoothing})"
            )));
        }

        if self.effects.ripple_radius <= 0.0 {
            return Err(ConfigError::Invalid(
                "effects.ripple_radius must be greater than zero".into(),
            ));
        }

        if let Some(fps) = self.display.fps {
            if fps < 0.0 {
                return Err(ConfigError::Invalid("display.fps must be >= 0".into()));
            }
        }

        for (index, slide) in self.slides.iter().enumerate() {
            if slide.media.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "slide {index} ('{}') has an empty media path",
                    slide.title
                )));
            }

            if !(slide.zoom > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "slide {index} ('{}') zoom must be > 0",
                    slide.title
                )));
            }

            if slide.grain < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "slide {index} ('{}') grain must be >= 0",
                    slide.title
                )));
            }

            if slide.brightness < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "slide {index} ('{}') brightness must be >= 0",
                    slide.title
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1
title = "Nightlife"

[display]
fps = 60
antialias = 4

[engine]
transition = "1.5s"
sync_point = 0.33
autoplay_interval = 4
resume_after_navigation = "8s"
easing = "ease-out"

[text]
exit = "250ms"

[effects]
wave_amplitude = 0.003

[[slides]]
title = "Rooftop"
description = "Open-air terraces across the city"
media = "images/rooftop.jpg"
zoom = 1.1
grain = 0.04

[[slides]]
title = "Basement"
media = "/srv/media/basement.png"
brightness = 0.8
"#;

    #[test]
    fn parses_sample_deck() {
        let deck = DeckConfig::from_toml_str(SAMPLE).expect("parse deck");
        assert_eq!(deck.version, 1);
        assert_eq!(deck.title.as_deref(), Some("Nightlife"));
        assert_eq!(deck.slides.len(), 2);
        assert_eq!(deck.display.antialias, Some(AntialiasSetting::Samples4));
        assert_eq!(deck.engine.transition, Duration::from_millis(1500));
        assert_eq!(deck.engine.autoplay_interval, Duration::from_secs(4));
        assert_eq!(
            deck.engine.resume_after_navigation,
            Some(Duration::from_secs(8))
        );
        assert_eq!(deck.engine.easing, EasingSetting::EaseOut);
        assert_eq!(deck.text.exit, Duration::from_millis(250));
        assert_eq!(deck.text.enter, Duration::from_millis(700));
        assert!((deck.effects.wave_amplitude - 0.003).abs() < f32::EPSILON);
        assert!((deck.effects.ripple_radius - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn applies_slide_defaults() {
        let deck = DeckConfig::from_toml_str(SAMPLE).unwrap();
        let basement = deck.slide(1).unwrap();
        assert_eq!(basement.description, "");
        assert_eq!(basement.zoom, 1.0);
        assert_eq!(basement.grain, 0.0);
        assert_eq!(basement.brightness, 0.8);
        assert!(deck.engine.autoplay);
        assert_eq!(deck.autoplay_delay(), Duration::ZERO);
    }

    #[test]
    fn rejects_empty_deck() {
        let err = DeckConfig::from_toml_str("version = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_sync_point_outside_transition() {
        let deck = r#"
version = 1

[engine]
sync_point = 1.0

[[slides]]
title = "A"
media = "a.png"
"#;
        let err = DeckConfig::from_toml_str(deck).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("sync_point")));
    }

    #[test]
    fn rejects_non_positive_zoom() {
        let deck = r#"
version = 1

[[slides]]
title = "A"
media = "a.png"
zoom = 0
"#;
        let err = DeckConfig::from_toml_str(deck).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("zoom")));
    }

    #[test]
    fn rejects_bad_duration_string() {
        let deck = r#"
version = 1

[engine]
transition = "soon"

[[slides]]
title = "A"
media = "a.png"
"#;
        let err = DeckConfig::from_toml_str(deck).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_out_of_range_duration() {
        let deck = r#"
version = 1

[engine]
transition = 1e30

[[slides]]
title = "A"
media = "a.png"
"#;
        let err = DeckConfig::from_toml_str(deck).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_resolves_media_relative_to_deck() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.toml");
        fs::write(&path, SAMPLE).unwrap();

        let deck = DeckConfig::load(&path).unwrap();
        assert_eq!(
            PathBuf::from(&deck.slides[0].media),
            dir.path().join("images/rooftop.jpg")
        );
        assert_eq!(deck.slides[1].media, "/srv/media/basement.png");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DeckConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
