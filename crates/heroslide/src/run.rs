use std::path::Path;

use anyhow::{Context, Result};
use deckconfig::DeckConfig;
use renderer::{decode_slide, Antialiasing, Renderer, RendererConfig};
use sequencer::{slides_from_deck, Timings};
use tracing_subscriber::EnvFilter;

use crate::cli::{RunArgs, ValidateArgs};

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_deck(path: &Path) -> Result<DeckConfig> {
    DeckConfig::load(path).with_context(|| format!("failed to load deck {}", path.display()))
}

pub fn run(args: RunArgs) -> Result<()> {
    let deck = load_deck(&args.deck)?;
    let config = build_renderer_config(&deck, &args);
    tracing::info!(
        deck = %args.deck.display(),
        slides = config.slides.len(),
        autoplay = config.timings.autoplay,
        interval_ms = config.timings.autoplay_interval.as_millis() as u64,
        "bootstrapping hero"
    );
    Renderer::new(config).run()
}

/// Merges deck settings with command-line overrides.
pub fn build_renderer_config(deck: &DeckConfig, args: &RunArgs) -> RendererConfig {
    let mut timings = Timings::from_deck(deck);
    if args.no_autoplay {
        timings.autoplay = false;
    }
    if let Some(interval) = args.interval {
        timings.autoplay_interval = interval;
    }

    let defaults = RendererConfig::default();
    let target_fps = args
        .fps
        .or(deck.display.fps)
        .filter(|fps| fps.is_finite() && *fps > 0.0);
    let antialiasing = args
        .antialias
        .or(deck.display.antialias.map(Antialiasing::from))
        .unwrap_or_default();

    RendererConfig {
        surface_size: args.size.unwrap_or(defaults.surface_size),
        title: deck.title.clone().unwrap_or(defaults.title),
        slides: slides_from_deck(deck),
        timings,
        effects: deck.effects,
        target_fps,
        antialiasing,
        color_space: args.color_space,
    }
}

pub fn validate(args: ValidateArgs) -> Result<()> {
    let deck = load_deck(&args.deck)?;
    print!("{}", describe_deck(&deck));

    if args.decode {
        let mut failures = 0usize;
        for (index, slide) in deck.slides.iter().enumerate() {
            match decode_slide(index, &slide.media) {
                Ok(decoded) => {
                    println!("  #{index:<2} decoded {}x{}", decoded.width, decoded.height)
                }
                Err(err) => {
                    failures += 1;
                    println!("  #{index:<2} FAILED {}", err.reason);
                }
            }
        }
        if failures > 0 {
            anyhow::bail!("{failures} slide image(s) failed to decode");
        }
    }
    Ok(())
}

pub fn describe_deck(deck: &DeckConfig) -> String {
    use std::fmt::Write;

    let timings = Timings::from_deck(deck);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Deck: {} ({} slides)",
        deck.title.as_deref().unwrap_or("untitled"),
        deck.slides.len()
    );
    let _ = writeln!(
        out,
        "Transition: {:?} (text swap at {:?}, easing {:?})",
        timings.transition,
        timings.sync_offset(),
        timings.easing
    );
    if timings.autoplay {
        let _ = writeln!(
            out,
            "Autoplay: every {:?} after {:?}",
            timings.autoplay_interval, timings.autoplay_delay
        );
    } else {
        let _ = writeln!(out, "Autoplay: off");
    }
    for (index, slide) in deck.slides.iter().enumerate() {
        let present = if Path::new(&slide.media).exists() {
            "ok"
        } else {
            "missing"
        };
        let _ = writeln!(
            out,
            "  #{index:<2} {:<24} {:<7} {} (zoom {}, grain {}, brightness {})",
            slide.title, present, slide.media, slide.zoom, slide.grain, slide.brightness
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use renderer::ColorSpaceMode;

    use super::*;

    const DECK: &str = r#"
version = 1
title = "Harbour"

[display]
fps = 30
antialias = "off"

[engine]
autoplay_interval = "5s"

[[slides]]
title = "Dawn"
media = "/srv/dawn.png"

[[slides]]
title = "Dusk"
media = "/srv/dusk.png"
zoom = 1.2
"#;

    fn run_args() -> RunArgs {
        RunArgs {
            deck: PathBuf::from("deck.toml"),
            size: None,
            fps: None,
            antialias: None,
            color_space: ColorSpaceMode::Auto,
            no_autoplay: false,
            interval: None,
        }
    }

    #[test]
    fn deck_settings_flow_into_renderer_config() {
        let deck = DeckConfig::from_toml_str(DECK).unwrap();
        let config = build_renderer_config(&deck, &run_args());
        assert_eq!(config.title, "Harbour");
        assert_eq!(config.slides.len(), 2);
        assert_eq!(config.target_fps, Some(30.0));
        assert_eq!(config.antialiasing, Antialiasing::Off);
        assert_eq!(config.timings.autoplay_interval, Duration::from_secs(5));
        assert_eq!(config.surface_size, (1600, 900));
    }

    #[test]
    fn cli_overrides_win() {
        let deck = DeckConfig::from_toml_str(DECK).unwrap();
        let args = RunArgs {
            size: Some((640, 360)),
            fps: Some(0.0),
            antialias: Some(Antialiasing::Samples(4)),
            no_autoplay: true,
            interval: Some(Duration::from_secs(9)),
            ..run_args()
        };
        let config = build_renderer_config(&deck, &args);
        assert_eq!(config.surface_size, (640, 360));
        assert_eq!(config.target_fps, None);
        assert_eq!(config.antialiasing, Antialiasing::Samples(4));
        assert!(!config.timings.autoplay);
        assert_eq!(config.timings.autoplay_interval, Duration::from_secs(9));
    }

    #[test]
    fn description_lists_every_slide() {
        let deck = DeckConfig::from_toml_str(DECK).unwrap();
        let text = describe_deck(&deck);
        assert!(text.starts_with("Deck: Harbour (2 slides)"));
        assert!(text.contains("Dawn"));
        assert!(text.contains("Dusk"));
        assert!(text.contains("missing"));
    }
}
