use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use renderer::{Antialiasing, ColorSpaceMode};

#[derive(Parser, Debug)]
#[command(
    name = "heroslide",
    author,
    version,
    about = "Animated slide-transition hero window"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a window and play the deck.
    Run(RunArgs),
    /// Parse a deck and print the resolved slides and timings.
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Deck TOML file describing the slides.
    #[arg(value_name = "DECK")]
    pub deck: PathBuf,

    /// Window size in physical pixels (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Frame rate cap; overrides `display.fps` (0 = uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count.
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<Antialiasing>,

    /// Output color space handling: `auto`, `gamma`, or `linear`.
    #[arg(
        long,
        value_name = "MODE",
        value_parser = parse_color_space,
        default_value = "auto"
    )]
    pub color_space: ColorSpaceMode,

    /// Disable autoplay regardless of the deck setting.
    #[arg(long)]
    pub no_autoplay: bool,

    /// Override the autoplay interval (e.g. `6s`, `2500ms`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub interval: Option<Duration>,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Deck TOML file to check.
    #[arg(value_name = "DECK")]
    pub deck: PathBuf,

    /// Also decode every slide image and report its dimensions.
    #[arg(long)]
    pub decode: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{value}'; expected WIDTHxHEIGHT"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in '{value}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in '{value}'"))?;
    if width == 0 || height == 0 {
        return Err(format!("size '{value}' must be non-zero in both dimensions"));
    }
    Ok((width, height))
}

pub fn parse_antialias(value: &str) -> Result<Antialiasing, String> {
    deckconfig::parse_antialias(value).map(Antialiasing::from)
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceMode, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "auto" | "default" => Ok(ColorSpaceMode::Auto),
        "gamma" | "srgb" => Ok(ColorSpaceMode::Gamma),
        "linear" => Ok(ColorSpaceMode::Linear),
        other => Err(format!(
            "unknown color space '{other}' (expected auto, gamma, or linear)"
        )),
    }
}

pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    let duration = match trimmed.parse::<f64>() {
        Ok(seconds) if seconds.is_sign_negative() => {
            return Err(format!("duration '{value}' must be non-negative"));
        }
        Ok(seconds) => Duration::try_from_secs_f64(seconds)
            .map_err(|err| format!("invalid duration '{value}': {err}"))?,
        Err(_) => humantime::parse_duration(trimmed)
            .map_err(|err| format!("invalid duration '{value}': {err}"))?,
    };
    if duration.is_zero() {
        return Err(format!("duration '{value}' must be greater than zero"));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_surface_sizes() {
        assert_eq!(parse_surface_size("1280x720"), Ok((1280, 720)));
        assert_eq!(parse_surface_size(" 800 X 600 "), Ok((800, 600)));
        assert!(parse_surface_size("0x600").is_err());
        assert!(parse_surface_size("wide").is_err());
    }

    #[test]
    fn parses_durations_with_units() {
        assert_eq!(parse_duration("6"), Ok(Duration::from_secs(6)));
        assert_eq!(parse_duration("2500ms"), Ok(Duration::from_millis(2500)));
        assert_eq!(parse_duration("1s 500ms"), Ok(Duration::from_millis(1500)));
        assert_eq!(parse_duration("0.5"), Ok(Duration::from_millis(500)));
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("-1").is_err());
    }

    #[test]
    fn rejects_zero_and_oversized_durations() {
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("0ms").is_err());
        assert!(parse_duration("1e30").is_err());
        assert!(parse_duration("inf").is_err());
        assert!(parse_duration("NaN").is_err());

        let err = Cli::try_parse_from(["heroslide", "run", "deck.toml", "--interval", "1e30"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn antialias_accepts_sample_counts() {
        assert_eq!(parse_antialias("4"), Ok(Antialiasing::Samples(4)));
        assert_eq!(parse_antialias("off"), Ok(Antialiasing::Off));
        assert!(parse_antialias("3").is_err());
    }

    #[test]
    fn run_subcommand_parses_overrides() {
        let cli = Cli::try_parse_from([
            "heroslide",
            "run",
            "deck.toml",
            "--size",
            "640x360",
            "--no-autoplay",
            "--interval",
            "3s",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.deck, PathBuf::from("deck.toml"));
        assert_eq!(args.size, Some((640, 360)));
        assert!(args.no_autoplay);
        assert_eq!(args.interval, Some(Duration::from_secs(3)));
        assert_eq!(args.color_space, ColorSpaceMode::Auto);
    }
}
