use anyhow::{Context, Result};
use chrono::DateTime;
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, Text};
use std::path::PathBuf;
use watchface_core::{
    Bounds, Config, FileDataSource, FixedClock, RecordingCanvas, SystemClock, TapKind, TimeSource,
    WatchFace, WeatherDataSource, classify,
};

use crate::host;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "watchface", version, about = "Weather watch face")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the icon category for weather condition codes.
    Classify {
        /// Weather condition codes, e.g. 800.
        #[arg(required = true, allow_negative_numbers = true)]
        codes: Vec<i32>,
    },

    /// Interactively edit display settings.
    Configure,

    /// Draw a single frame and print its draw commands.
    Render(RenderArgs),

    /// Run the face in a simulated host, printing every frame.
    Run(RunArgs),
}

/// Overrides for the configured display settings.
#[derive(Debug, Args)]
pub struct FaceArgs {
    /// Start in ambient mode.
    #[arg(long)]
    pub ambient: bool,

    /// Use the round screen layout.
    #[arg(long)]
    pub round: bool,

    /// Use 24-hour time.
    #[arg(long = "24h")]
    pub use_24_hour: bool,

    /// Panel supports only low-bit color in ambient mode.
    #[arg(long)]
    pub low_bit: bool,

    /// JSON file with weather data events.
    #[arg(long)]
    pub events: Option<PathBuf>,
}

impl FaceArgs {
    fn apply(&self, config: &mut Config) {
        config.display.round |= self.round;
        config.display.use_24_hour |= self.use_24_hour;
        config.display.low_bit_ambient |= self.low_bit;
        if let Some(events) = &self.events {
            config.data.events_file = Some(events.clone());
        }
    }
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub face: FaceArgs,

    /// Instant to draw, RFC 3339. Defaults to now.
    #[arg(long)]
    pub at: Option<String>,

    /// Number of completed taps before drawing.
    #[arg(long, default_value_t = 0)]
    pub taps: u32,

    #[arg(long, default_value_t = 320.0)]
    pub width: f32,

    #[arg(long, default_value_t = 320.0)]
    pub height: f32,

    /// Print commands as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub face: FaceArgs,

    /// Number of timer ticks before exiting.
    #[arg(long, default_value_t = 10)]
    pub ticks: u32,

    #[arg(long, default_value_t = 320.0)]
    pub width: f32,

    #[arg(long, default_value_t = 320.0)]
    pub height: f32,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Classify { codes } => {
                for code in codes {
                    println!("{code}\t{}", classify(code));
                }
            }
            Command::Configure => configure()?,
            Command::Render(args) => render(args).await?,
            Command::Run(args) => run(args).await?,
        }

        Ok(())
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    config.display.use_24_hour = Confirm::new("Use 24-hour time?")
        .with_default(config.display.use_24_hour)
        .prompt()?;
    config.display.round = Confirm::new("Is the screen round?")
        .with_default(config.display.round)
        .prompt()?;
    config.display.low_bit_ambient = Confirm::new("Low-bit ambient display?")
        .with_default(config.display.low_bit_ambient)
        .prompt()?;

    let current = config
        .data
        .events_file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let events = Text::new("Weather events file (empty for none):")
        .with_initial_value(&current)
        .prompt()?;
    config.data.events_file = Some(events.trim()).filter(|s| !s.is_empty()).map(PathBuf::from);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

fn parse_at(value: &str) -> Result<FixedClock> {
    let instant = DateTime::parse_from_rfc3339(value).with_context(|| {
        format!("Invalid --at '{value}'. Expected RFC 3339, e.g. 2026-10-18T09:30:00+02:00.")
    })?;
    Ok(FixedClock(instant))
}

fn build_face(args: &FaceArgs) -> Result<(Config, WatchFace)> {
    let mut config = Config::load()?;
    args.apply(&mut config);

    let mut face = WatchFace::new(&config);
    face.on_visibility_changed(true);
    face.on_ambient_mode_changed(args.ambient);

    Ok((config, face))
}

fn data_source(config: &Config) -> Option<FileDataSource> {
    let events = config.events_file().ok()?;
    let source = FileDataSource::new(events);
    Some(match &config.data.outbox_file {
        Some(outbox) => source.with_outbox(outbox),
        None => source,
    })
}

async fn render(args: RenderArgs) -> Result<()> {
    let (config, mut face) = build_face(&args.face)?;

    if let Some(mut source) = data_source(&config) {
        source.connect().await?;
        let events = source
            .poll_events()
            .await
            .with_context(|| {
                format!("Failed to load weather events from {}", source.events_path().display())
            })?;
        face.on_data_events(&events);
        source.disconnect().await;
    }

    for _ in 0..args.taps {
        face.on_tap(TapKind::Tap);
    }

    let clock: Box<dyn TimeSource> = match &args.at {
        Some(at) => Box::new(parse_at(at)?),
        None => Box::new(SystemClock),
    };

    let mut canvas = RecordingCanvas::new();
    face.draw(&mut canvas, Bounds::new(args.width, args.height), &clock.now());

    if args.json {
        let json = serde_json::to_string_pretty(canvas.commands())
            .context("Failed to serialize draw commands")?;
        println!("{json}");
    } else {
        for command in canvas.commands() {
            println!("{command}");
        }
    }

    Ok(())
}

async fn run(args: RunArgs) -> Result<()> {
    let (config, mut face) = build_face(&args.face)?;
    let mut source = data_source(&config);
    let stdout = std::io::stdout();

    host::run(
        &mut face,
        source.as_mut().map(|s| s as &mut dyn WeatherDataSource),
        &SystemClock,
        Bounds::new(args.width, args.height),
        args.ticks,
        &mut stdout.lock(),
    )
    .await
}
