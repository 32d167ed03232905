// src/main.rs
use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use spectroscroll::{
    app::App,
    config::Settings,
    spectrogram::{validate_fft_size, ColorConfig},
    ui,
};

/// Play an audio file and draw its scrolling spectrogram in the terminal.
#[derive(Parser, Debug)]
#[command(name = "spectroscroll", version, about)]
struct Args {
    /// Audio file to play
    file: PathBuf,

    /// Settings file (default: <config dir>/spectroscroll/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file (default: <cache dir>/spectroscroll/spectroscroll.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// FFT size, a power of two between 32 and 32768
    #[arg(long, value_parser = parse_fft_size)]
    fft_size: Option<usize>,

    /// Lowest displayed frequency in Hz
    #[arg(long)]
    min_freq: Option<f32>,

    /// Highest displayed frequency in Hz
    #[arg(long)]
    max_freq: Option<f32>,

    /// Logarithmic frequency axis
    #[arg(long)]
    log: bool,

    /// Color by hue instead of grayscale
    #[arg(long)]
    hue: bool,

    /// Exponential intensity curve
    #[arg(long)]
    log_intensity: bool,

    /// Steepness of the intensity curve
    #[arg(long, value_parser = parse_intensity)]
    intensity: Option<f32>,

    /// Number of axis ticks
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    ticks: Option<u32>,

    /// Hide the frequency axis
    #[arg(long)]
    no_labels: bool,

    /// Pixels scrolled per frame
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    speed: Option<u32>,
}

fn parse_fft_size(s: &str) -> Result<usize, String> {
    let size = s.parse::<usize>().map_err(|e| e.to_string())?;
    validate_fft_size(size).map_err(|e| e.to_string())
}

fn parse_intensity(s: &str) -> Result<f32, String> {
    let factor = s.parse::<f32>().map_err(|e| e.to_string())?;
    ColorConfig::default()
        .set_intensity_factor(factor)
        .map_err(|e| e.to_string())?;
    Ok(factor)
}

impl Args {
    /// Flags given on the command line win over the settings file.
    fn apply(&self, settings: &mut Settings) {
        if let Some(size) = self.fft_size {
            settings.analysis.fft_size = size;
        }
        if let Some(min) = self.min_freq {
            settings.scale.min_frequency = min;
        }
        if let Some(max) = self.max_freq {
            settings.scale.max_frequency = max;
        }
        if self.log {
            settings.scale.logarithmic = true;
        }
        if self.hue {
            settings.color.use_hue = true;
        }
        if self.log_intensity {
            settings.color.logarithmic_intensity = true;
        }
        if let Some(factor) = self.intensity {
            settings.color.intensity_factor = factor;
        }
        if let Some(ticks) = self.ticks {
            settings.labels.ticks = ticks;
        }
        if self.no_labels {
            settings.labels.enabled = false;
        }
        if let Some(speed) = self.speed {
            settings.display.scroll_speed = speed;
        }
    }
}

/// The terminal is in raw mode while running, so logs go to a file.
fn init_logging(path: Option<PathBuf>) -> Result<()> {
    let path = path
        .or_else(|| dirs::cache_dir().map(|dir| dir.join("spectroscroll").join("spectroscroll.log")))
        .context("Could not determine cache directory for the log file")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = fs::File::create(&path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    // Respect RUST_LOG, default to info
    let mut builder = env_logger::Builder::from_default_env();
    if std::env::var("RUST_LOG").is_err() {
        builder.filter_level(log::LevelFilter::Info);
    }
    builder
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.clone())?;

    let mut settings = Settings::load(args.config.as_deref());
    args.apply(&mut settings);
    info!("Starting spectroscroll on {}", args.file.display());

    let tick_rate = settings.frame_interval();
    let app = App::new(settings, args.config.clone(), args.file.clone())?;
    ui::run(app, tick_rate)
}
