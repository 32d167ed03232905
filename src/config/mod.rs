// src/config/mod.rs
//! User settings loaded from `config.toml`.
//!
//! Every field has a default, so a partial file only overrides what it names.
//! Command line flags are applied on top by `main`.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::audio::AnalyserSettings;
use crate::error::ConfigError;
use crate::spectrogram::{
    validate_fft_size, ColorConfig, FrameSource, RenderLoop, RenderOptions, Surface,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleSettings {
    pub min_frequency: f32,
    pub max_frequency: f32,
    pub logarithmic: bool,
}

impl Default for ScaleSettings {
    fn default() -> Self {
        Self {
            min_frequency: 4000.0,
            max_frequency: 16000.0,
            logarithmic: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    pub use_hue: bool,
    pub logarithmic_intensity: bool,
    pub intensity_factor: f32,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            use_hue: false,
            logarithmic_intensity: false,
            intensity_factor: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Pixels the image moves left per tick
    pub scroll_speed: u32,
    /// Target time between ticks
    pub frame_interval_ms: u64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            scroll_speed: 2,
            frame_interval_ms: 33,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    pub enabled: bool,
    pub ticks: u32,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ticks: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub fft_size: usize,
    pub smoothing: f32,
    pub min_decibels: f32,
    pub max_decibels: f32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        let analyser = AnalyserSettings::default();
        Self {
            fft_size: 2048,
            smoothing: analyser.smoothing,
            min_decibels: analyser.min_decibels,
            max_decibels: analyser.max_decibels,
        }
    }
}

impl AnalysisSettings {
    pub fn analyser(&self) -> AnalyserSettings {
        AnalyserSettings {
            smoothing: self.smoothing,
            min_decibels: self.min_decibels,
            max_decibels: self.max_decibels,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scale: ScaleSettings,
    pub color: ColorSettings,
    pub display: DisplaySettings,
    pub labels: LabelSettings,
    pub analysis: AnalysisSettings,
}

impl Settings {
    /// Loads `path`, or the default location when `None`. A missing or
    /// invalid file yields the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(config_path) {
            Some(path) => path,
            None => {
                warn!("Could not determine config directory, using defaults");
                return Self::default();
            }
        };

        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings.validated()
            }
            Err(e) => {
                warn!("{e:#}; using defaults");
                Self::default()
            }
        }
    }

    /// Replaces every value the render loop would refuse with its default,
    /// logging a warning for each.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        if let Err(e) = validate_fft_size(self.analysis.fft_size) {
            warn!("{e}; using {}", defaults.analysis.fft_size);
            self.analysis.fft_size = defaults.analysis.fft_size;
        }
        if self.labels.ticks == 0 {
            warn!("{}; using {}", ConfigError::ZeroTicks, defaults.labels.ticks);
            self.labels.ticks = defaults.labels.ticks;
        }
        if self.display.scroll_speed == 0 {
            warn!(
                "{}; using {}",
                ConfigError::ZeroScrollSpeed,
                defaults.display.scroll_speed
            );
            self.display.scroll_speed = defaults.display.scroll_speed;
        }
        if let Err(e) = ColorConfig::default().set_intensity_factor(self.color.intensity_factor) {
            warn!("{e}; using {}", defaults.color.intensity_factor);
            self.color.intensity_factor = defaults.color.intensity_factor;
        }
        if !(self.analysis.max_decibels > self.analysis.min_decibels) {
            warn!(
                "decibel window {}..{} is empty; using {}..{}",
                self.analysis.min_decibels,
                self.analysis.max_decibels,
                defaults.analysis.min_decibels,
                defaults.analysis.max_decibels
            );
            self.analysis.min_decibels = defaults.analysis.min_decibels;
            self.analysis.max_decibels = defaults.analysis.max_decibels;
        }
        self
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }
        let toml = toml::to_string_pretty(self).context("Failed to serialize settings to TOML")?;
        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            min_frequency: self.scale.min_frequency,
            max_frequency: self.scale.max_frequency,
            logarithmic: self.scale.logarithmic,
            tick_count: self.labels.ticks,
            scroll_speed: self.display.scroll_speed,
            use_hue: self.color.use_hue,
            logarithmic_intensity: self.color.logarithmic_intensity,
            intensity_factor: self.color.intensity_factor,
            labels: self.labels.enabled,
            fft_size: self.analysis.fft_size,
            ..RenderOptions::default()
        }
    }

    /// Copies the live values of a render loop back into the settings.
    pub fn capture<F: FrameSource, S: Surface>(&mut self, render: &RenderLoop<F, S>) {
        let scale = render.scale();
        let color = render.color();
        self.scale.min_frequency = scale.min_frequency;
        self.scale.max_frequency = scale.max_frequency;
        self.scale.logarithmic = scale.logarithmic;
        self.color.use_hue = color.use_hue;
        self.color.logarithmic_intensity = color.logarithmic_intensity;
        self.color.intensity_factor = color.intensity_factor();
        self.display.scroll_speed = render.canvas().scroll_speed;
        self.labels.enabled = render.labels_enabled();
        self.labels.ticks = render.tick_count();
        self.analysis.fft_size = render.fft_size();
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.display.frame_interval_ms.max(1))
    }
}

/// `<config_dir>/spectroscroll/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("spectroscroll").join("config.toml"))
}
