// src/spectrogram/color.rs
//! Amplitude to color mapping.

use palette::{encoding, FromColor, Hsl, Srgb};

use crate::error::ConfigError;

/// Hue used for the loudest samples (red).
const LOUD_HUE: f32 = 0.0;
/// Hue used for the quietest samples (blue).
const QUIET_HUE: f32 = 240.0;

/// A plain 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(level: u8) -> Self {
        Self::new(level, level, level)
    }
}

impl From<Rgb> for ratatui::style::Color {
    fn from(c: Rgb) -> Self {
        ratatui::style::Color::Rgb(c.r, c.g, c.b)
    }
}

/// How amplitudes are turned into colors.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorConfig {
    /// Use the red..blue hue ramp instead of grayscale
    pub use_hue: bool,
    /// Apply the exponential intensity curve
    pub logarithmic_intensity: bool,
    /// Steepness of the intensity curve; always > 0
    intensity_factor: f32,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            use_hue: false,
            logarithmic_intensity: false,
            intensity_factor: 3.0,
        }
    }
}

impl ColorConfig {
    pub fn new(use_hue: bool, logarithmic_intensity: bool, intensity_factor: f32) -> Result<Self, ConfigError> {
        let mut config = Self {
            use_hue,
            logarithmic_intensity,
            ..Self::default()
        };
        config.set_intensity_factor(intensity_factor)?;
        Ok(config)
    }

    pub fn intensity_factor(&self) -> f32 {
        self.intensity_factor
    }

    /// Rejects zero, negative and non-finite factors, leaving the current
    /// value in place.
    pub fn set_intensity_factor(&mut self, factor: f32) -> Result<(), ConfigError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ConfigError::NonPositiveIntensity(factor));
        }
        self.intensity_factor = factor;
        Ok(())
    }

    /// Color for one amplitude sample.
    pub fn color_for(&self, amplitude: u8) -> Rgb {
        if self.use_hue {
            hsl_to_rgb(self.hue_for(amplitude), 1.0, 0.5)
        } else {
            self.gray_for(amplitude)
        }
    }

    /// Grayscale mapping: full amplitude is black, silence is white.
    pub fn gray_for(&self, amplitude: u8) -> Rgb {
        let percent = self.shape((255.0 - amplitude as f32) / 255.0);
        Rgb::gray((percent * 255.0).round().clamp(0.0, 255.0) as u8)
    }

    /// Hue in degrees: full amplitude is 0 (red), silence is 240 (blue).
    pub fn hue_for(&self, amplitude: u8) -> f32 {
        let percent = self.shape(1.0 - amplitude as f32 / 255.0);
        LOUD_HUE + percent * (QUIET_HUE - LOUD_HUE)
    }

    fn shape(&self, percent: f32) -> f32 {
        if self.logarithmic_intensity {
            log_intensity(percent, self.intensity_factor)
        } else {
            percent
        }
    }
}

/// Exponential reshaping of a normalized value: `(e^(p*k) - 1) / (e^k - 1)`.
/// Maps 0 to 0 and 1 to 1 for every `k > 0`.
pub fn log_intensity(percent: f32, k: f32) -> f32 {
    (percent * k).exp_m1() / k.exp_m1()
}

/// Converts HSL (hue in degrees, saturation and lightness in 0..=1) to RGB.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Rgb {
    let hsl: Hsl<encoding::Srgb, f32> = Hsl::new(hue, saturation, lightness);
    let rgb: Srgb<u8> = Srgb::<f32>::from_color(hsl).into_format();
    Rgb::new(rgb.red, rgb.green, rgb.blue)
}
