// src/error.rs
//! Error types for the spectrogram pipeline.

use thiserror::Error;

/// A configuration update that was refused. State is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("intensity factor must be a positive finite number, got {0}")]
    NonPositiveIntensity(f32),
    #[error("transform size {0} must be a power of two between 32 and 32768")]
    InvalidTransformSize(usize),
    #[error("tick count must be at least 1")]
    ZeroTicks,
    #[error("scroll speed must be at least 1 pixel per tick")]
    ZeroScrollSpeed,
}

/// Errors that end the life of a visualization instance.
#[derive(Debug, Error)]
pub enum SpectrogramError {
    /// No analysis connection could be established. Reported once; the
    /// render loop stays idle.
    #[error("audio input unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
