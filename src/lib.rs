// src/lib.rs
//! Spectroscroll - a scrolling spectrogram for the terminal.
//!
//! The [`spectrogram`] module holds the rendering pipeline and knows nothing
//! about audio devices or terminals. The remaining modules host it: playback
//! and analysis in [`audio`], settings in [`config`], and the ratatui front end
//! in [`ui`] and [`app`].

pub mod app;
pub mod audio;
pub mod config;
pub mod error;
pub mod fs;
pub mod spectrogram;
pub mod ui;

pub use error::{ConfigError, SpectrogramError};
