// src/audio/mod.rs
//! Audio module - playback, the sample tap, spectrum analysis and track info.

pub mod analyser;
pub mod metadata;
pub mod player;
pub mod sample_capture;

// Re-export commonly used types
pub use analyser::{Analyser, AnalyserSettings};
pub use metadata::{load_track_info, TrackInfo};
pub use player::{Player, PlayerEvent, StreamFormat};
pub use sample_capture::SampleCapture;
