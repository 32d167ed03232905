// src/ui/widgets/mod.rs
//! Custom widgets for the spectroscroll UI.

pub mod spectrogram;
pub mod status_bar;

// Re-export widget types and rendering functions
pub use spectrogram::SpectrogramView;
pub use status_bar::{render_status_bar, StatusInfo};
