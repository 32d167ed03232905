// src/spectrogram/mod.rs
//! Scrolling spectrogram pipeline: frequency scaling, color mapping, the
//! scroll compositor, axis labels and the per-tick render loop.
//!
//! Nothing in here knows about audio devices or terminals. Frames come in
//! through [`FrameSource`] and pixels go out through [`Surface`].

pub mod color;
pub mod compositor;
pub mod labels;
pub mod render_loop;
pub mod scale;
pub mod surface;

pub use color::{ColorConfig, Rgb};
pub use compositor::ScrollCompositor;
pub use labels::{AxisLabelRenderer, AxisTick, LabelLayout};
pub use render_loop::{
    validate_fft_size, CanvasState, FrameSource, LoopState, RenderLoop, RenderOptions, TickStats,
};
pub use scale::{scaled_index, BoundAdjustment, ScaleConfig};
pub use surface::{Raster, Surface, TextAlign, TextRun};
