// src/ui/layout.rs
//! Layout computation for the UI panels.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Rows taken by the status bar at the bottom.
pub const STATUS_HEIGHT: u16 = 3;

/// Computed layout areas for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputedLayout {
    /// Area drawn with half-block pixels
    pub spectrogram: Rect,
    pub status: Rect,
}

impl ComputedLayout {
    /// Pixel size of the spectrogram area: one column per cell, two rows per
    /// cell.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.spectrogram.width as u32,
            self.spectrogram.height as u32 * 2,
        )
    }
}

/// Split the terminal into the spectrogram and the status bar below it.
pub fn compute_layout(area: Rect) -> ComputedLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(STATUS_HEIGHT)])
        .split(area);
    ComputedLayout {
        spectrogram: chunks[0],
        status: chunks[1],
    }
}
