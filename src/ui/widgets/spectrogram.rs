// src/ui/widgets/spectrogram.rs
//! Half-block rendering of the spectrogram and its label layer.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    widgets::Widget,
};

use crate::spectrogram::{Raster, Rgb};

const UPPER_HALF: &str = "▀";
/// Shown where neither layer has a pixel
const BACKGROUND: Rgb = Rgb::WHITE;

/// Draws two pixel rows per terminal row: the upper pixel as the foreground
/// of '▀', the lower one as the background.
pub struct SpectrogramView<'a> {
    image: &'a Raster,
    labels: Option<&'a Raster>,
}

impl<'a> SpectrogramView<'a> {
    pub fn new(image: &'a Raster) -> Self {
        Self {
            image,
            labels: None,
        }
    }

    pub fn labels(mut self, labels: Option<&'a Raster>) -> Self {
        self.labels = labels;
        self
    }

    /// Label pixels sit on top of the image.
    fn pixel(&self, x: u32, y: u32) -> Rgb {
        self.labels
            .and_then(|labels| labels.pixel(x, y))
            .or_else(|| self.image.pixel(x, y))
            .unwrap_or(BACKGROUND)
    }
}

impl Widget for SpectrogramView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            for col in 0..area.width {
                let x = col as u32;
                let top = self.pixel(x, row as u32 * 2);
                let bottom = self.pixel(x, row as u32 * 2 + 1);
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol(UPPER_HALF)
                        .set_fg(Color::from(top))
                        .set_bg(Color::from(bottom));
                }
            }
        }

        let Some(labels) = self.labels else {
            return;
        };
        if area.height == 0 {
            return;
        }
        for run in labels.text_runs() {
            if run.y < 0 {
                continue;
            }
            // The bottom tick sits on the last pixel row boundary.
            let row = ((run.y / 2) as u16).min(area.height - 1);
            let mut col = run.start_x();
            for ch in run.text.chars() {
                if (0..area.width as i32).contains(&col) {
                    if let Some(cell) = buf.cell_mut((area.x + col as u16, area.y + row)) {
                        cell.set_char(ch).set_fg(Color::from(run.color));
                    }
                }
                col += 1;
            }
        }
    }
}
