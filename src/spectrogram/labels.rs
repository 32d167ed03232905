// src/spectrogram/labels.rs
//! Frequency axis labels drawn on their own layer.

use super::{
    color::Rgb,
    scale::{scaled_index, ScaleConfig},
    surface::{Surface, TextAlign},
};

/// Placement of the label column, measured in surface pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    /// Distance from the right edge to the anchor of the value text
    pub right_margin: u32,
    /// Gap between the value and its unit
    pub units_gap: i32,
    /// Offset of the tick mark from the anchor
    pub tick_offset: i32,
    pub tick_length: u32,
    pub tick_thickness: u32,
    /// Vertical offset applied to the text relative to the tick
    pub baseline_offset: i32,
    pub color: Rgb,
}

impl Default for LabelLayout {
    fn default() -> Self {
        Self {
            right_margin: 12,
            units_gap: 1,
            tick_offset: 6,
            tick_length: 4,
            tick_thickness: 2,
            baseline_offset: 0,
            color: Rgb::BLACK,
        }
    }
}

/// One labelled position on the axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    /// Distance from the top edge in pixels
    pub y: f32,
    /// Frequency plotted at `y`
    pub frequency: f32,
}

/// Draws evenly spaced frequency ticks that line up with the plotted data.
#[derive(Debug, Clone, Default)]
pub struct AxisLabelRenderer {
    layout: LabelLayout,
}

impl AxisLabelRenderer {
    pub fn new(layout: LabelLayout) -> Self {
        Self { layout }
    }

    /// Positions and frequencies for `tick_count + 1` ticks spanning the
    /// configured range on a surface `height` pixels tall.
    ///
    /// Ticks are spaced linearly. With a logarithmic scale the frequency of
    /// each tick is the one actually sampled at that height, not the nominal
    /// evenly spaced value.
    pub fn ticks(&self, scale: &ScaleConfig, tick_count: u32, height: u32) -> Vec<AxisTick> {
        let min_index = scale.min_index();
        let max_index = scale.max_index();
        if tick_count == 0 || max_index <= min_index {
            return Vec::new();
        }

        let step = (scale.max_frequency - scale.min_frequency) / tick_count as f32;
        let span = (max_index - min_index) as f32;

        (0..=tick_count)
            .map(|i| {
                let nominal = scale.min_frequency + step * i as f32;
                let index = scale.index_for_frequency(nominal);
                let percent = (index as f32 - min_index as f32) / span;
                let frequency = if scale.logarithmic {
                    scale.frequency_for_index(scaled_index(index, max_index))
                } else {
                    nominal
                };
                AxisTick {
                    y: (1.0 - percent) * height as f32,
                    frequency,
                }
            })
            .collect()
    }

    /// Clears `surface` and draws the full axis.
    pub fn render<S: Surface>(&self, surface: &mut S, scale: &ScaleConfig, tick_count: u32) {
        surface.clear();
        let (width, height) = surface.size();
        let x = width as i32 - self.layout.right_margin as i32;
        let color = self.layout.color;

        for tick in self.ticks(scale, tick_count, height) {
            let y = tick.y.round() as i32;
            let text_y = y + self.layout.baseline_offset;
            let (value, units) = format_frequency(tick.frequency);

            surface.fill_text(&value, x, text_y, TextAlign::Right, color);
            surface.fill_text(units, x + self.layout.units_gap, text_y, TextAlign::Left, color);
            surface.fill_rect(
                x + self.layout.tick_offset,
                y,
                self.layout.tick_length,
                self.layout.tick_thickness,
                color,
            );
        }
    }

    pub fn clear<S: Surface>(&self, surface: &mut S) {
        surface.clear();
    }
}

/// Splits a frequency into display value and unit: kHz with one decimal from
/// 1000 Hz upward, whole Hz below.
pub fn format_frequency(frequency: f32) -> (String, &'static str) {
    if frequency >= 1000.0 {
        (format!("{:.1}", frequency / 1000.0), "kHz")
    } else {
        (format!("{}", frequency.round() as i64), "Hz")
    }
}
