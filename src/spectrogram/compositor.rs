// src/spectrogram/compositor.rs
//! Scrolling waterfall composition.

use super::{
    color::ColorConfig,
    scale::ScaleConfig,
    surface::{Raster, Surface},
};

/// Shifts the visible image left each tick and paints the newest frame as a
/// strip along the right edge.
#[derive(Debug, Default)]
pub struct ScrollCompositor {
    /// Copy of the image taken at the start of each tick. Reused so a tick
    /// does not allocate once the size is stable.
    scratch: Raster,
}

impl ScrollCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Composes one tick onto `surface`.
    ///
    /// `frame` is read fully before returning. Samples the scale asks for
    /// beyond the end of the frame are treated as silence.
    pub fn render<S: Surface>(
        &mut self,
        surface: &mut S,
        frame: &[u8],
        scale: &ScaleConfig,
        color: &ColorConfig,
        scroll_speed: u32,
    ) {
        let (width, height) = surface.size();
        if width == 0 || height == 0 || scroll_speed == 0 {
            return;
        }

        surface.snapshot_into(&mut self.scratch);

        let min_index = scale.min_index();
        let max_index = scale.max_index();
        let strip_x = width as i32 - scroll_speed as i32;

        for p in min_index..max_index {
            let (top, bottom) = strip_rows(p, min_index, max_index, height);
            if bottom <= top {
                continue;
            }
            let index = scale.sample_index(p, max_index);
            let value = frame.get(index).copied().unwrap_or(0);
            surface.fill_rect(
                strip_x,
                top as i32,
                scroll_speed,
                bottom - top,
                color.color_for(value),
            );
        }

        surface.translate(-(scroll_speed as i32), 0);
        surface.draw_image(&self.scratch, 0, 0);
        surface.reset_transform();
    }
}

/// Rows `[top, bottom)` occupied by bin position `p` in a strip of `height`
/// rows, low frequencies at the bottom. Empty when the range holds more
/// positions than rows and `p` falls between two of them.
pub fn strip_rows(p: usize, min_index: usize, max_index: usize, height: u32) -> (u32, u32) {
    if max_index <= min_index {
        return (0, 0);
    }
    let span = (max_index - min_index) as f32;
    let row_for = |position: usize| {
        let percent = (position - min_index) as f32 / span;
        height - (percent * height as f32).round().min(height as f32) as u32
    };
    (row_for(p + 1), row_for(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrogram::color::Rgb;

    const MARKER: Rgb = Rgb::new(0, 0, 255);

    fn full_range() -> ScaleConfig {
        // 16 bins covering 0..24 kHz.
        ScaleConfig::new(0.0, 24000.0, 48000, 16)
    }

    #[test]
    fn strips_stack_from_the_bottom() {
        let scale = full_range();
        let color = ColorConfig::default();
        let frame: Vec<u8> = (0..16).map(|i| (i * 16) as u8).collect();
        let mut raster = Raster::new(4, 32);

        ScrollCompositor::new().render(&mut raster, &frame, &scale, &color, 1);

        assert_eq!(raster.pixel(3, 31), Some(color.color_for(frame[0])));
        assert_eq!(raster.pixel(3, 30), Some(color.color_for(frame[0])));
        assert_eq!(raster.pixel(3, 1), Some(color.color_for(frame[15])));
        assert_eq!(raster.pixel(3, 0), Some(color.color_for(frame[15])));
        assert_eq!(raster.pixel(2, 0), None);
    }

    #[test]
    fn bands_cover_every_row_once() {
        for (bins, height) in [(16usize, 32u32), (512, 40), (7, 7), (3, 100)] {
            let mut covered = vec![0u32; height as usize];
            for p in 0..bins {
                let (top, bottom) = strip_rows(p, 0, bins, height);
                for row in top..bottom {
                    covered[row as usize] += 1;
                }
            }
            assert!(covered.iter().all(|&c| c == 1), "{bins} bins over {height} rows");
        }
    }

    #[test]
    fn logarithmic_mode_samples_warped_bins() {
        let mut scale = full_range();
        scale.logarithmic = true;
        let color = ColorConfig::default();
        let frame: Vec<u8> = (0..16).map(|i| (i * 16) as u8).collect();
        let mut raster = Raster::new(2, 32);

        ScrollCompositor::new().render(&mut raster, &frame, &scale, &color, 1);

        // The top band (position 15 of 16) samples bin 13.
        assert_eq!(raster.pixel(1, 0), Some(color.color_for(frame[13])));
        assert_eq!(raster.pixel(1, 31), Some(color.color_for(frame[0])));
    }

    #[test]
    fn content_advances_by_scroll_speed() {
        let scale = full_range();
        let color = ColorConfig::default();
        let frame = vec![0u8; 16];
        let mut raster = Raster::new(100, 4);
        raster.fill_rect(10, 0, 1, 4, MARKER);
        let mut compositor = ScrollCompositor::new();

        for tick in 1..=5 {
            compositor.render(&mut raster, &frame, &scale, &color, 2);
            let expected = 10 - 2 * tick;
            assert_eq!(raster.pixel(expected as u32, 0), Some(MARKER), "tick {tick}");
            assert_ne!(raster.pixel(expected as u32 + 2, 0), Some(MARKER));
        }
        compositor.render(&mut raster, &frame, &scale, &color, 2);
        assert!((0..100).all(|x| raster.pixel(x, 0) != Some(MARKER)));
    }

    #[test]
    fn old_content_leaves_after_width_over_speed_ticks() {
        let scale = full_range();
        let color = ColorConfig::default();
        let frame = vec![255u8; 16];
        let mut raster = Raster::new(100, 4);
        raster.fill_rect(0, 0, 100, 4, MARKER);
        let mut compositor = ScrollCompositor::new();

        for _ in 0..49 {
            compositor.render(&mut raster, &frame, &scale, &color, 2);
        }
        assert_eq!(raster.pixel(0, 0), Some(MARKER));
        assert_eq!(raster.pixel(1, 3), Some(MARKER));

        compositor.render(&mut raster, &frame, &scale, &color, 2);
        for x in 0..100 {
            for y in 0..4 {
                assert_eq!(raster.pixel(x, y), Some(Rgb::BLACK));
            }
        }
    }

    #[test]
    fn empty_range_still_scrolls() {
        // 20000..20010 Hz falls inside a single bin at this resolution.
        let scale = ScaleConfig::new(20000.0, 20010.0, 48000, 16);
        assert_eq!(scale.min_index(), scale.max_index());
        let mut raster = Raster::new(10, 2);
        raster.fill_rect(5, 0, 1, 2, MARKER);

        ScrollCompositor::new().render(&mut raster, &[0; 16], &scale, &ColorConfig::default(), 1);

        assert_eq!(raster.pixel(4, 0), Some(MARKER));
        assert_eq!(raster.pixel(9, 0), None);
    }

    #[test]
    fn short_frame_reads_as_silence() {
        let scale = full_range();
        let color = ColorConfig::default();
        let mut raster = Raster::new(1, 16);

        ScrollCompositor::new().render(&mut raster, &[255; 4], &scale, &color, 1);

        assert_eq!(raster.pixel(0, 15), Some(Rgb::BLACK));
        assert_eq!(raster.pixel(0, 0), Some(color.color_for(0)));
    }
}
