// src/spectrogram/surface.rs
//! Drawing surface abstraction and the in-memory raster that implements it.

use super::color::Rgb;

/// Horizontal anchoring of text relative to its x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// A mutable raster target the spectrogram draws into.
///
/// Coordinates are pixels with the origin at the top left. Drawing calls go
/// through the current translation, which `reset_transform` clears.
pub trait Surface {
    fn size(&self) -> (u32, u32);

    /// Changes the dimensions. All content is discarded and the transform
    /// is reset.
    fn resize(&mut self, width: u32, height: u32);

    /// Discards all content, keeping the dimensions.
    fn clear(&mut self);

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgb);

    fn translate(&mut self, dx: i32, dy: i32);

    fn reset_transform(&mut self);

    /// Copies the whole image into `target`, reusing its allocation.
    fn snapshot_into(&self, target: &mut Raster);

    /// Copies `image` with its top-left corner at (`x`, `y`), replacing the
    /// covered destination pixels (transparent ones included). Text anchored
    /// in the covered region is replaced the same way.
    fn draw_image(&mut self, image: &Raster, x: i32, y: i32);

    fn fill_text(&mut self, text: &str, x: i32, y: i32, align: TextAlign, color: Rgb);
}

/// A piece of text placed on a raster.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: i32,
    pub y: i32,
    pub text: String,
    pub align: TextAlign,
    pub color: Rgb,
}

impl TextRun {
    /// Column of the first character, one column per char.
    pub fn start_x(&self) -> i32 {
        let len = self.text.chars().count() as i32;
        match self.align {
            TextAlign::Left => self.x,
            TextAlign::Center => self.x - len / 2,
            TextAlign::Right => self.x - len,
        }
    }
}

/// Pixel buffer with optional transparency plus positioned text.
#[derive(Debug, Clone, Default)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Option<Rgb>>,
    text: Vec<TextRun>,
    offset: (i32, i32),
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![None; (width as usize) * (height as usize)],
            text: Vec::new(),
            offset: (0, 0),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at (`x`, `y`) in untransformed coordinates, `None` when
    /// transparent or out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels[self.index(x, y)]
    }

    pub fn text_runs(&self) -> &[TextRun] {
        &self.text
    }

    /// True when no pixel is set and no text is placed.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty() && self.pixels.iter().all(Option::is_none)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Clips a translated rectangle to the raster, returning pixel ranges.
    fn clip(&self, x: i32, y: i32, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = (x as i64 + self.offset.0 as i64).max(0);
        let y0 = (y as i64 + self.offset.1 as i64).max(0);
        let x1 = (x as i64 + self.offset.0 as i64 + width as i64).min(self.width as i64);
        let y1 = (y as i64 + self.offset.1 as i64 + height as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

impl Surface for Raster {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize((width as usize) * (height as usize), None);
        self.text.clear();
        self.offset = (0, 0);
    }

    fn clear(&mut self) {
        self.pixels.fill(None);
        self.text.clear();
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgb) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, width, height) else {
            return;
        };
        for row in y0..y1 {
            let start = self.index(x0, row);
            let end = self.index(x1, row);
            self.pixels[start..end].fill(Some(color));
        }
    }

    fn translate(&mut self, dx: i32, dy: i32) {
        self.offset.0 += dx;
        self.offset.1 += dy;
    }

    fn reset_transform(&mut self) {
        self.offset = (0, 0);
    }

    fn snapshot_into(&self, target: &mut Raster) {
        target.width = self.width;
        target.height = self.height;
        target.pixels.clone_from(&self.pixels);
        target.text.clone_from(&self.text);
        target.offset = (0, 0);
    }

    fn draw_image(&mut self, image: &Raster, x: i32, y: i32) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, image.width, image.height) else {
            return;
        };
        // Translation from destination pixels back into the source image.
        let sx = x as i64 + self.offset.0 as i64;
        let sy = y as i64 + self.offset.1 as i64;
        for row in y0..y1 {
            let src_row = (row as i64 - sy) as u32;
            for col in x0..x1 {
                let src_col = (col as i64 - sx) as u32;
                let idx = self.index(col, row);
                self.pixels[idx] = image.pixel(src_col, src_row);
            }
        }
        let covered = |run: &TextRun| {
            (x0 as i32..x1 as i32).contains(&run.x) && (y0 as i32..y1 as i32).contains(&run.y)
        };
        self.text.retain(|run| !covered(run));
        let moved: Vec<TextRun> = image
            .text
            .iter()
            .map(|run| TextRun {
                x: run.x + sx as i32,
                y: run.y + sy as i32,
                ..run.clone()
            })
            .filter(|run| covered(run))
            .collect();
        self.text.extend(moved);
    }

    fn fill_text(&mut self, text: &str, x: i32, y: i32, align: TextAlign, color: Rgb) {
        self.text.push(TextRun {
            x: x + self.offset.0,
            y: y + self.offset.1,
            text: text.to_string(),
            align,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);

    #[test]
    fn fill_rect_is_clipped() {
        let mut raster = Raster::new(4, 3);
        raster.fill_rect(2, -1, 10, 2, RED);
        assert_eq!(raster.pixel(2, 0), Some(RED));
        assert_eq!(raster.pixel(3, 0), Some(RED));
        assert_eq!(raster.pixel(1, 0), None);
        assert_eq!(raster.pixel(2, 1), None);
    }

    #[test]
    fn translation_offsets_drawing_until_reset() {
        let mut raster = Raster::new(4, 1);
        raster.translate(-1, 0);
        raster.fill_rect(1, 0, 1, 1, RED);
        raster.reset_transform();
        raster.fill_rect(1, 0, 1, 1, BLUE);
        assert_eq!(raster.pixel(0, 0), Some(RED));
        assert_eq!(raster.pixel(1, 0), Some(BLUE));
    }

    #[test]
    fn draw_image_replaces_covered_pixels() {
        let mut image = Raster::new(2, 1);
        image.fill_rect(0, 0, 1, 1, RED);

        let mut raster = Raster::new(3, 1);
        raster.fill_rect(0, 0, 3, 1, BLUE);
        raster.draw_image(&image, 1, 0);
        assert_eq!(raster.pixel(0, 0), Some(BLUE));
        assert_eq!(raster.pixel(1, 0), Some(RED));
        assert_eq!(raster.pixel(2, 0), None);
    }

    #[test]
    fn redrawing_own_snapshot_keeps_text_count() {
        let mut raster = Raster::new(4, 1);
        raster.fill_text("a", 2, 0, TextAlign::Left, RED);
        let mut scratch = Raster::default();

        raster.snapshot_into(&mut scratch);
        raster.draw_image(&scratch, -1, 0);
        assert_eq!(raster.text_runs().len(), 1);
        assert_eq!(raster.text_runs()[0].x, 1);

        raster.snapshot_into(&mut scratch);
        raster.draw_image(&scratch, -1, 0);
        assert_eq!(raster.text_runs().len(), 1);
        assert_eq!(raster.text_runs()[0].x, 0);

        // Scrolled past the left edge.
        raster.snapshot_into(&mut scratch);
        raster.draw_image(&scratch, -1, 0);
        assert!(raster.text_runs().is_empty());
    }

    #[test]
    fn draw_image_keeps_text_outside_the_covered_region() {
        let mut raster = Raster::new(4, 2);
        raster.fill_text("kept", 0, 1, TextAlign::Left, RED);
        raster.fill_text("gone", 1, 0, TextAlign::Left, RED);
        raster.draw_image(&Raster::new(4, 1), 0, 0);
        let texts: Vec<&str> = raster.text_runs().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["kept"]);
    }

    #[test]
    fn snapshot_reuses_target_allocation() {
        let mut raster = Raster::new(8, 8);
        raster.fill_rect(0, 0, 8, 8, RED);

        let mut scratch = Raster::default();
        raster.snapshot_into(&mut scratch);
        let capacity = scratch.pixels.capacity();
        raster.fill_rect(0, 0, 1, 1, BLUE);
        raster.snapshot_into(&mut scratch);

        assert_eq!(scratch.pixels.capacity(), capacity);
        assert_eq!(scratch.pixel(0, 0), Some(BLUE));
        assert_eq!(scratch.size(), (8, 8));
    }

    #[test]
    fn resize_discards_content() {
        let mut raster = Raster::new(2, 2);
        raster.fill_rect(0, 0, 2, 2, RED);
        raster.fill_text("x", 0, 0, TextAlign::Left, RED);
        raster.translate(5, 5);
        raster.resize(3, 1);
        assert!(raster.is_blank());
        assert_eq!(raster.size(), (3, 1));
        raster.fill_rect(0, 0, 1, 1, BLUE);
        assert_eq!(raster.pixel(0, 0), Some(BLUE));
    }

    #[test]
    fn text_alignment() {
        let mut raster = Raster::new(20, 2);
        raster.fill_text("4.0", 10, 0, TextAlign::Right, RED);
        raster.fill_text("kHz", 11, 0, TextAlign::Left, RED);
        raster.fill_text("abcd", 10, 1, TextAlign::Center, RED);
        let starts: Vec<i32> = raster.text_runs().iter().map(TextRun::start_x).collect();
        assert_eq!(starts, vec![7, 11, 8]);
    }
}
