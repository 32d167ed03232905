// src/spectrogram/render_loop.rs
//! Per-tick driver tying the frame source, compositor and axis labels together.

use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use super::{
    color::ColorConfig,
    compositor::ScrollCompositor,
    labels::{AxisLabelRenderer, LabelLayout},
    scale::{BoundAdjustment, ScaleConfig},
    surface::{Raster, Surface},
};
use crate::error::{ConfigError, SpectrogramError};

pub const MIN_FFT_SIZE: usize = 32;
pub const MAX_FFT_SIZE: usize = 32768;

/// Sample rate assumed until a source reports its own.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Checks that `fft_size` is a power of two within the supported range.
pub fn validate_fft_size(fft_size: usize) -> Result<usize, ConfigError> {
    if fft_size.is_power_of_two() && (MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&fft_size) {
        Ok(fft_size)
    } else {
        Err(ConfigError::InvalidTransformSize(fft_size))
    }
}

/// Produces one amplitude frame per tick.
///
/// The returned slice is the source's own buffer; it stays valid until the
/// next call to `refresh`.
pub trait FrameSource {
    fn sample_rate(&self) -> u32;

    /// Length of every frame, half the transform size.
    fn bin_count(&self) -> usize;

    /// Updates and returns the current frame, one byte per bin from 0 Hz to
    /// Nyquist.
    fn refresh(&mut self) -> &[u8];

    fn set_fft_size(&mut self, fft_size: usize) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// No analysis connection yet; ticks do nothing
    Idle,
    /// Connected; every tick draws a frame
    Running,
}

/// Dimensions of the display surface and the scroll step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CanvasState {
    pub width: u32,
    pub height: u32,
    /// Pixels advanced per tick
    pub scroll_speed: u32,
}

/// Counters and timing gathered while ticking.
#[derive(Debug, Clone, Default)]
pub struct TickStats {
    pub ticks: u64,
    pub label_redraws: u64,
    /// Time between the two most recent ticks
    pub frame_interval: Option<Duration>,
    last_tick: Option<Instant>,
}

impl TickStats {
    /// Frames per second derived from the last tick interval.
    pub fn fps(&self) -> Option<f32> {
        self.frame_interval
            .filter(|d| !d.is_zero())
            .map(|d| 1.0 / d.as_secs_f32())
    }
}

/// Initial configuration for a render loop.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub min_frequency: f32,
    pub max_frequency: f32,
    pub logarithmic: bool,
    pub tick_count: u32,
    pub scroll_speed: u32,
    pub use_hue: bool,
    pub logarithmic_intensity: bool,
    pub intensity_factor: f32,
    pub labels: bool,
    pub fft_size: usize,
    pub label_layout: LabelLayout,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            min_frequency: 4000.0,
            max_frequency: 16000.0,
            logarithmic: false,
            tick_count: 10,
            scroll_speed: 2,
            use_hue: false,
            logarithmic_intensity: false,
            intensity_factor: 3.0,
            labels: true,
            fft_size: 2048,
            label_layout: LabelLayout::default(),
        }
    }
}

/// One visualization instance: configuration, backing surfaces and the
/// attached frame source.
///
/// The host calls [`RenderLoop::tick`] once per animation frame. Ticks never
/// overlap, so no state here is shared or locked.
pub struct RenderLoop<F, S = Raster> {
    scale: ScaleConfig,
    color: ColorConfig,
    canvas: CanvasState,
    labels_enabled: bool,
    tick_count: u32,
    image: S,
    label_layer: S,
    compositor: ScrollCompositor,
    axis: AxisLabelRenderer,
    source: Option<F>,
    stats: TickStats,
}

impl<F: FrameSource, S: Surface> RenderLoop<F, S> {
    pub fn new(options: RenderOptions, image: S, label_layer: S) -> Result<Self, ConfigError> {
        let fft_size = validate_fft_size(options.fft_size)?;
        if options.tick_count == 0 {
            return Err(ConfigError::ZeroTicks);
        }
        if options.scroll_speed == 0 {
            return Err(ConfigError::ZeroScrollSpeed);
        }
        let color = ColorConfig::new(
            options.use_hue,
            options.logarithmic_intensity,
            options.intensity_factor,
        )?;
        let mut scale = ScaleConfig::new(
            options.min_frequency,
            options.max_frequency,
            DEFAULT_SAMPLE_RATE,
            fft_size / 2,
        );
        scale.logarithmic = options.logarithmic;

        Ok(Self {
            scale,
            color,
            canvas: CanvasState {
                width: 0,
                height: 0,
                scroll_speed: options.scroll_speed,
            },
            labels_enabled: options.labels,
            tick_count: options.tick_count,
            image,
            label_layer,
            compositor: ScrollCompositor::new(),
            axis: AxisLabelRenderer::new(options.label_layout),
            source: None,
            stats: TickStats::default(),
        })
    }

    pub fn state(&self) -> LoopState {
        if self.source.is_some() {
            LoopState::Running
        } else {
            LoopState::Idle
        }
    }

    /// Connects the result of opening the analysis input.
    ///
    /// A failed connection is logged once and handed back; the loop stays
    /// idle. On success the source adopts the configured transform size and
    /// the scale adopts the source's sample rate.
    pub fn attach(&mut self, source: Result<F, SpectrogramError>) -> Result<(), SpectrogramError> {
        let mut source = match source {
            Ok(source) => source,
            Err(e) => {
                error!("Spectrogram input unavailable: {e}");
                return Err(e);
            }
        };

        source.set_fft_size(self.fft_size())?;
        if self.source.is_some() {
            warn!("Replacing the attached frame source");
        }
        self.scale.set_sample_rate(source.sample_rate());
        info!(
            "Spectrogram running: {} Hz, {} bins, {:.0}..{:.0} Hz",
            self.scale.sample_rate,
            self.scale.bin_count,
            self.scale.min_frequency,
            self.scale.max_frequency
        );
        self.source = Some(source);
        self.relabel();
        Ok(())
    }

    /// Releases the frame source and returns to idle.
    pub fn detach(&mut self) -> Option<F> {
        let source = self.source.take();
        if source.is_some() {
            info!("Spectrogram detached after {} ticks", self.stats.ticks);
        }
        source
    }

    /// Draws one frame for a display area of `width` x `height` pixels.
    /// Returns false while idle.
    pub fn tick(&mut self, width: u32, height: u32) -> bool {
        let Some(sample_rate) = self.source.as_ref().map(FrameSource::sample_rate) else {
            return false;
        };

        let now = Instant::now();
        self.stats.frame_interval = self.stats.last_tick.map(|last| now - last);
        self.stats.last_tick = Some(now);
        self.stats.ticks += 1;

        let mut needs_labels = false;
        if self.canvas.width != width
            || self.canvas.height != height
            || self.image.size() != (width, height)
        {
            debug!("Spectrogram resized to {width}x{height}");
            self.canvas.width = width;
            self.canvas.height = height;
            self.image.resize(width, height);
            self.label_layer.resize(width, height);
            needs_labels = true;
        }
        if sample_rate != self.scale.sample_rate {
            info!("Input sample rate changed to {sample_rate} Hz");
            self.scale.set_sample_rate(sample_rate);
            needs_labels = true;
        }
        if needs_labels {
            self.relabel();
        }

        if let Some(source) = self.source.as_mut() {
            let frame = source.refresh();
            self.compositor.render(
                &mut self.image,
                frame,
                &self.scale,
                &self.color,
                self.canvas.scroll_speed,
            );
        }
        true
    }

    pub fn set_logarithmic(&mut self, logarithmic: bool) {
        self.scale.logarithmic = logarithmic;
        self.relabel();
    }

    pub fn set_min_frequency(&mut self, frequency: f32) -> BoundAdjustment {
        let adjustment = self.scale.set_min_frequency(frequency);
        if let BoundAdjustment::RaisedMax(max) = adjustment {
            info!("Minimum frequency reached the maximum; maximum moved to {max} Hz");
        }
        self.relabel();
        adjustment
    }

    pub fn set_max_frequency(&mut self, frequency: f32) -> BoundAdjustment {
        let adjustment = self.scale.set_max_frequency(frequency);
        if let BoundAdjustment::LoweredMin(min) = adjustment {
            info!("Maximum frequency reached the minimum; minimum moved to {min} Hz");
        }
        self.relabel();
        adjustment
    }

    pub fn set_ticks(&mut self, tick_count: u32) -> Result<(), ConfigError> {
        if tick_count == 0 {
            return Err(ConfigError::ZeroTicks);
        }
        self.tick_count = tick_count;
        self.relabel();
        Ok(())
    }

    pub fn set_scroll_speed(&mut self, scroll_speed: u32) -> Result<(), ConfigError> {
        if scroll_speed == 0 {
            return Err(ConfigError::ZeroScrollSpeed);
        }
        self.canvas.scroll_speed = scroll_speed;
        Ok(())
    }

    pub fn set_use_hue(&mut self, use_hue: bool) {
        self.color.use_hue = use_hue;
    }

    pub fn set_logarithmic_intensity(&mut self, enabled: bool) {
        self.color.logarithmic_intensity = enabled;
    }

    pub fn set_intensity_factor(&mut self, factor: f32) -> Result<(), ConfigError> {
        self.color.set_intensity_factor(factor)
    }

    /// Shows the axis (drawing it immediately) or clears it.
    pub fn set_labels(&mut self, enabled: bool) {
        self.labels_enabled = enabled;
        if enabled {
            self.redraw_labels();
        } else {
            self.axis.clear(&mut self.label_layer);
        }
    }

    /// Changes the transform size, forwarding it to the attached source.
    pub fn set_fft_size(&mut self, fft_size: usize) -> Result<(), ConfigError> {
        let fft_size = validate_fft_size(fft_size)?;
        if let Some(source) = self.source.as_mut() {
            source.set_fft_size(fft_size)?;
        }
        self.scale.bin_count = fft_size / 2;
        debug!("Transform size set to {fft_size}");
        self.relabel();
        Ok(())
    }

    pub fn scale(&self) -> &ScaleConfig {
        &self.scale
    }

    pub fn color(&self) -> &ColorConfig {
        &self.color
    }

    pub fn canvas(&self) -> &CanvasState {
        &self.canvas
    }

    pub fn labels_enabled(&self) -> bool {
        self.labels_enabled
    }

    pub fn tick_count(&self) -> u32 {
        self.tick_count
    }

    pub fn fft_size(&self) -> usize {
        self.scale.bin_count * 2
    }

    pub fn image(&self) -> &S {
        &self.image
    }

    pub fn label_layer(&self) -> &S {
        &self.label_layer
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Marks a gap in ticking, such as paused playback. The next tick starts
    /// a fresh frame interval instead of measuring across the gap.
    pub fn pause_timing(&mut self) {
        self.stats.last_tick = None;
        self.stats.frame_interval = None;
    }

    pub fn source(&self) -> Option<&F> {
        self.source.as_ref()
    }

    pub fn source_mut(&mut self) -> Option<&mut F> {
        self.source.as_mut()
    }

    fn relabel(&mut self) {
        if self.labels_enabled {
            self.redraw_labels();
        }
    }

    fn redraw_labels(&mut self) {
        self.axis
            .render(&mut self.label_layer, &self.scale, self.tick_count);
        self.stats.label_redraws += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrogram::color::Rgb;
    use crate::spectrogram::surface::TextAlign;

    struct TestSource {
        sample_rate: u32,
        frame: Vec<u8>,
        value: u8,
    }

    impl TestSource {
        fn new(sample_rate: u32, value: u8) -> Self {
            Self {
                sample_rate,
                frame: Vec::new(),
                value,
            }
        }
    }

    impl FrameSource for TestSource {
        fn sample_rate(&self) -> u32 {
            self.sample_rate
        }

        fn bin_count(&self) -> usize {
            self.frame.len()
        }

        fn refresh(&mut self) -> &[u8] {
            self.frame.fill(self.value);
            &self.frame
        }

        fn set_fft_size(&mut self, fft_size: usize) -> Result<(), ConfigError> {
            self.frame.resize(fft_size / 2, 0);
            Ok(())
        }
    }

    /// Raster that counts how often it is wiped.
    #[derive(Default)]
    struct CountingSurface {
        inner: Raster,
        clears: usize,
        resizes: usize,
    }

    impl Surface for CountingSurface {
        fn size(&self) -> (u32, u32) {
            self.inner.size()
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.resizes += 1;
            self.inner.resize(width, height);
        }

        fn clear(&mut self) {
            self.clears += 1;
            self.inner.clear();
        }

        fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgb) {
            self.inner.fill_rect(x, y, width, height, color);
        }

        fn translate(&mut self, dx: i32, dy: i32) {
            self.inner.translate(dx, dy);
        }

        fn reset_transform(&mut self) {
            self.inner.reset_transform();
        }

        fn snapshot_into(&self, target: &mut Raster) {
            self.inner.snapshot_into(target);
        }

        fn draw_image(&mut self, image: &Raster, x: i32, y: i32) {
            self.inner.draw_image(image, x, y);
        }

        fn fill_text(&mut self, text: &str, x: i32, y: i32, align: TextAlign, color: Rgb) {
            self.inner.fill_text(text, x, y, align, color);
        }
    }

    fn new_loop(options: RenderOptions) -> RenderLoop<TestSource, CountingSurface> {
        RenderLoop::new(options, CountingSurface::default(), CountingSurface::default()).unwrap()
    }

    #[test]
    fn idle_ticks_do_nothing() {
        let mut render = new_loop(RenderOptions::default());
        assert_eq!(render.state(), LoopState::Idle);
        assert!(!render.tick(100, 50));
        assert_eq!(render.stats().ticks, 0);
        assert_eq!(render.image().resizes, 0);
    }

    #[test]
    fn frame_interval_restarts_after_a_pause() {
        let mut render = new_loop(RenderOptions::default());
        render.attach(Ok(TestSource::new(48000, 0))).unwrap();
        assert!(render.tick(100, 50));
        assert_eq!(render.stats().frame_interval, None);
        assert!(render.tick(100, 50));
        assert!(render.stats().frame_interval.is_some());

        render.pause_timing();
        assert_eq!(render.stats().fps(), None);
        std::thread::sleep(Duration::from_millis(20));
        assert!(render.tick(100, 50));
        assert_eq!(render.stats().frame_interval, None);
        assert!(render.tick(100, 50));
        let interval = render.stats().frame_interval.unwrap();
        assert!(interval < Duration::from_millis(20));
        assert_eq!(render.stats().ticks, 4);
    }

    #[test]
    fn failed_attach_stays_idle() {
        let mut render = new_loop(RenderOptions::default());
        let result = render.attach(Err(SpectrogramError::UpstreamUnavailable("denied".into())));
        assert!(matches!(result, Err(SpectrogramError::UpstreamUnavailable(_))));
        assert_eq!(render.state(), LoopState::Idle);
        assert!(!render.tick(100, 50));
    }

    #[test]
    fn attach_adopts_source_format() {
        let mut render = new_loop(RenderOptions::default());
        render.attach(Ok(TestSource::new(48000, 0))).unwrap();
        assert_eq!(render.state(), LoopState::Running);
        assert_eq!(render.scale().sample_rate, 48000);
        assert_eq!(render.source().map(FrameSource::bin_count), Some(1024));
        assert_eq!(render.scale().min_index(), 171);
        assert_eq!(render.scale().max_index(), 683);
    }

    #[test]
    fn tick_paints_newest_strip() {
        let mut render = new_loop(RenderOptions::default());
        render.attach(Ok(TestSource::new(48000, 255))).unwrap();
        assert!(render.tick(100, 50));
        let image = &render.image().inner;
        assert_eq!(image.pixel(99, 0), Some(Rgb::BLACK));
        assert_eq!(image.pixel(98, 49), Some(Rgb::BLACK));
        assert_eq!(image.pixel(97, 0), None);
    }

    #[test]
    fn labels_redraw_once_per_resize() {
        let mut render = new_loop(RenderOptions::default());
        render.attach(Ok(TestSource::new(48000, 0))).unwrap();
        let after_attach = render.stats().label_redraws;

        render.tick(100, 50);
        assert_eq!(render.stats().label_redraws, after_attach + 1);
        let clears = render.label_layer().clears;

        for _ in 0..10 {
            render.tick(100, 50);
        }
        assert_eq!(render.stats().label_redraws, after_attach + 1);
        assert_eq!(render.label_layer().clears, clears);

        render.tick(120, 50);
        assert_eq!(render.stats().label_redraws, after_attach + 2);
        assert_eq!(render.label_layer().clears, clears + 1);
        assert_eq!(render.label_layer().resizes, 2);
    }

    #[test]
    fn disabled_labels_are_not_drawn_on_resize() {
        let options = RenderOptions {
            labels: false,
            ..RenderOptions::default()
        };
        let mut render = new_loop(options);
        render.attach(Ok(TestSource::new(48000, 0))).unwrap();
        render.tick(100, 50);
        assert_eq!(render.stats().label_redraws, 0);
        assert!(render.label_layer().inner.is_blank());

        render.set_labels(true);
        assert_eq!(render.stats().label_redraws, 1);
        assert!(!render.label_layer().inner.is_blank());

        render.set_labels(false);
        assert!(render.label_layer().inner.is_blank());
        render.set_ticks(5).unwrap();
        assert!(render.label_layer().inner.is_blank());
    }

    #[test]
    fn range_changes_relabel_and_push_bounds() {
        let mut render = new_loop(RenderOptions::default());
        render.attach(Ok(TestSource::new(48000, 0))).unwrap();
        render.tick(100, 50);
        let before = render.stats().label_redraws;

        assert_eq!(render.set_min_frequency(20000.0), BoundAdjustment::RaisedMax(20010.0));
        assert_eq!(render.scale().max_frequency, 20010.0);
        render.set_logarithmic(true);
        assert_eq!(render.stats().label_redraws, before + 2);

        // Color changes do not touch the axis.
        render.set_use_hue(true);
        render.set_logarithmic_intensity(true);
        assert_eq!(render.stats().label_redraws, before + 2);
    }

    #[test]
    fn invalid_updates_leave_state_untouched() {
        let mut render = new_loop(RenderOptions::default());
        assert_eq!(
            render.set_intensity_factor(0.0),
            Err(ConfigError::NonPositiveIntensity(0.0))
        );
        assert_eq!(render.color().intensity_factor(), 3.0);
        assert_eq!(render.set_fft_size(1000), Err(ConfigError::InvalidTransformSize(1000)));
        assert_eq!(render.fft_size(), 2048);
        assert_eq!(render.set_ticks(0), Err(ConfigError::ZeroTicks));
        assert_eq!(render.tick_count(), 10);
        assert_eq!(render.set_scroll_speed(0), Err(ConfigError::ZeroScrollSpeed));
        assert_eq!(render.canvas().scroll_speed, 2);
    }

    #[test]
    fn invalid_options_are_rejected() {
        let options = RenderOptions {
            intensity_factor: -2.0,
            ..RenderOptions::default()
        };
        let result = RenderLoop::<TestSource, Raster>::new(options, Raster::default(), Raster::default());
        assert!(matches!(result, Err(ConfigError::NonPositiveIntensity(_))));
    }

    #[test]
    fn fft_size_is_forwarded_to_source() {
        let mut render = new_loop(RenderOptions::default());
        render.attach(Ok(TestSource::new(48000, 0))).unwrap();
        render.set_fft_size(512).unwrap();
        assert_eq!(render.scale().bin_count, 256);
        assert_eq!(render.source().map(FrameSource::bin_count), Some(256));
    }

    #[test]
    fn sample_rate_change_is_picked_up() {
        let mut render = new_loop(RenderOptions::default());
        render.attach(Ok(TestSource::new(48000, 0))).unwrap();
        render.tick(100, 50);
        let before = render.stats().label_redraws;

        if let Some(source) = render.source_mut() {
            source.sample_rate = 22050;
        }
        render.tick(100, 50);
        assert_eq!(render.scale().sample_rate, 22050);
        assert_eq!(render.scale().max_frequency, 11025.0);
        assert_eq!(render.stats().label_redraws, before + 1);
    }

    #[test]
    fn detach_returns_to_idle() {
        let mut render = new_loop(RenderOptions::default());
        render.attach(Ok(TestSource::new(48000, 0))).unwrap();
        assert!(render.detach().is_some());
        assert_eq!(render.state(), LoopState::Idle);
        assert!(!render.tick(10, 10));
    }

    #[test]
    fn fft_size_validation() {
        assert!(validate_fft_size(32).is_ok());
        assert!(validate_fft_size(32768).is_ok());
        assert!(validate_fft_size(16).is_err());
        assert!(validate_fft_size(65536).is_err());
        assert!(validate_fft_size(0).is_err());
        assert!(validate_fft_size(3000).is_err());
    }
}
