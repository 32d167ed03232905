// src/audio/analyser.rs
//! FFT analysis producing byte amplitude frames for the spectrogram.

use std::f32::consts::PI;
use std::sync::{Arc, Mutex};

use ringbuf::{traits::*, HeapRb};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use serde::{Deserialize, Serialize};

use super::player::StreamFormat;
use crate::error::ConfigError;
use crate::spectrogram::render_loop::{validate_fft_size, FrameSource};

/// Tuning of the spectrum estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyserSettings {
    /// Weight of the previous frame when smoothing magnitudes over time (0..1)
    pub smoothing: f32,
    /// Level mapped to amplitude 0
    pub min_decibels: f32,
    /// Level mapped to amplitude 255
    pub max_decibels: f32,
}

impl Default for AnalyserSettings {
    fn default() -> Self {
        Self {
            smoothing: 0.2,
            min_decibels: -80.0,
            max_decibels: -30.0,
        }
    }
}

/// Turns the newest samples of the playback buffer into one amplitude byte
/// per frequency bin.
pub struct Analyser {
    /// FFT planner, kept so size changes reuse cached plans
    fft_planner: FftPlanner<f32>,
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    /// Blackman window for the current size
    window: Vec<f32>,
    /// Time-smoothed linear magnitudes, one per bin
    smoothed: Vec<f32>,
    /// Reused FFT input/output buffer
    spectrum: Vec<Complex<f32>>,
    /// Reused copy of the newest samples
    samples: Vec<f32>,
    /// The frame handed out by `refresh`
    frame: Vec<u8>,
    settings: AnalyserSettings,
    buffer: Arc<Mutex<HeapRb<f32>>>,
    format: Arc<StreamFormat>,
}

impl Analyser {
    pub fn new(
        buffer: Arc<Mutex<HeapRb<f32>>>,
        format: Arc<StreamFormat>,
        fft_size: usize,
        settings: AnalyserSettings,
    ) -> Result<Self, ConfigError> {
        let fft_size = validate_fft_size(fft_size)?;
        let mut fft_planner = FftPlanner::new();
        let fft = fft_planner.plan_fft_forward(fft_size);
        let settings = AnalyserSettings {
            smoothing: settings.smoothing.clamp(0.0, 1.0),
            ..settings
        };

        let mut analyser = Self {
            fft_planner,
            fft,
            fft_size,
            window: Vec::new(),
            smoothed: Vec::new(),
            spectrum: Vec::new(),
            samples: Vec::new(),
            frame: Vec::new(),
            settings,
            buffer,
            format,
        };
        analyser.allocate();
        Ok(analyser)
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    fn allocate(&mut self) {
        let n = self.fft_size;
        self.window = blackman_window(n);
        self.smoothed = vec![0.0; n / 2];
        self.spectrum = vec![Complex::new(0.0, 0.0); n];
        self.samples = vec![0.0; n];
        self.frame = vec![0; n / 2];
    }

    /// Copies the newest `fft_size` samples out of the ring buffer,
    /// zero-filling the front when fewer are available.
    fn read_samples(&mut self) {
        self.samples.fill(0.0);
        if let Ok(buf) = self.buffer.lock() {
            let available = buf.occupied_len();
            let take = available.min(self.fft_size);
            let skip = available - take;
            let offset = self.fft_size - take;
            for (slot, &sample) in self.samples[offset..]
                .iter_mut()
                .zip(buf.iter().skip(skip))
            {
                *slot = sample;
            }
        }
    }

    /// Runs one analysis pass over `self.samples`.
    fn analyse(&mut self) {
        let n = self.fft_size;
        for ((out, &sample), &w) in self.spectrum.iter_mut().zip(&self.samples).zip(&self.window) {
            *out = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.spectrum);

        let tau = self.settings.smoothing;
        let scale = 1.0 / n as f32;
        let min_db = self.settings.min_decibels;
        let db_range = self.settings.max_decibels - min_db;
        let byte_scale = if db_range > 0.0 { 255.0 / db_range } else { 0.0 };

        for ((smoothed, out), c) in self
            .smoothed
            .iter_mut()
            .zip(self.frame.iter_mut())
            .zip(&self.spectrum)
        {
            let magnitude = c.norm() * scale;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;
            let db = 20.0 * smoothed.log10();
            // Silence gives -inf dB, which saturates to 0.
            *out = (byte_scale * (db - min_db)).floor().clamp(0.0, 255.0) as u8;
        }
    }

    /// Analyses explicit samples instead of the playback buffer. The newest
    /// `fft_size` samples are used.
    pub fn process(&mut self, samples: &[f32]) -> &[u8] {
        self.samples.fill(0.0);
        let take = samples.len().min(self.fft_size);
        let offset = self.fft_size - take;
        self.samples[offset..].copy_from_slice(&samples[samples.len() - take..]);
        self.analyse();
        &self.frame
    }
}

impl FrameSource for Analyser {
    fn sample_rate(&self) -> u32 {
        self.format.sample_rate()
    }

    fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    fn refresh(&mut self) -> &[u8] {
        self.read_samples();
        self.analyse();
        &self.frame
    }

    fn set_fft_size(&mut self, fft_size: usize) -> Result<(), ConfigError> {
        let fft_size = validate_fft_size(fft_size)?;
        if fft_size != self.fft_size {
            self.fft_size = fft_size;
            self.fft = self.fft_planner.plan_fft_forward(fft_size);
            self.allocate();
        }
        Ok(())
    }
}

fn blackman_window(n: usize) -> Vec<f32> {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;
    (0..n)
        .map(|i| {
            let x = i as f32 / n as f32;
            A0 - A1 * (2.0 * PI * x).cos() + A2 * (4.0 * PI * x).cos()
        })
        .collect()
}
