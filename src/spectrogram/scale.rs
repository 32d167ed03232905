// src/spectrogram/scale.rs
//! Frequency scaling: maps frequencies and display positions to FFT bins.

/// Amount (Hz) the opposite bound is pushed when an update would make the
/// frequency range empty.
pub const BOUND_MARGIN_HZ: f32 = 10.0;

/// Base of the logarithmic position warp.
const LOG_BASE: f64 = 2.0;

/// Frequency range and bin layout shared by the compositor and the axis labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleConfig {
    /// Lowest displayed frequency in Hz
    pub min_frequency: f32,
    /// Highest displayed frequency in Hz
    pub max_frequency: f32,
    /// Warp display positions logarithmically
    pub logarithmic: bool,
    /// Sample rate of the analysed signal
    pub sample_rate: u32,
    /// Number of bins per frame (half the transform size)
    pub bin_count: usize,
}

/// What a bound update did to the opposite bound, if anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundAdjustment {
    Unchanged,
    /// `max_frequency` was pushed up to the contained value
    RaisedMax(f32),
    /// `min_frequency` was pushed down to the contained value
    LoweredMin(f32),
}

impl ScaleConfig {
    pub fn new(min_frequency: f32, max_frequency: f32, sample_rate: u32, bin_count: usize) -> Self {
        let mut config = Self {
            min_frequency: 0.0,
            max_frequency: sample_rate as f32 / 2.0,
            logarithmic: false,
            sample_rate,
            bin_count,
        };
        config.set_max_frequency(max_frequency);
        config.set_min_frequency(min_frequency);
        config
    }

    /// Half the sample rate.
    pub fn nyquist(&self) -> f32 {
        self.sample_rate as f32 / 2.0
    }

    /// Bin closest to `frequency`. Out-of-range input clamps to the first or
    /// last bin.
    pub fn index_for_frequency(&self, frequency: f32) -> usize {
        let nyquist = self.nyquist();
        if nyquist <= 0.0 {
            return 0;
        }
        let ratio = (frequency / nyquist).clamp(0.0, 1.0);
        (ratio * self.bin_count as f32).round() as usize
    }

    /// Centre frequency of `index`.
    pub fn frequency_for_index(&self, index: usize) -> f32 {
        if self.bin_count == 0 {
            return 0.0;
        }
        self.nyquist() / self.bin_count as f32 * index as f32
    }

    pub fn min_index(&self) -> usize {
        self.index_for_frequency(self.min_frequency)
    }

    pub fn max_index(&self) -> usize {
        self.index_for_frequency(self.max_frequency)
    }

    /// Bin to sample for linear position `index` out of `total` positions.
    pub fn sample_index(&self, index: usize, total: usize) -> usize {
        if self.logarithmic {
            scaled_index(index, total)
        } else {
            index
        }
    }

    /// Sets the lower bound. If it reaches the upper bound, the upper bound
    /// is pushed to `min + BOUND_MARGIN_HZ`.
    pub fn set_min_frequency(&mut self, frequency: f32) -> BoundAdjustment {
        let ceiling = (self.nyquist() - BOUND_MARGIN_HZ).max(0.0);
        let frequency = sanitize(frequency).clamp(0.0, ceiling);
        self.min_frequency = frequency;

        if frequency >= self.max_frequency {
            self.max_frequency = (frequency + BOUND_MARGIN_HZ).min(self.nyquist());
            BoundAdjustment::RaisedMax(self.max_frequency)
        } else {
            BoundAdjustment::Unchanged
        }
    }

    /// Sets the upper bound. If it reaches the lower bound, the lower bound
    /// is pushed to `max - BOUND_MARGIN_HZ`.
    pub fn set_max_frequency(&mut self, frequency: f32) -> BoundAdjustment {
        let floor = BOUND_MARGIN_HZ.min(self.nyquist());
        let frequency = sanitize(frequency).clamp(floor, self.nyquist().max(floor));
        self.max_frequency = frequency;

        if frequency <= self.min_frequency {
            self.min_frequency = (frequency - BOUND_MARGIN_HZ).max(0.0);
            BoundAdjustment::LoweredMin(self.min_frequency)
        } else {
            BoundAdjustment::Unchanged
        }
    }

    /// Adopts a new sample rate, shrinking the range if it no longer fits
    /// below Nyquist.
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
        let max = self.max_frequency;
        let min = self.min_frequency;
        self.set_max_frequency(max);
        self.set_min_frequency(min.min(self.max_frequency - BOUND_MARGIN_HZ));
    }
}

fn sanitize(frequency: f32) -> f32 {
    if frequency.is_nan() { 0.0 } else { frequency }
}

/// Logarithmically warps linear position `index` in `0..=total` onto the
/// same range, concentrating resolution at the low end.
///
/// `scaled_index(0, t) == 0` and `scaled_index(t, t) == t`. A zero `total`
/// has no meaningful warp and yields 0.
pub fn scaled_index(index: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    let log_max = ((total + 1) as f64).ln() / LOG_BASE.ln();
    let exp = log_max * index as f64 / total as f64;
    (LOG_BASE.powf(exp) - 1.0).round() as usize
}
