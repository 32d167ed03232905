// src/audio/sample_capture.rs
//! A wrapper source that taps playback into a mono ring buffer for analysis.

use std::sync::{Arc, Mutex};

use ringbuf::{traits::*, HeapRb};
use rodio::Source;

/// Passes samples through unchanged while pushing a mono downmix of every
/// interleaved frame into a shared ring buffer.
pub struct SampleCapture<S> {
    source: S,
    buffer: Arc<Mutex<HeapRb<f32>>>,
    channels: u16,
    /// Running sum of the current interleaved frame
    frame_sum: f32,
    /// Samples seen so far in the current frame
    frame_len: u16,
}

impl<S: Source<Item = f32>> SampleCapture<S> {
    /// Create a new sample capture wrapper around an existing source.
    pub fn new(source: S, buffer: Arc<Mutex<HeapRb<f32>>>) -> Self {
        let channels = source.channels().max(1);
        Self {
            source,
            buffer,
            channels,
            frame_sum: 0.0,
            frame_len: 0,
        }
    }

    fn push_mono(&mut self, sample: f32) {
        if let Ok(mut buf) = self.buffer.lock() {
            // Overwrite the oldest sample when full
            if buf.is_full() {
                let _ = buf.try_pop();
            }
            let _ = buf.try_push(sample);
        }
    }
}

impl<S> Iterator for SampleCapture<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = self.source.next()?;
        self.frame_sum += sample;
        self.frame_len += 1;
        if self.frame_len >= self.channels {
            let mono = self.frame_sum / self.channels as f32;
            self.frame_sum = 0.0;
            self.frame_len = 0;
            self.push_mono(mono);
        }
        Some(sample)
    }
}

impl<S> Source for SampleCapture<S>
where
    S: Source<Item = f32>,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.source.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.source.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.source.sample_rate()
    }

    fn total_duration(&self) -> Option<std::time::Duration> {
        self.source.total_duration()
    }
}
