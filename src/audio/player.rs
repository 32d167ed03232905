// src/audio/player.rs
//! Playback engine using rodio, tapping decoded samples for analysis.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::{Context, Result};
use log::{debug, info};
use ringbuf::{traits::*, HeapRb};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use super::sample_capture::SampleCapture;
use crate::spectrogram::render_loop::{DEFAULT_SAMPLE_RATE, MAX_FFT_SIZE};

/// Commands sent to the audio playback thread.
enum PlayerCommand {
    Play(PathBuf),
    Pause,
    Resume,
    Stop,
}

/// Outcome of a play request, reported back from the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Playback started with the given format
    Started { sample_rate: u32, channels: u16 },
    /// The file could not be played; the message says why
    Failed(String),
}

/// Format of the stream currently feeding the sample buffer.
#[derive(Debug)]
pub struct StreamFormat {
    sample_rate: AtomicU32,
    channels: AtomicU16,
}

impl StreamFormat {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate: AtomicU32::new(sample_rate),
            channels: AtomicU16::new(channels),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.load(Ordering::Relaxed)
    }

    pub fn channels(&self) -> u16 {
        self.channels.load(Ordering::Relaxed)
    }

    fn store(&self, sample_rate: u32, channels: u16) {
        self.sample_rate.store(sample_rate, Ordering::Relaxed);
        self.channels.store(channels, Ordering::Relaxed);
    }
}

impl Default for StreamFormat {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE, 1)
    }
}

/// Plays one file at a time on a background thread and exposes the decoded
/// signal as a mono ring buffer.
pub struct Player {
    /// Sender to the audio thread for commands
    cmd_tx: Sender<PlayerCommand>,
    /// Results of play requests
    event_rx: Receiver<PlayerEvent>,
    /// Pause flag mirrored from the audio thread for quick UI access
    is_paused_flag: Arc<AtomicBool>,
    /// Newest mono samples, large enough for the biggest transform
    pub sample_buffer: Arc<Mutex<HeapRb<f32>>>,
    pub format: Arc<StreamFormat>,
}

impl Player {
    /// Create an idle player.
    pub fn new() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<PlayerCommand>();
        let (event_tx, event_rx) = mpsc::channel::<PlayerEvent>();

        let is_paused_flag = Arc::new(AtomicBool::new(false));
        let sample_buffer = Arc::new(Mutex::new(HeapRb::<f32>::new(MAX_FFT_SIZE)));
        let format = Arc::new(StreamFormat::default());

        let shared = Shared {
            paused: is_paused_flag.clone(),
            buffer: sample_buffer.clone(),
            format: format.clone(),
        };

        // The audio thread owns the OutputStream, which is not Send.
        thread::spawn(move || audio_thread(cmd_rx, event_tx, shared));

        Self {
            cmd_tx,
            event_rx,
            is_paused_flag,
            sample_buffer,
            format,
        }
    }

    /// Stop any existing playback and start playing `path`. The outcome
    /// arrives later through [`Player::poll_event`].
    pub fn play(&mut self, path: &Path) {
        let _ = self.cmd_tx.send(PlayerCommand::Play(path.to_path_buf()));
    }

    /// Next pending play outcome, if any.
    pub fn poll_event(&self) -> Option<PlayerEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Pause playback if currently playing.
    pub fn pause(&mut self) {
        let _ = self.cmd_tx.send(PlayerCommand::Pause);
    }

    /// Resume playback if currently paused.
    pub fn resume(&mut self) {
        let _ = self.cmd_tx.send(PlayerCommand::Resume);
    }

    /// Immediately halt playback (if any).
    pub fn stop(&mut self) {
        let _ = self.cmd_tx.send(PlayerCommand::Stop);
    }

    /// Returns true if playback is currently paused.
    pub fn is_paused(&self) -> bool {
        self.is_paused_flag.load(Ordering::SeqCst)
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// State the audio thread shares with the UI side.
struct Shared {
    paused: Arc<AtomicBool>,
    buffer: Arc<Mutex<HeapRb<f32>>>,
    format: Arc<StreamFormat>,
}

fn audio_thread(rx: Receiver<PlayerCommand>, events: Sender<PlayerEvent>, shared: Shared) {
    let (stream, handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            // Without an output device every play request fails.
            let reason = format!("no audio output device: {e}");
            while let Ok(cmd) = rx.recv() {
                if let PlayerCommand::Play(_) = cmd {
                    let _ = events.send(PlayerEvent::Failed(reason.clone()));
                }
            }
            return;
        }
    };

    let mut sink: Option<Sink> = None;

    while let Ok(cmd) = rx.recv() {
        match cmd {
            PlayerCommand::Play(path) => {
                if let Some(s) = sink.take() {
                    s.stop();
                }
                if let Ok(mut buf) = shared.buffer.lock() {
                    buf.clear();
                }

                match start_playback(&handle, &path, &shared) {
                    Ok((new_sink, sample_rate, channels)) => {
                        info!("Playing {} ({sample_rate} Hz, {channels} ch)", path.display());
                        shared.paused.store(false, Ordering::SeqCst);
                        sink = Some(new_sink);
                        let _ = events.send(PlayerEvent::Started {
                            sample_rate,
                            channels,
                        });
                    }
                    Err(e) => {
                        let _ = events.send(PlayerEvent::Failed(format!("{e:#}")));
                    }
                }
            }
            PlayerCommand::Pause => {
                if let Some(s) = &sink {
                    s.pause();
                    shared.paused.store(true, Ordering::SeqCst);
                }
            }
            PlayerCommand::Resume => {
                if let Some(s) = &sink {
                    s.play();
                    shared.paused.store(false, Ordering::SeqCst);
                }
            }
            PlayerCommand::Stop => {
                if let Some(s) = sink.take() {
                    s.stop();
                }
                shared.paused.store(false, Ordering::SeqCst);
            }
        }
    }

    if let Some(s) = sink.take() {
        s.stop();
    }
    debug!("Audio thread exiting");
    // Keep stream alive until thread exits
    drop(stream);
}

fn start_playback(
    handle: &OutputStreamHandle,
    path: &Path,
    shared: &Shared,
) -> Result<(Sink, u32, u16)> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let source = Decoder::new(BufReader::new(file))
        .with_context(|| format!("cannot decode {}", path.display()))?;
    let sink = Sink::try_new(handle).context("cannot create playback sink")?;

    let sample_rate = source.sample_rate();
    let channels = source.channels();
    shared.format.store(sample_rate, channels);

    let capturing = SampleCapture::new(source.convert_samples::<f32>(), shared.buffer.clone());
    sink.append(capturing);
    sink.play();
    Ok((sink, sample_rate, channels))
}
