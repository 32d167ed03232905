// src/app/state.rs
//! Application state management.

use std::{
    path::PathBuf,
    sync::mpsc::{self, Receiver},
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::event::KeyEvent;
use log::{info, warn};
use ratatui::Frame;

use crate::{
    audio::{load_track_info, Analyser, Player, PlayerEvent, TrackInfo},
    config::{self, Settings},
    error::SpectrogramError,
    fs::ensure_audio,
    spectrogram::{BoundAdjustment, FrameSource, LoopState, Raster, RenderLoop, Surface},
    ui::{
        keybindings::{key_to_action, ControlAction, FREQUENCY_STEP, INTENSITY_STEP},
        layout::compute_layout,
        widgets::{render_status_bar, SpectrogramView, StatusInfo},
    },
};

/// How long a notice stays in the status bar.
const NOTICE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
pub struct App {
    /// The spectrogram instance
    pub render: RenderLoop<Analyser>,
    /// Music player instance
    pub player: Player,
    /// Settings as loaded, updated on save
    pub settings: Settings,
    /// Where `w` writes the settings
    config_path: Option<PathBuf>,
    /// File being visualized
    file: PathBuf,
    file_name: String,
    /// Tags of the current file, once the background loader is done
    pub track: Option<TrackInfo>,
    meta_rx: Option<Receiver<TrackInfo>>,
    /// Why the input could not be opened; set at most once
    pub upstream_error: Option<String>,
    notice: Option<(String, Instant)>,
}

impl App {
    /// Create a new application instance. Nothing plays until [`App::start`].
    pub fn new(settings: Settings, config_path: Option<PathBuf>, file: PathBuf) -> Result<Self> {
        let render = RenderLoop::new(settings.render_options(), Raster::default(), Raster::default())
            .context("Invalid spectrogram settings")?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());

        Ok(Self {
            render,
            player: Player::new(),
            settings,
            config_path,
            file,
            file_name,
            track: None,
            meta_rx: None,
            upstream_error: None,
            notice: None,
        })
    }

    /// Check the input file and start playback. The spectrogram attaches
    /// once the player reports back in [`App::poll_player`].
    pub fn start(&mut self) {
        if let Err(e) = ensure_audio(&self.file) {
            self.fail(format!("{e:#}"));
            return;
        }
        self.player.play(&self.file);

        // Spawn a background thread to load track info
        let (tx, rx) = mpsc::channel();
        let path = self.file.clone();
        thread::spawn(move || match load_track_info(&path) {
            Ok(info) => {
                let _ = tx.send(info);
            }
            Err(e) => warn!("No track info: {e:#}"),
        });
        self.meta_rx = Some(rx);
    }

    /// Reports the input as unavailable. Only the first failure counts.
    fn fail(&mut self, reason: String) {
        if self.upstream_error.is_some() {
            return;
        }
        let _ = self
            .render
            .attach(Err(SpectrogramError::UpstreamUnavailable(reason.clone())));
        self.upstream_error = Some(reason);
    }

    /// Handle pending play outcomes from the audio thread.
    pub fn poll_player(&mut self) {
        while let Some(event) = self.player.poll_event() {
            match event {
                PlayerEvent::Started {
                    sample_rate,
                    channels,
                } => {
                    if self.render.state() == LoopState::Running {
                        continue;
                    }
                    info!("Attaching analyser to {sample_rate} Hz / {channels} ch stream");
                    let analyser = Analyser::new(
                        self.player.sample_buffer.clone(),
                        self.player.format.clone(),
                        self.render.fft_size(),
                        self.settings.analysis.analyser(),
                    )
                    .map_err(SpectrogramError::from);
                    if let Err(e) = self.render.attach(analyser) {
                        self.upstream_error.get_or_insert(e.to_string());
                    }
                }
                PlayerEvent::Failed(reason) => self.fail(reason),
            }
        }
    }

    /// Process any pending track info from the background loader.
    pub fn process_metadata(&mut self) {
        if let Some(info) = self.meta_rx.as_ref().and_then(|rx| rx.try_recv().ok()) {
            self.track = Some(info);
            self.meta_rx = None;
        }
    }

    /// Advance the spectrogram one frame. The image freezes while paused.
    pub fn tick(&mut self, width: u32, height: u32) -> bool {
        if self.player.is_paused() {
            self.render.pause_timing();
            return false;
        }
        self.render.tick(width, height)
    }

    /// Handle a key event and return true if the app should quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        match key_to_action(&key) {
            ControlAction::Quit => {
                self.player.stop();
                return true;
            }
            ControlAction::TogglePause => {
                if self.player.is_paused() {
                    self.player.resume();
                } else {
                    self.player.pause();
                }
            }
            ControlAction::SaveSettings => {
                let message = match self.save_settings() {
                    Ok(path) => format!("saved {}", path.display()),
                    Err(e) => {
                        warn!("{e:#}");
                        format!("{e:#}")
                    }
                };
                self.set_notice(message);
            }
            ControlAction::None => {}
            action => {
                if let Some(message) = apply_control(&mut self.render, action) {
                    self.set_notice(message);
                }
            }
        }
        false
    }

    fn save_settings(&mut self) -> Result<PathBuf> {
        let path = self
            .config_path
            .clone()
            .or_else(config::config_path)
            .context("Could not determine config directory")?;
        self.settings.capture(&self.render);
        self.settings.save(&path)?;
        Ok(path)
    }

    fn set_notice(&mut self, message: String) {
        self.notice = Some((message, Instant::now()));
    }

    /// Current notice, if it is still fresh.
    pub fn notice(&self) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|(_, at)| at.elapsed() < NOTICE_TTL)
            .map(|(message, _)| message.as_str())
    }

    /// Draw the application UI.
    pub fn draw(&self, f: &mut Frame<'_>) {
        let layout = compute_layout(f.area());

        let labels = self
            .render
            .labels_enabled()
            .then(|| self.render.label_layer());
        f.render_widget(
            SpectrogramView::new(self.render.image()).labels(labels),
            layout.spectrogram,
        );

        let status = StatusInfo {
            file_name: &self.file_name,
            track: self.track.as_ref(),
            state: self.render.state(),
            paused: self.player.is_paused(),
            fps: self.render.stats().fps(),
            channels: self.player.format.channels(),
            scale: self.render.scale(),
            color: self.render.color(),
            fft_size: self.render.fft_size(),
            tick_count: self.render.tick_count(),
            scroll_speed: self.render.canvas().scroll_speed,
            labels: self.render.labels_enabled(),
            error: self.upstream_error.as_deref(),
            notice: self.notice(),
        };
        render_status_bar(f, layout.status, &status);
    }
}

/// Applies one configuration key to the render loop. Returns a message for
/// the status bar when the change was rejected or adjusted.
pub fn apply_control<F: FrameSource, S: Surface>(
    render: &mut RenderLoop<F, S>,
    action: ControlAction,
) -> Option<String> {
    let scale = render.scale().clone();
    let result = match action {
        ControlAction::ToggleLogScale => {
            render.set_logarithmic(!scale.logarithmic);
            Ok(())
        }
        ControlAction::ToggleHue => {
            render.set_use_hue(!render.color().use_hue);
            Ok(())
        }
        ControlAction::ToggleLogIntensity => {
            render.set_logarithmic_intensity(!render.color().logarithmic_intensity);
            Ok(())
        }
        ControlAction::ToggleLabels => {
            render.set_labels(!render.labels_enabled());
            Ok(())
        }
        ControlAction::IntensityUp => {
            render.set_intensity_factor(render.color().intensity_factor() + INTENSITY_STEP)
        }
        ControlAction::IntensityDown => {
            render.set_intensity_factor(render.color().intensity_factor() - INTENSITY_STEP)
        }
        ControlAction::MinFrequencyDown => {
            return adjustment_notice(render.set_min_frequency(scale.min_frequency - FREQUENCY_STEP));
        }
        ControlAction::MinFrequencyUp => {
            return adjustment_notice(render.set_min_frequency(scale.min_frequency + FREQUENCY_STEP));
        }
        ControlAction::MaxFrequencyDown => {
            return adjustment_notice(render.set_max_frequency(scale.max_frequency - FREQUENCY_STEP));
        }
        ControlAction::MaxFrequencyUp => {
            return adjustment_notice(render.set_max_frequency(scale.max_frequency + FREQUENCY_STEP));
        }
        ControlAction::MoreTicks => render.set_ticks(render.tick_count() + 1),
        ControlAction::FewerTicks => render.set_ticks(render.tick_count().saturating_sub(1)),
        ControlAction::SpeedUp => render.set_scroll_speed(render.canvas().scroll_speed + 1),
        ControlAction::SlowDown => {
            render.set_scroll_speed(render.canvas().scroll_speed.saturating_sub(1))
        }
        ControlAction::LargerFft => render.set_fft_size(render.fft_size() * 2),
        ControlAction::SmallerFft => render.set_fft_size(render.fft_size() / 2),
        ControlAction::SaveSettings
        | ControlAction::TogglePause
        | ControlAction::Quit
        | ControlAction::None => Ok(()),
    };
    result.err().map(|e| e.to_string())
}

fn adjustment_notice(adjustment: BoundAdjustment) -> Option<String> {
    match adjustment {
        BoundAdjustment::Unchanged => None,
        BoundAdjustment::RaisedMax(max) => Some(format!("max pushed to {max:.0} Hz")),
        BoundAdjustment::LoweredMin(min) => Some(format!("min pushed to {min:.0} Hz")),
    }
}
