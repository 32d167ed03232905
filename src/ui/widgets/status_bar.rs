// src/ui/widgets/status_bar.rs
//! Status bar: track, loop state, live settings and key help.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    audio::TrackInfo,
    spectrogram::{labels::format_frequency, ColorConfig, LoopState, ScaleConfig},
    ui::keybindings::HELP,
};

/// Everything the status bar shows, borrowed from the app for one draw.
pub struct StatusInfo<'a> {
    pub file_name: &'a str,
    pub track: Option<&'a TrackInfo>,
    pub state: LoopState,
    pub paused: bool,
    pub fps: Option<f32>,
    /// Channel count of the playing stream
    pub channels: u16,
    pub scale: &'a ScaleConfig,
    pub color: &'a ColorConfig,
    pub fft_size: usize,
    pub tick_count: u32,
    pub scroll_speed: u32,
    pub labels: bool,
    /// Reason the input could not be opened
    pub error: Option<&'a str>,
    /// Short-lived feedback such as a rejected setting
    pub notice: Option<&'a str>,
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

fn frequency_text(frequency: f32) -> String {
    let (value, units) = format_frequency(frequency);
    format!("{value} {units}")
}

/// The three status lines.
pub fn status_lines(info: &StatusInfo<'_>) -> Vec<Line<'static>> {
    let name = info
        .track
        .and_then(TrackInfo::display_name)
        .unwrap_or_else(|| info.file_name.to_string());

    let mut first = vec![Span::styled(
        name,
        Style::default().add_modifier(Modifier::BOLD),
    )];
    match (info.error, info.state) {
        (Some(error), _) => {
            first.push(Span::styled(
                format!("  unavailable: {error}"),
                Style::default().fg(Color::Red),
            ));
        }
        (None, LoopState::Idle) => {
            first.push(Span::styled("  waiting for audio", Style::default().fg(Color::Gray)));
        }
        (None, LoopState::Running) => {
            let (label, color) = if info.paused {
                ("  paused", Color::Yellow)
            } else {
                ("  running", Color::Green)
            };
            first.push(Span::styled(label, Style::default().fg(color)));
            first.push(Span::raw(format!(
                "  {} Hz {} ch",
                info.scale.sample_rate, info.channels
            )));
            if let Some(fps) = info.fps {
                first.push(Span::raw(format!("  {fps:.1} fps")));
            }
        }
    }
    if let Some(notice) = info.notice {
        first.push(Span::styled(
            format!("  {notice}"),
            Style::default().fg(Color::Yellow),
        ));
    }

    let second = Line::from(format!(
        "{}..{} {}  fft {}  ticks {}  speed {}  {}  log-int {} x{:.1}  labels {}",
        frequency_text(info.scale.min_frequency),
        frequency_text(info.scale.max_frequency),
        if info.scale.logarithmic { "log" } else { "lin" },
        info.fft_size,
        info.tick_count,
        info.scroll_speed,
        if info.color.use_hue { "hue" } else { "gray" },
        on_off(info.color.logarithmic_intensity),
        info.color.intensity_factor(),
        on_off(info.labels),
    ));

    let third = Line::from(Span::styled(HELP, Style::default().fg(Color::DarkGray)));

    vec![Line::from(first), second, third]
}

/// Render the status bar.
pub fn render_status_bar(f: &mut Frame<'_>, area: Rect, info: &StatusInfo<'_>) {
    f.render_widget(Paragraph::new(status_lines(info)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn info<'a>(scale: &'a ScaleConfig, color: &'a ColorConfig) -> StatusInfo<'a> {
        StatusInfo {
            file_name: "song.flac",
            track: None,
            state: LoopState::Running,
            paused: false,
            fps: Some(30.0),
            channels: 2,
            scale,
            color,
            fft_size: 2048,
            tick_count: 10,
            scroll_speed: 2,
            labels: true,
            error: None,
            notice: None,
        }
    }

    #[test]
    fn running_line_shows_rate_and_fps() {
        let scale = ScaleConfig::new(4000.0, 16000.0, 48000, 1024);
        let color = ColorConfig::default();
        let lines = status_lines(&info(&scale, &color));
        assert_eq!(text(&lines[0]), "song.flac  running  48000 Hz 2 ch  30.0 fps");
        assert_eq!(
            text(&lines[1]),
            "4.0 kHz..16.0 kHz lin  fft 2048  ticks 10  speed 2  gray  log-int off x3.0  labels on"
        );
    }

    #[test]
    fn error_replaces_state() {
        let scale = ScaleConfig::new(4000.0, 16000.0, 48000, 1024);
        let color = ColorConfig::default();
        let mut status = info(&scale, &color);
        status.state = LoopState::Idle;
        status.error = Some("no audio output device");
        let lines = status_lines(&status);
        assert_eq!(text(&lines[0]), "song.flac  unavailable: no audio output device");
    }

    #[test]
    fn track_tags_win_over_file_name() {
        let scale = ScaleConfig::new(4000.0, 16000.0, 48000, 1024);
        let color = ColorConfig::default();
        let track = TrackInfo {
            title: Some("Tone".into()),
            ..TrackInfo::default()
        };
        let mut status = info(&scale, &color);
        status.track = Some(&track);
        status.paused = true;
        status.fps = None;
        status.channels = 1;
        assert_eq!(text(&status_lines(&status)[0]), "Tone  paused  48000 Hz 1 ch");
    }
}
