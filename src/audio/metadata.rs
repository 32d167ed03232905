// src/audio/metadata.rs
//! Track information for the status bar, read with Lofty.

use std::path::Path;

use anyhow::{Context, Result};
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::Accessor;

/// What the status bar shows about the playing file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u8>,
    /// Total track length in seconds.
    pub duration_secs: u64,
}

impl TrackInfo {
    /// "Artist - Title", falling back to whichever part exists.
    pub fn display_name(&self) -> Option<String> {
        match (&self.artist, &self.title) {
            (Some(artist), Some(title)) => Some(format!("{artist} - {title}")),
            (None, Some(title)) => Some(title.clone()),
            (Some(artist), None) => Some(artist.clone()),
            (None, None) => None,
        }
    }
}

/// Load track information without touching player state.
/// This is safe to call from a background thread.
pub fn load_track_info(path: &Path) -> Result<TrackInfo> {
    let tagged_file = Probe::open(path)
        .with_context(|| format!("cannot open {}", path.display()))?
        .read()
        .with_context(|| format!("cannot read tags of {}", path.display()))?;

    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag());
    let title = tag.and_then(|t| t.title()).map(|s| s.into_owned());
    let artist = tag.and_then(|t| t.artist()).map(|s| s.into_owned());

    let props = tagged_file.properties();
    Ok(TrackInfo {
        title,
        artist,
        sample_rate: props.sample_rate(),
        channels: props.channels(),
        duration_secs: props.duration().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_combines_tags() {
        let mut info = TrackInfo {
            title: Some("Song".into()),
            artist: Some("Band".into()),
            ..TrackInfo::default()
        };
        assert_eq!(info.display_name().as_deref(), Some("Band - Song"));
        info.artist = None;
        assert_eq!(info.display_name().as_deref(), Some("Song"));
        info.title = None;
        assert_eq!(info.display_name(), None);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_track_info(Path::new("/nonexistent/track.flac")).is_err());
    }
}
