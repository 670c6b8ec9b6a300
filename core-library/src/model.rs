//! Domain models for the player core.
//!
//! Songs are canonical records owned by the [`crate::Catalog`]; playlists and
//! every derived container reference them by [`SongId`] only.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ID Types
// =============================================================================

/// Unique identifier for a song, unique within the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(pub i64);

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a playlist.
///
/// Id 0 is reserved for the synthetic library playlist; negative ids are
/// ephemeral contexts (local files, album view, search results, history) and
/// are never persisted as user playlists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(pub i64);

impl PlaylistId {
    /// The synthetic "Your Library" playlist.
    pub const LIBRARY: PlaylistId = PlaylistId(0);

    /// The reserved local-files playlist.
    pub const LOCAL_FILES: PlaylistId = PlaylistId(-1);

    /// Ephemeral contexts (negative ids) are never persisted.
    pub fn is_ephemeral(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// Where a song's audio comes from. Exactly one source per song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackSource {
    /// Audio hosted at a remote HTTP(S) URL.
    Remote { url: String },
    /// Audio backed by a local file, addressed through a file-backed URL.
    LocalFile { url: String },
}

impl TrackSource {
    /// The URL handed to the output device.
    pub fn url(&self) -> &str {
        match self {
            TrackSource::Remote { url } => url,
            TrackSource::LocalFile { url } => url,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, TrackSource::LocalFile { .. })
    }
}

/// A song in the catalog.
///
/// Immutable except for `is_liked` and the duration pair, which is refined
/// once the output device reports real metadata for local files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Human-readable duration, e.g. `"3:30"`.
    pub duration: String,
    pub duration_secs: f64,
    pub cover_art: String,
    pub source: TrackSource,
    pub lyrics: Option<String>,
    pub is_liked: bool,
}

impl Song {
    /// A song backed by a remote URL.
    pub fn remote(
        id: i64,
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        duration_secs: f64,
        cover_art: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: SongId(id),
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            duration: format_duration(duration_secs),
            duration_secs,
            cover_art: cover_art.into(),
            source: TrackSource::Remote { url: url.into() },
            lyrics: None,
            is_liked: false,
        }
    }

    pub fn with_lyrics(mut self, lyrics: impl Into<String>) -> Self {
        self.lyrics = Some(lyrics.into());
        self
    }

    pub fn liked(mut self) -> Self {
        self.is_liked = true;
        self
    }
}

/// An ordered list of song references with display metadata.
///
/// Order is meaningful: it is playback order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    pub cover_art: String,
    pub song_ids: Vec<SongId>,
}

impl Playlist {
    pub fn contains(&self, song_id: SongId) -> bool {
        self.song_ids.contains(&song_id)
    }

    pub fn position_of(&self, song_id: SongId) -> Option<usize> {
        self.song_ids.iter().position(|&id| id == song_id)
    }

    pub fn len(&self) -> usize {
        self.song_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.song_ids.is_empty()
    }
}

/// A read-only projection grouping catalog songs sharing (name, artist).
/// Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    pub artist: String,
    pub cover_art: String,
    pub songs: Vec<Song>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Formats seconds as `m:ss`. Non-finite or negative input yields `"0:00"`.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

// =============================================================================
// Tests
// =============================================================================
