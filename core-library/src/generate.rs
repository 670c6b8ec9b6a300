//! # Playlist Generation
//!
//! Turns a free-text prompt into a playlist. The text backend sits behind the
//! [`SongIdeaSource`] trait; `provider-gemini` supplies the hosted
//! implementation. Every failure path degrades to a user notice and leaves
//! the store untouched.

use crate::error::{LibraryError, Result};
use crate::model::{format_duration, PlaylistId, Song, SongId, TrackSource};
use crate::store::SharedLibrary;
use async_trait::async_trait;
use core_runtime::{Notifier, PlayerConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A song suggestion from the generative backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongIdea {
    pub title: String,
    pub artist: String,
}

/// Failure reported by a [`SongIdeaSource`] implementation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct IdeaSourceError(pub String);

/// Seam to the generative-text backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SongIdeaSource: Send + Sync {
    /// Asks for `count` song ideas matching `prompt`.
    async fn song_ideas(
        &self,
        prompt: &str,
        count: usize,
    ) -> std::result::Result<Vec<SongIdea>, IdeaSourceError>;
}

// Placeholder audio pool cycled through for generated songs.
const SAMPLE_AUDIO_POOL: usize = 16;
const MAX_NAME_LEN: usize = 25;
const TRUNCATED_NAME_LEN: usize = 22;

/// Materializes generated playlists into the library store.
pub struct PlaylistGenerator {
    library: SharedLibrary,
    notifier: Notifier,
    config: PlayerConfig,
}

impl PlaylistGenerator {
    pub fn new(library: SharedLibrary, notifier: Notifier, config: PlayerConfig) -> Self {
        Self {
            library,
            notifier,
            config,
        }
    }

    /// Generates a playlist from `prompt`.
    ///
    /// On success the playlist is prepended to the playlist list and selected
    /// as the viewed playlist; the caller is expected to install it as the
    /// playback context. Backend failure and empty responses abort with a
    /// notice and no state change.
    pub async fn generate(&self, source: &dyn SongIdeaSource, prompt: &str) -> Result<PlaylistId> {
        let ideas = match source
            .song_ideas(prompt, self.config.generated_playlist_size)
            .await
        {
            Ok(ideas) => ideas,
            Err(e) => {
                tracing::error!(error = %e, "playlist generation failed");
                self.notifier
                    .notify("Failed to generate playlist. Please try again.");
                return Err(e.into());
            }
        };

        if ideas.is_empty() {
            self.notifier
                .notify("Could not generate a playlist from that prompt.");
            return Err(LibraryError::EmptyGeneration);
        }

        let mut store = self.library.write();

        // Time-based seed keeps generated ids unique within the session;
        // bumped past any collision with existing catalog entries.
        let mut seed = chrono::Utc::now().timestamp_millis();
        while store.song(SongId(seed)).is_some() || store.playlist(PlaylistId(seed)).is_some() {
            seed += 1;
        }

        let placeholder_secs = self.config.placeholder_duration_secs;
        let songs: Vec<Song> = ideas
            .into_iter()
            .enumerate()
            .map(|(index, idea)| {
                let id = seed + 1 + index as i64;
                Song {
                    id: SongId(id),
                    title: idea.title,
                    artist: idea.artist,
                    album: prompt.to_string(),
                    duration: format_duration(placeholder_secs),
                    duration_secs: placeholder_secs,
                    cover_art: format!("https://picsum.photos/seed/{id}/300/300"),
                    source: TrackSource::Remote {
                        url: sample_audio_url(index),
                    },
                    lyrics: None,
                    is_liked: false,
                }
            })
            .collect();

        let playlist_id = PlaylistId(seed);
        let name = display_name(prompt);
        store.prepend_playlist(
            playlist_id,
            name.clone(),
            format!("https://picsum.photos/seed/{seed}/300/300"),
            songs,
        )?;
        store.select_playlist(playlist_id)?;
        drop(store);

        self.notifier
            .notify(format!("AI Playlist \"{name}\" created!"));
        Ok(playlist_id)
    }
}

/// Round-robin placeholder audio for generated songs.
fn sample_audio_url(index: usize) -> String {
    format!(
        "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-{}.mp3",
        (index % SAMPLE_AUDIO_POOL) + 1
    )
}

/// Truncates an overly long prompt into a display name.
fn display_name(prompt: &str) -> String {
    if prompt.chars().count() > MAX_NAME_LEN {
        let head: String = prompt.chars().take(TRUNCATED_NAME_LEN).collect();
        format!("{head}...")
    } else {
        prompt.to_string()
    }
}
