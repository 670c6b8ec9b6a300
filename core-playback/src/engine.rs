//! # Player Engine
//!
//! The playback state machine. Owns the current song, the active context, the
//! upcoming queue and the play history, and drives the [`AudioOutput`] device.
//!
//! Every state transition is explicit: the engine is `Idle` until the first
//! song loads, `Loading` between `load` and the play attempt, and `Playing` or
//! `Paused` afterwards. A rejected `play` call (autoplay policy) lands in
//! `Paused` with the song loaded and seekable, never in a half-playing state.

use crate::error::{PlaybackError, Result};
use crate::history::History;
use crate::output::{AudioOutput, OutputEvent};
use crate::queue::Queue;
use core_library::{Playlist, PlaylistId, SharedLibrary, Song, SongId};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use core_runtime::PlayerConfig;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Default volume for a fresh engine.
pub const DEFAULT_VOLUME: f32 = 0.75;

// =============================================================================
// State Types
// =============================================================================

/// The engine's playback lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// No song has ever been loaded.
    Idle,
    /// A song is loading; the previous one is already paused.
    Loading,
    Playing,
    Paused,
}

/// Repeat behaviour at context boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    /// Stop after the last song of the context.
    Off,
    /// Wrap around to the first song.
    All,
    /// Restart the current song on completion.
    One,
}

impl RepeatMode {
    /// Next mode in the off -> all -> one cycle.
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatMode::Off => "off",
            RepeatMode::All => "all",
            RepeatMode::One => "one",
        }
    }
}

/// The ordered collection the current song was started from.
///
/// Sequential advance, wrap-around and shuffle all operate on this order. The
/// id ties the context back to a stored playlist when one exists; ephemeral
/// contexts (album view, search results) carry a negative id with no stored
/// counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackContext {
    pub id: PlaylistId,
    pub song_ids: Vec<SongId>,
}

impl PlaybackContext {
    pub fn new(id: PlaylistId, song_ids: Vec<SongId>) -> Self {
        Self { id, song_ids }
    }

    pub fn from_playlist(playlist: &Playlist) -> Self {
        Self {
            id: playlist.id,
            song_ids: playlist.song_ids.clone(),
        }
    }

    pub fn position_of(&self, song_id: SongId) -> Option<usize> {
        self.song_ids.iter().position(|&id| id == song_id)
    }
}

// =============================================================================
// Engine
// =============================================================================

/// The playback engine.
///
/// Generic over the output device so tests can drive it with a mock and hosts
/// can plug in whatever audio element the platform offers.
pub struct PlayerEngine<O: AudioOutput> {
    library: SharedLibrary,
    output: O,
    bus: EventBus,
    state: PlaybackState,
    current: Option<SongId>,
    context: Option<PlaybackContext>,
    queue: Queue,
    history: History,
    current_time: f64,
    duration: f64,
    volume: f32,
    muted: bool,
    shuffling: bool,
    repeat: RepeatMode,
    restart_threshold_secs: f64,
}

impl<O: AudioOutput> PlayerEngine<O> {
    pub fn new(library: SharedLibrary, output: O, bus: EventBus, config: &PlayerConfig) -> Self {
        Self {
            library,
            output,
            bus,
            state: PlaybackState::Idle,
            current: None,
            context: None,
            queue: Queue::new(),
            history: History::new(config.history_cap),
            current_time: 0.0,
            duration: 0.0,
            volume: DEFAULT_VOLUME,
            muted: false,
            shuffling: false,
            repeat: RepeatMode::Off,
            restart_threshold_secs: config.restart_threshold.as_secs_f64(),
        }
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Starts a song within a context.
    ///
    /// Requesting the song that is already current toggles play/pause instead
    /// of reloading it. Otherwise the context is installed, the queue rebuilt
    /// to everything after the song, and the previous song (if any) recorded
    /// in history.
    pub async fn play_song(&mut self, song_id: SongId, context: PlaybackContext) -> Result<()> {
        if self.current == Some(song_id) {
            return self.toggle_play_pause().await;
        }
        self.context = Some(context);
        self.switch_to(song_id, true).await
    }

    /// Resumes playback, or starts from the beginning of the context when
    /// nothing is current yet.
    pub async fn play(&mut self) -> Result<()> {
        let Some(current) = self.current else {
            return self.play_first_available().await;
        };

        match self.output.play().await {
            Ok(()) => {
                self.state = PlaybackState::Playing;
                self.bus
                    .emit(CoreEvent::Playback(PlaybackEvent::Resumed {
                        song_id: current.0,
                    }))
                    .ok();
            }
            Err(error) => {
                tracing::warn!(song_id = current.0, %error, "output rejected play");
                self.state = PlaybackState::Paused;
                self.bus
                    .emit(CoreEvent::Playback(PlaybackEvent::Error {
                        song_id: Some(current.0),
                        message: error.to_string(),
                    }))
                    .ok();
            }
        }
        Ok(())
    }

    pub async fn pause(&mut self) -> Result<()> {
        if self.state != PlaybackState::Playing {
            return Ok(());
        }
        self.output.pause().await?;
        self.state = PlaybackState::Paused;
        if let Some(current) = self.current {
            self.bus
                .emit(CoreEvent::Playback(PlaybackEvent::Paused {
                    song_id: current.0,
                    position_secs: self.current_time,
                }))
                .ok();
        }
        Ok(())
    }

    pub async fn toggle_play_pause(&mut self) -> Result<()> {
        if self.state == PlaybackState::Playing {
            self.pause().await
        } else {
            self.play().await
        }
    }

    /// Seeks to a percentage of the track, clamped to [0, 100].
    ///
    /// A no-op until a duration is known.
    pub async fn seek(&mut self, percent: f64) -> Result<()> {
        if self.duration <= 0.0 {
            return Ok(());
        }
        let percent = percent.clamp(0.0, 100.0);
        let seconds = self.duration * percent / 100.0;
        self.output.set_position(seconds).await?;
        self.current_time = seconds;
        Ok(())
    }

    /// Sets the volume, clamped to [0.0, 1.0]. A non-zero volume unmutes.
    pub async fn set_volume(&mut self, volume: f32) -> Result<()> {
        let volume = volume.clamp(0.0, 1.0);
        self.output.set_volume(volume).await?;
        self.volume = volume;
        if volume > 0.0 && self.muted {
            self.output.set_muted(false).await?;
            self.muted = false;
        }
        Ok(())
    }

    pub async fn toggle_mute(&mut self) -> Result<()> {
        let muted = !self.muted;
        self.output.set_muted(muted).await?;
        self.muted = muted;
        Ok(())
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Advances to the next song.
    ///
    /// The queue takes priority: a queued song is consumed without touching
    /// the rest of the queue. With an empty queue the context advances
    /// sequentially, wrapping only when repeat is not off; at the end of the
    /// context with repeat off playback stops on the current song, rewound.
    pub async fn next_song(&mut self) -> Result<()> {
        if let Some(next) = self.queue.pop_front() {
            self.emit_queue_changed();
            return self.switch_to(next, false).await;
        }

        let Some(context) = self.context.clone() else {
            return Ok(());
        };
        let Some(current) = self.current else {
            return Ok(());
        };
        let len = context.song_ids.len();
        if len == 0 {
            return Ok(());
        }

        let index = context
            .position_of(current)
            .map(|i| i as i64)
            .unwrap_or(-1);
        if self.repeat == RepeatMode::Off && index == len as i64 - 1 {
            // End of the context: stop, rewound to the start of the track.
            if let Err(error) = self.output.pause().await {
                tracing::warn!(%error, "pause at end of context failed");
            }
            if let Err(error) = self.output.set_position(0.0).await {
                tracing::warn!(%error, "rewind at end of context failed");
            }
            self.current_time = 0.0;
            self.state = PlaybackState::Paused;
            self.bus
                .emit(CoreEvent::Playback(PlaybackEvent::Stopped {
                    song_id: current.0,
                }))
                .ok();
            return Ok(());
        }

        let next_index = ((index + 1).rem_euclid(len as i64)) as usize;
        self.switch_to(context.song_ids[next_index], true).await
    }

    /// Moves back one song, or restarts the current one when more than the
    /// restart threshold has elapsed.
    pub async fn previous_song(&mut self) -> Result<()> {
        let Some(current) = self.current else {
            return Ok(());
        };

        let target = if self.current_time > self.restart_threshold_secs {
            None
        } else {
            self.context.as_ref().and_then(|context| {
                let len = context.song_ids.len() as i64;
                let index = context.position_of(current)? as i64;
                Some(context.song_ids[((index - 1).rem_euclid(len)) as usize])
            })
        };

        match target {
            Some(previous) => self.switch_to(previous, true).await,
            None => {
                self.output.set_position(0.0).await?;
                self.current_time = 0.0;
                Ok(())
            }
        }
    }

    // ========================================================================
    // Queue
    // ========================================================================

    /// Removes a song from the upcoming queue without affecting playback.
    pub fn remove_from_queue(&mut self, song_id: SongId) {
        self.queue.remove(song_id);
        self.emit_queue_changed();
    }

    /// Jumps to a queued song, consuming it and everything queued before it.
    pub async fn play_from_queue(&mut self, song_id: SongId) -> Result<()> {
        if self.queue.consume_through(song_id) {
            self.emit_queue_changed();
        }
        self.switch_to(song_id, false).await
    }

    // ========================================================================
    // Shuffle & Repeat
    // ========================================================================

    /// Toggles shuffle for the active context.
    ///
    /// Enabling snapshots the current order (once per context id), then
    /// reorders the context to the current song followed by the rest in
    /// random order. Disabling restores the snapshot. When the context is a
    /// stored playlist its order in the library is updated to match.
    pub fn toggle_shuffle(&mut self) -> Result<()> {
        self.shuffling = !self.shuffling;
        self.bus
            .emit(CoreEvent::Playback(PlaybackEvent::ShuffleChanged {
                enabled: self.shuffling,
            }))
            .ok();

        let (context_id, base_order) = match self.context.as_ref() {
            Some(context) => (context.id, context.song_ids.clone()),
            None => return Ok(()),
        };
        let Some(current) = self.current else {
            return Ok(());
        };

        let order = if self.shuffling {
            self.library
                .write()
                .capture_shuffle_order(context_id, base_order.clone());
            let mut rest: Vec<SongId> = base_order
                .iter()
                .copied()
                .filter(|&id| id != current)
                .collect();
            rest.shuffle(&mut rand::thread_rng());
            let mut order = Vec::with_capacity(rest.len() + 1);
            order.push(current);
            order.extend(rest);
            order
        } else {
            self.library
                .read()
                .shuffle_memento(context_id)
                .unwrap_or(base_order)
        };

        // Write the order back through the store when the context is a
        // stored playlist. The store may reconcile it (the library playlist
        // keeps its membership pinned to the liked set), so the context is
        // taken from the store's resulting order.
        let order = {
            let mut library = self.library.write();
            if library.playlist(context_id).is_some() {
                library.upsert_songs(context_id, order.clone())?;
                library
                    .playlist(context_id)
                    .map(|p| p.song_ids.clone())
                    .unwrap_or(order)
            } else {
                order
            }
        };

        self.queue.rebuild(&order, current);
        if let Some(context) = self.context.as_mut() {
            context.song_ids = order;
        }
        self.emit_queue_changed();
        Ok(())
    }

    /// Cycles repeat off -> all -> one.
    pub fn cycle_repeat(&mut self) {
        self.repeat = self.repeat.cycle();
        self.bus
            .emit(CoreEvent::Playback(PlaybackEvent::RepeatChanged {
                mode: self.repeat.as_str().to_string(),
            }))
            .ok();
    }

    // ========================================================================
    // Output Notifications
    // ========================================================================

    /// Feeds a device notification into the engine.
    pub async fn handle_output_event(&mut self, event: OutputEvent) -> Result<()> {
        match event {
            OutputEvent::TimeUpdate { position_secs } => {
                self.current_time = position_secs;
            }
            OutputEvent::MetadataLoaded { duration_secs } => {
                self.duration = duration_secs;
                if let Some(current) = self.current {
                    self.library.write().refine_duration(current, duration_secs);
                }
            }
            OutputEvent::Ended => {
                if let Some(current) = self.current {
                    self.bus
                        .emit(CoreEvent::Playback(PlaybackEvent::Completed {
                            song_id: current.0,
                        }))
                        .ok();
                }
                if self.repeat == RepeatMode::One {
                    self.output.set_position(0.0).await?;
                    self.current_time = 0.0;
                    return self.play().await;
                }
                return self.next_song().await;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_song(&self) -> Option<Song> {
        let current = self.current?;
        self.library.read().song(current).cloned()
    }

    pub fn current_song_id(&self) -> Option<SongId> {
        self.current
    }

    pub fn context(&self) -> Option<&PlaybackContext> {
        self.context.as_ref()
    }

    /// Playback progress as a percentage, 0 when no duration is known.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            self.current_time / self.duration * 100.0
        } else {
            0.0
        }
    }

    pub fn queue_songs(&self) -> Vec<Song> {
        let ids: Vec<SongId> = self.queue.ids().collect();
        self.library.read().resolve(&ids)
    }

    pub fn history_songs(&self) -> Vec<Song> {
        let ids: Vec<SongId> = self.history.ids().collect();
        self.library.read().resolve(&ids)
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    pub fn is_shuffling(&self) -> bool {
        self.shuffling
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    // ========================================================================
    // Internal
    // ========================================================================

    /// Loads and plays a song, recording the outgoing one in history.
    ///
    /// `rebuild_queue` re-derives the queue from the context; queue-driven
    /// jumps pass `false` so the remaining queue survives.
    async fn switch_to(&mut self, song_id: SongId, rebuild_queue: bool) -> Result<()> {
        let song = self
            .library
            .read()
            .song(song_id)
            .cloned()
            .ok_or(PlaybackError::UnknownSong(song_id.0))?;

        if let Some(previous) = self.current {
            self.history.push(previous);
        }
        if self.state == PlaybackState::Playing {
            if let Err(error) = self.output.pause().await {
                tracing::warn!(%error, "pausing outgoing song failed");
            }
        }

        self.current = Some(song_id);
        self.current_time = 0.0;
        self.duration = 0.0;
        self.state = PlaybackState::Loading;

        if rebuild_queue {
            if let Some(context) = &self.context {
                self.queue.rebuild(&context.song_ids, song_id);
            } else {
                self.queue.clear();
            }
            self.emit_queue_changed();
        }

        self.output.load(&song.source).await?;

        match self.output.play().await {
            Ok(()) => {
                self.state = PlaybackState::Playing;
                self.bus
                    .emit(CoreEvent::Playback(PlaybackEvent::Started {
                        song_id: song_id.0,
                        title: song.title,
                    }))
                    .ok();
            }
            Err(error) => {
                // Autoplay rejection: loaded and seekable, just not playing.
                tracing::warn!(song_id = song_id.0, %error, "output rejected play");
                self.state = PlaybackState::Paused;
                self.bus
                    .emit(CoreEvent::Playback(PlaybackEvent::Error {
                        song_id: Some(song_id.0),
                        message: error.to_string(),
                    }))
                    .ok();
            }
        }
        Ok(())
    }

    /// First song of the context, or of the first non-empty stored playlist.
    async fn play_first_available(&mut self) -> Result<()> {
        if let Some(context) = self.context.clone() {
            if let Some(&first) = context.song_ids.first() {
                return self.switch_to(first, true).await;
            }
        }

        let pick = {
            let library = self.library.read();
            library
                .playlists()
                .iter()
                .find(|p| !p.is_empty())
                .map(|p| (p.song_ids[0], PlaybackContext::from_playlist(p)))
        };
        match pick {
            Some((first, context)) => {
                self.context = Some(context);
                self.switch_to(first, true).await
            }
            None => Ok(()),
        }
    }

    fn emit_queue_changed(&self) {
        self.bus
            .emit(CoreEvent::Playback(PlaybackEvent::QueueChanged {
                remaining: self.queue.len(),
            }))
            .ok();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MockAudioOutput;
    use core_library::LibraryStore;
    use core_runtime::Notifier;
    use std::time::Duration;

    fn seeded_library(bus: &EventBus) -> SharedLibrary {
        let notifier = Notifier::new(bus.clone(), Duration::from_secs(3));
        let mut store = LibraryStore::new(bus.clone(), notifier);
        let songs = vec![
            Song::remote(1, "Morning Dew", "Lo-Fi Geek", "Coffee Shop Vibes", 165.0, "", "u1"),
            Song::remote(2, "Sunset Drive", "Synth Wave", "Retro Dreams", 192.0, "", "u2"),
            Song::remote(3, "Rainy Night", "Jazz Hop Cafe", "Midnight Moods", 210.0, "", "u3"),
        ];
        store
            .insert_playlist(PlaylistId(1), "Chill Beats", "", songs)
            .unwrap();
        store.into_shared()
    }

    fn permissive_output() -> MockAudioOutput {
        let mut output = MockAudioOutput::new();
        output.expect_load().returning(|_| Ok(()));
        output.expect_play().returning(|| Ok(()));
        output.expect_pause().returning(|| Ok(()));
        output.expect_set_position().returning(|_| Ok(()));
        output.expect_set_volume().returning(|_| Ok(()));
        output.expect_set_muted().returning(|_| Ok(()));
        output
    }

    fn engine_with(output: MockAudioOutput) -> PlayerEngine<MockAudioOutput> {
        let bus = EventBus::new(64);
        let library = seeded_library(&bus);
        PlayerEngine::new(library, output, bus, &PlayerConfig::default())
    }

    fn context(engine: &PlayerEngine<MockAudioOutput>) -> PlaybackContext {
        let library = engine.library.read();
        PlaybackContext::from_playlist(library.playlist(PlaylistId(1)).unwrap())
    }

    fn queue_ids(engine: &PlayerEngine<MockAudioOutput>) -> Vec<SongId> {
        engine.queue.ids().collect()
    }

    #[tokio::test]
    async fn play_song_loads_and_builds_the_queue() {
        let mut engine = engine_with(permissive_output());
        let ctx = context(&engine);

        engine.play_song(SongId(1), ctx).await.unwrap();

        assert_eq!(engine.state(), PlaybackState::Playing);
        assert_eq!(engine.current_song_id(), Some(SongId(1)));
        assert_eq!(queue_ids(&engine), vec![SongId(2), SongId(3)]);
        assert!(engine.history_songs().is_empty());
    }

    #[tokio::test]
    async fn replaying_the_current_song_toggles_pause() {
        let mut engine = engine_with(permissive_output());
        let ctx = context(&engine);

        engine.play_song(SongId(1), ctx.clone()).await.unwrap();
        engine.play_song(SongId(1), ctx.clone()).await.unwrap();
        assert_eq!(engine.state(), PlaybackState::Paused);

        engine.play_song(SongId(1), ctx).await.unwrap();
        assert_eq!(engine.state(), PlaybackState::Playing);
        // The queue was never rebuilt by the toggles.
        assert_eq!(queue_ids(&engine), vec![SongId(2), SongId(3)]);
    }

    #[tokio::test]
    async fn rejected_play_lands_in_paused() {
        let mut output = MockAudioOutput::new();
        output.expect_load().returning(|_| Ok(()));
        output
            .expect_play()
            .returning(|| Err(PlaybackError::Device("autoplay rejected".to_string())));
        let mut engine = engine_with(output);
        let ctx = context(&engine);
        let mut sub = engine.bus.subscribe();

        engine.play_song(SongId(1), ctx).await.unwrap();

        assert_eq!(engine.state(), PlaybackState::Paused);
        assert_eq!(engine.current_song_id(), Some(SongId(1)));

        let mut saw_error = false;
        while let Ok(event) = sub.try_recv() {
            if let CoreEvent::Playback(PlaybackEvent::Error { song_id, .. }) = event {
                assert_eq!(song_id, Some(1));
                saw_error = true;
            }
        }
        assert!(saw_error);
    }

    #[tokio::test]
    async fn next_song_prefers_the_queue_and_keeps_its_remainder() {
        let mut engine = engine_with(permissive_output());
        let ctx = context(&engine);
        engine.play_song(SongId(1), ctx).await.unwrap();

        engine.next_song().await.unwrap();
        assert_eq!(engine.current_song_id(), Some(SongId(2)));
        // Queue-driven advance must not rebuild: only the head is consumed.
        assert_eq!(queue_ids(&engine), vec![SongId(3)]);
    }

    #[tokio::test]
    async fn repeat_off_stops_at_the_end_of_the_context() {
        let mut engine = engine_with(permissive_output());
        let ctx = context(&engine);
        engine.play_song(SongId(3), ctx).await.unwrap();
        assert!(queue_ids(&engine).is_empty());

        engine.next_song().await.unwrap();
        assert_eq!(engine.state(), PlaybackState::Paused);
        assert_eq!(engine.current_song_id(), Some(SongId(3)));
        assert_eq!(engine.current_time(), 0.0);
    }

    #[tokio::test]
    async fn repeat_all_wraps_around() {
        let mut engine = engine_with(permissive_output());
        let ctx = context(&engine);
        engine.play_song(SongId(3), ctx).await.unwrap();
        engine.cycle_repeat();
        assert_eq!(engine.repeat_mode(), RepeatMode::All);

        engine.next_song().await.unwrap();
        assert_eq!(engine.current_song_id(), Some(SongId(1)));
        assert_eq!(engine.state(), PlaybackState::Playing);
    }

    #[tokio::test]
    async fn previous_restarts_past_the_threshold() {
        let mut engine = engine_with(permissive_output());
        let ctx = context(&engine);
        engine.play_song(SongId(2), ctx).await.unwrap();

        engine
            .handle_output_event(OutputEvent::TimeUpdate { position_secs: 10.0 })
            .await
            .unwrap();
        engine.previous_song().await.unwrap();
        assert_eq!(engine.current_song_id(), Some(SongId(2)));
        assert_eq!(engine.current_time(), 0.0);

        // Early in the track it navigates back instead.
        engine.previous_song().await.unwrap();
        assert_eq!(engine.current_song_id(), Some(SongId(1)));
    }

    #[tokio::test]
    async fn previous_from_the_first_song_wraps_to_the_last() {
        let mut engine = engine_with(permissive_output());
        let ctx = context(&engine);
        engine.play_song(SongId(1), ctx).await.unwrap();

        engine.previous_song().await.unwrap();
        assert_eq!(engine.current_song_id(), Some(SongId(3)));
    }

    #[tokio::test]
    async fn history_records_outgoing_songs_newest_first() {
        let mut engine = engine_with(permissive_output());
        let ctx = context(&engine);

        engine.play_song(SongId(1), ctx.clone()).await.unwrap();
        engine.play_song(SongId(2), ctx.clone()).await.unwrap();
        engine.play_song(SongId(3), ctx.clone()).await.unwrap();
        engine.play_song(SongId(1), ctx).await.unwrap();

        let history: Vec<SongId> = engine.history_songs().iter().map(|s| s.id).collect();
        assert_eq!(history, vec![SongId(3), SongId(2), SongId(1)]);
    }

    #[tokio::test]
    async fn queue_removal_and_jump() {
        let mut engine = engine_with(permissive_output());
        let ctx = context(&engine);
        engine.play_song(SongId(1), ctx).await.unwrap();

        engine.remove_from_queue(SongId(2));
        assert_eq!(queue_ids(&engine), vec![SongId(3)]);

        engine.play_from_queue(SongId(3)).await.unwrap();
        assert_eq!(engine.current_song_id(), Some(SongId(3)));
        assert!(queue_ids(&engine).is_empty());
    }

    #[tokio::test]
    async fn shuffle_keeps_current_first_and_unshuffle_restores() {
        let mut engine = engine_with(permissive_output());
        let ctx = context(&engine);
        let original = ctx.song_ids.clone();
        engine.play_song(SongId(2), ctx).await.unwrap();

        engine.toggle_shuffle().unwrap();
        assert!(engine.is_shuffling());
        let shuffled = engine.context().unwrap().song_ids.clone();
        assert_eq!(shuffled[0], SongId(2));
        assert_eq!(shuffled.len(), original.len());
        // Memento holds the pre-shuffle order.
        assert_eq!(
            engine.library.read().shuffle_memento(PlaylistId(1)),
            Some(original.clone())
        );

        engine.toggle_shuffle().unwrap();
        assert!(!engine.is_shuffling());
        assert_eq!(engine.context().unwrap().song_ids, original);
        assert_eq!(
            engine.library.read().playlist(PlaylistId(1)).unwrap().song_ids,
            original
        );
    }

    #[tokio::test]
    async fn metadata_load_refines_a_zero_duration() {
        let mut engine = engine_with(permissive_output());
        {
            let mut library = engine.library.write();
            library
                .insert_playlist(
                    PlaylistId(2),
                    "Imports",
                    "",
                    vec![Song::remote(9, "demo take", "Unknown Artist", "Local Files", 0.0, "", "blob:demo")],
                )
                .unwrap();
        }
        let ctx = PlaybackContext::new(PlaylistId(2), vec![SongId(9)]);
        engine.play_song(SongId(9), ctx).await.unwrap();

        engine
            .handle_output_event(OutputEvent::MetadataLoaded { duration_secs: 123.0 })
            .await
            .unwrap();
        assert_eq!(engine.duration(), 123.0);
        assert_eq!(
            engine.library.read().song(SongId(9)).unwrap().duration,
            "2:03"
        );
    }

    #[tokio::test]
    async fn ended_with_repeat_one_restarts_the_song() {
        let mut engine = engine_with(permissive_output());
        let ctx = context(&engine);
        engine.play_song(SongId(2), ctx).await.unwrap();
        engine.cycle_repeat();
        engine.cycle_repeat();
        assert_eq!(engine.repeat_mode(), RepeatMode::One);

        engine
            .handle_output_event(OutputEvent::Ended)
            .await
            .unwrap();
        assert_eq!(engine.current_song_id(), Some(SongId(2)));
        assert_eq!(engine.state(), PlaybackState::Playing);
        assert_eq!(engine.current_time(), 0.0);
    }

    #[tokio::test]
    async fn ended_without_repeat_one_advances() {
        let mut engine = engine_with(permissive_output());
        let ctx = context(&engine);
        engine.play_song(SongId(1), ctx).await.unwrap();

        engine
            .handle_output_event(OutputEvent::Ended)
            .await
            .unwrap();
        assert_eq!(engine.current_song_id(), Some(SongId(2)));
    }

    #[tokio::test]
    async fn volume_is_clamped_and_unmutes() {
        let mut engine = engine_with(permissive_output());

        engine.set_volume(1.7).await.unwrap();
        assert_eq!(engine.volume(), 1.0);

        engine.toggle_mute().await.unwrap();
        assert!(engine.is_muted());

        engine.set_volume(0.5).await.unwrap();
        assert!(!engine.is_muted());
        assert_eq!(engine.volume(), 0.5);
    }

    #[tokio::test]
    async fn seek_is_a_noop_without_a_duration() {
        let mut engine = engine_with(permissive_output());
        let ctx = context(&engine);
        engine.play_song(SongId(1), ctx).await.unwrap();

        engine.seek(50.0).await.unwrap();
        assert_eq!(engine.current_time(), 0.0);

        engine
            .handle_output_event(OutputEvent::MetadataLoaded { duration_secs: 200.0 })
            .await
            .unwrap();
        engine.seek(150.0).await.unwrap();
        assert_eq!(engine.current_time(), 200.0);
    }

    #[tokio::test]
    async fn play_with_nothing_current_starts_the_first_playlist() {
        let mut engine = engine_with(permissive_output());

        engine.play().await.unwrap();
        assert_eq!(engine.current_song_id(), Some(SongId(1)));
        assert_eq!(engine.state(), PlaybackState::Playing);
        assert_eq!(queue_ids(&engine), vec![SongId(2), SongId(3)]);
    }

    #[tokio::test]
    async fn playing_an_unknown_song_errors() {
        let mut engine = engine_with(permissive_output());
        let ctx = PlaybackContext::new(PlaylistId(-7), vec![SongId(999)]);

        let result = engine.play_song(SongId(999), ctx).await;
        assert!(matches!(result, Err(PlaybackError::UnknownSong(999))));
        assert_eq!(engine.state(), PlaybackState::Idle);
    }
}
