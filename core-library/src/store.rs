//! # Playlist Store
//!
//! Owns the playlist list on top of the [`Catalog`] and keeps the synthetic
//! library playlist in sync with the liked-song set. Under the catalog
//! design, mutations are single-point: containers hold ids and re-resolve, so
//! no fan-out to stale copies is ever needed.

use crate::catalog::Catalog;
use crate::error::{LibraryError, Result};
use crate::model::{Album, Playlist, PlaylistId, Song, SongId};
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use core_runtime::Notifier;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared handle to the library store.
///
/// The core is single-writer; the lock exists because debounce and dismissal
/// timers complete on the runtime and read concurrently.
pub type SharedLibrary = Arc<RwLock<LibraryStore>>;

/// A local file handed to [`LibraryStore::add_local_files`].
#[derive(Debug, Clone)]
pub struct LocalFileImport {
    /// Original file name, extension included.
    pub file_name: String,
    /// File-backed URL the output device can load.
    pub url: String,
}

const LIBRARY_NAME: &str = "Your Library";
const LIBRARY_COVER: &str = "https://picsum.photos/seed/library/300/300";
const LOCAL_FILES_NAME: &str = "Local Files";
const LOCAL_FILES_COVER: &str = "https://picsum.photos/seed/local/300/300";

/// Playlist and catalog state.
pub struct LibraryStore {
    catalog: Catalog,
    playlists: Vec<Playlist>,
    viewed: Option<PlaylistId>,
    // Pre-shuffle order per playlist, captured once on first shuffle.
    shuffle_mementos: HashMap<PlaylistId, Vec<SongId>>,
    bus: EventBus,
    notifier: Notifier,
}

impl LibraryStore {
    /// Creates a store containing only the empty library playlist.
    pub fn new(bus: EventBus, notifier: Notifier) -> Self {
        let library = Playlist {
            id: PlaylistId::LIBRARY,
            name: LIBRARY_NAME.to_string(),
            cover_art: LIBRARY_COVER.to_string(),
            song_ids: Vec::new(),
        };
        Self {
            catalog: Catalog::new(),
            playlists: vec![library],
            viewed: None,
            shuffle_mementos: HashMap::new(),
            bus,
            notifier,
        }
    }

    pub fn into_shared(self) -> SharedLibrary {
        Arc::new(RwLock::new(self))
    }

    // ========================================================================
    // Read API
    // ========================================================================

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn playlist(&self, id: PlaylistId) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    pub fn song(&self, id: SongId) -> Option<&Song> {
        self.catalog.get(id)
    }

    /// Resolves a playlist's ids to songs, skipping any that left the catalog.
    pub fn songs_of(&self, id: PlaylistId) -> Vec<Song> {
        self.playlist(id)
            .map(|p| self.catalog.resolve(&p.song_ids))
            .unwrap_or_default()
    }

    /// Every catalog song once, in catalog order.
    pub fn all_songs(&self) -> Vec<Song> {
        self.catalog.all().cloned().collect()
    }

    pub fn resolve(&self, ids: &[SongId]) -> Vec<Song> {
        self.catalog.resolve(ids)
    }

    pub fn viewed_playlist(&self) -> Option<PlaylistId> {
        self.viewed
    }

    /// Album projection over the catalog, keyed by (name, artist).
    pub fn album(&self, name: &str, artist: &str) -> Option<Album> {
        let songs: Vec<Song> = self
            .catalog
            .all()
            .filter(|s| s.album == name && s.artist == artist)
            .cloned()
            .collect();

        songs.first().map(|first| Album {
            name: name.to_string(),
            artist: artist.to_string(),
            cover_art: first.cover_art.clone(),
            songs: songs.clone(),
        })
    }

    // ========================================================================
    // Mutation API
    // ========================================================================

    /// Selects a playlist as the viewed playlist.
    pub fn select_playlist(&mut self, id: PlaylistId) -> Result<()> {
        if self.playlist(id).is_none() {
            return Err(LibraryError::NotFound {
                entity_type: "playlist".to_string(),
                id: id.0,
            });
        }
        self.viewed = Some(id);
        self.bus
            .emit(CoreEvent::Library(LibraryEvent::PlaylistSelected {
                playlist_id: id.0,
            }))
            .ok();
        Ok(())
    }

    /// Appends a playlist, registering its songs in the catalog.
    ///
    /// Library membership is re-derived afterwards since seeded songs may
    /// arrive already liked.
    pub fn insert_playlist(
        &mut self,
        id: PlaylistId,
        name: impl Into<String>,
        cover_art: impl Into<String>,
        songs: Vec<Song>,
    ) -> Result<PlaylistId> {
        self.insert_playlist_at(self.playlists.len(), id, name, cover_art, songs)
    }

    /// Inserts a playlist at the front of the list, so generated playlists
    /// surface first.
    pub fn prepend_playlist(
        &mut self,
        id: PlaylistId,
        name: impl Into<String>,
        cover_art: impl Into<String>,
        songs: Vec<Song>,
    ) -> Result<PlaylistId> {
        self.insert_playlist_at(0, id, name, cover_art, songs)
    }

    fn insert_playlist_at(
        &mut self,
        index: usize,
        id: PlaylistId,
        name: impl Into<String>,
        cover_art: impl Into<String>,
        songs: Vec<Song>,
    ) -> Result<PlaylistId> {
        if self.playlist(id).is_some() {
            return Err(LibraryError::DuplicatePlaylist { id: id.0 });
        }

        let name = name.into();
        let song_ids: Vec<SongId> = songs.iter().map(|s| s.id).collect();
        for song in songs {
            self.catalog.insert(song);
        }

        self.playlists.insert(
            index,
            Playlist {
                id,
                name: name.clone(),
                cover_art: cover_art.into(),
                song_ids,
            },
        );
        self.rederive_library();

        self.bus
            .emit(CoreEvent::Library(LibraryEvent::PlaylistCreated {
                playlist_id: id.0,
                name,
            }))
            .ok();
        Ok(id)
    }

    /// Replaces a playlist's song order.
    ///
    /// Unknown ids are dropped with a warning rather than failing the whole
    /// reorder. For the library playlist a reorder may only permute the liked
    /// set: ids that are no longer liked are dropped and liked songs missing
    /// from the given order are appended, so the membership invariant holds
    /// even when a stale order (e.g. a shuffle memento) is written back.
    pub fn upsert_songs(&mut self, id: PlaylistId, new_order: Vec<SongId>) -> Result<()> {
        let known: Vec<SongId> = new_order
            .into_iter()
            .filter(|&sid| {
                let known = self.catalog.contains(sid);
                if !known {
                    tracing::warn!(song_id = sid.0, "dropping unknown song id from reorder");
                }
                known
            })
            .collect();

        let liked = (id == PlaylistId::LIBRARY).then(|| self.catalog.liked_ids());

        let playlist = self
            .playlists
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(LibraryError::NotFound {
                entity_type: "playlist".to_string(),
                id: id.0,
            })?;
        playlist.song_ids = match liked {
            Some(liked) => {
                let mut order: Vec<SongId> =
                    known.into_iter().filter(|sid| liked.contains(sid)).collect();
                let missing: Vec<SongId> = liked
                    .into_iter()
                    .filter(|sid| !order.contains(sid))
                    .collect();
                order.extend(missing);
                order
            }
            None => known,
        };

        self.bus
            .emit(CoreEvent::Library(LibraryEvent::PlaylistReordered {
                playlist_id: id.0,
            }))
            .ok();
        Ok(())
    }

    /// Flips a song's liked flag and re-derives library membership.
    ///
    /// Returns the new flag value.
    pub fn toggle_liked(&mut self, song_id: SongId) -> Result<bool> {
        let is_liked = self
            .catalog
            .toggle_liked(song_id)
            .ok_or(LibraryError::NotFound {
                entity_type: "song".to_string(),
                id: song_id.0,
            })?;
        self.rederive_library();

        self.notifier.notify(if is_liked {
            "Added to Your Library"
        } else {
            "Removed from Your Library"
        });
        self.bus
            .emit(CoreEvent::Library(LibraryEvent::LikedChanged {
                song_id: song_id.0,
                is_liked,
            }))
            .ok();
        Ok(is_liked)
    }

    /// Appends a catalog song to a playlist.
    ///
    /// A duplicate is a user notice and a no-op. If the playlist has a live
    /// shuffle memento the song is appended there too, so unshuffling keeps
    /// the addition.
    pub fn add_song_to_playlist(&mut self, song_id: SongId, playlist_id: PlaylistId) -> Result<()> {
        if !self.catalog.contains(song_id) {
            return Err(LibraryError::NotFound {
                entity_type: "song".to_string(),
                id: song_id.0,
            });
        }

        let name = {
            let playlist =
                self.playlists
                    .iter_mut()
                    .find(|p| p.id == playlist_id)
                    .ok_or(LibraryError::NotFound {
                        entity_type: "playlist".to_string(),
                        id: playlist_id.0,
                    })?;

            if playlist.contains(song_id) {
                let name = playlist.name.clone();
                self.notifier
                    .notify(format!("Song is already in \"{name}\""));
                return Err(LibraryError::Duplicate {
                    song_id: song_id.0,
                    playlist: name,
                });
            }

            playlist.song_ids.push(song_id);
            playlist.name.clone()
        };

        if let Some(memento) = self.shuffle_mementos.get_mut(&playlist_id) {
            memento.push(song_id);
        }

        self.notifier.notify(format!("Added to \"{name}\""));
        self.bus
            .emit(CoreEvent::Library(LibraryEvent::SongsAdded {
                playlist_id: playlist_id.0,
                count: 1,
            }))
            .ok();
        Ok(())
    }

    /// Imports local files as songs with placeholder metadata into the
    /// reserved local-files playlist, creating it on demand. The new playlist
    /// (or the existing one) becomes the viewed playlist.
    pub fn add_local_files(&mut self, files: Vec<LocalFileImport>) -> PlaylistId {
        let mut seed = chrono::Utc::now().timestamp_millis();
        let mut song_ids = Vec::with_capacity(files.len());

        for file in files {
            while self.catalog.contains(SongId(seed)) {
                seed += 1;
            }
            let title = file
                .file_name
                .rsplit_once('.')
                .map(|(stem, _ext)| stem.to_string())
                .unwrap_or(file.file_name.clone());

            let song = Song {
                id: SongId(seed),
                title,
                artist: "Unknown Artist".to_string(),
                album: LOCAL_FILES_NAME.to_string(),
                duration: "0:00".to_string(),
                duration_secs: 0.0,
                cover_art: LOCAL_FILES_COVER.to_string(),
                source: crate::model::TrackSource::LocalFile { url: file.url },
                lyrics: None,
                is_liked: false,
            };
            song_ids.push(song.id);
            self.catalog.insert(song);
            seed += 1;
        }

        let count = song_ids.len();
        match self
            .playlists
            .iter_mut()
            .find(|p| p.id == PlaylistId::LOCAL_FILES)
        {
            Some(playlist) => {
                playlist.song_ids.extend(&song_ids);
            }
            None => {
                self.playlists.push(Playlist {
                    id: PlaylistId::LOCAL_FILES,
                    name: LOCAL_FILES_NAME.to_string(),
                    cover_art: LOCAL_FILES_COVER.to_string(),
                    song_ids: song_ids.clone(),
                });
                self.bus
                    .emit(CoreEvent::Library(LibraryEvent::PlaylistCreated {
                        playlist_id: PlaylistId::LOCAL_FILES.0,
                        name: LOCAL_FILES_NAME.to_string(),
                    }))
                    .ok();
            }
        }

        if let Some(memento) = self.shuffle_mementos.get_mut(&PlaylistId::LOCAL_FILES) {
            memento.extend(&song_ids);
        }

        self.viewed = Some(PlaylistId::LOCAL_FILES);
        self.bus
            .emit(CoreEvent::Library(LibraryEvent::SongsAdded {
                playlist_id: PlaylistId::LOCAL_FILES.0,
                count,
            }))
            .ok();
        PlaylistId::LOCAL_FILES
    }

    /// Applies a lazily-discovered duration to a song whose placeholder is
    /// still zero. A refinement for a song no longer in the catalog is
    /// dropped silently apart from a debug log.
    pub fn refine_duration(&mut self, song_id: SongId, duration_secs: f64) -> bool {
        match self.catalog.get(song_id) {
            Some(song) if song.duration_secs == 0.0 => {
                self.catalog.set_duration(song_id, duration_secs);
                self.bus
                    .emit(CoreEvent::Library(LibraryEvent::DurationRefined {
                        song_id: song_id.0,
                        duration_secs,
                    }))
                    .ok();
                true
            }
            Some(_) => false,
            None => {
                tracing::debug!(
                    song_id = song_id.0,
                    "dropping duration refinement for unknown song"
                );
                false
            }
        }
    }

    // ========================================================================
    // Shuffle mementos
    // ========================================================================

    /// Snapshots a pre-shuffle order, once per playlist id.
    ///
    /// The order is passed in rather than read from the store so ephemeral
    /// playback contexts (album view, search results) can be captured too.
    pub fn capture_shuffle_order(&mut self, id: PlaylistId, order: Vec<SongId>) {
        self.shuffle_mementos.entry(id).or_insert(order);
    }

    /// The saved pre-shuffle order, if one was ever captured.
    pub fn shuffle_memento(&self, id: PlaylistId) -> Option<Vec<SongId>> {
        self.shuffle_mementos.get(&id).cloned()
    }

    // ========================================================================
    // Internal
    // ========================================================================

    /// Library membership invariant: always exactly the liked set.
    fn rederive_library(&mut self) {
        let liked = self.catalog.liked_ids();
        if let Some(library) = self
            .playlists
            .iter_mut()
            .find(|p| p.id == PlaylistId::LIBRARY)
        {
            library.song_ids = liked;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use core_runtime::events::{CoreEvent, LibraryEvent, NoticeEvent};
    use std::time::Duration;

    fn store() -> (LibraryStore, core_runtime::events::Receiver<CoreEvent>) {
        let bus = EventBus::new(64);
        let sub = bus.subscribe();
        let notifier = Notifier::new(bus.clone(), Duration::from_secs(3));
        (LibraryStore::new(bus, notifier), sub)
    }

    fn seed(store: &mut LibraryStore) -> PlaylistId {
        let songs = vec![
            Song::remote(101, "Morning Dew", "Lo-Fi Geek", "Coffee Shop Vibes", 165.0, "", "a")
                .liked(),
            Song::remote(102, "Sunset Drive", "Synth Wave", "Retro Dreams", 192.0, "", "b"),
            Song::remote(103, "Rainy Night", "Jazz Hop Cafe", "Midnight Moods", 210.0, "", "c"),
        ];
        store
            .insert_playlist(PlaylistId(1), "Chill Beats", "", songs)
            .unwrap()
    }

    #[tokio::test]
    async fn library_membership_tracks_liked_set() {
        let (mut store, _sub) = store();
        seed(&mut store);

        let library = store.playlist(PlaylistId::LIBRARY).unwrap();
        assert_eq!(library.song_ids, vec![SongId(101)]);

        store.toggle_liked(SongId(102)).unwrap();
        let library = store.playlist(PlaylistId::LIBRARY).unwrap();
        assert_eq!(library.song_ids, vec![SongId(101), SongId(102)]);

        // Toggling twice restores both the flag and the membership.
        store.toggle_liked(SongId(102)).unwrap();
        let library = store.playlist(PlaylistId::LIBRARY).unwrap();
        assert_eq!(library.song_ids, vec![SongId(101)]);
        assert!(!store.song(SongId(102)).unwrap().is_liked);
    }

    #[tokio::test]
    async fn toggle_liked_notifies_and_emits() {
        let (mut store, mut sub) = store();
        seed(&mut store);
        while sub.try_recv().is_ok() {}

        store.toggle_liked(SongId(102)).unwrap();

        let mut saw_notice = false;
        let mut saw_liked = false;
        while let Ok(event) = sub.try_recv() {
            match event {
                CoreEvent::Notice(NoticeEvent::Shown { message }) => {
                    assert_eq!(message, "Added to Your Library");
                    saw_notice = true;
                }
                CoreEvent::Library(LibraryEvent::LikedChanged { song_id, is_liked }) => {
                    assert_eq!(song_id, 102);
                    assert!(is_liked);
                    saw_liked = true;
                }
                _ => {}
            }
        }
        assert!(saw_notice && saw_liked);
    }

    #[tokio::test]
    async fn duplicate_add_is_a_notified_noop() {
        let (mut store, _sub) = store();
        let id = seed(&mut store);

        let result = store.add_song_to_playlist(SongId(101), id);
        assert!(matches!(result, Err(LibraryError::Duplicate { .. })));
        assert_eq!(store.playlist(id).unwrap().len(), 3);
        assert_eq!(
            store.notifier.current().as_deref(),
            Some("Song is already in \"Chill Beats\"")
        );
    }

    #[tokio::test]
    async fn add_song_appends_to_live_memento() {
        let (mut store, _sub) = store();
        let id = seed(&mut store);
        store
            .insert_playlist(
                PlaylistId(2),
                "Other",
                "",
                vec![Song::remote(201, "Golden Haze", "The Wanderers", "Desert Sun", 242.0, "", "d")],
            )
            .unwrap();

        let order = store.playlist(id).unwrap().song_ids.clone();
        store.capture_shuffle_order(id, order);
        store.add_song_to_playlist(SongId(201), id).unwrap();

        let memento = store.shuffle_memento(id).unwrap();
        assert_eq!(memento.last(), Some(&SongId(201)));
    }

    #[tokio::test]
    async fn upsert_songs_replaces_order_and_drops_unknown_ids() {
        let (mut store, _sub) = store();
        let id = seed(&mut store);

        store
            .upsert_songs(id, vec![SongId(103), SongId(999), SongId(101)])
            .unwrap();
        assert_eq!(
            store.playlist(id).unwrap().song_ids,
            vec![SongId(103), SongId(101)]
        );

        assert!(store
            .upsert_songs(PlaylistId(77), vec![SongId(101)])
            .is_err());
    }

    #[tokio::test]
    async fn library_reorder_only_permutes_the_liked_set() {
        let (mut store, _sub) = store();
        seed(&mut store);
        store.toggle_liked(SongId(102)).unwrap();
        assert_eq!(
            store.playlist(PlaylistId::LIBRARY).unwrap().song_ids,
            vec![SongId(101), SongId(102)]
        );

        // A stale order (a shuffle memento, say) that misses a liked song and
        // carries an unliked one may not change membership.
        store
            .upsert_songs(PlaylistId::LIBRARY, vec![SongId(103), SongId(101)])
            .unwrap();
        assert_eq!(
            store.playlist(PlaylistId::LIBRARY).unwrap().song_ids,
            vec![SongId(101), SongId(102)]
        );

        // A permutation of the liked set is kept verbatim.
        store
            .upsert_songs(PlaylistId::LIBRARY, vec![SongId(102), SongId(101)])
            .unwrap();
        assert_eq!(
            store.playlist(PlaylistId::LIBRARY).unwrap().song_ids,
            vec![SongId(102), SongId(101)]
        );
    }

    #[tokio::test]
    async fn local_files_get_placeholders_and_refined_durations() {
        let (mut store, _sub) = store();

        let id = store.add_local_files(vec![
            LocalFileImport {
                file_name: "demo take.mp3".to_string(),
                url: "blob:demo".to_string(),
            },
            LocalFileImport {
                file_name: "noext".to_string(),
                url: "blob:noext".to_string(),
            },
        ]);
        assert_eq!(id, PlaylistId::LOCAL_FILES);
        assert_eq!(store.viewed_playlist(), Some(id));

        let songs = store.songs_of(id);
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].title, "demo take");
        assert_eq!(songs[1].title, "noext");
        assert_eq!(songs[0].duration_secs, 0.0);
        assert!(songs[0].source.is_local());

        // Metadata load refines the placeholder exactly once.
        let song_id = songs[0].id;
        assert!(store.refine_duration(song_id, 123.0));
        assert_eq!(store.song(song_id).unwrap().duration, "2:03");
        assert!(!store.refine_duration(song_id, 999.0));

        // Unknown song: dropped without error.
        assert!(!store.refine_duration(SongId(424242), 60.0));
    }

    #[tokio::test]
    async fn importing_twice_extends_the_local_playlist() {
        let (mut store, _sub) = store();
        store.add_local_files(vec![LocalFileImport {
            file_name: "one.mp3".to_string(),
            url: "blob:1".to_string(),
        }]);
        store.add_local_files(vec![LocalFileImport {
            file_name: "two.mp3".to_string(),
            url: "blob:2".to_string(),
        }]);

        assert_eq!(store.playlist(PlaylistId::LOCAL_FILES).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn album_projection_groups_by_name_and_artist() {
        let (mut store, _sub) = store();
        seed(&mut store);

        let album = store.album("Retro Dreams", "Synth Wave").unwrap();
        assert_eq!(album.songs.len(), 1);
        assert_eq!(album.songs[0].id, SongId(102));

        assert!(store.album("Retro Dreams", "Lo-Fi Geek").is_none());
    }

    #[tokio::test]
    async fn capture_shuffle_order_is_idempotent() {
        let (mut store, _sub) = store();
        let id = seed(&mut store);

        let order = store.playlist(id).unwrap().song_ids.clone();
        store.capture_shuffle_order(id, order);
        let original = store.shuffle_memento(id).unwrap();

        store
            .upsert_songs(id, vec![SongId(103), SongId(102), SongId(101)])
            .unwrap();
        let reordered = store.playlist(id).unwrap().song_ids.clone();
        store.capture_shuffle_order(id, reordered);

        // Second capture must not overwrite the first snapshot.
        assert_eq!(store.shuffle_memento(id).unwrap(), original);
    }
}
