//! The single owned song catalog.
//!
//! Every other container in the system stores [`SongId`]s and resolves them
//! here, so a mutation (liked flag, refined duration) happens at exactly one
//! point and can never leave a stale copy behind.

use crate::model::{format_duration, Song, SongId};
use std::collections::HashMap;

/// Canonical song storage with stable insertion order.
#[derive(Debug, Default)]
pub struct Catalog {
    songs: HashMap<SongId, Song>,
    // Insertion order, used for catalog-wide iteration and the derived
    // library membership.
    order: Vec<SongId>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a song, replacing any existing record with the same id.
    pub fn insert(&mut self, song: Song) {
        if !self.songs.contains_key(&song.id) {
            self.order.push(song.id);
        }
        self.songs.insert(song.id, song);
    }

    pub fn get(&self, id: SongId) -> Option<&Song> {
        self.songs.get(&id)
    }

    pub fn contains(&self, id: SongId) -> bool {
        self.songs.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All songs in insertion order.
    pub fn all(&self) -> impl Iterator<Item = &Song> {
        self.order.iter().filter_map(|id| self.songs.get(id))
    }

    /// Resolves a sequence of ids to cloned songs, skipping unknown ids.
    pub fn resolve(&self, ids: &[SongId]) -> Vec<Song> {
        ids.iter().filter_map(|id| self.songs.get(id)).cloned().collect()
    }

    /// Ids of all liked songs, in insertion order.
    pub fn liked_ids(&self) -> Vec<SongId> {
        self.all().filter(|s| s.is_liked).map(|s| s.id).collect()
    }

    /// Flips the liked flag, returning the new value.
    pub fn toggle_liked(&mut self, id: SongId) -> Option<bool> {
        let song = self.songs.get_mut(&id)?;
        song.is_liked = !song.is_liked;
        Some(song.is_liked)
    }

    /// Sets the real duration on a song, updating the display string too.
    /// Returns `false` for unknown ids.
    pub fn set_duration(&mut self, id: SongId, seconds: f64) -> bool {
        match self.songs.get_mut(&id) {
            Some(song) => {
                song.duration_secs = seconds;
                song.duration = format_duration(seconds);
                true
            }
            None => false,
        }
    }
}
