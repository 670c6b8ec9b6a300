//! # Upcoming Queue
//!
//! Ordered song references that play after the current song. Rebuilt from the
//! playback context on every explicit play, then consumed independently:
//! removals and skip-aheads never re-derive from the context.

use core_library::SongId;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct Queue {
    ids: VecDeque<SongId>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the queue with every song in `order` strictly after `song`.
    /// Empty when `song` is not in `order` (ephemeral single-song contexts).
    pub fn rebuild(&mut self, order: &[SongId], after: SongId) {
        self.ids = match order.iter().position(|&id| id == after) {
            Some(index) => order[index + 1..].iter().copied().collect(),
            None => VecDeque::new(),
        };
    }

    /// Dequeues the next song, if any.
    pub fn pop_front(&mut self) -> Option<SongId> {
        self.ids.pop_front()
    }

    /// Filters a song out of the queue. Relative order is preserved.
    pub fn remove(&mut self, song_id: SongId) {
        self.ids.retain(|&id| id != song_id);
    }

    /// Truncates the queue through `song_id`: everything up to and including
    /// it is discarded. Returns `false` (leaving the queue untouched) when
    /// the song is not queued.
    pub fn consume_through(&mut self, song_id: SongId) -> bool {
        match self.ids.iter().position(|&id| id == song_id) {
            Some(index) => {
                self.ids.drain(..=index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn ids(&self) -> impl Iterator<Item = SongId> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
