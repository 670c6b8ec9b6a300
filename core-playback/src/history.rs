//! Recently played songs, newest first, deduplicated by id and capped.

use core_library::SongId;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct History {
    cap: usize,
    ids: VecDeque<SongId>,
}

impl History {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            ids: VecDeque::new(),
        }
    }

    /// Records a song at the front. Any earlier entry for the same song is
    /// removed first, then the history is truncated to its cap.
    pub fn push(&mut self, song_id: SongId) {
        self.ids.retain(|&id| id != song_id);
        self.ids.push_front(song_id);
        self.ids.truncate(self.cap);
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
