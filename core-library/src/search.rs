//! # Catalog Search
//!
//! Debounced, case-insensitive substring search over song titles and artists.
//! Each keystroke supersedes the pending timer; an empty query clears results
//! immediately without waiting out the delay. A generation counter guards
//! against a stale timer overwriting newer results.

use crate::model::{Song, SongId};
use crate::store::SharedLibrary;
use core_runtime::Debouncer;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct SearchState {
    results: Vec<SongId>,
    searching: bool,
    generation: u64,
}

/// Debounced search over the full catalog.
#[derive(Clone)]
pub struct SearchService {
    library: SharedLibrary,
    state: Arc<Mutex<SearchState>>,
    debouncer: Debouncer,
    delay: Duration,
}

impl SearchService {
    pub fn new(library: SharedLibrary, delay: Duration) -> Self {
        Self {
            library,
            state: Arc::new(Mutex::new(SearchState::default())),
            debouncer: Debouncer::new(),
            delay,
        }
    }

    /// Submits a query. Results land after the debounce delay; only the
    /// latest query's results are ever kept.
    pub fn query(&self, term: &str) {
        let mut state = self.state.lock();
        state.generation += 1;

        if term.is_empty() {
            self.debouncer.cancel();
            state.results.clear();
            state.searching = false;
            return;
        }

        state.searching = true;
        let generation = state.generation;
        drop(state);

        let term = term.to_lowercase();
        let library = Arc::clone(&self.library);
        let shared = Arc::clone(&self.state);
        self.debouncer.schedule(self.delay, async move {
            let matches: Vec<SongId> = library
                .read()
                .all_songs()
                .iter()
                .filter(|song| {
                    song.title.to_lowercase().contains(&term)
                        || song.artist.to_lowercase().contains(&term)
                })
                .map(|song| song.id)
                .collect();

            let mut state = shared.lock();
            // A newer query superseded this timer while it slept.
            if state.generation != generation {
                return;
            }
            tracing::debug!(term = %term, hits = matches.len(), "search completed");
            state.results = matches;
            state.searching = false;
        });
    }

    /// Current results, resolved against the catalog.
    pub fn results(&self) -> Vec<Song> {
        let ids = self.state.lock().results.clone();
        self.library.read().resolve(&ids)
    }

    /// `true` while a query is pending its debounce delay.
    pub fn is_searching(&self) -> bool {
        self.state.lock().searching
    }
}
