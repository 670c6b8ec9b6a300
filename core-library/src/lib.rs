//! # Library Module
//!
//! Owns the canonical song catalog and the playlist store.
//!
//! ## Overview
//!
//! This module manages:
//! - The single owned catalog of songs; every container (playlist, queue,
//!   history, search results) references songs by id
//! - User playlists plus the synthetic "Your Library" playlist whose
//!   membership is always exactly the liked-song set
//! - Derived album projections
//! - Debounced catalog search
//! - Playlist generation from a free-text prompt via [`generate::SongIdeaSource`]
//! - Local-file import with lazily refined duration metadata

pub mod catalog;
pub mod error;
pub mod generate;
pub mod model;
pub mod search;
pub mod store;

pub use catalog::Catalog;
pub use generate::{PlaylistGenerator, SongIdea, SongIdeaSource};
pub use error::{LibraryError, Result};
pub use model::{Album, Playlist, PlaylistId, Song, SongId, TrackSource};
pub use search::SearchService;
pub use store::{LibraryStore, LocalFileImport, SharedLibrary};
