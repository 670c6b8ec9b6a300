use crate::generate::IdeaSourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: i64 },

    #[error("Song {song_id} is already in \"{playlist}\"")]
    Duplicate { song_id: i64, playlist: String },

    #[error("Playlist id {id} already exists")]
    DuplicatePlaylist { id: i64 },

    #[error("Idea source error: {0}")]
    IdeaSource(#[from] IdeaSourceError),

    #[error("Generation returned no songs")]
    EmptyGeneration,
}

pub type Result<T> = std::result::Result<T, LibraryError>;
