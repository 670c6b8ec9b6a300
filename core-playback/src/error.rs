use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybackError {
    /// Requested song is not in the catalog.
    #[error("Unknown song: {0}")]
    UnknownSong(i64),

    /// The output device failed an operation (load, seek, volume).
    #[error("Audio output error: {0}")]
    Device(String),

    /// Library error surfaced through a playback operation.
    #[error("Library error: {0}")]
    Library(#[from] core_library::LibraryError),
}

pub type Result<T> = std::result::Result<T, PlaybackError>;
