//! # Playback Module
//!
//! The playback engine: current song, play/pause/seek/volume state, the
//! upcoming queue, shuffle and repeat semantics, and play history. The host
//! audio element sits behind the [`AudioOutput`] trait; device notifications
//! flow back in through [`OutputEvent`].

pub mod engine;
pub mod error;
pub mod history;
pub mod output;
pub mod queue;

pub use engine::{PlaybackContext, PlaybackState, PlayerEngine, RepeatMode};
pub use error::{PlaybackError, Result};
pub use history::History;
pub use output::{AudioOutput, OutputEvent};
pub use queue::Queue;
