//! # Audio Output Abstraction
//!
//! The playback engine drives the host audio element through this trait.
//! Control methods are fire-and-confirm: `play` in particular may be rejected
//! by the platform (autoplay policy, unsupported source) and the engine must
//! recover from that without ending up in an inconsistent state.
//!
//! Progress, metadata and end-of-track notifications travel the other way as
//! [`OutputEvent`]s fed into `PlayerEngine::handle_output_event`.

use crate::error::Result;
use async_trait::async_trait;
use core_library::TrackSource;
use serde::{Deserialize, Serialize};

/// Platform audio playback primitive.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Loads a new source, replacing whatever was loaded before.
    async fn load(&self, source: &TrackSource) -> Result<()>;

    /// Starts or resumes playback.
    ///
    /// # Errors
    ///
    /// Returns an error when the device refuses to play (e.g. autoplay
    /// policy). The engine treats this as a recoverable pause.
    async fn play(&self) -> Result<()>;

    /// Pauses playback, keeping the position.
    async fn pause(&self) -> Result<()>;

    /// Seeks to an absolute position in seconds.
    async fn set_position(&self, seconds: f64) -> Result<()>;

    /// Sets the volume, range [0.0, 1.0].
    async fn set_volume(&self, volume: f32) -> Result<()>;

    /// Mutes or unmutes without touching the volume.
    async fn set_muted(&self, muted: bool) -> Result<()>;
}

/// Notifications from the output device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum OutputEvent {
    /// Playback position progressed.
    TimeUpdate { position_secs: f64 },
    /// Stream metadata became available.
    MetadataLoaded { duration_secs: f64 },
    /// The current track played to its end.
    Ended,
}
