//! # Event Bus
//!
//! Typed broadcast channel connecting the library store, the playback engine
//! and the view layer. Built on `tokio::sync::broadcast`: multiple producers
//! (clone the bus), multiple independent subscribers, and lagging detection
//! for slow consumers.
//!
//! Events carry raw `i64` identifiers so this crate stays free of library
//! types; the strongly-typed wrappers live in `core-library`.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that fall behind by more than this receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Playback-related events
    Playback(PlaybackEvent),
    /// Library-related events
    Library(LibraryEvent),
    /// User-facing notice events
    Notice(NoticeEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Library(e) => e.description(),
            CoreEvent::Notice(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Started { .. }) => EventSeverity::Info,
            CoreEvent::Library(LibraryEvent::PlaylistCreated { .. }) => EventSeverity::Info,
            CoreEvent::Notice(NoticeEvent::Shown { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Events emitted by the playback engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A new song started playing.
    Started {
        song_id: i64,
        title: String,
    },
    /// Playback paused.
    Paused {
        song_id: i64,
        position_secs: f64,
    },
    /// Playback resumed after pause.
    Resumed {
        song_id: i64,
    },
    /// Playback stopped at the end of the context with repeat off.
    Stopped {
        song_id: i64,
    },
    /// Track finished playing naturally.
    Completed {
        song_id: i64,
    },
    /// The upcoming queue changed (rebuild, removal or consumption).
    QueueChanged {
        remaining: usize,
    },
    /// Shuffle was toggled for the active context.
    ShuffleChanged {
        enabled: bool,
    },
    /// Repeat mode cycled.
    RepeatChanged {
        mode: String,
    },
    /// Playback error occurred (e.g. the output rejected `play`).
    Error {
        song_id: Option<i64>,
        message: String,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Resumed { .. } => "Playback resumed",
            PlaybackEvent::Stopped { .. } => "Playback stopped",
            PlaybackEvent::Completed { .. } => "Track completed",
            PlaybackEvent::QueueChanged { .. } => "Queue changed",
            PlaybackEvent::ShuffleChanged { .. } => "Shuffle toggled",
            PlaybackEvent::RepeatChanged { .. } => "Repeat mode changed",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

/// Events emitted by the library store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum LibraryEvent {
    /// A song's liked flag changed; library membership was re-derived.
    LikedChanged {
        song_id: i64,
        is_liked: bool,
    },
    /// A playlist's song order was replaced.
    PlaylistReordered {
        playlist_id: i64,
    },
    /// Songs were appended to a playlist (manual add or local import).
    SongsAdded {
        playlist_id: i64,
        count: usize,
    },
    /// A new playlist was created (generated or local-files).
    PlaylistCreated {
        playlist_id: i64,
        name: String,
    },
    /// A playlist was selected as the viewed playlist.
    PlaylistSelected {
        playlist_id: i64,
    },
    /// A song's real duration was discovered after metadata load.
    DurationRefined {
        song_id: i64,
        duration_secs: f64,
    },
}

impl LibraryEvent {
    fn description(&self) -> &str {
        match self {
            LibraryEvent::LikedChanged { .. } => "Song liked flag changed",
            LibraryEvent::PlaylistReordered { .. } => "Playlist reordered",
            LibraryEvent::SongsAdded { .. } => "Songs added to playlist",
            LibraryEvent::PlaylistCreated { .. } => "Playlist created",
            LibraryEvent::PlaylistSelected { .. } => "Playlist selected",
            LibraryEvent::DurationRefined { .. } => "Song duration refined",
        }
    }
}

/// Events emitted by the notifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum NoticeEvent {
    /// A notice became visible, pre-empting any pending dismissal.
    Shown { message: String },
    /// The current notice auto-dismissed.
    Dismissed,
}

impl NoticeEvent {
    fn description(&self) -> &str {
        match self {
            NoticeEvent::Shown { .. } => "Notice shown",
            NoticeEvent::Dismissed => "Notice dismissed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning the bus produces another producer handle; each `subscribe()`
/// creates an independent receiver. Sends never block; slow subscribers get
/// `RecvError::Lagged`.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// when there are none. Producers that don't care whether anyone is
    /// listening should call `.ok()` on the result.
    pub fn emit(&self, event: CoreEvent) -> std::result::Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber receiving all future events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter; only matching events are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n`
    /// events, `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> std::result::Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            if filter(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching event is currently available.
    pub fn try_recv(&mut self) -> Option<std::result::Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    let Some(filter) = &self.filter else {
                        return Some(Ok(event));
                    };

                    if filter(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
