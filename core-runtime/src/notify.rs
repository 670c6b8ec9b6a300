//! # User Notices
//!
//! Holds the single current notice (toast) and its visibility flag. A notice
//! auto-dismisses after a fixed delay; showing a newer notice pre-empts the
//! pending dismissal so the timer always belongs to the latest message.

use crate::debounce::Debouncer;
use crate::events::{CoreEvent, EventBus, NoticeEvent};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct NoticeState {
    message: String,
    visible: bool,
}

/// Single-message notifier with auto-dismiss.
#[derive(Clone)]
pub struct Notifier {
    state: Arc<Mutex<NoticeState>>,
    dismiss: Debouncer,
    bus: EventBus,
    duration: Duration,
}

impl Notifier {
    pub fn new(bus: EventBus, duration: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(NoticeState::default())),
            dismiss: Debouncer::new(),
            bus,
            duration,
        }
    }

    /// Shows `message`, replacing any visible notice and restarting the
    /// dismissal timer.
    pub fn notify(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(notice = %message, "showing notice");

        {
            let mut state = self.state.lock();
            state.message = message.clone();
            state.visible = true;
        }
        self.bus
            .emit(CoreEvent::Notice(NoticeEvent::Shown { message }))
            .ok();

        let state = Arc::clone(&self.state);
        let bus = self.bus.clone();
        self.dismiss.schedule(self.duration, async move {
            state.lock().visible = false;
            bus.emit(CoreEvent::Notice(NoticeEvent::Dismissed)).ok();
        });
    }

    /// The currently visible message, or `None` after dismissal.
    pub fn current(&self) -> Option<String> {
        let state = self.state.lock();
        state.visible.then(|| state.message.clone())
    }

    pub fn is_visible(&self) -> bool {
        self.state.lock().visible
    }
}
