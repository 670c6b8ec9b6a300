//! # Runtime Module
//!
//! Shared infrastructure for the Cadence player core.
//!
//! ## Overview
//!
//! This module provides:
//! - Typed event bus over `tokio::sync::broadcast`
//! - User-facing notices (toast) with auto-dismiss
//! - Single-slot delayed tasks (debounce semantics)
//! - Logging setup via `tracing-subscriber`
//! - Player configuration with validation

pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod logging;
pub mod notify;

pub use config::PlayerConfig;
pub use debounce::Debouncer;
pub use error::{Result, RuntimeError};
pub use events::{CoreEvent, EventBus, EventStream};
pub use notify::Notifier;
