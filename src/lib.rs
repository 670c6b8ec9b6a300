//! Workspace facade crate.
//!
//! Re-exports the individual workspace crates under stable module names so a
//! host application can depend on `cadence-workspace` alone and enable the
//! documented features without wiring each crate individually.

pub use core_library as library;
pub use core_playback as playback;
pub use core_runtime as runtime;

#[cfg(feature = "generate")]
pub use provider_gemini as gemini;
