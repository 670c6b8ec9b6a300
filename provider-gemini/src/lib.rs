//! # Gemini Provider
//!
//! Implements the `SongIdeaSource` trait for the Gemini `generateContent`
//! API.
//!
//! ## Overview
//!
//! This module provides:
//! - A REST client for `generateContent` with a constrained JSON
//!   response schema (title/artist pairs)
//! - Defensive parsing of model output, including markdown code fences
//! - Conversion of transport and API failures into `IdeaSourceError`

pub mod client;
pub mod error;

pub use client::GeminiClient;
pub use error::{GeminiError, Result};
