//! echodrill - Dictation and shadowing practice audio from a recording
//!
//! Detects spoken phrase boundaries in a source recording, splits the audio,
//! and reassembles the pieces into two practice tracks plus a timestamped
//! transcript. Detection (Whisper) and media work (ffmpeg) run in external
//! processes behind swappable traits.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod detect;
pub mod error;
pub mod media;
pub mod naming;
pub mod pipeline;
pub mod segment;
pub mod timeline;
pub mod transcript;
pub mod workspace;

// Collaborator traits (detect → split → assemble)
pub use detect::{MockDetector, SegmentDetector, WhisperProcessDetector};
pub use media::{AudioFormat, FfmpegEngine, MediaEngine, MockMediaEngine};

// Pipeline
pub use pipeline::{Pipeline, RunOutputs, Stage};

// Core data model
pub use segment::{FilterReport, Segment, SegmentDuration, filter_segments};
pub use timeline::{TimelineEntry, dictation_timeline, shadowing_timeline};

// Error handling
pub use error::{EchodrillError, Result};

// Config
pub use config::{Config, Device};

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.1+abc1234"` when git hash is available, `"0.3.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
