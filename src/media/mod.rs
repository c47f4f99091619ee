//! Media engine collaborator.
//!
//! All audio decode/encode work happens in ffmpeg behind the [`MediaEngine`]
//! trait: probe the source format, synthesize silence, cut sub-clips, and
//! concatenate clips into the final outputs.

pub mod engine;
pub mod ffmpeg;

pub use engine::{AudioFormat, MediaCall, MediaEngine, MockMediaEngine};
pub use ffmpeg::FfmpegEngine;
