//! Phrase-boundary detection collaborator.
//!
//! The detector is an external ML model behind the [`SegmentDetector`]
//! trait: one production implementation shelling out to a Whisper script,
//! one canned mock for tests.

pub mod detector;
pub mod whisper;

pub use detector::{MockDetector, SegmentDetector};
pub use whisper::WhisperProcessDetector;
