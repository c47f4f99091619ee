//! Default configuration constants for echodrill.
//!
//! Shared across config construction and CLI defaults so the two never drift.

/// Default number of times each phrase is repeated in the dictation output.
///
/// Three repeats is the common dictation-drill cadence: first pass to hear,
/// second to write, third to check.
pub const REPEAT_COUNT: u32 = 3;

/// Default pause in seconds between repeats of the same phrase.
pub const PAUSE_BETWEEN_REPEATS: f64 = 2.0;

/// Default pause in seconds after all repeats of a phrase, before the next
/// distinct phrase.
///
/// Longer than the repeat pause so the listener can mentally reset between
/// phrases.
pub const PAUSE_AFTER_SEGMENT: f64 = 3.0;

/// Default minimum phrase duration in seconds.
///
/// Segments at or below this length are treated as noise (coughs, "um",
/// clicks) and dropped before timeline construction.
pub const MIN_SEGMENT_LENGTH: f64 = 0.5;

/// Default Whisper model identifier passed to the detector script.
pub const MODEL_ID: &str = "small";

/// Default context prompt passed to the detector. Empty means no guidance.
pub const WHISPER_PROMPT: &str = "";

/// Default detector script location, relative to the working directory.
pub const DETECTOR_SCRIPT: &str = "scripts/whisper_detector.py";

/// Default number of concurrent clip-cutting workers.
///
/// Cutting N segments is embarrassingly parallel; 4 keeps ffmpeg from
/// saturating the machine while still overlapping I/O.
pub const SPLIT_JOBS: usize = 4;

/// Bitrate used when the source stream does not report one.
pub const FALLBACK_BIT_RATE: &str = "192k";

/// File extensions eligible as pipeline input, lowercase without the dot.
pub const INPUT_EXTENSIONS: &[&str] = &["mp3", "mp4", "m4a", "wav", "avi", "mkv", "mov"];

/// Default directory layout, relative to the working directory.
pub const INPUT_DIR: &str = "input";
pub const DICTATION_DIR: &str = "output/dictation";
pub const SHADOWING_DIR: &str = "output/shadowing";
pub const TRANSCRIPT_DIR: &str = "output/transcripts";
pub const TEMP_DIR: &str = "temp";
