//! Detected phrase segments and the noise filter.

use serde::{Deserialize, Serialize};

/// How long a detected segment lasts.
///
/// The detector may leave the final segment open-ended (no end timestamp);
/// that is a first-class case every consumer must handle, not a magic null.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SegmentDuration {
    /// Duration in seconds, strictly positive.
    Known(f64),
    /// Runs until the end of the source recording.
    OpenEnded,
}

impl SegmentDuration {
    /// The duration in seconds, if known.
    pub fn seconds(&self) -> Option<f64> {
        match self {
            SegmentDuration::Known(secs) => Some(*secs),
            SegmentDuration::OpenEnded => None,
        }
    }
}

/// One detected phrase: where it starts, how long it lasts, what was said.
///
/// Created by the detector collaborator and consumed read-only everywhere
/// else. Segments arrive ordered by `start`, but neither contiguity nor
/// non-overlap is guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Offset from the start of the source, in seconds. Non-negative.
    pub start: f64,
    pub duration: SegmentDuration,
    /// Transcribed text, when the detector produced any.
    pub text: Option<String>,
}

impl Segment {
    pub fn new(start: f64, duration: SegmentDuration, text: Option<String>) -> Self {
        Self {
            start,
            duration,
            text,
        }
    }

    /// Sentinel covering the whole source file, used when the detector
    /// returns no segments at all.
    pub fn whole_file() -> Self {
        Self {
            start: 0.0,
            duration: SegmentDuration::OpenEnded,
            text: None,
        }
    }
}

/// Result of filtering a detected segment list.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterReport {
    /// Surviving segments, original order preserved.
    pub segments: Vec<Segment>,
    /// How many segments were dropped as noise.
    pub dropped: usize,
}

impl FilterReport {
    /// Fewer than two segments survived: repetition and shadowing drills
    /// degenerate. Reported as a warning downstream, never an error.
    pub fn is_degenerate(&self) -> bool {
        self.segments.len() < 2
    }
}

/// Drop noise segments at or below `min_length` seconds.
///
/// Keeps a segment iff its duration is open-ended or strictly greater than
/// `min_length`. Order-preserving; short segments are dropped outright, never
/// merged into a neighbor. An empty input is valid and yields an empty report.
pub fn filter_segments(segments: Vec<Segment>, min_length: f64) -> FilterReport {
    let before = segments.len();
    let segments: Vec<Segment> = segments
        .into_iter()
        .filter(|s| match s.duration {
            SegmentDuration::OpenEnded => true,
            SegmentDuration::Known(secs) => secs > min_length,
        })
        .collect();
    let dropped = before - segments.len();
    FilterReport { segments, dropped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, duration: f64, text: &str) -> Segment {
        Segment::new(
            start,
            SegmentDuration::Known(duration),
            Some(text.to_string()),
        )
    }

    #[test]
    fn test_filter_drops_short_segments() {
        let segments = vec![seg(0.0, 1.0, "Hi"), seg(1.0, 0.2, "um")];
        let report = filter_segments(segments, 0.4);

        assert_eq!(report.segments.len(), 1);
        assert_eq!(report.segments[0].text.as_deref(), Some("Hi"));
        assert_eq!(report.dropped, 1);
    }

    #[test]
    fn test_filter_boundary_is_exclusive() {
        // duration == min_length is dropped; only strictly longer survives
        let segments = vec![seg(0.0, 0.4, "exact"), seg(1.0, 0.401, "longer")];
        let report = filter_segments(segments, 0.4);

        assert_eq!(report.segments.len(), 1);
        assert_eq!(report.segments[0].text.as_deref(), Some("longer"));
    }

    #[test]
    fn test_filter_keeps_open_ended_segments() {
        let segments = vec![
            seg(0.0, 0.1, "noise"),
            Segment::new(5.0, SegmentDuration::OpenEnded, None),
        ];
        let report = filter_segments(segments, 0.4);

        assert_eq!(report.segments.len(), 1);
        assert_eq!(report.segments[0].duration, SegmentDuration::OpenEnded);
    }

    #[test]
    fn test_filter_preserves_order() {
        let segments = vec![
            seg(0.0, 2.0, "a"),
            seg(2.5, 0.1, "x"),
            seg(3.0, 1.5, "b"),
            seg(5.0, 3.0, "c"),
        ];
        let report = filter_segments(segments, 0.4);

        let texts: Vec<_> = report
            .segments
            .iter()
            .map(|s| s.text.as_deref().unwrap())
            .collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_filter_empty_input_is_valid() {
        let report = filter_segments(Vec::new(), 0.4);
        assert!(report.segments.is_empty());
        assert_eq!(report.dropped, 0);
        assert!(report.is_degenerate());
    }

    #[test]
    fn test_degenerate_flag() {
        let one = filter_segments(vec![seg(0.0, 1.0, "a")], 0.0);
        assert!(one.is_degenerate());

        let two = filter_segments(vec![seg(0.0, 1.0, "a"), seg(1.0, 1.0, "b")], 0.0);
        assert!(!two.is_degenerate());
    }

    #[test]
    fn test_filter_zero_min_length_keeps_everything_positive() {
        let segments = vec![seg(0.0, 0.01, "tick"), seg(0.1, 0.02, "tock")];
        let report = filter_segments(segments, 0.0);
        assert_eq!(report.segments.len(), 2);
    }

    #[test]
    fn test_whole_file_sentinel() {
        let s = Segment::whole_file();
        assert_eq!(s.start, 0.0);
        assert_eq!(s.duration, SegmentDuration::OpenEnded);
        assert!(s.text.is_none());
    }

    #[test]
    fn test_duration_seconds_accessor() {
        assert_eq!(SegmentDuration::Known(2.5).seconds(), Some(2.5));
        assert_eq!(SegmentDuration::OpenEnded.seconds(), None);
    }
}
