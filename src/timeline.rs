//! Timeline construction: turning a segment list into ordered
//! clip-or-silence sequences for the two practice outputs.
//!
//! Both builders are pure functions of `(segments, config)`. They own no
//! audio; a [`TimelineEntry::Clip`] is just an index into the segment list,
//! and the media engine materializes entries later.

use crate::config::ProcessingConfig;
use crate::segment::{Segment, SegmentDuration};

/// One step of a practice timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineEntry {
    /// Play the clip cut for segment `i`.
    Clip(usize),
    /// Play synthesized silence of the given length in seconds.
    Silence(f64),
}

/// Build the dictation timeline.
///
/// Each segment plays `repeat_count` times with `pause_between_repeats`
/// strictly *between* repeats — never after a segment's final repeat. After
/// a segment's repeats, `pause_after_segment` separates it from the next
/// distinct phrase; the last segment gets no trailing silence, so the output
/// ends on speech.
pub fn dictation_timeline(segments: &[Segment], config: &ProcessingConfig) -> Vec<TimelineEntry> {
    let repeats = config.repeat_count as usize;
    let mut entries = Vec::with_capacity(segments.len() * (2 * repeats).max(1));

    for (i, _segment) in segments.iter().enumerate() {
        for k in 0..repeats {
            entries.push(TimelineEntry::Clip(i));
            if k + 1 < repeats {
                entries.push(TimelineEntry::Silence(config.pause_between_repeats));
            }
        }
        if i + 1 < segments.len() {
            entries.push(TimelineEntry::Silence(config.pause_after_segment));
        }
    }

    entries
}

/// Build the shadowing timeline.
///
/// Each segment plays once, followed by a silence slot of `ceil(duration)`
/// seconds so the learner can reproduce the phrase at roughly its own pace.
/// An open-ended segment gets the inter-phrase pause as its slot instead of
/// failing. Always exactly `2 * segments.len()` entries.
pub fn shadowing_timeline(segments: &[Segment], config: &ProcessingConfig) -> Vec<TimelineEntry> {
    let mut entries = Vec::with_capacity(segments.len() * 2);

    for (i, segment) in segments.iter().enumerate() {
        entries.push(TimelineEntry::Clip(i));
        let slot = match segment.duration {
            SegmentDuration::Known(secs) => secs.ceil(),
            SegmentDuration::OpenEnded => config.pause_after_segment,
        };
        entries.push(TimelineEntry::Silence(slot));
    }

    entries
}
