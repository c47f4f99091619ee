//! Transcript rendering: one timestamped line per detected phrase.

use crate::segment::{Segment, SegmentDuration};

/// Placeholder for segments the detector returned without text.
const NO_TEXT: &str = "[No text]";

/// Marker for an open-ended final segment with no known end time.
const OPEN_END: &str = "end";

/// Format a time offset as `MM:SS.ss`.
///
/// Minutes are zero-padded to two digits and seconds to a fixed two-decimal
/// width, e.g. `200.4` seconds renders as `03:20.40`. Offsets beyond 99
/// minutes widen the minute field rather than wrapping.
///
/// Rounding happens on whole centiseconds before the minute split, so a
/// value like `59.999` carries into the minute field instead of rendering
/// a sixty-second field.
pub fn format_timestamp(seconds: f64) -> String {
    let centis = (seconds.max(0.0) * 100.0).round() as u64;
    let minutes = centis / 6000;
    let rest = centis % 6000;
    format!("{:02}:{:02}.{:02}", minutes, rest / 100, rest % 100)
}

/// Render the transcript: `[start - end] text` per segment.
///
/// `end` is `start + duration`; an open-ended segment renders a literal
/// `end` marker instead. Pure and deterministic — rendering the same list
/// twice yields byte-identical output.
pub fn render_transcript(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        let start = format_timestamp(segment.start);
        let text = segment.text.as_deref().map(str::trim).unwrap_or("");
        let text = if text.is_empty() { NO_TEXT } else { text };
        let end = match segment.duration {
            SegmentDuration::Known(duration) => format_timestamp(segment.start + duration),
            SegmentDuration::OpenEnded => OPEN_END.to_string(),
        };
        out.push_str(&format!("[{} - {}] {}\n", start, end, text));
    }
    out
}
