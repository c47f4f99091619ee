//! Output naming and per-day run versioning.
//!
//! Every run gets a `RunIdentity` (today's date plus a 4-digit sequence
//! number) shared by all three output files. The next sequence is derived by
//! scanning the existing output names — a deliberately simple ad-hoc index,
//! bounded by a hard 9999-per-day ceiling rather than wrapping around.

use crate::error::{EchodrillError, Result};
use chrono::Local;

/// Hard per-day ceiling. Exceeding it stops the run so a human can archive.
const MAX_SEQUENCE: u32 = 9999;

/// Identity of one pipeline run: output date plus per-date sequence number.
///
/// Computed once at run start and reused for every output file. A run that
/// crosses midnight keeps the date it started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIdentity {
    /// `YYYYMMDD`.
    pub date: String,
    /// In `[1, 9999]`, monotonic per date, never reused within a date.
    pub sequence: u32,
}

impl RunIdentity {
    pub fn dictation_name(&self) -> String {
        format!("output_dictation_{}_{:04}.mp3", self.date, self.sequence)
    }

    pub fn shadowing_name(&self) -> String {
        format!("output_shadowing_{}_{:04}.mp3", self.date, self.sequence)
    }

    pub fn transcript_name(&self) -> String {
        format!("transcript_{}_{:04}.txt", self.date, self.sequence)
    }
}

/// Today's date as `YYYYMMDD` in local time.
pub fn today() -> String {
    Local::now().format("%Y%m%d").to_string()
}

/// Extract `(date, sequence)` from a name shaped `prefix_<YYYYMMDD>_<NNNN>.<ext>`.
///
/// Anything that does not match the shape exactly (wrong digit counts,
/// missing extension, stray names in the directory) is ignored by returning
/// `None` rather than failing the scan.
fn parse_output_name(name: &str) -> Option<(&str, u32)> {
    let stem = name.rsplit_once('.')?.0;
    let (rest, seq) = stem.rsplit_once('_')?;
    let (_prefix, date) = rest.rsplit_once('_')?;

    if seq.len() != 4 || !seq.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let sequence: u32 = seq.parse().ok()?;
    Some((date, sequence))
}

/// Compute the next run identity for `today_date` from existing output names.
///
/// Names that do not parse or belong to another date are skipped; an empty
/// (or unreadable, treated upstream as empty) directory starts at 1. A
/// computed sequence above 9999 is a fatal `SequenceExhausted`.
pub fn next_run_identity<I, S>(existing_names: I, today_date: &str) -> Result<RunIdentity>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let max_today = existing_names
        .into_iter()
        .filter_map(|name| {
            parse_output_name(name.as_ref())
                .filter(|(date, _)| *date == today_date)
                .map(|(_, seq)| seq)
        })
        .max()
        .unwrap_or(0);

    let sequence = max_today + 1;
    if sequence > MAX_SEQUENCE {
        return Err(EchodrillError::SequenceExhausted {
            date: today_date.to_string(),
        });
    }

    Ok(RunIdentity {
        date: today_date.to_string(),
        sequence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_run_of_the_day_is_one() {
        let identity = next_run_identity(Vec::<String>::new(), "20260823").unwrap();
        assert_eq!(identity.sequence, 1);
        assert_eq!(identity.date, "20260823");
    }

    #[test]
    fn test_takes_max_plus_one_with_gaps() {
        // Gaps are not refilled: {1, 2, 4} -> 5
        let names = vec![
            "output_dictation_20260823_0001.mp3",
            "output_dictation_20260823_0002.mp3",
            "output_dictation_20260823_0004.mp3",
        ];
        let identity = next_run_identity(names, "20260823").unwrap();
        assert_eq!(identity.sequence, 5);
    }

    #[test]
    fn test_other_dates_are_ignored() {
        // A new date resets the sequence to 1
        let names = vec![
            "output_dictation_20260822_0031.mp3",
            "output_dictation_20260821_0002.mp3",
        ];
        let identity = next_run_identity(names, "20260823").unwrap();
        assert_eq!(identity.sequence, 1);
    }

    #[test]
    fn test_unparseable_names_are_skipped() {
        let names = vec![
            ".DS_Store",
            "notes.txt",
            "output_dictation_20260823.mp3",
            "output_dictation_20260823_12345.mp3",
            "output_dictation_20260823_07.mp3",
            "output_dictation_20260823_0007.mp3",
        ];
        let identity = next_run_identity(names, "20260823").unwrap();
        assert_eq!(identity.sequence, 8);
    }

    #[test]
    fn test_sequence_ceiling_is_fatal() {
        let names = vec!["output_dictation_20260823_9999.mp3"];
        match next_run_identity(names, "20260823") {
            Err(EchodrillError::SequenceExhausted { date }) => {
                assert_eq!(date, "20260823");
            }
            other => panic!("expected SequenceExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_sequence_just_below_ceiling() {
        let names = vec!["output_dictation_20260823_9998.mp3"];
        let identity = next_run_identity(names, "20260823").unwrap();
        assert_eq!(identity.sequence, 9999);
    }

    #[test]
    fn test_monotonic_within_a_day() {
        let mut names: Vec<String> = Vec::new();
        for _ in 0..5 {
            let identity = next_run_identity(names.iter(), "20260823").unwrap();
            names.push(identity.dictation_name());
        }
        let last = next_run_identity(names.iter(), "20260823").unwrap();
        assert_eq!(last.sequence, 6);
    }

    #[test]
    fn test_output_names_share_identity() {
        let identity = RunIdentity {
            date: "20260823".to_string(),
            sequence: 12,
        };
        assert_eq!(
            identity.dictation_name(),
            "output_dictation_20260823_0012.mp3"
        );
        assert_eq!(
            identity.shadowing_name(),
            "output_shadowing_20260823_0012.mp3"
        );
        assert_eq!(identity.transcript_name(), "transcript_20260823_0012.txt");
    }

    #[test]
    fn test_parse_accepts_transcript_prefix() {
        let names = vec!["transcript_20260823_0042.txt"];
        let identity = next_run_identity(names, "20260823").unwrap();
        assert_eq!(identity.sequence, 43);
    }

    #[test]
    fn test_today_shape() {
        let d = today();
        assert_eq!(d.len(), 8);
        assert!(d.bytes().all(|b| b.is_ascii_digit()));
    }
}
