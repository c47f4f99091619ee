//! The batch pipeline that runs one recording end to end.
//!
//! Strictly linear: every stage completes before the next begins, any stage
//! error aborts the run with the originating cause, and there are no retries.
//! The only parallel section is clip cutting, which is embarrassingly
//! parallel and bounded by a worker count; sequential execution (one job)
//! produces identical results.

use crate::config::Config;
use crate::detect::SegmentDetector;
use crate::error::{EchodrillError, Result};
use crate::media::{AudioFormat, MediaEngine};
use crate::naming::{self, RunIdentity};
use crate::segment::{FilterReport, Segment, SegmentDuration, filter_segments};
use crate::timeline::{TimelineEntry, dictation_timeline, shadowing_timeline};
use crate::transcript::render_transcript;
use crate::workspace::{TempWorkspace, ensure_output_dirs, find_latest_input};
use owo_colors::OwoColorize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Pipeline stages in canonical execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LocateInput,
    Probe,
    SynthesizeSilence,
    DetectSegments,
    Filter,
    RenderTranscript,
    SplitAudio,
    BuildTimelines,
    MergeDictation,
    MergeShadowing,
    Cleanup,
}

impl Stage {
    /// The stage label used in progress output and errors.
    pub fn label(self) -> &'static str {
        match self {
            Self::LocateInput => "locate input",
            Self::Probe => "probe format",
            Self::SynthesizeSilence => "synthesize silence",
            Self::DetectSegments => "detect segments",
            Self::Filter => "filter segments",
            Self::RenderTranscript => "render transcript",
            Self::SplitAudio => "split audio",
            Self::BuildTimelines => "build timelines",
            Self::MergeDictation => "merge dictation",
            Self::MergeShadowing => "merge shadowing",
            Self::Cleanup => "cleanup",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Paths of the three artifacts a successful run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutputs {
    pub dictation: PathBuf,
    pub shadowing: PathBuf,
    pub transcript: PathBuf,
}

/// One-run pipeline over a detector and a media engine.
pub struct Pipeline {
    config: Config,
    detector: Arc<dyn SegmentDetector>,
    media: Arc<dyn MediaEngine>,
    quiet: bool,
    verbosity: u8,
    jobs: usize,
    cancel: Arc<AtomicBool>,
}

impl Pipeline {
    pub fn new(
        config: Config,
        detector: Arc<dyn SegmentDetector>,
        media: Arc<dyn MediaEngine>,
    ) -> Self {
        Self {
            config,
            detector,
            media,
            quiet: false,
            verbosity: 0,
            jobs: crate::defaults::SPLIT_JOBS,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Suppress stage progress output.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Bound the number of concurrent clip-cutting workers (minimum 1).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Share a cancellation flag; setting it aborts the run before the next
    /// blocking external call.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    fn progress(&self, stage: Stage) {
        if !self.quiet {
            eprintln!("{} {}", "»".dimmed(), stage.label());
        }
    }

    fn warn(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", "warning:".yellow(), message);
        }
    }

    /// Cancellation point before a stage's blocking work.
    fn checkpoint(&self, stage: Stage) -> Result<()> {
        if self.cancel.load(Ordering::SeqCst) {
            return Err(EchodrillError::Cancelled {
                stage: stage.label().to_string(),
            });
        }
        self.progress(stage);
        Ok(())
    }

    /// Run the whole pipeline once.
    pub async fn run(&self) -> Result<RunOutputs> {
        // Scratch directory first: cleared now, removed again when `temp`
        // drops — including on every error path below.
        let temp = TempWorkspace::create(&self.config.paths.temp_dir)?;

        // LocateInput
        self.checkpoint(Stage::LocateInput)?;
        ensure_output_dirs(&self.config.paths)?;
        let identity = self.next_identity()?;
        let input = find_latest_input(&self.config.paths.input_dir)?;
        if self.verbosity >= 1 {
            eprintln!(
                "  input: {} (run {}_{:04})",
                input.display(),
                identity.date,
                identity.sequence
            );
        }

        // Probe
        self.checkpoint(Stage::Probe)?;
        let format = self.media.probe(&input).await?;
        if self.verbosity >= 1 {
            eprintln!(
                "  format: {} Hz, {} ch, {}",
                format.sample_rate, format.channels, format.bit_rate
            );
        }

        // SynthesizeSilence: pre-warm the two configured pauses; shadowing
        // slots are synthesized on demand during merge.
        self.checkpoint(Stage::SynthesizeSilence)?;
        let mut silences = SilenceCache::new(&temp);
        for seconds in [
            self.config.processing.pause_between_repeats,
            self.config.processing.pause_after_segment,
        ] {
            silences.get_or_create(&*self.media, seconds, &format).await?;
        }

        // DetectSegments
        self.checkpoint(Stage::DetectSegments)?;
        let detected = self
            .detector
            .detect(&input, &self.config.detection)
            .await?;
        if self.verbosity >= 1 {
            eprintln!("  detected {} segments", detected.len());
        }

        // Filter
        self.checkpoint(Stage::Filter)?;
        let report: FilterReport =
            filter_segments(detected, self.config.processing.min_segment_length);
        if report.dropped > 0 && self.verbosity >= 1 {
            eprintln!("  dropped {} noise segments", report.dropped);
        }
        if report.is_degenerate() {
            self.warn(&format!(
                "only {} segment(s) survived filtering; repetition and shadowing degenerate",
                report.segments.len()
            ));
        }
        let segments = report.segments;

        // RenderTranscript
        self.checkpoint(Stage::RenderTranscript)?;
        let transcript_path = self
            .config
            .paths
            .transcript_dir
            .join(identity.transcript_name());
        fs::write(&transcript_path, render_transcript(&segments))?;

        // SplitAudio
        self.checkpoint(Stage::SplitAudio)?;
        let clips = self.split_segments(&input, &segments, &format, &temp).await?;

        // BuildTimelines
        self.checkpoint(Stage::BuildTimelines)?;
        let dictation = dictation_timeline(&segments, &self.config.processing);
        let shadowing = shadowing_timeline(&segments, &self.config.processing);

        // MergeDictation
        self.checkpoint(Stage::MergeDictation)?;
        let dictation_path = self
            .config
            .paths
            .dictation_dir
            .join(identity.dictation_name());
        self.merge(&dictation, &clips, &mut silences, &format, &dictation_path)
            .await?;

        // MergeShadowing
        self.checkpoint(Stage::MergeShadowing)?;
        let shadowing_path = self
            .config
            .paths
            .shadowing_dir
            .join(identity.shadowing_name());
        self.merge(&shadowing, &clips, &mut silences, &format, &shadowing_path)
            .await?;

        // Cleanup
        self.checkpoint(Stage::Cleanup)?;
        drop(silences);
        drop(temp);

        Ok(RunOutputs {
            dictation: dictation_path,
            shadowing: shadowing_path,
            transcript: transcript_path,
        })
    }

    /// Next run identity from the names already in the dictation directory.
    ///
    /// The dictation directory is the authority; all three outputs share one
    /// identity. An unreadable directory counts as empty. The identity is
    /// computed once here — a run crossing midnight keeps its starting date.
    fn next_identity(&self) -> Result<RunIdentity> {
        let existing: Vec<String> = fs::read_dir(&self.config.paths.dictation_dir)
            .map(|entries| {
                entries
                    .flatten()
                    .filter_map(|e| e.file_name().into_string().ok())
                    .collect()
            })
            .unwrap_or_default();
        naming::next_run_identity(existing, &naming::today())
    }

    /// Cut every segment into its own clip file under the temp workspace.
    ///
    /// Bounded-parallel: correctness does not depend on parallelism, only
    /// throughput does. Clip paths come back indexed to match the segment
    /// list regardless of completion order.
    async fn split_segments(
        &self,
        input: &Path,
        segments: &[Segment],
        format: &AudioFormat,
        temp: &TempWorkspace,
    ) -> Result<Vec<PathBuf>> {
        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let mut tasks: JoinSet<Result<()>> = JoinSet::new();
        let mut clips = Vec::with_capacity(segments.len());

        for (i, segment) in segments.iter().enumerate() {
            let out = temp.file(&format!("clip_{:04}.mp3", i));
            clips.push(out.clone());

            let media = Arc::clone(&self.media);
            let semaphore = Arc::clone(&semaphore);
            let source = input.to_path_buf();
            let format = format.clone();
            let start = segment.start;
            let duration = match segment.duration {
                SegmentDuration::Known(secs) => Some(secs),
                SegmentDuration::OpenEnded => None,
            };

            tasks.spawn(async move {
                // Closed only if the semaphore is dropped, which cannot
                // happen while this task holds a clone.
                let _permit = semaphore.acquire().await.map_err(|e| {
                    EchodrillError::MediaEngine {
                        operation: "cut".to_string(),
                        message: e.to_string(),
                    }
                })?;
                media.cut(&source, start, duration, &format, &out).await
            });
        }

        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let result = joined.map_err(|e| EchodrillError::MediaEngine {
                operation: "cut".to_string(),
                message: format!("worker panicked: {}", e),
            });
            if let Err(e) = result.and_then(|r| r) {
                first_error.get_or_insert(e);
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        if self.verbosity >= 1 {
            eprintln!("  cut {} clips", clips.len());
        }
        Ok(clips)
    }

    /// Materialize a timeline into an ordered clip list and concatenate it.
    async fn merge(
        &self,
        timeline: &[TimelineEntry],
        clips: &[PathBuf],
        silences: &mut SilenceCache<'_>,
        format: &AudioFormat,
        out: &Path,
    ) -> Result<()> {
        let mut parts = Vec::with_capacity(timeline.len());
        for entry in timeline {
            match *entry {
                TimelineEntry::Clip(i) => parts.push(clips[i].clone()),
                TimelineEntry::Silence(seconds) => {
                    if let Some(path) = silences
                        .get_or_create(&*self.media, seconds, format)
                        .await?
                    {
                        parts.push(path);
                    }
                }
            }
        }
        if parts.is_empty() {
            // Empty segment list: nothing to merge, write nothing rather
            // than asking ffmpeg to concatenate zero inputs.
            self.warn(&format!("no segments; skipping {}", out.display()));
            fs::write(out, b"")?;
            return Ok(());
        }
        self.media.concatenate(&parts, format, out).await
    }
}

/// Silence clips de-duplicated per distinct duration.
///
/// Keys are milliseconds so float durations compare exactly; zero-length
/// silences are elided entirely (`None`).
struct SilenceCache<'a> {
    temp: &'a TempWorkspace,
    by_millis: HashMap<u64, PathBuf>,
}

impl<'a> SilenceCache<'a> {
    fn new(temp: &'a TempWorkspace) -> Self {
        Self {
            temp,
            by_millis: HashMap::new(),
        }
    }

    async fn get_or_create(
        &mut self,
        media: &dyn MediaEngine,
        seconds: f64,
        format: &AudioFormat,
    ) -> Result<Option<PathBuf>> {
        let millis = (seconds * 1000.0).round() as u64;
        if millis == 0 {
            return Ok(None);
        }
        if let Some(path) = self.by_millis.get(&millis) {
            return Ok(Some(path.clone()));
        }
        let path = self.temp.file(&format!("silence_{:06}.mp3", millis));
        media
            .synthesize_silence(millis as f64 / 1000.0, format, &path)
            .await?;
        self.by_millis.insert(millis, path.clone());
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MockMediaEngine;

    #[test]
    fn test_stage_labels() {
        assert_eq!(Stage::LocateInput.label(), "locate input");
        assert_eq!(Stage::MergeShadowing.to_string(), "merge shadowing");
    }

    #[tokio::test]
    async fn test_silence_cache_deduplicates() {
        let dir = tempfile::tempdir().unwrap();
        let temp = TempWorkspace::create(&dir.path().join("t")).unwrap();
        let engine = MockMediaEngine::new();
        let format = engine.probe(Path::new("x.mp3")).await.unwrap();
        let mut cache = SilenceCache::new(&temp);

        let a = cache.get_or_create(&engine, 2.0, &format).await.unwrap();
        let b = cache.get_or_create(&engine, 2.0, &format).await.unwrap();
        let c = cache.get_or_create(&engine, 3.0, &format).await.unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        // probe + two distinct synthesize calls
        assert_eq!(engine.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_silence_cache_elides_zero() {
        let dir = tempfile::tempdir().unwrap();
        let temp = TempWorkspace::create(&dir.path().join("t")).unwrap();
        let engine = MockMediaEngine::new();
        let format = engine.probe(Path::new("x.mp3")).await.unwrap();
        let mut cache = SilenceCache::new(&temp);

        let none = cache.get_or_create(&engine, 0.0, &format).await.unwrap();
        assert!(none.is_none());
        // only the probe call
        assert_eq!(engine.calls().len(), 1);
    }
}
