use crate::error::{EchodrillError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Audio stream parameters captured once from the source file.
///
/// Immutable for the rest of the run and threaded through every derived
/// audio operation so outputs match the source fidelity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// 1 (mono) or 2 (stereo).
    pub channels: u8,
    /// ffmpeg-style bitrate string, e.g. "192k".
    pub bit_rate: String,
}

impl AudioFormat {
    /// The lavfi channel layout name for silence synthesis.
    pub fn channel_layout(&self) -> &'static str {
        if self.channels >= 2 { "stereo" } else { "mono" }
    }
}

/// Trait over the external media-processing engine.
///
/// Four narrow operations; every call is a blocking external process awaited
/// as a single unit. Output locations are chosen by the caller so the engine
/// stays stateless.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Read the audio stream parameters of a media file.
    async fn probe(&self, file: &Path) -> Result<AudioFormat>;

    /// Write `seconds` of silence in the given format to `out`.
    async fn synthesize_silence(&self, seconds: f64, format: &AudioFormat, out: &Path)
    -> Result<()>;

    /// Cut a sub-clip of `source` starting at `start` seconds. A `None`
    /// duration cuts to the end of the file.
    async fn cut(
        &self,
        source: &Path,
        start: f64,
        duration: Option<f64>,
        format: &AudioFormat,
        out: &Path,
    ) -> Result<()>;

    /// Concatenate the ordered clips into one output in the given format.
    async fn concatenate(&self, clips: &[PathBuf], format: &AudioFormat, out: &Path)
    -> Result<()>;
}

/// Implement MediaEngine for Arc<T> to allow sharing across tasks.
#[async_trait]
impl<T: MediaEngine> MediaEngine for Arc<T> {
    async fn probe(&self, file: &Path) -> Result<AudioFormat> {
        (**self).probe(file).await
    }

    async fn synthesize_silence(
        &self,
        seconds: f64,
        format: &AudioFormat,
        out: &Path,
    ) -> Result<()> {
        (**self).synthesize_silence(seconds, format, out).await
    }

    async fn cut(
        &self,
        source: &Path,
        start: f64,
        duration: Option<f64>,
        format: &AudioFormat,
        out: &Path,
    ) -> Result<()> {
        (**self).cut(source, start, duration, format, out).await
    }

    async fn concatenate(
        &self,
        clips: &[PathBuf],
        format: &AudioFormat,
        out: &Path,
    ) -> Result<()> {
        (**self).concatenate(clips, format, out).await
    }
}

/// One recorded invocation of the mock engine.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCall {
    Probe(PathBuf),
    Silence { seconds: f64, out: PathBuf },
    Cut {
        source: PathBuf,
        start: f64,
        duration: Option<f64>,
        out: PathBuf,
    },
    Concatenate { clips: Vec<PathBuf>, out: PathBuf },
}

/// Mock media engine for testing.
///
/// Records every call and writes placeholder files where outputs would go,
/// so pipeline-level tests can assert on the full command sequence without
/// ffmpeg installed.
#[derive(Debug, Clone)]
pub struct MockMediaEngine {
    format: AudioFormat,
    fail_on: Option<&'static str>,
    calls: Arc<Mutex<Vec<MediaCall>>>,
}

impl Default for MockMediaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMediaEngine {
    pub fn new() -> Self {
        Self {
            format: AudioFormat {
                sample_rate: 44100,
                channels: 2,
                bit_rate: "192k".to_string(),
            },
            fail_on: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Override the format returned by probe.
    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }

    /// Fail the named operation ("probe", "silence", "cut", "concatenate").
    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.fail_on = Some(operation);
        self
    }

    /// Snapshot of the recorded calls, in invocation order.
    pub fn calls(&self) -> Vec<MediaCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: MediaCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.fail_on == Some(operation) {
            return Err(EchodrillError::MediaEngine {
                operation: operation.to_string(),
                message: "mock failure".to_string(),
            });
        }
        Ok(())
    }

    fn touch(out: &Path) -> Result<()> {
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(out, b"mock audio")?;
        Ok(())
    }
}

#[async_trait]
impl MediaEngine for MockMediaEngine {
    async fn probe(&self, file: &Path) -> Result<AudioFormat> {
        self.check("probe")?;
        self.record(MediaCall::Probe(file.to_path_buf()));
        Ok(self.format.clone())
    }

    async fn synthesize_silence(
        &self,
        seconds: f64,
        _format: &AudioFormat,
        out: &Path,
    ) -> Result<()> {
        self.check("silence")?;
        self.record(MediaCall::Silence {
            seconds,
            out: out.to_path_buf(),
        });
        Self::touch(out)
    }

    async fn cut(
        &self,
        source: &Path,
        start: f64,
        duration: Option<f64>,
        _format: &AudioFormat,
        out: &Path,
    ) -> Result<()> {
        self.check("cut")?;
        self.record(MediaCall::Cut {
            source: source.to_path_buf(),
            start,
            duration,
            out: out.to_path_buf(),
        });
        Self::touch(out)
    }

    async fn concatenate(
        &self,
        clips: &[PathBuf],
        _format: &AudioFormat,
        out: &Path,
    ) -> Result<()> {
        self.check("concatenate")?;
        self.record(MediaCall::Concatenate {
            clips: clips.to_vec(),
            out: out.to_path_buf(),
        });
        Self::touch(out)
    }
}
