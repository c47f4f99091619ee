//! Production media engine backed by ffmpeg/ffprobe subprocesses.

use crate::defaults;
use crate::error::{EchodrillError, Result};
use crate::media::engine::{AudioFormat, MediaEngine};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Media engine that shells out to `ffmpeg` and `ffprobe`.
#[derive(Debug, Clone, Default)]
pub struct FfmpegEngine;

impl FfmpegEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run a binary and surface failures as `MediaEngine` errors carrying
    /// the operation name and stderr.
    async fn run(&self, operation: &str, binary: &str, args: &[&str]) -> Result<Vec<u8>> {
        let output = Command::new(binary).args(args).output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EchodrillError::MediaEngine {
                    operation: operation.to_string(),
                    message: format!("{} not found; install ffmpeg", binary),
                }
            } else {
                EchodrillError::MediaEngine {
                    operation: operation.to_string(),
                    message: format!("failed to launch {}: {}", binary, e),
                }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EchodrillError::MediaEngine {
                operation: operation.to_string(),
                message: format!("{} exited with {}: {}", binary, output.status, stderr.trim()),
            });
        }

        Ok(output.stdout)
    }
}

/// ffprobe `-of json` output shape. Numeric fields arrive as strings.
#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    sample_rate: Option<String>,
    channels: Option<u8>,
    bit_rate: Option<String>,
}

/// Convert ffprobe's bits-per-second string to the "192k" form ffmpeg's
/// `-b:a` expects; anything unparseable falls back to the default.
fn bitrate_arg(bit_rate: Option<&str>) -> String {
    bit_rate
        .and_then(|b| b.parse::<u64>().ok())
        .filter(|&bps| bps > 0)
        .map(|bps| format!("{}k", bps / 1000))
        .unwrap_or_else(|| defaults::FALLBACK_BIT_RATE.to_string())
}

pub(crate) fn parse_probe_output(raw: &str) -> Result<AudioFormat> {
    let probe: ProbeOutput = serde_json::from_str(raw).map_err(|e| EchodrillError::MediaEngine {
        operation: "probe".to_string(),
        message: format!("unparseable ffprobe output: {}", e),
    })?;

    let stream = probe
        .streams
        .first()
        .ok_or_else(|| EchodrillError::MediaEngine {
            operation: "probe".to_string(),
            message: "no audio stream in file".to_string(),
        })?;

    let sample_rate = stream
        .sample_rate
        .as_deref()
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|&sr| sr > 0)
        .ok_or_else(|| EchodrillError::MediaEngine {
            operation: "probe".to_string(),
            message: "audio stream reports no sample rate".to_string(),
        })?;

    Ok(AudioFormat {
        sample_rate,
        channels: stream.channels.unwrap_or(2).clamp(1, 2),
        bit_rate: bitrate_arg(stream.bit_rate.as_deref()),
    })
}

/// Quote a path for an ffmpeg concat list entry.
fn concat_list_entry(path: &Path) -> String {
    format!("file '{}'\n", path.display().to_string().replace('\'', "'\\''"))
}

#[async_trait]
impl MediaEngine for FfmpegEngine {
    async fn probe(&self, file: &Path) -> Result<AudioFormat> {
        let file = file.to_string_lossy();
        let stdout = self
            .run(
                "probe",
                "ffprobe",
                &[
                    "-v",
                    "error",
                    "-select_streams",
                    "a:0",
                    "-show_entries",
                    "stream=sample_rate,channels,bit_rate",
                    "-of",
                    "json",
                    &file,
                ],
            )
            .await?;
        parse_probe_output(&String::from_utf8_lossy(&stdout))
    }

    async fn synthesize_silence(
        &self,
        seconds: f64,
        format: &AudioFormat,
        out: &Path,
    ) -> Result<()> {
        let source = format!(
            "anullsrc=r={}:cl={}",
            format.sample_rate,
            format.channel_layout()
        );
        let duration = format!("{:.3}", seconds);
        let out = out.to_string_lossy();
        self.run(
            "silence",
            "ffmpeg",
            &[
                "-y", "-v", "error", "-f", "lavfi", "-i", &source, "-t", &duration, "-acodec",
                "libmp3lame", "-b:a", &format.bit_rate, &out,
            ],
        )
        .await?;
        Ok(())
    }

    async fn cut(
        &self,
        source: &Path,
        start: f64,
        duration: Option<f64>,
        format: &AudioFormat,
        out: &Path,
    ) -> Result<()> {
        let start_arg = format!("{:.3}", start);
        let source = source.to_string_lossy();
        let out = out.to_string_lossy();

        // -ss before -i seeks on the demuxer, which is fast and accurate
        // enough for phrase boundaries.
        let mut args: Vec<&str> = vec!["-y", "-v", "error", "-ss", &start_arg, "-i", &source];
        let duration_arg = duration.map(|d| format!("{:.3}", d));
        if let Some(ref d) = duration_arg {
            args.push("-t");
            args.push(d);
        }
        let rate = format.sample_rate.to_string();
        let channels = format.channels.to_string();
        args.extend([
            "-vn", "-ar", &rate, "-ac", &channels, "-acodec", "libmp3lame", "-b:a",
            &format.bit_rate, &out,
        ]);

        self.run("cut", "ffmpeg", &args).await?;
        Ok(())
    }

    async fn concatenate(
        &self,
        clips: &[PathBuf],
        format: &AudioFormat,
        out: &Path,
    ) -> Result<()> {
        // concat demuxer wants a list file next to the clips
        let list_path = out.with_extension("txt");
        let mut list = String::new();
        for clip in clips {
            list.push_str(&concat_list_entry(clip));
        }
        tokio::fs::write(&list_path, list).await?;

        let list_arg = list_path.to_string_lossy().to_string();
        let out = out.to_string_lossy();
        let result = self
            .run(
                "concatenate",
                "ffmpeg",
                &[
                    "-y", "-v", "error", "-f", "concat", "-safe", "0", "-i", &list_arg, "-acodec",
                    "libmp3lame", "-b:a", &format.bit_rate, &out,
                ],
            )
            .await;

        tokio::fs::remove_file(&list_path).await.ok();
        result.map(|_| ())
    }
}
