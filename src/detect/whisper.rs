//! Production detector: shells out to the bundled Whisper Python script.
//!
//! Invocation: `python3 <script> <audio> <model> <prompt> <device>`. The
//! script prints progress to stderr and a single JSON document to stdout:
//! `{ "success": bool, "segments": [{start, duration, text}], "error"? }`.

use crate::config::DetectionConfig;
use crate::detect::detector::{SegmentDetector, parse_detector_response};
use crate::error::{EchodrillError, Result};
use crate::segment::Segment;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Detector that runs Whisper in a Python subprocess.
#[derive(Debug, Clone)]
pub struct WhisperProcessDetector {
    python: String,
    script: PathBuf,
}

impl WhisperProcessDetector {
    pub fn new(script: PathBuf) -> Self {
        Self {
            python: "python3".to_string(),
            script,
        }
    }

    /// Override the Python interpreter (e.g. a venv binary).
    pub fn with_python(mut self, python: &str) -> Self {
        self.python = python.to_string();
        self
    }
}

#[async_trait]
impl SegmentDetector for WhisperProcessDetector {
    async fn detect(&self, input: &Path, config: &DetectionConfig) -> Result<Vec<Segment>> {
        let output = Command::new(&self.python)
            .arg(&self.script)
            .arg(input)
            .arg(&config.model_id)
            .arg(&config.whisper_prompt)
            .arg(config.device.as_script_arg())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EchodrillError::Detection {
                        message: format!("{} not found; install Python 3 and openai-whisper", self.python),
                    }
                } else {
                    EchodrillError::Detection {
                        message: format!("failed to launch detector: {}", e),
                    }
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EchodrillError::Detection {
                message: format!(
                    "detector exited with {}: {}",
                    output.status,
                    stderr.trim()
                ),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_detector_response(stdout.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectionConfig;

    #[tokio::test]
    async fn test_missing_interpreter_is_detection_error() {
        let detector = WhisperProcessDetector::new(PathBuf::from("scripts/whisper_detector.py"))
            .with_python("definitely-not-a-real-python");

        let result = detector
            .detect(Path::new("in.mp3"), &DetectionConfig::default())
            .await;

        match result {
            Err(EchodrillError::Detection { message }) => {
                assert!(message.contains("not found"), "got: {}", message);
            }
            _ => panic!("expected Detection error"),
        }
    }
}
