use crate::config::DetectionConfig;
use crate::error::{EchodrillError, Result};
use crate::segment::{Segment, SegmentDuration};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Trait for speech phrase-boundary detection.
///
/// This trait allows swapping implementations (real Whisper subprocess vs
/// mock). Detection is a blocking, long-running call awaited as one unit;
/// no partial results are observed.
#[async_trait]
pub trait SegmentDetector: Send + Sync {
    /// Detect phrase segments in the given audio file.
    ///
    /// Returns segments ordered by start time. An empty detector response
    /// maps to a single sentinel segment covering the whole file, so the
    /// returned list is never empty on success.
    async fn detect(&self, input: &Path, config: &DetectionConfig) -> Result<Vec<Segment>>;
}

/// Implement SegmentDetector for Arc<T> to allow sharing across tasks.
#[async_trait]
impl<T: SegmentDetector> SegmentDetector for Arc<T> {
    async fn detect(&self, input: &Path, config: &DetectionConfig) -> Result<Vec<Segment>> {
        (**self).detect(input, config).await
    }
}

/// Wire format of the detector response.
#[derive(Debug, Deserialize)]
pub(crate) struct DetectorResponse {
    pub success: bool,
    #[serde(default)]
    pub segments: Vec<WireSegment>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One segment as the detector script emits it: `duration: null` means the
/// segment runs to the end of the source.
#[derive(Debug, Deserialize)]
pub(crate) struct WireSegment {
    pub start: f64,
    pub duration: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
}

impl From<WireSegment> for Segment {
    fn from(wire: WireSegment) -> Self {
        let duration = match wire.duration {
            Some(secs) => SegmentDuration::Known(secs),
            None => SegmentDuration::OpenEnded,
        };
        Segment::new(wire.start, duration, wire.text)
    }
}

/// Parse the detector's stdout JSON into segments.
///
/// `success: false` surfaces the script's own error message; an empty
/// segment list becomes the whole-file sentinel.
pub(crate) fn parse_detector_response(raw: &str) -> Result<Vec<Segment>> {
    let response: DetectorResponse =
        serde_json::from_str(raw).map_err(|e| EchodrillError::Detection {
            message: format!("unparseable detector response: {}", e),
        })?;

    if !response.success {
        return Err(EchodrillError::Detection {
            message: response
                .error
                .unwrap_or_else(|| "detector reported failure without detail".to_string()),
        });
    }

    if response.segments.is_empty() {
        return Ok(vec![Segment::whole_file()]);
    }

    Ok(response.segments.into_iter().map(Segment::from).collect())
}

/// Mock detector for testing.
#[derive(Debug, Clone)]
pub struct MockDetector {
    segments: Vec<Segment>,
    should_fail: bool,
}

impl MockDetector {
    /// Create a mock that returns the given segments.
    pub fn with_segments(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            should_fail: false,
        }
    }

    /// Configure the mock to fail on detect.
    pub fn failing() -> Self {
        Self {
            segments: Vec::new(),
            should_fail: true,
        }
    }
}

#[async_trait]
impl SegmentDetector for MockDetector {
    async fn detect(&self, _input: &Path, _config: &DetectionConfig) -> Result<Vec<Segment>> {
        if self.should_fail {
            return Err(EchodrillError::Detection {
                message: "mock detection failure".to_string(),
            });
        }
        if self.segments.is_empty() {
            return Ok(vec![Segment::whole_file()]);
        }
        Ok(self.segments.clone())
    }
}
