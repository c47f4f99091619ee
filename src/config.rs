use crate::defaults;
use crate::error::{EchodrillError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure.
///
/// Loaded once at startup and passed by reference into every component;
/// nothing re-reads the config file mid-run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub processing: ProcessingConfig,
    pub detection: DetectionConfig,
    pub paths: PathsConfig,
}

/// Timeline assembly configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessingConfig {
    /// How many times each phrase plays in the dictation output.
    pub repeat_count: u32,
    /// Pause in seconds between repeats of one phrase.
    pub pause_between_repeats: f64,
    /// Pause in seconds between distinct phrases.
    pub pause_after_segment: f64,
    /// Segments at or below this duration (seconds) are dropped as noise.
    pub min_segment_length: f64,
}

/// Phrase detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    /// Whisper model identifier (tiny, base, small, medium, large).
    pub model_id: String,
    /// Optional context prompt to guide transcription style.
    pub whisper_prompt: String,
    /// Inference device.
    pub device: Device,
}

/// Inference device for the detector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cpu,
    #[default]
    Gpu,
}

impl Device {
    /// The device string the Whisper script expects.
    pub fn as_script_arg(&self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Gpu => "cuda",
        }
    }
}

impl std::str::FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(Device::Cpu),
            "gpu" | "cuda" => Ok(Device::Gpu),
            other => Err(format!("unknown device '{}', expected cpu or gpu", other)),
        }
    }
}

/// Directory layout and collaborator locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned for the most-recently-modified source recording.
    pub input_dir: PathBuf,
    /// Dictation audio output directory.
    pub dictation_dir: PathBuf,
    /// Shadowing audio output directory.
    pub shadowing_dir: PathBuf,
    /// Transcript output directory.
    pub transcript_dir: PathBuf,
    /// Per-run scratch directory, cleared at run start and removed at run end.
    pub temp_dir: PathBuf,
    /// Location of the Whisper detector script.
    pub detector_script: PathBuf,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            repeat_count: defaults::REPEAT_COUNT,
            pause_between_repeats: defaults::PAUSE_BETWEEN_REPEATS,
            pause_after_segment: defaults::PAUSE_AFTER_SEGMENT,
            min_segment_length: defaults::MIN_SEGMENT_LENGTH,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            model_id: defaults::MODEL_ID.to_string(),
            whisper_prompt: defaults::WHISPER_PROMPT.to_string(),
            device: Device::default(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(defaults::INPUT_DIR),
            dictation_dir: PathBuf::from(defaults::DICTATION_DIR),
            shadowing_dir: PathBuf::from(defaults::SHADOWING_DIR),
            transcript_dir: PathBuf::from(defaults::TRANSCRIPT_DIR),
            temp_dir: PathBuf::from(defaults::TEMP_DIR),
            detector_script: PathBuf::from(defaults::DETECTOR_SCRIPT),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// Missing fields take default values; malformed JSON is a fatal
    /// `ConfigParse` error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config =
            serde_json::from_str(&contents).map_err(|e| EchodrillError::ConfigParse {
                message: format!("{}: {}", path.display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, synthesizing and writing back defaults when the
    /// file does not exist.
    ///
    /// Only a missing file produces defaults; malformed JSON stays fatal.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }
        let config = Self::default();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&config)?)?;
        Ok(config)
    }

    /// Check the range constraints the field types cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.processing.repeat_count < 1 {
            return Err(EchodrillError::ConfigInvalidValue {
                key: "processing.repeat_count".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        for (key, value) in [
            (
                "processing.pause_between_repeats",
                self.processing.pause_between_repeats,
            ),
            (
                "processing.pause_after_segment",
                self.processing.pause_after_segment,
            ),
            (
                "processing.min_segment_length",
                self.processing.min_segment_length,
            ),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EchodrillError::ConfigInvalidValue {
                    key: key.to_string(),
                    message: "must be a non-negative number".to_string(),
                });
            }
        }
        if self.detection.model_id.trim().is_empty() {
            return Err(EchodrillError::ConfigInvalidValue {
                key: "detection.model_id".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides.
    ///
    /// Supported environment variables:
    /// - ECHODRILL_MODEL → detection.model_id
    /// - ECHODRILL_DEVICE → detection.device
    /// - ECHODRILL_INPUT_DIR → paths.input_dir
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("ECHODRILL_MODEL")
            && !model.is_empty()
        {
            self.detection.model_id = model;
        }

        if let Ok(device) = std::env::var("ECHODRILL_DEVICE")
            && let Ok(device) = device.parse()
        {
            self.detection.device = device;
        }

        if let Ok(dir) = std::env::var("ECHODRILL_INPUT_DIR")
            && !dir.is_empty()
        {
            self.paths.input_dir = PathBuf::from(dir);
        }

        self
    }

    /// Get the default configuration file path.
    ///
    /// Returns ~/.config/echodrill/config.json on Linux, falling back to a
    /// local ./config.json when no config directory can be determined.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("echodrill").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    }
}
