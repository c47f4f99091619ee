//! Command-line interface for echodrill
//!
//! Provides argument parsing using clap derive macros. Zero required
//! arguments: the input recording is auto-discovered.

use crate::config::Device;
use clap::Parser;
use std::path::PathBuf;

/// Dictation and shadowing practice audio from a single recording
#[derive(Parser, Debug)]
#[command(
    name = "echodrill",
    version = crate::version_string().leak() as &'static str,
    about = "Dictation and shadowing practice audio from a single recording"
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory scanned for the most recent recording
    #[arg(long, value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Whisper model (tiny, base, small, medium, large)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Inference device (cpu, gpu)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<Device>,

    /// Concurrent clip-cutting workers
    #[arg(long, short = 'j', value_name = "N", default_value_t = crate::defaults::SPLIT_JOBS)]
    pub jobs: usize,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose output (per-stage detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_with_no_arguments() {
        let cli = Cli::try_parse_from(["echodrill"]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.input_dir.is_none());
        assert!(cli.model.is_none());
        assert!(cli.device.is_none());
        assert_eq!(cli.jobs, crate::defaults::SPLIT_JOBS);
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_parses_overrides() {
        let cli = Cli::try_parse_from([
            "echodrill",
            "--model",
            "medium",
            "--device",
            "cpu",
            "--input-dir",
            "/media/lessons",
            "-j",
            "8",
            "-q",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.model.as_deref(), Some("medium"));
        assert_eq!(cli.device, Some(Device::Cpu));
        assert_eq!(cli.input_dir, Some(PathBuf::from("/media/lessons")));
        assert_eq!(cli.jobs, 8);
        assert!(cli.quiet);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_rejects_unknown_device() {
        assert!(Cli::try_parse_from(["echodrill", "--device", "tpu"]).is_err());
    }

    #[test]
    fn test_cli_help_does_not_panic() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_version_carries_git_hash_when_present() {
        use clap::CommandFactory;
        let cmd = Cli::command();
        assert_eq!(cmd.get_version(), Some(crate::version_string().as_str()));
    }
}
