//! # Configuration Module
//!
//! Run parameters and platform directories for Pasos.
//!
//! ## Data Storage
//!
//! Synthesized instruction clips are cached in the platform data directory:
//! - Linux: `~/.local/share/pasos/audio_cache/`
//! - macOS: `~/Library/Application Support/pasos/audio_cache/`
//! - Windows: `%APPDATA%\pasos\audio_cache\`
//!
//! ## Configuration File
//!
//! Optional JSON file at `<config_dir>/pasos/config.json` (or `--config`).
//! Every field is optional; missing ones take the defaults below and
//! command-line flags override both.
//!
//! ```json
//! {
//!   "start_node": "Guapea position",
//!   "bpm": 180,
//!   "voice": "es-419"
//! }
//! ```

use crate::audio::{ExportFormat, DEFAULT_SAMPLE_RATE};
use crate::graph::BEATS_PER_CYCLE;
use crate::instructions::{DEFAULT_CONNECTIVE, DEFAULT_LEAD_IN_BEATS};
use crate::metronome::DEFAULT_ACCENTED_COUNTS;
use crate::sampler;
use crate::speech::default_speech_args;
use anyhow::{bail, Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Returns the platform-appropriate data directory for Pasos, creating it if needed.
///
/// # Errors
///
/// Fails when the system data directory cannot be determined or the
/// `pasos` subdirectory cannot be created.
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        )
    })?;

    let pasos_dir = data_dir.join("pasos");
    fs::create_dir_all(&pasos_dir).with_context(|| {
        format!(
            "Failed to create Pasos data directory at {}. Please check file permissions.",
            pasos_dir.display()
        )
    })?;

    Ok(pasos_dir)
}

/// Default location of the instruction audio cache.
pub fn get_cache_dir() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("audio_cache"))
}

/// Default location of the configuration file. It does not have to exist.
pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pasos").join("config.json"))
}

/// Every parameter of a practice run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Node the walk starts from
    pub start_node: String,
    /// Maximum number of walk steps
    pub max_steps: usize,
    /// Tempo in beats per minute
    pub bpm: f64,
    /// Weight multiplier applied to a freshly chosen node, in (0, 1)
    pub bias_factor: f64,
    /// Share of the missing weight recovered per draw, in (0, 1]
    pub recovery_rate: f64,
    /// Beats between a spoken cue and the transition it announces
    pub lead_in_beats: u32,
    /// Word joining cues that fall on the same beat
    pub connective: String,
    /// 8-count positions that click (1 always does)
    pub accented_counts: Vec<u32>,
    /// External text-to-speech program
    pub speech_program: String,
    /// Argument template; `{voice}`, `{output}` and `{text}` are substituted
    pub speech_args: Vec<String>,
    pub voice: String,
    /// Instruction clip cache, defaults to the data directory
    pub cache_dir: Option<PathBuf>,
    pub sample_rate: u32,
    pub output: PathBuf,
    pub format: ExportFormat,
    /// Fixed RNG seed for reproducible walks
    pub seed: Option<u64>,
    /// JSON graph definition replacing the built-in catalogue
    pub graph: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            start_node: "Suelta position".to_string(),
            max_steps: 100,
            bpm: 150.0,
            bias_factor: 0.05,
            recovery_rate: 0.03,
            lead_in_beats: DEFAULT_LEAD_IN_BEATS,
            connective: DEFAULT_CONNECTIVE.to_string(),
            accented_counts: DEFAULT_ACCENTED_COUNTS.to_vec(),
            speech_program: "espeak-ng".to_string(),
            speech_args: default_speech_args(),
            voice: "es".to_string(),
            cache_dir: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            output: PathBuf::from("output.wav"),
            format: ExportFormat::Wav,
            seed: None,
            graph: None,
        }
    }
}

impl RuntimeConfig {
    /// Load from `path`, or from the default location when it exists, or defaults.
    ///
    /// An explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match get_config_path() {
                Some(default) if default.exists() => default,
                _ => {
                    debug!("No configuration file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Range checks for every tunable parameter.
    pub fn validate(&self) -> Result<()> {
        sampler::validate_tuning(self.bias_factor, self.recovery_rate)?;
        if !(self.bpm.is_finite() && self.bpm > 0.0) {
            bail!("bpm must be positive, got {}", self.bpm);
        }
        if self.sample_rate == 0 {
            bail!("sample_rate must be positive");
        }
        if let Some(count) = self
            .accented_counts
            .iter()
            .find(|c| !(1..=BEATS_PER_CYCLE).contains(*c))
        {
            bail!("accented count {count} is outside 1-{BEATS_PER_CYCLE}");
        }
        if self.speech_program.trim().is_empty() {
            bail!("speech_program cannot be empty");
        }
        Ok(())
    }

    /// Configured cache directory or the platform default.
    pub fn resolved_cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => get_cache_dir(),
        }
    }
}
