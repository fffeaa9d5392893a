//! # Speech Synthesis and Clip Cache
//!
//! Instruction phrases are rendered by an external text-to-speech program
//! (`espeak-ng` by default) and cached on disk, one WAV per literal phrase.
//!
//! ## Cache layout
//!
//! ```text
//! ~/.local/share/pasos/audio_cache/
//! ├── Dile Que No Start.wav
//! ├── Siete i Ocho.wav
//! └── ...
//! ```
//!
//! File names are the phrase itself with no escaping, so phrases containing
//! path separators cannot be cached. The cache is read-then-write without
//! locking: two processes rendering the same phrase at once may both
//! synthesize it.

use crate::audio::AudioSegment;
use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Something that supplies the audio clip for an instruction phrase.
pub trait ClipSource {
    /// # Errors
    ///
    /// Synthesis or I/O failures are fatal to the run.
    fn clip(&mut self, text: &str) -> Result<AudioSegment>;
}

/// Renders a phrase to a WAV file.
pub trait SpeechEngine {
    fn render(&self, text: &str, output: &Path) -> Result<()>;
}

/// Text-to-speech through an external command.
///
/// Arguments are templates; `{text}`, `{output}` and `{voice}` are replaced
/// per invocation.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    pub program: String,
    pub args: Vec<String>,
    pub voice: String,
}

impl Default for CommandEngine {
    fn default() -> Self {
        Self {
            program: "espeak-ng".to_string(),
            args: default_speech_args(),
            voice: "es".to_string(),
        }
    }
}

/// `espeak-ng -v {voice} -w {output} {text}`
#[must_use]
pub fn default_speech_args() -> Vec<String> {
    ["-v", "{voice}", "-w", "{output}", "{text}"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl CommandEngine {
    fn expand_args(&self, text: &str, output: &Path) -> Vec<String> {
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{voice}", &self.voice)
                    .replace("{output}", &output)
                    .replace("{text}", text)
            })
            .collect()
    }
}

impl SpeechEngine for CommandEngine {
    fn render(&self, text: &str, output: &Path) -> Result<()> {
        let args = self.expand_args(text, output);
        debug!("Running {} {:?}", self.program, args);

        let result = Command::new(&self.program)
            .args(&args)
            .output()
            .with_context(|| {
                format!(
                    "Failed to execute `{}`. Please install it or configure another speech program",
                    self.program
                )
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            bail!(
                "`{}` failed to synthesize \"{}\" ({}): {}",
                self.program,
                text,
                result.status,
                stderr.trim()
            );
        }
        if !output.exists() {
            bail!("`{}` did not produce {}", self.program, output.display());
        }
        Ok(())
    }
}

/// File-backed cache in front of a [`SpeechEngine`].
#[derive(Debug)]
pub struct SpeechCache<E> {
    engine: E,
    cache_dir: PathBuf,
    sample_rate: u32,
}

impl<E: SpeechEngine> SpeechCache<E> {
    /// Create the cache directory if needed.
    pub fn new(engine: E, cache_dir: impl Into<PathBuf>, sample_rate: u32) -> Result<Self> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir).with_context(|| {
            format!("Failed to create audio cache directory at {}", cache_dir.display())
        })?;
        Ok(Self {
            engine,
            cache_dir,
            sample_rate,
        })
    }

    /// Where the clip for `text` lives.
    #[must_use]
    pub fn path_for(&self, text: &str) -> PathBuf {
        self.cache_dir.join(format!("{text}.wav"))
    }

    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: SpeechEngine> ClipSource for SpeechCache<E> {
    fn clip(&mut self, text: &str) -> Result<AudioSegment> {
        let path = self.path_for(text);
        if path.exists() {
            debug!("Cache hit for \"{text}\"");
            return AudioSegment::load_wav(&path, self.sample_rate);
        }

        info!("Synthesizing \"{text}\"");
        let scratch = tempfile::Builder::new()
            .prefix("pasos-speech-")
            .suffix(".wav")
            .tempfile()
            .context("Failed to create scratch file for speech synthesis")?;
        self.engine.render(text, scratch.path())?;

        fs::copy(scratch.path(), &path)
            .with_context(|| format!("Failed to write cache entry {}", path.display()))?;
        AudioSegment::load_wav(&path, self.sample_rate)
    }
}
