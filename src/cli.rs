//! # Command-Line Interface Module
//!
//! Clap definitions for the `pasos` binary.
//!
//! ## Commands
//!
//! - `generate`: walk the dance graph and render a practice track
//! - `walk`: walk the graph and print the narration and spoken cues only
//! - `graph`: list or export the active dance graph
//! - `metronome`: render a bare click track
//!
//! ## Examples
//!
//! ```bash
//! pasos generate --start "Guapea position" --steps 60 --bpm 160 -o guapea.wav
//! pasos walk --seed 7
//! pasos graph --json > salsa.json
//! ```

use crate::audio::ExportFormat;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser)]
#[command(name = "pasos")]
#[command(about = "Pasos: randomized partner-dance practice tracks with spoken cues")]
#[command(version)]
pub struct Args {
    /// Configuration file (defaults to <config_dir>/pasos/config.json)
    #[arg(long, global = true, env = "PASOS_CONFIG")]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command that walks the graph.
///
/// Anything left unset falls back to the configuration file.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct WalkOptions {
    /// Node to start from
    #[arg(short, long, value_hint = clap::ValueHint::Other)]
    pub start: Option<String>,

    /// Maximum number of steps
    #[arg(short = 'n', long)]
    pub steps: Option<usize>,

    /// Weight multiplier for a just-chosen node, in (0, 1)
    #[arg(long)]
    pub bias: Option<f64>,

    /// Weight recovery per draw for all other nodes, in (0, 1]
    #[arg(long)]
    pub recovery: Option<f64>,

    /// Beats between a spoken cue and its transition
    #[arg(long)]
    pub lead_in: Option<u32>,

    /// Seed for a reproducible walk
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON graph definition to use instead of the built-in salsa graph
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub graph: Option<PathBuf>,

    /// Do not print the step-by-step narration
    #[arg(short, long)]
    pub quiet: bool,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Walk the dance graph and render a practice track
    ///
    /// Spoken cues are synthesized with the configured speech program
    /// (espeak-ng by default), cached per phrase, fitted between beats and
    /// mixed over a metronome.
    Generate {
        #[command(flatten)]
        walk: WalkOptions,

        /// Tempo in beats per minute
        #[arg(short, long)]
        bpm: Option<f64>,

        /// Output file
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Output encoding
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,

        /// Directory holding cached instruction clips
        #[arg(long, value_hint = clap::ValueHint::DirPath)]
        cache_dir: Option<PathBuf>,

        /// Voice passed to the speech program
        #[arg(long)]
        voice: Option<String>,
    },

    /// Walk the dance graph and print the cues without rendering audio
    Walk {
        #[command(flatten)]
        walk: WalkOptions,

        /// Print the merged cues as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the active dance graph
    Graph {
        /// JSON graph definition to show instead of the built-in one
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        graph: Option<PathBuf>,

        /// Print the graph definition as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a metronome track without any speech
    Metronome {
        /// Tempo in beats per minute
        #[arg(short, long)]
        bpm: Option<f64>,

        /// Number of beats
        #[arg(long, default_value = "64")]
        beats: u32,

        /// Output file
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Output encoding
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,
    },

    /// Generate shell completions
    ///
    /// Usage: pasos completion bash > ~/.local/share/bash-completion/completions/pasos
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },

    /// Generate bash or fish completion that also completes node names for --start
    CompletionEnhanced {
        /// Shell to generate enhanced completions for (bash and fish supported)
        shell: Shell,
    },

    /// List node names for completion (hidden command)
    #[command(hide = true)]
    CompleteNodes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_generate_flags_parse() {
        let args = Args::parse_from([
            "pasos", "generate", "--start", "Guapea position", "-n", "40", "--bpm", "160",
            "--seed", "3", "-o", "out.wav", "--format", "wav-float",
        ]);
        match args.command {
            Command::Generate { walk, bpm, output, format, .. } => {
                assert_eq!(walk.start.as_deref(), Some("Guapea position"));
                assert_eq!(walk.steps, Some(40));
                assert_eq!(bpm, Some(160.0));
                assert_eq!(walk.seed, Some(3));
                assert_eq!(output, Some(PathBuf::from("out.wav")));
                assert_eq!(format, Some(ExportFormat::WavFloat));
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_walk_has_no_tempo_flag() {
        assert!(Args::try_parse_from(["pasos", "walk", "--bpm", "160"]).is_err());
        assert!(Args::try_parse_from(["pasos", "walk", "-b", "160"]).is_err());
    }
}
