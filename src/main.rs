//! # Pasos - Partner-Dance Practice Tracks
//!
//! Walks a graph of dance positions and moves, turns the walk into spoken
//! cues timed ahead of each transition, and renders the cues over a
//! metronome so a couple can practice leading and following.
//!
//! ## Usage
//!
//! ```bash
//! # Render a practice track with the defaults (Suelta start, 100 steps, 150 bpm)
//! pasos generate
//!
//! # Preview a reproducible walk without audio
//! pasos walk --seed 7 --steps 20
//!
//! # Export the built-in graph, edit it, and practice on it
//! pasos graph --json > salsa.json
//! pasos generate --graph salsa.json -o custom.wav
//! ```

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use pasos::cli::{self, WalkOptions};
use pasos::config::RuntimeConfig;
use pasos::graph::GraphModel;
use pasos::metronome::MetronomeGenerator;
use pasos::practice::{self, PracticePlan};
use pasos::speech::{CommandEngine, SpeechCache};
use pasos::{completion, sampler::Chooser};
use std::io::{self, Write};

/// Fold command-line walk options over the loaded configuration.
fn apply_walk_options(config: &mut RuntimeConfig, walk: WalkOptions) {
    if let Some(start) = walk.start {
        config.start_node = start;
    }
    if let Some(steps) = walk.steps {
        config.max_steps = steps;
    }
    if let Some(bias) = walk.bias {
        config.bias_factor = bias;
    }
    if let Some(recovery) = walk.recovery {
        config.recovery_rate = recovery;
    }
    if let Some(lead_in) = walk.lead_in {
        config.lead_in_beats = lead_in;
    }
    if walk.seed.is_some() {
        config.seed = walk.seed;
    }
    if walk.graph.is_some() {
        config.graph = walk.graph;
    }
}

/// Walk the configured graph, narrating on stdout unless `quiet`.
fn run_walk(config: &RuntimeConfig, quiet: bool) -> Result<PracticePlan> {
    let graph = practice::load_graph(config.graph.as_deref())?;
    let mut sampler = practice::sampler_for(&graph, config)?;
    let chooser: &mut dyn Chooser<String> = &mut sampler;

    if quiet {
        practice::plan(&graph, config, chooser, None)
    } else {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        practice::plan(&graph, config, chooser, Some(&mut out as &mut dyn Write))
    }
}

fn print_graph(graph: &GraphModel) {
    println!(
        "{} nodes, {} transitions",
        graph.node_count(),
        graph.transition_count()
    );
    for node in graph.nodes() {
        match node.move_duration() {
            Some(duration) => println!("\n{} [{}, {duration} beats]", node.name, node.kind),
            None => println!("\n{} [{}]", node.name, node.kind),
        }
        for transition in graph.outgoing(&node.name) {
            let start = transition
                .start_beat
                .map(|beat| format!("on {beat}, "))
                .unwrap_or_default();
            let signal = transition.signal.as_deref().unwrap_or("-");
            println!(
                "  -> {} ({start}{signal}, {} beats)",
                transition.target, transition.duration
            );
        }
    }
}

/// Main entry point for Pasos.
///
/// Logging is controlled through `RUST_LOG`:
/// - `RUST_LOG=info pasos generate` - walk and rendering summary
/// - `RUST_LOG=pasos::timeline=debug pasos generate` - per-cue placement
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();
    let mut config = RuntimeConfig::load(args.config.as_deref())?;

    match args.command {
        cli::Command::Generate {
            walk,
            bpm,
            output,
            format,
            cache_dir,
            voice,
        } => {
            let quiet = walk.quiet;
            apply_walk_options(&mut config, walk);
            if let Some(bpm) = bpm {
                config.bpm = bpm;
            }
            if let Some(output) = output {
                config.output = output;
            }
            if let Some(format) = format {
                config.format = format;
            }
            if cache_dir.is_some() {
                config.cache_dir = cache_dir;
            }
            if let Some(voice) = voice {
                config.voice = voice;
            }
            config.validate()?;

            let plan = run_walk(&config, quiet)?;
            info!("{} spoken cues after merging", plan.instructions.len());

            let engine = CommandEngine {
                program: config.speech_program.clone(),
                args: config.speech_args.clone(),
                voice: config.voice.clone(),
            };
            let mut cache = SpeechCache::new(engine, config.resolved_cache_dir()?, config.sample_rate)?;
            practice::render(&plan, &config, &mut cache)?;
            println!("Audio file saved as {}", config.output.display());
        }
        cli::Command::Walk { walk, json } => {
            let quiet = walk.quiet || json;
            apply_walk_options(&mut config, walk);
            config.validate()?;

            let plan = run_walk(&config, quiet)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan.instructions)?);
            } else {
                if !quiet {
                    println!();
                }
                for instruction in &plan.instructions {
                    println!("{instruction}");
                }
            }
        }
        cli::Command::Graph { graph, json } => {
            let graph = practice::load_graph(graph.as_deref().or(config.graph.as_deref()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&graph.to_definition())?);
            } else {
                print_graph(&graph);
            }
        }
        cli::Command::Metronome {
            bpm,
            beats,
            output,
            format,
        } => {
            if let Some(bpm) = bpm {
                config.bpm = bpm;
            }
            if let Some(output) = output {
                config.output = output;
            }
            if let Some(format) = format {
                config.format = format;
            }
            config.validate()?;

            debug!("Rendering {beats} beats at {} bpm", config.bpm);
            let track = MetronomeGenerator::new(config.sample_rate).generate(
                config.bpm,
                beats,
                &config.accented_counts,
            )?;
            track.export(&config.output, config.format)?;
            println!("Audio file saved as {}", config.output.display());
        }
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(&shell), &mut cmd);
        }
        cli::Command::CompletionEnhanced { shell } => match shell {
            cli::Shell::Bash => print!("{}", completion::enhanced_bash_completion()),
            cli::Shell::Fish => print!("{}", completion::enhanced_fish_completion()),
            _ => return Err(anyhow!("Enhanced completions only supported for bash and fish")),
        },
        cli::Command::CompleteNodes => {
            // Used by the enhanced completion scripts
            let graph = practice::load_graph(config.graph.as_deref())?;
            completion::print_node_completions(&graph);
        }
    }

    Ok(())
}
