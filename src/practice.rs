//! # Practice Session Pipeline
//!
//! Glue between the stages of a run:
//!
//! ```text
//! graph ─► walk (+ sampler) ─► collector ─► merge ─► timeline (+ speech, metronome) ─► file
//! ```
//!
//! Every stage lives in its own module; this one wires them together with a
//! [`RuntimeConfig`] so the binary and the integration tests share one path.

use crate::catalogue;
use crate::config::RuntimeConfig;
use crate::graph::{GraphDefinition, GraphModel};
use crate::instructions::{merge_instructions, InstructionCollector, InstructionEvent};
use crate::narrate::Narrator;
use crate::sampler::{Chooser, WeightedSampler};
use crate::speech::ClipSource;
use crate::timeline::TimelineAssembler;
use crate::walk::{walk, WalkEnd, WalkObserver, WalkSummary};
use anyhow::{Context, Result};
use log::info;
use std::io::Write;
use std::path::Path;

/// Built-in catalogue, or the graph stored at `path`.
pub fn load_graph(path: Option<&Path>) -> Result<GraphModel> {
    match path {
        Some(path) => {
            let definition = GraphDefinition::load(path)?;
            GraphModel::from_definition(&definition)
                .with_context(|| format!("Invalid graph definition in {}", path.display()))
        }
        None => catalogue::salsa_graph(),
    }
}

/// Repetition-averse sampler over every node of `graph`, tuned by `config`.
pub fn sampler_for(graph: &GraphModel, config: &RuntimeConfig) -> Result<WeightedSampler<String>> {
    let names = graph.nodes().map(|node| node.name.clone());
    match config.seed {
        Some(seed) => WeightedSampler::seeded(names, config.bias_factor, config.recovery_rate, seed),
        None => WeightedSampler::new(names, config.bias_factor, config.recovery_rate),
    }
}

/// A walked sequence and its merged spoken cues.
#[derive(Debug, Clone)]
pub struct PracticePlan {
    pub summary: WalkSummary,
    pub instructions: Vec<InstructionEvent>,
}

/// Walk the graph and turn the steps into merged cues.
///
/// With `narration`, every step is also described on that writer.
pub fn plan<C: Chooser<String> + ?Sized>(
    graph: &GraphModel,
    config: &RuntimeConfig,
    chooser: &mut C,
    narration: Option<&mut dyn Write>,
) -> Result<PracticePlan> {
    let mut collector = InstructionCollector::new(config.lead_in_beats);

    let summary = match narration {
        Some(out) => {
            let mut narrator = Narrator::new(out);
            let mut observers: [&mut dyn WalkObserver; 2] = [&mut collector, &mut narrator];
            walk(graph, &config.start_node, config.max_steps, chooser, &mut observers)?
        }
        None => walk(graph, &config.start_node, config.max_steps, chooser, &mut [&mut collector])?,
    };

    match &summary.end {
        WalkEnd::MissingStart(name) => info!("Nothing to walk from `{name}`"),
        WalkEnd::DeadEnd(name) => info!("Walk ended at dead end `{name}` after {} steps", summary.steps),
        WalkEnd::StepLimit => info!("Walk finished {} steps at beat {}", summary.steps, summary.final_beat),
    }

    let instructions = merge_instructions(collector.events(), &config.connective)?;
    Ok(PracticePlan {
        summary,
        instructions,
    })
}

/// Render `plan` into the configured output file.
pub fn render(
    plan: &PracticePlan,
    config: &RuntimeConfig,
    clips: &mut dyn ClipSource,
) -> Result<()> {
    let assembler =
        TimelineAssembler::new(config.sample_rate).with_accented_counts(config.accented_counts.clone());
    assembler.render_to_file(&plan.instructions, config.bpm, clips, &config.output, config.format)?;
    Ok(())
}
