//! Randomized partner-dance practice tracks with spoken cues.
//!
//! Core modules:
//! - [`graph`] - Positions, moves and the transitions between them
//! - [`catalogue`] - The built-in salsa graph
//! - [`sampler`] - Repetition-averse weighted choice
//! - [`walk`] - Beat-accurate traversal of the graph
//! - [`instructions`] - Spoken cues collected from a walk and merged per beat
//! - [`timeline`] - Cue placement over a metronome
//!
//! ### Supporting Modules
//!
//! - [`audio`] - Mono sample buffers, time compression and WAV export
//! - [`speech`] - External text-to-speech with an on-disk clip cache
//! - [`metronome`] - Accented click tracks
//! - [`narrate`] - Human-readable step descriptions
//! - [`practice`] - The end-to-end pipeline used by the binary
//! - [`config`] - Runtime configuration and data directories
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use pasos::instructions::{merge_instructions, InstructionCollector};
//! use pasos::sampler::WeightedSampler;
//! use pasos::{catalogue, walk};
//! use anyhow::Result;
//!
//! let graph = catalogue::salsa_graph()?;
//! let mut sampler = WeightedSampler::seeded(
//!     graph.nodes().map(|n| n.name.clone()),
//!     0.05,
//!     0.03,
//!     7,
//! )?;
//!
//! let mut collector = InstructionCollector::default();
//! let summary = walk::walk(&graph, catalogue::GUAPEA, 50, &mut sampler, &mut [&mut collector])?;
//! println!("Walked {} steps, ending on beat {}", summary.steps, summary.final_beat);
//!
//! for cue in merge_instructions(collector.events(), "i")? {
//!     println!("{cue}");
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Timing Model
//!
//! Music runs in 8-beat cycles. A transition that must begin on a given count
//! first waits for that count, then the cue for it is spoken four beats
//! before it begins. Cues on the same beat are joined ("Siete i Ocho") and
//! each spoken clip is squeezed or padded to end exactly when the next
//! one starts.
//!
//! ## Error Handling
//!
//! All public functions return `Result<T, anyhow::Error>`. Common error
//! scenarios include:
//!
//! - Invalid graph definitions (unknown endpoints, start counts outside 1-8)
//! - Out-of-range tuning values
//! - A missing or failing speech program
//! - File system permission issues

pub mod audio;
pub mod catalogue;
pub mod cli;
pub mod completion;
pub mod config;
pub mod graph;
pub mod instructions;
pub mod metronome;
pub mod narrate;
pub mod practice;
pub mod sampler;
pub mod speech;
pub mod timeline;
pub mod walk;
