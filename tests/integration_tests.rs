//! # Integration Tests for Pasos
//!
//! End-to-end checks of the library pipeline (walk, cue merging, timeline,
//! speech cache) and smoke tests of the `pasos` binary.

use anyhow::Result;
use pasos::audio::{samples_for, AudioSegment, ExportFormat};
use pasos::catalogue;
use pasos::config::RuntimeConfig;
use pasos::graph::GraphDefinition;
use pasos::instructions::{merge_instructions, InstructionCollector, InstructionEvent};
use pasos::sampler::{FirstChoice, WeightedSampler};
use pasos::speech::{ClipSource, SpeechCache, SpeechEngine};
use pasos::timeline::{beat_samples, TimelineAssembler};
use pasos::walk::{self, WalkEnd};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const RATE: u32 = 8_000;

/// Speech stand-in: a 440 Hz tone lasting 20 ms per character.
struct ToneEngine {
    renders: Cell<usize>,
}

impl SpeechEngine for ToneEngine {
    fn render(&self, text: &str, output: &Path) -> Result<()> {
        self.renders.set(self.renders.get() + 1);
        AudioSegment::tone(440.0, 0.02 * text.len() as f64, RATE).export(output, ExportFormat::Wav)
    }
}

/// Fixed-length constant clips, no files involved.
struct ConstantClips(f64);

impl ClipSource for ConstantClips {
    fn clip(&mut self, _text: &str) -> Result<AudioSegment> {
        Ok(AudioSegment::from_samples(vec![0.25; samples_for(self.0, RATE)], RATE))
    }
}

fn suelta_cues(steps: usize) -> Result<Vec<InstructionEvent>> {
    let graph = catalogue::salsa_graph()?;
    let mut collector = InstructionCollector::default();
    walk::walk(&graph, catalogue::SUELTA, steps, &mut FirstChoice, &mut [&mut collector])?;
    merge_instructions(collector.events(), "i")
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;

    #[test]
    fn test_deterministic_walk_produces_expected_cues() -> Result<()> {
        let cues = suelta_cues(6)?;
        let expected = vec![
            InstructionEvent::new("Dile Que No Start", 2),
            InstructionEvent::new("Vamos Abajo", 7),
            InstructionEvent::new("Dile Que No Start", 12),
            InstructionEvent::new("Vamos Abajo", 15),
        ];
        assert_eq!(cues, expected);
        Ok(())
    }

    #[test]
    fn test_track_length_follows_last_cue() -> Result<()> {
        let cues = suelta_cues(6)?;
        let track = TimelineAssembler::new(RATE).assemble(&cues, 150.0, &mut ConstantClips(0.3))?;

        // last cue on beat 15, metronome runs 8 beats beyond
        assert_eq!(track.len(), 23 * beat_samples(150.0, RATE));
        Ok(())
    }

    #[test]
    fn test_render_is_reproducible() -> Result<()> {
        let dir = TempDir::new()?;
        let cues = suelta_cues(12)?;
        let assembler = TimelineAssembler::new(RATE);

        let first = dir.path().join("first.wav");
        let second = dir.path().join("second.wav");
        assembler.render_to_file(&cues, 150.0, &mut ConstantClips(0.5), &first, ExportFormat::Wav)?;
        assembler.render_to_file(&cues, 150.0, &mut ConstantClips(0.5), &second, ExportFormat::Wav)?;

        assert_eq!(std::fs::read(&first)?, std::fs::read(&second)?);
        Ok(())
    }

    #[test]
    fn test_speech_cache_renders_each_phrase_once() -> Result<()> {
        let dir = TempDir::new()?;
        let cues = suelta_cues(12)?;
        let engine = ToneEngine {
            renders: Cell::new(0),
        };
        let mut cache = SpeechCache::new(engine, dir.path().join("cache"), RATE)?;

        let assembler = TimelineAssembler::new(RATE);
        assembler.assemble(&cues, 150.0, &mut cache)?;
        assembler.assemble(&cues, 150.0, &mut cache)?;

        let mut distinct: Vec<&str> = cues.iter().map(|c| c.text.as_str()).collect();
        distinct.sort_unstable();
        distinct.dedup();
        for text in &distinct {
            assert!(cache.path_for(text).exists(), "missing cache entry for {text}");
        }
        assert_eq!(std::fs::read_dir(cache.cache_dir())?.count(), distinct.len());
        assert_eq!(cache.engine().renders.get(), distinct.len());
        Ok(())
    }

    #[test]
    fn test_seeded_sampler_walk_is_reproducible() -> Result<()> {
        let graph = catalogue::salsa_graph()?;
        let names: Vec<String> = graph.nodes().map(|n| n.name.clone()).collect();

        let run = |seed: u64| -> Result<(Vec<InstructionEvent>, u32)> {
            let mut sampler = WeightedSampler::seeded(names.clone(), 0.05, 0.03, seed)?;
            let mut collector = InstructionCollector::default();
            let summary = walk::walk(&graph, catalogue::GUAPEA, 80, &mut sampler, &mut [&mut collector])?;
            assert_eq!(summary.end, WalkEnd::StepLimit);
            Ok((merge_instructions(collector.events(), "i")?, summary.final_beat))
        };

        assert_eq!(run(99)?, run(99)?);
        Ok(())
    }

    #[test]
    fn test_config_file_drives_pipeline() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "start_node": "Closed position", "max_steps": 10, "lead_in_beats": 2 }"#)?;

        let config = RuntimeConfig::load(Some(&path))?;
        let graph = pasos::practice::load_graph(None)?;
        let plan = pasos::practice::plan(&graph, &config, &mut FirstChoice, None)?;

        assert_eq!(plan.summary.steps, 10);
        assert!(plan.instructions.windows(2).all(|w| w[0].beat < w[1].beat));
        Ok(())
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    fn pasos(args: &[&str], config: &Path) -> Output {
        Command::new(env!("CARGO_BIN_EXE_pasos"))
            .arg("--config")
            .arg(config)
            .args(args)
            .output()
            .expect("Failed to run pasos")
    }

    fn empty_config() -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").expect("write config");
        (dir, path)
    }

    #[test]
    fn test_cli_help_displays_correctly() {
        let (_dir, config) = empty_config();
        let output = pasos(&["--help"], &config);

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("pasos"));
        assert!(stdout.contains("generate"));
        assert!(stdout.contains("metronome"));
    }

    #[test]
    fn test_walk_json_is_reproducible() {
        let (_dir, config) = empty_config();
        let args = ["walk", "--seed", "7", "-n", "30", "--json"];

        let first = pasos(&args, &config);
        let second = pasos(&args, &config);
        assert!(first.status.success());

        let cues: Vec<InstructionEvent> = serde_json::from_slice(&first.stdout).expect("json cues");
        assert!(!cues.is_empty());
        assert_eq!(first.stdout, second.stdout);
    }

    #[test]
    fn test_walk_from_unknown_node_prints_nothing() {
        let (_dir, config) = empty_config();
        let output = pasos(&["walk", "--start", "Nowhere", "--json"], &config);
        assert!(output.status.success());

        let cues: Vec<InstructionEvent> = serde_json::from_slice(&output.stdout).expect("json cues");
        assert!(cues.is_empty());
    }

    #[test]
    fn test_invalid_bias_rejected() {
        let (_dir, config) = empty_config();
        let output = pasos(&["walk", "--bias", "0"], &config);
        assert!(!output.status.success());
    }

    #[test]
    fn test_graph_json_round_trips() {
        let (dir, config) = empty_config();
        let output = pasos(&["graph", "--json"], &config);
        assert!(output.status.success());

        let definition: GraphDefinition = serde_json::from_slice(&output.stdout).expect("graph json");
        assert_eq!(definition.nodes.len(), 20);

        let graph_path = dir.path().join("salsa.json");
        std::fs::write(&graph_path, &output.stdout).expect("write graph");
        let walked = pasos(
            &["walk", "--graph", graph_path.to_str().expect("utf-8 path"), "--seed", "1", "-q"],
            &config,
        );
        assert!(walked.status.success());
    }

    #[test]
    fn test_metronome_export() {
        let (dir, config) = empty_config();
        let out = dir.path().join("click.wav");
        let output = pasos(
            &["metronome", "--beats", "16", "-o", out.to_str().expect("utf-8 path")],
            &config,
        );
        assert!(output.status.success());

        let reader = hound::WavReader::open(&out).expect("wav written");
        assert_eq!(reader.duration() as usize, 16 * beat_samples(150.0, 22_050));
    }

    /// `generate` end to end, with `cp` copying a prepared clip in place of speech synthesis.
    #[cfg(unix)]
    #[test]
    fn test_generate_reports_saved_file_once() {
        let dir = TempDir::new().expect("temp dir");
        let voice_clip = dir.path().join("voice.wav");
        AudioSegment::tone(440.0, 0.2, RATE)
            .export(&voice_clip, ExportFormat::Wav)
            .expect("write voice clip");

        let config = dir.path().join("config.json");
        let settings = serde_json::json!({
            "speech_program": "cp",
            "speech_args": ["{voice}", "{output}"],
            "voice": voice_clip,
            "cache_dir": dir.path().join("cache"),
            "sample_rate": RATE,
        });
        std::fs::write(&config, settings.to_string()).expect("write config");

        let out = dir.path().join("practice.wav");
        let output = Command::new(env!("CARGO_BIN_EXE_pasos"))
            .env("RUST_LOG", "info")
            .arg("--config")
            .arg(&config)
            .args(["generate", "-q", "--seed", "5", "-n", "12", "-b", "160", "-o"])
            .arg(&out)
            .output()
            .expect("Failed to run pasos");
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

        let combined = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        assert_eq!(combined.matches("Audio file saved as").count(), 1, "{combined}");
        assert!(hound::WavReader::open(&out).expect("track written").duration() > 0);
    }

    #[test]
    fn test_completion_generation() {
        let (_dir, config) = empty_config();
        let output = pasos(&["completion", "bash"], &config);
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("pasos"));

        let nodes = pasos(&["complete-nodes"], &config);
        assert!(String::from_utf8_lossy(&nodes.stdout).contains("Suelta position"));
    }
}
