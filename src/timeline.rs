//! # Timeline Assembly
//!
//! Places merged instructions on an absolute audio timeline and mixes them
//! over a metronome.
//!
//! Instruction `i` targets `(beat_i - 1) * 60 / bpm` seconds. Its clip gets
//! the window up to the next instruction's target:
//!
//! - longer than the window: time-compressed to fill it exactly
//! - shorter: padded with trailing silence to fill it exactly
//! - last instruction: left as is
//!
//! The speech track only ever grows. Silence closes any gap before a target
//! start; if earlier clips already overran it, the clip follows immediately.

use crate::audio::{samples_for, AudioSegment, ExportFormat};
use crate::instructions::InstructionEvent;
use crate::metronome::{MetronomeGenerator, DEFAULT_ACCENTED_COUNTS};
use crate::speech::ClipSource;
use anyhow::{bail, Result};
use log::{debug, info, warn};
use std::path::Path;

/// Metronome beats rendered past the last instruction.
pub const TAIL_BEATS: i64 = 8;

/// How one clip was fitted into its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotFit {
    /// Compressed to the window
    Compressed,
    /// Padded with silence to the window
    Padded,
    /// Already the right length, or no window (last clip)
    Unchanged,
}

/// Fit `clip` into `available` samples.
#[must_use]
pub fn fit_clip(clip: AudioSegment, available: Option<usize>) -> (AudioSegment, SlotFit) {
    match available {
        Some(window) if clip.len() > window => (clip.stretch_to(window), SlotFit::Compressed),
        Some(window) if clip.len() < window => {
            let mut padded = clip;
            padded.pad_to(window);
            (padded, SlotFit::Padded)
        }
        _ => (clip, SlotFit::Unchanged),
    }
}

/// Builds the final practice track.
#[derive(Debug, Clone)]
pub struct TimelineAssembler {
    pub sample_rate: u32,
    pub metronome: MetronomeGenerator,
    pub accented_counts: Vec<u32>,
}

impl TimelineAssembler {
    #[must_use]
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            metronome: MetronomeGenerator::new(sample_rate),
            accented_counts: DEFAULT_ACCENTED_COUNTS.to_vec(),
        }
    }

    #[must_use]
    pub fn with_accented_counts(mut self, counts: Vec<u32>) -> Self {
        self.accented_counts = counts;
        self
    }

    /// Sample offset at which an instruction on `beat` starts. Negative before the track.
    fn start_sample(&self, beat: i64, beat_seconds: f64) -> i64 {
        let seconds = (beat - 1) as f64 * beat_seconds;
        (seconds * f64::from(self.sample_rate)).round() as i64
    }

    /// Assemble the speech track only.
    ///
    /// `instructions` must be ordered by strictly ascending beat, as produced
    /// by [`crate::instructions::merge_instructions`].
    pub fn speech_track(
        &self,
        instructions: &[InstructionEvent],
        bpm: f64,
        clips: &mut dyn ClipSource,
    ) -> Result<AudioSegment> {
        if !(bpm.is_finite() && bpm > 0.0) {
            bail!("Tempo must be a positive number of beats per minute, got {bpm}");
        }
        if instructions.windows(2).any(|pair| pair[1].beat <= pair[0].beat) {
            bail!("Instructions must be merged and strictly ordered by beat before assembly");
        }

        let beat_seconds = 60.0 / bpm;
        let mut combined = AudioSegment::empty(self.sample_rate);

        for (i, instruction) in instructions.iter().enumerate() {
            let clip = clips.clip(&instruction.text)?.resample(self.sample_rate);

            let start = self.start_sample(instruction.beat, beat_seconds);
            let available = instructions
                .get(i + 1)
                .map(|next| (self.start_sample(next.beat, beat_seconds) - start) as usize);

            let original_len = clip.len();
            let (clip, fit) = fit_clip(clip, available);

            let gap = start - combined.len() as i64;
            if gap > 0 {
                combined.append_silence(gap as usize);
            } else if gap < 0 {
                debug!("\"{}\" starts {} samples late", instruction.text, -gap);
            }

            debug!(
                "Beat {:>4}: \"{}\" {} -> {} samples ({:?})",
                instruction.beat,
                instruction.text,
                original_len,
                clip.len(),
                fit
            );
            combined.append(&clip);
        }

        Ok(combined)
    }

    /// Assemble speech and mix it over a metronome running until 8 beats past
    /// the last instruction.
    pub fn assemble(
        &self,
        instructions: &[InstructionEvent],
        bpm: f64,
        clips: &mut dyn ClipSource,
    ) -> Result<AudioSegment> {
        let speech = self.speech_track(instructions, bpm, clips)?;

        let total_beats = match instructions.last() {
            Some(last) => (last.beat + TAIL_BEATS).max(0),
            None => {
                warn!("No instructions to render, producing a metronome-only track");
                TAIL_BEATS
            }
        };
        let metronome = self
            .metronome
            .generate(bpm, u32::try_from(total_beats)?, &self.accented_counts)?;

        info!(
            "Assembled {} instructions over {} beats ({:.1} s)",
            instructions.len(),
            total_beats,
            metronome.duration_secs().max(speech.duration_secs())
        );
        Ok(metronome.overlay(&speech))
    }

    /// Assemble and export in one go.
    pub fn render_to_file(
        &self,
        instructions: &[InstructionEvent],
        bpm: f64,
        clips: &mut dyn ClipSource,
        path: &Path,
        format: ExportFormat,
    ) -> Result<AudioSegment> {
        let track = self.assemble(instructions, bpm, clips)?;
        track.export(path, format)?;
        Ok(track)
    }
}

/// Samples per beat at `bpm`, rounded.
#[must_use]
pub fn beat_samples(bpm: f64, sample_rate: u32) -> usize {
    samples_for(60.0 / bpm, sample_rate)
}
