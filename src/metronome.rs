//! Click track synthesis.
//!
//! One click per beat, cycling through 8 counts. Count 1 gets a high accent,
//! the configured counts get a lower click and the rest stay silent.

use crate::audio::{samples_for, AudioSegment};
use crate::graph::BEATS_PER_CYCLE;
use anyhow::{bail, Result};

/// Counts that click by default; 4 and 8 are silent.
pub const DEFAULT_ACCENTED_COUNTS: [u32; 6] = [1, 2, 3, 5, 6, 7];

/// Metronome sound settings.
#[derive(Debug, Clone)]
pub struct MetronomeGenerator {
    pub sample_rate: u32,
    pub click_seconds: f64,
    pub gain_db: f32,
    pub accent_hz: f32,
    pub click_hz: f32,
}

impl MetronomeGenerator {
    #[must_use]
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            click_seconds: 0.05,
            gain_db: -10.0,
            accent_hz: 2_000.0,
            click_hz: 1_000.0,
        }
    }

    /// Render `total_beats` beats at `bpm`.
    ///
    /// The track is exactly `total_beats * 60 / bpm` seconds long; beat `i`
    /// starts at sample `round(i * beat_interval * rate)`.
    pub fn generate(&self, bpm: f64, total_beats: u32, accented_counts: &[u32]) -> Result<AudioSegment> {
        if !(bpm.is_finite() && bpm > 0.0) {
            bail!("Tempo must be a positive number of beats per minute, got {bpm}");
        }
        let beat_seconds = 60.0 / bpm;
        let rate = self.sample_rate;

        let accent = AudioSegment::tone(self.accent_hz, self.click_seconds, rate).apply_gain(self.gain_db);
        let click = AudioSegment::tone(self.click_hz, self.click_seconds, rate).apply_gain(self.gain_db);

        let total_len = samples_for(f64::from(total_beats) * beat_seconds, rate);
        let mut track = AudioSegment::empty(rate);
        for beat in 0..total_beats {
            let beat_end = samples_for(f64::from(beat + 1) * beat_seconds, rate);
            let count = 1 + beat % BEATS_PER_CYCLE;

            let sound = if count == 1 {
                Some(&accent)
            } else if accented_counts.contains(&count) {
                Some(&click)
            } else {
                None
            };
            if let Some(sound) = sound {
                let room = beat_end - track.len();
                if sound.len() <= room {
                    track.append(sound);
                } else {
                    track.append(&AudioSegment::from_samples(sound.samples()[..room].to_vec(), rate));
                }
            }
            track.pad_to(beat_end);
        }

        debug_assert_eq!(track.len(), total_len);
        Ok(track)
    }
}
