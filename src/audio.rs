//! # Audio Primitives
//!
//! Minimal mono audio buffer used to build practice tracks: silence, sine
//! tones, concatenation, overlay, time compression and WAV import/export.
//! Samples are `f32` in `-1.0..=1.0`; all lengths are exact sample counts so
//! timeline arithmetic never drifts.

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;
use std::path::Path;

/// Rendering rate for every generated track.
pub const DEFAULT_SAMPLE_RATE: u32 = 22_050;

/// Grain length used by [`AudioSegment::stretch_to`].
const STRETCH_GRAIN_SECONDS: f64 = 0.04;

/// Container formats the final track can be written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// 16-bit PCM WAV
    #[default]
    Wav,
    /// 32-bit float WAV
    WavFloat,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Wav => write!(f, "wav"),
            ExportFormat::WavFloat => write!(f, "wav-float"),
        }
    }
}

/// Number of samples covering `seconds`, rounded to the nearest sample.
#[must_use]
pub fn samples_for(seconds: f64, sample_rate: u32) -> usize {
    (seconds * f64::from(sample_rate)).round().max(0.0) as usize
}

/// Linear gain factor for a change of `db` decibels.
#[must_use]
pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Mono audio buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    sample_rate: u32,
    samples: Vec<f32>,
}

impl AudioSegment {
    #[must_use]
    pub fn empty(sample_rate: u32) -> Self {
        Self::from_samples(Vec::new(), sample_rate)
    }

    #[must_use]
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            samples,
        }
    }

    #[must_use]
    pub fn silent(seconds: f64, sample_rate: u32) -> Self {
        Self::silent_samples(samples_for(seconds, sample_rate), sample_rate)
    }

    #[must_use]
    pub fn silent_samples(len: usize, sample_rate: u32) -> Self {
        Self::from_samples(vec![0.0; len], sample_rate)
    }

    /// Full-scale sine tone.
    #[must_use]
    pub fn tone(frequency_hz: f32, seconds: f64, sample_rate: u32) -> Self {
        let len = samples_for(seconds, sample_rate);
        let step = 2.0 * PI * frequency_hz / sample_rate as f32;
        let samples = (0..len).map(|i| (step * i as f32).sin()).collect();
        Self::from_samples(samples, sample_rate)
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Append `other`, converting its sample rate if needed.
    pub fn append(&mut self, other: &AudioSegment) {
        if other.sample_rate == self.sample_rate {
            self.samples.extend_from_slice(&other.samples);
        } else {
            self.samples.extend_from_slice(&other.resample(self.sample_rate).samples);
        }
    }

    /// Append `len` samples of silence.
    pub fn append_silence(&mut self, len: usize) {
        self.samples.resize(self.samples.len() + len, 0.0);
    }

    /// Pad with trailing silence up to `len` samples. Longer buffers are left alone.
    pub fn pad_to(&mut self, len: usize) {
        if self.samples.len() < len {
            self.samples.resize(len, 0.0);
        }
    }

    #[must_use]
    pub fn apply_gain(mut self, db: f32) -> Self {
        let gain = db_to_gain(db);
        for sample in &mut self.samples {
            *sample *= gain;
        }
        self
    }

    /// Mix `top` over `self` starting at sample 0.
    ///
    /// The result is as long as the longer of the two, so nothing is cut off.
    #[must_use]
    pub fn overlay(&self, top: &AudioSegment) -> Self {
        let top = if top.sample_rate == self.sample_rate {
            std::borrow::Cow::Borrowed(top)
        } else {
            std::borrow::Cow::Owned(top.resample(self.sample_rate))
        };

        let mut mixed = self.samples.clone();
        if mixed.len() < top.samples.len() {
            mixed.resize(top.samples.len(), 0.0);
        }
        for (out, &sample) in mixed.iter_mut().zip(&top.samples) {
            *out = (*out + sample).clamp(-1.0, 1.0);
        }
        Self::from_samples(mixed, self.sample_rate)
    }

    /// Convert to another sample rate with linear interpolation.
    #[must_use]
    pub fn resample(&self, sample_rate: u32) -> Self {
        if sample_rate == self.sample_rate {
            return self.clone();
        }
        let len = (self.samples.len() as f64 * f64::from(sample_rate) / f64::from(self.sample_rate))
            .round() as usize;
        Self::from_samples(interpolate_to(&self.samples, len), sample_rate)
    }

    /// Change the duration to exactly `len` samples while keeping the pitch.
    ///
    /// Uses windowed overlap-add: grains are read at the compressed input
    /// position and laid down at a fixed output hop. Clips too short for a
    /// couple of grains fall back to plain interpolation.
    #[must_use]
    pub fn stretch_to(&self, len: usize) -> Self {
        if len == self.samples.len() {
            return self.clone();
        }
        let grain = samples_for(STRETCH_GRAIN_SECONDS, self.sample_rate).max(4);
        if self.samples.len() < grain * 2 || len < grain {
            return Self::from_samples(interpolate_to(&self.samples, len), self.sample_rate);
        }

        let hop = grain / 2;
        let ratio = self.samples.len() as f64 / len as f64;
        let window: Vec<f32> = (0..grain)
            .map(|i| (PI * i as f32 / grain as f32).sin().powi(2))
            .collect();

        let mut out = vec![0.0f32; len + grain];
        let mut norm = vec![0.0f32; len + grain];
        let mut out_pos = 0;
        while out_pos < len {
            let in_pos = ((out_pos as f64 * ratio) as usize).min(self.samples.len() - grain);
            for (i, &w) in window.iter().enumerate() {
                out[out_pos + i] += self.samples[in_pos + i] * w;
                norm[out_pos + i] += w;
            }
            out_pos += hop;
        }

        out.truncate(len);
        for (sample, &weight) in out.iter_mut().zip(&norm) {
            if weight > 1e-3 {
                *sample /= weight;
            }
        }
        Self::from_samples(out, self.sample_rate)
    }

    /// Load a WAV file as mono at `sample_rate`.
    pub fn load_wav(path: &Path, sample_rate: u32) -> Result<Self> {
        let mut reader = hound::WavReader::open(path)
            .with_context(|| format!("Failed to open WAV file {}", path.display()))?;
        let spec = reader.spec();

        let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
            (hound::SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .with_context(|| format!("Failed to decode {}", path.display()))?,
            (hound::SampleFormat::Int, bits @ 1..=32) => {
                let scale = (1i64 << (bits - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / scale))
                    .collect::<Result<_, _>>()
                    .with_context(|| format!("Failed to decode {}", path.display()))?
            }
            (format, bits) => bail!(
                "Unsupported WAV encoding in {}: {:?} with {} bits",
                path.display(),
                format,
                bits
            ),
        };

        let channels = usize::from(spec.channels.max(1));
        let mono: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();

        Ok(Self::from_samples(mono, spec.sample_rate).resample(sample_rate))
    }

    /// Write the buffer to `path`.
    pub fn export(&self, path: &Path, format: ExportFormat) -> Result<()> {
        let spec = match format {
            ExportFormat::Wav => hound::WavSpec {
                channels: 1,
                sample_rate: self.sample_rate,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            },
            ExportFormat::WavFloat => hound::WavSpec {
                channels: 1,
                sample_rate: self.sample_rate,
                bits_per_sample: 32,
                sample_format: hound::SampleFormat::Float,
            },
        };

        let mut writer = hound::WavWriter::create(path, spec)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        for &sample in &self.samples {
            let clamped = sample.clamp(-1.0, 1.0);
            let written = match format {
                ExportFormat::Wav => writer.write_sample((clamped * f32::from(i16::MAX)) as i16),
                ExportFormat::WavFloat => writer.write_sample(clamped),
            };
            written.with_context(|| format!("Failed to write samples to {}", path.display()))?;
        }
        writer
            .finalize()
            .with_context(|| format!("Failed to finalize {}", path.display()))
    }
}

/// Linear interpolation of `samples` onto exactly `len` points.
fn interpolate_to(samples: &[f32], len: usize) -> Vec<f32> {
    if samples.is_empty() {
        return vec![0.0; len];
    }
    if len == 0 {
        return Vec::new();
    }
    let ratio = samples.len() as f64 / len as f64;
    (0..len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = pos as usize;
            let frac = (pos - idx as f64) as f32;
            match (samples.get(idx), samples.get(idx + 1)) {
                (Some(&a), Some(&b)) => a + (b - a) * frac,
                (Some(&a), None) => a,
                _ => samples[samples.len() - 1],
            }
        })
        .collect()
}
