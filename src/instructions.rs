//! Spoken instruction timing.
//!
//! [`InstructionCollector`] turns walk steps into `(text, beat)` cues that
//! start a fixed lead-in before the transition they announce.
//! [`merge_instructions`] then folds cues landing on the same beat into one
//! phrase so the timeline has at most one clip per beat.

use crate::walk::{TraversalEvent, WalkObserver};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Beats of warning between the start of a cue and the transition it announces.
pub const DEFAULT_LEAD_IN_BEATS: u32 = 4;

/// Word joining cues that share a beat.
pub const DEFAULT_CONNECTIVE: &str = "i";

/// A phrase and the absolute beat it should start sounding on.
///
/// Beats can be zero or negative for cues announcing the very first
/// transitions of a walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionEvent {
    pub text: String,
    pub beat: i64,
}

impl InstructionEvent {
    #[must_use]
    pub fn new(text: impl Into<String>, beat: i64) -> Self {
        Self {
            text: text.into(),
            beat,
        }
    }
}

impl fmt::Display for InstructionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5}  {}", self.beat, self.text)
    }
}

/// Walk observer that records a cue for every step the dancer has to be told about.
///
/// Forced continuations (`is_only_option`) are not announced.
#[derive(Debug, Clone)]
pub struct InstructionCollector {
    lead_in: u32,
    events: Vec<InstructionEvent>,
}

impl Default for InstructionCollector {
    fn default() -> Self {
        Self::new(DEFAULT_LEAD_IN_BEATS)
    }
}

impl InstructionCollector {
    #[must_use]
    pub fn new(lead_in: u32) -> Self {
        Self {
            lead_in,
            events: Vec::new(),
        }
    }

    /// Cues in traversal order.
    #[must_use]
    pub fn events(&self) -> &[InstructionEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<InstructionEvent> {
        self.events
    }
}

impl WalkObserver for InstructionCollector {
    fn on_step(&mut self, event: &TraversalEvent<'_>) -> Result<()> {
        if event.is_only_option {
            return Ok(());
        }
        let beat = i64::from(event.signal_beat()) - i64::from(self.lead_in);
        self.events.push(InstructionEvent::new(event.to.name.clone(), beat));
        Ok(())
    }
}

/// Merge consecutive cues sharing a beat into `"first <connective> second"`.
///
/// # Errors
///
/// The input must already be ordered by ascending beat; anything else is
/// rejected instead of being silently regrouped.
pub fn merge_instructions(
    events: &[InstructionEvent],
    connective: &str,
) -> Result<Vec<InstructionEvent>> {
    if let Some(pair) = events.windows(2).find(|pair| pair[1].beat < pair[0].beat) {
        bail!(
            "Instructions must be ordered by beat: `{}` at beat {} follows `{}` at beat {}",
            pair[1].text,
            pair[1].beat,
            pair[0].text,
            pair[0].beat
        );
    }

    let separator = format!(" {connective} ");
    let mut merged: Vec<InstructionEvent> = Vec::with_capacity(events.len());
    for event in events {
        match merged.last_mut() {
            Some(last) if last.beat == event.beat => {
                last.text.push_str(&separator);
                last.text.push_str(&event.text);
            }
            _ => merged.push(event.clone()),
        }
    }
    Ok(merged)
}
