//! Human-readable walk narration.

use crate::graph::NodeKind;
use crate::walk::{TraversalEvent, WalkObserver};
use anyhow::{Context, Result};
use std::io::Write;

/// One line describing a step, e.g.
/// `"Wait for beat 7, For 2 beats, Hand on back into Dile Que No Start (3 beats)"`.
#[must_use]
pub fn describe(event: &TraversalEvent<'_>) -> String {
    let transition = event.transition;
    let mut line = String::new();

    if event.waiting > 0 {
        if let Some(start_beat) = transition.start_beat {
            line.push_str(&format!("Wait for beat {start_beat}, "));
        }
    }
    if transition.duration > 0 {
        line.push_str(&format!("For {} beats, ", transition.duration));
    }

    let cue = match (&transition.signal, event.destination_kind()) {
        (Some(signal), _) => format!("{signal} into"),
        (None, _) if transition.duration > 0 => "Naturally continue into".to_string(),
        (None, NodeKind::Move) => "Perform".to_string(),
        (None, NodeKind::Position) => "You are now in".to_string(),
    };
    line.push_str(&cue);
    line.push(' ');
    line.push_str(&event.to.name);

    match event.move_duration {
        Some(beats) if beats > 0 => line.push_str(&format!(" ({beats} beats)")),
        _ => {}
    }
    line
}

/// Walk observer that writes [`describe`] lines to any writer.
pub struct Narrator<W: Write> {
    out: W,
}

impl<W: Write> Narrator<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> WalkObserver for Narrator<W> {
    fn on_step(&mut self, event: &TraversalEvent<'_>) -> Result<()> {
        writeln!(self.out, "{}", describe(event)).context("Failed to write narration")
    }
}
