//! # Weighted Graph Walk
//!
//! Traverses a [`GraphModel`] from a start node for a bounded number of steps,
//! keeping track of the absolute beat at which every step starts. Each step:
//!
//! 1. collects the distinct neighbors of the current node (dead end stops the walk)
//! 2. lets a [`Chooser`] pick one of them
//! 3. honours the first transition to that neighbor
//! 4. waits for the transition's start beat within the 8-count, if it has one
//! 5. reports a [`TraversalEvent`] to every observer, in registration order
//! 6. advances the beat by `waiting + transition duration + move duration`
//!
//! ## Example
//!
//! ```
//! use pasos::{catalogue, sampler::FirstChoice, walk};
//!
//! let graph = catalogue::salsa_graph()?;
//! let summary = walk::walk(&graph, catalogue::SUELTA, 6, &mut FirstChoice, &mut [])?;
//! assert_eq!(summary.steps, 6);
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::graph::{GraphModel, Node, NodeKind, Transition, BEATS_PER_CYCLE};
use crate::sampler::Chooser;
use anyhow::{bail, Context, Result};
use log::{debug, info, warn};

/// Immutable record of one step, handed to observers.
#[derive(Debug, Clone, Copy)]
pub struct TraversalEvent<'g> {
    pub from: &'g Node,
    pub to: &'g Node,
    /// The honoured transition (first one authored for this pair).
    pub transition: &'g Transition,
    /// Beats idled before the transition could begin.
    pub waiting: u32,
    /// Beats the destination move takes, `None` for positions.
    pub move_duration: Option<u32>,
    /// True when the origin had exactly one reachable neighbor.
    pub is_only_option: bool,
    /// Absolute beat at which this step started.
    pub beat: u32,
}

impl TraversalEvent<'_> {
    #[must_use]
    pub fn destination_kind(&self) -> NodeKind {
        self.to.kind
    }

    /// Beat at which the transition itself begins, after waiting.
    #[must_use]
    pub fn signal_beat(&self) -> u32 {
        self.beat + self.waiting
    }

    /// Beats this step advances the walk by, `None` if that overflows.
    ///
    /// [`walk`] rejects a step whose end beat does not fit before reporting
    /// it, so [`signal_beat`](Self::signal_beat) never overflows for an
    /// observed event.
    #[must_use]
    pub fn advance(&self) -> Option<u32> {
        self.waiting
            .checked_add(self.transition.duration)?
            .checked_add(self.move_duration.unwrap_or(0))
    }
}

/// Receives every step of a walk.
///
/// Observers see a read-only event and cannot influence the walk itself.
pub trait WalkObserver {
    /// # Errors
    ///
    /// An observer error aborts the walk and is returned to the caller.
    fn on_step(&mut self, event: &TraversalEvent<'_>) -> Result<()>;
}

/// Why a walk stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEnd {
    /// `max_steps` steps were taken.
    StepLimit,
    /// The named node has no outgoing transitions.
    DeadEnd(String),
    /// The start node is not part of the graph; nothing was walked.
    MissingStart(String),
}

/// Outcome of a completed walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkSummary {
    pub steps: usize,
    pub final_node: Option<String>,
    pub final_beat: u32,
    pub end: WalkEnd,
}

/// Beats to idle so a transition starts on `start_beat` (1-8) of the next cycle.
///
/// Always in `0..8`.
#[must_use]
pub fn waiting_beats(start_beat: u32, current_beat: u32) -> u32 {
    let target = i64::from(start_beat) - 1;
    (target - i64::from(current_beat)).rem_euclid(i64::from(BEATS_PER_CYCLE)) as u32
}

/// Walk `graph` from `start` for at most `max_steps` steps.
///
/// A missing start node or a dead end are normal terminations reported in the
/// returned [`WalkSummary`]. Chooser and observer failures propagate.
pub fn walk<C: Chooser<String> + ?Sized>(
    graph: &GraphModel,
    start: &str,
    max_steps: usize,
    chooser: &mut C,
    observers: &mut [&mut dyn WalkObserver],
) -> Result<WalkSummary> {
    let Some(mut current) = graph.node(start) else {
        warn!("Start node `{start}` is not in the graph");
        return Ok(WalkSummary {
            steps: 0,
            final_node: None,
            final_beat: 0,
            end: WalkEnd::MissingStart(start.to_string()),
        });
    };

    let mut current_beat: u32 = 0;
    let mut steps = 0;
    let mut end = WalkEnd::StepLimit;

    while steps < max_steps {
        let neighbors = graph.neighbors(&current.name);
        if neighbors.is_empty() {
            info!("No more neighbors to walk to from `{}`, stopping walk", current.name);
            end = WalkEnd::DeadEnd(current.name.clone());
            break;
        }

        let candidates: Vec<String> = neighbors.iter().map(|n| n.node.name.clone()).collect();
        let chosen = chooser
            .choose(&candidates)
            .with_context(|| format!("Failed to choose a successor of `{}`", current.name))?;
        let neighbor = neighbors
            .iter()
            .find(|n| n.node.name == chosen)
            .with_context(|| format!("Chooser returned `{chosen}`, which is not a neighbor of `{}`", current.name))?;

        // Parallel transitions are an authoring convenience; only the first is honoured.
        let transition = neighbor.transitions[0];
        let waiting = transition
            .start_beat
            .map_or(0, |start_beat| waiting_beats(start_beat, current_beat));

        let event = TraversalEvent {
            from: current,
            to: neighbor.node,
            transition,
            waiting,
            move_duration: neighbor.node.move_duration(),
            is_only_option: neighbors.len() == 1,
            beat: current_beat,
        };
        let Some(next_beat) = event.advance().and_then(|beats| current_beat.checked_add(beats)) else {
            bail!(
                "Beat counter overflows on step {} from `{}` to `{}` at beat {current_beat}",
                steps + 1,
                current.name,
                neighbor.node.name
            );
        };
        debug!(
            "Step {}: {} -> {} at beat {} (waiting {}, only option: {})",
            steps + 1,
            event.from.name,
            event.to.name,
            event.beat,
            event.waiting,
            event.is_only_option
        );

        for observer in observers.iter_mut() {
            observer.on_step(&event)?;
        }

        current_beat = next_beat;
        current = neighbor.node;
        steps += 1;
    }

    Ok(WalkSummary {
        steps,
        final_node: Some(current.name.clone()),
        final_beat: current_beat,
        end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue;
    use crate::graph::GraphBuilder;
    use crate::sampler::{FirstChoice, WeightedSampler};

    /// Records events as owned tuples for assertions.
    #[derive(Default)]
    struct Recorder {
        steps: Vec<(String, String, u32, u32, bool)>,
    }

    impl WalkObserver for Recorder {
        fn on_step(&mut self, event: &TraversalEvent<'_>) -> Result<()> {
            self.steps.push((
                event.from.name.clone(),
                event.to.name.clone(),
                event.beat,
                event.waiting,
                event.is_only_option,
            ));
            Ok(())
        }
    }

    #[test]
    fn test_waiting_is_within_cycle() {
        for start_beat in 1..=8 {
            for current in 0..64 {
                let waiting = waiting_beats(start_beat, current);
                assert!(waiting < 8);
                assert_eq!((current + waiting) % 8, start_beat - 1);
            }
        }
        assert_eq!(waiting_beats(7, 0), 6);
        assert_eq!(waiting_beats(1, 16), 0);
        assert_eq!(waiting_beats(1, 11), 5);
    }

    #[test]
    fn test_missing_start_produces_no_events() {
        let graph = catalogue::salsa_graph().unwrap();
        let mut recorder = Recorder::default();
        let summary = walk(&graph, "Nowhere", 10, &mut FirstChoice, &mut [&mut recorder]).unwrap();

        assert_eq!(summary.steps, 0);
        assert_eq!(summary.end, WalkEnd::MissingStart("Nowhere".to_string()));
        assert!(recorder.steps.is_empty());
    }

    #[test]
    fn test_dead_end_stops_walk() {
        let mut b = GraphBuilder::new();
        b.add_position("Start").unwrap();
        b.add_move("Finale", 4).unwrap();
        b.lead("Start", 3, "Go", 1, "Finale").unwrap();
        let graph = b.build();

        let mut recorder = Recorder::default();
        let summary = walk(&graph, "Start", 10, &mut FirstChoice, &mut [&mut recorder]).unwrap();

        assert_eq!(summary.steps, 1);
        assert_eq!(summary.end, WalkEnd::DeadEnd("Finale".to_string()));
        // 2 beats waiting for beat 3, 1 beat of transition, 4 beats of move
        assert_eq!(summary.final_beat, 7);
        assert_eq!(recorder.steps, vec![("Start".into(), "Finale".into(), 0, 2, true)]);
    }

    #[test]
    fn test_first_steps_from_suelta() {
        let graph = catalogue::salsa_graph().unwrap();
        let mut recorder = Recorder::default();
        let summary = walk(&graph, catalogue::SUELTA, 6, &mut FirstChoice, &mut [&mut recorder]).unwrap();

        assert_eq!(summary.end, WalkEnd::StepLimit);
        assert_eq!(summary.final_beat, 24);
        let beats: Vec<u32> = recorder.steps.iter().map(|s| s.2).collect();
        assert_eq!(beats, vec![0, 11, 16, 16, 19, 24]);
        let only: Vec<bool> = recorder.steps.iter().map(|s| s.4).collect();
        assert_eq!(only, vec![false, false, true, false, false, true]);
        assert_eq!(recorder.steps[0].3, 6, "waits for beat 7");
    }

    #[test]
    fn test_beats_never_decrease_on_random_walk() {
        let graph = catalogue::salsa_graph().unwrap();
        let mut sampler =
            WeightedSampler::seeded(graph.nodes().map(|n| n.name.clone()), 0.2, 0.05, 99).unwrap();
        let mut recorder = Recorder::default();
        let summary = walk(&graph, catalogue::GUAPEA, 200, &mut sampler, &mut [&mut recorder]).unwrap();

        assert_eq!(summary.steps, 200);
        assert_eq!(recorder.steps.len(), 200);
        assert!(recorder.steps.windows(2).all(|w| w[0].2 <= w[1].2));
        assert!(recorder.steps.windows(2).all(|w| w[0].1 == w[1].0), "steps are connected");
    }

    #[test]
    fn test_beat_overflow_is_an_error() {
        let mut b = GraphBuilder::new();
        b.add_move("Long", 3_000_000_000).unwrap();
        b.resolves_to("Long", "Long", 0).unwrap();
        let graph = b.build();

        let mut recorder = Recorder::default();
        let err = walk(&graph, "Long", 3, &mut FirstChoice, &mut [&mut recorder]).unwrap_err();

        assert!(err.to_string().contains("overflows"), "{err}");
        // the first step fits, the second would wrap and is never reported
        assert_eq!(recorder.steps.len(), 1);
        assert_eq!(recorder.steps[0].2, 0);
    }

    #[test]
    fn test_chooser_errors_propagate() {
        let graph = catalogue::salsa_graph().unwrap();
        // Universe lacks the graph's nodes, so the first draw is rejected.
        let mut sampler = WeightedSampler::seeded(vec!["unrelated".to_string()], 0.5, 0.1, 1).unwrap();
        assert!(walk(&graph, catalogue::GUAPEA, 5, &mut sampler, &mut []).is_err());
    }

    #[test]
    fn test_observers_called_in_registration_order() {
        struct Tagger<'a> {
            tag: char,
            log: &'a std::cell::RefCell<String>,
        }
        impl WalkObserver for Tagger<'_> {
            fn on_step(&mut self, _event: &TraversalEvent<'_>) -> Result<()> {
                self.log.borrow_mut().push(self.tag);
                Ok(())
            }
        }

        let graph = catalogue::salsa_graph().unwrap();
        let log = std::cell::RefCell::new(String::new());
        let mut a = Tagger { tag: 'a', log: &log };
        let mut b = Tagger { tag: 'b', log: &log };
        walk(&graph, catalogue::CLOSED, 3, &mut FirstChoice, &mut [&mut a, &mut b]).unwrap();

        assert_eq!(log.into_inner(), "ababab");
    }
}
