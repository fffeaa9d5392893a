//! # Dance Graph Module
//!
//! Directed multigraph of dance positions and moves. Nodes are identified by
//! their unique name; transitions carry the verbal signal that triggers them,
//! the beats they consume and an optional start position within the 8-count.
//!
//! Graphs are assembled through an explicit [`GraphBuilder`] value and then
//! frozen into a read-only [`GraphModel`]. The walk only ever sees the frozen
//! model.
//!
//! ## Example
//!
//! ```
//! use pasos::graph::GraphBuilder;
//!
//! let mut builder = GraphBuilder::new();
//! builder.add_position("Closed position")?;
//! builder.add_move("Dile Que No Start", 3)?;
//! builder.lead("Closed position", 1, "Step forward", 0, "Dile Que No Start")?;
//! builder.resolves_to("Dile Que No Start", "Closed position", 0)?;
//!
//! let graph = builder.build();
//! assert_eq!(graph.neighbors("Closed position").len(), 1);
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Number of beats in one musical cycle.
pub const BEATS_PER_CYCLE: u32 = 8;

/// What a node represents in the dance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A stable stance the couple can rest in
    Position,
    /// Footwork with a fixed beat length
    Move,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Position => write!(f, "position"),
            NodeKind::Move => write!(f, "move"),
        }
    }
}

/// A position or move in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    /// Beats the move occupies once entered. Always `None` for positions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl Node {
    /// Beats spent inside this node, zero for positions.
    #[must_use]
    pub fn move_duration(&self) -> Option<u32> {
        match self.kind {
            NodeKind::Move => self.duration,
            NodeKind::Position => None,
        }
    }
}

/// A directed, timed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub source: String,
    pub target: String,
    /// Cue given by the leader. `None` means an automatic continuation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,
    /// Beats consumed while performing the transition itself.
    #[serde(default)]
    pub duration: u32,
    /// Position (1-8) in the 8-count at which the transition may begin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_beat: Option<u32>,
}

/// Serializable form of a whole graph, used for `--graph` files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDefinition {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

impl GraphDefinition {
    /// Read a graph definition from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read graph file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse graph file {}", path.display()))
    }

    /// Write the definition as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize graph")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write graph file {}", path.display()))
    }
}

/// Mutable graph under construction.
///
/// Every construction call receives the builder explicitly; there is no
/// notion of a "current graph".
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    transitions: Vec<Transition>,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Names must be unique and positions carry no duration.
    pub fn add_node(&mut self, name: &str, kind: NodeKind, duration: Option<u32>) -> Result<()> {
        if name.trim().is_empty() {
            bail!("Node name cannot be empty");
        }
        if self.index.contains_key(name) {
            bail!("Node `{name}` is already defined");
        }
        if kind == NodeKind::Position && duration.is_some() {
            bail!("Position `{name}` cannot have a duration");
        }

        self.index.insert(name.to_string(), self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            kind,
            duration,
        });
        Ok(())
    }

    pub fn add_position(&mut self, name: &str) -> Result<()> {
        self.add_node(name, NodeKind::Position, None)
    }

    pub fn add_move(&mut self, name: &str, duration: u32) -> Result<()> {
        self.add_node(name, NodeKind::Move, Some(duration))
    }

    /// Add a transition. Parallel transitions between the same pair are allowed.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        signal: Option<&str>,
        duration: u32,
        start_beat: Option<u32>,
    ) -> Result<()> {
        for endpoint in [source, target] {
            if !self.index.contains_key(endpoint) {
                bail!("Transition {source} -> {target} references unknown node `{endpoint}`");
            }
        }
        if let Some(beat) = start_beat {
            if !(1..=BEATS_PER_CYCLE).contains(&beat) {
                bail!("Transition {source} -> {target} has start beat {beat}, expected 1-{BEATS_PER_CYCLE}");
            }
        }

        self.transitions.push(Transition {
            source: source.to_string(),
            target: target.to_string(),
            signal: signal.map(str::to_string),
            duration,
            start_beat,
        });
        Ok(())
    }

    /// A cued transition that has to wait for `start_beat`, typically out of a position.
    pub fn lead(
        &mut self,
        from: &str,
        start_beat: u32,
        signal: &str,
        duration: u32,
        to: &str,
    ) -> Result<()> {
        self.add_edge(from, to, Some(signal), duration, Some(start_beat))
    }

    /// A cued transition that starts as soon as the current move ends.
    pub fn signal(&mut self, from: &str, signal: &str, duration: u32, to: &str) -> Result<()> {
        self.add_edge(from, to, Some(signal), duration, None)
    }

    /// An uncued continuation.
    pub fn resolves_to(&mut self, from: &str, to: &str, duration: u32) -> Result<()> {
        self.add_edge(from, to, None, duration, None)
    }

    /// Freeze the builder into a read-only model.
    #[must_use]
    pub fn build(self) -> GraphModel {
        let mut outgoing: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, transition) in self.transitions.iter().enumerate() {
            outgoing.entry(transition.source.clone()).or_default().push(idx);
        }

        GraphModel {
            nodes: self.nodes,
            index: self.index,
            transitions: self.transitions,
            outgoing,
        }
    }
}

/// Read-only dance graph handed to the walk.
#[derive(Debug, Clone)]
pub struct GraphModel {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    transitions: Vec<Transition>,
    outgoing: HashMap<String, Vec<usize>>,
}

/// A reachable neighbor together with every transition leading to it.
#[derive(Debug, Clone)]
pub struct Neighbor<'g> {
    pub node: &'g Node,
    pub transitions: Vec<&'g Transition>,
}

impl GraphModel {
    /// Validate and build a model from a serialized definition.
    pub fn from_definition(definition: &GraphDefinition) -> Result<Self> {
        let mut builder = GraphBuilder::new();
        for node in &definition.nodes {
            builder
                .add_node(&node.name, node.kind, node.duration)
                .context("Invalid node in graph definition")?;
        }
        for t in &definition.transitions {
            builder
                .add_edge(&t.source, &t.target, t.signal.as_deref(), t.duration, t.start_beat)
                .context("Invalid transition in graph definition")?;
        }
        Ok(builder.build())
    }

    /// Serializable copy of this graph.
    #[must_use]
    pub fn to_definition(&self) -> GraphDefinition {
        GraphDefinition {
            nodes: self.nodes.clone(),
            transitions: self.transitions.clone(),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    #[must_use]
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&idx| &self.nodes[idx])
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Outgoing transitions of `name` in insertion order.
    pub fn outgoing(&self, name: &str) -> impl Iterator<Item = &Transition> {
        self.outgoing
            .get(name)
            .into_iter()
            .flatten()
            .map(|&idx| &self.transitions[idx])
    }

    /// Distinct targets reachable from `name`, ordered by their first transition.
    #[must_use]
    pub fn neighbors(&self, name: &str) -> Vec<Neighbor<'_>> {
        let mut neighbors: Vec<Neighbor<'_>> = Vec::new();
        for transition in self.outgoing(name) {
            match neighbors.iter_mut().find(|n| n.node.name == transition.target) {
                Some(existing) => existing.transitions.push(transition),
                None => {
                    if let Some(node) = self.node(&transition.target) {
                        neighbors.push(Neighbor {
                            node,
                            transitions: vec![transition],
                        });
                    }
                }
            }
        }
        neighbors
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_graph() -> GraphModel {
        let mut b = GraphBuilder::new();
        b.add_position("Guapea position").unwrap();
        b.add_move("Enchufala", 4).unwrap();
        b.add_move("Doble", 8).unwrap();
        b.lead("Guapea position", 1, "Tension", 0, "Enchufala").unwrap();
        b.signal("Enchufala", "Touch shoulder", 0, "Doble").unwrap();
        b.resolves_to("Doble", "Enchufala", 0).unwrap();
        b.signal("Enchufala", "Complete", 4, "Guapea position").unwrap();
        b.signal("Enchufala", "Hook turn", 4, "Guapea position").unwrap();
        b.build()
    }

    #[test]
    fn test_neighbors_group_parallel_transitions() {
        let graph = small_graph();
        let neighbors = graph.neighbors("Enchufala");

        assert_eq!(neighbors.len(), 2);
        assert_eq!(neighbors[0].node.name, "Doble");
        assert_eq!(neighbors[1].node.name, "Guapea position");
        assert_eq!(neighbors[1].transitions.len(), 2);
        assert_eq!(neighbors[1].transitions[0].signal.as_deref(), Some("Complete"));
    }

    #[test]
    fn test_dead_end_has_no_neighbors() {
        let mut b = GraphBuilder::new();
        b.add_position("Alone").unwrap();
        let graph = b.build();

        assert!(graph.neighbors("Alone").is_empty());
        assert!(graph.neighbors("Missing").is_empty());
    }

    #[test]
    fn test_builder_rejects_invalid_input() {
        let mut b = GraphBuilder::new();
        b.add_position("Closed position").unwrap();

        assert!(b.add_position("Closed position").is_err(), "duplicate names");
        assert!(b.add_node("Bad", NodeKind::Position, Some(4)).is_err(), "position with duration");
        assert!(b.resolves_to("Closed position", "Nowhere", 0).is_err(), "unknown target");

        b.add_move("Exhibala", 8).unwrap();
        assert!(b.lead("Closed position", 0, "Turn", 2, "Exhibala").is_err());
        assert!(b.lead("Closed position", 9, "Turn", 2, "Exhibala").is_err());
        assert!(b.lead("Closed position", 8, "Turn", 2, "Exhibala").is_ok());
    }

    #[test]
    fn test_move_duration_only_for_moves() {
        let graph = small_graph();
        assert_eq!(graph.node("Doble").unwrap().move_duration(), Some(8));
        assert_eq!(graph.node("Guapea position").unwrap().move_duration(), None);
    }

    #[test]
    fn test_definition_round_trip_through_file() {
        let graph = small_graph();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        graph.to_definition().save(&path).unwrap();
        let loaded = GraphModel::from_definition(&GraphDefinition::load(&path).unwrap()).unwrap();

        assert_eq!(loaded.node_count(), graph.node_count());
        assert_eq!(loaded.transition_count(), graph.transition_count());
        assert_eq!(loaded.neighbors("Enchufala").len(), 2);
    }

    #[test]
    fn test_definition_with_unknown_node_fails() {
        let definition: GraphDefinition = serde_json::from_str(
            r#"{
                "nodes": [{"name": "Closed position", "kind": "position"}],
                "transitions": [{"source": "Closed position", "target": "Vuelta", "duration": 0}]
            }"#,
        )
        .unwrap();

        assert!(GraphModel::from_definition(&definition).is_err());
    }
}
