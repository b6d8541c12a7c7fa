//! Labelled reachability graph over an explored marking set.
use std::fs;
use std::path::Path;

use petgraph::dot::{Config, Dot};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;
use rustc_hash::FxHashMap;

use crate::analysis::reachability::Reachability;
use crate::net::{FiringEngine, Marking, TransitionId};

/// `marking` keeps the full bitset; `places` is its display form.
#[derive(Debug, Clone)]
pub struct StateNode {
    pub index: usize,
    pub marking: Marking,
    pub places: Vec<String>,
    pub enabled: Vec<TransitionId>,
}

#[derive(Debug, Clone)]
pub struct StateEdge {
    pub transition: TransitionId,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateGraphStats {
    pub state_count: usize,
    pub edge_count: usize,
    pub deadlock_count: usize,
}

#[derive(Debug)]
pub struct StateGraph {
    pub graph: StableGraph<StateNode, StateEdge>,
    pub initial: NodeIndex,
    /// Nodes without an enabled transition, in discovery order.
    pub deadlocks: Vec<NodeIndex>,
    markings: FxHashMap<Marking, NodeIndex>,
}

impl StateGraph {
    /// Nodes follow the discovery order of `reachability`; every enabled
    /// firing of every node becomes an edge.
    pub fn build(engine: &FiringEngine<'_>, reachability: &Reachability) -> Self {
        let net = engine.net();
        let mut graph = StableGraph::with_capacity(reachability.len(), reachability.len());
        let mut markings = FxHashMap::default();

        for (index, marking) in reachability.iter().enumerate() {
            let node = graph.add_node(StateNode {
                index,
                marking: marking.clone(),
                places: net
                    .marking_ids(marking)
                    .into_iter()
                    .map(str::to_owned)
                    .collect(),
                enabled: engine.enabled_transitions(marking).collect(),
            });
            markings.insert(marking.clone(), node);
        }

        let mut deadlocks = Vec::new();
        let nodes = graph.node_indices().collect::<Vec<_>>();
        for source in nodes {
            let marking = graph[source].marking.clone();
            let enabled = graph[source].enabled.clone();
            if enabled.is_empty() {
                deadlocks.push(source);
                continue;
            }
            for transition in enabled {
                let next = engine.fire(&marking, transition);
                let Some(&target) = markings.get(&next) else {
                    continue;
                };
                let label = net.transitions[transition].id.clone();
                graph.add_edge(source, target, StateEdge { transition, label });
            }
        }

        let initial = NodeIndex::new(0);
        Self {
            graph,
            initial,
            deadlocks,
            markings,
        }
    }

    pub fn stats(&self) -> StateGraphStats {
        StateGraphStats {
            state_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            deadlock_count: self.deadlocks.len(),
        }
    }

    pub fn node(&self, index: NodeIndex) -> &StateNode {
        &self.graph[index]
    }

    pub fn node_of(&self, marking: &Marking) -> Option<NodeIndex> {
        self.markings.get(marking).copied()
    }

    pub fn dot(&self) -> String {
        fn escape(s: &str) -> String {
            s.replace('\\', "\\\\").replace('"', "\\\"")
        }

        let edge_attr = |_, edge: petgraph::stable_graph::EdgeReference<'_, StateEdge>| {
            format!("label=\"{}\"", escape(&edge.weight().label))
        };
        let node_attr = |_, (_idx, node): (NodeIndex, &StateNode)| {
            let shape = if node.enabled.is_empty() {
                ", color=red"
            } else {
                ""
            };
            format!(
                "label=\"s{}\\n{{{}}}\"{}",
                node.index,
                escape(&node.places.join(", ")),
                shape
            )
        };

        format!(
            "{:?}",
            Dot::with_attr_getters(
                &self.graph,
                &[Config::EdgeNoLabel, Config::NodeNoLabel],
                &edge_attr,
                &node_attr
            )
        )
    }

    pub fn write_dot<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.dot())
    }
}
