//! The validated net model: places, transitions and arcs with bidirectional
//! incidence, addressed through a single node namespace.
use std::fmt::{self, Write as FmtWrite};
use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::net::ids::{ArcId, NodeId, PlaceId, TransitionId};
use crate::net::incidence::Incidence;
use crate::net::index_vec::IndexVec;
use crate::net::structure::{Arc, Marking, Place, Transition};
use crate::report::NetSummary;

#[derive(Clone)]
pub struct PetriNet {
    pub id: Option<String>,
    pub places: IndexVec<PlaceId, Place>,
    pub transitions: IndexVec<TransitionId, Transition>,
    pub arcs: IndexVec<ArcId, Arc>,
    nodes: IndexMap<String, NodeId>,
}

impl fmt::Debug for PetriNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PetriNet")
            .field("id", &self.id)
            .field("places", &self.places)
            .field("transitions", &self.transitions)
            .field("arcs", &self.arcs)
            .finish()
    }
}

impl PetriNet {
    pub(crate) fn empty(id: Option<String>) -> Self {
        Self {
            id,
            places: IndexVec::new(),
            transitions: IndexVec::new(),
            arcs: IndexVec::new(),
            nodes: IndexMap::new(),
        }
    }

    /// Callers check the id against [`node`](Self::node) first.
    pub(crate) fn add_place(&mut self, place: Place) -> PlaceId {
        let place_id = self.places.next_id();
        self.nodes.insert(place.id.clone(), NodeId::Place(place_id));
        self.places.push(place)
    }

    pub(crate) fn add_transition(&mut self, transition: Transition) -> TransitionId {
        let transition_id = self.transitions.next_id();
        self.nodes
            .insert(transition.id.clone(), NodeId::Transition(transition_id));
        self.transitions.push(transition)
    }

    /// Registers `arc` in its source's outgoing list and its target's
    /// incoming list.
    pub(crate) fn add_arc(&mut self, arc: Arc) -> ArcId {
        let arc_id = self.arcs.next_id();
        self.incidence_mut(arc.from).push_outgoing(arc_id);
        self.incidence_mut(arc.to).push_incoming(arc_id);
        self.arcs.push(arc)
    }

    fn incidence_mut(&mut self, node: NodeId) -> &mut Incidence {
        match node {
            NodeId::Place(place) => &mut self.places[place].arcs,
            NodeId::Transition(transition) => &mut self.transitions[transition].arcs,
        }
    }

    pub fn incidence(&self, node: NodeId) -> &Incidence {
        match node {
            NodeId::Place(place) => &self.places[place].arcs,
            NodeId::Transition(transition) => &self.transitions[transition].arcs,
        }
    }

    pub fn node(&self, id: &str) -> Option<NodeId> {
        self.nodes.get(id).copied()
    }

    pub fn place_id(&self, id: &str) -> Option<PlaceId> {
        self.node(id).and_then(NodeId::as_place)
    }

    pub fn transition_id(&self, id: &str) -> Option<TransitionId> {
        self.node(id).and_then(NodeId::as_transition)
    }

    pub fn arc_id(&self, id: &str) -> Option<ArcId> {
        self.arcs
            .iter_enumerated()
            .find_map(|(arc_id, arc)| (arc.id == id).then_some(arc_id))
    }

    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    pub fn arcs_len(&self) -> usize {
        self.arcs.len()
    }

    pub fn summary(&self) -> NetSummary {
        NetSummary {
            id: self.id.clone(),
            places: self.places_len(),
            transitions: self.transitions_len(),
            arcs: self.arcs_len(),
        }
    }

    /// M0: every place whose initial marking is positive.
    pub fn initial_marking(&self) -> Marking {
        Marking::from_places(
            self.places_len(),
            self.places
                .iter_enumerated()
                .filter(|(_, place)| place.initial_marking > 0)
                .map(|(place_id, _)| place_id),
        )
    }

    /// Transitions in ascending lexicographic order of their ids.
    pub fn transitions_by_id(&self) -> Vec<TransitionId> {
        let mut order = self.transitions.ids().collect::<Vec<_>>();
        order.sort_by(|a, b| self.transitions[*a].id.cmp(&self.transitions[*b].id));
        order
    }

    /// Place ids of `marking`, sorted, for stable display.
    pub fn marking_ids<'a>(&'a self, marking: &Marking) -> Vec<&'a str> {
        let mut ids = marking
            .iter()
            .map(|place| self.places[place].id.as_str())
            .collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        let _ = writeln!(&mut dot, "digraph PetriNet {{");
        let _ = writeln!(&mut dot, "    rankdir=LR;");
        let _ = writeln!(&mut dot, "    node [fontname=\"Helvetica\"];");

        for (place_id, place) in self.places.iter_enumerated() {
            let label = match &place.name {
                Some(name) => format!("{}\\n{}", escape_label(&place.id), escape_label(name)),
                None => escape_label(&place.id),
            };
            let fill = if place.initial_marking > 0 {
                "#90caf9"
            } else {
                "#e3f2fd"
            };
            let _ = writeln!(
                &mut dot,
                "    place_{} [label=\"{}\\n{}\", shape=circle, style=filled, fillcolor=\"{}\"];",
                place_id.raw(),
                label,
                place.initial_marking,
                fill
            );
        }

        for (transition_id, transition) in self.transitions.iter_enumerated() {
            let label = match &transition.name {
                Some(name) => format!(
                    "{}\\n{}",
                    escape_label(&transition.id),
                    escape_label(name)
                ),
                None => escape_label(&transition.id),
            };
            let _ = writeln!(
                &mut dot,
                "    trans_{} [label=\"{}\", shape=box, style=filled, fillcolor=\"#ffe0b2\"];",
                transition_id.raw(),
                label
            );
        }

        for arc in self.arcs.iter() {
            let from = dot_node(arc.from);
            let to = dot_node(arc.to);
            if arc.weight == 1 {
                let _ = writeln!(&mut dot, "    {} -> {};", from, to);
            } else {
                let _ = writeln!(
                    &mut dot,
                    "    {} -> {} [label=\"{}\"];",
                    from, to, arc.weight
                );
            }
        }

        let _ = writeln!(&mut dot, "}}");
        dot
    }

    pub fn write_dot<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_dot())
    }
}

fn dot_node(node: NodeId) -> String {
    match node {
        NodeId::Place(place) => format!("place_{}", place.raw()),
        NodeId::Transition(transition) => format!("trans_{}", transition.raw()),
    }
}

pub(crate) fn escape_label(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
