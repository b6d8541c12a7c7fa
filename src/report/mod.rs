//! Serializable results handed to the presentation layer.
use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analysis::reachability::{Reachability, SearchMode};
use crate::net::io::{self, IoError};
use crate::net::{PetriNet, Weight};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetSummary {
    pub id: Option<String>,
    pub places: usize,
    pub transitions: usize,
    pub arcs: usize,
}

impl fmt::Display for NetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PetriNet Summary : places={}, transitions={}, arcs={}",
            self.places, self.transitions, self.arcs
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceDetail {
    pub id: String,
    pub name: Option<String>,
    pub initial_marking: Weight,
    pub incoming: usize,
    pub outgoing: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDetail {
    pub id: String,
    pub name: Option<String>,
    pub incoming: usize,
    pub outgoing: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcDetail {
    pub id: String,
    pub source: String,
    pub target: String,
    pub weight: Weight,
}

/// Element-by-element listing of a net, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetDetails {
    pub places: Vec<PlaceDetail>,
    pub transitions: Vec<TransitionDetail>,
    pub arcs: Vec<ArcDetail>,
}

impl NetDetails {
    pub fn of(net: &PetriNet) -> Self {
        Self {
            places: net
                .places
                .iter()
                .map(|place| PlaceDetail {
                    id: place.id.clone(),
                    name: place.name.clone(),
                    initial_marking: place.initial_marking,
                    incoming: place.arcs.incoming.len(),
                    outgoing: place.arcs.outgoing.len(),
                })
                .collect(),
            transitions: net
                .transitions
                .iter()
                .map(|transition| TransitionDetail {
                    id: transition.id.clone(),
                    name: transition.name.clone(),
                    incoming: transition.arcs.incoming.len(),
                    outgoing: transition.arcs.outgoing.len(),
                })
                .collect(),
            arcs: net
                .arcs
                .iter()
                .map(|arc| ArcDetail {
                    id: arc.id.clone(),
                    source: arc.source.clone(),
                    target: arc.target.clone(),
                    weight: arc.weight,
                })
                .collect(),
        }
    }
}

impl fmt::Display for NetDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Places:")?;
        for place in &self.places {
            writeln!(
                f,
                " - {} name={:?} init={} in={} out={}",
                place.id, place.name, place.initial_marking, place.incoming, place.outgoing
            )?;
        }
        writeln!(f, "Transitions:")?;
        for transition in &self.transitions {
            writeln!(
                f,
                " - {} name={:?} in={} out={}",
                transition.id, transition.name, transition.incoming, transition.outgoing
            )?;
        }
        writeln!(f, "Arcs:")?;
        for arc in &self.arcs {
            writeln!(
                f,
                " - {}: {} -> {} weight={}",
                arc.id, arc.source, arc.target, arc.weight
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachabilityReport {
    pub mode: SearchMode,
    pub count: usize,
    pub markings: Vec<Vec<String>>,
}

impl ReachabilityReport {
    pub fn new(net: &PetriNet, reachability: &Reachability) -> Self {
        let markings = reachability
            .sorted_ids(net)
            .into_iter()
            .map(|ids| ids.into_iter().map(str::to_owned).collect())
            .collect();
        Self {
            mode: reachability.mode(),
            count: reachability.len(),
            markings,
        }
    }
}

impl fmt::Display for ReachabilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reachable markings {} ({}):", self.mode, self.count)?;
        for marking in &self.markings {
            writeln!(f, "[{}]", marking.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlockState {
    pub state_id: String,
    pub marking: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSpaceInfo {
    pub reachable_states: usize,
    pub places: usize,
    pub transitions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlockReport {
    pub mode: SearchMode,
    pub has_deadlock: bool,
    pub deadlock_count: usize,
    pub deadlock_states: Vec<DeadlockState>,
    /// Transitions not enabled in any reachable marking, in id order.
    pub dead_transitions: Vec<String>,
    pub state_space_info: StateSpaceInfo,
    pub analysis_time: Duration,
}

impl DeadlockReport {
    pub fn new(mode: SearchMode) -> Self {
        Self {
            mode,
            has_deadlock: false,
            deadlock_count: 0,
            deadlock_states: Vec::new(),
            dead_transitions: Vec::new(),
            state_space_info: StateSpaceInfo::default(),
            analysis_time: Duration::default(),
        }
    }
}

impl fmt::Display for DeadlockReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Deadlock analysis ({}, {} reachable markings, {:?})",
            self.mode, self.state_space_info.reachable_states, self.analysis_time
        )?;
        if self.has_deadlock {
            writeln!(f, "{} dead marking(s):", self.deadlock_count)?;
            for state in &self.deadlock_states {
                writeln!(f, "  {}: [{}]", state.state_id, state.marking.join(", "))?;
            }
        } else {
            writeln!(f, "no dead marking")?;
        }
        if !self.dead_transitions.is_empty() {
            writeln!(
                f,
                "never enabled: {}",
                self.dead_transitions.join(", ")
            )?;
        }
        Ok(())
    }
}

/// Everything one run produces, as written to the JSON output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: NetSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<NetDetails>,
    pub reachability: Vec<ReachabilityReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadlocks: Option<DeadlockReport>,
}

impl AnalysisReport {
    pub fn new(net: &PetriNet) -> Self {
        Self {
            summary: net.summary(),
            details: None,
            reachability: Vec::new(),
            deadlocks: None,
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), IoError> {
        io::write_json(path, self)
    }
}
