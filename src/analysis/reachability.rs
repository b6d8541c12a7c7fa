//! Reachable-marking exploration.
//!
//! Breadth-first uses the frontier as a FIFO queue, depth-first as a LIFO
//! stack. A marking is recorded when it is popped and found unvisited, so
//! the result lists every reachable marking exactly once in pop order.
//! Successors are generated in ascending transition-id order, which makes
//! the sequence a function of the net and the mode alone.
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use log::{debug, info};
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::net::{FiringEngine, Marking, PetriNet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchMode {
    #[serde(rename = "bfs", alias = "breadth-first")]
    BreadthFirst,
    #[serde(rename = "dfs", alias = "depth-first")]
    DepthFirst,
}

impl SearchMode {
    pub fn short_name(self) -> &'static str {
        match self {
            SearchMode::BreadthFirst => "BFS",
            SearchMode::DepthFirst => "DFS",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" | "breadth-first" => Ok(SearchMode::BreadthFirst),
            "dfs" | "depth-first" => Ok(SearchMode::DepthFirst),
            other => Err(format!("unknown search mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExploreConfig {
    pub mode: SearchMode,
    /// Most distinct markings to accept. `None` explores the whole space.
    pub state_limit: Option<usize>,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::BreadthFirst,
            state_limit: None,
        }
    }
}

impl ExploreConfig {
    pub fn new(mode: SearchMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_state_limit(mut self, limit: Option<usize>) -> Self {
        self.state_limit = limit;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExploreError {
    #[error("{mode} exploration exceeded the limit of {limit} markings")]
    StateLimitExceeded { mode: SearchMode, limit: usize },
}

/// Distinct reachable markings in discovery order.
#[derive(Debug, Clone)]
pub struct Reachability {
    mode: SearchMode,
    markings: IndexSet<Marking, FxBuildHasher>,
}

impl Reachability {
    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.markings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marking> {
        self.markings.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Marking> {
        self.markings.get_index(index)
    }

    /// Position of `marking` in discovery order.
    pub fn index_of(&self, marking: &Marking) -> Option<usize> {
        self.markings.get_index_of(marking)
    }

    pub fn contains(&self, marking: &Marking) -> bool {
        self.markings.contains(marking)
    }

    /// Same markings, ignoring order.
    pub fn same_set(&self, other: &Reachability) -> bool {
        self.len() == other.len() && self.iter().all(|marking| other.contains(marking))
    }

    /// Every marking as a sorted list of place ids.
    pub fn sorted_ids<'a>(&self, net: &'a PetriNet) -> Vec<Vec<&'a str>> {
        self.iter().map(|marking| net.marking_ids(marking)).collect()
    }
}

pub struct ReachabilityExplorer<'net> {
    engine: FiringEngine<'net>,
}

impl<'net> ReachabilityExplorer<'net> {
    pub fn new(net: &'net PetriNet) -> Self {
        Self {
            engine: FiringEngine::new(net),
        }
    }

    pub fn engine(&self) -> &FiringEngine<'net> {
        &self.engine
    }

    /// Explores the complete reachable space.
    pub fn explore(&self, mode: SearchMode) -> Reachability {
        let mut frontier = VecDeque::new();
        let mut visited = IndexSet::default();
        frontier.push_back(self.engine.net().initial_marking());
        // Without a limit the accept step never refuses a marking.
        while self.step(mode, None, &mut frontier, &mut visited).is_ok_and(|more| more) {}
        self.finish(mode, visited)
    }

    /// Explores with the bounds in `config`. Accepting more than
    /// `state_limit` distinct markings fails with
    /// [`ExploreError::StateLimitExceeded`].
    pub fn explore_with(&self, config: ExploreConfig) -> Result<Reachability, ExploreError> {
        let mut frontier = VecDeque::new();
        let mut visited = IndexSet::default();
        frontier.push_back(self.engine.net().initial_marking());
        while self.step(config.mode, config.state_limit, &mut frontier, &mut visited)? {}
        Ok(self.finish(config.mode, visited))
    }

    /// Pops one frontier entry. Returns `Ok(false)` once the frontier is
    /// exhausted.
    fn step(
        &self,
        mode: SearchMode,
        limit: Option<usize>,
        frontier: &mut VecDeque<Marking>,
        visited: &mut IndexSet<Marking, FxBuildHasher>,
    ) -> Result<bool, ExploreError> {
        let popped = match mode {
            SearchMode::BreadthFirst => frontier.pop_front(),
            SearchMode::DepthFirst => frontier.pop_back(),
        };
        let Some(marking) = popped else {
            return Ok(false);
        };
        if visited.contains(&marking) {
            return Ok(true);
        }
        if let Some(limit) = limit {
            if visited.len() >= limit {
                return Err(ExploreError::StateLimitExceeded { mode, limit });
            }
        }

        let (index, _) = visited.insert_full(marking);
        let current = &visited[index];
        for (_, next) in self.engine.successors(current) {
            if !visited.contains(&next) {
                frontier.push_back(next);
            }
        }

        if visited.len() % 10_000 == 0 {
            debug!(
                "{mode}: {} markings explored, frontier holds {}",
                visited.len(),
                frontier.len()
            );
        }
        Ok(true)
    }

    fn finish(&self, mode: SearchMode, markings: IndexSet<Marking, FxBuildHasher>) -> Reachability {
        info!(
            "{mode} exploration of {} finished: {} reachable markings",
            self.engine.net().id.as_deref().unwrap_or("<anonymous>"),
            markings.len()
        );
        Reachability { mode, markings }
    }
}
