pub mod deadlock;
pub mod reachability;
pub mod state_graph;

pub use deadlock::DeadlockDetector;
pub use reachability::{
    ExploreConfig, ExploreError, Reachability, ReachabilityExplorer, SearchMode,
};
pub use state_graph::{StateGraph, StateGraphStats};
