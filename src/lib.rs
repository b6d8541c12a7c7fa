//! Reachable-marking exploration for 1-safe Place/Transition nets.
//!
//! A net document is turned into a validated [`net::PetriNet`] by
//! [`net::NetBuilder`], then [`analysis::reachability::ReachabilityExplorer`]
//! enumerates its reachable markings breadth-first or depth-first.

pub mod analysis;
pub mod config;
pub mod net;
pub mod options;
pub mod report;
