//! # Place/Transition nets under 1-safe semantics
//!
//! Places `P`, transitions `T` and arcs `F ⊆ (P × T) ∪ (T × P)`. A marking is
//! the set `M ⊆ P` of places holding a token. For a transition `t`:
//!
//! * `•t = { p | (p, t) ∈ F }` and `t• = { p | (t, p) ∈ F }`;
//! * `t` is **enabled** in `M` iff `•t ⊆ M`;
//! * **firing** `t` yields `M' = (M \ •t) ∪ t•`.
//!
//! The net is built once from a parsed document by [`NetBuilder`], which
//! enforces the structural invariants, and is immutable afterwards.
//!
//! ## Example
//!
//! ```rust
//! use pnreach::net::*;
//!
//! let doc = Element::new("net")
//!     .with_child(Element::new("place").with_attr("id", "p0")
//!         .with_child(Element::new("initialMarking").with_text("1")))
//!     .with_child(Element::new("place").with_attr("id", "p1"))
//!     .with_child(Element::new("transition").with_attr("id", "t0"))
//!     .with_child(Element::new("arc").with_attr("id", "a0")
//!         .with_attr("source", "p0").with_attr("target", "t0"))
//!     .with_child(Element::new("arc").with_attr("id", "a1")
//!         .with_attr("source", "t0").with_attr("target", "p1"));
//!
//! let net = NetBuilder::default().build(&doc).unwrap();
//! let engine = FiringEngine::new(&net);
//! let marking = net.initial_marking();
//! let t0 = net.transition_id("t0").unwrap();
//! assert_eq!(engine.enabled_transitions(&marking).collect::<Vec<_>>(), vec![t0]);
//! let next = engine.fire(&marking, t0);
//! assert_eq!(net.marking_ids(&next), vec!["p1"]);
//! ```

pub mod builder;
pub mod core;
pub mod document;
pub mod firing;
pub mod ids;
pub mod incidence;
pub mod index_vec;
pub mod io;
pub mod structure;

pub use builder::{ArcEnd, BuildError, BuildOptions, NetBuilder};
pub use self::core::PetriNet;
pub use document::{DocumentNode, Element};
pub use firing::{FireError, FiringEngine};
pub use ids::{ArcId, NodeId, PlaceId, TransitionId};
pub use incidence::Incidence;
pub use index_vec::{Idx, IndexVec};
pub use structure::{Arc, ElementKind, Marking, Place, Transition, Weight};
