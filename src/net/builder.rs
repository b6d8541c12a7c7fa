//! Net construction and structural validation.
//!
//! [`NetBuilder::build`] turns a parsed document into a [`PetriNet`] in fixed
//! passes: places, transitions and arcs are extracted, arc endpoints are
//! resolved and cross-linked, then connectivity and (optionally) 1-safety are
//! checked. The first failing pass aborts construction. Connectivity and
//! safety checks report every offender of their pass at once.
use std::fmt;
use std::num::IntErrorKind;

use itertools::Itertools;
use log::{debug, info, warn};
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::net::core::PetriNet;
use crate::net::document::{DocumentNode, first_text};
use crate::net::structure::{Arc, ElementKind, Place, Transition, Weight};

const NAME_PATHS: &[&[&str]] = &[&["name", "text"], &["name"]];
const MARKING_PATHS: &[&[&str]] = &[
    &["initialMarking", "text"],
    &["initialMarking"],
    &["initialMarking", "value"],
    &["initial-marking"],
];
const INSCRIPTION_PATHS: &[&[&str]] = &[
    &["inscription", "text"],
    &["inscription"],
    &["inscription", "value"],
];

const DEFAULT_MARKING: Weight = 0;
const DEFAULT_WEIGHT: Weight = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcEnd {
    Source,
    Target,
}

impl fmt::Display for ArcEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArcEnd::Source => f.write_str("source"),
            ArcEnd::Target => f.write_str("target"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("no interpretable net structure: {reason}")]
    MalformedSource { reason: String },
    #[error("{}", missing_id_message(.element, .repeated))]
    MissingId {
        element: ElementKind,
        /// Set when an arc reuses an id already taken by another arc.
        repeated: Option<String>,
    },
    #[error("duplicate {element} id: {id}")]
    DuplicateId { element: ElementKind, id: String },
    #[error("arc {arc} has no {end}")]
    MissingEndpoint { arc: String, end: ArcEnd },
    #[error("arc {arc} {end} '{node}' not found")]
    UnknownEndpoint {
        arc: String,
        end: ArcEnd,
        node: String,
    },
    #[error("arc {arc} weight must be positive, got {weight}")]
    NonPositiveWeight { arc: String, weight: Weight },
    #[error("isolated nodes found (no arcs): {}", join_nodes(.nodes))]
    IsolatedNode { nodes: Vec<(ElementKind, String)> },
    #[error("non-binary initial markings detected: {}", join_counts(.places))]
    NonBinaryMarking { places: Vec<(String, Weight)> },
    #[error("arc weights != 1 detected (violates 1-safe requirement): {}", join_counts(.arcs))]
    NonUnitWeight { arcs: Vec<(String, Weight)> },
}

fn missing_id_message(element: &ElementKind, repeated: &Option<String>) -> String {
    match repeated {
        Some(id) => format!("{element} id '{id}' is already taken"),
        None => format!("found <{element}> without an id"),
    }
}

fn join_nodes(nodes: &[(ElementKind, String)]) -> String {
    nodes
        .iter()
        .map(|(kind, id)| format!("{kind} '{id}'"))
        .join(", ")
}

fn join_counts(entries: &[(String, Weight)]) -> String {
    entries
        .iter()
        .map(|(id, count)| format!("{id}={count}"))
        .join(", ")
}

impl BuildError {
    /// Stable tag for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            BuildError::MalformedSource { .. } => "malformed-source",
            BuildError::MissingId { .. } => "missing-id",
            BuildError::DuplicateId { .. } => "duplicate-id",
            BuildError::MissingEndpoint { .. } => "missing-endpoint",
            BuildError::UnknownEndpoint { .. } => "unknown-endpoint",
            BuildError::NonPositiveWeight { .. } => "non-positive-weight",
            BuildError::IsolatedNode { .. } => "isolated-node",
            BuildError::NonBinaryMarking { .. } => "non-binary-marking",
            BuildError::NonUnitWeight { .. } => "non-unit-weight",
        }
    }

    /// Parse-level failure, as opposed to a semantic validation failure.
    pub fn is_malformed(&self) -> bool {
        matches!(self, BuildError::MalformedSource { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Reject nets whose initial markings are not binary or whose arc
    /// weights are not 1.
    pub require_one_safe: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            require_one_safe: true,
        }
    }
}

/// An arc as read from the document, before endpoint resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawArc {
    id: String,
    source: String,
    target: String,
    weight: Weight,
}

#[derive(Debug, Clone, Default)]
pub struct NetBuilder {
    options: BuildOptions,
}

impl NetBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> BuildOptions {
        self.options
    }

    pub fn build<N>(&self, root: &N) -> Result<PetriNet, BuildError>
    where
        N: DocumentNode,
    {
        let net_node = locate_net(root)?;
        let mut net = PetriNet::empty(net_node.attribute("id").map(str::to_owned));

        extract_places(net_node, &mut net)?;
        extract_transitions(net_node, &mut net)?;
        let arcs = extract_arcs(net_node)?;
        cross_link(&mut net, arcs)?;
        validate_connectivity(&net)?;
        if self.options.require_one_safe {
            validate_safety(&net)?;
        }

        info!(
            "built net {}: places={}, transitions={}, arcs={}",
            net.id.as_deref().unwrap_or("<anonymous>"),
            net.places_len(),
            net.transitions_len(),
            net.arcs_len()
        );
        Ok(net)
    }
}

/// The first `net` child of the root, or the root itself when it is a net.
fn locate_net<N: DocumentNode>(root: &N) -> Result<&N, BuildError> {
    if root.local_name() == "net" {
        return Ok(root);
    }
    root.find_child("net")
        .ok_or_else(|| BuildError::MalformedSource {
            reason: format!("no <net> element found under <{}>", root.local_name()),
        })
}

fn extract_places<N: DocumentNode>(net_node: &N, net: &mut PetriNet) -> Result<(), BuildError> {
    for node in net_node.children_named("place") {
        let id = node_id(node, ElementKind::Place, net)?;
        let name = first_text(node, NAME_PATHS).map(str::to_owned);
        let initial_marking = match first_text(node, MARKING_PATHS) {
            None => DEFAULT_MARKING,
            Some(text) => parse_count(text).unwrap_or_else(|| {
                warn!("place {id}: unparsable initial marking {text:?}, using {DEFAULT_MARKING}");
                DEFAULT_MARKING
            }),
        };
        debug!("place {id} name={name:?} init={initial_marking}");
        net.add_place(Place::new(id, name, initial_marking));
    }
    Ok(())
}

/// Signed integer text. Values past the `Weight` range saturate, so an
/// oversized count still reaches the safety checks.
fn parse_count(text: &str) -> Option<Weight> {
    match text.parse::<Weight>() {
        Ok(value) => Some(value),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Some(Weight::MAX),
            IntErrorKind::NegOverflow => Some(Weight::MIN),
            _ => None,
        },
    }
}

fn extract_transitions<N: DocumentNode>(
    net_node: &N,
    net: &mut PetriNet,
) -> Result<(), BuildError> {
    for node in net_node.children_named("transition") {
        let id = node_id(node, ElementKind::Transition, net)?;
        let name = first_text(node, NAME_PATHS).map(str::to_owned);
        debug!("transition {id} name={name:?}");
        net.add_transition(Transition::new(id, name));
    }
    Ok(())
}

/// Places and transitions share a namespace; a clash with either kind is a
/// duplicate.
fn node_id<N: DocumentNode>(
    node: &N,
    element: ElementKind,
    net: &PetriNet,
) -> Result<String, BuildError> {
    let id = node.attribute("id").ok_or(BuildError::MissingId {
        element,
        repeated: None,
    })?;
    if net.node(id).is_some() {
        return Err(BuildError::DuplicateId {
            element,
            id: id.to_owned(),
        });
    }
    Ok(id.to_owned())
}

fn extract_arcs<N: DocumentNode>(net_node: &N) -> Result<Vec<RawArc>, BuildError> {
    let mut seen = FxHashSet::default();
    let mut arcs = Vec::new();
    for node in net_node.children_named("arc") {
        let id = node.attribute("id").ok_or(BuildError::MissingId {
            element: ElementKind::Arc,
            repeated: None,
        })?;
        if !seen.insert(id) {
            return Err(BuildError::MissingId {
                element: ElementKind::Arc,
                repeated: Some(id.to_owned()),
            });
        }
        let endpoint = |end: ArcEnd| {
            let name = match end {
                ArcEnd::Source => "source",
                ArcEnd::Target => "target",
            };
            node.attribute(name).ok_or_else(|| BuildError::MissingEndpoint {
                arc: id.to_owned(),
                end,
            })
        };
        let source = endpoint(ArcEnd::Source)?;
        let target = endpoint(ArcEnd::Target)?;

        let weight = match first_text(node, INSCRIPTION_PATHS) {
            None => DEFAULT_WEIGHT,
            Some(text) => parse_count(text).unwrap_or_else(|| {
                warn!("arc {id}: unparsable inscription {text:?}, using {DEFAULT_WEIGHT}");
                DEFAULT_WEIGHT
            }),
        };
        if weight <= 0 {
            return Err(BuildError::NonPositiveWeight {
                arc: id.to_owned(),
                weight,
            });
        }

        debug!("arc {id}: {source} -> {target} weight={weight}");
        arcs.push(RawArc {
            id: id.to_owned(),
            source: source.to_owned(),
            target: target.to_owned(),
            weight,
        });
    }
    Ok(arcs)
}

fn cross_link(net: &mut PetriNet, arcs: Vec<RawArc>) -> Result<(), BuildError> {
    for raw in arcs {
        let resolve = |end: ArcEnd, node: &str| {
            net.node(node).ok_or_else(|| BuildError::UnknownEndpoint {
                arc: raw.id.clone(),
                end,
                node: node.to_owned(),
            })
        };
        let from = resolve(ArcEnd::Source, &raw.source)?;
        let to = resolve(ArcEnd::Target, &raw.target)?;

        let arc = Arc {
            id: raw.id,
            source: raw.source,
            target: raw.target,
            weight: raw.weight,
            from,
            to,
        };
        if !arc.is_bipartite() {
            warn!(
                "arc {} connects two nodes of the same kind ({} -> {})",
                arc.id, arc.source, arc.target
            );
        }
        net.add_arc(arc);
    }
    Ok(())
}

fn validate_connectivity(net: &PetriNet) -> Result<(), BuildError> {
    let places = net
        .places
        .iter()
        .filter(|place| place.arcs.is_isolated())
        .map(|place| (ElementKind::Place, place.id.clone()));
    let transitions = net
        .transitions
        .iter()
        .filter(|transition| transition.arcs.is_isolated())
        .map(|transition| (ElementKind::Transition, transition.id.clone()));
    let nodes = places.chain(transitions).collect::<Vec<_>>();

    if nodes.is_empty() {
        Ok(())
    } else {
        Err(BuildError::IsolatedNode { nodes })
    }
}

fn validate_safety(net: &PetriNet) -> Result<(), BuildError> {
    let places = net
        .places
        .iter()
        .filter(|place| !(0..=1).contains(&place.initial_marking))
        .map(|place| (place.id.clone(), place.initial_marking))
        .collect::<Vec<_>>();
    if !places.is_empty() {
        return Err(BuildError::NonBinaryMarking { places });
    }

    let arcs = net
        .arcs
        .iter()
        .filter(|arc| arc.weight != 1)
        .map(|arc| (arc.id.clone(), arc.weight))
        .collect::<Vec<_>>();
    if !arcs.is_empty() {
        return Err(BuildError::NonUnitWeight { arcs });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::document::Element;

    fn place(id: &str, tokens: Option<&str>) -> Element {
        let node = Element::new("place").with_attr("id", id);
        match tokens {
            Some(text) => node.with_child(
                Element::new("initialMarking").with_child(Element::new("text").with_text(text)),
            ),
            None => node,
        }
    }

    fn transition(id: &str) -> Element {
        Element::new("transition").with_attr("id", id)
    }

    fn arc(id: &str, source: &str, target: &str) -> Element {
        Element::new("arc")
            .with_attr("id", id)
            .with_attr("source", source)
            .with_attr("target", target)
    }

    fn weighted(arc: Element, weight: &str) -> Element {
        arc.with_child(
            Element::new("inscription").with_child(Element::new("text").with_text(weight)),
        )
    }

    fn document(children: Vec<Element>) -> Element {
        let mut net = Element::new("net").with_attr("id", "n1");
        for child in children {
            net.push_child(child);
        }
        Element::new("pnml").with_child(net)
    }

    fn build(children: Vec<Element>) -> Result<PetriNet, BuildError> {
        NetBuilder::default().build(&document(children))
    }

    fn build_permissive(children: Vec<Element>) -> Result<PetriNet, BuildError> {
        NetBuilder::new(BuildOptions {
            require_one_safe: false,
        })
        .build(&document(children))
    }

    #[test]
    fn builds_simple_net() {
        let net = build(vec![
            place("p1", Some("1")),
            place("p2", None),
            transition("t1"),
            arc("a1", "p1", "t1"),
            arc("a2", "t1", "p2"),
        ])
        .unwrap();

        assert_eq!(net.id.as_deref(), Some("n1"));
        assert_eq!(
            net.summary().to_string(),
            "PetriNet Summary : places=2, transitions=1, arcs=2"
        );
        let p1 = net.place_id("p1").unwrap();
        assert_eq!(net.places[p1].initial_marking, 1);
        assert_eq!(net.arcs[net.arc_id("a1").unwrap()].weight, 1);
    }

    #[test]
    fn missing_net_is_malformed() {
        let err = NetBuilder::default().build(&Element::new("pnml")).unwrap_err();
        assert!(err.is_malformed());
        assert_eq!(err.code(), "malformed-source");
    }

    #[test]
    fn root_net_is_accepted() {
        let root = Element::new("net")
            .with_child(place("p1", Some("1")))
            .with_child(transition("t1"))
            .with_child(arc("a1", "p1", "t1"));
        let net = NetBuilder::default().build(&root).unwrap();
        assert_eq!(net.places_len(), 1);
        assert!(net.id.is_none());
    }

    #[test]
    fn place_without_id() {
        let err = build(vec![Element::new("place")]).unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingId {
                element: ElementKind::Place,
                repeated: None
            }
        );
    }

    #[test]
    fn duplicate_place_and_shared_namespace() {
        let err = build(vec![place("p1", None), place("p1", None)]).unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicateId {
                element: ElementKind::Place,
                id: "p1".into()
            }
        );

        let err = build(vec![place("x", None), transition("x")]).unwrap_err();
        assert_eq!(err.code(), "duplicate-id");
    }

    #[test]
    fn repeated_arc_id_is_reported_as_missing_id() {
        let err = build(vec![
            place("p1", Some("1")),
            transition("t1"),
            arc("a1", "p1", "t1"),
            arc("a1", "t1", "p1"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingId {
                element: ElementKind::Arc,
                repeated: Some("a1".into())
            }
        );
        assert_eq!(err.to_string(), "arc id 'a1' is already taken");
    }

    #[test]
    fn arc_without_target() {
        let node = Element::new("arc")
            .with_attr("id", "a1")
            .with_attr("source", "p1");
        let err = build(vec![place("p1", None), node]).unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingEndpoint {
                arc: "a1".into(),
                end: ArcEnd::Target
            }
        );
    }

    #[test]
    fn unknown_endpoint_names_arc_and_node() {
        let err = build(vec![place("p1", None), arc("a1", "p1", "ghost")]).unwrap_err();
        assert_eq!(
            err,
            BuildError::UnknownEndpoint {
                arc: "a1".into(),
                end: ArcEnd::Target,
                node: "ghost".into()
            }
        );
        assert_eq!(err.to_string(), "arc a1 target 'ghost' not found");
    }

    #[test]
    fn zero_and_negative_weights_fail() {
        for text in ["0", "-3"] {
            let err = build(vec![
                place("p1", None),
                transition("t1"),
                weighted(arc("a1", "p1", "t1"), text),
            ])
            .unwrap_err();
            assert_eq!(err.code(), "non-positive-weight");
        }
    }

    #[test]
    fn unparsable_numbers_fall_back_to_defaults() {
        let net = build(vec![
            place("p1", Some("lots")),
            transition("t1"),
            weighted(arc("a1", "p1", "t1"), "heavy"),
        ])
        .unwrap();
        assert_eq!(net.places[net.place_id("p1").unwrap()].initial_marking, 0);
        assert_eq!(net.arcs[net.arc_id("a1").unwrap()].weight, 1);
    }

    #[test]
    fn negative_and_oversized_markings_are_non_binary() {
        for (text, parsed) in [
            ("-1", -1),
            ("99999999999999999999", Weight::MAX),
            ("-99999999999999999999", Weight::MIN),
        ] {
            let children = || {
                vec![
                    place("p1", Some(text)),
                    transition("t1"),
                    arc("a1", "p1", "t1"),
                ]
            };
            assert_eq!(
                build(children()).unwrap_err(),
                BuildError::NonBinaryMarking {
                    places: vec![("p1".into(), parsed)]
                }
            );

            let net = build_permissive(children()).unwrap();
            assert_eq!(net.places[net.place_id("p1").unwrap()].initial_marking, parsed);
        }
    }

    #[test]
    fn oversized_inscription_is_non_unit() {
        let err = build(vec![
            place("p1", Some("1")),
            transition("t1"),
            weighted(arc("a1", "p1", "t1"), "99999999999999999999"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            BuildError::NonUnitWeight {
                arcs: vec![("a1".into(), Weight::MAX)]
            }
        );

        let err = build(vec![
            place("p1", Some("1")),
            transition("t1"),
            weighted(arc("a1", "p1", "t1"), "-99999999999999999999"),
        ])
        .unwrap_err();
        assert_eq!(err.code(), "non-positive-weight");
    }

    #[test]
    fn value_and_alias_paths_are_read() {
        let p = Element::new("place")
            .with_attr("id", "p1")
            .with_child(Element::new("initial-marking").with_text("1"))
            .with_child(Element::new("name").with_text("Idle"));
        let a = arc("a1", "p1", "t1").with_child(
            Element::new("inscription").with_child(Element::new("value").with_text("1")),
        );
        let net = build(vec![p, transition("t1"), a]).unwrap();
        let p1 = net.place_id("p1").unwrap();
        assert_eq!(net.places[p1].initial_marking, 1);
        assert_eq!(net.places[p1].name.as_deref(), Some("Idle"));
    }

    #[test]
    fn isolated_nodes_are_reported_together() {
        let err = build(vec![
            place("p1", Some("1")),
            place("lonely", None),
            transition("t1"),
            transition("idle"),
            arc("a1", "p1", "t1"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            BuildError::IsolatedNode {
                nodes: vec![
                    (ElementKind::Place, "lonely".into()),
                    (ElementKind::Transition, "idle".into()),
                ]
            }
        );
        assert_eq!(
            err.to_string(),
            "isolated nodes found (no arcs): place 'lonely', transition 'idle'"
        );
    }

    #[test]
    fn safety_checks_run_in_sequence() {
        let children = || {
            vec![
                place("p1", Some("2")),
                place("p2", Some("3")),
                transition("t1"),
                weighted(arc("a1", "p1", "t1"), "2"),
                arc("a2", "t1", "p2"),
            ]
        };

        let err = build(children()).unwrap_err();
        assert_eq!(
            err,
            BuildError::NonBinaryMarking {
                places: vec![("p1".into(), 2), ("p2".into(), 3)]
            }
        );

        let net = build_permissive(children()).unwrap();
        assert_eq!(net.arcs_len(), 2);
    }

    #[test]
    fn non_unit_weights_after_markings_pass() {
        let err = build(vec![
            place("p1", Some("1")),
            transition("t1"),
            weighted(arc("a1", "p1", "t1"), "2"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            BuildError::NonUnitWeight {
                arcs: vec![("a1".into(), 2)]
            }
        );
    }

    #[test]
    fn same_kind_arcs_are_tolerated() {
        let net = build(vec![
            place("p1", Some("1")),
            place("p2", None),
            arc("a1", "p1", "p2"),
        ])
        .unwrap();
        let arc = &net.arcs[net.arc_id("a1").unwrap()];
        assert!(!arc.is_bipartite());
    }
}
