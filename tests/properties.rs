use proptest::prelude::*;

use pnreach::analysis::{ReachabilityExplorer, SearchMode};
use pnreach::net::{Element, FiringEngine, NetBuilder, PetriNet};

const MAX_PLACES: usize = 6;
const MAX_TRANSITIONS: usize = 5;

/// A connected 1-safe net: every place and every transition gets at least one
/// arc, plus `extra` arcs between arbitrary pairs.
fn net_document(
    places: usize,
    transitions: usize,
    marked: &[bool],
    directions: &[bool],
    extra: &[(usize, usize, bool)],
) -> Element {
    let mut net = Element::new("net").with_attr("id", "generated");
    for p in 0..places {
        let mut place = Element::new("place").with_attr("id", format!("p{p}"));
        if marked[p] {
            place.push_child(Element::new("initialMarking").with_text("1"));
        }
        net.push_child(place);
    }
    for t in 0..transitions {
        net.push_child(Element::new("transition").with_attr("id", format!("t{t}")));
    }

    let mut pairs = Vec::new();
    for p in 0..places {
        pairs.push((p, p % transitions, directions[p]));
    }
    for t in 0..transitions {
        pairs.push((t % places, t, directions[MAX_PLACES + t]));
    }
    pairs.extend(
        extra
            .iter()
            .map(|&(p, t, into)| (p % places, t % transitions, into)),
    );

    for (i, (p, t, into_transition)) in pairs.into_iter().enumerate() {
        let (source, target) = if into_transition {
            (format!("p{p}"), format!("t{t}"))
        } else {
            (format!("t{t}"), format!("p{p}"))
        };
        net.push_child(
            Element::new("arc")
                .with_attr("id", format!("a{i}"))
                .with_attr("source", source)
                .with_attr("target", target),
        );
    }
    net
}

fn arb_net() -> impl Strategy<Value = PetriNet> {
    (
        1..=MAX_PLACES,
        1..=MAX_TRANSITIONS,
        prop::collection::vec(any::<bool>(), MAX_PLACES),
        prop::collection::vec(any::<bool>(), MAX_PLACES + MAX_TRANSITIONS),
        prop::collection::vec((0..MAX_PLACES, 0..MAX_TRANSITIONS, any::<bool>()), 0..12),
    )
        .prop_map(|(places, transitions, marked, directions, extra)| {
            let document = net_document(places, transitions, &marked, &directions, &extra);
            NetBuilder::default()
                .build(&document)
                .expect("generated nets are connected and 1-safe")
        })
}

proptest! {
    #[test]
    fn bfs_and_dfs_reach_the_same_set(net in arb_net()) {
        let explorer = ReachabilityExplorer::new(&net);
        let bfs = explorer.explore(SearchMode::BreadthFirst);
        let dfs = explorer.explore(SearchMode::DepthFirst);

        let initial = net.initial_marking();
        prop_assert!(bfs.same_set(&dfs));
        prop_assert_eq!(bfs.get(0), Some(&initial));
        prop_assert_eq!(dfs.get(0), Some(&initial));
    }

    #[test]
    fn markings_only_name_existing_places(net in arb_net()) {
        let reach = ReachabilityExplorer::new(&net).explore(SearchMode::BreadthFirst);
        for marking in reach.iter() {
            for place in marking.iter() {
                prop_assert!(place.raw() < net.places_len() as u32);
            }
            for id in net.marking_ids(marking) {
                prop_assert!(net.place_id(id).is_some());
            }
        }
    }

    #[test]
    fn fire_is_pure(net in arb_net()) {
        let engine = FiringEngine::new(&net);
        let reach = ReachabilityExplorer::new(&net).explore(SearchMode::DepthFirst);
        for marking in reach.iter() {
            let before = marking.clone();
            for transition in engine.enabled_transitions(marking) {
                let first = engine.fire(marking, transition);
                let second = engine.fire(marking, transition);
                prop_assert_eq!(&first, &second);
                prop_assert!(reach.contains(&first));
                prop_assert!(engine.postset(transition).is_subset(&first));
            }
            prop_assert_eq!(marking, &before);
        }
    }

    #[test]
    fn exploration_is_reproducible(net in arb_net()) {
        let first = ReachabilityExplorer::new(&net).explore(SearchMode::DepthFirst);
        let second = ReachabilityExplorer::new(&net).explore(SearchMode::DepthFirst);
        prop_assert_eq!(first.sorted_ids(&net), second.sorted_ids(&net));
    }
}
