use std::time::Instant;

use crate::analysis::reachability::Reachability;
use crate::net::FiringEngine;
use crate::report::{DeadlockReport, DeadlockState, StateSpaceInfo};

/// Dead markings and never-enabled transitions of an explored state space.
pub struct DeadlockDetector<'a, 'net> {
    engine: &'a FiringEngine<'net>,
    reachability: &'a Reachability,
}

impl<'a, 'net> DeadlockDetector<'a, 'net> {
    pub fn new(engine: &'a FiringEngine<'net>, reachability: &'a Reachability) -> Self {
        Self {
            engine,
            reachability,
        }
    }

    pub fn detect(&self) -> DeadlockReport {
        let start_time = Instant::now();
        let net = self.engine.net();
        let mut report = DeadlockReport::new(self.reachability.mode());

        let mut ever_enabled = vec![false; net.transitions_len()];
        for (index, marking) in self.reachability.iter().enumerate() {
            let mut any = false;
            for transition in self.engine.enabled_transitions(marking) {
                ever_enabled[transition.raw() as usize] = true;
                any = true;
            }
            if !any {
                report.deadlock_states.push(DeadlockState {
                    state_id: format!("s{index}"),
                    marking: net
                        .marking_ids(marking)
                        .into_iter()
                        .map(str::to_owned)
                        .collect(),
                });
            }
        }

        report.dead_transitions = self
            .engine
            .transitions()
            .iter()
            .filter(|transition| !ever_enabled[transition.raw() as usize])
            .map(|transition| net.transitions[*transition].id.clone())
            .collect();
        report.deadlock_count = report.deadlock_states.len();
        report.has_deadlock = report.deadlock_count > 0;
        report.state_space_info = StateSpaceInfo {
            reachable_states: self.reachability.len(),
            places: net.places_len(),
            transitions: net.transitions_len(),
        };
        report.analysis_time = start_time.elapsed();

        if report.has_deadlock {
            log::warn!(
                "{} dead marking(s) among {} reachable",
                report.deadlock_count,
                self.reachability.len()
            );
        } else {
            log::info!("no dead marking among {} reachable", self.reachability.len());
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::reachability::{ReachabilityExplorer, SearchMode};
    use crate::net::{Element, NetBuilder};

    fn arc(id: &str, source: &str, target: &str) -> Element {
        Element::new("arc")
            .with_attr("id", id)
            .with_attr("source", source)
            .with_attr("target", target)
    }

    #[test]
    fn mutual_wait_deadlocks() {
        // `grab` takes the only fork token; `wait` needs a signal that never appears.
        let root = Element::new("net")
            .with_child(
                Element::new("place")
                    .with_attr("id", "fork")
                    .with_child(Element::new("initialMarking").with_text("1")),
            )
            .with_child(Element::new("place").with_attr("id", "eating"))
            .with_child(Element::new("place").with_attr("id", "signal"))
            .with_child(Element::new("transition").with_attr("id", "grab"))
            .with_child(Element::new("transition").with_attr("id", "wait"))
            .with_child(arc("a1", "fork", "grab"))
            .with_child(arc("a2", "grab", "eating"))
            .with_child(arc("a3", "signal", "wait"))
            .with_child(arc("a4", "wait", "fork"));
        let net = NetBuilder::default().build(&root).unwrap();
        let explorer = ReachabilityExplorer::new(&net);
        let reach = explorer.explore(SearchMode::BreadthFirst);

        let report = DeadlockDetector::new(explorer.engine(), &reach).detect();
        assert!(report.has_deadlock);
        assert_eq!(report.deadlock_count, 1);
        assert_eq!(report.deadlock_states[0].marking, vec!["eating"]);
        assert_eq!(report.deadlock_states[0].state_id, "s1");
        assert_eq!(report.dead_transitions, vec!["wait"]);
        assert_eq!(report.state_space_info.reachable_states, 2);
    }

    #[test]
    fn live_cycle_has_no_deadlock() {
        let root = Element::new("net")
            .with_child(
                Element::new("place")
                    .with_attr("id", "p1")
                    .with_child(Element::new("initialMarking").with_text("1")),
            )
            .with_child(Element::new("place").with_attr("id", "p2"))
            .with_child(Element::new("transition").with_attr("id", "t1"))
            .with_child(Element::new("transition").with_attr("id", "t2"))
            .with_child(arc("a1", "p1", "t1"))
            .with_child(arc("a2", "t1", "p2"))
            .with_child(arc("a3", "p2", "t2"))
            .with_child(arc("a4", "t2", "p1"));
        let net = NetBuilder::default().build(&root).unwrap();
        let explorer = ReachabilityExplorer::new(&net);
        let reach = explorer.explore(SearchMode::DepthFirst);

        let report = DeadlockDetector::new(explorer.engine(), &reach).detect();
        assert!(!report.has_deadlock);
        assert!(report.dead_transitions.is_empty());
    }
}
