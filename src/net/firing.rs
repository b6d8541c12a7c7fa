//! Firing rule for 1-safe nets.
//!
//! With binary markings and unit weights the token game reduces to set
//! algebra: `t` is enabled in `M` iff `•t ⊆ M`, and firing yields
//! `(M \ •t) ∪ t•`. A place in both `•t` and `t•` stays marked.
use thiserror::Error;

use crate::net::core::PetriNet;
use crate::net::ids::TransitionId;
use crate::net::index_vec::{Idx, IndexVec};
use crate::net::structure::Marking;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FireError {
    #[error("transition {0:?} is out of bounds")]
    OutOfBounds(TransitionId),
    #[error("transition {0:?} is not enabled under the supplied marking")]
    NotEnabled(TransitionId),
}

/// Presets and postsets of every transition, precomputed once per net.
#[derive(Debug, Clone)]
pub struct FiringEngine<'net> {
    net: &'net PetriNet,
    pre: IndexVec<TransitionId, Marking>,
    post: IndexVec<TransitionId, Marking>,
    order: Vec<TransitionId>,
}

impl<'net> FiringEngine<'net> {
    pub fn new(net: &'net PetriNet) -> Self {
        let places = net.places_len();
        let mut pre = IndexVec::with_capacity(net.transitions_len());
        let mut post = IndexVec::with_capacity(net.transitions_len());

        for transition in net.transitions.iter() {
            // Arc weights are ignored: they are all 1 in a validated 1-safe net.
            let inputs = transition
                .arcs
                .incoming
                .iter()
                .filter_map(|arc| net.arcs[*arc].from.as_place());
            let outputs = transition
                .arcs
                .outgoing
                .iter()
                .filter_map(|arc| net.arcs[*arc].to.as_place());
            pre.push(Marking::from_places(places, inputs));
            post.push(Marking::from_places(places, outputs));
        }

        Self {
            net,
            pre,
            post,
            order: net.transitions_by_id(),
        }
    }

    pub fn net(&self) -> &'net PetriNet {
        self.net
    }

    /// `•t`: places with an arc into `transition`.
    pub fn preset(&self, transition: TransitionId) -> &Marking {
        &self.pre[transition]
    }

    /// `t•`: places with an arc out of `transition`.
    pub fn postset(&self, transition: TransitionId) -> &Marking {
        &self.post[transition]
    }

    pub fn is_enabled(&self, marking: &Marking, transition: TransitionId) -> bool {
        self.pre
            .get(transition)
            .is_some_and(|preset| preset.is_subset(marking))
    }

    /// Fires an enabled transition. Calling this on a disabled transition is
    /// a precondition violation; use [`try_fire`](Self::try_fire) to check.
    pub fn fire(&self, marking: &Marking, transition: TransitionId) -> Marking {
        debug_assert!(
            self.is_enabled(marking, transition),
            "{transition:?} fired while disabled"
        );
        marking.replace(&self.pre[transition], &self.post[transition])
    }

    pub fn try_fire(
        &self,
        marking: &Marking,
        transition: TransitionId,
    ) -> Result<Marking, FireError> {
        if transition.index() >= self.net.transitions_len() {
            return Err(FireError::OutOfBounds(transition));
        }
        if !self.is_enabled(marking, transition) {
            return Err(FireError::NotEnabled(transition));
        }
        Ok(self.fire(marking, transition))
    }

    /// All transitions, in ascending lexicographic id order.
    pub fn transitions(&self) -> &[TransitionId] {
        &self.order
    }

    /// Enabled transitions of `marking`, in ascending lexicographic id order.
    pub fn enabled_transitions<'a>(
        &'a self,
        marking: &'a Marking,
    ) -> impl Iterator<Item = TransitionId> + 'a {
        self.order
            .iter()
            .copied()
            .filter(move |transition| self.is_enabled(marking, *transition))
    }

    /// `(transition, successor)` for each enabled transition of `marking`.
    pub fn successors<'a>(
        &'a self,
        marking: &'a Marking,
    ) -> impl Iterator<Item = (TransitionId, Marking)> + 'a {
        self.enabled_transitions(marking)
            .map(move |transition| (transition, self.fire(marking, transition)))
    }
}
