//! Arc incidence lists kept on every place and transition.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::net::ids::ArcId;

pub type ArcList = SmallVec<[ArcId; 4]>;

/// Incoming and outgoing arcs of one node, in arc declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incidence {
    pub incoming: ArcList,
    pub outgoing: ArcList,
}

impl Incidence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_incoming(&mut self, arc: ArcId) {
        self.incoming.push(arc);
    }

    pub fn push_outgoing(&mut self, arc: ArcId) {
        self.outgoing.push(arc);
    }

    /// A node with no incident arc at all.
    pub fn is_isolated(&self) -> bool {
        self.incoming.is_empty() && self.outgoing.is_empty()
    }
}
