use std::fmt;

use serde::{Deserialize, Serialize};

use crate::net::index_vec::Idx;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl Idx for $name {
            fn index(self) -> usize {
                self.0 as usize
            }

            fn from_usize(idx: usize) -> Self {
                debug_assert!(idx <= u32::MAX as usize);
                Self(idx as u32)
            }
        }
    };
}

define_id!(PlaceId);
define_id!(TransitionId);
define_id!(ArcId);

/// A resolved arc endpoint. Places and transitions share one id namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeId {
    Place(PlaceId),
    Transition(TransitionId),
}

impl NodeId {
    pub fn as_place(self) -> Option<PlaceId> {
        match self {
            NodeId::Place(place) => Some(place),
            NodeId::Transition(_) => None,
        }
    }

    pub fn as_transition(self) -> Option<TransitionId> {
        match self {
            NodeId::Transition(transition) => Some(transition),
            NodeId::Place(_) => None,
        }
    }

    pub fn is_place(self) -> bool {
        matches!(self, NodeId::Place(_))
    }
}
