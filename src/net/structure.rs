//! Static net elements (places, transitions, arcs) and the binary marking.
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::net::ids::{NodeId, PlaceId};
use crate::net::incidence::Incidence;
use crate::net::index_vec::Idx;

/// Token count or arc weight as written in the document. Signed so that
/// negative text survives until validation.
pub type Weight = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Place,
    Transition,
    Arc,
}

impl ElementKind {
    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::Place => "place",
            ElementKind::Transition => "transition",
            ElementKind::Arc => "arc",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: Option<String>,
    pub initial_marking: Weight,
    pub arcs: Incidence,
}

impl Place {
    pub fn new(id: impl Into<String>, name: Option<String>, initial_marking: Weight) -> Self {
        Self {
            id: id.into(),
            name,
            initial_marking,
            arcs: Incidence::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub id: String,
    pub name: Option<String>,
    pub arcs: Incidence,
}

impl Transition {
    pub fn new(id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
            arcs: Incidence::new(),
        }
    }
}

/// A directed, weighted arc whose endpoints have been resolved against the
/// node namespace.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc {
    pub id: String,
    pub source: String,
    pub target: String,
    pub weight: Weight,
    pub from: NodeId,
    pub to: NodeId,
}

impl Arc {
    /// Place/transition arcs only; a place→place or transition→transition
    /// arc connects nodes of the same kind.
    pub fn is_bipartite(&self) -> bool {
        self.from.is_place() != self.to.is_place()
    }
}

impl fmt::Debug for Arc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arc")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("target", &self.target)
            .field("weight", &self.weight)
            .finish()
    }
}

type Word = u64;
const WORD_BITS: usize = Word::BITS as usize;

/// Set of marked places under 1-safe semantics.
///
/// Stored as a bitset over [`PlaceId`] indices. Every marking of one net has
/// the same word count, so derived equality and hashing are structural and a
/// marking can be used directly as a deduplication key.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Marking {
    words: SmallVec<[Word; 2]>,
}

impl Marking {
    pub fn empty(places: usize) -> Self {
        Self {
            words: smallvec![0; places.div_ceil(WORD_BITS)],
        }
    }

    pub fn from_places<I>(places: usize, marked: I) -> Self
    where
        I: IntoIterator<Item = PlaceId>,
    {
        let mut marking = Self::empty(places);
        for place in marked {
            marking.insert(place);
        }
        marking
    }

    pub(crate) fn insert(&mut self, place: PlaceId) {
        let (word, bit) = Self::slot(place);
        self.words[word] |= bit;
    }

    pub fn contains(&self, place: PlaceId) -> bool {
        let (word, bit) = Self::slot(place);
        self.words.get(word).is_some_and(|w| w & bit != 0)
    }

    /// Number of marked places.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    pub fn is_subset(&self, other: &Marking) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(mine, theirs)| mine & !theirs == 0)
    }

    /// `(self \ removed) ∪ added`, computed word by word.
    pub fn replace(&self, removed: &Marking, added: &Marking) -> Marking {
        let words = self
            .words
            .iter()
            .zip(removed.words.iter())
            .zip(added.words.iter())
            .map(|((current, pre), post)| (current & !pre) | post)
            .collect();
        Marking { words }
    }

    /// Marked places in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = PlaceId> + '_ {
        self.words.iter().enumerate().flat_map(|(word_idx, word)| {
            let mut rest = *word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(PlaceId::from_usize(word_idx * WORD_BITS + bit))
            })
        })
    }

    fn slot(place: PlaceId) -> (usize, Word) {
        let idx = place.index();
        (idx / WORD_BITS, 1 << (idx % WORD_BITS))
    }
}

impl fmt::Debug for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
