//! Core hierarchy model types.
//!
//! These types carry a taxonomy through the pipeline: the breadth-first
//! [`ClassNetwork`], the per-class [`AncestorMap`], and the final
//! [`ClassVector`]s. Class names are owned [`ClassName`] values; every map is
//! keyed by them and can be queried with a plain `&str`.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of one taxonomy class, e.g. `"IfcWall"`.
///
/// Names are IRI local names. Within one hierarchy a name is unique and
/// doubles as the node key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassName(String);

impl ClassName {
    /// Creates a class name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ClassName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ClassName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClassName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for ClassName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A subclass edge the network builder did not follow because its child had
/// already been reached through another parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedEdge {
    /// Parent whose subclass list contained the edge.
    pub parent: ClassName,
    /// The already-enqueued child.
    pub child: ClassName,
    /// Parent through which `child` was first reached; `None` when `child`
    /// is the root.
    pub kept_parent: Option<ClassName>,
}

/// Breadth-first expansion of the subclass relation below a root class.
///
/// Maps each visited class to its ordered direct children. Entries are kept
/// in visit order, so a parent is always listed before its children.
#[derive(Debug, Clone)]
pub struct ClassNetwork {
    root: ClassName,
    order: Vec<ClassName>,
    children: HashMap<ClassName, Vec<ClassName>>,
    dropped: Vec<DroppedEdge>,
}

impl ClassNetwork {
    /// Creates a network that has visited nothing but `root`.
    pub fn new(root: ClassName) -> Self {
        Self {
            root,
            order: Vec::new(),
            children: HashMap::new(),
            dropped: Vec::new(),
        }
    }

    /// Builds a network from `(class, children)` entries, taken in the given
    /// order. No structural checks are made here; those belong to
    /// [`to_tree`](crate::tree::to_tree).
    pub fn from_entries<I>(root: ClassName, entries: I) -> Self
    where
        I: IntoIterator<Item = (ClassName, Vec<ClassName>)>,
    {
        let mut network = Self::new(root);
        for (class, children) in entries {
            network.record(class, children);
        }
        network
    }

    /// Records the children of `class`, replacing any earlier entry.
    pub(crate) fn record(&mut self, class: ClassName, children: Vec<ClassName>) {
        if self.children.insert(class.clone(), children).is_none() {
            self.order.push(class);
        }
    }

    pub(crate) fn record_dropped(&mut self, edge: DroppedEdge) {
        self.dropped.push(edge);
    }

    /// The class the expansion started from.
    #[must_use]
    pub fn root(&self) -> &ClassName {
        &self.root
    }

    /// Direct children of `class`, or `None` if the class was never visited.
    #[must_use]
    pub fn children(&self, class: &str) -> Option<&[ClassName]> {
        self.children.get(class).map(Vec::as_slice)
    }

    /// Iterates `(class, children)` in visit order.
    pub fn iter(&self) -> impl Iterator<Item = (&ClassName, &[ClassName])> {
        self.order.iter().map(move |class| {
            let children = self.children.get(class).map_or(&[][..], Vec::as_slice);
            (class, children)
        })
    }

    /// Number of visited classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if nothing was visited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Edges skipped because their child was already enqueued.
    #[must_use]
    pub fn dropped_edges(&self) -> &[DroppedEdge] {
        &self.dropped
    }
}

/// Ancestor chain per class: nearest parent first, root last. The root maps
/// to an empty chain.
pub type AncestorMap = BTreeMap<ClassName, Vec<ClassName>>;

/// Final artifact: one multi-hot vector per class.
pub type VectorMap = BTreeMap<ClassName, ClassVector>;

/// Fixed-length multi-hot vector over a [`Vocabulary`](crate::encoder::Vocabulary).
///
/// Entries are `0.0` or `1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassVector(Vec<f32>);

impl ClassVector {
    /// Creates an all-zero vector of length `len`.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    /// Sets the entry at `index` to `1.0`. Returns false if `index` is out
    /// of range.
    pub fn set(&mut self, index: usize) -> bool {
        match self.0.get_mut(index) {
            Some(slot) => {
                *slot = 1.0;
                true
            }
            None => false,
        }
    }

    /// Returns true if the entry at `index` is set.
    #[must_use]
    pub fn is_set(&self, index: usize) -> bool {
        self.0.get(index).is_some_and(|v| *v != 0.0)
    }

    /// Indices of all set entries, ascending.
    #[must_use]
    pub fn active_indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of set entries.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.0.iter().filter(|v| **v != 0.0).count()
    }

    /// Vector length (the vocabulary size).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for a zero-length vector.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw entries.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Consumes the vector and returns its entries.
    #[must_use]
    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl From<Vec<f32>> for ClassVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// Standard IRI constants used when reading ontology sources.
pub mod iris {
    /// RDF namespace.
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// RDFS namespace.
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    /// OWL namespace.
    pub const OWL: &str = "http://www.w3.org/2002/07/owl#";

    /// `rdfs:subClassOf`.
    pub const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
}
