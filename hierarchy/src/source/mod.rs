//! Ontology sources.
//!
//! The pipeline needs exactly one capability from an ontology: the direct
//! subclasses of a given class. [`SubclassQuery`] names that capability.
//! [`SubclassIndex`] is the in-memory implementation filled by
//! [`load_ontology`] from a Turtle or N-Triples file.

mod rdf;

use std::collections::HashMap;

use crate::model::ClassName;

pub use rdf::{load_ontology, local_name, RdfFormat};

/// Answers "which classes are declared direct subclasses of `class`?".
pub trait SubclassQuery {
    /// Direct subclasses of `class` in source order. Unknown classes and
    /// leaves both yield an empty list.
    fn direct_subclasses(&self, class: &ClassName) -> Vec<ClassName>;
}

impl<F> SubclassQuery for F
where
    F: Fn(&ClassName) -> Vec<ClassName>,
{
    fn direct_subclasses(&self, class: &ClassName) -> Vec<ClassName> {
        self(class)
    }
}

/// Insertion-ordered `superclass -> [subclasses]` index.
#[derive(Debug, Clone, Default)]
pub struct SubclassIndex {
    subclasses: HashMap<ClassName, Vec<ClassName>>,
    edge_count: usize,
}

impl SubclassIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from `(subclass, superclass)` pairs.
    pub fn from_edges<I, C, P>(edges: I) -> Self
    where
        I: IntoIterator<Item = (C, P)>,
        C: Into<ClassName>,
        P: Into<ClassName>,
    {
        let mut index = Self::new();
        for (child, parent) in edges {
            index.insert(child.into(), parent.into());
        }
        index
    }

    /// Declares `child rdfs:subClassOf parent`. A repeated statement is
    /// ignored and returns false.
    pub fn insert(&mut self, child: ClassName, parent: ClassName) -> bool {
        let children = self.subclasses.entry(parent).or_default();
        if children.contains(&child) {
            return false;
        }
        children.push(child);
        self.edge_count += 1;
        true
    }

    /// Number of distinct subclass statements.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns true if no statement was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }
}

impl SubclassQuery for SubclassIndex {
    fn direct_subclasses(&self, class: &ClassName) -> Vec<ClassName> {
        self.subclasses.get(class).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_keeps_source_order_and_ignores_repeats() {
        let mut index = SubclassIndex::from_edges([("B", "Root"), ("A", "Root"), ("C", "A")]);
        assert!(!index.insert("A".into(), "Root".into()));
        assert_eq!(index.edge_count(), 3);
        assert_eq!(
            index.direct_subclasses(&"Root".into()),
            vec![ClassName::from("B"), ClassName::from("A")]
        );
        assert!(index.direct_subclasses(&"C".into()).is_empty());
    }

    #[test]
    fn closures_are_sources() {
        let query = |class: &ClassName| -> Vec<ClassName> {
            if class.as_str() == "Root" {
                vec!["Leaf".into()]
            } else {
                Vec::new()
            }
        };
        assert_eq!(query.direct_subclasses(&"Root".into()).len(), 1);
    }
}
