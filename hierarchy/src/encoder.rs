//! Vocabulary indexing and multi-hot encoding.

use std::collections::HashMap;

use tracing::info;

use crate::error::{HierarchyError, Result};
use crate::model::{AncestorMap, ClassName, ClassVector, VectorMap};

/// Bijection between class names and the dense index range `[0, N)`.
///
/// Indices follow the lexicographic order of names, so the same set of
/// names always yields the same vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    names: Vec<ClassName>,
    index: HashMap<ClassName, usize>,
}

impl Vocabulary {
    /// Builds a vocabulary over the distinct `names`.
    pub fn from_names<I>(names: I) -> Self
    where
        I: IntoIterator<Item = ClassName>,
    {
        let mut names: Vec<ClassName> = names.into_iter().collect();
        names.sort();
        names.dedup();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { names, index }
    }

    /// Index assigned to `class`.
    #[must_use]
    pub fn index_of(&self, class: &str) -> Option<usize> {
        self.index.get(class).copied()
    }

    /// Class assigned to `index`.
    #[must_use]
    pub fn name_of(&self, index: usize) -> Option<&ClassName> {
        self.names.get(index)
    }

    /// Names in index order.
    #[must_use]
    pub fn names(&self) -> &[ClassName] {
        &self.names
    }

    /// Vocabulary size `N`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true for an empty vocabulary.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names of every set entry of `vector`. Indices outside the vocabulary
    /// are skipped.
    #[must_use]
    pub fn decode(&self, vector: &ClassVector) -> Vec<&ClassName> {
        vector
            .active_indices()
            .into_iter()
            .filter_map(|i| self.name_of(i))
            .collect()
    }
}

/// Output of [`encode`].
#[derive(Debug, Clone)]
pub struct EncodedHierarchy {
    /// Index assignment shared by all vectors.
    pub vocabulary: Vocabulary,
    /// One multi-hot vector per class.
    pub vectors: VectorMap,
}

/// Encodes every class as a multi-hot vector flagging itself and all its
/// ancestors.
///
/// The vocabulary is built from the keys of `ancestors`.
///
/// # Errors
///
/// Returns [`HierarchyError::EncodingInconsistency`] if a chain names a
/// class that is not a key of `ancestors`.
pub fn encode(ancestors: &AncestorMap) -> Result<EncodedHierarchy> {
    let vocabulary = Vocabulary::from_names(ancestors.keys().cloned());
    let width = vocabulary.len();

    let mut vectors = VectorMap::new();
    for (class, chain) in ancestors {
        let mut vector = ClassVector::zeros(width);
        for name in std::iter::once(class).chain(chain) {
            let index = vocabulary.index_of(name.as_str()).ok_or_else(|| {
                HierarchyError::EncodingInconsistency {
                    class: class.clone(),
                    ancestor: name.clone(),
                }
            })?;
            vector.set(index);
        }
        vectors.insert(class.clone(), vector);
    }

    info!(vocabulary = width, vectors = vectors.len(), "class vectors encoded");
    Ok(EncodedHierarchy {
        vocabulary,
        vectors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(names: &[&str]) -> Vec<ClassName> {
        names.iter().map(|n| ClassName::from(*n)).collect()
    }

    fn sample() -> AncestorMap {
        AncestorMap::from([
            ("Root".into(), Vec::new()),
            ("A".into(), chain(&["Root"])),
            ("B".into(), chain(&["Root"])),
            ("C".into(), chain(&["A", "Root"])),
        ])
    }

    #[test]
    fn vocabulary_is_sorted_and_dense() {
        let vocab = Vocabulary::from_names(chain(&["b", "a", "c", "a"]));
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.index_of("a"), Some(0));
        assert_eq!(vocab.index_of("c"), Some(2));
        assert_eq!(vocab.name_of(1).map(ClassName::as_str), Some("b"));
        assert!(vocab.index_of("z").is_none());
    }

    #[test]
    fn vectors_flag_self_and_ancestors() -> Result<()> {
        let ancestors = sample();
        let encoded = encode(&ancestors)?;
        let vocab = &encoded.vocabulary;
        assert_eq!(vocab.len(), 4);

        for (class, chain) in &ancestors {
            let vector = &encoded.vectors[class];
            assert_eq!(vector.len(), 4);
            assert_eq!(vector.count_ones(), chain.len() + 1);
            assert!(vocab.index_of(class.as_str()).is_some_and(|i| vector.is_set(i)));
            for ancestor in chain {
                assert!(vocab.index_of(ancestor.as_str()).is_some_and(|i| vector.is_set(i)));
            }
        }

        let c = &encoded.vectors["C"];
        let decoded: Vec<&str> = vocab.decode(c).into_iter().map(ClassName::as_str).collect();
        assert_eq!(decoded, ["A", "C", "Root"]);
        assert!(vocab.index_of("B").is_some_and(|i| !c.is_set(i)));
        assert_eq!(encoded.vectors["Root"].count_ones(), 1);
        Ok(())
    }

    #[test]
    fn entries_are_zero_or_one() -> Result<()> {
        let encoded = encode(&sample())?;
        for vector in encoded.vectors.values() {
            assert!(vector.as_slice().iter().all(|v| *v == 0.0 || *v == 1.0));
        }
        Ok(())
    }

    #[test]
    fn unknown_ancestor_fails() {
        let mut ancestors = sample();
        ancestors.insert("D".into(), chain(&["Ghost", "Root"]));
        assert!(matches!(
            encode(&ancestors),
            Err(HierarchyError::EncodingInconsistency { ref ancestor, .. })
                if ancestor.as_str() == "Ghost"
        ));
    }
}
