//! Ancestor chains and the deprecated-class merge.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::config::DeprecatedTable;
use crate::error::{ChainDefect, StructureError};
use crate::model::{AncestorMap, ClassName};
use crate::tree::ClassTree;

/// Walks every node of `tree` up to the root.
///
/// Each chain lists the nearest parent first and ends with the root; the
/// root's own chain is empty. The walk is iterative, one parent lookup per
/// step.
#[must_use]
pub fn extract_ancestors(tree: &ClassTree) -> AncestorMap {
    let mut ancestors = AncestorMap::new();
    for class in tree.names() {
        let mut chain = Vec::new();
        let mut cursor = tree.parent(class.as_str());
        while let Some(parent) = cursor {
            chain.push(parent.clone());
            cursor = tree.parent(parent.as_str());
        }
        ancestors.insert(class.clone(), chain);
    }
    info!(classes = ancestors.len(), "ancestor chains extracted");
    ancestors
}

/// Merges a deprecated-class table into `ancestors`.
///
/// Table entries win on key collision. Returns the classes whose live chain
/// was replaced.
///
/// # Errors
///
/// Returns [`StructureError::InvalidDeprecatedChain`] if an entry lists its
/// own class or a name twice, or has an empty chain without being the root
/// of `ancestors`. Nothing is merged in that case.
pub fn merge_deprecated(
    ancestors: &mut AncestorMap,
    table: &DeprecatedTable,
) -> Result<Vec<ClassName>, StructureError> {
    for (class, chain) in table.iter() {
        let is_root = ancestors.get(class).is_some_and(Vec::is_empty);
        check_chain(class, chain, is_root)?;
    }

    let mut overridden = Vec::new();
    for (class, chain) in table.iter() {
        if let Some(previous) = ancestors.insert(class.clone(), chain.clone()) {
            warn!(
                class = %class,
                live = previous.len(),
                table = chain.len(),
                "deprecated-class table overrides a live ancestor chain"
            );
            overridden.push(class.clone());
        }
    }
    info!(
        entries = table.len(),
        overridden = overridden.len(),
        "deprecated classes merged"
    );
    Ok(overridden)
}

fn check_chain(class: &ClassName, chain: &[ClassName], is_root: bool) -> Result<(), StructureError> {
    let invalid = |defect| StructureError::InvalidDeprecatedChain {
        class: class.clone(),
        defect,
    };
    if chain.is_empty() && !is_root {
        return Err(invalid(ChainDefect::Empty));
    }
    let mut seen = HashSet::new();
    for ancestor in chain {
        if ancestor == class {
            return Err(invalid(ChainDefect::SelfReference));
        }
        if !seen.insert(ancestor) {
            return Err(invalid(ChainDefect::Repeated(ancestor.clone())));
        }
    }
    Ok(())
}
