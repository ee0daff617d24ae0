//! Breadth-first expansion of the subclass relation.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{Result, StructureError};
use crate::model::{ClassName, ClassNetwork, DroppedEdge};
use crate::source::SubclassQuery;

/// What to do with a subclass edge whose child was already enqueued through
/// another parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateEdgePolicy {
    /// Keep the first-seen parent, drop the edge and log it.
    #[default]
    Drop,
    /// Fail with [`StructureError::MultipleParents`].
    Reject,
}

/// Expands the subclass relation below `root` breadth-first.
///
/// Every class is enqueued at most once, so the walk terminates on any input.
/// After the walk, the visited subgraph (kept and dropped edges together) is
/// checked for cycles.
///
/// # Errors
///
/// Returns [`StructureError::Cycle`] if the subclass relation below `root`
/// loops, and [`StructureError::MultipleParents`] under
/// [`DuplicateEdgePolicy::Reject`] if any class is reached twice.
pub fn build_network<Q>(
    root: &ClassName,
    query: &Q,
    policy: DuplicateEdgePolicy,
) -> Result<ClassNetwork>
where
    Q: SubclassQuery + ?Sized,
{
    let mut network = ClassNetwork::new(root.clone());
    let mut queue = VecDeque::from([root.clone()]);
    let mut first_parent: HashMap<ClassName, Option<ClassName>> =
        HashMap::from([(root.clone(), None)]);

    while let Some(class) = queue.pop_front() {
        let mut children = Vec::new();
        for subclass in query.direct_subclasses(&class) {
            if let Some(kept) = first_parent.get(&subclass) {
                warn!(
                    parent = %class,
                    child = %subclass,
                    kept_parent = kept.as_ref().map_or("-", ClassName::as_str),
                    "dropping subclass edge to an already enqueued class"
                );
                network.record_dropped(DroppedEdge {
                    parent: class.clone(),
                    child: subclass,
                    kept_parent: kept.clone(),
                });
                continue;
            }
            first_parent.insert(subclass.clone(), Some(class.clone()));
            queue.push_back(subclass.clone());
            children.push(subclass);
        }
        debug!(class = %class, children = children.len(), "expanded");
        network.record(class, children);
    }

    if let Some((class, descendant)) = find_cycle(&network) {
        return Err(StructureError::Cycle { class, descendant }.into());
    }
    if policy == DuplicateEdgePolicy::Reject {
        if let Some(edge) = network.dropped_edges().first() {
            return Err(StructureError::MultipleParents {
                class: edge.child.clone(),
                first: edge.kept_parent.clone().unwrap_or_else(|| root.clone()),
                second: edge.parent.clone(),
            }
            .into());
        }
    }

    info!(
        root = %root,
        classes = network.len(),
        dropped_edges = network.dropped_edges().len(),
        "class network built"
    );
    Ok(network)
}

/// Depth-first search over kept and dropped edges. Returns the first back
/// edge found as `(target, source)`.
fn find_cycle(network: &ClassNetwork) -> Option<(ClassName, ClassName)> {
    let mut extra: HashMap<&ClassName, Vec<&ClassName>> = HashMap::new();
    for edge in network.dropped_edges() {
        extra.entry(&edge.parent).or_default().push(&edge.child);
    }
    if extra.is_empty() {
        return None;
    }

    let root = network.root();
    let mut open: HashSet<&ClassName> = HashSet::from([root]);
    let mut done: HashSet<&ClassName> = HashSet::new();
    let mut stack = vec![(root, successors(network, &extra, root))];

    loop {
        let (node, next) = {
            let top = stack.last_mut()?;
            (top.0, top.1.pop())
        };
        match next {
            Some(next) if open.contains(next) => return Some((next.clone(), node.clone())),
            Some(next) if done.contains(next) => {}
            Some(next) => {
                open.insert(next);
                stack.push((next, successors(network, &extra, next)));
            }
            None => {
                open.remove(node);
                done.insert(node);
                stack.pop();
            }
        }
    }
}

fn successors<'a>(
    network: &'a ClassNetwork,
    extra: &HashMap<&'a ClassName, Vec<&'a ClassName>>,
    class: &'a ClassName,
) -> Vec<&'a ClassName> {
    let mut out: Vec<&ClassName> = network
        .children(class.as_str())
        .unwrap_or_default()
        .iter()
        .collect();
    if let Some(more) = extra.get(&class) {
        out.extend(more.iter().copied());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HierarchyError;
    use crate::source::SubclassIndex;

    fn names(list: &[ClassName]) -> Vec<&str> {
        list.iter().map(ClassName::as_str).collect()
    }

    #[test]
    fn breadth_first_order() -> Result<()> {
        let index =
            SubclassIndex::from_edges([("A", "Root"), ("B", "Root"), ("C", "A"), ("D", "B")]);
        let network = build_network(&"Root".into(), &index, DuplicateEdgePolicy::Drop)?;
        let order: Vec<&str> = network.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(order, ["Root", "A", "B", "C", "D"]);
        assert_eq!(network.children("Root").map(names), Some(vec!["A", "B"]));
        assert_eq!(network.children("C").map(<[ClassName]>::len), Some(0));
        assert!(network.dropped_edges().is_empty());
        Ok(())
    }

    #[test]
    fn leaf_root_yields_single_entry() -> Result<()> {
        let index = SubclassIndex::new();
        let network = build_network(&"Lonely".into(), &index, DuplicateEdgePolicy::Drop)?;
        assert_eq!(network.len(), 1);
        assert_eq!(network.children("Lonely").map(<[ClassName]>::len), Some(0));
        Ok(())
    }

    #[test]
    fn classes_outside_the_root_are_not_visited() -> Result<()> {
        let index = SubclassIndex::from_edges([("A", "Root"), ("X", "Other")]);
        let network = build_network(&"Root".into(), &index, DuplicateEdgePolicy::Drop)?;
        assert!(network.children("X").is_none());
        assert!(network.children("Other").is_none());
        Ok(())
    }

    #[test]
    fn second_parent_is_dropped() -> Result<()> {
        let index =
            SubclassIndex::from_edges([("A", "Root"), ("B", "Root"), ("C", "A"), ("C", "B")]);
        let network = build_network(&"Root".into(), &index, DuplicateEdgePolicy::Drop)?;
        assert_eq!(network.len(), 4);
        assert_eq!(network.children("B").map(<[ClassName]>::len), Some(0));
        assert_eq!(
            network.dropped_edges(),
            &[DroppedEdge {
                parent: "B".into(),
                child: "C".into(),
                kept_parent: Some("A".into()),
            }]
        );
        Ok(())
    }

    #[test]
    fn second_parent_rejected() {
        let index =
            SubclassIndex::from_edges([("A", "Root"), ("B", "Root"), ("C", "A"), ("C", "B")]);
        let err = build_network(&"Root".into(), &index, DuplicateEdgePolicy::Reject);
        assert!(matches!(
            err,
            Err(HierarchyError::MalformedOntology(StructureError::MultipleParents { .. }))
        ));
    }

    #[test]
    fn cycle_fails_under_either_policy() {
        let index = SubclassIndex::from_edges([("A", "Root"), ("B", "A"), ("A", "B")]);
        for policy in [DuplicateEdgePolicy::Drop, DuplicateEdgePolicy::Reject] {
            let err = build_network(&"Root".into(), &index, policy);
            assert!(
                matches!(
                    err,
                    Err(HierarchyError::MalformedOntology(StructureError::Cycle {
                        ref class,
                        ref descendant,
                    })) if class.as_str() == "A" && descendant.as_str() == "B"
                ),
                "expected a cycle error, got {err:?}"
            );
        }
    }

    #[test]
    fn cycle_back_to_root_fails() {
        let index = SubclassIndex::from_edges([("A", "Root"), ("Root", "A")]);
        let err = build_network(&"Root".into(), &index, DuplicateEdgePolicy::Drop);
        assert!(matches!(
            err,
            Err(HierarchyError::MalformedOntology(StructureError::Cycle { .. }))
        ));
    }

    #[test]
    fn repeated_entries_from_a_query_are_enqueued_once() -> Result<()> {
        let query = |class: &ClassName| -> Vec<ClassName> {
            match class.as_str() {
                "Root" => vec!["A".into(), "A".into()],
                _ => Vec::new(),
            }
        };
        let network = build_network(&"Root".into(), &query, DuplicateEdgePolicy::Drop)?;
        assert_eq!(network.len(), 2);
        assert_eq!(network.children("Root").map(names), Some(vec!["A"]));
        assert_eq!(network.dropped_edges().len(), 1);
        Ok(())
    }
}
