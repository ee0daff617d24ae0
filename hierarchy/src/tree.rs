//! Single-parent class tree.
//!
//! Nodes live in an arena and are looked up by [`ClassName`], which is also
//! the node key. The tree can only grow through [`ClassTree::insert`], which
//! refuses duplicate names and unknown parents, so it holds no cycles or
//! orphans.

use std::collections::HashMap;

use tracing::info;

use crate::error::{Result, StructureError};
use crate::model::{ClassName, ClassNetwork};

#[derive(Debug, Clone)]
struct Node {
    name: ClassName,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// A rooted tree of classes with exactly one parent per non-root node.
#[derive(Debug, Clone)]
pub struct ClassTree {
    nodes: Vec<Node>,
    index: HashMap<ClassName, usize>,
}

impl ClassTree {
    /// Creates a tree holding only `root`.
    #[must_use]
    pub fn with_root(root: ClassName) -> Self {
        let index = HashMap::from([(root.clone(), 0)]);
        Self {
            nodes: vec![Node {
                name: root,
                parent: None,
                children: Vec::new(),
            }],
            index,
        }
    }

    /// Attaches `child` under `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::DuplicateNode`] if `child` is already in the
    /// tree, and [`StructureError::UnknownParent`] if `parent` is not.
    pub fn insert(&mut self, child: ClassName, parent: &ClassName) -> Result<(), StructureError> {
        if self.index.contains_key(&child) {
            return Err(StructureError::DuplicateNode {
                class: child,
                parent: parent.clone(),
            });
        }
        let Some(&parent_idx) = self.index.get(parent) else {
            return Err(StructureError::UnknownParent {
                parent: parent.clone(),
                child,
            });
        };
        let idx = self.nodes.len();
        self.nodes.push(Node {
            name: child.clone(),
            parent: Some(parent_idx),
            children: Vec::new(),
        });
        self.nodes[parent_idx].children.push(idx);
        self.index.insert(child, idx);
        Ok(())
    }

    /// The root class.
    #[must_use]
    pub fn root(&self) -> &ClassName {
        &self.nodes[0].name
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if `class` is a node of this tree.
    #[must_use]
    pub fn contains(&self, class: &str) -> bool {
        self.index.contains_key(class)
    }

    /// Parent of `class`; `None` for the root and for unknown classes.
    #[must_use]
    pub fn parent(&self, class: &str) -> Option<&ClassName> {
        let idx = *self.index.get(class)?;
        self.nodes[idx].parent.map(|p| &self.nodes[p].name)
    }

    /// Direct children of `class` in insertion order.
    #[must_use]
    pub fn children(&self, class: &str) -> Vec<&ClassName> {
        self.index
            .get(class)
            .map(|&idx| {
                self.nodes[idx]
                    .children
                    .iter()
                    .map(|&c| &self.nodes[c].name)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All class names in insertion order, root first.
    pub fn names(&self) -> impl Iterator<Item = &ClassName> {
        self.nodes.iter().map(|n| &n.name)
    }

    /// Renders the tree as text, children sorted by name:
    ///
    /// ```text
    /// Root
    /// ├── A
    /// │   └── C
    /// └── B
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(self.root().as_str());
        out.push('\n');

        let mut stack: Vec<(usize, String, bool)> = Vec::new();
        self.push_sorted_children(0, "", &mut stack);
        while let Some((idx, prefix, last)) = stack.pop() {
            out.push_str(&prefix);
            out.push_str(if last { "└── " } else { "├── " });
            out.push_str(self.nodes[idx].name.as_str());
            out.push('\n');
            let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
            self.push_sorted_children(idx, &child_prefix, &mut stack);
        }
        out
    }

    fn push_sorted_children(&self, idx: usize, prefix: &str, stack: &mut Vec<(usize, String, bool)>) {
        let mut children = self.nodes[idx].children.clone();
        children.sort_by(|a, b| self.nodes[*a].name.cmp(&self.nodes[*b].name));
        let count = children.len();
        // Reversed so the first child is popped first.
        for (pos, child) in children.into_iter().enumerate().rev() {
            stack.push((child, prefix.to_string(), pos + 1 == count));
        }
    }
}

/// Converts a class network into a tree rooted at `root`.
///
/// Every `(parent, child)` pair of the network is inserted in visit order.
///
/// # Errors
///
/// Returns [`StructureError::DuplicateNode`] if a class occurs as a child
/// twice (or as a child of anything while also being `root`), and
/// [`StructureError::UnknownParent`] if a parent is listed before it was
/// attached. No partial tree is returned.
pub fn to_tree(network: &ClassNetwork, root: &ClassName) -> Result<ClassTree> {
    let mut tree = ClassTree::with_root(root.clone());
    for (parent, children) in network.iter() {
        for child in children {
            tree.insert(child.clone(), parent)?;
        }
    }
    info!(root = %root, nodes = tree.len(), "class tree built");
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HierarchyError;

    fn network(entries: &[(&str, &[&str])]) -> ClassNetwork {
        ClassNetwork::from_entries(
            "Root".into(),
            entries.iter().map(|(class, children)| {
                (
                    ClassName::from(*class),
                    children.iter().map(|c| ClassName::from(*c)).collect(),
                )
            }),
        )
    }

    #[test]
    fn builds_single_parent_tree() -> crate::error::Result<()> {
        let net = network(&[("Root", &["A", "B"]), ("A", &["C"]), ("B", &[]), ("C", &[])]);
        let tree = to_tree(&net, &"Root".into())?;
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.root().as_str(), "Root");
        assert!(tree.parent("Root").is_none());
        assert_eq!(tree.parent("C").map(ClassName::as_str), Some("A"));
        assert_eq!(tree.children("Root").len(), 2);
        assert!(tree.children("Missing").is_empty());
        Ok(())
    }

    #[test]
    fn duplicate_child_is_rejected() {
        let net = network(&[("Root", &["A", "B"]), ("A", &["C"]), ("B", &["C"])]);
        let err = to_tree(&net, &"Root".into());
        assert!(matches!(
            err,
            Err(HierarchyError::MalformedOntology(StructureError::DuplicateNode {
                ref class,
                ref parent,
            })) if class.as_str() == "C" && parent.as_str() == "B"
        ));
    }

    #[test]
    fn root_as_child_is_rejected() {
        let net = network(&[("Root", &["A"]), ("A", &["Root"])]);
        assert!(matches!(
            to_tree(&net, &"Root".into()),
            Err(HierarchyError::MalformedOntology(StructureError::DuplicateNode { .. }))
        ));
    }

    #[test]
    fn unknown_parent_is_rejected() {
        // "C" lists children before anything attached it.
        let net = network(&[("Root", &["A"]), ("C", &["D"])]);
        assert!(matches!(
            to_tree(&net, &"Root".into()),
            Err(HierarchyError::MalformedOntology(StructureError::UnknownParent {
                ref parent,
                ..
            })) if parent.as_str() == "C"
        ));
    }

    #[test]
    fn render_sorts_children() -> crate::error::Result<()> {
        let net = network(&[("Root", &["B", "A"]), ("A", &["C"])]);
        let tree = to_tree(&net, &"Root".into())?;
        let expected = "Root\n├── A\n│   └── C\n└── B\n";
        assert_eq!(tree.render(), expected);
        Ok(())
    }

    #[test]
    fn render_single_node() {
        assert_eq!(ClassTree::with_root("Solo".into()).render(), "Solo\n");
    }
}
