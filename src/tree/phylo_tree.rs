//! Rooted binary phylogenetic tree stored as an index arena

use std::collections::HashMap;
use std::fmt;
use crate::{CblvError, Result};

/// A single node record of the arena
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    parent: Option<usize>,
    children: Vec<usize>,
    length: Option<f64>,
    state: Option<u32>,
    label: Option<String>,
}

impl Node {
    /// Parent index, `None` for the root
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Child indices in enumeration order (empty for tips)
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Branch length to the parent, `None` for the root
    pub fn length(&self) -> Option<f64> {
        self.length
    }

    /// Discrete state code (tips only)
    pub fn state(&self) -> Option<u32> {
        self.state
    }

    /// Taxon or node label
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// A rooted, strictly binary, edge-weighted tree
///
/// - Indices are 1-based: tips are `1..=T`, internal nodes `T+1..=2T-1`
/// - The root is always `T+1`
/// - Every internal node has exactly two children, every tip none
///
/// Instances are only created through [`TreeBuilder`] (or the Newick reader
/// which uses it), so the invariants above hold for every `Tree`.
#[derive(Clone, PartialEq)]
pub struct Tree {
    /// Number of tips `T`
    num_tips: usize,
    /// Node records, `nodes[i - 1]` holds node `i`
    nodes: Vec<Node>,
}

impl Tree {
    /// Number of tips `T`
    pub fn num_tips(&self) -> usize {
        self.num_tips
    }

    /// Total number of nodes, `2T - 1`
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Root index, `T + 1`
    pub fn root(&self) -> usize {
        self.num_tips + 1
    }

    fn slot(&self, index: usize) -> Result<usize> {
        if index == 0 || index > self.nodes.len() {
            return Err(CblvError::OutOfRange {
                index,
                node_count: self.nodes.len(),
            });
        }
        Ok(index - 1)
    }

    /// Whether `index` denotes a tip
    ///
    /// Indices outside `1..=2T-1` are a caller bug and yield
    /// [`CblvError::OutOfRange`].
    pub fn is_tip(&self, index: usize) -> Result<bool> {
        self.slot(index)?;
        Ok(index <= self.num_tips)
    }

    /// Node record for `index`
    pub fn node(&self, index: usize) -> Result<&Node> {
        let slot = self.slot(index)?;
        Ok(&self.nodes[slot])
    }

    /// Children of a node
    pub fn children(&self, index: usize) -> Result<&[usize]> {
        Ok(self.node(index)?.children())
    }

    /// Parent of a node (None for root)
    pub fn parent(&self, index: usize) -> Result<Option<usize>> {
        Ok(self.node(index)?.parent())
    }

    /// Branch length above a node (None for root)
    pub fn length(&self, index: usize) -> Result<Option<f64>> {
        Ok(self.node(index)?.length())
    }

    /// State code of a node
    pub fn state(&self, index: usize) -> Result<Option<u32>> {
        Ok(self.node(index)?.state())
    }

    /// Label of a node
    pub fn label(&self, index: usize) -> Result<Option<&str>> {
        Ok(self.node(index)?.label())
    }

    /// Tip indices `1..=T`
    pub fn tips(&self) -> impl Iterator<Item = usize> {
        1..=self.num_tips
    }

    /// Internal node indices `T+1..=2T-1`
    pub fn internal_nodes(&self) -> impl Iterator<Item = usize> {
        self.num_tips + 1..=self.nodes.len()
    }

    /// Preorder listing of all nodes, parents before children
    pub fn preorder(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];

        while let Some(node) = stack.pop() {
            order.push(node);
            for &child in self.nodes[node - 1].children.iter().rev() {
                stack.push(child);
            }
        }

        order
    }

    /// Copy of this tree with tip states taken from a label map
    ///
    /// Tips whose label is absent from `states` keep their current state.
    pub fn assign_states(&self, states: &HashMap<String, u32>) -> Tree {
        let mut tree = self.clone();
        for node in tree.nodes.iter_mut().take(self.num_tips) {
            if let Some(&state) = node.label.as_ref().and_then(|l| states.get(l)) {
                node.state = Some(state);
            }
        }
        tree
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tree(tips={}, nodes={})", self.num_tips, self.nodes.len())?;

        let mut stack = vec![(self.root(), 0)];
        while let Some((node, indent)) = stack.pop() {
            let record = &self.nodes[node - 1];
            write!(f, "{}● {}", "  ".repeat(indent), node)?;
            if let Some(label) = &record.label {
                write!(f, " {}", label)?;
            }
            if let Some(length) = record.length {
                write!(f, " :{}", length)?;
            }
            if let Some(state) = record.state {
                write!(f, " [{}]", state)?;
            }
            writeln!(f)?;
            for &child in record.children.iter().rev() {
                stack.push((child, indent + 1));
            }
        }
        Ok(())
    }
}

/// Builder for constructing trees edge by edge
///
/// All checks are deferred to [`TreeBuilder::build`].
#[derive(Clone, Debug)]
pub struct TreeBuilder {
    num_tips: usize,
    edges: Vec<(usize, usize, f64)>,
    states: Vec<(usize, u32)>,
    labels: Vec<(usize, String)>,
}

impl TreeBuilder {
    /// Create a builder for a tree with `num_tips` tips
    pub fn new(num_tips: usize) -> Self {
        TreeBuilder {
            num_tips,
            edges: Vec::with_capacity(2 * num_tips),
            states: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Attach `child` below `parent` with the given branch length
    pub fn add_child(&mut self, parent: usize, child: usize, length: f64) -> &mut Self {
        self.edges.push((parent, child, length));
        self
    }

    /// Set the discrete state of a tip
    pub fn set_state(&mut self, tip: usize, state: u32) -> &mut Self {
        self.states.push((tip, state));
        self
    }

    /// Set the label of a node
    pub fn set_label(&mut self, node: usize, label: impl Into<String>) -> &mut Self {
        self.labels.push((node, label.into()));
        self
    }

    /// Validate and build the tree
    pub fn build(&self) -> Result<Tree> {
        let num_tips = self.num_tips;
        if num_tips < 2 {
            return Err(CblvError::StructuralViolation(format!(
                "a binary tree needs at least 2 tips, got {}",
                num_tips
            )));
        }

        let node_count = 2 * num_tips - 1;
        let root = num_tips + 1;
        let mut nodes = vec![Node::default(); node_count];
        let in_range = |index: usize| -> Result<usize> {
            if index == 0 || index > node_count {
                Err(CblvError::OutOfRange { index, node_count })
            } else {
                Ok(index - 1)
            }
        };

        for &(parent, child, length) in &self.edges {
            let p = in_range(parent)?;
            let c = in_range(child)?;
            if parent == child {
                return Err(CblvError::StructuralViolation(format!(
                    "node {} is its own parent",
                    child
                )));
            }
            if child == root {
                return Err(CblvError::StructuralViolation(format!(
                    "root {} cannot have a parent",
                    root
                )));
            }
            if let Some(existing) = nodes[c].parent {
                return Err(CblvError::StructuralViolation(format!(
                    "node {} has two parents ({} and {})",
                    child, existing, parent
                )));
            }
            if !length.is_finite() {
                return Err(CblvError::StructuralViolation(format!(
                    "branch above node {} has non-finite length {}",
                    child, length
                )));
            }
            if length < 0.0 {
                log::warn!("branch above node {} has negative length {}", child, length);
            }
            nodes[c].parent = Some(parent);
            nodes[c].length = Some(length);
            nodes[p].children.push(child);
        }

        for (slot, node) in nodes.iter().enumerate() {
            let index = slot + 1;
            let expected = if index <= num_tips { 0 } else { 2 };
            if node.children.len() != expected {
                return Err(CblvError::StructuralViolation(format!(
                    "node {} has {} children, expected {}",
                    index,
                    node.children.len(),
                    expected
                )));
            }
            if index != root && node.parent.is_none() {
                return Err(CblvError::StructuralViolation(format!(
                    "node {} has no parent",
                    index
                )));
            }
        }

        // With one parent per non-root node, anything unreachable sits on a cycle
        let mut visited = vec![false; node_count];
        let mut stack = vec![root];
        let mut reached = 0;
        while let Some(node) = stack.pop() {
            if std::mem::replace(&mut visited[node - 1], true) {
                return Err(CblvError::StructuralViolation(format!(
                    "node {} reached twice",
                    node
                )));
            }
            reached += 1;
            stack.extend_from_slice(&nodes[node - 1].children);
        }
        if reached != node_count {
            return Err(CblvError::StructuralViolation(format!(
                "only {} of {} nodes reachable from root (cycle)",
                reached, node_count
            )));
        }

        for &(tip, state) in &self.states {
            let slot = in_range(tip)?;
            if tip > num_tips {
                return Err(CblvError::StructuralViolation(format!(
                    "state assigned to internal node {}",
                    tip
                )));
            }
            nodes[slot].state = Some(state);
        }

        for (node, label) in &self.labels {
            let slot = in_range(*node)?;
            nodes[slot].label = Some(label.clone());
        }

        Ok(Tree { num_tips, nodes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ((1:0.2,2:0.3)5:0.5,3:0.4)4;
    fn three_tip_tree() -> Tree {
        let mut builder = TreeBuilder::new(3);
        builder.add_child(4, 5, 0.5)
            .add_child(5, 1, 0.2)
            .add_child(5, 2, 0.3)
            .add_child(4, 3, 0.4);
        builder.build().unwrap()
    }

    #[test]
    fn test_tree_builder() {
        let tree = three_tip_tree();

        assert_eq!(tree.num_tips(), 3);
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.root(), 4);
        assert_eq!(tree.children(4).unwrap(), &[5usize, 3]);
        assert_eq!(tree.children(5).unwrap(), &[1usize, 2]);
        assert_eq!(tree.parent(1).unwrap(), Some(5));
        assert_eq!(tree.parent(4).unwrap(), None);
        assert_eq!(tree.length(3).unwrap(), Some(0.4));
        assert_eq!(tree.length(4).unwrap(), None);
    }

    #[test]
    fn test_topology_classifier() {
        let tree = three_tip_tree();
        assert!(tree.is_tip(1).unwrap());
        assert!(tree.is_tip(3).unwrap());
        assert!(!tree.is_tip(4).unwrap());
        assert!(!tree.is_tip(5).unwrap());

        assert!(matches!(
            tree.is_tip(0),
            Err(CblvError::OutOfRange { index: 0, node_count: 5 })
        ));
        assert!(matches!(
            tree.is_tip(6),
            Err(CblvError::OutOfRange { index: 6, node_count: 5 })
        ));
    }

    #[test]
    fn test_preorder() {
        let tree = three_tip_tree();
        assert_eq!(tree.preorder(), vec![4, 5, 1, 2, 3]);
    }

    #[test]
    fn test_rejects_non_binary() {
        let mut builder = TreeBuilder::new(3);
        builder.add_child(4, 1, 1.0)
            .add_child(4, 2, 1.0)
            .add_child(4, 3, 1.0);
        let err = builder.build().unwrap_err();
        assert!(matches!(err, CblvError::StructuralViolation(_)));
    }

    #[test]
    fn test_rejects_two_parents() {
        let mut builder = TreeBuilder::new(2);
        builder.add_child(3, 1, 1.0)
            .add_child(3, 1, 1.0);
        assert!(matches!(
            builder.build(),
            Err(CblvError::StructuralViolation(_))
        ));
    }

    #[test]
    fn test_rejects_cycle() {
        // 6 and 7 point at each other and never reach root 5
        let mut builder = TreeBuilder::new(4);
        builder.add_child(5, 1, 1.0)
            .add_child(5, 2, 1.0)
            .add_child(6, 3, 1.0)
            .add_child(6, 7, 1.0)
            .add_child(7, 4, 1.0)
            .add_child(7, 6, 1.0);
        let err = builder.build().unwrap_err();
        assert!(matches!(err, CblvError::StructuralViolation(_)));
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_rejects_single_tip_and_bad_index() {
        assert!(TreeBuilder::new(1).build().is_err());

        let mut builder = TreeBuilder::new(2);
        builder.add_child(3, 1, 1.0).add_child(3, 9, 1.0);
        assert!(matches!(
            builder.build(),
            Err(CblvError::OutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn test_rejects_non_finite_length() {
        let mut builder = TreeBuilder::new(2);
        builder.add_child(3, 1, f64::NAN).add_child(3, 2, 1.0);
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_states_and_labels() {
        let mut builder = TreeBuilder::new(2);
        builder.add_child(3, 1, 1.0)
            .add_child(3, 2, 1.0)
            .set_label(1, "A")
            .set_label(2, "B")
            .set_state(1, 1);
        let tree = builder.build().unwrap();
        assert_eq!(tree.state(1).unwrap(), Some(1));
        assert_eq!(tree.state(2).unwrap(), None);

        let mut map = HashMap::new();
        map.insert("B".to_string(), 0);
        let labelled = tree.assign_states(&map);
        assert_eq!(labelled.state(1).unwrap(), Some(1));
        assert_eq!(labelled.state(2).unwrap(), Some(0));

        let mut builder = TreeBuilder::new(2);
        builder.add_child(3, 1, 1.0).add_child(3, 2, 1.0).set_state(3, 0);
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_debug_output() {
        let tree = three_tip_tree();
        let text = format!("{:?}", tree);
        assert!(text.starts_with("Tree(tips=3, nodes=5)"));
        assert!(text.contains("● 4"));
        assert!(text.contains("    ● 1 :0.2"));
    }
}
