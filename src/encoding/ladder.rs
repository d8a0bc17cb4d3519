//! Ladderized child ordering
//!
//! At every internal node the child whose subtree reaches deeper goes left.
//! Depth is the largest branch-length distance from the child down to any tip
//! below it, so two tip children always tie. Ties keep the order in which the
//! children are listed in the tree.

use crate::tree::Tree;
use crate::{CblvError, Result};

/// Height of every node: the largest distance from the node down to a tip
/// below it. Tips have height 0. Indexed by `node - 1`.
pub fn subtree_heights(tree: &Tree) -> Result<Vec<f64>> {
    let mut heights = vec![0.0; tree.node_count()];

    // Reversed preorder visits children before parents
    for node in tree.preorder().into_iter().rev() {
        let mut height: f64 = 0.0;
        for (i, &child) in tree.children(node)?.iter().enumerate() {
            let length = tree.length(child)?.unwrap_or(0.0);
            let reach = length + heights[child - 1];
            height = if i == 0 { reach } else { height.max(reach) };
        }
        heights[node - 1] = height;
    }

    Ok(heights)
}

/// Order the two children of an internal node as `(left, right)`
///
/// `heights` comes from [`subtree_heights`]. A node without exactly two
/// children fails with [`CblvError::StructuralViolation`].
pub fn ladder_order(tree: &Tree, node: usize, heights: &[f64]) -> Result<(usize, usize)> {
    let children = tree.children(node)?;
    let &[first, second] = children else {
        return Err(CblvError::StructuralViolation(format!(
            "node {} has {} children, ladder ordering needs two",
            node,
            children.len()
        )));
    };

    if heights[second - 1] > heights[first - 1] {
        Ok((second, first))
    } else {
        Ok((first, second))
    }
}

/// Precomputed ladder decisions for every internal node of one tree
#[derive(Clone, Debug, PartialEq)]
pub struct Ladder {
    num_tips: usize,
    /// `pairs[node - T - 1]` holds `(left, right)` of internal node `node`
    pairs: Vec<(usize, usize)>,
}

impl Ladder {
    /// Compute the ladder decisions of a tree
    pub fn new(tree: &Tree) -> Result<Self> {
        let heights = subtree_heights(tree)?;
        let pairs = tree
            .internal_nodes()
            .map(|node| ladder_order(tree, node, &heights))
            .collect::<Result<Vec<_>>>()?;

        Ok(Ladder {
            num_tips: tree.num_tips(),
            pairs,
        })
    }

    /// `(left, right)` children of a node, `None` for tips
    pub fn order(&self, node: usize) -> Option<(usize, usize)> {
        node.checked_sub(self.num_tips + 1)
            .and_then(|slot| self.pairs.get(slot))
            .copied()
    }

    /// Deeper child of a node, `None` for tips
    pub fn left(&self, node: usize) -> Option<usize> {
        self.order(node).map(|(left, _)| left)
    }

    /// Shallower child of a node, `None` for tips
    pub fn right(&self, node: usize) -> Option<usize> {
        self.order(node).map(|(_, right)| right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{parse_newick, TreeBuilder};

    #[test]
    fn test_deeper_child_goes_left() {
        // Root 4 lists the shallow tip 3 first
        let mut builder = TreeBuilder::new(3);
        builder.add_child(4, 3, 0.4)
            .add_child(4, 5, 0.5)
            .add_child(5, 1, 0.2)
            .add_child(5, 2, 0.3);
        let tree = builder.build().unwrap();

        let ladder = Ladder::new(&tree).unwrap();
        assert_eq!(ladder.order(4), Some((5, 3)));
        assert_eq!(ladder.order(5), Some((1, 2)));
        assert_eq!(ladder.order(1), None);
        assert_eq!(ladder.left(3), None);
        assert_eq!(ladder.right(99), None);
    }

    #[test]
    fn test_tip_pair_keeps_enumeration_order() {
        // The longer tip branch does not matter: tips have height 0
        let mut builder = TreeBuilder::new(2);
        builder.add_child(3, 2, 0.1).add_child(3, 1, 5.0);
        let tree = builder.build().unwrap();

        let ladder = Ladder::new(&tree).unwrap();
        assert_eq!(ladder.order(3), Some((2, 1)));
    }

    #[test]
    fn test_heights_are_weighted() {
        let tree = parse_newick("((A:1,B:3):1,(C:2,D:2):2);").unwrap();
        let heights = subtree_heights(&tree).unwrap();

        // root 5, left cherry 6, right cherry 7
        assert_eq!(heights[5 - 1], 4.0);
        assert_eq!(heights[6 - 1], 3.0);
        assert_eq!(heights[7 - 1], 2.0);
        assert_eq!(heights[0], 0.0);

        let ladder = Ladder::new(&tree).unwrap();
        // 6 reaches 3.0 below itself, 7 only 2.0
        assert_eq!(ladder.order(5), Some((6, 7)));
        assert_eq!(ladder.order(6), Some((1, 2)));
    }

    #[test]
    fn test_equal_heights_keep_enumeration_order() {
        let tree = parse_newick("((A:1,B:1):1,(C:1,D:1):1);").unwrap();
        let ladder = Ladder::new(&tree).unwrap();
        assert_eq!(ladder.order(5), Some((6, 7)));
    }

    #[test]
    fn test_deterministic() {
        let tree = parse_newick("(((A:1,B:2):0.5,C:3):1,(D:0.1,(E:1,F:1):2):0.3);").unwrap();
        let first = Ladder::new(&tree).unwrap();
        for _ in 0..10 {
            assert_eq!(Ladder::new(&tree).unwrap(), first);
        }
    }

    #[test]
    fn test_tip_has_no_ladder_order() {
        let tree = parse_newick("(A:1,B:1);").unwrap();
        let heights = subtree_heights(&tree).unwrap();
        assert!(matches!(
            ladder_order(&tree, 1, &heights),
            Err(CblvError::StructuralViolation(_))
        ));
        assert!(matches!(
            ladder_order(&tree, 4, &heights),
            Err(CblvError::OutOfRange { .. })
        ));
    }
}
