//! Inorder traversal driven by the ladder

use super::Ladder;
use crate::tree::Tree;

/// Canonical visitation sequence of all `2T - 1` nodes
///
/// Iterative with an explicit stack of pending ancestors, so caterpillar
/// trees with thousands of tips do not touch the call stack.
pub fn inorder(tree: &Tree, ladder: &Ladder) -> Vec<usize> {
    let mut sequence = Vec::with_capacity(tree.node_count());
    let mut stack = Vec::new();
    let mut cursor = Some(tree.root());

    loop {
        while let Some(node) = cursor {
            stack.push(node);
            cursor = ladder.left(node);
        }

        match stack.pop() {
            Some(node) => {
                sequence.push(node);
                cursor = ladder.right(node);
            }
            None => break,
        }
    }

    sequence
}
