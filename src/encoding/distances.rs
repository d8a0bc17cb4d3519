//! Root and parent distances, computed once per tree

use crate::tree::Tree;
use crate::Result;

/// Per-tree distance tables
///
/// - `to_root`: cumulative branch length from the root, every node
/// - `to_parent`: terminal branch length, tips only
#[derive(Clone, Debug, PartialEq)]
pub struct Distances {
    to_root: Vec<f64>,
    to_parent: Vec<f64>,
}

impl Distances {
    /// Compute both tables in a single preorder pass
    pub fn new(tree: &Tree) -> Result<Self> {
        let mut to_root = vec![0.0; tree.node_count()];
        let mut to_parent = vec![0.0; tree.num_tips()];

        for node in tree.preorder() {
            let base = to_root[node - 1];
            for &child in tree.children(node)? {
                let length = tree.length(child)?.unwrap_or(0.0);
                to_root[child - 1] = base + length;
                if child <= to_parent.len() {
                    to_parent[child - 1] = length;
                }
            }
        }

        Ok(Distances { to_root, to_parent })
    }

    /// Distance from the root to `node`
    pub fn to_root(&self, node: usize) -> f64 {
        self.to_root[node - 1]
    }

    /// Terminal branch length of `tip`
    pub fn to_parent(&self, tip: usize) -> f64 {
        self.to_parent[tip - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse_newick;

    #[test]
    fn test_distances() {
        let tree = parse_newick("((A:0.25,B:0.5):0.5,C:0.75);").unwrap();
        let distances = Distances::new(&tree).unwrap();

        assert_eq!(distances.to_root(4), 0.0);
        assert_eq!(distances.to_root(5), 0.5);
        assert_eq!(distances.to_root(1), 0.75);
        assert_eq!(distances.to_root(2), 1.0);
        assert_eq!(distances.to_root(3), 0.75);

        assert_eq!(distances.to_parent(1), 0.25);
        assert_eq!(distances.to_parent(2), 0.5);
        assert_eq!(distances.to_parent(3), 0.75);
    }
}
