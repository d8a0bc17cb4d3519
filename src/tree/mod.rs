//! Phylogenetic trees: the index arena and a Newick reader

mod phylo_tree;
mod newick;

pub use phylo_tree::{Node, Tree, TreeBuilder};
pub use newick::{parse_newick, parse_newick_trees, NewickReader};
