//! Compact bijective ladderized vector (CBLV) encoding of a single tree

mod ladder;
mod traversal;
mod distances;
mod encoder;
mod formatter;

pub use ladder::{ladder_order, subtree_heights, Ladder};
pub use traversal::inorder;
pub use distances::Distances;
pub use encoder::{encode, Encoding, EncodingKind};
pub use formatter::{format, format_into};

use crate::tree::Tree;
use crate::Result;
use ndarray::Array1;

/// Encode a tree and pad it to `kind.blocks() * max_taxa` slots
pub fn encode_formatted(tree: &Tree, kind: EncodingKind, max_taxa: usize) -> Result<Array1<f64>> {
    let encoding = encode(tree, kind)?;
    format(&encoding, max_taxa)
}
