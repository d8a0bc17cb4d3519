//! Feature sequences gathered along the canonical traversal

use serde::{Serialize, Deserialize};
use super::{inorder, Distances, Ladder};
use crate::tree::Tree;
use crate::{CblvError, Result};

/// Which encoding variant to produce
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncodingKind {
    /// Internal-node depths and tip branch lengths
    #[default]
    Plain,
    /// Plain features plus a binary state per tip
    BinaryState,
    /// Plain features plus one of `num_states` states per tip
    MultiState {
        /// Size of the label space
        num_states: u32,
    },
}

impl EncodingKind {
    /// Number of blocks `k` in the formatted vector
    pub fn blocks(&self) -> usize {
        match self {
            EncodingKind::Plain => 2,
            EncodingKind::BinaryState | EncodingKind::MultiState { .. } => 3,
        }
    }

    /// Size of the state label space, `None` for the plain variant
    pub fn num_states(&self) -> Option<u32> {
        match self {
            EncodingKind::Plain => None,
            EncodingKind::BinaryState => Some(2),
            EncodingKind::MultiState { num_states } => Some(*num_states),
        }
    }
}

/// Feature sequences of one tree, in canonical visitation order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Encoding {
    /// Node depths and tip branch lengths
    Plain {
        /// Root distances of the `T - 1` internal nodes
        nodes: Vec<f64>,
        /// Terminal branch lengths of the `T` tips
        tips: Vec<f64>,
    },
    /// Plain sequences plus binary tip states
    BinaryState {
        /// Root distances of the `T - 1` internal nodes
        nodes: Vec<f64>,
        /// Terminal branch lengths of the `T` tips
        tips: Vec<f64>,
        /// Tip states, each 0 or 1
        states: Vec<u32>,
    },
    /// Plain sequences plus multi-state tip states
    MultiState {
        /// Size of the label space
        num_states: u32,
        /// Root distances of the `T - 1` internal nodes
        nodes: Vec<f64>,
        /// Terminal branch lengths of the `T` tips
        tips: Vec<f64>,
        /// Tip states, each below `num_states`
        states: Vec<u32>,
    },
}

impl Encoding {
    /// Variant of this encoding
    pub fn kind(&self) -> EncodingKind {
        match self {
            Encoding::Plain { .. } => EncodingKind::Plain,
            Encoding::BinaryState { .. } => EncodingKind::BinaryState,
            Encoding::MultiState { num_states, .. } => EncodingKind::MultiState {
                num_states: *num_states,
            },
        }
    }

    /// Internal-node root distances
    pub fn nodes(&self) -> &[f64] {
        match self {
            Encoding::Plain { nodes, .. }
            | Encoding::BinaryState { nodes, .. }
            | Encoding::MultiState { nodes, .. } => nodes,
        }
    }

    /// Tip branch lengths
    pub fn tips(&self) -> &[f64] {
        match self {
            Encoding::Plain { tips, .. }
            | Encoding::BinaryState { tips, .. }
            | Encoding::MultiState { tips, .. } => tips,
        }
    }

    /// Tip states, if this variant carries them
    pub fn states(&self) -> Option<&[u32]> {
        match self {
            Encoding::Plain { .. } => None,
            Encoding::BinaryState { states, .. } | Encoding::MultiState { states, .. } => {
                Some(states)
            }
        }
    }

    /// Total number of features across all sequences
    pub fn len(&self) -> usize {
        self.nodes().len() + self.tips().len() + self.states().map_or(0, |s| s.len())
    }

    /// Whether no features were produced
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Encode a tree as the sequences of `kind`
///
/// Tips contribute their terminal branch length (and state), internal nodes
/// their distance from the root, both in ladderized inorder.
pub fn encode(tree: &Tree, kind: EncodingKind) -> Result<Encoding> {
    let ladder = Ladder::new(tree)?;
    let distances = Distances::new(tree)?;
    let num_tips = tree.num_tips();
    let num_states = kind.num_states();

    let mut nodes = Vec::with_capacity(num_tips - 1);
    let mut tips = Vec::with_capacity(num_tips);
    let mut states = Vec::with_capacity(if num_states.is_some() { num_tips } else { 0 });

    for node in inorder(tree, &ladder) {
        if !tree.is_tip(node)? {
            nodes.push(distances.to_root(node));
            continue;
        }

        tips.push(distances.to_parent(node));
        if let Some(num_states) = num_states {
            let state = tree
                .state(node)?
                .ok_or(CblvError::MissingState { tip: node })?;
            if state >= num_states {
                return Err(CblvError::InvalidState {
                    tip: node,
                    state,
                    num_states,
                });
            }
            states.push(state);
        }
    }

    log::debug!(
        "encoded tree with {} tips: {} node depths, {} tip lengths, {} states",
        num_tips,
        nodes.len(),
        tips.len(),
        states.len()
    );

    Ok(match kind {
        EncodingKind::Plain => Encoding::Plain { nodes, tips },
        EncodingKind::BinaryState => Encoding::BinaryState { nodes, tips, states },
        EncodingKind::MultiState { num_states } => Encoding::MultiState {
            num_states,
            nodes,
            tips,
            states,
        },
    })
}
